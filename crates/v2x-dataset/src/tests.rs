//! Unit tests for v2x-dataset.

use v2x_core::{SimTime, Variant, VehicleId};
use v2x_logs::{ScenarioVariantLog, SummarySnapshot, TripRecord};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn trip(id: &str, time_loss: f64) -> TripRecord {
    TripRecord {
        id:                    VehicleId::from(id),
        depart:                SimTime(0.0),
        arrival:               Some(SimTime(100.0 + time_loss)),
        route_length:          1000.0,
        intended_route_length: None,
        time_loss,
        duration:              Some(100.0 + time_loss),
        waiting_time:          0.0,
        reroute_count:         0,
        vaporized:             None,
    }
}

fn snapshots() -> Vec<SummarySnapshot> {
    (0..3)
        .map(|i| SummarySnapshot {
            time:       SimTime(i as f64),
            running:    1,
            mean_speed: Some(10.0),
            halting:    0,
        })
        .collect()
}

fn log(variant: Variant, ids: &[&str]) -> ScenarioVariantLog {
    ScenarioVariantLog::new(variant, ids.iter().map(|id| trip(id, 10.0)).collect(), snapshots())
}

fn ids(prefix: &str, range: std::ops::RangeInclusive<u32>) -> Vec<String> {
    range.map(|i| format!("{prefix}{i}")).collect()
}

// ── Overlap and consistency ───────────────────────────────────────────────────

#[cfg(test)]
mod consistency {
    use super::*;
    use crate::{DatasetError, OverlapStats, ScenarioDataset};

    #[test]
    fn identical_demand_has_full_overlap() {
        let ds = ScenarioDataset::from_logs(
            "s",
            log(Variant::Clean, &["a", "b", "c"]),
            log(Variant::Blocked, &["c", "b", "a"]),
            0.9,
        )
        .unwrap();
        assert_eq!(ds.overlap().ratio, 1.0);
        assert_eq!(ds.overlap().shared, 3);
        assert_eq!(ds.matched_trips().count(), 3);
    }

    #[test]
    fn foreign_vehicle_below_threshold_is_refused() {
        // Clean v1..v19, Blocked v1..v17 + v99 → 17 shared of 20 = 0.85.
        let clean_ids = ids("v", 1..=19);
        let mut blocked_ids = ids("v", 1..=17);
        blocked_ids.push("v99".to_owned());

        let clean_refs: Vec<&str> = clean_ids.iter().map(String::as_str).collect();
        let blocked_refs: Vec<&str> = blocked_ids.iter().map(String::as_str).collect();

        let err = ScenarioDataset::from_logs(
            "attack",
            log(Variant::Clean, &clean_refs),
            log(Variant::Blocked, &blocked_refs),
            0.9,
        )
        .unwrap_err();

        match err {
            DatasetError::InconsistentScenario { overlap, clean_only, blocked_only, .. } => {
                assert!((overlap - 0.85).abs() < 1e-12, "overlap {overlap}");
                assert_eq!(clean_only, 2);
                assert_eq!(blocked_only, 1);
            }
            other => panic!("expected InconsistentScenario, got {other:?}"),
        }
    }

    #[test]
    fn build_succeeds_iff_overlap_reaches_minimum() {
        // 3 shared of 4 → 0.75.
        let clean = ["a", "b", "c", "d"];
        let blocked = ["a", "b", "c"];
        for (min, ok) in [(0.0, true), (0.5, true), (0.75, true), (0.76, false), (1.0, false)] {
            let res = ScenarioDataset::from_logs(
                "s",
                log(Variant::Clean, &clean),
                log(Variant::Blocked, &blocked),
                min,
            );
            assert_eq!(res.is_ok(), ok, "min_overlap {min}");
            if !ok {
                assert!(matches!(res, Err(DatasetError::InconsistentScenario { .. })));
            }
        }
    }

    #[test]
    fn swapped_variants_rejected() {
        let err = ScenarioDataset::from_logs(
            "s",
            log(Variant::Blocked, &["a"]),
            log(Variant::Clean, &["a"]),
            0.9,
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::VariantMismatch { expected: Variant::Clean, .. }));
    }

    #[test]
    fn out_of_range_minimum_is_config_error() {
        let err = ScenarioDataset::from_logs(
            "s",
            log(Variant::Clean, &["a"]),
            log(Variant::Blocked, &["a"]),
            1.2,
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::Config(_)));
    }

    #[test]
    fn overlap_of_empty_sets_is_zero() {
        let stats = OverlapStats::between(&log(Variant::Clean, &[]), &log(Variant::Blocked, &[]));
        assert_eq!(stats.ratio, 0.0);
    }

    #[test]
    fn unmatched_ids_sorted_per_variant() {
        let ds = ScenarioDataset::from_logs(
            "s",
            log(Variant::Clean, &["a", "z", "b", "c", "d", "e", "f", "g", "h", "i", "j"]),
            log(Variant::Blocked, &["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]),
            0.9,
        )
        .unwrap();
        let clean_only: Vec<&str> = ds.unmatched_ids(Variant::Clean).iter().map(|id| id.as_str()).collect();
        assert_eq!(clean_only, ["z"]);
        assert!(ds.unmatched_ids(Variant::Blocked).is_empty());
    }

    #[test]
    fn counterpart_matches_by_id() {
        let ds = ScenarioDataset::from_logs(
            "s",
            log(Variant::Clean, &["a", "b"]),
            log(Variant::Blocked, &["b", "a"]),
            0.9,
        )
        .unwrap();
        let b_blocked = ds.blocked().trip("b").unwrap();
        let b_clean = ds.counterpart(b_blocked, Variant::Blocked).unwrap();
        assert_eq!(b_clean.id.as_str(), "b");
        assert!(std::ptr::eq(b_clean, ds.clean().trip("b").unwrap()));
    }
}

// ── Directory layout ──────────────────────────────────────────────────────────

#[cfg(test)]
mod layout {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::{DatasetBuilder, DatasetError, ScenarioDataset, ScenarioPaths};

    const TRIPS: &str = r#"<tripinfos>
        <tripinfo id="v1" depart="0" arrival="50" routeLength="100" timeLoss="5"/>
        <tripinfo id="v2" depart="1" arrival="60" routeLength="100" timeLoss="6"/>
    </tripinfos>"#;

    const SUMMARY: &str = r#"<summary>
        <step time="0" running="2" halting="0" meanSpeed="10"/>
        <step time="1" running="2" halting="1" meanSpeed="8"/>
    </summary>"#;

    fn write(path: &Path, body: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn resolves_per_variant_directories() {
        let root = tempfile::tempdir().unwrap();
        let logs = root.path().join("Town-logs");
        for v in Variant::ALL {
            write(&logs.join(v.label()).join(format!("Town_{v}_tripinfo_output.xml")), TRIPS);
            write(&logs.join(v.label()).join("summary_output.xml"), SUMMARY);
        }

        let paths = ScenarioPaths::resolve("Town", root.path()).unwrap();
        assert_eq!(paths.clean.trips, logs.join("Clean").join("Town_Clean_tripinfo_output.xml"));
        assert_eq!(paths.blocked.summary, logs.join("Blocked").join("summary_output.xml"));

        let ds = ScenarioDataset::build("Town", root.path(), 0.9).unwrap();
        assert_eq!(ds.scenario(), "Town");
        assert_eq!(ds.variant(Variant::Blocked).trips().len(), 2);
    }

    #[test]
    fn falls_back_to_flat_layout() {
        let root = tempfile::tempdir().unwrap();
        let logs = root.path().join("Town-logs");
        for v in Variant::ALL {
            write(&logs.join(format!("Town_{v}_tripinfo_output.xml")), TRIPS);
            write(&logs.join(format!("Town_{v}_summary_output.xml")), SUMMARY);
        }
        let paths = ScenarioPaths::resolve("Town", root.path()).unwrap();
        assert_eq!(paths.variant(Variant::Blocked).trips, logs.join("Town_Blocked_tripinfo_output.xml"));
    }

    #[test]
    fn missing_logs_dir_reported() {
        let root = tempfile::tempdir().unwrap();
        let err = ScenarioPaths::resolve("Ghost", root.path()).unwrap_err();
        assert!(matches!(err, DatasetError::LogsDirNotFound { .. }));
        assert!(err.to_string().contains("Ghost-logs"));
    }

    #[test]
    fn missing_blocked_summary_lists_candidates() {
        let root = tempfile::tempdir().unwrap();
        let logs = root.path().join("Town-logs");
        write(&logs.join("Town_Clean_tripinfo_output.xml"), TRIPS);
        write(&logs.join("Town_Clean_summary_output.xml"), SUMMARY);
        write(&logs.join("Town_Blocked_tripinfo_output.xml"), TRIPS);

        match ScenarioPaths::resolve("Town", root.path()) {
            Err(DatasetError::MissingLog { variant, kind, searched, .. }) => {
                assert_eq!(variant, Variant::Blocked);
                assert_eq!(kind, "summary");
                assert_eq!(searched.len(), 3);
            }
            other => panic!("expected MissingLog, got {other:?}"),
        }
    }

    #[test]
    fn parse_failure_surfaces_as_log_error() {
        let root = tempfile::tempdir().unwrap();
        let logs = root.path().join("Town-logs");
        for v in Variant::ALL {
            write(&logs.join(format!("Town_{v}_tripinfo_output.xml")), TRIPS);
            write(&logs.join(format!("Town_{v}_summary_output.xml")), SUMMARY);
        }
        write(&logs.join("Town_Blocked_tripinfo_output.xml"), "<tripinfos><tripinfo id=\"x\"/></tripinfos>");

        let err = DatasetBuilder::new("Town", root.path()).build().unwrap_err();
        assert!(matches!(err, DatasetError::Log(v2x_logs::LogError::MissingField { .. })), "{err}");
    }

    #[test]
    fn explicit_paths_bypass_convention() {
        let root = tempfile::tempdir().unwrap();
        let t = root.path().join("t.xml");
        let s = root.path().join("s.xml");
        write(&t, TRIPS);
        write(&s, SUMMARY);

        let vp = crate::VariantPaths { trips: t.clone(), summary: s.clone() };
        let ds = DatasetBuilder::new("Adhoc", "/nonexistent")
            .paths(ScenarioPaths { logs_dir: root.path().to_path_buf(), clean: vp.clone(), blocked: vp })
            .build()
            .unwrap();
        assert_eq!(ds.overlap().shared, 2);
    }
}

//! Unit tests for v2x-report.

use std::fs;
use std::path::{Path, PathBuf};

use v2x_core::{AnalysisConfig, SimTime, Variant, VehicleId};
use v2x_dataset::ScenarioDataset;
use v2x_logs::{ScenarioVariantLog, SummarySnapshot, TripRecord};
use v2x_metrics::{run_all, AnalysisReport, MetricKind};

use crate::{ArtifactWriter, RenderError, RenderResult};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn trip(id: &str, depart: f64, time_loss: f64, reroutes: u32) -> TripRecord {
    TripRecord {
        id:                    VehicleId::from(id),
        depart:                SimTime(depart),
        arrival:               Some(SimTime(depart + 300.0)),
        route_length:          1500.0,
        intended_route_length: None,
        time_loss,
        duration:              Some(300.0),
        waiting_time:          time_loss / 2.0,
        reroute_count:         reroutes,
        vaporized:             None,
    }
}

fn steps(halting: &[u32]) -> Vec<SummarySnapshot> {
    halting
        .iter()
        .enumerate()
        .map(|(i, &h)| SummarySnapshot {
            time:       SimTime(i as f64 * 60.0),
            running:    20,
            mean_speed: Some(12.0 - h as f64 * 0.25),
            halting:    h,
        })
        .collect()
}

fn report() -> AnalysisReport {
    let clean = vec![trip("v1", 0.0, 200.0, 0), trip("v2", 10.0, 210.0, 0)];
    let mut blocked = vec![trip("v1", 0.0, 260.0, 0), trip("v2", 10.0, 330.0, 1)];
    blocked[0].arrival = None;
    blocked[0].vaporized = Some("end".to_owned());
    blocked[0].route_length = 600.0;

    let ds = ScenarioDataset::from_logs(
        "Downtown",
        ScenarioVariantLog::new(Variant::Clean, clean, steps(&[1; 10])),
        ScenarioVariantLog::new(Variant::Blocked, blocked, steps(&[1, 1, 1, 1, 1, 1, 9, 9, 1, 1])),
        0.9,
    )
    .unwrap();
    run_all(&ds, &AnalysisConfig::default()).unwrap()
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn expected_artifacts() -> Vec<String> {
    let mut names: Vec<String> = crate::default_writers()
        .iter()
        .flat_map(|w| w.artifacts().iter().map(|n| n.to_string()))
        .collect();
    names.sort();
    names
}

// ── Rendering ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod render {
    use super::*;
    use crate::render;

    #[test]
    fn writes_every_artifact_and_nothing_else() {
        let dir = tempfile::tempdir().unwrap();
        let written = render(&report(), dir.path()).unwrap();

        assert_eq!(written.len(), expected_artifacts().len());
        assert!(written.iter().all(|p| p.parent() == Some(dir.path())));
        assert_eq!(listing(dir.path()), expected_artifacts());
        for name in ["congestion_halting.svg", "summary.json", "route_truncation.csv", "report.txt"] {
            assert!(dir.path().join(name).is_file(), "{name} missing");
        }
    }

    #[test]
    fn creates_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        render(&report(), &out).unwrap();
        assert_eq!(listing(&out), expected_artifacts());
    }

    #[test]
    fn rerender_is_byte_identical() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let first = render(&report(), a.path()).unwrap();
        render(&report(), b.path()).unwrap();
        // Rendering over existing output replaces it with the same bytes.
        render(&report(), a.path()).unwrap();

        for path in &first {
            let name = path.file_name().unwrap();
            assert_eq!(
                fs::read(path).unwrap(),
                fs::read(b.path().join(name)).unwrap(),
                "{} differs",
                name.to_string_lossy()
            );
        }
        assert_eq!(listing(a.path()), expected_artifacts());
    }

    #[test]
    fn unusable_output_path_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not_a_dir");
        fs::write(&file, "x").unwrap();

        let err = render(&report(), &file).unwrap_err();
        assert!(matches!(err, RenderError::OutputDir { .. }));
        assert_eq!(listing(dir.path()), vec!["not_a_dir".to_owned()]);
    }

    struct FailingWriter;

    impl ArtifactWriter for FailingWriter {
        fn artifacts(&self) -> &'static [&'static str] {
            &["broken.svg"]
        }

        fn write(&self, _report: &AnalysisReport, dir: &Path) -> RenderResult<()> {
            fs::write(dir.join("broken.svg"), "<svg").unwrap();
            Err(RenderError::Chart { artifact: "broken.svg", message: "boom".into() })
        }
    }

    #[test]
    fn failure_leaves_no_partial_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let writers: Vec<Box<dyn ArtifactWriter>> = vec![
            Box::new(crate::TableWriter),
            Box::new(crate::SummaryWriter),
            Box::new(FailingWriter),
        ];

        let err = crate::render_with(&writers, &report(), dir.path()).unwrap_err();
        assert!(matches!(err, RenderError::Chart { artifact: "broken.svg", .. }));
        assert!(listing(dir.path()).is_empty());
    }

    #[test]
    fn directory_in_place_of_artifact_aborts_before_any_rename() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("report.txt")).unwrap();

        let err = render(&report(), dir.path()).unwrap_err();
        assert!(matches!(err, RenderError::TargetNotFile { .. }));
        assert_eq!(listing(dir.path()), vec!["report.txt".to_owned()]);
        assert!(dir.path().join("report.txt").is_dir());
    }

    #[test]
    fn blocked_rerender_keeps_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        render(&report(), dir.path()).unwrap();
        fs::write(dir.path().join("summary.json"), "old").unwrap();
        fs::remove_file(dir.path().join("report.txt")).unwrap();
        fs::create_dir(dir.path().join("report.txt")).unwrap();

        assert!(render(&report(), dir.path()).is_err());
        assert_eq!(fs::read_to_string(dir.path().join("summary.json")).unwrap(), "old");
        assert_eq!(listing(dir.path()), expected_artifacts());
    }

    /// Stages its artifact under a subdirectory the output directory lacks,
    /// so its rename fails after earlier artifacts were already promoted.
    struct NestedWriter;

    impl ArtifactWriter for NestedWriter {
        fn artifacts(&self) -> &'static [&'static str] {
            &["nested/table.csv"]
        }

        fn write(&self, _report: &AnalysisReport, dir: &Path) -> RenderResult<()> {
            fs::create_dir(dir.join("nested")).unwrap();
            fs::write(dir.join("nested/table.csv"), "a,b\n").unwrap();
            Ok(())
        }
    }

    #[test]
    fn failed_rename_rolls_back_promoted_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("summary.json"), "old").unwrap();
        let writers: Vec<Box<dyn ArtifactWriter>> =
            vec![Box::new(crate::SummaryWriter), Box::new(NestedWriter)];

        let err = crate::render_with(&writers, &report(), dir.path()).unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
        assert_eq!(listing(dir.path()), vec!["summary.json".to_owned()]);
        assert_eq!(fs::read_to_string(dir.path().join("summary.json")).unwrap(), "old");
    }

    #[test]
    fn default_writers_cover_every_artifact_once() {
        let names = expected_artifacts();
        let mut unique = names.clone();
        unique.dedup();
        assert_eq!(names, unique);
        assert!(names.contains(&"route_length_comparison.svg".to_owned()));
        assert_eq!(names.contains(&"rerouting_deltas.parquet".to_owned()), cfg!(feature = "parquet"));
    }

    struct SilentWriter;

    impl ArtifactWriter for SilentWriter {
        fn artifacts(&self) -> &'static [&'static str] {
            &["never_written.csv"]
        }

        fn write(&self, _report: &AnalysisReport, _dir: &Path) -> RenderResult<()> {
            Ok(())
        }
    }

    #[test]
    fn missing_staged_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let writers: Vec<Box<dyn ArtifactWriter>> =
            vec![Box::new(crate::SummaryWriter), Box::new(SilentWriter)];

        let err = crate::render_with(&writers, &report(), dir.path()).unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
        assert!(listing(dir.path()).is_empty());
    }
}

// ── Artifact contents ─────────────────────────────────────────────────────────

#[cfg(test)]
mod contents {
    use super::*;
    use crate::render;

    fn rendered() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        render(&report(), dir.path()).unwrap();
        let path = dir.path().to_path_buf();
        (dir, path)
    }

    #[test]
    fn summary_json_carries_key_metrics() {
        let (_guard, dir) = rendered();
        let json: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.join("summary.json")).unwrap()).unwrap();

        assert_eq!(json["scenario"], "Downtown");
        assert_eq!(json["overlap"]["shared"], 2);
        assert_eq!(json["rerouting"]["rerouted"], 1);
        assert_eq!(json["rerouting"]["mean_delta"], 120.0);
        assert_eq!(json["truncation"]["truncated"], 1);
        assert_eq!(json["time_loss"]["blocked"]["incomplete"], 1);
        assert_eq!(json["congestion"]["blocked"]["spike_count"], 1);
        assert_eq!(json["congestion"]["blocked"]["peak_halting"], 9);
        assert_eq!(json["congestion"]["clean"]["spike_count"], 0);
    }

    #[test]
    fn histogram_table_uses_shared_buckets() {
        let (_guard, dir) = rendered();
        let text = fs::read_to_string(dir.join("time_loss_histogram.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "bucket_start,bucket_end,clean,blocked");
        // Completed trips only: Clean 200, 210; Blocked 330.
        assert_eq!(lines[1], "180,210,1,0");
        assert_eq!(lines.last(), Some(&"330,360,0,1"));
    }

    #[test]
    fn spike_table_lists_each_interval() {
        let (_guard, dir) = rendered();
        let text = fs::read_to_string(dir.join("congestion_spikes.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "Blocked,360,420,60,9,360");
    }

    #[test]
    fn truncation_table_has_counts() {
        let (_guard, dir) = rendered();
        let text = fs::read_to_string(dir.join("route_truncation.csv")).unwrap();
        assert!(text.starts_with("metric,value\n"));
        assert!(text.contains("\ntruncated,1\n"));
        assert!(text.contains("\nseverity_0.6_0.7,1\n"));
    }

    #[test]
    fn charts_are_svg_documents() {
        let (_guard, dir) = rendered();
        for name in crate::ChartWriter.artifacts() {
            let svg = fs::read_to_string(dir.join(name)).unwrap();
            assert!(svg.contains("<svg"), "{name} is not an SVG document");
            assert!(svg.trim_end().ends_with("</svg>"), "{name} is truncated");
        }
    }

    #[test]
    fn text_report_names_scenario_and_findings() {
        let (_guard, dir) = rendered();
        let text = fs::read_to_string(dir.join("report.txt")).unwrap();
        assert!(text.starts_with("Malicious RSU impact report: Downtown\n"));
        assert!(text.contains("1 rerouted (0 unmatched): 0 helped"));
        assert!(text.contains("1 of 2 vehicles truncated"));
    }

    #[test]
    fn text_report_lists_loss_spread_waiting_and_route_length() {
        let (_guard, dir) = rendered();
        let text = fs::read_to_string(dir.join("report.txt")).unwrap();
        // Clean losses 200, 210; Blocked 260, 330 and routes of 1500 and 600 m.
        assert!(text.contains(
            "max time loss 210.00 s, std-dev 5.00 s, mean waiting time 102.50 s, \
             mean route length 1500.00 m"
        ));
        assert!(text.contains(
            "max time loss 330.00 s, std-dev 35.00 s, mean waiting time 147.50 s, \
             mean route length 1050.00 m"
        ));
    }

    #[test]
    fn summary_json_lists_analyses_in_run_order() {
        let (_guard, dir) = rendered();
        let json: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.join("summary.json")).unwrap()).unwrap();
        let analyses = json["analyses"].as_array().unwrap();

        let kinds: Vec<&str> = analyses.iter().map(|a| a["kind"].as_str().unwrap()).collect();
        let expected: Vec<&str> = MetricKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(kinds, expected);
        assert_eq!(analyses[0]["computed_from"], serde_json::json!(["Clean", "Blocked"]));
    }

    #[test]
    fn route_length_chart_shows_both_variants() {
        let (_guard, dir) = rendered();
        let svg = fs::read_to_string(dir.join("route_length_comparison.svg")).unwrap();
        assert!(svg.contains("route length comparison"));
        assert!(svg.contains("Clean (median 1500 m)"));
        assert!(svg.contains("Blocked (median 1050 m)"));
    }

    #[test]
    fn each_chart_is_drawn_from_its_own_result() {
        let report = report();
        let mut drawn: Vec<&str> = Vec::new();
        for result in report.results() {
            let charts = crate::charts::draw(&report.scenario, result).unwrap();
            assert!(!charts.is_empty(), "{} has no chart", result.kind().name());
            drawn.extend(charts.iter().map(|(name, _)| *name));
        }
        assert_eq!(drawn, crate::ChartWriter.artifacts());
    }
}

//! Unit tests for v2x-logs.

use std::path::Path;

use crate::{load_summary_str, load_trips_str, LogError};

// ── Helpers ───────────────────────────────────────────────────────────────────

const TRIPS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- generated by the simulator -->
<tripinfos xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <tripinfo id="v1" depart="0.00" arrival="260.00" duration="260.00" routeLength="1500.50"
              waitingTime="40.00" timeLoss="200.00" rerouteNo="0" vaporized="" devices="tripinfo_v1"/>
    <tripinfo id="v2" depart="5.00" arrival="-1" duration="300.00" routeLength="900.00"
              timeLoss="210.00" rerouteNo="2" vaporized="end">
        <emissions CO_abs="0.0"/>
    </tripinfo>
</tripinfos>
"#;

const SUMMARY: &str = r#"<summary>
    <step time="0.00" loaded="4" running="2" halting="0" meanSpeed="12.50"/>
    <step time="1.00" loaded="4" running="0" halting="0" meanSpeed="-1.00"/>
    <step time="2.00" loaded="4" running="3" halting="1" meanSpeed="8.00"/>
</summary>
"#;

fn path() -> &'static Path {
    Path::new("scenario/trips.xml")
}

// ── Trip log ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod trips {
    use v2x_core::SimTime;

    use super::*;

    #[test]
    fn parses_required_and_optional_fields() {
        let trips = load_trips_str(TRIPS, path()).unwrap();
        assert_eq!(trips.len(), 2);

        let v1 = &trips[0];
        assert_eq!(v1.id.as_str(), "v1");
        assert_eq!(v1.depart, SimTime(0.0));
        assert_eq!(v1.arrival, Some(SimTime(260.0)));
        assert_eq!(v1.route_length, 1500.5);
        assert_eq!(v1.time_loss, 200.0);
        assert_eq!(v1.waiting_time, 40.0);
        assert!(!v1.rerouted());
        assert!(v1.completed());
        assert_eq!(v1.vaporized, None);
    }

    #[test]
    fn negative_arrival_means_never_arrived() {
        let trips = load_trips_str(TRIPS, path()).unwrap();
        let v2 = &trips[1];
        assert_eq!(v2.arrival, None);
        assert_eq!(v2.vaporized.as_deref(), Some("end"));
        assert!(v2.rerouted());
        assert_eq!(v2.reroute_count, 2);
        assert_eq!(v2.waiting_time, 0.0); // defaulted
        assert!(!v2.completed());
    }

    #[test]
    fn missing_time_loss_reports_field_and_line() {
        let src = "<tripinfos>\n  <tripinfo id=\"a\" depart=\"0\" routeLength=\"10\"/>\n</tripinfos>";
        match load_trips_str(src, path()) {
            Err(LogError::MissingField { line, element, field, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(element, "tripinfo");
                assert_eq!(field, "timeLoss");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_value_is_malformed() {
        let src = r#"<tripinfos><tripinfo id="a" depart="soon" routeLength="1" timeLoss="0"/></tripinfos>"#;
        let err = load_trips_str(src, path()).unwrap_err();
        assert!(matches!(err, LogError::MalformedLog { .. }), "{err}");
        assert!(err.to_string().contains("depart"));
    }

    #[test]
    fn arrival_before_depart_is_malformed() {
        let src = r#"<tripinfos><tripinfo id="a" depart="50" arrival="10" routeLength="1" timeLoss="0"/></tripinfos>"#;
        assert!(matches!(load_trips_str(src, path()), Err(LogError::MalformedLog { .. })));
    }

    #[test]
    fn negative_time_loss_is_malformed() {
        let src = r#"<tripinfos><tripinfo id="a" depart="0" routeLength="1" timeLoss="-3"/></tripinfos>"#;
        assert!(matches!(load_trips_str(src, path()), Err(LogError::MalformedLog { .. })));
    }

    #[test]
    fn duplicate_vehicle_id_is_malformed() {
        let src = "<tripinfos>\n<tripinfo id=\"a\" depart=\"0\" routeLength=\"1\" timeLoss=\"0\"/>\n\
                   <tripinfo id=\"a\" depart=\"1\" routeLength=\"1\" timeLoss=\"0\"/>\n</tripinfos>";
        match load_trips_str(src, path()) {
            Err(LogError::MalformedLog { line, reason, .. }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("duplicate"));
            }
            other => panic!("expected MalformedLog, got {other:?}"),
        }
    }

    #[test]
    fn empty_root_is_empty_log() {
        let err = load_trips_str("<tripinfos/>", path()).unwrap_err();
        assert!(matches!(err, LogError::EmptyLog { element: "tripinfo", .. }));
    }

    #[test]
    fn wrong_root_is_malformed() {
        let err = load_trips_str(SUMMARY, path()).unwrap_err();
        assert!(err.to_string().contains("expected root element <tripinfos>"), "{err}");
    }

    #[test]
    fn truncated_document_is_malformed() {
        let src = r#"<tripinfos><tripinfo id="a" depart="0" routeLength="1" timeLoss="0"/>"#;
        assert!(matches!(load_trips_str(src, path()), Err(LogError::MalformedLog { .. })));
    }

    #[test]
    fn nested_tripinfo_elements_are_ignored() {
        let src = r#"<tripinfos>
            <tripinfo id="a" depart="0" routeLength="1" timeLoss="0">
                <tripinfo id="nested"/>
            </tripinfo>
        </tripinfos>"#;
        let trips = load_trips_str(src, path()).unwrap();
        assert_eq!(trips.len(), 1);
    }

    #[test]
    fn intended_length_gates_destination() {
        let src = r#"<tripinfos>
            <tripinfo id="a" depart="0" arrival="10" routeLength="500" intendedRouteLength="1000" timeLoss="0"/>
            <tripinfo id="b" depart="0" arrival="10" routeLength="990" intendedRouteLength="1000" timeLoss="0"/>
        </tripinfos>"#;
        let trips = load_trips_str(src, path()).unwrap();
        assert!(!trips[0].reached_destination(0.95));
        assert!(trips[1].reached_destination(0.95));
    }
}

// ── Summary log ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod summary {
    use v2x_core::SimTime;

    use super::*;

    #[test]
    fn parses_steps_in_order() {
        let steps = load_summary_str(SUMMARY, path()).unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].time, SimTime(0.0));
        assert_eq!(steps[0].mean_speed, Some(12.5));
        assert_eq!(steps[2].halting, 1);
        assert_eq!(steps[2].running, 3);
    }

    #[test]
    fn negative_mean_speed_means_no_vehicles() {
        let steps = load_summary_str(SUMMARY, path()).unwrap();
        assert_eq!(steps[1].mean_speed, None);
    }

    #[test]
    fn non_increasing_time_is_malformed() {
        let src = r#"<summary>
            <step time="0" running="1" halting="0" meanSpeed="1"/>
            <step time="0" running="1" halting="0" meanSpeed="1"/>
        </summary>"#;
        match load_summary_str(src, path()) {
            Err(LogError::MalformedLog { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected MalformedLog, got {other:?}"),
        }
    }

    #[test]
    fn gap_in_sequence_is_malformed() {
        let src = r#"<summary>
            <step time="0" running="1" halting="0" meanSpeed="1"/>
            <step time="1" running="1" halting="0" meanSpeed="1"/>
            <step time="3" running="1" halting="0" meanSpeed="1"/>
        </summary>"#;
        let err = load_summary_str(src, path()).unwrap_err();
        assert!(err.to_string().contains("gap"), "{err}");
    }

    #[test]
    fn fractional_step_length_accepted() {
        let src = r#"<summary>
            <step time="0.1" running="1" halting="0" meanSpeed="1"/>
            <step time="0.2" running="1" halting="0" meanSpeed="1"/>
            <step time="0.3" running="1" halting="0" meanSpeed="1"/>
        </summary>"#;
        assert_eq!(load_summary_str(src, path()).unwrap().len(), 3);
    }

    #[test]
    fn missing_halting_is_missing_field() {
        let src = r#"<summary><step time="0" running="1" meanSpeed="1"/></summary>"#;
        assert!(matches!(
            load_summary_str(src, path()),
            Err(LogError::MissingField { field: "halting", element: "step", .. })
        ));
    }

    #[test]
    fn no_steps_is_empty_log() {
        let src = "<summary>\n</summary>";
        assert!(matches!(load_summary_str(src, path()), Err(LogError::EmptyLog { .. })));
    }
}

// ── Files ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod files {
    use std::fs;

    use v2x_core::Variant;

    use super::*;
    use crate::{load_log, load_trips, load_variant, ParsedLog, RecordKind};

    #[test]
    fn load_variant_builds_indexed_log() {
        let dir = tempfile::tempdir().unwrap();
        let trips = dir.path().join("trips.xml");
        let summary = dir.path().join("summary.xml");
        fs::write(&trips, TRIPS).unwrap();
        fs::write(&summary, SUMMARY).unwrap();

        let log = load_variant(Variant::Blocked, &trips, &summary).unwrap();
        assert_eq!(log.variant(), Variant::Blocked);
        assert_eq!(log.vehicle_count(), 2);
        assert!(log.contains_vehicle("v2"));
        assert_eq!(log.trip("v1").unwrap().time_loss, 200.0);
        assert_eq!(log.sampling_interval(), Some(1.0));
    }

    #[test]
    fn load_log_dispatches_on_kind() {
        let dir = tempfile::tempdir().unwrap();
        let summary = dir.path().join("summary.xml");
        fs::write(&summary, SUMMARY).unwrap();

        match load_log(&summary, RecordKind::Summary).unwrap() {
            ParsedLog::Snapshots(steps) => assert_eq!(steps.len(), 3),
            other => panic!("expected snapshots, got {other:?}"),
        }
        assert!(load_log(&summary, RecordKind::Trip).is_err());
    }

    #[test]
    fn missing_file_is_io_error_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.xml");
        let err = load_trips(&missing).unwrap_err();
        assert!(matches!(err, LogError::Io { .. }));
        assert_eq!(err.path(), missing.as_path());
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bad.xml");
        fs::write(&file, [0x3c, 0xff, 0xfe, 0x3e]).unwrap();
        assert!(matches!(load_trips(&file), Err(LogError::MalformedLog { line: 1, .. })));
    }
}

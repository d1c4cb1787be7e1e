//! Unit tests for v2x-core primitives.

#[cfg(test)]
mod ids {
    use std::collections::HashMap;

    use crate::VehicleId;

    #[test]
    fn display_is_raw_string() {
        assert_eq!(VehicleId::from("flow0.3").to_string(), "flow0.3");
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(VehicleId::from("v1") < VehicleId::from("v2"));
        assert!(VehicleId::from("v10") < VehicleId::from("v9"));
    }

    #[test]
    fn map_lookup_by_str() {
        let mut m = HashMap::new();
        m.insert(VehicleId::from("veh7"), 3);
        assert_eq!(m.get("veh7"), Some(&3));
    }
}

#[cfg(test)]
mod time {
    use crate::SimTime;

    #[test]
    fn arithmetic() {
        let t = SimTime(10.5);
        assert_eq!(t.offset(4.5), SimTime(15.0));
        assert_eq!(SimTime(15.0) - SimTime(10.0), 5.0);
        assert_eq!(SimTime(3.0).since(SimTime(5.0)), -2.0);
    }

    #[test]
    fn display() {
        assert_eq!(SimTime(12.5).to_string(), "12.50s");
    }
}

#[cfg(test)]
mod variant {
    use crate::Variant;

    #[test]
    fn all_is_clean_first() {
        assert_eq!(Variant::ALL, [Variant::Clean, Variant::Blocked]);
    }

    #[test]
    fn labels() {
        assert_eq!(Variant::Clean.to_string(), "Clean");
        assert_eq!(Variant::Blocked.label(), "Blocked");
    }
}

#[cfg(test)]
mod config {
    use crate::{AnalysisConfig, CoreError};

    #[test]
    fn defaults_match_documented_values() {
        let c = AnalysisConfig::default();
        assert_eq!(c.spike_window_secs, 300.0);
        assert_eq!(c.spike_factor, 2.0);
        assert_eq!(c.min_baseline, 0.0);
        assert_eq!(c.loss_hist_bucket_secs, 30.0);
        assert_eq!(c.truncation_ratio, 0.95);
        assert_eq!(c.min_overlap_ratio, 0.9);
        c.validate().unwrap();
    }

    #[test]
    fn zero_bucket_rejected() {
        let c = AnalysisConfig { loss_hist_bucket_secs: 0.0, ..Default::default() };
        assert!(matches!(c.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn nan_factor_rejected() {
        let c = AnalysisConfig { spike_factor: f64::NAN, ..Default::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn overlap_above_one_rejected() {
        let c = AnalysisConfig { min_overlap_ratio: 1.5, ..Default::default() };
        let err = c.validate().unwrap_err().to_string();
        assert!(err.contains("min_overlap_ratio"), "{err}");
    }

    #[test]
    fn boundary_fractions_accepted() {
        let c = AnalysisConfig {
            truncation_ratio:  0.0,
            min_overlap_ratio: 1.0,
            ..Default::default()
        };
        c.validate().unwrap();
    }
}

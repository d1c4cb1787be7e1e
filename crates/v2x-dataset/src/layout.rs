//! On-disk layout of a scenario's logs.
//!
//! Logs for scenario `S` live under `<logs_root>/S-logs/`.  For each variant
//! `V` (`Clean` or `Blocked`) and each log kind `K` (`tripinfo`, `summary`)
//! the first existing file of these candidates is used:
//!
//! ```text
//! S-logs/V/S_V_K_output.xml     per-variant directory, prefixed name
//! S-logs/V/K_output.xml         per-variant directory, bare name
//! S-logs/S_V_K_output.xml       flat directory (older run scripts)
//! ```
//!
//! The names match the output-file options the run scripts pass to the
//! simulator for each variant.

use std::path::{Path, PathBuf};

use v2x_core::Variant;

use crate::{DatasetError, DatasetResult};

/// Trip-log and summary-log paths of one variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantPaths {
    pub trips:   PathBuf,
    pub summary: PathBuf,
}

/// Resolved log files of both variants of a scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioPaths {
    pub logs_dir: PathBuf,
    pub clean:    VariantPaths,
    pub blocked:  VariantPaths,
}

impl ScenarioPaths {
    /// Directory holding every log of `scenario`.
    pub fn logs_dir(scenario: &str, logs_root: &Path) -> PathBuf {
        logs_root.join(format!("{scenario}-logs"))
    }

    /// Locate all four log files, failing on the first one that is missing.
    pub fn resolve(scenario: &str, logs_root: &Path) -> DatasetResult<Self> {
        let logs_dir = Self::logs_dir(scenario, logs_root);
        if !logs_dir.is_dir() {
            return Err(DatasetError::LogsDirNotFound { path: logs_dir });
        }

        let clean = resolve_variant(scenario, &logs_dir, Variant::Clean)?;
        let blocked = resolve_variant(scenario, &logs_dir, Variant::Blocked)?;

        Ok(Self { logs_dir, clean, blocked })
    }

    pub fn variant(&self, variant: Variant) -> &VariantPaths {
        match variant {
            Variant::Clean => &self.clean,
            Variant::Blocked => &self.blocked,
        }
    }
}

/// Candidate locations for one log, in lookup order.
pub fn candidates(scenario: &str, logs_dir: &Path, variant: Variant, kind: &str) -> Vec<PathBuf> {
    let v = variant.label();
    let prefixed = format!("{scenario}_{v}_{kind}_output.xml");
    vec![
        logs_dir.join(v).join(&prefixed),
        logs_dir.join(v).join(format!("{kind}_output.xml")),
        logs_dir.join(prefixed),
    ]
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn resolve_variant(scenario: &str, logs_dir: &Path, variant: Variant) -> DatasetResult<VariantPaths> {
    Ok(VariantPaths {
        trips:   resolve_one(scenario, logs_dir, variant, "tripinfo")?,
        summary: resolve_one(scenario, logs_dir, variant, "summary")?,
    })
}

fn resolve_one(
    scenario: &str,
    logs_dir: &Path,
    variant:  Variant,
    kind:     &'static str,
) -> DatasetResult<PathBuf> {
    let searched = candidates(scenario, logs_dir, variant, kind);
    match searched.iter().find(|p| p.is_file()) {
        Some(found) => Ok(found.clone()),
        None => Err(DatasetError::MissingLog {
            scenario: scenario.to_owned(),
            variant,
            kind,
            searched,
        }),
    }
}

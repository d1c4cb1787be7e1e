//! The two runs of every scenario.

use std::fmt;

/// Which run of a scenario a log belongs to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Variant {
    /// Baseline run without the malicious roadside unit.
    Clean,
    /// Run in which vehicles receive the forged closure message.
    Blocked,
}

impl Variant {
    /// Both variants in canonical (Clean first) order.
    pub const ALL: [Variant; 2] = [Variant::Clean, Variant::Blocked];

    /// Label used in directory names, file names and chart legends.
    pub fn label(self) -> &'static str {
        match self {
            Variant::Clean => "Clean",
            Variant::Blocked => "Blocked",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

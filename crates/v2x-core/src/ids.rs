//! Vehicle identifiers.
//!
//! The simulator names vehicles with free-form strings (`veh0`, `flow3.17`,
//! …), so unlike a dense index the id is an owned string.  Matching a vehicle
//! across two variants is always a lookup by this value.

use std::borrow::Borrow;
use std::fmt;

/// Identifier of one vehicle, unique within a scenario variant.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct VehicleId(pub String);

impl VehicleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for VehicleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Lets `HashMap<VehicleId, _>` be queried with a plain `&str`.
impl Borrow<str> for VehicleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

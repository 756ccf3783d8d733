//! Kitchens.

use std::fmt;
use std::str::FromStr;

use super::UnknownVariant;
use crate::geometry::Location;

/// Index of a kitchen within the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KitchenId(pub usize);

impl fmt::Display for KitchenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kitchen#{}", self.0)
    }
}

/// Whether a participant offers their kitchen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KitchenAvailability {
    Yes,
    Maybe,
    No,
}

impl FromStr for KitchenAvailability {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "YES" => Ok(KitchenAvailability::Yes),
            "MAYBE" => Ok(KitchenAvailability::Maybe),
            "NO" => Ok(KitchenAvailability::No),
            _ => Err(UnknownVariant::new("kitchen availability", s)),
        }
    }
}

/// A physical kitchen.
///
/// Two registrations describe the same kitchen when story and location
/// match exactly; the event keeps a single entry for them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Kitchen {
    pub id: KitchenId,
    pub availability: KitchenAvailability,
    pub story: i32,
    pub location: Location,
}

impl Kitchen {
    pub fn is_at(&self, story: i32, location: &Location) -> bool {
        self.story == story && self.location == *location
    }
}

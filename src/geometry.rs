//! Planar coordinates.
//!
//! Kitchen and party positions are given in degrees but compared with
//! plain Euclidean distance. The values are only ever used to rank
//! kitchens against each other, so the planar approximation is enough.

/// A (longitude, latitude) point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

impl Location {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: &Location) -> f64 {
        distance(self, other)
    }

    /// Bit-exact key, usable in hash maps where two locations count as
    /// the same place only when both coordinates match exactly.
    pub(crate) fn key(&self) -> (u64, u64) {
        (self.longitude.to_bits(), self.latitude.to_bits())
    }
}

/// Euclidean distance between two locations.
pub fn distance(a: &Location, b: &Location) -> f64 {
    let dx = b.longitude - a.longitude;
    let dy = b.latitude - a.latitude;
    (dx * dx + dy * dy).sqrt()
}

//! Data model of a progressive dinner.
//!
//! Entities refer to each other through ids, never through references.
//! The [`Event`](crate::event::Event) owns every collection; a
//! [`Roster`] is the read-only view over participants and kitchens that
//! the algorithms need to resolve those ids.

mod group;
mod kitchen;
mod pair;
mod participant;
mod roster;

pub use group::{group_diet, Course, Group, GroupId};
pub use kitchen::{Kitchen, KitchenAvailability, KitchenId};
pub use pair::{pair_diet, Pair, PairId, PairMember};
pub use participant::{age_bracket, Diet, Gender, Participant, ParticipantId, AGE_BRACKETS};
pub use roster::Roster;

use thiserror::Error;

/// Text that does not name any variant of an enumerated attribute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

//! Read-only view used to resolve participant and kitchen ids.

use super::kitchen::{Kitchen, KitchenAvailability, KitchenId};
use super::pair::Pair;
use super::participant::{Participant, ParticipantId};
use crate::geometry::Location;

/// Borrowed participants and kitchens of an event.
///
/// Ids handed out by the event index directly into these slices.
#[derive(Debug, Clone, Copy)]
pub struct Roster<'a> {
    pub participants: &'a [Participant],
    pub kitchens: &'a [Kitchen],
}

impl<'a> Roster<'a> {
    pub fn new(participants: &'a [Participant], kitchens: &'a [Kitchen]) -> Self {
        Self {
            participants,
            kitchens,
        }
    }

    pub fn participant(&self, id: ParticipantId) -> &'a Participant {
        &self.participants[id.0]
    }

    pub fn kitchen(&self, id: KitchenId) -> &'a Kitchen {
        &self.kitchens[id.0]
    }

    pub fn kitchen_of(&self, participant: ParticipantId) -> Option<&'a Kitchen> {
        self.participant(participant)
            .kitchen
            .map(|id| self.kitchen(id))
    }

    /// Availability bucket of a participant; no kitchen counts as `No`.
    pub fn availability_of(&self, participant: ParticipantId) -> KitchenAvailability {
        self.kitchen_of(participant)
            .map_or(KitchenAvailability::No, |k| k.availability)
    }

    pub fn pair_kitchen(&self, pair: &Pair) -> Option<&'a Kitchen> {
        self.kitchen_of(pair.owner())
    }

    pub fn pair_location(&self, pair: &Pair) -> Option<Location> {
        self.pair_kitchen(pair).map(|k| k.location)
    }

    pub fn pair_average_age_bracket(&self, pair: &Pair) -> f64 {
        let a = self.participant(pair.first).age_bracket() as f64;
        let b = self.participant(pair.second).age_bracket() as f64;
        (a + b) / 2.0
    }

    pub fn pair_average_diet_value(&self, pair: &Pair) -> f64 {
        let a = self.participant(pair.first).diet_value() as f64;
        let b = self.participant(pair.second).diet_value() as f64;
        (a + b) / 2.0
    }

    pub fn pair_female_count(&self, pair: &Pair) -> usize {
        pair.members()
            .iter()
            .filter(|id| self.participant(**id).gender.is_female())
            .count()
    }
}

//! Pairs: two participants cooking in one kitchen.

use std::fmt;

use super::participant::{Diet, ParticipantId};

/// Stable identifier of a pair. Pairs can be removed from the event, so
/// ids are allocated monotonically and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairId(pub u32);

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pair#{}", self.0)
    }
}

/// Which of the two members a flag refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PairMember {
    First,
    Second,
}

/// Diet of a freshly formed pair.
///
/// Identical diets are kept; otherwise MEAT wins over NONE, NONE wins over
/// the vegetarian diets, and a VEGGIE/VEGAN mix becomes VEGAN.
pub fn pair_diet(a: Diet, b: Diet) -> Diet {
    if a == b {
        a
    } else if a == Diet::Meat || b == Diet::Meat {
        Diet::Meat
    } else if a == Diet::Any || b == Diet::Any {
        Diet::Any
    } else {
        Diet::Vegan
    }
}

/// Two participants sharing a kitchen.
///
/// The pair only stores participant ids. Its kitchen is the kitchen of
/// the member named by `kitchen_owner`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pair {
    pub id: PairId,
    pub first: ParticipantId,
    pub second: ParticipantId,
    /// Fixed when the pair is created; not re-derived after a member swap.
    pub diet: Diet,
    pub kitchen_owner: PairMember,
    /// Signed up together rather than matched by the algorithm.
    pub registered_as_pair: bool,
    /// Hosts one of its groups.
    pub has_cooked: bool,
    /// Display number, assigned by `Event::number_pairs`.
    pub number: Option<u32>,

    // Cached metrics, written by `crate::metrics`.
    pub age_difference: u32,
    pub diet_deviation: i32,
    pub female_proportion: f64,
    pub path_length: f64,
}

impl Pair {
    pub fn new(
        id: PairId,
        first: ParticipantId,
        second: ParticipantId,
        diet: Diet,
        kitchen_owner: PairMember,
    ) -> Self {
        Self {
            id,
            first,
            second,
            diet,
            kitchen_owner,
            registered_as_pair: false,
            has_cooked: false,
            number: None,
            age_difference: 0,
            diet_deviation: 0,
            female_proportion: 0.0,
            path_length: 0.0,
        }
    }

    pub fn members(&self) -> [ParticipantId; 2] {
        [self.first, self.second]
    }

    pub fn member(&self, which: PairMember) -> ParticipantId {
        match which {
            PairMember::First => self.first,
            PairMember::Second => self.second,
        }
    }

    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.first == participant || self.second == participant
    }

    /// The member whose kitchen the pair uses.
    pub fn owner(&self) -> ParticipantId {
        self.member(self.kitchen_owner)
    }

    /// The other member, if `participant` belongs to this pair.
    pub fn partner_of(&self, participant: ParticipantId) -> Option<ParticipantId> {
        if self.first == participant {
            Some(self.second)
        } else if self.second == participant {
            Some(self.first)
        } else {
            None
        }
    }

    /// Swaps `old` for `new`, keeping the seat. Returns `false` when `old`
    /// is not a member.
    pub fn replace_member(&mut self, old: ParticipantId, new: ParticipantId) -> bool {
        if self.first == old {
            self.first = new;
            true
        } else if self.second == old {
            self.second = new;
            true
        } else {
            false
        }
    }
}

//! Partner filters and ranking criteria.
//!
//! Candidates are ranked by applying the criteria in priority order; a
//! later criterion only separates candidates that every earlier one left
//! tied. Scores follow the "lower is better" convention.

use std::cmp::Ordering;

use crate::geometry::{distance, Location};
use crate::model::{PairMember, Participant, ParticipantId, Roster};

/// A soft criterion used to rank partner candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Criterion {
    /// Same diet first, then the closest diets.
    Diet,
    /// Smallest age-bracket gap first.
    Age,
    /// Different gender first.
    Gender,
}

impl Criterion {
    pub fn name(&self) -> &str {
        match self {
            Criterion::Diet => "diet",
            Criterion::Age => "age",
            Criterion::Gender => "gender",
        }
    }

    /// Score of `candidate` as partner for `participant`. Lower is better.
    pub fn score(&self, participant: &Participant, candidate: &Participant) -> u32 {
        match self {
            Criterion::Diet => participant.diet.partner_priority(candidate.diet) as u32,
            Criterion::Age => participant.age_bracket().abs_diff(candidate.age_bracket()) as u32,
            Criterion::Gender => u32::from(participant.gender == candidate.gender),
        }
    }
}

/// Hard filters: nobody pairs with themselves, meat eaters never pair
/// with vegetarians or vegans, and two people registered at the same
/// kitchen never form a pair.
pub fn is_valid_partner(participant: &Participant, candidate: &Participant) -> bool {
    if participant.id == candidate.id {
        return false;
    }
    if !participant.diet.compatible_with(candidate.diet) {
        return false;
    }
    !matches!(
        (participant.kitchen, candidate.kitchen),
        (Some(a), Some(b)) if a == b
    )
}

/// Stable sort of `candidates` by `criteria`, most important first.
pub fn rank_candidates(
    participant: &Participant,
    candidates: &mut [&Participant],
    criteria: &[Criterion],
) {
    candidates.sort_by(|a, b| {
        criteria
            .iter()
            .map(|c| c.score(participant, a).cmp(&c.score(participant, b)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

/// Picks whose kitchen a new pair uses: the kitchen closer to the
/// after-party location, ties going to the first member. A member without
/// kitchen never owns it when the other one has one.
pub fn choose_kitchen_owner(
    roster: &Roster<'_>,
    first: ParticipantId,
    second: ParticipantId,
    after_party: &Location,
) -> PairMember {
    match (roster.kitchen_of(first), roster.kitchen_of(second)) {
        (Some(a), Some(b)) => {
            if distance(&b.location, after_party) < distance(&a.location, after_party) {
                PairMember::Second
            } else {
                PairMember::First
            }
        }
        (None, Some(_)) => PairMember::Second,
        _ => PairMember::First,
    }
}

//! Pairing passes.

use std::collections::HashSet;

use log::{debug, info};

use super::config::PairConfig;
use super::rules::{choose_kitchen_owner, is_valid_partner, rank_candidates, Criterion};
use crate::error::Result;
use crate::geometry::Location;
use crate::model::{
    pair_diet, Diet, Gender, KitchenAvailability, Pair, PairMember, Participant, ParticipantId,
    Roster, AGE_BRACKETS,
};

/// Bucket combinations in the order they are matched. Pairing a kitchen
/// owner with someone without a kitchen comes first so that no kitchen
/// is left idle while kitchenless participants wait.
const PASSES: [(KitchenAvailability, KitchenAvailability); 5] = [
    (KitchenAvailability::Yes, KitchenAvailability::No),
    (KitchenAvailability::Yes, KitchenAvailability::Maybe),
    (KitchenAvailability::Yes, KitchenAvailability::Yes),
    (KitchenAvailability::Maybe, KitchenAvailability::No),
    (KitchenAvailability::Maybe, KitchenAvailability::Maybe),
];

/// A proposed pair. The event turns it into a [`Pair`] with a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub first: ParticipantId,
    pub second: ParticipantId,
    pub diet: Diet,
    pub kitchen_owner: PairMember,
}

/// Result of a pairing run.
#[derive(Debug, Clone, Default)]
pub struct PairingResult {
    /// New pairs, in the order they were formed.
    pub matches: Vec<Match>,
    /// Participants still without partner after every pass.
    pub unmatched: Vec<ParticipantId>,
}

/// Greedy multi-pass matcher.
pub struct PairRunner;

impl PairRunner {
    /// Pairs every participant that is neither cancelled nor already a
    /// member of one of `pairs`.
    pub fn run(
        roster: &Roster<'_>,
        pairs: &[Pair],
        after_party: &Location,
        config: &PairConfig,
    ) -> Result<PairingResult> {
        config.validate()?;
        let criteria = config.criteria();

        let mut taken: HashSet<ParticipantId> =
            pairs.iter().flat_map(|p| p.members()).collect();
        let pool: Vec<ParticipantId> = roster
            .participants
            .iter()
            .filter(|p| !p.cancelled && !taken.contains(&p.id))
            .map(|p| p.id)
            .collect();
        info!("pairing {} participants without partner", pool.len());

        let bucket = |availability: KitchenAvailability| -> Vec<ParticipantId> {
            pool.iter()
                .copied()
                .filter(|id| roster.availability_of(*id) == availability)
                .collect()
        };
        let yes = bucket(KitchenAvailability::Yes);
        let maybe = bucket(KitchenAvailability::Maybe);
        let no = bucket(KitchenAvailability::No);
        let by_availability = |availability: KitchenAvailability| match availability {
            KitchenAvailability::Yes => &yes,
            KitchenAvailability::Maybe => &maybe,
            KitchenAvailability::No => &no,
        };

        let mut matches = Vec::new();
        for strict in [true, false] {
            for (left_kind, right_kind) in PASSES {
                let left = by_availability(left_kind);
                let right = by_availability(right_kind);
                let buckets = if strict {
                    strict_buckets(roster, criteria[0], left, right)
                } else {
                    vec![(left.clone(), right.clone())]
                };
                let before = matches.len();
                for (l, r) in &buckets {
                    match_bucket(
                        roster,
                        l,
                        r,
                        &criteria,
                        after_party,
                        &mut taken,
                        &mut matches,
                    );
                }
                debug!(
                    "{} pass {:?} x {:?}: {} new pairs",
                    if strict { "strict" } else { "relaxed" },
                    left_kind,
                    right_kind,
                    matches.len() - before
                );
            }
        }

        let unmatched: Vec<ParticipantId> =
            pool.into_iter().filter(|id| !taken.contains(id)).collect();
        info!(
            "pairing formed {} pairs, {} participants left without partner",
            matches.len(),
            unmatched.len()
        );
        Ok(PairingResult { matches, unmatched })
    }
}

/// Matches every free participant of `left` with its best free candidate
/// from `right`.
fn match_bucket(
    roster: &Roster<'_>,
    left: &[ParticipantId],
    right: &[ParticipantId],
    criteria: &[Criterion],
    after_party: &Location,
    taken: &mut HashSet<ParticipantId>,
    matches: &mut Vec<Match>,
) {
    for &id in left {
        if taken.contains(&id) {
            continue;
        }
        let participant = roster.participant(id);
        let mut candidates: Vec<&Participant> = right
            .iter()
            .filter(|c| !taken.contains(*c))
            .map(|c| roster.participant(*c))
            .filter(|c| is_valid_partner(participant, c))
            .collect();
        rank_candidates(participant, &mut candidates, criteria);
        let Some(partner) = candidates.first() else {
            continue;
        };

        taken.insert(id);
        taken.insert(partner.id);
        matches.push(Match {
            first: id,
            second: partner.id,
            diet: pair_diet(participant.diet, partner.diet),
            kitchen_owner: choose_kitchen_owner(roster, id, partner.id, after_party),
        });
    }
}

/// Splits two buckets into sub-buckets whose members share the value of
/// the most important criterion.
fn strict_buckets(
    roster: &Roster<'_>,
    first: Criterion,
    left: &[ParticipantId],
    right: &[ParticipantId],
) -> Vec<(Vec<ParticipantId>, Vec<ParticipantId>)> {
    let select = |ids: &[ParticipantId], keep: &dyn Fn(&Participant) -> bool| {
        ids.iter()
            .copied()
            .filter(|id| keep(roster.participant(*id)))
            .collect::<Vec<_>>()
    };

    match first {
        Criterion::Diet => Diet::ALL
            .iter()
            .map(|diet| {
                let keep = |p: &Participant| p.diet == *diet;
                (select(left, &keep), select(right, &keep))
            })
            .collect(),
        Criterion::Age => (0..AGE_BRACKETS)
            .map(|bracket| {
                let keep = |p: &Participant| p.age_bracket() == bracket;
                (select(left, &keep), select(right, &keep))
            })
            .collect(),
        Criterion::Gender => {
            let female = |p: &Participant| p.gender == Gender::Female;
            let not_female = |ids: &[ParticipantId]| {
                let mut out = select(ids, &|p: &Participant| p.gender == Gender::Male);
                out.extend(select(ids, &|p: &Participant| p.gender == Gender::Other));
                out
            };
            vec![
                (select(left, &female), not_female(right)),
                (not_female(left), select(right, &female)),
            ]
        }
    }
}

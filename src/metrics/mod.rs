//! Pair and group measurements.
//!
//! Each `measure_*` function computes one statistic, stores it in the
//! matching cached field of the entity and returns it. Recomputing with
//! unchanged inputs gives the same value.
//!
//! The same quantities feed the clustering score in
//! [`grouping`](crate::grouping) and the event-level summaries in
//! [`PairMetrics`] / [`GroupMetrics`].

mod summary;

pub use summary::{summarize_groups, summarize_pairs, GroupMetrics, PairMetrics};

use crate::geometry::{distance, Location};
use crate::model::{Course, Group, Pair, PairId, Roster};

/// Absolute difference between the members' age brackets.
pub fn measure_pair_age_difference(pair: &mut Pair, roster: &Roster<'_>) -> u32 {
    let a = roster.participant(pair.first).age_bracket();
    let b = roster.participant(pair.second).age_bracket();
    pair.age_difference = a.abs_diff(b) as u32;
    pair.age_difference
}

/// Signed diet-value difference, first member minus second member.
pub fn measure_pair_diet_deviation(pair: &mut Pair, roster: &Roster<'_>) -> i32 {
    let a = roster.participant(pair.first).diet_value();
    let b = roster.participant(pair.second).diet_value();
    pair.diet_deviation = a - b;
    pair.diet_deviation
}

/// Share of female members: 0.0, 0.5 or 1.0.
pub fn measure_pair_female_proportion(pair: &mut Pair, roster: &Roster<'_>) -> f64 {
    pair.female_proportion = roster.pair_female_count(pair) as f64 / 2.0;
    pair.female_proportion
}

/// Mean of the three pairwise gaps between `values`.
fn mean_pairwise_gap(values: [f64; 3]) -> f64 {
    let [a, b, c] = values;
    ((a - b).abs() + (b - c).abs() + (a - c).abs()) / 3.0
}

/// Mean pairwise gap between the members' average age brackets.
pub fn measure_group_age_difference(
    group: &mut Group,
    members: [&Pair; 3],
    roster: &Roster<'_>,
) -> f64 {
    group.age_difference = mean_pairwise_gap(members.map(|p| roster.pair_average_age_bracket(p)));
    group.age_difference
}

/// Mean pairwise gap between the members' average diet values.
pub fn measure_group_diet_deviation(
    group: &mut Group,
    members: [&Pair; 3],
    roster: &Roster<'_>,
) -> f64 {
    group.diet_deviation = mean_pairwise_gap(members.map(|p| roster.pair_average_diet_value(p)));
    group.diet_deviation
}

/// Share of female participants among the six members.
pub fn measure_group_gender_diversity(
    group: &mut Group,
    members: [&Pair; 3],
    roster: &Roster<'_>,
) -> f64 {
    let females: usize = members.iter().map(|p| roster.pair_female_count(p)).sum();
    group.gender_diversity = females as f64 / 6.0;
    group.gender_diversity
}

/// Host kitchen locations a pair visits, as (appetizer, main, dessert).
///
/// Groups are scanned in collection order. A hit on an appetizer group
/// writes all three slots and a hit on a main group writes main and
/// dessert, so each slot ends up with the last host written to it.
/// Groups are stored course by course, which leaves every slot with its
/// own course's host. Returns `None` unless all three slots were filled.
pub fn course_hosts(
    pair: PairId,
    groups: &[Group],
    pairs: &[Pair],
    roster: &Roster<'_>,
) -> Option<[Location; 3]> {
    let mut appetizer = None;
    let mut main = None;
    let mut dessert = None;

    for group in groups.iter().filter(|g| g.contains(pair)) {
        let host = pairs
            .iter()
            .find(|p| p.id == group.kitchen_owner)
            .and_then(|p| roster.pair_location(p));
        match group.course {
            Course::Appetizer => {
                appetizer = host;
                main = host;
                dessert = host;
            }
            Course::Main => {
                main = host;
                dessert = host;
            }
            Course::Dessert => {
                dessert = host;
            }
        }
    }

    Some([appetizer?, main?, dessert?])
}

/// Appetizer → main → dessert → after-party travel distance.
pub fn measure_path_length(pair: &mut Pair, hosts: [Location; 3], after_party: &Location) -> f64 {
    let [appetizer, main, dessert] = hosts;
    pair.path_length =
        distance(&appetizer, &main) + distance(&main, &dessert) + distance(&dessert, after_party);
    pair.path_length
}

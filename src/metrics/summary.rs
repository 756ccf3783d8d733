//! Event-wide metric summaries.

use std::collections::HashSet;

use super::{
    course_hosts, measure_group_age_difference, measure_group_diet_deviation,
    measure_group_gender_diversity, measure_pair_age_difference, measure_pair_diet_deviation,
    measure_pair_female_proportion, measure_path_length,
};
use crate::geometry::Location;
use crate::model::{Course, Group, Pair, PairId, Roster};

/// Averages over all pairs and over algorithm-made pairs only.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairMetrics {
    pub pairs: usize,
    /// Participants without a partner.
    pub successors: usize,
    pub average_gender_diversity: f64,
    pub average_age_difference: f64,
    pub average_diet_deviation: f64,

    /// Pairs formed by the matching algorithm rather than registered together.
    pub algorithm_pairs: usize,
    pub algorithm_average_gender_diversity: f64,
    pub algorithm_average_age_difference: f64,
    pub algorithm_average_diet_deviation: f64,
}

/// Course counts, travel statistics and group averages.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupMetrics {
    pub appetizer_groups: usize,
    pub main_groups: usize,
    pub dessert_groups: usize,
    pub groups: usize,
    pub pairs_without_group: usize,

    pub total_path_length: f64,
    pub average_path_length: f64,
    /// Population standard deviation of the per-pair path length.
    pub path_length_std_dev: f64,

    pub average_age_difference: f64,
    pub average_diet_deviation: f64,
    pub average_gender_diversity: f64,
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Measures every pair and returns the averages.
pub fn summarize_pairs(pairs: &mut [Pair], roster: &Roster<'_>, successors: usize) -> PairMetrics {
    let mut gender = 0.0;
    let mut age = 0.0;
    let mut diet = 0.0;
    let mut algo_count = 0;
    let mut algo_gender = 0.0;
    let mut algo_age = 0.0;
    let mut algo_diet = 0.0;

    for pair in pairs.iter_mut() {
        let g = measure_pair_female_proportion(pair, roster);
        let a = measure_pair_age_difference(pair, roster) as f64;
        let d = measure_pair_diet_deviation(pair, roster) as f64;
        gender += g;
        age += a;
        diet += d;
        if !pair.registered_as_pair {
            algo_count += 1;
            algo_gender += g;
            algo_age += a;
            algo_diet += d;
        }
    }

    let count = pairs.len();
    PairMetrics {
        pairs: count,
        successors,
        average_gender_diversity: mean(gender, count),
        average_age_difference: mean(age, count),
        average_diet_deviation: mean(diet, count),
        algorithm_pairs: algo_count,
        algorithm_average_gender_diversity: mean(algo_gender, algo_count),
        algorithm_average_age_difference: mean(algo_age, algo_count),
        algorithm_average_diet_deviation: mean(algo_diet, algo_count),
    }
}

/// Measures every group and every grouped pair's path, and returns the
/// averages. Groups whose members cannot all be resolved are counted but
/// left out of the averages.
pub fn summarize_groups(
    groups: &mut [Group],
    pairs: &mut [Pair],
    roster: &Roster<'_>,
    after_party: &Location,
) -> GroupMetrics {
    let mut metrics = GroupMetrics {
        groups: groups.len(),
        ..GroupMetrics::default()
    };

    let mut age = 0.0;
    let mut diet = 0.0;
    let mut gender = 0.0;
    let mut measured = 0;
    for group in groups.iter_mut() {
        match group.course {
            Course::Appetizer => metrics.appetizer_groups += 1,
            Course::Main => metrics.main_groups += 1,
            Course::Dessert => metrics.dessert_groups += 1,
        }
        let resolved: Vec<&Pair> = group
            .pairs
            .iter()
            .filter_map(|id| pairs.iter().find(|p| p.id == *id))
            .collect();
        let Ok(members) = <[&Pair; 3]>::try_from(resolved) else {
            continue;
        };
        age += measure_group_age_difference(group, members, roster);
        diet += measure_group_diet_deviation(group, members, roster);
        gender += measure_group_gender_diversity(group, members, roster);
        measured += 1;
    }
    metrics.average_age_difference = mean(age, measured);
    metrics.average_diet_deviation = mean(diet, measured);
    metrics.average_gender_diversity = mean(gender, measured);

    let groups: &[Group] = groups;
    let grouped: HashSet<PairId> = groups.iter().flat_map(|g| g.pairs).collect();
    metrics.pairs_without_group = pairs.iter().filter(|p| !grouped.contains(&p.id)).count();

    let view: &[Pair] = pairs;
    let hosts: Vec<(usize, [Location; 3])> = view
        .iter()
        .enumerate()
        .filter(|(_, p)| grouped.contains(&p.id))
        .filter_map(|(i, p)| course_hosts(p.id, groups, view, roster).map(|h| (i, h)))
        .collect();
    let lengths: Vec<f64> = hosts
        .into_iter()
        .map(|(i, h)| measure_path_length(&mut pairs[i], h, after_party))
        .collect();

    metrics.total_path_length = lengths.iter().sum();
    metrics.average_path_length = mean(metrics.total_path_length, lengths.len());
    let squares: f64 = lengths
        .iter()
        .map(|l| (l - metrics.average_path_length).powi(2))
        .sum();
    metrics.path_length_std_dev = mean(squares, lengths.len()).sqrt();

    metrics
}

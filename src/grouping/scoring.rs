//! Weighted cluster scoring.
//!
//! Every criterion yields a score in `[0, 1]` that is multiplied by the
//! weight of its priority: 60% for the first, 25% for the second, 10% for
//! the third, 5% for the fourth and nothing for the rest.

use super::config::{GroupConfig, GroupCriterion};

/// Largest possible gap between two average diet values.
const MAX_DIET_DEVIATION: f64 = 3.0;
/// Largest possible gap between two average age brackets.
const MAX_AGE_DEVIATION: f64 = 8.0;

/// Weight of a criterion given its priority.
pub fn weighting(priority: u8) -> f64 {
    match priority {
        1 => 0.6,
        2 => 0.25,
        3 => 0.10,
        4 => 0.05,
        _ => 0.0,
    }
}

/// Score of the change in the cluster's farthest kitchen-to-party
/// distance: 1 without increase, 0 when the distance more than doubles,
/// linear in between.
pub fn path_length_score(old_max: f64, new_max: f64) -> f64 {
    let increase = new_max - old_max;
    if increase <= 0.0 {
        1.0
    } else if increase > old_max {
        0.0
    } else {
        1.0 - increase / old_max
    }
}

/// The per-pair values a cluster score depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub average_diet_value: f64,
    pub average_age_bracket: f64,
    pub female_proportion: f64,
    pub party_distance: f64,
}

/// Running totals of a cluster, updated as pairs join.
#[derive(Debug, Clone, Default)]
pub struct ClusterStats {
    len: usize,
    diet_sum: f64,
    age_sum: f64,
    female_sum: f64,
    max_distance: f64,
}

impl ClusterStats {
    pub fn push(&mut self, pair: &ScoreInputs) {
        self.len += 1;
        self.diet_sum += pair.average_diet_value;
        self.age_sum += pair.average_age_bracket;
        self.female_sum += pair.female_proportion;
        self.max_distance = self.max_distance.max(pair.party_distance);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn average(&self, sum: f64) -> f64 {
        if self.len == 0 {
            0.0
        } else {
            sum / self.len as f64
        }
    }

    pub fn average_diet_value(&self) -> f64 {
        self.average(self.diet_sum)
    }

    pub fn average_age_bracket(&self) -> f64 {
        self.average(self.age_sum)
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }
}

/// Per-criterion weights resolved from a [`GroupConfig`].
#[derive(Debug, Clone, Copy)]
pub struct Weights {
    diet: f64,
    age: f64,
    gender: f64,
    path_length: f64,
    size: f64,
}

impl Weights {
    pub fn from_config(config: &GroupConfig) -> Self {
        let w = |c| weighting(config.priority(c));
        Self {
            diet: w(GroupCriterion::Diet),
            age: w(GroupCriterion::Age),
            gender: w(GroupCriterion::Gender),
            path_length: w(GroupCriterion::PathLength),
            size: w(GroupCriterion::Size),
        }
    }

    /// Score of adding `candidate` to the cluster summarised by `stats`.
    /// Higher is better.
    pub fn score(&self, stats: &ClusterStats, candidate: &ScoreInputs) -> f64 {
        let diet = 1.0
            - (stats.average_diet_value() - candidate.average_diet_value).abs()
                / MAX_DIET_DEVIATION;
        let age = 1.0
            - (stats.average_age_bracket() - candidate.average_age_bracket).abs()
                / MAX_AGE_DEVIATION;
        let female = (stats.female_sum + candidate.female_proportion) / (stats.len + 1) as f64;
        let gender = 1.0 - 2.0 * (0.5 - female).abs();
        let path = path_length_score(
            stats.max_distance,
            stats.max_distance.max(candidate.party_distance),
        );
        let size = 1.0;

        self.diet * diet
            + self.age * age
            + self.gender * gender
            + self.path_length * path
            + self.size * size
    }
}

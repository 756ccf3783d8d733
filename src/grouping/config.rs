//! Grouping configuration.

use crate::error::{Result, SpinfoodError};

/// Criteria weighed when growing a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupCriterion {
    Diet,
    Age,
    Gender,
    PathLength,
    /// Number of pairs in the cluster. Contributes a constant term.
    Size,
}

/// Configuration of the cluster search.
///
/// # Examples
///
/// ```
/// use u_spinfood::grouping::GroupConfig;
///
/// let config = GroupConfig::default()
///     .with_priorities(2, 1, 3, 4, 5)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupConfig {
    /// Priority of similar diets (1 = most important).
    pub diet: u8,
    /// Priority of similar age brackets.
    pub age: u8,
    /// Priority of a balanced gender mix.
    pub gender: u8,
    /// Priority of short travel to the after party.
    pub path_length: u8,
    /// Priority of the cluster size.
    pub size: u8,

    /// Consecutive failed cluster attempts after which the search stops.
    pub max_failures: usize,

    /// Seed of the tie-breaking shuffle.
    pub seed: Option<u64>,

    /// Score candidates with rayon. Only effective with the `parallel`
    /// feature.
    pub parallel: bool,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            diet: 1,
            age: 2,
            gender: 3,
            path_length: 4,
            size: 5,
            max_failures: 1000,
            seed: None,
            parallel: false,
        }
    }
}

impl GroupConfig {
    pub fn with_priorities(mut self, diet: u8, age: u8, gender: u8, path_length: u8, size: u8) -> Self {
        self.diet = diet;
        self.age = age;
        self.gender = gender;
        self.path_length = path_length;
        self.size = size;
        self
    }

    pub fn with_max_failures(mut self, n: usize) -> Self {
        self.max_failures = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Priority assigned to `criterion`.
    pub fn priority(&self, criterion: GroupCriterion) -> u8 {
        match criterion {
            GroupCriterion::Diet => self.diet,
            GroupCriterion::Age => self.age,
            GroupCriterion::Gender => self.gender,
            GroupCriterion::PathLength => self.path_length,
            GroupCriterion::Size => self.size,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let mut seen = [self.diet, self.age, self.gender, self.path_length, self.size];
        seen.sort_unstable();
        if seen != [1, 2, 3, 4, 5] {
            return Err(SpinfoodError::InvalidConfig(format!(
                "grouping priorities must be a permutation of 1..=5, got {:?}",
                [self.diet, self.age, self.gender, self.path_length, self.size]
            )));
        }
        if self.max_failures == 0 {
            return Err(SpinfoodError::InvalidConfig(
                "max_failures must be > 0".into(),
            ));
        }
        Ok(())
    }
}

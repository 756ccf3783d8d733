//! Pairing configuration.

use super::rules::Criterion;
use crate::error::{Result, SpinfoodError};

/// Importance ranking of the pairing criteria.
///
/// Each field is a priority, 1 being most important. The three values
/// must be a permutation of `1..=3`.
///
/// # Examples
///
/// ```
/// use u_spinfood::pairing::PairConfig;
///
/// let config = PairConfig::default()
///     .with_age_priority(1)
///     .with_diet_priority(2)
///     .with_gender_priority(3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairConfig {
    /// Priority of similar diets.
    pub diet: u8,
    /// Priority of similar age brackets.
    pub age: u8,
    /// Priority of mixed genders.
    pub gender: u8,
}

impl Default for PairConfig {
    fn default() -> Self {
        Self {
            diet: 1,
            age: 2,
            gender: 3,
        }
    }
}

impl PairConfig {
    pub fn new(diet: u8, age: u8, gender: u8) -> Self {
        Self { diet, age, gender }
    }

    pub fn with_diet_priority(mut self, priority: u8) -> Self {
        self.diet = priority;
        self
    }

    pub fn with_age_priority(mut self, priority: u8) -> Self {
        self.age = priority;
        self
    }

    pub fn with_gender_priority(mut self, priority: u8) -> Self {
        self.gender = priority;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let mut seen = [self.diet, self.age, self.gender];
        seen.sort_unstable();
        if seen != [1, 2, 3] {
            return Err(SpinfoodError::InvalidConfig(format!(
                "pairing priorities must be a permutation of 1..=3, got diet={} age={} gender={}",
                self.diet, self.age, self.gender
            )));
        }
        Ok(())
    }

    /// Criteria from most to least important.
    pub fn criteria(&self) -> [Criterion; 3] {
        let mut ranked = [
            (self.diet, Criterion::Diet),
            (self.age, Criterion::Age),
            (self.gender, Criterion::Gender),
        ];
        ranked.sort_by_key(|(priority, _)| *priority);
        ranked.map(|(_, criterion)| criterion)
    }
}

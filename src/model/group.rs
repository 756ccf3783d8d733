//! Groups: three pairs eating one course together.

use std::fmt;

use super::pair::PairId;
use super::participant::Diet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupId(pub u32);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Course {
    Appetizer,
    Main,
    Dessert,
}

impl Course {
    pub const ALL: [Course; 3] = [Course::Appetizer, Course::Main, Course::Dessert];

    /// 1 for appetizer, 2 for main, 3 for dessert.
    pub fn index(self) -> u8 {
        match self {
            Course::Appetizer => 1,
            Course::Main => 2,
            Course::Dessert => 3,
        }
    }
}

/// Diet served to a group: any VEGAN pair makes it VEGAN, otherwise any
/// VEGGIE pair makes it VEGGIE, otherwise MEAT.
pub fn group_diet(diets: [Diet; 3]) -> Diet {
    if diets.contains(&Diet::Vegan) {
        Diet::Vegan
    } else if diets.contains(&Diet::Veggie) {
        Diet::Veggie
    } else {
        Diet::Meat
    }
}

/// Three pairs sharing one course in the kitchen of `kitchen_owner`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group {
    pub id: GroupId,
    pub pairs: [PairId; 3],
    pub diet: Diet,
    pub course: Course,
    /// Always one of `pairs`.
    pub kitchen_owner: PairId,
    pub number: Option<u32>,

    // Cached metrics, written by `crate::metrics`.
    pub age_difference: f64,
    pub diet_deviation: f64,
    pub gender_diversity: f64,
}

impl Group {
    pub fn new(
        id: GroupId,
        pairs: [PairId; 3],
        diet: Diet,
        course: Course,
        kitchen_owner: PairId,
    ) -> Self {
        Self {
            id,
            pairs,
            diet,
            course,
            kitchen_owner,
            number: None,
            age_difference: 0.0,
            diet_deviation: 0.0,
            gender_diversity: 0.0,
        }
    }

    pub fn contains(&self, pair: PairId) -> bool {
        self.pairs.contains(&pair)
    }

    /// The two members other than `pair`.
    pub fn others(&self, pair: PairId) -> Vec<PairId> {
        self.pairs.iter().copied().filter(|p| *p != pair).collect()
    }

    /// Puts `new` in the seat of `old`, handing over the kitchen if `old`
    /// hosted. Returns `false` when `old` is not a member.
    pub fn replace_pair(&mut self, old: PairId, new: PairId) -> bool {
        let Some(slot) = self.pairs.iter_mut().find(|p| **p == old) else {
            return false;
        };
        *slot = new;
        if self.kitchen_owner == old {
            self.kitchen_owner = new;
        }
        true
    }
}

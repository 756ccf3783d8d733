//! Participants and their attributes.

use std::fmt;
use std::str::FromStr;

use super::kitchen::KitchenId;
use super::UnknownVariant;

/// Index of a participant within the event. Participants are never
/// removed, so the id stays valid for the lifetime of the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticipantId(pub usize);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "participant#{}", self.0)
    }
}

/// Dietary preference.
///
/// `Any` is registered as `NONE` and means "no preference".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Diet {
    Meat,
    Any,
    Veggie,
    Vegan,
}

impl Diet {
    pub const ALL: [Diet; 4] = [Diet::Meat, Diet::Any, Diet::Veggie, Diet::Vegan];

    /// Position on the meat-to-vegan scale: MEAT -1, NONE 0, VEGGIE 1, VEGAN 2.
    pub fn value(self) -> i32 {
        match self {
            Diet::Meat => -1,
            Diet::Any => 0,
            Diet::Veggie => 1,
            Diet::Vegan => 2,
        }
    }

    /// Ordering rank: MEAT 1, NONE 2, VEGGIE 3, VEGAN 4.
    pub fn rank(self) -> u8 {
        match self {
            Diet::Meat => 1,
            Diet::Any => 2,
            Diet::Veggie => 3,
            Diet::Vegan => 4,
        }
    }

    fn is_vegetarian(self) -> bool {
        matches!(self, Diet::Veggie | Diet::Vegan)
    }

    /// Meat eaters never share a table with vegetarians or vegans.
    pub fn compatible_with(self, other: Diet) -> bool {
        !((self == Diet::Meat && other.is_vegetarian())
            || (other == Diet::Meat && self.is_vegetarian()))
    }

    /// How desirable `candidate` is as a partner for someone with this
    /// diet, 1 being the best match.
    pub fn partner_priority(self, candidate: Diet) -> u8 {
        let order = match self {
            Diet::Meat => [Diet::Meat, Diet::Any, Diet::Veggie, Diet::Vegan],
            Diet::Any => [Diet::Any, Diet::Meat, Diet::Veggie, Diet::Vegan],
            Diet::Veggie => [Diet::Veggie, Diet::Vegan, Diet::Any, Diet::Meat],
            Diet::Vegan => [Diet::Vegan, Diet::Veggie, Diet::Any, Diet::Meat],
        };
        order
            .iter()
            .position(|d| *d == candidate)
            .map_or(u8::MAX, |i| i as u8 + 1)
    }

    /// Name used in exported records; no preference is written as `ANY`.
    pub fn export_label(self) -> &'static str {
        match self {
            Diet::Meat => "MEAT",
            Diet::Any => "ANY",
            Diet::Veggie => "VEGGIE",
            Diet::Vegan => "VEGAN",
        }
    }
}

impl FromStr for Diet {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MEAT" => Ok(Diet::Meat),
            "NONE" => Ok(Diet::Any),
            "VEGGIE" => Ok(Diet::Veggie),
            "VEGAN" => Ok(Diet::Vegan),
            _ => Err(UnknownVariant::new("diet", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Gender {
    Female,
    Male,
    Other,
}

impl Gender {
    pub fn is_female(self) -> bool {
        self == Gender::Female
    }
}

impl FromStr for Gender {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FEMALE" => Ok(Gender::Female),
            "MALE" => Ok(Gender::Male),
            "OTHER" => Ok(Gender::Other),
            _ => Err(UnknownVariant::new("gender", s)),
        }
    }
}

/// Number of age brackets returned by [`age_bracket`].
pub const AGE_BRACKETS: u8 = 9;

/// Maps an age onto one of nine brackets:
/// ≤17, 18–23, 24–27, 28–30, 31–35, 36–41, 42–46, 47–56, 57+.
pub fn age_bracket(age: u32) -> u8 {
    const UPPER_BOUNDS: [u32; 8] = [17, 23, 27, 30, 35, 41, 46, 56];
    UPPER_BOUNDS
        .iter()
        .position(|&bound| age <= bound)
        .map_or(AGE_BRACKETS - 1, |i| i as u8)
}

/// A registered person.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    pub id: ParticipantId,
    /// Identifier from the registration data.
    pub external_id: String,
    pub name: String,
    pub diet: Diet,
    pub age: u32,
    pub gender: Gender,
    /// Usable kitchen, if any. Shared with everyone registered at the
    /// same address.
    pub kitchen: Option<KitchenId>,
    /// Set once the participant withdraws; cancelled participants are
    /// never offered as successors.
    pub cancelled: bool,
}

impl Participant {
    pub fn age_bracket(&self) -> u8 {
        age_bracket(self.age)
    }

    pub fn diet_value(&self) -> i32 {
        self.diet.value()
    }
}

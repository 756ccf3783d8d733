//! Registration import.
//!
//! A registration row is a list of text fields:
//!
//! | index | field |
//! |---|---|
//! | 0 | running number (ignored) |
//! | 1, 2 | external id, name |
//! | 3 | diet: MEAT, NONE, VEGGIE or VEGAN |
//! | 4 | age |
//! | 5 | gender: FEMALE, MALE or OTHER |
//! | 6 | kitchen: YES, MAYBE or NO |
//! | 7 | floor, empty meaning 0 |
//! | 8, 9 | kitchen longitude, latitude |
//! | 10..=13 | id, name, age and gender of a co-registered partner |
//!
//! Enumerations are case-insensitive. Numbers are read as decimals and
//! truncated, so `"21.0"` is a valid age.

use std::io::Read;

use log::{debug, info};

use super::Event;
use crate::error::{Result, SpinfoodError};
use crate::geometry::Location;
use crate::model::{
    Diet, Gender, Kitchen, KitchenAvailability, KitchenId, Pair, PairMember, Participant,
    ParticipantId,
};

const MIN_FIELDS: usize = 7;
const PARTNER_FIELDS: usize = 14;

const DIET: usize = 3;
const AGE: usize = 4;
const GENDER: usize = 5;
const KITCHEN: usize = 6;
const STORY: usize = 7;
const LONGITUDE: usize = 8;
const LATITUDE: usize = 9;
const PARTNER_ID: usize = 10;
const PARTNER_NAME: usize = 11;
const PARTNER_AGE: usize = 12;
const PARTNER_GENDER: usize = 13;

#[derive(Debug, Clone, PartialEq)]
struct Person {
    external_id: String,
    name: String,
    age: u32,
    gender: Gender,
}

#[derive(Debug, Clone, PartialEq)]
struct KitchenEntry {
    availability: KitchenAvailability,
    story: i32,
    location: Location,
}

/// One parsed row, not yet part of any event.
#[derive(Debug, Clone, PartialEq)]
struct Registration {
    person: Person,
    diet: Diet,
    kitchen: Option<KitchenEntry>,
    partner: Option<Person>,
}

fn field<'r, S: AsRef<str>>(row: &'r [S], index: usize) -> &'r str {
    row.get(index).map_or("", |s| s.as_ref().trim())
}

fn parse_enum<T: std::str::FromStr<Err = crate::model::UnknownVariant>>(
    row_index: usize,
    index: usize,
    text: &str,
) -> Result<T> {
    text.parse::<T>()
        .map_err(|e| SpinfoodError::invalid_input(row_index, index, e.to_string()))
}

fn parse_number(row_index: usize, index: usize, text: &str) -> Result<f64> {
    let value: f64 = text.parse().map_err(|_| {
        SpinfoodError::invalid_input(row_index, index, format!("'{text}' is not a number"))
    })?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SpinfoodError::invalid_input(
            row_index,
            index,
            format!("'{text}' is not a finite number"),
        ))
    }
}

fn parse_age(row_index: usize, index: usize, text: &str) -> Result<u32> {
    let value = parse_number(row_index, index, text)?;
    if value < 0.0 {
        return Err(SpinfoodError::invalid_input(
            row_index,
            index,
            format!("negative age '{text}'"),
        ));
    }
    Ok(value as u32)
}

fn parse_row<S: AsRef<str>>(row_index: usize, row: &[S]) -> Result<Registration> {
    if row.len() < MIN_FIELDS {
        return Err(SpinfoodError::invalid_input(
            row_index,
            row.len(),
            format!("expected at least {MIN_FIELDS} fields, got {}", row.len()),
        ));
    }

    let person = Person {
        external_id: field(row, 1).to_string(),
        name: field(row, 2).to_string(),
        age: parse_age(row_index, AGE, field(row, AGE))?,
        gender: parse_enum(row_index, GENDER, field(row, GENDER))?,
    };
    let diet: Diet = parse_enum(row_index, DIET, field(row, DIET))?;
    let availability: KitchenAvailability = parse_enum(row_index, KITCHEN, field(row, KITCHEN))?;

    let kitchen = match availability {
        KitchenAvailability::No => None,
        _ => {
            let story = match field(row, STORY) {
                "" => 0,
                text => parse_number(row_index, STORY, text)? as i32,
            };
            let coordinate = |index: usize| match field(row, index) {
                "" => Err(SpinfoodError::invalid_input(
                    row_index,
                    index,
                    "kitchen offered without coordinates",
                )),
                text => parse_number(row_index, index, text),
            };
            Some(KitchenEntry {
                availability,
                story,
                location: Location::new(coordinate(LONGITUDE)?, coordinate(LATITUDE)?),
            })
        }
    };

    let partner = if row.len() >= PARTNER_FIELDS && !field(row, PARTNER_ID).is_empty() {
        Some(Person {
            external_id: field(row, PARTNER_ID).to_string(),
            name: field(row, PARTNER_NAME).to_string(),
            age: parse_age(row_index, PARTNER_AGE, field(row, PARTNER_AGE))?,
            gender: parse_enum(row_index, PARTNER_GENDER, field(row, PARTNER_GENDER))?,
        })
    } else {
        None
    };

    Ok(Registration {
        person,
        diet,
        kitchen,
        partner,
    })
}

/// Reads registration rows from CSV text with a header line.
///
/// Rows may differ in length; every field is returned as written.
pub fn read_registrations<R: Read>(reader: R) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

impl Event {
    /// The kitchen registered at exactly this floor and location.
    pub fn find_existing_kitchen(&self, story: i32, location: &Location) -> Option<KitchenId> {
        self.kitchens
            .iter()
            .find(|k| k.is_at(story, location))
            .map(|k| k.id)
    }

    fn register_kitchen(&mut self, entry: &KitchenEntry) -> KitchenId {
        if let Some(id) = self.find_existing_kitchen(entry.story, &entry.location) {
            return id;
        }
        let id = KitchenId(self.kitchens.len());
        self.kitchens.push(Kitchen {
            id,
            availability: entry.availability,
            story: entry.story,
            location: entry.location,
        });
        id
    }

    fn register_participant(
        &mut self,
        person: Person,
        diet: Diet,
        kitchen: Option<KitchenId>,
    ) -> ParticipantId {
        let id = ParticipantId(self.participants.len());
        self.participants.push(Participant {
            id,
            external_id: person.external_id,
            name: person.name,
            diet,
            age: person.age,
            gender: person.gender,
            kitchen,
            cancelled: false,
        });
        id
    }

    /// Adds the registrations in `rows` to the event.
    ///
    /// Every row is parsed before anything is added, so a malformed row
    /// leaves the event untouched. Registrations at an already known
    /// floor and location share that kitchen. A row carrying a partner
    /// creates a pre-registered pair; the partner inherits the row's
    /// diet and the first person's kitchen serves the pair.
    ///
    /// Returns the number of participants added.
    pub fn import_registrations<R, S>(&mut self, rows: &[R]) -> Result<usize>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let parsed = rows
            .iter()
            .enumerate()
            .map(|(i, row)| parse_row(i, row.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let before = self.participants.len();
        let kitchens_before = self.kitchens.len();
        for registration in parsed {
            let kitchen = registration
                .kitchen
                .as_ref()
                .map(|entry| self.register_kitchen(entry));
            let first = self.register_participant(registration.person, registration.diet, kitchen);

            if let Some(partner) = registration.partner {
                let second = self.register_participant(partner, registration.diet, None);
                let id = self.allocate_pair_id();
                let mut pair = Pair::new(id, first, second, registration.diet, PairMember::First);
                pair.registered_as_pair = true;
                debug!("registered {} and {} together as {}", first, second, id);
                self.pairs.push(pair);
            }
        }

        let added = self.participants.len() - before;
        info!(
            "imported {} registrations: {} participants, {} new kitchens",
            rows.len(),
            added,
            self.kitchens.len() - kitchens_before
        );
        Ok(added)
    }
}

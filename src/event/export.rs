//! Assignment export.

use std::io::Write;

use log::info;

use super::Event;
use crate::error::Result;
use crate::model::{Course, Diet, PairMember};

/// One exported line: a pair together with the groups it eats in.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssignmentRecord {
    pub first_name: String,
    pub second_name: String,
    pub registered_as_pair: bool,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub diet: Diet,
    pub pair_number: Option<u32>,
    pub appetizer_group: Option<u32>,
    pub main_group: Option<u32>,
    pub dessert_group: Option<u32>,
    pub second_owns_kitchen: bool,
    /// Course the pair hosts, if any.
    pub cooks: Option<Course>,
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl AssignmentRecord {
    /// The twelve text fields in export order.
    pub fn fields(&self) -> Vec<String> {
        vec![
            self.first_name.clone(),
            self.second_name.clone(),
            self.registered_as_pair.to_string(),
            optional(self.longitude),
            optional(self.latitude),
            self.diet.export_label().to_string(),
            optional(self.pair_number),
            optional(self.appetizer_group),
            optional(self.main_group),
            optional(self.dessert_group),
            self.second_owns_kitchen.to_string(),
            optional(self.cooks.map(Course::index)),
        ]
    }
}

impl Event {
    /// One record per pair that eats an appetizer, in pair order.
    ///
    /// Group columns hold group numbers; unnumbered groups and missing
    /// courses are left empty.
    pub fn assignment_records(&self) -> Vec<AssignmentRecord> {
        let roster = self.roster();
        self.pairs
            .iter()
            .filter_map(|pair| {
                let mut courses = [None; 3];
                let mut in_appetizer = false;
                for group in self.groups.iter().filter(|g| g.contains(pair.id)) {
                    let slot = usize::from(group.course.index() - 1);
                    courses[slot] = group.number;
                    in_appetizer |= group.course == Course::Appetizer;
                }
                if !in_appetizer {
                    return None;
                }
                let [appetizer_group, main_group, dessert_group] = courses;
                let location = roster.pair_location(pair);
                Some(AssignmentRecord {
                    first_name: roster.participant(pair.first).name.clone(),
                    second_name: roster.participant(pair.second).name.clone(),
                    registered_as_pair: pair.registered_as_pair,
                    longitude: location.map(|l| l.longitude),
                    latitude: location.map(|l| l.latitude),
                    diet: pair.diet,
                    pair_number: pair.number,
                    appetizer_group,
                    main_group,
                    dessert_group,
                    second_owns_kitchen: pair.kitchen_owner == PairMember::Second,
                    cooks: self.which_course(pair.id),
                })
            })
            .collect()
    }

    /// Writes [`assignment_records`](Event::assignment_records) as
    /// semicolon-separated lines without header.
    pub fn write_assignments<W: Write>(&self, writer: W) -> Result<usize> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .from_writer(writer);

        let records = self.assignment_records();
        for record in &records {
            out.write_record(record.fields())?;
        }
        out.flush()?;
        info!("exported {} pair assignments", records.len());
        Ok(records.len())
    }
}

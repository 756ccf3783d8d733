//! Builders shared by the unit tests.

use crate::geometry::Location;
use crate::model::{
    pair_diet, Diet, Gender, Kitchen, KitchenAvailability, KitchenId, Pair, PairId, PairMember,
    Participant, ParticipantId, Roster,
};

#[derive(Debug, Default)]
pub(crate) struct Fixture {
    pub participants: Vec<Participant>,
    pub kitchens: Vec<Kitchen>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kitchen(
        &mut self,
        availability: KitchenAvailability,
        story: i32,
        longitude: f64,
        latitude: f64,
    ) -> KitchenId {
        let id = KitchenId(self.kitchens.len());
        self.kitchens.push(Kitchen {
            id,
            availability,
            story,
            location: Location::new(longitude, latitude),
        });
        id
    }

    pub fn person(
        &mut self,
        name: &str,
        diet: Diet,
        age: u32,
        gender: Gender,
        kitchen: Option<KitchenId>,
    ) -> ParticipantId {
        let id = ParticipantId(self.participants.len());
        self.participants.push(Participant {
            id,
            external_id: format!("ext-{}", id.0),
            name: name.to_string(),
            diet,
            age,
            gender,
            kitchen,
            cancelled: false,
        });
        id
    }

    /// Pair owned by the first member, diet derived from both members.
    pub fn pair(&self, id: u32, first: ParticipantId, second: ParticipantId) -> Pair {
        let diet = pair_diet(
            self.participants[first.0].diet,
            self.participants[second.0].diet,
        );
        Pair::new(PairId(id), first, second, diet, PairMember::First)
    }

    /// A pair whose first member owns a fresh YES kitchen at the given spot.
    pub fn hosting_pair(&mut self, id: u32, diet: Diet, longitude: f64, latitude: f64) -> Pair {
        let kitchen = self.kitchen(KitchenAvailability::Yes, 0, longitude, latitude);
        let a = self.person("host", diet, 30, Gender::Female, Some(kitchen));
        let b = self.person("guest", diet, 30, Gender::Male, None);
        self.pair(id, a, b)
    }

    pub fn roster(&self) -> Roster<'_> {
        Roster::new(&self.participants, &self.kitchens)
    }
}

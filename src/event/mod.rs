//! The event orchestrator.
//!
//! [`Event`] owns the four collections of a progressive dinner
//! (participants, kitchens, pairs and groups) and runs the algorithms
//! against them. The algorithms themselves only return proposals; every
//! mutation of the collections happens here.
//!
//! # Successor pools
//!
//! The successor pools are not stored. A successor participant is a
//! participant that is neither cancelled nor a member of a pair, and a
//! successor pair is a pair that belongs to no group. Both pools are
//! recomputed on every query, so they can never go stale.
//!
//! # Example
//!
//! ```
//! use u_spinfood::event::Event;
//! use u_spinfood::geometry::Location;
//! use u_spinfood::pairing::PairConfig;
//!
//! let rows = vec![
//!     vec!["0", "a1", "Person1", "veggie", "21", "male", "maybe", "3.0", "8.6733", "50.5941"],
//!     vec!["1", "b2", "Person2", "veggie", "26", "male", "yes", "1.0", "8.7189", "50.5909"],
//! ];
//!
//! let mut event = Event::new(Location::new(8.6746, 50.5864));
//! event.import_registrations(&rows).unwrap();
//! let created = event.create_pairs(&PairConfig::new(2, 1, 3)).unwrap();
//! assert_eq!(created.len(), 1);
//! assert!(event.successor_participants().is_empty());
//! ```

mod export;
mod registration;
mod replacement;

pub use export::AssignmentRecord;
pub use registration::read_registrations;
pub use replacement::CancellationReport;

use std::collections::HashSet;

use log::info;

use crate::error::{Result, SpinfoodError};
use crate::geometry::Location;
use crate::grouping::{GroupConfig, GroupRunner};
use crate::metrics::{summarize_groups, summarize_pairs, GroupMetrics, PairMetrics};
use crate::model::{
    pair_diet, Course, Group, GroupId, Kitchen, Pair, PairId, Participant, ParticipantId, Roster,
};
use crate::pairing::{choose_kitchen_owner, is_valid_partner, PairConfig, PairRunner};

/// A progressive dinner: who takes part, who cooks with whom, and who
/// eats which course where.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    participants: Vec<Participant>,
    kitchens: Vec<Kitchen>,
    pairs: Vec<Pair>,
    groups: Vec<Group>,
    after_party: Location,
    next_pair_id: u32,
    next_group_id: u32,
}

impl Event {
    /// Creates an empty event whose evening ends at `after_party`.
    pub fn new(after_party: Location) -> Self {
        Self {
            participants: Vec::new(),
            kitchens: Vec::new(),
            pairs: Vec::new(),
            groups: Vec::new(),
            after_party,
            next_pair_id: 1,
            next_group_id: 1,
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn kitchens(&self) -> &[Kitchen] {
        &self.kitchens
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn after_party(&self) -> &Location {
        &self.after_party
    }

    /// Read-only view used by the algorithms.
    pub fn roster(&self) -> Roster<'_> {
        Roster::new(&self.participants, &self.kitchens)
    }

    pub fn participant(&self, id: ParticipantId) -> Result<&Participant> {
        self.participants
            .get(id.0)
            .ok_or(SpinfoodError::UnknownParticipant(id))
    }

    pub fn pair(&self, id: PairId) -> Result<&Pair> {
        self.pairs
            .iter()
            .find(|p| p.id == id)
            .ok_or(SpinfoodError::UnknownPair(id))
    }

    pub fn group(&self, id: GroupId) -> Result<&Group> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .ok_or(SpinfoodError::UnknownGroup(id))
    }

    fn pair_index(&self, id: PairId) -> Result<usize> {
        self.pairs
            .iter()
            .position(|p| p.id == id)
            .ok_or(SpinfoodError::UnknownPair(id))
    }

    fn allocate_pair_id(&mut self) -> PairId {
        let id = PairId(self.next_pair_id);
        self.next_pair_id += 1;
        id
    }

    fn allocate_group_id(&mut self) -> GroupId {
        let id = GroupId(self.next_group_id);
        self.next_group_id += 1;
        id
    }

    fn paired_participants(&self) -> HashSet<ParticipantId> {
        self.pairs.iter().flat_map(|p| p.members()).collect()
    }

    fn grouped_pairs(&self) -> HashSet<PairId> {
        self.groups.iter().flat_map(|g| g.pairs).collect()
    }

    /// Participants that are neither cancelled nor in a pair, in
    /// registration order.
    pub fn successor_participants(&self) -> Vec<ParticipantId> {
        let paired = self.paired_participants();
        self.participants
            .iter()
            .filter(|p| !p.cancelled && !paired.contains(&p.id))
            .map(|p| p.id)
            .collect()
    }

    /// Pairs that belong to no group, in collection order.
    pub fn successor_pairs(&self) -> Vec<PairId> {
        let grouped = self.grouped_pairs();
        self.pairs
            .iter()
            .filter(|p| !grouped.contains(&p.id))
            .map(|p| p.id)
            .collect()
    }

    /// Runs the pairing passes over the successor participants and
    /// commits every match. Returns the ids of the new pairs.
    pub fn create_pairs(&mut self, config: &PairConfig) -> Result<Vec<PairId>> {
        let result = PairRunner::run(&self.roster(), &self.pairs, &self.after_party, config)?;

        let mut created = Vec::with_capacity(result.matches.len());
        for m in result.matches {
            let id = self.allocate_pair_id();
            self.pairs
                .push(Pair::new(id, m.first, m.second, m.diet, m.kitchen_owner));
            created.push(id);
        }
        info!(
            "created {} pairs, {} participants without partner",
            created.len(),
            result.unmatched.len()
        );
        Ok(created)
    }

    /// Runs the cluster search over the successor pairs, commits every
    /// cluster and renumbers the groups. Returns the ids of the new
    /// groups.
    pub fn create_groups(&mut self, config: &GroupConfig) -> Result<Vec<GroupId>> {
        let result = GroupRunner::run(
            &self.roster(),
            &self.pairs,
            &self.groups,
            &self.after_party,
            config,
        )?;

        let mut created = Vec::with_capacity(result.group_count());
        for draft in result.clusters.into_iter().flatten() {
            let id = self.allocate_group_id();
            if let Some(owner) = self.pairs.iter_mut().find(|p| p.id == draft.kitchen_owner) {
                owner.has_cooked = true;
            }
            self.groups.push(Group::new(
                id,
                draft.pairs,
                draft.diet,
                draft.course,
                draft.kitchen_owner,
            ));
            created.push(id);
        }
        self.number_groups();
        info!(
            "created {} groups, {} pairs without group",
            created.len(),
            result.leftover.len()
        );
        Ok(created)
    }

    /// Numbers the pairs 1, 2, 3, ... in collection order.
    pub fn number_pairs(&mut self) {
        for (i, pair) in self.pairs.iter_mut().enumerate() {
            pair.number = Some(i as u32 + 1);
        }
    }

    /// Numbers the groups 1, 2, 3, ... in collection order.
    pub fn number_groups(&mut self) {
        for (i, group) in self.groups.iter_mut().enumerate() {
            group.number = Some(i as u32 + 1);
        }
    }

    /// The course `pair` cooks, if it hosts a group.
    pub fn which_course(&self, pair: PairId) -> Option<Course> {
        self.groups
            .iter()
            .find(|g| g.kitchen_owner == pair)
            .map(|g| g.course)
    }

    /// Groups reachable from `group` in two steps: every group sharing a
    /// pair with it, then every group sharing a pair with those. Always
    /// contains `group` itself; collection order.
    pub fn related_groups(&self, group: GroupId) -> Result<Vec<GroupId>> {
        let start = self.group(group)?;
        let first: Vec<&Group> = self
            .groups
            .iter()
            .filter(|g| g.pairs.iter().any(|p| start.contains(*p)))
            .collect();
        let reached: HashSet<PairId> = first.iter().flat_map(|g| g.pairs).collect();
        Ok(self
            .groups
            .iter()
            .filter(|g| g.pairs.iter().any(|p| reached.contains(p)))
            .map(|g| g.id)
            .collect())
    }

    /// Pairs two successor participants by hand.
    ///
    /// Both must exist, be neither cancelled nor paired, and pass the
    /// pairing hard filters. The kitchen owner is chosen the way the
    /// pairing passes choose it.
    pub fn add_pair(&mut self, first: ParticipantId, second: ParticipantId) -> Result<PairId> {
        let a = self.participant(first)?;
        let b = self.participant(second)?;
        let paired = self.paired_participants();
        for p in [a, b] {
            if p.cancelled {
                return Err(SpinfoodError::IncompatiblePair(format!("{} has cancelled", p.id)));
            }
            if paired.contains(&p.id) {
                return Err(SpinfoodError::IncompatiblePair(format!(
                    "{} already has a partner",
                    p.id
                )));
            }
        }
        if !is_valid_partner(a, b) {
            return Err(SpinfoodError::IncompatiblePair(format!(
                "{} and {} violate a pairing rule",
                a.id, b.id
            )));
        }

        let diet = pair_diet(a.diet, b.diet);
        let owner = choose_kitchen_owner(&self.roster(), first, second, &self.after_party);
        let id = self.allocate_pair_id();
        self.pairs.push(Pair::new(id, first, second, diet, owner));
        info!("manually paired {} and {} as {}", first, second, id);
        Ok(id)
    }

    /// Measures every pair and returns the event-wide averages.
    pub fn pair_metrics(&mut self) -> PairMetrics {
        let successors = self.successor_participants().len();
        let roster = Roster::new(&self.participants, &self.kitchens);
        summarize_pairs(&mut self.pairs, &roster, successors)
    }

    /// Measures every group and every grouped pair's path.
    pub fn group_metrics(&mut self) -> GroupMetrics {
        let roster = Roster::new(&self.participants, &self.kitchens);
        summarize_groups(&mut self.groups, &mut self.pairs, &roster, &self.after_party)
    }
}

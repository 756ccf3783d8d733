//! Cancellation handling.
//!
//! A cancelled participant is replaced inside their pair by a successor
//! participant when one fits. A pair that loses both members, or whose
//! remaining member finds no new partner, leaves the event; its groups
//! then take in a successor pair that fits all of their remaining
//! members, or are dissolved together with every other group of those
//! members.

use std::collections::HashSet;

use log::{debug, info};

use super::Event;
use crate::error::Result;
use crate::grouping::{
    existing_bookings, is_valid_candidate, KitchenLoad, PairView, MAX_KITCHEN_USES,
};
use crate::model::{group_diet, Course, GroupId, Pair, PairId, PairMember, ParticipantId};
use crate::pairing::is_valid_partner;

/// What a call to [`Event::handle_cancellations`] changed.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CancellationReport {
    /// Participants marked as cancelled.
    pub cancelled: Vec<ParticipantId>,
    /// (cancelled participant, successor that took their seat).
    pub replaced_participants: Vec<(ParticipantId, ParticipantId)>,
    /// Pairs removed from the event.
    pub removed_pairs: Vec<PairId>,
    /// (removed pair, successor pair that took its place in the groups).
    pub replaced_pairs: Vec<(PairId, PairId)>,
    pub dissolved_groups: Vec<GroupId>,
}

impl Event {
    /// Withdraws `cancelling` from the event and repairs the pairs and
    /// groups they were part of.
    ///
    /// Fails without changing anything if an id is unknown. Everything
    /// else, including a repair that finds no successor, succeeds.
    pub fn handle_cancellations(
        &mut self,
        cancelling: &[ParticipantId],
    ) -> Result<CancellationReport> {
        for id in cancelling {
            self.participant(*id)?;
        }

        let mut report = CancellationReport::default();
        let mut leaving = HashSet::new();
        for id in cancelling {
            if leaving.insert(*id) {
                self.participants[id.0].cancelled = true;
                report.cancelled.push(*id);
            }
        }

        let affected: Vec<(PairId, [bool; 2])> = self
            .pairs
            .iter()
            .map(|p| (p.id, p.members().map(|m| leaving.contains(&m))))
            .filter(|(_, gone)| gone.contains(&true))
            .collect();

        for (pair, gone) in affected {
            match gone {
                [true, true] => {
                    let index = self.pair_index(pair)?;
                    self.pairs.remove(index);
                    report.removed_pairs.push(pair);
                    debug!("{} left the event completely", pair);
                    self.replace_pair(pair, &mut report);
                }
                [true, false] => {
                    let member = self.pair(pair)?.first;
                    self.replace_participant(pair, member, &mut report)?;
                }
                [false, true] => {
                    let member = self.pair(pair)?.second;
                    self.replace_participant(pair, member, &mut report)?;
                }
                [false, false] => {}
            }
        }

        info!(
            "{} cancellations: {} participants and {} pairs replaced, {} pairs removed, {} groups dissolved",
            report.cancelled.len(),
            report.replaced_participants.len(),
            report.replaced_pairs.len(),
            report.removed_pairs.len(),
            report.dissolved_groups.len()
        );
        Ok(report)
    }

    /// Gives `leaving`'s seat in `pair` to the first fitting successor
    /// participant, or removes the pair.
    ///
    /// The new pair must keep a kitchen: when the remaining member has
    /// none the successor has to bring one. The remaining member keeps or
    /// takes over the kitchen when they have one. A grouped pair whose
    /// kitchen changes must still fit all of its groups.
    fn replace_participant(
        &mut self,
        pair: PairId,
        leaving: ParticipantId,
        report: &mut CancellationReport,
    ) -> Result<()> {
        let index = self.pair_index(pair)?;
        let Some(remaining) = self.pairs[index].partner_of(leaving) else {
            return Ok(());
        };

        let roster = self.roster();
        let stay = roster.participant(remaining);
        let stay_has_kitchen = stay.kitchen.is_some();
        let paired = self.paired_participants();
        let updated = roster
            .participants
            .iter()
            .filter(|p| !p.cancelled && !paired.contains(&p.id))
            .filter(|c| is_valid_partner(stay, c) && (stay_has_kitchen || c.kitchen.is_some()))
            .map(|c| {
                let mut updated = self.pairs[index].clone();
                updated.replace_member(leaving, c.id);
                if stay_has_kitchen {
                    updated.kitchen_owner = if updated.first == remaining {
                        PairMember::First
                    } else {
                        PairMember::Second
                    };
                }
                (c.id, updated)
            })
            .find(|(_, updated)| self.fits_groups(updated));

        match updated {
            Some((new, updated)) => {
                debug!("{} takes the seat of {} in {}", new, leaving, pair);
                self.pairs[index] = updated;
                report.replaced_participants.push((leaving, new));
            }
            None => {
                self.pairs.remove(index);
                report.removed_pairs.push(pair);
                debug!("no partner for {}, {} removed", remaining, pair);
                self.replace_pair(pair, report);
            }
        }
        Ok(())
    }

    /// Whether `updated` may replace the pair with the same id in every
    /// group it belongs to.
    ///
    /// A kitchen change must keep the kitchens of each group distinct, stay
    /// under the kitchen limits and find the new location free for every
    /// course the pair hosts.
    fn fits_groups(&self, updated: &Pair) -> bool {
        let mut mates = Vec::new();
        let mut hosted = Vec::new();
        for group in self.groups.iter().filter(|g| g.contains(updated.id)) {
            mates.extend(group.others(updated.id));
            if group.kitchen_owner == updated.id {
                hosted.push(group.course);
            }
        }
        if mates.is_empty() {
            return true;
        }

        let roster = self.roster();
        let Some(view) = PairView::new(updated, &roster, &self.after_party) else {
            return false;
        };
        let current = self
            .pairs
            .iter()
            .find(|p| p.id == updated.id)
            .and_then(|p| roster.pair_kitchen(p));
        if current.map(|k| k.id) == Some(view.kitchen) {
            return true;
        }

        let others: Vec<Pair> = self
            .pairs
            .iter()
            .filter(|p| p.id != updated.id)
            .cloned()
            .collect();
        let load = KitchenLoad::new(&others, &roster);
        let bookings = existing_bookings(&others, &self.groups, &roster);
        let fits = others
            .iter()
            .filter(|p| mates.contains(&p.id))
            .filter_map(|p| PairView::new(p, &roster, &self.after_party))
            .all(|mate| is_valid_candidate(&mate, &view, &load));
        let under_limit = load.cooked(view.kitchen) + hosted.len() <= MAX_KITCHEN_USES;
        let free = hosted
            .iter()
            .all(|course| !bookings.is_booked(&view.location, *course));
        fits && under_limit && free
    }

    /// Fills the seats `removed` held in its groups with one successor
    /// pair, or dissolves those groups. `removed` must already be gone
    /// from the pair collection.
    fn replace_pair(&mut self, removed: PairId, report: &mut CancellationReport) {
        let affected: Vec<usize> = self
            .groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.contains(removed))
            .map(|(i, _)| i)
            .collect();
        if affected.is_empty() {
            return;
        }

        let mut remaining = Vec::new();
        let mut hosted = Vec::new();
        for &i in &affected {
            let group = &self.groups[i];
            for pair in group.others(removed) {
                if !remaining.contains(&pair) {
                    remaining.push(pair);
                }
            }
            if group.kitchen_owner == removed {
                hosted.push(group.course);
            }
        }

        match self.find_successor_pair(&remaining, &hosted) {
            Some(successor) => {
                for &i in &affected {
                    self.groups[i].replace_pair(removed, successor);
                    let diets = self.groups[i]
                        .pairs
                        .map(|id| self.pair(id).map_or(self.groups[i].diet, |p| p.diet));
                    self.groups[i].diet = group_diet(diets);
                }
                if !hosted.is_empty() {
                    if let Some(pair) = self.pairs.iter_mut().find(|p| p.id == successor) {
                        pair.has_cooked = true;
                    }
                }
                debug!("{} replaces {} in {} groups", successor, removed, affected.len());
                report.replaced_pairs.push((removed, successor));
            }
            None => {
                let doomed: Vec<GroupId> = self
                    .groups
                    .iter()
                    .filter(|g| g.contains(removed) || remaining.iter().any(|p| g.contains(*p)))
                    .map(|g| g.id)
                    .collect();
                self.groups.retain(|g| !doomed.contains(&g.id));
                self.refresh_cooks();
                debug!(
                    "no successor pair for {}, dissolved {} groups",
                    removed,
                    doomed.len()
                );
                report.dissolved_groups.extend(doomed);
            }
        }
    }

    /// First successor pair that fits every pair in `remaining` and, if
    /// it has to take over the kitchen for `hosted`, can still cook. Pairs
    /// with a cancelled member are skipped.
    fn find_successor_pair(&self, remaining: &[PairId], hosted: &[Course]) -> Option<PairId> {
        let roster = self.roster();
        let load = KitchenLoad::new(&self.pairs, &roster);
        let bookings = existing_bookings(&self.pairs, &self.groups, &roster);
        let members: Vec<PairView> = self
            .pairs
            .iter()
            .filter(|p| remaining.contains(&p.id))
            .filter_map(|p| PairView::new(p, &roster, &self.after_party))
            .collect();
        let grouped = self.grouped_pairs();

        self.pairs
            .iter()
            .filter(|p| !grouped.contains(&p.id))
            .filter(|p| !p.members().iter().any(|m| roster.participant(*m).cancelled))
            .filter_map(|p| PairView::new(p, &roster, &self.after_party))
            .find(|candidate| {
                let fits = members
                    .iter()
                    .all(|m| is_valid_candidate(m, candidate, &load));
                let can_host = hosted.is_empty()
                    || (!candidate.has_cooked
                        && load.cooked(candidate.kitchen) < MAX_KITCHEN_USES
                        && hosted
                            .iter()
                            .all(|course| !bookings.is_booked(&candidate.location, *course)));
                fits && can_host
            })
            .map(|c| c.id)
    }

    /// Re-derives `has_cooked` from the remaining groups.
    fn refresh_cooks(&mut self) {
        let hosts: HashSet<PairId> = self.groups.iter().map(|g| g.kitchen_owner).collect();
        for pair in &mut self.pairs {
            pair.has_cooked = hosts.contains(&pair.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{couple_row, couples, host_row, row};
    use super::*;
    use crate::geometry::Location;
    use crate::grouping::GroupConfig;
    use crate::model::{Diet, KitchenId};
    use crate::pairing::PairConfig;

    /// Nine grouped couples plus one spare couple without group.
    fn grouped_with_spare() -> Event {
        let mut event = couples(9);
        event
            .create_groups(&GroupConfig::default().with_seed(21))
            .unwrap();
        event
            .import_registrations(&[couple_row(9, "none", 20.0, 20.0)])
            .unwrap();
        event
    }

    /// Every group has three distinct kitchens, a member as cook, and no
    /// location hosts the same course twice.
    fn assert_groups_consistent(event: &Event) {
        let roster = event.roster();
        let mut hosts = HashSet::new();
        let mut claims = HashSet::new();
        for group in event.groups() {
            let kitchens: HashSet<KitchenId> = group
                .pairs
                .iter()
                .map(|id| roster.pair_kitchen(event.pair(*id).unwrap()).unwrap().id)
                .collect();
            assert_eq!(kitchens.len(), 3, "{} shares a kitchen", group.id);
            assert!(group.contains(group.kitchen_owner));
            assert!(hosts.insert(group.kitchen_owner));
            let owner = event.pair(group.kitchen_owner).unwrap();
            let location = roster.pair_location(owner).unwrap();
            assert!(claims.insert((location.key(), group.course)));
        }
    }

    #[test]
    fn test_unknown_participant_changes_nothing() {
        let mut event = couples(2);
        let err = event
            .handle_cancellations(&[ParticipantId(0), ParticipantId(99)])
            .unwrap_err();
        assert!(matches!(err, crate::error::SpinfoodError::UnknownParticipant(_)));
        assert!(event.participants().iter().all(|p| !p.cancelled));
    }

    #[test]
    fn test_cancelled_successor_is_only_flagged() {
        let mut event = Event::new(Location::new(0.0, 0.0));
        event
            .import_registrations(&[host_row(0, "none", 1.0, 1.0)])
            .unwrap();
        let report = event.handle_cancellations(&[ParticipantId(0)]).unwrap();
        assert_eq!(report.cancelled, vec![ParticipantId(0)]);
        assert!(report.removed_pairs.is_empty());
        assert!(event.successor_participants().is_empty());
    }

    #[test]
    fn test_cancelled_group_pair_replaced_by_successor() {
        let mut event = grouped_with_spare();
        let spare = event.pairs()[9].id;
        assert_eq!(event.successor_pairs(), vec![spare]);

        let leaving = event.pairs()[0].clone();
        let owned: Vec<GroupId> = event
            .groups()
            .iter()
            .filter(|g| g.kitchen_owner == leaving.id)
            .map(|g| g.id)
            .collect();
        assert_eq!(owned.len(), 1);

        let report = event.handle_cancellations(&leaving.members()).unwrap();
        assert_eq!(report.removed_pairs, vec![leaving.id]);
        assert_eq!(report.replaced_pairs, vec![(leaving.id, spare)]);
        assert!(report.dissolved_groups.is_empty());

        assert_eq!(event.groups().len(), 9);
        assert!(event.pair(leaving.id).is_err());
        assert!(event.groups().iter().all(|g| !g.contains(leaving.id)));
        assert_eq!(event.groups().iter().filter(|g| g.contains(spare)).count(), 3);
        assert_eq!(event.group(owned[0]).unwrap().kitchen_owner, spare);
        assert!(event.pair(spare).unwrap().has_cooked);
        assert!(event.successor_pairs().is_empty());
        assert_groups_consistent(&event);
    }

    #[test]
    fn test_cancelled_spare_pair_not_used_as_successor() {
        let mut event = grouped_with_spare();
        event
            .import_registrations(&[couple_row(10, "none", 25.0, 25.0)])
            .unwrap();
        let spare = event.pairs()[9].id;
        let backup = event.pairs()[10].id;
        let leaving = event.pairs()[0].clone();

        let mut cancelling = leaving.members().to_vec();
        cancelling.extend(event.pair(spare).unwrap().members());
        let report = event.handle_cancellations(&cancelling).unwrap();

        assert_eq!(report.removed_pairs, vec![leaving.id, spare]);
        assert_eq!(report.replaced_pairs, vec![(leaving.id, backup)]);
        assert!(report.dissolved_groups.is_empty());
        assert_eq!(event.groups().len(), 9);
        assert_eq!(event.groups().iter().filter(|g| g.contains(backup)).count(), 3);
        assert!(event.groups().iter().all(|g| !g.contains(spare)));
        assert!(event.successor_pairs().is_empty());
        assert_groups_consistent(&event);
    }

    #[test]
    fn test_grouped_participant_successor_sharing_a_kitchen_rejected() {
        let mut event = couples(9);
        event
            .create_groups(&GroupConfig::default().with_seed(4))
            .unwrap();
        // a single host at the address of pair 3, which eats with pair 0
        let shared = event.kitchens()[3].location;
        event
            .import_registrations(&[host_row(9, "none", shared.longitude, shared.latitude)])
            .unwrap();
        assert_eq!(event.kitchens().len(), 9);
        let leaving = event.pairs()[0].clone();

        // the kitchen owner leaves, the guest has no kitchen of their own
        let report = event.handle_cancellations(&[leaving.first]).unwrap();
        assert!(report.replaced_participants.is_empty());
        assert_eq!(report.removed_pairs, vec![leaving.id]);
        assert_eq!(report.dissolved_groups.len(), 9);
        assert_eq!(
            event.successor_participants(),
            vec![leaving.second, ParticipantId(18)]
        );
        assert_groups_consistent(&event);
    }

    #[test]
    fn test_grouped_participant_replaced_with_new_kitchen() {
        let mut event = couples(9);
        event
            .create_groups(&GroupConfig::default().with_seed(4))
            .unwrap();
        event
            .import_registrations(&[host_row(9, "none", 30.0, 30.0)])
            .unwrap();
        let leaving = event.pairs()[0].clone();

        let report = event.handle_cancellations(&[leaving.first]).unwrap();
        assert_eq!(
            report.replaced_participants,
            vec![(leaving.first, ParticipantId(18))]
        );
        assert!(report.dissolved_groups.is_empty());
        assert_eq!(event.groups().len(), 9);

        let pair = event.pair(leaving.id).unwrap();
        assert_eq!(pair.owner(), ParticipantId(18));
        assert!(pair.has_cooked);
        assert_eq!(
            event.roster().pair_location(pair),
            Some(Location::new(30.0, 30.0))
        );
        assert_groups_consistent(&event);
    }

    #[test]
    fn test_groups_dissolved_without_successor_pair() {
        let mut event = couples(9);
        event
            .create_groups(&GroupConfig::default().with_seed(4))
            .unwrap();
        let leaving = event.pairs()[4].clone();

        let report = event.handle_cancellations(&leaving.members()).unwrap();
        assert!(report.replaced_pairs.is_empty());
        // the rotation links every pair of the cluster to the leaving one
        assert_eq!(report.dissolved_groups.len(), 9);
        assert!(event.groups().is_empty());
        assert_eq!(event.successor_pairs().len(), 8);
        assert!(event.pairs().iter().all(|p| !p.has_cooked));
    }

    #[test]
    fn test_incompatible_successor_pair_not_used() {
        let mut rows: Vec<Vec<String>> = (0..9)
            .map(|i| couple_row(i, "veggie", 1.0 + i as f64, 0.5 * i as f64))
            .collect();
        rows.push(couple_row(9, "meat", 20.0, 20.0));
        let mut event = Event::new(Location::new(0.0, 0.0));
        event.import_registrations(&rows).unwrap();
        let created = event
            .create_groups(&GroupConfig::default().with_seed(4))
            .unwrap();
        assert_eq!(created.len(), 9);
        assert_eq!(event.successor_pairs(), vec![event.pairs()[9].id]);

        let leaving = event.pairs()[0].clone();
        let report = event.handle_cancellations(&leaving.members()).unwrap();
        assert!(report.replaced_pairs.is_empty());
        assert_eq!(report.dissolved_groups.len(), 9);
        assert_eq!(event.successor_pairs().len(), 9);
    }

    #[test]
    fn test_successor_pair_sharing_a_kitchen_rejected() {
        let mut event = couples(9);
        event
            .create_groups(&GroupConfig::default().with_seed(4))
            .unwrap();
        // the spare couple lives at the address of pair 3, which shares the
        // appetizer group of pair 0
        let shared = event.kitchens()[3].location;
        event
            .import_registrations(&[couple_row(9, "none", shared.longitude, shared.latitude)])
            .unwrap();
        assert_eq!(event.kitchens().len(), 9);
        let leaving = event.pairs()[0].clone();

        let report = event.handle_cancellations(&leaving.members()).unwrap();
        assert!(report.replaced_pairs.is_empty());
        assert_eq!(report.dissolved_groups.len(), 9);
    }

    #[test]
    fn test_participant_replaced_by_successor() {
        let rows = vec![
            couple_row(0, "meat", 1.0, 1.0),
            row(&["1", "v", "Vera", "vegan", "30", "female", "no"]),
            row(&["2", "m", "Max", "meat", "33", "male", "no"]),
        ];
        let mut event = Event::new(Location::new(0.0, 0.0));
        event.import_registrations(&rows).unwrap();
        let pair = event.pairs()[0].id;

        // the partner (participant 1) cancels; Vera is vegan and cannot
        // join a meat eater, Max can
        let report = event.handle_cancellations(&[ParticipantId(1)]).unwrap();
        assert_eq!(
            report.replaced_participants,
            vec![(ParticipantId(1), ParticipantId(3))]
        );
        let replaced = event.pair(pair).unwrap();
        assert_eq!(replaced.members(), [ParticipantId(0), ParticipantId(3)]);
        assert_eq!(replaced.kitchen_owner, PairMember::First);
        assert_eq!(event.successor_participants(), vec![ParticipantId(2)]);
    }

    #[test]
    fn test_kitchen_owner_replaced_by_successor_with_kitchen() {
        let rows = vec![
            couple_row(0, "none", 1.0, 1.0),
            row(&["1", "n", "Nokitchen", "none", "30", "female", "no"]),
            host_row(2, "none", 5.0, 5.0),
        ];
        let mut event = Event::new(Location::new(0.0, 0.0));
        event.import_registrations(&rows).unwrap();
        let pair = event.pairs()[0].id;

        // the kitchen owner leaves and the remaining partner has no kitchen
        let report = event.handle_cancellations(&[ParticipantId(0)]).unwrap();
        assert_eq!(
            report.replaced_participants,
            vec![(ParticipantId(0), ParticipantId(3))]
        );
        let replaced = event.pair(pair).unwrap();
        assert_eq!(replaced.owner(), ParticipantId(3));
        assert_eq!(event.roster().pair_kitchen(replaced).unwrap().location, Location::new(5.0, 5.0));
    }

    #[test]
    fn test_pair_removed_without_successor_participant() {
        let mut event = couples(1);
        let pair = event.pairs()[0].id;
        let report = event.handle_cancellations(&[ParticipantId(0)]).unwrap();

        assert_eq!(report.removed_pairs, vec![pair]);
        assert!(event.pairs().is_empty());
        assert_eq!(event.successor_participants(), vec![ParticipantId(1)]);
    }

    #[test]
    fn test_removed_pair_in_group_triggers_pair_replacement() {
        let mut event = grouped_with_spare();
        let spare = event.pairs()[9].id;
        let leaving = event.pairs()[2].clone();

        let report = event.handle_cancellations(&[leaving.first]).unwrap();
        assert_eq!(report.removed_pairs, vec![leaving.id]);
        assert_eq!(report.replaced_pairs, vec![(leaving.id, spare)]);
        assert!(event.successor_participants().contains(&leaving.second));
        assert_eq!(event.groups().len(), 9);
    }

    #[test]
    fn test_cancelling_after_pairing() {
        let rows = vec![
            host_row(0, "veggie", 1.0, 1.0),
            row(&["1", "a", "A", "veggie", "25", "male", "no"]),
            row(&["2", "b", "B", "vegan", "26", "male", "no"]),
        ];
        let mut event = Event::new(Location::new(0.0, 0.0));
        event.import_registrations(&rows).unwrap();
        let created = event.create_pairs(&PairConfig::default()).unwrap();
        assert_eq!(created.len(), 1);
        let before = event.pair(created[0]).unwrap().clone();
        let waiting = event.successor_participants();
        assert_eq!(waiting.len(), 1);

        let partner = before.partner_of(ParticipantId(0)).unwrap();
        event.handle_cancellations(&[partner]).unwrap();
        let after = event.pair(created[0]).unwrap();
        assert!(after.contains(waiting[0]));
        assert_eq!(after.diet, Diet::Veggie);
        assert!(event.successor_participants().is_empty());
    }
}

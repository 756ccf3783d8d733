//! Cluster formation, course assignment and cook selection.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::scoring::{ClusterStats, ScoreInputs, Weights};
use crate::geometry::{distance, Location};
use crate::model::{group_diet, Course, Diet, Group, KitchenId, Pair, PairId, Roster};

/// Pairs per cluster; a cluster becomes nine groups.
pub const CLUSTER_SIZE: usize = 9;

/// A kitchen used by this many pairs, or hosting this many courses, takes
/// no further pairs.
pub const MAX_KITCHEN_USES: usize = 3;

/// Groups of a cluster, as index triples into the cluster sorted by
/// ascending distance to the after party. Every pair shows up once per
/// course and no two pairs meet twice.
pub const ROTATION: [(Course, [usize; 3]); CLUSTER_SIZE] = [
    (Course::Appetizer, [6, 0, 3]),
    (Course::Appetizer, [7, 1, 4]),
    (Course::Appetizer, [8, 2, 5]),
    (Course::Main, [3, 1, 8]),
    (Course::Main, [4, 2, 6]),
    (Course::Main, [5, 0, 7]),
    (Course::Dessert, [0, 4, 8]),
    (Course::Dessert, [1, 6, 5]),
    (Course::Dessert, [2, 3, 7]),
];

type LocationKey = (u64, u64);

/// Everything grouping needs to know about a pair with a kitchen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairView {
    pub id: PairId,
    pub kitchen: KitchenId,
    pub location: Location,
    pub diet: Diet,
    pub has_cooked: bool,
    pub inputs: ScoreInputs,
}

impl PairView {
    /// `None` when the pair has no kitchen.
    pub fn new(pair: &Pair, roster: &Roster<'_>, after_party: &Location) -> Option<Self> {
        let kitchen = roster.pair_kitchen(pair)?;
        Some(Self {
            id: pair.id,
            kitchen: kitchen.id,
            location: kitchen.location,
            diet: pair.diet,
            has_cooked: pair.has_cooked,
            inputs: ScoreInputs {
                average_diet_value: roster.pair_average_diet_value(pair),
                average_age_bracket: roster.pair_average_age_bracket(pair),
                female_proportion: roster.pair_female_count(pair) as f64 / 2.0,
                party_distance: distance(&kitchen.location, after_party),
            },
        })
    }

    pub fn party_distance(&self) -> f64 {
        self.inputs.party_distance
    }
}

/// How heavily each kitchen is used across all pairs of the event.
#[derive(Debug, Clone, Default)]
pub struct KitchenLoad {
    cooked: HashMap<KitchenId, usize>,
    at_location: HashMap<LocationKey, usize>,
}

impl KitchenLoad {
    pub fn new(pairs: &[Pair], roster: &Roster<'_>) -> Self {
        let mut load = Self::default();
        for pair in pairs {
            let Some(kitchen) = roster.pair_kitchen(pair) else {
                continue;
            };
            *load.at_location.entry(kitchen.location.key()).or_default() += 1;
            if pair.has_cooked {
                load.record_cook(kitchen.id);
            }
        }
        load
    }

    /// Pairs that already cooked in `kitchen`.
    pub fn cooked(&self, kitchen: KitchenId) -> usize {
        self.cooked.get(&kitchen).copied().unwrap_or(0)
    }

    pub fn record_cook(&mut self, kitchen: KitchenId) {
        *self.cooked.entry(kitchen).or_default() += 1;
    }

    /// Pairs whose kitchen sits at `location`.
    pub fn pairs_at(&self, location: &Location) -> usize {
        self.at_location.get(&location.key()).copied().unwrap_or(0)
    }

    fn saturated(&self, pair: &PairView) -> bool {
        self.cooked(pair.kitchen) >= MAX_KITCHEN_USES
            || self.pairs_at(&pair.location) >= MAX_KITCHEN_USES
    }
}

/// Whether `candidate` may share groups with `member`: compatible diets,
/// different kitchens at different places, and a kitchen that is not
/// already saturated.
pub fn is_valid_candidate(member: &PairView, candidate: &PairView, load: &KitchenLoad) -> bool {
    member.id != candidate.id
        && member.diet.compatible_with(candidate.diet)
        && member.kitchen != candidate.kitchen
        && member.location != candidate.location
        && !load.saturated(candidate)
}

fn score_candidates(
    weights: &Weights,
    stats: &ClusterStats,
    candidates: &[PairView],
    parallel: bool,
) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    {
        if parallel {
            return candidates
                .par_iter()
                .map(|c| weights.score(stats, &c.inputs))
                .collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    candidates
        .iter()
        .map(|c| weights.score(stats, &c.inputs))
        .collect()
}

/// Grows a cluster from `seed` out of `pool`.
///
/// Each round shuffles the remaining candidates, orders them by descending
/// score against the current cluster and adds the best one that is valid
/// for every member. Candidates found invalid on the way are dropped for
/// the rest of the search. Stops at [`CLUSTER_SIZE`] members or when no
/// candidate is left.
pub fn find_pairs_for_cluster<R: Rng>(
    seed: &PairView,
    pool: &[PairView],
    load: &KitchenLoad,
    weights: &Weights,
    rng: &mut R,
    parallel: bool,
) -> Vec<PairView> {
    let mut cluster = vec![*seed];
    let mut stats = ClusterStats::default();
    stats.push(&seed.inputs);
    let mut candidates: Vec<PairView> = pool
        .iter()
        .filter(|c| is_valid_candidate(seed, c, load))
        .copied()
        .collect();

    while cluster.len() < CLUSTER_SIZE && !candidates.is_empty() {
        candidates.shuffle(rng);
        let scores = score_candidates(weights, &stats, &candidates, parallel);
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        let mut chosen = None;
        let mut keep = Vec::with_capacity(candidates.len());
        for i in order {
            let candidate = candidates[i];
            if chosen.is_some() {
                keep.push(candidate);
            } else if cluster
                .iter()
                .all(|member| is_valid_candidate(member, &candidate, load))
            {
                chosen = Some(candidate);
            }
        }
        candidates = keep;

        let Some(next) = chosen else {
            break;
        };
        stats.push(&next.inputs);
        cluster.push(next);
    }

    cluster
}

/// Pre-assigned course per position of a cluster sorted by ascending
/// party distance: the nearest three serve dessert, the next three the
/// main course, the farthest three the appetizer. `None` for fewer than
/// nine pairs; extra pairs are ignored.
pub fn assign_courses<T: Copy>(sorted: &[T]) -> Option<Vec<(T, Course)>> {
    if sorted.len() < CLUSTER_SIZE {
        return None;
    }
    Some(
        sorted[..CLUSTER_SIZE]
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let course = match i / 3 {
                    0 => Course::Dessert,
                    1 => Course::Main,
                    _ => Course::Appetizer,
                };
                (*item, course)
            })
            .collect(),
    )
}

/// A group proposed by the search, not yet part of the event.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDraft {
    pub pairs: [PairId; 3],
    pub course: Course,
    pub diet: Diet,
    pub kitchen_owner: PairId,
}

/// Kitchen bookings that constrain cook selection.
#[derive(Debug, Clone, Default)]
pub struct Bookings {
    cooked: HashSet<PairId>,
    courses: HashSet<(LocationKey, Course)>,
}

impl Bookings {
    pub fn is_cooked(&self, pair: PairId) -> bool {
        self.cooked.contains(&pair)
    }

    /// Whether a kitchen at `location` already hosts `course`.
    pub fn is_booked(&self, location: &Location, course: Course) -> bool {
        self.courses.contains(&(location.key(), course))
    }

    pub fn book(&mut self, pair: PairId, location: &Location, course: Course) {
        self.cooked.insert(pair);
        self.courses.insert((location.key(), course));
    }
}

/// Splits a 9-pair cluster into its nine groups and picks a cook for
/// each.
///
/// `sorted` must be ordered by ascending party distance. The cook of a
/// group is the first listed pair that has not cooked yet, whose kitchen
/// hosted fewer than [`MAX_KITCHEN_USES`] courses, and whose kitchen is
/// free for that course. Returns `None` as soon as one group finds no
/// cook; nothing is recorded in `load` or `bookings` in that case.
pub fn build_groups(
    sorted: &[PairView],
    load: &mut KitchenLoad,
    bookings: &mut Bookings,
) -> Option<Vec<GroupDraft>> {
    let courses = assign_courses(sorted)?;
    let mut cooks: Vec<(&PairView, Course)> = Vec::with_capacity(CLUSTER_SIZE);
    let mut drafts = Vec::with_capacity(CLUSTER_SIZE);

    for (course, triple) in ROTATION {
        debug_assert_eq!(courses[triple[0]].1, course);
        let members = triple.map(|i| &sorted[i]);
        let can_cook = |pair: &PairView| {
            let tentative_uses = cooks.iter().filter(|(c, _)| c.kitchen == pair.kitchen).count();
            !pair.has_cooked
                && !bookings.is_cooked(pair.id)
                && !cooks.iter().any(|(c, _)| c.id == pair.id)
                && load.cooked(pair.kitchen) + tentative_uses < MAX_KITCHEN_USES
                && !bookings.is_booked(&pair.location, course)
                && !cooks
                    .iter()
                    .any(|(c, booked)| *booked == course && c.location == pair.location)
        };
        let owner = members.into_iter().find(|p| can_cook(*p))?;
        cooks.push((owner, course));
        drafts.push(GroupDraft {
            pairs: members.map(|p| p.id),
            course,
            diet: group_diet(members.map(|p| p.diet)),
            kitchen_owner: owner.id,
        });
    }

    for (owner, course) in cooks {
        load.record_cook(owner.kitchen);
        bookings.book(owner.id, &owner.location, course);
    }
    Some(drafts)
}

/// Cook bookings already present in the event.
pub fn existing_bookings(
    pairs: &[Pair],
    groups: &[Group],
    roster: &Roster<'_>,
) -> Bookings {
    let by_id: HashMap<PairId, &Pair> = pairs.iter().map(|p| (p.id, p)).collect();
    let mut bookings = Bookings::default();
    for pair in pairs.iter().filter(|p| p.has_cooked) {
        bookings.cooked.insert(pair.id);
    }
    for group in groups {
        let location = by_id
            .get(&group.kitchen_owner)
            .and_then(|p| roster.pair_location(p));
        if let Some(location) = location {
            bookings.courses.insert((location.key(), group.course));
        }
    }
    bookings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::GroupConfig;
    use crate::testing::Fixture;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn views(fx: &Fixture, pairs: &[Pair]) -> Vec<PairView> {
        let roster = fx.roster();
        let party = Location::new(0.0, 0.0);
        pairs
            .iter()
            .filter_map(|p| PairView::new(p, &roster, &party))
            .collect()
    }

    fn spread_pairs(fx: &mut Fixture, n: u32) -> Vec<Pair> {
        (0..n)
            .map(|i| fx.hosting_pair(i, Diet::Any, 1.0 + i as f64, 0.0))
            .collect()
    }

    #[test]
    fn test_rotation_covers_each_pair_once_per_course() {
        for course in Course::ALL {
            let mut seen: Vec<usize> = ROTATION
                .iter()
                .filter(|(c, _)| *c == course)
                .flat_map(|(_, t)| t.iter().copied())
                .collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..9).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_rotation_pairs_meet_at_most_once() {
        let mut meetings = HashSet::new();
        for (_, triple) in ROTATION {
            for a in 0..3 {
                for b in (a + 1)..3 {
                    let key = (triple[a].min(triple[b]), triple[a].max(triple[b]));
                    assert!(meetings.insert(key), "pairs {key:?} meet twice");
                }
            }
        }
        assert_eq!(meetings.len(), 27);
    }

    #[test]
    fn test_assign_courses() {
        let ids: Vec<u32> = (0..9).collect();
        let assigned = assign_courses(&ids).unwrap();
        let courses: Vec<Course> = assigned.iter().map(|(_, c)| *c).collect();
        assert_eq!(&courses[0..3], &[Course::Dessert; 3]);
        assert_eq!(&courses[3..6], &[Course::Main; 3]);
        assert_eq!(&courses[6..9], &[Course::Appetizer; 3]);
        assert!(assign_courses(&ids[..8]).is_none());
        assert!(assign_courses::<u32>(&[]).is_none());
    }

    #[test]
    fn test_valid_candidate_rules() {
        let mut fx = Fixture::new();
        let a = fx.hosting_pair(1, Diet::Meat, 1.0, 1.0);
        let b = fx.hosting_pair(2, Diet::Vegan, 2.0, 2.0);
        let c = fx.hosting_pair(3, Diet::Any, 1.0, 1.0);
        let d = fx.hosting_pair(4, Diet::Any, 3.0, 3.0);
        let pairs = vec![a, b, c, d];
        let v = views(&fx, &pairs);
        let load = KitchenLoad::new(&pairs, &fx.roster());

        assert!(!is_valid_candidate(&v[0], &v[0], &load));
        assert!(!is_valid_candidate(&v[0], &v[1], &load), "diet");
        assert!(!is_valid_candidate(&v[0], &v[2], &load), "location");
        assert!(is_valid_candidate(&v[0], &v[3], &load));
        assert!(is_valid_candidate(&v[1], &v[3], &load));
    }

    #[test]
    fn test_crowded_location_rejected() {
        let mut fx = Fixture::new();
        let mut pairs = vec![fx.hosting_pair(1, Diet::Any, 9.0, 9.0)];
        // three more pairs at one place, on different floors
        for (i, story) in [0, 1, 2].iter().enumerate() {
            let k = fx.kitchen(crate::model::KitchenAvailability::Yes, *story, 5.0, 5.0);
            let a = fx.person("A", Diet::Any, 30, crate::model::Gender::Male, Some(k));
            let b = fx.person("B", Diet::Any, 30, crate::model::Gender::Male, None);
            pairs.push(fx.pair(10 + i as u32, a, b));
        }
        let v = views(&fx, &pairs);
        let load = KitchenLoad::new(&pairs, &fx.roster());
        assert_eq!(load.pairs_at(&Location::new(5.0, 5.0)), 3);
        assert!(!is_valid_candidate(&v[0], &v[1], &load));
    }

    #[test]
    fn test_cooked_kitchen_rejected() {
        let mut fx = Fixture::new();
        let k = fx.kitchen(crate::model::KitchenAvailability::Yes, 0, 5.0, 5.0);
        let mut pairs = vec![fx.hosting_pair(1, Diet::Any, 9.0, 9.0)];
        let a = fx.person("A", Diet::Any, 30, crate::model::Gender::Male, Some(k));
        let b = fx.person("B", Diet::Any, 30, crate::model::Gender::Male, None);
        pairs.push(fx.pair(2, a, b));
        let v = views(&fx, &pairs);

        let mut load = KitchenLoad::new(&pairs, &fx.roster());
        assert!(is_valid_candidate(&v[0], &v[1], &load));
        for _ in 0..MAX_KITCHEN_USES {
            load.record_cook(k);
        }
        assert!(!is_valid_candidate(&v[0], &v[1], &load));
    }

    #[test]
    fn test_find_pairs_for_cluster_fills_nine() {
        let mut fx = Fixture::new();
        let pairs = spread_pairs(&mut fx, 12);
        let v = views(&fx, &pairs);
        let load = KitchenLoad::new(&pairs, &fx.roster());
        let weights = Weights::from_config(&GroupConfig::default());
        let mut rng = StdRng::seed_from_u64(42);

        let cluster = find_pairs_for_cluster(&v[0], &v[1..], &load, &weights, &mut rng, false);
        assert_eq!(cluster.len(), CLUSTER_SIZE);
        assert_eq!(cluster[0].id, v[0].id);
        let ids: HashSet<PairId> = cluster.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), CLUSTER_SIZE);
    }

    #[test]
    fn test_find_pairs_for_cluster_prefers_close_kitchens() {
        let mut fx = Fixture::new();
        let pairs: Vec<Pair> = (0..12)
            .map(|i| fx.hosting_pair(i, Diet::Any, 10.0 + 0.5 * i as f64, 0.0))
            .collect();
        let v = views(&fx, &pairs);
        let load = KitchenLoad::new(&pairs, &fx.roster());
        let path_first = GroupConfig::default().with_priorities(2, 3, 4, 1, 5);
        let weights = Weights::from_config(&path_first);
        let mut rng = StdRng::seed_from_u64(1);

        let cluster = find_pairs_for_cluster(&v[0], &v[1..], &load, &weights, &mut rng, false);
        let ids: Vec<PairId> = cluster.iter().map(|p| p.id).collect();
        let nearest: Vec<PairId> = v[..9].iter().map(|p| p.id).collect();
        assert_eq!(ids, nearest);
    }

    #[test]
    fn test_find_pairs_for_cluster_stops_without_candidates() {
        let mut fx = Fixture::new();
        let meat = fx.hosting_pair(1, Diet::Meat, 1.0, 0.0);
        let mut pairs = vec![meat];
        for i in 0..8 {
            pairs.push(fx.hosting_pair(10 + i, Diet::Vegan, 2.0 + i as f64, 0.0));
        }
        let v = views(&fx, &pairs);
        let load = KitchenLoad::new(&pairs, &fx.roster());
        let weights = Weights::from_config(&GroupConfig::default());
        let mut rng = StdRng::seed_from_u64(3);

        let cluster = find_pairs_for_cluster(&v[0], &v[1..], &load, &weights, &mut rng, false);
        assert_eq!(cluster.len(), 1);
    }

    #[test]
    fn test_build_groups_assigns_nine_cooks() {
        let mut fx = Fixture::new();
        let pairs = spread_pairs(&mut fx, 9);
        let v = views(&fx, &pairs);
        let mut load = KitchenLoad::new(&pairs, &fx.roster());
        let mut bookings = Bookings::default();

        let drafts = build_groups(&v, &mut load, &mut bookings).unwrap();
        assert_eq!(drafts.len(), 9);
        let owners: HashSet<PairId> = drafts.iter().map(|d| d.kitchen_owner).collect();
        assert_eq!(owners.len(), 9);
        // with nobody cooked yet, the first listed pair cooks
        assert_eq!(drafts[0].kitchen_owner, v[6].id);
        assert_eq!(drafts[6].kitchen_owner, v[0].id);
        assert!(drafts.iter().all(|d| d.pairs.contains(&d.kitchen_owner)));
        assert!(bookings.is_cooked(v[0].id));
        assert_eq!(load.cooked(v[0].kitchen), 1);
    }

    #[test]
    fn test_build_groups_fails_without_cook() {
        let mut fx = Fixture::new();
        let pairs: Vec<Pair> = spread_pairs(&mut fx, 9)
            .into_iter()
            .map(|mut p| {
                p.has_cooked = true;
                p
            })
            .collect();
        let v = views(&fx, &pairs);
        let mut load = KitchenLoad::default();
        let mut bookings = Bookings::default();

        assert!(build_groups(&v, &mut load, &mut bookings).is_none());
        assert!(!bookings.is_cooked(v[0].id));
        assert_eq!(load.cooked(v[0].kitchen), 0);
    }

    #[test]
    fn test_build_groups_fails_on_booked_kitchen() {
        let mut fx = Fixture::new();
        let pairs = spread_pairs(&mut fx, 9);
        let v = views(&fx, &pairs);
        let mut load = KitchenLoad::default();
        let mut bookings = Bookings::default();
        // the kitchen of pair 6 already hosts an appetizer, so pair 0 has
        // to cook it and nobody is left for the first dessert group
        bookings.book(PairId(99), &v[6].location, Course::Appetizer);

        assert!(build_groups(&v, &mut load, &mut bookings).is_none());
        assert!(!bookings.is_cooked(v[0].id));
    }

    #[test]
    fn test_build_groups_needs_nine() {
        let mut fx = Fixture::new();
        let pairs = spread_pairs(&mut fx, 8);
        let v = views(&fx, &pairs);
        assert!(build_groups(&v, &mut KitchenLoad::default(), &mut Bookings::default()).is_none());
    }

    #[test]
    fn test_group_diet_in_drafts() {
        let mut fx = Fixture::new();
        let mut pairs = spread_pairs(&mut fx, 8);
        pairs.insert(0, fx.hosting_pair(50, Diet::Vegan, 0.5, 0.0));
        let v = views(&fx, &pairs);
        let drafts =
            build_groups(&v, &mut KitchenLoad::default(), &mut Bookings::default()).unwrap();
        for draft in &drafts {
            let expected = if draft.pairs.contains(&PairId(50)) {
                Diet::Vegan
            } else {
                Diet::Meat
            };
            assert_eq!(draft.diet, expected);
        }
    }
}

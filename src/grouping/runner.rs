//! Cluster search loop.

use std::collections::{HashMap, HashSet, VecDeque};

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::cluster::{
    build_groups, existing_bookings, find_pairs_for_cluster, GroupDraft, KitchenLoad, PairView,
    CLUSTER_SIZE,
};
use super::config::GroupConfig;
use super::scoring::Weights;
use crate::error::Result;
use crate::geometry::Location;
use crate::model::{Group, KitchenId, Pair, PairId, Roster};

/// Pairs of one kitchen admitted to a single grouping run.
const KITCHEN_ROUND_CAP: usize = 2;

/// Result of a grouping run.
#[derive(Debug, Clone, Default)]
pub struct GroupingResult {
    /// Committed clusters, nine groups each, in commit order.
    pub clusters: Vec<Vec<GroupDraft>>,
    /// Failed attempts since the last committed cluster.
    pub failures: usize,
    /// Eligible pairs that ended up in no cluster.
    pub leftover: Vec<PairId>,
}

impl GroupingResult {
    pub fn group_count(&self) -> usize {
        self.clusters.iter().map(Vec::len).sum()
    }
}

/// Repeatedly grows 9-pair clusters out of the pairs without group.
pub struct GroupRunner;

impl GroupRunner {
    /// Runs the cluster search over every pair not in one of `groups`.
    ///
    /// The returned drafts are consistent with each other: no pair cooks
    /// twice and no kitchen location hosts the same course twice, counting
    /// the cooks of `groups` as well.
    pub fn run(
        roster: &Roster<'_>,
        pairs: &[Pair],
        groups: &[Group],
        after_party: &Location,
        config: &GroupConfig,
    ) -> Result<GroupingResult> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        let weights = Weights::from_config(config);

        let mut pool = eligible_pairs(roster, pairs, groups, after_party);
        let mut load = KitchenLoad::new(pairs, roster);
        let mut bookings = existing_bookings(pairs, groups, roster);
        info!("grouping {} eligible pairs", pool.len());

        let mut result = GroupingResult::default();
        while pool.len() >= CLUSTER_SIZE && result.failures < config.max_failures {
            let Some(seed) = pool.pop_front() else {
                break;
            };
            let mut cluster = find_pairs_for_cluster(
                &seed,
                pool.make_contiguous(),
                &load,
                &weights,
                &mut rng,
                config.parallel,
            );

            let drafts = if cluster.len() == CLUSTER_SIZE {
                cluster.sort_by(|a, b| a.party_distance().total_cmp(&b.party_distance()));
                build_groups(&cluster, &mut load, &mut bookings)
            } else {
                None
            };

            match drafts {
                Some(drafts) => {
                    let members: HashSet<PairId> = cluster.iter().map(|p| p.id).collect();
                    pool.retain(|p| !members.contains(&p.id));
                    debug!("cluster seeded by {} committed", seed.id);
                    result.clusters.push(drafts);
                    result.failures = 0;
                }
                None => {
                    debug!(
                        "cluster seeded by {} failed with {} pairs",
                        seed.id,
                        cluster.len()
                    );
                    pool.push_back(seed);
                    result.failures += 1;
                }
            }
        }

        if result.failures >= config.max_failures {
            warn!(
                "grouping stopped after {} failed cluster attempts with {} pairs left",
                result.failures,
                pool.len()
            );
        }
        result.leftover = pool.iter().map(|p| p.id).collect();
        info!(
            "grouping committed {} clusters ({} groups), {} eligible pairs left",
            result.clusters.len(),
            result.group_count(),
            result.leftover.len()
        );
        Ok(result)
    }
}

/// Pairs without group that have a kitchen, admitting at most
/// [`KITCHEN_ROUND_CAP`] pairs per kitchen.
fn eligible_pairs(
    roster: &Roster<'_>,
    pairs: &[Pair],
    groups: &[Group],
    after_party: &Location,
) -> VecDeque<PairView> {
    let grouped: HashSet<PairId> = groups.iter().flat_map(|g| g.pairs).collect();
    let mut per_kitchen: HashMap<KitchenId, usize> = HashMap::new();
    pairs
        .iter()
        .filter(|p| !grouped.contains(&p.id))
        .filter_map(|p| PairView::new(p, roster, after_party))
        .filter(|view| {
            let uses = per_kitchen.entry(view.kitchen).or_default();
            *uses += 1;
            *uses <= KITCHEN_ROUND_CAP
        })
        .collect()
}

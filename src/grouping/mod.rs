//! Group formation.
//!
//! Pairs are grouped nine at a time. A cluster grows greedily from a seed
//! pair: every remaining candidate is scored against the cluster with the
//! weights of [`GroupConfig`], and the best candidate that is compatible
//! with every member joins. A full cluster is sorted by distance to the
//! after party and split into nine groups by the fixed [`ROTATION`], so
//! that each pair eats every course once, hosts exactly one of them, and
//! meets every other pair of the cluster at most once.
//!
//! A cluster is only committed when all nine groups found a cook. Failed
//! attempts count against [`GroupConfig::max_failures`].
//!
//! # Scoring
//!
//! - diet: `1 - abs(cluster average diet value - candidate) / 3`
//! - age: `1 - abs(cluster average age bracket - candidate) / 8`
//! - gender: `1 - 2 * abs(0.5 - female share including the candidate)`
//! - path length: [`path_length_score`] of the farthest kitchen
//! - size: constant 1
//!
//! Ties are broken by a seedable shuffle before the sort.

mod cluster;
mod config;
mod runner;
mod scoring;

pub use cluster::{
    assign_courses, build_groups, existing_bookings, find_pairs_for_cluster, is_valid_candidate,
    Bookings, GroupDraft, KitchenLoad, PairView, CLUSTER_SIZE, MAX_KITCHEN_USES, ROTATION,
};
pub use config::{GroupConfig, GroupCriterion};
pub use runner::{GroupRunner, GroupingResult};
pub use scoring::{path_length_score, weighting, ClusterStats, ScoreInputs, Weights};

//! Planning engine for progressive dinner events.
//!
//! Participants register alone or as a pair and cook one course of a
//! three-course dinner in their own kitchen. The other two courses they
//! eat in the kitchens of other pairs, and afterwards everybody meets at
//! a common after-party location. This crate decides who cooks with whom
//! and who eats where:
//!
//! - **Pairing**: Greedy multi-pass matching of single participants,
//!   kitchen owners first, ranked by configurable diet/age/gender
//!   priorities.
//! - **Grouping**: Randomized cluster search that grows sets of nine
//!   compatible pairs and rotates them through a fixed 9-group schedule,
//!   three groups per course, each hosted by a different pair.
//! - **Metrics**: Per-pair and per-group measurements (age gap, diet
//!   deviation, gender mix, travel distance) and event-wide summaries.
//! - **Cancellation**: Repairs pairs and groups when participants
//!   withdraw, pulling in waiting successors before dissolving anything.
//!
//! # Architecture
//!
//! [`event::Event`] owns every participant, kitchen, pair and group and is
//! the only place where they change. The algorithms in [`pairing`] and
//! [`grouping`] read the event through a [`model::Roster`] and return
//! proposals, which the event then commits.
//!
//! # Features
//!
//! - `serde`: Serialize/Deserialize for the data model and the event.
//! - `parallel`: Score cluster candidates with rayon
//!   (see [`grouping::GroupConfig::with_parallel`]).

pub mod error;
pub mod event;
pub mod geometry;
pub mod grouping;
pub mod metrics;
pub mod model;
pub mod pairing;

#[cfg(test)]
mod testing;

pub use error::{Result, SpinfoodError};
pub use event::Event;

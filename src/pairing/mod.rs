//! Participant pairing.
//!
//! Forms pairs out of participants without partner. Participants are
//! bucketed by kitchen availability and matched bucket against bucket in
//! a fixed order, first restricted to candidates sharing the value of the
//! most important criterion, then without that restriction.
//!
//! # Hard filters
//!
//! - nobody pairs with themselves
//! - MEAT never pairs with VEGGIE or VEGAN
//! - two participants registered at the same kitchen never pair
//!
//! Within those limits candidates are ranked by [`Criterion`] in the
//! order given by [`PairConfig`]: a later criterion only breaks ties the
//! earlier ones left.

mod config;
mod rules;
mod runner;

pub use config::PairConfig;
pub use rules::{choose_kitchen_owner, is_valid_partner, rank_candidates, Criterion};
pub use runner::{Match, PairRunner, PairingResult};

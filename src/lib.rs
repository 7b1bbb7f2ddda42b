//! Trip expense splitting: who paid what, and who should pay whom.
//!
//! The settlement engine ([`balance`], [`transfers`], [`settle`]) is a set of
//! pure functions over a trip snapshot. The rest of the crate stores trips
//! and serves the engine's results over HTTP.
pub mod balance;
pub mod error;
pub mod routes;
pub mod schemas;
pub mod settings;
pub mod settle;
pub mod split;
pub mod store;
pub mod transfers;

pub use balance::{compute_balances, Balance};
pub use schemas::{BeneficiaryRule, Expense, Participant, ParticipantId, Trip};
pub use settle::consolidate_transfers;
pub use transfers::{compute_transfers, Transfer};

//! Crowd-lottery lifecycle engine.
//!
//! Assembles the transaction bundles that drive a crowd lottery on a
//! Stellar-like ledger: creating and locking the lottery account,
//! recording contributions as matched offers over a tracking asset, and
//! distributing prizes with a seeded, weight-proportional draw. The engine
//! only reads ledger state and emits [`TransactionBlueprint`]s; signing
//! and submission stay with the host.

pub mod amount;
pub mod constants;
pub mod errors;
pub mod instructions;
pub mod ledger;
pub mod request;
pub mod state;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use amount::{Amount, Rate};
pub use errors::{Error, Result};
pub use ledger::ops::TransactionBlueprint;
pub use ledger::query::LedgerQuery;
pub use ledger::types::AccountId;
pub use request::{handle, Request, Response};
pub use state::platform::PlatformAccounts;

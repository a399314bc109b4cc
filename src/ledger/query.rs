use log::warn;

use crate::constants::DEFAULT_BASE_FEE;
use crate::errors::Result;
use crate::ledger::types::{AccountId, AccountRecord, Asset, SortOrder, TradePage};

/// Read-only ledger query interface the engine consumes.
///
/// All methods are pure reads and safe to retry; failures surface as
/// [`crate::Error::LedgerUnavailable`] with the underlying cause.
pub trait LedgerQuery {
    /// Loads an account snapshot. A missing account is a ledger-state
    /// failure, not a distinct condition.
    fn load_account(&self, id: &AccountId) -> Result<AccountRecord>;

    /// Loads one page of trade history for an asset pair, starting after
    /// `cursor` (or from the beginning when `None`). An empty page marks the
    /// end of history.
    fn load_trades(
        &self,
        base: &Asset,
        counter: &Asset,
        cursor: Option<&str>,
        limit: u32,
        order: SortOrder,
    ) -> Result<TradePage>;

    /// Current per-operation fee quote.
    fn fee_stats(&self) -> Result<u64>;
}

/// Fee quote with the fixed fallback applied on query failure.
pub fn estimate_fee<Q: LedgerQuery>(query: &Q) -> u64 {
    match query.fee_stats() {
        Ok(fee) => fee,
        Err(err) => {
            warn!("fee stats unavailable ({err}), falling back to {DEFAULT_BASE_FEE}");
            DEFAULT_BASE_FEE
        }
    }
}

use std::collections::HashMap;

use log::debug;

use crate::amount::Amount;
use crate::constants::TRADE_PAGE_LIMIT;
use crate::errors::Result;
use crate::ledger::query::LedgerQuery;
use crate::ledger::types::{AccountId, Asset, SortOrder};

/// A contributor reconstructed from the tracking-asset trade history.
/// Never persisted; recomputed on every distribute call.
#[derive(Debug, Clone, PartialEq)]
pub struct Contributor {
    pub account: AccountId,
    pub amount: Amount,
}

/// Replays the full trade history of the tracking asset against the native
/// asset, ascending from the beginning, page by page until an empty page.
///
/// The counter side of each trade is a contribution. Repeat contributions
/// from the same account are aggregated in first-seen order, so the
/// resulting list (and every draw over it) is deterministic for a given
/// ledger state. Returns the contributors and the running total.
pub fn collect_contributors<Q: LedgerQuery>(
    query: &Q,
    tracking_asset: &Asset,
) -> Result<(Vec<Contributor>, Amount)> {
    let mut contributors: Vec<Contributor> = Vec::new();
    let mut by_account: HashMap<AccountId, usize> = HashMap::new();
    let mut total = Amount::ZERO;
    let mut cursor: Option<String> = None;

    loop {
        let page = query.load_trades(
            tracking_asset,
            &Asset::Native,
            cursor.as_deref(),
            TRADE_PAGE_LIMIT,
            SortOrder::Ascending,
        )?;
        if page.records.is_empty() {
            break;
        }
        debug!("trade page: {} records", page.records.len());

        for trade in &page.records {
            total = total.checked_add(trade.counter_amount)?;
            match by_account.get(&trade.counter_account) {
                Some(&idx) => {
                    contributors[idx].amount =
                        contributors[idx].amount.checked_add(trade.counter_amount)?;
                }
                None => {
                    by_account.insert(trade.counter_account.clone(), contributors.len());
                    contributors.push(Contributor {
                        account: trade.counter_account.clone(),
                        amount: trade.counter_amount,
                    });
                }
            }
            cursor = Some(trade.paging_token.clone());
        }
    }

    debug!(
        "replayed {} contributors, total {}",
        contributors.len(),
        total
    );
    Ok((contributors, total))
}

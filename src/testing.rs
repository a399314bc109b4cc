//! In-memory ledger used by the lifecycle tests.

use std::collections::{BTreeMap, HashMap};

use crate::amount::Amount;
use crate::errors::{Error, Result};
use crate::ledger::query::LedgerQuery;
use crate::ledger::types::{
    AccountId, AccountRecord, Asset, BalanceRecord, SignerRecord, SortOrder, TradePage, TradeRecord,
};

pub struct MockLedger {
    accounts: HashMap<AccountId, AccountRecord>,
    trades: Vec<TradeRecord>,
    fee: Option<u64>,
    page_cap: u32,
}

impl MockLedger {
    pub fn new() -> Self {
        MockLedger {
            accounts: HashMap::new(),
            trades: Vec::new(),
            fee: Some(100),
            page_cap: u32::MAX,
        }
    }

    pub fn put_account(&mut self, account: AccountRecord) {
        self.accounts.insert(account.id.clone(), account);
    }

    /// Appends a contribution trade: the lottery sold tracking units, the
    /// contributor paid `amount` native.
    pub fn push_trade(&mut self, contributor: &str, amount: &str) {
        let amount: Amount = amount.parse().unwrap();
        self.trades.push(TradeRecord {
            paging_token: format!("{}-0", self.trades.len() + 1),
            base_account: AccountId::new("LOTTERY"),
            base_amount: amount,
            counter_account: AccountId::new(contributor),
            counter_amount: amount,
        });
    }

    pub fn fail_fee_stats(&mut self) {
        self.fee = None;
    }

    /// Caps page sizes below the requested limit to exercise pagination.
    pub fn set_page_cap(&mut self, cap: u32) {
        self.page_cap = cap;
    }
}

impl LedgerQuery for MockLedger {
    fn load_account(&self, id: &AccountId) -> Result<AccountRecord> {
        self.accounts
            .get(id)
            .cloned()
            .ok_or_else(|| Error::LedgerUnavailable(format!("account {id} not found")))
    }

    fn load_trades(
        &self,
        _base: &Asset,
        _counter: &Asset,
        cursor: Option<&str>,
        limit: u32,
        order: SortOrder,
    ) -> Result<TradePage> {
        assert_eq!(order, SortOrder::Ascending, "engine must replay ascending");

        let start = match cursor {
            None => 0,
            Some(token) => {
                self.trades
                    .iter()
                    .position(|t| t.paging_token == token)
                    .ok_or_else(|| Error::LedgerUnavailable("bad cursor".into()))?
                    + 1
            }
        };

        let page_size = limit.min(self.page_cap) as usize;
        let records = self
            .trades
            .iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect();
        Ok(TradePage { records })
    }

    fn fee_stats(&self) -> Result<u64> {
        self.fee
            .ok_or_else(|| Error::LedgerUnavailable("fee stats query failed".into()))
    }
}

/// Bare account with its own master key at weight 1.
pub fn basic_account(id: &str) -> AccountRecord {
    AccountRecord {
        id: AccountId::new(id),
        sequence: 1,
        balances: vec![],
        signers: vec![SignerRecord {
            key: AccountId::new(id),
            weight: 1,
        }],
        data: BTreeMap::new(),
    }
}

/// Account whose signer weights sum to zero, i.e. already locked.
pub fn locked_account(id: &str) -> AccountRecord {
    AccountRecord {
        id: AccountId::new(id),
        sequence: 1,
        balances: vec![],
        signers: vec![SignerRecord {
            key: AccountId::new(id),
            weight: 0,
        }],
        data: BTreeMap::new(),
    }
}

pub fn with_balance(mut account: AccountRecord, asset: Asset, amount: &str) -> AccountRecord {
    account.balances.push(BalanceRecord {
        asset,
        amount: amount.parse().unwrap(),
    });
    account
}

pub fn with_data(mut account: AccountRecord, key: &str, value: &str) -> AccountRecord {
    account.data.insert(key.to_string(), value.to_string());
    account
}

pub fn with_signer(mut account: AccountRecord, key: &str, weight: u8) -> AccountRecord {
    account.signers.push(SignerRecord {
        key: AccountId::new(key),
        weight,
    });
    account
}

/// Master account carrying the platform config and the lock quorum.
pub fn master_account(id: &str, quorum: &[&str]) -> AccountRecord {
    let mut account = basic_account(id);
    for member in quorum {
        account = with_signer(account, member, 1);
    }
    account = with_data(account, "creationFee", "10");
    account = with_data(account, "contributionFlatFee", "5");
    account = with_data(account, "contributionPerFee", "0.001");
    account
}

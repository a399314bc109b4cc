use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::amount::Amount;

/// Opaque ledger account identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        AccountId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives an account identifier deterministically from seed material,
    /// letting a caller predict the address before submission.
    pub fn derive(seed: &[u8]) -> Self {
        let digest = Sha256::digest(seed);
        AccountId(format!("L{}", hex::encode_upper(digest)))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A ledger asset: the native currency or an issued credit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Asset {
    Native,
    #[serde(rename_all = "camelCase")]
    Credit {
        code: String,
        issuer: AccountId,
    },
}

impl Asset {
    pub fn credit(code: impl Into<String>, issuer: AccountId) -> Self {
        Asset::Credit {
            code: code.into(),
            issuer,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }
}

/// A balance line on an account.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceRecord {
    pub asset: Asset,
    pub amount: Amount,
}

/// A signer entry on an account, including the account's own master key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerRecord {
    pub key: AccountId,
    pub weight: u8,
}

/// Read-only snapshot of a ledger account: balances, signer weights,
/// attached key/value data and the current sequence number.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountRecord {
    pub id: AccountId,
    pub sequence: i64,
    pub balances: Vec<BalanceRecord>,
    pub signers: Vec<SignerRecord>,
    pub data: BTreeMap<String, String>,
}

impl AccountRecord {
    pub fn balance(&self, asset: &Asset) -> Option<Amount> {
        self.balances
            .iter()
            .find(|b| &b.asset == asset)
            .map(|b| b.amount)
    }

    pub fn data_entry(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

/// One trade of the tracking asset against the counter asset. The counter
/// side carries the contributor account and the contributed amount.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub paging_token: String,
    pub base_account: AccountId,
    pub base_amount: Amount,
    pub counter_account: AccountId,
    pub counter_amount: Amount,
}

/// One page of trade history. An empty `records` list terminates paging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradePage {
    pub records: Vec<TradeRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

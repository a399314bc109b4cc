use serde::Serialize;

use crate::amount::Amount;
use crate::constants::MAX_OPERATIONS_PER_BUNDLE;
use crate::errors::{Error, Result};
use crate::ledger::types::{AccountId, Asset};

/// Offer price as a rational number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Price {
    pub n: u32,
    pub d: u32,
}

impl Price {
    /// Unit price, used by the matched contribution offers.
    pub const UNIT: Price = Price { n: 1, d: 1 };
}

/// A signer added or updated by a set-options operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSigner {
    pub key: AccountId,
    pub weight: u8,
}

/// One typed ledger operation. The engine only ever emits these; signing
/// and submission belong to the external submitter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Operation {
    #[serde(rename_all = "camelCase")]
    CreateAccount {
        source: AccountId,
        destination: AccountId,
        starting_balance: Amount,
    },
    #[serde(rename_all = "camelCase")]
    SetOptions {
        source: AccountId,
        master_weight: Option<u8>,
        low_threshold: Option<u8>,
        med_threshold: Option<u8>,
        high_threshold: Option<u8>,
        signer: Option<OperationSigner>,
    },
    #[serde(rename_all = "camelCase")]
    ChangeTrust { source: AccountId, asset: Asset },
    #[serde(rename_all = "camelCase")]
    SetTrustLineFlags {
        source: AccountId,
        trustor: AccountId,
        asset: Asset,
        authorized: bool,
    },
    #[serde(rename_all = "camelCase")]
    ManageSellOffer {
        source: AccountId,
        selling: Asset,
        buying: Asset,
        amount: Amount,
        price: Price,
    },
    #[serde(rename_all = "camelCase")]
    Payment {
        source: AccountId,
        destination: AccountId,
        asset: Asset,
        amount: Amount,
    },
    #[serde(rename_all = "camelCase")]
    ManageData {
        source: AccountId,
        name: String,
        value: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    BeginSponsoringFutureReserves {
        source: AccountId,
        sponsored_id: AccountId,
    },
    #[serde(rename_all = "camelCase")]
    EndSponsoringFutureReserves { source: AccountId },
}

/// An unsigned, ordered operation bundle plus the keys that must co-sign it.
///
/// The ledger applies the operations atomically inside one transaction
/// envelope; the engine relies on that and never splits a bundle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBlueprint {
    pub source: AccountId,
    pub base_fee: u64,
    /// Expiration window in seconds; 0 means no expiration.
    pub timeout_secs: u64,
    pub operations: Vec<Operation>,
    pub required_signers: Vec<AccountId>,
}

/// Accumulates operations for one bundle, enforcing the envelope cap.
#[derive(Debug)]
pub struct BundleBuilder {
    source: AccountId,
    base_fee: u64,
    operations: Vec<Operation>,
    required_signers: Vec<AccountId>,
}

impl BundleBuilder {
    pub fn new(source: AccountId, base_fee: u64) -> Self {
        BundleBuilder {
            source,
            base_fee,
            operations: Vec::new(),
            required_signers: Vec::new(),
        }
    }

    pub fn push(&mut self, op: Operation) -> Result<()> {
        if self.operations.len() >= MAX_OPERATIONS_PER_BUNDLE {
            return Err(Error::TooManyOperations);
        }
        self.operations.push(op);
        Ok(())
    }

    pub fn require_signer(&mut self, signer: &AccountId) {
        if !self.required_signers.contains(signer) {
            self.required_signers.push(signer.clone());
        }
    }

    pub fn build(self, timeout_secs: u64) -> TransactionBlueprint {
        TransactionBlueprint {
            source: self.source,
            base_fee: self.base_fee,
            timeout_secs,
            operations: self.operations,
            required_signers: self.required_signers,
        }
    }
}

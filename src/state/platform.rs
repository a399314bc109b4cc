use crate::amount::{Amount, Rate};
use crate::errors::{Error, Result};
use crate::ledger::types::{AccountId, AccountRecord};

/// Data-entry keys for the platform configuration on the master account.
pub mod keys {
    pub const CREATION_FEE: &str = "creationFee";
    pub const CONTRIBUTION_FLAT_FEE: &str = "contributionFlatFee";
    pub const CONTRIBUTION_PER_FEE: &str = "contributionPerFee";
}

/// The two well-known restricted accounts, supplied by the host per
/// network. Neither may appear as a lottery source or issuer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformAccounts {
    pub master: AccountId,
    pub fee_account: AccountId,
}

impl PlatformAccounts {
    pub fn new(master: AccountId, fee_account: AccountId) -> Self {
        PlatformAccounts {
            master,
            fee_account,
        }
    }

    pub fn is_restricted(&self, id: &AccountId) -> bool {
        id == &self.master || id == &self.fee_account
    }
}

/// Platform-wide fees and the lock quorum, read fresh from the master
/// account on every lifecycle call. The engine treats this as a read-only
/// snapshot; it is mutated only through the administrative surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformConfig {
    pub creation_fee: Amount,
    pub contribution_flat_fee: Amount,
    pub contribution_per_fee: Rate,
    /// The lock quorum: every signer on the master account except the
    /// master key itself.
    pub signers: Vec<AccountId>,
}

impl PlatformConfig {
    pub fn from_master_account(account: &AccountRecord, master: &AccountId) -> Result<Self> {
        let signers: Vec<AccountId> = account
            .signers
            .iter()
            .filter(|s| &s.key != master)
            .map(|s| s.key.clone())
            .collect();

        if signers.is_empty() {
            return Err(Error::MissingPlatformSigners);
        }

        let creation_fee = required(account, keys::CREATION_FEE)?
            .parse()
            .map_err(|_| Error::InvalidSetting(keys::CREATION_FEE))?;
        let contribution_flat_fee = required(account, keys::CONTRIBUTION_FLAT_FEE)?
            .parse()
            .map_err(|_| Error::InvalidSetting(keys::CONTRIBUTION_FLAT_FEE))?;
        let contribution_per_fee = required(account, keys::CONTRIBUTION_PER_FEE)?
            .parse()
            .map_err(|_| Error::InvalidSetting(keys::CONTRIBUTION_PER_FEE))?;

        Ok(PlatformConfig {
            creation_fee,
            contribution_flat_fee,
            contribution_per_fee,
            signers,
        })
    }
}

fn required<'a>(account: &'a AccountRecord, key: &'static str) -> Result<&'a str> {
    account
        .data_entry(key)
        .ok_or(Error::MissingPlatformSetting(key))
}

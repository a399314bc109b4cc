use crate::errors::{Error, Result};
use crate::ledger::ops::{BundleBuilder, Operation, OperationSigner};
use crate::ledger::types::{AccountId, AccountRecord};

/// Appends the operations that hand `account` over to the signer quorum:
/// one set-options per quorum member adding it with weight 1, then one
/// set-options zeroing the master weight and raising every action threshold
/// to the quorum size. The result is an N-of-N scheme; the account can act
/// only with unanimous quorum cosignature.
pub fn push_lock_ops(
    builder: &mut BundleBuilder,
    account: &AccountId,
    quorum: &[AccountId],
) -> Result<()> {
    let threshold: u8 = quorum.len().try_into().map_err(|_| Error::MathOverflow)?;

    for signer in quorum {
        builder.push(Operation::SetOptions {
            source: account.clone(),
            master_weight: None,
            low_threshold: None,
            med_threshold: None,
            high_threshold: None,
            signer: Some(OperationSigner {
                key: signer.clone(),
                weight: 1,
            }),
        })?;
    }

    builder.push(Operation::SetOptions {
        source: account.clone(),
        master_weight: Some(0),
        low_threshold: Some(threshold),
        med_threshold: Some(threshold),
        high_threshold: Some(threshold),
        signer: None,
    })
}

/// An account is locked once the sum of all its signer weights is 0, i.e.
/// the original owner key has been fully superseded.
pub fn is_locked(account: &AccountRecord) -> bool {
    account
        .signers
        .iter()
        .map(|s| s.weight as u32)
        .sum::<u32>()
        == 0
}

use log::info;
use serde::Deserialize;

use crate::amount::{Amount, Rate};
use crate::errors::{Error, Result};
use crate::ledger::ops::{BundleBuilder, Operation, TransactionBlueprint};
use crate::ledger::query::{estimate_fee, LedgerQuery};
use crate::state::platform::{keys, PlatformAccounts, PlatformConfig};

/// Partial update of the platform fee schedule. Absent fields keep their
/// current ledger value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigParams {
    pub creation_fee: Option<Amount>,
    pub contribution_flat_fee: Option<Amount>,
    pub contribution_per_fee: Option<Rate>,
}

/// Builds the administrative bundle that rewrites platform fee entries on
/// the master account. Only the entries being changed are touched.
///
/// Required co-signer: the master account itself.
pub fn update_config<Q: LedgerQuery>(
    query: &Q,
    platform: &PlatformAccounts,
    params: &UpdateConfigParams,
) -> Result<TransactionBlueprint> {
    if params.creation_fee.is_none()
        && params.contribution_flat_fee.is_none()
        && params.contribution_per_fee.is_none()
    {
        return Err(Error::EmptyConfigUpdate);
    }
    if params.creation_fee.is_some_and(Amount::is_negative)
        || params.contribution_flat_fee.is_some_and(Amount::is_negative)
        || params.contribution_per_fee.is_some_and(Rate::is_negative)
    {
        return Err(Error::InvalidAmount);
    }

    let master = query.load_account(&platform.master)?;
    // Validates the current state before amending it; a half-configured
    // master account surfaces here, not on the next contribution.
    PlatformConfig::from_master_account(&master, &platform.master)?;

    info!(
        "updateConfig: creationFee={:?} contributionFlatFee={:?} contributionPerFee={:?}",
        params.creation_fee, params.contribution_flat_fee, params.contribution_per_fee
    );

    let base_fee = estimate_fee(query);
    let mut bundle = BundleBuilder::new(platform.master.clone(), base_fee);

    let entries: [(&str, Option<String>); 3] = [
        (keys::CREATION_FEE, params.creation_fee.map(|a| a.to_string())),
        (
            keys::CONTRIBUTION_FLAT_FEE,
            params.contribution_flat_fee.map(|a| a.to_string()),
        ),
        (
            keys::CONTRIBUTION_PER_FEE,
            params.contribution_per_fee.map(|r| r.to_string()),
        ),
    ];
    for (name, value) in entries {
        if let Some(value) = value {
            bundle.push(Operation::ManageData {
                source: platform.master.clone(),
                name: name.to_string(),
                value: Some(value),
            })?;
        }
    }

    bundle.require_signer(&platform.master);
    Ok(bundle.build(0))
}

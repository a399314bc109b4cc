use log::info;
use serde::Deserialize;

use crate::amount::{Amount, Rate};
use crate::errors::{Error, Result};
use crate::ledger::ops::{BundleBuilder, Operation, TransactionBlueprint};
use crate::ledger::query::{estimate_fee, LedgerQuery};
use crate::ledger::types::{AccountId, AccountRecord, Asset};
use crate::state::platform::{PlatformAccounts, PlatformConfig};
use crate::state::settings::{DistributionCoeff, DistributionType, LotterySettings};
use crate::utils::lock::{is_locked, push_lock_ops};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParams {
    pub source: AccountId,
    pub asset_code: String,
    pub issuer: AccountId,
    /// Unix milliseconds; must be strictly in the future.
    #[serde(rename = "deadline")]
    pub deadline_ms: u64,
    pub threshold: Amount,
    pub finish_on_threshold: bool,
    pub distribution_type: DistributionType,
    #[serde(default)]
    pub distribution_coeff: Option<DistributionCoeff>,
    pub distribution_amount: Amount,
    pub contribution_amount: Amount,
    pub min_contribution_amount: Amount,
    pub contribution_flat_fee: Amount,
    pub contribution_per_fee: Rate,
    /// Optional seed material for the lottery account id, letting the
    /// caller predict the address before submission.
    #[serde(default)]
    pub account_seed: Option<String>,
}

/// Builds the lottery-creation bundle: sponsored account creation, the
/// quorum lock, the conditional issuer lock or prize transfer, the full
/// settings write, and the platform creation fee.
///
/// Required co-signers: the derived lottery account and the source.
pub fn create<Q: LedgerQuery>(
    query: &Q,
    platform: &PlatformAccounts,
    params: &CreateParams,
    now_ms: u64,
) -> Result<TransactionBlueprint> {
    validate(platform, params, now_ms)?;

    let master = query.load_account(&platform.master)?;
    let config = PlatformConfig::from_master_account(&master, &platform.master)?;
    let base_fee = estimate_fee(query);

    let source_account = query.load_account(&params.source)?;
    let issuer_account = query.load_account(&params.issuer)?;

    let lottery_id = derive_lottery_account(params, &source_account);
    let prize_asset = Asset::credit(params.asset_code.clone(), params.issuer.clone());
    let prize_balance = source_account.balance(&prize_asset);
    let issuer_locked = is_locked(&issuer_account);

    info!(
        "create: lottery={lottery_id} issuer_locked={issuer_locked} prize_balance={prize_balance:?}"
    );

    let mut bundle = BundleBuilder::new(params.source.clone(), base_fee);

    // The source sponsors every reserve the new account needs.
    bundle.push(Operation::BeginSponsoringFutureReserves {
        source: params.source.clone(),
        sponsored_id: lottery_id.clone(),
    })?;
    bundle.push(Operation::CreateAccount {
        source: params.source.clone(),
        destination: lottery_id.clone(),
        starting_balance: Amount::ZERO,
    })?;

    push_lock_ops(&mut bundle, &lottery_id, &config.signers)?;

    if !issuer_locked {
        bundle.push(Operation::BeginSponsoringFutureReserves {
            source: params.source.clone(),
            sponsored_id: params.issuer.clone(),
        })?;
        push_lock_ops(&mut bundle, &params.issuer, &config.signers)?;
        bundle.push(Operation::EndSponsoringFutureReserves {
            source: params.issuer.clone(),
        })?;
    } else if let Some(balance) = prize_balance {
        // Move the creator's prize holding under the locked lottery
        // account so it cannot be redirected later.
        bundle.push(Operation::ChangeTrust {
            source: lottery_id.clone(),
            asset: prize_asset.clone(),
        })?;
        bundle.push(Operation::Payment {
            source: params.source.clone(),
            destination: lottery_id.clone(),
            asset: prize_asset,
            amount: balance,
        })?;
    }

    let settings = settings_from_params(params);
    for (name, value) in settings.to_entries() {
        bundle.push(Operation::ManageData {
            source: lottery_id.clone(),
            name: name.to_string(),
            value: Some(value),
        })?;
    }

    bundle.push(Operation::EndSponsoringFutureReserves {
        source: lottery_id.clone(),
    })?;

    if config.creation_fee.is_positive() {
        bundle.push(Operation::Payment {
            source: params.source.clone(),
            destination: platform.fee_account.clone(),
            asset: Asset::Native,
            amount: config.creation_fee,
        })?;
    }

    bundle.require_signer(&lottery_id);
    bundle.require_signer(&params.source);
    Ok(bundle.build(0))
}

fn validate(platform: &PlatformAccounts, params: &CreateParams, now_ms: u64) -> Result<()> {
    if platform.is_restricted(&params.source) {
        return Err(Error::InvalidSource);
    }
    if platform.is_restricted(&params.issuer) {
        return Err(Error::InvalidIssuer);
    }
    if params.deadline_ms <= now_ms {
        return Err(Error::InvalidDeadline);
    }
    if !params.distribution_amount.is_positive()
        || !params.contribution_amount.is_positive()
        || params.min_contribution_amount.is_negative()
        || params.min_contribution_amount > params.contribution_amount
        || params.threshold.is_negative()
        || params.contribution_flat_fee.is_negative()
        || params.contribution_per_fee.is_negative()
    {
        return Err(Error::InvalidAmount);
    }
    Ok(())
}

fn derive_lottery_account(params: &CreateParams, source_account: &AccountRecord) -> AccountId {
    match &params.account_seed {
        Some(seed) => AccountId::derive(seed.as_bytes()),
        // Unique per submission: the source's sequence advances when the
        // creation transaction applies.
        None => AccountId::derive(
            format!("{}:{}", source_account.id, source_account.sequence).as_bytes(),
        ),
    }
}

fn settings_from_params(params: &CreateParams) -> LotterySettings {
    LotterySettings {
        created_by: params.source.clone(),
        asset_code: params.asset_code.clone(),
        issuer: params.issuer.clone(),
        deadline_ms: params.deadline_ms,
        threshold: params.threshold,
        finish_on_threshold: params.finish_on_threshold,
        distribution_type: params.distribution_type,
        distribution_coeff: params.distribution_coeff,
        distribution_amount: params.distribution_amount,
        contribution_amount: params.contribution_amount,
        min_contribution_amount: params.min_contribution_amount,
        contribution_flat_fee: params.contribution_flat_fee,
        contribution_per_fee: params.contribution_per_fee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::settings::keys;
    use crate::testing::{basic_account, locked_account, master_account, with_balance, MockLedger};
    use std::collections::BTreeMap;

    const NOW_MS: u64 = 1_600_000_000_000;

    fn params() -> CreateParams {
        CreateParams {
            source: AccountId::new("CREATOR"),
            asset_code: "GOLD".into(),
            issuer: AccountId::new("ISSUER"),
            deadline_ms: NOW_MS + 600_000, // ten minutes out
            threshold: "1000".parse().unwrap(),
            finish_on_threshold: true,
            distribution_type: DistributionType::Constant,
            distribution_coeff: Some(DistributionCoeff::Count(3)),
            distribution_amount: "5".parse().unwrap(),
            contribution_amount: "100".parse().unwrap(),
            min_contribution_amount: "1".parse().unwrap(),
            contribution_flat_fee: "0.5".parse().unwrap(),
            contribution_per_fee: "0.002".parse().unwrap(),
            account_seed: Some("predictable-seed".into()),
        }
    }

    fn platform() -> PlatformAccounts {
        PlatformAccounts::new(AccountId::new("MASTER"), AccountId::new("FEE"))
    }

    fn ledger() -> MockLedger {
        let mut ledger = MockLedger::new();
        ledger.put_account(master_account("MASTER", &["Q1", "Q2"]));
        ledger.put_account(basic_account("CREATOR"));
        ledger.put_account(basic_account("ISSUER"));
        ledger
    }

    fn settings_written(bundle: &TransactionBlueprint) -> BTreeMap<String, String> {
        bundle
            .operations
            .iter()
            .filter_map(|op| match op {
                Operation::ManageData {
                    name,
                    value: Some(value),
                    ..
                } => Some((name.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn creates_locks_and_writes_settings() {
        let bundle = create(&ledger(), &platform(), &params(), NOW_MS).unwrap();
        let lottery = AccountId::derive(b"predictable-seed");

        // Sponsorship bracket around everything the new account owns.
        assert!(matches!(
            &bundle.operations[0],
            Operation::BeginSponsoringFutureReserves { sponsored_id, .. } if sponsored_id == &lottery
        ));
        assert!(matches!(
            &bundle.operations[1],
            Operation::CreateAccount { destination, .. } if destination == &lottery
        ));

        // Quorum of two: two signer ops plus the threshold op.
        let lock_ops: Vec<_> = bundle.operations[2..5]
            .iter()
            .filter(|op| matches!(op, Operation::SetOptions { source, .. } if source == &lottery))
            .collect();
        assert_eq!(lock_ops.len(), 3);
        assert!(matches!(
            &bundle.operations[4],
            Operation::SetOptions {
                master_weight: Some(0),
                low_threshold: Some(2),
                ..
            }
        ));

        // Settings round-trip to the exact input values.
        let written = settings_written(&bundle);
        let parsed = LotterySettings::from_entries(&written).unwrap();
        assert_eq!(parsed, settings_from_params(&params()));
        assert_eq!(written.get(keys::DEADLINE).unwrap(), &(NOW_MS + 600_000).to_string());

        // Creation fee goes to the platform fee account, last.
        assert!(matches!(
            bundle.operations.last().unwrap(),
            Operation::Payment { destination, asset: Asset::Native, .. }
                if destination == &AccountId::new("FEE")
        ));

        assert_eq!(
            bundle.required_signers,
            vec![lottery, AccountId::new("CREATOR")]
        );
        assert_eq!(bundle.timeout_secs, 0);
    }

    #[test]
    fn unlocked_issuer_gets_locked_under_sponsorship() {
        let bundle = create(&ledger(), &platform(), &params(), NOW_MS).unwrap();
        let issuer = AccountId::new("ISSUER");

        let issuer_lock: Vec<_> = bundle
            .operations
            .iter()
            .filter(|op| matches!(op, Operation::SetOptions { source, .. } if source == &issuer))
            .collect();
        assert_eq!(issuer_lock.len(), 3); // two quorum signers + thresholds
        assert!(bundle.operations.iter().any(|op| matches!(
            op,
            Operation::BeginSponsoringFutureReserves { sponsored_id, .. } if sponsored_id == &issuer
        )));
    }

    #[test]
    fn locked_issuer_transfers_the_prize_balance_instead() {
        let mut ledger = ledger();
        ledger.put_account(locked_account("ISSUER"));
        ledger.put_account(with_balance(
            basic_account("CREATOR"),
            Asset::credit("GOLD", AccountId::new("ISSUER")),
            "42",
        ));

        let bundle = create(&ledger, &platform(), &params(), NOW_MS).unwrap();
        let lottery = AccountId::derive(b"predictable-seed");
        let issuer = AccountId::new("ISSUER");

        assert!(!bundle
            .operations
            .iter()
            .any(|op| matches!(op, Operation::SetOptions { source, .. } if source == &issuer)));
        assert!(bundle.operations.iter().any(|op| matches!(
            op,
            Operation::ChangeTrust { source, .. } if source == &lottery
        )));
        assert!(bundle.operations.iter().any(|op| matches!(
            op,
            Operation::Payment { destination, amount, .. }
                if destination == &lottery && amount.to_string() == "42.0000000"
        )));
    }

    #[test]
    fn rejects_restricted_accounts_deadline_and_bad_amounts() {
        let ledger = ledger();

        let mut p = params();
        p.source = AccountId::new("MASTER");
        assert_eq!(
            create(&ledger, &platform(), &p, NOW_MS),
            Err(Error::InvalidSource)
        );

        let mut p = params();
        p.issuer = AccountId::new("FEE");
        assert_eq!(
            create(&ledger, &platform(), &p, NOW_MS),
            Err(Error::InvalidIssuer)
        );

        let p = params();
        assert_eq!(
            create(&ledger, &platform(), &p, p.deadline_ms),
            Err(Error::InvalidDeadline)
        );

        let mut p = params();
        p.distribution_amount = Amount::ZERO;
        assert_eq!(
            create(&ledger, &platform(), &p, NOW_MS),
            Err(Error::InvalidAmount)
        );
    }

    #[test]
    fn missing_source_account_propagates_as_ledger_unavailable() {
        let mut ledger = MockLedger::new();
        ledger.put_account(master_account("MASTER", &["Q1"]));

        let err = create(&ledger, &platform(), &params(), NOW_MS).unwrap_err();
        assert!(matches!(err, Error::LedgerUnavailable(_)));
    }

    #[test]
    fn derivation_falls_back_to_source_and_sequence() {
        let mut p = params();
        p.account_seed = None;

        let a = create(&ledger(), &platform(), &p, NOW_MS).unwrap();
        let b = create(&ledger(), &platform(), &p, NOW_MS).unwrap();
        assert_eq!(a.required_signers[0], b.required_signers[0]);
        assert_ne!(a.required_signers[0], AccountId::derive(b"predictable-seed"));
    }

    #[test]
    fn fee_stats_failure_falls_back_to_the_default() {
        let mut ledger = ledger();
        ledger.fail_fee_stats();

        let bundle = create(&ledger, &platform(), &params(), NOW_MS).unwrap();
        assert_eq!(bundle.base_fee, crate::constants::DEFAULT_BASE_FEE);
    }
}

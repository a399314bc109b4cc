use log::{info, warn};
use serde::Deserialize;

use crate::amount::Amount;
use crate::constants::TRACKING_ASSET_CODE;
use crate::errors::{Error, Result};
use crate::ledger::ops::{BundleBuilder, Operation, Price, TransactionBlueprint};
use crate::ledger::query::{estimate_fee, LedgerQuery};
use crate::ledger::types::{AccountId, Asset};
use crate::state::platform::{PlatformAccounts, PlatformConfig};
use crate::state::settings::LotterySettings;
use crate::utils::fee::{split_contribution, FeeSchedule};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributeParams {
    pub crowdlottery_id: AccountId,
    pub source: AccountId,
    pub amount: Amount,
}

/// Builds a contribution bundle.
///
/// The contribution itself is a pair of matched unit-price offers between
/// the lottery account and the contributor over the lottery's tracking
/// asset: the resulting trade is the permanent, queryable contribution
/// record — no custom event log exists. The tracking trustline is
/// authorized only for the duration of the bundle.
///
/// Required co-signers: the contributor and the platform quorum (which
/// authorizes the lottery-account offer).
pub fn contribute<Q: LedgerQuery>(
    query: &Q,
    platform: &PlatformAccounts,
    params: &ContributeParams,
    now_ms: u64,
) -> Result<TransactionBlueprint> {
    if platform.is_restricted(&params.source) || params.source == params.crowdlottery_id {
        return Err(Error::InvalidSource);
    }
    if !params.amount.is_positive() {
        return Err(Error::InvalidAmount);
    }

    let lottery = query.load_account(&params.crowdlottery_id)?;
    let settings = LotterySettings::from_account(&lottery)?;
    let pooled = lottery.balance(&Asset::Native).unwrap_or(Amount::ZERO);

    if settings.is_finished(pooled, now_ms) {
        warn!(
            "contribution to {} rejected: window closed (pooled {pooled}, now {now_ms})",
            params.crowdlottery_id
        );
        return Err(Error::ContributionWindowClosed);
    }

    let master = query.load_account(&platform.master)?;
    let config = PlatformConfig::from_master_account(&master, &platform.master)?;

    // Existence check; a missing contributor account surfaces here rather
    // than at submission time.
    query.load_account(&params.source)?;

    if params.amount > settings.contribution_amount {
        return Err(Error::ContributionTooHigh);
    }

    let split = split_contribution(
        params.amount,
        &FeeSchedule {
            flat: config.contribution_flat_fee,
            per: config.contribution_per_fee,
        },
        &FeeSchedule {
            flat: settings.contribution_flat_fee,
            per: settings.contribution_per_fee,
        },
    )?;

    if !split.net.is_positive() || split.net < settings.min_contribution_amount {
        return Err(Error::ContributionTooLow);
    }

    info!(
        "contribute: {} -> {} net={} platform_fee={} creator_fee={}",
        params.source, params.crowdlottery_id, split.net, split.platform_fee, split.creator_fee
    );

    let tracking = Asset::credit(TRACKING_ASSET_CODE, params.crowdlottery_id.clone());
    let base_fee = estimate_fee(query);
    let mut bundle = BundleBuilder::new(params.source.clone(), base_fee);

    bundle.push(Operation::ChangeTrust {
        source: params.source.clone(),
        asset: tracking.clone(),
    })?;
    bundle.push(Operation::SetTrustLineFlags {
        source: params.crowdlottery_id.clone(),
        trustor: params.source.clone(),
        asset: tracking.clone(),
        authorized: true,
    })?;
    bundle.push(Operation::ManageSellOffer {
        source: params.crowdlottery_id.clone(),
        selling: tracking.clone(),
        buying: Asset::Native,
        amount: split.net,
        price: Price::UNIT,
    })?;
    bundle.push(Operation::ManageSellOffer {
        source: params.source.clone(),
        selling: Asset::Native,
        buying: tracking.clone(),
        amount: split.net,
        price: Price::UNIT,
    })?;
    bundle.push(Operation::SetTrustLineFlags {
        source: params.crowdlottery_id.clone(),
        trustor: params.source.clone(),
        asset: tracking,
        authorized: false,
    })?;

    if split.platform_fee.is_positive() {
        bundle.push(Operation::Payment {
            source: params.source.clone(),
            destination: platform.fee_account.clone(),
            asset: Asset::Native,
            amount: split.platform_fee,
        })?;
    }
    if split.creator_fee.is_positive() {
        bundle.push(Operation::Payment {
            source: params.source.clone(),
            destination: settings.created_by.clone(),
            asset: Asset::Native,
            amount: split.creator_fee,
        })?;
    }

    bundle.require_signer(&params.source);
    for signer in &config.signers {
        bundle.require_signer(signer);
    }
    Ok(bundle.build(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::settings::{keys, DistributionType};
    use crate::testing::{basic_account, locked_account, master_account, with_balance, with_data, MockLedger};
    use crate::ledger::types::AccountRecord;

    const NOW_MS: u64 = 1_600_000_000_000;
    const DEADLINE_MS: u64 = NOW_MS + 600_000;

    fn lottery_account() -> AccountRecord {
        let mut account = locked_account("LOTTERY");
        for (key, value) in [
            (keys::CREATED_BY, "CREATOR"),
            (keys::ASSET_CODE, "GOLD"),
            (keys::ISSUER, "ISSUER"),
            (keys::DEADLINE, "1600000600000"),
            (keys::THRESHOLD, "1000"),
            (keys::FINISH_ON_THRESHOLD, "true"),
            (keys::DISTRIBUTION_TYPE, "constant"),
            (keys::DISTRIBUTION_AMOUNT, "5"),
            (keys::CONTRIBUTION_AMOUNT, "100"),
            (keys::MIN_CONTRIBUTION_AMOUNT, "1"),
            (keys::CONTRIBUTION_FLAT_FEE, "0.5"),
            (keys::CONTRIBUTION_PER_FEE, "0.002"),
        ] {
            account = with_data(account, key, value);
        }
        account
    }

    fn ledger() -> MockLedger {
        let mut ledger = MockLedger::new();
        ledger.put_account(master_account("MASTER", &["Q1", "Q2"]));
        ledger.put_account(lottery_account());
        ledger.put_account(basic_account("ALICE"));
        ledger
    }

    fn platform() -> PlatformAccounts {
        PlatformAccounts::new(AccountId::new("MASTER"), AccountId::new("FEE"))
    }

    fn params(amount: &str) -> ContributeParams {
        ContributeParams {
            crowdlottery_id: AccountId::new("LOTTERY"),
            source: AccountId::new("ALICE"),
            amount: amount.parse().unwrap(),
        }
    }

    #[test]
    fn net_amount_matches_hand_computed_fixed_point() {
        // platform: flat 5, per 0.001; creator: flat 0.5, per 0.002
        // 21.5 - 5.0215 - 0.543 = 15.9355
        let bundle = contribute(&ledger(), &platform(), &params("21.5"), NOW_MS).unwrap();

        let offers: Vec<_> = bundle
            .operations
            .iter()
            .filter_map(|op| match op {
                Operation::ManageSellOffer { source, amount, price, .. } => {
                    Some((source.clone(), *amount, *price))
                }
                _ => None,
            })
            .collect();

        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].0, AccountId::new("LOTTERY"));
        assert_eq!(offers[1].0, AccountId::new("ALICE"));
        for (_, amount, price) in &offers {
            assert_eq!(amount.to_string(), "15.9355000");
            assert_eq!(*price, Price::UNIT);
        }
    }

    #[test]
    fn trustline_is_authorized_only_around_the_offers() {
        let bundle = contribute(&ledger(), &platform(), &params("21.5"), NOW_MS).unwrap();

        assert!(matches!(&bundle.operations[0], Operation::ChangeTrust { .. }));
        assert!(matches!(
            &bundle.operations[1],
            Operation::SetTrustLineFlags { authorized: true, .. }
        ));
        assert!(matches!(
            &bundle.operations[4],
            Operation::SetTrustLineFlags { authorized: false, .. }
        ));
    }

    #[test]
    fn fees_are_paid_to_platform_and_creator() {
        let bundle = contribute(&ledger(), &platform(), &params("21.5"), NOW_MS).unwrap();

        let payments: Vec<_> = bundle
            .operations
            .iter()
            .filter_map(|op| match op {
                Operation::Payment { destination, amount, .. } => {
                    Some((destination.as_str().to_string(), amount.to_string()))
                }
                _ => None,
            })
            .collect();

        assert_eq!(
            payments,
            vec![
                ("FEE".to_string(), "5.0215000".to_string()),
                ("CREATOR".to_string(), "0.5430000".to_string()),
            ]
        );
    }

    #[test]
    fn quorum_must_cosign() {
        let bundle = contribute(&ledger(), &platform(), &params("21.5"), NOW_MS).unwrap();
        assert_eq!(
            bundle.required_signers,
            vec![
                AccountId::new("ALICE"),
                AccountId::new("Q1"),
                AccountId::new("Q2")
            ]
        );
    }

    #[test]
    fn window_closed_is_an_unconditional_rejection() {
        // Past the deadline.
        assert_eq!(
            contribute(&ledger(), &platform(), &params("21.5"), DEADLINE_MS + 1),
            Err(Error::ContributionWindowClosed)
        );

        // Threshold reached with finishOnThreshold set.
        let mut ledger = ledger();
        ledger.put_account(with_balance(lottery_account(), Asset::Native, "1000"));
        assert_eq!(
            contribute(&ledger, &platform(), &params("21.5"), NOW_MS),
            Err(Error::ContributionWindowClosed)
        );
    }

    #[test]
    fn below_minimum_after_fees_is_rejected_with_no_operations() {
        // 6 - (5 + 0.006) - (0.5 + 0.012) = 0.482, below the minimum of 1.
        assert_eq!(
            contribute(&ledger(), &platform(), &params("6"), NOW_MS),
            Err(Error::ContributionTooLow)
        );

        // Fees exceed the contribution entirely.
        assert_eq!(
            contribute(&ledger(), &platform(), &params("3"), NOW_MS),
            Err(Error::ContributionTooLow)
        );
    }

    #[test]
    fn above_the_configured_maximum_is_rejected() {
        assert_eq!(
            contribute(&ledger(), &platform(), &params("100.0000001"), NOW_MS),
            Err(Error::ContributionTooHigh)
        );
    }

    #[test]
    fn restricted_sources_are_rejected() {
        let mut p = params("21.5");
        p.source = AccountId::new("MASTER");
        assert_eq!(
            contribute(&ledger(), &platform(), &p, NOW_MS),
            Err(Error::InvalidSource)
        );

        let mut p = params("21.5");
        p.source = AccountId::new("LOTTERY");
        assert_eq!(
            contribute(&ledger(), &platform(), &p, NOW_MS),
            Err(Error::InvalidSource)
        );
    }
}

use log::info;

use crate::constants::{DISTRIBUTE_TIMEOUT_SECS, MAX_PAYOUTS_PER_CALL, TRACKING_ASSET_CODE};
use crate::errors::{Error, Result};
use crate::ledger::ops::{BundleBuilder, Operation, TransactionBlueprint};
use crate::ledger::query::{estimate_fee, LedgerQuery};
use crate::ledger::types::{AccountId, Asset};
use crate::state::contributor::collect_contributors;
use crate::state::platform::{PlatformAccounts, PlatformConfig};
use crate::state::settings::{keys, last_distributed_index, DistributionType, LotterySettings};
use crate::utils::rng::{seed_from_trigger_hash, Mt19937};
use crate::utils::sampler::{draw_winners, winner_count};

#[derive(Debug, Clone)]
pub struct DistributeParams {
    pub crowdlottery_id: AccountId,
    /// Hash of the transaction that triggered this distribution; its
    /// suffix is the public, auditable draw seed.
    pub trigger_hash: Vec<u8>,
}

/// Outcome of a distribute call. A call with nothing left to pay is a
/// no-op success, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum DistributeOutcome {
    AlreadySettled,
    Payout(TransactionBlueprint),
}

/// Builds the next payout batch.
///
/// The winner list is a pure function of the trigger hash and the
/// contributor snapshot, so independent calls converge: each reads the
/// persisted `lastDistributedIndex`, pays the next slice (bounded by the
/// envelope cap, one slot reserved for the index advance), and persists the
/// new index in the same bundle. A racing call loses at submission on the
/// ledger's sequence check and must be retried as `ConcurrentModification`.
///
/// Required co-signers: the platform quorum.
pub fn distribute<Q: LedgerQuery>(
    query: &Q,
    platform: &PlatformAccounts,
    params: &DistributeParams,
) -> Result<DistributeOutcome> {
    let seed = seed_from_trigger_hash(&params.trigger_hash)?;

    let lottery = query.load_account(&params.crowdlottery_id)?;
    let settings = LotterySettings::from_account(&lottery)?;
    if settings.distribution_type != DistributionType::Constant {
        // `proportional` is a reserved extension point, not guessed at.
        return Err(Error::InvalidDistributionType);
    }

    let master = query.load_account(&platform.master)?;
    let config = PlatformConfig::from_master_account(&master, &platform.master)?;

    let tracking = Asset::credit(TRACKING_ASSET_CODE, params.crowdlottery_id.clone());
    let (contributors, total) = collect_contributors(query, &tracking)?;
    if contributors.is_empty() {
        return Err(Error::InsufficientContributors);
    }

    let k = winner_count(settings.distribution_coeff.as_ref(), contributors.len());
    let paid = last_distributed_index(&lottery)?;
    let start = (paid + 1) as usize;

    info!(
        "distribute: {} contributors, total {total}, k={k}, resuming at {start}, seed={seed}",
        contributors.len()
    );

    if start >= k {
        return Ok(DistributeOutcome::AlreadySettled);
    }

    let weights: Vec<i64> = contributors.iter().map(|c| c.amount.stroops()).collect();
    let mut rng = Mt19937::seed(seed);
    let winners = draw_winners(&weights, &mut rng, k)?;

    let end = k.min(start + MAX_PAYOUTS_PER_CALL);
    let prize = Asset::credit(settings.asset_code.clone(), settings.issuer.clone());
    let base_fee = estimate_fee(query);

    let mut bundle = BundleBuilder::new(params.crowdlottery_id.clone(), base_fee);
    for winner in &winners[start..end] {
        bundle.push(Operation::Payment {
            source: params.crowdlottery_id.clone(),
            destination: contributors[*winner].account.clone(),
            asset: prize.clone(),
            amount: settings.distribution_amount,
        })?;
    }
    bundle.push(Operation::ManageData {
        source: params.crowdlottery_id.clone(),
        name: keys::LAST_DISTRIBUTED_INDEX.to_string(),
        value: Some((end - 1).to_string()),
    })?;

    for signer in &config.signers {
        bundle.require_signer(signer);
    }
    Ok(DistributeOutcome::Payout(bundle.build(DISTRIBUTE_TIMEOUT_SECS)))
}

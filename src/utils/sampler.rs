use log::debug;

use crate::amount::SCALE;
use crate::errors::{Error, Result};
use crate::state::settings::DistributionCoeff;
use crate::utils::rng::Mt19937;

/// Number of winners for a contributor pool of size `n`.
///
/// - no coefficient → 1
/// - fraction in (0, 1) → `floor(coeff * n)`
/// - integer → that many winners
pub fn winner_count(coeff: Option<&DistributionCoeff>, n: usize) -> usize {
    match coeff {
        None => 1,
        Some(DistributionCoeff::Fraction(rate)) => {
            (n as u128 * rate.raw() as u128 / SCALE as u128) as usize
        }
        Some(DistributionCoeff::Count(c)) => *c as usize,
    }
}

/// Draws `k` distinct winner indices, weighted and without replacement.
///
/// Each round draws uniformly over the cumulative sum of the *remaining*
/// weight, then removes the selected entry from the pool, so the draw
/// terminates in exactly `k` rounds. Entries with non-positive weight are
/// never selectable. Fails with `InsufficientContributors` when fewer than
/// `k` selectable entries exist.
pub fn draw_winners(weights: &[i64], rng: &mut Mt19937, k: usize) -> Result<Vec<usize>> {
    let selectable = weights.iter().filter(|w| **w > 0).count();
    if k > selectable {
        return Err(Error::InsufficientContributors);
    }

    let mut excluded = vec![false; weights.len()];
    let mut winners = Vec::with_capacity(k);

    for round in 0..k {
        let total: i128 = weights
            .iter()
            .enumerate()
            .filter(|(idx, w)| !excluded[*idx] && **w > 0)
            .map(|(_, w)| *w as i128)
            .sum();

        let r = rng.next_below(total as u128) as i128;

        let mut cum: i128 = 0;
        let mut chosen = None;
        for idx in 0..weights.len() {
            if excluded[idx] || weights[idx] <= 0 {
                continue;
            }
            cum += weights[idx] as i128;
            if r < cum {
                chosen = Some(idx);
                break;
            }
        }

        // r < total guarantees a hit; guard anyway instead of unwrapping.
        let idx = chosen.ok_or(Error::InsufficientContributors)?;
        debug!("draw round {round}: r={r} total={total} -> index {idx}");
        excluded[idx] = true;
        winners.push(idx);
    }

    Ok(winners)
}

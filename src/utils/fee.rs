use crate::amount::{Amount, Rate};
use crate::errors::Result;

/// A flat + proportional fee schedule. The platform and the lottery creator
/// each define one, applied independently to every contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    pub flat: Amount,
    pub per: Rate,
}

/// `fee = amount * per + flat`, exact fixed point.
pub fn compute_fee(amount: Amount, schedule: &FeeSchedule) -> Result<Amount> {
    amount.apply_rate(schedule.per)?.checked_add(schedule.flat)
}

/// Result of applying both fee schedules to a contribution. `net` may be
/// negative; the caller rejects that as `ContributionTooLow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContributionSplit {
    pub net: Amount,
    pub platform_fee: Amount,
    pub creator_fee: Amount,
}

pub fn split_contribution(
    amount: Amount,
    platform: &FeeSchedule,
    creator: &FeeSchedule,
) -> Result<ContributionSplit> {
    let platform_fee = compute_fee(amount, platform)?;
    let creator_fee = compute_fee(amount, creator)?;
    let net = amount.checked_sub(platform_fee)?.checked_sub(creator_fee)?;

    Ok(ContributionSplit {
        net,
        platform_fee,
        creator_fee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(flat: &str, per: &str) -> FeeSchedule {
        FeeSchedule {
            flat: flat.parse().unwrap(),
            per: per.parse().unwrap(),
        }
    }

    #[test]
    fn fee_matches_hand_computed_fixed_point() {
        // 21.5 * 0.001 + 5 = 5.0215
        let fee = compute_fee("21.5".parse().unwrap(), &schedule("5", "0.001")).unwrap();
        assert_eq!(fee.to_string(), "5.0215000");
    }

    #[test]
    fn split_applies_both_schedules_independently() {
        let split = split_contribution(
            "21.5".parse().unwrap(),
            &schedule("5", "0.001"),
            &schedule("0.5", "0.002"),
        )
        .unwrap();

        assert_eq!(split.platform_fee.to_string(), "5.0215000");
        assert_eq!(split.creator_fee.to_string(), "0.5430000");
        // 21.5 - 5.0215 - 0.543 = 15.9355
        assert_eq!(split.net.to_string(), "15.9355000");
    }

    #[test]
    fn net_goes_negative_when_fees_exceed_the_contribution() {
        let split = split_contribution(
            "3".parse().unwrap(),
            &schedule("5", "0.001"),
            &schedule("0", "0"),
        )
        .unwrap();
        assert!(split.net.is_negative());
    }

    #[test]
    fn zero_schedules_pass_the_amount_through() {
        let split = split_contribution(
            "10".parse().unwrap(),
            &schedule("0", "0"),
            &schedule("0", "0"),
        )
        .unwrap();
        assert_eq!(split.net.to_string(), "10.0000000");
        assert_eq!(split.platform_fee, Amount::ZERO);
    }
}

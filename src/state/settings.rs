use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::amount::{Amount, Rate, SCALE};
use crate::errors::{Error, Result};
use crate::ledger::types::{AccountId, AccountRecord};

/// Data-entry keys under which the lottery settings live on the lottery
/// account. One key per field, explicit schema, no untyped lookups.
pub mod keys {
    pub const CREATED_BY: &str = "createdBy";
    pub const ASSET_CODE: &str = "assetCode";
    pub const ISSUER: &str = "issuer";
    pub const DEADLINE: &str = "deadline";
    pub const THRESHOLD: &str = "threshold";
    pub const FINISH_ON_THRESHOLD: &str = "finishOnThreshold";
    pub const DISTRIBUTION_TYPE: &str = "distributionType";
    pub const DISTRIBUTION_COEFF: &str = "distributionCoeff";
    pub const DISTRIBUTION_AMOUNT: &str = "distributionAmount";
    pub const CONTRIBUTION_AMOUNT: &str = "contributionAmount";
    pub const MIN_CONTRIBUTION_AMOUNT: &str = "minContributionAmount";
    pub const CONTRIBUTION_FLAT_FEE: &str = "contributionFlatFee";
    pub const CONTRIBUTION_PER_FEE: &str = "contributionPerFee";
    pub const LAST_DISTRIBUTED_INDEX: &str = "lastDistributedIndex";
}

/// Payout-amount policy. Only `constant` is implemented; `proportional` is
/// a reserved extension point that `distribute` refuses to guess at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionType {
    Constant,
    Proportional,
}

impl fmt::Display for DistributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributionType::Constant => f.write_str("constant"),
            DistributionType::Proportional => f.write_str("proportional"),
        }
    }
}

impl FromStr for DistributionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "constant" => Ok(DistributionType::Constant),
            "proportional" => Ok(DistributionType::Proportional),
            _ => Err(Error::InvalidDistributionType),
        }
    }
}

/// Winner-count control: a fraction of the contributor pool, or a fixed
/// count. Absent entirely means a single winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionCoeff {
    Fraction(Rate),
    Count(u32),
}

impl fmt::Display for DistributionCoeff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributionCoeff::Fraction(rate) => rate.fmt(f),
            DistributionCoeff::Count(c) => c.fmt(f),
        }
    }
}

impl FromStr for DistributionCoeff {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.contains('.') {
            let rate: Rate = s.parse().map_err(|_| Error::InvalidSetting(keys::DISTRIBUTION_COEFF))?;
            if rate.raw() <= 0 || rate.raw() >= SCALE {
                return Err(Error::InvalidSetting(keys::DISTRIBUTION_COEFF));
            }
            Ok(DistributionCoeff::Fraction(rate))
        } else {
            let count: u32 = s
                .parse()
                .map_err(|_| Error::InvalidSetting(keys::DISTRIBUTION_COEFF))?;
            if count == 0 {
                return Err(Error::InvalidSetting(keys::DISTRIBUTION_COEFF));
            }
            Ok(DistributionCoeff::Count(count))
        }
    }
}

impl Serialize for DistributionCoeff {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DistributionCoeff {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Lottery configuration, persisted as data entries on the lottery account
/// at creation and immutable afterwards (only `lastDistributedIndex`, kept
/// outside this struct, ever changes).
#[derive(Debug, Clone, PartialEq)]
pub struct LotterySettings {
    pub created_by: AccountId,
    pub asset_code: String,
    pub issuer: AccountId,
    /// Absolute deadline in unix milliseconds; contributions are invalid
    /// after it.
    pub deadline_ms: u64,
    /// Funding amount that may end the window early.
    pub threshold: Amount,
    pub finish_on_threshold: bool,
    pub distribution_type: DistributionType,
    pub distribution_coeff: Option<DistributionCoeff>,
    /// Prize paid to each winner.
    pub distribution_amount: Amount,
    /// Upper bound on a single contribution.
    pub contribution_amount: Amount,
    /// Lower bound on the net amount after fees.
    pub min_contribution_amount: Amount,
    pub contribution_flat_fee: Amount,
    pub contribution_per_fee: Rate,
}

fn required<'a>(data: &'a BTreeMap<String, String>, key: &'static str) -> Result<&'a str> {
    data.get(key)
        .map(String::as_str)
        .ok_or(Error::MissingSetting(key))
}

fn parse_with<T>(value: &str, key: &'static str) -> Result<T>
where
    T: FromStr,
{
    value.parse().map_err(|_| Error::InvalidSetting(key))
}

fn parse_bool(value: &str, key: &'static str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::InvalidSetting(key)),
    }
}

impl LotterySettings {
    pub fn from_account(account: &AccountRecord) -> Result<Self> {
        Self::from_entries(&account.data)
    }

    /// Parses the full schema, failing fast on the first missing or
    /// malformed entry.
    pub fn from_entries(data: &BTreeMap<String, String>) -> Result<Self> {
        Ok(LotterySettings {
            created_by: AccountId::new(required(data, keys::CREATED_BY)?),
            asset_code: required(data, keys::ASSET_CODE)?.to_string(),
            issuer: AccountId::new(required(data, keys::ISSUER)?),
            deadline_ms: parse_with(required(data, keys::DEADLINE)?, keys::DEADLINE)?,
            threshold: parse_with(required(data, keys::THRESHOLD)?, keys::THRESHOLD)?,
            finish_on_threshold: parse_bool(
                required(data, keys::FINISH_ON_THRESHOLD)?,
                keys::FINISH_ON_THRESHOLD,
            )?,
            distribution_type: required(data, keys::DISTRIBUTION_TYPE)?
                .parse()
                .map_err(|_| Error::InvalidSetting(keys::DISTRIBUTION_TYPE))?,
            distribution_coeff: match data.get(keys::DISTRIBUTION_COEFF) {
                Some(raw) => Some(raw.parse()?),
                None => None,
            },
            distribution_amount: parse_with(
                required(data, keys::DISTRIBUTION_AMOUNT)?,
                keys::DISTRIBUTION_AMOUNT,
            )?,
            contribution_amount: parse_with(
                required(data, keys::CONTRIBUTION_AMOUNT)?,
                keys::CONTRIBUTION_AMOUNT,
            )?,
            min_contribution_amount: parse_with(
                required(data, keys::MIN_CONTRIBUTION_AMOUNT)?,
                keys::MIN_CONTRIBUTION_AMOUNT,
            )?,
            contribution_flat_fee: parse_with(
                required(data, keys::CONTRIBUTION_FLAT_FEE)?,
                keys::CONTRIBUTION_FLAT_FEE,
            )?,
            contribution_per_fee: parse_with(
                required(data, keys::CONTRIBUTION_PER_FEE)?,
                keys::CONTRIBUTION_PER_FEE,
            )?,
        })
    }

    /// The ordered data-entry writes `create` emits. The coefficient entry
    /// is omitted when unset (absent means one winner).
    pub fn to_entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = vec![
            (keys::CREATED_BY, self.created_by.to_string()),
            (keys::ASSET_CODE, self.asset_code.clone()),
            (keys::ISSUER, self.issuer.to_string()),
            (keys::DEADLINE, self.deadline_ms.to_string()),
            (keys::THRESHOLD, self.threshold.to_string()),
            (keys::FINISH_ON_THRESHOLD, self.finish_on_threshold.to_string()),
            (keys::DISTRIBUTION_TYPE, self.distribution_type.to_string()),
        ];
        if let Some(coeff) = &self.distribution_coeff {
            entries.push((keys::DISTRIBUTION_COEFF, coeff.to_string()));
        }
        entries.extend([
            (keys::DISTRIBUTION_AMOUNT, self.distribution_amount.to_string()),
            (keys::CONTRIBUTION_AMOUNT, self.contribution_amount.to_string()),
            (
                keys::MIN_CONTRIBUTION_AMOUNT,
                self.min_contribution_amount.to_string(),
            ),
            (
                keys::CONTRIBUTION_FLAT_FEE,
                self.contribution_flat_fee.to_string(),
            ),
            (
                keys::CONTRIBUTION_PER_FEE,
                self.contribution_per_fee.to_string(),
            ),
        ]);
        entries
    }

    /// True once the contribution window has ended: the deadline passed, or
    /// the threshold was reached and the lottery finishes on threshold.
    pub fn is_finished(&self, pooled: Amount, now_ms: u64) -> bool {
        if now_ms > self.deadline_ms {
            return true;
        }
        self.finish_on_threshold && pooled >= self.threshold
    }
}

/// Reads the distribution progress marker; absent means nothing has been
/// paid yet (-1). Written exclusively by `distribute`, which only ever
/// stores indices >= 0, so anything below -1 is corrupt data.
pub fn last_distributed_index(account: &AccountRecord) -> Result<i64> {
    match account.data_entry(keys::LAST_DISTRIBUTED_INDEX) {
        None => Ok(-1),
        Some(raw) => {
            let index: i64 = raw
                .parse()
                .map_err(|_| Error::InvalidSetting(keys::LAST_DISTRIBUTED_INDEX))?;
            if index < -1 {
                return Err(Error::InvalidSetting(keys::LAST_DISTRIBUTED_INDEX));
            }
            Ok(index)
        }
    }
}

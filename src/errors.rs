use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Engine-wide error taxonomy.
///
/// Every variant carries a stable numeric reason code so automated callers
/// can branch without parsing messages:
/// - 1xx — validation, rejected before any ledger interaction, never retried
/// - 2xx — state, surfaced to the caller (`ConcurrentModification` is
///   retryable after re-reading ledger state)
/// - 3xx — settings / platform-config schema
/// - 4xx — ledger unavailability, propagated with the underlying cause
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    // ─────────────────────────────
    // Validation
    // ─────────────────────────────
    #[error("invalid source account")]
    InvalidSource,

    #[error("invalid issuer account")]
    InvalidIssuer,

    #[error("invalid deadline")]
    InvalidDeadline,

    #[error("invalid distributionType")]
    InvalidDistributionType,

    #[error("contribution is below the minimum after fees")]
    ContributionTooLow,

    #[error("contribution exceeds the configured maximum")]
    ContributionTooHigh,

    #[error("invalid amount")]
    InvalidAmount,

    #[error("config update contains no changes")]
    EmptyConfigUpdate,

    #[error("trigger hash is too short or not valid hex")]
    InvalidTriggerHash,

    // ─────────────────────────────
    // State
    // ─────────────────────────────
    #[error("contributions are not accepted anymore")]
    ContributionWindowClosed,

    #[error("not enough contributors for the requested winner count")]
    InsufficientContributors,

    #[error("distribution index advanced concurrently; re-read and retry")]
    ConcurrentModification,

    #[error("operation bundle exceeds the envelope limit")]
    TooManyOperations,

    #[error("arithmetic overflow")]
    MathOverflow,

    // ─────────────────────────────
    // Settings / platform config
    // ─────────────────────────────
    #[error("required setting `{0}` is not set")]
    MissingSetting(&'static str),

    #[error("setting `{0}` could not be parsed")]
    InvalidSetting(&'static str),

    #[error("platform signers are not set")]
    MissingPlatformSigners,

    #[error("platform setting `{0}` is not set")]
    MissingPlatformSetting(&'static str),

    // ─────────────────────────────
    // Ledger
    // ─────────────────────────────
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),
}

impl Error {
    /// Stable machine-checkable reason code.
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidSource => 101,
            Error::InvalidIssuer => 102,
            Error::InvalidDeadline => 103,
            Error::InvalidDistributionType => 104,
            Error::ContributionTooLow => 105,
            Error::InvalidAmount => 106,
            Error::EmptyConfigUpdate => 107,
            Error::InvalidTriggerHash => 108,
            Error::ContributionTooHigh => 109,

            Error::ContributionWindowClosed => 201,
            Error::InsufficientContributors => 202,
            Error::ConcurrentModification => 203,
            Error::TooManyOperations => 204,
            Error::MathOverflow => 205,

            Error::MissingSetting(_) => 301,
            Error::InvalidSetting(_) => 302,
            Error::MissingPlatformSigners => 303,
            Error::MissingPlatformSetting(_) => 304,

            Error::LedgerUnavailable(_) => 401,
        }
    }

    /// True for failures that may succeed after re-reading ledger state.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::ConcurrentModification | Error::LedgerUnavailable(_)
        )
    }
}

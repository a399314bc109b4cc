/// Asset code of the per-lottery tracking asset. Its trade history against
/// the native asset is the contribution record.
pub const TRACKING_ASSET_CODE: &str = "CL";

/// Per-operation fee used when the ledger fee-stats query fails.
pub const DEFAULT_BASE_FEE: u64 = 100_000;

/// Trade-history page size requested while replaying contributions.
pub const TRADE_PAGE_LIMIT: u32 = 200;

/// Hard cap the transaction envelope places on operations per bundle.
pub const MAX_OPERATIONS_PER_BUNDLE: usize = 100;

/// Payouts per distribute call. One slot is reserved for the
/// `lastDistributedIndex` advance that must ride in the same envelope.
pub const MAX_PAYOUTS_PER_CALL: usize = MAX_OPERATIONS_PER_BUNDLE - 1;

/// Expiration window for distribute bundles, in seconds. Create and
/// contribute bundles carry no expiration (timeout 0).
pub const DISTRIBUTE_TIMEOUT_SECS: u64 = 300;

//! Protocol constants. All monetary values in base units (1 COIN = 10^8 units).

pub const COIN: u64 = 100_000_000;

/// Rate scale: 10,000 basis points = 100%.
pub const BPS_PRECISION: u64 = 10_000;

/// Length of the accrual day in seconds. Dividends accrue per-second at
/// `rate / SECS_PER_DAY`; only the general-rate decay steps in whole days.
pub const SECS_PER_DAY: u64 = 86_400;

/// Daily dividend rate at pool creation: 4.90%.
pub const BASE_RATE_BPS: u64 = 490;

/// Hard floor for the daily dividend rate: 0.50%. Once the decay reaches
/// the floor the rate holds there forever.
pub const FLOOR_RATE_BPS: u64 = 50;

/// The general rate loses this much per full day elapsed since creation.
pub const RATE_DECAY_PER_DAY_BPS: u64 = 10;

/// A referred depositor's rate is boosted by this percentage of the
/// general rate at deposit time (490 → 539, 480 → 528, ...).
pub const REFERRAL_BONUS_PCT: u64 = 10;

/// Commission on a referred deposit per ancestor level, in basis points of
/// the newly deposited amount: 5% / 3% / 2% for levels 1 / 2 / 3.
pub const REFERRAL_COMMISSION_BPS: [u64; 3] = [500, 300, 200];

/// Ancestor-chain traversal bound. Links beyond the third hop never pay.
pub const MAX_REFERRAL_DEPTH: usize = 3;

/// A single dividend disbursement may not exceed this share of the pool
/// (99%), so a payout can never fully drain the contract.
pub const POOL_PAYOUT_CAP_BPS: u64 = 9_900;

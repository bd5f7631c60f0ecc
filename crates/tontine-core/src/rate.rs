//! Dividend rate schedule.
//!
//! The *general rate* is a single global value derived from time elapsed
//! since pool creation: it starts at
//! [`BASE_RATE_BPS`](crate::constants::BASE_RATE_BPS) (4.90%/day) and loses
//! [`RATE_DECAY_PER_DAY_BPS`](crate::constants::RATE_DECAY_PER_DAY_BPS)
//! per full elapsed day until it hits
//! [`FLOOR_RATE_BPS`](crate::constants::FLOOR_RATE_BPS) (0.50%/day) on day
//! 44, where it holds forever. The rate never recovers upward.
//!
//! The *personal rate* is the general rate at deposit time, boosted by 10%
//! for referred depositors (480 → 528). It is locked into the participant's
//! record per deposit; the decay only affects future deposits.

use crate::constants::{
    BASE_RATE_BPS, FLOOR_RATE_BPS, RATE_DECAY_PER_DAY_BPS, REFERRAL_BONUS_PCT, SECS_PER_DAY,
};

/// Number of full days in an elapsed span of seconds.
pub fn full_days(elapsed_secs: u64) -> u64 {
    elapsed_secs / SECS_PER_DAY
}

/// The general daily dividend rate after `elapsed_secs` since pool creation.
///
/// Linear decay in whole days, clamped at the floor:
/// `max(BASE - days * DECAY, FLOOR)`. At `elapsed_secs == 0` this is
/// exactly [`BASE_RATE_BPS`].
pub fn general_rate_bps(elapsed_secs: u64) -> u64 {
    let decayed = full_days(elapsed_secs).saturating_mul(RATE_DECAY_PER_DAY_BPS);
    BASE_RATE_BPS.saturating_sub(decayed).max(FLOOR_RATE_BPS)
}

/// The rate assigned to a depositor at deposit time.
///
/// Referred depositors receive the general rate plus
/// [`REFERRAL_BONUS_PCT`] percent of it; everyone else receives the
/// general rate exactly.
pub fn personal_rate_bps(elapsed_secs: u64, referred: bool) -> u64 {
    let general = general_rate_bps(elapsed_secs);
    if referred {
        general + general * REFERRAL_BONUS_PCT / 100
    } else {
        general
    }
}

/// Source of dividend rates, keyed by seconds elapsed since pool creation.
///
/// The production schedule is [`LinearDecaySchedule`]; tests can inject a
/// constant or steeper schedule through the same seam.
pub trait RateSchedule: Send + Sync {
    /// General daily dividend rate in basis points.
    fn general_rate_bps(&self, elapsed_secs: u64) -> u64;

    /// Rate assigned at deposit time, with the referral boost applied.
    ///
    /// Default implementation boosts the general rate by
    /// [`REFERRAL_BONUS_PCT`] percent for referred depositors.
    fn personal_rate_bps(&self, elapsed_secs: u64, referred: bool) -> u64 {
        let general = self.general_rate_bps(elapsed_secs);
        if referred {
            general + general * REFERRAL_BONUS_PCT / 100
        } else {
            general
        }
    }
}

/// The production rate schedule: linear whole-day decay with a floor.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearDecaySchedule;

impl LinearDecaySchedule {
    /// Create a new LinearDecaySchedule.
    pub fn new() -> Self {
        Self
    }
}

impl RateSchedule for LinearDecaySchedule {
    fn general_rate_bps(&self, elapsed_secs: u64) -> u64 {
        general_rate_bps(elapsed_secs)
    }
}

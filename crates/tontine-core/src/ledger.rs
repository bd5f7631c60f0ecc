//! Participant ledger: balances, locked rates, and dividend settlement.
//!
//! The ledger owns every monetary invariant of the pool: balances only
//! grow, no interval is ever settled twice, and the referrer link is
//! write-once. It performs no transfers itself; the processor plans
//! payouts against the pool and commits ledger mutations as one step.
//!
//! All arithmetic is integer-only with u128 intermediates. Sub-day
//! intervals accrue proportionally: one hour earns 1/24 of a day's
//! dividend, one minute 1/1440.

use std::collections::HashMap;

use tracing::debug;

use crate::constants::{BPS_PRECISION, SECS_PER_DAY};
use crate::error::LedgerError;
use crate::rate::RateSchedule;
use crate::types::{Address, Participant};

/// Dividend owed on `balance` at `rate_bps` per day over `elapsed_secs`.
///
/// `balance * rate * elapsed / (BPS_PRECISION * SECS_PER_DAY)`, truncating.
fn dividend_for(balance: u64, rate_bps: u64, elapsed_secs: u64) -> Result<u64, LedgerError> {
    if balance == 0 || elapsed_secs == 0 {
        return Ok(0);
    }
    let owed = (balance as u128)
        .checked_mul(rate_bps as u128)
        .and_then(|v| v.checked_mul(elapsed_secs as u128))
        .ok_or(LedgerError::ValueOverflow)?
        / (BPS_PRECISION as u128 * SECS_PER_DAY as u128);
    u64::try_from(owed).map_err(|_| LedgerError::ValueOverflow)
}

/// The participant map plus pool-wide aggregates.
///
/// Not thread-safe by design: the execution environment serializes
/// interactions, so there is nothing to lock.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Participant records by address. Entries are never removed.
    participants: HashMap<Address, Participant>,
    /// Sum of every amount ever deposited. Monotonic.
    total_deposits: u64,
    /// Pool creation time. Anchors the general-rate decay.
    created_at: u64,
}

impl Ledger {
    /// Create an empty ledger anchored at `created_at`.
    pub fn new(created_at: u64) -> Self {
        Self {
            participants: HashMap::new(),
            total_deposits: 0,
            created_at,
        }
    }

    /// Pool creation time (Unix seconds).
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Sum of all deposits ever made.
    pub fn total_deposits(&self) -> u64 {
        self.total_deposits
    }

    /// Number of participant records (including zero-balance touches).
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Full record for an address, if any interaction created one.
    pub fn participant(&self, addr: &Address) -> Option<&Participant> {
        self.participants.get(addr)
    }

    /// Accumulated deposit balance. Zero for unknown addresses.
    pub fn deposit_of(&self, addr: &Address) -> u64 {
        self.participants.get(addr).map_or(0, |p| p.balance)
    }

    /// The accrual rate locked at the address's most recent deposit.
    pub fn locked_rate_of(&self, addr: &Address) -> Option<u64> {
        self.participants.get(addr).map(|p| p.rate_bps)
    }

    /// Time of the address's first value-bearing deposit.
    pub fn joined_at(&self, addr: &Address) -> Option<u64> {
        self.participants.get(addr).and_then(|p| p.joined_at)
    }

    /// The address's recorded referrer.
    pub fn referrer_of(&self, addr: &Address) -> Option<Address> {
        self.participants.get(addr).and_then(|p| p.referrer)
    }

    /// Dividends owed to `addr` for the span since its last settlement.
    ///
    /// Pure view: does not advance the settlement mark. Zero for unknown
    /// addresses and for zero balances.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ClockRegression`] if `now` precedes the recorded
    /// settlement mark.
    pub fn dividends_owed(&self, addr: &Address, now: u64) -> Result<u64, LedgerError> {
        let Some(p) = self.participants.get(addr) else {
            return Ok(0);
        };
        let elapsed = now
            .checked_sub(p.last_settlement)
            .ok_or(LedgerError::ClockRegression {
                recorded: p.last_settlement,
                got: now,
            })?;
        dividend_for(p.balance, p.rate_bps, elapsed)
    }

    /// Settle dividends for `addr` up to `now`.
    ///
    /// Returns the owed amount and advances the settlement mark
    /// unconditionally, so a second call at the same `now` returns zero.
    /// First contact from an unknown address creates a zero-balance record
    /// at the current general rate (this is how a zero-value touch
    /// initializes a participant).
    ///
    /// # Errors
    ///
    /// [`LedgerError::ClockRegression`] if `now` precedes the recorded
    /// settlement mark (or pool creation, for a fresh record).
    pub fn settle(
        &mut self,
        addr: &Address,
        now: u64,
        schedule: &dyn RateSchedule,
    ) -> Result<u64, LedgerError> {
        if let Some(p) = self.participants.get_mut(addr) {
            let elapsed = now
                .checked_sub(p.last_settlement)
                .ok_or(LedgerError::ClockRegression {
                    recorded: p.last_settlement,
                    got: now,
                })?;
            let owed = dividend_for(p.balance, p.rate_bps, elapsed)?;
            p.last_settlement = now;
            debug!(addr = %addr, elapsed, owed, "settled");
            Ok(owed)
        } else {
            let elapsed = now
                .checked_sub(self.created_at)
                .ok_or(LedgerError::ClockRegression {
                    recorded: self.created_at,
                    got: now,
                })?;
            self.participants.insert(
                *addr,
                Participant {
                    balance: 0,
                    rate_bps: schedule.general_rate_bps(elapsed),
                    joined_at: None,
                    last_settlement: now,
                    referrer: None,
                },
            );
            Ok(0)
        }
    }

    /// Record a deposit of `amount` from `addr` at `now`.
    ///
    /// On the first value-bearing deposit this sets the join time and
    /// records `referrer_hint` (self-referral is ignored, not an error);
    /// both are immutable afterward and the hint is ignored on every later
    /// deposit. The locked accrual rate is recomputed from `schedule` on
    /// every deposit, using the participant's (possibly just-set) referral
    /// status.
    ///
    /// Callers are expected to settle the participant at `now` first; the
    /// processor does so as step one of every interaction. This method
    /// does not touch the settlement mark of a pre-existing record.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::ZeroDeposit`] if `amount` is zero (a zero-value
    ///   interaction is a settlement-only touch, handled by the caller)
    /// - [`LedgerError::ClockRegression`] if `now` precedes pool creation
    /// - [`LedgerError::ValueOverflow`] on balance or total overflow
    pub fn record_deposit(
        &mut self,
        addr: &Address,
        amount: u64,
        now: u64,
        referrer_hint: Option<Address>,
        schedule: &dyn RateSchedule,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroDeposit);
        }
        let elapsed = now
            .checked_sub(self.created_at)
            .ok_or(LedgerError::ClockRegression {
                recorded: self.created_at,
                got: now,
            })?;

        let new_total = self
            .total_deposits
            .checked_add(amount)
            .ok_or(LedgerError::ValueOverflow)?;

        let p = self.participants.entry(*addr).or_insert(Participant {
            balance: 0,
            rate_bps: 0,
            joined_at: None,
            last_settlement: now,
            referrer: None,
        });

        let first_deposit = p.joined_at.is_none();
        let new_balance = p
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::ValueOverflow)?;

        if first_deposit {
            p.joined_at = Some(now);
            if let Some(referrer) = referrer_hint {
                if referrer != *addr {
                    p.referrer = Some(referrer);
                }
            }
        }
        p.balance = new_balance;
        p.rate_bps = schedule.personal_rate_bps(elapsed, p.referrer.is_some());
        self.total_deposits = new_total;

        debug!(
            addr = %addr,
            amount,
            rate_bps = p.rate_bps,
            first_deposit,
            "deposit recorded"
        );
        Ok(())
    }
}

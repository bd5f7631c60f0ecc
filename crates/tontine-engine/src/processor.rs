//! The payout processor: the pool's single externally invoked entry point.
//!
//! Every inbound interaction (a deposit or a zero-value touch) runs the
//! same sequence: settle the caller's dividends, record the deposit (if
//! value is attached), pay the referral cascade on that fresh deposit, and
//! disburse the settled dividend. The whole sequence is atomic: the plan
//! phase performs every check against an immutable view, and only then does
//! the commit phase mutate the ledger and the pool, so an error never
//! leaves partial state behind.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tontine_core::constants::{BPS_PRECISION, POOL_PAYOUT_CAP_BPS};
use tontine_core::error::{EngineError, LedgerError};
use tontine_core::ledger::Ledger;
use tontine_core::rate::{LinearDecaySchedule, RateSchedule};
use tontine_core::referral;
use tontine_core::types::{Address, Transfer, TransferKind};

/// Outcome of one completed interaction.
///
/// The transfers are for the execution environment to deliver, in order:
/// commissions to ancestors first, then the caller's dividend. The pool has
/// already been debited for all of them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct InteractionReceipt {
    /// Dividend settled for the elapsed interval.
    pub dividend_owed: u64,
    /// Dividend actually disbursed after the pool cap. The difference, if
    /// any, is forfeited; the interval is settled either way.
    pub dividend_paid: u64,
    /// Value added to the caller's balance by this interaction.
    pub deposited: u64,
    /// Outbound payments, commissions first, dividend last.
    pub transfers: Vec<Transfer>,
}

/// The production payout engine: one ledger, one pool of funds, one rate
/// schedule behind a trait seam.
///
/// Interactions are strictly serialized by the execution environment, so
/// the processor holds no locks and tolerates no concurrent re-entry.
pub struct PayoutProcessor {
    ledger: Ledger,
    /// Contract fund pool in base units. Credited by every attached value,
    /// debited 1:1 by the transfers of completed interactions.
    pool: u64,
    schedule: Arc<dyn RateSchedule>,
}

impl fmt::Debug for PayoutProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayoutProcessor")
            .field("pool", &self.pool)
            .field("total_deposits", &self.ledger.total_deposits())
            .finish_non_exhaustive()
    }
}

impl PayoutProcessor {
    /// Create a processor anchored at `created_at` with the production
    /// linear-decay rate schedule.
    pub fn new(created_at: u64) -> Self {
        Self::with_schedule(created_at, Arc::new(LinearDecaySchedule::new()))
    }

    /// Create a processor with a custom rate schedule.
    pub fn with_schedule(created_at: u64, schedule: Arc<dyn RateSchedule>) -> Self {
        Self {
            ledger: Ledger::new(created_at),
            pool: 0,
            schedule,
        }
    }

    /// Process one inbound interaction from `caller` at `now`.
    ///
    /// With `attached_value > 0` this is a deposit (the environment has
    /// already delivered the value; the pool is credited here). With zero
    /// value it is a withdrawal touch: dividends settle and disburse, and a
    /// fresh address merely gets a record.
    ///
    /// `referrer_hint` is honored only on the caller's first value-bearing
    /// deposit and ignored in every other position.
    ///
    /// # Errors
    ///
    /// Any error aborts the whole interaction with no state change:
    ///
    /// - [`EngineError::InsufficientFunds`] if the pool cannot cover a
    ///   planned transfer (retryable once the pool is replenished)
    /// - [`LedgerError::ClockRegression`] if `now` precedes recorded state
    /// - [`LedgerError::ValueOverflow`] on balance, total, or pool overflow
    pub fn interact(
        &mut self,
        caller: Address,
        attached_value: u64,
        now: u64,
        referrer_hint: Option<Address>,
    ) -> Result<InteractionReceipt, EngineError> {
        // Plan: every fallible check runs against an immutable view.
        if now < self.ledger.created_at() {
            return Err(LedgerError::ClockRegression {
                recorded: self.ledger.created_at(),
                got: now,
            }
            .into());
        }
        let dividend_owed = self.ledger.dividends_owed(&caller, now)?;

        let mut commissions = Vec::new();
        if attached_value > 0 {
            self.ledger
                .deposit_of(&caller)
                .checked_add(attached_value)
                .ok_or(LedgerError::ValueOverflow)?;
            self.ledger
                .total_deposits()
                .checked_add(attached_value)
                .ok_or(LedgerError::ValueOverflow)?;

            // The cascade walks the caller's chain as of this deposit: for
            // a first deposit that chain starts at the accepted hint, which
            // is not in the ledger yet.
            let head = if self.ledger.joined_at(&caller).is_some() {
                self.ledger.referrer_of(&caller)
            } else {
                referrer_hint.filter(|r| *r != caller)
            };
            commissions = referral::plan_cascade_from(&self.ledger, head, attached_value, now);
        }

        let funded = self
            .pool
            .checked_add(attached_value)
            .ok_or(LedgerError::ValueOverflow)?;
        let mut available = funded;
        for t in &commissions {
            available = available
                .checked_sub(t.amount)
                .ok_or(EngineError::InsufficientFunds {
                    have: available,
                    need: t.amount,
                })?;
        }

        // A dividend disbursement never takes the last 1% of the pool; the
        // unpaid remainder is forfeited, not deferred.
        let payout_cap =
            ((available as u128) * (POOL_PAYOUT_CAP_BPS as u128) / (BPS_PRECISION as u128)) as u64;
        let dividend_paid = dividend_owed.min(payout_cap);
        if dividend_paid > available {
            return Err(EngineError::InsufficientFunds {
                have: available,
                need: dividend_paid,
            });
        }

        // Commit: mutations only, no remaining failure paths.
        let settled = self.ledger.settle(&caller, now, self.schedule.as_ref())?;
        if attached_value > 0 {
            self.ledger.record_deposit(
                &caller,
                attached_value,
                now,
                referrer_hint,
                self.schedule.as_ref(),
            )?;
        }
        self.pool = available - dividend_paid;

        let mut transfers = commissions;
        for t in &transfers {
            info!(to = %t.to, amount = t.amount, kind = ?t.kind, "commission paid");
        }
        if dividend_paid > 0 {
            transfers.push(Transfer {
                to: caller,
                amount: dividend_paid,
                kind: TransferKind::Dividend,
            });
        }
        if dividend_paid < settled {
            debug!(
                caller = %caller,
                owed = settled,
                paid = dividend_paid,
                "dividend clipped by pool cap"
            );
        }
        info!(
            caller = %caller,
            value = attached_value,
            dividend = dividend_paid,
            pool = self.pool,
            "interaction complete"
        );

        Ok(InteractionReceipt {
            dividend_owed: settled,
            dividend_paid,
            deposited: attached_value,
            transfers,
        })
    }

    // --- Read-only queries ---

    /// Accumulated deposit balance of an address.
    pub fn deposit_of(&self, addr: &Address) -> u64 {
        self.ledger.deposit_of(addr)
    }

    /// Sum of all deposits ever made.
    pub fn total_deposits(&self) -> u64 {
        self.ledger.total_deposits()
    }

    /// The general daily dividend rate evaluated at `now`.
    pub fn general_rate(&self, now: u64) -> u64 {
        self.schedule
            .general_rate_bps(now.saturating_sub(self.ledger.created_at()))
    }

    /// The rate the address would be assigned by a deposit at `now`:
    /// the current general rate, boosted if a referrer is on record.
    ///
    /// Accrual on the existing balance uses the separately queryable
    /// [`locked_rate_of`](Self::locked_rate_of) instead.
    pub fn personal_rate_of(&self, addr: &Address, now: u64) -> u64 {
        self.schedule.personal_rate_bps(
            now.saturating_sub(self.ledger.created_at()),
            self.ledger.referrer_of(addr).is_some(),
        )
    }

    /// The accrual rate locked at the address's most recent deposit.
    pub fn locked_rate_of(&self, addr: &Address) -> Option<u64> {
        self.ledger.locked_rate_of(addr)
    }

    /// Dividends owed but not yet settled, as of `now`.
    pub fn dividends_of(&self, addr: &Address, now: u64) -> Result<u64, EngineError> {
        Ok(self.ledger.dividends_owed(addr, now)?)
    }

    /// The address's recorded referrer.
    pub fn referrer_of(&self, addr: &Address) -> Option<Address> {
        self.ledger.referrer_of(addr)
    }

    /// Time of the address's first value-bearing deposit.
    pub fn joined_at(&self, addr: &Address) -> Option<u64> {
        self.ledger.joined_at(addr)
    }

    /// Current contract fund pool.
    pub fn pool_balance(&self) -> u64 {
        self.pool
    }

    /// Pool creation time.
    pub fn created_at(&self) -> u64 {
        self.ledger.created_at()
    }

    /// Read access to the underlying ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

//! Referral cascade: ancestor-chain traversal and commission planning.
//!
//! A referred deposit pays a one-time commission to up to three ancestors
//! (direct referrer first). Each level is gated by the ancestor's own
//! account age: level N pays only if the ancestor's first deposit is at
//! least N full days old at the moment of the triggering deposit. A level
//! that fails the gate is skipped permanently for that deposit; there is no
//! queue and no later re-evaluation.
//!
//! Commissions come out of the newly deposited amount, never out of
//! principal already on deposit.

use tracing::debug;

use crate::constants::{BPS_PRECISION, MAX_REFERRAL_DEPTH, REFERRAL_COMMISSION_BPS, SECS_PER_DAY};
use crate::ledger::Ledger;
use crate::types::{Address, Transfer, TransferKind};

/// Commission rate for a 1-based ancestor level, in basis points of the
/// triggering deposit. Zero for levels outside the cascade.
pub fn commission_bps(level: u8) -> u64 {
    REFERRAL_COMMISSION_BPS
        .get(level.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or(0)
}

/// Referral ancestors of `addr`, direct referrer first.
///
/// Stops at the first missing link and is hard-capped at
/// [`MAX_REFERRAL_DEPTH`] hops regardless of what the stored links claim,
/// so a corrupted or cyclic chain cannot run away.
pub fn ancestors_of(ledger: &Ledger, addr: &Address) -> Vec<Address> {
    ancestors_from(ledger, ledger.referrer_of(addr))
}

/// Ancestor chain starting from an explicit first link.
///
/// Used by the processor while a depositor's referrer hint is accepted but
/// not yet recorded: the hint is the chain head for that very deposit.
pub fn ancestors_from(ledger: &Ledger, head: Option<Address>) -> Vec<Address> {
    let mut chain = Vec::with_capacity(MAX_REFERRAL_DEPTH);
    let mut cursor = head;
    while let Some(ancestor) = cursor {
        chain.push(ancestor);
        if chain.len() == MAX_REFERRAL_DEPTH {
            break;
        }
        cursor = ledger.referrer_of(&ancestor);
    }
    chain
}

/// Whether `ancestor` may collect a level-`level` commission at `now`.
///
/// Requires a record with a first deposit at least `level` full days old.
/// An ancestor that never interacted, or never deposited, is ineligible;
/// a stale referrer link degrades to a skip, not an error.
pub fn is_eligible(ledger: &Ledger, ancestor: &Address, level: u8, now: u64) -> bool {
    match ledger.joined_at(ancestor) {
        Some(joined) => now.saturating_sub(joined) >= u64::from(level) * SECS_PER_DAY,
        None => false,
    }
}

/// Plan the commission transfers for a deposit of `amount` by `depositor`
/// at `now`.
///
/// Pure with respect to the ledger: the caller applies the transfers (or
/// discards the whole plan) as part of its atomic commit. Ineligible
/// levels and dust commissions that truncate to zero are omitted.
pub fn plan_cascade(
    ledger: &Ledger,
    depositor: &Address,
    amount: u64,
    now: u64,
) -> Vec<Transfer> {
    plan_cascade_from(ledger, ledger.referrer_of(depositor), amount, now)
}

/// [`plan_cascade`] with an explicit chain head, for a first deposit whose
/// referrer hint has been accepted but not yet recorded.
pub fn plan_cascade_from(
    ledger: &Ledger,
    head: Option<Address>,
    amount: u64,
    now: u64,
) -> Vec<Transfer> {
    let mut transfers = Vec::new();
    for (idx, ancestor) in ancestors_from(ledger, head).into_iter().enumerate() {
        let level = idx as u8 + 1;
        if !is_eligible(ledger, &ancestor, level, now) {
            debug!(ancestor = %ancestor, level, "commission withheld");
            continue;
        }
        let commission =
            ((amount as u128) * (commission_bps(level) as u128) / (BPS_PRECISION as u128)) as u64;
        if commission == 0 {
            continue;
        }
        transfers.push(Transfer {
            to: ancestor,
            amount: commission,
            kind: TransferKind::Commission { level },
        });
    }
    transfers
}

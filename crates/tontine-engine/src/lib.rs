//! # tontine-engine — Atomic payout processing for the Tontine pool.
//!
//! One entry point, [`PayoutProcessor::interact`], drives the whole
//! lifecycle per inbound interaction:
//! - **Settle**: dividends owed since the caller's last interaction, at the
//!   rate locked by its most recent deposit.
//! - **Deposit**: record attached value, re-lock the caller's rate from the
//!   decaying general schedule (with the referral boost where applicable).
//! - **Cascade**: one-time commissions to up to three referral ancestors,
//!   each gated by that ancestor's account age.
//! - **Disburse**: pay the settled dividend, capped at 99% of the pool.
//!
//! All checks run in a plan phase before any mutation, so a failed
//! interaction leaves no trace.

pub mod processor;

pub use processor::{InteractionReceipt, PayoutProcessor};

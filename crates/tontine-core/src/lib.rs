//! # tontine-core
//! Foundation types and pure logic for the Tontine deposit pool: the rate
//! schedule, the participant ledger, and the referral cascade planner.
//!
//! Everything here is deterministic: time and value enter as explicit
//! parameters, never from an ambient clock or transfer context, so the
//! whole engine is testable without a live execution environment.

pub mod constants;
pub mod error;
pub mod ledger;
pub mod rate;
pub mod referral;
pub mod types;

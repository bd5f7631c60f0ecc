//! Shared helpers for the Tontine end-to-end test suites.

pub mod helpers;

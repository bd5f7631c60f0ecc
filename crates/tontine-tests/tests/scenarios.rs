//! End-to-end scenarios for the Tontine pool.
//!
//! Each test drives the full engine through `PayoutProcessor::interact`
//! and checks balances, rates, commissions, and disbursed dividends against
//! the documented schedule. Dividend amounts are compared with a tolerance
//! of one millionth of a COIN to absorb integer truncation.

use tontine_core::constants::COIN;
use tontine_core::types::{Transfer, TransferKind};
use tontine_engine::InteractionReceipt;
use tontine_tests::helpers::*;

/// Rounding tolerance: 1e-6 COIN.
const TOL: u64 = COIN / 1_000_000;

// ======================================================================
// Deposits: balances and the running total
// ======================================================================

#[test]
fn deposit_works_at_least_once() {
    let mut p = pool();
    assert_eq!(p.deposit_of(&addr(1)), 0);
    assert_eq!(p.total_deposits(), 0);

    p.interact(addr(1), COIN, T0, None).unwrap();
    assert_eq!(p.deposit_of(&addr(1)), COIN);
    assert_eq!(p.total_deposits(), COIN);
}

#[test]
fn deposit_works_twice_from_one_address() {
    let mut p = pool();
    p.interact(addr(1), COIN, T0, None).unwrap();
    p.interact(addr(1), 2 * COIN, T0, None).unwrap();

    assert_eq!(p.deposit_of(&addr(1)), 3 * COIN);
    assert_eq!(p.total_deposits(), 3 * COIN);
}

#[test]
fn deposit_works_twice_from_different_addresses() {
    let mut p = pool();
    p.interact(addr(1), COIN, T0, None).unwrap();
    assert_eq!(p.deposit_of(&addr(1)), COIN);
    assert_eq!(p.deposit_of(&addr(2)), 0);
    assert_eq!(p.total_deposits(), COIN);

    p.interact(addr(2), 2 * COIN, T0, None).unwrap();
    assert_eq!(p.deposit_of(&addr(1)), COIN);
    assert_eq!(p.deposit_of(&addr(2)), 2 * COIN);
    assert_eq!(p.total_deposits(), 3 * COIN);
}

// ======================================================================
// Referral: boosted rates and the commission gates
// ======================================================================

#[test]
fn referred_depositor_receives_increased_dividends() {
    let mut p = pool();
    p.interact(addr(1), COIN, T0, None).unwrap();
    assert_eq!(p.personal_rate_of(&addr(1), T0), 490);

    // Day 1: the general rate has stepped down; a referred newcomer gets
    // the boosted version of it.
    let t1 = T0 + days(1) + 1;
    p.interact(addr(2), COIN, t1, Some(addr(1))).unwrap();
    assert_eq!(p.personal_rate_of(&addr(1), t1), 480);
    assert_eq!(p.personal_rate_of(&addr(2), t1), 528);

    // Day 2: a zero-value withdrawal pays one day of accrual at the
    // locked 528 bps.
    let t2 = T0 + days(2) + 1;
    let r = p.interact(addr(2), 0, t2, None).unwrap();
    assert_close(r.dividend_paid, COIN * 528 / 10_000, TOL);
}

#[test]
fn no_commission_to_first_referral_until_one_day() {
    let mut p = pool();
    p.interact(addr(1), COIN, T0, None).unwrap();

    let r = p.interact(addr(2), COIN, T0 + 10, Some(addr(1))).unwrap();
    assert!(
        r.transfers
            .iter()
            .all(|t| !matches!(t.kind, TransferKind::Commission { .. }))
    );
}

#[test]
fn commission_to_first_referral_after_one_day() {
    let mut p = pool();
    p.interact(addr(1), COIN, T0, None).unwrap();

    let r = p
        .interact(addr(2), COIN, T0 + days(1) + 1, Some(addr(1)))
        .unwrap();
    assert_eq!(
        r.transfers,
        vec![Transfer {
            to: addr(1),
            amount: COIN * 5 / 100,
            kind: TransferKind::Commission { level: 1 },
        }]
    );
}

#[test]
fn commission_to_second_referral_after_two_days() {
    let mut p = pool();
    p.interact(addr(1), COIN, T0, None).unwrap();
    p.interact(addr(2), COIN, T0 + days(1) + 1, Some(addr(1)))
        .unwrap();

    let r = p
        .interact(addr(3), COIN, T0 + days(2) + 2, Some(addr(2)))
        .unwrap();
    let commissions: Vec<_> = r
        .transfers
        .iter()
        .filter(|t| matches!(t.kind, TransferKind::Commission { .. }))
        .collect();
    assert_eq!(commissions.len(), 2);
    assert_eq!(commissions[0].to, addr(2));
    assert_eq!(commissions[0].amount, COIN * 5 / 100);
    assert_eq!(commissions[1].to, addr(1));
    assert_eq!(commissions[1].amount, COIN * 3 / 100);
}

#[test]
fn commission_to_third_referral_after_three_days() {
    let mut p = pool();
    p.interact(addr(1), COIN, T0, None).unwrap();
    p.interact(addr(2), COIN, T0 + days(1) + 1, Some(addr(1)))
        .unwrap();
    p.interact(addr(3), COIN, T0 + days(2) + 2, Some(addr(2)))
        .unwrap();

    let r = p
        .interact(addr(4), COIN, T0 + days(3) + 3, Some(addr(3)))
        .unwrap();
    assert_eq!(
        r.transfers,
        vec![
            Transfer {
                to: addr(3),
                amount: COIN * 5 / 100,
                kind: TransferKind::Commission { level: 1 },
            },
            Transfer {
                to: addr(2),
                amount: COIN * 3 / 100,
                kind: TransferKind::Commission { level: 2 },
            },
            Transfer {
                to: addr(1),
                amount: COIN * 2 / 100,
                kind: TransferKind::Commission { level: 3 },
            },
        ]
    );
}

// ======================================================================
// Withdrawals: zero-value interactions disburse accrued dividends
// ======================================================================

#[test]
fn withdrawal_without_deposit_pays_nothing() {
    let mut p = pool();
    p.interact(addr(1), COIN, T0, None).unwrap();

    let r = p.interact(addr(2), 0, T0 + days(1), None).unwrap();
    assert_eq!(r.dividend_paid, 0);
    assert!(r.transfers.is_empty());
}

#[test]
fn withdrawal_after_one_day() {
    let mut p = pool();
    p.interact(addr(1), COIN, T0, None).unwrap();

    let r = p.interact(addr(1), 0, T0 + days(1), None).unwrap();
    assert_close(r.dividend_paid, COIN * 49 / 1_000, TOL);
}

#[test]
fn withdrawal_after_one_hour() {
    let mut p = pool();
    p.interact(addr(1), COIN, T0, None).unwrap();

    let r = p.interact(addr(1), 0, T0 + 3_600, None).unwrap();
    assert_close(r.dividend_paid, COIN / 24 * 49 / 1_000, TOL);
}

#[test]
fn withdrawal_after_one_minute() {
    let mut p = pool();
    p.interact(addr(1), COIN, T0, None).unwrap();

    let r = p.interact(addr(1), 0, T0 + 60, None).unwrap();
    assert_close(r.dividend_paid, COIN / (24 * 60) * 49 / 1_000, TOL);
}

#[test]
fn withdrawal_after_five_days() {
    let mut p = pool();
    p.interact(addr(1), COIN, T0, None).unwrap();

    let r = p.interact(addr(1), 0, T0 + days(5), None).unwrap();
    assert_close(r.dividend_paid, 5 * COIN * 49 / 1_000, TOL);
}

// ======================================================================
// Long-run decay: the floor and the pool cap
// ======================================================================

#[test]
fn worst_rate_is_half_percent_after_100_days() {
    let mut p = pool();
    p.interact(addr(1), COIN, T0, None).unwrap();

    let r = p.interact(addr(1), 0, T0 + days(100), None).unwrap();
    // Accrual at the locked 490 bps dwarfs the 1 COIN pool; the payout is
    // clipped to 99% of it and the rest is forfeited.
    assert_close(r.dividend_paid, COIN * 99 / 100, TOL);
    assert_eq!(p.general_rate(T0 + days(100)), 50);
}

#[test]
fn forfeited_remainder_is_not_owed_later() {
    let mut p = pool();
    p.interact(addr(1), COIN, T0, None).unwrap();
    p.interact(addr(1), 0, T0 + days(100), None).unwrap();

    // Immediately after the clipped payout nothing further is owed.
    assert_eq!(p.dividends_of(&addr(1), T0 + days(100)).unwrap(), 0);
}

// ======================================================================
// Receipts are plain data
// ======================================================================

#[test]
fn receipt_survives_json_round_trip() {
    let mut p = pool();
    p.interact(addr(1), COIN, T0, None).unwrap();
    let r = p
        .interact(addr(2), COIN, T0 + days(1) + 1, Some(addr(1)))
        .unwrap();

    let json = serde_json::to_string_pretty(&r).unwrap();
    let back: InteractionReceipt = serde_json::from_str(&json).unwrap();
    assert_eq!(back, r);
    assert!(json.contains("Commission"));
}

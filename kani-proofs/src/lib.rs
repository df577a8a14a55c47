//! Kani formal verification for slashbond slash math.
//!
//! ZERO dependencies. Pure Rust. CBMC-friendly.
//!
//! KEY DESIGN DECISION: Functions use u32 inputs / u64 intermediates.
//! The production code uses u64/u128 with a 10^18 scale, but the
//! arithmetic properties (bounds, conservation, monotonicity, cap) are
//! scale-invariant. u32 with a 10^6 scale keeps SAT formulas tractable
//! for CBMC (<60s per proof).
//!
//! Run all:   cargo kani --lib
//! Run one:   cargo kani --harness proof_unslashed_bond_exact

// ═══════════════════════════════════════════════════════════════
// Slash Math (u32/u64 mirror of slashbond/src/math.rs)
// Arithmetic is IDENTICAL — just narrower types for CBMC tractability.
// ═══════════════════════════════════════════════════════════════

/// Scaled-down slash cap: 10^6 points = 100% slashed.
pub const MAX_SLASH: u32 = 1_000_000;

/// Accumulate slash points; None past the cap.
pub fn apply_slash(current: u32, points: u32) -> Option<u32> {
    let new_total = current.checked_add(points)?;
    if new_total > MAX_SLASH {
        None
    } else {
        Some(new_total)
    }
}

/// Slash-adjusted payout. floor(amount * (MAX - points) / (MAX - start)).
pub fn calc_withdraw_amount(amount: u32, slash_points: u32, slashed_at_start: u32) -> Option<u32> {
    if slash_points > MAX_SLASH || slashed_at_start >= MAX_SLASH {
        return None;
    }
    let payout = (amount as u64)
        .checked_mul((MAX_SLASH - slash_points) as u64)?
        .checked_div((MAX_SLASH - slashed_at_start) as u64)?;
    if payout > u32::MAX as u64 {
        None
    } else {
        Some(payout as u32)
    }
}

/// Burned remainder on exit.
pub fn burn_amount(amount: u32, payout: u32) -> Option<u32> {
    amount.checked_sub(payout)
}

// ═══════════════════════════════════════════════════════════════
// KANI PROOFS
// ═══════════════════════════════════════════════════════════════

#[cfg(kani)]
mod proofs {
    use super::*;

    // ── 1. Bounds ──

    /// Payout never exceeds the bonded amount for any consistent bond.
    #[kani::proof]
    fn proof_payout_bounded_by_amount() {
        let amount: u32 = kani::any();
        let start: u32 = kani::any();
        let points: u32 = kani::any();

        kani::assume(start < MAX_SLASH);
        kani::assume(points >= start);
        kani::assume(points <= MAX_SLASH);

        let payout = calc_withdraw_amount(amount, points, start).unwrap();
        assert!(payout <= amount);
    }

    /// A fully slashed pool pays exactly zero.
    #[kani::proof]
    fn proof_fully_slashed_pays_zero() {
        let amount: u32 = kani::any();
        let start: u32 = kani::any();

        kani::assume(start < MAX_SLASH);

        let payout = calc_withdraw_amount(amount, MAX_SLASH, start).unwrap();
        assert_eq!(payout, 0);
    }

    // ── 2. Conservation ──

    /// payout + burn reconstructs the bonded amount exactly.
    #[kani::proof]
    fn proof_settlement_conserves() {
        let amount: u32 = kani::any();
        let start: u32 = kani::any();
        let points: u32 = kani::any();

        kani::assume(start < MAX_SLASH);
        kani::assume(points >= start);
        kani::assume(points <= MAX_SLASH);

        let payout = calc_withdraw_amount(amount, points, start).unwrap();
        let burned = burn_amount(amount, payout).unwrap();
        assert_eq!(payout as u64 + burned as u64, amount as u64);
    }

    // ── 3. Exactness ──

    /// No slashing since bond creation means a whole exit.
    #[kani::proof]
    fn proof_unslashed_bond_exact() {
        let amount: u32 = kani::any();
        let start: u32 = kani::any();

        kani::assume(start < MAX_SLASH);

        let payout = calc_withdraw_amount(amount, start, start).unwrap();
        assert_eq!(payout, amount);
    }

    // ── 4. Monotonicity ──

    /// More slashing never increases a payout.
    #[kani::proof]
    fn proof_payout_monotone_in_points() {
        let amount: u32 = kani::any();
        let start: u32 = kani::any();
        let points_a: u32 = kani::any();
        let points_b: u32 = kani::any();

        kani::assume(start < MAX_SLASH);
        kani::assume(points_a >= start && points_a <= MAX_SLASH);
        kani::assume(points_b >= points_a && points_b <= MAX_SLASH);

        let pay_a = calc_withdraw_amount(amount, points_a, start).unwrap();
        let pay_b = calc_withdraw_amount(amount, points_b, start).unwrap();
        assert!(pay_b <= pay_a);
    }

    /// A larger bond never pays less.
    #[kani::proof]
    fn proof_payout_monotone_in_amount() {
        let amount: u32 = kani::any();
        let start: u32 = kani::any();
        let points: u32 = kani::any();

        kani::assume(amount < u32::MAX);
        kani::assume(start < MAX_SLASH);
        kani::assume(points >= start && points <= MAX_SLASH);

        let small = calc_withdraw_amount(amount, points, start).unwrap();
        let large = calc_withdraw_amount(amount + 1, points, start).unwrap();
        assert!(large >= small);
    }

    // ── 5. Rounding Direction ──

    /// Payout floors: it underestimates, never overestimates.
    #[kani::proof]
    fn proof_payout_rounds_down() {
        let amount: u32 = kani::any();
        let start: u32 = kani::any();
        let points: u32 = kani::any();

        kani::assume(start < MAX_SLASH);
        kani::assume(points >= start && points <= MAX_SLASH);

        let payout = calc_withdraw_amount(amount, points, start).unwrap();
        let numer = (amount as u64) * ((MAX_SLASH - points) as u64);
        let denom = (MAX_SLASH - start) as u64;
        assert!((payout as u64) * denom <= numer);
        assert!(numer < (payout as u64 + 1) * denom);
    }

    // ── 6. Slash Cap ──

    /// Accumulated totals stay within [current, MAX_SLASH].
    #[kani::proof]
    fn proof_slash_capped_and_monotone() {
        let current: u32 = kani::any();
        let points: u32 = kani::any();

        kani::assume(current <= MAX_SLASH);

        if let Some(total) = apply_slash(current, points) {
            assert!(total >= current);
            assert!(total <= MAX_SLASH);
        }
    }

    /// Slashing past 100% is always rejected.
    #[kani::proof]
    fn proof_slash_past_cap_rejected() {
        let current: u32 = kani::any();
        let points: u32 = kani::any();

        kani::assume(current <= MAX_SLASH);
        kani::assume(points > MAX_SLASH - current);

        assert!(apply_slash(current, points).is_none());
    }

    // ── 7. Totality ──

    /// No input panics any of the three functions.
    #[kani::proof]
    fn proof_no_panic_any_input() {
        let a: u32 = kani::any();
        let b: u32 = kani::any();
        let c: u32 = kani::any();

        let _ = calc_withdraw_amount(a, b, c);
        let _ = apply_slash(a, b);
        let _ = burn_amount(a, b);
    }
}

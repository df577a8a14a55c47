//! Pure slash math — extracted for Kani formal verification.
//!
//! No Solana/Pubkey dependencies. Just arithmetic.
//! Kani can verify these functions exhaustively.

/// Slash-point scale: a pool with this many points is 100% slashed.
pub const MAX_SLASH: u64 = 1_000_000_000_000_000_000;

/// Unbonding timelock in seconds (30 days).
pub const UNBOND_DELAY_SECS: i64 = 30 * 24 * 60 * 60;

/// Accumulate slash points for a pool.
///
/// # Arguments
/// * `current` - The pool's cumulative slash points so far
/// * `points` - Points being added by this slash
///
/// # Returns
/// * `Some(new_total)` - Updated cumulative total
/// * `None` - Addition overflows or the total would exceed `MAX_SLASH`
///
/// # Invariant
/// A returned total is always in `[current, MAX_SLASH]`, so pool points
/// never decrease and never pass 100%.
pub fn apply_slash(current: u64, points: u64) -> Option<u64> {
    let new_total = current.checked_add(points)?;
    if new_total > MAX_SLASH {
        None
    } else {
        Some(new_total)
    }
}

/// Slash-adjusted withdrawal amount.
///
/// # Arguments
/// * `amount` - Originally bonded amount (base token units)
/// * `slash_points` - Live cumulative slash points of the bond's pool
/// * `slashed_at_start` - Pool slash points frozen when the bond was created
///
/// # Returns
/// * `Some(payout)` - `amount * (MAX_SLASH - slash_points) / (MAX_SLASH - slashed_at_start)`,
///   rounded DOWN (burn-favoring)
/// * `None` - `slash_points` above the scale, or `slashed_at_start >= MAX_SLASH`
///   (bonds are never created in a fully slashed pool, so a live record
///   always has a non-zero denominator)
///
/// # Invariant
/// Multiplies before dividing via u128 — the product is at most
/// `u64::MAX * MAX_SLASH < 2^124`, so the intermediate cannot overflow.
/// Whenever `slashed_at_start <= slash_points`, payout <= amount.
pub fn calc_withdraw_amount(amount: u64, slash_points: u64, slashed_at_start: u64) -> Option<u64> {
    if slash_points > MAX_SLASH || slashed_at_start >= MAX_SLASH {
        return None;
    }
    let payout = (amount as u128)
        .checked_mul((MAX_SLASH - slash_points) as u128)?
        .checked_div((MAX_SLASH - slashed_at_start) as u128)?;
    if payout > u64::MAX as u128 {
        None
    } else {
        Some(payout as u64)
    }
}

/// Portion of a bond lost to slashing on exit.
///
/// # Returns
/// * `Some(burned)` if `payout <= amount`
/// * `None` if accounting is broken (payout exceeds the bonded amount)
pub fn burn_amount(amount: u64, payout: u64) -> Option<u64> {
    amount.checked_sub(payout)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── apply_slash ──

    #[test]
    fn test_slash_accumulates() {
        assert_eq!(apply_slash(0, 200), Some(200));
        assert_eq!(apply_slash(200, 300), Some(500));
    }

    #[test]
    fn test_slash_to_exact_cap_allowed() {
        assert_eq!(apply_slash(MAX_SLASH - 1, 1), Some(MAX_SLASH));
        assert_eq!(apply_slash(0, MAX_SLASH), Some(MAX_SLASH));
    }

    #[test]
    fn test_slash_past_cap_rejected() {
        assert_eq!(apply_slash(MAX_SLASH, 1), None);
        assert_eq!(apply_slash(MAX_SLASH - 10, 11), None);
    }

    #[test]
    fn test_slash_u64_overflow_rejected() {
        assert_eq!(apply_slash(u64::MAX, 1), None);
    }

    #[test]
    fn test_zero_point_slash_is_identity() {
        assert_eq!(apply_slash(123_456, 0), Some(123_456));
    }

    // ── calc_withdraw_amount ──

    #[test]
    fn test_unslashed_pool_pays_full_amount() {
        assert_eq!(calc_withdraw_amount(1_000, 0, 0), Some(1_000));
    }

    #[test]
    fn test_fresh_bond_slashed_20_percent() {
        // Bond 1000 at zero points, pool then slashed by 2*10^17 (20%).
        let points = 200_000_000_000_000_000;
        assert_eq!(calc_withdraw_amount(1_000, points, 0), Some(800));
    }

    #[test]
    fn test_bond_into_already_slashed_pool() {
        // Bond 1000 when the pool already sits at 2*10^17; a further
        // 1*10^17 lands later. Only the post-bond slash haircuts:
        // 1000 * (1e18 - 3e17) / (1e18 - 2e17) = 1000 * 7/8 = 875.
        let at_start = 200_000_000_000_000_000;
        let live = 300_000_000_000_000_000;
        assert_eq!(calc_withdraw_amount(1_000, live, at_start), Some(875));
    }

    #[test]
    fn test_points_unchanged_since_start_exact() {
        let at_start = 200_000_000_000_000_000;
        assert_eq!(calc_withdraw_amount(1_000, at_start, at_start), Some(1_000));
    }

    #[test]
    fn test_fully_slashed_pool_pays_zero() {
        assert_eq!(calc_withdraw_amount(1_000, MAX_SLASH, 0), Some(0));
    }

    #[test]
    fn test_denominator_guard() {
        // A snapshot at 100% cannot belong to a live bond; reject rather
        // than divide by zero.
        assert_eq!(calc_withdraw_amount(1_000, MAX_SLASH, MAX_SLASH), None);
    }

    #[test]
    fn test_points_above_scale_rejected() {
        assert_eq!(calc_withdraw_amount(1_000, MAX_SLASH + 1, 0), None);
    }

    #[test]
    fn test_payout_rounds_down() {
        // 3 * (1e18 - 5e17) / 1e18 = 1.5 → 1
        let half = 500_000_000_000_000_000;
        assert_eq!(calc_withdraw_amount(3, half, 0), Some(1));
    }

    #[test]
    fn test_max_amount_no_overflow() {
        // u64::MAX * MAX_SLASH fits in u128 with room to spare.
        assert_eq!(calc_withdraw_amount(u64::MAX, 0, 0), Some(u64::MAX));
        let half = 500_000_000_000_000_000;
        assert_eq!(calc_withdraw_amount(u64::MAX, half, 0), Some(u64::MAX / 2));
    }

    #[test]
    fn test_zero_amount_pays_zero() {
        let points = 200_000_000_000_000_000;
        assert_eq!(calc_withdraw_amount(0, points, 0), Some(0));
    }

    // ── burn_amount ──

    #[test]
    fn test_burn_is_remainder() {
        assert_eq!(burn_amount(1_000, 800), Some(200));
        assert_eq!(burn_amount(1_000, 1_000), Some(0));
    }

    #[test]
    fn test_burn_rejects_excess_payout() {
        assert_eq!(burn_amount(100, 101), None);
    }

    #[test]
    fn test_payout_plus_burn_conserves() {
        let points = 300_000_000_000_000_000;
        let at_start = 100_000_000_000_000_000;
        let amount = 987_654_321;
        let payout = calc_withdraw_amount(amount, points, at_start).unwrap();
        let burned = burn_amount(amount, payout).unwrap();
        assert_eq!(payout + burned, amount);
    }
}

//! Slashbond — a bonding ledger with pro-rata slashing.
//!
//! Users lock tokens against named pools. A single slash authority
//! accumulates slash points per pool (10^18 points = 100% slashed), and a
//! bond's eventual withdrawal is reduced in exact proportion to slashing
//! that happened AFTER the bond was created:
//!
//!   payout = amount * (MAX_SLASH - pool_points) / (MAX_SLASH - points_at_bond)
//!
//! Slashing is O(1) and lazy: bond records are untouched at slash time,
//! and the haircut is computed from the bond's frozen snapshot at
//! withdrawal. Exits are two-step — RequestUnbond starts a 30-day
//! timelock, Unbond releases the slash-adjusted value and sends the
//! remainder to a terminal burn sink (a PDA-owned token account no
//! instruction can sign for). ReplaceBond settles and re-bonds in one
//! atomic step, preserving custody, as long as the new amount covers the
//! old bond's current payout.
//!
//! A bond's identity is the PDA of (owner, amount, pool_id, nonce): the
//! same intent tuple always addresses the same bond, and an identity
//! freed by unbonding can be bonded again.
//!
//! Instructions:
//!   0 - Initialize:        Create config, vault, and burn sink (one-time)
//!   1 - Slash:             Authority adds slash points to a pool
//!   2 - AddBond:           Lock tokens against a pool
//!   3 - RequestUnbond:     Start the 30-day unbonding timelock
//!   4 - Unbond:            Exit after the timelock, slash-adjusted
//!   5 - ReplaceBond:       Settle and immediately re-bond in one step
//!   6 - GetWithdrawAmount: Read-only payout query (return data)

pub mod error;
pub mod instruction;
pub mod math;
pub mod processor;
pub mod state;

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint;

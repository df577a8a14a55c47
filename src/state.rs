use bytemuck::{Pod, Zeroable};
use solana_program::pubkey::Pubkey;

use crate::math;

/// Ledger configuration — one per deployment.
/// PDA seeds: [b"config"]
///
/// Written once at Initialize and immutable afterwards. The program id is
/// the third piece of identity: it is mixed into every PDA derivation, so
/// two deployments never share pool or bond addresses.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct LedgerConfig {
    /// Whether the ledger is initialized (1 = yes, 0 = no)
    pub is_initialized: u8,

    /// Bump seed for the config PDA
    pub bump: u8,

    /// Bump seed for the vault authority PDA
    pub vault_authority_bump: u8,

    /// Bump seed for the burn sink authority PDA
    pub burn_sink_authority_bump: u8,

    /// Padding for alignment
    pub _padding: [u8; 4],

    /// Mint of the token this ledger custodies
    pub token_mint: [u8; 32],

    /// The only identity permitted to slash pools
    pub slash_authority: [u8; 32],

    /// Vault token account holding all bonded value (owned by the vault
    /// authority PDA)
    pub vault: [u8; 32],

    /// Burn sink token account receiving slashed value on exit. Owned by
    /// a PDA that no instruction ever signs for, so the sink is terminal.
    /// Deliberately not the zero address — some tokens refuse it.
    pub burn_sink: [u8; 32],

    /// Reserved for future use
    pub _reserved: [u8; 64],
}

/// Size of LedgerConfig in bytes
pub const LEDGER_CONFIG_SIZE: usize = core::mem::size_of::<LedgerConfig>();

/// Per-pool cumulative slash points.
/// PDA seeds: [b"pool", pool_id]
///
/// Created lazily on a pool's first slash; until then the pool has no
/// account and reads as zero points. `slash_points` only ever grows and
/// never passes `MAX_SLASH`. Slashing touches nothing else — bonds feel
/// the haircut lazily at withdrawal time, which keeps a slash O(1)
/// regardless of how many bonds sit in the pool.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct PoolState {
    /// Whether this record is initialized (1 = yes)
    pub is_initialized: u8,

    /// Bump seed for the pool PDA
    pub bump: u8,

    /// Padding for alignment
    pub _padding: [u8; 6],

    /// Opaque caller-supplied pool identifier
    pub pool_id: [u8; 32],

    /// Cumulative slash points in [0, MAX_SLASH]
    pub slash_points: u64,

    /// Reserved for future use
    pub _reserved: [u8; 32],
}

/// Size of PoolState in bytes
pub const POOL_STATE_SIZE: usize = core::mem::size_of::<PoolState>();

/// Per-bond state — one account per (owner, amount, pool, nonce) identity.
/// PDA seeds: [b"bond", owner, amount_le, pool_id, nonce_le]
///
/// The identity tuple is stored back into the record so handlers can
/// cross-check the account they were handed against the caller-supplied
/// intent. Unbonding zeroes the whole record; a zeroed record reads as
/// absent everywhere, which frees the identity for a fresh AddBond.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct BondState {
    /// Whether this bond is live (1 = yes)
    pub active: u8,

    /// Bump seed for the bond PDA
    pub bump: u8,

    /// Padding for alignment
    pub _padding: [u8; 6],

    /// Bond owner
    pub owner: [u8; 32],

    /// Pool the bond is locked against
    pub pool_id: [u8; 32],

    /// Bonded amount in base token units
    pub amount: u64,

    /// Caller-chosen nonce distinguishing otherwise-identical bonds
    pub nonce: u64,

    /// Pool slash points frozen at bond creation (always < MAX_SLASH)
    pub slashed_at_start: u64,

    /// Unix unlock timestamp set by RequestUnbond; 0 = no request yet
    pub will_unlock: i64,

    /// Reserved for future use
    pub _reserved: [u8; 32],
}

/// Size of BondState in bytes
pub const BOND_STATE_SIZE: usize = core::mem::size_of::<BondState>();

impl LedgerConfig {
    pub fn token_mint_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.token_mint)
    }

    pub fn slash_authority_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.slash_authority)
    }

    pub fn vault_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.vault)
    }

    pub fn burn_sink_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.burn_sink)
    }
}

impl BondState {
    pub fn owner_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.owner)
    }

    /// Slash-adjusted amount this bond would withdraw right now.
    /// Delegates to the pure math module. An inactive record reports
    /// `Some(0)` rather than an error — it simply has nothing to pay.
    pub fn withdraw_amount(&self, slash_points: u64) -> Option<u64> {
        if self.active != 1 {
            return Some(0);
        }
        math::calc_withdraw_amount(self.amount, slash_points, self.slashed_at_start)
    }
}

/// Derive the ledger config PDA.
pub fn derive_config_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"config"], program_id)
}

/// Derive the vault authority PDA for a config.
/// Controls the vault token account holding all bonded value.
pub fn derive_vault_authority(program_id: &Pubkey, config: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"vault_auth", config.as_ref()], program_id)
}

/// Derive the burn sink authority PDA for a config.
/// No instruction ever signs with this authority — the sink only receives.
pub fn derive_burn_sink_authority(program_id: &Pubkey, config: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"burn_sink", config.as_ref()], program_id)
}

/// Derive the pool PDA for an opaque pool id.
pub fn derive_pool_pda(program_id: &Pubkey, pool_id: &[u8; 32]) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"pool", pool_id], program_id)
}

/// Derive a bond PDA from its identity tuple. Two intents agreeing on
/// owner, amount, pool, and nonce land on the same address — that is how
/// one logical bond is addressed across add/request/unbond/replace.
pub fn derive_bond_pda(
    program_id: &Pubkey,
    owner: &Pubkey,
    amount: u64,
    pool_id: &[u8; 32],
    nonce: u64,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            b"bond",
            owner.as_ref(),
            &amount.to_le_bytes(),
            pool_id,
            &nonce.to_le_bytes(),
        ],
        program_id,
    )
}

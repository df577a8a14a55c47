use solana_program::program_error::ProgramError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum LedgerError {
    /// Ledger already initialized
    AlreadyInitialized = 0,
    /// Ledger not initialized
    NotInitialized = 1,
    /// Caller is not the slash authority
    NotAuthorized = 2,
    /// Slash would push pool points past 100%
    PointsTooHigh = 3,
    /// Cannot bond into a fully slashed pool
    PoolFullySlashed = 4,
    /// A bond with this identity is already active
    BondAlreadyActive = 5,
    /// No active bond at this identity
    BondNotActive = 6,
    /// Unbonding not requested, or the timelock has not strictly elapsed
    BondNotUnlocked = 7,
    /// Replacement bond targets a different pool
    PoolIdMismatch = 8,
    /// Replacement amount is below the old bond's current payout
    NewBondTooSmall = 9,
    /// Zero amount
    ZeroAmount = 10,
    /// Arithmetic overflow
    Overflow = 11,
    /// Invalid PDA derivation
    InvalidPda = 12,
    /// Token account does not match the ledger config
    InvalidTokenAccount = 13,
}

impl From<LedgerError> for ProgramError {
    fn from(e: LedgerError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

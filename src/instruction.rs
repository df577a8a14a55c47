use solana_program::{program_error::ProgramError, pubkey::Pubkey};

/// Instructions for the slashbond ledger program.
#[derive(Debug)]
pub enum LedgerInstruction {
    /// Initialize the ledger: config PDA, vault, and burn sink (one-time).
    /// The slash authority and token mint are fixed here forever.
    ///
    /// Accounts:
    ///   0. `[signer, writable]` Payer (funds the config account)
    ///   1. `[writable]` Config PDA (to be created)
    ///   2. `[]` Token mint the ledger will custody
    ///   3. `[writable]` Vault token account (to be initialized, authority = vault authority PDA)
    ///   4. `[]` Vault authority PDA
    ///   5. `[writable]` Burn sink token account (to be initialized, authority = burn sink authority PDA)
    ///   6. `[]` Burn sink authority PDA
    ///   7. `[]` Token program
    ///   8. `[]` System program
    ///   9. `[]` Rent sysvar
    Initialize { slash_authority: Pubkey },

    /// Add `points` to a pool's cumulative slash points. Authority-only.
    /// Creates the pool account on first slash. O(1): bond records are
    /// untouched; they feel the slash lazily at withdrawal.
    ///
    /// Accounts:
    ///   0. `[signer, writable]` Slash authority (pays rent on first slash)
    ///   1. `[]` Config PDA
    ///   2. `[writable]` Pool PDA (created if empty)
    ///   3. `[]` System program
    ///   4. `[]` Clock sysvar
    Slash { pool_id: [u8; 32], points: u64 },

    /// Lock `amount` tokens against a pool. The bond identity is the PDA
    /// of (owner, amount, pool_id, nonce); re-bonding an identity that is
    /// still active fails.
    ///
    /// Accounts:
    ///   0. `[signer, writable]` Owner (pays rent for the bond account)
    ///   1. `[]` Config PDA
    ///   2. `[]` Pool PDA (may be empty — zero slash points)
    ///   3. `[writable]` Bond PDA (created if empty)
    ///   4. `[writable]` Owner's token account (source)
    ///   5. `[writable]` Vault token account (destination)
    ///   6. `[]` Token program
    ///   7. `[]` System program
    ///   8. `[]` Clock sysvar
    AddBond {
        amount: u64,
        pool_id: [u8; 32],
        nonce: u64,
    },

    /// Start the unbonding timelock. One-shot per bond — a second request
    /// on the same bond fails.
    ///
    /// Accounts:
    ///   0. `[signer]` Owner
    ///   1. `[writable]` Bond PDA
    ///   2. `[]` Clock sysvar
    RequestUnbond {
        amount: u64,
        pool_id: [u8; 32],
        nonce: u64,
    },

    /// Exit a bond whose timelock has strictly elapsed. Pays the
    /// slash-adjusted amount to the owner, sends the slashed remainder to
    /// the burn sink, and frees the bond identity.
    ///
    /// Accounts:
    ///   0. `[signer]` Owner
    ///   1. `[]` Config PDA
    ///   2. `[]` Pool PDA (may be empty)
    ///   3. `[writable]` Bond PDA
    ///   4. `[writable]` Vault token account (source)
    ///   5. `[writable]` Owner's token account (payout destination)
    ///   6. `[writable]` Burn sink token account (burn destination)
    ///   7. `[]` Vault authority PDA (transfer authority)
    ///   8. `[]` Token program
    ///   9. `[]` Clock sysvar
    Unbond {
        amount: u64,
        pool_id: [u8; 32],
        nonce: u64,
    },

    /// Settle an active bond (no timelock required — a pending unbond
    /// request does not block this) and immediately re-bond into the same
    /// pool under a new identity. The new amount must cover the old
    /// bond's current payout, so replacement cannot shed an
    /// already-incurred slash.
    ///
    /// Accounts:
    ///   0. `[signer, writable]` Owner
    ///   1. `[]` Config PDA
    ///   2. `[]` Pool PDA (may be empty)
    ///   3. `[writable]` Old bond PDA
    ///   4. `[writable]` New bond PDA (created if empty; may equal the old)
    ///   5. `[writable]` Vault token account
    ///   6. `[writable]` Owner's token account
    ///   7. `[writable]` Burn sink token account
    ///   8. `[]` Vault authority PDA
    ///   9. `[]` Token program
    ///  10. `[]` System program
    ///  11. `[]` Clock sysvar
    ReplaceBond {
        old_amount: u64,
        old_pool_id: [u8; 32],
        old_nonce: u64,
        new_amount: u64,
        new_pool_id: [u8; 32],
        new_nonce: u64,
    },

    /// Read-only query: the slash-adjusted amount a bond would withdraw
    /// now. Publishes the u64 via return data (simulation-friendly);
    /// reports 0 for a missing or inactive bond instead of failing.
    ///
    /// Accounts:
    ///   0. `[]` Pool PDA (may be empty)
    ///   1. `[]` Bond PDA (may be empty)
    GetWithdrawAmount {
        owner: Pubkey,
        amount: u64,
        pool_id: [u8; 32],
        nonce: u64,
    },
}

/// Decode one bond intent: amount(8) + pool_id(32) + nonce(8).
fn unpack_intent(rest: &[u8]) -> Result<(u64, [u8; 32], u64), ProgramError> {
    if rest.len() < 48 {
        return Err(ProgramError::InvalidInstructionData);
    }
    let amount = u64::from_le_bytes(rest[0..8].try_into().unwrap());
    let pool_id: [u8; 32] = rest[8..40].try_into().unwrap();
    let nonce = u64::from_le_bytes(rest[40..48].try_into().unwrap());
    Ok((amount, pool_id, nonce))
}

impl LedgerInstruction {
    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let (&tag, rest) = data.split_first().ok_or(ProgramError::InvalidInstructionData)?;

        match tag {
            0 => {
                // Initialize: slash_authority(32)
                if rest.len() < 32 {
                    return Err(ProgramError::InvalidInstructionData);
                }
                let slash_authority = Pubkey::try_from(&rest[0..32])
                    .map_err(|_| ProgramError::InvalidInstructionData)?;
                Ok(Self::Initialize { slash_authority })
            }
            1 => {
                // Slash: pool_id(32) + points(8)
                if rest.len() < 40 {
                    return Err(ProgramError::InvalidInstructionData);
                }
                let pool_id: [u8; 32] = rest[0..32].try_into().unwrap();
                let points = u64::from_le_bytes(rest[32..40].try_into().unwrap());
                Ok(Self::Slash { pool_id, points })
            }
            2 => {
                let (amount, pool_id, nonce) = unpack_intent(rest)?;
                Ok(Self::AddBond { amount, pool_id, nonce })
            }
            3 => {
                let (amount, pool_id, nonce) = unpack_intent(rest)?;
                Ok(Self::RequestUnbond { amount, pool_id, nonce })
            }
            4 => {
                let (amount, pool_id, nonce) = unpack_intent(rest)?;
                Ok(Self::Unbond { amount, pool_id, nonce })
            }
            5 => {
                // ReplaceBond: old intent(48) + new intent(48)
                if rest.len() < 96 {
                    return Err(ProgramError::InvalidInstructionData);
                }
                let (old_amount, old_pool_id, old_nonce) = unpack_intent(&rest[0..48])?;
                let (new_amount, new_pool_id, new_nonce) = unpack_intent(&rest[48..96])?;
                Ok(Self::ReplaceBond {
                    old_amount,
                    old_pool_id,
                    old_nonce,
                    new_amount,
                    new_pool_id,
                    new_nonce,
                })
            }
            6 => {
                // GetWithdrawAmount: owner(32) + intent(48)
                if rest.len() < 80 {
                    return Err(ProgramError::InvalidInstructionData);
                }
                let owner = Pubkey::try_from(&rest[0..32])
                    .map_err(|_| ProgramError::InvalidInstructionData)?;
                let (amount, pool_id, nonce) = unpack_intent(&rest[32..80])?;
                Ok(Self::GetWithdrawAmount { owner, amount, pool_id, nonce })
            }
            _ => Err(ProgramError::InvalidInstructionData),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack_intent(amount: u64, pool_id: [u8; 32], nonce: u64) -> Vec<u8> {
        let mut data = Vec::with_capacity(48);
        data.extend_from_slice(&amount.to_le_bytes());
        data.extend_from_slice(&pool_id);
        data.extend_from_slice(&nonce.to_le_bytes());
        data
    }

    // ── Tag 0: Initialize ──

    #[test]
    fn test_unpack_initialize() {
        let authority = Pubkey::new_unique();
        let mut data = vec![0u8];
        data.extend_from_slice(authority.as_ref());
        match LedgerInstruction::unpack(&data).unwrap() {
            LedgerInstruction::Initialize { slash_authority } => {
                assert_eq!(slash_authority, authority);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_unpack_initialize_too_short() {
        let data = vec![0u8, 1, 2, 3];
        assert!(LedgerInstruction::unpack(&data).is_err());
    }

    // ── Tag 1: Slash ──

    #[test]
    fn test_unpack_slash() {
        let mut data = vec![1u8];
        data.extend_from_slice(&[7u8; 32]);
        data.extend_from_slice(&500u64.to_le_bytes());
        match LedgerInstruction::unpack(&data).unwrap() {
            LedgerInstruction::Slash { pool_id, points } => {
                assert_eq!(pool_id, [7u8; 32]);
                assert_eq!(points, 500);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_unpack_slash_too_short() {
        let mut data = vec![1u8];
        data.extend_from_slice(&[7u8; 32]); // pool id only, points missing
        assert!(LedgerInstruction::unpack(&data).is_err());
    }

    // ── Tag 2: AddBond ──

    #[test]
    fn test_unpack_add_bond() {
        let mut data = vec![2u8];
        data.extend_from_slice(&pack_intent(1_000, [3u8; 32], 42));
        match LedgerInstruction::unpack(&data).unwrap() {
            LedgerInstruction::AddBond { amount, pool_id, nonce } => {
                assert_eq!(amount, 1_000);
                assert_eq!(pool_id, [3u8; 32]);
                assert_eq!(nonce, 42);
            }
            _ => panic!("wrong variant"),
        }
    }

    // ── Tag 3: RequestUnbond ──

    #[test]
    fn test_unpack_request_unbond() {
        let mut data = vec![3u8];
        data.extend_from_slice(&pack_intent(999, [1u8; 32], 0));
        match LedgerInstruction::unpack(&data).unwrap() {
            LedgerInstruction::RequestUnbond { amount, pool_id, nonce } => {
                assert_eq!(amount, 999);
                assert_eq!(pool_id, [1u8; 32]);
                assert_eq!(nonce, 0);
            }
            _ => panic!("wrong variant"),
        }
    }

    // ── Tag 4: Unbond ──

    #[test]
    fn test_unpack_unbond() {
        let mut data = vec![4u8];
        data.extend_from_slice(&pack_intent(u64::MAX, [0xAB; 32], u64::MAX));
        match LedgerInstruction::unpack(&data).unwrap() {
            LedgerInstruction::Unbond { amount, pool_id, nonce } => {
                assert_eq!(amount, u64::MAX);
                assert_eq!(pool_id, [0xAB; 32]);
                assert_eq!(nonce, u64::MAX);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_unpack_truncated_intent() {
        let mut data = vec![4u8];
        data.extend_from_slice(&1_000u64.to_le_bytes()); // amount only
        assert!(LedgerInstruction::unpack(&data).is_err());
    }

    // ── Tag 5: ReplaceBond ──

    #[test]
    fn test_unpack_replace_bond() {
        let mut data = vec![5u8];
        data.extend_from_slice(&pack_intent(1_000, [9u8; 32], 1));
        data.extend_from_slice(&pack_intent(800, [9u8; 32], 2));
        match LedgerInstruction::unpack(&data).unwrap() {
            LedgerInstruction::ReplaceBond {
                old_amount,
                old_pool_id,
                old_nonce,
                new_amount,
                new_pool_id,
                new_nonce,
            } => {
                assert_eq!(old_amount, 1_000);
                assert_eq!(old_pool_id, [9u8; 32]);
                assert_eq!(old_nonce, 1);
                assert_eq!(new_amount, 800);
                assert_eq!(new_pool_id, [9u8; 32]);
                assert_eq!(new_nonce, 2);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_unpack_replace_bond_missing_new_intent() {
        let mut data = vec![5u8];
        data.extend_from_slice(&pack_intent(1_000, [9u8; 32], 1));
        assert!(LedgerInstruction::unpack(&data).is_err());
    }

    // ── Tag 6: GetWithdrawAmount ──

    #[test]
    fn test_unpack_get_withdraw_amount() {
        let owner = Pubkey::new_unique();
        let mut data = vec![6u8];
        data.extend_from_slice(owner.as_ref());
        data.extend_from_slice(&pack_intent(500, [2u8; 32], 7));
        match LedgerInstruction::unpack(&data).unwrap() {
            LedgerInstruction::GetWithdrawAmount { owner: o, amount, pool_id, nonce } => {
                assert_eq!(o, owner);
                assert_eq!(amount, 500);
                assert_eq!(pool_id, [2u8; 32]);
                assert_eq!(nonce, 7);
            }
            _ => panic!("wrong variant"),
        }
    }

    // ── Invalid input ──

    #[test]
    fn test_unpack_invalid_tag() {
        let data = vec![255u8];
        assert!(LedgerInstruction::unpack(&data).is_err());
    }

    #[test]
    fn test_unpack_empty() {
        let data: Vec<u8> = vec![];
        assert!(LedgerInstruction::unpack(&data).is_err());
    }
}

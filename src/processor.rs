use bytemuck::Zeroable;
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed, set_return_data},
    program_error::ProgramError,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
    sysvar::{clock::Clock, Sysvar},
};

use crate::error::LedgerError;
use crate::instruction::LedgerInstruction;
use crate::math;
use crate::state::{
    self, BondState, LedgerConfig, PoolState, BOND_STATE_SIZE, LEDGER_CONFIG_SIZE, POOL_STATE_SIZE,
};

/// Verify the token program is the real SPL Token program.
/// CRITICAL: Without this check, an attacker can pass a fake token program,
/// receive vault-authority signer power via invoke_signed, and drain the vault.
fn verify_token_program(token_program: &AccountInfo) -> ProgramResult {
    if *token_program.key != spl_token::id() {
        msg!("Error: invalid token program {}", token_program.key);
        return Err(ProgramError::IncorrectProgramId);
    }
    Ok(())
}

pub fn process(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = LedgerInstruction::unpack(instruction_data)?;

    match instruction {
        LedgerInstruction::Initialize { slash_authority } => {
            process_initialize(program_id, accounts, &slash_authority)
        }
        LedgerInstruction::Slash { pool_id, points } => {
            process_slash(program_id, accounts, &pool_id, points)
        }
        LedgerInstruction::AddBond { amount, pool_id, nonce } => {
            process_add_bond(program_id, accounts, amount, &pool_id, nonce)
        }
        LedgerInstruction::RequestUnbond { amount, pool_id, nonce } => {
            process_request_unbond(program_id, accounts, amount, &pool_id, nonce)
        }
        LedgerInstruction::Unbond { amount, pool_id, nonce } => {
            process_unbond(program_id, accounts, amount, &pool_id, nonce)
        }
        LedgerInstruction::ReplaceBond {
            old_amount, old_pool_id, old_nonce, new_amount, new_pool_id, new_nonce,
        } => process_replace_bond(
            program_id, accounts,
            old_amount, &old_pool_id, old_nonce,
            new_amount, &new_pool_id, new_nonce,
        ),
        LedgerInstruction::GetWithdrawAmount { owner, amount, pool_id, nonce } => {
            process_get_withdraw_amount(program_id, accounts, &owner, amount, &pool_id, nonce)
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Helpers: config load, pool read, bond settlement
// ═══════════════════════════════════════════════════════════════

/// Read the ledger config, verifying PDA derivation and initialization.
fn load_config(
    program_id: &Pubkey,
    config_pda: &AccountInfo,
) -> Result<LedgerConfig, ProgramError> {
    let (expected_config, _) = state::derive_config_pda(program_id);
    if *config_pda.key != expected_config {
        return Err(LedgerError::InvalidPda.into());
    }
    if config_pda.data_is_empty() {
        return Err(LedgerError::NotInitialized.into());
    }
    let config_data = config_pda.try_borrow_data()?;
    let config: &LedgerConfig = bytemuck::from_bytes(&config_data[..LEDGER_CONFIG_SIZE]);
    if config.is_initialized != 1 {
        return Err(LedgerError::NotInitialized.into());
    }
    Ok(*config)
}

/// Live slash points for a pool account. A pool that was never slashed
/// has no account yet and reads as zero.
fn read_slash_points(
    program_id: &Pubkey,
    pool_pda: &AccountInfo,
    pool_id: &[u8; 32],
) -> Result<u64, ProgramError> {
    let (expected_pool, _) = state::derive_pool_pda(program_id, pool_id);
    if *pool_pda.key != expected_pool {
        return Err(LedgerError::InvalidPda.into());
    }
    if pool_pda.data_is_empty() {
        return Ok(0);
    }
    let pool_data = pool_pda.try_borrow_data()?;
    let pool: &PoolState = bytemuck::from_bytes(&pool_data[..POOL_STATE_SIZE]);
    if pool.is_initialized != 1 || pool.pool_id != *pool_id {
        return Err(LedgerError::InvalidPda.into());
    }
    Ok(pool.slash_points)
}

/// Settle an active bond: compute the slash-adjusted payout, move value
/// out of the vault, zero the record, and emit the exit record.
/// Shared by Unbond (after its timelock check) and ReplaceBond (no
/// timelock). Callers have already validated config, pool, PDAs, and the
/// token program.
fn settle_bond<'a>(
    config_key: &Pubkey,
    vault_authority_bump: u8,
    slash_points: u64,
    bond_pda: &AccountInfo<'a>,
    owner: &AccountInfo<'a>,
    vault: &AccountInfo<'a>,
    owner_token: &AccountInfo<'a>,
    burn_sink: &AccountInfo<'a>,
    vault_auth: &AccountInfo<'a>,
    token_program: &AccountInfo<'a>,
    now: i64,
) -> ProgramResult {
    let (amount, slashed_at_start) = {
        let bond_data = bond_pda.try_borrow_data()?;
        let bond: &BondState = bytemuck::from_bytes(&bond_data[..BOND_STATE_SIZE]);
        (bond.amount, bond.slashed_at_start)
    };

    let payout = math::calc_withdraw_amount(amount, slash_points, slashed_at_start)
        .ok_or(LedgerError::Overflow)?;
    let burned = math::burn_amount(amount, payout).ok_or(LedgerError::Overflow)?;

    // Free the identity first; the whole transaction is atomic either way,
    // and ReplaceBond may re-create a record at this same address.
    {
        let mut bond_data = bond_pda.try_borrow_mut_data()?;
        let bond: &mut BondState = bytemuck::from_bytes_mut(&mut bond_data[..BOND_STATE_SIZE]);
        *bond = BondState::zeroed();
    }

    let vault_auth_seeds: &[&[u8]] =
        &[b"vault_auth", config_key.as_ref(), &[vault_authority_bump]];

    if payout > 0 {
        invoke_signed(
            &spl_token::instruction::transfer(
                token_program.key,
                vault.key,
                owner_token.key,
                vault_auth.key,
                &[],
                payout,
            )?,
            &[vault.clone(), owner_token.clone(), vault_auth.clone(), token_program.clone()],
            &[vault_auth_seeds],
        )?;
    }

    if burned > 0 {
        invoke_signed(
            &spl_token::instruction::transfer(
                token_program.key,
                vault.key,
                burn_sink.key,
                vault_auth.key,
                &[],
                burned,
            )?,
            &[vault.clone(), burn_sink.clone(), vault_auth.clone(), token_program.clone()],
            &[vault_auth_seeds],
        )?;
    }

    msg!("Unbonded owner={} bond={} time={}", owner.key, bond_pda.key, now);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 0: Initialize
// ═══════════════════════════════════════════════════════════════

fn process_initialize(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    slash_authority: &Pubkey,
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();

    let payer = next_account_info(accounts_iter)?;
    let config_pda = next_account_info(accounts_iter)?;
    let token_mint = next_account_info(accounts_iter)?;
    let vault = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let burn_sink = next_account_info(accounts_iter)?;
    let burn_sink_auth = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;
    let system_program = next_account_info(accounts_iter)?;
    let rent_sysvar = next_account_info(accounts_iter)?;

    if !payer.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let (expected_config, config_bump) = state::derive_config_pda(program_id);
    if *config_pda.key != expected_config {
        return Err(LedgerError::InvalidPda.into());
    }
    if !config_pda.data_is_empty() {
        return Err(LedgerError::AlreadyInitialized.into());
    }

    let (expected_vault_auth, vault_auth_bump) =
        state::derive_vault_authority(program_id, &expected_config);
    if *vault_auth.key != expected_vault_auth {
        return Err(LedgerError::InvalidPda.into());
    }

    let (expected_sink_auth, sink_auth_bump) =
        state::derive_burn_sink_authority(program_id, &expected_config);
    if *burn_sink_auth.key != expected_sink_auth {
        return Err(LedgerError::InvalidPda.into());
    }

    // The vault and sink must be distinct accounts — the sink is terminal.
    if vault.key == burn_sink.key {
        return Err(LedgerError::InvalidTokenAccount.into());
    }

    verify_token_program(token_program)?;

    let rent = Rent::from_account_info(rent_sysvar)?;

    // Create config PDA account
    let config_seeds: &[&[u8]] = &[b"config", &[config_bump]];
    invoke_signed(
        &system_instruction::create_account(
            payer.key,
            config_pda.key,
            rent.minimum_balance(LEDGER_CONFIG_SIZE),
            LEDGER_CONFIG_SIZE as u64,
            program_id,
        ),
        &[payer.clone(), config_pda.clone(), system_program.clone()],
        &[config_seeds],
    )?;

    // Initialize vault token account (authority = vault_auth PDA)
    invoke(
        &spl_token::instruction::initialize_account(
            token_program.key,
            vault.key,
            token_mint.key,
            vault_auth.key,
        )?,
        &[vault.clone(), token_mint.clone(), vault_auth.clone(), rent_sysvar.clone()],
    )?;

    // Initialize burn sink token account (authority = burn_sink_auth PDA).
    // No instruction signs with that authority, so the sink only receives.
    invoke(
        &spl_token::instruction::initialize_account(
            token_program.key,
            burn_sink.key,
            token_mint.key,
            burn_sink_auth.key,
        )?,
        &[burn_sink.clone(), token_mint.clone(), burn_sink_auth.clone(), rent_sysvar.clone()],
    )?;

    // Write config
    let mut config_data = config_pda.try_borrow_mut_data()?;
    let config: &mut LedgerConfig = bytemuck::from_bytes_mut(&mut config_data[..LEDGER_CONFIG_SIZE]);

    config.is_initialized = 1;
    config.bump = config_bump;
    config.vault_authority_bump = vault_auth_bump;
    config.burn_sink_authority_bump = sink_auth_bump;
    config.token_mint = token_mint.key.to_bytes();
    config.slash_authority = slash_authority.to_bytes();
    config.vault = vault.key.to_bytes();
    config.burn_sink = burn_sink.key.to_bytes();

    msg!("Ledger initialized: authority {} mint {}", slash_authority, token_mint.key);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 1: Slash
// ═══════════════════════════════════════════════════════════════

fn process_slash(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    pool_id: &[u8; 32],
    points: u64,
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();

    let authority = next_account_info(accounts_iter)?;
    let config_pda = next_account_info(accounts_iter)?;
    let pool_pda = next_account_info(accounts_iter)?;
    let system_program = next_account_info(accounts_iter)?;
    let clock_sysvar = next_account_info(accounts_iter)?;

    if !authority.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let config = load_config(program_id, config_pda)?;
    if config.slash_authority != authority.key.to_bytes() {
        return Err(LedgerError::NotAuthorized.into());
    }

    let (expected_pool, pool_bump) = state::derive_pool_pda(program_id, pool_id);
    if *pool_pda.key != expected_pool {
        return Err(LedgerError::InvalidPda.into());
    }

    let current = if pool_pda.data_is_empty() {
        0
    } else {
        let pool_data = pool_pda.try_borrow_data()?;
        let pool: &PoolState = bytemuck::from_bytes(&pool_data[..POOL_STATE_SIZE]);
        if pool.is_initialized != 1 || pool.pool_id != *pool_id {
            return Err(LedgerError::InvalidPda.into());
        }
        pool.slash_points
    };

    let new_total = math::apply_slash(current, points).ok_or(LedgerError::PointsTooHigh)?;

    // First slash of a pool creates its account (authority pays rent).
    if pool_pda.data_is_empty() {
        let pool_seeds: &[&[u8]] = &[b"pool", pool_id, &[pool_bump]];
        let rent = Rent::get()?;
        invoke_signed(
            &system_instruction::create_account(
                authority.key,
                pool_pda.key,
                rent.minimum_balance(POOL_STATE_SIZE),
                POOL_STATE_SIZE as u64,
                program_id,
            ),
            &[authority.clone(), pool_pda.clone(), system_program.clone()],
            &[pool_seeds],
        )?;
    }

    let mut pool_data = pool_pda.try_borrow_mut_data()?;
    let pool: &mut PoolState = bytemuck::from_bytes_mut(&mut pool_data[..POOL_STATE_SIZE]);
    pool.is_initialized = 1;
    pool.bump = pool_bump;
    pool.pool_id = *pool_id;
    pool.slash_points = new_total;

    let clock = Clock::from_account_info(clock_sysvar)?;
    msg!(
        "SlashApplied pool={} new_total={} time={}",
        Pubkey::new_from_array(*pool_id),
        new_total,
        clock.unix_timestamp,
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 2: AddBond
// ═══════════════════════════════════════════════════════════════

fn process_add_bond(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount: u64,
    pool_id: &[u8; 32],
    nonce: u64,
) -> ProgramResult {
    if amount == 0 {
        return Err(LedgerError::ZeroAmount.into());
    }

    let accounts_iter = &mut accounts.iter();

    let owner = next_account_info(accounts_iter)?;
    let config_pda = next_account_info(accounts_iter)?;
    let pool_pda = next_account_info(accounts_iter)?;
    let bond_pda = next_account_info(accounts_iter)?;
    let owner_token = next_account_info(accounts_iter)?;
    let vault = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;
    let system_program = next_account_info(accounts_iter)?;
    let clock_sysvar = next_account_info(accounts_iter)?;

    if !owner.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let config = load_config(program_id, config_pda)?;
    if config.vault != vault.key.to_bytes() {
        return Err(LedgerError::InvalidTokenAccount.into());
    }

    let slash_points = read_slash_points(program_id, pool_pda, pool_id)?;
    if slash_points >= math::MAX_SLASH {
        return Err(LedgerError::PoolFullySlashed.into());
    }

    let (expected_bond, bond_bump) =
        state::derive_bond_pda(program_id, owner.key, amount, pool_id, nonce);
    if *bond_pda.key != expected_bond {
        return Err(LedgerError::InvalidPda.into());
    }

    // An existing record only blocks re-bonding while still active; a
    // zeroed record (prior unbond) frees the identity for reuse.
    if !bond_pda.data_is_empty() {
        let bond_data = bond_pda.try_borrow_data()?;
        let bond: &BondState = bytemuck::from_bytes(&bond_data[..BOND_STATE_SIZE]);
        if bond.active == 1 {
            return Err(LedgerError::BondAlreadyActive.into());
        }
    }

    verify_token_program(token_program)?;

    if bond_pda.data_is_empty() {
        let bond_seeds: &[&[u8]] = &[
            b"bond",
            owner.key.as_ref(),
            &amount.to_le_bytes(),
            pool_id,
            &nonce.to_le_bytes(),
            &[bond_bump],
        ];
        let rent = Rent::get()?;
        invoke_signed(
            &system_instruction::create_account(
                owner.key,
                bond_pda.key,
                rent.minimum_balance(BOND_STATE_SIZE),
                BOND_STATE_SIZE as u64,
                program_id,
            ),
            &[owner.clone(), bond_pda.clone(), system_program.clone()],
            &[bond_seeds],
        )?;
    }

    // Pull the bonded amount into custody: owner → vault
    invoke(
        &spl_token::instruction::transfer(
            token_program.key,
            owner_token.key,
            vault.key,
            owner.key,
            &[],
            amount,
        )?,
        &[owner_token.clone(), vault.clone(), owner.clone(), token_program.clone()],
    )?;

    let mut bond_data = bond_pda.try_borrow_mut_data()?;
    let bond: &mut BondState = bytemuck::from_bytes_mut(&mut bond_data[..BOND_STATE_SIZE]);

    bond.active = 1;
    bond.bump = bond_bump;
    bond.owner = owner.key.to_bytes();
    bond.pool_id = *pool_id;
    bond.amount = amount;
    bond.nonce = nonce;
    bond.slashed_at_start = slash_points;
    bond.will_unlock = 0;

    let clock = Clock::from_account_info(clock_sysvar)?;
    msg!(
        "BondAdded owner={} amount={} pool={} nonce={} slashed_at_start={} time={}",
        owner.key,
        amount,
        Pubkey::new_from_array(*pool_id),
        nonce,
        slash_points,
        clock.unix_timestamp,
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 3: RequestUnbond
// ═══════════════════════════════════════════════════════════════

fn process_request_unbond(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount: u64,
    pool_id: &[u8; 32],
    nonce: u64,
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();

    let owner = next_account_info(accounts_iter)?;
    let bond_pda = next_account_info(accounts_iter)?;
    let clock_sysvar = next_account_info(accounts_iter)?;

    if !owner.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let (expected_bond, _) =
        state::derive_bond_pda(program_id, owner.key, amount, pool_id, nonce);
    if *bond_pda.key != expected_bond {
        return Err(LedgerError::InvalidPda.into());
    }
    if bond_pda.data_is_empty() {
        return Err(LedgerError::BondNotActive.into());
    }

    let mut bond_data = bond_pda.try_borrow_mut_data()?;
    let bond: &mut BondState = bytemuck::from_bytes_mut(&mut bond_data[..BOND_STATE_SIZE]);

    // Only a live bond with no pending request may start the timelock.
    if bond.active != 1 || bond.owner != owner.key.to_bytes() || bond.will_unlock != 0 {
        return Err(LedgerError::BondNotActive.into());
    }

    let clock = Clock::from_account_info(clock_sysvar)?;
    let will_unlock = clock
        .unix_timestamp
        .checked_add(math::UNBOND_DELAY_SECS)
        .ok_or(LedgerError::Overflow)?;
    bond.will_unlock = will_unlock;

    msg!(
        "UnbondRequested owner={} bond={} will_unlock={} time={}",
        owner.key,
        bond_pda.key,
        will_unlock,
        clock.unix_timestamp,
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 4: Unbond
// ═══════════════════════════════════════════════════════════════

fn process_unbond(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount: u64,
    pool_id: &[u8; 32],
    nonce: u64,
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();

    let owner = next_account_info(accounts_iter)?;
    let config_pda = next_account_info(accounts_iter)?;
    let pool_pda = next_account_info(accounts_iter)?;
    let bond_pda = next_account_info(accounts_iter)?;
    let vault = next_account_info(accounts_iter)?;
    let owner_token = next_account_info(accounts_iter)?;
    let burn_sink = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;
    let clock_sysvar = next_account_info(accounts_iter)?;

    if !owner.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let config = load_config(program_id, config_pda)?;
    if config.vault != vault.key.to_bytes() || config.burn_sink != burn_sink.key.to_bytes() {
        return Err(LedgerError::InvalidTokenAccount.into());
    }
    let (expected_vault_auth, _) = state::derive_vault_authority(program_id, config_pda.key);
    if *vault_auth.key != expected_vault_auth {
        return Err(LedgerError::InvalidPda.into());
    }

    let slash_points = read_slash_points(program_id, pool_pda, pool_id)?;

    let (expected_bond, _) =
        state::derive_bond_pda(program_id, owner.key, amount, pool_id, nonce);
    if *bond_pda.key != expected_bond {
        return Err(LedgerError::InvalidPda.into());
    }
    if bond_pda.data_is_empty() {
        return Err(LedgerError::BondNotActive.into());
    }

    let clock = Clock::from_account_info(clock_sysvar)?;
    {
        let bond_data = bond_pda.try_borrow_data()?;
        let bond: &BondState = bytemuck::from_bytes(&bond_data[..BOND_STATE_SIZE]);
        if bond.active != 1 || bond.owner != owner.key.to_bytes() {
            return Err(LedgerError::BondNotActive.into());
        }
        // Strict: the unlock instant itself does not yet qualify.
        if bond.will_unlock == 0 || clock.unix_timestamp <= bond.will_unlock {
            return Err(LedgerError::BondNotUnlocked.into());
        }
    }

    verify_token_program(token_program)?;

    settle_bond(
        config_pda.key,
        config.vault_authority_bump,
        slash_points,
        bond_pda,
        owner,
        vault,
        owner_token,
        burn_sink,
        vault_auth,
        token_program,
        clock.unix_timestamp,
    )
}

// ═══════════════════════════════════════════════════════════════
// 5: ReplaceBond
// ═══════════════════════════════════════════════════════════════

fn process_replace_bond(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    old_amount: u64,
    old_pool_id: &[u8; 32],
    old_nonce: u64,
    new_amount: u64,
    new_pool_id: &[u8; 32],
    new_nonce: u64,
) -> ProgramResult {
    if new_amount == 0 {
        return Err(LedgerError::ZeroAmount.into());
    }

    let accounts_iter = &mut accounts.iter();

    let owner = next_account_info(accounts_iter)?;
    let config_pda = next_account_info(accounts_iter)?;
    let pool_pda = next_account_info(accounts_iter)?;
    let old_bond_pda = next_account_info(accounts_iter)?;
    let new_bond_pda = next_account_info(accounts_iter)?;
    let vault = next_account_info(accounts_iter)?;
    let owner_token = next_account_info(accounts_iter)?;
    let burn_sink = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;
    let system_program = next_account_info(accounts_iter)?;
    let clock_sysvar = next_account_info(accounts_iter)?;

    if !owner.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    // Re-bonding must stay in the same pool.
    if new_pool_id != old_pool_id {
        return Err(LedgerError::PoolIdMismatch.into());
    }

    let config = load_config(program_id, config_pda)?;
    if config.vault != vault.key.to_bytes() || config.burn_sink != burn_sink.key.to_bytes() {
        return Err(LedgerError::InvalidTokenAccount.into());
    }
    let (expected_vault_auth, _) = state::derive_vault_authority(program_id, config_pda.key);
    if *vault_auth.key != expected_vault_auth {
        return Err(LedgerError::InvalidPda.into());
    }

    let slash_points = read_slash_points(program_id, pool_pda, old_pool_id)?;

    let (expected_old, _) =
        state::derive_bond_pda(program_id, owner.key, old_amount, old_pool_id, old_nonce);
    if *old_bond_pda.key != expected_old {
        return Err(LedgerError::InvalidPda.into());
    }
    if old_bond_pda.data_is_empty() {
        return Err(LedgerError::BondNotActive.into());
    }

    let (expected_new, new_bond_bump) =
        state::derive_bond_pda(program_id, owner.key, new_amount, new_pool_id, new_nonce);
    if *new_bond_pda.key != expected_new {
        return Err(LedgerError::InvalidPda.into());
    }
    let same_identity = expected_new == expected_old;

    // All preconditions before any mutation — the settlement below must
    // never run if the re-add would fail.
    let payout = {
        let bond_data = old_bond_pda.try_borrow_data()?;
        let bond: &BondState = bytemuck::from_bytes(&bond_data[..BOND_STATE_SIZE]);
        // A pending unbond request does not block replacement — only the
        // active flag matters here.
        if bond.active != 1 || bond.owner != owner.key.to_bytes() {
            return Err(LedgerError::BondNotActive.into());
        }
        math::calc_withdraw_amount(bond.amount, slash_points, bond.slashed_at_start)
            .ok_or(LedgerError::Overflow)?
    };

    // A smaller re-bond would shed the slash already incurred by the old
    // bond while taking a fresh snapshot.
    if new_amount < payout {
        return Err(LedgerError::NewBondTooSmall.into());
    }
    if slash_points >= math::MAX_SLASH {
        return Err(LedgerError::PoolFullySlashed.into());
    }
    if !same_identity && !new_bond_pda.data_is_empty() {
        let bond_data = new_bond_pda.try_borrow_data()?;
        let bond: &BondState = bytemuck::from_bytes(&bond_data[..BOND_STATE_SIZE]);
        if bond.active == 1 {
            return Err(LedgerError::BondAlreadyActive.into());
        }
    }

    verify_token_program(token_program)?;

    let clock = Clock::from_account_info(clock_sysvar)?;
    let now = clock.unix_timestamp;

    // Settle the old bond exactly like Unbond, minus the timelock check.
    settle_bond(
        config_pda.key,
        config.vault_authority_bump,
        slash_points,
        old_bond_pda,
        owner,
        vault,
        owner_token,
        burn_sink,
        vault_auth,
        token_program,
        now,
    )?;

    // Create the replacement with a fresh snapshot.
    if new_bond_pda.data_is_empty() {
        let bond_seeds: &[&[u8]] = &[
            b"bond",
            owner.key.as_ref(),
            &new_amount.to_le_bytes(),
            new_pool_id,
            &new_nonce.to_le_bytes(),
            &[new_bond_bump],
        ];
        let rent = Rent::get()?;
        invoke_signed(
            &system_instruction::create_account(
                owner.key,
                new_bond_pda.key,
                rent.minimum_balance(BOND_STATE_SIZE),
                BOND_STATE_SIZE as u64,
                program_id,
            ),
            &[owner.clone(), new_bond_pda.clone(), system_program.clone()],
            &[bond_seeds],
        )?;
    }

    invoke(
        &spl_token::instruction::transfer(
            token_program.key,
            owner_token.key,
            vault.key,
            owner.key,
            &[],
            new_amount,
        )?,
        &[owner_token.clone(), vault.clone(), owner.clone(), token_program.clone()],
    )?;

    let mut bond_data = new_bond_pda.try_borrow_mut_data()?;
    let bond: &mut BondState = bytemuck::from_bytes_mut(&mut bond_data[..BOND_STATE_SIZE]);

    bond.active = 1;
    bond.bump = new_bond_bump;
    bond.owner = owner.key.to_bytes();
    bond.pool_id = *new_pool_id;
    bond.amount = new_amount;
    bond.nonce = new_nonce;
    bond.slashed_at_start = slash_points;
    bond.will_unlock = 0;

    msg!(
        "BondAdded owner={} amount={} pool={} nonce={} slashed_at_start={} time={}",
        owner.key,
        new_amount,
        Pubkey::new_from_array(*new_pool_id),
        new_nonce,
        slash_points,
        now,
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 6: GetWithdrawAmount
// ═══════════════════════════════════════════════════════════════

fn process_get_withdraw_amount(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    owner: &Pubkey,
    amount: u64,
    pool_id: &[u8; 32],
    nonce: u64,
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();

    let pool_pda = next_account_info(accounts_iter)?;
    let bond_pda = next_account_info(accounts_iter)?;

    let slash_points = read_slash_points(program_id, pool_pda, pool_id)?;

    let (expected_bond, _) = state::derive_bond_pda(program_id, owner, amount, pool_id, nonce);
    if *bond_pda.key != expected_bond {
        return Err(LedgerError::InvalidPda.into());
    }

    // Missing or inactive bonds report zero rather than failing.
    let withdraw_amount = if bond_pda.data_is_empty() {
        0
    } else {
        let bond_data = bond_pda.try_borrow_data()?;
        let bond: &BondState = bytemuck::from_bytes(&bond_data[..BOND_STATE_SIZE]);
        bond.withdraw_amount(slash_points).ok_or(LedgerError::Overflow)?
    };

    set_return_data(&withdraw_amount.to_le_bytes());
    msg!("WithdrawAmount bond={} amount={}", bond_pda.key, withdraw_amount);
    Ok(())
}

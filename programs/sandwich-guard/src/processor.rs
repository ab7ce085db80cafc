use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    clock::Clock,
    entrypoint::ProgramResult,
    msg,
    program::{invoke_signed, set_return_data},
    program_error::ProgramError,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
    sysvar::Sysvar,
};

use crate::{
    engine::RiskFeeEngine,
    error::SandwichGuardError,
    instruction::SandwichGuardInstruction,
    state::{PoolRiskState, POOL_RISK_SEED},
};

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = SandwichGuardInstruction::unpack(instruction_data)?;

    match instruction {
        SandwichGuardInstruction::InitializePool {
            pool_id,
            seed_price,
            seed_trade_size,
        } => {
            msg!("Instruction: InitializePool");
            process_initialize_pool(program_id, accounts, pool_id, seed_price, seed_trade_size)
        }

        SandwichGuardInstruction::EvaluateTrade {
            pool_id,
            current_price,
            trade_size,
        } => {
            msg!("Instruction: EvaluateTrade");
            process_evaluate_trade(program_id, accounts, pool_id, current_price, trade_size)
        }

        SandwichGuardInstruction::SettleTrade {
            pool_id,
            realized_price,
            trade_size,
        } => {
            msg!("Instruction: SettleTrade");
            process_settle_trade(program_id, accounts, pool_id, realized_price, trade_size)
        }

        SandwichGuardInstruction::SetFeeConfig {
            pool_id,
            low_fee_bps,
            medium_fee_bps,
            high_fee_bps,
            threshold_low,
            threshold_high,
        } => {
            msg!("Instruction: SetFeeConfig");
            process_set_fee_config(
                program_id,
                accounts,
                pool_id,
                low_fee_bps,
                medium_fee_bps,
                high_fee_bps,
                threshold_low,
                threshold_high,
            )
        }

        SandwichGuardInstruction::UpdateScoringParameters {
            pool_id,
            weight_size,
            weight_price,
            weight_spike,
            spike_multiple,
            avg_floor,
            price_scale,
        } => {
            msg!("Instruction: UpdateScoringParameters");
            process_update_scoring_parameters(
                program_id,
                accounts,
                pool_id,
                weight_size,
                weight_price,
                weight_spike,
                spike_multiple,
                avg_floor,
                price_scale,
            )
        }

        SandwichGuardInstruction::GetConfig { pool_id } => {
            msg!("Instruction: GetConfig");
            process_get_config(program_id, accounts, pool_id)
        }

        SandwichGuardInstruction::GetMetrics { pool_id } => {
            msg!("Instruction: GetMetrics");
            process_get_metrics(program_id, accounts, pool_id)
        }
    }
}

/// Deserialize a pool risk record, tolerating the growth padding at the
/// end of the account buffer.
fn load_pool_risk(data: &[u8]) -> Result<PoolRiskState, ProgramError> {
    let mut cursor: &[u8] = data;
    let state =
        PoolRiskState::deserialize(&mut cursor).map_err(|_| ProgramError::InvalidAccountData)?;
    state.validate()?;
    Ok(state)
}

fn store_pool_risk(state: &PoolRiskState, pool_info: &AccountInfo) -> ProgramResult {
    state.serialize(&mut &mut pool_info.data.borrow_mut()[..])?;
    Ok(())
}

fn verify_pool_pda(
    program_id: &Pubkey,
    pool_id: &[u8; 32],
    pool_info: &AccountInfo,
) -> Result<u8, ProgramError> {
    let (expected, bump) = PoolRiskState::find_address(program_id, pool_id);

    if expected != *pool_info.key {
        return Err(SandwichGuardError::InvalidPda.into());
    }

    Ok(bump)
}

fn create_pool_risk_account<'a>(
    program_id: &Pubkey,
    authority_info: &AccountInfo<'a>,
    pool_info: &AccountInfo<'a>,
    system_program: &AccountInfo<'a>,
    pool_id: &[u8; 32],
    bump: u8,
) -> ProgramResult {
    let rent = Rent::get()?;
    let lamports = rent.minimum_balance(PoolRiskState::LEN);

    invoke_signed(
        &system_instruction::create_account(
            authority_info.key,
            pool_info.key,
            lamports,
            PoolRiskState::LEN as u64,
            program_id,
        ),
        &[
            authority_info.clone(),
            pool_info.clone(),
            system_program.clone(),
        ],
        &[&[POOL_RISK_SEED, pool_id, &[bump]]],
    )
}

/// Create a pool's risk record with host-supplied seed statistics
fn process_initialize_pool(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    pool_id: [u8; 32],
    seed_price: u64,
    seed_trade_size: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let authority_info = next_account_info(account_info_iter)?;
    let pool_info = next_account_info(account_info_iter)?;
    let system_program = next_account_info(account_info_iter)?;

    if !authority_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let bump = verify_pool_pda(program_id, &pool_id, pool_info)?;

    if !pool_info.data_is_empty() {
        return Err(SandwichGuardError::AlreadyInitialized.into());
    }

    create_pool_risk_account(
        program_id,
        authority_info,
        pool_info,
        system_program,
        &pool_id,
        bump,
    )?;

    let now = Clock::get()?.unix_timestamp;
    let state = PoolRiskState::seed(
        pool_id,
        *authority_info.key,
        bump,
        seed_price,
        seed_trade_size,
        now,
    );
    store_pool_risk(&state, pool_info)?;

    msg!(
        "Pool risk record initialized: price {}, trailing avg {}",
        state.last_price,
        state.trailing_avg_size
    );

    Ok(())
}

/// Quote a fee for a proposed trade; no state is mutated
fn process_evaluate_trade(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    pool_id: [u8; 32],
    current_price: u64,
    trade_size: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let pool_info = next_account_info(account_info_iter)?;

    let bump = verify_pool_pda(program_id, &pool_id, pool_info)?;

    let fee_bps = if pool_info.data_is_empty() {
        // First observation of this pool: evaluate against a transient
        // seeded record. The price delta is zero since the seed takes
        // the current price as its last price.
        let seeded = PoolRiskState::seed(
            pool_id,
            Pubkey::default(),
            bump,
            current_price,
            trade_size,
            0,
        );
        RiskFeeEngine::evaluate(&seeded, current_price, trade_size)
    } else {
        let state = load_pool_risk(&pool_info.data.borrow())?;
        RiskFeeEngine::evaluate(&state, current_price, trade_size)
    };

    set_return_data(&fee_bps.to_le_bytes());

    msg!(
        "Trade evaluated: size {}, price {}, fee {} bps",
        trade_size,
        current_price,
        fee_bps
    );

    Ok(())
}

/// Advance the pool's running statistics after a trade settled
fn process_settle_trade(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    pool_id: [u8; 32],
    realized_price: u64,
    trade_size: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let authority_info = next_account_info(account_info_iter)?;
    let pool_info = next_account_info(account_info_iter)?;
    let system_program = next_account_info(account_info_iter)?;

    if !authority_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let bump = verify_pool_pda(program_id, &pool_id, pool_info)?;
    let now = Clock::get()?.unix_timestamp;

    let mut state = if pool_info.data_is_empty() {
        // First observation of this pool: create the record lazily and
        // seed it from the settling trade. The signer becomes the
        // record's authority.
        create_pool_risk_account(
            program_id,
            authority_info,
            pool_info,
            system_program,
            &pool_id,
            bump,
        )?;

        PoolRiskState::seed(
            pool_id,
            *authority_info.key,
            bump,
            realized_price,
            trade_size,
            now,
        )
    } else {
        let state = load_pool_risk(&pool_info.data.borrow())?;

        if state.authority != *authority_info.key {
            return Err(SandwichGuardError::InvalidAuthority.into());
        }

        state
    };

    state.record_settlement(realized_price, trade_size, now);
    store_pool_risk(&state, pool_info)?;

    msg!(
        "Trade settled: trailing avg {}, consecutive spikes {}, last price {}",
        state.trailing_avg_size,
        state.consecutive_spike_count,
        state.last_price
    );

    Ok(())
}

/// Atomically replace a pool's fee tiers and risk thresholds
#[allow(clippy::too_many_arguments)]
fn process_set_fee_config(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    pool_id: [u8; 32],
    low_fee_bps: u16,
    medium_fee_bps: u16,
    high_fee_bps: u16,
    threshold_low: u8,
    threshold_high: u8,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let authority_info = next_account_info(account_info_iter)?;
    let pool_info = next_account_info(account_info_iter)?;

    if !authority_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    verify_pool_pda(program_id, &pool_id, pool_info)?;

    if pool_info.data_is_empty() {
        return Err(SandwichGuardError::NotInitialized.into());
    }

    let mut state = load_pool_risk(&pool_info.data.borrow())?;

    if state.authority != *authority_info.key {
        return Err(SandwichGuardError::InvalidAuthority.into());
    }

    // Validate the candidate in full before touching the stored
    // configuration; a rejection leaves the prior config intact.
    let candidate = state.config.with_fee_tiers(
        low_fee_bps,
        medium_fee_bps,
        high_fee_bps,
        threshold_low,
        threshold_high,
    );
    candidate.validate()?;

    state.config = candidate;
    state.last_update = Clock::get()?.unix_timestamp;
    store_pool_risk(&state, pool_info)?;

    msg!(
        "Fee config updated: {}/{}/{} bps, thresholds {}/{}",
        low_fee_bps,
        medium_fee_bps,
        high_fee_bps,
        threshold_low,
        threshold_high
    );

    Ok(())
}

/// Update scoring weights and normalization parameters
#[allow(clippy::too_many_arguments)]
fn process_update_scoring_parameters(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    pool_id: [u8; 32],
    weight_size: Option<u16>,
    weight_price: Option<u16>,
    weight_spike: Option<u16>,
    spike_multiple: Option<u16>,
    avg_floor: Option<u64>,
    price_scale: Option<u64>,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let authority_info = next_account_info(account_info_iter)?;
    let pool_info = next_account_info(account_info_iter)?;

    if !authority_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    verify_pool_pda(program_id, &pool_id, pool_info)?;

    if pool_info.data_is_empty() {
        return Err(SandwichGuardError::NotInitialized.into());
    }

    let mut state = load_pool_risk(&pool_info.data.borrow())?;

    if state.authority != *authority_info.key {
        return Err(SandwichGuardError::InvalidAuthority.into());
    }

    let mut candidate = state.config.clone();

    if let Some(value) = weight_size {
        candidate.weight_size = value;
    }
    if let Some(value) = weight_price {
        candidate.weight_price = value;
    }
    if let Some(value) = weight_spike {
        candidate.weight_spike = value;
    }
    if let Some(value) = spike_multiple {
        candidate.spike_multiple = value;
    }
    if let Some(value) = avg_floor {
        candidate.avg_floor = value;
    }
    if let Some(value) = price_scale {
        candidate.price_scale = value;
    }

    candidate.validate()?;

    state.config = candidate;

    // The floor may have been raised above the current average
    state.trailing_avg_size = state.trailing_avg_size.max(state.config.avg_floor);

    state.last_update = Clock::get()?.unix_timestamp;
    store_pool_risk(&state, pool_info)?;

    msg!("Scoring parameters updated");

    Ok(())
}

/// Return a pool's current configuration via return data
fn process_get_config(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    pool_id: [u8; 32],
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let pool_info = next_account_info(account_info_iter)?;

    verify_pool_pda(program_id, &pool_id, pool_info)?;

    if pool_info.data_is_empty() {
        return Err(SandwichGuardError::NotInitialized.into());
    }

    let state = load_pool_risk(&pool_info.data.borrow())?;

    let data = borsh::to_vec(&state.config).map_err(|_| ProgramError::InvalidAccountData)?;
    set_return_data(&data);

    Ok(())
}

/// Return a pool's running statistics via return data
fn process_get_metrics(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    pool_id: [u8; 32],
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let pool_info = next_account_info(account_info_iter)?;

    verify_pool_pda(program_id, &pool_id, pool_info)?;

    if pool_info.data_is_empty() {
        return Err(SandwichGuardError::NotInitialized.into());
    }

    let state = load_pool_risk(&pool_info.data.borrow())?;

    let data = borsh::to_vec(&state.metrics()).map_err(|_| ProgramError::InvalidAccountData)?;
    set_return_data(&data);

    Ok(())
}

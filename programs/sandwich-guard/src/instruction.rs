use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::state::PoolRiskState;

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub enum SandwichGuardInstruction {
    /// Create a pool's risk record with host-supplied seed statistics
    /// and the default fee configuration.
    /// Accounts:
    /// 0. `[signer, writable]` Authority (pays for the account)
    /// 1. `[writable]` Pool risk PDA
    /// 2. `[]` System program
    InitializePool {
        pool_id: [u8; 32],
        seed_price: u64,
        seed_trade_size: u64,
    },

    /// Quote the fee for a proposed trade. Read-only; the fee in basis
    /// points is placed in return data as a little-endian u16. A pool
    /// that has never been observed is evaluated against a transient
    /// first-observation record without persisting anything.
    /// Accounts:
    /// 0. `[]` Pool risk PDA
    EvaluateTrade {
        pool_id: [u8; 32],
        current_price: u64,
        trade_size: u64,
    },

    /// Advance the pool's running statistics after a trade settled.
    /// Lazily creates the risk record on the first observation of a
    /// pool, recording the signer as its authority.
    /// Accounts:
    /// 0. `[signer, writable]` Authority (pays on lazy creation)
    /// 1. `[writable]` Pool risk PDA
    /// 2. `[]` System program
    SettleTrade {
        pool_id: [u8; 32],
        realized_price: u64,
        trade_size: u64,
    },

    /// Atomically replace the pool's fee tiers and risk thresholds.
    /// Rejected in full if any invariant is violated.
    /// Accounts:
    /// 0. `[signer]` Authority
    /// 1. `[writable]` Pool risk PDA
    SetFeeConfig {
        pool_id: [u8; 32],
        low_fee_bps: u16,
        medium_fee_bps: u16,
        high_fee_bps: u16,
        threshold_low: u8,
        threshold_high: u8,
    },

    /// Update scoring weights and normalization parameters. Omitted
    /// fields keep their current values; the merged configuration is
    /// validated before anything is written.
    /// Accounts:
    /// 0. `[signer]` Authority
    /// 1. `[writable]` Pool risk PDA
    UpdateScoringParameters {
        pool_id: [u8; 32],
        weight_size: Option<u16>,
        weight_price: Option<u16>,
        weight_spike: Option<u16>,
        spike_multiple: Option<u16>,
        avg_floor: Option<u64>,
        price_scale: Option<u64>,
    },

    /// Read the pool's current configuration. Callable by anyone; the
    /// borsh-serialized `RiskFeeConfig` is placed in return data.
    /// Accounts:
    /// 0. `[]` Pool risk PDA
    GetConfig { pool_id: [u8; 32] },

    /// Read the pool's running statistics. Callable by anyone; the
    /// borsh-serialized `PoolRiskMetrics` is placed in return data.
    /// Accounts:
    /// 0. `[]` Pool risk PDA
    GetMetrics { pool_id: [u8; 32] },
}

impl SandwichGuardInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (&variant, rest) = input
            .split_first()
            .ok_or(ProgramError::InvalidInstructionData)?;

        Ok(match variant {
            0 => {
                let payload = InitializePoolPayload::try_from_slice(rest)?;
                Self::InitializePool {
                    pool_id: payload.pool_id,
                    seed_price: payload.seed_price,
                    seed_trade_size: payload.seed_trade_size,
                }
            }
            1 => {
                let payload = TradePayload::try_from_slice(rest)?;
                Self::EvaluateTrade {
                    pool_id: payload.pool_id,
                    current_price: payload.price,
                    trade_size: payload.trade_size,
                }
            }
            2 => {
                let payload = TradePayload::try_from_slice(rest)?;
                Self::SettleTrade {
                    pool_id: payload.pool_id,
                    realized_price: payload.price,
                    trade_size: payload.trade_size,
                }
            }
            3 => {
                let payload = SetFeeConfigPayload::try_from_slice(rest)?;
                Self::SetFeeConfig {
                    pool_id: payload.pool_id,
                    low_fee_bps: payload.low_fee_bps,
                    medium_fee_bps: payload.medium_fee_bps,
                    high_fee_bps: payload.high_fee_bps,
                    threshold_low: payload.threshold_low,
                    threshold_high: payload.threshold_high,
                }
            }
            4 => {
                let payload = UpdateScoringParametersPayload::try_from_slice(rest)?;
                Self::UpdateScoringParameters {
                    pool_id: payload.pool_id,
                    weight_size: payload.weight_size,
                    weight_price: payload.weight_price,
                    weight_spike: payload.weight_spike,
                    spike_multiple: payload.spike_multiple,
                    avg_floor: payload.avg_floor,
                    price_scale: payload.price_scale,
                }
            }
            5 => {
                let payload = PoolIdPayload::try_from_slice(rest)?;
                Self::GetConfig {
                    pool_id: payload.pool_id,
                }
            }
            6 => {
                let payload = PoolIdPayload::try_from_slice(rest)?;
                Self::GetMetrics {
                    pool_id: payload.pool_id,
                }
            }
            _ => return Err(ProgramError::InvalidInstructionData),
        })
    }
}

// Payload structs for instruction data
#[derive(BorshSerialize, BorshDeserialize)]
struct InitializePoolPayload {
    pool_id: [u8; 32],
    seed_price: u64,
    seed_trade_size: u64,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct TradePayload {
    pool_id: [u8; 32],
    price: u64,
    trade_size: u64,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct SetFeeConfigPayload {
    pool_id: [u8; 32],
    low_fee_bps: u16,
    medium_fee_bps: u16,
    high_fee_bps: u16,
    threshold_low: u8,
    threshold_high: u8,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct UpdateScoringParametersPayload {
    pool_id: [u8; 32],
    weight_size: Option<u16>,
    weight_price: Option<u16>,
    weight_spike: Option<u16>,
    spike_multiple: Option<u16>,
    avg_floor: Option<u64>,
    price_scale: Option<u64>,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct PoolIdPayload {
    pool_id: [u8; 32],
}

// Helper functions to create instructions
pub fn initialize_pool(
    program_id: &Pubkey,
    authority: &Pubkey,
    pool_id: [u8; 32],
    seed_price: u64,
    seed_trade_size: u64,
) -> Instruction {
    let (pool_risk, _) = PoolRiskState::find_address(program_id, &pool_id);

    let data = SandwichGuardInstruction::InitializePool {
        pool_id,
        seed_price,
        seed_trade_size,
    };

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*authority, true),
            AccountMeta::new(pool_risk, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: borsh::to_vec(&data).unwrap(),
    }
}

pub fn evaluate_trade(
    program_id: &Pubkey,
    pool_id: [u8; 32],
    current_price: u64,
    trade_size: u64,
) -> Instruction {
    let (pool_risk, _) = PoolRiskState::find_address(program_id, &pool_id);

    let data = SandwichGuardInstruction::EvaluateTrade {
        pool_id,
        current_price,
        trade_size,
    };

    Instruction {
        program_id: *program_id,
        accounts: vec![AccountMeta::new_readonly(pool_risk, false)],
        data: borsh::to_vec(&data).unwrap(),
    }
}

pub fn settle_trade(
    program_id: &Pubkey,
    authority: &Pubkey,
    pool_id: [u8; 32],
    realized_price: u64,
    trade_size: u64,
) -> Instruction {
    let (pool_risk, _) = PoolRiskState::find_address(program_id, &pool_id);

    let data = SandwichGuardInstruction::SettleTrade {
        pool_id,
        realized_price,
        trade_size,
    };

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*authority, true),
            AccountMeta::new(pool_risk, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: borsh::to_vec(&data).unwrap(),
    }
}

pub fn set_fee_config(
    program_id: &Pubkey,
    authority: &Pubkey,
    pool_id: [u8; 32],
    low_fee_bps: u16,
    medium_fee_bps: u16,
    high_fee_bps: u16,
    threshold_low: u8,
    threshold_high: u8,
) -> Instruction {
    let (pool_risk, _) = PoolRiskState::find_address(program_id, &pool_id);

    let data = SandwichGuardInstruction::SetFeeConfig {
        pool_id,
        low_fee_bps,
        medium_fee_bps,
        high_fee_bps,
        threshold_low,
        threshold_high,
    };

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(pool_risk, false),
        ],
        data: borsh::to_vec(&data).unwrap(),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn update_scoring_parameters(
    program_id: &Pubkey,
    authority: &Pubkey,
    pool_id: [u8; 32],
    weight_size: Option<u16>,
    weight_price: Option<u16>,
    weight_spike: Option<u16>,
    spike_multiple: Option<u16>,
    avg_floor: Option<u64>,
    price_scale: Option<u64>,
) -> Instruction {
    let (pool_risk, _) = PoolRiskState::find_address(program_id, &pool_id);

    let data = SandwichGuardInstruction::UpdateScoringParameters {
        pool_id,
        weight_size,
        weight_price,
        weight_spike,
        spike_multiple,
        avg_floor,
        price_scale,
    };

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(pool_risk, false),
        ],
        data: borsh::to_vec(&data).unwrap(),
    }
}

pub fn get_config(program_id: &Pubkey, pool_id: [u8; 32]) -> Instruction {
    let (pool_risk, _) = PoolRiskState::find_address(program_id, &pool_id);

    Instruction {
        program_id: *program_id,
        accounts: vec![AccountMeta::new_readonly(pool_risk, false)],
        data: borsh::to_vec(&SandwichGuardInstruction::GetConfig { pool_id }).unwrap(),
    }
}

pub fn get_metrics(program_id: &Pubkey, pool_id: [u8; 32]) -> Instruction {
    let (pool_risk, _) = PoolRiskState::find_address(program_id, &pool_id);

    Instruction {
        program_id: *program_id,
        accounts: vec![AccountMeta::new_readonly(pool_risk, false)],
        data: borsh::to_vec(&SandwichGuardInstruction::GetMetrics { pool_id }).unwrap(),
    }
}

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::state::RiskFeeConfig;

/// PDA seed prefix for pool risk records
pub const POOL_RISK_SEED: &[u8] = b"pool_risk";

/// Running sandwich-risk statistics for a single pool
///
/// One record per tracked pool, created the first time the pool is
/// observed and mutated only by trade settlement and configuration
/// updates. The pre-trade evaluation path reads it without writing.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct PoolRiskState {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Is initialized flag
    pub is_initialized: bool,

    /// Principal allowed to settle trades and replace configuration
    pub authority: Pubkey,

    /// Host-supplied pool identifier, also the PDA seed
    pub pool_id: [u8; 32],

    /// PDA bump
    pub bump: u8,

    /// Price snapshot from the most recent settled trade
    pub last_price: u64,

    /// 9:1 exponentially weighted trailing average of settled trade
    /// sizes; floored at `config.avg_floor`, never zero
    pub trailing_avg_size: u64,

    /// Consecutive settled trades whose size exceeded the spike
    /// multiple of the trailing average; saturates, resets on any
    /// non-spike trade
    pub consecutive_spike_count: u8,

    /// Per-pool fee and scoring tunables
    pub config: RiskFeeConfig,

    /// Stats
    pub trades_settled: u64,
    pub spike_trades: u64,

    /// Last mutation timestamp
    pub last_update: i64,
}

/// Snapshot of a pool's running statistics, returned by `GetMetrics`
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct PoolRiskMetrics {
    pub last_price: u64,
    pub trailing_avg_size: u64,
    pub consecutive_spike_count: u8,
    pub trades_settled: u64,
    pub spike_trades: u64,
}

impl PoolRiskState {
    pub const DISCRIMINATOR: [u8; 8] = *b"SNDGUARD";

    pub const LEN: usize = 8 + // discriminator
        1 + // is_initialized
        32 + // authority
        32 + // pool_id
        1 + // bump
        8 + // last_price
        8 + // trailing_avg_size
        1 + // consecutive_spike_count
        RiskFeeConfig::LEN +
        8 + // trades_settled
        8 + // spike_trades
        8 + // last_update
        64; // padding for growth

    /// First-observation record for a pool, with default configuration.
    ///
    /// `last_price` starts at the observed price, so the first
    /// evaluation against this record sees a price delta of zero, and
    /// the trailing average starts at the observed size floored at the
    /// configured minimum.
    pub fn seed(
        pool_id: [u8; 32],
        authority: Pubkey,
        bump: u8,
        current_price: u64,
        trade_size: u64,
        now: i64,
    ) -> Self {
        let config = RiskFeeConfig::default();
        let trailing_avg_size = trade_size.max(config.avg_floor);

        Self {
            discriminator: Self::DISCRIMINATOR,
            is_initialized: true,
            authority,
            pool_id,
            bump,
            last_price: current_price,
            trailing_avg_size,
            consecutive_spike_count: 0,
            config,
            trades_settled: 0,
            spike_trades: 0,
            last_update: now,
        }
    }

    /// Advance the running statistics after a trade settles.
    ///
    /// Runs for every settled trade regardless of the fee it was
    /// quoted. The spike check uses the pre-update average, matching
    /// what the pre-trade evaluation saw for the same trade.
    pub fn record_settlement(&mut self, realized_price: u64, trade_size: u64, now: i64) {
        let relative_size = trade_size / self.trailing_avg_size.max(1);

        let blended =
            (9u128 * self.trailing_avg_size as u128 + trade_size as u128) / 10;
        self.trailing_avg_size = (blended as u64).max(self.config.avg_floor);

        if relative_size > self.config.spike_multiple as u64 {
            self.consecutive_spike_count = self.consecutive_spike_count.saturating_add(1);
            self.spike_trades += 1;
        } else {
            self.consecutive_spike_count = 0;
        }

        self.last_price = realized_price;
        self.trades_settled += 1;
        self.last_update = now;
    }

    /// Snapshot for the `GetMetrics` read path
    pub fn metrics(&self) -> PoolRiskMetrics {
        PoolRiskMetrics {
            last_price: self.last_price,
            trailing_avg_size: self.trailing_avg_size,
            consecutive_spike_count: self.consecutive_spike_count,
            trades_settled: self.trades_settled,
            spike_trades: self.spike_trades,
        }
    }

    /// Derive the record address for a pool
    pub fn find_address(program_id: &Pubkey, pool_id: &[u8; 32]) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[POOL_RISK_SEED, pool_id], program_id)
    }

    /// Validate account integrity
    pub fn validate(&self) -> Result<(), ProgramError> {
        if self.discriminator != Self::DISCRIMINATOR {
            return Err(ProgramError::InvalidAccountData);
        }

        if !self.is_initialized {
            return Err(ProgramError::UninitializedAccount);
        }

        self.config.validate()
    }
}

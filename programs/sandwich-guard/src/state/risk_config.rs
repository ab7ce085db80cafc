use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::program_error::ProgramError;

use crate::error::SandwichGuardError;

/// Fee ceiling in basis points (100%)
pub const MAX_FEE_BPS: u16 = 10_000;

pub const DEFAULT_LOW_FEE_BPS: u16 = 5;
pub const DEFAULT_MEDIUM_FEE_BPS: u16 = 20;
pub const DEFAULT_HIGH_FEE_BPS: u16 = 60;
pub const DEFAULT_THRESHOLD_LOW: u8 = 50;
pub const DEFAULT_THRESHOLD_HIGH: u8 = 150;
pub const DEFAULT_WEIGHT_SIZE: u16 = 50;
pub const DEFAULT_WEIGHT_PRICE: u16 = 30;
pub const DEFAULT_WEIGHT_SPIKE: u16 = 20;
pub const DEFAULT_SPIKE_MULTIPLE: u16 = 5;
pub const DEFAULT_AVG_FLOOR: u64 = 1;
pub const DEFAULT_PRICE_SCALE: u64 = 1;

/// Per-pool fee and scoring tunables
///
/// Lives inside the pool's risk account and is only ever replaced as a
/// whole after `validate()` passes, so readers observe either the full
/// old configuration or the full new one.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct RiskFeeConfig {
    /// Fee charged below the low risk threshold (basis points)
    pub low_fee_bps: u16,

    /// Fee charged between the two thresholds (basis points)
    pub medium_fee_bps: u16,

    /// Fee charged at or above the high threshold (basis points)
    pub high_fee_bps: u16,

    /// Score at which the medium tier starts (inclusive)
    pub threshold_low: u8,

    /// Score at which the high tier starts (inclusive)
    pub threshold_high: u8,

    /// Weight applied to the trade size / trailing average ratio
    pub weight_size: u16,

    /// Weight applied to the scaled price delta
    pub weight_price: u16,

    /// Weight applied to the consecutive spike counter
    pub weight_spike: u16,

    /// A settled trade larger than this multiple of the trailing
    /// average counts as a spike
    pub spike_multiple: u16,

    /// Lower bound for the trailing average; must stay >= 1 so the
    /// relative-size division is always defined
    pub avg_floor: u64,

    /// Divisor applied to the raw price delta before weighting.
    /// Hosts with high-magnitude price units (e.g. sqrt-price Q64
    /// representations) set this to bring the delta into the same
    /// scale as the dimensionless size ratio.
    pub price_scale: u64,
}

impl Default for RiskFeeConfig {
    fn default() -> Self {
        Self {
            low_fee_bps: DEFAULT_LOW_FEE_BPS,
            medium_fee_bps: DEFAULT_MEDIUM_FEE_BPS,
            high_fee_bps: DEFAULT_HIGH_FEE_BPS,
            threshold_low: DEFAULT_THRESHOLD_LOW,
            threshold_high: DEFAULT_THRESHOLD_HIGH,
            weight_size: DEFAULT_WEIGHT_SIZE,
            weight_price: DEFAULT_WEIGHT_PRICE,
            weight_spike: DEFAULT_WEIGHT_SPIKE,
            spike_multiple: DEFAULT_SPIKE_MULTIPLE,
            avg_floor: DEFAULT_AVG_FLOOR,
            price_scale: DEFAULT_PRICE_SCALE,
        }
    }
}

impl RiskFeeConfig {
    pub const LEN: usize = 2 + // low_fee_bps
        2 + // medium_fee_bps
        2 + // high_fee_bps
        1 + // threshold_low
        1 + // threshold_high
        2 + // weight_size
        2 + // weight_price
        2 + // weight_spike
        2 + // spike_multiple
        8 + // avg_floor
        8; // price_scale

    /// Candidate configuration with the fee tiers and thresholds
    /// replaced. The caller validates before persisting.
    pub fn with_fee_tiers(
        &self,
        low_fee_bps: u16,
        medium_fee_bps: u16,
        high_fee_bps: u16,
        threshold_low: u8,
        threshold_high: u8,
    ) -> Self {
        Self {
            low_fee_bps,
            medium_fee_bps,
            high_fee_bps,
            threshold_low,
            threshold_high,
            ..self.clone()
        }
    }

    /// Validate configuration invariants
    pub fn validate(&self) -> Result<(), ProgramError> {
        if self.high_fee_bps > MAX_FEE_BPS {
            return Err(SandwichGuardError::FeeOutOfRange.into());
        }

        if self.low_fee_bps >= self.medium_fee_bps || self.medium_fee_bps >= self.high_fee_bps {
            return Err(SandwichGuardError::InvalidFeeTiers.into());
        }

        if self.threshold_low >= self.threshold_high {
            return Err(SandwichGuardError::InvalidThresholds.into());
        }

        if self.avg_floor == 0 || self.price_scale == 0 || self.spike_multiple == 0 {
            return Err(SandwichGuardError::InvalidScalingParameter.into());
        }

        Ok(())
    }
}

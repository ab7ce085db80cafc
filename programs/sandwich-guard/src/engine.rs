use crate::state::{PoolRiskState, RiskFeeConfig};

/// Risk scores live in an 8-bit range shared with the tier thresholds
pub const SCORE_MAX: u8 = u8::MAX;

/// Stateless risk scoring and fee tiering
///
/// Reads a pool's risk record plus the proposed trade and produces a
/// fee in basis points. Nothing here mutates state, so the host may
/// call it speculatively for quotes.
pub struct RiskFeeEngine;

impl RiskFeeEngine {
    /// Trade size as a multiple of the pool's trailing average.
    ///
    /// Integer division: a trade smaller than the average contributes
    /// zero. The trailing average is floored at the configured minimum
    /// by the state update rules, so the denominator is never zero.
    pub fn relative_size(trade_size: u64, trailing_avg_size: u64) -> u64 {
        trade_size / trailing_avg_size.max(1)
    }

    /// Weighted anomaly score for a proposed trade.
    ///
    /// Accumulated in u128 and clamped into the 8-bit score range,
    /// never wrapped; oversized inputs saturate at the top tier.
    pub fn risk_score(state: &PoolRiskState, current_price: u64, trade_size: u64) -> u8 {
        let config = &state.config;

        let relative_size = Self::relative_size(trade_size, state.trailing_avg_size);
        let delta_price = current_price.abs_diff(state.last_price) / config.price_scale.max(1);

        let score = (config.weight_size as u128) * (relative_size as u128)
            + (config.weight_price as u128) * (delta_price as u128)
            + (config.weight_spike as u128) * (state.consecutive_spike_count as u128);

        score.min(SCORE_MAX as u128) as u8
    }

    /// Map a score onto the configured fee tiers.
    ///
    /// Boundaries are half-open on the low end: a score exactly equal
    /// to a threshold takes the higher tier.
    pub fn fee_for_score(config: &RiskFeeConfig, score: u8) -> u16 {
        if score < config.threshold_low {
            config.low_fee_bps
        } else if score < config.threshold_high {
            config.medium_fee_bps
        } else {
            config.high_fee_bps
        }
    }

    /// Fee in basis points for a proposed trade. Read-only.
    pub fn evaluate(state: &PoolRiskState, current_price: u64, trade_size: u64) -> u16 {
        let score = Self::risk_score(state, current_price, trade_size);
        Self::fee_for_score(&state.config, score)
    }
}

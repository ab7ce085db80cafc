use sandwich_guard::{
    engine::{RiskFeeEngine, SCORE_MAX},
    error::SandwichGuardError,
    state::{PoolRiskState, RiskFeeConfig},
};
use solana_sdk::pubkey::Pubkey;

const P0: u64 = 1_000_000;

fn tracked_pool(trailing_avg: u64, last_price: u64) -> PoolRiskState {
    PoolRiskState::seed(
        [7u8; 32],
        Pubkey::new_unique(),
        255,
        last_price,
        trailing_avg,
        0,
    )
}

#[test]
fn test_normal_trade_quotes_low_fee() {
    let state = tracked_pool(1000, P0);

    // Size well under the trailing average, no price movement
    assert_eq!(RiskFeeEngine::risk_score(&state, P0, 100), 0);
    assert_eq!(RiskFeeEngine::evaluate(&state, P0, 100), 5);
}

#[test]
fn test_single_outlier_quotes_high_fee() {
    let mut state = tracked_pool(1000, P0);

    // 8x the trailing average, 50 units of price movement
    let score = RiskFeeEngine::risk_score(&state, P0 + 50, 8000);
    assert_eq!(score, SCORE_MAX);
    assert_eq!(RiskFeeEngine::evaluate(&state, P0 + 50, 8000), 60);

    state.record_settlement(P0 + 50, 8000, 0);
    assert_eq!(state.consecutive_spike_count, 1);
    assert_eq!(state.trailing_avg_size, 1700);
    assert_eq!(state.last_price, P0 + 50);
    assert_eq!(state.trades_settled, 1);
    assert_eq!(state.spike_trades, 1);
}

#[test]
fn test_repeated_spikes_leave_pattern_memory() {
    let mut state = tracked_pool(1000, P0);

    // Three consecutive trades each above 5x the running average
    state.record_settlement(P0, 8000, 0); // 8000 / 1000 = 8
    state.record_settlement(P0, 10_200, 0); // 10200 / 1700 = 6
    state.record_settlement(P0, 15_300, 0); // 15300 / 2550 = 6

    assert_eq!(state.consecutive_spike_count, 3);
    assert_eq!(state.trailing_avg_size, 3825);

    // Trade size normalizes but the spike memory alone contributes
    // w3 * 3 = 60, enough for the medium tier
    let score = RiskFeeEngine::risk_score(&state, P0, 100);
    assert_eq!(score, 60);
    assert_eq!(RiskFeeEngine::evaluate(&state, P0, 100), 20);

    // A single quiet trade resets the streak
    state.record_settlement(P0, 100, 0);
    assert_eq!(state.consecutive_spike_count, 0);
}

#[test]
fn test_first_observation_sees_zero_price_delta() {
    // Seeding takes the observed price as the last price, so the first
    // evaluation scores no price movement no matter the magnitude
    let near_zero = tracked_pool(500, 5);
    let sky_high = tracked_pool(500, u64::MAX);

    let score_a = RiskFeeEngine::risk_score(&near_zero, 5, 500);
    let score_b = RiskFeeEngine::risk_score(&sky_high, u64::MAX, 500);

    // Only the relative-size term remains: 50 * (500 / 500) = 50
    assert_eq!(score_a, 50);
    assert_eq!(score_a, score_b);
}

#[test]
fn test_tier_boundaries_take_higher_tier() {
    let mut state = tracked_pool(1, P0);
    state.config.weight_size = 1;
    state.config.weight_price = 0;
    state.config.weight_spike = 0;

    // Score equals trade size with a unit weight and unit average
    assert_eq!(RiskFeeEngine::evaluate(&state, P0, 49), 5);
    assert_eq!(RiskFeeEngine::evaluate(&state, P0, 50), 20); // exactly threshold_low
    assert_eq!(RiskFeeEngine::evaluate(&state, P0, 149), 20);
    assert_eq!(RiskFeeEngine::evaluate(&state, P0, 150), 60); // exactly threshold_high
}

#[test]
fn test_fee_monotonic_in_trade_size() {
    let state = tracked_pool(1000, P0);

    let mut last_fee = 0;
    for size in [0, 100, 999, 1000, 3000, 5000, 8000, 20_000, u64::MAX] {
        let fee = RiskFeeEngine::evaluate(&state, P0, size);
        assert!(fee >= last_fee, "fee dropped at size {}", size);
        last_fee = fee;
    }
}

#[test]
fn test_fee_monotonic_in_price_delta() {
    let state = tracked_pool(1000, P0);

    let mut last_fee = 0;
    for delta in [0, 1, 2, 5, 50, 1000, 1_000_000] {
        let fee = RiskFeeEngine::evaluate(&state, P0 + delta, 100);
        assert!(fee >= last_fee, "fee dropped at delta {}", delta);
        last_fee = fee;
    }
}

#[test]
fn test_fee_monotonic_in_spike_count() {
    let mut last_fee = 0;
    for spikes in 0..=u8::MAX {
        let mut state = tracked_pool(1000, P0);
        state.consecutive_spike_count = spikes;

        let fee = RiskFeeEngine::evaluate(&state, P0, 100);
        assert!(fee >= last_fee, "fee dropped at spike count {}", spikes);
        last_fee = fee;
    }
}

#[test]
fn test_score_saturates_instead_of_wrapping() {
    // Enormous inputs must land on the top tier, not wrap the
    // accumulator around to a cheap fee
    let state = tracked_pool(1, P0);
    assert_eq!(RiskFeeEngine::risk_score(&state, P0, u64::MAX), SCORE_MAX);
    assert_eq!(RiskFeeEngine::evaluate(&state, P0, u64::MAX), 60);

    let state = tracked_pool(1000, 0);
    assert_eq!(RiskFeeEngine::risk_score(&state, u64::MAX, 0), SCORE_MAX);
    assert_eq!(RiskFeeEngine::evaluate(&state, u64::MAX, 0), 60);
}

#[test]
fn test_trailing_average_decays_to_floor_not_zero() {
    let mut state = tracked_pool(1000, P0);

    let mut previous = state.trailing_avg_size;
    for _ in 0..200 {
        state.record_settlement(P0, 0, 0);
        assert!(state.trailing_avg_size >= state.config.avg_floor);
        assert!(state.trailing_avg_size <= previous);
        assert_eq!(state.consecutive_spike_count, 0);
        previous = state.trailing_avg_size;
    }

    assert_eq!(state.trailing_avg_size, state.config.avg_floor);
}

#[test]
fn test_spike_check_uses_pre_update_average() {
    let mut state = tracked_pool(1000, P0);

    // 5001 / 1000 = 5, not strictly above the 5x multiple
    state.record_settlement(P0, 5001, 0);
    assert_eq!(state.consecutive_spike_count, 0);

    // 6000 / 1400 = 4 against the updated average, still no spike
    assert_eq!(state.trailing_avg_size, 1400);
    state.record_settlement(P0, 6000, 0);
    assert_eq!(state.consecutive_spike_count, 0);
}

#[test]
fn test_spike_counter_saturates() {
    let mut state = tracked_pool(1, P0);
    state.consecutive_spike_count = u8::MAX;

    // Massive trade against a floored average keeps the counter pinned
    state.record_settlement(P0, u64::MAX / 16, 0);
    assert_eq!(state.consecutive_spike_count, u8::MAX);
}

#[test]
fn test_evaluate_is_idempotent() {
    let state = tracked_pool(1000, P0);
    let before = state.metrics();

    let first = RiskFeeEngine::evaluate(&state, P0 + 10, 2500);
    let second = RiskFeeEngine::evaluate(&state, P0 + 10, 2500);

    assert_eq!(first, second);
    assert_eq!(state.metrics(), before);
}

#[test]
fn test_price_scale_normalizes_delta_contribution() {
    let mut state = tracked_pool(1000, P0);
    state.config.weight_size = 0;
    state.config.weight_price = 1;
    state.config.weight_spike = 0;

    // Raw units: a 5000-unit move saturates the score
    assert_eq!(RiskFeeEngine::risk_score(&state, P0 + 5000, 0), SCORE_MAX);

    // Scaled down 100x the same move scores 50
    state.config.price_scale = 100;
    assert_eq!(RiskFeeEngine::risk_score(&state, P0 + 5000, 0), 50);
    assert_eq!(RiskFeeEngine::evaluate(&state, P0 + 5000, 0), 20);
}

#[test]
fn test_config_validation() {
    assert!(RiskFeeConfig::default().validate().is_ok());

    let mut config = RiskFeeConfig::default();
    config.low_fee_bps = 20;
    config.medium_fee_bps = 20;
    assert_eq!(
        config.validate(),
        Err(SandwichGuardError::InvalidFeeTiers.into())
    );

    let mut config = RiskFeeConfig::default();
    config.high_fee_bps = 10_001;
    assert_eq!(
        config.validate(),
        Err(SandwichGuardError::FeeOutOfRange.into())
    );

    let mut config = RiskFeeConfig::default();
    config.threshold_low = 150;
    assert_eq!(
        config.validate(),
        Err(SandwichGuardError::InvalidThresholds.into())
    );

    let mut config = RiskFeeConfig::default();
    config.avg_floor = 0;
    assert_eq!(
        config.validate(),
        Err(SandwichGuardError::InvalidScalingParameter.into())
    );

    let mut config = RiskFeeConfig::default();
    config.price_scale = 0;
    assert_eq!(
        config.validate(),
        Err(SandwichGuardError::InvalidScalingParameter.into())
    );
}

#[test]
fn test_fee_tier_replacement_keeps_scoring_parameters() {
    let mut config = RiskFeeConfig::default();
    config.weight_size = 75;
    config.price_scale = 1_000;

    let candidate = config.with_fee_tiers(10, 40, 80, 60, 160);
    assert!(candidate.validate().is_ok());

    assert_eq!(candidate.low_fee_bps, 10);
    assert_eq!(candidate.medium_fee_bps, 40);
    assert_eq!(candidate.high_fee_bps, 80);
    assert_eq!(candidate.threshold_low, 60);
    assert_eq!(candidate.threshold_high, 160);

    // Scoring parameters ride along untouched
    assert_eq!(candidate.weight_size, 75);
    assert_eq!(candidate.price_scale, 1_000);
}

#[test]
fn test_zero_size_trade_contributes_nothing() {
    let state = tracked_pool(1000, P0);

    assert_eq!(RiskFeeEngine::relative_size(0, state.trailing_avg_size), 0);
    assert_eq!(RiskFeeEngine::risk_score(&state, P0, 0), 0);
    assert_eq!(RiskFeeEngine::evaluate(&state, P0, 0), 5);
}

#[test]
fn test_relative_size_truncates() {
    assert_eq!(RiskFeeEngine::relative_size(999, 1000), 0);
    assert_eq!(RiskFeeEngine::relative_size(1000, 1000), 1);
    assert_eq!(RiskFeeEngine::relative_size(8000, 1000), 8);
}

#[test]
fn test_settlement_runs_for_every_trade() {
    let mut state = tracked_pool(1000, P0);

    // A trade that would have been quoted the top fee still feeds the
    // running statistics
    assert_eq!(RiskFeeEngine::evaluate(&state, P0, 50_000), 60);
    state.record_settlement(P0, 50_000, 0);

    assert_eq!(state.trades_settled, 1);
    assert_eq!(state.trailing_avg_size, 5900);
}

use serde::{Deserialize, Serialize};

/// Immutable scoring parameters, passed into the engine at construction.
///
/// Component caps sum to the total cap (40 + 13 + 15 = 68); the total is
/// clamped again during composition as a defensive invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub fundamental_cap: f64,
    pub technical_cap: f64,
    pub options_cap: f64,
    pub total_cap: f64,
    /// How many of the nearest future expirations the options scan considers
    pub expirations_considered: usize,
    /// How many of the nearest out-of-the-money strikes per expiration
    pub otm_strike_limit: usize,
    /// Floor for the days-to-expiration divisor in return annualization
    pub min_days_to_expiry: i64,
    /// Annual risk-free rate used by the probability-ITM approximation
    pub risk_free_rate: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            fundamental_cap: 40.0,
            technical_cap: 13.0,
            options_cap: 15.0,
            total_cap: 68.0,
            expirations_considered: 2,
            otm_strike_limit: 10,
            min_days_to_expiry: 1,
            risk_free_rate: 0.05,
        }
    }
}

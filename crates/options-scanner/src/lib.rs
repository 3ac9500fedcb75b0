//! Scans a call-option chain for covered-call writing opportunities and maps
//! the best one to a bounded 0-15 point contribution.
//!
//! Selection rules: the two nearest expirations strictly after the evaluation
//! date, and per expiration the ten nearest strikes above the underlying
//! price (a covered call is written out of the money). Premium is the bid/ask
//! midpoint; one-sided or zero quotes are excluded as untradable.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use screener_core::{CallOpportunity, OptionChain, OptionContract, ScoringConfig};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Result of scanning one chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub points: f64,
    /// Highest annualized-return candidate, ties broken by nearer expiration
    /// then higher strike. Absent when nothing tradable exists — not an error.
    pub best: Option<CallOpportunity>,
    pub details: BTreeMap<String, f64>,
}

impl ScanOutcome {
    fn empty() -> Self {
        Self {
            points: 0.0,
            best: None,
            details: BTreeMap::new(),
        }
    }
}

pub struct OptionsScanner {
    cap: f64,
    expirations_considered: usize,
    otm_strike_limit: usize,
    min_days_to_expiry: i64,
    risk_free_rate: f64,
}

impl OptionsScanner {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            cap: config.options_cap,
            expirations_considered: config.expirations_considered,
            otm_strike_limit: config.otm_strike_limit,
            min_days_to_expiry: config.min_days_to_expiry.max(1),
            risk_free_rate: config.risk_free_rate,
        }
    }

    /// Scan a chain as of the given date. `realized_vol_pct` is the trailing
    /// annualized volatility of the underlying (percent); it backs the
    /// probability-ITM estimate when a contract carries no implied volatility.
    pub fn scan(
        &self,
        chain: &OptionChain,
        current_price: f64,
        as_of: NaiveDate,
        realized_vol_pct: Option<f64>,
    ) -> ScanOutcome {
        if !(current_price > 0.0) {
            return ScanOutcome::empty();
        }

        let mut expirations: Vec<NaiveDate> = chain
            .expirations()
            .into_iter()
            .filter(|e| *e > as_of)
            .collect();
        expirations.truncate(self.expirations_considered);

        let mut candidates: Vec<CallOpportunity> = Vec::new();
        for expiration in &expirations {
            let mut otm: Vec<&OptionContract> = chain
                .contracts_for(*expiration)
                .into_iter()
                .filter(|c| c.strike > current_price)
                .collect();
            otm.sort_by(|a, b| a.strike.partial_cmp(&b.strike).unwrap_or(Ordering::Equal));
            otm.truncate(self.otm_strike_limit);

            for contract in otm {
                let Some(premium) = contract.midpoint_premium() else {
                    continue;
                };
                // Expirations are strictly in the future, so this is >= 1;
                // the floor stays as a guard against degenerate inputs.
                let days_to_expiry = (*expiration - as_of).num_days().max(self.min_days_to_expiry);
                let annualized_return =
                    (premium / current_price) * (365.0 / days_to_expiry as f64);

                let vol_pct = contract
                    .implied_volatility
                    .map(|iv| iv * 100.0)
                    .or(realized_vol_pct);

                candidates.push(CallOpportunity {
                    strike: contract.strike,
                    expiration: *expiration,
                    premium,
                    annualized_return,
                    days_to_expiry,
                    probability_itm: self.probability_itm(
                        current_price,
                        contract.strike,
                        vol_pct,
                        days_to_expiry,
                    ),
                    delta: Some(approximate_call_delta(current_price, contract.strike)),
                    theta: Some(-premium / (days_to_expiry + 1) as f64),
                });
            }
        }

        let Some(best) = candidates
            .iter()
            .max_by(|a, b| preferred(a, b))
            .cloned()
        else {
            return ScanOutcome::empty();
        };

        let return_points = if best.annualized_return >= 0.40 {
            10.0
        } else if best.annualized_return >= 0.25 {
            8.0
        } else if best.annualized_return >= 0.15 {
            6.0
        } else if best.annualized_return >= 0.08 {
            4.0
        } else if best.annualized_return > 0.0 {
            2.0
        } else {
            0.0
        };

        // Shorter expiries recycle capital faster for the same annualized yield
        let efficiency_points = if best.days_to_expiry <= 21 {
            5.0
        } else if best.days_to_expiry <= 35 {
            3.0
        } else if best.days_to_expiry <= 60 {
            1.0
        } else {
            0.0
        };

        let mut details = BTreeMap::new();
        details.insert("annualized_return_tier".to_string(), return_points);
        details.insert("capital_efficiency_tier".to_string(), efficiency_points);
        details.insert("candidates_considered".to_string(), candidates.len() as f64);

        ScanOutcome {
            points: (return_points + efficiency_points).clamp(0.0, self.cap),
            best: Some(best),
            details,
        }
    }

    /// Chance the call finishes in the money, in percent, via the
    /// Black-Scholes d1 approximation. `None` when no usable volatility
    /// exists.
    fn probability_itm(
        &self,
        current_price: f64,
        strike: f64,
        vol_pct: Option<f64>,
        days_to_expiry: i64,
    ) -> Option<f64> {
        let vol = vol_pct? / 100.0;
        if vol <= 0.0 || strike <= 0.0 {
            return None;
        }

        let t = days_to_expiry as f64 / 365.0;
        let d1 = ((current_price / strike).ln() + (self.risk_free_rate + 0.5 * vol * vol) * t)
            / (vol * t.sqrt());

        let normal = Normal::new(0.0, 1.0).ok()?;
        Some(normal.cdf(d1) * 100.0)
    }
}

/// Ranking order between two candidates: higher annualized return, then
/// nearer expiration, then higher strike (more upside retained).
fn preferred(a: &CallOpportunity, b: &CallOpportunity) -> Ordering {
    a.annualized_return
        .partial_cmp(&b.annualized_return)
        .unwrap_or(Ordering::Equal)
        .then(b.days_to_expiry.cmp(&a.days_to_expiry))
        .then(a.strike.partial_cmp(&b.strike).unwrap_or(Ordering::Equal))
}

/// Linear moneyness approximation of a call delta, clamped to [-1, 1]
fn approximate_call_delta(current_price: f64, strike: f64) -> f64 {
    (0.5 + 0.5 * (current_price - strike) / (current_price * 0.1)).clamp(-1.0, 1.0)
}

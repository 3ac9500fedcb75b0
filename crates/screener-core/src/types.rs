use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One daily OHLCV session for an underlying
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Point-in-time fundamental metrics for one symbol.
///
/// `None` means the data provider could not supply the metric; scoring treats
/// it as a zero-point contribution, never as an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    /// Return on equity, percent
    pub roe_pct: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub current_ratio: Option<f64>,
    /// Net profit margin, percent
    pub profit_margin_pct: Option<f64>,
    /// Year-over-year revenue growth, percent
    pub revenue_growth_pct: Option<f64>,
    pub dividend_yield_pct: Option<f64>,
    pub beta: Option<f64>,
}

/// A single listed call contract from a chain snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionContract {
    pub strike: f64,
    pub expiration: NaiveDate,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    /// Implied volatility as a fraction (0.25 = 25%)
    pub implied_volatility: Option<f64>,
}

impl OptionContract {
    /// Bid/ask midpoint. `None` when either side is missing or zero — such
    /// contracts are not tradable at a meaningful premium and get excluded.
    pub fn midpoint_premium(&self) -> Option<f64> {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) if bid > 0.0 && ask > 0.0 => Some((bid + ask) / 2.0),
            _ => None,
        }
    }
}

/// Call-side option chain snapshot for one underlying
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChain {
    pub symbol: String,
    pub contracts: Vec<OptionContract>,
}

impl OptionChain {
    /// Expirations present in the chain, ascending and deduplicated
    pub fn expirations(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.contracts.iter().map(|c| c.expiration).collect();
        dates.sort_unstable();
        dates.dedup();
        dates
    }

    /// All contracts expiring on the given date
    pub fn contracts_for(&self, expiration: NaiveDate) -> Vec<&OptionContract> {
        self.contracts
            .iter()
            .filter(|c| c.expiration == expiration)
            .collect()
    }
}

/// MACD state at the latest session
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdSnapshot {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
    /// True when the MACD line crossed above the signal on the latest session
    pub bullish_cross: bool,
}

/// Bollinger band state at the latest session
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerSnapshot {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// (upper - lower) / middle
    pub bandwidth: f64,
}

/// Technical indicator values computed from one price series.
///
/// Derived per evaluation run, never persisted. `None` marks indicators the
/// series was too short to compute; downstream scoring treats those as zero
/// contributions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub last_close: Option<f64>,
    /// Annualized standard deviation of daily log returns, percent
    pub volatility_pct: Option<f64>,
    /// 14-period Wilder RSI, bounded [0, 100]
    pub rsi: Option<f64>,
    pub macd: Option<MacdSnapshot>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub bollinger: Option<BollingerSnapshot>,
}

/// Per-component point breakdown for one symbol.
///
/// Invariant: each component is clamped to its cap (40/13/15) and
/// `total == fundamental_points + technical_points + options_points`, capped
/// at 68.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub fundamental_points: f64,
    pub technical_points: f64,
    pub options_points: f64,
    pub total: f64,
    /// Sub-metric name -> points awarded
    pub component_details: BTreeMap<String, f64>,
}

/// The single covered-call candidate backing a recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallOpportunity {
    pub strike: f64,
    pub expiration: NaiveDate,
    /// Bid/ask midpoint premium per share
    pub premium: f64,
    /// (premium / underlying price) * (365 / days_to_expiry), as a fraction
    pub annualized_return: f64,
    pub days_to_expiry: i64,
    /// Black-Scholes d1 approximation of the chance the call finishes ITM, percent
    pub probability_itm: Option<f64>,
    pub delta: Option<f64>,
    pub theta: Option<f64>,
}

/// Final scored output for one symbol. Created fresh each evaluation cycle
/// and never mutated afterwards; ranking only reorders collections of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub symbol: String,
    pub current_price: f64,
    pub as_of: NaiveDate,
    pub evaluated_at: DateTime<Utc>,
    pub breakdown: ScoreBreakdown,
    pub best_opportunity: Option<CallOpportunity>,
}

/// Everything the market-data collaborator supplies for one symbol.
///
/// Owned by the fetch layer and borrowed by the core for the duration of one
/// evaluation; the core never retains it past producing a `Recommendation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolBundle {
    pub symbol: String,
    pub current_price: f64,
    pub as_of: NaiveDate,
    /// Chronologically ordered daily sessions
    pub series: Vec<Session>,
    pub fundamentals: FundamentalSnapshot,
    pub chain: OptionChain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_fundamental_payload_deserializes_with_nones() {
        // Providers omit metrics they cannot supply
        let snapshot: FundamentalSnapshot =
            serde_json::from_str(r#"{"pe_ratio": 12.0, "beta": 1.1}"#).unwrap();

        assert_eq!(snapshot.pe_ratio, Some(12.0));
        assert_eq!(snapshot.beta, Some(1.1));
        assert!(snapshot.market_cap.is_none());
        assert!(snapshot.dividend_yield_pct.is_none());
    }

    #[test]
    fn midpoint_premium_requires_both_sides_positive() {
        let expiration = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
        let quoted = OptionContract {
            strike: 105.0,
            expiration,
            bid: Some(2.40),
            ask: Some(2.50),
            implied_volatility: None,
        };
        assert_eq!(quoted.midpoint_premium(), Some(2.45));

        let zero_bid = OptionContract { bid: Some(0.0), ..quoted.clone() };
        assert!(zero_bid.midpoint_premium().is_none());

        let one_sided = OptionContract { ask: None, ..quoted };
        assert!(one_sided.midpoint_premium().is_none());
    }

    #[test]
    fn chain_expirations_come_back_sorted_and_deduplicated() {
        let near = NaiveDate::from_ymd_opt(2025, 6, 6).unwrap();
        let far = NaiveDate::from_ymd_opt(2025, 6, 13).unwrap();
        let contract = |expiration| OptionContract {
            strike: 100.0,
            expiration,
            bid: None,
            ask: None,
            implied_volatility: None,
        };

        let chain = OptionChain {
            symbol: "XYZ".to_string(),
            contracts: vec![contract(far), contract(near), contract(far)],
        };

        assert_eq!(chain.expirations(), vec![near, far]);
        assert_eq!(chain.contracts_for(far).len(), 2);
    }
}

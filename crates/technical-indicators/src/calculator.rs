use std::collections::BTreeMap;

use screener_core::{BollingerSnapshot, IndicatorSet, MacdSnapshot, Session};
use serde::{Deserialize, Serialize};

use crate::indicators::*;

pub const VOLATILITY_WINDOW: usize = 20;
pub const RSI_PERIOD: usize = 14;
pub const BOLLINGER_PERIOD: usize = 20;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Points awarded for the technical component, with per-check details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalScore {
    pub points: f64,
    pub details: BTreeMap<String, f64>,
}

/// Computes an `IndicatorSet` from a price series and maps it to the 0-13
/// technical point contribution.
pub struct IndicatorCalculator {
    cap: f64,
}

impl IndicatorCalculator {
    pub fn new(cap: f64) -> Self {
        Self { cap }
    }

    /// Pure function of the input series. Indicators the series is too short
    /// for come back as `None`; they are never an error.
    pub fn compute(&self, series: &[Session]) -> IndicatorSet {
        let closes: Vec<f64> = series.iter().map(|s| s.close).collect();

        let last_close = closes.last().copied();
        let volatility_pct = annualized_volatility_pct(&closes, VOLATILITY_WINDOW);

        // RSI needs only 15 closes mathematically, but below 20 sessions the
        // smoothed averages are still warming up; treat it as unavailable.
        let rsi_value = if closes.len() >= VOLATILITY_WINDOW {
            rsi(&closes, RSI_PERIOD).last().copied()
        } else {
            None
        };

        let sma_20 = sma(&closes, 20).last().copied();
        let sma_50 = sma(&closes, 50).last().copied();

        let bollinger_snapshot = {
            let bands = bollinger(&closes, BOLLINGER_PERIOD, 2.0);
            match (bands.upper.last(), bands.middle.last(), bands.lower.last()) {
                (Some(&upper), Some(&middle), Some(&lower)) if middle != 0.0 => {
                    Some(BollingerSnapshot {
                        upper,
                        middle,
                        lower,
                        bandwidth: (upper - lower) / middle,
                    })
                }
                _ => None,
            }
        };

        // The 9-period signal line only exists once the MACD line itself has
        // at least 9 values, so the full snapshot needs 34 closes.
        let macd_snapshot = {
            let m = macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
            match (m.line.last(), m.signal.last(), m.histogram.last()) {
                (Some(&line), Some(&signal), Some(&histogram)) => {
                    let bullish_cross = m.histogram.len() >= 2
                        && histogram > 0.0
                        && m.histogram[m.histogram.len() - 2] <= 0.0;
                    Some(MacdSnapshot { line, signal, histogram, bullish_cross })
                }
                _ => None,
            }
        };

        IndicatorSet {
            last_close,
            volatility_pct,
            rsi: rsi_value,
            macd: macd_snapshot,
            sma_20,
            sma_50,
            bollinger: bollinger_snapshot,
        }
    }

    /// Map an indicator set to covered-call suitability points (cap 13).
    ///
    /// Every unavailable indicator contributes zero. Moderate volatility and
    /// a neutral-to-mildly-bullish tape are what a call writer wants: enough
    /// premium to sell, not so much momentum that upside gets called away.
    pub fn score(&self, set: &IndicatorSet) -> TechnicalScore {
        let mut details = BTreeMap::new();

        if let Some(vol) = set.volatility_pct {
            let pts = if (20.0..=40.0).contains(&vol) {
                4.0
            } else if (15.0..=50.0).contains(&vol) {
                3.0
            } else if (10.0..=60.0).contains(&vol) {
                2.0
            } else {
                1.0
            };
            details.insert("volatility_band".to_string(), pts);
        }

        if let Some(rsi) = set.rsi {
            let pts = if (40.0..=60.0).contains(&rsi) {
                3.0
            } else if (30.0..=70.0).contains(&rsi) {
                2.0
            } else {
                1.0
            };
            details.insert("rsi_neutrality".to_string(), pts);
        }

        if let (Some(close), Some(sma_20)) = (set.last_close, set.sma_20) {
            let above_20 = close > sma_20;
            let above_50 = set.sma_50.map(|s| close > s);
            let pts = match (above_20, above_50) {
                (true, Some(true)) => 3.0,
                (true, _) => 2.0,
                (false, Some(true)) => 1.0,
                _ => 0.0,
            };
            details.insert("trend".to_string(), pts);
        }

        if let Some(macd) = set.macd {
            let pts = if macd.bullish_cross {
                2.0
            } else if macd.histogram > 0.0 {
                1.0
            } else {
                0.0
            };
            details.insert("macd_momentum".to_string(), pts);
        }

        if let Some(bb) = set.bollinger {
            let pts = if bb.bandwidth >= 0.08 { 1.0 } else { 0.0 };
            details.insert("bollinger_bandwidth".to_string(), pts);
        }

        let points = details.values().sum::<f64>().clamp(0.0, self.cap);
        TechnicalScore { points, details }
    }
}

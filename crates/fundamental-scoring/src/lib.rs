//! Maps a `FundamentalSnapshot` to a bounded 0-40 point contribution.
//!
//! Each metric runs through a small monotonic threshold table; the per-metric
//! maxima sum to exactly 40, so a snapshot at the best tier of every metric
//! scores the full allotment. Missing metrics contribute zero points and are
//! left out of the details map — partial data is normal, never an error.

use std::collections::BTreeMap;

use screener_core::FundamentalSnapshot;
use serde::{Deserialize, Serialize};

/// Result of normalizing one fundamental snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundamentalScore {
    pub points: f64,
    /// Metric name -> points awarded (only metrics that were present)
    pub details: BTreeMap<String, f64>,
}

pub struct FundamentalScorer {
    cap: f64,
}

impl FundamentalScorer {
    pub fn new(cap: f64) -> Self {
        Self { cap }
    }

    // Larger companies have deeper, tighter option markets. Max 4.
    fn market_cap_points(value: f64) -> f64 {
        if value >= 10e9 {
            4.0
        } else if value >= 2e9 {
            3.0
        } else if value >= 300e6 {
            2.0
        } else if value > 0.0 {
            1.0
        } else {
            0.0
        }
    }

    // Cheap earnings reduce assignment regret. Max 6; non-positive P/E
    // (loss-making) earns nothing.
    fn pe_ratio_points(value: f64) -> f64 {
        if value <= 0.0 {
            0.0
        } else if value <= 15.0 {
            6.0
        } else if value <= 25.0 {
            4.0
        } else if value <= 35.0 {
            2.0
        } else {
            0.0
        }
    }

    // Max 6
    fn roe_points(value: f64) -> f64 {
        if value >= 20.0 {
            6.0
        } else if value >= 15.0 {
            4.0
        } else if value >= 10.0 {
            2.0
        } else {
            0.0
        }
    }

    // Max 5; negative equity (negative ratio) earns nothing
    fn debt_to_equity_points(value: f64) -> f64 {
        if value < 0.0 {
            0.0
        } else if value < 0.3 {
            5.0
        } else if value < 0.5 {
            4.0
        } else if value < 1.0 {
            2.0
        } else if value < 2.0 {
            1.0
        } else {
            0.0
        }
    }

    // Max 4
    fn current_ratio_points(value: f64) -> f64 {
        if value >= 2.0 {
            4.0
        } else if value >= 1.5 {
            3.0
        } else if value >= 1.0 {
            1.0
        } else {
            0.0
        }
    }

    // Max 5
    fn profit_margin_points(value: f64) -> f64 {
        if value >= 20.0 {
            5.0
        } else if value >= 10.0 {
            3.0
        } else if value >= 5.0 {
            1.0
        } else {
            0.0
        }
    }

    // Max 5
    fn revenue_growth_points(value: f64) -> f64 {
        if value >= 15.0 {
            5.0
        } else if value >= 8.0 {
            3.0
        } else if value >= 3.0 {
            1.0
        } else {
            0.0
        }
    }

    // Dividends stack income on top of call premium. Max 3.
    fn dividend_yield_points(value: f64) -> f64 {
        if value >= 3.0 {
            3.0
        } else if value >= 1.5 {
            2.0
        } else if value > 0.0 {
            1.0
        } else {
            0.0
        }
    }

    // A beta near the market keeps assignment risk predictable. Max 2.
    fn beta_points(value: f64) -> f64 {
        if (0.5..=1.2).contains(&value) {
            2.0
        } else if value > 0.0 && value <= 1.5 {
            1.0
        } else {
            0.0
        }
    }

    /// Score one snapshot. Never fails on partial data; the final value is
    /// clamped to [0, cap].
    pub fn score(&self, snapshot: &FundamentalSnapshot) -> FundamentalScore {
        let mut details = BTreeMap::new();

        if let Some(v) = snapshot.market_cap {
            details.insert("market_cap".to_string(), Self::market_cap_points(v));
        }
        if let Some(v) = snapshot.pe_ratio {
            details.insert("pe_ratio".to_string(), Self::pe_ratio_points(v));
        }
        if let Some(v) = snapshot.roe_pct {
            details.insert("roe".to_string(), Self::roe_points(v));
        }
        if let Some(v) = snapshot.debt_to_equity {
            details.insert("debt_to_equity".to_string(), Self::debt_to_equity_points(v));
        }
        if let Some(v) = snapshot.current_ratio {
            details.insert("current_ratio".to_string(), Self::current_ratio_points(v));
        }
        if let Some(v) = snapshot.profit_margin_pct {
            details.insert("profit_margin".to_string(), Self::profit_margin_points(v));
        }
        if let Some(v) = snapshot.revenue_growth_pct {
            details.insert("revenue_growth".to_string(), Self::revenue_growth_points(v));
        }
        if let Some(v) = snapshot.dividend_yield_pct {
            details.insert("dividend_yield".to_string(), Self::dividend_yield_points(v));
        }
        if let Some(v) = snapshot.beta {
            details.insert("beta".to_string(), Self::beta_points(v));
        }

        let points = details.values().sum::<f64>().clamp(0.0, self.cap);
        FundamentalScore { points, details }
    }
}

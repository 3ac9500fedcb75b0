//! Per-symbol evaluation and ranking of covered-call candidates.
//!
//! The `Evaluator` turns one `SymbolBundle` into one `Recommendation` by
//! running the three scoring components and composing a `ScoreBreakdown`.
//! `rank` orders finished recommendations; the batch screener in
//! [`screener`] fans evaluation out across a universe of symbols.

pub mod report;
pub mod screener;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::Utc;
use fundamental_scoring::FundamentalScorer;
use options_scanner::{OptionsScanner, ScanOutcome};
use screener_core::{
    Recommendation, ScoreBreakdown, ScoringConfig, ScreenerError, SymbolBundle,
};
use technical_indicators::calculator::IndicatorCalculator;

pub use screener::{Screener, ScreenerFilters, ScreenerResult, StockUniverse};

pub struct Evaluator {
    config: ScoringConfig,
    indicators: IndicatorCalculator,
    fundamentals: FundamentalScorer,
    options: OptionsScanner,
}

impl Evaluator {
    pub fn new(config: ScoringConfig) -> Self {
        let indicators = IndicatorCalculator::new(config.technical_cap);
        let fundamentals = FundamentalScorer::new(config.fundamental_cap);
        let options = OptionsScanner::new(&config);
        Self {
            config,
            indicators,
            fundamentals,
            options,
        }
    }

    /// Evaluate one symbol. Pure with respect to the bundle: the same input
    /// always produces the same breakdown (only `evaluated_at` differs).
    ///
    /// Structurally bad input is the caller's bug and comes back as
    /// `InvalidInput`; merely sparse data (short history, missing metrics,
    /// empty chain) scores low instead of failing.
    pub fn evaluate(&self, bundle: &SymbolBundle) -> Result<Recommendation, ScreenerError> {
        validate(bundle)?;

        let set = self.indicators.compute(&bundle.series);
        let technical = self.indicators.score(&set);
        let fundamental = self.fundamentals.score(&bundle.fundamentals);
        let scan = self.options.scan(
            &bundle.chain,
            bundle.current_price,
            bundle.as_of,
            set.volatility_pct,
        );

        let breakdown = self.compose(&fundamental.details, &technical.details, &scan);

        tracing::debug!(
            symbol = %bundle.symbol,
            total = breakdown.total,
            fundamental = breakdown.fundamental_points,
            technical = breakdown.technical_points,
            options = breakdown.options_points,
            "evaluated symbol"
        );

        Ok(Recommendation {
            symbol: bundle.symbol.clone(),
            current_price: bundle.current_price,
            as_of: bundle.as_of,
            evaluated_at: Utc::now(),
            breakdown,
            best_opportunity: scan.best,
        })
    }

    fn compose(
        &self,
        fundamental_details: &BTreeMap<String, f64>,
        technical_details: &BTreeMap<String, f64>,
        scan: &ScanOutcome,
    ) -> ScoreBreakdown {
        let fundamental_points = fundamental_details
            .values()
            .sum::<f64>()
            .clamp(0.0, self.config.fundamental_cap);
        let technical_points = technical_details
            .values()
            .sum::<f64>()
            .clamp(0.0, self.config.technical_cap);
        let options_points = scan.points.clamp(0.0, self.config.options_cap);

        let mut component_details = BTreeMap::new();
        for (name, points) in fundamental_details {
            component_details.insert(format!("fundamental.{name}"), *points);
        }
        for (name, points) in technical_details {
            component_details.insert(format!("technical.{name}"), *points);
        }
        for (name, points) in &scan.details {
            component_details.insert(format!("options.{name}"), *points);
        }

        let total = (fundamental_points + technical_points + options_points)
            .clamp(0.0, self.config.total_cap);

        ScoreBreakdown {
            fundamental_points,
            technical_points,
            options_points,
            total,
            component_details,
        }
    }
}

fn validate(bundle: &SymbolBundle) -> Result<(), ScreenerError> {
    if bundle.symbol.trim().is_empty() {
        return Err(ScreenerError::InvalidInput("empty symbol".to_string()));
    }
    if !bundle.current_price.is_finite() || bundle.current_price <= 0.0 {
        return Err(ScreenerError::InvalidInput(format!(
            "{}: current price must be positive and finite",
            bundle.symbol
        )));
    }
    if bundle.series.is_empty() {
        return Err(ScreenerError::InvalidInput(format!(
            "{}: empty price series",
            bundle.symbol
        )));
    }
    if bundle.series.iter().any(|s| !s.close.is_finite()) {
        return Err(ScreenerError::InvalidInput(format!(
            "{}: non-finite close in price series",
            bundle.symbol
        )));
    }
    if !bundle.series.windows(2).all(|w| w[0].date < w[1].date) {
        return Err(ScreenerError::InvalidInput(format!(
            "{}: price series is not in chronological order",
            bundle.symbol
        )));
    }
    if bundle.chain.symbol != bundle.symbol {
        return Err(ScreenerError::InvalidInput(format!(
            "{}: option chain belongs to {}",
            bundle.symbol, bundle.chain.symbol
        )));
    }
    Ok(())
}

/// Order recommendations for presentation and keep the top `top_n`.
///
/// Total score descending, options points descending, then symbol ascending.
/// The symbol tiebreak makes the ordering total, so repeated runs over the
/// same inputs produce the same list. Inputs are not mutated.
pub fn rank(recommendations: &[Recommendation], top_n: usize) -> Vec<Recommendation> {
    let mut ranked = recommendations.to_vec();
    ranked.sort_by(|a, b| {
        b.breakdown
            .total
            .partial_cmp(&a.breakdown.total)
            .unwrap_or(Ordering::Equal)
            .then(
                b.breakdown
                    .options_points
                    .partial_cmp(&a.breakdown.options_points)
                    .unwrap_or(Ordering::Equal),
            )
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    ranked.truncate(top_n);
    ranked
}

use std::sync::Arc;

use screener_core::MarketDataProvider;
use screener_core::Recommendation;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::{rank, Evaluator};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerResult {
    pub recommendations: Vec<Recommendation>,
    pub total_screened: usize,
    pub total_scored: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub enum StockUniverse {
    Custom(Vec<String>),
    LiquidLargeCaps,
    IncomeBlueChips,
}

impl StockUniverse {
    pub fn get_symbols(&self) -> Vec<String> {
        match self {
            StockUniverse::Custom(symbols) => symbols.clone(),
            // Deep, tight option chains; the usual covered-call hunting ground
            StockUniverse::LiquidLargeCaps => vec![
                "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "TSLA", "META", "AMD", "NFLX", "ADBE",
                "CRM", "CSCO", "INTC", "QCOM", "ORCL", "V", "JPM", "MA", "COST", "WMT",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            // Dividend payers that stack yield on top of call premium
            StockUniverse::IncomeBlueChips => vec![
                "JNJ", "PG", "KO", "PEP", "MCD", "CVX", "XOM", "VZ", "T", "MRK", "ABBV", "HD",
                "IBM", "MMM", "O", "SO",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScreenerFilters {
    /// Drop recommendations below this composite total
    pub min_total: f64,
    pub limit: usize,
}

impl Default for ScreenerFilters {
    fn default() -> Self {
        Self {
            min_total: 0.0,
            limit: 10,
        }
    }
}

/// Fans per-symbol evaluation out over a universe. Each symbol is fetched
/// and evaluated independently; a failure affects that symbol only.
pub struct Screener {
    evaluator: Arc<Evaluator>,
    provider: Arc<dyn MarketDataProvider>,
}

impl Screener {
    pub fn new(evaluator: Arc<Evaluator>, provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { evaluator, provider }
    }

    pub async fn screen(
        &self,
        universe: StockUniverse,
        filters: ScreenerFilters,
    ) -> Result<ScreenerResult, anyhow::Error> {
        let symbols = universe.get_symbols();
        let total_screened = symbols.len();

        tracing::info!("Screening {} symbols for covered calls", total_screened);

        let mut tasks = JoinSet::new();
        for symbol in symbols {
            let evaluator = Arc::clone(&self.evaluator);
            let provider = Arc::clone(&self.provider);
            tasks.spawn(async move {
                let result = match provider.fetch_bundle(&symbol).await {
                    Ok(bundle) => evaluator.evaluate(&bundle),
                    Err(e) => Err(e),
                };
                (symbol, result)
            });
        }

        let mut recommendations = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_symbol, Ok(rec))) => {
                    if rec.breakdown.total >= filters.min_total {
                        recommendations.push(rec);
                    }
                }
                Ok((symbol, Err(e))) => {
                    tracing::warn!("Skipping {}: {}", symbol, e);
                }
                Err(e) => {
                    tracing::error!("Evaluation task panicked: {}", e);
                }
            }
        }

        let total_scored = recommendations.len();
        let recommendations = rank(&recommendations, filters.limit);

        tracing::info!(
            "Screen complete: {}/{} symbols scored, returning top {}",
            total_scored,
            total_screened,
            recommendations.len()
        );

        Ok(ScreenerResult {
            recommendations,
            total_screened,
            total_scored,
            timestamp: chrono::Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::{Days, NaiveDate};
    use screener_core::{
        FundamentalSnapshot, OptionChain, OptionContract, ScoringConfig, ScreenerError, Session,
        SymbolBundle,
    };

    struct StaticProvider {
        bundles: HashMap<String, SymbolBundle>,
    }

    #[async_trait]
    impl MarketDataProvider for StaticProvider {
        async fn fetch_bundle(&self, symbol: &str) -> Result<SymbolBundle, ScreenerError> {
            self.bundles
                .get(symbol)
                .cloned()
                .ok_or_else(|| ScreenerError::ProviderError(format!("no data for {symbol}")))
        }
    }

    fn series(len: usize) -> Vec<Session> {
        (0..len)
            .map(|i| {
                let close = 100.0 + i as f64 * 0.2 + if i % 2 == 0 { 0.6 } else { -0.6 };
                Session {
                    date: NaiveDate::from_ymd_opt(2025, 3, 3)
                        .unwrap()
                        .checked_add_days(Days::new(i as u64))
                        .unwrap(),
                    open: close - 0.3,
                    high: close + 0.8,
                    low: close - 0.8,
                    close,
                    volume: 500_000.0,
                }
            })
            .collect()
    }

    fn bundle(symbol: &str, with_fundamentals: bool, with_chain: bool) -> SymbolBundle {
        let series = series(60);
        let as_of = series.last().unwrap().date;
        let current_price = series.last().unwrap().close;

        let fundamentals = if with_fundamentals {
            FundamentalSnapshot {
                market_cap: Some(50e9),
                pe_ratio: Some(12.0),
                roe_pct: Some(25.0),
                debt_to_equity: Some(0.2),
                current_ratio: Some(2.5),
                profit_margin_pct: Some(22.0),
                revenue_growth_pct: Some(18.0),
                dividend_yield_pct: Some(3.5),
                beta: Some(1.0),
            }
        } else {
            FundamentalSnapshot::default()
        };

        let contracts = if with_chain {
            vec![OptionContract {
                strike: current_price + 5.0,
                expiration: as_of.checked_add_days(Days::new(10)).unwrap(),
                bid: Some(2.40),
                ask: Some(2.60),
                implied_volatility: Some(0.30),
            }]
        } else {
            Vec::new()
        };

        SymbolBundle {
            symbol: symbol.to_string(),
            current_price,
            as_of,
            series,
            fundamentals,
            chain: OptionChain {
                symbol: symbol.to_string(),
                contracts,
            },
        }
    }

    fn screener(bundles: HashMap<String, SymbolBundle>) -> Screener {
        Screener::new(
            Arc::new(Evaluator::new(ScoringConfig::default())),
            Arc::new(StaticProvider { bundles }),
        )
    }

    #[tokio::test]
    async fn screen_ranks_rich_symbols_above_sparse_ones() {
        let mut bundles = HashMap::new();
        bundles.insert("RICH".to_string(), bundle("RICH", true, true));
        bundles.insert("BARE".to_string(), bundle("BARE", false, false));

        let result = screener(bundles)
            .screen(
                StockUniverse::Custom(vec!["RICH".to_string(), "BARE".to_string()]),
                ScreenerFilters::default(),
            )
            .await
            .unwrap();

        assert_eq!(result.total_screened, 2);
        assert_eq!(result.total_scored, 2);
        assert_eq!(result.recommendations[0].symbol, "RICH");
        assert!(
            result.recommendations[0].breakdown.total
                > result.recommendations[1].breakdown.total
        );
    }

    #[tokio::test]
    async fn failed_symbols_are_skipped_not_fatal() {
        let mut bundles = HashMap::new();
        bundles.insert("GOOD".to_string(), bundle("GOOD", true, true));

        let mut broken = bundle("BROKEN", false, false);
        broken.current_price = -1.0;
        bundles.insert("BROKEN".to_string(), broken);

        let result = screener(bundles)
            .screen(
                StockUniverse::Custom(vec![
                    "GOOD".to_string(),
                    "BROKEN".to_string(),
                    "MISSING".to_string(),
                ]),
                ScreenerFilters::default(),
            )
            .await
            .unwrap();

        assert_eq!(result.total_screened, 3);
        assert_eq!(result.total_scored, 1);
        assert_eq!(result.recommendations[0].symbol, "GOOD");
    }

    #[tokio::test]
    async fn min_total_filter_drops_weak_candidates() {
        let mut bundles = HashMap::new();
        bundles.insert("RICH".to_string(), bundle("RICH", true, true));
        bundles.insert("BARE".to_string(), bundle("BARE", false, false));

        let result = screener(bundles)
            .screen(
                StockUniverse::Custom(vec!["RICH".to_string(), "BARE".to_string()]),
                ScreenerFilters {
                    min_total: 20.0,
                    limit: 10,
                },
            )
            .await
            .unwrap();

        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.recommendations[0].symbol, "RICH");
    }

    #[tokio::test]
    async fn limit_truncates_the_ranked_list() {
        let mut bundles = HashMap::new();
        for symbol in ["A", "B", "C"] {
            bundles.insert(symbol.to_string(), bundle(symbol, true, true));
        }

        let result = screener(bundles)
            .screen(
                StockUniverse::Custom(vec![
                    "A".to_string(),
                    "B".to_string(),
                    "C".to_string(),
                ]),
                ScreenerFilters {
                    min_total: 0.0,
                    limit: 2,
                },
            )
            .await
            .unwrap();

        assert_eq!(result.total_scored, 3);
        assert_eq!(result.recommendations.len(), 2);
    }

    #[tokio::test]
    async fn result_serializes_for_downstream_consumers() {
        let mut bundles = HashMap::new();
        bundles.insert("RICH".to_string(), bundle("RICH", true, true));

        let result = screener(bundles)
            .screen(
                StockUniverse::Custom(vec!["RICH".to_string()]),
                ScreenerFilters::default(),
            )
            .await
            .unwrap();

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["recommendations"][0]["symbol"], "RICH");
        assert!(json["recommendations"][0]["breakdown"]["total"].is_number());
    }
}

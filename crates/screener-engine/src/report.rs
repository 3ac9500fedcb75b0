//! Tabular handoff for downstream report writers (spreadsheets, CSV, CLIs).
//!
//! Column names and order are a stable contract; renames or reorders break
//! consumers.

use screener_core::Recommendation;

pub const COLUMNS: [&str; 10] = [
    "symbol",
    "currentPrice",
    "total",
    "fundamentalPoints",
    "technicalPoints",
    "optionsPoints",
    "bestStrike",
    "bestExpiration",
    "bestPremium",
    "bestAnnualizedReturn",
];

pub fn header() -> Vec<String> {
    COLUMNS.iter().map(|c| c.to_string()).collect()
}

/// One row per recommendation, aligned with [`COLUMNS`]. The four best-
/// opportunity cells are empty strings when no tradable call existed.
pub fn row(rec: &Recommendation) -> [String; 10] {
    let (strike, expiration, premium, annualized) = match &rec.best_opportunity {
        Some(best) => (
            format!("{:.2}", best.strike),
            best.expiration.to_string(),
            format!("{:.2}", best.premium),
            format!("{:.1}%", best.annualized_return * 100.0),
        ),
        None => (String::new(), String::new(), String::new(), String::new()),
    };

    [
        rec.symbol.clone(),
        format!("{:.2}", rec.current_price),
        format!("{:.1}", rec.breakdown.total),
        format!("{:.1}", rec.breakdown.fundamental_points),
        format!("{:.1}", rec.breakdown.technical_points),
        format!("{:.1}", rec.breakdown.options_points),
        strike,
        expiration,
        premium,
        annualized,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::{NaiveDate, Utc};
    use screener_core::{CallOpportunity, ScoreBreakdown};

    fn recommendation(best: Option<CallOpportunity>) -> Recommendation {
        Recommendation {
            symbol: "AAPL".to_string(),
            current_price: 211.27,
            as_of: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            evaluated_at: Utc::now(),
            breakdown: ScoreBreakdown {
                fundamental_points: 33.0,
                technical_points: 9.0,
                options_points: 15.0,
                total: 57.0,
                component_details: BTreeMap::new(),
            },
            best_opportunity: best,
        }
    }

    #[test]
    fn header_matches_the_column_contract() {
        assert_eq!(header()[0], "symbol");
        assert_eq!(header()[9], "bestAnnualizedReturn");
        assert_eq!(header().len(), COLUMNS.len());
    }

    #[test]
    fn row_formats_a_full_recommendation() {
        let best = CallOpportunity {
            strike: 215.0,
            expiration: NaiveDate::from_ymd_opt(2025, 6, 7).unwrap(),
            premium: 2.45,
            annualized_return: 0.8465,
            days_to_expiry: 5,
            probability_itm: Some(34.0),
            delta: Some(0.41),
            theta: Some(-0.41),
        };

        let row = row(&recommendation(Some(best)));
        assert_eq!(row[0], "AAPL");
        assert_eq!(row[1], "211.27");
        assert_eq!(row[2], "57.0");
        assert_eq!(row[3], "33.0");
        assert_eq!(row[4], "9.0");
        assert_eq!(row[5], "15.0");
        assert_eq!(row[6], "215.00");
        assert_eq!(row[7], "2025-06-07");
        assert_eq!(row[8], "2.45");
        assert_eq!(row[9], "84.7%");
    }

    #[test]
    fn row_leaves_opportunity_cells_empty_when_none_exists() {
        let row = row(&recommendation(None));
        assert_eq!(row[0], "AAPL");
        for cell in &row[6..] {
            assert!(cell.is_empty());
        }
    }
}

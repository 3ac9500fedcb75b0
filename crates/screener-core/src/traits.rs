use async_trait::async_trait;

use crate::{ScreenerError, SymbolBundle};

/// Seam to the external market-data collaborator.
///
/// Network access, caching, retries and rate limiting all live behind this
/// trait. A failed fetch surfaces as `ScreenerError::ProviderError` for that
/// symbol only; the batch screener skips it and keeps going.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_bundle(&self, symbol: &str) -> Result<SymbolBundle, ScreenerError>;
}

use crate::domain::currency::{ConversionTable, RatesPayload};
use crate::domain::ports::RateSource;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;

/// Decodes a `{"rates": {...}}` document into a conversion table.
pub fn parse_rates(body: &[u8]) -> Result<ConversionTable> {
    let payload: RatesPayload = serde_json::from_slice(body)
        .map_err(|e| LedgerError::RateSource(format!("could not decode rates: {e}")))?;
    Ok(payload.into())
}

/// Fetches the conversion table from an HTTP endpoint.
#[derive(Clone)]
pub struct HttpRateSource {
    client: Client,
    url: String,
}

impl HttpRateSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch(&self) -> Result<ConversionTable> {
        tracing::debug!(url = %self.url, "fetching conversion table");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| LedgerError::RateSource(e.to_string()))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| LedgerError::RateSource(e.to_string()))?;
        parse_rates(&body)
    }
}

/// Reads the conversion table from a local JSON file.
#[derive(Debug, Clone)]
pub struct FileRateSource {
    path: PathBuf,
}

impl FileRateSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RateSource for FileRateSource {
    async fn fetch(&self) -> Result<ConversionTable> {
        let body = tokio::fs::read(&self.path).await.map_err(|e| {
            LedgerError::RateSource(format!("could not read {}: {e}", self.path.display()))
        })?;
        parse_rates(&body)
    }
}

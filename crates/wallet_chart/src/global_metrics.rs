//! Global market metrics fetcher -- total market cap, volume, DeFi cap and
//! TVL charts from the market data REST API.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use wallet_core::WalletConfig;

use crate::error::FetchError;
use crate::fetcher::ChartDataFetcher;
use crate::model::{ChartPoint, ChartType};

const SUPPORTED_CHART_TYPES: [ChartType; 3] =
    [ChartType::Daily, ChartType::Weekly, ChartType::Monthly];

// ---------------------------------------------------------------------------
// MetricKind
// ---------------------------------------------------------------------------

/// Which global market series a fetcher serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    TotalMarketCap,
    Volume24h,
    DefiCap,
    TvlInDefi,
}

impl MetricKind {
    pub fn title(&self) -> &'static str {
        match self {
            MetricKind::TotalMarketCap => "Total Market Cap",
            MetricKind::Volume24h => "24h Volume",
            MetricKind::DefiCap => "DeFi Cap",
            MetricKind::TvlInDefi => "TVL in DeFi",
        }
    }

    /// Parse the short name used on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "market-cap" => Some(MetricKind::TotalMarketCap),
            "volume" => Some(MetricKind::Volume24h),
            "defi-cap" => Some(MetricKind::DefiCap),
            "tvl" => Some(MetricKind::TvlInDefi),
            _ => None,
        }
    }

    /// The column of a market row this metric reads.
    fn value_of(&self, row: &GlobalMarketRow) -> Option<f64> {
        match self {
            MetricKind::TotalMarketCap => row.market_cap,
            MetricKind::Volume24h => row.volume,
            MetricKind::DefiCap => row.defi_market_cap,
            MetricKind::TvlInDefi => row.tvl,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ---------------------------------------------------------------------------
// API types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GlobalMarketRow {
    timestamp: i64,
    market_cap: Option<f64>,
    defi_market_cap: Option<f64>,
    volume: Option<f64>,
    btc_dominance: Option<f64>,
    tvl: Option<f64>,
}

/// Turn API rows into chart points for `metric`, oldest first. Rows without
/// a value for the metric are skipped.
fn points_from_rows(metric: MetricKind, rows: Vec<GlobalMarketRow>) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = rows
        .into_iter()
        .filter_map(|row| {
            let value = metric.value_of(&row)?;
            let mut point = ChartPoint::new(value, row.timestamp);
            if metric == MetricKind::TotalMarketCap {
                point.dominance = row.btc_dominance;
            }
            Some(point)
        })
        .collect();
    points.sort_by_key(|p| p.timestamp);
    points
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Fetches one global market metric over HTTP.
pub struct GlobalMetricsFetcher {
    metric: MetricKind,
    base_url: String,
    client: reqwest::Client,
}

impl GlobalMetricsFetcher {
    /// Create a fetcher against `base_url` with the given request timeout.
    pub fn new(
        metric: MetricKind,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Other(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            metric,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a fetcher from the API URL and timeout in `config`.
    pub fn from_config(metric: MetricKind, config: &WalletConfig) -> Result<Self, FetchError> {
        Self::new(metric, config.market_api_url.clone(), config.request_timeout())
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/global-markets", self.base_url)
    }
}

#[async_trait]
impl ChartDataFetcher for GlobalMetricsFetcher {
    async fn fetch(
        &self,
        currency_code: &str,
        chart_type: ChartType,
    ) -> Result<Vec<ChartPoint>, FetchError> {
        if !SUPPORTED_CHART_TYPES.contains(&chart_type) {
            return Err(FetchError::UnsupportedChartType(chart_type));
        }

        let url = self.endpoint();
        let currency = currency_code.to_ascii_lowercase();
        debug!(metric = %self.metric, %url, %currency, interval = chart_type.api_key(), "Requesting global markets");

        let resp = self
            .client
            .get(&url)
            .query(&[("currency", currency.as_str()), ("interval", chart_type.api_key())])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!(metric = %self.metric, %status, "Global markets request failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let rows: Vec<GlobalMarketRow> = serde_json::from_str(&body)
            .map_err(|e| FetchError::Decode(format!("JSON parse error: {e}")))?;

        Ok(points_from_rows(self.metric, rows))
    }

    fn chart_types(&self) -> Vec<ChartType> {
        SUPPORTED_CHART_TYPES.to_vec()
    }

    fn title(&self) -> String {
        self.metric.title().to_string()
    }
}

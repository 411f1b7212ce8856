use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

const DAY_SECS: u64 = 24 * 60 * 60;

// ---------------------------------------------------------------------------
// ChartType
// ---------------------------------------------------------------------------

/// Time range / resolution of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Today,
    Daily,
    Weekly,
    Weekly2,
    Monthly,
    Monthly3,
    Monthly6,
    Monthly12,
    Monthly24,
}

impl ChartType {
    pub const ALL: [ChartType; 9] = [
        ChartType::Today,
        ChartType::Daily,
        ChartType::Weekly,
        ChartType::Weekly2,
        ChartType::Monthly,
        ChartType::Monthly3,
        ChartType::Monthly6,
        ChartType::Monthly12,
        ChartType::Monthly24,
    ];

    /// Identifier used in API query strings and on the command line.
    pub fn api_key(&self) -> &'static str {
        match self {
            ChartType::Today => "today",
            ChartType::Daily => "1d",
            ChartType::Weekly => "1w",
            ChartType::Weekly2 => "2w",
            ChartType::Monthly => "1m",
            ChartType::Monthly3 => "3m",
            ChartType::Monthly6 => "6m",
            ChartType::Monthly12 => "1y",
            ChartType::Monthly24 => "2y",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ChartType::Today => "Today",
            ChartType::Daily => "24H",
            ChartType::Weekly => "1W",
            ChartType::Weekly2 => "2W",
            ChartType::Monthly => "1M",
            ChartType::Monthly3 => "3M",
            ChartType::Monthly6 => "6M",
            ChartType::Monthly12 => "1Y",
            ChartType::Monthly24 => "2Y",
        }
    }

    /// How far back the chart reaches. `Today` is reported as a full day.
    pub fn range(&self) -> Duration {
        let days = match self {
            ChartType::Today | ChartType::Daily => 1,
            ChartType::Weekly => 7,
            ChartType::Weekly2 => 14,
            ChartType::Monthly => 30,
            ChartType::Monthly3 => 90,
            ChartType::Monthly6 => 180,
            ChartType::Monthly12 => 365,
            ChartType::Monthly24 => 730,
        };
        Duration::from_secs(days * DAY_SECS)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartType::ALL
            .into_iter()
            .find(|t| t.api_key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown chart type: {s}"))
    }
}

// ---------------------------------------------------------------------------
// ChartPoint
// ---------------------------------------------------------------------------

/// One point of a metric chart. The loading service never looks inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub value: f64,
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    /// BTC dominance in percent, when the metric carries it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominance: Option<f64>,
}

impl ChartPoint {
    pub fn new(value: f64, timestamp: i64) -> Self {
        Self {
            value,
            timestamp,
            dominance: None,
        }
    }

    pub fn with_dominance(mut self, dominance: f64) -> Self {
        self.dominance = Some(dominance);
        self
    }
}

// ---------------------------------------------------------------------------
// LoadState
// ---------------------------------------------------------------------------

/// Progress of an asynchronous load. Each new state replaces the previous one.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T, E> {
    Loading,
    Success(T),
    Error(E),
}

impl<T, E> LoadState<T, E> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            LoadState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            LoadState::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl<T, E> Default for LoadState<T, E> {
    fn default() -> Self {
        LoadState::Loading
    }
}

/// State published by [`crate::ChartLoadingService`]: the chart type that was
/// requested together with the points the fetcher returned for it.
pub type ChartState = LoadState<(ChartType, Vec<ChartPoint>), FetchError>;

impl fmt::Display for ChartState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Loading => f.write_str("loading"),
            LoadState::Success((chart_type, points)) => {
                write!(f, "{chart_type}: {} points", points.len())
            }
            LoadState::Error(e) => write!(f, "error: {e}"),
        }
    }
}

//! In-memory fetcher with scripted responses per chart type.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::FetchError;
use crate::fetcher::ChartDataFetcher;
use crate::model::{ChartPoint, ChartType};

#[derive(Debug, Clone)]
struct Script {
    response: Result<Vec<ChartPoint>, FetchError>,
    delay: Duration,
}

/// A [`ChartDataFetcher`] that answers from a fixed table.
///
/// Chart types without an entry fail with
/// [`FetchError::UnsupportedChartType`]. Every call is recorded so callers can
/// check what was requested.
pub struct StaticChartFetcher {
    title: String,
    scripts: HashMap<ChartType, Script>,
    calls: Mutex<Vec<(String, ChartType)>>,
}

impl StaticChartFetcher {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            scripts: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer `chart_type` with `points` immediately.
    pub fn with_points(self, chart_type: ChartType, points: Vec<ChartPoint>) -> Self {
        self.with_response(chart_type, Ok(points), Duration::ZERO)
    }

    /// Answer `chart_type` with `error` immediately.
    pub fn with_error(self, chart_type: ChartType, error: FetchError) -> Self {
        self.with_response(chart_type, Err(error), Duration::ZERO)
    }

    /// Answer `chart_type` with `response` after `delay`.
    pub fn with_response(
        mut self,
        chart_type: ChartType,
        response: Result<Vec<ChartPoint>, FetchError>,
        delay: Duration,
    ) -> Self {
        self.scripts.insert(chart_type, Script { response, delay });
        self
    }

    /// A synthetic series for each of `chart_types`, one point per step across
    /// the chart's range, ending at `now` (unix seconds).
    pub fn synthetic(title: impl Into<String>, chart_types: &[ChartType], now: i64) -> Self {
        const STEPS: i64 = 24;
        let mut fetcher = Self::new(title);
        for &chart_type in chart_types {
            let range = chart_type.range().as_secs() as i64;
            let step = range / STEPS;
            let points = (0..=STEPS)
                .map(|i| {
                    let value = 1_000.0 + 50.0 * ((i as f64) * 0.5).sin() + i as f64;
                    ChartPoint::new(value, now - range + i * step)
                })
                .collect();
            fetcher = fetcher.with_points(chart_type, points);
        }
        fetcher
    }

    /// Every `(currency_code, chart_type)` pair requested so far.
    pub fn calls(&self) -> Vec<(String, ChartType)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ChartDataFetcher for StaticChartFetcher {
    async fn fetch(
        &self,
        currency_code: &str,
        chart_type: ChartType,
    ) -> Result<Vec<ChartPoint>, FetchError> {
        self.calls.lock().push((currency_code.to_string(), chart_type));

        let script = self
            .scripts
            .get(&chart_type)
            .cloned()
            .ok_or(FetchError::UnsupportedChartType(chart_type))?;

        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        script.response
    }

    fn chart_types(&self) -> Vec<ChartType> {
        ChartType::ALL
            .into_iter()
            .filter(|t| self.scripts.contains_key(t))
            .collect()
    }

    fn title(&self) -> String {
        self.title.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_scripted_points() {
        let fetcher = StaticChartFetcher::new("Test")
            .with_points(ChartType::Daily, vec![ChartPoint::new(1.0, 1)]);

        let points = fetcher.fetch("USD", ChartType::Daily).await.unwrap();
        assert_eq!(points, vec![ChartPoint::new(1.0, 1)]);
        assert_eq!(fetcher.calls(), vec![("USD".to_string(), ChartType::Daily)]);
    }

    #[tokio::test]
    async fn unscripted_type_is_unsupported() {
        let fetcher = StaticChartFetcher::new("Test");
        let err = fetcher.fetch("USD", ChartType::Monthly).await.unwrap_err();
        assert_eq!(err, FetchError::UnsupportedChartType(ChartType::Monthly));
    }

    #[test]
    fn chart_types_follow_declaration_order() {
        let fetcher = StaticChartFetcher::new("Test")
            .with_points(ChartType::Monthly, vec![])
            .with_error(ChartType::Daily, FetchError::Other("x".into()));
        assert_eq!(fetcher.chart_types(), vec![ChartType::Daily, ChartType::Monthly]);
        assert_eq!(fetcher.title(), "Test");
    }

    #[tokio::test]
    async fn synthetic_series_spans_chart_range() {
        let now = 1_700_000_000;
        let fetcher = StaticChartFetcher::synthetic("Synthetic", &[ChartType::Weekly], now);
        let points = fetcher.fetch("EUR", ChartType::Weekly).await.unwrap();

        assert_eq!(points.len(), 25);
        assert_eq!(points.last().unwrap().timestamp, now);
        assert_eq!(
            points.first().unwrap().timestamp,
            now - ChartType::Weekly.range().as_secs() as i64
        );
        assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }
}

use async_trait::async_trait;

use crate::error::FetchError;
use crate::model::{ChartPoint, ChartType};

/// Source of chart points for one metric.
///
/// A pending [`fetch`](ChartDataFetcher::fetch) is cancelled by dropping its
/// future, so implementations must not rely on running to completion. A panic
/// inside `fetch` is reported to observers as [`FetchError::Other`].
#[async_trait]
pub trait ChartDataFetcher: Send + Sync {
    /// Chart points for `currency_code` over the range of `chart_type`,
    /// ordered by timestamp.
    async fn fetch(
        &self,
        currency_code: &str,
        chart_type: ChartType,
    ) -> Result<Vec<ChartPoint>, FetchError>;

    /// Chart types this fetcher can serve.
    fn chart_types(&self) -> Vec<ChartType>;

    /// Display title of the metric.
    fn title(&self) -> String;
}

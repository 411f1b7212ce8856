//! Wallet chart loading — fetches metric chart points for one currency and
//! chart type and exposes the load state as a replaying broadcast stream.
//!
//! # Architecture
//!
//! - **Model**: [`ChartType`], [`ChartPoint`], [`LoadState`] and the opaque
//!   [`FetchError`] a fetcher reports.
//! - **Fetchers**: the [`ChartDataFetcher`] capability, an HTTP implementation
//!   for global market metrics and an in-memory one for offline use.
//! - **Subject**: [`StateSubject`], a latest-value broadcast primitive.
//! - **Service**: [`ChartLoadingService`], which owns the in-flight fetch and
//!   drops results that a newer request has superseded.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wallet_chart::{ChartLoadingService, ChartType, GlobalMetricsFetcher, MetricKind};
//! use wallet_core::WalletConfig;
//!
//! # async fn example() {
//! let config = WalletConfig::default();
//! let fetcher = GlobalMetricsFetcher::from_config(MetricKind::TotalMarketCap, &config).unwrap();
//! let service = ChartLoadingService::new(config.base_currency.clone(), Arc::new(fetcher)).unwrap();
//!
//! let mut states = service.subscribe();
//! service.update_chart_type(ChartType::Daily);
//! while let Some(state) = states.recv().await {
//!     if !state.is_loading() {
//!         break;
//!     }
//! }
//! service.clear();
//! # }
//! ```

pub mod error;
pub mod fetcher;
pub mod global_metrics;
pub mod model;
pub mod service;
pub mod static_fetcher;
pub mod subject;

// ── Re-exports for convenience ──────────────────────────────────────────

pub use error::{FetchError, ServiceError};
pub use fetcher::ChartDataFetcher;
pub use global_metrics::{GlobalMetricsFetcher, MetricKind};
pub use model::{ChartPoint, ChartState, ChartType, LoadState};
pub use service::ChartLoadingService;
pub use static_fetcher::StaticChartFetcher;
pub use subject::{StateReceiver, StateSubject};

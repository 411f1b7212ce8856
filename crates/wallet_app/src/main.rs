//! `metric-chart` -- load one global market metric chart and print the state
//! stream until the load settles.
//!
//! Usage: `metric-chart [market-cap|volume|defi-cap|tvl] [chart-type] [--currency CODE] [--offline]`

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{error, info};

use wallet_chart::{
    ChartDataFetcher, ChartLoadingService, ChartState, ChartType, GlobalMetricsFetcher, LoadState,
    MetricKind, StaticChartFetcher,
};
use wallet_core::{Currency, WalletConfig, logging};

#[derive(Debug, PartialEq)]
struct Args {
    metric: MetricKind,
    chart_type: ChartType,
    /// Overrides the configured base currency.
    currency: Option<Currency>,
    offline: bool,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut metric = MetricKind::TotalMarketCap;
        let mut chart_type = ChartType::Daily;
        let mut currency = None;
        let mut offline = false;
        let mut positional = 0;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "--offline" {
                offline = true;
                continue;
            }
            if arg == "--currency" {
                let code = args.next().context("--currency needs a currency code")?;
                currency = Some(
                    Currency::from_code(&code)
                        .with_context(|| format!("unknown currency: {code}"))?,
                );
                continue;
            }
            match positional {
                0 => {
                    metric = MetricKind::from_name(&arg)
                        .with_context(|| format!("unknown metric: {arg}"))?;
                }
                1 => {
                    chart_type = arg.parse().map_err(anyhow::Error::msg)?;
                }
                _ => anyhow::bail!("unexpected argument: {arg}"),
            }
            positional += 1;
        }

        Ok(Self {
            metric,
            chart_type,
            currency,
            offline,
        })
    }
}

fn format_timestamp(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn describe(state: &ChartState, currency: &str) -> String {
    match state {
        LoadState::Success((chart_type, points)) => match (points.first(), points.last()) {
            (Some(first), Some(last)) => format!(
                "{chart_type}: {} points, {} {currency} at {} -> {} {currency} at {}",
                points.len(),
                first.value,
                format_timestamp(first.timestamp),
                last.value,
                format_timestamp(last.timestamp),
            ),
            _ => format!("{chart_type}: no data"),
        },
        other => other.to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse(std::env::args().skip(1))?;

    let mut config = WalletConfig::load()?;
    if let Some(currency) = args.currency.clone() {
        config.base_currency = currency;
    }
    config.validate()?;
    let _log_guard = logging::init_logging(&config)?;

    let fetcher: Arc<dyn ChartDataFetcher> = if args.offline {
        Arc::new(StaticChartFetcher::synthetic(
            args.metric.title(),
            &ChartType::ALL,
            Utc::now().timestamp(),
        ))
    } else {
        Arc::new(GlobalMetricsFetcher::from_config(args.metric, &config)?)
    };

    let service = ChartLoadingService::new(config.base_currency.clone(), fetcher)?;
    info!(
        title = %service.title(),
        currency = %service.currency(),
        chart_type = %args.chart_type,
        offline = args.offline,
        "Loading metric chart"
    );

    let mut states = service.subscribe();
    service.update_chart_type(args.chart_type);

    let mut outcome = None;
    while let Some(state) = states.recv().await {
        println!("{}", describe(&state, &service.currency().code));
        if !state.is_loading() {
            outcome = Some(state);
            break;
        }
    }
    service.clear();

    match outcome {
        Some(LoadState::Error(e)) => {
            error!("Chart load failed: {e}");
            Err(e.into())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallet_chart::{ChartPoint, FetchError};

    fn args(list: &[&str]) -> Result<Args> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_to_daily_market_cap() {
        assert_eq!(
            args(&[]).unwrap(),
            Args {
                metric: MetricKind::TotalMarketCap,
                chart_type: ChartType::Daily,
                currency: None,
                offline: false,
            }
        );
    }

    #[test]
    fn parses_metric_chart_type_and_flag() {
        let parsed = args(&["tvl", "--offline", "1m"]).unwrap();
        assert_eq!(parsed.metric, MetricKind::TvlInDefi);
        assert_eq!(parsed.chart_type, ChartType::Monthly);
        assert!(parsed.offline);
    }

    #[test]
    fn currency_flag_selects_builtin_currency() {
        let parsed = args(&["volume", "--currency", "eur", "1w"]).unwrap();
        assert_eq!(parsed.currency, Some(Currency::eur()));
        assert_eq!(parsed.chart_type, ChartType::Weekly);

        assert!(args(&["--currency", "XYZ"]).is_err());
        assert!(args(&["--currency"]).is_err());
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(args(&["price"]).is_err());
        assert!(args(&["volume", "5d"]).is_err());
        assert!(args(&["volume", "1d", "extra"]).is_err());
    }

    #[test]
    fn describe_success_shows_range() {
        let state: ChartState = LoadState::Success((
            ChartType::Daily,
            vec![ChartPoint::new(1.0, 0), ChartPoint::new(2.0, 3600)],
        ));
        assert_eq!(
            describe(&state, "USD"),
            "24H: 2 points, 1 USD at 1970-01-01 00:00 -> 2 USD at 1970-01-01 01:00"
        );
    }

    #[test]
    fn describe_other_states() {
        let empty: ChartState = LoadState::Success((ChartType::Weekly, vec![]));
        assert_eq!(describe(&empty, "USD"), "1W: no data");
        assert_eq!(describe(&LoadState::Loading, "USD"), "loading");

        let failed: ChartState = LoadState::Error(FetchError::Other("boom".into()));
        assert_eq!(describe(&failed, "USD"), "error: Fetch error: boom");
    }
}

//! Drives `GlobalMetricsFetcher` against a one-shot HTTP server on localhost.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use wallet_chart::*;

/// Serve a single HTTP response and report the request line that was received.
async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let n = socket.read(&mut buf).await.unwrap();
        let request = String::from_utf8_lossy(&buf[..n]).to_string();
        let request_line = request.lines().next().unwrap_or_default().to_string();
        let _ = tx.send(request_line);

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });

    (format!("http://{addr}"), rx)
}

#[tokio::test]
async fn fetch_decodes_points_and_sends_query() {
    let body = r#"[
        {"timestamp": 2000, "market_cap": 2.5e12, "defi_market_cap": 9.0e10, "volume": 8.0e10, "btc_dominance": 52.1, "tvl": 4.0e10},
        {"timestamp": 1000, "market_cap": 2.4e12, "defi_market_cap": 8.5e10, "volume": 7.5e10, "btc_dominance": 51.9, "tvl": null}
    ]"#;
    let (base_url, request_rx) = serve_once("200 OK", body).await;

    let fetcher =
        GlobalMetricsFetcher::new(MetricKind::TotalMarketCap, base_url, Duration::from_secs(5)).unwrap();
    let points = fetcher.fetch("USD", ChartType::Weekly).await.unwrap();

    assert_eq!(
        points,
        vec![
            ChartPoint::new(2.4e12, 1000).with_dominance(51.9),
            ChartPoint::new(2.5e12, 2000).with_dominance(52.1),
        ]
    );

    let request_line = request_rx.await.unwrap();
    assert!(request_line.starts_with("GET /v1/global-markets?"), "{request_line}");
    assert!(request_line.contains("currency=usd"), "{request_line}");
    assert!(request_line.contains("interval=1w"), "{request_line}");
}

#[tokio::test]
async fn non_success_status_maps_to_status_error() {
    let (base_url, _request_rx) = serve_once("503 Service Unavailable", "down").await;

    let fetcher =
        GlobalMetricsFetcher::new(MetricKind::Volume24h, base_url, Duration::from_secs(5)).unwrap();
    let err = fetcher.fetch("USD", ChartType::Daily).await.unwrap_err();

    assert_eq!(
        err,
        FetchError::Status {
            status: 503,
            body: "down".into()
        }
    );
}

#[tokio::test]
async fn malformed_body_maps_to_decode_error() {
    let (base_url, _request_rx) = serve_once("200 OK", r#"{"error": "nope"}"#).await;

    let fetcher =
        GlobalMetricsFetcher::new(MetricKind::DefiCap, base_url, Duration::from_secs(5)).unwrap();
    let err = fetcher.fetch("EUR", ChartType::Monthly).await.unwrap_err();

    assert!(matches!(err, FetchError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn unreachable_server_maps_to_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fetcher = GlobalMetricsFetcher::new(
        MetricKind::TvlInDefi,
        format!("http://{addr}"),
        Duration::from_secs(2),
    )
    .unwrap();
    let err = fetcher.fetch("USD", ChartType::Daily).await.unwrap_err();

    assert!(matches!(err, FetchError::Network(_)), "{err:?}");
}

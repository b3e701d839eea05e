//! Binance adapter tests against a mocked REST server

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use breakout_trader::binance::auth::sign_query;
use breakout_trader::binance::BinanceClient;
use breakout_trader::config::ExchangeConfig;
use breakout_trader::exchange::{MarketData, OrderExecutor};
use breakout_trader::Side;

const API_KEY: &str = "test-key";
const API_SECRET: &str = "test-secret";

fn client_for(server: &MockServer, with_credentials: bool) -> BinanceClient {
    let mut config = ExchangeConfig {
        base_url: Some(server.uri()),
        timeout_secs: 5,
        ..Default::default()
    };
    if with_credentials {
        config.api_key = Some(API_KEY.to_string());
        config.api_secret = Some(API_SECRET.to_string());
    }
    BinanceClient::new(&config).unwrap()
}

fn kline_row(open_time: i64, open: &str, high: &str, low: &str, close: &str) -> serde_json::Value {
    json!([
        open_time,
        open,
        high,
        low,
        close,
        "12.5",
        open_time + 59_999,
        "375000.0",
        42,
        "6.0",
        "180000.0",
        "0"
    ])
}

#[tokio::test]
async fn test_get_bars_parses_klines_oldest_first() {
    let server = MockServer::start().await;
    // Out of order and with a duplicate to exercise normalisation
    let body = json!([
        kline_row(1_700_000_060_000, "30002.0", "30010.0", "29995.0", "30005.0"),
        kline_row(1_700_000_000_000, "30000.0", "30004.0", "29996.0", "30002.0"),
        kline_row(1_700_000_060_000, "30002.0", "30010.0", "29995.0", "30005.0"),
    ]);

    Mock::given(method("GET"))
        .and(path("/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "1m"))
        .and(query_param("limit", "300"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, false);
    let candles = client.get_bars("BTCUSDT", "1m", 300).await.unwrap();

    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].datetime.timestamp_millis(), 1_700_000_000_000);
    assert_eq!(candles[0].open, 30000.0);
    assert_eq!(candles[1].high, 30010.0);
    assert_eq!(candles[1].close, 30005.0);
    assert_eq!(candles[1].volume, 12.5);
}

#[tokio::test]
async fn test_get_bars_rejects_malformed_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/klines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[1_700_000_000_000i64, "1.0"]])))
        .mount(&server)
        .await;

    let client = client_for(&server, false);
    let err = client.get_bars("BTCUSDT", "1m", 10).await.unwrap_err();
    assert!(err.to_string().contains("Malformed kline"));
}

#[tokio::test]
async fn test_get_bars_surfaces_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/klines"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"code": -1121, "msg": "Invalid symbol."})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, false);
    let err = client.get_bars("NOPE", "1m", 10).await.unwrap_err();
    assert!(err.to_string().contains("Invalid symbol."));
}

#[tokio::test]
async fn test_market_order_is_signed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/order"))
        .and(header("X-MBX-APIKEY", API_KEY))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("side", "BUY"))
        .and(query_param("type", "MARKET"))
        .and(query_param("quantity", "0.001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "symbol": "BTCUSDT",
            "orderId": 28,
            "orderListId": -1,
            "clientOrderId": "6gCrw2kRUAF9CvJDGP16IP",
            "transactTime": 1507725176595i64
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, true);
    let ack = client
        .submit_market_order("BTCUSDT", Side::Buy, 0.001)
        .await
        .unwrap();
    assert_eq!(ack.order_id, "28");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let query = requests[0].url.query().unwrap().to_string();
    let (payload, signature) = query.split_once("&signature=").unwrap();

    assert!(payload.contains("timestamp="));
    assert!(payload.contains("recvWindow=5000"));
    assert_eq!(signature, sign_query(payload, API_SECRET));
}

#[tokio::test]
async fn test_rejected_order_reports_exchange_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/order"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": -2010,
            "msg": "Account has insufficient balance for requested action."
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, true);
    let err = client
        .submit_market_order("BTCUSDT", Side::Sell, 0.001)
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("-2010"));
    assert!(msg.contains("insufficient balance"));
}

#[tokio::test]
async fn test_order_without_credentials_never_hits_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/order"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, false);
    assert!(client
        .submit_market_order("BTCUSDT", Side::Buy, 0.001)
        .await
        .is_err());
}

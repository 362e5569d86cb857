//! Gateway HTTP endpoint tests against fake and real generators.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use quote_common::wire::{FrameReader, write_frame};
use quote_common::{CancelToken, Quote, StreamRequest};
use quote_gateway::api::create_router;
use quote_gateway::{GatewayConfig, SnapshotCollector};
use quote_server::{FixedPerturbation, PriceState, QuoteGenerator, QuoteServer};
use serde_json::{Value, json};
use std::io::Write;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tower::ServiceExt;

fn router_for(addr: SocketAddr, symbols: &[&str], window: Duration) -> axum::Router {
    create_router(Arc::new(SnapshotCollector::new(GatewayConfig {
        generator_addr: addr.to_string(),
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        window,
    })))
}

async fn send(app: axum::Router, method: Method) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri("/quotes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body.to_vec())
}

/// Accepts one subscriber, replays `quotes`, then hangs up.
fn fake_generator(quotes: Vec<Quote>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (mut conn, _) = listener.accept().unwrap();
        let mut reader = FrameReader::new(conn.try_clone().unwrap());
        let _: StreamRequest = reader.read_frame().unwrap();
        for quote in &quotes {
            write_frame(&mut conn, quote).unwrap();
        }
        conn.flush().unwrap();
    });
    addr
}

#[tokio::test]
async fn reduces_stream_to_latest_quote_per_symbol() {
    let addr = fake_generator(vec![
        Quote::new("BTC", 100.0, 1),
        Quote::new("BTC", 101.0, 2),
        Quote::new("ETH", 50.0, 3),
    ]);
    let app = router_for(addr, &["BTC", "ETH"], Duration::from_secs(3));

    let (status, headers, body) = send(app, Method::GET).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let json: Value = serde_json::from_slice(&body).unwrap();
    let mut quotes = json.as_array().unwrap().clone();
    quotes.sort_by_key(|q| q["symbol"].as_str().unwrap().to_string());
    assert_eq!(
        quotes,
        vec![
            json!({"symbol": "BTC", "price": 101.0, "timestamp": 2}),
            json!({"symbol": "ETH", "price": 50.0, "timestamp": 3}),
        ]
    );
}

#[tokio::test]
async fn silent_generator_gives_empty_list() {
    let addr = fake_generator(Vec::new());
    let app = router_for(addr, &["BTC"], Duration::from_secs(1));

    let (status, _, body) = send(app, Method::GET).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!([]));
}

#[tokio::test]
async fn unreachable_generator_is_500() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let app = router_for(addr, &["BTC"], Duration::from_secs(1));

    let (status, headers, body) = send(app, Method::GET).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn options_short_circuits_with_204() {
    // No generator behind it: the handler must not run.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let app = router_for(addr, &["BTC"], Duration::from_secs(1));

    let (status, headers, body) = send(app, Method::OPTIONS).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, OPTIONS"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
}

#[tokio::test]
async fn real_generator_window_returns_requested_symbols_only() {
    let state = PriceState::new([("SBER", 275.50), ("BTC", 95400.0), ("ETH", 2650.20)]).unwrap();
    let generator = Arc::new(QuoteGenerator::new(
        state,
        Box::new(FixedPerturbation(0.0)),
        Duration::from_millis(20),
    ));
    let server = QuoteServer::bind("127.0.0.1:0", generator).unwrap();
    let addr = server.local_addr().unwrap();
    let cancel = CancelToken::new();
    server.spawn(cancel.clone());

    let app = router_for(addr, &["BTC", "SBER", "DOGE"], Duration::from_millis(300));
    let (status, _, body) = send(app, Method::GET).await;
    cancel.cancel();

    assert_eq!(status, StatusCode::OK);
    let quotes: Vec<Quote> = serde_json::from_slice(&body).unwrap();
    let symbols: Vec<&str> = quotes.iter().map(|q| q.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["BTC", "SBER"]);
    assert_eq!(quotes[0].price, 95400.0);
    assert_eq!(quotes[1].price, 275.50);
}

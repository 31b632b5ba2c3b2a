//! Rate limiting through the HTTP surface.

use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

use contact_relay::security::ManualClock;

mod common;

use common::{client, jane, start_server, start_server_with_clock, test_config};

#[tokio::test]
async fn test_sixth_submission_in_window_is_rejected() {
    let clock = ManualClock::default();
    let server = start_server_with_clock(test_config(), clock.clone()).await;
    let client = client();

    for i in 0..5 {
        let res = client
            .post(server.url("/api/send-email"))
            .json(&jane())
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "request {i}");
    }

    let res = client
        .post(server.url("/api/send-email"))
        .json(&jane())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.headers()["x-ratelimit-limit"], "5");
    assert_eq!(res.headers()["x-ratelimit-remaining"], "0");
    assert_eq!(res.headers()["retry-after"], "900");
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Too many emails sent from this IP, please try again later."
    );
    assert_eq!(server.transport.sent().len(), 10);

    clock.advance(Duration::from_secs(15 * 60));

    let res = client
        .post(server.url("/api/send-email"))
        .json(&jane())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rejected_requests_are_counted_too() {
    let mut config = test_config();
    config.rate_limit.max_requests = 2;
    let server = start_server(config).await;
    let client = client();

    for _ in 0..2 {
        let res = client
            .post(server.url("/api/send-email"))
            .json(&serde_json::json!({"name": "Jane"}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    let res = client
        .post(server.url("/api/send-email"))
        .json(&jane())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(server.transport.attempts(), 0);
}

#[tokio::test]
async fn test_concurrent_burst_admits_exactly_the_limit() {
    let server = start_server(test_config()).await;
    let client = client();

    let requests = (0..20).map(|_| {
        let client = client.clone();
        let url = server.url("/api/send-email");
        tokio::spawn(async move { client.post(url).json(&jane()).send().await.unwrap().status() })
    });

    let mut ok = 0;
    let mut limited = 0;
    for handle in requests.collect::<Vec<_>>() {
        let status = handle.await.unwrap();
        if status == StatusCode::OK {
            ok += 1;
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            limited += 1;
        } else {
            panic!("unexpected status {status}");
        }
    }

    assert_eq!(ok, 5);
    assert_eq!(limited, 15);
}

#[tokio::test]
async fn test_disabled_limiter_never_rejects() {
    let mut config = test_config();
    config.rate_limit.enabled = false;
    let server = start_server(config).await;
    let client = client();

    for _ in 0..8 {
        let res = client
            .post(server.url("/api/send-email"))
            .json(&jane())
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().get("x-ratelimit-limit").is_none());
    }
}

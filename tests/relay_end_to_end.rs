//! End-to-end relay calls against mock upstreams.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

mod common;

use common::{relay_call, start_programmable_backend, start_relay, test_config, MockReply};

#[tokio::test]
async fn test_text_response_is_compressed_and_enveloped() {
    let upstream = start_programmable_backend(|head| {
        assert!(head.starts_with("get /page?q=1 http/1.1"));
        assert!(head.contains("x-client: relay-test"));
        MockReply::new(200, "text/html; charset=utf-8", "<p>hello</p>")
            .header("Set-Cookie", "id=1; Expires=Thu, 01 Jan 2030 00:00:00 GMT; Path=/")
            .header("Set-Cookie", "sess=2; HttpOnly")
    })
    .await;
    let (relay, shutdown) = start_relay(test_config()).await;

    let url = format!("http://{upstream}/page?q=1");
    let reply = relay_call(
        relay,
        &[("method", "GET"), ("url", url.as_str()), ("headers", "X-Client: relay-test\r\n")],
    )
    .await;

    assert_eq!(reply.outer_status, 200);
    assert_eq!(reply.outer_content_type, "image/gif");
    assert!(reply.frame.textual);
    assert_eq!(reply.frame.status, 200);
    assert_eq!(reply.frame.content, b"<p>hello</p>");
    assert_eq!(reply.header("Content-Type").as_deref(), Some("text/html; charset=utf-8"));
    assert_eq!(reply.header("Connection").as_deref(), Some("close"));
    assert_eq!(
        reply.header("Set-Cookie").as_deref(),
        Some("id=1; Expires=Thu, 01 Jan 2030 00:00:00 GMT; Path=/\r\nSet-Cookie: sess=2; HttpOnly")
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_binary_response_and_upstream_status_pass_through() {
    let upstream = start_programmable_backend(|head| {
        assert!(head.starts_with("post /upload"));
        MockReply::new(201, "image/png", vec![0x89, b'P', b'N', b'G', 0])
    })
    .await;
    let (relay, shutdown) = start_relay(test_config()).await;

    let url = format!("http://{upstream}/upload");
    let reply = relay_call(relay, &[("method", "POST"), ("url", url.as_str()), ("payload", "data")]).await;

    assert_eq!(reply.outer_status, 200);
    assert!(!reply.frame.textual);
    assert_eq!(reply.frame.status, 201);
    assert_eq!(reply.frame.content, vec![0x89, b'P', b'N', b'G', 0]);

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_body_is_refetched_as_range() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let upstream = start_programmable_backend(move |head| {
        cc.fetch_add(1, Ordering::SeqCst);
        if head.contains("range: bytes=0-1000") {
            MockReply::new(206, "application/octet-stream", vec![7u8; 1001])
        } else {
            MockReply::new(200, "application/octet-stream", vec![7u8; 5000])
        }
    })
    .await;
    let mut config = test_config();
    config.fetch.max_response_bytes = 1000;
    let (relay, shutdown) = start_relay(config).await;

    let url = format!("http://{upstream}/big.bin");
    let reply = relay_call(relay, &[("method", "GET"), ("url", url.as_str())]).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(reply.frame.status, 206);
    assert_eq!(reply.frame.content.len(), 1000);
    assert_eq!(reply.header("Accept-Ranges").as_deref(), Some("bytes"));
    assert_eq!(reply.header("Content-Length").as_deref(), Some("1000"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_stream_without_length_is_refetched_as_range() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let upstream = start_programmable_backend(move |head| {
        cc.fetch_add(1, Ordering::SeqCst);
        if head.contains("range: bytes=0-1000") {
            MockReply::new(206, "application/octet-stream", vec![9u8; 800]).chunked()
        } else {
            MockReply::new(200, "application/octet-stream", vec![9u8; 5000]).chunked()
        }
    })
    .await;
    let mut config = test_config();
    config.fetch.max_response_bytes = 1000;
    let (relay, shutdown) = start_relay(config).await;

    let url = format!("http://{upstream}/stream.bin");
    let reply = relay_call(relay, &[("method", "GET"), ("url", url.as_str())]).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(reply.frame.status, 206);
    assert_eq!(reply.frame.content, vec![9u8; 800]);
    assert_eq!(reply.header("Accept-Ranges").as_deref(), Some("bytes"));
    assert_eq!(reply.header("Content-Length").as_deref(), Some("800"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream_exhausts_retries() {
    let (relay, shutdown) = start_relay(test_config()).await;

    let reply = relay_call(relay, &[("method", "GET"), ("url", "http://127.0.0.1:1/")]).await;

    assert_eq!(reply.outer_status, 200);
    assert_eq!(reply.frame.status, 502);
    assert!(reply.frame.textual);
    let page = String::from_utf8(reply.frame.content).unwrap();
    assert!(page.contains("Fetch Server Failed: [FETCH_ERROR"));
    assert_eq!(page.matches("FETCH_ERROR").count(), 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_password_and_scheme_checks() {
    let mut config = test_config();
    config.fetch.password = "s3cret".into();
    let (relay, shutdown) = start_relay(config).await;

    let reply = relay_call(relay, &[("method", "GET"), ("url", "http://127.0.0.1:1/")]).await;
    assert_eq!(reply.frame.status, 403);

    let reply = relay_call(
        relay,
        &[("method", "GET"), ("url", "ftp://example.com/"), ("password", "s3cret")],
    )
    .await;
    assert_eq!(reply.frame.status, 501);

    shutdown.trigger();
}

#[tokio::test]
async fn test_get_serves_landing_page() {
    let (relay, shutdown) = start_relay(test_config()).await;

    let res = reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
        .get(format!("http://{relay}/fetch.py"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    assert!(res.text().await.unwrap().contains("Fetch Relay"));

    shutdown.trigger();
}

//! Integration tests for the startup liveness check.
//!
//! A throwaway TCP listener plays the Redis-protocol dependency.

use meow_config::{LivenessCheck, LivenessError};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const TIMEOUT: Duration = Duration::from_secs(2);

/// Spawns a server that answers the first request with `reply`.
async fn fake_server(reply: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 64];
        let n = socket.read(&mut buf).await.unwrap();
        assert!(buf[..n].windows(4).any(|w| w == b"PING"));
        socket.write_all(reply).await.unwrap();
    });
    addr.to_string()
}

#[tokio::test]
async fn test_pong_is_healthy() {
    let addr = fake_server(b"+PONG\r\n").await;
    let check = LivenessCheck::new(&addr, TIMEOUT).unwrap();
    check.ping().await.unwrap();
}

#[tokio::test]
async fn test_redis_url_form() {
    let addr = fake_server(b"+PONG\r\n").await;
    let check = LivenessCheck::new(&format!("redis://{addr}"), TIMEOUT).unwrap();
    assert_eq!(check.address(), addr);
    check.ping().await.unwrap();
}

#[tokio::test]
async fn test_error_reply_fails() {
    let addr = fake_server(b"-NOAUTH Authentication required.\r\n").await;
    let check = LivenessCheck::new(&addr, TIMEOUT).unwrap();
    match check.ping().await {
        Err(LivenessError::ErrorReply { reply, .. }) => {
            assert!(reply.starts_with("NOAUTH"));
        }
        other => panic!("expected error reply, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unexpected_reply_fails() {
    let addr = fake_server(b"HTTP/1.1 400 Bad Request\r\n").await;
    let check = LivenessCheck::new(&addr, TIMEOUT).unwrap();
    assert!(matches!(
        check.ping().await,
        Err(LivenessError::UnexpectedReply { .. })
    ));
}

#[tokio::test]
async fn test_unreachable_fails() {
    // Bind and drop to obtain a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let check = LivenessCheck::new(&addr, TIMEOUT).unwrap();
    assert!(matches!(
        check.ping().await,
        Err(LivenessError::Connect { .. })
    ));
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let check = LivenessCheck::new(&addr, Duration::from_millis(200)).unwrap();
    assert!(matches!(
        check.ping().await,
        Err(LivenessError::Timeout { .. })
    ));
}

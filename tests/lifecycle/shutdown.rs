use std::time::Duration;

use tcp_reconnect::{ClientConfig, ConnectionState, TcpClient};

use super::support::{addr, MockTransport, Outcome};

#[tokio::test(start_paused = true)]
async fn close_never_resolves_before_the_transport_shutdown_signal() {
    let transport = MockTransport::new(vec![Outcome::Succeed]);
    let gate = transport.gate_shutdown();
    let client = TcpClient::new(
        transport.clone(),
        addr(),
        ClientConfig::builder()
            .shutdown_grace(Duration::from_millis(100))
            .build(),
    );

    client.open().wait().await.unwrap();

    let shutdown = client.close();
    tokio::task::yield_now().await;
    assert!(transport.shutdown_requested());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(
        !shutdown.is_complete(),
        "teardown is still gated by the transport"
    );

    gate.fulfill(());
    assert!(shutdown.wait().await.is_ok());
    assert_eq!(client.state(), ConnectionState::Closed);
}

#[tokio::test(start_paused = true)]
async fn grace_window_elapses_after_the_shutdown_signal() {
    let transport = MockTransport::new(vec![]);
    let client = TcpClient::new(
        transport.clone(),
        addr(),
        ClientConfig::builder()
            .shutdown_grace(Duration::from_secs(1))
            .build(),
    );

    let shutdown = client.close();
    tokio::task::yield_now().await;
    assert!(transport.shutdown_requested());
    assert!(
        !shutdown.is_complete(),
        "grace window must elapse before resolution"
    );

    assert!(shutdown.wait().await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn repeated_close_returns_the_same_teardown() {
    let transport = MockTransport::new(vec![]);
    let client = TcpClient::new(
        transport.clone(),
        addr(),
        ClientConfig::builder()
            .shutdown_grace(Duration::from_millis(1))
            .build(),
    );

    let first = client.close();
    let second = client.close();
    assert!(first.wait().await.is_ok());
    assert!(second.is_complete(), "both calls observe the same teardown");
}

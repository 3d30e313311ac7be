use std::time::Duration;

use tcp_reconnect::{ClientConfig, ClientEvent, ConnectionState, ReconnectDecision, TcpClient};

use super::support::{addr, until, MockTransport, Outcome, RecordingListener, RecordingPolicy};

#[tokio::test(start_paused = true)]
async fn dropped_connection_reopens_without_reresolving_the_future() {
    let transport = MockTransport::new(vec![Outcome::Succeed, Outcome::Succeed]);
    let (policy, probe) = RecordingPolicy::retry_fixed(Duration::from_millis(10));
    let (listener, events) = RecordingListener::new();
    let client = TcpClient::new(
        transport.clone(),
        addr(),
        ClientConfig::builder()
            .reconnect(policy)
            .listener(listener)
            .build(),
    );

    let future = client.open();
    let first = future.wait().await.unwrap();
    assert_eq!(first.id, 0);

    transport.handle(0).trigger_close();
    until(|| transport.connects() == 2).await;
    until(|| client.connection().map(|h| h.id) == Some(1)).await;

    // The future stays resolved with the first handle.
    assert_eq!(future.wait().await.unwrap().id, 0);

    // Policy and stale handle both learn about the rebind.
    assert_eq!(probe.reconnects(), 1);
    assert_eq!(transport.handle(0).rebinds(), vec![1]);
    assert_eq!(client.state(), ConnectionState::Connected);

    let log = events.lock().unwrap();
    let kinds: Vec<_> = log.iter().map(|e| e.event_type()).collect();
    assert_eq!(
        kinds,
        vec!["Connected", "ConnectionClosed", "Connected", "Reconnected"]
    );
}

#[tokio::test(start_paused = true)]
async fn give_up_after_a_prior_success_leaves_the_future_untouched() {
    let transport = MockTransport::new(vec![Outcome::Succeed, Outcome::Fail]);
    let (policy, probe) = RecordingPolicy::new(|_, _| ReconnectDecision::GiveUp);
    let (listener, events) = RecordingListener::new();
    let client = TcpClient::new(
        transport.clone(),
        addr(),
        ClientConfig::builder()
            .reconnect(policy)
            .listener(listener)
            .build(),
    );

    let future = client.open();
    assert_eq!(future.wait().await.unwrap().id, 0);

    // Drop the connection; the re-attempt fails and the policy gives up.
    transport.handle(0).trigger_close();
    until(|| probe.seen() == vec![1]).await;

    assert_eq!(future.wait().await.unwrap().id, 0, "future is untouched");

    let exhausted = events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, ClientEvent::ReconnectExhausted { .. }))
        .count();
    assert_eq!(exhausted, 1, "exhaustion is reported exactly once");
}

#[tokio::test(start_paused = true)]
async fn close_defuses_a_queued_retry_timer() {
    let transport = MockTransport::always_failing();
    let (policy, _probe) = RecordingPolicy::retry_fixed(Duration::from_millis(100));
    let client = TcpClient::new(
        transport.clone(),
        addr(),
        ClientConfig::builder()
            .reconnect(policy)
            .shutdown_grace(Duration::from_millis(1))
            .build(),
    );

    client.open();
    until(|| client.attempts() == 1).await;
    assert_eq!(transport.connects(), 1);

    // The retry timer is already scheduled; close() must win anyway.
    client.close().wait().await.unwrap();

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(
        transport.connects(),
        1,
        "no attempt may start after close() returns"
    );
}

#[tokio::test(start_paused = true)]
async fn close_disarms_the_close_notification_path() {
    let transport = MockTransport::new(vec![Outcome::Succeed]);
    let (policy, _probe) = RecordingPolicy::retry_fixed(Duration::from_millis(10));
    let client = TcpClient::new(
        transport.clone(),
        addr(),
        ClientConfig::builder()
            .reconnect(policy)
            .shutdown_grace(Duration::from_millis(1))
            .build(),
    );

    client.open().wait().await.unwrap();
    client.close().wait().await.unwrap();

    // A close notification arriving after close() must not re-open.
    transport.handle(0).trigger_close();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(transport.connects(), 1);
    assert_eq!(client.state(), ConnectionState::Closed);
}

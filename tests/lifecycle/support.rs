//! Scripted transport and recording collaborators shared by the lifecycle
//! tests.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use tcp_reconnect::{
    ClientEvent, Completion, ConnectionHandle, EventListener, ReconnectDecision, ReconnectPolicy,
    Transport, TransportError,
};

/// Scripted outcome of one connection attempt.
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    Succeed,
    Fail,
}

/// A live-connection capability whose close event is triggered by the test.
#[derive(Clone)]
pub struct MockHandle {
    pub id: usize,
    closed: Completion<()>,
    rebinds: Arc<Mutex<Vec<usize>>>,
}

impl MockHandle {
    /// Simulates the underlying connection dropping.
    pub fn trigger_close(&self) {
        self.closed.fulfill(());
    }

    /// Ids of replacement handles delivered via `reconnected`.
    pub fn rebinds(&self) -> Vec<usize> {
        self.rebinds.lock().unwrap().clone()
    }
}

impl ConnectionHandle for MockHandle {
    fn closed(&self) -> BoxFuture<'static, ()> {
        let closed = self.closed.clone();
        Box::pin(async move { closed.wait().await })
    }

    fn reconnected(&self, replacement: &Self) {
        self.rebinds.lock().unwrap().push(replacement.id);
    }
}

struct MockInner {
    script: Mutex<VecDeque<Outcome>>,
    default_fail: bool,
    connects: AtomicUsize,
    addresses: Mutex<Vec<SocketAddr>>,
    handles: Mutex<Vec<MockHandle>>,
    shutdown_gate: Mutex<Option<Completion<()>>>,
    shutdown_requested: Completion<()>,
}

/// A transport following a per-attempt script; once the script runs out,
/// attempts succeed (or always fail for [`MockTransport::always_failing`]).
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<MockInner>,
}

impl MockTransport {
    pub fn new(script: Vec<Outcome>) -> Self {
        Self::build(script, false)
    }

    pub fn always_failing() -> Self {
        Self::build(Vec::new(), true)
    }

    fn build(script: Vec<Outcome>, default_fail: bool) -> Self {
        Self {
            inner: Arc::new(MockInner {
                script: Mutex::new(script.into()),
                default_fail,
                connects: AtomicUsize::new(0),
                addresses: Mutex::new(Vec::new()),
                handles: Mutex::new(Vec::new()),
                shutdown_gate: Mutex::new(None),
                shutdown_requested: Completion::new(),
            }),
        }
    }

    /// Total `connect` calls so far.
    pub fn connects(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    /// Addresses targeted by each attempt, in order.
    pub fn addresses(&self) -> Vec<SocketAddr> {
        self.inner.addresses.lock().unwrap().clone()
    }

    /// The `n`th successfully produced handle.
    pub fn handle(&self, n: usize) -> MockHandle {
        self.inner.handles.lock().unwrap()[n].clone()
    }

    /// Holds `shutdown` open until the returned completion is fulfilled.
    pub fn gate_shutdown(&self) -> Completion<()> {
        let gate = Completion::new();
        *self.inner.shutdown_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Whether `shutdown` has been requested.
    pub fn shutdown_requested(&self) -> bool {
        self.inner.shutdown_requested.is_complete()
    }
}

impl Transport for MockTransport {
    type Handle = MockHandle;

    fn connect(
        &self,
        address: SocketAddr,
        _config: &tcp_reconnect::ClientConfig,
    ) -> BoxFuture<'static, Result<Self::Handle, TransportError>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            let id = inner.connects.fetch_add(1, Ordering::SeqCst);
            inner.addresses.lock().unwrap().push(address);
            let fail = match inner.script.lock().unwrap().pop_front() {
                Some(Outcome::Fail) => true,
                Some(Outcome::Succeed) => false,
                None => inner.default_fail,
            };
            if fail {
                Err(Arc::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    format!("refused attempt {}", id),
                )) as TransportError)
            } else {
                let handle = MockHandle {
                    id,
                    closed: Completion::new(),
                    rebinds: Arc::new(Mutex::new(Vec::new())),
                };
                inner.handles.lock().unwrap().push(handle.clone());
                Ok(handle)
            }
        })
    }

    fn shutdown(&self) -> BoxFuture<'static, ()> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            inner.shutdown_requested.fulfill(());
            let gate = inner.shutdown_gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.wait().await;
            }
        })
    }
}

/// Shared probes into a [`RecordingPolicy`].
#[derive(Clone)]
pub struct PolicyProbe {
    seen: Arc<Mutex<Vec<u32>>>,
    reconnects: Arc<AtomicUsize>,
}

impl PolicyProbe {
    /// Attempt numbers in the order the policy saw them.
    pub fn seen(&self) -> Vec<u32> {
        self.seen.lock().unwrap().clone()
    }

    /// Number of `reconnected` notifications delivered.
    pub fn reconnects(&self) -> usize {
        self.reconnects.load(Ordering::SeqCst)
    }
}

/// A policy that records every consultation before delegating to a closure.
pub struct RecordingPolicy {
    probe: PolicyProbe,
    decide: Box<dyn Fn(SocketAddr, u32) -> ReconnectDecision + Send + Sync>,
}

impl RecordingPolicy {
    pub fn new<F>(decide: F) -> (Self, PolicyProbe)
    where
        F: Fn(SocketAddr, u32) -> ReconnectDecision + Send + Sync + 'static,
    {
        let probe = PolicyProbe {
            seen: Arc::new(Mutex::new(Vec::new())),
            reconnects: Arc::new(AtomicUsize::new(0)),
        };
        (
            Self {
                probe: probe.clone(),
                decide: Box::new(decide),
            },
            probe,
        )
    }

    /// Retries every failure at the same address after `delay`.
    pub fn retry_fixed(delay: Duration) -> (Self, PolicyProbe) {
        Self::new(move |address, _| ReconnectDecision::Retry { address, delay })
    }
}

impl ReconnectPolicy for RecordingPolicy {
    fn decide(&self, address: SocketAddr, attempt: u32) -> ReconnectDecision {
        self.probe.seen.lock().unwrap().push(attempt);
        (self.decide)(address, attempt)
    }

    fn reconnected(&self) {
        self.probe.reconnects.fetch_add(1, Ordering::SeqCst);
    }
}

/// An event listener that appends everything it sees to a shared log.
pub struct RecordingListener {
    events: Arc<Mutex<Vec<ClientEvent>>>,
}

impl RecordingListener {
    pub fn new() -> (Self, Arc<Mutex<Vec<ClientEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                events: Arc::clone(&events),
            },
            events,
        )
    }
}

impl EventListener for RecordingListener {
    fn on_event(&self, event: &ClientEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Polls `condition` until it holds, advancing time a millisecond at a time.
pub async fn until<F>(condition: F)
where
    F: Fn() -> bool,
{
    for _ in 0..2000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("condition not reached within 2 seconds");
}

pub fn addr() -> SocketAddr {
    "127.0.0.1:6379".parse().unwrap()
}

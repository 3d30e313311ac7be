//! Graceful teardown of transport resources.

use std::time::Duration;

use futures::future::BoxFuture;

use crate::completion::Completion;
use crate::error::ShutdownError;

/// The eventual outcome of [`TcpClient::close`](crate::TcpClient::close).
pub type ShutdownFuture = Completion<Result<(), ShutdownError>>;

/// Drives transport teardown and the post-teardown grace wait.
///
/// The caller is expected to have disarmed reconnection before starting the
/// coordinator, so no retry can race with teardown. The returned completion
/// never resolves `Ok` before the transport's shutdown signal has resolved
/// and the grace window has elapsed; some transport runtimes release worker
/// resources asynchronously after acknowledging shutdown, and the grace
/// window covers that lag.
pub(crate) struct ShutdownCoordinator {
    grace: Duration,
}

impl ShutdownCoordinator {
    pub(crate) fn new(grace: Duration) -> Self {
        Self { grace }
    }

    pub(crate) fn begin(&self, teardown: BoxFuture<'static, ()>) -> ShutdownFuture {
        let completion = ShutdownFuture::new();
        let grace = self.grace;
        let done = completion.clone();
        // If the task is cancelled mid-wait (or dropped unpolled during
        // runtime teardown), the guard surfaces the interruption instead of
        // leaving waiters hanging. Constructed outside the task body so it
        // exists from the moment the task does.
        let guard = InterruptGuard(done.clone());
        tokio::spawn(async move {
            let _guard = guard;
            teardown.await;
            tokio::time::sleep(grace).await;
            done.fulfill(Ok(()));
        });
        completion
    }
}

struct InterruptGuard(ShutdownFuture);

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        // No-op when teardown already fulfilled the completion.
        self.0.fulfill(Err(ShutdownError::Interrupted));
    }
}

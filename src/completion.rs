//! Single-assignment, multi-reader completion future.

use std::future::IntoFuture;
use std::sync::{Arc, OnceLock};

use futures::future::BoxFuture;
use tokio::sync::Notify;

/// A value that is assigned at most once and observed by any number of
/// readers, present or future.
///
/// Fulfillment is idempotent: a second [`fulfill`](Self::fulfill) is
/// silently ignored rather than being an error. This absorbs races where a
/// reconnection outcome arrives concurrently with an earlier resolution;
/// every reader sees the first value, whichever callback won.
///
/// Readers suspend without blocking a worker thread. Cloning is cheap and
/// every clone refers to the same slot.
pub struct Completion<T> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    cell: OnceLock<T>,
    notify: Notify,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Completion<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates an unfulfilled completion.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                cell: OnceLock::new(),
                notify: Notify::new(),
            }),
        }
    }

    /// Creates a completion already holding `value`.
    pub fn fulfilled(value: T) -> Self {
        let completion = Self::new();
        completion.fulfill(value);
        completion
    }

    /// Assigns the value, waking all current readers.
    ///
    /// Returns `true` if this call won the assignment, `false` if the
    /// completion was already fulfilled (in which case `value` is dropped).
    pub fn fulfill(&self, value: T) -> bool {
        let won = self.shared.cell.set(value).is_ok();
        if won {
            self.shared.notify.notify_waiters();
        }
        won
    }

    /// Returns `true` once a value has been assigned.
    pub fn is_complete(&self) -> bool {
        self.shared.cell.get().is_some()
    }

    /// Non-blocking peek at the value, if assigned.
    pub fn get(&self) -> Option<&T> {
        self.shared.cell.get()
    }

    /// Suspends until the value is assigned, then returns a clone of it.
    pub async fn wait(&self) -> T {
        loop {
            if let Some(value) = self.shared.cell.get() {
                return value.clone();
            }
            let notified = self.shared.notify.notified();
            // Re-check after registering: a fulfill between the first check
            // and `notified()` would otherwise be missed.
            if let Some(value) = self.shared.cell.get() {
                return value.clone();
            }
            notified.await;
        }
    }
}

impl<T> Default for Completion<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntoFuture for Completion<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = T;
    type IntoFuture = BoxFuture<'static, T>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.wait().await })
    }
}

impl<T> std::fmt::Debug for Completion<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("value", &self.shared.cell.get())
            .finish()
    }
}

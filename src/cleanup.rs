//! Cleanup that runs after an operation on every exit path.

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// Results of an operation and of the cleanup that followed it
pub struct CleanupOutcome<T, C> {
    /// The operation's output, or the payload of its panic
    pub operation: std::thread::Result<T>,
    pub cleanup: C,
}

/// Await `operation`, then always await `cleanup`
///
/// A panic inside `operation` is caught and handed back in
/// [`CleanupOutcome::operation`] so the caller can resume it once it has
/// dealt with the cleanup result. `cleanup` is not polled before the
/// operation has finished.
pub async fn run_with_cleanup<F, C>(
    operation: F,
    cleanup: C,
) -> CleanupOutcome<F::Output, C::Output>
where
    F: Future,
    C: Future,
{
    let operation = AssertUnwindSafe(operation).catch_unwind().await;
    let cleanup = cleanup.await;
    CleanupOutcome { operation, cleanup }
}

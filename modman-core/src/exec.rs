//! Fan-out execution of independent per-mod tasks.
//!
//! One tokio task per unit of work, results collected over a channel and
//! drained in completion order. There is no cancellation: when a caller
//! stops draining early (fail-fast), in-flight tasks run to completion and
//! their results are dropped. Parallelism is unbounded by design; batches
//! are sized by human-typed argument lists.

use std::future::Future;

use tokio::sync::mpsc;

/// A set of spawned tasks whose results are drained one at a time.
pub struct Batch<T> {
    rx: mpsc::UnboundedReceiver<T>,
    expected: usize,
}

impl<T: Send + 'static> Batch<T> {
    /// Spawn one task per future; all start running immediately.
    pub fn spawn<I, F>(tasks: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = T> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut expected = 0;

        for task in tasks {
            let tx = tx.clone();
            expected += 1;
            tokio::spawn(async move {
                // The receiver may be gone if the drain stopped early.
                let _ = tx.send(task.await);
            });
        }

        Self { rx, expected }
    }

    /// Drain results in completion order, invoking `on_result` per result.
    ///
    /// Returning an error from the callback stops the drain early; tasks
    /// still in flight keep running but are never collected.
    pub async fn wait<E, C>(mut self, mut on_result: C) -> Result<(), E>
    where
        C: FnMut(T) -> Result<(), E>,
    {
        for _ in 0..self.expected {
            match self.rx.recv().await {
                Some(result) => on_result(result)?,
                None => break,
            }
        }
        Ok(())
    }
}

impl<E: Send + 'static> Batch<Result<(), E>> {
    /// Fail-fast policy: the first task error aborts the drain.
    pub async fn fail_fast(self) -> Result<(), E> {
        self.wait(|result| result).await
    }

    /// Collect-all policy: every task runs and every error is returned.
    pub async fn collect_errors(self) -> Vec<E> {
        let mut errors = Vec::new();
        let _ = self
            .wait(|result: Result<(), E>| {
                if let Err(err) = result {
                    errors.push(err);
                }
                Ok::<(), std::convert::Infallible>(())
            })
            .await;
        errors
    }
}

use std::fmt::Debug;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Future;
use futures::channel::oneshot;
use keeldb_error::{DbError, Result};
use parking_lot::Mutex;

use crate::execution::source::SourceHandle;

/// The single downstream consumer of a collect task.
///
/// `accept` is invoked exactly once per task, from whichever thread settles
/// the task's outcome. Either the source or the error is present; both are
/// present only when a cancellation raced in before the source resolved, in
/// which case the source is still handed over alongside the cancellation
/// cause.
pub trait ResultSink: Debug + Send + Sync {
    fn accept(&self, source: Option<SourceHandle>, error: Option<DbError>);
}

/// Outcome delivered to a pending result future.
#[derive(Debug)]
pub struct CollectResult {
    pub source: Option<SourceHandle>,
    pub error: Option<DbError>,
}

/// Create a sink whose single `accept` call resolves an awaitable future.
pub fn pending_result() -> (ResultFuture, Arc<dyn ResultSink>) {
    let (sender, recv) = oneshot::channel();
    let sink = PendingResultSink {
        sender: Mutex::new(Some(sender)),
    };
    (ResultFuture { recv }, Arc::new(sink))
}

/// Future side of [`pending_result`].
#[derive(Debug)]
pub struct ResultFuture {
    recv: oneshot::Receiver<CollectResult>,
}

impl Future for ResultFuture {
    type Output = Result<CollectResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.recv).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(Ok(result)),
            Poll::Ready(Err(_)) => Poll::Ready(Err(DbError::new(
                "Collect task dropped without producing a result",
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[derive(Debug)]
struct PendingResultSink {
    sender: Mutex<Option<oneshot::Sender<CollectResult>>>,
}

impl ResultSink for PendingResultSink {
    fn accept(&self, source: Option<SourceHandle>, error: Option<DbError>) {
        if let Some(sender) = self.sender.lock().take() {
            // Receiver may have gone away, nothing to do if so.
            let _ = sender.send(CollectResult { source, error });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_resolves_future() {
        let (fut, sink) = pending_result();
        sink.accept(None, Some(DbError::new("query canceled")));

        let result = futures::executor::block_on(fut).unwrap();
        assert!(result.source.is_none());
        assert_eq!("query canceled", result.error.unwrap().message());
    }

    #[test]
    fn dropped_sink_errors_future() {
        let (fut, sink) = pending_result();
        std::mem::drop(sink);

        futures::executor::block_on(fut).unwrap_err();
    }
}

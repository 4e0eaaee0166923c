use std::sync::Arc;

use keeldb_error::DbError;

use super::claim::{ClaimOutcome, SinkClaim};
use super::CollectTask;
use crate::execution::sink::ResultSink;
use crate::execution::source::SourceHandle;

/// Collect task for a source that's available at construction.
///
/// `start` and `kill` race through a single claim. The winner determines the
/// one sink invocation; a kill that loses the claim forwards directly to the
/// already-handed-off source instead.
#[derive(Debug)]
pub struct SyncCollectTask {
    source: SourceHandle,
    sink: Arc<dyn ResultSink>,
    claim: SinkClaim,
}

impl SyncCollectTask {
    pub fn new(source: SourceHandle, sink: Arc<dyn ResultSink>) -> Self {
        SyncCollectTask {
            source,
            sink,
            claim: SinkClaim::new(),
        }
    }
}

impl CollectTask for SyncCollectTask {
    fn start(&self) {
        if self.claim.claim() == ClaimOutcome::Won {
            self.sink.accept(Some(self.source.clone()), None);
        }
        // else: got killed
    }

    fn kill(&self, cause: DbError) {
        match self.claim.claim() {
            ClaimOutcome::Won => self.sink.accept(None, Some(cause)),
            // Handoff already happened, the source is now the cancellation
            // channel. Forwarding is idempotent on the source side.
            ClaimOutcome::Lost => self.source.kill(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use keeldb_error::DbError;

    use super::*;
    use crate::execution::collect::testutil::{RecordingSink, StubSource};

    #[test]
    fn start_then_kill() {
        let source = Arc::new(StubSource::default());
        let sink = Arc::new(RecordingSink::default());
        let task = SyncCollectTask::new(source.clone(), sink.clone());

        task.start();
        task.kill(DbError::new("query canceled"));

        let accepts = sink.accepts();
        assert_eq!(1, accepts.len());
        assert!(accepts[0].source.is_some());
        assert!(accepts[0].error.is_none());

        let kills = source.kills();
        assert_eq!(1, kills.len());
        assert_eq!("query canceled", kills[0].message());
    }

    #[test]
    fn kill_then_start() {
        let source = Arc::new(StubSource::default());
        let sink = Arc::new(RecordingSink::default());
        let task = SyncCollectTask::new(source.clone(), sink.clone());

        task.kill(DbError::new("query canceled"));
        task.start();

        let accepts = sink.accepts();
        assert_eq!(1, accepts.len());
        assert!(accepts[0].source.is_none());
        assert_eq!("query canceled", accepts[0].error.as_ref().unwrap().message());

        assert!(source.kills().is_empty());
    }

    #[test]
    fn start_only() {
        let source = Arc::new(StubSource::default());
        let sink = Arc::new(RecordingSink::default());
        let task = SyncCollectTask::new(source.clone(), sink.clone());

        task.start();

        let accepts = sink.accepts();
        assert_eq!(1, accepts.len());
        assert!(accepts[0].source.is_some());
        assert!(accepts[0].error.is_none());
        assert!(source.kills().is_empty());
    }

    #[test]
    fn second_start_is_noop() {
        let source = Arc::new(StubSource::default());
        let sink = Arc::new(RecordingSink::default());
        let task = SyncCollectTask::new(source.clone(), sink.clone());

        task.start();
        task.start();

        assert_eq!(1, sink.accepts().len());
    }

    #[test]
    fn repeated_kills_forward_idempotently() {
        let source = Arc::new(StubSource::default());
        let sink = Arc::new(RecordingSink::default());
        let task = SyncCollectTask::new(source.clone(), sink.clone());

        task.start();
        task.kill(DbError::new("first"));
        task.kill(DbError::new("second"));

        assert_eq!(1, sink.accepts().len());
        // Both forwarded, the source's own contract keeps the first cause.
        assert_eq!(2, source.kills().len());
    }
}

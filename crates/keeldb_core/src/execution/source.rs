use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::Arc;
use std::task::Context;

use keeldb_error::{DbError, Result};
use parking_lot::Mutex;

use crate::arrays::batch::Batch;

/// Result of a pull on a batch source.
#[derive(Debug)]
pub enum PollPull {
    /// Successfully pulled a batch, keep pulling for more.
    Batch(Batch),
    /// A batch could not be retrieved right now.
    ///
    /// A waker will be registered for a later wakeup to try to pull the next
    /// batch.
    Pending,
    /// The source is exhausted.
    Exhausted,
}

/// A pull-based producer of batches.
pub trait BatchSource: Debug + Send + Sync {
    /// Pull the next batch from this source.
    fn poll_pull(&self, cx: &mut Context) -> Result<PollPull>;

    /// Request that this source stop producing.
    ///
    /// Callable any number of times from any thread. The first cause wins,
    /// and every pull after the first call fails with the recorded cause.
    fn kill(&self, cause: DbError);
}

/// Shared handle to a batch source.
///
/// Sources move through the system in this form since cancellation may need
/// to reach a source that's already been handed off to a downstream consumer.
pub type SourceHandle = Arc<dyn BatchSource>;

/// An in-memory source producing a fixed set of batches.
#[derive(Debug)]
pub struct BufferedBatchSource {
    state: Mutex<BufferedState>,
}

#[derive(Debug)]
struct BufferedState {
    batches: VecDeque<Batch>,
    killed: Option<DbError>,
}

impl BufferedBatchSource {
    pub fn new(batches: impl IntoIterator<Item = Batch>) -> Self {
        BufferedBatchSource {
            state: Mutex::new(BufferedState {
                batches: batches.into_iter().collect(),
                killed: None,
            }),
        }
    }
}

impl BatchSource for BufferedBatchSource {
    fn poll_pull(&self, _cx: &mut Context) -> Result<PollPull> {
        let mut state = self.state.lock();
        if let Some(cause) = &state.killed {
            return Err(cause.clone());
        }
        match state.batches.pop_front() {
            Some(batch) => Ok(PollPull::Batch(batch)),
            None => Ok(PollPull::Exhausted),
        }
    }

    fn kill(&self, cause: DbError) {
        let mut state = self.state.lock();
        if state.killed.is_none() {
            state.killed = Some(cause);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::task::{Context, Waker};

    use super::*;

    fn noop_context() -> Context<'static> {
        Context::from_waker(Waker::noop())
    }

    #[test]
    fn pull_then_exhausted() {
        let source = BufferedBatchSource::new([Batch::empty_with_num_rows(4)]);
        let mut cx = noop_context();

        match source.poll_pull(&mut cx).unwrap() {
            PollPull::Batch(batch) => assert_eq!(4, batch.num_rows()),
            other => panic!("unexpected poll: {other:?}"),
        }
        match source.poll_pull(&mut cx).unwrap() {
            PollPull::Exhausted => (),
            other => panic!("unexpected poll: {other:?}"),
        }
    }

    #[test]
    fn pulls_fail_after_kill() {
        let source = BufferedBatchSource::new([Batch::empty_with_num_rows(4)]);
        source.kill(DbError::new("query canceled"));

        let mut cx = noop_context();
        let e = source.poll_pull(&mut cx).unwrap_err();
        assert_eq!("query canceled", e.message());
    }

    #[test]
    fn first_kill_cause_wins() {
        let source = BufferedBatchSource::new([]);
        source.kill(DbError::new("first"));
        source.kill(DbError::new("second"));

        let mut cx = noop_context();
        let e = source.poll_pull(&mut cx).unwrap_err();
        assert_eq!("first", e.message());
    }
}

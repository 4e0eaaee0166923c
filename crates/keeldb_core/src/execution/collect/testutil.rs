//! Stub sources, recording sinks, and a deferred runtime for testing collect
//! tasks.

use std::task::Context;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use keeldb_error::{DbError, Result};
use parking_lot::{Condvar, Mutex};

use crate::execution::sink::ResultSink;
use crate::execution::source::{BatchSource, PollPull, SourceHandle};
use crate::runtime::TaskRuntime;

/// Source that produces nothing and records the kill causes it receives.
#[derive(Debug, Default)]
pub struct StubSource {
    kills: Mutex<Vec<DbError>>,
}

impl StubSource {
    pub fn kills(&self) -> Vec<DbError> {
        self.kills.lock().clone()
    }
}

impl BatchSource for StubSource {
    fn poll_pull(&self, _cx: &mut Context) -> Result<PollPull> {
        let kills = self.kills.lock();
        match kills.first() {
            Some(cause) => Err(cause.clone()),
            None => Ok(PollPull::Exhausted),
        }
    }

    fn kill(&self, cause: DbError) {
        self.kills.lock().push(cause);
    }
}

/// A single recorded `accept` call.
#[derive(Debug, Clone)]
pub struct RecordedAccept {
    pub source: Option<SourceHandle>,
    pub error: Option<DbError>,
}

/// Sink that records every `accept` call it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    accepts: Mutex<Vec<RecordedAccept>>,
    accepted: Condvar,
}

impl RecordingSink {
    pub fn accepts(&self) -> Vec<RecordedAccept> {
        self.accepts.lock().clone()
    }

    /// Block until at least one `accept` has been recorded.
    ///
    /// Panics on timeout, the caller expects delivery.
    pub fn wait_for_accept(&self, timeout: Duration) -> Vec<RecordedAccept> {
        let deadline = Instant::now() + timeout;
        let mut accepts = self.accepts.lock();
        while accepts.is_empty() {
            if self
                .accepted
                .wait_until(&mut accepts, deadline)
                .timed_out()
            {
                panic!("timed out waiting for sink accept");
            }
        }
        accepts.clone()
    }
}

impl ResultSink for RecordingSink {
    fn accept(&self, source: Option<SourceHandle>, error: Option<DbError>) {
        self.accepts.lock().push(RecordedAccept { source, error });
        self.accepted.notify_all();
    }
}

/// Runtime that holds spawned futures until explicitly run.
///
/// Lets tests interleave kills with source resolution deterministically.
#[derive(Default)]
pub struct DeferredRuntime {
    spawned: Mutex<Vec<BoxFuture<'static, ()>>>,
}

impl std::fmt::Debug for DeferredRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredRuntime")
            .field("spawned", &self.spawned.lock().len())
            .finish()
    }
}

impl DeferredRuntime {
    /// Drive every spawned future to completion.
    pub fn run_all(&self) {
        let spawned: Vec<_> = self.spawned.lock().drain(..).collect();
        for fut in spawned {
            futures::executor::block_on(fut);
        }
    }
}

impl TaskRuntime for DeferredRuntime {
    fn spawn(&self, fut: BoxFuture<'static, ()>) {
        self.spawned.lock().push(fut);
    }
}

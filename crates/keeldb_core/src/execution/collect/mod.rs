//! Bridging between batch sources and the result sink.
//!
//! A collect task connects exactly one source to exactly one sink. The source
//! may be available up front, or only once an asynchronous resolution step
//! completes. Cancellation can arrive at any point from any thread, and the
//! task collapses all of these timelines into a single sink invocation.

mod claim;
mod future;
mod sync;

pub mod testutil;

pub use claim::{ClaimOutcome, SinkClaim};

use std::fmt::Debug;
use std::sync::Arc;

use futures::future::BoxFuture;
use keeldb_error::{DbError, Result};

use self::future::AsyncCollectTask;
use self::sync::SyncCollectTask;
use crate::execution::sink::ResultSink;
use crate::execution::source::SourceHandle;
use crate::runtime::TaskRuntime;

/// A running or to-be-run collection.
///
/// `start` is called once by the scheduler. `kill` may be called zero or more
/// times, from any thread, at any point relative to `start`. Regardless of
/// interleaving, the sink's `accept` is invoked exactly once.
pub trait CollectTask: Debug + Send + Sync {
    /// Begin collection.
    ///
    /// Never blocks the calling thread.
    fn start(&self);

    /// Request cancellation with the given cause.
    fn kill(&self, cause: DbError);
}

/// Future resolving to the source to collect from.
pub type SourceFuture = BoxFuture<'static, Result<SourceHandle>>;

/// Factory producing the source future, invoked exactly once by `start`.
pub type SourceFutureFactory = Box<dyn FnOnce() -> SourceFuture + Send>;

/// Create a collect task for a source that's already available.
pub fn collect_source(source: SourceHandle, sink: Arc<dyn ResultSink>) -> Arc<dyn CollectTask> {
    Arc::new(SyncCollectTask::new(source, sink))
}

/// Create a collect task for a source that becomes available asynchronously.
pub fn collect_source_future(
    factory: SourceFutureFactory,
    sink: Arc<dyn ResultSink>,
    runtime: Arc<dyn TaskRuntime>,
) -> Arc<dyn CollectTask> {
    Arc::new(AsyncCollectTask::new(factory, sink, runtime))
}

use std::fmt;
use std::mem;
use std::sync::Arc;

use keeldb_error::{DbError, Result};
use parking_lot::Mutex;
use tracing::debug;

use super::{CollectTask, SourceFutureFactory};
use crate::execution::sink::ResultSink;
use crate::execution::source::SourceHandle;
use crate::runtime::TaskRuntime;

/// State of an async collect task.
///
/// `Published` means the source has resolved and is being (or has been)
/// handed to the sink. From that point on the source itself is the
/// cancellation channel. `Delivered` means the sink got an error outcome and
/// there is no source to route anything to.
#[derive(Debug)]
pub(crate) enum CollectState {
    Unresolved,
    PendingKill(DbError),
    Published(SourceHandle),
    Delivered,
}

#[derive(Debug)]
pub(crate) enum CollectEvent {
    Resolved(Result<SourceHandle>),
    KillRequested(DbError),
}

/// Action to perform after a state transition, outside the lock.
#[derive(Debug)]
pub(crate) enum SinkAction {
    Accept(Option<SourceHandle>, Option<DbError>),
    ForwardKill(SourceHandle, DbError),
    None,
}

/// Advance the task state with an event.
///
/// Pure; callers hold the state lock across the transition and perform the
/// returned action after releasing it. Encodes the precedence rules: a kill
/// recorded before resolution overrides a late success, while a genuine
/// resolution failure is never masked by a pending cancellation cause.
pub(crate) fn transition(state: CollectState, event: CollectEvent) -> (CollectState, SinkAction) {
    match (state, event) {
        (CollectState::Unresolved, CollectEvent::Resolved(Ok(source))) => {
            let action = SinkAction::Accept(Some(source.clone()), None);
            (CollectState::Published(source), action)
        }
        (CollectState::Unresolved, CollectEvent::Resolved(Err(e))) => {
            (CollectState::Delivered, SinkAction::Accept(None, Some(e)))
        }
        (CollectState::PendingKill(cause), CollectEvent::Resolved(Ok(source))) => (
            CollectState::Delivered,
            SinkAction::Accept(Some(source), Some(cause)),
        ),
        (CollectState::PendingKill(_), CollectEvent::Resolved(Err(e))) => {
            (CollectState::Delivered, SinkAction::Accept(None, Some(e)))
        }
        (CollectState::Unresolved, CollectEvent::KillRequested(cause)) => {
            (CollectState::PendingKill(cause), SinkAction::None)
        }
        // First recorded cause wins.
        (state @ CollectState::PendingKill(_), CollectEvent::KillRequested(_)) => {
            (state, SinkAction::None)
        }
        (CollectState::Published(source), CollectEvent::KillRequested(cause)) => {
            let action = SinkAction::ForwardKill(source.clone(), cause);
            (CollectState::Published(source), action)
        }
        (CollectState::Delivered, CollectEvent::KillRequested(_)) => {
            (CollectState::Delivered, SinkAction::None)
        }
        // The factory is invoked exactly once, a second resolution can't
        // happen.
        (state, CollectEvent::Resolved(_)) => (state, SinkAction::None),
    }
}

/// Collect task for a source that becomes available through a future.
pub struct AsyncCollectTask {
    /// Factory for the source future, consumed on `start`.
    factory: Mutex<Option<SourceFutureFactory>>,
    shared: Arc<TaskShared>,
    runtime: Arc<dyn TaskRuntime>,
}

impl fmt::Debug for AsyncCollectTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncCollectTask")
            .field("shared", &self.shared)
            .field("runtime", &self.runtime)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct TaskShared {
    state: Mutex<CollectState>,
    sink: Arc<dyn ResultSink>,
}

impl TaskShared {
    fn apply(&self, event: CollectEvent) {
        let action = {
            let mut state = self.state.lock();
            let curr = mem::replace(&mut *state, CollectState::Delivered);
            let (next, action) = transition(curr, event);
            *state = next;
            action
        };

        match action {
            SinkAction::Accept(source, error) => self.sink.accept(source, error),
            SinkAction::ForwardKill(source, cause) => source.kill(cause),
            SinkAction::None => (),
        }
    }
}

impl AsyncCollectTask {
    pub fn new(
        factory: SourceFutureFactory,
        sink: Arc<dyn ResultSink>,
        runtime: Arc<dyn TaskRuntime>,
    ) -> Self {
        AsyncCollectTask {
            factory: Mutex::new(Some(factory)),
            shared: Arc::new(TaskShared {
                state: Mutex::new(CollectState::Unresolved),
                sink,
            }),
            runtime,
        }
    }
}

impl CollectTask for AsyncCollectTask {
    fn start(&self) {
        let factory = match self.factory.lock().take() {
            Some(factory) => factory,
            None => return, // Already started.
        };

        let fut = factory();
        let shared = self.shared.clone();

        debug!("spawning source resolution for collect task");
        self.runtime.spawn(Box::pin(async move {
            let result = fut.await;
            shared.apply(CollectEvent::Resolved(result));
        }));
    }

    fn kill(&self, cause: DbError) {
        self.shared.apply(CollectEvent::KillRequested(cause));
    }
}

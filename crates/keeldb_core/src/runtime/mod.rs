use std::fmt::Debug;

use futures::future::BoxFuture;

/// How collect tasks get their source-resolution futures executed.
///
/// This only concerns itself with running type-erased tasks. There will
/// likely only ever be two implementations; one for running natively on a
/// thread pool, and one for wasm.
pub trait TaskRuntime: Debug + Send + Sync {
    /// Spawn execution of a task.
    ///
    /// This must not block.
    fn spawn(&self, fut: BoxFuture<'static, ()>);
}

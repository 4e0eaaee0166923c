use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use keeldb_core::runtime::TaskRuntime;
use keeldb_error::{DbError, Result};
use tracing::debug;

/// Task runtime backed by a multi-threaded tokio runtime.
pub struct NativeRuntime {
    tokio: Arc<tokio::runtime::Runtime>,
}

impl fmt::Debug for NativeRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeRuntime").finish_non_exhaustive()
    }
}

impl NativeRuntime {
    pub fn try_new() -> Result<Self> {
        let tokio = tokio::runtime::Builder::new_multi_thread()
            .thread_name("keeldb_tokio")
            .enable_time()
            .build()
            .map_err(|e| DbError::with_source("Failed to build tokio runtime", Box::new(e)))?;

        debug!("created native task runtime");

        Ok(NativeRuntime {
            tokio: Arc::new(tokio),
        })
    }

    pub fn handle(&self) -> tokio::runtime::Handle {
        self.tokio.handle().clone()
    }
}

impl TaskRuntime for NativeRuntime {
    fn spawn(&self, fut: BoxFuture<'static, ()>) {
        self.tokio.spawn(fut);
    }
}

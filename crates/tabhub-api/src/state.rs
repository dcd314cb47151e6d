use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use tabhub_db::{CancelToken, Database};

use crate::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    /// Upper bound on a single storage round trip.
    pub storage_timeout: Duration,
    /// Largest accepted multipart body, in bytes.
    pub max_upload_bytes: usize,
}

/// Run `f` against the database on the blocking pool, bounded by the
/// configured storage timeout.
///
/// When the bound is hit the work is cancelled and the writer interrupted,
/// then the task is awaited so the reply matches what was persisted: a unit
/// of work that still committed is reported as a success, anything else as
/// a storage timeout.
pub async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let inner = state.clone();
    let token = CancelToken::new();
    let task_token = token.clone();
    let mut task = tokio::task::spawn_blocking(move || {
        let _scope = task_token.enter();
        f(&inner.db)
    });

    let joined = match tokio::time::timeout(state.storage_timeout, &mut task).await {
        Ok(joined) => joined,
        Err(_) => {
            warn!(
                "Storage operation exceeded {} ms, cancelling",
                state.storage_timeout.as_millis()
            );
            token.cancel();
            state.db.interrupt_writer();
            task.await
        }
    };

    joined.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal("Storage task failed".into())
    })?
}

/// Run CPU-bound work on the blocking pool, outside the storage timeout.
pub async fn compute<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal("Background task failed".into())
    })?
}

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::storage::{ScopedSession, Storage};

/// Opens `sessions` sessions concurrently and closes each as soon as it arrives.
///
/// Nothing here is measured; failures are logged and otherwise ignored.
pub(crate) async fn warmup(storage: &Arc<dyn Storage>, sessions: usize) {
    tracing::info!(sessions, backend = storage.name(), "warmup sessions");

    let mut pending = JoinSet::new();
    for _ in 0..sessions {
        let storage = storage.clone();
        pending.spawn(async move { storage.create_session().await.map(ScopedSession::new) });
    }

    while let Some(res) = pending.join_next().await {
        match res {
            Ok(Ok(session)) => session.close(),
            Ok(Err(err)) => tracing::warn!(error = %err, "warmup session failed"),
            Err(err) => tracing::warn!(error = %err, "warmup task failed"),
        }
    }
}

//! Scoped use of a remote session.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use super::RemoteSession;

/// Closes the session when dropped unless it was closed explicitly.
struct SessionGuard {
    session: Option<Arc<dyn RemoteSession>>,
}

impl SessionGuard {
    async fn close(mut self) {
        if let Some(session) = self.session.take() {
            close_logged(session).await;
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        // The owning future was cancelled; finish the close in the background.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(close_logged(session));
            }
            Err(_) => warn!(
                session = session.name(),
                "Remote session dropped outside a runtime, not closed"
            ),
        }
    }
}

async fn close_logged(session: Arc<dyn RemoteSession>) {
    match session.close().await {
        Ok(()) => debug!(session = session.name(), "Remote session closed"),
        Err(e) => warn!(session = session.name(), error = %e, "Failed to close remote session"),
    }
}

/// Run `f` with `session`, closing the session afterwards.
///
/// The session is closed whether `f` succeeds or fails, and also when the
/// returned future is dropped before completion.
pub async fn with_session<F, Fut, T>(session: Arc<dyn RemoteSession>, f: F) -> T
where
    F: FnOnce(Arc<dyn RemoteSession>) -> Fut,
    Fut: Future<Output = T>,
{
    let guard = SessionGuard {
        session: Some(Arc::clone(&session)),
    };
    let result = f(session).await;
    guard.close().await;
    result
}

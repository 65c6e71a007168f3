//! Deferred, session-guarded mutations.

use seedling_core::{PacingConfig, RandomSource, Session, SessionGuard, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Schedules side effects against a shared [`SessionStore`].
///
/// Cheap to clone; every clone schedules onto the same store.
#[derive(Clone)]
pub struct Timeline {
    pub(crate) store: Arc<SessionStore>,
    pub(crate) random: Arc<dyn RandomSource>,
    pub(crate) pacing: PacingConfig,
}

impl Timeline {
    pub fn new(store: Arc<SessionStore>, random: Arc<dyn RandomSource>, pacing: PacingConfig) -> Self {
        Self {
            store,
            random,
            pacing,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn pacing(&self) -> &PacingConfig {
        &self.pacing
    }

    pub fn random(&self) -> &dyn RandomSource {
        self.random.as_ref()
    }

    /// Run `mutation` once, `delay` from now (scaled by the pacing config),
    /// against whatever snapshot is current then.
    ///
    /// Resolves to `false` if the session was reset in the meantime.
    pub fn after<F>(&self, delay: Duration, label: &'static str, mutation: F) -> JoinHandle<bool>
    where
        F: FnMut(&mut Session) + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let guard = store.guard();
        let delay = self.pacing.scale(delay);
        tokio::spawn(async move { fire(&store, guard, delay, label, mutation).await })
    }
}

pub(crate) async fn fire<F>(
    store: &SessionStore,
    guard: SessionGuard,
    delay: Duration,
    label: &'static str,
    mutation: F,
) -> bool
where
    F: FnMut(&mut Session),
{
    tokio::time::sleep(delay).await;
    let applied = store.apply_guarded(guard, mutation).is_some();
    if applied {
        tracing::debug!(timer = label, "Timer applied");
    } else {
        tracing::debug!(timer = label, "Timer fired for a defunct session, ignoring");
    }
    applied
}

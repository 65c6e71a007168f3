//! Session State Store.
//!
//! Readers take an `Arc<Session>` snapshot and never see a half-applied
//! mutation. Writers submit a closure that transforms whatever snapshot is
//! current at commit time; if another writer commits first the closure is
//! replayed against the newer snapshot (compare-and-swap), so two timers that
//! resolve back to back can never overwrite each other's work.
//!
//! Every committed snapshot is also broadcast on a `watch` channel for views,
//! and presentation flags ([`UiState`]) on a second one.

use crate::session::Session;
use arc_swap::ArcSwap;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// Identity of the session a deferred callback was scheduled for.
///
/// After [`SessionStore::reset`] the old guard no longer matches and guarded
/// mutations become no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionGuard(Uuid);

impl SessionGuard {
    /// Guard for the session a snapshot was taken from.
    pub fn of(session: &Session) -> Self {
        SessionGuard(session.id)
    }
}

/// Presentation flags that are not part of the story itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    /// Model round-trips currently in flight.
    pub in_flight: u32,
    pub show_memory_garden: bool,
    pub show_calendar: bool,
    pub show_manifestations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    MemoryGarden,
    Calendar,
    Manifestations,
}

impl UiState {
    /// The typing indicator shows while any model call is outstanding.
    pub fn is_typing(&self) -> bool {
        self.in_flight > 0
    }

    /// Flip an overlay; returns whether it is now visible.
    pub fn toggle(&mut self, overlay: Overlay) -> bool {
        let flag = match overlay {
            Overlay::MemoryGarden => &mut self.show_memory_garden,
            Overlay::Calendar => &mut self.show_calendar,
            Overlay::Manifestations => &mut self.show_manifestations,
        };
        *flag = !*flag;
        *flag
    }
}

pub struct SessionStore {
    session: ArcSwap<Session>,
    ui: ArcSwap<UiState>,
    watch_tx: watch::Sender<Arc<Session>>,
    ui_tx: watch::Sender<UiState>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_session(Session::new())
    }

    pub fn with_session(session: Session) -> Self {
        let session = Arc::new(session);
        let (watch_tx, _) = watch::channel(Arc::clone(&session));
        let (ui_tx, _) = watch::channel(UiState::default());
        Self {
            session: ArcSwap::new(session),
            ui: ArcSwap::from_pointee(UiState::default()),
            watch_tx,
            ui_tx,
        }
    }

    /// Consistent read of the latest committed session.
    pub fn snapshot(&self) -> Arc<Session> {
        self.session.load_full()
    }

    pub fn ui(&self) -> UiState {
        **self.ui.load()
    }

    pub fn guard(&self) -> SessionGuard {
        SessionGuard(self.session.load().id)
    }

    pub fn is_current(&self, guard: SessionGuard) -> bool {
        self.session.load().id == guard.0
    }

    /// Receive every committed snapshot, starting with the current one.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Session>> {
        self.watch_tx.subscribe()
    }

    /// Receive every change to the presentation flags.
    pub fn subscribe_ui(&self) -> watch::Receiver<UiState> {
        self.ui_tx.subscribe()
    }

    /// Apply `mutation` to the latest snapshot and commit atomically.
    ///
    /// The closure may run more than once when a concurrent commit wins the
    /// race; only the value from the committed run is returned.
    pub fn apply<R, F>(&self, mutation: F) -> R
    where
        F: FnMut(&mut Session) -> R,
    {
        let outcome = commit(&self.session, mutation);
        self.publish();
        outcome
    }

    /// Like [`apply`](Self::apply), but a mutation that returns `Err` is
    /// discarded instead of committed.
    pub fn try_apply<T, E, F>(&self, mutation: F) -> Result<T, E>
    where
        F: FnMut(&mut Session) -> Result<T, E>,
    {
        let value = try_commit(&self.session, mutation)?;
        self.publish();
        Ok(value)
    }

    /// Like [`apply`](Self::apply), but only if the session is still the one
    /// `guard` was taken from. Returns `None` for a stale callback.
    pub fn apply_guarded<R, F>(&self, guard: SessionGuard, mut mutation: F) -> Option<R>
    where
        F: FnMut(&mut Session) -> R,
    {
        let committed = try_commit(&self.session, |s| {
            if s.id != guard.0 {
                return Err(s.id);
            }
            Ok(mutation(s))
        });
        match committed {
            Ok(outcome) => {
                self.publish();
                Some(outcome)
            }
            Err(current) => {
                tracing::debug!(
                    stale = %guard.0,
                    %current,
                    "Dropping mutation for a defunct session"
                );
                None
            }
        }
    }

    pub fn update_ui<R, F>(&self, mutation: F) -> R
    where
        F: FnMut(&mut UiState) -> R,
    {
        let outcome = commit(&self.ui, mutation);
        self.publish_ui();
        outcome
    }

    /// Count a model call as in flight until the returned guard drops.
    pub fn begin_typing(&self) -> TypingGuard<'_> {
        self.update_ui(|ui| ui.in_flight += 1);
        TypingGuard { store: self }
    }

    /// Like [`begin_typing`](Self::begin_typing), but only when no other
    /// call is in flight.
    pub fn try_begin_typing(&self) -> Option<TypingGuard<'_>> {
        let started = try_commit(&self.ui, |ui| {
            if ui.is_typing() {
                return Err(());
            }
            ui.in_flight = 1;
            Ok(())
        });
        started.ok().map(|()| {
            self.publish_ui();
            TypingGuard { store: self }
        })
    }

    /// Discard the session and start over under a new identity.
    pub fn reset(&self) -> SessionGuard {
        let fresh = Session::new();
        let guard = SessionGuard(fresh.id);
        self.session.store(Arc::new(fresh));
        // Calls already in flight still return (and get dropped as stale).
        self.update_ui(|ui| {
            *ui = UiState {
                in_flight: ui.in_flight,
                ..UiState::default()
            }
        });
        self.publish();
        tracing::info!(session = %guard.0, "Session reset");
        guard
    }

    fn publish(&self) {
        self.watch_tx.send_replace(self.session.load_full());
    }

    fn publish_ui(&self) {
        self.ui_tx.send_if_modified(|seen| {
            let latest = **self.ui.load();
            let changed = *seen != latest;
            *seen = latest;
            changed
        });
    }
}

/// Holds the typing indicator up for one model call.
#[must_use = "the call stops counting as in flight when the guard drops"]
pub struct TypingGuard<'a> {
    store: &'a SessionStore,
}

impl Drop for TypingGuard<'_> {
    fn drop(&mut self) {
        self.store
            .update_ui(|ui| ui.in_flight = ui.in_flight.saturating_sub(1));
    }
}

fn commit<T, R, F>(slot: &ArcSwap<T>, mut mutation: F) -> R
where
    T: Clone,
    F: FnMut(&mut T) -> R,
{
    match try_commit(slot, |value| Ok::<R, Infallible>(mutation(value))) {
        Ok(outcome) => outcome,
        Err(never) => match never {},
    }
}

/// Compare-and-swap loop: clone the latest value, mutate, and retry against
/// the newer value if someone else committed in between. An `Err` from the
/// mutation leaves the slot untouched.
fn try_commit<T, R, E, F>(slot: &ArcSwap<T>, mut mutation: F) -> Result<R, E>
where
    T: Clone,
    F: FnMut(&mut T) -> Result<R, E>,
{
    let mut current = slot.load_full();
    loop {
        let mut next = T::clone(&current);
        let outcome = mutation(&mut next)?;
        let prev = slot.compare_and_swap(&current, Arc::new(next));
        if Arc::ptr_eq(&*prev, &current) {
            return Ok(outcome);
        }
        current = arc_swap::Guard::into_inner(prev);
    }
}

//! Volume ducking state machine
//!
//! Converts the stream of duck/unduck signals from the assistant's speech
//! and listening activity into at most one `duck()` and one `restore()`
//! call per quiet interval. The restore is debounced: it only fires after a
//! grace interval with no intervening duck, so rapid signal bursts (two
//! consecutive short utterances) do not thrash the volume.
//!
//! The delayed restore is a cancellable tokio task keyed to the current
//! duck epoch; a new duck signal invalidates the previous epoch's task. The
//! signal handlers themselves never block.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::error::Result;
use crate::session::PlaybackSession;

/// External device-level duck mechanism (mixer/sink control).
///
/// Both operations are best-effort: failures are logged and swallowed,
/// never propagated, because ducking must not block playback control. The
/// mechanism may mute system audio sources unrelated to the managed
/// session, which is why the orchestrator invokes it independently of
/// session presence.
pub trait VolumeDucker: Send + Sync {
    fn duck(&self) -> Result<()>;
    fn restore(&self) -> Result<()>;
}

/// Ducking state. Lives for the process lifetime; no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuckState {
    Normal,
    Ducked,
}

/// Debounced duck/restore controller.
///
/// State lives behind an inner `Arc` so the scheduled restore task can
/// outlive the handler call that spawned it.
pub struct DuckController {
    inner: Arc<Inner>,
}

struct Inner {
    session: Arc<PlaybackSession>,
    /// External mechanism; absent when the platform provides none.
    ducker: Option<Arc<dyn VolumeDucker>>,
    grace: Duration,
    /// Bumped on every duck signal; a scheduled restore only fires if the
    /// epoch it captured is still current.
    epoch: AtomicU64,
    state: Mutex<DuckState>,
    restore_task: Mutex<Option<JoinHandle<()>>>,
}

impl DuckController {
    pub fn new(
        session: Arc<PlaybackSession>,
        ducker: Option<Arc<dyn VolumeDucker>>,
        grace: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                session,
                ducker,
                grace,
                epoch: AtomicU64::new(0),
                state: Mutex::new(DuckState::Normal),
                restore_task: Mutex::new(None),
            }),
        }
    }

    /// Current state, for observability.
    pub fn state(&self) -> DuckState {
        *self.inner.lock_state()
    }

    /// Grace interval before a restore is issued.
    pub fn grace(&self) -> Duration {
        self.inner.grace
    }

    /// The assistant started speaking or listening.
    ///
    /// Supersedes any pending restore. On the Normal to Ducked transition,
    /// lowers the session volume (if a session is active) and invokes the
    /// external `duck()`; while already ducked the signal only cancels the
    /// pending restore, so a quiet interval sees at most one duck pair.
    pub fn on_duck_signal(&self) {
        let inner = &self.inner;

        // The epoch bump must happen under the state lock: a restore task
        // past its sleep re-checks the epoch under the same lock, so it
        // either observes the bump and aborts, or completes first and this
        // signal re-ducks from Normal. Bumping outside the lock opens a
        // window where both the duck and the restore go through.
        let mut state = inner.lock_state();
        inner.epoch.fetch_add(1, Ordering::SeqCst);
        inner.cancel_pending_restore();
        if inner.session.current_backend().is_some() {
            inner.session.set_volume_low(true);
        }
        if *state == DuckState::Ducked {
            debug!("duck signal while ducked, pending restore superseded");
            return;
        }

        if let Some(backend) = inner.session.current_backend() {
            debug!(backend = backend.name(), "lowering session volume");
            if let Err(e) = backend.lower_volume() {
                error!(backend = backend.name(), error = %e, "lower volume failed");
            }
        }
        if let Some(ducker) = &inner.ducker {
            if let Err(e) = ducker.duck() {
                error!(error = %e, "external duck failed");
            }
        }
        *state = DuckState::Ducked;
    }

    /// The assistant stopped speaking or listening.
    ///
    /// Optimistically marks the volume as restorable and schedules the
    /// actual restore after the grace interval. A duck signal arriving
    /// before the interval elapses cancels the scheduled restore. Never
    /// blocks the caller.
    pub fn on_unduck_signal(&self) {
        self.inner.session.set_volume_low(false);

        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(inner.grace).await;
            inner.finish_restore(epoch);
        });

        if let Some(previous) = self.inner.lock_restore_task().replace(handle) {
            previous.abort();
        }
    }
}

impl Inner {
    /// Runs when the grace interval elapsed without cancellation.
    ///
    /// All checks happen under the state lock; see `on_duck_signal` for the
    /// ordering contract with concurrent duck signals.
    fn finish_restore(&self, epoch: u64) {
        let mut state = self.lock_state();
        if self.epoch.load(Ordering::SeqCst) != epoch {
            // A duck signal superseded this restore.
            return;
        }
        if self.session.volume_is_low() {
            return;
        }
        if *state != DuckState::Ducked {
            return;
        }

        if let Some(backend) = self.session.current_backend() {
            debug!(backend = backend.name(), "restoring session volume");
            if let Err(e) = backend.restore_volume() {
                error!(backend = backend.name(), error = %e, "restore volume failed");
            }
        }
        if let Some(ducker) = &self.ducker {
            if let Err(e) = ducker.restore() {
                error!(error = %e, "external restore failed");
            }
        }
        *state = DuckState::Normal;
    }

    fn cancel_pending_restore(&self) {
        if let Some(handle) = self.lock_restore_task().take() {
            handle.abort();
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, DuckState> {
        self.state.lock().expect("duck state mutex poisoned")
    }

    fn lock_restore_task(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.restore_task.lock().expect("restore task mutex poisoned")
    }
}

//! Playback session
//!
//! Owns the reference to the one active backend and the playlist
//! mutation/selection logic. At most one backend is active at any instant;
//! a new `play` always stops the previous session first.
//!
//! # Locking
//!
//! `stop()` is the single critical section: read current, call the
//! backend's stop, emit the acknowledgement, and clear current, all under
//! the session mutex. `play()` calls `stop()` but performs its selection and
//! assignment outside that lock, so a concurrent stop can observe a session
//! that play is still constructing. Callers needing strict atomicity must
//! serialize command delivery externally.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::backend::{AudioBackend, TrackInfo};
use crate::events::{AudioEvent, EventBus};
use crate::registry::BackendRegistry;

/// The single active playback session.
pub struct PlaybackSession {
    registry: Arc<BackendRegistry>,
    bus: Arc<EventBus>,
    current: Mutex<Option<Arc<dyn AudioBackend>>>,
    volume_is_low: AtomicBool,
}

/// Scheme of a track reference: the substring preceding the first `:`.
/// A reference without a colon yields the whole string.
fn uri_scheme(track: &str) -> &str {
    track.split(':').next().unwrap_or("")
}

impl PlaybackSession {
    /// Create an empty session.
    pub fn new(registry: Arc<BackendRegistry>, bus: Arc<EventBus>) -> Self {
        Self {
            registry,
            bus,
            current: Mutex::new(None),
            volume_is_low: AtomicBool::new(false),
        }
    }

    /// Start playback of `tracks`, replacing any active session.
    ///
    /// Selection precedence, first match wins:
    /// 1. `preferred`, if it supports the scheme of `tracks[0]`
    /// 2. the configured default backend
    /// 3. first backend in registration order supporting the scheme
    ///
    /// No capable backend leaves the session empty (logged, not an error).
    pub fn play(&self, tracks: &[String], preferred: Option<Arc<dyn AudioBackend>>) {
        let Some(first) = tracks.first() else {
            warn!("play request with no tracks, ignoring");
            return;
        };

        // Guarantee the single-session invariant before selecting.
        self.stop();

        let scheme = uri_scheme(first);
        let Some(selected) = self.select_backend(scheme, preferred) else {
            info!(scheme, "no backend found for scheme");
            return;
        };

        if let Err(e) = selected.clear_list() {
            error!(backend = selected.name(), error = %e, "clear_list failed");
            return;
        }
        if let Err(e) = selected.add_list(tracks) {
            error!(backend = selected.name(), error = %e, "add_list failed");
            return;
        }
        if let Err(e) = selected.play() {
            error!(backend = selected.name(), error = %e, "play failed");
            return;
        }

        debug!(backend = selected.name(), scheme, "session started");
        *self.lock_current() = Some(selected);
    }

    fn select_backend(
        &self,
        scheme: &str,
        preferred: Option<Arc<dyn AudioBackend>>,
    ) -> Option<Arc<dyn AudioBackend>> {
        if let Some(preferred) = preferred {
            if preferred.supports_scheme(scheme) {
                debug!(backend = preferred.name(), "using preferred backend");
                return Some(preferred);
            }
        }
        if let Some(default) = self.registry.default_backend() {
            if default.supports_scheme(scheme) {
                debug!(backend = default.name(), "using default backend");
                return Some(Arc::clone(default));
            }
        }
        debug!(scheme, "searching registered backends");
        self.registry.find_capable(scheme, None)
    }

    /// Append tracks to the active session, or start one if none exists.
    pub fn queue(&self, tracks: &[String]) {
        if let Some(backend) = self.current_backend() {
            debug!(backend = backend.name(), count = tracks.len(), "queueing tracks");
            if let Err(e) = backend.add_list(tracks) {
                error!(backend = backend.name(), error = %e, "add_list failed");
            }
        } else {
            self.play(tracks, None);
        }
    }

    /// Stop the active session, if any.
    ///
    /// Emits `StopHandled` iff the backend's stop returned true. The session
    /// reference is cleared regardless of the backend's answer: forward
    /// progress is preferred over strict stop correctness. Idempotent.
    pub fn stop(&self) {
        let mut current = self.lock_current();
        let Some(backend) = current.take() else {
            return;
        };

        debug!(backend = backend.name(), "stopping active session");
        match backend.stop() {
            Ok(true) => {
                self.bus.emit_lossy(AudioEvent::StopHandled {
                    by: format!("audio:{}", backend.name()),
                    timestamp: Utc::now(),
                });
            }
            Ok(false) => {}
            Err(e) => {
                error!(backend = backend.name(), error = %e, "backend stop failed");
            }
        }
    }

    /// Pause the active session. No-op when empty.
    pub fn pause(&self) {
        if let Some(backend) = self.current_backend() {
            if let Err(e) = backend.pause() {
                error!(backend = backend.name(), error = %e, "pause failed");
            }
        }
    }

    /// Resume the active session. No-op when empty.
    pub fn resume(&self) {
        if let Some(backend) = self.current_backend() {
            if let Err(e) = backend.resume() {
                error!(backend = backend.name(), error = %e, "resume failed");
            }
        }
    }

    /// Skip to the next track. No-op when empty.
    pub fn next(&self) {
        if let Some(backend) = self.current_backend() {
            if let Err(e) = backend.next() {
                error!(backend = backend.name(), error = %e, "next failed");
            }
        }
    }

    /// Return to the previous track. No-op when empty.
    pub fn previous(&self) {
        if let Some(backend) = self.current_backend() {
            if let Err(e) = backend.previous() {
                error!(backend = backend.name(), error = %e, "previous failed");
            }
        }
    }

    /// Metadata of the current track, or an empty map with no session.
    pub fn track_info(&self) -> TrackInfo {
        self.current_backend()
            .map(|backend| backend.track_info())
            .unwrap_or_default()
    }

    /// Called by the active backend when it begins a track; re-emitted
    /// upward unchanged.
    pub fn on_track_start(&self, track: &str) {
        self.bus.emit_lossy(AudioEvent::PlayingTrack {
            track: track.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Best-effort sequential teardown of every registered backend.
    ///
    /// A failing backend is logged and does not prevent shutting down the
    /// rest. Clears the session.
    pub fn shutdown(&self) {
        for backend in self.registry.backends() {
            info!(backend = backend.name(), "shutting down backend");
            if let Err(e) = backend.shutdown() {
                error!(backend = backend.name(), error = %e, "backend shutdown failed");
            }
        }
        self.lock_current().take();
    }

    /// The active backend, if any. Fast path: clones the reference under a
    /// brief lock, delegation happens outside it.
    pub fn current_backend(&self) -> Option<Arc<dyn AudioBackend>> {
        self.lock_current().clone()
    }

    /// True while the session volume is ducked.
    pub fn volume_is_low(&self) -> bool {
        self.volume_is_low.load(Ordering::SeqCst)
    }

    pub(crate) fn set_volume_low(&self, low: bool) {
        self.volume_is_low.store(low, Ordering::SeqCst);
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Option<Arc<dyn AudioBackend>>> {
        self.current.lock().expect("session mutex poisoned")
    }
}

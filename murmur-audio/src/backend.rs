//! Playback backend capability contract
//!
//! Backends are pluggable playback implementations (local player, streaming
//! client, cast target, ...) registered with the orchestrator at startup.
//! Discovery and construction happen behind that registration boundary and
//! are not this crate's concern.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;

/// Opaque track metadata reported by a backend.
///
/// Passed through to `track_info_reply` notifications unmodified.
pub type TrackInfo = HashMap<String, String>;

/// Callback a backend invokes when it begins playing a track.
///
/// Must not block; the orchestrator re-emits the track identifier as a
/// `playing_track` notification. Only the backend owning the active session
/// may fire this (superseded backends must stop calling it).
pub type TrackStartCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Capability set every playback backend must implement.
///
/// All operations take `&self`; backends manage their own interior state.
/// Fallible operations return [`crate::Result`]; the orchestrator logs
/// failures and never surfaces them to the event interface.
pub trait AudioBackend: Send + Sync {
    /// Stable backend name, used for default resolution and utterance
    /// matching.
    fn name(&self) -> &str;

    /// URI schemes this backend can play (e.g. `file`, `http`).
    fn supported_schemes(&self) -> &[String];

    /// True if `scheme` is in the supported set.
    fn supports_scheme(&self, scheme: &str) -> bool {
        self.supported_schemes().iter().any(|s| s == scheme)
    }

    /// Start playing the current track list.
    fn play(&self) -> Result<()>;

    /// Pause playback.
    fn pause(&self) -> Result<()>;

    /// Resume paused playback.
    fn resume(&self) -> Result<()>;

    /// Skip to the next track.
    fn next(&self) -> Result<()>;

    /// Return to the previous track.
    fn previous(&self) -> Result<()>;

    /// Stop playback. Returns `Ok(true)` if the backend actually handled
    /// the stop (something was playing), `Ok(false)` otherwise.
    fn stop(&self) -> Result<bool>;

    /// Clear the backend's track list.
    fn clear_list(&self) -> Result<()>;

    /// Append tracks to the backend's track list.
    fn add_list(&self, tracks: &[String]) -> Result<()>;

    /// Metadata for the currently playing track.
    fn track_info(&self) -> TrackInfo;

    /// Install (or clear) the track-start callback.
    fn set_track_start_callback(&self, callback: Option<TrackStartCallback>);

    /// Transiently reduce playback volume (ducking).
    fn lower_volume(&self) -> Result<()>;

    /// Restore volume after a duck.
    fn restore_volume(&self) -> Result<()>;

    /// Release all resources. Called once at orchestrator shutdown.
    fn shutdown(&self) -> Result<()>;
}

//! Event surface for the audio orchestrator
//!
//! # Architecture
//!
//! Murmur uses hybrid communication:
//! - **Command channel** (tokio::mpsc): inbound commands, single handler
//!   ([`crate::service::AudioService`])
//! - **EventBus** (tokio::broadcast): outbound notifications, one-to-many
//!
//! Both enums are serde-tagged so the transport layer can map them onto its
//! wire topics; the orchestrator itself never serializes anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::backend::TrackInfo;

/// Inbound commands from the platform.
///
/// The two duck topics ("speech output starting" / "listening starting")
/// both map to [`AudioCommand::DuckBegin`] at the transport boundary, and
/// their counterparts to [`AudioCommand::DuckEnd`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AudioCommand {
    /// Start playback of a track list, replacing any active session.
    Play {
        tracks: Vec<String>,
        /// Raw user utterance; a backend named in it is preferred.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        utterance: Option<String>,
    },
    /// Append tracks to the active session, or start one if none exists.
    Queue { tracks: Vec<String> },
    Pause,
    Resume,
    Next,
    Previous,
    Stop,
    /// Request a `track_info_reply` notification.
    TrackInfo,
    /// The assistant started speaking or listening.
    DuckBegin,
    /// The assistant stopped speaking or listening.
    DuckEnd,
}

/// Outbound notifications to the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AudioEvent {
    /// A backend began playing a track.
    PlayingTrack {
        track: String,
        timestamp: DateTime<Utc>,
    },

    /// A stop command was handled by the named backend.
    ///
    /// Emitted only when the backend's `stop()` returned true.
    StopHandled {
        /// `"audio:<backend name>"`
        by: String,
        timestamp: DateTime<Utc>,
    },

    /// Reply to a track info request (empty map if no active session).
    TrackInfoReply {
        info: TrackInfo,
        timestamp: DateTime<Utc>,
    },
}

/// Broadcast bus for outbound notifications.
///
/// Thin wrapper over `tokio::sync::broadcast`: subscribers receive every
/// event emitted after they subscribe; slow subscribers lag and drop the
/// oldest events rather than block the orchestrator.
pub struct EventBus {
    tx: broadcast::Sender<AudioEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<AudioEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers.
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: AudioEvent,
    ) -> std::result::Result<usize, broadcast::error::SendError<AudioEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, silently dropping it if nobody is listening.
    ///
    /// The orchestrator uses this for all notifications: a platform without
    /// listeners is valid, not an error.
    pub fn emit_lossy(&self, event: AudioEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_eventbus_new() {
        let bus = EventBus::new(100);
        assert_eq!(bus.capacity(), 100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_eventbus_subscribe() {
        let bus = EventBus::new(100);
        let _rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_eventbus_emit_no_subscribers() {
        let bus = EventBus::new(100);
        let event = AudioEvent::PlayingTrack {
            track: "file:///music/a.mp3".to_string(),
            timestamp: chrono::Utc::now(),
        };

        // Should return error when no subscribers
        assert!(bus.emit(event).is_err());
    }

    #[tokio::test]
    async fn test_eventbus_emit_with_subscriber() {
        let bus = Arc::new(EventBus::new(100));
        let mut rx = bus.subscribe();

        let event = AudioEvent::StopHandled {
            by: "audio:vlc".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert!(bus.emit(event).is_ok());

        let received = rx.recv().await.unwrap();
        match received {
            AudioEvent::StopHandled { by, .. } => assert_eq!(by, "audio:vlc"),
            _ => panic!("Wrong event type received"),
        }
    }

    #[tokio::test]
    async fn test_eventbus_emit_lossy() {
        let bus = EventBus::new(100);
        let event = AudioEvent::TrackInfoReply {
            info: TrackInfo::new(),
            timestamp: chrono::Utc::now(),
        };

        // Should not panic even without subscribers
        bus.emit_lossy(event);
    }

    #[test]
    fn test_command_wire_tag() {
        let cmd = AudioCommand::Play {
            tracks: vec!["http://example.com/x.mp3".to_string()],
            utterance: None,
        };
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["type"], "play");
        assert!(value.get("utterance").is_none());

        let value = serde_json::to_value(&AudioCommand::TrackInfo).unwrap();
        assert_eq!(value["type"], "track_info");
    }

    #[test]
    fn test_command_roundtrip() {
        let json = r#"{"type":"queue","tracks":["file:///a.ogg"]}"#;
        let cmd: AudioCommand = serde_json::from_str(json).unwrap();
        match cmd {
            AudioCommand::Queue { tracks } => assert_eq!(tracks, vec!["file:///a.ogg"]),
            _ => panic!("Wrong command parsed"),
        }
    }
}

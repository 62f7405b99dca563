//! Audio service: event router and composition point
//!
//! Maps inbound commands onto the session and the duck controller, and
//! replies on the notification bus. This is deliberately thin: all
//! invariants live in [`PlaybackSession`] and [`DuckController`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::AudioConfig;
use crate::ducking::{DuckController, VolumeDucker};
use crate::events::{AudioCommand, AudioEvent, EventBus};
use crate::registry::BackendRegistry;
use crate::session::PlaybackSession;

/// The composed orchestration service.
pub struct AudioService {
    registry: Arc<BackendRegistry>,
    session: Arc<PlaybackSession>,
    ducking: Arc<DuckController>,
    bus: Arc<EventBus>,
}

impl AudioService {
    /// Compose the service: build the session, wire every backend's
    /// track-start callback to it, and set up the duck controller.
    pub fn new(
        registry: Arc<BackendRegistry>,
        bus: Arc<EventBus>,
        config: &AudioConfig,
        ducker: Option<Arc<dyn VolumeDucker>>,
    ) -> Arc<Self> {
        let session = Arc::new(PlaybackSession::new(
            Arc::clone(&registry),
            Arc::clone(&bus),
        ));

        for backend in registry.backends() {
            let session_for_backend = Arc::clone(&session);
            backend.set_track_start_callback(Some(Arc::new(move |track: &str| {
                session_for_backend.on_track_start(track);
            })));
        }

        let ducking = Arc::new(DuckController::new(
            Arc::clone(&session),
            ducker,
            Duration::from_millis(config.duck_grace_ms),
        ));

        Arc::new(Self {
            registry,
            session,
            ducking,
            bus,
        })
    }

    /// Dispatch a single command.
    ///
    /// Must run inside a tokio runtime: `DuckEnd` schedules the delayed
    /// restore as a spawned task.
    pub fn handle_command(&self, command: AudioCommand) {
        debug!(?command, "audio command received");
        match command {
            AudioCommand::Play { tracks, utterance } => {
                let preferred = utterance
                    .as_deref()
                    .and_then(|u| self.registry.preferred_for_utterance(u));
                if let Some(backend) = &preferred {
                    debug!(backend = backend.name(), "backend preferred by utterance");
                }
                self.session.play(&tracks, preferred);
            }
            AudioCommand::Queue { tracks } => self.session.queue(&tracks),
            AudioCommand::Pause => self.session.pause(),
            AudioCommand::Resume => self.session.resume(),
            AudioCommand::Next => self.session.next(),
            AudioCommand::Previous => self.session.previous(),
            AudioCommand::Stop => self.session.stop(),
            AudioCommand::TrackInfo => {
                self.bus.emit_lossy(AudioEvent::TrackInfoReply {
                    info: self.session.track_info(),
                    timestamp: Utc::now(),
                });
            }
            AudioCommand::DuckBegin => self.ducking.on_duck_signal(),
            AudioCommand::DuckEnd => self.ducking.on_unduck_signal(),
        }
    }

    /// Drain the command channel until every sender is dropped.
    pub async fn run(self: Arc<Self>, mut commands: mpsc::Receiver<AudioCommand>) {
        info!("audio service command loop started");
        while let Some(command) = commands.recv().await {
            self.handle_command(command);
        }
        info!("audio service command loop stopped");
    }

    /// Release every backend; see [`PlaybackSession::shutdown`].
    pub fn shutdown(&self) {
        info!("shutting down audio service");
        self.session.shutdown();
    }

    pub fn session(&self) -> &Arc<PlaybackSession> {
        &self.session
    }

    pub fn ducking(&self) -> &Arc<DuckController> {
        &self.ducking
    }
}

//! Test doubles for exercising the orchestrator without real backends.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use murmur_audio::backend::{AudioBackend, TrackInfo, TrackStartCallback};
use murmur_audio::ducking::VolumeDucker;
use murmur_audio::{Error, Result};

/// Backend that records every call it receives.
///
/// `add_list` calls are recorded as `"add_list:<track>,<track>,..."`; all
/// other operations as their bare name.
pub struct RecordingBackend {
    name: String,
    schemes: Vec<String>,
    calls: Mutex<Vec<String>>,
    stop_result: AtomicBool,
    fail_shutdown: AtomicBool,
    info: Mutex<TrackInfo>,
    callback: Mutex<Option<TrackStartCallback>>,
}

impl RecordingBackend {
    pub fn new(name: &str, schemes: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            schemes: schemes.iter().map(|s| s.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
            stop_result: AtomicBool::new(true),
            fail_shutdown: AtomicBool::new(false),
            info: Mutex::new(TrackInfo::new()),
            callback: Mutex::new(None),
        })
    }

    /// Make `stop()` report that nothing was handled.
    pub fn set_stop_result(&self, handled: bool) {
        self.stop_result.store(handled, Ordering::SeqCst);
    }

    /// Make `shutdown()` fail.
    pub fn set_fail_shutdown(&self, fail: bool) {
        self.fail_shutdown.store(fail, Ordering::SeqCst);
    }

    pub fn set_track_info(&self, key: &str, value: &str) {
        self.info
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    /// Snapshot of recorded calls, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls to the named operation.
    pub fn call_count(&self, name: &str) -> usize {
        let prefix = format!("{name}:");
        self.calls()
            .iter()
            .filter(|c| c.as_str() == name || c.starts_with(&prefix))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Simulate the backend starting a track.
    pub fn fire_track_start(&self, track: &str) {
        let callback = self.callback.lock().unwrap().clone();
        if let Some(callback) = callback {
            callback(track);
        }
    }

    pub fn has_track_start_callback(&self) -> bool {
        self.callback.lock().unwrap().is_some()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl AudioBackend for RecordingBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_schemes(&self) -> &[String] {
        &self.schemes
    }

    fn play(&self) -> Result<()> {
        self.record("play".into());
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        self.record("pause".into());
        Ok(())
    }

    fn resume(&self) -> Result<()> {
        self.record("resume".into());
        Ok(())
    }

    fn next(&self) -> Result<()> {
        self.record("next".into());
        Ok(())
    }

    fn previous(&self) -> Result<()> {
        self.record("previous".into());
        Ok(())
    }

    fn stop(&self) -> Result<bool> {
        self.record("stop".into());
        Ok(self.stop_result.load(Ordering::SeqCst))
    }

    fn clear_list(&self) -> Result<()> {
        self.record("clear_list".into());
        Ok(())
    }

    fn add_list(&self, tracks: &[String]) -> Result<()> {
        self.record(format!("add_list:{}", tracks.join(",")));
        Ok(())
    }

    fn track_info(&self) -> TrackInfo {
        self.info.lock().unwrap().clone()
    }

    fn set_track_start_callback(&self, callback: Option<TrackStartCallback>) {
        *self.callback.lock().unwrap() = callback;
    }

    fn lower_volume(&self) -> Result<()> {
        self.record("lower_volume".into());
        Ok(())
    }

    fn restore_volume(&self) -> Result<()> {
        self.record("restore_volume".into());
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        self.record("shutdown".into());
        if self.fail_shutdown.load(Ordering::SeqCst) {
            Err(Error::Backend(format!("{} refused to shut down", self.name)))
        } else {
            Ok(())
        }
    }
}

/// External ducker that counts duck/restore invocations.
#[derive(Default)]
pub struct RecordingDucker {
    ducks: AtomicUsize,
    restores: AtomicUsize,
    fail: AtomicBool,
}

impl RecordingDucker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make both operations fail (the controller must swallow this).
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn duck_count(&self) -> usize {
        self.ducks.load(Ordering::SeqCst)
    }

    pub fn restore_count(&self) -> usize {
        self.restores.load(Ordering::SeqCst)
    }
}

impl VolumeDucker for RecordingDucker {
    fn duck(&self) -> Result<()> {
        self.ducks.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Err(Error::Ducking("sink control unavailable".into()))
        } else {
            Ok(())
        }
    }

    fn restore(&self) -> Result<()> {
        self.restores.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Err(Error::Ducking("sink control unavailable".into()))
        } else {
            Ok(())
        }
    }
}

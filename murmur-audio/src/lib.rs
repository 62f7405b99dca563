//! # Murmur Audio Orchestrator (murmur-audio)
//!
//! Playback session orchestration and volume ducking for the Murmur voice
//! assistant.
//!
//! **Purpose:** Select among pluggable playback backends, own the single
//! active playback session, and debounce duck/restore around the assistant's
//! own speech and listening activity.
//!
//! **Architecture:** Event-driven service over tokio. Commands arrive on an
//! mpsc channel (one handler), notifications fan out through a broadcast
//! [`events::EventBus`]. Audio decoding and output are delegated entirely to
//! registered [`backend::AudioBackend`] implementations; this crate never
//! touches a device.

pub mod backend;
pub mod config;
pub mod ducking;
pub mod error;
pub mod events;
pub mod registry;
pub mod service;
pub mod session;

pub use error::{Error, Result};

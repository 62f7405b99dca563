//! Backend registry
//!
//! Holds the ordered set of registered backends. Registration order is the
//! fallback search order and is fixed for the process lifetime; the registry
//! is read-only after construction. "Not found" is a normal `None`, never an
//! error.

use std::sync::Arc;

use tracing::info;

use crate::backend::AudioBackend;

/// Ordered set of registered playback backends plus the resolved default.
pub struct BackendRegistry {
    backends: Vec<Arc<dyn AudioBackend>>,
    default: Option<Arc<dyn AudioBackend>>,
}

impl BackendRegistry {
    /// Build a registry from backends in registration order.
    ///
    /// The default backend is resolved once, by first exact name match
    /// against `default_name`; no match leaves it unset (not an error).
    pub fn new(backends: Vec<Arc<dyn AudioBackend>>, default_name: Option<&str>) -> Self {
        let default = default_name
            .and_then(|name| backends.iter().find(|b| b.name() == name))
            .cloned();

        match &default {
            Some(backend) => info!(backend = backend.name(), "default backend resolved"),
            None => info!("no default backend found"),
        }

        Self { backends, default }
    }

    /// All backends in registration order.
    pub fn backends(&self) -> &[Arc<dyn AudioBackend>] {
        &self.backends
    }

    /// The configured default backend, if its name matched at construction.
    pub fn default_backend(&self) -> Option<&Arc<dyn AudioBackend>> {
        self.default.as_ref()
    }

    /// First backend in registration order supporting `scheme`, skipping a
    /// backend named `excluding` if given.
    pub fn find_capable(
        &self,
        scheme: &str,
        excluding: Option<&str>,
    ) -> Option<Arc<dyn AudioBackend>> {
        self.backends
            .iter()
            .filter(|b| excluding != Some(b.name()))
            .find(|b| b.supports_scheme(scheme))
            .cloned()
    }

    /// First backend with an exact name match.
    pub fn find_by_name(&self, name: &str) -> Option<Arc<dyn AudioBackend>> {
        self.backends.iter().find(|b| b.name() == name).cloned()
    }

    /// First backend whose name occurs in the user's utterance.
    ///
    /// Used to honor requests like "play X on spotify".
    pub fn preferred_for_utterance(&self, utterance: &str) -> Option<Arc<dyn AudioBackend>> {
        self.backends
            .iter()
            .find(|b| utterance.contains(b.name()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

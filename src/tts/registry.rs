//! Name to constructor table for synthesis backends.
//!
//! The [`BackendRegistry`] is built before a build starts and handed to the
//! coordinator; lookups never mutate it.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{local, playht, LocalSynthesizer, PlayHtSynthesizer, Synthesizer};
use crate::config::ProjectConfig;
use crate::error::{BuildError, Result};

/// Builds a backend instance for one project.
pub type BackendFactory =
    Box<dyn Fn(&ProjectConfig) -> anyhow::Result<Arc<dyn Synthesizer>> + Send + Sync>;

/// Registered synthesis backends, keyed by the `model` config value.
pub struct BackendRegistry {
    factories: BTreeMap<String, BackendFactory>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry holding the built-in `local` and `playht` backends.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(local::NAME, |config| {
            Ok(Arc::new(LocalSynthesizer::from_config(config)?) as Arc<dyn Synthesizer>)
        });
        registry.register(playht::NAME, |config| {
            Ok(Arc::new(PlayHtSynthesizer::from_config(config)?) as Arc<dyn Synthesizer>)
        });
        registry
    }

    /// Register a factory under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ProjectConfig) -> anyhow::Result<Arc<dyn Synthesizer>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiate the backend named by `config.model`.
    ///
    /// # Errors
    ///
    /// [`BuildError::UnknownBackend`] if no factory is registered under that
    /// name, [`BuildError::BackendSetup`] if the factory rejects the config.
    pub fn create(&self, config: &ProjectConfig) -> Result<Arc<dyn Synthesizer>> {
        let factory = self
            .factories
            .get(&config.model)
            .ok_or_else(|| BuildError::UnknownBackend {
                name: config.model.clone(),
                available: self.names().join(", "),
            })?;

        factory(config).map_err(|source| BuildError::BackendSetup {
            backend: config.model.clone(),
            source,
        })
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

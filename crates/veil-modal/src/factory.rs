#![forbid(unsafe_code)]

//! Modal factory: the plugin pipeline.
//!
//! # Invariants
//!
//! - Plugins run in registration order, once per built modal.
//! - A plugin added with [`ModalFactory::plugin`] only affects modals built
//!   after it was added.
//! - Every modal is mounted and positioned before any plugin runs.

use std::fmt;
use std::rc::Rc;

use veil_core::{ConfigError, ModalConfig, Surface};

use crate::modal::Modal;
use crate::plugin::{ModalOptions, PluginEntry};

/// Builds modals on one surface and installs plugins on each.
pub struct ModalFactory {
    surface: Rc<dyn Surface>,
    config: ModalConfig,
    plugins: Vec<PluginEntry>,
}

impl ModalFactory {
    /// Create a factory with the default configuration and `plugins` preloaded.
    pub fn new(
        surface: impl Surface + 'static,
        plugins: impl IntoIterator<Item = PluginEntry>,
    ) -> Self {
        Self {
            surface: Rc::new(surface),
            config: ModalConfig::default(),
            plugins: plugins.into_iter().collect(),
        }
    }

    /// Create a factory with a validated configuration.
    pub fn with_config(
        surface: impl Surface + 'static,
        config: ModalConfig,
        plugins: impl IntoIterator<Item = PluginEntry>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(surface, plugins)
        })
    }

    /// Append a plugin for modals built from now on.
    pub fn plugin(&mut self, entry: PluginEntry) -> &mut Self {
        tracing::trace!(plugin = entry.key(), "plugin registered");
        self.plugins.push(entry);
        self
    }

    /// Registered plugin keys, in registration order.
    pub fn plugin_keys(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(PluginEntry::key)
    }

    #[must_use]
    pub fn config(&self) -> &ModalConfig {
        &self.config
    }

    /// Build a modal and run every plugin on it with its option from `options`.
    pub fn modal(&self, options: &ModalOptions) -> Modal {
        let modal = Modal::mount(Rc::clone(&self.surface), &self.config);
        for entry in &self.plugins {
            let arg = options.get(entry.key());
            tracing::trace!(
                modal = modal.id().get(),
                plugin = entry.key(),
                has_option = arg.is_present(),
                "installing plugin"
            );
            entry.invoke(modal.scope(), arg);
        }
        modal
    }
}

impl fmt::Debug for ModalFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalFactory")
            .field("config", &self.config)
            .field("plugins", &self.plugins)
            .finish()
    }
}

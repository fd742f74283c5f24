#![forbid(unsafe_code)]

//! Error types for modal lifecycle and configuration.
//!
//! Lifecycle errors are never raised from the call that requests a
//! transition. They are the settled value of the returned
//! [`Transition`](crate::lifecycle::Transition), so every request yields a
//! handle even when the request is refused.

use thiserror::Error;

use crate::lifecycle::TransitionKind;

/// Why a lifecycle transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ModalError {
    /// The modal was destroyed; no further show/hide is possible.
    #[error("Modal is destroyed.")]
    Destroyed,
    /// The opposing transition is still outstanding.
    ///
    /// Carries the kind of the transition that is in flight, not the one that
    /// was requested.
    #[error("{} process is not completed.", .0.progressive())]
    Conflict(TransitionKind),
}

/// Errors raised while building or loading a [`ModalConfig`](crate::config::ModalConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Stacking step must be at least 1 so a new modal lands strictly above its siblings.
    #[error("invalid stacking step {0}: must be at least 1")]
    InvalidStep(i32),
    /// The configuration document could not be parsed.
    #[error("failed to parse modal config: {0}")]
    Parse(String),
}

#![forbid(unsafe_code)]

//! Core building blocks for veil modals.
//!
//! - [`event`]: typed listener registry.
//! - [`lifecycle`]: lifecycle state, transition table, and settle-once transition handles.
//! - [`surface`]: the presentation collaborator trait and an in-memory document.
//! - [`config`]: stacking policy and modal configuration.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`); nothing is `Send`.

pub mod config;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod surface;

pub use config::{ModalConfig, StackingPolicy};
pub use error::{ConfigError, ModalError};
pub use event::{Emitter, ListenerId};
pub use lifecycle::{Lifecycle, LifecycleState, Step, Transition, TransitionKind};
pub use surface::{MemoryDocument, NodeId, NodeStyle, Surface, TransitionMode, Visibility};

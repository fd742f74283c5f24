#![forbid(unsafe_code)]

//! veil public facade.
//!
//! Re-exports the core lifecycle types and the modal factory so applications
//! can depend on a single crate.

pub use veil_core::{
    ConfigError, Emitter, LifecycleState, ListenerId, MemoryDocument, ModalConfig, ModalError,
    NodeId, NodeStyle, StackingPolicy, Surface, Transition, TransitionKind, TransitionMode,
    Visibility,
};
pub use veil_modal::{
    Modal, ModalEvent, ModalFactory, ModalId, ModalOptions, ModalScope, Plugin, PluginArg,
    PluginEntry,
};

/// Common imports for building and driving modals.
pub mod prelude {
    pub use crate::{
        LifecycleState, MemoryDocument, Modal, ModalError, ModalEvent, ModalFactory, ModalOptions,
        ModalScope, PluginArg, PluginEntry, Surface, Transition, Visibility,
    };
}

#![forbid(unsafe_code)]

//! Plugin-extensible modal for veil.
//!
//! # Example
//!
//! ```
//! use veil_core::MemoryDocument;
//! use veil_modal::{ModalEvent, ModalFactory, ModalOptions, PluginEntry};
//!
//! let doc = MemoryDocument::new();
//! doc.insert_element("main", Some(5));
//!
//! let factory = ModalFactory::new(
//!     doc.clone(),
//!     [PluginEntry::new("title", |modal, arg| {
//!         let title = arg.get::<&str>().copied().unwrap_or("untitled");
//!         modal.on(ModalEvent::Show, move |_| println!("showing {title}"));
//!     })],
//! );
//!
//! let modal = factory.modal(&ModalOptions::new().with("title", "Settings"));
//! assert!(modal.is_hidden());
//!
//! futures::executor::block_on(modal.show()).unwrap();
//! assert!(modal.is_visible());
//! ```

pub mod event;
pub mod factory;
pub mod modal;
pub mod plugin;

pub use event::ModalEvent;
pub use factory::ModalFactory;
pub use modal::{Modal, ModalId};
pub use plugin::{ModalOptions, ModalScope, Plugin, PluginArg, PluginEntry};

#![forbid(unsafe_code)]

//! Plugin entries, per-plugin options, and the view plugins get of a modal.
//!
//! A plugin is a keyed callable run once for every modal a factory builds.
//! It receives a [`ModalScope`] (listener registration, transitions, and
//! state queries) and the value stored under its key in [`ModalOptions`].
//!
//! # Failure Modes
//!
//! - Missing option: the plugin receives an empty [`PluginArg`].
//! - Option of an unexpected type: [`PluginArg::get`] returns `None`.
//! - Plugin panic: propagates out of `ModalFactory::modal`; plugins after
//!   the panicking one do not run.

use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use veil_core::{LifecycleState, ListenerId, Transition};

use crate::event::ModalEvent;
use crate::modal::{Modal, ModalId};

// ---------------------------------------------------------------------------
// ModalScope: capability-limited view
// ---------------------------------------------------------------------------

/// What a plugin may do with the modal it is installed on.
#[derive(Clone, Copy)]
pub struct ModalScope<'a> {
    modal: &'a Modal,
}

impl<'a> ModalScope<'a> {
    pub(crate) fn new(modal: &'a Modal) -> Self {
        Self { modal }
    }

    /// Id of the modal being built.
    #[must_use]
    pub fn id(&self) -> ModalId {
        self.modal.id()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.modal.state()
    }

    /// Whether the modal is fully shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.modal.is_visible()
    }

    /// Whether the modal is fully hidden.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.modal.is_hidden()
    }

    /// Register a listener on the modal. See [`Modal::on`].
    pub fn on(&self, event: ModalEvent, listener: impl Fn(&Modal) + 'static) -> ListenerId {
        self.modal.on(event, listener)
    }

    /// Remove a listener. Returns `true` if it was registered.
    pub fn off(&self, id: ListenerId) -> bool {
        self.modal.off(id)
    }

    /// Emit a plugin-defined event. See [`Modal::emit_custom`].
    pub fn emit_custom(&self, name: impl Into<Cow<'static, str>>) -> bool {
        self.modal.emit_custom(name)
    }

    /// Reveal the modal. See [`Modal::show`].
    pub fn show(&self) -> Transition {
        self.modal.show()
    }

    /// Conceal the modal. See [`Modal::hide`].
    pub fn hide(&self) -> Transition {
        self.modal.hide()
    }

    /// Unmount the modal. See [`Modal::destroy`].
    pub fn destroy(&self) -> Transition {
        self.modal.destroy()
    }
}

impl fmt::Debug for ModalScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalScope")
            .field("id", &self.modal.id())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Per-plugin options for one modal, keyed by plugin key.
///
/// Values are opaque to the factory and passed through unchanged.
#[derive(Default)]
pub struct ModalOptions {
    values: HashMap<String, Box<dyn Any>>,
}

impl ModalOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with<T: Any>(mut self, key: impl Into<String>, value: T) -> Self {
        self.insert(key, value);
        self
    }

    /// Store `value` for the plugin registered under `key`, replacing any previous value.
    pub fn insert<T: Any>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    /// The option for `key`, empty if none was given.
    #[must_use]
    pub fn get(&self, key: &str) -> PluginArg<'_> {
        PluginArg {
            value: self.values.get(key).map(|boxed| &**boxed),
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for ModalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("ModalOptions").field("keys", &keys).finish()
    }
}

/// The option value handed to one plugin.
#[derive(Clone, Copy, Default)]
pub struct PluginArg<'a> {
    value: Option<&'a (dyn Any + 'static)>,
}

impl<'a> PluginArg<'a> {
    /// An empty argument.
    #[must_use]
    pub const fn absent() -> Self {
        Self { value: None }
    }

    /// Whether an option was supplied for this plugin.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// The option as `T`, or `None` if absent or of another type.
    #[must_use]
    pub fn get<T: Any>(&self) -> Option<&'a T> {
        self.value.and_then(|value| value.downcast_ref::<T>())
    }

    /// The untyped option value.
    #[must_use]
    pub fn raw(&self) -> Option<&'a (dyn Any + 'static)> {
        self.value
    }
}

impl fmt::Debug for PluginArg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginArg")
            .field("present", &self.is_present())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Plugins
// ---------------------------------------------------------------------------

/// A struct-based plugin. Convert with [`PluginEntry::from_plugin`].
pub trait Plugin {
    /// Key under which this plugin's option is looked up.
    fn key(&self) -> &str;

    /// Install the plugin on a freshly built modal.
    fn install(&self, modal: ModalScope<'_>, arg: PluginArg<'_>);
}

type PluginFn = dyn Fn(ModalScope<'_>, PluginArg<'_>);

/// A keyed plugin callable. Immutable once built.
#[derive(Clone)]
pub struct PluginEntry {
    key: String,
    callable: Rc<PluginFn>,
}

impl PluginEntry {
    /// Create an entry from a key and a callable.
    pub fn new(
        key: impl Into<String>,
        callable: impl Fn(ModalScope<'_>, PluginArg<'_>) + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            callable: Rc::new(callable),
        }
    }

    /// Wrap a [`Plugin`] implementation.
    pub fn from_plugin<P: Plugin + 'static>(plugin: P) -> Self {
        let key = plugin.key().to_owned();
        Self::new(key, move |modal, arg| plugin.install(modal, arg))
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn invoke(&self, modal: ModalScope<'_>, arg: PluginArg<'_>) {
        (self.callable)(modal, arg);
    }
}

impl fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginEntry")
            .field("key", &self.key)
            .finish()
    }
}

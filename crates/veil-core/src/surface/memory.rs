#![forbid(unsafe_code)]

//! Deterministic in-memory [`Surface`] for hosts without a real document and for tests.
//!
//! [`MemoryDocument`] models a single container of elements. Visibility
//! changes either apply at once ([`TransitionMode::Immediate`]) or wait for
//! the host to call [`MemoryDocument::complete_transitions`]
//! ([`TransitionMode::Deferred`]), which stands in for a transition-end
//! notification.

use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};

use super::{NodeId, NodeStyle, Surface, Visibility};

/// When visibility changes take effect on a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionMode {
    /// Apply the change and resolve the future immediately.
    #[default]
    Immediate,
    /// Hold the change until [`MemoryDocument::complete_transitions`].
    Deferred,
}

#[derive(Debug)]
struct Element {
    id: NodeId,
    tag: String,
    style: NodeStyle,
}

#[derive(Debug)]
struct PendingChange {
    node: NodeId,
    visibility: Visibility,
    done: oneshot::Sender<()>,
}

#[derive(Debug, Default)]
struct Document {
    elements: Vec<Element>,
    pending: Vec<PendingChange>,
    mode: TransitionMode,
    next_id: u64,
}

impl Document {
    fn insert(&mut self, tag: String, style: NodeStyle) -> NodeId {
        self.next_id += 1;
        let id = NodeId::new(self.next_id);
        self.elements.push(Element { id, tag, style });
        id
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|el| el.id == node)
    }

    fn apply(&mut self, node: NodeId, visibility: Visibility) {
        if let Some(el) = self.element_mut(node) {
            el.style.visibility = visibility;
        }
    }
}

/// Shared handle to an in-memory document container.
///
/// Clones refer to the same document, so a host can keep one clone for
/// inspection while a factory owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    inner: Rc<RefCell<Document>>,
}

impl MemoryDocument {
    /// Create an empty document with immediate transitions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document using `mode` for visibility changes.
    #[must_use]
    pub fn with_mode(mode: TransitionMode) -> Self {
        let doc = Self::new();
        doc.set_mode(mode);
        doc
    }

    /// Switch the transition mode. Already-pending changes stay pending.
    pub fn set_mode(&self, mode: TransitionMode) {
        self.inner.borrow_mut().mode = mode;
    }

    /// Add a visible host element, optionally with an explicit stacking index.
    pub fn insert_element(&self, tag: impl Into<String>, stacking_index: Option<i32>) -> NodeId {
        self.inner.borrow_mut().insert(
            tag.into(),
            NodeStyle {
                stacking_index,
                visibility: Visibility::Visible,
            },
        )
    }

    /// Whether `node` is attached to the container.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.inner.borrow().elements.iter().any(|el| el.id == node)
    }

    /// Tag name of an attached element.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.inner
            .borrow()
            .elements
            .iter()
            .find(|el| el.id == node)
            .map(|el| el.tag.clone())
    }

    /// Number of attached elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().elements.len()
    }

    /// Whether the container has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().elements.is_empty()
    }

    /// Number of visibility changes waiting for completion.
    #[must_use]
    pub fn pending_transitions(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Apply every pending visibility change and resolve its future.
    ///
    /// Returns the number of changes completed.
    pub fn complete_transitions(&self) -> usize {
        let drained: Vec<PendingChange> = {
            let mut doc = self.inner.borrow_mut();
            let drained: Vec<_> = doc.pending.drain(..).collect();
            for change in &drained {
                doc.apply(change.node, change.visibility);
            }
            drained
        };

        let count = drained.len();
        for change in drained {
            // Receiver may be gone if the transition future was dropped.
            let _ = change.done.send(());
        }
        count
    }
}

impl Surface for MemoryDocument {
    fn max_stacking_index(&self) -> Option<i32> {
        self.inner
            .borrow()
            .elements
            .iter()
            .filter_map(|el| el.style.stacking_index)
            .max()
    }

    fn mount(&self) -> NodeId {
        self.inner
            .borrow_mut()
            .insert("div".to_owned(), NodeStyle::default())
    }

    fn set_stacking_index(&self, node: NodeId, index: i32) {
        if let Some(el) = self.inner.borrow_mut().element_mut(node) {
            el.style.stacking_index = Some(index);
        }
    }

    fn set_visibility(&self, node: NodeId, visibility: Visibility) -> LocalBoxFuture<'static, ()> {
        let mut doc = self.inner.borrow_mut();
        let mode = doc.mode;
        match mode {
            TransitionMode::Immediate => {
                doc.apply(node, visibility);
                future::ready(()).boxed_local()
            }
            TransitionMode::Deferred => {
                let (done, rx) = oneshot::channel();
                doc.pending.push(PendingChange {
                    node,
                    visibility,
                    done,
                });
                async move {
                    let _ = rx.await;
                }
                .boxed_local()
            }
        }
    }

    fn unmount(&self, node: NodeId) {
        self.inner.borrow_mut().elements.retain(|el| el.id != node);
    }

    fn style(&self, node: NodeId) -> Option<NodeStyle> {
        self.inner
            .borrow()
            .elements
            .iter()
            .find(|el| el.id == node)
            .map(|el| el.style)
    }
}

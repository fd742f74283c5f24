#![forbid(unsafe_code)]

//! Presentation surface abstraction.
//!
//! A [`Surface`] is the rendering collaborator a modal draws onto: a host
//! container holding elements, each with an optional explicit stacking index
//! and a visibility. Visibility changes are asynchronous; the returned future
//! completes once the change has been applied on screen (for example after a
//! CSS transition ends or the next animation frame).
//!
//! # Invariants
//!
//! - `mount` returns a node that is already attached and hidden.
//! - `max_stacking_index` only considers elements with an explicit index.
//! - A new modal is placed strictly above that index unless a sibling already
//!   holds `i32::MAX`, in which case it shares the top index.
//! - Operations on a node that was unmounted are ignored.

mod memory;

pub use memory::{MemoryDocument, TransitionMode};

use futures::future::LocalBoxFuture;

/// Opaque handle to an element on a [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a node handle from a raw id. Surfaces mint these.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Element visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Hidden,
    Visible,
}

impl Visibility {
    /// CSS keyword for this visibility.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Visible => "visible",
        }
    }
}

/// Snapshot of the style attributes a modal manages on its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeStyle {
    pub stacking_index: Option<i32>,
    pub visibility: Visibility,
}

/// Rendering collaborator for modals.
pub trait Surface {
    /// Largest explicit stacking index among elements currently in the container.
    fn max_stacking_index(&self) -> Option<i32>;

    /// Create a hidden element and attach it to the container.
    fn mount(&self) -> NodeId;

    /// Assign an explicit stacking index to `node`.
    fn set_stacking_index(&self, node: NodeId, index: i32);

    /// Change the visibility of `node`. The future resolves once the change
    /// is visible on screen.
    fn set_visibility(&self, node: NodeId, visibility: Visibility) -> LocalBoxFuture<'static, ()>;

    /// Detach `node` from the container.
    fn unmount(&self, node: NodeId);

    /// Current style of `node`, or `None` if it is not attached.
    fn style(&self, node: NodeId) -> Option<NodeStyle>;
}

#![forbid(unsafe_code)]

//! Modal event names.

use std::borrow::Cow;
use std::fmt;

use veil_core::TransitionKind;

/// Events a [`Modal`](crate::Modal) emits, in the order they can occur.
///
/// Lifecycle events are raised only by the modal itself. Plugins raise
/// [`ModalEvent::Custom`] events through
/// [`Modal::emit_custom`](crate::Modal::emit_custom).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModalEvent {
    /// `"show:before"`: a show transition is about to reveal the node.
    ShowBefore,
    /// `"show"`: the node is visible.
    Show,
    /// `"hide:before"`: a hide transition is about to conceal the node.
    HideBefore,
    /// `"hide"`: the node is hidden.
    Hide,
    /// `"destroy"`: the node was removed and the modal is terminal.
    Destroy,
    /// A plugin-defined event.
    Custom(Cow<'static, str>),
}

impl ModalEvent {
    /// A plugin-defined event with the given name.
    #[must_use]
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom(name.into())
    }

    /// Map a string event name to its event. Unknown names become `Custom`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "show:before" => Self::ShowBefore,
            "show" => Self::Show,
            "hide:before" => Self::HideBefore,
            "hide" => Self::Hide,
            "destroy" => Self::Destroy,
            other => Self::Custom(Cow::Owned(other.to_owned())),
        }
    }

    /// String form of the event name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ShowBefore => "show:before",
            Self::Show => "show",
            Self::HideBefore => "hide:before",
            Self::Hide => "hide",
            Self::Destroy => "destroy",
            Self::Custom(name) => name,
        }
    }

    /// Whether this is one of the events the lifecycle raises.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    /// Event emitted before the visual change of `kind`, if it has one.
    #[must_use]
    pub const fn before(kind: TransitionKind) -> Option<Self> {
        match kind {
            TransitionKind::Show => Some(Self::ShowBefore),
            TransitionKind::Hide => Some(Self::HideBefore),
            TransitionKind::Destroy => None,
        }
    }

    /// Event emitted once `kind` has completed.
    #[must_use]
    pub const fn after(kind: TransitionKind) -> Self {
        match kind {
            TransitionKind::Show => Self::Show,
            TransitionKind::Hide => Self::Hide,
            TransitionKind::Destroy => Self::Destroy,
        }
    }
}

impl fmt::Display for ModalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

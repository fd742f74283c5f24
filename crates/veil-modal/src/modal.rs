#![forbid(unsafe_code)]

//! The modal facade.
//!
//! A [`Modal`] owns one node on a [`Surface`] and drives it through the
//! lifecycle in [`veil_core::lifecycle`]. Handles are cheap to clone; every
//! clone refers to the same modal.
//!
//! # Ordering
//!
//! For a show (hide is symmetric):
//!
//! 1. `show()` consults the transition table and, when a new transition is
//!    needed, records it as outstanding.
//! 2. Still inside `show()`, [`ModalEvent::ShowBefore`] fires while the modal
//!    is `Hidden`, state becomes `Showing`, and the surface is asked to apply
//!    the change.
//! 3. Once the surface reports completion, state becomes `Visible` and
//!    [`ModalEvent::Show`] fires. A surface that completes at once finishes
//!    the transition before `show()` returns; otherwise this step runs when
//!    the returned [`Transition`] is awaited.
//!
//! Dropping the returned handle never strands the modal: everything up to
//! the surface wait has already happened, and the outstanding transition
//! stays reachable through a repeated `show()`.
//!
//! `destroy()` runs eagerly: state becomes `Destroyed`, the node is unmounted,
//! and [`ModalEvent::Destroy`] fires before the call returns.
//!
//! # Failure Modes
//!
//! - Blocked `show`/`hide`: the returned transition settles with a
//!   [`ModalError`]; the call itself never fails.
//! - Destroyed while a show/hide is in flight: the surface change still
//!   completes, lifecycle state stays `Destroyed`, and the transition settles
//!   with [`ModalError::Destroyed`].
//! - Listener panic: propagates out of whichever call emitted the event.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use veil_core::{
    Emitter, Lifecycle, LifecycleState, ListenerId, ModalConfig, ModalError, NodeId, NodeStyle,
    Step, Surface, Transition, TransitionKind, Visibility,
};

use crate::event::ModalEvent;
use crate::plugin::ModalScope;

/// Global counter for unique modal IDs.
static MODAL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModalId(u64);

impl ModalId {
    fn new() -> Self {
        Self(MODAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

struct ModalInner {
    id: ModalId,
    root: NodeId,
    surface: Rc<dyn Surface>,
    lifecycle: RefCell<Lifecycle>,
    events: Emitter<ModalEvent, Modal>,
}

/// Handle to a modal built by a [`ModalFactory`](crate::ModalFactory).
///
/// No field can be reassigned after construction. Lifecycle state changes
/// only through [`show`](Self::show), [`hide`](Self::hide), and
/// [`destroy`](Self::destroy).
#[derive(Clone)]
pub struct Modal {
    inner: Rc<ModalInner>,
}

impl Modal {
    /// Mount a hidden node above every existing element on `surface`.
    pub(crate) fn mount(surface: Rc<dyn Surface>, config: &ModalConfig) -> Self {
        let max_existing = surface.max_stacking_index();
        let index = config.stacking.next_index(max_existing).unwrap_or_else(|| {
            tracing::warn!(
                max_existing = ?max_existing,
                "no stacking index above siblings; sharing the highest"
            );
            i32::MAX
        });
        let root = surface.mount();
        surface.set_stacking_index(root, index);

        let modal = Self {
            inner: Rc::new(ModalInner {
                id: ModalId::new(),
                root,
                surface,
                lifecycle: RefCell::new(Lifecycle::new()),
                events: Emitter::new(),
            }),
        };
        tracing::debug!(
            modal = modal.id().get(),
            node = root.get(),
            stacking_index = index,
            "modal mounted"
        );
        modal
    }

    /// Unique id of this modal.
    #[must_use]
    pub fn id(&self) -> ModalId {
        self.inner.id
    }

    /// Handle to the root node on the surface.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.inner.root
    }

    /// Snapshot of the root node's style, or `None` once it is unmounted.
    #[must_use]
    pub fn root_style(&self) -> Option<NodeStyle> {
        self.inner.surface.style(self.inner.root)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.inner.lifecycle.borrow().state()
    }

    /// Whether the modal is fully shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.state() == LifecycleState::Visible
    }

    /// Whether the modal is fully hidden. False while showing, hiding, or destroyed.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.state() == LifecycleState::Hidden
    }

    /// Whether [`destroy`](Self::destroy) has run.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.state() == LifecycleState::Destroyed
    }

    /// Narrow view of this modal, as handed to plugins.
    #[must_use]
    pub fn scope(&self) -> ModalScope<'_> {
        ModalScope::new(self)
    }

    /// Reveal the modal.
    pub fn show(&self) -> Transition {
        self.request(TransitionKind::Show)
    }

    /// Conceal the modal.
    pub fn hide(&self) -> Transition {
        self.request(TransitionKind::Hide)
    }

    /// Unmount the node and enter the terminal state. Idempotent.
    pub fn destroy(&self) -> Transition {
        let step = self.inner.lifecycle.borrow().plan(TransitionKind::Destroy);
        if let Step::Reuse(done) = step {
            return done;
        }

        let done = Transition::settled(TransitionKind::Destroy, Ok(()));
        self.inner.lifecycle.borrow_mut().destroy(done.clone());
        self.inner.surface.unmount(self.inner.root);
        tracing::debug!(modal = self.id().get(), "modal destroyed");
        self.emit(&ModalEvent::Destroy);
        done
    }

    /// Register a listener for `event`. The listener receives this modal.
    pub fn on(&self, event: ModalEvent, listener: impl Fn(&Modal) + 'static) -> ListenerId {
        self.inner.events.on(event, listener)
    }

    /// Remove a listener. Returns `true` if it was registered.
    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.events.off(id)
    }

    /// Emit a plugin-defined event.
    ///
    /// Names that belong to lifecycle events are refused and `false` is
    /// returned; only the lifecycle raises those.
    pub fn emit_custom(&self, name: impl Into<std::borrow::Cow<'static, str>>) -> bool {
        let event = ModalEvent::custom(name);
        if ModalEvent::from_name(event.name()).is_lifecycle() {
            tracing::warn!(
                modal = self.id().get(),
                event = %event,
                "refusing to emit lifecycle event as custom"
            );
            return false;
        }
        self.emit(&event);
        true
    }

    fn emit(&self, event: &ModalEvent) {
        tracing::trace!(modal = self.id().get(), event = %event, "emit");
        self.inner.events.emit(event, self);
    }

    fn request(&self, kind: TransitionKind) -> Transition {
        let step = self.inner.lifecycle.borrow().plan(kind);
        match step {
            Step::Reject(error) => {
                tracing::debug!(
                    modal = self.id().get(),
                    transition = %kind,
                    %error,
                    "transition refused"
                );
                Transition::rejected(kind, error)
            }
            Step::Reuse(existing) => {
                tracing::trace!(modal = self.id().get(), transition = %kind, "transition reused");
                existing
            }
            Step::Start => {
                let (ready, prepared) = oneshot::channel();
                let transition =
                    Transition::new(kind, settle(Rc::downgrade(&self.inner), kind, prepared));
                self.inner.lifecycle.borrow_mut().begin(transition.clone());
                tracing::debug!(modal = self.id().get(), transition = %kind, "transition started");

                // A dropped sender settles the transition as destroyed.
                if let Some(progress) = self.prepare(kind) {
                    let _ = ready.send(progress);
                }
                transition
            }
        }
    }

    /// Synchronous part of a show/hide: before-event, transient state, and
    /// the surface request. Returns `None` if a listener destroyed the modal.
    fn prepare(&self, kind: TransitionKind) -> Option<Progress> {
        if let Some(before) = ModalEvent::before(kind) {
            self.emit(&before);
        }
        if self.is_destroyed() {
            self.inner.lifecycle.borrow_mut().abandon(kind);
            return None;
        }

        self.inner.lifecycle.borrow_mut().enter(kind);
        let visibility = match kind {
            TransitionKind::Show => Visibility::Visible,
            TransitionKind::Hide | TransitionKind::Destroy => Visibility::Hidden,
        };
        let mut applied = self.inner.surface.set_visibility(self.inner.root, visibility);
        if (&mut applied).now_or_never().is_some() {
            return Some(Progress::Done(self.finish(kind)));
        }
        Some(Progress::Applying(applied))
    }

    /// Settle the outstanding transition of `kind` after the surface applied it.
    fn finish(&self, kind: TransitionKind) -> Result<(), ModalError> {
        self.inner.lifecycle.borrow_mut().complete(kind);
        if self.is_destroyed() {
            tracing::debug!(
                modal = self.id().get(),
                transition = %kind,
                "modal destroyed during transition"
            );
            return Err(ModalError::Destroyed);
        }

        tracing::debug!(modal = self.id().get(), transition = %kind, "transition completed");
        self.emit(&ModalEvent::after(kind));
        Ok(())
    }

    fn upgrade(inner: &Weak<ModalInner>) -> Option<Self> {
        inner.upgrade().map(|inner| Self { inner })
    }
}

/// Where a started transition stands once `show()`/`hide()` returns.
enum Progress {
    /// The surface is still applying the change.
    Applying(LocalBoxFuture<'static, ()>),
    /// The transition already settled.
    Done(Result<(), ModalError>),
}

/// Lazy tail of a show/hide transition. Holds only a weak reference across
/// the surface await so an abandoned transition does not keep the modal alive.
async fn settle(
    weak: Weak<ModalInner>,
    kind: TransitionKind,
    prepared: oneshot::Receiver<Progress>,
) -> Result<(), ModalError> {
    let applied = match prepared.await {
        Ok(Progress::Applying(applied)) => applied,
        Ok(Progress::Done(result)) => return result,
        Err(oneshot::Canceled) => return Err(ModalError::Destroyed),
    };

    applied.await;

    let modal = Modal::upgrade(&weak).ok_or(ModalError::Destroyed)?;
    modal.finish(kind)
}

impl PartialEq for Modal {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Modal {}

impl fmt::Debug for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modal")
            .field("id", &self.inner.id)
            .field("root", &self.inner.root)
            .field("state", &self.state())
            .field("events", &self.inner.events)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

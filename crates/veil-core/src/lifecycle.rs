#![forbid(unsafe_code)]

//! Modal lifecycle state machine with single-flight transitions.
//!
//! [`Lifecycle`] is the bookkeeping half of the modal lifecycle: it owns the
//! current [`LifecycleState`], the outstanding show/hide [`Transition`], and
//! the previously settled results. It performs no side effects itself; the
//! modal facade consults [`Lifecycle::plan`] and then reports progress through
//! [`begin`](Lifecycle::begin), [`enter`](Lifecycle::enter),
//! [`complete`](Lifecycle::complete), [`abandon`](Lifecycle::abandon), and
//! [`destroy`](Lifecycle::destroy).
//!
//! # Transition Table
//!
//! | state | outstanding | request | step |
//! |-------|-------------|---------|------|
//! | Destroyed | any | Destroy | reuse destroy result |
//! | other | any | Destroy | start |
//! | Destroyed | any | Show/Hide | reject `Destroyed` |
//! | any | same kind | Show/Hide | reuse outstanding |
//! | any | other kind | Show/Hide | reject `Conflict(other)` |
//! | Visible | none | Show | reuse previous show |
//! | Hidden | none | Hide | reuse previous hide |
//! | other | none | Show/Hide | start |
//!
//! # Invariants
//!
//! 1. At most one show/hide transition is outstanding at a time.
//! 2. `Destroyed` is terminal: no method moves the state out of it.
//! 3. A fresh lifecycle is `Hidden` and already holds a settled hide result.
//! 4. Requests for the outstanding kind receive a clone of the same
//!    [`Transition`] (`ptr_eq` holds between them).

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture, Shared};

use crate::error::ModalError;

/// Lifecycle state of a modal. Exactly one holds at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    #[default]
    Hidden,
    Showing,
    Visible,
    Hiding,
    Destroyed,
}

impl LifecycleState {
    /// Whether a visual change is currently being applied.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Showing | Self::Hiding)
    }
}

/// The three lifecycle transitions a caller may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    Show,
    Hide,
    Destroy,
}

impl TransitionKind {
    /// Lowercase verb, as used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Hide => "hide",
            Self::Destroy => "destroy",
        }
    }

    /// Capitalized progressive form ("Showing", "Hiding", "Destroying").
    #[must_use]
    pub const fn progressive(self) -> &'static str {
        match self {
            Self::Show => "Showing",
            Self::Hide => "Hiding",
            Self::Destroy => "Destroying",
        }
    }

    /// State held while this transition applies its visual change.
    const fn transient_state(self) -> LifecycleState {
        match self {
            Self::Show => LifecycleState::Showing,
            Self::Hide => LifecycleState::Hiding,
            Self::Destroy => LifecycleState::Destroyed,
        }
    }

    /// State reached once this transition completes.
    const fn target_state(self) -> LifecycleState {
        match self {
            Self::Show => LifecycleState::Visible,
            Self::Hide => LifecycleState::Hidden,
            Self::Destroy => LifecycleState::Destroyed,
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Transition: shared, settle-once handle
// ---------------------------------------------------------------------------

type SharedOutcome = Shared<LocalBoxFuture<'static, Result<(), ModalError>>>;

/// Awaitable result of one lifecycle transition.
///
/// Clones share the same underlying future: the transition runs once no
/// matter how many clones are awaited, and every clone observes the same
/// settled value.
#[derive(Clone)]
#[must_use = "transitions are lazy; await the handle to drive a show or hide"]
pub struct Transition {
    kind: TransitionKind,
    inner: SharedOutcome,
}

impl Transition {
    /// Wrap a future that performs the transition.
    pub fn new(
        kind: TransitionKind,
        work: impl Future<Output = Result<(), ModalError>> + 'static,
    ) -> Self {
        Self {
            kind,
            inner: work.boxed_local().shared(),
        }
    }

    /// An already-settled transition.
    pub fn settled(kind: TransitionKind, outcome: Result<(), ModalError>) -> Self {
        Self::new(kind, future::ready(outcome))
    }

    /// An already-settled, refused transition.
    pub fn rejected(kind: TransitionKind, error: ModalError) -> Self {
        Self::settled(kind, Err(error))
    }

    /// Kind of transition this handle was issued for.
    #[must_use]
    pub const fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// Whether `self` and `other` are handles to the same transition.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }

    /// The settled value, if this transition has finished and been observed.
    #[must_use]
    pub fn outcome(&self) -> Option<Result<(), ModalError>> {
        self.inner.peek().copied()
    }

    /// Whether a settled value is available without polling.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.inner.peek().is_some()
    }
}

impl Future for Transition {
    type Output = Result<(), ModalError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("kind", &self.kind)
            .field("outcome", &self.outcome())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Lifecycle: transition table and bookkeeping
// ---------------------------------------------------------------------------

/// Decision returned by [`Lifecycle::plan`].
#[derive(Debug, Clone)]
pub enum Step {
    /// No transition may run; hand back a settled failure.
    Reject(ModalError),
    /// Hand back an existing handle (outstanding or previously settled).
    Reuse(Transition),
    /// Start a new physical transition.
    Start,
}

/// State and result slots for one modal.
#[derive(Debug)]
pub struct Lifecycle {
    state: LifecycleState,
    outstanding: Option<Transition>,
    shown: Option<Transition>,
    hidden: Option<Transition>,
    destroyed: Option<Transition>,
}

impl Lifecycle {
    /// A lifecycle in the `Hidden` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Hidden,
            outstanding: None,
            shown: None,
            hidden: Some(Transition::settled(TransitionKind::Hide, Ok(()))),
            destroyed: None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Kind of the outstanding show/hide transition, if any.
    #[must_use]
    pub fn outstanding(&self) -> Option<TransitionKind> {
        self.outstanding.as_ref().map(Transition::kind)
    }

    /// Look up what a request for `kind` should do in the current state.
    #[must_use]
    pub fn plan(&self, kind: TransitionKind) -> Step {
        if kind == TransitionKind::Destroy {
            return match &self.destroyed {
                Some(done) => Step::Reuse(done.clone()),
                None => Step::Start,
            };
        }

        if self.state == LifecycleState::Destroyed {
            tracing::trace!(transition = %kind, "refused: destroyed");
            return Step::Reject(ModalError::Destroyed);
        }

        if let Some(pending) = &self.outstanding {
            if pending.kind() == kind {
                return Step::Reuse(pending.clone());
            }
            tracing::trace!(
                transition = %kind,
                outstanding = %pending.kind(),
                "refused: conflicting transition outstanding"
            );
            return Step::Reject(ModalError::Conflict(pending.kind()));
        }

        let previous = match (self.state, kind) {
            (LifecycleState::Visible, TransitionKind::Show) => self.shown.as_ref(),
            (LifecycleState::Hidden, TransitionKind::Hide) => self.hidden.as_ref(),
            _ => None,
        };
        match previous {
            Some(done) => Step::Reuse(done.clone()),
            None => Step::Start,
        }
    }

    /// Record `transition` as the outstanding show/hide. State is unchanged
    /// until [`enter`](Self::enter).
    pub fn begin(&mut self, transition: Transition) {
        debug_assert!(self.outstanding.is_none(), "transition already outstanding");
        debug_assert_ne!(transition.kind(), TransitionKind::Destroy);
        tracing::trace!(transition = %transition.kind(), state = ?self.state, "transition begun");
        self.outstanding = Some(transition);
    }

    /// Move into the transient state of `kind` (`Showing` or `Hiding`).
    pub fn enter(&mut self, kind: TransitionKind) {
        if self.state != LifecycleState::Destroyed {
            self.state = kind.transient_state();
        }
    }

    /// Finish the outstanding transition of `kind`: move to its target state
    /// and keep its handle as the previous result for idempotent requests.
    pub fn complete(&mut self, kind: TransitionKind) {
        if self.state == LifecycleState::Destroyed {
            tracing::debug!(transition = %kind, "transition abandoned: destroyed");
            self.abandon(kind);
            return;
        }
        let Some(done) = self.take_outstanding(kind) else {
            tracing::warn!(transition = %kind, "complete without outstanding transition");
            return;
        };
        tracing::trace!(
            transition = %kind,
            from = ?self.state,
            to = ?kind.target_state(),
            "transition completed"
        );
        self.state = kind.target_state();
        match kind {
            TransitionKind::Show => self.shown = Some(done),
            TransitionKind::Hide => self.hidden = Some(done),
            TransitionKind::Destroy => {}
        }
    }

    /// Drop the outstanding transition of `kind` without changing state.
    pub fn abandon(&mut self, kind: TransitionKind) {
        let _ = self.take_outstanding(kind);
    }

    /// Enter the terminal state, caching `result` for every later destroy request.
    pub fn destroy(&mut self, result: Transition) {
        debug_assert_eq!(result.kind(), TransitionKind::Destroy);
        tracing::trace!(from = ?self.state, "lifecycle destroyed");
        self.state = LifecycleState::Destroyed;
        if self.destroyed.is_none() {
            self.destroyed = Some(result);
        }
    }

    fn take_outstanding(&mut self, kind: TransitionKind) -> Option<Transition> {
        match &self.outstanding {
            Some(pending) if pending.kind() == kind => self.outstanding.take(),
            _ => None,
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use futures::executor::block_on;

    fn pending(kind: TransitionKind) -> (Transition, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel::<()>();
        let t = Transition::new(kind, async move {
            let _ = rx.await;
            Ok(())
        });
        (t, tx)
    }

    fn reused(step: Step) -> Transition {
        match step {
            Step::Reuse(t) => t,
            other => panic!("expected reuse, got {other:?}"),
        }
    }

    #[test]
    fn fresh_lifecycle_is_hidden() {
        let lc = Lifecycle::new();
        assert_eq!(lc.state(), LifecycleState::Hidden);
        assert_eq!(lc.outstanding(), None);
    }

    #[test]
    fn hide_while_hidden_reuses_settled_result() {
        let lc = Lifecycle::new();
        let a = reused(lc.plan(TransitionKind::Hide));
        let b = reused(lc.plan(TransitionKind::Hide));
        assert!(a.ptr_eq(&b));
        assert_eq!(block_on(a), Ok(()));
    }

    #[test]
    fn show_starts_from_hidden() {
        let lc = Lifecycle::new();
        assert!(matches!(lc.plan(TransitionKind::Show), Step::Start));
    }

    #[test]
    fn outstanding_show_is_reused() {
        let mut lc = Lifecycle::new();
        let (show, _tx) = pending(TransitionKind::Show);
        lc.begin(show.clone());

        let again = reused(lc.plan(TransitionKind::Show));
        assert!(again.ptr_eq(&show));
    }

    #[test]
    fn opposing_request_conflicts_with_outstanding() {
        let mut lc = Lifecycle::new();
        let (show, _tx) = pending(TransitionKind::Show);
        lc.begin(show);

        match lc.plan(TransitionKind::Hide) {
            Step::Reject(err) => assert_eq!(err, ModalError::Conflict(TransitionKind::Show)),
            other => panic!("expected reject, got {other:?}"),
        }
    }

    #[test]
    fn complete_moves_to_target_and_caches() {
        let mut lc = Lifecycle::new();
        let (show, tx) = pending(TransitionKind::Show);
        lc.begin(show.clone());
        lc.enter(TransitionKind::Show);
        assert_eq!(lc.state(), LifecycleState::Showing);

        lc.complete(TransitionKind::Show);
        assert_eq!(lc.state(), LifecycleState::Visible);
        assert_eq!(lc.outstanding(), None);

        let again = reused(lc.plan(TransitionKind::Show));
        assert!(again.ptr_eq(&show));

        tx.send(()).unwrap();
        assert_eq!(block_on(show), Ok(()));
        assert!(again.is_settled());
    }

    #[test]
    fn destroyed_rejects_show_and_hide() {
        let mut lc = Lifecycle::new();
        lc.destroy(Transition::settled(TransitionKind::Destroy, Ok(())));

        for kind in [TransitionKind::Show, TransitionKind::Hide] {
            match lc.plan(kind) {
                Step::Reject(err) => assert_eq!(err, ModalError::Destroyed),
                other => panic!("expected reject, got {other:?}"),
            }
        }
    }

    #[test]
    fn destroy_is_terminal_and_idempotent() {
        let mut lc = Lifecycle::new();
        let first = Transition::settled(TransitionKind::Destroy, Ok(()));
        lc.destroy(first.clone());
        lc.destroy(Transition::settled(TransitionKind::Destroy, Ok(())));

        let again = reused(lc.plan(TransitionKind::Destroy));
        assert!(again.ptr_eq(&first));

        lc.enter(TransitionKind::Show);
        lc.complete(TransitionKind::Show);
        assert_eq!(lc.state(), LifecycleState::Destroyed);
    }

    #[test]
    fn destroy_mid_transition_abandons_outstanding() {
        let mut lc = Lifecycle::new();
        let (show, _tx) = pending(TransitionKind::Show);
        lc.begin(show);
        lc.enter(TransitionKind::Show);
        lc.destroy(Transition::settled(TransitionKind::Destroy, Ok(())));

        lc.complete(TransitionKind::Show);
        assert_eq!(lc.state(), LifecycleState::Destroyed);
        assert_eq!(lc.outstanding(), None);
    }

    #[test]
    fn rejected_transition_settles_with_error() {
        let t = Transition::rejected(TransitionKind::Show, ModalError::Destroyed);
        assert_eq!(block_on(t.clone()), Err(ModalError::Destroyed));
        assert_eq!(t.outcome(), Some(Err(ModalError::Destroyed)));
    }

    #[test]
    fn transient_states() {
        assert!(LifecycleState::Showing.is_transient());
        assert!(LifecycleState::Hiding.is_transient());
        assert!(!LifecycleState::Visible.is_transient());
        assert!(!LifecycleState::Destroyed.is_transient());
    }

    mod logging {
        use super::*;
        use std::sync::{Arc, Mutex};
        use tracing::field::{Field, Visit};
        use tracing::{Event, Subscriber};
        use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

        /// Collects event messages.
        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<String>>>);

        impl Captured {
            fn messages(&self) -> Vec<String> {
                self.0.lock().unwrap().clone()
            }
        }

        struct MessageVisitor(String);

        impl Visit for MessageVisitor {
            fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
                if field.name() == "message" {
                    self.0 = format!("{value:?}");
                }
            }
        }

        impl<S: Subscriber> Layer<S> for Captured {
            fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
                let mut visitor = MessageVisitor(String::new());
                event.record(&mut visitor);
                self.0.lock().unwrap().push(visitor.0);
            }
        }

        #[test]
        fn table_decisions_are_logged() {
            let captured = Captured::default();
            let subscriber = tracing_subscriber::registry().with(captured.clone());

            tracing::subscriber::with_default(subscriber, || {
                let mut lc = Lifecycle::new();
                let (show, _tx) = pending(TransitionKind::Show);
                lc.begin(show);
                assert!(matches!(
                    lc.plan(TransitionKind::Hide),
                    Step::Reject(ModalError::Conflict(TransitionKind::Show))
                ));
                lc.enter(TransitionKind::Show);
                lc.complete(TransitionKind::Show);
                lc.destroy(Transition::settled(TransitionKind::Destroy, Ok(())));
                assert!(matches!(
                    lc.plan(TransitionKind::Show),
                    Step::Reject(ModalError::Destroyed)
                ));
            });

            let messages = captured.messages();
            for expected in [
                "transition begun",
                "refused: conflicting transition outstanding",
                "transition completed",
                "lifecycle destroyed",
                "refused: destroyed",
            ] {
                assert!(
                    messages.iter().any(|m| m == expected),
                    "missing log {expected:?} in {messages:?}"
                );
            }
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone, Copy)]
        enum Op {
            Request(TransitionKind),
            Advance,
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                Just(Op::Request(TransitionKind::Show)),
                Just(Op::Request(TransitionKind::Hide)),
                Just(Op::Request(TransitionKind::Destroy)),
                Just(Op::Advance),
            ]
        }

        proptest! {
            #[test]
            fn table_invariants_hold(ops in proptest::collection::vec(op(), 0..40)) {
                let mut lc = Lifecycle::new();
                let mut senders = Vec::new();

                for op in ops {
                    let was_destroyed = lc.state() == LifecycleState::Destroyed;
                    match op {
                        Op::Request(TransitionKind::Destroy) => {
                            if let Step::Start = lc.plan(TransitionKind::Destroy) {
                                lc.destroy(Transition::settled(TransitionKind::Destroy, Ok(())));
                            }
                        }
                        Op::Request(kind) => match lc.plan(kind) {
                            Step::Start => {
                                let (t, tx) = pending(kind);
                                lc.begin(t);
                                lc.enter(kind);
                                senders.push(tx);
                            }
                            Step::Reuse(t) => prop_assert_eq!(t.kind(), kind),
                            Step::Reject(ModalError::Destroyed) => {
                                prop_assert_eq!(lc.state(), LifecycleState::Destroyed);
                            }
                            Step::Reject(ModalError::Conflict(other)) => {
                                prop_assert_ne!(other, kind);
                                prop_assert_eq!(lc.outstanding(), Some(other));
                            }
                        },
                        Op::Advance => {
                            if let Some(kind) = lc.outstanding() {
                                lc.complete(kind);
                            }
                        }
                    }

                    if was_destroyed {
                        prop_assert_eq!(lc.state(), LifecycleState::Destroyed);
                    }
                    if lc.state().is_transient() {
                        prop_assert!(lc.outstanding().is_some());
                    }
                }
            }
        }
    }
}

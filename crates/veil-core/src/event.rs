#![forbid(unsafe_code)]

//! Typed, key-indexed listener registry.
//!
//! An [`Emitter<K, A>`] maps event keys of type `K` to listeners that accept a
//! borrowed payload `&A`. Keys are usually a closed enumeration so that
//! dispatch is checked at compile time rather than by string matching.
//!
//! # Invariants
//!
//! 1. Listeners for one key are invoked in registration order.
//! 2. `emit` on a key with no listeners is a no-op.
//! 3. `emit` works on a snapshot: listeners added or removed while an emit is
//!    running take effect from the next emit. Listeners may therefore call
//!    back into the emitter.
//! 4. [`ListenerId`]s are never reused within one emitter.
//!
//! # Failure Modes
//!
//! - Listener panic: propagates to the caller of `emit`. Listeners after the
//!   panicking one are not invoked.
//! - `off` with an unknown or already-removed id returns `false`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle for removing a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Get the raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

type Listener<A> = Rc<dyn Fn(&A)>;

struct Slot<K, A: ?Sized> {
    id: ListenerId,
    key: K,
    listener: Listener<A>,
}

/// Registry of listeners keyed by `K`, each receiving `&A`.
pub struct Emitter<K, A: ?Sized> {
    slots: RefCell<Vec<Slot<K, A>>>,
    next_id: Cell<u64>,
}

impl<K: PartialEq, A: ?Sized> Emitter<K, A> {
    /// Create an emitter with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Register `listener` for `key`.
    pub fn on(&self, key: K, listener: impl Fn(&A) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.slots.borrow_mut().push(Slot {
            id,
            key,
            listener: Rc::new(listener),
        });
        id
    }

    /// Remove a listener. Returns `true` if it was registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut slots = self.slots.borrow_mut();
        let before = slots.len();
        slots.retain(|slot| slot.id != id);
        slots.len() != before
    }

    /// Invoke every listener registered for `key`, in registration order.
    pub fn emit(&self, key: &K, payload: &A) {
        // Snapshot so listeners can re-enter `on`/`off`/`emit`.
        let listeners: Vec<Listener<A>> = self
            .slots
            .borrow()
            .iter()
            .filter(|slot| slot.key == *key)
            .map(|slot| Rc::clone(&slot.listener))
            .collect();

        for listener in listeners {
            listener(payload);
        }
    }

    /// Number of listeners registered for `key`.
    #[must_use]
    pub fn listener_count(&self, key: &K) -> usize {
        self.slots
            .borrow()
            .iter()
            .filter(|slot| slot.key == *key)
            .count()
    }

    /// Whether no listener is registered under any key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

impl<K: PartialEq, A: ?Sized> Default for Emitter<K, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, A: ?Sized> fmt::Debug for Emitter<K, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.slots.borrow().len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Key {
        Open,
        Close,
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let emitter: Emitter<Key, u32> = Emitter::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            emitter.on(Key::Open, move |v| log.borrow_mut().push(format!("{tag}{v}")));
        }

        emitter.emit(&Key::Open, &7);
        assert_eq!(*log.borrow(), vec!["a7", "b7", "c7"]);
    }

    #[test]
    fn emit_only_reaches_matching_key() {
        let emitter: Emitter<Key, ()> = Emitter::new();
        let opened = Rc::new(Cell::new(0));
        let closed = Rc::new(Cell::new(0));

        let o = Rc::clone(&opened);
        emitter.on(Key::Open, move |_| o.set(o.get() + 1));
        let c = Rc::clone(&closed);
        emitter.on(Key::Close, move |_| c.set(c.get() + 1));

        emitter.emit(&Key::Close, &());
        assert_eq!(opened.get(), 0);
        assert_eq!(closed.get(), 1);
    }

    #[test]
    fn emit_without_listeners_is_noop() {
        let emitter: Emitter<Key, str> = Emitter::new();
        emitter.emit(&Key::Open, "payload");
        assert!(emitter.is_empty());
    }

    #[test]
    fn off_removes_listener_once() {
        let emitter: Emitter<Key, ()> = Emitter::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let id = emitter.on(Key::Open, move |_| h.set(h.get() + 1));

        assert!(emitter.off(id));
        assert!(!emitter.off(id));
        emitter.emit(&Key::Open, &());
        assert_eq!(hits.get(), 0);
        assert_eq!(emitter.listener_count(&Key::Open), 0);
    }

    #[test]
    fn listener_registered_during_emit_waits_for_next_emit() {
        let emitter: Rc<Emitter<Key, ()>> = Rc::new(Emitter::new());
        let late_hits = Rc::new(Cell::new(0));

        let em = Rc::clone(&emitter);
        let late = Rc::clone(&late_hits);
        emitter.on(Key::Open, move |_| {
            let late = Rc::clone(&late);
            em.on(Key::Open, move |_| late.set(late.get() + 1));
        });

        emitter.emit(&Key::Open, &());
        assert_eq!(late_hits.get(), 0);
        assert_eq!(emitter.listener_count(&Key::Open), 2);

        emitter.emit(&Key::Open, &());
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    #[should_panic(expected = "listener failed")]
    fn listener_panic_propagates() {
        let emitter: Emitter<Key, ()> = Emitter::new();
        emitter.on(Key::Open, |_| panic!("listener failed"));
        emitter.emit(&Key::Open, &());
    }

    #[test]
    fn listener_ids_are_unique() {
        let emitter: Emitter<Key, ()> = Emitter::new();
        let a = emitter.on(Key::Open, |_| {});
        emitter.off(a);
        let b = emitter.on(Key::Open, |_| {});
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }
}

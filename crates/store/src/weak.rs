//! Identity-keyed side table with weak ownership.

use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Entries accumulated before the first automatic prune.
const MIN_PRUNE_THRESHOLD: usize = 16;

/// Maps receiver identity to a payload without owning the receiver.
///
/// The key is the address of the receiver's `Rc` allocation. Because every
/// entry holds a `Weak` to that allocation, the address cannot be handed out
/// again while the entry exists, so a new receiver never inherits a dead
/// receiver's payload.
pub struct WeakStore<T: ?Sized, P> {
    entries: HashMap<usize, Entry<T, P>>,
    prune_at: usize,
}

struct Entry<T: ?Sized, P> {
    owner: Weak<T>,
    payload: P,
}

impl<T: ?Sized, P> Entry<T, P> {
    fn is_live(&self) -> bool {
        self.owner.strong_count() > 0
    }
}

fn identity<T: ?Sized>(receiver: &Rc<T>) -> usize {
    Rc::as_ptr(receiver).cast::<()>() as usize
}

impl<T: ?Sized, P> WeakStore<T, P> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            prune_at: MIN_PRUNE_THRESHOLD,
        }
    }

    /// Borrow the payload stored for `receiver`, if any.
    pub fn get_ref(&self, receiver: &Rc<T>) -> Option<&P> {
        self.entries
            .get(&identity(receiver))
            .filter(|entry| entry.is_live())
            .map(|entry| &entry.payload)
    }

    /// Create or replace the payload for `receiver`.
    pub fn set(&mut self, receiver: &Rc<T>, payload: P) {
        self.entries.insert(
            identity(receiver),
            Entry {
                owner: Rc::downgrade(receiver),
                payload,
            },
        );

        if self.entries.len() >= self.prune_at {
            self.prune();
            self.prune_at = (self.entries.len() * 2).max(MIN_PRUNE_THRESHOLD);
        }
    }

    /// Number of entries whose receiver is still alive.
    pub fn len(&self) -> usize {
        self.entries.values().filter(|e| e.is_live()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entries whose receiver has been deallocated.
    ///
    /// Returns how many entries were removed. Calling this is never required
    /// for correctness; it only releases the memory held by dead entries.
    pub fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live());
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::trace!(removed, remaining = self.entries.len(), "pruned weak store");
        }
        removed
    }
}

impl<T: ?Sized, P: Clone> WeakStore<T, P> {
    /// Current payload for `receiver`, or `None` if it was never set.
    pub fn get(&self, receiver: &Rc<T>) -> Option<P> {
        self.get_ref(receiver).cloned()
    }
}

impl<T: ?Sized, P: Clone + Default> WeakStore<T, P> {
    /// Current payload for `receiver`, treating absence as `P::default()`.
    pub fn get_or_default(&self, receiver: &Rc<T>) -> P {
        self.get(receiver).unwrap_or_default()
    }

    /// Replace the payload with `f(current)` and return the previous value.
    pub fn update(&mut self, receiver: &Rc<T>, f: impl FnOnce(&P) -> P) -> P {
        let current = self.get_or_default(receiver);
        self.set(receiver, f(&current));
        current
    }
}

impl<T: ?Sized, P> Default for WeakStore<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized, P: std::fmt::Debug> std::fmt::Debug for WeakStore<T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakStore")
            .field("live", &self.len())
            .field("total", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Receiver {
        text: String,
    }

    fn receiver(text: &str) -> Rc<Receiver> {
        Rc::new(Receiver {
            text: text.to_string(),
        })
    }

    #[test]
    fn test_absent_until_set() {
        let mut store: WeakStore<Receiver, u32> = WeakStore::new();
        let r = receiver("abc");

        assert_eq!(store.get(&r), None);
        assert_eq!(store.get_or_default(&r), 0);

        store.set(&r, 7);
        assert_eq!(store.get(&r), Some(7));

        store.set(&r, 8);
        assert_eq!(store.get(&r), Some(8));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_keys_by_identity_not_equality() {
        let mut store: WeakStore<Receiver, u32> = WeakStore::new();
        let a = receiver("same");
        let b = receiver("same");
        assert_eq!(a, b);

        store.set(&a, 1);
        assert_eq!(store.get(&a), Some(1));
        assert_eq!(store.get(&b), None);

        let alias = Rc::clone(&a);
        assert_eq!(store.get(&alias), Some(1));
    }

    #[test]
    fn test_does_not_keep_receiver_alive() {
        let mut store: WeakStore<Receiver, u32> = WeakStore::new();
        let r = receiver("abc");
        store.set(&r, 1);

        assert_eq!(Rc::strong_count(&r), 1);
        let weak = Rc::downgrade(&r);
        drop(r);

        assert!(weak.upgrade().is_none());
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_new_receiver_sees_no_leaked_state() {
        let mut store: WeakStore<Receiver, u32> = WeakStore::new();
        for _ in 0..100 {
            let r = receiver("abc");
            assert_eq!(store.get(&r), None);
            store.set(&r, 5);
        }
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_prune_removes_dead_entries() {
        let mut store: WeakStore<Receiver, u32> = WeakStore::new();
        let keep = receiver("keep");
        store.set(&keep, 1);
        for _ in 0..3 {
            store.set(&receiver("gone"), 1);
        }

        assert_eq!(store.prune(), 3);
        assert_eq!(store.prune(), 0);
        assert_eq!(store.get(&keep), Some(1));
    }

    #[test]
    fn test_set_prunes_automatically() {
        let mut store: WeakStore<Receiver, u32> = WeakStore::new();
        for _ in 0..(MIN_PRUNE_THRESHOLD * 4) {
            store.set(&receiver("gone"), 1);
        }
        assert!(store.entries.len() < MIN_PRUNE_THRESHOLD);
    }

    #[test]
    fn test_update_returns_previous() {
        let mut store: WeakStore<Receiver, u32> = WeakStore::new();
        let r = receiver("abc");

        assert_eq!(store.update(&r, |n| n + 1), 0);
        assert_eq!(store.update(&r, |n| n + 1), 1);
        assert_eq!(store.get(&r), Some(2));
    }

    #[test]
    fn test_unsized_receivers() {
        let mut store: WeakStore<str, usize> = WeakStore::new();
        let r: Rc<str> = Rc::from("hello");
        store.set(&r, r.len());
        assert_eq!(store.get(&r), Some(5));
    }
}

//! Owning per-object state, keyed by the mixin that uses it.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;

/// A bag of typed values embedded in an object, one per mixin marker type.
#[derive(Default)]
pub struct StateSlots {
    slots: RefCell<HashMap<TypeId, Box<dyn Any>>>,
}

impl StateSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under marker `M`, or `None` if unset.
    ///
    /// A value of a different type stored under the same marker reads as
    /// unset.
    pub fn get<M: 'static, V: Clone + 'static>(&self) -> Option<V> {
        let slots = self.slots.borrow();
        let value = slots.get(&TypeId::of::<M>())?;
        match value.downcast_ref::<V>() {
            Some(v) => Some(v.clone()),
            None => {
                tracing::warn!(
                    marker = std::any::type_name::<M>(),
                    expected = std::any::type_name::<V>(),
                    "state slot holds a value of another type"
                );
                None
            }
        }
    }

    /// Store `value` under marker `M`, replacing any previous value.
    pub fn set<M: 'static, V: 'static>(&self, value: V) {
        self.slots
            .borrow_mut()
            .insert(TypeId::of::<M>(), Box::new(value));
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

impl std::fmt::Debug for StateSlots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateSlots")
            .field("len", &self.len())
            .finish()
    }
}

/// Objects that carry their own mixin state.
///
/// Implementors only expose their [`StateSlots`]; the accessors are provided.
pub trait Stateful {
    fn slots(&self) -> &StateSlots;

    /// State for mixin `M`, or `initial` if it has none yet.
    fn state<M: 'static, V: Clone + 'static>(&self, initial: V) -> V {
        self.slots().get::<M, V>().unwrap_or(initial)
    }

    fn set_state<M: 'static, V: 'static>(&self, value: V) {
        self.slots().set::<M, V>(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Counter {}
    enum Label {}

    #[derive(Default)]
    struct Object {
        slots: StateSlots,
    }

    impl Stateful for Object {
        fn slots(&self) -> &StateSlots {
            &self.slots
        }
    }

    #[test]
    fn test_initial_when_unset() {
        let obj = Object::default();
        assert_eq!(obj.state::<Counter, u32>(0), 0);
        assert!(obj.slots().is_empty());
    }

    #[test]
    fn test_markers_are_independent() {
        let obj = Object::default();
        obj.set_state::<Counter, u32>(3);
        obj.set_state::<Label, String>("??".to_string());

        assert_eq!(obj.state::<Counter, u32>(0), 3);
        assert_eq!(obj.state::<Label, String>(String::new()), "??");
        assert_eq!(obj.slots().len(), 2);
    }

    #[test]
    fn test_type_mismatch_reads_as_unset() {
        let obj = Object::default();
        obj.set_state::<Counter, u32>(3);
        assert_eq!(obj.state::<Counter, String>("x".to_string()), "x");
    }

    #[test]
    fn test_objects_do_not_share_state() {
        let a = Object::default();
        let b = Object::default();
        a.set_state::<Counter, u32>(1);
        assert_eq!(b.state::<Counter, u32>(0), 0);
    }
}

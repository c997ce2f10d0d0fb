//! Per-object auxiliary state for attached behavior.
//!
//! Mixins are free functions: they cannot add fields to the objects they are
//! attached to. This crate gives them two places to keep per-object memory.
//!
//! # Core Concepts
//!
//! ## WeakStore
//!
//! The [`WeakStore`] is a side table keyed by receiver identity. It holds only
//! [`Weak`](std::rc::Weak) references, so an entry never keeps its receiver
//! alive. Once the receiver is dropped its entry is no longer observable and is
//! reclaimed on a later prune. There is no removal call.
//!
//! Identity means allocation identity: two receivers with equal contents are
//! two entries.
//!
//! ## StateSlots
//!
//! [`StateSlots`] is the owning alternative. The object embeds the slots and
//! implements [`Stateful`]; each mixin keys its value by a marker type, so two
//! mixins on the same object never see each other's state.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use store::WeakStore;
//!
//! let mut calls: WeakStore<String, u32> = WeakStore::new();
//! let a = Rc::new("a".to_string());
//! let b = Rc::new("a".to_string());
//!
//! calls.set(&a, 3);
//! assert_eq!(calls.get(&a), Some(3));
//! assert_eq!(calls.get(&b), None);
//!
//! drop(a);
//! assert_eq!(calls.len(), 0);
//! ```

mod state;
mod weak;

pub use state::{StateSlots, Stateful};
pub use weak::WeakStore;

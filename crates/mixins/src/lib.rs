//! Mixins: behavior attached to messages from the outside.
//!
//! Three ways of giving a type behavior it does not declare:
//!
//! - **Free functions with a weak side table** ([`escalate`],
//!   [`Escalator`]). Per-receiver state lives in a
//!   [`WeakStore`](store::WeakStore) keyed by identity and never keeps a
//!   message alive.
//! - **Traits with provided methods** ([`Escalatable`], [`Confusable`], …).
//!   State, when needed, lives in the object's own
//!   [`StateSlots`](store::StateSlots).
//! - **Resolved mixins** ([`caveats::resolver`]). Calls are bound by static
//!   type, which is where the surprises are: own instance methods shadow
//!   mixins, and capability mixins need the capability in the static type.
//!
//! # Example
//!
//! ```
//! use mixins::{Message, append, escalate, escalate_uppercase_only};
//!
//! let m = Message::new("abc");
//! assert_eq!(escalate_uppercase_only(&m), "ABC");
//! assert_eq!(escalate(&m), "ABC");
//! assert_eq!(escalate(&m), "ABC!");
//!
//! append(&m, &m);
//! assert_eq!(m.text(), "abcabc");
//! ```

mod capability;
pub mod caveats;
mod error;
mod escalate;
mod message;

pub use capability::{Confusable, Escalatable, LoudEscalatable, Texted, Unicodable};
pub use error::{Error, Result};
pub use escalate::{Escalator, append, escalate, escalate_uppercase_only, tracked_receivers};
pub use message::{MESSAGE, Message};

//! Attaching behavior to objects and deciding which behavior a call runs.
//!
//! A call site is `(static type, name, arguments)`. Resolution never looks at
//! the runtime class of the receiver; it only sees what the static type
//! declares:
//!
//! 1. Instance members visible from the static type (its own and its
//!    ancestors') form the whole candidate set when any exist. Mixins of the
//!    same name are not consulted.
//! 2. Otherwise the [`MixinRegistry`] supplies mixins attached to the static
//!    type, a superclass, or a capability the static type declares.
//! 3. Overload resolution ranks each argument's [`Conversion`] and compares
//!    candidates left to right. A tie for best is [`Error::AmbiguousMatch`].
//!
//! A consequence worth knowing: a mixin attached to a capability is invisible
//! through a static type that does not declare that capability, even when the
//! object behind it implements it. Upcasting the call site to the capability
//! makes it visible.
//!
//! # Example
//!
//! ```
//! use dispatch::{body, ClassDecl, MixinFn, ParamType, Resolver, StaticType, TypeTable, Value};
//!
//! let mut types = TypeTable::new();
//! types.declare_class(ClassDecl::new("Message"))?;
//! let mut resolver = Resolver::new(types);
//!
//! resolver.register(MixinFn::new(
//!     "describe",
//!     StaticType::class("Message"),
//!     vec![ParamType::Int],
//!     body(|_, _| Ok(Value::text("int"))),
//! ))?;
//! resolver.register(MixinFn::new(
//!     "describe",
//!     StaticType::class("Message"),
//!     vec![ParamType::Any],
//!     body(|_, _| Ok(Value::text("any"))),
//! ))?;
//!
//! let call = resolver.resolve(&StaticType::class("Message"), "describe", &[Value::Int(1)])?;
//! assert_eq!(call.params, vec![ParamType::Int]);
//! # Ok::<(), dispatch::Error>(())
//! ```

mod conversion;
mod error;
mod registry;
mod resolver;
mod table;
mod types;

pub use conversion::{Conversion, classify, rank};
pub use error::{Error, Result};
pub use registry::{Body, MixinFn, MixinId, MixinRegistry, body};
pub use resolver::{Origin, Resolution, Resolver};
pub use table::{CapabilityDecl, ClassDecl, Declarations, Member, Signature, TypeTable};
pub use types::{Object, ObjectRef, ParamType, StaticType, Value};

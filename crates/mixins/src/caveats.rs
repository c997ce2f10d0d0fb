//! A small class hierarchy where attached behavior and instance methods
//! collide.
//!
//! | class                       | parent           | capabilities |
//! |-----------------------------|------------------|--------------|
//! | `Message`                   |                  |              |
//! | `UnicodeMessage`            | `Message`        | `Unicodable` |
//! | `EscalatableUnicodeMessage` | `UnicodeMessage` | `Escalatable`|
//! | `DynamicMessage`            | `Message`        | `Escalatable`|
//!
//! `DynamicMessage` declares its own `escalated1()` (lowercasing),
//! `sophisticated1(any)` and `sophisticated2(int)`. The mixins are
//! `escalated1()` on `Escalatable` (uppercasing), `escalated2()`,
//! `append(Message)`, `confuse()`, `sophisticated1(int)` and
//! `sophisticated2(any)` on `Message`, and `utf8()` on `Unicodable`.
//!
//! Calling `escalated1` on a `DynamicMessage` runs the instance method.
//! Only after upcasting the call site to `Escalatable` does the mixin run.

use dispatch::{
    MixinFn, ObjectRef, ParamType, Resolver, StaticType, TypeTable, Value, body,
};
use std::cell::RefCell;
use std::rc::Rc;
use store::WeakStore;

use crate::capability::{Confusable, Unicodable};
use crate::escalate::{append, escalate_uppercase_only, escalated};
use crate::{Error, Message};

pub const UNICODE_MESSAGE: &str = "UnicodeMessage";
pub const ESCALATABLE_UNICODE_MESSAGE: &str = "EscalatableUnicodeMessage";
pub const DYNAMIC_MESSAGE: &str = "DynamicMessage";
pub const ESCALATABLE: &str = "Escalatable";
pub const UNICODABLE: &str = "Unicodable";

const TYPES: &str = include_str!("caveats.toml");

fn message(obj: &ObjectRef) -> dispatch::Result<Rc<Message>> {
    Ok(Message::from_object(obj)?)
}

fn describe(prefix: &str, value: &Value) -> Value {
    Value::text(format!("{prefix}: {value}"))
}

/// Build a resolver for the caveat hierarchy with every body bound.
pub fn resolver() -> dispatch::Result<Resolver> {
    let mut resolver = Resolver::new(TypeTable::parse(TYPES)?);
    let message_class = StaticType::class(crate::MESSAGE);

    resolver.define_method(
        crate::MESSAGE,
        "text",
        vec![],
        body(|obj, _| Ok(Value::Text(message(obj)?.text()))),
    )?;

    resolver.define_method(
        DYNAMIC_MESSAGE,
        "escalated1",
        vec![],
        body(|obj, _| Ok(Value::Text(message(obj)?.text().to_lowercase()))),
    )?;
    resolver.define_method(
        DYNAMIC_MESSAGE,
        "sophisticated1",
        vec![ParamType::Any],
        body(|_, args| Ok(describe("Message", &Value::text(args[0].kind())))),
    )?;
    resolver.define_method(
        DYNAMIC_MESSAGE,
        "sophisticated2",
        vec![ParamType::Int],
        body(|_, args| Ok(describe("Message", &Value::text(args[0].kind())))),
    )?;

    resolver.register(MixinFn::new(
        "escalated1",
        StaticType::capability(ESCALATABLE),
        vec![],
        body(|obj, _| Ok(Value::Text(escalate_uppercase_only(&*message(obj)?)))),
    ))?;

    let calls: Rc<RefCell<WeakStore<dyn dispatch::Object, usize>>> = Rc::default();
    resolver.register(MixinFn::new(
        "escalated2",
        message_class.clone(),
        vec![],
        body(move |obj, _| {
            let text = message(obj)?.text();
            let n = calls.borrow_mut().update(obj, |n| n + 1);
            Ok(Value::Text(escalated(&text, n)))
        }),
    ))?;

    resolver.register(MixinFn::new(
        "append",
        message_class.clone(),
        vec![ParamType::Class(crate::MESSAGE.to_string())],
        body(|obj, args| {
            let Value::Object(other) = &args[0] else {
                return Err(Error::Argument {
                    expected: crate::MESSAGE.to_string(),
                    found: args[0].kind().to_string(),
                }
                .into());
            };
            append(&*message(obj)?, &*message(other)?);
            Ok(Value::Unit)
        }),
    ))?;

    resolver.register(MixinFn::new(
        "confuse",
        message_class.clone(),
        vec![],
        body(|obj, _| Ok(Value::Text(message(obj)?.confuse()))),
    ))?;

    resolver.register(MixinFn::new(
        "sophisticated1",
        message_class.clone(),
        vec![ParamType::Int],
        body(|_, args| Ok(describe("Mixin", &args[0]))),
    ))?;
    resolver.register(MixinFn::new(
        "sophisticated2",
        message_class,
        vec![ParamType::Any],
        body(|_, args| Ok(describe("Mixin", &args[0]))),
    ))?;

    resolver.register(MixinFn::new(
        "utf8",
        StaticType::capability(UNICODABLE),
        vec![],
        body(|obj, _| Ok(Value::Bytes(message(obj)?.utf8()))),
    ))?;

    tracing::debug!(mixins = resolver.mixins().len(), "built caveat resolver");
    Ok(resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    /// Claims to be a `Message` without being one.
    #[derive(Debug)]
    struct Impostor;

    impl dispatch::Object for Impostor {
        fn class(&self) -> &str {
            crate::MESSAGE
        }

        fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
            self
        }
    }

    #[test]
    fn test_escalated2_rejects_foreign_receiver_every_time() {
        let resolver = resolver().unwrap();
        let impostor: ObjectRef = Rc::new(Impostor);

        for _ in 0..2 {
            let err = resolver.invoke_exact(&impostor, "escalated2", &[]).unwrap_err();
            assert!(matches!(err, dispatch::Error::Body(_)), "{err}");
        }

        let m = Message::new("abc").as_object();
        let out = resolver.invoke_exact(&m, "escalated2", &[]).unwrap();
        assert_eq!(out, Value::text("ABC"));
    }

    #[test]
    fn test_escalated1_and_append_bodies_run() {
        let resolver = resolver().unwrap();
        let m = Message::of_class(ESCALATABLE_UNICODE_MESSAGE, "ab");
        let obj = m.as_object();

        let out = resolver.invoke_exact(&obj, "escalated1", &[]).unwrap();
        assert_eq!(out, Value::text("AB"));

        resolver
            .invoke_exact(&obj, "append", &[Value::Object(obj.clone())])
            .unwrap();
        assert_eq!(m.text(), "abab");
    }

    #[test]
    fn test_execute_with_mismatched_arguments_does_not_reach_body() {
        let resolver = resolver().unwrap();
        let m = Message::new("x").as_object();
        let resolution = resolver
            .resolve(&StaticType::class(crate::MESSAGE), "sophisticated1", &[Value::Int(1)])
            .unwrap();

        let err = resolver
            .execute(&resolution, &m, &[Value::text("Hans")])
            .unwrap_err();
        assert!(matches!(err, dispatch::Error::NoMatchingMember { .. }));

        let err = resolver.execute(&resolution, &m, &[]).unwrap_err();
        assert!(matches!(err, dispatch::Error::NoMatchingMember { .. }));
    }

    #[test]
    fn test_declared_types() {
        let resolver = resolver().unwrap();
        let types = resolver.types();
        assert!(types.conforms(DYNAMIC_MESSAGE, &StaticType::capability(ESCALATABLE)));
        assert!(types.conforms(ESCALATABLE_UNICODE_MESSAGE, &StaticType::class(UNICODE_MESSAGE)));
        assert!(!types.conforms(UNICODE_MESSAGE, &StaticType::capability(ESCALATABLE)));
        assert_eq!(resolver.mixins().len(), 7);
    }

    #[test]
    fn test_text_through_capability_dispatches_to_class() {
        let resolver = resolver().unwrap();
        let m = Message::of_class(DYNAMIC_MESSAGE, "Hello");
        let out = resolver
            .invoke(&m.as_object(), &StaticType::capability("Texted"), "text", &[])
            .unwrap();
        assert_eq!(out, Value::text("Hello"));
    }

    #[test]
    fn test_append_rejects_non_message_argument() {
        let resolver = resolver().unwrap();
        let m = Message::new("x");
        let err = resolver
            .invoke_exact(&m.as_object(), "append", &[Value::Int(1)])
            .unwrap_err();
        assert!(matches!(err, dispatch::Error::NoMatchingMember { .. }));
    }
}

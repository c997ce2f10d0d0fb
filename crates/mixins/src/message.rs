//! The demo receiver.

use dispatch::{Object, ObjectRef};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use store::{StateSlots, Stateful};

use crate::{Error, Result};

/// Class name of a plain message.
pub const MESSAGE: &str = "Message";

/// A mutable piece of text. The class name is the object's dynamic type as
/// far as dispatch is concerned, so one struct stands in for every message
/// subclass.
#[derive(Debug)]
pub struct Message {
    class: &'static str,
    text: RefCell<String>,
    slots: StateSlots,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Rc<Self> {
        Self::of_class(MESSAGE, text)
    }

    pub fn of_class(class: &'static str, text: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            class,
            text: RefCell::new(text.into()),
            slots: StateSlots::new(),
        })
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    /// Concatenate `suffix` onto the text in place.
    pub fn push_text(&self, suffix: &str) {
        self.text.borrow_mut().push_str(suffix);
    }

    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.borrow_mut() = text.into();
    }

    /// View this message as a dispatch receiver. Identity is preserved.
    pub fn as_object(self: &Rc<Self>) -> ObjectRef {
        Rc::clone(self) as ObjectRef
    }

    /// Recover the message behind a dispatch receiver.
    pub fn from_object(obj: &ObjectRef) -> Result<Rc<Self>> {
        Rc::clone(obj)
            .into_any()
            .downcast::<Self>()
            .map_err(|_| Error::NotAMessage(obj.class().to_string()))
    }
}

impl Object for Message {
    fn class(&self) -> &str {
        self.class
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

impl Stateful for Message {
    fn slots(&self) -> &StateSlots {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_round_trip_keeps_identity() {
        let m = Message::new("abc");
        let obj = m.as_object();
        assert_eq!(obj.class(), MESSAGE);

        let back = Message::from_object(&obj).unwrap();
        assert!(Rc::ptr_eq(&m, &back));
    }

    #[test]
    fn test_set_text() {
        let m = Message::of_class("DynamicMessage", "a");
        m.set_text("b");
        assert_eq!(m.text(), "b");
        assert_eq!(m.class(), "DynamicMessage");
    }
}

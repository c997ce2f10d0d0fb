//! Capabilities as traits with provided methods.
//!
//! Implementing the one required method of [`Texted`] is all a type needs to
//! pick up the behavior of every capability built on it.

use store::Stateful;

use crate::Message;
use crate::escalate::escalated;

/// Anything with text.
pub trait Texted {
    fn text(&self) -> String;
}

/// Caps escalate.
pub trait Escalatable: Texted {
    fn escalated(&self) -> String {
        escalated(&self.text(), 0)
    }
}

pub trait Unicodable: Texted {
    /// The text encoded as UTF-8.
    fn utf8(&self) -> Vec<u8> {
        self.text().into_bytes()
    }
}

/// Marker keying [`LoudEscalatable`] state in an object's slots.
enum EscalationCount {}

/// Escalation that keeps its counter inside the object.
pub trait LoudEscalatable: Texted + Stateful {
    fn escalated_loudly(&self) -> String {
        let n = self.state::<EscalationCount, usize>(0);
        self.set_state::<EscalationCount, usize>(n + 1);
        escalated(&self.text(), n)
    }
}

enum Confusion {}

/// Appends a suffix that doubles on every call: `?`, `??`, `????`, …
pub trait Confusable: Texted + Stateful {
    fn confuse(&self) -> String {
        let s = self.state::<Confusion, String>("?".to_string());
        self.set_state::<Confusion, String>(format!("{s}{s}"));
        format!("{}{s}", self.text())
    }
}

impl Texted for Message {
    fn text(&self) -> String {
        Message::text(self)
    }
}

impl Escalatable for Message {}
impl Unicodable for Message {}
impl LoudEscalatable for Message {}
impl Confusable for Message {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalated() {
        let m = Message::new("meh");
        assert_eq!(m.escalated(), "MEH");
        assert_eq!(m.escalated(), "MEH");
    }

    #[test]
    fn test_utf8() {
        let m = Message::new("\u{1F608}");
        assert_eq!(m.utf8(), vec![0xF0, 0x9F, 0x98, 0x88]);
    }

    #[test]
    fn test_loud_escalation_is_per_object() {
        let m1 = Message::new("Hans");
        let m2 = Message::new("Dampf");
        assert_eq!(m1.escalated_loudly(), "HANS");
        assert_eq!(m1.escalated_loudly(), "HANS!");
        assert_eq!(m2.escalated_loudly(), "DAMPF");
        assert_eq!(m1.escalated_loudly(), "HANS!!");
    }

    #[test]
    fn test_confuse_doubles() {
        let m = Message::new("Hans");
        assert_eq!(m.confuse(), "Hans?");
        assert_eq!(m.confuse(), "Hans??");
        assert_eq!(m.confuse(), "Hans????");
        assert_eq!(Message::new("Dampf").confuse(), "Dampf?");
    }

    #[test]
    fn test_confusion_and_escalation_do_not_share_slots() {
        let m = Message::new("a");
        m.confuse();
        assert_eq!(m.escalated_loudly(), "A");
        assert_eq!(m.confuse(), "a??");
    }
}

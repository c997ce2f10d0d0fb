//! Escalation: the more often a message is escalated, the louder it gets.

use std::cell::RefCell;
use std::rc::Rc;
use store::WeakStore;

use crate::Message;

/// `text` uppercased with `bangs` exclamation marks appended.
pub(crate) fn escalated(text: &str, bangs: usize) -> String {
    let mut out = text.to_uppercase();
    out.push_str(&"!".repeat(bangs));
    out
}

/// Stateful escalation with its own weak call-count table.
#[derive(Debug, Default)]
pub struct Escalator {
    calls: WeakStore<Message, usize>,
}

impl Escalator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uppercase the text and append one `!` per earlier escalation of this
    /// same receiver.
    pub fn escalate(&mut self, receiver: &Rc<Message>) -> String {
        let n = self.calls.update(receiver, |n| n + 1);
        tracing::trace!(bangs = n, "escalating message");
        escalated(&receiver.text(), n)
    }

    /// Receivers that currently have a count.
    pub fn tracked(&self) -> usize {
        self.calls.len()
    }
}

thread_local! {
    static ESCALATOR: RefCell<Escalator> = RefCell::new(Escalator::new());
}

/// Escalate using the thread's shared call-count table.
pub fn escalate(receiver: &Rc<Message>) -> String {
    ESCALATOR.with(|escalator| escalator.borrow_mut().escalate(receiver))
}

/// Receivers tracked by the thread's shared table.
pub fn tracked_receivers() -> usize {
    ESCALATOR.with(|escalator| escalator.borrow().tracked())
}

/// Uppercase the text. Keeps no state.
pub fn escalate_uppercase_only(receiver: &Message) -> String {
    escalated(&receiver.text(), 0)
}

/// Append `other`'s text to `receiver`'s.
///
/// `other` is read before `receiver` is written, so appending a message to
/// itself doubles its text.
pub fn append(receiver: &Message, other: &Message) {
    let suffix = other.text();
    receiver.push_text(&suffix);
}

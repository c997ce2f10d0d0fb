//! Resolution and declaration errors.

use crate::StaticType;
use thiserror::Error;

/// Dispatch errors.
///
/// Every error is local to the call or declaration that produced it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Neither an instance member nor an attached mixin named `name` is
    /// visible from the call site's static type.
    #[error("no member '{name}' visible on {ty}{}", detail_suffix(.detail))]
    NoMatchingMember {
        ty: StaticType,
        name: String,
        detail: Option<String>,
    },

    /// Two or more candidates are equally good for the call.
    #[error("call to '{name}' on {ty} is ambiguous between: {}", .candidates.join(", "))]
    AmbiguousMatch {
        ty: StaticType,
        name: String,
        candidates: Vec<String>,
    },

    /// A type name that was never declared.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// The receiver's class cannot be viewed as the call site's static type.
    #[error("object of class {class} cannot be used as {ty}")]
    InvalidReceiver { ty: StaticType, class: String },

    /// A declared instance method has no body bound for the receiver's class.
    #[error("{class}.{name} is declared but has no implementation")]
    Unimplemented { class: String, name: String },

    /// A declaration conflicts with or refers outside the type table.
    #[error("invalid declaration: {0}")]
    InvalidDeclaration(String),

    /// Failed to parse a type table.
    #[error("failed to parse type table: {0}")]
    Parse(String),

    /// A method body rejected its arguments or receiver.
    #[error("method body failed: {0}")]
    Body(String),

    /// An I/O error occurred while reading a type table.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_ref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

impl Error {
    pub(crate) fn no_member(ty: &StaticType, name: &str) -> Self {
        Self::NoMatchingMember {
            ty: ty.clone(),
            name: name.to_string(),
            detail: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

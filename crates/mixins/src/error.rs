use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A mixin body received an object that is not a [`Message`](crate::Message).
    #[error("expected a message, got an object of class {0}")]
    NotAMessage(String),

    /// A mixin body received an argument of the wrong kind.
    #[error("expected {expected} argument, got {found}")]
    Argument { expected: String, found: String },

    #[error(transparent)]
    Dispatch(#[from] dispatch::Error),
}

impl From<Error> for dispatch::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Dispatch(inner) => inner,
            other => dispatch::Error::Body(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

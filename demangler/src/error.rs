use std::borrow::Cow;

use thiserror::Error;

/// Failure to demangle a symbol. Every variant points at the byte offset
/// in the mangled input where parsing gave up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("syntax error at offset {offset}: expected {expected}, found '{found}'")]
    Syntax {
        offset: usize,
        expected: Cow<'static, str>,
        found: char,
    },

    #[error("unexpected end of input at offset {offset}")]
    PrematureEnd { offset: usize },

    #[error("back-reference {index} at offset {offset} was never registered")]
    InvalidBackReference { index: usize, offset: usize },

    #[error("unsupported construct '{code}' at offset {offset}")]
    UnsupportedConstruct { code: String, offset: usize },

    #[error("trailing input at offset {offset}")]
    TrailingInput { offset: usize },

    #[error("recursion limit reached at offset {offset}")]
    RecursionLimit { offset: usize },

    /// Neither grammar accepted the input, `primary` is the first attempt's failure.
    #[error("{primary}")]
    AmbiguousRetryExhausted { primary: Box<Error> },
}

/// Discriminant of an [`Error`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    PrematureEnd,
    InvalidBackReference,
    UnsupportedConstruct,
    TrailingInput,
    RecursionLimit,
    AmbiguousRetryExhausted,
}

impl Error {
    /// Byte offset into the mangled input. A retry failure reports the primary offset.
    pub fn offset(&self) -> usize {
        match self {
            Error::Syntax { offset, .. }
            | Error::PrematureEnd { offset }
            | Error::InvalidBackReference { offset, .. }
            | Error::UnsupportedConstruct { offset, .. }
            | Error::TrailingInput { offset }
            | Error::RecursionLimit { offset } => *offset,
            Error::AmbiguousRetryExhausted { primary } => primary.offset(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax { .. } => ErrorKind::Syntax,
            Error::PrematureEnd { .. } => ErrorKind::PrematureEnd,
            Error::InvalidBackReference { .. } => ErrorKind::InvalidBackReference,
            Error::UnsupportedConstruct { .. } => ErrorKind::UnsupportedConstruct,
            Error::TrailingInput { .. } => ErrorKind::TrailingInput,
            Error::RecursionLimit { .. } => ErrorKind::RecursionLimit,
            Error::AmbiguousRetryExhausted { .. } => ErrorKind::AmbiguousRetryExhausted,
        }
    }

    /// Error that caused the first grammar to be abandoned, or `self` when no retry happened.
    pub fn primary(&self) -> &Error {
        match self {
            Error::AmbiguousRetryExhausted { primary } => primary.primary(),
            err => err,
        }
    }
}

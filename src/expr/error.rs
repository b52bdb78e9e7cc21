//! Error types for expression compilation and evaluation.

/// A rule block failed to compile: bad syntax, an unknown field or method,
/// or a type mismatch. `offset` is a byte offset into the comment-stripped
/// block text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (at offset {offset})")]
pub struct ParseError {
    pub(crate) message: String,
    pub(crate) offset: usize,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, offset: usize) -> Self {
        ParseError {
            message: message.into(),
            offset,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// A compiled predicate faulted while running against a specific item.
///
/// These are per-item conditions the type checker cannot rule out; the
/// matcher treats any of them as "stop scanning this item, no match".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// An optional field was referenced on an item that does not carry it.
    #[error("field {0} is not present on this item")]
    MissingField(&'static str),

    /// Integer `/` or `%` with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,
}

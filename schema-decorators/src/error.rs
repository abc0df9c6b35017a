//! Decorator errors.
use apollo_compiler::InvalidNameError;
use apollo_compiler::Name;

/// Fatal errors raised while building or decorating a [`TypeGraph`][crate::TypeGraph].
///
/// Any of these aborts the build: they indicate malformed input handed over by the
/// bootstrap or a broken internal invariant, never an ordinary "nothing to do" outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecoratorError {
    #[error("Invalid schema: {message}")]
    InvalidSchema { message: String },
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },
    #[error("Invalid GraphQL name: {message}")]
    InvalidName { message: String },
    #[error("Schema has no type \"{name}\"")]
    UnknownType { name: Name },
    #[error("Type \"{type_name}\" has no field \"{field_name}\"")]
    UnknownField { type_name: Name, field_name: Name },
    #[error("Type \"{name}\" is not an object type")]
    NotAnObjectType { name: Name },
    #[error("Schema has no scalar \"{name}\"")]
    UnknownScalar { name: Name },
    #[error("An internal error has occurred, please report this bug to the maintainers: {message}")]
    Internal { message: String },
}

impl From<InvalidNameError> for DecoratorError {
    fn from(error: InvalidNameError) -> Self {
        Self::InvalidName {
            message: error.to_string(),
        }
    }
}

impl DecoratorError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// An error raised by a field resolver at execution time.
///
/// It only ever affects the field being resolved; the executor turns it into a field error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ResolverError {
    pub message: String,
}

impl ResolverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

use super::Error;

/// Error when a schema definition is invalid.
///
/// This occurs when:
/// - A model declares the same field or relation name twice
/// - A relation points at a model or key field that does not exist
/// - Relation key lists have different lengths on both sides
/// - A many-to-many relation has no join table
/// - A relation other than one-to-one overrides its foreign key side
///
/// These errors are raised by `schema::Builder::build`.
#[derive(Debug)]
pub(super) struct InvalidSchema {
    message: Box<str>,
}

impl std::error::Error for InvalidSchema {}

impl core::fmt::Display for InvalidSchema {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid schema: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidSchema(InvalidSchema {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid schema error.
    pub fn is_invalid_schema(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidSchema(_))
    }
}

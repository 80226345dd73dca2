use super::Error;

/// Error when an operation names a field or relation the model does not have.
#[derive(Debug)]
pub(super) struct UnknownField {
    path: Box<str>,
}

impl std::error::Error for UnknownField {}

impl core::fmt::Display for UnknownField {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unknown field `{}`", self.path)
    }
}

impl Error {
    /// Creates an unknown field error.
    ///
    /// `path` is the dotted path from the root model, e.g. `User.posts.titel`.
    pub fn unknown_field(path: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnknownField(UnknownField {
            path: path.into().into(),
        }))
    }

    /// Returns `true` if this error is an unknown field error.
    pub fn is_unknown_field(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnknownField(_))
    }
}

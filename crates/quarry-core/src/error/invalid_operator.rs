use super::Error;

/// Error when a filter or update operator is applied to a field whose scalar
/// kind does not support it, e.g. `contains` on a boolean.
#[derive(Debug)]
pub(super) struct InvalidOperator {
    path: Box<str>,
    operator: Box<str>,
    kind: Box<str>,
}

impl std::error::Error for InvalidOperator {}

impl core::fmt::Display for InvalidOperator {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "invalid operator: `{}` is not valid for {} field `{}`",
            self.operator, self.kind, self.path
        )
    }
}

impl Error {
    /// Creates an invalid operator error.
    pub fn invalid_operator(
        path: impl Into<String>,
        operator: impl Into<String>,
        kind: impl Into<String>,
    ) -> Error {
        Error::from(super::ErrorKind::InvalidOperator(InvalidOperator {
            path: path.into().into(),
            operator: operator.into().into(),
            kind: kind.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid operator error.
    pub fn is_invalid_operator(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidOperator(_))
    }
}

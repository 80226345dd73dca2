use super::Error;

/// Error when a relation quantifier does not match the relation's arity.
///
/// `some`, `every` and `none` only apply to to-many relations while `is` and
/// `isNot` only apply to to-one relations.
#[derive(Debug)]
pub(super) struct CardinalityMismatch {
    path: Box<str>,
    quantifier: Box<str>,
    arity: Box<str>,
}

impl std::error::Error for CardinalityMismatch {}

impl core::fmt::Display for CardinalityMismatch {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "cardinality mismatch: `{}` cannot be applied to {} relation `{}`",
            self.quantifier, self.arity, self.path
        )
    }
}

impl Error {
    /// Creates a cardinality mismatch error.
    pub fn cardinality_mismatch(
        path: impl Into<String>,
        quantifier: impl Into<String>,
        arity: impl Into<String>,
    ) -> Error {
        Error::from(super::ErrorKind::CardinalityMismatch(CardinalityMismatch {
            path: path.into().into(),
            quantifier: quantifier.into().into(),
            arity: arity.into().into(),
        }))
    }

    /// Returns `true` if this error is a cardinality mismatch error.
    pub fn is_cardinality_mismatch(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::CardinalityMismatch(_))
    }
}

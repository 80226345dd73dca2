mod adhoc;
mod cardinality_mismatch;
mod invalid_operator;
mod invalid_schema;
mod invalid_statement;
mod unknown_field;
mod unsupported_feature;

use adhoc::AdhocError;
use cardinality_mismatch::CardinalityMismatch;
use invalid_operator::InvalidOperator;
use invalid_schema::InvalidSchema;
use invalid_statement::InvalidStatement;
use std::sync::Arc;
use unknown_field::UnknownField;
use unsupported_feature::UnsupportedFeature;

/// Returns early with an ad-hoc error built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::from_args(format_args!($($arg)*)))
    };
}

/// Builds an ad-hoc error from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// An error raised while building a schema or compiling an operation.
///
/// Compilation is all-or-nothing: when any step fails, the error is returned
/// and no SQL leaves the compiler.
#[derive(Clone)]
pub struct Error {
    inner: Option<Arc<ErrorInner>>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Adds context to this error.
    ///
    /// Context is displayed in reverse order: the most recently added context
    /// is shown first, ending with the root cause.
    #[inline(always)]
    pub fn context(self, consequent: impl IntoError) -> Error {
        self.context_impl(consequent.into_error())
    }

    #[inline(never)]
    #[cold]
    fn context_impl(self, consequent: Error) -> Error {
        let kind = match consequent.inner {
            Some(inner) => match Arc::try_unwrap(inner) {
                Ok(inner) => inner.kind,
                Err(shared) => ErrorKind::Adhoc(AdhocError::new(shared.kind.to_string())),
            },
            None => ErrorKind::Unknown,
        };

        Error {
            inner: Some(Arc::new(ErrorInner {
                kind,
                cause: Some(self),
            })),
        }
    }

    /// Creates an ad-hoc error from format arguments.
    pub fn from_args(args: core::fmt::Arguments<'_>) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError::new(args.to_string())))
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.as_ref().and_then(|inner| inner.cause.as_ref())?;
            Some(err)
        }))
    }

    fn kind(&self) -> &ErrorKind {
        self.inner
            .as_ref()
            .map(|inner| &inner.kind)
            .unwrap_or(&ErrorKind::Unknown)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            let Some(ref inner) = self.inner else {
                return f.debug_struct("Error").field("kind", &"None").finish();
            };
            f.debug_struct("Error")
                .field("kind", &inner.kind)
                .field("cause", &inner.cause)
                .finish()
        }
    }
}

#[derive(Debug)]
enum ErrorKind {
    Anyhow(anyhow::Error),
    Adhoc(AdhocError),
    InvalidSchema(InvalidSchema),
    UnknownField(UnknownField),
    InvalidOperator(InvalidOperator),
    CardinalityMismatch(CardinalityMismatch),
    UnsupportedFeature(UnsupportedFeature),
    InvalidStatement(InvalidStatement),
    Unknown,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match self {
            Anyhow(err) => core::fmt::Display::fmt(err, f),
            Adhoc(err) => core::fmt::Display::fmt(err, f),
            InvalidSchema(err) => core::fmt::Display::fmt(err, f),
            UnknownField(err) => core::fmt::Display::fmt(err, f),
            InvalidOperator(err) => core::fmt::Display::fmt(err, f),
            CardinalityMismatch(err) => core::fmt::Display::fmt(err, f),
            UnsupportedFeature(err) => core::fmt::Display::fmt(err, f),
            InvalidStatement(err) => core::fmt::Display::fmt(err, f),
            Unknown => f.write_str("unknown quarry error"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Some(Arc::new(ErrorInner { kind, cause: None })),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::from(ErrorKind::Anyhow(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}

/// Trait for types that can be converted into an Error.
pub trait IntoError {
    /// Converts this type into an Error.
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_size() {
        // Error stays one pointer wide
        assert_eq!(core::mem::size_of::<usize>(), core::mem::size_of::<Error>());
    }

    #[test]
    fn error_from_args() {
        let err = Error::from_args(format_args!("bad input: {}", 42));
        assert_eq!(err.to_string(), "bad input: 42");
    }

    #[test]
    fn error_chain_display() {
        let chained = Error::unknown_field("User.titel")
            .context(err!("compiling filter"))
            .context(err!("User.findMany"));

        assert_eq!(
            chained.to_string(),
            "User.findMany: compiling filter: unknown field `User.titel`"
        );
    }

    #[test]
    fn context_keeps_root_kind_queryable() {
        let err = Error::unsupported_feature("RETURNING").context(err!("Post.create"));
        assert!(!err.is_unsupported_feature());
        assert!(err.chain().any(|e| e.is_unsupported_feature()));
    }

    #[test]
    fn anyhow_bridge() {
        let our_err: Error = anyhow::anyhow!("something failed").into();
        assert_eq!(our_err.to_string(), "something failed");
    }

    #[test]
    fn invalid_operator_message() {
        let err = Error::invalid_operator("Post.published", "contains", "Boolean");
        assert_eq!(
            err.to_string(),
            "invalid operator: `contains` is not valid for Boolean field `Post.published`"
        );
        assert!(err.is_invalid_operator());
    }

    #[test]
    fn cardinality_mismatch_message() {
        let err = Error::cardinality_mismatch("Post.author", "some", "to-one");
        assert_eq!(
            err.to_string(),
            "cardinality mismatch: `some` cannot be applied to to-one relation `Post.author`"
        );
        assert!(err.is_cardinality_mismatch());
    }

    #[test]
    fn unsupported_feature_message() {
        let err = Error::unsupported_feature("FULL OUTER JOIN is not supported by mysql");
        assert_eq!(
            err.to_string(),
            "unsupported feature: FULL OUTER JOIN is not supported by mysql"
        );
    }
}

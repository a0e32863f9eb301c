//! Error types for the Delta operation algebra
//!
//! The algebra is pure and synchronous (see the crate's top-level docs): every
//! fallible surface fails unrecoverably and returns no partial result. This
//! mirrors the three error kinds a caller can hit:
//!
//! - an embed retained/composed/transformed against a mismatched embed type
//! - an embed whose type has no registered handler
//! - a programmer error, such as asking an operation to give up more length
//!   than it has

use crate::op::Op;

/// Errors raised by the operation algebra
#[derive(thiserror::Error)]
pub enum Error {
    /// A retain-embed or insert-embed was composed/transformed against an
    /// embed of a different type, or a value was supplied where an embed of
    /// matching type was expected.
    #[error("embed type mismatch: expected {expected:?}, found {found:?}")]
    EmbedMismatch {
        /// The embed kind the algebra expected to see
        expected: String,
        /// The embed kind it actually found
        found: String,
    },

    /// No handler is registered for the given embed kind
    #[error("no embed handler registered for type {kind:?}")]
    UnknownEmbedType {
        /// The unregistered embed kind
        kind: String,
    },

    /// `take(op, n)` was called with `n` exceeding `op`'s length, or an
    /// operation was constructed in a way the data model forbids (e.g. a
    /// zero-length text insert carrying attributes).
    #[error("invalid operation: {reason}")]
    InvalidOperation {
        /// Human-readable description of the violated invariant
        reason: String,
        /// The offending operation, when one is available
        op: Option<Box<Op>>,
    },
}

/// Format error messages for display, walking the `source()` chain
///
/// Prints the error itself, then each wrapped cause on its own line, so a
/// multi-layer failure renders as a readable chain instead of a single
/// flattened message.
pub(crate) fn format_error(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter,
) -> std::fmt::Result {
    write!(f, "{e}")?;

    let mut source = e.source();
    if e.source().is_some() {
        writeln!(f, "\ncaused by:")?;
        let mut i: usize = 0;
        while let Some(inner) = source {
            writeln!(f, "{i: >5}: {inner}")?;
            source = inner.source();
            i += 1;
        }
    }

    Ok(())
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        format_error(self, f)
    }
}

impl Error {
    pub(crate) fn embed_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::EmbedMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub(crate) fn unknown_embed_type(kind: impl Into<String>) -> Self {
        Error::UnknownEmbedType { kind: kind.into() }
    }

    pub(crate) fn invalid_operation(reason: impl Into<String>, op: Option<Op>) -> Self {
        Error::InvalidOperation {
            reason: reason.into(),
            op: op.map(Box::new),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_mismatch_message() {
        let err = Error::embed_mismatch("image", "video");
        assert_eq!(
            format!("{err}"),
            "embed type mismatch: expected \"image\", found \"video\""
        );
    }

    #[test]
    fn unknown_embed_type_message() {
        let err = Error::unknown_embed_type("formula");
        assert_eq!(
            format!("{err}"),
            "no embed handler registered for type \"formula\""
        );
    }

    #[test]
    fn debug_uses_display_no_panic() {
        let err = Error::invalid_operation("n exceeds size(op)", None);
        let rendered = format!("{err:?}");
        assert!(rendered.contains("invalid operation"));
    }
}

//! Error types for XmR limit calculation and signal detection.

use thiserror::Error;

/// Errors raised while building an XmR chart.
///
/// All errors are fatal to the current build: no partial limits or signals
/// are returned alongside an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum XmrError {
    /// A parameter or input value is outside the accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A series key could not be converted into an orderable key.
    #[error("type conversion failed: {0}")]
    TypeConversion(String),
}

/// Result type for XmR operations.
pub type XmrResult<T> = Result<T, XmrError>;

impl XmrError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn conversion(msg: impl Into<String>) -> Self {
        Self::TypeConversion(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = XmrError::invalid("foo not a valid aggregate method");
        assert_eq!(
            err.to_string(),
            "invalid argument: foo not a valid aggregate method"
        );

        let err = XmrError::conversion("key at position 3 is not orderable");
        assert_eq!(
            err.to_string(),
            "type conversion failed: key at position 3 is not orderable"
        );
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<XmrError>();
    }
}

use thiserror::Error;

/// Failures surfaced by NAL extraction.
///
/// "No start code" is not an error; it is reported as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// Computed boundaries do not describe a valid range of the buffer
    #[error("Invalid start1/start2: {start}/{end} ({len})")]
    InvalidBounds { start: usize, end: usize, len: usize },

    /// The caller broke the calling convention (missing or non-binary argument)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type ExtractResult<T> = Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bounds_message() {
        let err = ExtractError::InvalidBounds {
            start: 4,
            end: 2,
            len: 11,
        };
        assert_eq!(err.to_string(), "Invalid start1/start2: 4/2 (11)");
    }

    #[test]
    fn test_invalid_argument_message() {
        let err = ExtractError::InvalidArgument("expected a binary".into());
        assert_eq!(err.to_string(), "invalid argument: expected a binary");
    }
}

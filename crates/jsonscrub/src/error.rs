use thiserror::Error;

/// Failure modes surfaced to the caller.
///
/// Malformed input is never an error. Broken UTF-8, unterminated strings and
/// comments, stray punctuation, missing commas or colons are all inputs the
/// sanitizer exists to repair. Only two conditions abort a pass.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    /// Opening one more container would exceed the configured nesting depth.
    #[error("maximum nesting depth of {0} exceeded")]
    DepthExceeded(usize),

    /// An internal invariant of the rewriter was violated. This indicates a
    /// bug in the sanitizer, never a property of the input.
    #[error("internal invariant violated: {0}")]
    Invariant(&'static str),
}

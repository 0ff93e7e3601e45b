//! Single-pass repair of JSON-ish text into strict, HTML-embeddable JSON.
//!
//! `jsonscrub` accepts a byte sequence that is *supposed* to be JSON, or a
//! permissive dialect with comments, single quotes, bare words, hex and octal
//! numbers, stray or missing punctuation, and rewrites it, lossily, into
//! text that a strict JSON parser accepts and that can be pasted into a
//! `<script>` element, an HTML attribute, or an XML document without ending
//! the surrounding context. It repairs rather than rejects: any input
//! produces parseable output, unless nesting exceeds the configured depth.
//!
//! ```
//! use jsonscrub::sanitize_str;
//!
//! let out = sanitize_str("{foo: 'bar',}").unwrap();
//! assert_eq!(out, r#"{"foo": "bar"}"#);
//!
//! // Inputs that are already strict come back as a borrowed view.
//! let strict = sanitize_str(r#"[1,2,{"a":null}]"#).unwrap();
//! assert!(matches!(strict, std::borrow::Cow::Borrowed(_)));
//! ```
//!
//! The sanitizer is purely syntactic and makes no attempt at round-trip
//! fidelity: comments disappear, `0x1A` becomes `26`, `'its'` becomes
//! `"its"`. What it guarantees is the *output*: strict JSON with no raw
//! control characters and none of the substrings that break HTML embedding.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod buffer;
mod error;
mod options;
mod reader;
mod sanitizer;

pub use error::SanitizeError;
pub use options::{SanitizeOptions, DEFAULT_NESTING_DEPTH, MAXIMUM_NESTING_DEPTH};

use alloc::borrow::Cow;
use alloc::string::String;

use sanitizer::Sanitizer;

/// Sanitizes `jsonish` with the default options.
///
/// Returns `Cow::Borrowed` when the input was already strict and needed no
/// rewriting, otherwise an owned buffer with the repaired text.
///
/// # Errors
///
/// [`SanitizeError::DepthExceeded`] when containers nest deeper than the
/// default depth of 64.
pub fn sanitize(jsonish: &[u8]) -> Result<Cow<'_, [u8]>, SanitizeError> {
    sanitize_with(jsonish, SanitizeOptions::default())
}

/// Sanitizes `jsonish` with explicit [`SanitizeOptions`].
///
/// # Errors
///
/// [`SanitizeError::DepthExceeded`] when containers nest deeper than the
/// configured depth.
pub fn sanitize_with(
    jsonish: &[u8],
    options: SanitizeOptions,
) -> Result<Cow<'_, [u8]>, SanitizeError> {
    Sanitizer::new(jsonish, &options).run()
}

/// [`sanitize`] for string input. Valid UTF-8 in means valid UTF-8 out, so
/// the result is a string as well.
///
/// # Errors
///
/// [`SanitizeError::DepthExceeded`] when containers nest deeper than the
/// default depth of 64.
pub fn sanitize_str(jsonish: &str) -> Result<Cow<'_, str>, SanitizeError> {
    sanitize_str_with(jsonish, SanitizeOptions::default())
}

/// [`sanitize_with`] for string input.
///
/// # Errors
///
/// [`SanitizeError::DepthExceeded`] when containers nest deeper than the
/// configured depth.
pub fn sanitize_str_with(
    jsonish: &str,
    options: SanitizeOptions,
) -> Result<Cow<'_, str>, SanitizeError> {
    match sanitize_with(jsonish.as_bytes(), options)? {
        Cow::Borrowed(_) => Ok(Cow::Borrowed(jsonish)),
        Cow::Owned(bytes) => {
            // Every emitted byte is either copied out of the (valid UTF-8)
            // input on scalar boundaries or part of an ASCII insertion.
            let text = String::from_utf8(bytes)
                .map_err(|_| SanitizeError::Invariant("sanitized text is not UTF-8"))?;
            Ok(Cow::Owned(text))
        }
    }
}

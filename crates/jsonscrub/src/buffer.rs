//! The append-only edit buffer behind the sanitizer's rewrites.
//!
//! The buffer pairs an immutable view of the input with an owned output and a
//! `cleaned` cursor. Every operation maintains one invariant: the sanitized
//! text so far equals `out ++ input[cleaned..p)` for whatever position `p >=
//! cleaned` the driver scans to next. The driver can therefore run forward
//! without copying anything until a byte actually needs rewriting, and an
//! input that needs no rewriting produces no output buffer at all.

use alloc::vec::Vec;

#[derive(Debug)]
pub(crate) struct EditBuffer<'a> {
    input: &'a [u8],
    /// Sanitized bytes produced so far. Stays empty on the fast path.
    pub(crate) out: Vec<u8>,
    /// Input bytes in `[0, cleaned)` are accounted for: copied to `out`,
    /// dropped, or replaced. Monotone non-decreasing.
    pub(crate) cleaned: usize,
}

impl<'a> EditBuffer<'a> {
    pub(crate) fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            out: Vec::new(),
            cleaned: 0,
        }
    }

    /// Flushes `input[cleaned..start)` to the output and skips
    /// `input[start..end)`.
    ///
    /// Requires `cleaned <= start <= end <= input.len()`.
    pub(crate) fn elide(&mut self, start: usize, end: usize) {
        debug_assert!(self.cleaned <= start && start <= end && end <= self.input.len());
        if self.out.is_empty() {
            self.out.reserve(self.input.len() + 32);
        }
        self.out.extend_from_slice(&self.input[self.cleaned..start]);
        self.cleaned = end;
    }

    /// Splices `s` into the output at input position `pos`.
    pub(crate) fn insert(&mut self, pos: usize, s: &[u8]) {
        self.replace(pos, pos, s);
    }

    /// Replaces `input[start..end)` with `s`.
    pub(crate) fn replace(&mut self, start: usize, end: usize, s: &[u8]) {
        self.elide(start, end);
        self.out.extend_from_slice(s);
    }

    /// True while no operation has touched the input. Distinguishes "nothing
    /// rewritten" from "rewritten to empty", which is what keeps the
    /// zero-copy result available.
    pub(crate) fn is_clean(&self) -> bool {
        self.out.is_empty() && self.cleaned == 0
    }
}

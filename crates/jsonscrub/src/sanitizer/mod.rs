//! The sanitizer driver.
//!
//! This module owns the forward scan over the input: a small state machine
//! tracking the syntactic position (inside an array, expecting a key, after a
//! value, ...) plus a stack recording whether each open container is an
//! object or an array. The driver decides *where* repairs happen: inserting
//! missing commas, colons and `null`s, quoting bare words, eliding stray
//! punctuation, and closing whatever is left open at end of input. It hands the
//! interiors of string and number tokens to the normalizers in the
//! [`string`] and [`number`] submodules.
//!
//! The scan is byte-oriented. Everything structural in JSON is ASCII, so a
//! single byte decides the dispatch; multi-byte scalars only matter inside
//! tokens, and the normalizers deal with them there.

mod number;
mod string;


use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::buffer::EditBuffer;
use crate::error::SanitizeError;
use crate::options::SanitizeOptions;
use crate::reader::{prev_scalar_start, scalar_at};

/// Syntactic position of the scan. The top level behaves like the inside of
/// a one-element array, so the initial state is [`State::StartArray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Immediately after `[`, before the first element.
    StartArray,
    /// Before a value in an array or at the top level.
    BeforeElement,
    /// After a value in an array, before any comma or close bracket.
    AfterElement,
    /// Immediately after `{`, before the first key.
    StartMap,
    /// Before a key in an object.
    BeforeKey,
    /// After a key, before the required colon.
    AfterKey,
    /// Before a value in an object.
    BeforeValue,
    /// After a value in an object, before any comma or close bracket.
    AfterValue,
}

/// A comma was seen after a completed top-level value. Recovered by dropping
/// the rest of the input, so this is a signal to the driver loop, not an
/// error the caller sees.
struct UnbracketedComma;

pub(crate) struct Sanitizer<'a> {
    jsonish: &'a [u8],
    buf: EditBuffer<'a>,
    /// One entry per open container; `true` means object.
    is_map: Vec<bool>,
    max_depth: usize,
}

impl<'a> Sanitizer<'a> {
    pub(crate) fn new(jsonish: &'a [u8], options: &SanitizeOptions) -> Self {
        Self {
            jsonish,
            buf: EditBuffer::new(jsonish),
            is_map: Vec::new(),
            max_depth: options.effective_depth(),
        }
    }

    pub(crate) fn run(mut self) -> Result<Cow<'a, [u8]>, SanitizeError> {
        let jsonish = self.jsonish;
        let n = jsonish.len();
        if n == 0 {
            return Ok(Cow::Owned(b"null".to_vec()));
        }

        let mut state = State::StartArray;
        let mut i = 0;
        while i < n {
            match jsonish[i] {
                b'\t' | b'\n' | b'\r' | b' ' => i += 1,

                b'"' | b'\'' => {
                    let Ok(next) = self.require_value_state(i, state, true) else {
                        self.buf.elide(i, n);
                        break;
                    };
                    state = next;
                    let str_end = end_of_quoted_string(jsonish, i);
                    self.sanitize_string(i, str_end);
                    i = str_end;
                }

                // Grouping parentheses around a value are dropped.
                b'(' | b')' => {
                    self.buf.elide(i, i + 1);
                    i += 1;
                }

                b'{' | b'[' => {
                    if self.require_value_state(i, state, false).is_err() {
                        self.buf.elide(i, n);
                        break;
                    }
                    if self.is_map.len() == self.max_depth {
                        return Err(SanitizeError::DepthExceeded(self.max_depth));
                    }
                    let map = jsonish[i] == b'{';
                    self.is_map.push(map);
                    state = if map { State::StartMap } else { State::StartArray };
                    i += 1;
                }

                b'}' | b']' => {
                    let Some(was_map) = self.is_map.pop() else {
                        // A closer with nothing open ends the document.
                        self.buf.elide(i, n);
                        break;
                    };
                    match state {
                        State::BeforeValue => self.buf.insert(i, b"null"),
                        State::BeforeElement | State::BeforeKey => {
                            self.elide_trailing_comma(i)?;
                        }
                        State::AfterKey => self.buf.insert(i, b":null"),
                        _ => {}
                    }
                    let close = if was_map { b'}' } else { b']' };
                    if jsonish[i] != close {
                        self.buf.replace(i, i + 1, &[close]);
                    }
                    state = if self.is_map.last() == Some(&true) {
                        State::AfterValue
                    } else {
                        State::AfterElement
                    };
                    i += 1;
                }

                b',' => {
                    if self.is_map.is_empty() {
                        // Unbracketed comma: keep the prefix, drop the rest.
                        self.buf.elide(i, n);
                        break;
                    }
                    match state {
                        State::AfterElement => state = State::BeforeElement,
                        State::AfterValue => state = State::BeforeKey,
                        // Array elision: `[1,,2]` means `[1,null,2]`.
                        State::StartArray | State::BeforeElement => {
                            self.buf.insert(i, b"null");
                            state = State::BeforeElement;
                        }
                        // A comma where a key or colon belongs is noise.
                        State::StartMap | State::BeforeKey | State::AfterKey => {
                            self.buf.elide(i, i + 1);
                        }
                        State::BeforeValue => {
                            self.buf.insert(i, b"null");
                            state = State::BeforeKey;
                        }
                    }
                    i += 1;
                }

                b':' => {
                    if state == State::AfterKey {
                        state = State::BeforeValue;
                    } else {
                        self.buf.elide(i, i + 1);
                    }
                    i += 1;
                }

                b'/' => i = self.skip_comment(i),

                _ => match self.word(i, state) {
                    Ok((next_i, next_state)) => {
                        i = next_i;
                        state = next_state;
                    }
                    Err(UnbracketedComma) => {
                        self.buf.elide(i, n);
                        break;
                    }
                },
            }
        }

        self.finish(state)
    }

    /// Transition taken before every value-or-key token. Inserts whatever
    /// separator or placeholder the new token needs in the current state.
    fn require_value_state(
        &mut self,
        pos: usize,
        state: State,
        can_be_key: bool,
    ) -> Result<State, UnbracketedComma> {
        Ok(match state {
            State::StartMap | State::BeforeKey => {
                if !can_be_key {
                    // `{[...]}`: the container can't be a key, so give it an
                    // empty one.
                    self.buf.insert(pos, b"\"\":");
                }
                State::AfterKey
            }
            State::AfterKey => {
                self.buf.insert(pos, b":");
                State::AfterValue
            }
            State::BeforeValue => State::AfterValue,
            State::AfterValue => {
                if can_be_key {
                    self.buf.insert(pos, b",");
                    State::AfterKey
                } else {
                    self.buf.insert(pos, b",\"\":");
                    State::AfterValue
                }
            }
            State::StartArray | State::BeforeElement => State::AfterElement,
            State::AfterElement => {
                if self.is_map.is_empty() {
                    return Err(UnbracketedComma);
                }
                self.buf.insert(pos, b",");
                State::AfterElement
            }
        })
    }

    /// Handles the default branch: numbers, keywords, and bare words, plus
    /// any scalar that cannot start a token at all.
    fn word(&mut self, i: usize, state: State) -> Result<(usize, State), UnbracketedComma> {
        let jsonish = self.jsonish;
        let n = jsonish.len();

        let mut run_end = i;
        while run_end < n && is_word_byte(jsonish[run_end]) {
            run_end += 1;
        }
        if run_end == i {
            // Not a token at all (stray punctuation, a BOM, a lone control
            // byte); drop the whole scalar.
            let len = scalar_at(jsonish, i, n).len();
            self.buf.elide(i, i + len);
            return Ok((i + len, state));
        }

        let state = self.require_value_state(i, state, true)?;
        let first = jsonish[i];
        let is_number = first.is_ascii_digit() || matches!(first, b'.' | b'+' | b'-');
        let is_kw = !is_number && is_keyword(&jsonish[i..run_end]);

        if !(is_number || is_kw) {
            // The run will have to be quoted, so widen it to everything up
            // to the next structural byte, absorbing one trailing quote if
            // the author wrote `word"`.
            while run_end < n && !is_json_special(jsonish[run_end]) {
                run_end += 1;
            }
            if run_end < n && jsonish[run_end] == b'"' {
                run_end += 1;
            }
        }

        if state == State::AfterKey {
            // Property names must be quoted strings. A numeric key takes its
            // ECMAScript string form, so `{.5e-1:0}` comes out `{"0.05":0}`.
            self.buf.insert(i, b"\"");
            if is_number {
                // A number whose exponent defeats canonicalization is left
                // in normalized form; quoted, it is still a valid key.
                let _ = self.canonicalize_number(i, run_end);
                self.buf.insert(run_end, b"\"");
            } else {
                self.sanitize_string(i, run_end);
            }
        } else if is_number {
            self.normalize_number(i, run_end);
        } else if !is_kw {
            self.buf.insert(i, b"\"");
            self.sanitize_string(i, run_end);
        }
        Ok((run_end, state))
    }

    /// Elides a `//` or `/*` comment starting at `i`, or just the slash when
    /// it starts neither. Returns the position to resume scanning at.
    fn skip_comment(&mut self, i: usize) -> usize {
        let jsonish = self.jsonish;
        let n = jsonish.len();
        let mut end = i + 1;
        if end < n {
            match jsonish[end] {
                b'/' => {
                    end = n;
                    let mut j = i + 2;
                    while j < n {
                        let ch = scalar_at(jsonish, j, n);
                        // Line comments end at any ECMAScript line
                        // terminator, which is elided with them.
                        if matches!(*ch, [b'\n'] | [b'\r'] | [0xE2, 0x80, 0xA8] | [0xE2, 0x80, 0xA9])
                        {
                            end = j + ch.len();
                            break;
                        }
                        j += ch.len();
                    }
                }
                b'*' => {
                    end = n;
                    if i + 3 < n {
                        let mut j = i + 3;
                        while j < n {
                            if jsonish[j] == b'/' && jsonish[j - 1] == b'*' {
                                end = j + 1;
                                break;
                            }
                            j += 1;
                        }
                    }
                }
                _ => {}
            }
        }
        self.buf.elide(i, end);
        end
    }

    /// Removes the comma that must precede `close_pos`, walking backwards
    /// over whitespace. The bytes before `close_pos` live in two places: the
    /// unflushed input tail down to `cleaned`, then the output buffer.
    fn elide_trailing_comma(&mut self, close_pos: usize) -> Result<(), SanitizeError> {
        let jsonish = self.jsonish;
        let floor = self.buf.cleaned;
        let mut i = close_pos;
        while i > floor {
            i = prev_scalar_start(jsonish, i, floor);
            match jsonish[i] {
                b'\t' | b'\n' | b'\r' | b' ' => {}
                b',' => {
                    self.buf.elide(i, i + 1);
                    return Ok(());
                }
                _ => return Err(SanitizeError::Invariant("expected a comma before the closer")),
            }
        }
        let mut i = self.buf.out.len();
        while i > 0 {
            i = prev_scalar_start(&self.buf.out, i, 0);
            match self.buf.out[i] {
                b'\t' | b'\n' | b'\r' | b' ' => {}
                b',' => {
                    self.buf.out.truncate(i);
                    return Ok(());
                }
                _ => return Err(SanitizeError::Invariant("expected a comma before the closer")),
            }
        }
        Err(SanitizeError::Invariant("no trailing comma to elide"))
    }

    fn finish(mut self, state: State) -> Result<Cow<'a, [u8]>, SanitizeError> {
        let n = self.jsonish.len();
        let mut state = state;
        if state == State::StartArray && self.is_map.is_empty() {
            // Nothing but whitespace, comments, or dropped junk.
            self.buf.insert(n, b"null");
            state = State::AfterElement;
        }

        if self.buf.is_clean() && self.is_map.is_empty() {
            return Ok(Cow::Borrowed(self.jsonish));
        }

        self.buf.elide(n, n);
        match state {
            State::BeforeElement | State::BeforeKey => self.elide_trailing_comma(n)?,
            State::AfterKey => self.buf.out.extend_from_slice(b":null"),
            State::BeforeValue => self.buf.out.extend_from_slice(b"null"),
            _ => {}
        }
        while let Some(map) = self.is_map.pop() {
            self.buf.out.push(if map { b'}' } else { b']' });
        }
        Ok(Cow::Owned(self.buf.out))
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.' | b'_' | b'$')
}

fn is_keyword(word: &[u8]) -> bool {
    matches!(word, b"true" | b"false" | b"null")
}

/// Bytes that terminate an unquoted token: ASCII whitespace and controls,
/// and JSON's structural characters.
fn is_json_special(b: u8) -> bool {
    b <= b' ' || matches!(b, b'"' | b',' | b':' | b'[' | b']' | b'{' | b'}')
}

/// Position just past the closing delimiter of the quoted string starting at
/// `start`, or the end of input when it never closes. A candidate delimiter
/// preceded by an odd number of backslashes is escaped and skipped.
fn end_of_quoted_string(s: &[u8], start: usize) -> usize {
    let quote = s[start];
    let mut from = start + 1;
    while let Some(rel) = s[from..].iter().position(|&b| b == quote) {
        let q = from + rel;
        let mut slash_run = q;
        while slash_run > start && s[slash_run - 1] == b'\\' {
            slash_run -= 1;
        }
        if (q - slash_run) % 2 == 0 {
            return q + 1;
        }
        from = q + 1;
    }
    s.len()
}

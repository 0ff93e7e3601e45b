//! String and identifier normalization.
//!
//! Rewrites the interior of one string token so the result is a strict JSON
//! string that stays inert inside a `<script>` element, an HTML attribute, or
//! XML CDATA. The token may be double-quoted, single-quoted, or a bare word
//! the driver has decided to quote; in the latter cases the closing `"` is
//! synthesized here when the input never provided one.

use alloc::format;

use crate::reader::{decode_scalar, scalar_at};

use super::Sanitizer;

impl Sanitizer<'_> {
    pub(super) fn sanitize_string(&mut self, start: usize, end: usize) {
        let jsonish = self.jsonish;
        let mut closed = false;
        let mut i = start;
        while i < end {
            let ch = scalar_at(jsonish, i, end);
            match *ch {
                // ECMAScript line separators are legal JSON but end a
                // script context; escape them.
                [0xE2, 0x80, 0xA8] => {
                    self.buf.replace(i, i + 3, b"\\u2028");
                    i += 3;
                }
                [0xE2, 0x80, 0xA9] => {
                    self.buf.replace(i, i + 3, b"\\u2029");
                    i += 3;
                }
                [b'\\'] => i += self.string_escape(i, end),
                [b] => {
                    match b {
                        b'\t' => self.buf.replace(i, i + 1, b"\\t"),
                        b'\n' => self.buf.replace(i, i + 1, b"\\n"),
                        b'\r' => self.buf.replace(i, i + 1, b"\\r"),
                        _ if b < 0x20 => {
                            let esc = format!("\\u{:04x}", b);
                            self.buf.replace(i, i + 1, esc.as_bytes());
                        }
                        b'"' | b'\'' => {
                            if i == start {
                                if b == b'\'' {
                                    self.buf.replace(i, i + 1, b"\"");
                                }
                            } else {
                                if i + 1 == end {
                                    // A final quote closes the token when it
                                    // matches the opening delimiter; a bare
                                    // word opens with an implied `"`.
                                    let start_delim =
                                        if jsonish[start] == b'\'' { b'\'' } else { b'"' };
                                    closed = start_delim == b;
                                }
                                if closed {
                                    if b == b'\'' {
                                        self.buf.replace(i, i + 1, b"\"");
                                    }
                                } else if b == b'"' {
                                    // Interior `"` in a single-quoted or bare
                                    // token; the output closes with `"`.
                                    self.buf.insert(i, b"\\");
                                }
                            }
                        }
                        b'<' => self.defuse_open_angle(i, end),
                        b'>' => {
                            if i >= start + 2 && jsonish[i - 1] == b'-' && jsonish[i - 2] == b'-' {
                                self.buf.replace(i, i + 1, b"\\u003e");
                            }
                        }
                        b']' => {
                            if i + 2 < end && jsonish[i + 1] == b']' && jsonish[i + 2] == b'>' {
                                self.buf.replace(i, i + 1, b"\\u005d");
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                _ => {
                    let scalar = decode_scalar(ch);
                    if (0xD800..0xE000).contains(&scalar) {
                        // A lone surrogate; a paired one would have decoded
                        // as a supplementary scalar.
                        let esc = format!("\\u{:04x}", scalar);
                        self.buf.replace(i, i + ch.len(), esc.as_bytes());
                    } else if scalar == 0xFFFE || scalar == 0xFFFF {
                        // Not XML-embeddable.
                        let esc = format!("\\u{:04x}", scalar);
                        self.buf.replace(i, i + ch.len(), esc.as_bytes());
                    }
                    i += ch.len();
                }
            }
        }
        if !closed {
            self.buf.insert(end, b"\"");
        }
    }

    /// Escapes a `<` that would open `<!--`, `<script`, or `</script`. Only
    /// ASCII letters are case-folded, so a Turkish dotted I never turns
    /// `scrİpt` into a match.
    fn defuse_open_angle(&mut self, i: usize, end: usize) {
        if i + 3 >= end {
            return;
        }
        let jsonish = self.jsonish;
        let mut tri = [0u8; 3];
        let mut probe = i + 1;
        for slot in &mut tri {
            if probe >= end {
                return;
            }
            let ch = scalar_at(jsonish, probe, end);
            if ch.len() != 1 {
                return;
            }
            *slot = ch[0];
            probe += 1;
        }
        let [c1, c2, c3] = tri;
        let fold = |b: u8| b | 32;
        if (c1 == b'!' && c2 == b'-' && c3 == b'-')
            || (fold(c1) == b's' && fold(c2) == b'c' && fold(c3) == b'r')
            || (c1 == b'/' && fold(c2) == b's' && fold(c3) == b'c')
        {
            self.buf.replace(i, i + 1, b"\\u003c");
        }
    }

    /// Normalizes one backslash escape starting at `i`. Returns how many
    /// input bytes the escape consumed.
    fn string_escape(&mut self, i: usize, end: usize) -> usize {
        let jsonish = self.jsonish;
        if i + 1 == end {
            // Dangling backslash at the end of the token.
            self.buf.elide(i, i + 1);
            return 1;
        }
        let esc = scalar_at(jsonish, i + 1, end);
        if esc.len() != 1 {
            // Escaping a multi-byte scalar means nothing in JSON; drop the
            // backslash and let the scalar speak for itself.
            self.buf.elide(i, i + 1);
            return 1;
        }
        match esc[0] {
            b'b' | b'f' | b'n' | b'r' | b't' | b'\\' | b'/' | b'"' => 2,
            b'x' => {
                if i + 4 < end
                    && jsonish[i + 2].is_ascii_hexdigit()
                    && jsonish[i + 3].is_ascii_hexdigit()
                {
                    // Rewrite the \x prefix to \u00; the two hex digits
                    // flush through as-is.
                    self.buf.replace(i, i + 2, b"\\u00");
                    4
                } else {
                    self.buf.elide(i, i + 1);
                    1
                }
            }
            b'u' => {
                if i + 6 < end && jsonish[i + 2..i + 6].iter().all(u8::is_ascii_hexdigit) {
                    6
                } else {
                    self.buf.elide(i, i + 1);
                    1
                }
            }
            first @ b'0'..=b'7' => {
                // Legacy octal escape: up to three digits, three only when
                // the first is 0-3.
                let mut octal_end = i + 1;
                if octal_end + 1 < end && is_octal(jsonish[octal_end + 1]) {
                    octal_end += 1;
                    if first <= b'3' && octal_end + 1 < end && is_octal(jsonish[octal_end + 1]) {
                        octal_end += 1;
                    }
                }
                let mut value = 0u32;
                for j in i..octal_end {
                    value = (value << 3) | u32::from(jsonish[j + 1] - b'0');
                }
                let esc = format!("u00{:02x}", value);
                self.buf.replace(i + 1, octal_end + 1, esc.as_bytes());
                octal_end + 1 - i
            }
            _ => {
                // Unknown escape, including `\'`: drop the backslash and
                // rescan the following character on its own.
                self.buf.elide(i, i + 1);
                1
            }
        }
    }
}

fn is_octal(b: u8) -> bool {
    (b'0'..=b'7').contains(&b)
}

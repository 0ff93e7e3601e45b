//! Number repair.
//!
//! Two passes share this module. [`Sanitizer::normalize_number`] patches a
//! numeric token into a valid JSON number where it stands: signs trimmed,
//! hex and octal re-encoded as decimal, empty integer/fraction/exponent
//! parts padded with `0`. [`Sanitizer::canonicalize_number`] goes further
//! and reformats the normalized literal into the ECMAScript
//! `ToString(Number)` form (ES5 §9.8.1), which is what a numeric object key
//! means once it is forced into a string.

use alloc::string::ToString;
use alloc::vec::Vec;

use super::Sanitizer;

impl Sanitizer<'_> {
    /// Repairs the number in `[start, end)` in place via the edit buffer.
    pub(super) fn normalize_number(&mut self, start: usize, end: usize) {
        let jsonish = self.jsonish;
        let mut pos = start;

        // Sign: JSON forbids a leading plus.
        if pos < end {
            match jsonish[pos] {
                b'+' => {
                    self.buf.elide(pos, pos + 1);
                    pos += 1;
                }
                b'-' => pos += 1,
                _ => {}
            }
        }

        // Integer part.
        let int_end = end_of_digit_run(jsonish, pos, end);
        if int_end == pos {
            // No empty integer parts in JSON.
            self.buf.insert(pos, b"0");
        } else if jsonish[pos] == b'0' {
            let mut value: i64 = 0;
            let mut reencoded = false;
            if int_end - pos == 1 && int_end < end && (jsonish[int_end] | 32) == b'x' {
                // Recode hex.
                for &b in &jsonish[int_end + 1..end] {
                    let dig = if b.is_ascii_digit() {
                        b - b'0'
                    } else {
                        let lc = b | 32;
                        if (b'a'..=b'f').contains(&lc) {
                            lc - b'a' + 10
                        } else {
                            break;
                        }
                    };
                    value = (value << 4) | i64::from(dig);
                }
                reencoded = true;
            } else if int_end - pos > 1 {
                // Recode octal. The digits 8 and 9 are tolerated and shifted
                // in base 8, a compatibility quirk of the recoder.
                for &b in &jsonish[pos..int_end] {
                    value = (value << 3) | i64::from(b - b'0');
                }
                reencoded = true;
            }
            if reencoded {
                self.buf.elide(pos, int_end);
                if value < 0 {
                    // The accumulator overflowed (hex-encoded u64s do this).
                    // Emitting the wrapped value is the least bad option, but
                    // a sign already on the output would read `--N`; consume
                    // it first.
                    if let Some(&last) = self.buf.out.last() {
                        if last == b'-' || last == b'+' {
                            self.buf.out.pop();
                            if last == b'-' {
                                value = value.wrapping_neg();
                            }
                        }
                    }
                }
                self.buf.out.extend_from_slice(value.to_string().as_bytes());
            }
        }
        let mut pos = int_end;

        // Optional fraction.
        if pos < end && jsonish[pos] == b'.' {
            pos += 1;
            let fraction_end = end_of_digit_run(jsonish, pos, end);
            if fraction_end == pos {
                self.buf.insert(pos, b"0");
            }
            pos = fraction_end;
        }

        // Optional exponent. JSON allows an explicit sign and leading zeros
        // here, unlike for the number as a whole.
        if pos < end && (jsonish[pos] | 32) == b'e' {
            pos += 1;
            if pos < end && matches!(jsonish[pos], b'+' | b'-') {
                pos += 1;
            }
            let exp_end = end_of_digit_run(jsonish, pos, end);
            if exp_end == pos {
                self.buf.insert(pos, b"0");
            }
            pos = exp_end;
        }

        // Anything left over is not part of a JSON number.
        if pos != end {
            self.buf.elide(pos, end);
        }
    }

    /// Normalizes `[start, end)` and then rewrites it into ECMAScript
    /// `ToString(Number)` form. Returns `false` when the exponent defeats a
    /// 32-bit parse, leaving the literal in its normalized form; quoted, it
    /// is still a valid string key.
    pub(super) fn canonicalize_number(&mut self, start: usize, end: usize) -> bool {
        // Force the literal onto the output buffer. This only runs for
        // numbers quoted as property names, so the fast path is already off.
        self.buf.elide(start, start);
        let san_start = self.buf.out.len();
        self.normalize_number(start, end);
        self.buf.elide(end, end);
        canonicalize_normalized(&mut self.buf.out, san_start)
    }
}

fn end_of_digit_run(jsonish: &[u8], start: usize, limit: usize) -> usize {
    let mut end = start;
    while end < limit && jsonish[end].is_ascii_digit() {
        end += 1;
    }
    end
}

/// Rewrites the normalized number literal at `out[san_start..]` into its
/// canonical ECMAScript string form. The step numbers follow ES5 §9.8.1,
/// "ToString Applied to the Number Type".
pub(super) fn canonicalize_normalized(out: &mut Vec<u8>, san_start: usize) -> bool {
    let num = &out[san_start..];
    let neg = num.first() == Some(&b'-');
    let int_start = usize::from(neg);

    let mut int_end = int_start;
    while int_end < num.len() && num[int_end].is_ascii_digit() {
        int_end += 1;
    }
    let fraction_end = if int_end < num.len() && num[int_end] == b'.' {
        let mut fe = int_end + 1;
        while fe < num.len() && num[fe].is_ascii_digit() {
            fe += 1;
        }
        fe
    } else {
        int_end
    };

    // Whatever follows the fraction is `e`/`E`, an optional sign, digits.
    let exp: i64 = if fraction_end < num.len() {
        let mut exp_start = fraction_end + 1;
        if exp_start < num.len() && num[exp_start] == b'+' {
            exp_start += 1;
        }
        let Ok(text) = core::str::from_utf8(&num[exp_start..]) else {
            return false;
        };
        match text.parse::<i32>() {
            Ok(e) => i64::from(e),
            Err(_) => return false,
        }
    } else {
        0
    };

    // 5. Let n, k, and s be integers such that k >= 1, 10^(k-1) <= s < 10^k,
    // the Number value for s * 10^(n-k) is m, and k is as small as possible.
    // `digits` accumulates s with leading and trailing zeros stripped; runs
    // of zeros are held pending until a later non-zero digit commits them.
    let mut n = exp;
    let mut digits: Vec<u8> = Vec::new();
    let mut saw_decimal = false;
    let mut zero = true;
    let mut zeroes_pending: i64 = 0;
    for idx in int_start..fraction_end {
        let b = num[idx];
        if b == b'.' {
            saw_decimal = true;
            if zero {
                zeroes_pending = 0;
            }
            continue;
        }
        if (!zero || b != b'0') && !saw_decimal {
            n += 1;
        }
        if b == b'0' {
            zeroes_pending += 1;
        } else {
            if zero {
                // Zeros ahead of the first significant digit: dropped in the
                // integer part, folded into the exponent in the fraction.
                if saw_decimal {
                    n -= zeroes_pending;
                }
                zeroes_pending = 0;
            }
            zero = false;
            while zeroes_pending > 0 {
                digits.push(b'0');
                zeroes_pending -= 1;
            }
            digits.push(b);
        }
    }
    let k = digits.len() as i64;

    out.truncate(san_start);
    if zero {
        // 2. If m is +0 or -0, return the String "0".
        out.push(b'0');
        return true;
    }
    if neg {
        // 3. The sign rides along in front of ToString(-m).
        out.push(b'-');
    }
    if k <= n && n <= 21 {
        // 6. The digits of s followed by n-k zeros.
        out.extend_from_slice(&digits);
        for _ in k..n {
            out.push(b'0');
        }
    } else if 0 < n && n <= 21 {
        // 7. The most significant n digits, a point, the remaining k-n.
        let split = n as usize;
        out.extend_from_slice(&digits[..split]);
        out.push(b'.');
        out.extend_from_slice(&digits[split..]);
    } else if -6 < n && n <= 0 {
        // 8. "0.", -n zeros, then the digits of s.
        out.extend_from_slice(b"0.");
        for _ in n..0 {
            out.push(b'0');
        }
        out.extend_from_slice(&digits);
    } else {
        // 9 and 10. Scientific notation, one digit ahead of the point.
        out.push(digits[0]);
        if k > 1 {
            out.push(b'.');
            out.extend_from_slice(&digits[1..]);
        }
        let n_less_1 = n - 1;
        out.push(b'e');
        out.push(if n_less_1 < 0 { b'-' } else { b'+' });
        out.extend_from_slice(n_less_1.abs().to_string().as_bytes());
    }
    true
}

//! Byte-exact sanitization scenarios.
//!
//! Every expectation here is checked three ways: the output matches exactly,
//! the output parses as strict JSON, and sanitizing the output again is a
//! fixed point.

#![allow(missing_docs)]

use std::borrow::Cow;

use jsonscrub::{
    sanitize, sanitize_str, sanitize_str_with, SanitizeError, SanitizeOptions,
    DEFAULT_NESTING_DEPTH, MAXIMUM_NESTING_DEPTH,
};

fn check(input: &str, expected: &str) {
    let out = sanitize_str(input).expect("sanitization failed");
    assert_eq!(out, expected, "for input {input:?}");
    serde_json::from_str::<serde_json::Value>(&out)
        .unwrap_or_else(|err| panic!("output {out:?} is not strict JSON: {err}"));
    let again = sanitize_str(&out).expect("second pass failed");
    assert_eq!(again, out, "not idempotent for {input:?}");
}

fn check_bytes(input: &[u8], expected: &[u8]) {
    let out = sanitize(input).expect("sanitization failed");
    assert_eq!(&*out, expected, "for input {input:?}");
    if let Ok(text) = std::str::from_utf8(&out) {
        serde_json::from_str::<serde_json::Value>(text)
            .unwrap_or_else(|err| panic!("output {text:?} is not strict JSON: {err}"));
    }
    let again = sanitize(&out).expect("second pass failed");
    assert_eq!(&*again, &*out, "not idempotent for {input:?}");
}

/// Strict inputs engage the zero-copy fast path.
fn unchanged(input: &str) {
    match sanitize_str(input).expect("sanitization failed") {
        Cow::Borrowed(out) => assert_eq!(out, input),
        Cow::Owned(out) => panic!("expected pass-through for {input:?}, got {out:?}"),
    }
}

#[test]
fn empty_input_means_null() {
    check("", "null");
}

#[test]
fn keywords_pass_through() {
    unchanged("null");
    unchanged("false");
    unchanged("true");
    unchanged(" false ");
    unchanged("  false");
    unchanged("false\n");
}

#[test]
fn comma_after_top_level_value_ends_the_document() {
    check("false,true", "false");
}

#[test]
fn quoted_strings() {
    unchanged("\"foo\"");
    check("'foo'", "\"foo\"");
}

#[test]
fn script_tags_are_defused() {
    check(
        "\"<script>foo()</script>\"",
        "\"\\u003cscript>foo()\\u003c/script>\"",
    );
    check("\"</SCRIPT\n>\"", "\"\\u003c/SCRIPT\\n>\"");
    check("\"</ScRIpT\"", "\"\\u003c/ScRIpT\"");
    check("\"<script\"", "\"\\u003cscript\"");
    check("\"<Script\"", "\"\\u003cScript\"");
    check("\"<SCRIPT\n>\"", "\"\\u003cSCRIPT\\n>\"");
}

#[test]
fn only_ascii_is_case_folded_for_the_tag_check() {
    // A Turkish dotted upper-case I lower-cases to `i` under full Unicode
    // folding, which must not make `scrIpt` match; the first three letters
    // already decide these two.
    check("\"</ScR\u{130}pT\"", "\"\\u003c/ScR\u{130}pT\"");
    check("\"<ScR\u{130}pT\"", "\"\\u003cScR\u{130}pT\"");
}

#[test]
fn harmless_tags_are_left_alone() {
    unchanged("\"<b>Hello</b>\"");
    unchanged("\"<s>Hello</s>\"");
}

#[test]
fn cdata_and_comment_closers_are_defused() {
    check("'<[[]]>'", "\"<[[\\u005d]>\"");
    check("']]>'", "\"\\u005d]>\"");
    check("\"-->\"", "\"--\\u003e\"");
    check("\"<!--\"", "\"\\u003c!--\"");
    check("\"<!--<script>\"", "\"\\u003c!--\\u003cscript>\"");
}

#[test]
fn html_lookalikes_outside_strings_dissolve() {
    check("[[0]]>", "[[0]]");
    check("<script", "\"script\"");
    check("<!--", "-0");
    check("-->", "-0");
}

#[test]
fn arrays_are_repaired() {
    check("[1,-1,0.0,-0.5,1e2,", "[1,-1,0.0,-0.5,1e2]");
    check("[1,2,3,]", "[1,2,3]");
    check("[1,,3,]", "[1,null,3]");
    check("[1 2 3]", "[1 ,2 ,3]");
    check("[,]", "[null]");
    check("[null,]", "[null]");
    check("[true false]", "[true ,false]");
    unchanged("[\"\\u00a0\\u1234\"]");
}

#[test]
fn objects_are_repaired() {
    unchanged("{}");
    unchanged("{ \"foo\": \"bar\" }");
    check("{ \"foo\": \"bar\", }", "{ \"foo\": \"bar\" }");
    check("{\"foo\",\"bar\"}", "{\"foo\":\"bar\"}");
    check("{ foo: \"bar\" }", "{ \"foo\": \"bar\" }");
    check("{ foo: 'bar", "{ \"foo\": \"bar\"}");
    check("{ foo: ['bar", "{ \"foo\": [\"bar\"]}");
    check("{null:0}", "{\"null\":0}");
    check("{\"a\":\"b\",\"c\":", "{\"a\":\"b\",\"c\":null}");
    check(
        "{\"a\":0,false\"x\":{\"\":-1}}",
        "{\"a\":0,\"false\":\"x\",\"\":{\"\":-1}}",
    );
}

#[test]
fn grouping_parentheses_are_dropped() {
    check("({})", "{}");
}

#[test]
fn comments_are_stripped() {
    check("// comment\nfalse", "false");
    check("false// comment", "false");
    check("false// comment\n", "false");
    check("false/* comment */", "false");
    check("false/* comment *", "false");
    check("false/* comment ", "false");
    check("/*/true**/false", "false");
}

#[test]
fn numbers_already_strict_pass_through() {
    unchanged("1");
    unchanged("-1");
    unchanged("1.0");
    unchanged("-1.0");
    unchanged("1.05");
    unchanged("427.0953333");
    unchanged("6.0221412927e+23");
    unchanged("6.0221412927e23");
    unchanged("1.660538920287695E-24");
    unchanged("-6.02e-23");
}

#[test]
fn number_forms_are_padded() {
    check("6.0221412927e", "6.0221412927e0");
    check("6.0221412927e-", "6.0221412927e-0");
    check("6.0221412927e+", "6.0221412927e+0");
    check("1.", "1.0");
    check(".5", "0.5");
    check("-.5", "-0.5");
    check("+.5", "0.5");
    check("+.5e2", "0.5e2");
    check("+1.5e+2", "1.5e+2");
    check("+.5e-2", "0.5e-2");
}

#[test]
fn hex_and_octal_are_recoded() {
    check("0x1A", "26");
    check("0XF", "15");
    check("017", "15");
    // The octal recoder shifts 8 and 9 through rather than rejecting them,
    // an intentional compatibility quirk.
    check("-016923547559", "-2035208041");
}

#[test]
fn numeric_keys_take_canonical_string_form() {
    check("{0:0}", "{\"0\":0}");
    check("{-0:0}", "{\"0\":0}");
    check("{+0:0}", "{\"0\":0}");
    check("{1.0:0}", "{\"1\":0}");
    check("{1.:0}", "{\"1\":0}");
    check("{.5:0}", "{\"0.5\":0}");
    check("{-.5:0}", "{\"-0.5\":0}");
    check("{+.5:0}", "{\"0.5\":0}");
    check("{+.1:0}", "{\"0.1\":0}");
    check("{+.01:0}", "{\"0.01\":0}");
    check("{+.5e2:0}", "{\"50\":0}");
    check("{+1.5e+2:0}", "{\"150\":0}");
    check("{+.5e-2:0}", "{\"0.005\":0}");
    check("{10e100:0}", "{\"1e+101\":0}");
    check("{10e-100:0}", "{\"1e-99\":0}");
    check("{10.5e-100:0}", "{\"1.05e-99\":0}");
    check("{10.500e-100:0}", "{\"1.05e-99\":0}");
    check("{12.34e100:0}", "{\"1.234e+101\":0}");
    check("{.01234e-100:0}", "{\"1.234e-102\":0}");
}

#[test]
fn uncanonicalizable_keys_stay_normalized() {
    // An exponent far beyond any native integer: the literal is kept as
    // written, and quoting alone makes it a valid key.
    check(
        "{1e0001234567890123456789123456789123456789:0}",
        "{\"1e0001234567890123456789123456789123456789\":0}",
    );
}

#[test]
fn control_characters_in_strings_are_escaped() {
    check("'\u{0}\u{8}\u{1f}'", "\"\\u0000\\u0008\\u001f\"");
    check("\"tab\there\"", "\"tab\\there\"");
    check("\"line\nbreak\"", "\"line\\nbreak\"");
    check("\"cr\rhere\"", "\"cr\\rhere\"");
}

#[test]
fn line_separators_are_escaped() {
    check("'a\u{2028}b\u{2029}c'", "\"a\\u2028b\\u2029c\"");
}

#[test]
fn lone_surrogates_are_escaped_supplementary_passes() {
    // U+10000 as proper UTF-8 passes through; the CESU-8 encodings of the
    // two halves of a surrogate pair are each escaped on their own.
    check_bytes(
        b"'\xf0\x90\x80\x80\xed\xb0\x80\xed\xa0\x80'",
        b"\"\xf0\x90\x80\x80\\udc00\\ud800\"",
    );
}

#[test]
fn noncharacters_are_escaped() {
    check_bytes(
        b"'\xef\xbf\xbd\xef\xbf\xbe\xef\xbf\xbf'",
        b"\"\xef\xbf\xbd\\ufffe\\uffff\"",
    );
}

#[test]
fn junk_scalars_outside_strings_are_dropped() {
    check_bytes(
        b"\xef\xbf\xaf\x0042\x08\xed\xa0\x80\xef\xbf\xbf\xed\xb0\x80",
        b"42",
    );
    check_bytes(
        b"\xef\xbf\xaf\x00\x08\xed\xa0\x80\xef\xbf\xbf\xed\xb0\x80",
        b"null",
    );
}

#[test]
fn byte_order_mark_is_dropped() {
    // Found by fuzzing: a BOM ahead of an octal-looking run whose recoding
    // exercises the 64-bit accumulator.
    check_bytes(b"\xef\xbb\xbf-01742461140214282]", b"-68348121520322");
}

#[test]
fn truncated_containers_heal() {
    check("[{{},\u{e4}", "[{\"\":{}}]");
    check("[{{\u{e4}\u{e4}},\u{e4}", "[{\"\":{}}]");
}

#[test]
fn bare_words_are_quoted() {
    check("dev", "\"dev\"");
    check("eval", "\"eval\"");
    check("comment", "\"comment\"");
    check("fasle", "\"fasle\"");
    check("FALSE", "\"FALSE\"");
    check("dev/comment", "\"dev/comment\"");
    check("dev\\comment", "\"devcomment\"");
    check("dev\\ncomment", "\"dev\\ncomment\"");
    check("[dev\\, comment]", "[\"dev\", \"comment\"]");
}

#[test]
fn legacy_escapes_are_normalized() {
    check("'\\x41'", "\"\\u0041\"");
    check("'\\7'", "\"\\u0007\"");
    check("'\\41'", "\"\\u0021\"");
    check("'\\101'", "\"\\u0041\"");
    check("'don\\'t'", "\"don't\"");
    // The backslash is dropped first, so the once-escaped quote then closes
    // the string.
    check("'end\\'", "\"end\"");
    check("{a\\b\"c", "{\"a\\b\":\"c\"}");
}

#[test]
fn long_description_passes_untouched() {
    unchanged("[ { \"description\": \"aa##############aa\" }, 1 ]");
}

#[test]
fn nesting_depth_is_enforced() {
    let deep = format!("{}{}", "{".repeat(65), "}".repeat(65));
    assert_eq!(
        sanitize_str(&deep).unwrap_err(),
        SanitizeError::DepthExceeded(DEFAULT_NESTING_DEPTH),
    );

    let mut expected = String::from("{");
    for _ in 0..64 {
        expected.push_str("\"\":{");
    }
    expected.push_str(&"}".repeat(65));
    let out = sanitize_str_with(
        &deep,
        SanitizeOptions {
            max_depth: DEFAULT_NESTING_DEPTH + 1,
        },
    )
    .expect("one extra level must fit");
    assert_eq!(out, expected);
}

#[test]
fn depth_option_saturates() {
    assert_eq!(SanitizeOptions { max_depth: 0 }.effective_depth(), 1);
    assert_eq!(
        SanitizeOptions { max_depth: usize::MAX }.effective_depth(),
        MAXIMUM_NESTING_DEPTH,
    );
    assert_eq!(
        SanitizeOptions::default().effective_depth(),
        DEFAULT_NESTING_DEPTH,
    );

    // A saturated floor of one level still admits a flat array.
    assert_eq!(
        sanitize_str_with("[0]", SanitizeOptions { max_depth: 0 }).expect("flat array"),
        "[0]",
    );
    assert_eq!(
        sanitize_str_with("[[0]]", SanitizeOptions { max_depth: 0 }).unwrap_err(),
        SanitizeError::DepthExceeded(1),
    );
}

//! Lexical helpers for pattern matching over un-parsed JavaScript.
//!
//! Nothing here builds a syntax tree. The scanner only knows enough to tell
//! code apart from string, template and comment text, and to keep track of
//! bracket depth. Every helper that takes "masked" text expects the output of
//! [`mask_literals`], which has the same byte length as its input so offsets
//! can be used to slice the original source.

use std::ops::Range;

/// Replace the contents of string literals, template literals and comments
/// with spaces. Newlines are kept so line structure survives.
///
/// Code inside a template literal's `${ ... }` stays visible and is masked
/// like any other code; only the raw text parts and the `${`/`}` delimiters
/// are blanked.
///
/// Single- and double-quoted strings end at an unescaped newline, which keeps
/// a stray apostrophe in template markup from swallowing the rest of a file.
/// Regular expression literals are not recognised.
pub fn mask_literals(src: &str) -> String {
    let mut out = src.as_bytes().to_vec();
    mask_code(src, &mut out, 0, false);

    // Literal text is blanked byte by byte through to its closing delimiter,
    // so multi-byte characters are always replaced in full and the buffer
    // stays valid UTF-8.
    String::from_utf8(out).unwrap_or_else(|_| src.to_string())
}

/// Mask literals in the code starting at `start`.
///
/// Inside an interpolation this stops at the `}` closing it and returns its
/// index; otherwise it runs to the end of `src`.
fn mask_code(src: &str, out: &mut [u8], start: usize, interpolation: bool) -> usize {
    let bytes = src.as_bytes();
    let mut depth = 0usize;
    let mut i = start;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"') => {
                let (end, interior_end) = quoted_end(bytes, i, quote);
                blank(out, i + 1, interior_end);
                i = end;
            }
            b'`' => i = mask_template(src, out, i),
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = bytes[i..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map(|p| i + p)
                    .unwrap_or(bytes.len());
                blank(out, i, end);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = src[i + 2..]
                    .find("*/")
                    .map(|p| i + 2 + p + 2)
                    .unwrap_or(bytes.len());
                blank(out, i, end);
                i = end;
            }
            b'{' if interpolation => {
                depth += 1;
                i += 1;
            }
            b'}' if interpolation => {
                if depth == 0 {
                    return i;
                }
                depth -= 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Returns `(end, interior_end)`: the index just past the literal and the
/// index where its contents stop.
fn quoted_end(bytes: &[u8], start: usize, quote: u8) -> (usize, usize) {
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return (j, j),
            b if b == quote => return (j + 1, j),
            _ => j += 1,
        }
    }
    (bytes.len(), bytes.len())
}

/// Blank the template literal opening at `start` and return the index just
/// past it. Each `${ ... }` is handed back to [`mask_code`].
fn mask_template(src: &str, out: &mut [u8], start: usize) -> usize {
    let bytes = src.as_bytes();
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => {
                blank(out, j, j + 2);
                j += 2;
            }
            b'`' => return j + 1,
            b'$' if bytes.get(j + 1) == Some(&b'{') => {
                blank(out, j, j + 2);
                let close = mask_code(src, out, j + 2, true);
                blank(out, close, close + 1);
                j = close + 1;
            }
            _ => {
                blank(out, j, j + 1);
                j += 1;
            }
        }
    }
    bytes.len()
}

fn blank(out: &mut [u8], from: usize, to: usize) {
    let to = to.min(out.len());
    for b in out.iter_mut().take(to).skip(from) {
        if *b != b'\n' {
            *b = b' ';
        }
    }
}

fn is_open(b: u8) -> bool {
    matches!(b, b'{' | b'(' | b'[')
}

fn is_close(b: u8) -> bool {
    matches!(b, b'}' | b')' | b']')
}

/// Find the bracket that closes the one at `open`.
///
/// All three bracket kinds share one depth counter. Returns `None` when `open`
/// is not an opening bracket or the text ends first.
pub fn find_closing(masked: &str, open: usize) -> Option<usize> {
    let bytes = masked.as_bytes();
    if !bytes.get(open).copied().is_some_and(is_open) {
        return None;
    }
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if is_open(b) {
            depth += 1;
        } else if is_close(b) {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Split `masked` on `sep` wherever it appears outside any bracket pair.
///
/// Returns byte ranges so callers can slice the unmasked text. Empty pieces
/// (e.g. after a trailing comma) are kept.
pub fn split_top_level(masked: &str, sep: u8) -> Vec<Range<usize>> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, &b) in masked.as_bytes().iter().enumerate() {
        if is_open(b) {
            depth += 1;
        } else if is_close(b) {
            depth = depth.saturating_sub(1);
        } else if b == sep && depth == 0 {
            pieces.push(start..i);
            start = i + 1;
        }
    }
    pieces.push(start..masked.len());
    pieces
}

/// Position of the first `needle` outside any bracket pair.
pub fn find_top_level(masked: &str, needle: u8) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &b) in masked.as_bytes().iter().enumerate() {
        if is_open(b) {
            depth += 1;
        } else if is_close(b) {
            depth = depth.saturating_sub(1);
        } else if b == needle && depth == 0 {
            return Some(i);
        }
    }
    None
}

/// End of a bare expression starting at `start` (e.g. an arrow function's
/// expression body): the first `,` `;` or newline outside brackets, or an
/// unmatched closing bracket.
pub fn expression_end(masked: &str, start: usize) -> usize {
    let bytes = masked.as_bytes();
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if is_open(b) {
            depth += 1;
        } else if is_close(b) {
            if depth == 0 {
                return i;
            }
            depth -= 1;
        } else if depth == 0 && matches!(b, b',' | b';' | b'\n') {
            return i;
        }
    }
    bytes.len()
}

/// Bracket nesting depth at byte offset `pos`.
pub fn depth_at(masked: &str, pos: usize) -> usize {
    let mut depth = 0usize;
    for &b in masked.as_bytes().iter().take(pos) {
        if is_open(b) {
            depth += 1;
        } else if is_close(b) {
            depth = depth.saturating_sub(1);
        }
    }
    depth
}

/// First non-whitespace byte offset at or after `pos`.
pub fn skip_whitespace(text: &str, pos: usize) -> usize {
    text.as_bytes()
        .iter()
        .skip(pos)
        .position(|b| !b.is_ascii_whitespace())
        .map(|p| pos + p)
        .unwrap_or(text.len())
}

/// Whether `b` can continue a JavaScript identifier (ASCII subset).
pub fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Whether `s` is a plain JavaScript identifier (ASCII subset).
pub fn is_identifier(s: &str) -> bool {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' || b == b'$' => {}
        _ => return false,
    }
    bytes.all(is_ident_byte)
}

/// Smallest char boundary of `s` at or after `pos`.
pub fn char_boundary_at_or_after(s: &str, mut pos: usize) -> usize {
    while pos < s.len() && !s.is_char_boundary(pos) {
        pos += 1;
    }
    pos.min(s.len())
}

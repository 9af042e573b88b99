//! Reversible value encoding for the on-disk INI files.
//!
//! Values pass through [`escape`] before they are stored in the user tier and
//! through [`unescape`] whenever they are read back, so arbitrary strings
//! (multi-line text, quotes, backslashes, padding) survive a save/load cycle.

use std::fmt::Write as _;

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);

    for (idx, ch) in value.chars().enumerate() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\'' => out.push_str("\\'"),
            // The INI reader trims values, so padding has to be spelled out.
            c if c.is_whitespace() && (idx == 0 || idx == last) => push_code(&mut out, c),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => push_code(&mut out, c),
            c => out.push(c),
        }
    }

    out
}

/// Reverses [`escape`]. Unknown sequences and a trailing lone backslash are
/// kept as written, which keeps hand-edited values such as Windows paths
/// intact.
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.peek().copied() {
            Some('\\') => push_and_skip(&mut out, &mut chars, '\\'),
            Some('n') => push_and_skip(&mut out, &mut chars, '\n'),
            Some('r') => push_and_skip(&mut out, &mut chars, '\r'),
            Some('t') => push_and_skip(&mut out, &mut chars, '\t'),
            Some('\'') => push_and_skip(&mut out, &mut chars, '\''),
            Some('"') => push_and_skip(&mut out, &mut chars, '"'),
            Some('x') => {
                let mut lookahead = chars.clone();
                lookahead.next();
                let hex: String = lookahead.by_ref().take(2).collect();
                match decode_hex_pair(&hex) {
                    Some(decoded) => {
                        out.push(decoded);
                        chars = lookahead;
                    }
                    None => out.push('\\'),
                }
            }
            Some('u') => {
                let mut lookahead = chars.clone();
                lookahead.next();
                match decode_braced_code(&mut lookahead) {
                    Some(decoded) => {
                        out.push(decoded);
                        chars = lookahead;
                    }
                    None => out.push('\\'),
                }
            }
            _ => out.push('\\'),
        }
    }

    out
}

fn push_code(out: &mut String, ch: char) {
    let code = ch as u32;
    if code <= 0xff {
        let _ = write!(out, "\\x{code:02x}");
    } else {
        let _ = write!(out, "\\u{{{code:x}}}");
    }
}

fn push_and_skip(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    decoded: char,
) {
    out.push(decoded);
    chars.next();
}

fn decode_braced_code(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<char> {
    if chars.next()? != '{' {
        return None;
    }
    let mut hex = String::new();
    for ch in chars.by_ref() {
        if ch == '}' {
            if hex.is_empty() || hex.len() > 6 {
                return None;
            }
            return u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32);
        }
        if !ch.is_ascii_hexdigit() {
            return None;
        }
        hex.push(ch);
    }
    None
}

fn decode_hex_pair(hex: &str) -> Option<char> {
    if hex.len() != 2 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(hex, 16).ok().map(char::from)
}

//! ANSI-aware text layout engine.
//!
//! Wraps plain or color-escaped text to a target column width. Escape
//! sequences (`ESC [ <digits;>* m`) never split across a boundary and cost
//! zero columns; the most recent non-reset sequence is re-emitted at the
//! start of every continuation chunk so color survives the wrap.
//!
//! Widths are display columns (`unicode-width`), not bytes or chars.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// The SGR reset sequence. Clears the active color state.
pub const RESET: &str = "\u{1b}[0m";

/// One lexical piece of a colorized string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// An SGR escape sequence, e.g. `\x1b[36m`.
    Escape(&'a str),
    /// A run of literal text between escapes.
    Text(&'a str),
}

/// Locate the next SGR sequence, returning its byte span.
///
/// Only well-formed `ESC [ digits/; m` sequences count; a bare ESC or a
/// non-SGR control sequence is treated as literal text.
fn next_escape(text: &str) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == 0x1b && i + 1 < bytes.len() && bytes[i + 1] == b'[' {
            let mut j = i + 2;
            while j < bytes.len() && (bytes[j].is_ascii_digit() || bytes[j] == b';') {
                j += 1;
            }
            if j < bytes.len() && bytes[j] == b'm' {
                return Some((i, j + 1));
            }
        }
        i += 1;
    }
    None
}

/// Split a string into an alternating sequence of escape and text tokens.
pub fn tokenize(mut text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    while !text.is_empty() {
        match next_escape(text) {
            Some((0, end)) => {
                tokens.push(Token::Escape(&text[..end]));
                text = &text[end..];
            }
            Some((start, end)) => {
                tokens.push(Token::Text(&text[..start]));
                tokens.push(Token::Escape(&text[start..end]));
                text = &text[end..];
            }
            None => {
                tokens.push(Token::Text(text));
                break;
            }
        }
    }
    tokens
}

/// True if the text contains at least one SGR escape sequence.
pub fn has_ansi(text: &str) -> bool {
    next_escape(text).is_some()
}

/// Remove all SGR escape sequences, keeping literal text.
pub fn strip_ansi(text: &str) -> String {
    if !has_ansi(text) {
        return text.to_string();
    }
    tokenize(text)
        .into_iter()
        .filter_map(|t| match t {
            Token::Text(s) => Some(s),
            Token::Escape(_) => None,
        })
        .collect()
}

/// Display-column width of the text, ignoring escape sequences.
pub fn visible_width(text: &str) -> usize {
    tokenize(text)
        .into_iter()
        .map(|t| match t {
            Token::Text(s) => UnicodeWidthStr::width(s),
            Token::Escape(_) => 0,
        })
        .sum()
}

/// Wrap text, choosing the ANSI-aware algorithm when escapes are present.
pub fn wrap(text: &str, max_width: usize) -> Vec<String> {
    if has_ansi(text) {
        wrap_ansi(text, max_width)
    } else {
        wrap_plain(text, max_width)
    }
}

/// Byte length of the longest prefix of `seg` fitting in `cols` columns.
///
/// Always makes progress: a glyph wider than the whole budget is taken
/// alone rather than looping forever.
fn prefix_fitting(seg: &str, cols: usize) -> usize {
    let mut width = 0;
    let mut end = 0;
    for (idx, ch) in seg.char_indices() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + w > cols {
            break;
        }
        width += w;
        end = idx + ch.len_utf8();
    }
    if end == 0 {
        seg.chars().next().map_or(0, |c| c.len_utf8())
    } else {
        end
    }
}

/// Greedy wrap of escape-free text.
///
/// Prefers to break just after the last space inside the window; hard-breaks
/// at the width when the window has no space. The break space stays at the
/// end of its chunk, so concatenating all chunks reproduces the input.
pub fn wrap_plain(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    if UnicodeWidthStr::width(text) <= max_width {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;
    loop {
        if UnicodeWidthStr::width(remaining) <= max_width {
            chunks.push(remaining.to_string());
            break;
        }
        let window_end = prefix_fitting(remaining, max_width);
        let window = &remaining[..window_end];
        let break_at = match window.rfind(' ') {
            // A leading space gives an empty chunk; hard-break instead.
            Some(0) | None => window_end,
            Some(sp) => sp + 1,
        };
        chunks.push(remaining[..break_at].to_string());
        remaining = &remaining[break_at..];
    }
    chunks
}

/// Wrap colorized text without splitting escapes or losing color state.
///
/// Walks the token stream keeping `active_state` = the most recent non-reset
/// escape (cleared by [`RESET`]). When a chunk fills, the next chunk is
/// pre-seeded with `active_state` so it renders standalone.
pub fn wrap_ansi(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    if visible_width(text) <= max_width {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_cols = 0usize;
    let mut active_state = String::new();

    for token in tokenize(text) {
        match token {
            Token::Escape(esc) => {
                active_state = if esc == RESET {
                    String::new()
                } else {
                    esc.to_string()
                };
                current.push_str(esc);
            }
            Token::Text(mut seg) => {
                while !seg.is_empty() {
                    let remaining_cols = max_width - current_cols;
                    let seg_width = UnicodeWidthStr::width(seg);
                    if seg_width <= remaining_cols {
                        current.push_str(seg);
                        current_cols += seg_width;
                        break;
                    }
                    if remaining_cols > 0 {
                        let take = prefix_fitting(seg, remaining_cols);
                        current.push_str(&seg[..take]);
                        seg = &seg[take..];
                    }
                    chunks.push(current.clone());
                    current = active_state.clone();
                    current_cols = 0;
                }
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

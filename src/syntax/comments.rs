//! Textual pre-passes: comment stripping and line-continuation removal.
//!
//! Both run before parsing. The stripper keeps every newline that a comment
//! spans so that line numbers downstream are stable; a block comment that
//! opens and closes on one line collapses to a single space so it can still
//! separate tokens.

// ============================================================================
// PUBLIC API
// ============================================================================

/// Removes `//` and `/* */` comments from `source`.
///
/// Rules:
/// - `//` drops the rest of the line; the terminating newline is kept.
/// - `/* */` on a single line becomes one space.
/// - `/* */` across lines drops the body but keeps every interior newline.
/// - Comments do not nest; the outer comment wins, so `//` inside a block
///   comment is part of the block.
/// - An unterminated block comment runs to end of input.
pub fn preprocess_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let bytes = source.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'/' {
            i += 2;
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            // Loop re-reads the newline itself, preserving it.
        } else if bytes[i] == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'*' {
            i = skip_block_comment(bytes, i + 2, &mut out);
        } else {
            let ch_len = utf8_len(bytes[i]);
            out.push_str(&source[i..i + ch_len]);
            i += ch_len;
        }
    }

    out
}

/// Removes backslash-newline sequences so that continued lines read as one.
pub fn unescape_source(source: &str) -> String {
    source
        .replace("\\\r\n", "")
        .replace("\\\n", "")
        .replace("\\\r", "")
}

// ============================================================================
// INTERNAL HELPERS
// ============================================================================

/// Consumes a block comment starting just past the `/*`, writing its
/// replacement (a space or the preserved newlines) to `out`. Returns the
/// index after the closing `*/`, or the input length if unterminated.
fn skip_block_comment(bytes: &[u8], mut i: usize, out: &mut String) -> usize {
    let mut newlines = 0usize;

    while i < bytes.len() {
        if bytes[i] == b'*' && i + 1 < bytes.len() && bytes[i + 1] == b'/' {
            i += 2;
            if newlines == 0 {
                out.push(' ');
            } else {
                for _ in 0..newlines {
                    out.push('\n');
                }
            }
            return i;
        }
        if bytes[i] == b'\n' {
            newlines += 1;
        }
        i += 1;
    }

    // Unterminated: keep the newlines so line numbers stay stable.
    for _ in 0..newlines {
        out.push('\n');
    }
    i
}

/// Byte length of the UTF-8 character starting with `first`.
fn utf8_len(first: u8) -> usize {
    match first {
        b if b >= 0xF0 => 4,
        b if b >= 0xE0 => 3,
        b if b >= 0xC0 => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_comment_keeps_newline() {
        assert_eq!(preprocess_comments("a // b\nc"), "a \nc");
    }

    #[test]
    fn test_line_comment_at_eof() {
        assert_eq!(preprocess_comments("a // b"), "a ");
    }

    #[test]
    fn test_inline_block_comment_becomes_space() {
        assert_eq!(preprocess_comments("a/*x*/b"), "a b");
    }

    #[test]
    fn test_multiline_block_comment_keeps_newlines() {
        assert_eq!(preprocess_comments("a/*x\ny\nz*/b"), "a\n\nb");
    }

    #[test]
    fn test_line_comment_inside_block_comment() {
        assert_eq!(preprocess_comments("a/* // not a line comment */b"), "a b");
    }

    #[test]
    fn test_block_opener_inside_line_comment() {
        assert_eq!(preprocess_comments("a // /* \nb */ c"), "a \nb */ c");
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert_eq!(preprocess_comments("a/*x\ny"), "a\n");
    }

    #[test]
    fn test_no_comments_is_identity() {
        let src = "#define A 1\nfloat x = 2.0 / 4.0;\n";
        assert_eq!(preprocess_comments(src), src);
    }

    #[test]
    fn test_unescape_removes_continuations() {
        assert_eq!(unescape_source("#define A \\\n1"), "#define A 1");
        assert_eq!(unescape_source("a\\\r\nb"), "ab");
        assert_eq!(unescape_source("a\\\rb"), "ab");
    }

    #[test]
    fn test_unescape_keeps_plain_backslash() {
        assert_eq!(unescape_source("a\\b"), "a\\b");
    }
}

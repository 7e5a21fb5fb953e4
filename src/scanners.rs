//! Pure predicates over a line buffer and a start offset. None of these
//! touch parser state; each returns 0 (or `None`) on no match, or enough
//! information for the caller to advance past the match.

use crate::ctype::{isdigit, isspace};
use crate::nodes::{ListDelimType, ListType, NodeList};

/// Returns the heading level (1-6) if `line[pos..]` begins an ATX heading,
/// i.e. 1-6 `#` characters followed by a space, tab, or end of line.
pub fn atx_heading_start(line: &[u8], pos: usize) -> Option<u32> {
    let mut i = pos;
    let mut level = 0u32;
    while i < line.len() && line[i] == b'#' {
        level += 1;
        i += 1;
        if level > 6 {
            return None;
        }
    }
    if level == 0 {
        return None;
    }
    if i == line.len() || isspace(line[i]) {
        Some(level)
    } else {
        None
    }
}

/// Returns 1 for a `=` setext underline, 2 for a `-` underline, else `None`.
/// The line must consist of one or more of the same character, optionally
/// followed by trailing spaces/tabs.
pub fn setext_heading_line(line: &[u8], pos: usize) -> Option<u32> {
    let mut i = pos;
    if i >= line.len() {
        return None;
    }
    let c = line[i];
    let level = match c {
        b'=' => 1,
        b'-' => 2,
        _ => return None,
    };
    while i < line.len() && line[i] == c {
        i += 1;
    }
    while i < line.len() && (line[i] == b' ' || line[i] == b'\t') {
        i += 1;
    }
    if i == line.len() || line[i] == b'\n' || line[i] == b'\r' {
        Some(level)
    } else {
        None
    }
}

/// Matches a thematic break: 3+ of the same `*`, `-`, or `_`, optionally
/// interspersed with spaces/tabs, alone on the line.
pub fn thematic_break(line: &[u8], pos: usize) -> bool {
    let mut i = pos;
    let mut count = 0;
    let mut marker = 0u8;

    while i < line.len() {
        match line[i] {
            b'\n' | b'\r' => break,
            b' ' | b'\t' => i += 1,
            c @ (b'*' | b'-' | b'_') => {
                if marker == 0 {
                    marker = c;
                } else if c != marker {
                    return false;
                }
                count += 1;
                i += 1;
            }
            _ => return false,
        }
    }

    count >= 3
}

/// Matches an opening code fence (3+ backticks or tildes). Returns the
/// fence character and its length.
pub fn open_code_fence(line: &[u8], pos: usize) -> Option<(u8, usize)> {
    let mut i = pos;
    if i >= line.len() {
        return None;
    }
    let c = line[i];
    if c != b'`' && c != b'~' {
        return None;
    }
    let start = i;
    while i < line.len() && line[i] == c {
        i += 1;
    }
    let len = i - start;
    if len < 3 {
        return None;
    }
    // Backtick fences may not contain a backtick in the trailing info string.
    if c == b'`' && line[i..].contains(&b'`') {
        return None;
    }
    Some((c, len))
}

/// Matches a closing code fence: the same character repeating at least
/// `fence_length` times, followed only by trailing whitespace. Returns
/// the length of the run of fence characters actually matched.
pub fn close_code_fence(line: &[u8], pos: usize, fence_char: u8, fence_length: usize) -> Option<usize> {
    let mut i = pos;
    let start = i;
    while i < line.len() && line[i] == fence_char {
        i += 1;
    }
    let run = i - start;
    if run < fence_length {
        return None;
    }
    while i < line.len() && (line[i] == b' ' || line[i] == b'\t') {
        i += 1;
    }
    if i == line.len() || line[i] == b'\n' || line[i] == b'\r' {
        Some(run)
    } else {
        None
    }
}

const HTML_BLOCK_1_TAGS: &[&str] = &["script", "pre", "style", "textarea"];

const HTML_BLOCK_6_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption",
    "center", "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2",
    "h3", "h4", "h5", "h6", "head", "header", "hr", "html", "iframe", "legend", "li",
    "link", "main", "menu", "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p",
    "param", "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title",
    "tr", "track", "ul",
];

fn ascii_lower(b: u8) -> u8 {
    b.to_ascii_lowercase()
}

fn match_word_ci(line: &[u8], pos: usize, word: &str) -> Option<usize> {
    let wb = word.as_bytes();
    if pos + wb.len() > line.len() {
        return None;
    }
    for (i, &w) in wb.iter().enumerate() {
        if ascii_lower(line[pos + i]) != w {
            return None;
        }
    }
    Some(pos + wb.len())
}

/// Determine the HTML block start type (1-7) for `line[pos..]`, where
/// `pos` is the first non-space column and the container-is-paragraph
/// restriction on type 7 is the caller's responsibility (§4.5 rule 4).
pub fn html_block_start(line: &[u8], pos: usize) -> Option<u8> {
    if pos >= line.len() || line[pos] != b'<' {
        return None;
    }
    let rest = &line[pos + 1..];

    if rest.starts_with(b"!--") {
        return Some(2);
    }
    if rest.first() == Some(&b'?') {
        return Some(3);
    }
    if rest.first() == Some(&b'!') && rest.get(1).map_or(false, |c| c.is_ascii_alphabetic()) {
        return Some(4);
    }
    if rest.starts_with(b"![CDATA[") {
        return Some(5);
    }

    for tag in HTML_BLOCK_1_TAGS {
        if let Some(after) = match_word_ci(line, pos + 1, tag) {
            if after == line.len() || isspace(line[after]) || line[after] == b'>' {
                return Some(1);
            }
        }
    }

    // type 6: a known block-level tag name, open or close, followed by
    // whitespace, `>`, `/>`, or end of line.
    let (close, tagstart) = if rest.first() == Some(&b'/') {
        (true, pos + 2)
    } else {
        (false, pos + 1)
    };
    let tag_begin = tagstart;
    let mut tag_end = tag_begin;
    while tag_end < line.len() && (line[tag_end].is_ascii_alphanumeric() || line[tag_end] == b'-')
    {
        tag_end += 1;
    }
    if tag_end > tag_begin {
        let name: Vec<u8> = line[tag_begin..tag_end].iter().map(|b| ascii_lower(*b)).collect();
        if HTML_BLOCK_6_TAGS.iter().any(|t| t.as_bytes() == &name[..]) {
            let mut after = tag_end;
            if !close {
                if after < line.len() && line[after] == b'/' {
                    after += 1;
                }
            }
            if after == line.len()
                || isspace(line[after])
                || line[after] == b'>'
                || (after + 1 < line.len() && line[after] == b'/' && line[after + 1] == b'>')
            {
                return Some(6);
            }
        }
    }

    html_block_start_7(line, pos).map(|_| 7)
}

/// Type 7: a complete open or closing tag (not one of the type-1/6 names),
/// followed only by whitespace, on a line by itself.
pub fn html_block_start_7(line: &[u8], pos: usize) -> Option<usize> {
    let end = html_tag(line, pos)?;
    let mut i = end;
    while i < line.len() && (line[i] == b' ' || line[i] == b'\t') {
        i += 1;
    }
    if i == line.len() || line[i] == b'\n' || line[i] == b'\r' {
        Some(end)
    } else {
        None
    }
}

/// Matches a single complete HTML open or closing tag starting at `pos`,
/// returning the offset just past the tag.
fn html_tag(line: &[u8], pos: usize) -> Option<usize> {
    let mut i = pos;
    if i >= line.len() || line[i] != b'<' {
        return None;
    }
    i += 1;
    if i < line.len() && line[i] == b'/' {
        i += 1;
    }
    let name_start = i;
    while i < line.len() && (line[i].is_ascii_alphanumeric() || line[i] == b'-') {
        i += 1;
    }
    if i == name_start {
        return None;
    }
    // skip attributes until the closing `>`; doesn't validate attribute
    // grammar precisely, matching the leniency of the reference scanner.
    let mut in_quote: Option<u8> = None;
    while i < line.len() {
        match line[i] {
            b'"' | b'\'' if in_quote.is_none() => {
                in_quote = Some(line[i]);
                i += 1;
            }
            c if Some(c) == in_quote => {
                in_quote = None;
                i += 1;
            }
            b'>' if in_quote.is_none() => {
                return Some(i + 1);
            }
            b'\n' | b'\r' if in_quote.is_none() => return None,
            _ => i += 1,
        }
    }
    None
}

pub fn html_block_end_1(line: &[u8]) -> bool {
    contains_ci(line, b"</script>") || contains_ci(line, b"</pre>") || contains_ci(line, b"</style>")
        || contains_ci(line, b"</textarea>")
}

pub fn html_block_end_2(line: &[u8]) -> bool {
    contains(line, b"-->")
}

pub fn html_block_end_3(line: &[u8]) -> bool {
    contains(line, b"?>")
}

pub fn html_block_end_4(line: &[u8]) -> bool {
    contains(line, b">")
}

pub fn html_block_end_5(line: &[u8]) -> bool {
    contains(line, b"]]>")
}

fn contains(hay: &[u8], needle: &[u8]) -> bool {
    hay.windows(needle.len()).any(|w| w == needle)
}

fn contains_ci(hay: &[u8], needle: &[u8]) -> bool {
    hay.windows(needle.len())
        .any(|w| w.iter().map(|b| ascii_lower(*b)).eq(needle.iter().copied()))
}

/// Attempts to parse a list item marker (bullet or ordered) at `pos`.
/// On success, returns the marker's length and the populated list data
/// (without `marker_offset`/`padding`, which the caller fills in once the
/// surrounding indent is known).
pub fn parse_list_marker(line: &[u8], pos: usize) -> Option<(usize, NodeList)> {
    let mut i = pos;
    if i >= line.len() {
        return None;
    }
    let c = line[i];

    if c == b'*' || c == b'-' || c == b'+' {
        i += 1;
        if i < line.len() && !isspace(line[i]) && line[i] != b'\n' && line[i] != b'\r' {
            return None;
        }
        return Some((
            i - pos,
            NodeList {
                list_type: ListType::Bullet,
                bullet_char: c,
                start: 1,
                delimiter: ListDelimType::Period,
                marker_offset: 0,
                padding: 0,
                tight: false,
            },
        ));
    }

    if isdigit(c) {
        let mut start: usize = 0;
        let mut digits = 0;
        while i < line.len() && isdigit(line[i]) && digits < 9 {
            start = start * 10 + (line[i] - b'0') as usize;
            i += 1;
            digits += 1;
        }
        if i >= line.len() {
            return None;
        }
        let delim = match line[i] {
            b'.' => ListDelimType::Period,
            b')' => ListDelimType::Paren,
            _ => return None,
        };
        i += 1;
        if i < line.len() && !isspace(line[i]) && line[i] != b'\n' && line[i] != b'\r' {
            return None;
        }
        return Some((
            i - pos,
            NodeList {
                list_type: ListType::Ordered,
                bullet_char: 0,
                start,
                delimiter: delim,
                marker_offset: 0,
                padding: 0,
                tight: false,
            },
        ));
    }

    None
}

/// Matches a link title: a quoted (`"..."`, `'...'`) or parenthesized
/// (`(...)`) string, allowing backslash-escapes and no blank line inside.
/// Returns the match length including delimiters.
pub fn link_title(line: &[u8], pos: usize) -> Option<usize> {
    let mut i = pos;
    if i >= line.len() {
        return None;
    }
    let (open, close) = match line[i] {
        b'"' => (b'"', b'"'),
        b'\'' => (b'\'', b'\''),
        b'(' => (b'(', b')'),
        _ => return None,
    };
    i += 1;
    let mut blank_lines = 0;
    loop {
        if i >= line.len() {
            return None;
        }
        match line[i] {
            b'\\' if i + 1 < line.len() => i += 2,
            c if c == close => return Some(i + 1 - pos),
            b'\n' => {
                blank_lines += 1;
                if blank_lines > 1 {
                    return None;
                }
                i += 1;
            }
            c if c == open && open != close => return None,
            _ => i += 1,
        }
    }
}

pub fn spacechars(line: &[u8], pos: usize) -> usize {
    let mut i = pos;
    while i < line.len() && (line[i] == b' ' || line[i] == b'\t' || line[i] == b'\n' || line[i] == b'\r') {
        i += 1;
    }
    i - pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_block_end_2_matches_anywhere_on_line() {
        assert!(html_block_end_2(b"-->\n"));
        assert!(html_block_end_2(b"stray text --> trailing\n"));
        assert!(!html_block_end_2(b"not a comment end\n"));
    }

    #[test]
    fn html_block_end_5_requires_full_cdata_close() {
        assert!(html_block_end_5(b"]]>\n"));
        assert!(html_block_end_5(b"junk]]>\n"));
        assert!(!html_block_end_5(b"]>\n"));
    }

    #[test]
    fn html_block_start_recognizes_each_variant() {
        assert_eq!(html_block_start(b"<script>\n", 0), Some(1));
        assert_eq!(html_block_start(b"<!-- c\n", 0), Some(2));
        assert_eq!(html_block_start(b"<?php\n", 0), Some(3));
        assert_eq!(html_block_start(b"<!DOCTYPE html>\n", 0), Some(4));
        assert_eq!(html_block_start(b"<![CDATA[\n", 0), Some(5));
        assert_eq!(html_block_start(b"<div>\n", 0), Some(6));
        assert_eq!(html_block_start(b"<x-custom>\n", 0), Some(7));
        assert_eq!(html_block_start(b"plain text\n", 0), None);
    }
}

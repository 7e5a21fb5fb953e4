//! Link reference definition extraction, run against the head of a
//! paragraph at finalize time: `[label]: destination "title"`.

use crate::refmap::RefMap;
use crate::scanners;
use crate::strings;

fn skip_spacetabs(content: &[u8], mut i: usize) -> usize {
    while i < content.len() && (content[i] == b' ' || content[i] == b'\t') {
        i += 1;
    }
    i
}

/// At most one line ending may separate the label/destination/title parts.
fn skip_spacetabs_and_one_newline(content: &[u8], mut i: usize) -> usize {
    i = skip_spacetabs(content, i);
    if i < content.len() && (content[i] == b'\r' || content[i] == b'\n') {
        if content[i] == b'\r' {
            i += 1;
        }
        if i < content.len() && content[i] == b'\n' {
            i += 1;
        }
        i = skip_spacetabs(content, i);
    }
    i
}

fn line_end(content: &[u8], mut i: usize) -> usize {
    while i < content.len() && content[i] != b'\n' && content[i] != b'\r' {
        i += 1;
    }
    i
}

/// `[...]`, with backslash-escapes honored and unescaped nested `[`
/// rejected (CommonMark link labels can't themselves contain `[`).
fn scan_label(content: &[u8], pos: usize) -> Option<usize> {
    if content.get(pos) != Some(&b'[') {
        return None;
    }
    let mut i = pos + 1;
    let mut len = 0;
    while i < content.len() {
        match content[i] {
            b'\\' if i + 1 < content.len() => {
                i += 2;
                len += 2;
            }
            b'[' => return None,
            b']' => {
                if len == 0 || len > 999 {
                    return None;
                }
                return Some(i + 1);
            }
            _ => {
                i += 1;
                len += 1;
            }
        }
    }
    None
}

fn scan_destination(content: &[u8], pos: usize) -> Option<usize> {
    if content.get(pos) == Some(&b'<') {
        let mut i = pos + 1;
        while i < content.len() {
            match content[i] {
                b'\\' if i + 1 < content.len() => i += 2,
                b'>' => return Some(i + 1),
                b'\n' | b'<' => return None,
                _ => i += 1,
            }
        }
        None
    } else {
        let mut i = pos;
        let mut depth = 0i32;
        if content.get(i).map_or(true, |&c| c == b' ' || c == b'\t' || strings::is_line_end_char(c)) {
            return None;
        }
        while i < content.len() {
            match content[i] {
                b'\\' if i + 1 < content.len() => i += 2,
                b'(' => {
                    depth += 1;
                    i += 1;
                }
                b')' => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    i += 1;
                }
                c if c.is_ascii_control() || c == b' ' => break,
                _ => i += 1,
            }
        }
        if depth != 0 || i == pos {
            return None;
        }
        Some(i)
    }
}

/// Attempts to parse a single link reference definition at the start of
/// `content`. On success, registers it in `refmap` and returns the number
/// of leading bytes consumed (up to and including the definition's final
/// line ending, or the end of `content`).
pub(crate) fn parse_reference_inline(content: &[u8], refmap: &mut RefMap) -> Option<usize> {
    let mut i = 0;

    let label_end = scan_label(content, i)?;
    let label = &content[i + 1..label_end - 1];
    i = label_end;

    if content.get(i) != Some(&b':') {
        return None;
    }
    i += 1;
    i = skip_spacetabs_and_one_newline(content, i);

    let dest_end = scan_destination(content, i)?;
    let destination = &content[i..dest_end];
    i = dest_end;

    let before_title = i;
    let after_spacing = skip_spacetabs_and_one_newline(content, i);

    let mut title: &[u8] = &[];
    let mut after_title = before_title;

    if after_spacing > before_title {
        if let Some(title_len) = scanners::link_title(content, after_spacing) {
            let title_end = after_spacing + title_len;
            let rest = skip_spacetabs(content, title_end);
            let le = line_end(content, rest);
            if rest == le {
                title = &content[after_spacing..title_end];
                after_title = le;
            }
        }
    }

    if after_title == before_title {
        let rest = skip_spacetabs(content, before_title);
        let le = line_end(content, rest);
        if rest != le {
            return None;
        }
        after_title = le;
    }

    let mut consumed = after_title;
    if content.get(consumed) == Some(&b'\r') {
        consumed += 1;
    }
    if content.get(consumed) == Some(&b'\n') {
        consumed += 1;
    }

    let url = strings::clean_url(destination);
    let title = strings::clean_title(title);
    refmap.insert(label, url, title);

    Some(consumed)
}

use crate::ctype::{isdigit, ispunct, isspace};
use crate::entity;

/// Backslash-unescape punctuation in place, e.g. `\*` -> `*`.
pub fn unescape(v: &mut Vec<u8>) {
    let mut r = 0;
    let mut sz = v.len();

    while r < sz {
        if v[r] == b'\\' && r + 1 < sz && ispunct(v[r + 1]) {
            v.remove(r);
            sz -= 1;
        }
        if r >= sz {
            break;
        }
        r += 1;
    }
}

pub fn is_line_end_char(ch: u8) -> bool {
    matches!(ch, 10 | 13)
}

pub fn is_space_or_tab(ch: u8) -> bool {
    matches!(ch, 9 | 32)
}

/// Strip a `#`-run (plus preceding whitespace) trailing an ATX heading line,
/// per the CommonMark "optional closing sequence" rule.
pub fn chop_trailing_hashtags(line: &mut Vec<u8>) {
    rtrim(line);

    if line.is_empty() {
        return;
    }

    let orig_n = line.len() - 1;
    let mut n = orig_n;

    while line[n] == b'#' {
        if n == 0 {
            return;
        }
        n -= 1;
    }

    if n != orig_n && is_space_or_tab(line[n]) {
        line.truncate(n);
        rtrim(line);
    }
}

pub fn rtrim(line: &mut Vec<u8>) {
    while let Some(&last) = line.last() {
        if isspace(last) {
            line.pop();
        } else {
            break;
        }
    }
}

pub fn ltrim(line: &mut Vec<u8>) {
    let mut drop = 0;
    while drop < line.len() && isspace(line[drop]) {
        drop += 1;
    }
    if drop > 0 {
        line.drain(..drop);
    }
}

pub fn trim(line: &mut Vec<u8>) {
    ltrim(line);
    rtrim(line);
}

pub fn trim_slice(mut i: &[u8]) -> &[u8] {
    while !i.is_empty() && isspace(i[0]) {
        i = &i[1..];
    }
    while !i.is_empty() && isspace(i[i.len() - 1]) {
        i = &i[..i.len() - 1];
    }
    i
}

/// Strip surrounding `<...>`, then HTML-unescape, then backslash-unescape.
pub fn clean_url(url: &[u8]) -> Vec<u8> {
    let url = trim_slice(url);

    if url.is_empty() {
        return Vec::new();
    }

    let mut b = if url[0] == b'<' && url[url.len() - 1] == b'>' {
        entity::unescape_html(&url[1..url.len() - 1])
    } else {
        entity::unescape_html(url)
    };

    unescape(&mut b);
    b
}

/// Strip matching quote/paren delimiters, then HTML-unescape, then
/// backslash-unescape. Used for link reference definition titles.
pub fn clean_title(title: &[u8]) -> Vec<u8> {
    if title.is_empty() {
        return Vec::new();
    }

    let first = title[0];
    let last = title[title.len() - 1];

    let mut b = if (first == b'\'' && last == b'\'')
        || (first == b'(' && last == b')')
        || (first == b'"' && last == b'"')
    {
        entity::unescape_html(&title[1..title.len() - 1])
    } else {
        entity::unescape_html(title)
    };

    unescape(&mut b);
    b
}

pub fn is_blank(s: &[u8]) -> bool {
    for &c in s {
        match c {
            10 | 13 => return true,
            32 | 9 => (),
            _ => return false,
        }
    }
    true
}

/// Normalize a reference label for lookup: trim, lowercase, collapse
/// internal whitespace runs to a single space.
pub fn normalize_reference_label(i: &[u8]) -> String {
    let i = trim_slice(i);
    let text = String::from_utf8_lossy(i);

    let mut v = String::with_capacity(text.len());
    let mut last_was_whitespace = false;
    for c in text.chars() {
        for e in c.to_lowercase() {
            if e.is_whitespace() {
                if !last_was_whitespace {
                    last_was_whitespace = true;
                    v.push(' ');
                }
            } else {
                last_was_whitespace = false;
                v.push(e);
            }
        }
    }
    v
}

pub fn is_digit(ch: u8) -> bool {
    isdigit(ch)
}

/// Drop trailing blank lines from an indented code block's accumulated
/// content, matching `cmark_strbuf_chop_trailing_blank_lines`: walk
/// backward from the end, and the moment a non-blank byte is found, cut
/// right after the next newline.
pub fn remove_trailing_blank_lines(content: &mut Vec<u8>) {
    let mut last_non_blank = None;
    for i in (0..content.len()).rev() {
        let c = content[i];
        if c != b' ' && c != b'\t' && !is_line_end_char(c) {
            last_non_blank = Some(i);
            break;
        }
    }

    let start = match last_non_blank {
        Some(i) => i,
        None => {
            content.clear();
            return;
        }
    };

    for i in start..content.len() {
        if is_line_end_char(content[i]) {
            content.truncate(i);
            return;
        }
    }
}

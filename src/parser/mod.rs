//! The block-structure parser: turns a byte stream into a tree of
//! [`crate::nodes::NodeValue`] nodes. See the module-level docs on
//! `continuation`, `opening`, and `finalize` for the three phases each
//! line passes through.

mod continuation;
mod finalize;
mod opening;
mod reference;

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::Path;

use typed_arena::Arena;

use crate::inline::{InlineCollaborator, NullInlineCollaborator};
use crate::nodes::{Ast, AstNode, LineColumn, NodeValue};
use crate::refmap::RefMap;

use continuation::Continuation;

pub(crate) const TAB_STOP: usize = 4;
pub(crate) const CODE_INDENT: usize = 4;

/// Parsing options. `normalize` and `validate_utf8` are acted on directly
/// by this crate (§6); any other bits a caller needs for its inline
/// collaborator belong on that collaborator's own config, not here --
/// this crate carries no GFM-style extension surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Merge adjacent inline text nodes after parsing. The block parser
    /// only threads this through to the inline collaborator; it performs
    /// no merging itself.
    pub normalize: bool,
    /// Replace invalid UTF-8 byte sequences with U+FFFD before a line is
    /// stored in `curline`.
    pub validate_utf8: bool,
    /// Suppress setext-heading promotion, treating `===`/`---` lines
    /// under a paragraph as thematic breaks/plain text candidates
    /// instead. Threaded through to the render layer; recognized here
    /// only as part of the shared options surface.
    pub ignore_setext: bool,
}

impl Options {
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OptionsBuilder {
    opts: Options,
}

impl OptionsBuilder {
    pub fn normalize(mut self, v: bool) -> Self {
        self.opts.normalize = v;
        self
    }

    pub fn validate_utf8(mut self, v: bool) -> Self {
        self.opts.validate_utf8 = v;
        self
    }

    pub fn ignore_setext(mut self, v: bool) -> Self {
        self.opts.ignore_setext = v;
        self
    }

    pub fn build(self) -> Options {
        self.opts
    }
}

/// Owns the in-progress document tree and all per-line scanning state.
pub struct Parser<'a> {
    arena: &'a Arena<AstNode<'a>>,
    root: &'a AstNode<'a>,
    current: &'a AstNode<'a>,

    pub(crate) options: Options,
    pub(crate) refmap: RefMap,

    pub(crate) line_number: usize,
    pub(crate) offset: usize,
    pub(crate) column: usize,
    pub(crate) first_nonspace: usize,
    pub(crate) first_nonspace_column: usize,
    pub(crate) indent: usize,
    pub(crate) blank: bool,

    pub(crate) curline: Vec<u8>,
    linebuf: Vec<u8>,
    pub(crate) last_line_length: usize,
    last_buffer_ended_with_cr: bool,
}

impl<'a> Parser<'a> {
    pub fn new(arena: &'a Arena<AstNode<'a>>, options: Options) -> Self {
        let root = arena.alloc(AstNode::new(RefCell::new(Ast::new(
            NodeValue::Document,
            LineColumn::new(1, 1),
        ))));

        Parser {
            arena,
            root,
            current: root,
            options,
            refmap: RefMap::new(),
            line_number: 0,
            offset: 0,
            column: 0,
            first_nonspace: 0,
            first_nonspace_column: 0,
            indent: 0,
            blank: false,
            curline: Vec::with_capacity(256),
            linebuf: Vec::new(),
            last_line_length: 0,
            last_buffer_ended_with_cr: false,
        }
    }

    /// Feed a chunk of input. May be called repeatedly with arbitrarily
    /// sized slices; a line that doesn't yet end in the buffer is held in
    /// `linebuf` until the next call (or `finish`) completes it.
    pub fn feed(&mut self, buffer: &[u8]) {
        let mut buffer = buffer;

        if self.last_buffer_ended_with_cr && buffer.first() == Some(&b'\n') {
            buffer = &buffer[1..];
        }
        self.last_buffer_ended_with_cr = false;

        let end = buffer.len();
        let mut pos = 0;

        while pos < end {
            let mut eol = pos;
            let mut process = false;
            let mut saw_nul = false;
            while eol < end {
                let c = buffer[eol];
                if c == b'\n' || c == b'\r' {
                    process = true;
                    break;
                }
                if c == 0 {
                    saw_nul = true;
                    break;
                }
                eol += 1;
            }

            let chunk_len = eol - pos;
            if process {
                if !self.linebuf.is_empty() {
                    self.linebuf.extend_from_slice(&buffer[pos..pos + chunk_len]);
                    let line = std::mem::take(&mut self.linebuf);
                    self.process_line(&line);
                } else {
                    self.process_line(&buffer[pos..pos + chunk_len]);
                }
            } else if saw_nul {
                self.linebuf.extend_from_slice(&buffer[pos..pos + chunk_len]);
                self.linebuf.extend_from_slice(&[0xEF, 0xBF, 0xBD]);
            } else {
                self.linebuf.extend_from_slice(&buffer[pos..pos + chunk_len]);
            }

            pos += chunk_len;
            if saw_nul && !process {
                pos += 1; // skip the NUL we just replaced
                continue;
            }
            if pos < end && buffer[pos] == b'\r' {
                pos += 1;
            }
            if pos < end && buffer[pos] == b'\n' {
                pos += 1;
            }
        }

        if buffer.last() == Some(&b'\r') {
            self.last_buffer_ended_with_cr = true;
        }
    }

    /// Flushes any buffered partial line, finalizes every still-open
    /// node, and hands the tree to the inline collaborator.
    pub fn finish(mut self) -> &'a AstNode<'a> {
        if !self.linebuf.is_empty() {
            let line = std::mem::take(&mut self.linebuf);
            self.process_line(&line);
        }
        self.finalize_document(&mut NullInlineCollaborator)
    }

    /// Like `finish`, but hands the tree to a caller-supplied inline
    /// collaborator instead of the trivial default.
    pub fn finish_with(mut self, collaborator: &mut dyn InlineCollaborator) -> &'a AstNode<'a> {
        if !self.linebuf.is_empty() {
            let line = std::mem::take(&mut self.linebuf);
            self.process_line(&line);
        }
        self.finalize_document(collaborator)
    }

    fn process_line(&mut self, buffer: &[u8]) {
        self.curline.clear();
        if self.options.validate_utf8 {
            push_utf8_lossy(&mut self.curline, buffer);
        } else {
            self.curline.extend_from_slice(buffer);
        }

        if self.curline.is_empty() || !is_line_end_char(*self.curline.last().unwrap()) {
            self.curline.push(b'\n');
        }

        self.offset = 0;
        self.column = 0;
        self.blank = false;
        self.line_number += 1;

        match self.check_open_blocks() {
            Continuation::ClosedFence { current } => {
                self.current = current;
            }
            Continuation::Normal {
                last_matched,
                all_matched,
            } => {
                let container = self.open_new_blocks(last_matched, all_matched);
                self.add_text_to_container(container, last_matched);
            }
        }

        self.last_line_length = self.curline.len();
        if self.last_line_length > 0 && self.curline[self.last_line_length - 1] == b'\n' {
            self.last_line_length -= 1;
        }
        if self.last_line_length > 0 && self.curline[self.last_line_length - 1] == b'\r' {
            self.last_line_length -= 1;
        }
    }

    /// §4.2: advance `first_nonspace`/`first_nonspace_column`/`indent`/
    /// `blank` from the current `offset`/`column`.
    pub(crate) fn find_first_nonspace(&mut self) {
        let line = &self.curline;
        let mut chars_to_tab = TAB_STOP - (self.column % TAB_STOP);

        self.first_nonspace = self.offset;
        self.first_nonspace_column = self.column;

        loop {
            let c = line.get(self.first_nonspace).copied();
            match c {
                Some(b' ') => {
                    self.first_nonspace += 1;
                    self.first_nonspace_column += 1;
                    chars_to_tab -= 1;
                    if chars_to_tab == 0 {
                        chars_to_tab = TAB_STOP;
                    }
                }
                Some(b'\t') => {
                    self.first_nonspace += 1;
                    self.first_nonspace_column += chars_to_tab;
                    chars_to_tab = TAB_STOP;
                }
                _ => break,
            }
        }

        self.indent = self.first_nonspace_column - self.column;
        self.blank = matches!(
            line.get(self.first_nonspace).copied(),
            None | Some(b'\n') | Some(b'\r')
        );
    }

    /// §4.2: advance `(offset, column)` by `count`. With `columns=true`, a
    /// tab consumes only the columns needed to reach the next stop even if
    /// that's fewer than a full tab-width, leaving the rest of the tab
    /// un-consumed virtually (partial tab consumption).
    pub(crate) fn advance_offset(&mut self, mut count: usize, columns: bool) {
        while count > 0 {
            let c = match self.curline.get(self.offset) {
                Some(&c) => c,
                None => break,
            };
            if c == b'\t' {
                let chars_to_tab = TAB_STOP - (self.column % TAB_STOP);
                self.column += chars_to_tab;
                self.offset += 1;
                count = count.saturating_sub(if columns { chars_to_tab } else { 1 });
            } else {
                self.offset += 1;
                self.column += 1;
                count -= 1;
            }
        }
    }

    pub(crate) fn add_child(
        &mut self,
        mut parent: &'a AstNode<'a>,
        value: NodeValue,
        start_column: usize,
    ) -> &'a AstNode<'a> {
        while !crate::nodes::can_contain_type(&parent.data.borrow().value, &value) {
            parent = self.finalize(parent);
        }

        let child = self.arena.alloc(AstNode::new(RefCell::new(Ast::new(
            value,
            LineColumn::new(self.line_number, start_column),
        ))));
        parent.append(child);
        child
    }

    pub fn root(&self) -> &'a AstNode<'a> {
        self.root
    }
}

fn is_line_end_char(c: u8) -> bool {
    c == b'\n' || c == b'\r'
}

fn push_utf8_lossy(out: &mut Vec<u8>, bytes: &[u8]) {
    match std::str::from_utf8(bytes) {
        Ok(s) => out.extend_from_slice(s.as_bytes()),
        Err(_) => out.extend_from_slice(String::from_utf8_lossy(bytes).as_bytes()),
    }
}

/// Parse a complete in-memory document in one shot.
pub fn parse_document<'a>(
    arena: &'a Arena<AstNode<'a>>,
    buffer: &[u8],
    options: Options,
) -> &'a AstNode<'a> {
    let mut parser = Parser::new(arena, options);
    parser.feed(buffer);
    parser.finish()
}

/// Parse the contents of a file on disk. The only fallible entry point in
/// this crate -- the failure here is a real I/O error, not a parse error.
pub fn parse_file<'a>(
    arena: &'a Arena<AstNode<'a>>,
    path: &Path,
    options: Options,
) -> io::Result<&'a AstNode<'a>> {
    let bytes = fs::read(path)?;
    Ok(parse_document(arena, &bytes, options))
}

//! §4.6 leaf line placement and §4.7 finalization.

use crate::inline::InlineCollaborator;
use crate::nodes::{AstNode, NodeValue};
use crate::scanners;
use crate::strings;

use super::Parser;
use super::reference;

impl<'a> Parser<'a> {
    /// §4.6: deposit the remainder of the current line into the
    /// appropriate leaf, closing any nodes that fell out of the open
    /// path along the way (unless this is a lazy paragraph continuation).
    pub(crate) fn add_text_to_container(
        &mut self,
        mut container: &'a AstNode<'a>,
        last_matched: &'a AstNode<'a>,
    ) {
        self.find_first_nonspace();

        if self.blank {
            if let Some(last_child) = container.last_child() {
                last_child.data.borrow_mut().last_line_blank = true;
            }
        }

        let just_opened_empty_item = matches!(container.data.borrow().value, NodeValue::Item(..))
            && container.first_child().is_none()
            && container.data.borrow().sourcepos.start.line == self.line_number;

        let suppresses_blank = matches!(
            container.data.borrow().value,
            NodeValue::BlockQuote | NodeValue::Heading(..) | NodeValue::ThematicBreak
        ) || matches!(&container.data.borrow().value, NodeValue::CodeBlock(c) if c.fenced)
            || just_opened_empty_item;

        container.data.borrow_mut().last_line_blank = self.blank && !suppresses_blank;

        let mut cur = container.parent();
        while let Some(p) = cur {
            p.data.borrow_mut().last_line_blank = false;
            cur = p.parent();
        }

        let lazy_continuation = !container.same_node(self.current)
            && container.same_node(last_matched)
            && !self.blank
            && matches!(self.current.data.borrow().value, NodeValue::Paragraph)
            && !self.current.data.borrow().content.is_empty();

        if lazy_continuation {
            let offset = self.offset;
            add_line(self.current, &self.curline, offset);
        } else {
            while !self.current.same_node(last_matched) {
                self.current = self.finalize(self.current);
            }

            enum Placement {
                Code,
                Html(u8),
                Blank,
                AtxHeading,
                Lines,
                NewParagraph,
            }

            let placement = {
                let data = container.data.borrow();
                match &data.value {
                    NodeValue::CodeBlock(_) => Placement::Code,
                    NodeValue::HtmlBlock(html) => Placement::Html(html.block_type),
                    _ if self.blank => Placement::Blank,
                    NodeValue::Heading(h) if !h.setext => Placement::AtxHeading,
                    v if v.accepts_lines() => Placement::Lines,
                    _ => Placement::NewParagraph,
                }
            };

            match placement {
                Placement::Code => {
                    let offset = self.offset;
                    add_line(container, &self.curline, offset);
                }
                Placement::Html(block_type) => {
                    let offset = self.offset;
                    add_line(container, &self.curline, offset);

                    let rest = &self.curline[self.first_nonspace..];
                    let matches_end = match block_type {
                        1 => scanners::html_block_end_1(rest),
                        2 => scanners::html_block_end_2(rest),
                        3 => scanners::html_block_end_3(rest),
                        4 => scanners::html_block_end_4(rest),
                        5 => scanners::html_block_end_5(rest),
                        _ => false,
                    };
                    if matches_end {
                        container = self.finalize(container);
                    }
                }
                Placement::Blank => {}
                Placement::AtxHeading => {
                    let mut line = self.curline[self.first_nonspace..].to_vec();
                    strings::chop_trailing_hashtags(&mut line);
                    container.data.borrow_mut().content.extend_from_slice(&line);
                }
                Placement::Lines => {
                    let offset = self.first_nonspace;
                    add_line(container, &self.curline, offset);
                }
                Placement::NewParagraph => {
                    let offset = self.first_nonspace;
                    container = self.add_child(container, NodeValue::Paragraph, offset + 1);
                    add_line(container, &self.curline, offset);
                }
            }

            self.current = container;
        }
    }

    /// §4.7: close `b`, fix up its sourcepos, and apply type-specific
    /// migrations. Returns `b`'s parent (the new current-candidate).
    pub(crate) fn finalize(&mut self, b: &'a AstNode<'a>) -> &'a AstNode<'a> {
        let parent = b.parent().unwrap_or(b);

        {
            let mut data = b.data.borrow_mut();
            debug_assert!(data.open);
            data.open = false;

            if self.curline.is_empty() {
                data.sourcepos.end = crate::nodes::LineColumn::new(
                    self.line_number,
                    self.last_line_length,
                );
            } else {
                let use_current_line = matches!(data.value, NodeValue::Document)
                    || matches!(&data.value, NodeValue::CodeBlock(c) if c.fenced)
                    || matches!(&data.value, NodeValue::Heading(h) if h.setext);
                if use_current_line {
                    let mut end_col = self.curline.len();
                    if end_col > 0 && self.curline[end_col - 1] == b'\n' {
                        end_col -= 1;
                    }
                    if end_col > 0 && self.curline[end_col - 1] == b'\r' {
                        end_col -= 1;
                    }
                    data.sourcepos.end = crate::nodes::LineColumn::new(self.line_number, end_col);
                } else {
                    data.sourcepos.end = crate::nodes::LineColumn::new(
                        self.line_number.saturating_sub(1),
                        self.last_line_length,
                    );
                }
            }
        }

        let mut delete_node = false;

        {
            let mut data = b.data.borrow_mut();
            match &mut data.value {
                NodeValue::Paragraph => {
                    while data.content.first() == Some(&b'[') {
                        match reference::parse_reference_inline(&data.content, &mut self.refmap) {
                            Some(consumed) if consumed > 0 => {
                                data.content.drain(..consumed);
                            }
                            _ => break,
                        }
                    }
                    if strings::is_blank(&data.content) {
                        delete_node = true;
                    }
                }
                NodeValue::CodeBlock(code) => {
                    if !code.fenced {
                        strings::remove_trailing_blank_lines(&mut data.content);
                        data.content.push(b'\n');
                        code.literal = std::mem::take(&mut data.content);
                    } else {
                        let pos = data
                            .content
                            .iter()
                            .position(|&c| c == b'\n' || c == b'\r')
                            .unwrap_or(data.content.len());
                        let mut info = crate::entity::unescape_html(&data.content[..pos]);
                        strings::trim(&mut info);
                        strings::unescape(&mut info);
                        code.info = info;

                        let mut rest_start = pos;
                        if data.content.get(rest_start) == Some(&b'\r') {
                            rest_start += 1;
                        }
                        if data.content.get(rest_start) == Some(&b'\n') {
                            rest_start += 1;
                        }
                        data.content.drain(..rest_start);
                        code.literal = std::mem::take(&mut data.content);
                    }
                }
                NodeValue::HtmlBlock(html) => {
                    html.literal = std::mem::take(&mut data.content);
                }
                NodeValue::List(list) => {
                    list.tight = true;
                    let mut item = b.first_child();
                    'outer: while let Some(it) = item {
                        let it_data = it.data.borrow();
                        if it_data.last_line_blank && it.next_sibling().is_some() {
                            list.tight = false;
                            break;
                        }
                        let mut subitem = it.first_child();
                        while let Some(s) = subitem {
                            if crate::nodes::ends_with_blank_line(s)
                                && (it.next_sibling().is_some() || s.next_sibling().is_some())
                            {
                                list.tight = false;
                                break 'outer;
                            }
                            subitem = s.next_sibling();
                        }
                        item = it.next_sibling();
                    }
                }
                _ => {}
            }
        }

        if delete_node {
            b.detach();
        }

        parent
    }

    /// Closes every node from `current` up to `root`, finalizes `root`,
    /// then hands the finished tree to the inline collaborator.
    pub(crate) fn finalize_document(
        &mut self,
        collaborator: &mut dyn InlineCollaborator,
    ) -> &'a AstNode<'a> {
        while !self.current.same_node(self.root()) {
            self.current = self.finalize(self.current);
        }
        self.finalize(self.root());

        let root = self.root();
        collaborator.process(root, &self.refmap, &self.options);
        root
    }

    /// On the second consecutive blank line inside a list, close the
    /// outermost enclosing list; `current`'s place in the tree moves to
    /// that list's parent.
    pub(crate) fn break_out_of_lists(&mut self, container: &'a AstNode<'a>) -> &'a AstNode<'a> {
        let mut b = self.root();
        loop {
            let is_list = matches!(b.data.borrow().value, NodeValue::List(..));
            if is_list {
                break;
            }
            match b.last_child() {
                Some(c) => b = c,
                None => return container,
            }
        }

        let mut cur = container;
        while !cur.same_node(b) {
            cur = self.finalize(cur);
        }
        self.finalize(b);
        b.parent().unwrap_or(self.root())
    }
}

fn add_line(node: &AstNode<'_>, line: &[u8], offset: usize) {
    debug_assert!(node.data.borrow().open);
    node.data.borrow_mut().content.extend_from_slice(&line[offset..]);
}

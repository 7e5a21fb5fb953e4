//! §4.5 Container opening: starting at the last matched container, try in
//! priority order to open further nested containers for this line.

use crate::nodes::{NodeCodeBlock, NodeHeading, NodeHtmlBlock, NodeList, NodeValue};
use crate::nodes::AstNode;
use crate::scanners;

use super::{Parser, CODE_INDENT};

fn lists_match(a: &NodeList, b: &NodeList) -> bool {
    a.list_type == b.list_type && a.delimiter == b.delimiter && a.bullet_char == b.bullet_char
}

/// Paragraph content consists of exactly one logical line -- required for
/// setext promotion, since a setext underline only retroactively converts
/// a paragraph that hasn't already absorbed multiple lines.
fn is_one_line(content: &[u8]) -> bool {
    let n = content.len();
    n < 2 || !content[..n - 2].contains(&b'\n')
}

impl<'a> Parser<'a> {
    pub(crate) fn open_new_blocks(
        &mut self,
        last_matched: &'a AstNode<'a>,
        all_matched: bool,
    ) -> &'a AstNode<'a> {
        let mut container = last_matched;

        if self.blank && container.data.borrow().last_line_blank {
            container = self.break_out_of_lists(container);
        }

        let mut maybe_lazy = matches!(self.current.data.borrow().value, NodeValue::Paragraph);

        loop {
            if matches!(
                container.data.borrow().value,
                NodeValue::CodeBlock(_) | NodeValue::HtmlBlock(_)
            ) {
                break;
            }

            self.find_first_nonspace();
            let indented = self.indent >= CODE_INDENT;
            let is_paragraph_container = matches!(container.data.borrow().value, NodeValue::Paragraph);

            if !indented && self.curline.get(self.first_nonspace) == Some(&b'>') {
                let adv = self.first_nonspace + 1 - self.offset;
                self.advance_offset(adv, false);
                if self.curline.get(self.offset) == Some(&b' ') {
                    self.advance_offset(1, false);
                }
                container = self.add_child(container, NodeValue::BlockQuote, self.offset + 1);
            } else if !indented
                && scanners::atx_heading_start(&self.curline, self.first_nonspace).is_some()
            {
                let level =
                    scanners::atx_heading_start(&self.curline, self.first_nonspace).unwrap();
                let adv = self.first_nonspace + level as usize - self.offset;
                self.advance_offset(adv, false);
                container = self.add_child(
                    container,
                    NodeValue::Heading(NodeHeading {
                        level,
                        setext: false,
                    }),
                    self.offset + 1,
                );
            } else if !indented
                && scanners::open_code_fence(&self.curline, self.first_nonspace).is_some()
            {
                let (fence_char, fence_length) =
                    scanners::open_code_fence(&self.curline, self.first_nonspace).unwrap();
                let fence_offset = self.first_nonspace - self.offset;
                let adv = self.first_nonspace + fence_length - self.offset;
                container = self.add_child(
                    container,
                    NodeValue::CodeBlock(NodeCodeBlock {
                        fenced: true,
                        fence_char,
                        fence_length,
                        fence_offset,
                        info: Vec::new(),
                        literal: Vec::new(),
                    }),
                    self.first_nonspace + 1,
                );
                self.advance_offset(adv, false);
            } else if !indented
                && {
                    let t = scanners::html_block_start(&self.curline, self.first_nonspace);
                    t.filter(|&t| t != 7 || !is_paragraph_container).is_some()
                }
            {
                let block_type =
                    scanners::html_block_start(&self.curline, self.first_nonspace).unwrap();
                container = self.add_child(
                    container,
                    NodeValue::HtmlBlock(NodeHtmlBlock {
                        block_type,
                        literal: Vec::new(),
                    }),
                    self.first_nonspace + 1,
                );
            } else if !indented
                && is_paragraph_container
                && scanners::setext_heading_line(&self.curline, self.first_nonspace).is_some()
                && is_one_line(&container.data.borrow().content)
            {
                let level =
                    scanners::setext_heading_line(&self.curline, self.first_nonspace).unwrap();
                container.data.borrow_mut().value = NodeValue::Heading(NodeHeading {
                    level,
                    setext: true,
                });
                let adv = self.curline.len() - 1 - self.offset;
                self.advance_offset(adv, false);
            } else if !indented
                && !(is_paragraph_container && !all_matched)
                && scanners::thematic_break(&self.curline, self.first_nonspace)
            {
                container =
                    self.add_child(container, NodeValue::ThematicBreak, self.first_nonspace + 1);
                let adv = self.curline.len() - 1 - self.offset;
                self.advance_offset(adv, false);
            } else if scanners::parse_list_marker(&self.curline, self.first_nonspace).is_some()
                && (!indented || matches!(container.data.borrow().value, NodeValue::List(..)))
            {
                let (matched, mut data) =
                    scanners::parse_list_marker(&self.curline, self.first_nonspace).unwrap();

                let adv = self.first_nonspace + matched - self.offset;
                self.advance_offset(adv, false);

                let mut i = 0;
                while i <= 5 && self.curline.get(self.offset + i) == Some(&b' ') {
                    i += 1;
                }

                let line_end = matches!(self.curline.get(self.offset), None | Some(b'\n') | Some(b'\r'));
                if i >= 5 || i < 1 || line_end {
                    data.padding = matched + 1;
                    if i > 0 {
                        self.advance_offset(1, false);
                    }
                } else {
                    data.padding = matched + i;
                    self.advance_offset(i, true);
                }

                data.marker_offset = self.indent;

                let needs_new_list = match &container.data.borrow().value {
                    NodeValue::List(existing) => !lists_match(existing, &data),
                    _ => true,
                };
                if needs_new_list {
                    container = self.add_child(
                        container,
                        NodeValue::List(data.clone()),
                        self.first_nonspace + 1,
                    );
                }

                container =
                    self.add_child(container, NodeValue::Item(data), self.first_nonspace + 1);
            } else if indented && !maybe_lazy && !self.blank {
                self.advance_offset(CODE_INDENT, true);
                container = self.add_child(
                    container,
                    NodeValue::CodeBlock(NodeCodeBlock {
                        fenced: false,
                        fence_char: 0,
                        fence_length: 0,
                        fence_offset: 0,
                        info: Vec::new(),
                        literal: Vec::new(),
                    }),
                    self.offset + 1,
                );
            } else {
                break;
            }

            if container.data.borrow().value.accepts_lines() {
                break;
            }
            maybe_lazy = false;
        }

        container
    }
}

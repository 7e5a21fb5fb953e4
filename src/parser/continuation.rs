//! §4.4 Container continuation: walk the currently open path top-down,
//! deciding for each node whether the new line continues it.

use crate::nodes::AstNode;
use crate::nodes::NodeValue;
use crate::scanners;

use super::{Parser, CODE_INDENT};

pub(crate) enum Continuation<'a> {
    /// The line didn't close a fenced code block early; here is the last
    /// container that matched, and whether every open container matched.
    Normal {
        last_matched: &'a AstNode<'a>,
        all_matched: bool,
    },
    /// A fenced code block's closing fence matched mid-walk; the block was
    /// finalized immediately and the rest of line processing is skipped.
    ClosedFence { current: &'a AstNode<'a> },
}

impl<'a> Parser<'a> {
    pub(crate) fn check_open_blocks(&mut self) -> Continuation<'a> {
        let mut container = self.root();
        let mut all_matched = true;

        loop {
            let next = match container.last_child() {
                Some(c) if c.data.borrow().open => c,
                _ => break,
            };
            container = next;
            self.find_first_nonspace();

            let matched = {
                let data = container.data.borrow();
                match &data.value {
                    NodeValue::BlockQuote => {
                        let m = self.indent <= 3
                            && self.curline.get(self.first_nonspace) == Some(&b'>');
                        if m {
                            self.advance_offset(self.indent + 1, true);
                            if self.curline.get(self.offset) == Some(&b' ') {
                                self.offset += 1;
                                self.column += 1;
                            }
                        }
                        m
                    }
                    NodeValue::Item(list) => {
                        if self.indent >= list.marker_offset + list.padding {
                            self.advance_offset(list.marker_offset + list.padding, true);
                            true
                        } else if self.blank && container.first_child().is_some() {
                            let adv = self.first_nonspace - self.offset;
                            self.advance_offset(adv, false);
                            true
                        } else {
                            false
                        }
                    }
                    NodeValue::CodeBlock(code) if !code.fenced => {
                        if self.indent >= CODE_INDENT {
                            self.advance_offset(CODE_INDENT, true);
                            true
                        } else if self.blank {
                            let adv = self.first_nonspace - self.offset;
                            self.advance_offset(adv, false);
                            true
                        } else {
                            false
                        }
                    }
                    NodeValue::CodeBlock(code) => {
                        debug_assert!(code.fenced);
                        let closes = self.indent <= 3
                            && self.curline.get(self.first_nonspace) == Some(&code.fence_char)
                            && scanners::close_code_fence(
                                &self.curline,
                                self.first_nonspace,
                                code.fence_char,
                                code.fence_length,
                            )
                            .is_some();

                        if closes {
                            self.advance_offset(self.curline.len() - self.offset, false);
                            drop(data);
                            let current = self.finalize(container);
                            return Continuation::ClosedFence { current };
                        }

                        let mut remaining = code.fence_offset;
                        while remaining > 0 && self.curline.get(self.offset) == Some(&b' ') {
                            self.advance_offset(1, false);
                            remaining -= 1;
                        }
                        true
                    }
                    NodeValue::Heading(_) => false,
                    NodeValue::HtmlBlock(html) => !(matches!(html.block_type, 6 | 7) && self.blank),
                    NodeValue::Paragraph => !self.blank,
                    _ => true,
                }
            };

            if !matched {
                all_matched = false;
                container = container.parent().unwrap_or(container);
                break;
            }
        }

        Continuation::Normal {
            last_matched: container,
            all_matched,
        }
    }
}

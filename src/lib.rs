//! A CommonMark-compatible block-structure parser: turns a byte stream
//! into a tree of block nodes (document, block quotes, lists, code
//! blocks, headings, paragraphs, thematic breaks...) without touching
//! inline grammar or rendering. See [`parser::Parser`] for the entry
//! point and [`inline::InlineCollaborator`] for the seam where a caller
//! plugs in its own inline parser and renderer.

mod arena_tree;
mod ctype;
mod entity;
pub mod inline;
pub mod nodes;
mod parser;
pub mod refmap;
mod scanners;
mod strings;

pub use inline::{InlineCollaborator, NullInlineCollaborator};
pub use nodes::{
    Ast, AstNode, LineColumn, ListDelimType, ListType, NodeCodeBlock, NodeHeading, NodeHtmlBlock,
    NodeList, NodeValue, Sourcepos,
};
pub use parser::{parse_document, parse_file, Options, OptionsBuilder, Parser};
pub use refmap::{RefMap, ResolvedReference};

pub use typed_arena::Arena;

//! Minimal diagnostic front-end: parses a file (or stdin) and prints the
//! resulting block tree as indented S-expressions. Not a renderer -- it
//! exists to make the parser's output inspectable from the command line.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use blocktree::{nodes::NodeValue, AstNode, Options};
use clap::Parser as ClapParser;

#[derive(ClapParser)]
#[command(name = "dump-tree", about = "Dump a CommonMark block tree")]
struct Cli {
    /// Markdown file to parse. Reads stdin if omitted.
    file: Option<PathBuf>,

    /// Replace invalid UTF-8 byte sequences with U+FFFD.
    #[arg(long)]
    validate_utf8: bool,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let buffer = match &cli.file {
        Some(path) => fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let options = Options::builder().validate_utf8(cli.validate_utf8).build();
    let arena = blocktree::Arena::new();
    let root = blocktree::parse_document(&arena, &buffer, options);

    print_node(root, 0);
    Ok(())
}

fn print_node<'a>(node: &'a AstNode<'a>, depth: usize) {
    let data = node.data.borrow();
    println!(
        "{}{} [{}:{}-{}:{}]",
        "  ".repeat(depth),
        describe(&data.value),
        data.sourcepos.start.line,
        data.sourcepos.start.column,
        data.sourcepos.end.line,
        data.sourcepos.end.column,
    );
    drop(data);

    for child in node.children() {
        print_node(child, depth + 1);
    }
}

fn describe(value: &NodeValue) -> String {
    match value {
        NodeValue::Document => "Document".to_string(),
        NodeValue::BlockQuote => "BlockQuote".to_string(),
        NodeValue::List(l) => format!("List({:?}, tight={})", l.list_type, l.tight),
        NodeValue::Item(_) => "Item".to_string(),
        NodeValue::CodeBlock(c) => format!("CodeBlock(fenced={})", c.fenced),
        NodeValue::HtmlBlock(h) => format!("HtmlBlock(type={})", h.block_type),
        NodeValue::Paragraph => "Paragraph".to_string(),
        NodeValue::Heading(h) => format!("Heading(level={}, setext={})", h.level, h.setext),
        NodeValue::ThematicBreak => "ThematicBreak".to_string(),
    }
}

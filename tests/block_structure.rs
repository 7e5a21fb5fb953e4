//! Integration tests covering the concrete scenarios and a sample of the
//! universal invariants from the block-structure specification.

use blocktree::{parse_document, Arena, ListType, NodeValue, Options};
use pretty_assertions::assert_eq;

fn parse(input: &str) -> String {
    let arena = Arena::new();
    let root = parse_document(&arena, input.as_bytes(), Options::builder().build());
    let mut out = String::new();
    dump(root, 0, &mut out);
    out
}

fn dump<'a>(node: &'a blocktree::AstNode<'a>, depth: usize, out: &mut String) {
    let data = node.data.borrow();
    out.push_str(&"  ".repeat(depth));
    match &data.value {
        NodeValue::Document => out.push_str("Document\n"),
        NodeValue::BlockQuote => out.push_str("BlockQuote\n"),
        NodeValue::List(l) => out.push_str(&format!("List(tight={})\n", l.tight)),
        NodeValue::Item(_) => out.push_str("Item\n"),
        NodeValue::Paragraph => out.push_str(&format!("Paragraph({:?})\n", text(&data.content))),
        NodeValue::Heading(h) => out.push_str(&format!(
            "Heading(level={}, setext={}, {:?})\n",
            h.level,
            h.setext,
            text(&data.content)
        )),
        NodeValue::CodeBlock(c) => out.push_str(&format!(
            "CodeBlock(fenced={}, info={:?}, literal={:?})\n",
            c.fenced,
            text(&c.info),
            text(&c.literal)
        )),
        NodeValue::HtmlBlock(h) => {
            out.push_str(&format!("HtmlBlock(type={}, {:?})\n", h.block_type, text(&h.literal)))
        }
        NodeValue::ThematicBreak => out.push_str("ThematicBreak\n"),
    }
    drop(data);
    for child in node.children() {
        dump(child, depth + 1, out);
    }
}

fn text(bytes: &[u8]) -> &str {
    std::str::from_utf8(bytes).unwrap()
}

#[test]
fn blockquote_continues_without_marker_is_not_lazy_here() {
    assert_eq!(
        parse("> a\n> b\n"),
        "Document\n  BlockQuote\n    Paragraph(\"a\\nb\\n\")\n"
    );
}

#[test]
fn blockquote_lazy_continuation() {
    assert_eq!(
        parse("> a\nb\n"),
        "Document\n  BlockQuote\n    Paragraph(\"a\\nb\\n\")\n"
    );
}

#[test]
fn loose_list_from_blank_separated_items() {
    assert_eq!(
        parse("- a\n\n- b\n"),
        concat!(
            "Document\n",
            "  List(tight=false)\n",
            "    Item\n",
            "      Paragraph(\"a\\n\")\n",
            "    Item\n",
            "      Paragraph(\"b\\n\")\n",
        )
    );
}

#[test]
fn tight_list_without_blank_separators() {
    assert_eq!(
        parse("- a\n- b\n"),
        concat!(
            "Document\n",
            "  List(tight=true)\n",
            "    Item\n",
            "      Paragraph(\"a\\n\")\n",
            "    Item\n",
            "      Paragraph(\"b\\n\")\n",
        )
    );
}

#[test]
fn fenced_code_block_captures_info_string() {
    assert_eq!(
        parse("```go\nx\n```\n"),
        "Document\n  CodeBlock(fenced=true, info=\"go\", literal=\"x\\n\")\n"
    );
}

#[test]
fn indented_code_block_has_no_info_string() {
    assert_eq!(
        parse("    x\n    y\n"),
        "Document\n  CodeBlock(fenced=false, info=\"\", literal=\"x\\ny\\n\")\n"
    );
}

#[test]
fn setext_heading_promotes_paragraph() {
    assert_eq!(
        parse("Foo\n===\n"),
        "Document\n  Heading(level=1, setext=true, \"Foo\\n\")\n"
    );
}

#[test]
fn atx_heading_strips_trailing_hash_run() {
    assert_eq!(
        parse("# Head ##\n"),
        "Document\n  Heading(level=1, setext=false, \"Head\")\n"
    );
}

#[test]
fn reference_definition_is_extracted_and_paragraph_survives() {
    let arena = Arena::new();
    let root = parse_document(
        &arena,
        b"[a]: /u \"t\"\n\nsee [a]\n",
        Options::builder().build(),
    );

    let mut out = String::new();
    dump(root, 0, &mut out);
    assert_eq!(out, "Document\n  Paragraph(\"see [a]\\n\")\n");
}

#[test]
fn double_blank_line_breaks_out_of_list() {
    assert_eq!(
        parse("- a\n\n\n- b\n"),
        concat!(
            "Document\n",
            "  List(tight=false)\n",
            "    Item\n",
            "      Paragraph(\"a\\n\")\n",
            "  List(tight=true)\n",
            "    Item\n",
            "      Paragraph(\"b\\n\")\n",
        )
    );
}

#[test]
fn tab_expansion_matches_space_equivalent() {
    // A tab after 1 char of indent expands to the next 4-column stop,
    // equivalent to 3 spaces -- both land as an indented code block here
    // only once 4 effective columns of indent are reached.
    assert_eq!(parse("\tx\n"), "Document\n  CodeBlock(fenced=false, info=\"\", literal=\"x\\n\")\n");
    assert_eq!(
        parse("    x\n"),
        "Document\n  CodeBlock(fenced=false, info=\"\", literal=\"x\\n\")\n"
    );
}

#[test]
fn feeding_in_arbitrary_chunks_matches_single_shot() {
    let whole = "# Title\n\nSome *text* here.\n\n- one\n- two\n";

    let arena_a = Arena::new();
    let mut out_a = String::new();
    dump(
        parse_document(&arena_a, whole.as_bytes(), Options::builder().build()),
        0,
        &mut out_a,
    );

    let arena_b = Arena::new();
    let mut parser = blocktree::Parser::new(&arena_b, Options::builder().build());
    for chunk in whole.as_bytes().chunks(3) {
        parser.feed(chunk);
    }
    let root_b = parser.finish();
    let mut out_b = String::new();
    dump(root_b, 0, &mut out_b);

    assert_eq!(out_a, out_b);
}

#[test]
fn sourcepos_end_never_precedes_start() {
    let arena = Arena::new();
    let root = parse_document(
        &arena,
        b"# Head\n\n> quoted\n> text\n\n- item one\n- item two\n",
        Options::builder().build(),
    );

    fn check<'a>(node: &'a blocktree::AstNode<'a>) {
        let data = node.data.borrow();
        assert!(
            data.sourcepos.end.line >= data.sourcepos.start.line,
            "node ended before it started: {:?}",
            data.sourcepos
        );
        drop(data);
        for child in node.children() {
            check(child);
        }
    }
    check(root);
}

#[test]
fn html_block_type_1_runs_to_matching_close_tag() {
    assert_eq!(
        parse("<pre>\n**foo**\n</pre>\n"),
        "Document\n  HtmlBlock(type=1, \"<pre>\\n**foo**\\n</pre>\\n\")\n"
    );
}

#[test]
fn html_block_type_2_is_a_comment() {
    assert_eq!(
        parse("<!-- comment\nmore -->\n"),
        "Document\n  HtmlBlock(type=2, \"<!-- comment\\nmore -->\\n\")\n"
    );
}

#[test]
fn html_block_type_3_is_a_processing_instruction() {
    assert_eq!(
        parse("<?php\necho 1;\n?>\n"),
        "Document\n  HtmlBlock(type=3, \"<?php\\necho 1;\\n?>\\n\")\n"
    );
}

#[test]
fn html_block_type_4_is_a_declaration() {
    assert_eq!(
        parse("<!DOCTYPE html>\n"),
        "Document\n  HtmlBlock(type=4, \"<!DOCTYPE html>\\n\")\n"
    );
}

#[test]
fn html_block_type_5_is_cdata() {
    assert_eq!(
        parse("<![CDATA[\nfoo\n]]>\n"),
        "Document\n  HtmlBlock(type=5, \"<![CDATA[\\nfoo\\n]]>\\n\")\n"
    );
}

#[test]
fn html_block_type_6_closes_on_blank_line() {
    assert_eq!(
        parse("<div>\nfoo\n\nbar\n"),
        concat!(
            "Document\n",
            "  HtmlBlock(type=6, \"<div>\\nfoo\\n\")\n",
            "  Paragraph(\"bar\\n\")\n",
        )
    );
}

#[test]
fn html_block_type_7_is_a_bare_tag_closing_on_blank_line() {
    assert_eq!(
        parse("<x-custom>\nfoo\n\nbar\n"),
        concat!(
            "Document\n",
            "  HtmlBlock(type=7, \"<x-custom>\\nfoo\\n\")\n",
            "  Paragraph(\"bar\\n\")\n",
        )
    );
}

#[test]
fn html_block_type_7_does_not_interrupt_a_paragraph() {
    // "foo" opens a paragraph; an otherwise-valid type-7 tag line that
    // follows it is just more paragraph text, per the type-7 restriction.
    assert_eq!(
        parse("foo\n<x-custom>\n"),
        "Document\n  Paragraph(\"foo\\n<x-custom>\\n\")\n"
    );
}

#[test]
fn indented_line_matching_a_list_marker_without_a_list_is_code() {
    assert_eq!(
        parse("    - a\n"),
        "Document\n  CodeBlock(fenced=false, info=\"\", literal=\"- a\\n\")\n"
    );
}

#[test]
fn ordered_list_start_number_is_preserved() {
    let arena = Arena::new();
    let root = parse_document(&arena, b"2. Hello.\n3. Hi.\n", Options::builder().build());
    let list = root.first_child().unwrap();
    match &list.data.borrow().value {
        NodeValue::List(l) => {
            assert_eq!(l.list_type, ListType::Ordered);
            assert_eq!(l.start, 2);
        }
        other => panic!("expected a list, got {:?}", other),
    }
}

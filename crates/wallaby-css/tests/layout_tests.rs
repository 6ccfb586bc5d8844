//! Integration tests for the layout engine and paint output.
//!
//! All measurements use `ApproximateFontMetrics`, so with the default 16px
//! (12pt) font: a character advances 7.2px, ascent is 9.6px, descent is
//! 2.4px, and a line is 1.25 * 12 = 15px tall.

use wallaby_css::{
    ApproximateFontMetrics, BoxKind, FontCache, H_STEP, INPUT_WIDTH_PX, LayoutTree, PaintCommand,
    SheetParser, V_STEP, cascade_priority, paint, style,
};
use wallaby_dom::DomTree;
use wallaby_html::MarkupParser;

fn render(markup: &str, sheet: &str, width: f32) -> (DomTree, LayoutTree, Vec<PaintCommand>) {
    let mut tree = MarkupParser::new(markup).parse();
    let mut rules = SheetParser::new(sheet).parse_rules();
    rules.sort_by_key(cascade_priority);
    style(&mut tree, &rules);
    let metrics = ApproximateFontMetrics;
    let mut fonts = FontCache::new(&metrics);
    let layout = LayoutTree::layout(&tree, width, &mut fonts);
    let commands = paint(&layout, &tree);
    (tree, layout, commands)
}

fn texts(commands: &[PaintCommand]) -> Vec<&str> {
    commands
        .iter()
        .filter_map(|c| match c {
            PaintCommand::DrawText { text, .. } => Some(text.as_str()),
            PaintCommand::DrawRect { .. } => None,
        })
        .collect()
}

#[test]
fn document_reserves_fixed_margins() {
    let (_, layout, commands) = render("<p>hi</p>", "", 800.0);
    let doc = layout.get(layout.root());
    assert_eq!(doc.x, H_STEP);
    assert_eq!(doc.y, V_STEP);
    assert_eq!(doc.width, 800.0 - 2.0 * H_STEP);
    // One 15px line plus the two vertical margins.
    assert_eq!(doc.height, 15.0 + 2.0 * V_STEP);

    // The word starts at the left margin, 2.4px below the line top
    // (baseline alignment with a uniform font).
    match &commands[0] {
        PaintCommand::DrawText { rect, text, .. } => {
            assert_eq!(text, "hi");
            assert_eq!(rect.x, H_STEP);
            assert_eq!(rect.y, V_STEP + 2.4);
            assert_eq!(rect.width, 2.0 * 7.2);
        }
        PaintCommand::DrawRect { .. } => panic!("expected text command"),
    }
}

#[test]
fn words_wrap_when_the_next_word_would_overflow() {
    // Inline width is 74px: "hello" (36px) fits, the space plus "world"
    // (36px more from x=56.2) does not.
    let (_, layout, commands) = render("<p>hello world</p>", "", 100.0);
    assert_eq!(texts(&commands), vec!["hello", "world"]);

    let words: Vec<_> = layout
        .iter()
        .filter(|(_, b)| matches!(b.kind, BoxKind::Word { .. }))
        .collect();
    assert_eq!(words.len(), 2);
    // Both words start at the left edge of their own line.
    assert_eq!(words[0].1.x, words[1].1.x);
    assert_eq!(words[1].1.y, words[0].1.y + 15.0);
}

#[test]
fn oversized_word_occupies_its_own_line_without_looping() {
    // Inline width is 14px, far narrower than the 36px word.
    let (_, layout, commands) = render("<p>hello</p>", "", 40.0);
    assert_eq!(texts(&commands), vec!["hello"]);
    let (_, word) = layout
        .iter()
        .find(|(_, b)| matches!(b.kind, BoxKind::Word { .. }))
        .unwrap();
    // It overflows the available width but still lays out.
    assert_eq!(word.width, 36.0);
    assert_eq!(word.x, H_STEP);
}

#[test]
fn empty_lines_take_no_vertical_space() {
    // The trailing <br> opens a line that never receives a word.
    let (_, layout, _) = render("<p>x<br></p>", "", 800.0);
    let empty_lines: Vec<_> = layout
        .iter()
        .filter(|(_, b)| b.kind == BoxKind::Line && b.children.is_empty())
        .collect();
    assert_eq!(empty_lines.len(), 1);
    assert_eq!(empty_lines[0].1.height, 0.0);
    // The inline box's height is the one real line only.
    let (_, inline) = layout
        .iter()
        .find(|(_, b)| b.kind == BoxKind::Inline)
        .unwrap();
    assert_eq!(inline.height, 15.0);
}

#[test]
fn childless_elements_still_reserve_block_space() {
    // An empty <p> is block mode with zero height; layout must not panic
    // and the following paragraph starts where the empty one ended.
    let (_, layout, commands) = render("<p></p><p>x</p>", "", 800.0);
    assert_eq!(texts(&commands), vec!["x"]);
    let empty_block = layout
        .iter()
        .find(|(_, b)| b.kind == BoxKind::Block && b.children.is_empty());
    assert!(empty_block.is_some());
    assert_eq!(empty_block.unwrap().1.height, 0.0);
}

#[test]
fn br_forces_a_line_break() {
    let (_, _, commands) = render("<p>a<br>b</p>", "", 800.0);
    let positions: Vec<(f32, f32)> = commands
        .iter()
        .filter_map(|c| match c {
            PaintCommand::DrawText { rect, .. } => Some((rect.x, rect.y)),
            PaintCommand::DrawRect { .. } => None,
        })
        .collect();
    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0].0, positions[1].0);
    assert_eq!(positions[1].1, positions[0].1 + 15.0);
}

#[test]
fn blocks_stack_and_heights_sum() {
    let (_, layout, _) = render("<p>one</p><p>two</p>", "", 800.0);
    let blocks: Vec<_> = layout
        .iter()
        .filter(|(_, b)| b.kind == BoxKind::Inline)
        .collect();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1].1.y, blocks[0].1.y + blocks[0].1.height);
    let doc = layout.get(layout.root());
    assert_eq!(doc.height, 30.0 + 2.0 * V_STEP);
}

#[test]
fn larger_font_words_set_the_shared_baseline() {
    // 32px resolves to a 24pt font: ascent 19.2, descent 4.8.
    let (_, _, commands) = render(
        "<p>big <span>small</span></p>",
        "p { font-size: 32px; } span { font-size: 16px; }",
        800.0,
    );
    let mut found = (None, None);
    for c in &commands {
        if let PaintCommand::DrawText { rect, text, .. } = c {
            if text == "big" {
                found.0 = Some(rect.y);
            }
            if text == "small" {
                found.1 = Some(rect.y);
            }
        }
    }
    let (big_y, small_y) = (found.0.unwrap(), found.1.unwrap());
    // baseline = line_y + 1.25 * max_ascent = 18 + 24; each word sits at
    // baseline - its own ascent.
    assert_eq!(big_y, V_STEP + 1.25 * 19.2 - 19.2);
    assert_eq!(small_y, V_STEP + 1.25 * 19.2 - 9.6);
    assert!(small_y > big_y);
}

#[test]
fn input_widget_paints_rect_then_text() {
    let (_, _, commands) = render(r#"<input value="hi">"#, "", 800.0);
    let rect_pos = commands
        .iter()
        .position(|c| matches!(c, PaintCommand::DrawRect { .. }))
        .unwrap();
    let text_pos = commands
        .iter()
        .position(|c| matches!(c, PaintCommand::DrawText { text, .. } if text == "hi"))
        .unwrap();
    assert!(rect_pos < text_pos, "background paints before the text");
    if let PaintCommand::DrawRect { rect, .. } = &commands[rect_pos] {
        assert_eq!(rect.width, INPUT_WIDTH_PX);
    }
}

#[test]
fn button_text_comes_from_its_first_text_child() {
    let (_, _, commands) = render("<p>press <button>go</button> now</p>", "", 800.0);
    assert!(texts(&commands).contains(&"go"));
}

#[test]
fn block_background_paints_before_descendant_text() {
    let (_, _, commands) = render(
        "<div><p>x</p></div>",
        "div { background-color: gray; }",
        800.0,
    );
    match &commands[0] {
        PaintCommand::DrawRect { color, rect } => {
            assert_eq!(color, "gray");
            assert_eq!(rect.height, 15.0);
        }
        PaintCommand::DrawText { .. } => panic!("background must paint first"),
    }
    assert_eq!(texts(&commands), vec!["x"]);
}

#[test]
fn commands_expose_vertical_extents() {
    let (_, _, commands) = render("<p>one</p><p>two</p>", "", 800.0);
    for c in &commands {
        assert!(c.bottom() > c.top());
    }
    // The second paragraph's word sits one full line below the first.
    assert_eq!(commands[1].top(), commands[0].top() + 15.0);
}

#[test]
fn font_cache_is_reusable_across_layout_runs() {
    let mut tree = MarkupParser::new("<p>hello</p>").parse();
    style(&mut tree, &[]);
    let metrics = ApproximateFontMetrics;
    let mut fonts = FontCache::new(&metrics);
    let first = LayoutTree::layout(&tree, 800.0, &mut fonts);
    let grown = fonts.len();
    assert!(grown > 0);
    let second = LayoutTree::layout(&tree, 800.0, &mut fonts);
    // Same fonts, no new entries, identical geometry.
    assert_eq!(fonts.len(), grown);
    assert_eq!(
        first.get(first.root()).height,
        second.get(second.root()).height
    );
}

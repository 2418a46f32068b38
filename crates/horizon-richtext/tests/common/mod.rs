//! Shared fixtures for the integration tests.

use horizon_richtext::{Alignment, ClipboardPayload, Color, RichTextEditor, Selection, StyledDocument};

pub type Operation = fn(&mut RichTextEditor) -> horizon_richtext::Result<bool>;

pub fn op(name: &'static str, f: Operation) -> (&'static str, Operation) {
    (name, f)
}

pub fn operations() -> Vec<(&'static str, Operation)> {
    vec![
        op("toggle_bold", |e| e.toggle_bold()),
        op("toggle_italic", |e| e.toggle_italic()),
        op("toggle_underline", |e| e.toggle_underline()),
        op("set_font_name", |e| e.set_font_name(Some("Courier"))),
        op("set_font_size", |e| e.set_font_size(30.0)),
        op("increase_font_size", |e| e.increase_font_size()),
        op("decrease_font_size", |e| e.decrease_font_size()),
        op("set_text_color", |e| e.set_text_color(Some(Color::GREEN))),
        op("set_highlight_color", |e| e.set_highlight_color(Some(Color::YELLOW))),
        op("set_alignment", |e| e.set_alignment(Alignment::Right)),
        op("increase_indent", |e| e.increase_indent()),
        op("decrease_indent", |e| e.decrease_indent()),
        op("toggle_bullet", |e| e.toggle_bullet()),
        op("toggle_first_line_indent", |e| e.toggle_first_line_indent()),
        op("insert_text", |e| e.insert_text("xyz")),
        op("insert_tab", |e| e.insert_text("\t")),
        op("insert_newline", |e| e.insert_text("\n")),
        op("insert_page_break", |e| e.insert_page_break("\u{c}")),
        op("delete_backward", |e| e.delete_backward()),
        op("delete_forward", |e| e.delete_forward()),
        op("replace_range", |e| e.replace_range(0..2, "J")),
        op("cut", |e| e.cut().map(|payload| payload.is_some())),
        op("paste_plain", |e| e.paste(&ClipboardPayload::plain("pasted"))),
        op("paste_rich", |e| {
            let payload = ClipboardPayload::rich(
                "a\nb",
                horizon_richtext::PASTEBOARD_DATA_TYPE,
                "<p style=\"text-align:right;\"><b>a</b><br/></p><ul><li style=\"margin-left:15px;\">b</li></ul>",
            );
            e.paste(&payload)
        }),
        op("set_html", |e| e.set_html("<p><u>replaced</u></p>")),
    ]
}

/// "Hello World\nSecond line" with a bold word and an indented second
/// paragraph, selecting across the paragraph break.
pub fn fixture() -> RichTextEditor {
    let mut editor = RichTextEditor::new().with_document(StyledDocument::from_text("Hello World\nSecond line"));
    editor.set_selection(Selection::new(0, 5)).unwrap();
    editor.toggle_bold().unwrap();
    editor.set_selection(Selection::new(14, 16)).unwrap();
    editor.increase_indent().unwrap();
    editor.clear_undo_history();
    editor.set_selection(Selection::new(3, 15)).unwrap();
    editor
}

//! End-to-end editing scenarios.

use horizon_richtext::{
    AttributeSet, CharFormat, ClipboardPayload, Color, ColorState, EditorConfig, HTML_DATA_TYPE, HtmlCodec,
    RichTextEditor, Selection, StyledDocument,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn editor_with(text: &str) -> RichTextEditor {
    RichTextEditor::new().with_document(StyledDocument::from_text(text))
}

#[test]
fn test_bold_toggle_on_hello_world() {
    init_tracing();
    let mut editor = editor_with("Hello World");
    let original = editor.document().clone();
    editor.select_all().unwrap();

    editor.toggle_bold().unwrap();
    assert_eq!(editor.document().runs().len(), 1);
    assert!(editor.document().runs()[0].attributes.char_format.bold);
    assert!(editor.style_summary().is_bold);

    editor.toggle_bold().unwrap();
    assert_eq!(editor.document(), &original);
    assert!(!editor.style_summary().is_bold);
}

#[test]
fn test_mixed_selection_anchors_on_first_run() {
    let mut doc = StyledDocument::new();
    doc.append("He", AttributeSet::default());
    doc.append("llo", AttributeSet::with_char(CharFormat::new().with_bold(true)));
    let mut editor = RichTextEditor::new().with_document(doc);
    editor.set_selection(Selection::new(0, 5)).unwrap();
    assert!(!editor.style_summary().is_bold);

    editor.toggle_bold().unwrap();
    let runs = editor.document().runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].range, 0..5);
    assert!(runs[0].attributes.char_format.bold);
}

#[test]
fn test_bold_red_export() {
    let mut editor = editor_with("Hi");
    editor.select_all().unwrap();
    editor.toggle_bold().unwrap();
    editor.set_text_color(Some(Color::RED)).unwrap();

    let html = editor.html();
    assert_eq!(html, "<p><span style=\"color:red;\"><b>Hi</b></span></p>");

    let imported = HtmlCodec::new().import(&html);
    assert_eq!(imported.runs().len(), 1);
    assert_eq!(&imported, editor.document());
}

#[test]
fn test_font_size_bounds() {
    let mut editor = editor_with("abc");
    editor.select_all().unwrap();
    for _ in 0..20 {
        editor.increase_font_size().unwrap();
    }
    assert_eq!(editor.document().format_at(0).font_size, Some(128.0));
    for _ in 0..20 {
        editor.decrease_font_size().unwrap();
    }
    assert_eq!(editor.document().format_at(0).font_size, Some(10.0));

    editor.change_font_size_by(-500.0, 10.0, 128.0).unwrap();
    assert_eq!(editor.document().format_at(0).font_size, Some(10.0));
}

#[test]
fn test_decrease_indent_stops_at_zero() {
    let mut editor = editor_with("para");
    editor.select_all().unwrap();
    editor.increase_indent().unwrap();
    editor.increase_indent().unwrap();
    for _ in 0..4 {
        editor.decrease_indent().unwrap();
    }
    assert_eq!(editor.document().block_format_at(0).indent, 0.0);
}

#[test]
fn test_selection_summary_notifications() {
    let mut editor = editor_with("red blue");
    let seen = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = seen.clone();
    editor
        .selection_changed
        .connect(move |(selection, summary)| sink.lock().push((*selection, summary.text_color)));

    editor.set_selection(Selection::new(0, 3)).unwrap();
    editor.set_text_color(Some(Color::RED)).unwrap();
    editor.set_selection(Selection::new(0, 8)).unwrap();

    let seen = seen.lock();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0], (Selection::new(0, 3), ColorState::Uniform(None)));
    assert_eq!(seen[1], (Selection::new(0, 3), ColorState::Uniform(Some(Color::RED))));
    assert_eq!(seen[2], (Selection::new(0, 8), ColorState::Mixed));
}

#[test]
fn test_typing_with_bullets() {
    let mut editor = RichTextEditor::new();
    editor.toggle_bullet().unwrap();
    for text in ["o", "n", "e", "\n", "t", "w", "o"] {
        editor.insert_text(text).unwrap();
    }
    let doc = editor.document();
    assert_eq!(doc.text(), "one\ntwo");
    assert!(doc.block_format_at(0).list_item);
    assert!(doc.block_format_at(1).list_item);
    assert_eq!(
        editor.html(),
        "<ul><li style=\"margin-left:15px;\">one<br/></li><li style=\"margin-left:15px;\">two</li></ul>"
    );
    assert!(doc.check_invariants().is_ok());
}

#[test]
fn test_restricted_paste_from_another_editor() {
    let mut source = editor_with("styled");
    source.select_all().unwrap();
    source.toggle_italic().unwrap();
    let payload = source.copy().unwrap();

    let mut target = RichTextEditor::with_config(EditorConfig::new()).unwrap();
    target.paste(&payload).unwrap();
    assert_eq!(target.text(), "styled");
    assert!(target.document().format_at(0).italic);
}

#[test]
fn test_foreign_html_paste_follows_restriction() {
    let payload = ClipboardPayload::rich("web", HTML_DATA_TYPE, "<p><b>web</b></p>");

    let mut restricted = RichTextEditor::new();
    restricted.paste(&payload).unwrap();
    assert_eq!(restricted.text(), "web");
    assert!(!restricted.document().format_at(0).bold);

    let config = EditorConfig::new().with_rich_paste_restricted(false);
    let mut open = RichTextEditor::with_config(config).unwrap();
    open.paste(&payload).unwrap();
    assert_eq!(open.text(), "web");
    assert!(open.document().format_at(0).bold);
}

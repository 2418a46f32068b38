//! HTML parsing into a [`StyledDocument`].
//!
//! Recognized elements: `b`/`strong`, `i`/`em`, `u`, `span`, `p`/`div`,
//! `ul`, `li` and `br`. Other elements are stripped and contribute no
//! styling, but their text is kept. Input whose tags do not balance is
//! rejected with a [`ParseError`].

use crate::document::StyledDocument;
use crate::error::ParseError;
use crate::format::{AttributeSet, BlockFormat, CharFormat};

use super::css::{InlineStyle, parse_inline_style};

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "br", "img", "hr", "meta", "link", "input", "wbr", "area", "base", "col", "embed", "source",
    "track", "param",
];

/// Elements whose content is not visible text.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "title", "head"];

/// A lexical unit of the input.
#[derive(Debug, Clone, PartialEq)]
enum Markup<'a> {
    Text(&'a str),
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close(String),
    /// Comments, doctype and processing instructions.
    Ignored,
}

/// One open element.
#[derive(Debug, Clone)]
struct Frame {
    name: String,
    offset: usize,
    format: CharFormat,
    block: Option<BlockFormat>,
    hidden: bool,
}

struct HtmlImporter {
    doc: StyledDocument,
    stack: Vec<Frame>,
    last_attrs: AttributeSet,
    ends_with_newline: bool,
    after_block: bool,
}

impl HtmlImporter {
    fn new() -> Self {
        Self {
            doc: StyledDocument::new(),
            stack: Vec::new(),
            last_attrs: AttributeSet::default(),
            ends_with_newline: false,
            after_block: false,
        }
    }

    fn current_format(&self) -> CharFormat {
        self.stack
            .last()
            .map(|f| f.format.clone())
            .unwrap_or_default()
    }

    fn current_block(&self) -> BlockFormat {
        self.stack
            .iter()
            .rev()
            .find_map(|f| f.block.clone())
            .unwrap_or_default()
    }

    fn current_attributes(&self) -> AttributeSet {
        AttributeSet::new(self.current_format(), self.current_block())
    }

    fn in_block(&self) -> bool {
        self.stack.iter().any(|f| f.block.is_some())
    }

    fn in_list(&self) -> bool {
        self.stack.iter().any(|f| f.name == "ul")
    }

    fn hidden(&self) -> bool {
        self.stack.iter().any(|f| f.hidden)
    }

    fn append(&mut self, text: &str, attrs: AttributeSet) {
        if text.is_empty() {
            return;
        }
        self.doc.append(text, attrs.clone());
        self.ends_with_newline = text.ends_with('\n');
        self.last_attrs = attrs;
        self.after_block = false;
    }

    /// Start a new paragraph unless the output already ends with one.
    fn ensure_break(&mut self) {
        if !self.doc.is_empty() && !self.ends_with_newline {
            let attrs = self.last_attrs.clone();
            self.append("\n", attrs);
        }
        self.after_block = false;
    }

    fn handle_text(&mut self, raw: &str) {
        if self.hidden() || raw.is_empty() {
            return;
        }

        let blank = raw.bytes().all(|b| b.is_ascii_whitespace());
        if blank && !self.in_block() && (self.doc.is_empty() || self.after_block || self.in_list()) {
            return;
        }

        let collapsed: String = raw
            .chars()
            .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
            .collect();
        let decoded = decode_entities(&collapsed);
        if decoded.is_empty() {
            return;
        }

        if self.after_block {
            self.ensure_break();
        }
        let attrs = self.current_attributes();
        self.append(&decoded, attrs);
    }

    fn handle_open(&mut self, name: &str, attrs: &[(String, String)], self_closing: bool, offset: usize) {
        if name == "br" {
            if !self.hidden() {
                if self.after_block {
                    self.ensure_break();
                }
                let attrs = self.current_attributes();
                self.append("\n", attrs);
            }
            return;
        }
        if self_closing || VOID_ELEMENTS.contains(&name) {
            return;
        }

        let style = attrs
            .iter()
            .find(|(key, _)| key == "style")
            .map(|(_, value)| parse_inline_style(value))
            .unwrap_or_default();

        let mut format = self.current_format();
        let mut block = None;
        let mut hidden = false;

        match name {
            "b" | "strong" => format.bold = true,
            "i" | "em" => format.italic = true,
            "u" | "ins" => format.underline = true,
            "span" => apply_char_style(&mut format, &style),
            "p" | "div" | "li" => {
                if !self.hidden() {
                    self.ensure_break();
                }
                apply_char_style(&mut format, &style);
                let mut para = self.current_block();
                apply_block_style(&mut para, &style);
                if name == "li" {
                    para.list_item = true;
                }
                block = Some(para);
            }
            "ul" => {
                if !self.hidden() {
                    self.ensure_break();
                }
            }
            _ if HIDDEN_ELEMENTS.contains(&name) => hidden = true,
            _ => {}
        }

        self.stack.push(Frame {
            name: name.to_string(),
            offset,
            format,
            block,
            hidden,
        });
    }

    fn handle_close(&mut self, name: &str, offset: usize) -> Result<(), ParseError> {
        if VOID_ELEMENTS.contains(&name) {
            return Ok(());
        }
        match self.stack.last() {
            Some(frame) if frame.name == name => {
                let ends_block = frame.block.is_some() || frame.name == "ul";
                self.stack.pop();
                if ends_block {
                    self.after_block = true;
                }
                Ok(())
            }
            Some(frame) => Err(ParseError::new(
                format!("mismatched closing tag </{}>, expected </{}>", name, frame.name),
                offset,
            )),
            None => Err(ParseError::new(
                format!("unexpected closing tag </{}>", name),
                offset,
            )),
        }
    }

    fn finish(mut self) -> Result<StyledDocument, ParseError> {
        if let Some(frame) = self.stack.last() {
            return Err(ParseError::new(
                format!("unclosed tag <{}>", frame.name),
                frame.offset,
            ));
        }
        let len = self.doc.len();
        self.doc.normalize_paragraphs(0..len);
        Ok(self.doc)
    }
}

fn apply_char_style(format: &mut CharFormat, style: &InlineStyle) {
    if let Some(color) = style.color {
        format.foreground_color = Some(color);
    }
    if let Some(color) = style.background_color {
        format.background_color = Some(color);
    }
    if let Some(family) = &style.font_family {
        format.font_family = Some(family.clone());
    }
    if let Some(size) = style.font_size {
        format.font_size = Some(size);
    }
}

fn apply_block_style(block: &mut BlockFormat, style: &InlineStyle) {
    if let Some(alignment) = style.text_align {
        block.alignment = alignment;
    }
    if let Some(indent) = style.margin_left {
        block.indent = indent.max(0.0);
    }
    if let Some(indent) = style.text_indent {
        block.first_line_indent = indent > 0.0;
    }
}

/// Parse HTML, failing on markup that does not balance.
pub(crate) fn import_document(html: &str) -> Result<StyledDocument, ParseError> {
    let mut importer = HtmlImporter::new();
    for (offset, markup) in tokenize(html)? {
        match markup {
            Markup::Text(text) => importer.handle_text(text),
            Markup::Open {
                name,
                attrs,
                self_closing,
            } => importer.handle_open(&name, &attrs, self_closing, offset),
            Markup::Close(name) => importer.handle_close(&name, offset)?,
            Markup::Ignored => {}
        }
    }
    importer.finish()
}

/// Extract the visible text of arbitrary, possibly malformed, HTML.
pub(crate) fn visible_text(html: &str) -> String {
    let mut out = String::new();
    let mut pos = 0;
    let mut trailing_break = false;

    while pos < html.len() {
        let rest = &html[pos..];
        if let Some(after) = rest.strip_prefix("<!--") {
            match after.find("-->") {
                Some(end) => pos += 4 + end + 3,
                None => break,
            }
            continue;
        }
        if rest.starts_with('<') {
            let Some(end) = find_tag_end(html, pos + 1) else {
                out.push_str(&decode_entities(rest));
                trailing_break = false;
                break;
            };
            let content = html[pos + 1..end].trim();
            let closing = content.starts_with('/');
            let name = tag_name(content.trim_start_matches('/'));
            if name == "br" {
                out.push('\n');
                trailing_break = false;
            } else if closing
                && matches!(name.as_str(), "p" | "div" | "li" | "ul")
                && !out.is_empty()
                && !out.ends_with('\n')
            {
                out.push('\n');
                trailing_break = true;
            }
            pos = end + 1;
        } else {
            let end = rest.find('<').map_or(html.len(), |i| pos + i);
            let text = decode_entities(&html[pos..end]);
            if !text.is_empty() {
                trailing_break = false;
            }
            out.push_str(&text);
            pos = end;
        }
    }

    if trailing_break {
        out.pop();
    }
    out
}

fn tokenize(html: &str) -> Result<Vec<(usize, Markup<'_>)>, ParseError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < html.len() {
        let rest = &html[pos..];
        if let Some(after) = rest.strip_prefix("<!--") {
            let end = after
                .find("-->")
                .ok_or_else(|| ParseError::new("unterminated comment", pos))?;
            tokens.push((pos, Markup::Ignored));
            pos += 4 + end + 3;
        } else if rest.starts_with('<') {
            let end = find_tag_end(html, pos + 1)
                .ok_or_else(|| ParseError::new("unterminated tag", pos))?;
            tokens.push((pos, parse_tag(&html[pos + 1..end], pos)?));
            pos = end + 1;
        } else {
            let end = rest.find('<').map_or(html.len(), |i| pos + i);
            tokens.push((pos, Markup::Text(&html[pos..end])));
            pos = end;
        }
    }

    Ok(tokens)
}

/// Find the `>` closing a tag, skipping quoted attribute values.
fn find_tag_end(html: &str, from: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in html[from..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(from + i),
            (None, '<') => return None,
            _ => {}
        }
    }
    None
}

fn tag_name(content: &str) -> String {
    content
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn parse_tag(content: &str, offset: usize) -> Result<Markup<'_>, ParseError> {
    let content = content.trim();
    if content.starts_with('!') || content.starts_with('?') {
        return Ok(Markup::Ignored);
    }

    let self_closing = content.ends_with('/');
    let content = content.trim_end_matches('/').trim();
    let closing = content.starts_with('/');
    let content = content.trim_start_matches('/').trim();

    let (name, attrs_str) = match content.find(|c: char| c.is_whitespace()) {
        Some(idx) => (&content[..idx], content[idx..].trim()),
        None => (content, ""),
    };
    if !name.starts_with(|c: char| c.is_ascii_alphabetic())
        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ParseError::new(format!("invalid tag name '{}'", name), offset));
    }
    let name = name.to_ascii_lowercase();

    if closing {
        Ok(Markup::Close(name))
    } else {
        Ok(Markup::Open {
            name,
            attrs: parse_attributes(attrs_str),
            self_closing,
        })
    }
}

/// Parse attributes from a string, respecting quoted values.
///
/// Handles attributes like: `style="color:red;" class=intro hidden`
fn parse_attributes(attrs_str: &str) -> Vec<(String, String)> {
    let mut result = Vec::new();
    let mut chars = attrs_str.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c.is_whitespace() {
                break;
            }
            key.push(c);
            chars.next();
        }

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        let mut value = String::new();
        if chars.peek() == Some(&'=') {
            chars.next();
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            match chars.peek().copied() {
                Some(q @ ('"' | '\'')) => {
                    chars.next();
                    for c in chars.by_ref() {
                        if c == q {
                            break;
                        }
                        value.push(c);
                    }
                }
                _ => {
                    while let Some(&c) = chars.peek() {
                        if c.is_whitespace() {
                            break;
                        }
                        value.push(c);
                        chars.next();
                    }
                }
            }
        }

        if key.is_empty() {
            // Stray '=' or quote; drop one character to make progress.
            chars.next();
            continue;
        }
        result.push((key.to_ascii_lowercase(), decode_entities(&value)));
    }

    result
}

/// Decode character references in text.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&end| end > 0 && end <= 10)
            .and_then(|end| decode_entity(&after[..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        "bull" => Some('\u{2022}'),
        "ndash" => Some('\u{2013}'),
        "mdash" => Some('\u{2014}'),
        "hellip" => Some('\u{2026}'),
        "copy" => Some('\u{00A9}'),
        _ => {
            let num = entity.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::format::Alignment;

    #[test]
    fn test_plain_text() {
        let doc = import_document("Hello World").unwrap();
        assert_eq!(doc.text(), "Hello World");
        assert_eq!(doc.runs().len(), 1);
    }

    #[test]
    fn test_nested_character_tags() {
        let doc = import_document("<b>bold <i>both</i></b> none").unwrap();
        assert_eq!(doc.text(), "bold both none");
        assert_eq!(doc.runs().len(), 3);
        assert!(doc.format_at(0).bold);
        assert!(doc.format_at(5).bold && doc.format_at(5).italic);
        assert!(!doc.format_at(10).bold);
    }

    #[test]
    fn test_span_style() {
        let doc = import_document("<span style=\"color:red;font-size:20px;\">Hi</span>").unwrap();
        let format = doc.format_at(0);
        assert_eq!(format.foreground_color, Some(Color::RED));
        assert_eq!(format.font_size, Some(20.0));
    }

    #[test]
    fn test_paragraphs_get_breaks() {
        let doc = import_document("<p>one</p>\n<p style=\"text-align:center;\">two</p>").unwrap();
        assert_eq!(doc.text(), "one\ntwo");
        assert_eq!(doc.block_format_at(1).alignment, Alignment::Center);
        assert_eq!(doc.block_format_at(0).alignment, Alignment::Left);
        assert!(doc.check_invariants().is_ok());
    }

    #[test]
    fn test_text_after_block() {
        let doc = import_document("<p>one</p>two").unwrap();
        assert_eq!(doc.text(), "one\ntwo");
    }

    #[test]
    fn test_list_items() {
        let doc = import_document("<ul>\n <li>a</li>\n <li>b</li>\n</ul><p>c</p>").unwrap();
        assert_eq!(doc.text(), "a\nb\nc");
        assert!(doc.block_format_at(0).list_item);
        assert!(doc.block_format_at(1).list_item);
        assert!(!doc.block_format_at(2).list_item);
    }

    #[test]
    fn test_unknown_tags_are_stripped() {
        let doc = import_document("<b><font face=\"x\">kept</font></b><img src=\"a.png\">!").unwrap();
        assert_eq!(doc.text(), "kept!");
        assert!(doc.format_at(0).bold);
        assert!(!doc.format_at(4).bold);
    }

    #[test]
    fn test_hidden_content_dropped() {
        let doc = import_document("<!DOCTYPE html><html><head><title>T</title></head><body>x</body></html>")
            .unwrap();
        assert_eq!(doc.text(), "x");
    }

    #[test]
    fn test_entities() {
        let doc = import_document("a &lt;b&gt; &amp; &#65;&#x42; &nbsp;&bogus; & c").unwrap();
        assert_eq!(doc.text(), "a <b> & AB \u{00A0}&bogus; & c");
    }

    #[test]
    fn test_malformed_inputs() {
        let err = import_document("<b>open").unwrap_err();
        assert_eq!(err.offset, 0);
        assert!(err.message.contains("unclosed"));

        let err = import_document("<b><i>x</b></i>").unwrap_err();
        assert!(err.message.contains("mismatched"));

        let err = import_document("text</p>").unwrap_err();
        assert_eq!(err.offset, 4);

        assert!(import_document("a <b").is_err());
        assert!(import_document("<!-- never closed").is_err());
    }

    #[test]
    fn test_visible_text() {
        assert_eq!(visible_text("<b>open"), "open");
        assert_eq!(visible_text("<p>a</p><p>b &amp; c"), "a\nb & c");
        assert_eq!(visible_text("x<br>y<p>z</p>"), "x\nyz");
        assert_eq!(visible_text("1 < 2"), "1 < 2");
    }

    #[test]
    fn test_attribute_parsing() {
        let attrs = parse_attributes("style='color: red' data-x=1 hidden title=\"a &amp; b\"");
        assert_eq!(
            attrs,
            vec![
                ("style".to_string(), "color: red".to_string()),
                ("data-x".into(), "1".into()),
                ("hidden".into(), String::new()),
                ("title".into(), "a & b".into()),
            ]
        );
    }
}

//! HTML serialization of a [`StyledDocument`].
//!
//! Output shape, outermost first:
//!
//! 1. one block element per paragraph: `<p>`, or `<li>` inside a `<ul>` for
//!    consecutive list paragraphs, carrying `text-align`, `margin-left` and
//!    `text-indent`;
//! 2. per run, a `<span>` carrying `color`, `background-color`,
//!    `font-family` and `font-size`;
//! 3. `<b>`, then `<i>`, then `<u>`.
//!
//! Paragraph breaks are written as `<br/>` inside the run that owns the
//! newline so that its character attributes survive a round-trip.

use std::fmt::Write as _;

use crate::document::StyledDocument;
use crate::format::{Alignment, BlockFormat, CharFormat};

pub(crate) fn export_document(doc: &StyledDocument, indentation_size: f32) -> String {
    let mut out = String::new();
    let mut in_list = false;

    for para in 0..doc.paragraph_count() {
        let Some(range) = doc.paragraph_range(para) else {
            continue;
        };
        if range.is_empty() {
            continue;
        }

        let block = doc.block_format_at(para);
        let tag = if block.list_item { "li" } else { "p" };
        if block.list_item && !in_list {
            out.push_str("<ul>");
            in_list = true;
        } else if !block.list_item && in_list {
            out.push_str("</ul>");
            in_list = false;
        }

        out.push('<');
        out.push_str(tag);
        write_block_style(&mut out, &block, indentation_size);
        out.push('>');

        for (run, part) in doc.runs_overlapping(range) {
            let text = doc.text_in(part).unwrap_or_default();
            write_run(&mut out, &text, &run.attributes.char_format);
        }

        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }

    if in_list {
        out.push_str("</ul>");
    }
    out
}

fn write_block_style(out: &mut String, block: &BlockFormat, indentation_size: f32) {
    let mut style = String::new();
    if block.alignment != Alignment::Left {
        let _ = write!(style, "text-align:{};", block.alignment.as_css());
    }
    if block.indent > 0.0 {
        let _ = write!(style, "margin-left:{}px;", block.indent);
    }
    if block.first_line_indent {
        let _ = write!(style, "text-indent:{}px;", indentation_size);
    }
    if !style.is_empty() {
        let _ = write!(out, " style=\"{}\"", escape_attribute(&style));
    }
}

fn write_run(out: &mut String, text: &str, format: &CharFormat) {
    let span = format.has_inline_style();
    if span {
        let mut style = String::new();
        if let Some(color) = format.foreground_color {
            let _ = write!(style, "color:{};", color.to_css());
        }
        if let Some(color) = format.background_color {
            let _ = write!(style, "background-color:{};", color.to_css());
        }
        if let Some(family) = &format.font_family {
            let _ = write!(style, "font-family:'{}';", escape_css_string(family));
        }
        if let Some(size) = format.font_size {
            let _ = write!(style, "font-size:{}px;", size);
        }
        let _ = write!(out, "<span style=\"{}\">", escape_attribute(&style));
    }
    if format.bold {
        out.push_str("<b>");
    }
    if format.italic {
        out.push_str("<i>");
    }
    if format.underline {
        out.push_str("<u>");
    }

    escape_text_into(out, text);

    if format.underline {
        out.push_str("</u>");
    }
    if format.italic {
        out.push_str("</i>");
    }
    if format.bold {
        out.push_str("</b>");
    }
    if span {
        out.push_str("</span>");
    }
}

fn escape_text_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("<br/>"),
            // Raw control whitespace is collapsed on import.
            '\t' => out.push_str("&#9;"),
            '\r' => out.push_str("&#13;"),
            '\u{c}' => out.push_str("&#12;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

fn escape_css_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

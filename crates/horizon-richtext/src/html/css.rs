//! Inline `style` attribute parsing.
//!
//! Only the declarations the exporter writes are understood; anything else
//! is skipped with a warning.

use cssparser::{ParseError as CssParseError, Parser, ParserInput, Token};
use horizon_richtext_core::logging::targets;

use crate::color::Color;
use crate::format::Alignment;

/// The recognized declarations of one `style` attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct InlineStyle {
    pub color: Option<Color>,
    pub background_color: Option<Color>,
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub text_align: Option<Alignment>,
    pub margin_left: Option<f32>,
    pub text_indent: Option<f32>,
}

/// Parse the contents of a `style` attribute.
pub(crate) fn parse_inline_style(css: &str) -> InlineStyle {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut style = InlineStyle::default();

    loop {
        parser.skip_whitespace();

        if parser.is_exhausted() {
            break;
        }

        // Stray semicolons between declarations are allowed.
        if parser.try_parse(|p| p.expect_semicolon()).is_ok() {
            continue;
        }

        let property_name = match parser.expect_ident() {
            Ok(name) => name.to_ascii_lowercase(),
            Err(_) => {
                skip_declaration(&mut parser);
                continue;
            }
        };

        if parser.expect_colon().is_err() {
            skip_declaration(&mut parser);
            continue;
        }

        if let Err(e) = parse_property_value(&mut parser, &property_name, &mut style) {
            tracing::warn!(
                target: targets::HTML,
                property = %property_name,
                "skipping style declaration: {:?}",
                e
            );
            skip_declaration(&mut parser);
            continue;
        }

        let _ = parser.try_parse(|p| p.expect_semicolon());
    }

    style
}

fn parse_property_value<'i>(
    parser: &mut Parser<'i, '_>,
    name: &str,
    style: &mut InlineStyle,
) -> Result<(), CssParseError<'i, ()>> {
    parser.skip_whitespace();

    match name {
        "color" => style.color = Some(parse_color(parser)?),
        "background-color" | "background" => style.background_color = Some(parse_color(parser)?),
        "font-family" => style.font_family = Some(parse_font_family(parser)?),
        "font-size" => style.font_size = Some(parse_length(parser)?),
        "text-align" => {
            let token = parser.next()?.clone();
            style.text_align = match token {
                Token::Ident(ref ident) => Alignment::from_css(ident),
                _ => None,
            };
            if style.text_align.is_none() {
                return Err(parser.new_custom_error(()));
            }
        }
        "margin-left" => style.margin_left = Some(parse_length(parser)?),
        "text-indent" => style.text_indent = Some(parse_length(parser)?),
        _ => return Err(parser.new_custom_error(())),
    }

    // Trailing `!important` and the like are ignored.
    parser.skip_whitespace();
    while !parser.is_exhausted() {
        let state = parser.state();
        if let Ok(Token::Semicolon) = parser.next() {
            parser.reset(&state);
            break;
        }
    }
    Ok(())
}

/// Parse a length in pixels. Unitless numbers are pixels; `pt` and `em` are
/// converted with a 16px em.
fn parse_length<'i>(parser: &mut Parser<'i, '_>) -> Result<f32, CssParseError<'i, ()>> {
    let token = parser.next()?.clone();

    match token {
        Token::Number { value, .. } => Ok(value),
        Token::Dimension { value, ref unit, .. } => match unit.to_ascii_lowercase().as_str() {
            "px" => Ok(value),
            "pt" => Ok(value * 4.0 / 3.0),
            "em" | "rem" => Ok(value * 16.0),
            _ => Err(parser.new_custom_error(())),
        },
        _ => Err(parser.new_custom_error(())),
    }
}

fn parse_color<'i>(parser: &mut Parser<'i, '_>) -> Result<Color, CssParseError<'i, ()>> {
    let token = parser.next()?.clone();

    match token {
        Token::Hash(ref hash) | Token::IDHash(ref hash) => {
            Color::from_hex(hash).ok_or_else(|| parser.new_custom_error(()))
        }
        Token::Ident(ref name) => Color::from_name(name).ok_or_else(|| parser.new_custom_error(())),
        Token::Function(ref name)
            if name.eq_ignore_ascii_case("rgb") || name.eq_ignore_ascii_case("rgba") =>
        {
            parser.parse_nested_block(|p| {
                let r = parse_color_component(p)?;
                p.expect_comma()?;
                let g = parse_color_component(p)?;
                p.expect_comma()?;
                let b = parse_color_component(p)?;
                let a = if p.try_parse(|p| p.expect_comma()).is_ok() {
                    parse_alpha_component(p)?
                } else {
                    255
                };
                Ok::<_, CssParseError<'i, ()>>(Color::rgba(r, g, b, a))
            })
        }
        _ => Err(parser.new_custom_error(())),
    }
}

fn parse_color_component<'i>(parser: &mut Parser<'i, '_>) -> Result<u8, CssParseError<'i, ()>> {
    parser.skip_whitespace();
    match *parser.next()? {
        Token::Number { value, .. } => Ok(value.clamp(0.0, 255.0).round() as u8),
        Token::Percentage { unit_value, .. } => Ok((unit_value.clamp(0.0, 1.0) * 255.0).round() as u8),
        _ => Err(parser.new_custom_error(())),
    }
}

fn parse_alpha_component<'i>(parser: &mut Parser<'i, '_>) -> Result<u8, CssParseError<'i, ()>> {
    parser.skip_whitespace();
    match *parser.next()? {
        Token::Number { value, .. } => Ok((value.clamp(0.0, 1.0) * 255.0).round() as u8),
        Token::Percentage { unit_value, .. } => Ok((unit_value.clamp(0.0, 1.0) * 255.0).round() as u8),
        _ => Err(parser.new_custom_error(())),
    }
}

/// Parse the first family of a `font-family` list.
fn parse_font_family<'i>(parser: &mut Parser<'i, '_>) -> Result<String, CssParseError<'i, ()>> {
    let mut words: Vec<String> = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }
        let state = parser.state();
        match parser.next()?.clone() {
            Token::QuotedString(ref name) if words.is_empty() => {
                words.push(name.to_string());
                break;
            }
            Token::Ident(ref name) => words.push(name.to_string()),
            _ => {
                parser.reset(&state);
                break;
            }
        }
    }

    // Skip the fallback families.
    while !parser.is_exhausted() {
        let state = parser.state();
        if let Ok(Token::Semicolon) = parser.next() {
            parser.reset(&state);
            break;
        }
    }

    if words.is_empty() {
        Err(parser.new_custom_error(()))
    } else {
        Ok(words.join(" "))
    }
}

fn skip_declaration(parser: &mut Parser<'_, '_>) {
    loop {
        match parser.next() {
            Ok(Token::Semicolon) | Err(_) => return,
            _ => {}
        }
    }
}

//! Font descriptors and the font parser.
//!
//! Grammar:
//!
//! ```text
//! font     := function | plain
//! plain    := value ([","] value)?          value := ident | string | number[unit]
//! function := ("larger" | "bigger" | "smaller" | "fontWithSize") "(" font "," number ")"
//!           | "scaledFont" "(" font ["," text-style] ")"
//! ```
//!
//! In `plain`, a numeric value is the point size and anything else is the
//! family; `system`, `systembold`/`boldsystem`, `systemitalic`/`italicsystem`
//! and the dynamic-type text style names are keywords.

use std::fmt;

use crate::css::tokenizer::Token;
use crate::error::ValueError;
use crate::property::registry::ValueParser;
use crate::property::syntax::{trim_quotes, TokenStream};
use crate::property::{PropertyType, PropertyValue};

/// Dynamic-type text styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextStyle {
    Body,
    Callout,
    Caption1,
    Caption2,
    Footnote,
    Headline,
    Subheadline,
    Title1,
    Title2,
    Title3,
}

impl TextStyle {
    pub const ALL: [TextStyle; 10] = [
        TextStyle::Body,
        TextStyle::Callout,
        TextStyle::Caption1,
        TextStyle::Caption2,
        TextStyle::Footnote,
        TextStyle::Headline,
        TextStyle::Subheadline,
        TextStyle::Title1,
        TextStyle::Title2,
        TextStyle::Title3,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TextStyle::Body => "body",
            TextStyle::Callout => "callout",
            TextStyle::Caption1 => "caption1",
            TextStyle::Caption2 => "caption2",
            TextStyle::Footnote => "footnote",
            TextStyle::Headline => "headline",
            TextStyle::Subheadline => "subheadline",
            TextStyle::Title1 => "title1",
            TextStyle::Title2 => "title2",
            TextStyle::Title3 => "title3",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|style| style.name().eq_ignore_ascii_case(name))
    }

    /// Point size at the default content size category.
    pub fn default_size(self) -> f64 {
        match self {
            TextStyle::Body | TextStyle::Headline => 17.0,
            TextStyle::Callout => 16.0,
            TextStyle::Caption1 => 12.0,
            TextStyle::Caption2 => 11.0,
            TextStyle::Footnote => 13.0,
            TextStyle::Subheadline => 15.0,
            TextStyle::Title1 => 28.0,
            TextStyle::Title2 => 22.0,
            TextStyle::Title3 => 20.0,
        }
    }
}

/// Which typeface a [`Font`] refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Named(String),
    System,
    BoldSystem,
    ItalicSystem,
    TextStyle(TextStyle),
}

impl FontFamily {
    /// Resolve a family name, recognizing the system and text style keywords.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.starts_with("boldsystem") || lower.starts_with("systembold") {
            FontFamily::BoldSystem
        } else if lower.starts_with("italicsystem") || lower.starts_with("systemitalic") {
            FontFamily::ItalicSystem
        } else if lower == "system" {
            FontFamily::System
        } else if let Some(style) = TextStyle::from_name(&lower) {
            FontFamily::TextStyle(style)
        } else {
            FontFamily::Named(name.to_string())
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontFamily::Named(name) if name.contains(' ') => write!(f, "\"{name}\""),
            FontFamily::Named(name) => write!(f, "{name}"),
            FontFamily::System => write!(f, "system"),
            FontFamily::BoldSystem => write!(f, "systembold"),
            FontFamily::ItalicSystem => write!(f, "systemitalic"),
            FontFamily::TextStyle(style) => write!(f, "{}", style.name()),
        }
    }
}

/// A resolved font descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: FontFamily,
    /// Point size.
    pub size: f64,
    /// Set by `scaledFont(...)`: scale with the user's content size for this
    /// text style.
    pub scaled_for: Option<TextStyle>,
}

impl Font {
    pub fn new(family: FontFamily, size: f64) -> Self {
        Self {
            family,
            size,
            scaled_for: None,
        }
    }

    /// A named family, e.g. `Font::named("Helvetica", 12.0)`.
    pub fn named(name: impl Into<String>, size: f64) -> Self {
        Self::new(FontFamily::Named(name.into()), size)
    }

    pub fn system(size: f64) -> Self {
        Self::new(FontFamily::System, size)
    }

    /// The preferred font for a dynamic-type text style.
    pub fn preferred(style: TextStyle) -> Self {
        Self::new(FontFamily::TextStyle(style), style.default_size())
    }

    pub fn with_size(self, size: f64) -> Self {
        Self {
            size: size.max(0.0),
            ..self
        }
    }

    pub fn scaled(self, style: TextStyle) -> Self {
        Self {
            scaled_for: Some(style),
            ..self
        }
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}pt", self.family, self.size)?;
        if let Some(style) = self.scaled_for {
            write!(f, " scaled({})", style.name())?;
        }
        Ok(())
    }
}

enum FontComponent {
    Size(f64),
    Name(String),
}

/// Parser for [`PropertyType::FONT`] values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontParser {
    default_size: f64,
}

impl Default for FontParser {
    fn default() -> Self {
        Self {
            default_size: Self::SYSTEM_FONT_SIZE,
        }
    }
}

impl FontParser {
    /// Size used when a value names no size.
    pub const SYSTEM_FONT_SIZE: f64 = 17.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_size(mut self, size: f64) -> Self {
        self.default_size = size;
        self
    }

    pub fn default_size(&self) -> f64 {
        self.default_size
    }

    fn component(stream: &mut TokenStream<'_>) -> Result<FontComponent, ValueError> {
        let Some(tok) = stream.peek() else {
            return Err(stream.invalid("expected font name or size, found end of input"));
        };
        match tok.token {
            Token::Number | Token::Dimension => stream.loose_number().map(FontComponent::Size),
            Token::StringLiteral | Token::StringLiteralSingle => {
                stream.advance();
                Ok(FontComponent::Name(trim_quotes(stream.text(tok)).to_string()))
            }
            Token::Ident if stream.peek_second() != Some(Token::ParenOpen) => {
                stream.advance();
                Ok(FontComponent::Name(stream.text(tok).to_string()))
            }
            _ => Err(stream.invalid(format!(
                "expected font name or size, found '{}'",
                stream.text(tok)
            ))),
        }
    }

    /// `value ([","] value)?`; the second value only if `allow_second`.
    fn plain(&self, stream: &mut TokenStream<'_>, allow_second: bool) -> Result<Font, ValueError> {
        let mut components = vec![Self::component(stream)?];
        if allow_second {
            if let Some(second) = stream.attempt(|s| {
                s.eat(Token::Comma);
                Self::component(s)
            }) {
                components.push(second);
            }
        }

        let mut size = self.default_size;
        let mut name = None;
        for component in components {
            match component {
                FontComponent::Size(n) => size = n,
                FontComponent::Name(n) => name = Some(n),
            }
        }

        Ok(match name.map(|n| FontFamily::from_name(&n)) {
            Some(FontFamily::TextStyle(style)) => Font::preferred(style),
            Some(family) => Font::new(family, size),
            None => Font::system(size),
        })
    }

    /// `font "," number ")"` for the size adjusting functions.
    fn adjust_arguments(
        &self,
        stream: &mut TokenStream<'_>,
        allow_second: bool,
    ) -> Result<(Font, f64), ValueError> {
        let font = self.expr(stream, allow_second)?;
        stream.expect(Token::Comma)?;
        let amount = stream.number()?;
        stream.expect(Token::ParenClose)?;
        Ok((font, amount))
    }

    fn expr(&self, stream: &mut TokenStream<'_>, allow_second: bool) -> Result<Font, ValueError> {
        let Some(function) = stream.function_name() else {
            return self.plain(stream, allow_second);
        };
        let function = function.to_ascii_lowercase();

        if function == "scaledfont" {
            let font = self.expr(stream, true)?;
            let style = if stream.eat(Token::Comma) {
                let tok = stream.expect(Token::Ident)?;
                let name = stream.text(tok);
                TextStyle::from_name(name)
                    .ok_or_else(|| stream.invalid(format!("unknown text style '{name}'")))?
            } else {
                TextStyle::Body
            };
            stream.expect(Token::ParenClose)?;
            return Ok(font.scaled(style));
        }

        // `bigger(Helvetica 12, 2)` needs the two-component inner font,
        // `bigger(Helvetica, 2)` the one-component one.
        let (font, amount) = match stream.attempt(|s| self.adjust_arguments(s, true)) {
            Some(parsed) => parsed,
            None => self.adjust_arguments(stream, false)?,
        };
        match function.as_str() {
            "larger" | "bigger" => Ok(font.clone().with_size(font.size + amount)),
            "smaller" => Ok(font.clone().with_size(font.size - amount)),
            "fontwithsize" => Ok(font.with_size(amount)),
            other => Err(stream.invalid(format!("unknown font function '{other}'"))),
        }
    }

    /// Parse a complete font value.
    pub fn parse_font(&self, property_type: &PropertyType, raw: &str) -> Result<Font, ValueError> {
        let mut stream = TokenStream::new(property_type, raw)?;
        let font = self.expr(&mut stream, true)?;
        stream.finish()?;
        Ok(font)
    }
}

impl ValueParser for FontParser {
    fn parse(&self, property_type: &PropertyType, raw: &str) -> Result<PropertyValue, ValueError> {
        self.parse_font(property_type, raw).map(PropertyValue::Font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn font(raw: &str) -> Font {
        FontParser::default()
            .parse_font(&PropertyType::FONT, raw)
            .unwrap_or_else(|e| panic!("{raw}: {e}"))
    }

    fn font_err(raw: &str) -> ValueError {
        FontParser::default()
            .parse_font(&PropertyType::FONT, raw)
            .unwrap_err()
    }

    // ── Plain values ─────────────────────────────────────────────────

    #[test]
    fn family_and_size() {
        assert_eq!(font("Helvetica 12"), Font::named("Helvetica", 12.0));
        assert_eq!(font("Helvetica, 12pt"), Font::named("Helvetica", 12.0));
        assert_eq!(font("14px 'Avenir Next'"), Font::named("Avenir Next", 14.0));
        assert_eq!(font("Helvetica-Bold"), Font::named("Helvetica-Bold", 17.0));
    }

    #[test]
    fn size_only_is_system_font() {
        assert_eq!(font("20"), Font::system(20.0));
    }

    #[test]
    fn system_keywords() {
        assert_eq!(font("system"), Font::system(17.0));
        assert_eq!(font("SystemBold 12").family, FontFamily::BoldSystem);
        assert_eq!(font("boldSystemFont 12").family, FontFamily::BoldSystem);
        assert_eq!(font("italicsystem").family, FontFamily::ItalicSystem);
        assert_eq!(font("systemItalic 9").size, 9.0);
    }

    #[test]
    fn text_styles_use_style_size() {
        assert_eq!(font("body"), Font::preferred(TextStyle::Body));
        assert_eq!(font("title1").size, 28.0);
        assert_eq!(font("Caption2 40").size, 11.0);
    }

    #[test]
    fn configured_default_size() {
        let parser = FontParser::new().with_default_size(14.0);
        let parsed = parser.parse_font(&PropertyType::FONT, "Georgia").unwrap();
        assert_eq!(parsed.size, 14.0);
        assert_eq!(parser.default_size(), 14.0);
    }

    // ── Functions ────────────────────────────────────────────────────

    #[test]
    fn bigger_with_two_component_font() {
        assert_eq!(font("bigger(Helvetica 12, 2)"), Font::named("Helvetica", 14.0));
        assert_eq!(font("larger(Helvetica, 12, 2)"), Font::named("Helvetica", 14.0));
    }

    #[test]
    fn bigger_with_one_component_font() {
        assert_eq!(font("bigger(Helvetica, 2)"), Font::named("Helvetica", 19.0));
    }

    #[test]
    fn smaller_and_font_with_size() {
        assert_eq!(font("smaller(Georgia 12, 3)"), Font::named("Georgia", 9.0));
        assert_eq!(font("fontWithSize(Georgia 12, 30)"), Font::named("Georgia", 30.0));
    }

    #[test]
    fn nested_functions() {
        assert_eq!(
            font("smaller(bigger(Helvetica 12, 4), 1)"),
            Font::named("Helvetica", 15.0)
        );
    }

    #[test]
    fn scaled_font() {
        assert_eq!(
            font("scaledFont(Helvetica 12)"),
            Font::named("Helvetica", 12.0).scaled(TextStyle::Body)
        );
        assert_eq!(
            font("scaledFont(Helvetica 12, headline)").scaled_for,
            Some(TextStyle::Headline)
        );
        assert!(matches!(font_err("scaledFont(Helvetica 12, huge)"), ValueError::Invalid { .. }));
    }

    #[test]
    fn display() {
        insta::assert_snapshot!(
            font("scaledFont(\"Avenir Next\" 12, title2)").to_string(),
            @r#""Avenir Next" 12pt scaled(title2)"#
        );
    }

    // ── Errors ───────────────────────────────────────────────────────

    #[test]
    fn unknown_function_fails() {
        assert!(matches!(font_err("huge(Helvetica 12, 2)"), ValueError::Invalid { .. }));
    }

    #[test]
    fn malformed_values_fail() {
        font_err("");
        font_err("Helvetica 12 13");
        font_err("bigger(Helvetica 12)");
    }

    #[test]
    fn any_unit_suffix_is_dropped_from_the_size() {
        assert_eq!(font("Helvetica 12em"), Font::named("Helvetica", 12.0));
        assert_eq!(font("Helvetica, 12dp"), Font::named("Helvetica", 12.0));
        assert_eq!(font("14px"), Font::system(14.0));
        assert_eq!(font("bigger(Helvetica 12em, 2)"), Font::named("Helvetica", 14.0));
    }
}

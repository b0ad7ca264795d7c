//! Recursive descent stylesheet parser.
//!
//! Parses stylesheet text into [`StyleSheetContent`]: rule sets plus the
//! variable table. Uses the logos-based tokenizer from
//! [`crate::css::tokenizer`] for structure; declaration values are captured as
//! raw text so they can carry variable references and arbitrary value syntax.
//!
//! ```text
//! @accent: #ff8800;
//! --gap: 8;
//!
//! Button.primary, Label#title:highlighted {
//!     font: bigger(Helvetica 12, 2);
//!     content-insets: @gap --gap;
//! }
//! ```

use crate::css::model::*;
use crate::css::tokenizer::{tokenize_lossy, Spanned, Token};

/// Errors from stylesheet parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token at byte {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
}

/// Strip block comments (`/* ... */`) from the input, replacing each comment
/// with a single space. Comment markers inside quoted strings are kept.
fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    let mut quote: Option<char> = None;

    while let Some(c) = rest.chars().next() {
        if quote.is_none() && rest.starts_with("/*") {
            match rest[2..].find("*/") {
                Some(end) => rest = &rest[2 + end + 2..],
                // Unterminated comment: consume the rest of the input.
                None => rest = "",
            }
            result.push(' ');
            continue;
        }
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if q == c => quote = None,
            _ => {}
        }
        result.push(c);
        rest = &rest[c.len_utf8()..];
    }

    result
}

/// Byte offset of the end of a raw declaration value starting at `from`:
/// the first `;` or `}` outside of quotes, or the end of input.
fn scan_raw_value(source: &str, from: usize) -> usize {
    let mut quote: Option<char> = None;
    for (i, c) in source[from..].char_indices() {
        match (quote, c) {
            (Some(q), _) if q == c => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, ';' | '}') => return from + i,
            _ => {}
        }
    }
    source.len()
}

/// Parse stylesheet text into [`StyleSheetContent`].
pub fn parse_css(input: &str) -> Result<StyleSheetContent, ParseError> {
    let cleaned = strip_comments(input);
    let tokens = tokenize_lossy(&cleaned);

    let mut parser = Parser {
        source: &cleaned,
        tokens,
        cursor: 0,
    };

    let mut content = StyleSheetContent::new();
    while let Some(tok) = parser.peek() {
        match tok.token {
            Token::Semicolon => {
                parser.advance();
            }
            Token::Variable => {
                let (name, value) = parser.parse_variable_definition()?;
                content.variables.insert(name, value);
            }
            _ => parser.parse_rule(&mut content)?,
        }
    }

    Ok(content)
}

/// Parse a standalone selector, e.g. `Container > Button.primary`.
///
/// Used to look up declarations by selector text.
pub fn parse_selector(input: &str) -> Result<Selector, ParseError> {
    let tokens = tokenize_lossy(input);
    let mut parser = Parser {
        source: input,
        tokens,
        cursor: 0,
    };
    let selector = parser.parse_selector()?;
    match parser.peek() {
        None => Ok(selector),
        Some(tok) => Err(parser.unexpected(tok, "trailing input after selector")),
    }
}

/// Recursive descent parser state.
struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
    cursor: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Spanned> {
        self.tokens.get(self.cursor).copied()
    }

    fn advance(&mut self) -> Option<Spanned> {
        let tok = self.peek()?;
        self.cursor += 1;
        Some(tok)
    }

    fn text(&self, tok: Spanned) -> &'a str {
        tok.text(self.source)
    }

    fn unexpected(&self, tok: Spanned, message: &str) -> ParseError {
        ParseError::UnexpectedToken {
            position: tok.start,
            message: format!("{message}, got {:?} '{}'", tok.token, self.text(tok)),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<Spanned, ParseError> {
        match self.advance() {
            Some(tok) if tok.token == expected => Ok(tok),
            Some(tok) => Err(self.unexpected(tok, &format!("expected {expected:?}"))),
            None => Err(ParseError::UnexpectedEof(format!("expected {expected:?}"))),
        }
    }

    /// Returns `true` if the current token is immediately adjacent (no whitespace)
    /// to the previous token.
    fn is_adjacent(&self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = self.tokens[self.cursor - 1];
        self.peek().is_some_and(|curr| curr.start == prev.end)
    }

    /// Capture the raw value text after a `:` and move the cursor past it.
    ///
    /// Consumes the terminating `;` if present; a `}` is left for the caller.
    fn raw_value(&mut self, colon: Spanned) -> Result<String, ParseError> {
        let end = scan_raw_value(self.source, colon.end);
        let value = self.source[colon.end..end].trim();
        if value.is_empty() {
            return Err(ParseError::UnexpectedToken {
                position: colon.end,
                message: "empty declaration value".into(),
            });
        }
        while self.peek().is_some_and(|t| t.start < end) {
            self.cursor += 1;
        }
        if self.peek().is_some_and(|t| t.token == Token::Semicolon) {
            self.advance();
        }
        Ok(value.to_string())
    }

    /// Parse `@name: value;` or `--name: value;`, returning the bare name.
    fn parse_variable_definition(&mut self) -> Result<(String, String), ParseError> {
        let tok = self.expect(Token::Variable)?;
        let text = self.text(tok);
        let name = text
            .strip_prefix("--")
            .or_else(|| text.strip_prefix('@'))
            .unwrap_or(text)
            .to_string();
        let colon = self.expect(Token::Colon)?;
        let value = self.raw_value(colon)?;
        Ok((name, value))
    }

    /// Parse a single rule: selector(s) `{` declarations `}`.
    ///
    /// Custom-property style definitions (`--name: value`) inside a block are
    /// added to the sheet's variable table.
    fn parse_rule(&mut self, content: &mut StyleSheetContent) -> Result<(), ParseError> {
        let selectors = self.parse_selector_list()?;
        self.expect(Token::BraceOpen)?;

        let mut declarations = Vec::new();
        loop {
            let Some(tok) = self.peek() else {
                return Err(ParseError::UnexpectedEof("expected BraceClose".into()));
            };
            match tok.token {
                Token::BraceClose => break,
                Token::Semicolon => {
                    self.advance();
                }
                Token::Variable => {
                    let (name, value) = self.parse_variable_definition()?;
                    content.variables.insert(name, value);
                }
                _ => declarations.push(self.parse_declaration()?),
            }
        }
        self.expect(Token::BraceClose)?;

        content.rulesets.push(RuleSet {
            selectors,
            declarations,
        });
        Ok(())
    }

    /// Parse a comma-separated list of selectors (before `{`).
    fn parse_selector_list(&mut self) -> Result<Vec<Selector>, ParseError> {
        let mut selectors = vec![self.parse_selector()?];

        while self.peek().is_some_and(|t| t.token == Token::Comma) {
            self.advance();
            selectors.push(self.parse_selector()?);
        }

        Ok(selectors)
    }

    /// Parse a single selector: a sequence of compound selectors with combinators.
    fn parse_selector(&mut self) -> Result<Selector, ParseError> {
        let mut parts = vec![SelectorPart::Compound(self.parse_compound_selector()?)];

        loop {
            match self.peek() {
                Some(t) if t.token == Token::GreaterThan => {
                    self.advance();
                    parts.push(SelectorPart::Combinator(Combinator::Child));
                    parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
                }
                // A selector-starting token after whitespace is a descendant
                // combinator; adjacent ones were consumed by the compound.
                Some(t)
                    if matches!(
                        t.token,
                        Token::Ident | Token::Hash | Token::Dot | Token::Star | Token::Colon
                    ) =>
                {
                    parts.push(SelectorPart::Combinator(Combinator::Descendant));
                    parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
                }
                _ => break,
            }
        }

        Ok(Selector { parts })
    }

    /// Consume the identifier that must directly follow a `.`, `#` or `:`.
    fn selector_name(&mut self, after: &str) -> Result<String, ParseError> {
        let adjacent = self.is_adjacent();
        match self.advance() {
            Some(tok) if tok.token == Token::Ident && adjacent => Ok(self.text(tok).to_string()),
            Some(tok) => Err(self.unexpected(tok, &format!("expected name after '{after}'"))),
            None => Err(ParseError::UnexpectedEof(format!(
                "expected name after '{after}'"
            ))),
        }
    }

    /// Parse one simple selector component starting at the cursor, if any.
    fn parse_simple_selector(&mut self) -> Result<Option<SelectorComponent>, ParseError> {
        let Some(tok) = self.peek() else {
            return Ok(None);
        };
        let component = match tok.token {
            Token::Ident => {
                self.advance();
                SelectorComponent::Type(self.text(tok).to_string())
            }
            Token::Star => {
                self.advance();
                SelectorComponent::Universal
            }
            Token::Dot => {
                self.advance();
                SelectorComponent::Class(self.selector_name(".")?)
            }
            Token::Hash => {
                self.advance();
                SelectorComponent::Id(self.selector_name("#")?)
            }
            // `#abc` style ids whose names happen to be valid hex digits.
            Token::HexColor => {
                self.advance();
                SelectorComponent::Id(self.text(tok)[1..].to_string())
            }
            Token::Colon => {
                self.advance();
                SelectorComponent::PseudoClass(self.selector_name(":")?)
            }
            _ => return Ok(None),
        };
        Ok(Some(component))
    }

    /// Parse a compound selector: simple selector components with no
    /// whitespace between them, e.g. `Button.primary:highlighted`.
    fn parse_compound_selector(&mut self) -> Result<CompoundSelector, ParseError> {
        let mut compound = CompoundSelector::new();

        match self.parse_simple_selector()? {
            Some(component) => compound.push(component),
            None => {
                return Err(match self.peek() {
                    Some(tok) => self.unexpected(tok, "expected selector part"),
                    None => ParseError::UnexpectedEof("expected selector part".into()),
                });
            }
        }

        while self.is_adjacent()
            && self
                .peek()
                .is_some_and(|t| matches!(t.token, Token::Dot | Token::Hash | Token::HexColor | Token::Colon))
        {
            if let Some(component) = self.parse_simple_selector()? {
                compound.push(component);
            }
        }

        Ok(compound)
    }

    /// Parse a single declaration: `property: raw value [;]`.
    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let prop_tok = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof("expected property name".into()))?;
        if prop_tok.token != Token::Ident {
            return Err(self.unexpected(prop_tok, "expected property name"));
        }
        let property = self.text(prop_tok).to_string();
        let colon = self.expect(Token::Colon)?;
        let value = self.raw_value(colon)?;
        Ok(Declaration { property, value })
    }
}

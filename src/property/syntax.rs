//! Shared building blocks for the value parsers: a backtracking token cursor
//! and a few lexical helpers.

use crate::css::tokenizer::{tokenize_strict, Spanned, Token};
use crate::error::ValueError;
use crate::property::PropertyType;

/// Strip surrounding whitespace and quote characters.
pub fn trim_quotes(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'')
}

/// Returns `true` if `value` (after trimming whitespace) is wrapped in a
/// matching pair of quotes.
pub fn is_quoted(value: &str) -> bool {
    let value = value.trim();
    value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
}

/// Split a dimension token like `12pt` or `50%` into number and unit.
pub fn split_dimension(text: &str) -> Option<(f64, &str)> {
    let unit_start = text
        .char_indices()
        .find(|(i, c)| !c.is_ascii_digit() && *c != '.' && !((*c == '-' || *c == '+') && *i == 0))
        .map(|(i, _)| i)?;
    if unit_start == 0 || unit_start >= text.len() {
        return None;
    }
    let number = text[..unit_start].parse().ok()?;
    Some((number, &text[unit_start..]))
}

/// Token cursor over a single property value.
pub struct TokenStream<'a> {
    property_type: &'a PropertyType,
    source: &'a str,
    tokens: Vec<Spanned>,
    cursor: usize,
}

impl<'a> TokenStream<'a> {
    /// Tokenize `source`; any character the lexer does not know fails.
    pub fn new(property_type: &'a PropertyType, source: &'a str) -> Result<Self, ValueError> {
        let tokens = tokenize_strict(source).map_err(|position| ValueError::Tokenize {
            property_type: property_type.clone(),
            position,
        })?;
        Ok(Self {
            property_type,
            source,
            tokens,
            cursor: 0,
        })
    }

    pub fn property_type(&self) -> &'a PropertyType {
        self.property_type
    }

    pub fn is_eof(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<Spanned> {
        self.tokens.get(self.cursor).copied()
    }

    pub fn peek_token(&self) -> Option<Token> {
        self.peek().map(|t| t.token)
    }

    /// Token after the current one.
    pub fn peek_second(&self) -> Option<Token> {
        self.tokens.get(self.cursor + 1).map(|t| t.token)
    }

    pub fn advance(&mut self) -> Option<Spanned> {
        let tok = self.peek()?;
        self.cursor += 1;
        Some(tok)
    }

    pub fn text(&self, tok: Spanned) -> &'a str {
        tok.text(self.source)
    }

    /// Consume the current token if it is `token`.
    pub fn eat(&mut self, token: Token) -> bool {
        if self.peek_token() == Some(token) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Consume the current token if it is an identifier equal to `keyword`
    /// (case-insensitive).
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        match self.peek() {
            Some(tok) if tok.token == Token::Ident && self.text(tok).eq_ignore_ascii_case(keyword) => {
                self.cursor += 1;
                true
            }
            _ => false,
        }
    }

    pub fn invalid(&self, message: impl Into<String>) -> ValueError {
        ValueError::invalid(self.property_type, message)
    }

    fn describe_current(&self) -> String {
        match self.peek() {
            Some(tok) => format!("'{}'", self.text(tok)),
            None => "end of input".to_string(),
        }
    }

    pub fn expect(&mut self, token: Token) -> Result<Spanned, ValueError> {
        match self.peek() {
            Some(tok) if tok.token == token => {
                self.cursor += 1;
                Ok(tok)
            }
            _ => Err(self.invalid(format!(
                "expected {token:?}, found {}",
                self.describe_current()
            ))),
        }
    }

    /// Require that every token has been consumed.
    pub fn finish(&self) -> Result<(), ValueError> {
        if self.is_eof() {
            Ok(())
        } else {
            Err(self.invalid(format!("unexpected {}", self.describe_current())))
        }
    }

    /// Run `f`; on failure rewind to where it started and return `None`.
    pub fn attempt<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ValueError>,
    ) -> Option<T> {
        let start = self.cursor;
        match f(self) {
            Ok(value) => Some(value),
            Err(_) => {
                self.cursor = start;
                None
            }
        }
    }

    /// A plain number, or a dimension in `pt` / `px`.
    pub fn number(&mut self) -> Result<f64, ValueError> {
        let Some(tok) = self.peek() else {
            return Err(self.invalid("expected number, found end of input"));
        };
        let text = self.text(tok);
        let value = match tok.token {
            Token::Number => text.parse::<f64>().ok(),
            Token::Dimension => match split_dimension(text) {
                Some((n, unit)) if unit.eq_ignore_ascii_case("pt") || unit.eq_ignore_ascii_case("px") => {
                    Some(n)
                }
                _ => None,
            },
            _ => None,
        };
        match value {
            Some(n) => {
                self.cursor += 1;
                Ok(n)
            }
            None => Err(self.invalid(format!("expected number, found '{text}'"))),
        }
    }

    /// Like [`number`](Self::number), but any unit suffix (including `%`) is
    /// accepted and dropped.
    pub fn loose_number(&mut self) -> Result<f64, ValueError> {
        if let Some(tok) = self.peek() {
            if tok.token == Token::Dimension {
                if let Some((n, _)) = split_dimension(self.text(tok)) {
                    self.cursor += 1;
                    return Ok(n);
                }
            }
        }
        self.number()
    }

    /// Numbers separated by optional commas, until `)` or end of input.
    fn number_list(&mut self) -> Result<Vec<f64>, ValueError> {
        let mut values = Vec::new();
        while !self.is_eof() && self.peek_token() != Some(Token::ParenClose) {
            if !values.is_empty() {
                self.eat(Token::Comma);
            }
            values.push(self.number()?);
        }
        Ok(values)
    }

    /// Numeric components of a structured value, with an optional function
    /// prefix: `prefix(1, 2)`, `(1 2)` or bare `1, 2`.
    pub fn numeric_parameters(&mut self, prefix: &str) -> Result<Vec<f64>, ValueError> {
        let prefixed = self.eat_keyword(prefix);
        if prefixed || self.peek_token() == Some(Token::ParenOpen) {
            self.expect(Token::ParenOpen)?;
            let values = self.number_list()?;
            self.expect(Token::ParenClose)?;
            Ok(values)
        } else {
            self.number_list()
        }
    }

    /// `name(` ... : the function name if the stream is at a call.
    pub fn function_name(&mut self) -> Option<&'a str> {
        match (self.peek(), self.peek_second()) {
            (Some(tok), Some(Token::ParenOpen)) if tok.token == Token::Ident => {
                self.cursor += 2;
                Some(self.text(tok))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream<'a>(ty: &'a PropertyType, src: &'a str) -> TokenStream<'a> {
        TokenStream::new(ty, src).unwrap()
    }

    #[test]
    fn trim_quotes_strips_whitespace_and_quotes() {
        assert_eq!(trim_quotes("  \"Avenir Next\" "), "Avenir Next");
        assert_eq!(trim_quotes("'x'"), "x");
        assert_eq!(trim_quotes("plain"), "plain");
        assert!(is_quoted(" \"a\" "));
        assert!(!is_quoted("\"a'"));
        assert!(!is_quoted("\""));
    }

    #[test]
    fn split_dimension_parts() {
        assert_eq!(split_dimension("12pt"), Some((12.0, "pt")));
        assert_eq!(split_dimension("-1.5px"), Some((-1.5, "px")));
        assert_eq!(split_dimension("50%"), Some((50.0, "%")));
        assert_eq!(split_dimension("12"), None);
    }

    #[test]
    fn numeric_parameters_forms() {
        let ty = PropertyType::RECT;
        assert_eq!(stream(&ty, "rect(1, 2, 3, 4)").numeric_parameters("rect").unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(stream(&ty, "RECT(1 2)").numeric_parameters("rect").unwrap(), vec![1.0, 2.0]);
        assert_eq!(stream(&ty, "(5,6)").numeric_parameters("rect").unwrap(), vec![5.0, 6.0]);
        assert_eq!(stream(&ty, "10 20px, 30pt").numeric_parameters("rect").unwrap(), vec![10.0, 20.0, 30.0]);
        assert!(stream(&ty, "rect(1, 2").numeric_parameters("rect").is_err());
        assert!(stream(&ty, "1 2em").numeric_parameters("rect").is_err());
    }

    #[test]
    fn attempt_rewinds_on_failure() {
        let ty = PropertyType::FONT;
        let mut s = stream(&ty, "Helvetica 12");
        let failed: Option<f64> = s.attempt(|s| {
            s.advance();
            s.expect(Token::Comma).map(|_| 0.0)
        });
        assert_eq!(failed, None);
        assert_eq!(s.peek_token(), Some(Token::Ident));
    }

    #[test]
    fn strict_tokenizing_rejects_unknown_characters() {
        let ty = PropertyType::SIZE;
        assert!(matches!(
            TokenStream::new(&ty, "1 ! 2"),
            Err(ValueError::Tokenize { position: 2, .. })
        ));
    }

    #[test]
    fn function_name_consumes_paren() {
        let ty = PropertyType::FONT;
        let mut s = stream(&ty, "bigger(x)");
        assert_eq!(s.function_name(), Some("bigger"));
        assert_eq!(s.peek_token(), Some(Token::Ident));
        let mut s = stream(&ty, "bigger x");
        assert_eq!(s.function_name(), None);
    }
}

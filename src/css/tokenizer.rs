//! logos-based tokenizer shared by the stylesheet parser and the value parsers.
//!
//! Token priority in logos is determined by:
//! 1. Longest match wins (e.g. `#fff` as HexColor beats `#` as Hash)
//! 2. For equal length matches, earlier-defined variants win
//!
//! Our ordering ensures:
//! - `#ff00aa` matches [`Token::HexColor`], not `Hash` + `Ident`
//! - `12pt` matches [`Token::Dimension`], not `Number` + `Ident`
//! - `--gap` and `@gap` match [`Token::Variable`], not punctuation + `Ident`

use logos::Logos;

/// Token produced by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // ── Compound tokens (longer matches, defined first) ──────────────

    /// Hex color: `#fff`, `#ff00aa`, `#ff00aa80` (3-8 hex digits).
    #[regex(r"#[0-9a-fA-F]{3,8}")]
    HexColor,

    /// Number with a unit suffix: `12pt`, `10px`, `50%`.
    #[regex(r"[-+]?[0-9]+(\.[0-9]+)?(%|[a-zA-Z]+)")]
    Dimension,

    /// Double-quoted string literal (backslash escapes allowed).
    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLiteral,

    /// Single-quoted string literal (backslash escapes allowed).
    #[regex(r"'([^'\\]|\\.)*'")]
    StringLiteralSingle,

    /// Variable reference or definition name: `@primary`, `--bg-color`.
    #[regex(r"(@|--)[a-zA-Z_][a-zA-Z0-9_-]*")]
    Variable,

    /// Number: integer or float, optionally signed.
    #[regex(r"[-+]?[0-9]+(\.[0-9]+)?")]
    Number,

    /// Identifier: property names, selector names, keywords, function names.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    // ── Single-character punctuation ─────────────────────────────────

    /// `{`
    #[token("{")]
    BraceOpen,

    /// `}`
    #[token("}")]
    BraceClose,

    /// `(`
    #[token("(")]
    ParenOpen,

    /// `)`
    #[token(")")]
    ParenClose,

    /// `:`
    #[token(":")]
    Colon,

    /// `;`
    #[token(";")]
    Semicolon,

    /// `,`
    #[token(",")]
    Comma,

    /// `.`
    #[token(".")]
    Dot,

    /// `#`
    #[token("#")]
    Hash,

    /// `*`
    #[token("*")]
    Star,

    /// `>`
    #[token(">")]
    GreaterThan,

    /// `|`
    #[token("|")]
    Pipe,
}

impl Token {
    /// Returns `true` for both quoting styles of string literal.
    pub fn is_string(self) -> bool {
        matches!(self, Token::StringLiteral | Token::StringLiteralSingle)
    }
}

/// A token together with its byte span in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    /// Byte offset where this token starts in the source.
    pub start: usize,
    /// Byte offset where this token ends in the source.
    pub end: usize,
}

impl Spanned {
    /// The source text covered by this token.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Tokenize with spans, skipping characters that fail to lex.
///
/// Used by the stylesheet parser, which reads declaration values as raw text
/// and only needs tokens for structure.
pub fn tokenize_lossy(input: &str) -> Vec<Spanned> {
    Token::lexer(input)
        .spanned()
        .filter_map(|(result, span)| {
            result.ok().map(|token| Spanned {
                token,
                start: span.start,
                end: span.end,
            })
        })
        .collect()
}

/// Tokenize with spans, failing on the first character that does not lex.
///
/// Returns the byte offset of the offending input on failure.
pub fn tokenize_strict(input: &str) -> Result<Vec<Spanned>, usize> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(input).spanned() {
        match result {
            Ok(token) => tokens.push(Spanned {
                token,
                start: span.start,
                end: span.end,
            }),
            Err(()) => return Err(span.start),
        }
    }
    Ok(tokens)
}

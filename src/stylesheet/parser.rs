//! Stylesheet text parsers.

use crate::css::model::StyleSheetContent;
use crate::css::parser::{parse_css, ParseError};

/// Turns stylesheet source text into rulesets and a variable table.
pub trait StyleSheetParser: Send + Sync {
    fn parse(&self, source: &str) -> Result<StyleSheetContent, ParseError>;
}

impl<F> StyleSheetParser for F
where
    F: Fn(&str) -> Result<StyleSheetContent, ParseError> + Send + Sync,
{
    fn parse(&self, source: &str) -> Result<StyleSheetContent, ParseError> {
        self(source)
    }
}

/// The built-in CSS dialect parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct CssStyleSheetParser;

impl StyleSheetParser for CssStyleSheetParser {
    fn parse(&self, source: &str) -> Result<StyleSheetContent, ParseError> {
        parse_css(source)
    }
}

//! Stylesheet language: tokenizer, model and parser.

pub mod model;
pub mod parser;
pub mod tokenizer;

pub use model::{Declaration, RuleSet, Selector, StyleSheetContent};
pub use parser::{parse_css, parse_selector, ParseError};

//! # styleweave
//!
//! Stylesheet cascade and typed property-value resolution for declaratively
//! styled user interfaces.
//!
//! A host UI layer describes visual properties in a CSS-like language.
//! styleweave loads and refreshes those stylesheets, resolves `@name` and
//! `--name` variable references across them, and parses raw declaration text
//! into typed values (rectangles, insets, fonts, colors, enums, ...) that the
//! host applies to its own objects.
//!
//! ## Core Systems
//!
//! - **[`stylesheet`]** — Stylesheet repository: local and remote sources, scopes, refresh timer, change monitoring, notifications
//! - **[`variables`]** — Variable repository: overrides, cascade lookup, nested expansion
//! - **[`property`]** — Property types, typed values, the parser registry and built-in parsers, property bindings
//! - **[`cascade`]** — `StyleManager` facade composing the three systems
//! - **[`css`]** — Logos tokenizer, stylesheet model and the default stylesheet parser
//! - **[`geometry`]** — Rect, Offset, Size, Point, EdgeInsets and Transform values
//! - **[`error`]** — `StyleError` and `ValueError`
//! - **[`testing`]** — In-memory sources, a manual change monitor and event recorders
//!
//! ## Example
//!
//! ```no_run
//! use styleweave::cascade::StyleManager;
//! use styleweave::property::PropertyType;
//! use styleweave::stylesheet::StyleSheetScope;
//!
//! let mut styles = StyleManager::new();
//! styles
//!     .stylesheets_mut()
//!     .load_local("styles/main.css", None, None)
//!     .expect("stylesheet loads");
//!
//! let scope = StyleSheetScope::all();
//! let insets = styles.parse_value(&PropertyType::EDGE_INSETS, "@padding 8", &scope);
//! println!("{insets:?}");
//! ```

// Foundation
pub mod error;
pub mod geometry;

// Stylesheet language
pub mod css;

// Core systems
pub mod cascade;
pub mod property;
pub mod stylesheet;
pub mod variables;

// Test support
pub mod testing;

pub use cascade::StyleManager;
pub use error::{StyleError, ValueError};
pub use property::{Property, PropertyParserRegistry, PropertyType, PropertyValue};
pub use stylesheet::{StyleSheet, StyleSheetId, StyleSheetRepository, StyleSheetScope};
pub use variables::VariableRepository;

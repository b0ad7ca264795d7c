//! Property types, typed values and the parser registry.
//!
//! A [`PropertyType`] names a kind of value (`Rect`, `Font`, ...). The
//! [`PropertyParserRegistry`] maps each type to a [`ValueParser`] that turns
//! raw declaration text into a [`PropertyValue`]. [`Property`] binds a type to
//! a named attribute on a host object.

use std::borrow::Cow;
use std::fmt;

pub mod basic;
pub mod binding;
pub mod color;
pub mod enums;
pub mod font;
pub mod geometry;
pub mod registry;
pub mod syntax;
pub mod transform;
pub mod value;

pub use binding::{ParameterTransformer, ParameterValue, Property, PropertySetter};
pub use color::Color;
pub use enums::{BitMaskEnumValueMapping, EnumMapping, EnumValueMapping};
pub use font::{Font, FontFamily, FontParser, TextStyle};
pub use registry::{PropertyParserRegistry, ValueParser};
pub use value::{FromPropertyValue, PropertyValue, RelativeNumber};

/// Stable name of a property value type.
///
/// Built-in types are available as associated constants; hosts may create
/// their own with [`PropertyType::new`] and register a parser for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyType(Cow<'static, str>);

impl PropertyType {
    pub const STRING: PropertyType = PropertyType::builtin("String");
    pub const BOOL: PropertyType = PropertyType::builtin("Bool");
    pub const NUMBER: PropertyType = PropertyType::builtin("Number");
    pub const RELATIVE_NUMBER: PropertyType = PropertyType::builtin("RelativeNumber");
    pub const COLOR: PropertyType = PropertyType::builtin("Color");
    pub const RECT: PropertyType = PropertyType::builtin("Rect");
    pub const OFFSET: PropertyType = PropertyType::builtin("Offset");
    pub const SIZE: PropertyType = PropertyType::builtin("Size");
    pub const POINT: PropertyType = PropertyType::builtin("Point");
    pub const EDGE_INSETS: PropertyType = PropertyType::builtin("EdgeInsets");
    pub const FONT: PropertyType = PropertyType::builtin("Font");
    pub const ENUM: PropertyType = PropertyType::builtin("Enum");
    pub const TRANSFORM: PropertyType = PropertyType::builtin("Transform");

    const fn builtin(name: &'static str) -> Self {
        PropertyType(Cow::Borrowed(name))
    }

    /// Create a property type with the given name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        PropertyType(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for PropertyType {
    fn from(name: &'static str) -> Self {
        PropertyType::new(name)
    }
}

//! Typed property values.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::geometry::{EdgeInsets, Offset, Point, Rect, Size, Transform};
use crate::property::color::Color;
use crate::property::font::Font;

/// A number that is absolute, relative to a reference value, or automatic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RelativeNumber {
    Absolute(f64),
    /// Percentage, e.g. `50%` is `Percent(50.0)`.
    Percent(f64),
    Auto,
}

impl RelativeNumber {
    /// Resolve against a reference value; `Auto` resolves to `None`.
    pub fn resolve(self, reference: f64) -> Option<f64> {
        match self {
            RelativeNumber::Absolute(v) => Some(v),
            RelativeNumber::Percent(p) => Some(reference * p / 100.0),
            RelativeNumber::Auto => None,
        }
    }
}

impl fmt::Display for RelativeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelativeNumber::Absolute(v) => write!(f, "{v}"),
            RelativeNumber::Percent(p) => write!(f, "{p}%"),
            RelativeNumber::Auto => write!(f, "auto"),
        }
    }
}

/// The result of parsing a raw property value.
#[derive(Debug, Clone)]
pub enum PropertyValue {
    String(String),
    Bool(bool),
    Number(f64),
    RelativeNumber(RelativeNumber),
    Color(Color),
    Rect(Rect),
    Offset(Offset),
    Size(Size),
    Point(Point),
    EdgeInsets(EdgeInsets),
    Font(Font),
    /// Normalized enum keyword text: keywords joined by single spaces.
    Enum(String),
    /// Enum keywords mapped to a host value.
    EnumValue(i64),
    Transform(Transform),
    /// Value produced by a host-registered parser.
    Custom(Arc<dyn Any + Send + Sync>),
}

impl PropertyValue {
    /// Typed access, e.g. `value.get::<Rect>()`.
    pub fn get<T: FromPropertyValue>(&self) -> Option<T> {
        T::from_property_value(self)
    }

    /// Borrow a custom value produced by a host parser.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            PropertyValue::Custom(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "String",
            PropertyValue::Bool(_) => "Bool",
            PropertyValue::Number(_) => "Number",
            PropertyValue::RelativeNumber(_) => "RelativeNumber",
            PropertyValue::Color(_) => "Color",
            PropertyValue::Rect(_) => "Rect",
            PropertyValue::Offset(_) => "Offset",
            PropertyValue::Size(_) => "Size",
            PropertyValue::Point(_) => "Point",
            PropertyValue::EdgeInsets(_) => "EdgeInsets",
            PropertyValue::Font(_) => "Font",
            PropertyValue::Enum(_) => "Enum",
            PropertyValue::EnumValue(_) => "EnumValue",
            PropertyValue::Transform(_) => "Transform",
            PropertyValue::Custom(_) => "Custom",
        }
    }
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        use PropertyValue::*;
        match (self, other) {
            (String(a), String(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Number(a), Number(b)) => a == b,
            (RelativeNumber(a), RelativeNumber(b)) => a == b,
            (Color(a), Color(b)) => a == b,
            (Rect(a), Rect(b)) => a == b,
            (Offset(a), Offset(b)) => a == b,
            (Size(a), Size(b)) => a == b,
            (Point(a), Point(b)) => a == b,
            (EdgeInsets(a), EdgeInsets(b)) => a == b,
            (Font(a), Font(b)) => a == b,
            (Enum(a), Enum(b)) => a == b,
            (EnumValue(a), EnumValue(b)) => a == b,
            (Transform(a), Transform(b)) => a == b,
            (Custom(a), Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Conversion from a [`PropertyValue`] to a concrete Rust type.
pub trait FromPropertyValue: Sized {
    fn from_property_value(value: &PropertyValue) -> Option<Self>;
}

macro_rules! from_property_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromPropertyValue for $ty {
                fn from_property_value(value: &PropertyValue) -> Option<Self> {
                    match value {
                        PropertyValue::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for PropertyValue {
                fn from(value: $ty) -> Self {
                    PropertyValue::$variant(value)
                }
            }
        )*
    };
}

from_property_value! {
    bool => Bool,
    RelativeNumber => RelativeNumber,
    Color => Color,
    Rect => Rect,
    Offset => Offset,
    Size => Size,
    Point => Point,
    EdgeInsets => EdgeInsets,
    Font => Font,
    Transform => Transform,
}

impl FromPropertyValue for f64 {
    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Number(v) => Some(*v),
            PropertyValue::RelativeNumber(RelativeNumber::Absolute(v)) => Some(*v),
            PropertyValue::EnumValue(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl FromPropertyValue for i64 {
    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::EnumValue(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromPropertyValue for String {
    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::String(s) | PropertyValue::Enum(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_access() {
        let value = PropertyValue::Rect(Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(value.get::<Rect>(), Some(Rect::new(1.0, 2.0, 3.0, 4.0)));
        assert_eq!(value.get::<Size>(), None);
        assert_eq!(value.kind(), "Rect");

        assert_eq!(PropertyValue::from(2.5).get::<f64>(), Some(2.5));
        assert_eq!(PropertyValue::Enum("a b".into()).get::<String>().as_deref(), Some("a b"));
        assert_eq!(PropertyValue::EnumValue(6).get::<i64>(), Some(6));
    }

    #[test]
    fn custom_values_compare_by_identity() {
        let shared: Arc<dyn Any + Send + Sync> = Arc::new(42u32);
        let a = PropertyValue::Custom(shared.clone());
        let b = PropertyValue::Custom(shared);
        let c = PropertyValue::Custom(Arc::new(42u32));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.downcast_ref::<u32>(), Some(&42));
        assert_eq!(a.downcast_ref::<i32>(), None);
    }

    #[test]
    fn relative_number_resolution() {
        assert_eq!(RelativeNumber::Percent(50.0).resolve(200.0), Some(100.0));
        assert_eq!(RelativeNumber::Absolute(12.0).resolve(200.0), Some(12.0));
        assert_eq!(RelativeNumber::Auto.resolve(200.0), None);
        assert_eq!(RelativeNumber::Percent(25.0).to_string(), "25%");
    }
}

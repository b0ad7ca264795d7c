//! Structured numeric parsers: Rect, Offset, Size, Point, EdgeInsets.
//!
//! Each accepts an optional function prefix with parenthesised components
//! (`rect(0, 0, 100, 44)`), a bare parenthesised list (`(1, 2)`) or bare
//! space/comma separated numbers (`10 20`). A quoted value is read in the
//! brace form understood by the geometry types' [`FromStr`] impls.
//!
//! | type       | prefix   | 1    | 2                     | 4                      |
//! |------------|----------|------|-----------------------|------------------------|
//! | Rect       | `rect`   | –    | –                     | x y width height       |
//! | Offset     | `offset` | both | horizontal vertical   | –                      |
//! | Size       | `size`   | both | width height          | –                      |
//! | Point      | `point`  | both | x y                   | –                      |
//! | EdgeInsets | `insets` | all  | top/bottom left/right | top left bottom right  |

use std::fmt::Display;
use std::str::FromStr;

use crate::error::ValueError;
use crate::geometry::{EdgeInsets, Offset, Point, Rect, Size};
use crate::property::syntax::{is_quoted, trim_quotes, TokenStream};
use crate::property::{PropertyType, PropertyValue};

fn parse_numeric<T>(
    property_type: &PropertyType,
    raw: &str,
    prefix: &str,
    build: fn(&[f64]) -> Option<T>,
) -> Result<T, ValueError>
where
    T: FromStr,
    T::Err: Display,
{
    if is_quoted(raw) {
        return trim_quotes(raw)
            .parse::<T>()
            .map_err(|e| ValueError::invalid(property_type, e.to_string()));
    }

    let mut stream = TokenStream::new(property_type, raw)?;
    let values = stream.numeric_parameters(prefix)?;
    stream.finish()?;
    build(&values).ok_or_else(|| {
        stream.invalid(format!("unsupported number of components: {}", values.len()))
    })
}

pub fn parse_rect(property_type: &PropertyType, raw: &str) -> Result<PropertyValue, ValueError> {
    parse_numeric(property_type, raw, "rect", Rect::from_components).map(PropertyValue::Rect)
}

pub fn parse_offset(property_type: &PropertyType, raw: &str) -> Result<PropertyValue, ValueError> {
    parse_numeric(property_type, raw, "offset", Offset::from_components).map(PropertyValue::Offset)
}

pub fn parse_size(property_type: &PropertyType, raw: &str) -> Result<PropertyValue, ValueError> {
    parse_numeric(property_type, raw, "size", Size::from_components).map(PropertyValue::Size)
}

pub fn parse_point(property_type: &PropertyType, raw: &str) -> Result<PropertyValue, ValueError> {
    parse_numeric(property_type, raw, "point", Point::from_components).map(PropertyValue::Point)
}

pub fn parse_edge_insets(
    property_type: &PropertyType,
    raw: &str,
) -> Result<PropertyValue, ValueError> {
    parse_numeric(property_type, raw, "insets", EdgeInsets::from_components)
        .map(PropertyValue::EdgeInsets)
}

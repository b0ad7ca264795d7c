//! Registry mapping property types to value parsers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ValueError;
use crate::property::binding::Property;
use crate::property::{basic, color, enums, font::FontParser, geometry, transform};
use crate::property::{PropertyType, PropertyValue};

/// Turns raw property text into a typed value.
///
/// Implemented for any `Fn(&PropertyType, &str) -> Result<PropertyValue, ValueError>`
/// so simple parsers can be registered as closures.
pub trait ValueParser: Send + Sync {
    fn parse(&self, property_type: &PropertyType, raw: &str) -> Result<PropertyValue, ValueError>;
}

impl<F> ValueParser for F
where
    F: Fn(&PropertyType, &str) -> Result<PropertyValue, ValueError> + Send + Sync,
{
    fn parse(&self, property_type: &PropertyType, raw: &str) -> Result<PropertyValue, ValueError> {
        self(property_type, raw)
    }
}

/// Property type → parser table.
///
/// Populated at setup and read-mostly afterwards; parsing takes `&self` and
/// never mutates the registry, so a populated registry can be shared behind
/// an `Arc`.
#[derive(Clone, Default)]
pub struct PropertyParserRegistry {
    parsers: HashMap<PropertyType, Arc<dyn ValueParser>>,
}

impl fmt::Debug for PropertyParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&PropertyType> = self.parsers.keys().collect();
        types.sort();
        f.debug_struct("PropertyParserRegistry").field("types", &types).finish()
    }
}

impl PropertyParserRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in parser registered.
    pub fn with_defaults() -> Self {
        Self::with_font_parser(FontParser::default())
    }

    /// Built-in parsers, using `font_parser` for [`PropertyType::FONT`].
    pub fn with_font_parser(font_parser: FontParser) -> Self {
        let mut registry = Self::new();
        let builtins: [(PropertyType, Arc<dyn ValueParser>); 13] = [
            (PropertyType::STRING, Arc::new(basic::parse_string)),
            (PropertyType::BOOL, Arc::new(basic::parse_bool)),
            (PropertyType::NUMBER, Arc::new(basic::parse_number)),
            (PropertyType::RELATIVE_NUMBER, Arc::new(basic::parse_relative_number)),
            (PropertyType::COLOR, Arc::new(color::parse_color)),
            (PropertyType::RECT, Arc::new(geometry::parse_rect)),
            (PropertyType::OFFSET, Arc::new(geometry::parse_offset)),
            (PropertyType::SIZE, Arc::new(geometry::parse_size)),
            (PropertyType::POINT, Arc::new(geometry::parse_point)),
            (PropertyType::EDGE_INSETS, Arc::new(geometry::parse_edge_insets)),
            (PropertyType::FONT, Arc::new(font_parser)),
            (PropertyType::ENUM, Arc::new(enums::parse_enum)),
            (PropertyType::TRANSFORM, Arc::new(transform::parse_transform)),
        ];
        for (property_type, parser) in builtins {
            registry.parsers.insert(property_type, parser);
        }
        registry
    }

    /// Associate `parser` with `property_type`, replacing and returning any
    /// previously registered parser.
    pub fn register(
        &mut self,
        property_type: PropertyType,
        parser: impl ValueParser + 'static,
    ) -> Option<Arc<dyn ValueParser>> {
        log::debug!("registering value parser for {property_type}");
        self.parsers.insert(property_type, Arc::new(parser))
    }

    /// Like [`register`](Self::register), but fails if a parser is already
    /// registered for `property_type`.
    pub fn try_register(
        &mut self,
        property_type: PropertyType,
        parser: impl ValueParser + 'static,
    ) -> Result<(), ValueError> {
        if self.parsers.contains_key(&property_type) {
            return Err(ValueError::DuplicateType(property_type));
        }
        self.parsers.insert(property_type, Arc::new(parser));
        Ok(())
    }

    pub fn contains(&self, property_type: &PropertyType) -> bool {
        self.parsers.contains_key(property_type)
    }

    /// Registered types, sorted by name.
    pub fn types(&self) -> Vec<&PropertyType> {
        let mut types: Vec<&PropertyType> = self.parsers.keys().collect();
        types.sort();
        types
    }

    /// Parse `raw` as a value of `property_type`.
    pub fn parse(&self, property_type: &PropertyType, raw: &str) -> Result<PropertyValue, ValueError> {
        let parser = self
            .parsers
            .get(property_type)
            .ok_or_else(|| ValueError::UnknownType(property_type.clone()))?;
        parser.parse(property_type, raw)
    }

    /// Check that every property's type has a parser.
    ///
    /// Returns one [`ValueError::UnknownType`] per offending property.
    pub fn validate<'p>(
        &self,
        properties: impl IntoIterator<Item = &'p Property>,
    ) -> Result<(), Vec<ValueError>> {
        let errors: Vec<ValueError> = properties
            .into_iter()
            .filter(|p| !self.contains(p.property_type()))
            .map(|p| {
                log::warn!("property {} has unregistered type {}", p.name(), p.property_type());
                ValueError::UnknownType(p.property_type().clone())
            })
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{EdgeInsets, Rect};
    use pretty_assertions::assert_eq;

    fn gradient_parser(ty: &PropertyType, raw: &str) -> Result<PropertyValue, ValueError> {
        match raw.trim() {
            "" => Err(ValueError::invalid(ty, "empty gradient")),
            other => Ok(PropertyValue::String(format!("gradient:{other}"))),
        }
    }

    // ── Registration ─────────────────────────────────────────────────

    #[test]
    fn defaults_cover_builtin_types() {
        let registry = PropertyParserRegistry::with_defaults();
        let names: Vec<&str> = registry.types().iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec![
                "Bool", "Color", "EdgeInsets", "Enum", "Font", "Number", "Offset", "Point",
                "Rect", "RelativeNumber", "Size", "String", "Transform",
            ]
        );
    }

    #[test]
    fn register_overwrites_and_returns_previous() {
        let mut registry = PropertyParserRegistry::new();
        let ty = PropertyType::new("Gradient");
        assert!(registry.register(ty.clone(), gradient_parser).is_none());
        let previous = registry.register(ty.clone(), |_: &PropertyType, _: &str| {
            Ok(PropertyValue::Bool(true))
        });
        assert!(previous.is_some());
        assert_eq!(registry.parse(&ty, "x").unwrap(), PropertyValue::Bool(true));
    }

    #[test]
    fn try_register_rejects_duplicates() {
        let mut registry = PropertyParserRegistry::with_defaults();
        let err = registry.try_register(PropertyType::RECT, gradient_parser).unwrap_err();
        assert_eq!(err, ValueError::DuplicateType(PropertyType::RECT));
        assert!(registry.try_register(PropertyType::new("Gradient"), gradient_parser).is_ok());
    }

    // ── Parsing ──────────────────────────────────────────────────────

    #[test]
    fn parse_unknown_type() {
        let registry = PropertyParserRegistry::with_defaults();
        let err = registry.parse(&PropertyType::new("Gradient"), "x").unwrap_err();
        assert_eq!(err, ValueError::UnknownType(PropertyType::new("Gradient")));
    }

    #[test]
    fn parse_dispatches_by_type() {
        let registry = PropertyParserRegistry::with_defaults();
        assert_eq!(
            registry.parse(&PropertyType::RECT, "rect(1, 2, 3, 4)").unwrap(),
            PropertyValue::Rect(Rect::new(1.0, 2.0, 3.0, 4.0))
        );
        assert_eq!(
            registry.parse(&PropertyType::EDGE_INSETS, "5").unwrap(),
            PropertyValue::EdgeInsets(EdgeInsets::all(5.0))
        );
    }

    #[test]
    fn custom_parser_errors_pass_through() {
        let mut registry = PropertyParserRegistry::new();
        let ty = PropertyType::new("Gradient");
        registry.register(ty.clone(), gradient_parser);
        assert_eq!(
            registry.parse(&ty, " linear ").unwrap(),
            PropertyValue::String("gradient:linear".into())
        );
        assert!(matches!(registry.parse(&ty, "  "), Err(ValueError::Invalid { .. })));
    }

    // ── Validation ───────────────────────────────────────────────────

    #[test]
    fn validate_reports_each_missing_type() {
        let registry = PropertyParserRegistry::with_defaults();
        let properties = vec![
            Property::new("frame", PropertyType::RECT, "View"),
            Property::new("background", PropertyType::new("Gradient"), "View"),
            Property::new("mask", PropertyType::new("Mask"), "View"),
        ];
        let errors = registry.validate(&properties).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValueError::UnknownType(PropertyType::new("Gradient")),
                ValueError::UnknownType(PropertyType::new("Mask")),
            ]
        );
        assert!(registry.validate(&properties[..1]).is_ok());
    }
}

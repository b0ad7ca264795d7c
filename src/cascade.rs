//! The cascade facade: stylesheets, variables and typed parsing behind one
//! owner.

use std::any::Any;

use crate::css::parser::parse_selector;
use crate::error::ValueError;
use crate::property::{Property, PropertyParserRegistry, PropertyType, PropertyValue};
use crate::stylesheet::{StyleSheetRepository, StyleSheetScope};
use crate::variables::VariableRepository;

/// Resolves declared property text into typed values and applies them.
///
/// Owns one [`StyleSheetRepository`], one [`VariableRepository`] and one
/// [`PropertyParserRegistry`].
#[derive(Debug)]
pub struct StyleManager {
    stylesheets: StyleSheetRepository,
    variables: VariableRepository,
    registry: PropertyParserRegistry,
}

impl Default for StyleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleManager {
    /// A manager with a default repository and every built-in value parser.
    pub fn new() -> Self {
        Self::with_repository(StyleSheetRepository::new())
    }

    pub fn with_repository(stylesheets: StyleSheetRepository) -> Self {
        Self {
            stylesheets,
            variables: VariableRepository::new(),
            registry: PropertyParserRegistry::with_defaults(),
        }
    }

    /// Replace the parser registry (builder).
    pub fn with_registry(mut self, registry: PropertyParserRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn stylesheets(&self) -> &StyleSheetRepository {
        &self.stylesheets
    }

    pub fn stylesheets_mut(&mut self) -> &mut StyleSheetRepository {
        &mut self.stylesheets
    }

    pub fn variables(&self) -> &VariableRepository {
        &self.variables
    }

    pub fn registry(&self) -> &PropertyParserRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PropertyParserRegistry {
        &mut self.registry
    }

    // -- Variables ----------------------------------------------------------

    /// Raw value of a variable.
    pub fn variable_value(&self, name: &str, scope: &StyleSheetScope) -> Option<&str> {
        self.variables.value_of(name, scope, &self.stylesheets)
    }

    /// Override a variable for every scope.
    pub fn set_variable(&mut self, name: &str, value: impl Into<String>) {
        self.variables.set_override(name, value);
    }

    pub fn expand(&self, raw: &str, scope: &StyleSheetScope) -> (String, bool) {
        self.variables.expand(raw, scope, &self.stylesheets)
    }

    /// A variable parsed as `property_type`; `None` if missing or invalid.
    pub fn resolve_variable(
        &self,
        name: &str,
        property_type: &PropertyType,
        scope: &StyleSheetScope,
    ) -> Option<PropertyValue> {
        self.variables
            .resolve_typed(name, property_type, scope, &self.stylesheets, &self.registry)
    }

    // -- Values -------------------------------------------------------------

    /// Expand variable references in `raw`, then parse it.
    pub fn parse_value(
        &self,
        property_type: &PropertyType,
        raw: &str,
        scope: &StyleSheetScope,
    ) -> Result<PropertyValue, ValueError> {
        let (expanded, _) = self.expand(raw, scope);
        self.registry.parse(property_type, &expanded)
    }

    /// Raw text declared for `property` under `selector`.
    ///
    /// Later stylesheets win, and within a sheet later rules and later
    /// declarations win. The selector must match a rule's selector exactly.
    pub fn declared_value(
        &self,
        selector: &str,
        property: &str,
        scope: &StyleSheetScope,
    ) -> Option<&str> {
        let selector = match parse_selector(selector) {
            Ok(selector) => selector,
            Err(err) => {
                log::debug!("invalid selector '{selector}': {err}");
                return None;
            }
        };
        self.stylesheets
            .active_stylesheets(scope)
            .into_iter()
            .rev()
            .flat_map(|sheet| sheet.content().rulesets.iter().rev())
            .filter(|rule| rule.has_selector(&selector))
            .find_map(|rule| rule.declaration(property))
            .map(|declaration| declaration.value.as_str())
    }

    /// The typed value declared for `property` under `selector`.
    ///
    /// `Ok(None)` if nothing is declared.
    pub fn resolve_property(
        &self,
        selector: &str,
        property: &Property,
        scope: &StyleSheetScope,
    ) -> Result<Option<PropertyValue>, ValueError> {
        let Some(raw) = self.declared_value(selector, property.name(), scope) else {
            return Ok(None);
        };
        let value = self.parse_value(property.property_type(), raw, scope)?;
        Ok(Some(property.map_enum(value)))
    }

    /// Parse `raw` and apply it to `target` through `property`'s setter.
    ///
    /// Returns whether the setter applied the value.
    pub fn apply(
        &self,
        property: &Property,
        target: &mut dyn Any,
        raw: &str,
        params: &[&str],
        scope: &StyleSheetScope,
    ) -> Result<bool, ValueError> {
        let value = property.map_enum(self.parse_value(property.property_type(), raw, scope)?);
        let params = property.transform_parameters(params);
        Ok(property.set_value(target, &value, &params))
    }

    /// Apply the value declared under `selector`, if any.
    pub fn apply_declared(
        &self,
        selector: &str,
        property: &Property,
        target: &mut dyn Any,
        scope: &StyleSheetScope,
    ) -> Result<bool, ValueError> {
        match self.resolve_property(selector, property, scope)? {
            Some(value) => Ok(property.set_value(target, &value, &[])),
            None => Ok(false),
        }
    }
}

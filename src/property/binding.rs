//! Property bindings: a property type bound to a named attribute of a host
//! object, with the setter that applies parsed values.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::property::enums::EnumMapping;
use crate::property::value::FromPropertyValue;
use crate::property::{PropertyType, PropertyValue};

/// A transformed setter parameter, e.g. the `highlighted` in
/// `title(highlighted): ...`.
pub type ParameterValue = PropertyValue;

/// Converts raw parameter text into a [`ParameterValue`].
pub type ParameterTransformer = Arc<dyn Fn(&str) -> ParameterValue + Send + Sync>;

/// Applies a value to a target object; returns `false` if nothing was set.
pub type PropertySetter =
    Arc<dyn Fn(&Property, &mut dyn Any, &PropertyValue, &[ParameterValue]) -> bool + Send + Sync>;

/// A settable, typed attribute of a host object.
#[derive(Clone)]
pub struct Property {
    name: String,
    property_type: PropertyType,
    target: &'static str,
    target_type: Option<TypeId>,
    setter: Option<PropertySetter>,
    parameter_transformers: Vec<ParameterTransformer>,
    enum_mapping: Option<Arc<dyn EnumMapping>>,
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("property_type", &self.property_type)
            .field("target", &self.target)
            .field("has_setter", &self.setter.is_some())
            .field("parameters", &self.parameter_transformers.len())
            .field("has_enum_mapping", &self.enum_mapping.is_some())
            .finish()
    }
}

impl Property {
    /// A property on the class named `target`, without a setter.
    pub fn new(name: impl Into<String>, property_type: PropertyType, target: &'static str) -> Self {
        Self {
            name: name.into(),
            property_type,
            target,
            target_type: None,
            setter: None,
            parameter_transformers: Vec::new(),
            enum_mapping: None,
        }
    }

    /// A property on `T` whose setter receives values converted to `V`.
    ///
    /// The setter is skipped (and [`set_value`](Self::set_value) returns
    /// `false`) when the target is not a `T` or the value is not a `V`.
    pub fn typed<T, V>(
        name: impl Into<String>,
        property_type: PropertyType,
        setter: impl Fn(&mut T, V, &[ParameterValue]) + Send + Sync + 'static,
    ) -> Self
    where
        T: Any,
        V: FromPropertyValue,
    {
        let full = type_name::<T>();
        let short = full.rsplit("::").next().unwrap_or(full);
        let mut property = Self::new(name, property_type, short);
        property.target_type = Some(TypeId::of::<T>());
        property.setter = Some(Arc::new(
            move |_: &Property, target: &mut dyn Any, value: &PropertyValue, params: &[ParameterValue]| {
                match (target.downcast_mut::<T>(), V::from_property_value(value)) {
                    (Some(target), Some(value)) => {
                        setter(target, value, params);
                        true
                    }
                    _ => false,
                }
            },
        ));
        property
    }

    pub fn with_setter(
        mut self,
        setter: impl Fn(&Property, &mut dyn Any, &PropertyValue, &[ParameterValue]) -> bool
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.setter = Some(Arc::new(setter));
        self
    }

    pub fn with_enum_mapping(mut self, mapping: impl EnumMapping + 'static) -> Self {
        self.enum_mapping = Some(Arc::new(mapping));
        self
    }

    pub fn with_parameter_transformer(
        mut self,
        transformer: impl Fn(&str) -> ParameterValue + Send + Sync + 'static,
    ) -> Self {
        self.parameter_transformers.push(Arc::new(transformer));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercase name with dashes removed: `content-insets` and
    /// `contentInsets` both normalize to `contentinsets`.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn property_type(&self) -> &PropertyType {
        &self.property_type
    }

    /// Class name of the target.
    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn enum_mapping(&self) -> Option<&dyn EnumMapping> {
        self.enum_mapping.as_deref()
    }

    /// Returns `true` if `name` refers to this property (dash and case
    /// insensitive).
    pub fn matches_name(&self, name: &str) -> bool {
        normalize_name(name) == self.normalized_name()
    }

    /// Run each parameter through its transformer; parameters without one are
    /// passed on as [`PropertyValue::String`].
    pub fn transform_parameters(&self, raw: &[&str]) -> Vec<ParameterValue> {
        raw.iter()
            .enumerate()
            .map(|(i, param)| match self.parameter_transformers.get(i) {
                Some(transform) => transform(param),
                None => PropertyValue::String(param.to_string()),
            })
            .collect()
    }

    /// Map enum keyword text through this property's enum mapping, if any.
    pub fn map_enum(&self, value: PropertyValue) -> PropertyValue {
        match (&self.enum_mapping, value) {
            (Some(mapping), PropertyValue::Enum(keywords)) => {
                PropertyValue::EnumValue(mapping.value_for(&keywords))
            }
            (_, value) => value,
        }
    }

    /// Apply `value` to `target`; `false` if there is no setter, the target
    /// has the wrong type, or the setter declined.
    pub fn set_value(
        &self,
        target: &mut dyn Any,
        value: &PropertyValue,
        params: &[ParameterValue],
    ) -> bool {
        if let Some(expected) = self.target_type {
            if (*target).type_id() != expected {
                log::debug!("property {} does not apply to this target", self.name);
                return false;
            }
        }
        match &self.setter {
            Some(setter) => setter(self, target, value, params),
            None => false,
        }
    }
}

/// Lowercase with dashes removed.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::EdgeInsets;
    use crate::property::enums::{EnumMapping, EnumValueMapping};

    #[derive(Debug, Default)]
    struct Label {
        insets: EdgeInsets,
        alignment: i64,
        titles: Vec<(String, i64)>,
    }

    struct Button;

    fn insets_property() -> Property {
        Property::typed("content-insets", PropertyType::EDGE_INSETS, |label: &mut Label, v: EdgeInsets, _| {
            label.insets = v;
        })
    }

    #[test]
    fn typed_property_metadata() {
        let property = insets_property();
        assert_eq!(property.name(), "content-insets");
        assert_eq!(property.normalized_name(), "contentinsets");
        assert_eq!(property.target(), "Label");
        assert!(property.matches_name("contentInsets"));
        assert!(!property.matches_name("insets"));
    }

    #[test]
    fn typed_setter_applies_matching_value() {
        let property = insets_property();
        let mut label = Label::default();
        let applied = property.set_value(
            &mut label,
            &PropertyValue::EdgeInsets(EdgeInsets::all(4.0)),
            &[],
        );
        assert!(applied);
        assert_eq!(label.insets, EdgeInsets::all(4.0));
    }

    #[test]
    fn typed_setter_rejects_wrong_target_or_value() {
        let property = insets_property();
        let mut button = Button;
        assert!(!property.set_value(&mut button, &PropertyValue::EdgeInsets(EdgeInsets::ZERO), &[]));

        let mut label = Label::default();
        assert!(!property.set_value(&mut label, &PropertyValue::Number(1.0), &[]));
    }

    #[test]
    fn untyped_property_without_setter() {
        let property = Property::new("alpha", PropertyType::NUMBER, "View");
        let mut label = Label::default();
        assert!(!property.set_value(&mut label, &PropertyValue::Number(1.0), &[]));
    }

    #[test]
    fn enum_mapping_and_parameters() {
        let states = EnumValueMapping::new([("normal", 0), ("highlighted", 1)], 0);
        let property = Property::typed("title", PropertyType::STRING, |label: &mut Label, v: String, params| {
            let state = params.first().and_then(|p| p.get::<i64>()).unwrap_or(0);
            label.titles.push((v, state));
        })
        .with_parameter_transformer(move |raw| PropertyValue::EnumValue(states.value_for(raw)));

        let params = property.transform_parameters(&["highlighted", "extra"]);
        assert_eq!(
            params,
            vec![PropertyValue::EnumValue(1), PropertyValue::String("extra".into())]
        );

        let mut label = Label::default();
        assert!(property.set_value(&mut label, &PropertyValue::String("OK".into()), &params));
        assert_eq!(label.titles, vec![("OK".to_string(), 1)]);
    }

    #[test]
    fn map_enum_uses_mapping() {
        let property = Property::typed("alignment", PropertyType::ENUM, |label: &mut Label, v: i64, _| {
            label.alignment = v;
        })
        .with_enum_mapping(EnumValueMapping::new([("left", 0), ("center", 1)], 0));

        let mapped = property.map_enum(PropertyValue::Enum("center".into()));
        assert_eq!(mapped, PropertyValue::EnumValue(1));
        assert_eq!(property.map_enum(PropertyValue::Number(2.0)), PropertyValue::Number(2.0));

        let mut label = Label::default();
        assert!(property.set_value(&mut label, &mapped, &[]));
        assert_eq!(label.alignment, 1);
    }

    #[test]
    fn raw_setter_sees_property() {
        let property = Property::new("tag", PropertyType::NUMBER, "Label").with_setter(
            |property, target, value, _| {
                let Some(label) = target.downcast_mut::<Label>() else {
                    return false;
                };
                label.titles.push((property.name().to_string(), value.get::<f64>().unwrap_or(0.0) as i64));
                true
            },
        );
        let mut label = Label::default();
        assert!(property.set_value(&mut label, &PropertyValue::Number(7.0), &[]));
        assert_eq!(label.titles, vec![("tag".to_string(), 7)]);
    }
}

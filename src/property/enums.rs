//! Enum keyword values and keyword → host value mappings.

use std::collections::HashMap;

use crate::error::ValueError;
use crate::property::{PropertyType, PropertyValue};

/// Split `raw` on commas, whitespace and pipes outside of quotes.
///
/// Quoted keywords keep their inner text, without the quotes.
fn split_keywords(raw: &str) -> Result<Vec<String>, &'static str> {
    let mut keywords = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in raw.chars() {
        match (quote, c) {
            (Some(q), _) if q == c => {
                quote = None;
                keywords.push(std::mem::take(&mut current));
            }
            (Some(_), _) => current.push(c),
            (None, '"' | '\'') => {
                if !current.is_empty() {
                    keywords.push(std::mem::take(&mut current));
                }
                quote = Some(c);
            }
            (None, ',' | '|') => {
                if !current.is_empty() {
                    keywords.push(std::mem::take(&mut current));
                }
            }
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() {
                    keywords.push(std::mem::take(&mut current));
                }
            }
            (None, c) => current.push(c),
        }
    }

    if quote.is_some() {
        return Err("unterminated quoted keyword");
    }
    if !current.is_empty() {
        keywords.push(current);
    }
    keywords.retain(|k| !k.trim().is_empty());
    Ok(keywords)
}

/// Enum keywords separated by commas, whitespace or pipes, normalized to a
/// single-space separated string: `top | left, "right"` becomes `top left right`.
pub fn parse_enum(property_type: &PropertyType, raw: &str) -> Result<PropertyValue, ValueError> {
    let keywords = split_keywords(raw).map_err(|m| ValueError::invalid(property_type, m))?;
    if keywords.is_empty() {
        return Err(ValueError::invalid(property_type, "expected at least one keyword"));
    }
    Ok(PropertyValue::Enum(keywords.join(" ")))
}

/// Maps enum keyword text to a host value.
pub trait EnumMapping: Send + Sync {
    /// The value for `keywords`; never fails, unknown input maps to the
    /// mapping's default.
    fn value_for(&self, keywords: &str) -> i64;
}

/// Case-insensitive keyword → value table.
///
/// Keywords may also carry the mapping's base name as a prefix, so with base
/// name `TextAlignment` both `center` and `TextAlignmentCenter` resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueMapping {
    values: HashMap<String, i64>,
    base_name: Option<String>,
    default: i64,
}

impl EnumValueMapping {
    pub fn new<K: AsRef<str>>(values: impl IntoIterator<Item = (K, i64)>, default: i64) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_lowercase(), v))
                .collect(),
            base_name: None,
            default,
        }
    }

    pub fn with_base_name(mut self, base_name: &str) -> Self {
        self.base_name = Some(base_name.to_lowercase());
        self
    }

    pub fn default_value(&self) -> i64 {
        self.default
    }

    /// The value for a single keyword, if known.
    pub fn lookup(&self, keyword: &str) -> Option<i64> {
        let keyword = keyword.trim().to_lowercase();
        self.values.get(&keyword).copied().or_else(|| {
            let base = self.base_name.as_deref()?;
            let stripped = keyword.strip_prefix(base)?;
            self.values.get(stripped).copied()
        })
    }
}

impl EnumMapping for EnumValueMapping {
    fn value_for(&self, keywords: &str) -> i64 {
        self.lookup(keywords).unwrap_or(self.default)
    }
}

/// Bit mask mapping: the union of every keyword's value.
///
/// Keywords are separated by spaces, pipes or dashes. A result of zero maps to
/// the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMaskEnumValueMapping {
    inner: EnumValueMapping,
}

impl BitMaskEnumValueMapping {
    pub fn new<K: AsRef<str>>(values: impl IntoIterator<Item = (K, i64)>, default: i64) -> Self {
        Self {
            inner: EnumValueMapping::new(values, default),
        }
    }

    pub fn with_base_name(self, base_name: &str) -> Self {
        Self {
            inner: self.inner.with_base_name(base_name),
        }
    }
}

impl EnumMapping for BitMaskEnumValueMapping {
    fn value_for(&self, keywords: &str) -> i64 {
        let mask = keywords
            .split([' ', '|', '-'])
            .filter(|k| !k.is_empty())
            .fold(0, |mask, k| mask | self.inner.value_for(k));
        if mask == 0 {
            self.inner.default
        } else {
            mask
        }
    }
}

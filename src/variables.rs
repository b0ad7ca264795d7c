//! Variable lookup and reference expansion.
//!
//! Stylesheets define variables as `@name: value;` or `--name: value;` and
//! refer to them with `@name` or `--name` inside other values. Lookups try
//! runtime overrides first, then the active stylesheets in scope from the
//! most recently added to the oldest.

use std::collections::HashMap;

use crate::property::syntax::trim_quotes;
use crate::property::{PropertyParserRegistry, PropertyType, PropertyValue};
use crate::stylesheet::{StyleSheet, StyleSheetRepository, StyleSheetScope};

/// Maximum nesting of variable references within one expansion.
pub const MAX_EXPANSION_DEPTH: usize = 32;

/// Runtime variable overrides plus lookup and expansion over stylesheets.
#[derive(Debug, Clone, Default)]
pub struct VariableRepository {
    overrides: HashMap<String, String>,
}

impl VariableRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a runtime value that shadows every stylesheet definition.
    ///
    /// `name` may carry a `@` or `--` prefix.
    pub fn set_override(&mut self, name: &str, value: impl Into<String>) {
        self.overrides.insert(bare_name(name).to_string(), value.into());
    }

    pub fn remove_override(&mut self, name: &str) -> Option<String> {
        self.overrides.remove(bare_name(name))
    }

    pub fn overrides(&self) -> &HashMap<String, String> {
        &self.overrides
    }

    /// Raw value of `name`, without expanding nested references.
    pub fn value_of<'a>(
        &'a self,
        name: &str,
        scope: &StyleSheetScope,
        stylesheets: &'a StyleSheetRepository,
    ) -> Option<&'a str> {
        self.lookup(bare_name(name), &stylesheets.active_stylesheets(scope))
    }

    /// Replace every resolvable reference in `raw`.
    ///
    /// Returns the expanded text and whether anything was substituted.
    /// Unresolvable references are left as they are.
    pub fn expand(
        &self,
        raw: &str,
        scope: &StyleSheetScope,
        stylesheets: &StyleSheetRepository,
    ) -> (String, bool) {
        self.expand_with(raw, &stylesheets.active_stylesheets(scope))
    }

    /// [`expand`](Self::expand) over an explicit list of stylesheets, oldest
    /// first.
    pub fn expand_with(&self, raw: &str, sheets: &[&StyleSheet]) -> (String, bool) {
        let mut expanding = Vec::new();
        self.expand_nested(raw, sheets, &mut expanding)
    }

    /// Look up, expand and parse `name` as a `property_type` value.
    pub fn resolve_typed(
        &self,
        name: &str,
        property_type: &PropertyType,
        scope: &StyleSheetScope,
        stylesheets: &StyleSheetRepository,
        registry: &PropertyParserRegistry,
    ) -> Option<PropertyValue> {
        let sheets = stylesheets.active_stylesheets(scope);
        let raw = self.lookup(bare_name(name), &sheets)?;
        let (expanded, _) = self.expand_with(raw, &sheets);
        registry
            .parse(property_type, trim_quotes(&expanded))
            .inspect_err(|err| log::debug!("variable {name}: {err}"))
            .ok()
    }

    fn lookup<'a>(&'a self, name: &str, sheets: &[&'a StyleSheet]) -> Option<&'a str> {
        if let Some(value) = self.overrides.get(name) {
            return Some(value.as_str());
        }
        sheets.iter().rev().find_map(|&sheet| sheet.variable(name))
    }

    fn expand_nested(
        &self,
        raw: &str,
        sheets: &[&StyleSheet],
        expanding: &mut Vec<String>,
    ) -> (String, bool) {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        let mut substituted = false;

        while let Some((start, prefix)) = next_reference(rest) {
            let name_start = start + prefix;
            let name_end = rest[name_start..]
                .find(|c: char| !is_name_char(c))
                .map_or(rest.len(), |i| name_start + i);
            let name = &rest[name_start..name_end];
            out.push_str(&rest[..start]);

            match self.resolve_nested(name, sheets, expanding) {
                Some(value) => {
                    out.push_str(&value);
                    substituted = true;
                }
                None => out.push_str(&rest[start..name_end]),
            }
            rest = &rest[name_end..];
        }
        out.push_str(rest);
        (out, substituted)
    }

    fn resolve_nested(
        &self,
        name: &str,
        sheets: &[&StyleSheet],
        expanding: &mut Vec<String>,
    ) -> Option<String> {
        if expanding.iter().any(|n| n == name) {
            log::warn!("variable {name} refers to itself");
            return None;
        }
        if expanding.len() >= MAX_EXPANSION_DEPTH {
            log::warn!("variable {name} nested deeper than {MAX_EXPANSION_DEPTH} levels");
            return None;
        }
        let Some(value) = self.lookup(name, sheets) else {
            log::debug!("unresolved variable {name}");
            return None;
        };

        expanding.push(name.to_string());
        let (expanded, _) = self.expand_nested(trim_quotes(value), sheets, expanding);
        expanding.pop();
        Some(expanded)
    }
}

fn bare_name(name: &str) -> &str {
    name.strip_prefix("--")
        .or_else(|| name.strip_prefix('@'))
        .unwrap_or(name)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Byte offset and prefix length of the first `@name` or `--name` reference.
fn next_reference(text: &str) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    (0..bytes.len()).find_map(|i| {
        let prefix = match bytes[i] {
            b'@' => 1,
            b'-' if bytes.get(i + 1) == Some(&b'-') => 2,
            _ => return None,
        };
        text[i + prefix..]
            .chars()
            .next()
            .filter(|c| c.is_alphanumeric() || *c == '_')
            .map(|_| (i, prefix))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::model::StyleSheetContent;
    use crate::geometry::EdgeInsets;
    use pretty_assertions::assert_eq;

    fn sheet(url: &str, variables: &[(&str, &str)]) -> StyleSheet {
        let content = variables
            .iter()
            .fold(StyleSheetContent::new(), |c, (k, v)| c.with_variable(*k, *v));
        StyleSheet::new(url, content)
    }

    fn repository(sheets: Vec<StyleSheet>) -> StyleSheetRepository {
        let mut repo = StyleSheetRepository::new().without_monitor();
        for sheet in sheets {
            repo.register(sheet);
        }
        repo
    }

    // ── Lookup ───────────────────────────────────────────────────────

    #[test]
    fn later_sheet_wins() {
        let repo = repository(vec![
            sheet("mem://a.css", &[("x", "1"), ("only-a", "a")]),
            sheet("mem://b.css", &[("x", "2")]),
        ]);
        let vars = VariableRepository::new();
        let all = StyleSheetScope::all();
        assert_eq!(vars.value_of("x", &all, &repo), Some("2"));
        assert_eq!(vars.value_of("--x", &all, &repo), Some("2"));
        assert_eq!(vars.value_of("@only-a", &all, &repo), Some("a"));
        assert_eq!(vars.value_of("missing", &all, &repo), None);
    }

    #[test]
    fn scope_limits_lookup() {
        let repo = repository(vec![
            sheet("mem://a.css", &[("x", "1")]),
            sheet("mem://b.css", &[("x", "2")]).with_group("theme"),
        ]);
        let vars = VariableRepository::new();
        assert_eq!(vars.value_of("x", &StyleSheetScope::default_group(), &repo), Some("1"));
        assert_eq!(vars.value_of("x", &StyleSheetScope::groups(["theme"]), &repo), Some("2"));
        assert_eq!(vars.value_of("x", &StyleSheetScope::names(["none.css"]), &repo), None);
    }

    #[test]
    fn override_shadows_every_scope() {
        let repo = repository(vec![sheet("mem://a.css", &[("x", "1")])]);
        let mut vars = VariableRepository::new();
        vars.set_override("--x", "9");
        for scope in [
            StyleSheetScope::all(),
            StyleSheetScope::default_group(),
            StyleSheetScope::names(["unknown"]),
        ] {
            assert_eq!(vars.value_of("x", &scope, &repo), Some("9"));
        }
        assert_eq!(vars.remove_override("@x"), Some("9".to_string()));
        assert_eq!(vars.value_of("x", &StyleSheetScope::all(), &repo), Some("1"));
        assert!(vars.overrides().is_empty());
    }

    // ── Expansion ────────────────────────────────────────────────────

    #[test]
    fn nested_expansion() {
        let repo = repository(vec![sheet("mem://a.css", &[("a", "@b"), ("b", "5")])]);
        let vars = VariableRepository::new();
        assert_eq!(
            vars.expand("@a", &StyleSheetScope::all(), &repo),
            ("5".to_string(), true)
        );
    }

    #[test]
    fn expand_with_explicit_sheets() {
        let a = sheet("mem://a.css", &[("x", "1")]);
        let b = sheet("mem://b.css", &[("x", "2")]);
        let vars = VariableRepository::new();
        assert_eq!(vars.expand_with("@x", &[&a, &b]), ("2".to_string(), true));
        assert_eq!(vars.expand_with("@x", &[&b, &a]), ("1".to_string(), true));
        assert_eq!(vars.expand_with("@x", &[]), ("@x".to_string(), false));
    }

    #[test]
    fn mixed_syntaxes_in_one_value() {
        let repo = repository(vec![sheet(
            "mem://a.css",
            &[("top", "1"), ("side", "2"), ("name", "\"Avenir\"")],
        )]);
        let vars = VariableRepository::new();
        let (text, changed) = vars.expand("@top --side @top, @name", &StyleSheetScope::all(), &repo);
        assert_eq!(text, "1 2 1, Avenir");
        assert!(changed);
    }

    #[test]
    fn unknown_references_pass_through() {
        let repo = repository(vec![sheet("mem://a.css", &[("x", "1")])]);
        let vars = VariableRepository::new();
        let all = StyleSheetScope::all();
        assert_eq!(
            vars.expand("10 --nope @x", &all, &repo),
            ("10 --nope 1".to_string(), true)
        );
        assert_eq!(vars.expand("plain -- @", &all, &repo), ("plain -- @".to_string(), false));
    }

    #[test]
    fn self_reference_terminates() {
        let repo = repository(vec![sheet("mem://a.css", &[("a", "@a")])]);
        let vars = VariableRepository::new();
        let (text, _) = vars.expand("@a", &StyleSheetScope::all(), &repo);
        assert_eq!(text, "@a");
    }

    #[test]
    fn mutual_reference_terminates() {
        let repo = repository(vec![sheet("mem://a.css", &[("a", "x @b"), ("b", "y @a")])]);
        let vars = VariableRepository::new();
        let (text, changed) = vars.expand("@a", &StyleSheetScope::all(), &repo);
        assert_eq!(text, "x y @a");
        assert!(changed);
    }

    #[test]
    fn scanning_resumes_after_inserted_text() {
        let repo = repository(vec![sheet("mem://a.css", &[("a", "--missing"), ("b", "2")])]);
        let vars = VariableRepository::new();
        let (text, changed) = vars.expand("@a @b", &StyleSheetScope::all(), &repo);
        assert_eq!(text, "--missing 2");
        assert!(changed);
    }

    #[test]
    fn depth_is_capped() {
        let variables: Vec<(String, String)> = (0..40)
            .map(|i| (format!("v{i}"), format!("@v{}", i + 1)))
            .collect();
        let content = variables
            .iter()
            .fold(StyleSheetContent::new(), |c, (k, v)| c.with_variable(k.as_str(), v.as_str()));
        let repo = repository(vec![StyleSheet::new("mem://deep.css", content)]);
        let vars = VariableRepository::new();
        let (text, changed) = vars.expand("@v0", &StyleSheetScope::all(), &repo);
        assert_eq!(text, format!("@v{MAX_EXPANSION_DEPTH}"));
        assert!(changed);
    }

    // ── Typed resolution ─────────────────────────────────────────────

    #[test]
    fn resolve_typed_values() {
        let repo = repository(vec![sheet(
            "mem://a.css",
            &[("pad", "@unit @unit"), ("unit", "4"), ("bad", "many words here")],
        )]);
        let vars = VariableRepository::new();
        let registry = PropertyParserRegistry::with_defaults();
        let all = StyleSheetScope::all();

        assert_eq!(
            vars.resolve_typed("pad", &PropertyType::EDGE_INSETS, &all, &repo, &registry),
            Some(PropertyValue::EdgeInsets(EdgeInsets::new(4.0, 4.0, 4.0, 4.0)))
        );
        assert_eq!(vars.resolve_typed("bad", &PropertyType::NUMBER, &all, &repo, &registry), None);
        assert_eq!(vars.resolve_typed("nope", &PropertyType::NUMBER, &all, &repo, &registry), None);
    }
}

//! Stylesheet content model: selectors, rule sets, raw declarations and the
//! per-sheet variable table.

use std::collections::HashMap;
use std::fmt;

/// A single CSS selector component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectorComponent {
    /// Type selector: matches an element type name (e.g. `Button`).
    Type(String),
    /// Universal selector: `*`.
    Universal,
    /// Class selector: `.classname`.
    Class(String),
    /// ID selector: `#id`.
    Id(String),
    /// Pseudo-class: `:highlighted`, `:disabled`, etc.
    PseudoClass(String),
}

impl fmt::Display for SelectorComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorComponent::Type(name) => write!(f, "{name}"),
            SelectorComponent::Universal => write!(f, "*"),
            SelectorComponent::Class(name) => write!(f, ".{name}"),
            SelectorComponent::Id(name) => write!(f, "#{name}"),
            SelectorComponent::PseudoClass(name) => write!(f, ":{name}"),
        }
    }
}

/// A combinator between selector components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Descendant combinator (whitespace): `A B`.
    Descendant,
    /// Child combinator: `A > B`.
    Child,
}

/// A single compound selector (sequence of components without combinators).
///
/// For example, `Button.primary:highlighted` is one `CompoundSelector` with
/// three components: `Type("Button")`, `Class("primary")`,
/// `PseudoClass("highlighted")`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

impl CompoundSelector {
    /// Create an empty compound selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a component to this compound selector.
    pub fn push(&mut self, component: SelectorComponent) {
        self.components.push(component);
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for component in &self.components {
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

/// One element in a selector chain: either a compound selector or a combinator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectorPart {
    Compound(CompoundSelector),
    Combinator(Combinator),
}

/// A full selector: chain of compound selectors joined by combinators.
///
/// Selectors are stored as data; nothing in this crate matches them against an
/// element tree. Equality is structural, so `A>B` and `A > B` compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Selector {
    /// Alternating compound selectors and combinators.
    /// Always starts and ends with a `SelectorPart::Compound`.
    pub parts: Vec<SelectorPart>,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                SelectorPart::Compound(compound) => write!(f, "{compound}")?,
                SelectorPart::Combinator(Combinator::Descendant) => write!(f, " ")?,
                SelectorPart::Combinator(Combinator::Child) => write!(f, " > ")?,
            }
        }
        Ok(())
    }
}

/// A single property declaration, e.g. `font: Helvetica 12pt`.
///
/// The value is kept as raw text: it may still contain variable references
/// and is only turned into a typed value on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// The property name, e.g. `"font"`, `"content-insets"`.
    pub property: String,
    /// The raw, trimmed value text.
    pub value: String,
}

impl Declaration {
    /// Create a new declaration.
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// A rule: one or more selectors paired with declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    /// The selectors for this rule (comma-separated in source).
    pub selectors: Vec<Selector>,
    /// The property declarations inside the `{ ... }` block, in source order.
    pub declarations: Vec<Declaration>,
}

impl RuleSet {
    /// Returns `true` if any of this rule's selectors equals `selector`.
    pub fn has_selector(&self, selector: &Selector) -> bool {
        self.selectors.iter().any(|s| s == selector)
    }

    /// The last declaration of `property` in this rule, if any.
    ///
    /// Property names compare ignoring case and dashes, so `content-insets`
    /// also finds `contentInsets`.
    pub fn declaration(&self, property: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .rev()
            .find(|d| same_property(&d.property, property))
    }
}

fn same_property(a: &str, b: &str) -> bool {
    let fold = |s: &str| {
        s.chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect::<String>()
    };
    fold(a) == fold(b)
}

/// Parsed content of one stylesheet: its rule sets and its variable table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheetContent {
    pub rulesets: Vec<RuleSet>,
    /// Variable definitions keyed by bare name (no `@` / `--` prefix).
    pub variables: HashMap<String, String>,
}

impl StyleSheetContent {
    /// Create empty content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variable definition.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Builder-style rule set.
    pub fn with_ruleset(mut self, ruleset: RuleSet) -> Self {
        self.rulesets.push(ruleset);
        self
    }

    /// Raw value of the variable `name`, if this sheet defines it.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Returns `true` if there are neither rules nor variables.
    pub fn is_empty(&self) -> bool {
        self.rulesets.is_empty() && self.variables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compound(components: Vec<SelectorComponent>) -> SelectorPart {
        SelectorPart::Compound(CompoundSelector { components })
    }

    #[test]
    fn test_compound_selector_push() {
        let mut cs = CompoundSelector::new();
        cs.push(SelectorComponent::Type("Button".into()));
        cs.push(SelectorComponent::Class("primary".into()));
        assert_eq!(cs.components.len(), 2);
        assert_eq!(cs.to_string(), "Button.primary");
    }

    #[test]
    fn test_selector_display() {
        let selector = Selector {
            parts: vec![
                compound(vec![SelectorComponent::Type("Container".into())]),
                SelectorPart::Combinator(Combinator::Child),
                compound(vec![
                    SelectorComponent::Type("Button".into()),
                    SelectorComponent::Id("ok".into()),
                    SelectorComponent::PseudoClass("highlighted".into()),
                ]),
                SelectorPart::Combinator(Combinator::Descendant),
                compound(vec![SelectorComponent::Universal]),
            ],
        };
        assert_eq!(selector.to_string(), "Container > Button#ok:highlighted *");
    }

    #[test]
    fn test_ruleset_last_declaration_wins() {
        let rule = RuleSet {
            selectors: vec![],
            declarations: vec![
                Declaration::new("alpha", "0.5"),
                Declaration::new("Alpha", "0.7"),
            ],
        };
        assert_eq!(rule.declaration("alpha").map(|d| d.value.as_str()), Some("0.7"));
        assert!(rule.declaration("beta").is_none());
    }

    #[test]
    fn test_declaration_ignores_dashes() {
        let rule = RuleSet {
            selectors: vec![],
            declarations: vec![Declaration::new("contentInsets", "4")],
        };
        assert_eq!(rule.declaration("content-insets").map(|d| d.value.as_str()), Some("4"));
    }

    #[test]
    fn test_ruleset_has_selector() {
        let sel = Selector {
            parts: vec![compound(vec![SelectorComponent::Class("title".into())])],
        };
        let rule = RuleSet {
            selectors: vec![sel.clone()],
            declarations: vec![],
        };
        assert!(rule.has_selector(&sel));
        assert!(!rule.has_selector(&Selector::default()));
    }

    #[test]
    fn test_content_variables() {
        let content = StyleSheetContent::new().with_variable("gap", "8");
        assert_eq!(content.variable("gap"), Some("8"));
        assert_eq!(content.variable("missing"), None);
        assert!(!content.is_empty());
        assert!(StyleSheetContent::default().is_empty());
    }
}

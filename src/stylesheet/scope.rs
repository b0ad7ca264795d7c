//! Stylesheet scopes: predicates selecting which stylesheets participate in a
//! lookup.

use std::collections::BTreeSet;

use crate::stylesheet::sheet::StyleSheet;

/// Selects stylesheets by name or group.
///
/// The default group is the group of sheets loaded without a group name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum StyleSheetScope {
    /// Every stylesheet.
    #[default]
    All,
    /// Only stylesheets in the default group.
    DefaultGroup,
    /// Stylesheets with one of the given names.
    Names {
        names: BTreeSet<String>,
        including_default: bool,
    },
    /// Stylesheets in one of the given groups.
    Groups {
        groups: BTreeSet<String>,
        including_default: bool,
    },
    /// Stylesheets matched by any of the member scopes.
    Union(Vec<StyleSheetScope>),
}

impl StyleSheetScope {
    pub fn all() -> Self {
        StyleSheetScope::All
    }

    pub fn default_group() -> Self {
        StyleSheetScope::DefaultGroup
    }

    pub fn names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        StyleSheetScope::Names {
            names: names.into_iter().map(Into::into).collect(),
            including_default: false,
        }
    }

    pub fn groups<S: Into<String>>(groups: impl IntoIterator<Item = S>) -> Self {
        StyleSheetScope::Groups {
            groups: groups.into_iter().map(Into::into).collect(),
            including_default: false,
        }
    }

    /// Also match the default group. A no-op for `All` and `DefaultGroup`.
    pub fn including_default(self) -> Self {
        match self {
            StyleSheetScope::Names { names, .. } => StyleSheetScope::Names {
                names,
                including_default: true,
            },
            StyleSheetScope::Groups { groups, .. } => StyleSheetScope::Groups {
                groups,
                including_default: true,
            },
            StyleSheetScope::Union(scopes) => StyleSheetScope::Union(
                scopes
                    .into_iter()
                    .chain(std::iter::once(StyleSheetScope::DefaultGroup))
                    .collect(),
            ),
            other => other,
        }
    }

    /// A scope matching everything `self` or `other` matches.
    pub fn including(self, other: StyleSheetScope) -> Self {
        match self {
            StyleSheetScope::Union(mut scopes) => {
                scopes.push(other);
                StyleSheetScope::Union(scopes)
            }
            scope => StyleSheetScope::Union(vec![scope, other]),
        }
    }

    /// Returns `true` if `sheet` is in this scope (activation is not checked).
    pub fn contains(&self, sheet: &StyleSheet) -> bool {
        let in_default = sheet.group().is_none();
        match self {
            StyleSheetScope::All => true,
            StyleSheetScope::DefaultGroup => in_default,
            StyleSheetScope::Names {
                names,
                including_default,
            } => names.contains(sheet.name()) || (*including_default && in_default),
            StyleSheetScope::Groups {
                groups,
                including_default,
            } => {
                sheet.group().is_some_and(|g| groups.contains(g)) || (*including_default && in_default)
            }
            StyleSheetScope::Union(scopes) => scopes.iter().any(|s| s.contains(sheet)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::model::StyleSheetContent;

    fn sheet(name: &str, group: Option<&str>) -> StyleSheet {
        let sheet = StyleSheet::new(format!("mem://{name}"), StyleSheetContent::new());
        match group {
            Some(g) => sheet.with_group(g),
            None => sheet,
        }
    }

    #[test]
    fn all_and_default_group() {
        let base = sheet("base.css", None);
        let dark = sheet("dark.css", Some("theme"));
        assert!(StyleSheetScope::all().contains(&base));
        assert!(StyleSheetScope::all().contains(&dark));
        assert!(StyleSheetScope::default_group().contains(&base));
        assert!(!StyleSheetScope::default_group().contains(&dark));
    }

    #[test]
    fn names_scope() {
        let base = sheet("base.css", None);
        let dark = sheet("dark.css", Some("theme"));
        let scope = StyleSheetScope::names(["dark.css"]);
        assert!(scope.contains(&dark));
        assert!(!scope.contains(&base));
        assert!(scope.including_default().contains(&base));
    }

    #[test]
    fn groups_scope() {
        let base = sheet("base.css", None);
        let dark = sheet("dark.css", Some("theme"));
        let other = sheet("other.css", Some("debug"));
        let scope = StyleSheetScope::groups(["theme"]).including_default();
        assert!(scope.contains(&dark));
        assert!(scope.contains(&base));
        assert!(!scope.contains(&other));
    }

    #[test]
    fn union_scope() {
        let dark = sheet("dark.css", Some("theme"));
        let other = sheet("other.css", Some("debug"));
        let base = sheet("base.css", None);
        let scope = StyleSheetScope::groups(["theme"]).including(StyleSheetScope::names(["other.css"]));
        assert!(scope.contains(&dark));
        assert!(scope.contains(&other));
        assert!(!scope.contains(&base));
        assert!(scope.including_default().contains(&base));
    }

    #[test]
    fn scopes_are_hashable_values() {
        use std::collections::HashSet;
        let set: HashSet<StyleSheetScope> = [
            StyleSheetScope::names(["a", "b"]),
            StyleSheetScope::names(["b", "a"]),
            StyleSheetScope::default(),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
    }
}

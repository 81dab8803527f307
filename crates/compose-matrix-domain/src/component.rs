//! Candidate component types and nested-type discovery.

use serde::{Deserialize, Serialize};

/// A component type as seen by the composition engines.
///
/// Types nest: a scenario's enclosing type declares the parts it exercises as
/// nested types, which may declare further nested types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ComponentType {
    /// Fully qualified type name.
    pub name: String,

    #[serde(default)]
    pub is_abstract: bool,

    #[serde(default)]
    pub is_sealed: bool,

    #[serde(default)]
    pub is_interface: bool,

    /// Nested types in declaration order.
    #[serde(default)]
    pub nested: Vec<ComponentType>,
}

impl ComponentType {
    /// A concrete, non-abstract class.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_abstract: false,
            is_sealed: false,
            is_interface: false,
            nested: Vec::new(),
        }
    }

    /// An abstract, unsealed class.
    pub fn abstract_class(name: impl Into<String>) -> Self {
        Self {
            is_abstract: true,
            ..Self::class(name)
        }
    }

    /// An abstract sealed class (a static holder type).
    pub fn static_class(name: impl Into<String>) -> Self {
        Self {
            is_abstract: true,
            is_sealed: true,
            ..Self::class(name)
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            is_abstract: true,
            is_interface: true,
            ..Self::class(name)
        }
    }

    /// Append a nested type (builder style).
    pub fn with_nested(mut self, nested: ComponentType) -> Self {
        self.nested.push(nested);
        self
    }

    /// Whether the type can stand in as a part when parts are discovered
    /// implicitly: instantiable or sealed, and never an interface.
    pub fn is_discoverable_part(&self) -> bool {
        (!self.is_abstract || self.is_sealed) && !self.is_interface
    }
}

/// Enumerates nested component types.
pub struct DiscoveryProbe;

impl DiscoveryProbe {
    /// Walk every type nested (transitively) under `root`, depth-first in
    /// declaration order. `root` itself is not yielded. Nothing is filtered.
    pub fn discover(root: &ComponentType) -> NestedTypes<'_> {
        NestedTypes {
            stack: vec![root.nested.iter()],
        }
    }

    /// The implicit part set for a scenario: discovered types that are
    /// discoverable parts.
    pub fn discover_parts(root: &ComponentType) -> Vec<ComponentType> {
        Self::discover(root)
            .filter(|t| t.is_discoverable_part())
            .cloned()
            .collect()
    }
}

/// Lazy pre-order iterator over a nested-type tree.
///
/// Keeps an explicit stack of sibling cursors; depth is bounded only by memory.
#[derive(Clone)]
pub struct NestedTypes<'a> {
    stack: Vec<std::slice::Iter<'a, ComponentType>>,
}

impl<'a> Iterator for NestedTypes<'a> {
    type Item = &'a ComponentType;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(ty) => {
                    if !ty.nested.is_empty() {
                        self.stack.push(ty.nested.iter());
                    }
                    return Some(ty);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<'a>(iter: impl Iterator<Item = &'a ComponentType>) -> Vec<&'a str> {
        iter.map(|t| t.name.as_str()).collect()
    }

    fn sample_tree() -> ComponentType {
        ComponentType::class("Tests")
            .with_nested(
                ComponentType::class("A")
                    .with_nested(ComponentType::class("A.1"))
                    .with_nested(
                        ComponentType::class("A.2").with_nested(ComponentType::class("A.2.x")),
                    ),
            )
            .with_nested(ComponentType::interface("IB"))
            .with_nested(ComponentType::class("C"))
    }

    #[test]
    fn test_discover_depth_first_declaration_order() {
        let root = sample_tree();
        assert_eq!(
            names(DiscoveryProbe::discover(&root)),
            vec!["A", "A.1", "A.2", "A.2.x", "IB", "C"]
        );
    }

    #[test]
    fn test_discover_does_not_filter() {
        let root = sample_tree();
        assert!(DiscoveryProbe::discover(&root).any(|t| t.is_interface));
    }

    #[test]
    fn test_discover_is_lazy_and_restartable() {
        let root = sample_tree();
        let mut walk = DiscoveryProbe::discover(&root);
        assert_eq!(walk.next().map(|t| t.name.as_str()), Some("A"));

        let resumed = walk.clone();
        assert_eq!(names(resumed).len(), 5);

        assert_eq!(names(DiscoveryProbe::discover(&root)).len(), 6);
    }

    #[test]
    fn test_discover_leaf_yields_nothing() {
        let leaf = ComponentType::class("Leaf");
        assert_eq!(DiscoveryProbe::discover(&leaf).count(), 0);
    }

    #[test]
    fn test_discover_deep_chain_without_recursion() {
        let mut root = ComponentType::class("n0");
        for i in (1..2_000).rev() {
            root = ComponentType::class("outer").with_nested(ComponentType {
                name: format!("n{i}"),
                ..root
            });
        }
        assert_eq!(DiscoveryProbe::discover(&root).count(), 1_999);
    }

    #[test]
    fn test_discoverable_part_rules() {
        assert!(ComponentType::class("Plain").is_discoverable_part());
        assert!(ComponentType::static_class("Holder").is_discoverable_part());
        assert!(!ComponentType::abstract_class("Base").is_discoverable_part());
        assert!(!ComponentType::interface("IFoo").is_discoverable_part());
    }

    #[test]
    fn test_discover_parts_filters() {
        let root = ComponentType::class("Tests")
            .with_nested(ComponentType::abstract_class("Base"))
            .with_nested(ComponentType::interface("IContract"))
            .with_nested(ComponentType::class("Export"))
            .with_nested(ComponentType::static_class("Holder"));
        let parts = DiscoveryProbe::discover_parts(&root);
        let names: Vec<_> = parts.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Export", "Holder"]);
    }
}

//! Ordered per-component-version menus.

use std::collections::HashMap;

use crate::tree::NavigationTree;

/// Menus keyed by `component:version`.
#[derive(Debug, Default)]
pub struct NavigationCatalog {
    menus: HashMap<String, Vec<NavigationTree>>,
}

impl NavigationCatalog {
    /// Create an empty navigation catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tree into a component version's menu, keeping the menu
    /// sorted ascending by order. A tree with an order equal to an existing
    /// one is inserted before it.
    pub fn add_tree(&mut self, component: &str, version: &str, tree: NavigationTree) {
        let menu = self.menus.entry(menu_key(component, version)).or_default();
        let position = menu
            .iter()
            .position(|existing| existing.order >= tree.order)
            .unwrap_or(menu.len());
        menu.insert(position, tree);
    }

    /// The menu of a component version, if any trees were registered.
    #[must_use]
    pub fn menu(&self, component: &str, version: &str) -> Option<&[NavigationTree]> {
        self.menus
            .get(&menu_key(component, version))
            .map(Vec::as_slice)
    }
}

fn menu_key(component: &str, version: &str) -> String {
    format!("{component}:{version}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(order: f64, content: &str) -> NavigationTree {
        NavigationTree {
            root: true,
            order,
            content: Some(content.to_owned()),
            items: Vec::new(),
        }
    }

    #[test]
    fn test_menu_sorted_by_order() {
        let mut catalog = NavigationCatalog::new();
        catalog.add_tree("docs", "1.0", tree(1.0, "second"));
        catalog.add_tree("docs", "1.0", tree(0.0, "first"));
        catalog.add_tree("docs", "1.0", tree(2.0, "third"));

        let menu = catalog.menu("docs", "1.0").unwrap();
        let titles: Vec<&str> = menu.iter().filter_map(|t| t.content.as_deref()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_fractional_orders_interleave() {
        let mut catalog = NavigationCatalog::new();
        catalog.add_tree("docs", "1.0", tree(0.0, "a"));
        catalog.add_tree("docs", "1.0", tree(1.0, "c"));
        catalog.add_tree("docs", "1.0", tree(0.5, "b"));

        let menu = catalog.menu("docs", "1.0").unwrap();
        let titles: Vec<&str> = menu.iter().filter_map(|t| t.content.as_deref()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_menus_keyed_by_component_and_version() {
        let mut catalog = NavigationCatalog::new();
        catalog.add_tree("docs", "1.0", tree(0.0, "one"));

        assert!(catalog.menu("docs", "1.0").is_some());
        assert!(catalog.menu("docs", "2.0").is_none());
        assert!(catalog.menu("other", "1.0").is_none());
    }
}

//! Element registry
//!
//! Lookup tools cache located element handles here under generated ids so
//! interaction tools (click, input, attribute, element screenshot) can
//! reference an element found earlier. Handles go stale when the page
//! navigates or reloads; callers clear the registry at that point.

use chromiumoxide::element::Element;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Default)]
pub struct ElementRegistry {
    elements: DashMap<String, Arc<Element>>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache an element handle and return its generated id.
    pub fn insert(&self, element: Element) -> String {
        let element_id = format!("elem-{}", Uuid::new_v4());
        self.elements.insert(element_id.clone(), Arc::new(element));
        element_id
    }

    pub fn get(&self, element_id: &str) -> Option<Arc<Element>> {
        self.elements
            .get(element_id)
            .map(|entry| entry.value().clone())
    }

    /// Drop all cached handles, returning how many were removed.
    pub fn clear(&self) -> usize {
        let count = self.elements.len();
        self.elements.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Ids of all cached elements, for diagnostics.
    pub fn ids(&self) -> Vec<String> {
        self.elements.iter().map(|entry| entry.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_reports_removed_count() {
        let registry = ElementRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.clear(), 0);
        assert!(registry.get("elem-missing").is_none());
    }

    #[test]
    fn generated_ids_are_prefixed_and_unique() {
        // Ids are minted without an element here; insert() needs a live
        // browser handle, so only the id shape is checked.
        let a = format!("elem-{}", Uuid::new_v4());
        let b = format!("elem-{}", Uuid::new_v4());
        assert!(a.starts_with("elem-"));
        assert_ne!(a, b);
    }
}

//! Guideline storage.
//!
//! Holds guideline definitions and per-guideline repetition state.
//! Iteration order is insertion order; priority is a field, not an ordering.

use crate::models::Guideline;
use crate::{Error, Result};

/// In-memory store of guidelines with strict id uniqueness.
#[derive(Debug, Default)]
pub struct GuidelineStore {
    /// Guidelines in insertion order.
    items: Vec<Guideline>,
}

impl GuidelineStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Inserts a guideline.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if the id is already present; the store is left
    /// unchanged.
    pub fn add(&mut self, guideline: Guideline) -> Result<()> {
        if self.contains(&guideline.id) {
            return Err(Error::DuplicateId { id: guideline.id });
        }
        self.items.push(guideline);
        Ok(())
    }

    /// Removes a guideline by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is absent.
    pub fn remove(&mut self, id: &str) -> Result<Guideline> {
        let index = self
            .index_of(id)
            .ok_or_else(|| Error::NotFound { id: id.to_string() })?;
        Ok(self.items.remove(index))
    }

    /// Returns the guideline with the given id, if present.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Guideline> {
        self.items.iter().find(|g| g.id == id)
    }

    /// Returns all guidelines in insertion order.
    #[must_use]
    pub fn list_all(&self) -> &[Guideline] {
        &self.items
    }

    /// Records that a guideline was surfaced at the given token count.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is absent.
    pub fn mark_shown(&mut self, id: &str, at_token_count: u64) -> Result<()> {
        let index = self
            .index_of(id)
            .ok_or_else(|| Error::NotFound { id: id.to_string() })?;
        self.items[index].last_shown_token_count = Some(at_token_count);
        Ok(())
    }

    /// Clears all last-shown markers.
    ///
    /// Used at a session boundary: markers reference token counts from the
    /// previous session and must not suppress first showings in the new one.
    pub fn clear_shown_markers(&mut self) {
        for guideline in &mut self.items {
            guideline.last_shown_token_count = None;
        }
    }

    /// Returns true if a guideline with the given id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    /// Returns the number of guidelines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the store holds no guidelines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|g| g.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guideline(id: &str, tier: u8) -> Guideline {
        Guideline::new(id, "content", tier, None).unwrap()
    }

    #[test]
    fn test_add_and_get() {
        let mut store = GuidelineStore::new();
        store.add(guideline("a", 5)).unwrap();

        assert!(store.contains("a"));
        assert_eq!(store.get("a").unwrap().priority_tier, 5);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_duplicate_fails_and_preserves_original() {
        let mut store = GuidelineStore::new();
        store.add(guideline("a", 5)).unwrap();

        let duplicate = Guideline::new("a", "other content", 9, None).unwrap();
        let result = store.add(duplicate);

        assert!(matches!(result, Err(Error::DuplicateId { .. })));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().content, "content");
    }

    #[test]
    fn test_remove_missing_fails() {
        let mut store = GuidelineStore::new();
        let result = store.remove("nope");
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_remove_returns_guideline() {
        let mut store = GuidelineStore::new();
        store.add(guideline("a", 5)).unwrap();

        let removed = store.remove("a").unwrap();
        assert_eq!(removed.id, "a");
        assert!(store.is_empty());
    }

    #[test]
    fn test_list_all_is_insertion_order() {
        let mut store = GuidelineStore::new();
        store.add(guideline("z", 2)).unwrap();
        store.add(guideline("a", 9)).unwrap();
        store.add(guideline("m", 5)).unwrap();

        let ids: Vec<&str> = store.list_all().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_mark_shown() {
        let mut store = GuidelineStore::new();
        store.add(guideline("a", 5)).unwrap();

        store.mark_shown("a", 4200).unwrap();
        assert_eq!(store.get("a").unwrap().last_shown_token_count, Some(4200));

        let result = store.mark_shown("missing", 1);
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_clear_shown_markers() {
        let mut store = GuidelineStore::new();
        store.add(guideline("a", 5)).unwrap();
        store.add(guideline("b", 8)).unwrap();
        store.mark_shown("a", 100).unwrap();
        store.mark_shown("b", 200).unwrap();

        store.clear_shown_markers();

        assert!(store.list_all().iter().all(|g| g.last_shown_token_count.is_none()));
    }
}

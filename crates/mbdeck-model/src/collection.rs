//! Ordered, name-indexed containers, one per category.

use std::collections::HashMap;

use crate::entity::EntityId;
use crate::error::{ModelError, Result};
use crate::kinds::Category;

/// Insertion-ordered ids of one category with a name index.
///
/// An entity's position in `order` is its index in the deck.
#[derive(Debug, Clone)]
pub struct Collection {
    category: Category,
    order: Vec<EntityId>,
    names: HashMap<String, EntityId>,
}

impl Collection {
    pub(crate) fn new(category: Category) -> Self {
        Self {
            category,
            order: Vec::new(),
            names: HashMap::new(),
        }
    }

    /// Category held.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids in collection order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.order.iter().copied()
    }

    /// Position of `id`, which is its deck index.
    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.order.iter().position(|&other| other == id)
    }

    /// Id of the entity named `name`.
    pub fn find(&self, name: &str) -> Result<EntityId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UnknownEntity {
                category: self.category,
                name: name.to_string(),
            })
    }

    /// Whether `name` is taken.
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub(crate) fn push(&mut self, id: EntityId, name: String) {
        self.order.push(id);
        self.names.insert(name, id);
    }

    pub(crate) fn remove(&mut self, id: EntityId, name: &str) {
        self.order.retain(|&other| other != id);
        self.names.remove(name);
    }

    pub(crate) fn rename(&mut self, id: EntityId, old: &str, new: String) {
        self.names.remove(old);
        self.names.insert(new, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_find_and_position() {
        let mut keys: SlotMap<EntityId, ()> = SlotMap::with_key();
        let a = keys.insert(());
        let b = keys.insert(());
        let mut collection = Collection::new(Category::Drive);
        collection.push(a, "a".into());
        collection.push(b, "b".into());

        assert_eq!(collection.find("b"), Ok(b));
        assert_eq!(collection.position(b), Some(1));
        assert_eq!(
            collection.find("c"),
            Err(ModelError::UnknownEntity {
                category: Category::Drive,
                name: "c".into()
            })
        );

        collection.remove(a, "a");
        assert_eq!(collection.position(b), Some(0));
        assert!(!collection.contains_name("a"));

        collection.rename(b, "b", "z".into());
        assert_eq!(collection.find("z"), Ok(b));
        assert!(collection.find("b").is_err());
    }
}

//! The entity graph: storage, collections, edit commands and the two-phase
//! link protocol.
//!
//! Every edit that replaces links goes through [`Database::store_links`],
//! which validates the complete new list before touching any counter, so a
//! rejected edit leaves the previous link set and all `users` counts intact.

use std::collections::HashMap;

use log::debug;
use slotmap::SlotMap;

use crate::collection::Collection;
use crate::entity::{Anchor, Entity, EntityId};
use crate::error::{ModelError, Result};
use crate::kinds::{Category, Element, Kind, NodeRole};
use crate::registry::TypeTag;

/// Highest numeric suffix tried when a name collides.
pub const MAX_NAME_SUFFIX: u32 = 999;

/// Owner of all entities and their collections.
#[derive(Debug, Clone)]
pub struct Database {
    entities: SlotMap<EntityId, Entity>,
    collections: [Collection; 9],
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    /// Empty model.
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            collections: Category::ALL.map(Collection::new),
        }
    }

    /// Total number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the model is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Collection of `category`.
    pub fn collection(&self, category: Category) -> &Collection {
        &self.collections[category as usize]
    }

    fn collection_mut(&mut self, category: Category) -> &mut Collection {
        &mut self.collections[category as usize]
    }

    /// Entity by id.
    pub fn get(&self, id: EntityId) -> Result<&Entity> {
        self.entities.get(id).ok_or(ModelError::StaleId)
    }

    /// Id of the entity named `name` in `category`.
    pub fn find(&self, category: Category, name: &str) -> Result<EntityId> {
        self.collection(category).find(name)
    }

    /// Entity named `name` in `category`.
    pub fn lookup(&self, category: Category, name: &str) -> Result<&Entity> {
        self.get(self.find(category, name)?)
    }

    /// Entities of `category` in collection order.
    pub fn iter(&self, category: Category) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.collection(category)
            .iter()
            .filter_map(move |id| self.entities.get(id).map(|entity| (id, entity)))
    }

    /// Position of `id` within its own collection.
    pub fn position(&self, id: EntityId) -> Result<usize> {
        let entity = self.get(id)?;
        self.collection(entity.category())
            .position(id)
            .ok_or(ModelError::StaleId)
    }

    /// Name of `id`, or `"?"` for a stale id.
    pub fn name_of(&self, id: EntityId) -> &str {
        self.entities.get(id).map_or("?", |e| e.name.as_str())
    }

    // ------------------------------------------------------------------
    // Edit commands
    // ------------------------------------------------------------------

    /// Create an entity. An empty `name` uses the type name. The name is
    /// made unique within the collection and `links` are committed.
    pub fn create(
        &mut self,
        name: &str,
        kind: Kind,
        objects: Vec<Anchor>,
        links: Vec<EntityId>,
    ) -> Result<EntityId> {
        let base = if name.is_empty() { kind.type_name() } else { name };
        let name = self.unique_name(kind.category(), base)?;
        self.check_links(&name, &kind, None, &links)?;
        let id = self.insert(name, kind, objects)?;
        self.replace_links(id, links);
        debug!("created {} \"{}\"", self.entities[id].kind.type_name(), self.name_of(id));
        Ok(id)
    }

    /// Create an entity with the default attributes of `tag`.
    pub fn create_default(
        &mut self,
        tag: TypeTag,
        objects: Vec<Anchor>,
        links: Vec<EntityId>,
    ) -> Result<EntityId> {
        self.create(tag.name(), tag.make(), objects, links)
    }

    /// Replace the kind, anchors and links of an existing entity in place.
    /// Nothing changes when any part is rejected.
    pub fn edit(
        &mut self,
        id: EntityId,
        kind: Kind,
        objects: Vec<Anchor>,
        links: Vec<EntityId>,
    ) -> Result<()> {
        let entity = self.get(id)?;
        let name = entity.name.clone();
        if entity.category() != kind.category() {
            return Err(ModelError::CategoryMismatch {
                name,
                expected: entity.category(),
                found: kind.category(),
            });
        }
        self.check_singleton(&kind, Some(id))?;
        let objects = self.check_anchors(&name, &kind, objects, Some(id))?;
        kind.validate()
            .map_err(|reason| ModelError::InvalidAttribute {
                name: name.clone(),
                reason,
            })?;
        self.check_links(&name, &kind, Some(id), &links)?;

        let entity = &mut self.entities[id];
        entity.kind = kind;
        entity.objects = objects;
        self.replace_links(id, links);
        debug!("edited \"{}\"", name);
        Ok(())
    }

    /// Rename an entity, applying the collision suffix. Returns the name
    /// actually assigned.
    pub fn rename(&mut self, id: EntityId, name: &str) -> Result<String> {
        let entity = self.get(id)?;
        if entity.name == name {
            return Ok(name.to_string());
        }
        let category = entity.category();
        let old = entity.name.clone();
        let new = self.unique_name_except(category, name, Some(&old))?;
        self.collection_mut(category).rename(id, &old, new.clone());
        self.entities[id].name = new.clone();
        debug!("renamed \"{}\" to \"{}\"", old, new);
        Ok(new)
    }

    /// Copy an entity: same kind and anchors, the same link targets (each
    /// gaining one user), zero users of its own.
    pub fn duplicate(&mut self, id: EntityId) -> Result<EntityId> {
        let source = self.get(id)?;
        let kind = source.kind.clone();
        let objects = source.objects.clone().unwrap_or_default();
        let links = source.links.clone();
        let name = self.unique_name(kind.category(), &source.name)?;
        self.check_links(&name, &kind, None, &links)?;
        let copy = self.insert(name, kind, objects)?;
        self.replace_links(copy, links);
        debug!("duplicated \"{}\" as \"{}\"", self.name_of(id), self.name_of(copy));
        Ok(copy)
    }

    /// Remove an entity nobody links. Its own links lose one user each.
    pub fn delete(&mut self, id: EntityId) -> Result<()> {
        let entity = self.get(id)?;
        if entity.users > 0 {
            return Err(ModelError::InUse {
                name: entity.name.clone(),
                users: entity.users,
            });
        }
        self.unlink_all(id)?;
        let category = self.entities[id].category();
        if let Some(entity) = self.entities.remove(id) {
            self.collection_mut(category).remove(id, &entity.name);
            debug!("deleted \"{}\"", entity.name);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Link protocol
    // ------------------------------------------------------------------

    /// Append `target` to the pending links of `id`. Counts change only on
    /// [`commit_links`](Self::commit_links).
    pub fn link(&mut self, id: EntityId, target: EntityId) -> Result<()> {
        let name = self.get(id)?.name.clone();
        let target_name = self.get(target)?.name.clone();
        if id == target {
            return Err(ModelError::SelfLink(name));
        }
        if self.reaches(target, id) {
            return Err(ModelError::LinkCycle {
                from: name,
                to: target_name,
            });
        }
        self.entities[id].pending.push(target);
        Ok(())
    }

    /// Move pending links into the committed list, adding one user to each.
    ///
    /// The committed list plus the pending links is validated as a whole
    /// first. A pending target deleted in between yields
    /// [`ModelError::StaleId`], a pending pair closing a cycle yields
    /// [`ModelError::LinkCycle`]; either way nothing changes.
    pub fn commit_links(&mut self, id: EntityId) -> Result<()> {
        let entity = self.get(id)?;
        if entity.pending.is_empty() {
            return Ok(());
        }
        let links: Vec<EntityId> = entity.links.iter().chain(&entity.pending).copied().collect();
        self.check_links(&entity.name, &entity.kind, Some(id), &links)?;
        self.replace_links(id, links);
        Ok(())
    }

    /// Drop every committed link (one user less each) and any pending ones.
    pub fn unlink_all(&mut self, id: EntityId) -> Result<()> {
        let entity = self.entities.get_mut(id).ok_or(ModelError::StaleId)?;
        entity.pending.clear();
        let links = std::mem::take(&mut entity.links);
        for target in links {
            self.remove_user(target);
        }
        Ok(())
    }

    /// Atomically replace the links of `id`: the whole list is validated
    /// against the kind first, then unlink-all, append and commit run.
    pub fn store_links(&mut self, id: EntityId, links: Vec<EntityId>) -> Result<()> {
        let entity = self.get(id)?;
        self.check_links(&entity.name, &entity.kind, Some(id), &links)?;
        self.replace_links(id, links);
        Ok(())
    }

    /// Whether every `users` counter equals the number of committed link
    /// occurrences pointing at its entity.
    pub fn reference_counts_consistent(&self) -> bool {
        let mut counts: HashMap<EntityId, u32> = HashMap::new();
        for entity in self.entities.values() {
            for &target in &entity.links {
                *counts.entry(target).or_default() += 1;
            }
        }
        self.entities
            .iter()
            .all(|(id, entity)| entity.users == counts.get(&id).copied().unwrap_or(0))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Insert with `name` taken verbatim. Links are left empty.
    pub(crate) fn insert(
        &mut self,
        name: String,
        kind: Kind,
        objects: Vec<Anchor>,
    ) -> Result<EntityId> {
        let category = kind.category();
        if self.collection(category).contains_name(&name) {
            return Err(ModelError::DuplicateName(name));
        }
        self.check_singleton(&kind, None)?;
        let objects = self.check_anchors(&name, &kind, objects, None)?;
        kind.validate()
            .map_err(|reason| ModelError::InvalidAttribute {
                name: name.clone(),
                reason,
            })?;
        let id = self.entities.insert(Entity::new(name.clone(), kind, objects));
        self.collection_mut(category).push(id, name);
        Ok(id)
    }

    /// Unlink-all, append, commit. Callers have validated `links`.
    fn replace_links(&mut self, id: EntityId, links: Vec<EntityId>) {
        let entity = &mut self.entities[id];
        entity.pending.clear();
        let old = std::mem::take(&mut entity.links);
        for target in old {
            self.remove_user(target);
        }
        for &target in &links {
            self.add_user(target);
        }
        self.entities[id].links = links;
    }

    fn add_user(&mut self, id: EntityId) {
        let target = self
            .entities
            .get_mut(id)
            .unwrap_or_else(|| panic!("link target {:?} no longer exists", id));
        target.users = match target.users.checked_add(1) {
            Some(users) => users,
            None => panic!("users overflow on \"{}\"", target.name),
        };
    }

    fn remove_user(&mut self, id: EntityId) {
        let target = self
            .entities
            .get_mut(id)
            .unwrap_or_else(|| panic!("link target {:?} no longer exists", id));
        target.users = match target.users.checked_sub(1) {
            Some(users) => users,
            None => panic!("users underflow on \"{}\"", target.name),
        };
    }

    /// Collection-unique name derived from `base`. A trailing `.ddd` is
    /// stripped before numbering.
    pub fn unique_name(&self, category: Category, base: &str) -> Result<String> {
        self.unique_name_except(category, base, None)
    }

    /// As [`unique_name`](Self::unique_name), treating `own` as free.
    fn unique_name_except(
        &self,
        category: Category,
        base: &str,
        own: Option<&str>,
    ) -> Result<String> {
        let collection = self.collection(category);
        let taken = |name: &str| own != Some(name) && collection.contains_name(name);
        if !taken(base) {
            return Ok(base.to_string());
        }
        let stem = strip_suffix(base);
        (1..=MAX_NAME_SUFFIX)
            .map(|n| format!("{}.{:03}", stem, n))
            .find(|candidate| !taken(candidate))
            .ok_or_else(|| ModelError::NameExhausted(stem.to_string()))
    }

    fn check_singleton(&self, kind: &Kind, this: Option<EntityId>) -> Result<()> {
        if !kind.is_singleton() {
            return Ok(());
        }
        let tag = kind.tag();
        let taken = self
            .iter(kind.category())
            .any(|(id, entity)| Some(id) != this && entity.kind.tag() == tag);
        if taken {
            return Err(ModelError::SingletonExists(kind.type_name()));
        }
        Ok(())
    }

    fn check_anchors(
        &self,
        name: &str,
        kind: &Kind,
        objects: Vec<Anchor>,
        this: Option<EntityId>,
    ) -> Result<Option<Vec<Anchor>>> {
        let range = kind.anchor_range();
        if !range.contains(&objects.len()) {
            let expected = if range.start() == range.end() {
                range.start().to_string()
            } else {
                format!("{} to {}", range.start(), range.end())
            };
            return Err(ModelError::AnchorCount {
                name: name.to_string(),
                expected,
                found: objects.len(),
            });
        }
        if !kind.has_anchors() {
            return Ok(None);
        }
        if matches!(kind.node_role(), NodeRole::RigidOffset | NodeRole::DummyNode) {
            let child = &objects[0];
            if *child == objects[1] {
                return Err(ModelError::InvalidAnchors {
                    name: name.to_string(),
                    reason: "an anchor cannot be offset from itself".to_string(),
                });
            }
            if let Some(by) = self.mapping_of(child, this) {
                return Err(ModelError::AnchorAlreadyMapped {
                    anchor: child.to_string(),
                    by: by.to_string(),
                });
            }
        }
        Ok(Some(objects))
    }

    /// Name of the rigid offset or dummy node mapping `child`, other than
    /// `this`.
    fn mapping_of(&self, child: &Anchor, this: Option<EntityId>) -> Option<&str> {
        self.iter(Category::Element)
            .filter(|(id, _)| Some(*id) != this)
            .filter(|(_, e)| {
                matches!(e.kind.node_role(), NodeRole::RigidOffset | NodeRole::DummyNode)
            })
            .find(|(_, e)| e.anchor(0) == Some(child))
            .map(|(_, e)| e.name.as_str())
    }

    /// Name of the driven element wrapping `element`, other than `this`.
    fn driver_of(&self, element: EntityId, this: Option<EntityId>) -> Option<&str> {
        self.iter(Category::Element)
            .filter(|(id, _)| Some(*id) != this)
            .filter(|(_, e)| matches!(e.kind.as_element(), Some(Element::Driven)))
            .find(|(_, e)| e.links.get(1) == Some(&element))
            .map(|(_, e)| e.name.as_str())
    }

    fn check_links(
        &self,
        name: &str,
        kind: &Kind,
        this: Option<EntityId>,
        links: &[EntityId],
    ) -> Result<()> {
        let mut targets = Vec::with_capacity(links.len());
        for &target in links {
            if Some(target) == this {
                return Err(ModelError::SelfLink(name.to_string()));
            }
            targets.push(&self.get(target)?.kind);
        }
        kind.link_slots()
            .check(&targets)
            .map_err(|reason| ModelError::LinkMismatch {
                name: name.to_string(),
                reason,
            })?;
        if let (Some(Element::Driven), Some(&inner)) = (kind.as_element(), links.get(1)) {
            if let Some(by) = self.driver_of(inner, this) {
                return Err(ModelError::AlreadyDriven {
                    element: self.name_of(inner).to_string(),
                    by: by.to_string(),
                });
            }
        }
        if let Some(this) = this {
            if let Some(&target) = links.iter().find(|&&t| self.reaches(t, this)) {
                return Err(ModelError::LinkCycle {
                    from: name.to_string(),
                    to: self.name_of(target).to_string(),
                });
            }
        }
        Ok(())
    }

    /// Whether `to` is reachable from `from` along committed links.
    fn reaches(&self, from: EntityId, to: EntityId) -> bool {
        let mut stack = vec![from];
        let mut seen = Vec::new();
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            if seen.contains(&id) {
                continue;
            }
            seen.push(id);
            if let Some(entity) = self.entities.get(id) {
                stack.extend_from_slice(&entity.links);
            }
        }
        false
    }
}

fn strip_suffix(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, digits))
            if !stem.is_empty() && digits.len() == 3 && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            stem
        }
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{ConstitutiveLaw, Dim, Drive, Matrix};

    fn law(db: &mut Database, stiffness: f64) -> EntityId {
        db.create(
            "law",
            Kind::ConstitutiveLaw(ConstitutiveLaw::LinearElastic {
                dim: Dim::D1,
                stiffness,
            }),
            vec![],
            vec![],
        )
        .unwrap()
    }

    fn rod(db: &mut Database, a: &str, b: &str, law: EntityId) -> Result<EntityId> {
        db.create(
            "rod",
            Kind::Element(Element::Rod),
            vec![Anchor::from(a), Anchor::from(b)],
            vec![law],
        )
    }

    #[test]
    fn test_create_counts_users() {
        let mut db = Database::new();
        let law = law(&mut db, 1000.0);
        let rod = rod(&mut db, "A", "B", law).unwrap();
        assert_eq!(db.get(law).unwrap().users(), 1);
        assert_eq!(db.get(rod).unwrap().users(), 0);
        assert_eq!(db.get(rod).unwrap().links(), &[law]);
        assert!(db.reference_counts_consistent());
    }

    #[test]
    fn test_name_suffix() {
        let mut db = Database::new();
        let a = law(&mut db, 1.0);
        let b = law(&mut db, 1.0);
        let c = db.duplicate(b).unwrap();
        assert_eq!(db.get(a).unwrap().name(), "law");
        assert_eq!(db.get(b).unwrap().name(), "law.001");
        assert_eq!(db.get(c).unwrap().name(), "law.002");
        assert_eq!(strip_suffix("law.12"), "law.12");
        assert_eq!(strip_suffix(".001"), ".001");
    }

    #[test]
    fn test_name_exhausted() {
        let mut db = Database::new();
        for _ in 0..=MAX_NAME_SUFFIX {
            db.create("d", Kind::Drive(Drive::Unit), vec![], vec![]).unwrap();
        }
        let err = db.create("d", Kind::Drive(Drive::Unit), vec![], vec![]).unwrap_err();
        assert_eq!(err, ModelError::NameExhausted("d".into()));
        assert_eq!(db.collection(Category::Drive).len(), 1000);
    }

    #[test]
    fn test_delete_refused_when_used() {
        let mut db = Database::new();
        let law = law(&mut db, 1000.0);
        let rod = rod(&mut db, "A", "B", law).unwrap();

        let err = db.delete(law).unwrap_err();
        assert!(matches!(err, ModelError::InUse { users: 1, .. }));
        assert!(db.get(law).is_ok());

        db.delete(rod).unwrap();
        assert_eq!(db.get(law).unwrap().users(), 0);
        assert!(db.get(rod).is_err());
        db.delete(law).unwrap();
        assert!(db.is_empty());
        assert!(db.reference_counts_consistent());
    }

    #[test]
    fn test_duplicate_with_two_links_to_same_law() {
        let mut db = Database::new();
        let section = db
            .create(
                "section",
                Kind::ConstitutiveLaw(ConstitutiveLaw::LinearElastic {
                    dim: Dim::D6,
                    stiffness: 1e6,
                }),
                vec![],
                vec![],
            )
            .unwrap();
        let beam = db
            .create(
                "beam",
                Kind::Element(Element::Beam3),
                vec!["A".into(), "B".into(), "C".into()],
                vec![section, section],
            )
            .unwrap();
        assert_eq!(db.get(section).unwrap().users(), 2);

        let copy = db.duplicate(beam).unwrap();
        assert_eq!(db.get(section).unwrap().users(), 4);
        assert_eq!(db.get(beam).unwrap().users(), 0);
        assert_eq!(db.get(beam).unwrap().links().len(), 2);
        assert_eq!(db.get(copy).unwrap().users(), 0);
        assert_eq!(db.get(copy).unwrap().objects(), db.get(beam).unwrap().objects());
        assert!(db.reference_counts_consistent());
    }

    #[test]
    fn test_second_gravity_refused() {
        let mut db = Database::new();
        let g = db.create_default(TypeTag::Vector3, vec![], vec![]).unwrap();
        let unit = db.create_default(TypeTag::UnitDrive, vec![], vec![]).unwrap();
        let gravity = db
            .create_default(TypeTag::Gravity, vec![], vec![g, unit])
            .unwrap();
        let err = db
            .create_default(TypeTag::Gravity, vec![], vec![g, unit])
            .unwrap_err();
        assert_eq!(err, ModelError::SingletonExists("Gravity"));
        assert!(matches!(
            db.duplicate(gravity),
            Err(ModelError::SingletonExists(_))
        ));
        assert_eq!(db.collection(Category::Element).len(), 1);
        assert_eq!(db.get(unit).unwrap().users(), 1);
        assert!(db.reference_counts_consistent());
    }

    #[test]
    fn test_store_links_is_atomic() {
        let mut db = Database::new();
        let law_a = law(&mut db, 1.0);
        let rod = rod(&mut db, "A", "B", law_a).unwrap();
        let vector = db
            .create("v", Kind::Matrix(Matrix::vector(1.0, 0.0, 0.0)), vec![], vec![])
            .unwrap();

        let err = db.store_links(rod, vec![vector]).unwrap_err();
        assert!(matches!(err, ModelError::LinkMismatch { .. }));
        assert_eq!(db.get(rod).unwrap().links(), &[law_a]);
        assert_eq!(db.get(law_a).unwrap().users(), 1);
        assert_eq!(db.get(vector).unwrap().users(), 0);

        let law_b = law(&mut db, 2.0);
        db.store_links(rod, vec![law_b]).unwrap();
        assert_eq!(db.get(law_a).unwrap().users(), 0);
        assert_eq!(db.get(law_b).unwrap().users(), 1);
        assert!(db.reference_counts_consistent());
    }

    #[test]
    fn test_two_phase_protocol() {
        let mut db = Database::new();
        let a = db.create("a", Kind::Drive(Drive::Unit), vec![], vec![]).unwrap();
        let b = db.create("b", Kind::Drive(Drive::Time), vec![], vec![a]).unwrap_err();
        assert!(matches!(b, ModelError::LinkMismatch { .. }));

        let array = db
            .create("sum", Kind::Drive(Drive::Array), vec![], vec![a])
            .unwrap();
        let t = db.create("t", Kind::Drive(Drive::Time), vec![], vec![]).unwrap();
        db.link(array, t).unwrap();
        assert_eq!(db.get(t).unwrap().users(), 0);
        assert_eq!(db.get(array).unwrap().pending_links(), &[t]);
        db.commit_links(array).unwrap();
        assert_eq!(db.get(t).unwrap().users(), 1);
        assert_eq!(db.get(array).unwrap().links(), &[a, t]);
        assert!(db.reference_counts_consistent());

        db.unlink_all(array).unwrap();
        assert_eq!(db.get(a).unwrap().users(), 0);
        assert_eq!(db.get(t).unwrap().users(), 0);
        assert!(db.get(array).unwrap().links().is_empty());
    }

    #[test]
    fn test_link_cycle_refused() {
        let mut db = Database::new();
        let unit = db.create("u", Kind::Drive(Drive::Unit), vec![], vec![]).unwrap();
        let a = db
            .create("a", Kind::Drive(Drive::Array), vec![], vec![unit])
            .unwrap();
        let b = db
            .create("b", Kind::Drive(Drive::Array), vec![], vec![a])
            .unwrap();
        assert!(matches!(
            db.store_links(a, vec![b]),
            Err(ModelError::LinkCycle { .. })
        ));
        assert!(matches!(db.link(a, a), Err(ModelError::SelfLink(_))));
        assert!(db.reference_counts_consistent());
    }

    #[test]
    fn test_pending_cycle_refused() {
        let mut db = Database::new();
        let unit = db.create("u", Kind::Drive(Drive::Unit), vec![], vec![]).unwrap();
        let a = db
            .create("a", Kind::Drive(Drive::Array), vec![], vec![unit])
            .unwrap();
        let b = db
            .create("b", Kind::Drive(Drive::Array), vec![], vec![unit])
            .unwrap();
        db.link(a, b).unwrap();
        db.link(b, a).unwrap();
        db.commit_links(a).unwrap();

        let err = db.commit_links(b).unwrap_err();
        assert!(matches!(err, ModelError::LinkCycle { .. }));
        assert_eq!(db.get(b).unwrap().links(), &[unit]);
        assert_eq!(db.get(b).unwrap().pending_links(), &[a]);
        assert_eq!(db.get(a).unwrap().users(), 0);
        assert!(db.reference_counts_consistent());
    }

    #[test]
    fn test_commit_after_target_deleted() {
        let mut db = Database::new();
        let unit = db.create("u", Kind::Drive(Drive::Unit), vec![], vec![]).unwrap();
        let array = db
            .create("sum", Kind::Drive(Drive::Array), vec![], vec![unit])
            .unwrap();
        let t = db.create("t", Kind::Drive(Drive::Time), vec![], vec![]).unwrap();
        db.link(array, t).unwrap();
        db.delete(t).unwrap();

        assert_eq!(db.commit_links(array), Err(ModelError::StaleId));
        assert_eq!(db.get(array).unwrap().links(), &[unit]);
        assert_eq!(db.get(unit).unwrap().users(), 1);
        assert!(db.reference_counts_consistent());

        db.unlink_all(array).unwrap();
        assert!(db.get(array).unwrap().pending_links().is_empty());
    }

    #[test]
    fn test_element_driven_once() {
        let mut db = Database::new();
        let law = law(&mut db, 1000.0);
        let rod = rod(&mut db, "A", "B", law).unwrap();
        let step = db.create_default(TypeTag::StepDrive, vec![], vec![]).unwrap();
        let driven = db
            .create_default(TypeTag::Driven, vec![], vec![step, rod])
            .unwrap();

        let err = db.duplicate(driven).unwrap_err();
        assert!(matches!(err, ModelError::AlreadyDriven { .. }));
        let err = db
            .create_default(TypeTag::Driven, vec![], vec![step, rod])
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::AlreadyDriven {
                element: "rod".into(),
                by: "Driven".into(),
            }
        );
        assert_eq!(db.collection(Category::Element).len(), 2);
        assert_eq!(db.get(rod).unwrap().users(), 1);
        assert_eq!(db.get(step).unwrap().users(), 1);

        // Re-storing the same links on the wrapper itself is fine.
        db.store_links(driven, vec![step, rod]).unwrap();
        assert!(db.reference_counts_consistent());
    }

    #[test]
    fn test_anchor_checks() {
        let mut db = Database::new();
        let law = law(&mut db, 1.0);
        rod(&mut db, "A", "B", law).unwrap();
        let err = db
            .create("rod", Kind::Element(Element::Rod), vec!["A".into()], vec![law])
            .unwrap_err();
        assert!(matches!(err, ModelError::AnchorCount { found: 1, .. }));

        db.create_default(TypeTag::RigidOffset, vec!["tip".into(), "hub".into()], vec![])
            .unwrap();
        let err = db
            .create_default(TypeTag::DummyNode, vec!["tip".into(), "root".into()], vec![])
            .unwrap_err();
        assert!(matches!(err, ModelError::AnchorAlreadyMapped { .. }));
        let err = db
            .create_default(TypeTag::RigidOffset, vec!["x".into(), "x".into()], vec![])
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidAnchors { .. }));
    }

    #[test]
    fn test_edit_in_place() {
        let mut db = Database::new();
        let law = law(&mut db, 1.0);
        let rod = rod(&mut db, "A", "B", law).unwrap();
        let position = db.position(rod).unwrap();

        db.edit(rod, Kind::Element(Element::Rod), vec!["A".into(), "C".into()], vec![law])
            .unwrap();
        assert_eq!(db.position(rod).unwrap(), position);
        assert_eq!(db.get(rod).unwrap().anchor(1), Some(&Anchor::from("C")));
        assert_eq!(db.get(law).unwrap().users(), 1);

        let err = db
            .edit(rod, Kind::Drive(Drive::Unit), vec![], vec![])
            .unwrap_err();
        assert!(matches!(err, ModelError::CategoryMismatch { .. }));
        assert!(db.reference_counts_consistent());
    }

    #[test]
    fn test_rename_and_lookup() {
        let mut db = Database::new();
        let a = law(&mut db, 1.0);
        let b = law(&mut db, 1.0);
        assert_eq!(db.rename(b, "law").unwrap(), "law.001");
        assert_eq!(db.rename(b, "stiff").unwrap(), "stiff");
        assert_eq!(db.find(Category::ConstitutiveLaw, "stiff"), Ok(b));
        assert_eq!(db.lookup(Category::ConstitutiveLaw, "law").unwrap().users(), 0);
        assert!(matches!(
            db.find(Category::ConstitutiveLaw, "law.001"),
            Err(ModelError::UnknownEntity { .. })
        ));
        db.delete(a).unwrap();
        assert_eq!(db.get(a).unwrap_err(), ModelError::StaleId);
    }
}

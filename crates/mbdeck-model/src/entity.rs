//! Entities: named, typed records with ordered, reference-counted links.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kinds::{Category, Kind};

slotmap::new_key_type! {
    /// Stable handle of an entity inside a [`Database`](crate::Database).
    pub struct EntityId;
}

/// Name of a spatial anchor in the host scene. Anchors are shared by
/// reference; the model never owns scene objects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Anchor(pub String);

impl Anchor {
    /// Anchor by name.
    pub fn new(name: impl Into<String>) -> Self {
        Anchor(name.into())
    }

    /// The anchor name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Anchor {
    fn from(name: &str) -> Self {
        Anchor(name.to_string())
    }
}

impl From<String> for Anchor {
    fn from(name: String) -> Self {
        Anchor(name)
    }
}

/// A named, typed record in the model graph.
///
/// `users` counts committed link occurrences held by other entities.
/// `links` are positional and never reordered. `pending` holds links
/// appended by [`Database::link`](crate::Database::link) and not yet
/// committed.
#[derive(Debug, Clone)]
pub struct Entity {
    pub(crate) name: String,
    pub(crate) kind: Kind,
    pub(crate) users: u32,
    pub(crate) links: Vec<EntityId>,
    pub(crate) pending: Vec<EntityId>,
    pub(crate) objects: Option<Vec<Anchor>>,
}

impl Entity {
    pub(crate) fn new(name: String, kind: Kind, objects: Option<Vec<Anchor>>) -> Self {
        Self {
            name,
            kind,
            users: 0,
            links: Vec::new(),
            pending: Vec::new(),
            objects,
        }
    }

    /// Unique name within the entity's collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type and attributes.
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Owning category.
    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Number of committed links to this entity held by others.
    pub fn users(&self) -> u32 {
        self.users
    }

    /// Committed links, in positional order.
    pub fn links(&self) -> &[EntityId] {
        &self.links
    }

    /// Links appended but not yet committed.
    pub fn pending_links(&self) -> &[EntityId] {
        &self.pending
    }

    /// Spatial anchors, `None` for kinds without anchors.
    pub fn objects(&self) -> Option<&[Anchor]> {
        self.objects.as_deref()
    }

    /// Anchor at `index`, if present.
    pub fn anchor(&self, index: usize) -> Option<&Anchor> {
        self.objects.as_ref().and_then(|objects| objects.get(index))
    }
}

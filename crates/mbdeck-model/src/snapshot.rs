//! Flat, name-based snapshot of a model.
//!
//! Links are stored as `(category, name)` pairs rather than ids, so a
//! snapshot can be re-attached to a different session.

use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::entity::{Anchor, EntityId};
use crate::error::{ModelError, Result};
use crate::kinds::{Category, Kind};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Whole-model snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version.
    pub version: u32,
    /// Non-empty collections, in category order.
    pub collections: Vec<CollectionSnapshot>,
}

/// One collection, in collection order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSnapshot {
    /// Category.
    pub category: Category,
    /// Entities.
    pub entities: Vec<EntitySnapshot>,
}

/// One entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Name.
    pub name: String,
    /// Type and attributes.
    pub kind: Kind,
    /// Spatial anchors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<Anchor>,
    /// Links, in positional order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkRef>,
}

/// A link by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    /// Target collection.
    pub category: Category,
    /// Target name.
    pub name: String,
}

impl Snapshot {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Database {
    /// Reduce the model to a snapshot.
    pub fn to_snapshot(&self) -> Snapshot {
        let link_ref = |id: EntityId| {
            self.get(id).ok().map(|target| LinkRef {
                category: target.category(),
                name: target.name().to_string(),
            })
        };
        let collections = Category::ALL
            .iter()
            .filter(|&&category| !self.collection(category).is_empty())
            .map(|&category| CollectionSnapshot {
                category,
                entities: self
                    .iter(category)
                    .map(|(_, entity)| EntitySnapshot {
                        name: entity.name().to_string(),
                        kind: entity.kind().clone(),
                        objects: entity.objects().map(<[Anchor]>::to_vec).unwrap_or_default(),
                        links: entity.links().iter().filter_map(|&id| link_ref(id)).collect(),
                    })
                    .collect(),
            })
            .collect();
        Snapshot {
            version: SNAPSHOT_VERSION,
            collections,
        }
    }

    /// Rebuild a model from a snapshot. Names are kept verbatim, links are
    /// re-attached by name and `users` recomputed from them.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Database> {
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(ModelError::UnsupportedVersion(snapshot.version));
        }
        let mut db = Database::new();
        let mut inserted = Vec::new();
        for collection in &snapshot.collections {
            for entity in &collection.entities {
                if entity.kind.category() != collection.category {
                    return Err(ModelError::CategoryMismatch {
                        name: entity.name.clone(),
                        expected: collection.category,
                        found: entity.kind.category(),
                    });
                }
                let id = db.insert(
                    entity.name.clone(),
                    entity.kind.clone(),
                    entity.objects.clone(),
                )?;
                inserted.push((id, &entity.links));
            }
        }
        for (id, links) in inserted {
            let targets = links
                .iter()
                .map(|link| db.find(link.category, &link.name))
                .collect::<Result<Vec<_>>>()?;
            db.store_links(id, targets)?;
        }
        Ok(db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{ConstitutiveLaw, Dim, Element};
    use crate::registry::TypeTag;

    fn sample() -> Database {
        let mut db = Database::new();
        let law = db
            .create(
                "spring",
                Kind::ConstitutiveLaw(ConstitutiveLaw::LinearElastic {
                    dim: Dim::D1,
                    stiffness: 1000.0,
                }),
                vec![],
                vec![],
            )
            .unwrap();
        db.create(
            "rod",
            Kind::Element(Element::Rod),
            vec!["A".into(), "B".into()],
            vec![law],
        )
        .unwrap();
        db.create("rod", Kind::Element(Element::Rod), vec!["B".into(), "C".into()], vec![law])
            .unwrap();
        db.create_default(TypeTag::UnitDrive, vec![], vec![]).unwrap();
        db
    }

    #[test]
    fn test_snapshot_restores_model() {
        let db = sample();
        let snapshot = db.to_snapshot();
        assert_eq!(snapshot.collections.len(), 3);

        let restored = Database::from_snapshot(&snapshot).unwrap();
        assert_eq!(restored.len(), db.len());
        let law = restored.lookup(Category::ConstitutiveLaw, "spring").unwrap();
        assert_eq!(law.users(), 2);
        let rod = restored.find(Category::Element, "rod.001").unwrap();
        assert_eq!(restored.position(rod).unwrap(), 1);
        assert!(restored.reference_counts_consistent());
        assert_eq!(restored.to_snapshot(), snapshot);
    }

    #[test]
    fn test_snapshot_json() {
        let snapshot = sample().to_snapshot();
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"category\": \"constitutive_law\""));
        assert_eq!(Snapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn test_dangling_link_name() {
        let mut snapshot = sample().to_snapshot();
        let elements = snapshot
            .collections
            .iter_mut()
            .find(|c| c.category == Category::Element)
            .unwrap();
        elements.entities[0].links[0].name = "missing".into();
        let err = Database::from_snapshot(&snapshot).unwrap_err();
        assert_eq!(
            err,
            ModelError::UnknownEntity {
                category: Category::ConstitutiveLaw,
                name: "missing".into()
            }
        );
    }

    #[test]
    fn test_newer_version_refused() {
        let mut snapshot = sample().to_snapshot();
        snapshot.version = SNAPSHOT_VERSION + 1;
        assert_eq!(
            Database::from_snapshot(&snapshot).unwrap_err(),
            ModelError::UnsupportedVersion(SNAPSHOT_VERSION + 1)
        );
    }
}

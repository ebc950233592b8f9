//! Structural node assignment.
//!
//! Nodes are derived from the anchors of node-producing elements and
//! drives. An anchor mapped by a rigid offset resolves to the offset's node
//! anchor (one level, never chained). The resulting node anchors are sorted
//! by name; a node's position in that order is its deck label.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use mbdeck_model::{Anchor, Category, Database, Entity, ModelError, NodeRole};

/// Classification of a structural node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeClass {
    /// Static node: no inertia of its own.
    Static,
    /// Dynamic node: carries a body.
    Dynamic,
    /// Dummy node: rigidly offset from a base node.
    Dummy,
}

/// One structural node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralNode {
    /// Anchor the node sits at.
    pub anchor: Anchor,
    /// Classification.
    pub class: NodeClass,
    /// Base node anchor of a dummy node.
    pub base: Option<Anchor>,
}

#[derive(Default)]
struct Flags {
    static_: bool,
    dynamic: bool,
    dummy: Option<Anchor>,
}

/// Sorted structural nodes plus the rigid offset map.
#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    nodes: Vec<StructuralNode>,
    index: HashMap<Anchor, usize>,
    offsets: HashMap<Anchor, Anchor>,
}

impl NodeTable {
    /// Derive the node table from the element and drive collections.
    pub fn build(db: &Database) -> Result<Self, ModelError> {
        let entities: Vec<&Entity> = [Category::Element, Category::Drive]
            .into_iter()
            .flat_map(|category| db.iter(category).map(|(_, entity)| entity))
            .filter(|entity| entity.kind().has_anchors())
            .collect();

        let mut offsets: HashMap<Anchor, Anchor> = HashMap::new();
        let mut mapped_by: HashMap<&Anchor, &str> = HashMap::new();
        for entity in &entities {
            let role = entity.kind().node_role();
            if !matches!(role, NodeRole::RigidOffset | NodeRole::DummyNode) {
                continue;
            }
            let (child, node) = mapping(entity)?;
            if let Some(by) = mapped_by.insert(child, entity.name()) {
                return Err(ModelError::AnchorAlreadyMapped {
                    anchor: child.to_string(),
                    by: by.to_string(),
                });
            }
            if role == NodeRole::RigidOffset {
                offsets.insert(child.clone(), node.clone());
            }
        }
        let resolve = |anchor: &Anchor| offsets.get(anchor).unwrap_or(anchor).clone();

        let mut flags: BTreeMap<Anchor, Flags> = BTreeMap::new();
        for entity in &entities {
            let objects = entity.objects().unwrap_or_default();
            match entity.kind().node_role() {
                NodeRole::Static => {
                    for anchor in objects {
                        flags.entry(resolve(anchor)).or_default().static_ = true;
                    }
                }
                NodeRole::Dynamic => {
                    for anchor in objects {
                        flags.entry(resolve(anchor)).or_default().dynamic = true;
                    }
                }
                NodeRole::RigidOffset => {
                    let (_, node) = mapping(entity)?;
                    flags.entry(node.clone()).or_default().static_ = true;
                }
                NodeRole::DummyNode => {
                    let (child, base) = mapping(entity)?;
                    let base = resolve(base);
                    flags.entry(base.clone()).or_default().static_ = true;
                    flags.entry(child.clone()).or_default().dummy = Some(base);
                }
                NodeRole::Reference | NodeRole::None => {}
            }
        }

        let mut nodes = Vec::with_capacity(flags.len());
        for (anchor, flag) in flags {
            let (class, base) = match (flag.dynamic, flag.dummy) {
                (true, Some(_)) => return Err(ModelError::ConflictingNodeClass(anchor.to_string())),
                (true, None) => (NodeClass::Dynamic, None),
                (false, Some(base)) => (NodeClass::Dummy, Some(base)),
                (false, None) => {
                    debug_assert!(flag.static_);
                    (NodeClass::Static, None)
                }
            };
            nodes.push(StructuralNode { anchor, class, base });
        }
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.anchor.clone(), i))
            .collect();

        let table = NodeTable {
            nodes,
            index,
            offsets,
        };
        debug!(
            "assigned {} node(s): {} static, {} dynamic, {} dummy",
            table.len(),
            table.of_class(NodeClass::Static).count(),
            table.of_class(NodeClass::Dynamic).count(),
            table.of_class(NodeClass::Dummy).count()
        );
        Ok(table)
    }

    /// Number of structural nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether there are no structural nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes sorted by anchor; position is the node label.
    pub fn nodes(&self) -> &[StructuralNode] {
        &self.nodes
    }

    /// `(label, node)` pairs of one class, in label order.
    pub fn of_class(&self, class: NodeClass) -> impl Iterator<Item = (usize, &StructuralNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, node)| node.class == class)
    }

    /// Anchor `anchor` resolves to: the rigid offset's node when mapped,
    /// itself otherwise.
    pub fn resolve<'a>(&'a self, anchor: &'a Anchor) -> &'a Anchor {
        self.offsets.get(anchor).unwrap_or(anchor)
    }

    /// Label of the node `anchor` resolves to. `entity` names the
    /// referencing entity in the error.
    pub fn node_of(&self, entity: &str, anchor: &Anchor) -> Result<usize, ModelError> {
        self.index
            .get(self.resolve(anchor))
            .copied()
            .ok_or_else(|| ModelError::UnattachedAnchor {
                entity: entity.to_string(),
                anchor: anchor.to_string(),
            })
    }

    /// Label of the node sitting exactly at `anchor`, without offset
    /// resolution.
    pub fn label(&self, anchor: &Anchor) -> Option<usize> {
        self.index.get(anchor).copied()
    }
}

fn mapping(entity: &Entity) -> Result<(&Anchor, &Anchor), ModelError> {
    match entity.objects() {
        Some([child, node]) => Ok((child, node)),
        other => Err(ModelError::AnchorCount {
            name: entity.name().to_string(),
            expected: "2".to_string(),
            found: other.map_or(0, <[Anchor]>::len),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbdeck_model::{EntityId, TypeTag};

    fn add(db: &mut Database, tag: TypeTag, anchors: &[&str], links: Vec<EntityId>) -> EntityId {
        db.create_default(tag, anchors.iter().map(|&a| Anchor::from(a)).collect(), links)
            .unwrap()
    }

    fn rod_law(db: &mut Database) -> EntityId {
        add(db, TypeTag::LinearElastic, &[], vec![])
    }

    fn labels(table: &NodeTable) -> Vec<(&str, NodeClass)> {
        table
            .nodes()
            .iter()
            .map(|n| (n.anchor.as_str(), n.class))
            .collect()
    }

    #[test]
    fn test_sorted_and_classified() {
        let mut db = Database::new();
        let law = rod_law(&mut db);
        let vector = add(&mut db, TypeTag::Vector3, &[], vec![]);
        let inertia = add(&mut db, TypeTag::Matrix3x3, &[], vec![]);
        add(&mut db, TypeTag::Rod, &["b", "a"], vec![law]);
        add(&mut db, TypeTag::Body, &["b"], vec![vector, inertia]);
        add(&mut db, TypeTag::Clamp, &["c"], vec![]);

        let table = NodeTable::build(&db).unwrap();
        assert_eq!(
            labels(&table),
            vec![
                ("a", NodeClass::Static),
                ("b", NodeClass::Dynamic),
                ("c", NodeClass::Static)
            ]
        );
        assert_eq!(table.node_of("rod", &Anchor::from("c")), Ok(2));
    }

    #[test]
    fn test_stable_and_reindexed_on_rename() {
        let mut db = Database::new();
        let law = rod_law(&mut db);
        add(&mut db, TypeTag::Rod, &["m", "k"], vec![law]);
        let first = NodeTable::build(&db).unwrap();
        let second = NodeTable::build(&db).unwrap();
        assert_eq!(first.nodes(), second.nodes());
        assert_eq!(first.node_of("rod", &Anchor::from("k")), Ok(0));

        let rod = db.find(Category::Element, "Rod").unwrap();
        db.edit(
            rod,
            TypeTag::Rod.make(),
            vec!["m".into(), "z".into()],
            vec![law],
        )
        .unwrap();
        let renamed = NodeTable::build(&db).unwrap();
        assert_eq!(renamed.node_of("rod", &Anchor::from("m")), Ok(0));
        assert_eq!(renamed.node_of("rod", &Anchor::from("z")), Ok(1));
    }

    #[test]
    fn test_rigid_offset_resolves_one_level() {
        let mut db = Database::new();
        let vector = add(&mut db, TypeTag::Vector3, &[], vec![]);
        let unit = add(&mut db, TypeTag::UnitDrive, &[], vec![]);
        add(&mut db, TypeTag::Clamp, &["hub"], vec![]);
        add(&mut db, TypeTag::RigidOffset, &["tip", "hub"], vec![]);
        add(&mut db, TypeTag::StructuralForce, &["tip"], vec![vector, unit]);

        let table = NodeTable::build(&db).unwrap();
        assert_eq!(labels(&table), vec![("hub", NodeClass::Static)]);
        assert_eq!(table.node_of("force", &Anchor::from("tip")), Ok(0));
        assert_eq!(table.resolve(&Anchor::from("tip")).as_str(), "hub");
    }

    #[test]
    fn test_dummy_node_keeps_its_class() {
        let mut db = Database::new();
        let law = rod_law(&mut db);
        add(&mut db, TypeTag::Rod, &["marker", "root"], vec![law]);
        add(&mut db, TypeTag::DummyNode, &["marker", "root"], vec![]);

        let table = NodeTable::build(&db).unwrap();
        assert_eq!(
            labels(&table),
            vec![("marker", NodeClass::Dummy), ("root", NodeClass::Static)]
        );
        assert_eq!(table.nodes()[0].base, Some(Anchor::from("root")));
    }

    #[test]
    fn test_dynamic_and_dummy_conflict() {
        let mut db = Database::new();
        let vector = add(&mut db, TypeTag::Vector3, &[], vec![]);
        let inertia = add(&mut db, TypeTag::Matrix3x3, &[], vec![]);
        add(&mut db, TypeTag::Body, &["marker"], vec![vector, inertia]);
        add(&mut db, TypeTag::DummyNode, &["marker", "root"], vec![]);
        assert_eq!(
            NodeTable::build(&db).unwrap_err(),
            ModelError::ConflictingNodeClass("marker".into())
        );
    }

    #[test]
    fn test_unattached_anchor() {
        let mut db = Database::new();
        let vector = add(&mut db, TypeTag::Vector3, &[], vec![]);
        let unit = add(&mut db, TypeTag::UnitDrive, &[], vec![]);
        add(&mut db, TypeTag::StructuralCouple, &["loose"], vec![vector, unit]);

        let table = NodeTable::build(&db).unwrap();
        assert!(table.is_empty());
        assert_eq!(
            table.node_of("couple", &Anchor::from("loose")),
            Err(ModelError::UnattachedAnchor {
                entity: "couple".into(),
                anchor: "loose".into()
            })
        );
    }
}

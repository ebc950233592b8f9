//! Host scene interface: world placements of spatial anchors.

use std::collections::HashMap;

use mbdeck_math::Placement;
use mbdeck_model::Anchor;
use serde::{Deserialize, Serialize};

use crate::error::{DeckError, Result};

/// Supplies the world placement of spatial anchors. The writer never
/// mutates scene data.
pub trait AnchorProvider {
    /// World position and rotation of `anchor`, `None` when unknown.
    fn placement(&self, anchor: &Anchor) -> Option<Placement>;
}

/// Fetch a placement or fail with [`DeckError::MissingAnchor`].
pub(crate) fn require(anchors: &dyn AnchorProvider, anchor: &Anchor) -> Result<Placement> {
    anchors
        .placement(anchor)
        .ok_or_else(|| DeckError::MissingAnchor(anchor.to_string()))
}

/// In-memory anchor table, typically loaded from a JSON object mapping
/// anchor names to `{ "position": [x, y, z], "rotation": [[..], [..], [..]] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneAnchors {
    anchors: HashMap<Anchor, Placement>,
}

impl SceneAnchors {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placement of `anchor`.
    pub fn insert(&mut self, anchor: impl Into<Anchor>, placement: Placement) {
        self.anchors.insert(anchor.into(), placement);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, anchor: impl Into<Anchor>, placement: Placement) -> Self {
        self.insert(anchor, placement);
        self
    }

    /// Number of anchors.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl AnchorProvider for SceneAnchors {
    fn placement(&self, anchor: &Anchor) -> Option<Placement> {
        self.anchors.get(anchor).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbdeck_math::Vec3;

    #[test]
    fn test_scene_from_json() {
        let json = r#"{
            "A": { "position": [1.0, 2.0, 3.0] },
            "B": { "position": [0.0, 0.0, 0.0], "rotation": [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]] }
        }"#;
        let scene = SceneAnchors::from_json(json).unwrap();
        assert_eq!(scene.len(), 2);
        let a = scene.placement(&Anchor::from("A")).unwrap();
        assert_eq!(a.position, Vec3::new(1.0, 2.0, 3.0));
        let b = scene.placement(&Anchor::from("B")).unwrap();
        assert_eq!(b.rotation[(0, 1)], -1.0);
        assert!(scene.placement(&Anchor::from("C")).is_none());
    }

    #[test]
    fn test_require_reports_anchor() {
        let scene = SceneAnchors::new();
        let err = require(&scene, &Anchor::from("ghost")).unwrap_err();
        assert_eq!(err.to_string(), "No placement for anchor \"ghost\"");
    }
}

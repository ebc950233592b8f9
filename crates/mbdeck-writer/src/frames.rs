//! Reference frame resolution.
//!
//! A frame's origin is its first anchor. Its optional second anchor names
//! the parent: the frame whose origin is that anchor. Frames are resolved
//! parents first and every quantity is expressed in the parent's axes (or
//! the global frame for parentless frames).

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;
use mbdeck_math::{Mat3, Placement, Vec3};
use mbdeck_model::{Anchor, Category, Database, EntityId, ModelError};

use crate::anchors::{require, AnchorProvider};
use crate::error::{DeckError, Result};

/// A frame expressed relative to its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFrame {
    /// Frame entity.
    pub id: EntityId,
    /// Frame name.
    pub name: String,
    /// Origin anchor.
    pub origin: Anchor,
    /// Parent frame, `None` for the global frame.
    pub parent: Option<EntityId>,
    /// Origin in parent axes.
    pub position: Vec3,
    /// Orientation relative to the parent.
    pub orientation: Mat3,
    /// Linear velocity in parent axes.
    pub velocity: Vec3,
    /// Angular velocity in parent axes.
    pub angular_velocity: Vec3,
    /// World placement of the origin.
    pub world: Placement,
}

struct Pending {
    id: EntityId,
    name: String,
    origin: Anchor,
    parent: Option<EntityId>,
    vectors: [Vec3; 2],
}

/// Resolve every frame of `db`, parents before children.
///
/// Fails with [`ModelError::DanglingFrameParent`] or
/// [`ModelError::AmbiguousFrameParent`] when a parent anchor matches no or
/// several frame origins, and with [`ModelError::UnresolvableFrames`] when
/// frames depend on each other in a cycle. An origin without placement
/// fails with [`DeckError::MissingAnchor`].
pub fn resolve_frames(db: &Database, anchors: &dyn AnchorProvider) -> Result<Vec<ResolvedFrame>> {
    let (resolved, skipped) = resolve_partial(db, anchors)?;
    match skipped.into_iter().next() {
        Some((_, err)) => Err(err),
        None => Ok(resolved),
    }
}

/// As [`resolve_frames`], but a frame whose origin has no placement is
/// skipped along with its descendants instead of failing the pass. Skipped
/// frames come back by name with their error.
pub(crate) fn resolve_partial(
    db: &Database,
    anchors: &dyn AnchorProvider,
) -> Result<(Vec<ResolvedFrame>, Vec<(String, DeckError)>)> {
    let pending = collect(db)?;
    let mut queue: VecDeque<usize> = (0..pending.len()).collect();
    let mut queued: HashSet<EntityId> = pending.iter().map(|f| f.id).collect();
    let mut world: HashMap<EntityId, Placement> = HashMap::new();
    let mut resolved = Vec::with_capacity(pending.len());
    let mut dropped: HashSet<EntityId> = HashSet::new();
    let mut skipped = Vec::new();
    let mut requeues = 0;
    let mut stalled = 0;

    while let Some(i) = queue.pop_front() {
        let frame = &pending[i];
        if let Some(parent) = frame.parent.filter(|p| queued.contains(p)) {
            debug_assert_ne!(parent, frame.id);
            queue.push_back(i);
            requeues += 1;
            stalled += 1;
            if stalled > queue.len() {
                let mut names: Vec<String> = queue.iter().map(|&j| pending[j].name.clone()).collect();
                names.sort();
                return Err(ModelError::UnresolvableFrames(names).into());
            }
            continue;
        }
        stalled = 0;
        queued.remove(&frame.id);

        if let Some(parent) = frame.parent.filter(|p| dropped.contains(p)) {
            dropped.insert(frame.id);
            let parent = db.name_of(parent).to_string();
            skipped.push((frame.name.clone(), DeckError::SkippedParent(parent)));
            continue;
        }
        let placement = match require(anchors, &frame.origin) {
            Ok(placement) => placement,
            Err(err) => {
                dropped.insert(frame.id);
                skipped.push((frame.name.clone(), err));
                continue;
            }
        };
        let base = frame
            .parent
            .and_then(|p| world.get(&p).copied())
            .unwrap_or_else(Placement::identity);
        let local = placement.relative_to(&base);
        resolved.push(ResolvedFrame {
            id: frame.id,
            name: frame.name.clone(),
            origin: frame.origin.clone(),
            parent: frame.parent,
            position: local.position,
            orientation: local.rotation,
            velocity: base.to_local(&frame.vectors[0]),
            angular_velocity: base.to_local(&frame.vectors[1]),
            world: placement,
        });
        world.insert(frame.id, placement);
    }

    debug!(
        "resolved {} frame(s) with {} requeue(s), {} skipped",
        resolved.len(),
        requeues,
        skipped.len()
    );
    Ok((resolved, skipped))
}

fn collect(db: &Database) -> Result<Vec<Pending>> {
    let frames: Vec<_> = db.iter(Category::Frame).collect();
    let mut by_origin: HashMap<&Anchor, Vec<EntityId>> = HashMap::new();
    for (id, entity) in frames.iter().copied() {
        if let Some(origin) = entity.anchor(0) {
            by_origin.entry(origin).or_default().push(id);
        }
    }

    let mut pending = Vec::with_capacity(frames.len());
    for (id, entity) in frames {
        let origin = entity
            .anchor(0)
            .cloned()
            .ok_or_else(|| ModelError::AnchorCount {
                name: entity.name().to_string(),
                expected: "1 to 2".to_string(),
                found: 0,
            })?;
        let parent = match entity.anchor(1) {
            None => None,
            Some(anchor) => {
                let candidates: Vec<EntityId> = by_origin
                    .get(anchor)
                    .map(|ids| ids.iter().copied().filter(|&other| other != id).collect())
                    .unwrap_or_default();
                match candidates.as_slice() {
                    [] => {
                        return Err(ModelError::DanglingFrameParent {
                            frame: entity.name().to_string(),
                            anchor: anchor.to_string(),
                        }
                        .into())
                    }
                    [parent] => Some(*parent),
                    _ => {
                        return Err(ModelError::AmbiguousFrameParent {
                            frame: entity.name().to_string(),
                            anchor: anchor.to_string(),
                        }
                        .into())
                    }
                }
            }
        };
        let mut vectors = [Vec3::zeros(); 2];
        for (slot, &link) in vectors.iter_mut().zip(entity.links()) {
            let vector = db.get(link)?.kind().as_matrix().and_then(|m| m.as_vector3());
            if let Some([x, y, z]) = vector {
                *slot = Vec3::new(x, y, z);
            }
        }
        pending.push(Pending {
            id,
            name: entity.name().to_string(),
            origin,
            parent,
            vectors,
        });
    }
    Ok(pending)
}

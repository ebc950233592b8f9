//! Error types for model editing and the derived passes.

use thiserror::Error;

use crate::kinds::Category;

/// Errors raised by the entity graph, the frame resolver and node
/// assignment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Lookup by a name no entity carries.
    #[error("No entity named \"{name}\" in {category}")]
    UnknownEntity {
        /// Collection searched.
        category: Category,
        /// Name looked up.
        name: String,
    },

    /// Id of an entity that no longer exists.
    #[error("Stale entity reference")]
    StaleId,

    /// Every suffix `.001` to `.999` is taken.
    #[error("No free name left for \"{0}\" (tried .001 to .999)")]
    NameExhausted(String),

    /// A verbatim insert, as done when restoring a snapshot, under a name
    /// already taken in the same collection.
    #[error("Name \"{0}\" is already taken")]
    DuplicateName(String),

    /// Removal of an entity still linked by others.
    #[error("\"{name}\" is used by {users} other entit(ies)")]
    InUse {
        /// Entity name.
        name: String,
        /// Current users.
        users: u32,
    },

    /// Second instance of a singleton type.
    #[error("Only one {0} may exist")]
    SingletonExists(&'static str),

    /// Edit that would move an entity to another category.
    #[error("\"{name}\" is a {expected} entity, not {found}")]
    CategoryMismatch {
        /// Entity name.
        name: String,
        /// Current category.
        expected: Category,
        /// Category of the new kind.
        found: Category,
    },

    /// Wrong number of spatial anchors.
    #[error("\"{name}\" takes {expected} anchor(s), got {found}")]
    AnchorCount {
        /// Entity name.
        name: String,
        /// Allowed count, e.g. `"2"` or `"1 to 2"`.
        expected: String,
        /// Supplied count.
        found: usize,
    },

    /// A child anchor already mapped by another rigid offset or dummy node.
    #[error("Anchor \"{anchor}\" is already mapped by \"{by}\"")]
    AnchorAlreadyMapped {
        /// Child anchor.
        anchor: String,
        /// Entity holding the mapping.
        by: String,
    },

    /// Anchors given that cannot be used, e.g. a mapping onto itself.
    #[error("Invalid anchors for \"{name}\": {reason}")]
    InvalidAnchors {
        /// Entity name.
        name: String,
        /// Reason.
        reason: String,
    },

    /// Links that do not match the kind's signature.
    #[error("Invalid links for \"{name}\": {reason}")]
    LinkMismatch {
        /// Entity name.
        name: String,
        /// Reason.
        reason: String,
    },

    /// A second driven element wrapping the same element.
    #[error("\"{element}\" is already driven by \"{by}\"")]
    AlreadyDriven {
        /// Wrapped element.
        element: String,
        /// Driven element holding it.
        by: String,
    },

    /// An entity linking itself.
    #[error("\"{0}\" cannot link itself")]
    SelfLink(String),

    /// A link that would close a cycle.
    #[error("Linking \"{from}\" to \"{to}\" would create a cycle")]
    LinkCycle {
        /// Linking entity.
        from: String,
        /// Link target.
        to: String,
    },

    /// Attribute values rejected by the kind.
    #[error("Invalid attributes for \"{name}\": {reason}")]
    InvalidAttribute {
        /// Entity name.
        name: String,
        /// Reason.
        reason: String,
    },

    /// Snapshot written by a newer format version.
    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    /// Frames left after the requeue bound, cycles included.
    #[error("Unresolvable reference frames: {}", .0.join(", "))]
    UnresolvableFrames(Vec<String>),

    /// A frame whose parent anchor is no frame's origin.
    #[error("Parent anchor \"{anchor}\" of frame \"{frame}\" is not the origin of any frame")]
    DanglingFrameParent {
        /// Frame name.
        frame: String,
        /// Parent-defining anchor.
        anchor: String,
    },

    /// More than one frame shares the matched origin anchor.
    #[error("Parent anchor \"{anchor}\" of frame \"{frame}\" is the origin of several frames")]
    AmbiguousFrameParent {
        /// Frame name.
        frame: String,
        /// Parent-defining anchor.
        anchor: String,
    },

    /// A node classified both dynamic and dummy.
    #[error("Node \"{0}\" is both dynamic and dummy")]
    ConflictingNodeClass(String),

    /// An anchor that resolves to no node.
    #[error("Anchor \"{anchor}\" of \"{entity}\" is not attached to any node")]
    UnattachedAnchor {
        /// Referencing entity.
        entity: String,
        /// Anchor.
        anchor: String,
    },
}

/// Result alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

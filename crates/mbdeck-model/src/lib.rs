#![warn(missing_docs)]

//! Typed entity and link graph for multibody models.
//!
//! Entities (drives, laws, frames, elements, ...) live in a [`Database`],
//! grouped in one [`Collection`] per [`Category`]. Links between entities
//! are ordered and reference counted: an entity can only be deleted once no
//! other entity links it.
//!
//! # Example
//!
//! ```rust,no_run
//! use mbdeck_model::{Database, TypeTag};
//!
//! # fn main() -> mbdeck_model::Result<()> {
//! let mut db = Database::new();
//! let law = db.create_default(TypeTag::LinearElastic, vec![], vec![])?;
//! let rod = db.create_default(TypeTag::Rod, vec!["A".into(), "B".into()], vec![law])?;
//!
//! assert_eq!(db.get(rod)?.links(), &[law]);
//! assert_eq!(db.get(law)?.users(), 1);
//! assert!(db.delete(law).is_err());
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod database;
pub mod entity;
pub mod error;
pub mod kinds;
pub mod registry;
pub mod snapshot;

pub use collection::Collection;
pub use database::{Database, MAX_NAME_SUFFIX};
pub use entity::{Anchor, Entity, EntityId};
pub use error::{ModelError, Result};
pub use kinds::{Category, Kind, LinkSlots, NodeRole, Slot};
pub use registry::{find_type, registry, TypeInfo, TypeTag};
pub use snapshot::{CollectionSnapshot, EntitySnapshot, LinkRef, Snapshot, SNAPSHOT_VERSION};

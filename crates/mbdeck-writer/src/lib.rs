#![warn(missing_docs)]

//! MBDyn deck emission for `mbdeck-model` databases.
//!
//! One emission pass resolves reference frames parents first, derives the
//! structural node table from element and drive anchors, then writes the
//! deck. Placements of anchors come from an [`AnchorProvider`].
//!
//! # Example
//!
//! ```rust,no_run
//! use mbdeck_math::Placement;
//! use mbdeck_model::{Database, TypeTag};
//! use mbdeck_writer::{write_deck, SceneAnchors, Simulation};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut db = Database::new();
//! let law = db.create_default(TypeTag::LinearElastic, vec![], vec![])?;
//! db.create_default(TypeTag::Rod, vec!["A".into(), "B".into()], vec![law])?;
//!
//! let scene = SceneAnchors::new()
//!     .with("A", Placement::at(0.0, 0.0, 0.0))
//!     .with("B", Placement::at(1.0, 0.0, 0.0));
//! let deck = write_deck(&db, &scene, &Simulation::default())?;
//! println!("{}", deck.text);
//! # Ok(())
//! # }
//! ```

pub mod anchors;
pub mod deck;
pub mod error;
pub mod frames;
pub mod nodes;
mod render;
pub mod resume;
pub mod settings;

pub use anchors::{AnchorProvider, SceneAnchors};
pub use deck::{write_deck, Deck, Diagnostic};
pub use error::{DeckError, Result};
pub use frames::{resolve_frames, ResolvedFrame};
pub use nodes::{NodeClass, NodeTable, StructuralNode};
pub use settings::{Method, Simulation};

//! mbdeck: multibody models as a typed entity graph, written out as MBDyn
//! input decks.
//!
//! This crate re-exports the workspace libraries:
//!
//! - [`math`]: placements and deck number formatting
//! - [`model`]: entities, links, collections and snapshots
//! - [`writer`]: frame resolution, node assignment and deck emission
//!
//! # Example
//!
//! ```rust,no_run
//! use mbdeck::math::Placement;
//! use mbdeck::model::{Database, TypeTag};
//! use mbdeck::writer::{write_deck, SceneAnchors, Simulation};
//!
//! let mut db = Database::new();
//! let law = db.create_default(TypeTag::LinearElastic, vec![], vec![]).unwrap();
//! db.create_default(TypeTag::Rod, vec!["A".into(), "B".into()], vec![law])
//!     .unwrap();
//!
//! let scene = SceneAnchors::new()
//!     .with("A", Placement::at(0.0, 0.0, 0.0))
//!     .with("B", Placement::at(1.0, 0.0, 0.0));
//! let deck = write_deck(&db, &scene, &Simulation::default()).unwrap();
//! deck.write_to("rod.mbd".as_ref()).unwrap();
//! ```

pub use mbdeck_math as math;
pub use mbdeck_model as model;
pub use mbdeck_writer as writer;

pub use mbdeck_model::{Database, TypeTag};
pub use mbdeck_writer::{write_deck, Deck, SceneAnchors, Simulation};

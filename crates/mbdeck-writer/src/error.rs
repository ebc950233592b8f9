//! Error types for deck emission.

use mbdeck_model::ModelError;
use thiserror::Error;

/// Errors that abort a whole emission pass.
///
/// Failures confined to one element do not surface here; they end up as
/// [`Diagnostic`](crate::Diagnostic)s next to the deck text.
#[derive(Error, Debug)]
pub enum DeckError {
    /// Structural model error.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The anchor provider knows nothing about an anchor.
    #[error("No placement for anchor \"{0}\"")]
    MissingAnchor(String),

    /// A frame left out because its parent frame could not be placed.
    #[error("Parent frame \"{0}\" could not be written")]
    SkippedParent(String),

    /// Writing into the text buffer failed.
    #[error("Failed to format deck text")]
    Format(#[from] std::fmt::Error),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for deck operations.
pub type Result<T> = std::result::Result<T, DeckError>;

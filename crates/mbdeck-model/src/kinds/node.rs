//! Reference frames, non-structural nodes and file drivers.

use serde::{Deserialize, Serialize};

/// Reference frame. The origin is the first anchor; the optional second
/// anchor names the parent frame's origin. Links the linear and angular
/// velocity vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Frame {
    /// Reference frame.
    Reference,
}

/// Non-structural node variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NsNode {
    /// Abstract scalar node.
    Abstract {
        /// Differential rather than algebraic.
        differential: bool,
        /// Initial value.
        value: f64,
    },
    /// Electric node.
    Electric {
        /// Initial value.
        value: f64,
    },
    /// Hydraulic node.
    Hydraulic {
        /// Initial pressure.
        value: f64,
    },
    /// Parameter node.
    Parameter {
        /// Value.
        value: f64,
    },
}

/// Interpolation between samples of a file driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Linear between samples.
    Linear,
    /// Hold the previous sample.
    Const,
}

/// Driver variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Driver {
    /// Samples read from a file at a fixed time step.
    FixedStep {
        /// Number of samples.
        steps: u32,
        /// Number of columns.
        columns: u32,
        /// Time of the first sample.
        initial_time: f64,
        /// Sample spacing.
        time_step: f64,
        /// Interpolation between samples.
        interpolation: Interpolation,
        /// Pad with zeroes past the last sample.
        pad_zeroes: bool,
        /// Path of the data file.
        path: String,
    },
}

//! Simulation settings written to the data, initial value and control
//! blocks.

use std::fmt;
use std::path::PathBuf;

use mbdeck_math::real;
use serde::{Deserialize, Serialize};

/// Integration method of the initial value problem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Method {
    /// Crank-Nicolson.
    CrankNicolson,
    /// Multistep with the given asymptotic spectral radius.
    Ms {
        /// Spectral radius.
        rho: f64,
    },
    /// Hope with the given asymptotic spectral radius.
    Hope {
        /// Spectral radius.
        rho: f64,
    },
    /// Third order.
    ThirdOrder,
    /// Implicit Euler.
    ImplicitEuler,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::CrankNicolson => f.write_str("crank nicolson"),
            Method::Ms { rho } => write!(f, "ms, {}", real(*rho)),
            Method::Hope { rho } => write!(f, "hope, {}", real(*rho)),
            Method::ThirdOrder => f.write_str("thirdorder"),
            Method::ImplicitEuler => f.write_str("implicit euler"),
        }
    }
}

/// Initial value problem settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Simulation {
    /// Start time.
    pub initial_time: f64,
    /// End time.
    pub final_time: f64,
    /// Time step.
    pub time_step: f64,
    /// Newton iterations per step.
    pub max_iterations: u32,
    /// Residual tolerance.
    pub tolerance: f64,
    /// Derivatives tolerance.
    pub derivatives_tolerance: f64,
    /// Integration method.
    pub method: Method,
    /// Write output every n steps.
    pub output_frequency: u32,
    /// Previous solver log to resume from; its last step time replaces
    /// `initial_time`.
    pub resume_from: Option<PathBuf>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            initial_time: 0.0,
            final_time: 10.0,
            time_step: 1e-3,
            max_iterations: 10,
            tolerance: 1e-6,
            derivatives_tolerance: 1e-9,
            method: Method::Ms { rho: 0.6 },
            output_frequency: 1,
            resume_from: None,
        }
    }
}

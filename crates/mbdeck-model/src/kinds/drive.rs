//! Drive laws: scalar functions of time used as loads, lengths and angles.

use serde::{Deserialize, Serialize};

/// Number of periods a sine/cosine drive runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cycles {
    /// Half a period, then hold.
    Half,
    /// One period, then hold.
    One,
    /// Never stops.
    Forever,
    /// A given number of periods.
    Count(u32),
}

/// Drive law variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Drive {
    /// Always one.
    Unit,
    /// Always zero.
    Null,
    /// Constant value.
    Constant {
        /// Value.
        value: f64,
    },
    /// The simulation time.
    Time,
    /// `offset + slope * t`.
    Linear {
        /// Value at `t = 0`.
        offset: f64,
        /// Slope.
        slope: f64,
    },
    /// Second order polynomial of time.
    Parabolic {
        /// Coefficient of `t^0`.
        c0: f64,
        /// Coefficient of `t^1`.
        c1: f64,
        /// Coefficient of `t^2`.
        c2: f64,
    },
    /// Third order polynomial of time.
    Cubic {
        /// Coefficient of `t^0`.
        c0: f64,
        /// Coefficient of `t^1`.
        c1: f64,
        /// Coefficient of `t^2`.
        c2: f64,
        /// Coefficient of `t^3`.
        c3: f64,
    },
    /// Jumps from `initial_value` to `step_value` at `initial_time`.
    Step {
        /// Step time.
        initial_time: f64,
        /// Value after the step.
        step_value: f64,
        /// Value before the step.
        initial_value: f64,
    },
    /// Holds `step_value` between two times.
    DoubleStep {
        /// Start of the step.
        initial_time: f64,
        /// End of the step.
        final_time: f64,
        /// Value during the step.
        step_value: f64,
        /// Value outside the step.
        initial_value: f64,
    },
    /// Ramp starting at `initial_time`, optionally ending at `final_time`.
    Ramp {
        /// Slope.
        slope: f64,
        /// Start time.
        initial_time: f64,
        /// End time, `None` for forever.
        final_time: Option<f64>,
        /// Value before the ramp.
        initial_value: f64,
    },
    /// Sine wave.
    Sine {
        /// Start time.
        initial_time: f64,
        /// Angular frequency.
        omega: f64,
        /// Amplitude.
        amplitude: f64,
        /// Duration in periods.
        cycles: Cycles,
        /// Value before start.
        initial_value: f64,
    },
    /// Cosine wave.
    Cosine {
        /// Start time.
        initial_time: f64,
        /// Angular frequency.
        omega: f64,
        /// Amplitude.
        amplitude: f64,
        /// Duration in periods.
        cycles: Cycles,
        /// Value before start.
        initial_value: f64,
    },
    /// Exponential approach.
    Exponential {
        /// Amplitude.
        amplitude: f64,
        /// Time constant.
        time_constant: f64,
        /// Start time.
        initial_time: f64,
        /// Value before start.
        initial_value: f64,
    },
    /// Math expression evaluated by the solver.
    Expression {
        /// Expression text, e.g. `"Time > 1."`.
        expression: String,
    },
    /// Sum of the linked drives.
    Array,
    /// The linked scalar function evaluated at time.
    ScalarFunction,
    /// A column of the linked file driver.
    File {
        /// Column, 1-based.
        column: u32,
        /// Scale applied to the column.
        amplitude: f64,
    },
    /// A private data value of the structural node at the anchor, fed
    /// through the linked drive.
    NodeValue {
        /// Private data name, e.g. `"X[3]"`.
        property: String,
    },
}

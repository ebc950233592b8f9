//! Scalar functions referenced by name from drives and friction models.

use serde::{Deserialize, Serialize};

/// Scalar function variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Function {
    /// Constant.
    Const {
        /// Value.
        value: f64,
    },
    /// `multiplier * base^(coefficient * x)`.
    Exp {
        /// Base.
        base: f64,
        /// Exponent coefficient.
        coefficient: f64,
        /// Multiplier.
        multiplier: f64,
    },
    /// `multiplier * log_base(coefficient * x)`.
    Log {
        /// Base.
        base: f64,
        /// Argument coefficient.
        coefficient: f64,
        /// Multiplier.
        multiplier: f64,
    },
    /// `x^exponent`.
    Pow {
        /// Exponent.
        exponent: f64,
    },
    /// Straight line through two points.
    Linear {
        /// First abscissa.
        x1: f64,
        /// First ordinate.
        y1: f64,
        /// Second abscissa.
        x2: f64,
        /// Second ordinate.
        y2: f64,
    },
    /// Natural cubic spline through `(x, y)` points.
    CubicSpline {
        /// Points, sorted by abscissa.
        points: Vec<[f64; 2]>,
        /// Extrapolate beyond the first and last point.
        extrapolate: bool,
    },
    /// Piecewise linear through `(x, y)` points.
    Multilinear {
        /// Points, sorted by abscissa.
        points: Vec<[f64; 2]>,
        /// Extrapolate beyond the first and last point.
        extrapolate: bool,
    },
    /// Chebychev series on `[lower, upper]`.
    Chebychev {
        /// Interval start.
        lower: f64,
        /// Interval end.
        upper: f64,
        /// Series coefficients.
        coefficients: Vec<f64>,
        /// Extrapolate outside the interval.
        extrapolate: bool,
    },
    /// Sum of the two linked functions.
    Sum,
    /// Difference of the two linked functions.
    Sub,
    /// Product of the two linked functions.
    Mul,
    /// Quotient of the two linked functions.
    Div,
}

impl Function {
    pub(crate) fn validate(&self) -> Result<(), String> {
        match self {
            Function::CubicSpline { points, .. } if points.len() < 3 => {
                Err(format!("needs at least 3 points, got {}", points.len()))
            }
            Function::Multilinear { points, .. } if points.len() < 2 => {
                Err(format!("needs at least 2 points, got {}", points.len()))
            }
            Function::CubicSpline { points, .. } | Function::Multilinear { points, .. }
                if points.windows(2).any(|w| w[1][0] <= w[0][0]) =>
            {
                Err("abscissae must be strictly increasing".to_string())
            }
            Function::Chebychev {
                lower,
                upper,
                coefficients,
                ..
            } => {
                if lower >= upper {
                    Err(format!("lower bound {} must be below upper bound {}", lower, upper))
                } else if coefficients.is_empty() {
                    Err("needs at least one coefficient".to_string())
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }
}

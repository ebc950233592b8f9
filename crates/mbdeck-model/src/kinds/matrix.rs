//! Vector and matrix entities.

use serde::{Deserialize, Serialize};

/// Shape of a matrix entity, used to type link slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixShape {
    /// 3x1 vector.
    Vector3,
    /// 6x1 vector.
    Vector6,
    /// 3x3 matrix.
    Matrix3x3,
    /// 6x6 matrix.
    Matrix6x6,
}

/// Constant vectors and matrices referenced by other entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Matrix {
    /// 3x1 vector; `None` is the null vector.
    Vector3 {
        /// Components, or `None` for `null`.
        values: Option<[f64; 3]>,
    },
    /// 6x1 vector; `None` is the null vector.
    Vector6 {
        /// Components, or `None` for `null`.
        values: Option<[f64; 6]>,
    },
    /// 3x3 matrix.
    Matrix3x3 {
        /// Matrix form.
        form: Matrix3Form,
    },
    /// 6x6 matrix.
    Matrix6x6 {
        /// Matrix form.
        form: Matrix6Form,
    },
}

impl Matrix {
    /// Null 3x1 vector.
    pub fn null_vector() -> Self {
        Matrix::Vector3 { values: None }
    }

    /// 3x1 vector from components.
    pub fn vector(x: f64, y: f64, z: f64) -> Self {
        Matrix::Vector3 {
            values: Some([x, y, z]),
        }
    }

    /// Shape of this matrix.
    pub fn shape(&self) -> MatrixShape {
        match self {
            Matrix::Vector3 { .. } => MatrixShape::Vector3,
            Matrix::Vector6 { .. } => MatrixShape::Vector6,
            Matrix::Matrix3x3 { .. } => MatrixShape::Matrix3x3,
            Matrix::Matrix6x6 { .. } => MatrixShape::Matrix6x6,
        }
    }

    /// The 3x1 components, with `null` as zeros. `None` for other shapes.
    pub fn as_vector3(&self) -> Option<[f64; 3]> {
        match self {
            Matrix::Vector3 { values } => Some(values.unwrap_or([0.0; 3])),
            _ => None,
        }
    }
}

/// Forms of a 3x3 matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matrix3Form {
    /// All zeros.
    Null,
    /// Identity.
    Eye,
    /// Diagonal.
    Diag([f64; 3]),
    /// Symmetric, upper triangle row by row (`m11 m12 m13 m22 m23 m33`).
    Sym([f64; 6]),
    /// Full matrix, row major.
    Full([[f64; 3]; 3]),
}

/// Forms of a 6x6 matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matrix6Form {
    /// All zeros.
    Null,
    /// Identity.
    Eye,
    /// Diagonal.
    Diag([f64; 6]),
    /// Full matrix, row major.
    Full([[f64; 6]; 6]),
}

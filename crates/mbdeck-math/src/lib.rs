#![warn(missing_docs)]

//! Math types for mbdeck.
//!
//! Thin wrappers around nalgebra for the quantities a multibody deck is
//! built from: positions, rotation matrices and world placements of host
//! anchors, plus the rounding and text rendering every number goes through
//! before it reaches the deck.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A 3x3 matrix, used for rotations and inertia tensors.
pub type Mat3 = Matrix3<f64>;

/// Number of decimals every emitted real is rounded to.
pub const DECIMALS: i32 = 5;

/// Round `value` to [`DECIMALS`] decimals.
///
/// Negative zero is folded into zero so that `-0.000001` and `0.000001`
/// render identically. Values too large to be scaled are returned as is.
pub fn round(value: f64) -> f64 {
    let scale = 10f64.powi(DECIMALS);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Render one real: rounded, then written with the shortest text that
/// round-trips (`1000`, `0.5`, `-0.00001`).
pub fn real(value: f64) -> String {
    format!("{}", round(value))
}

/// Render a list of reals separated by `", "`.
pub fn reals(values: &[f64]) -> String {
    values.iter().map(|v| real(*v)).collect::<Vec<_>>().join(", ")
}

/// Render the three components of a vector.
pub fn vec3(v: &Vec3) -> String {
    reals(&[v.x, v.y, v.z])
}

/// Render a 3x3 matrix row by row.
pub fn mat3(m: &Mat3) -> String {
    let values: Vec<f64> = (0..3)
        .flat_map(|r| (0..3).map(move |c| m[(r, c)]))
        .collect();
    reals(&values)
}

/// Render fixed-width rows, row after row.
pub fn rows<const N: usize>(rows: &[[f64; N]]) -> String {
    let values: Vec<f64> = rows.iter().flatten().copied().collect();
    reals(&values)
}

/// Rotation about the X axis by `angle` radians.
pub fn rotation_x(angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    Mat3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c)
}

/// Rotation about the Y axis by `angle` radians.
pub fn rotation_y(angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    Mat3::new(c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c)
}

/// Rotation about the Z axis by `angle` radians.
pub fn rotation_z(angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    Mat3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}

/// World-space position and orientation of a host anchor.
///
/// The rotation is expected to be orthonormal, so its inverse is its
/// transpose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PlacementDef", into = "PlacementDef")]
pub struct Placement {
    /// Position in world coordinates.
    pub position: Vec3,
    /// Orientation relative to the world axes.
    pub rotation: Mat3,
}

impl Placement {
    /// The global frame: origin, identity rotation.
    pub fn identity() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Mat3::identity(),
        }
    }

    /// Placement from a position and a rotation.
    pub fn new(position: Vec3, rotation: Mat3) -> Self {
        Self { position, rotation }
    }

    /// Unrotated placement at `(x, y, z)`.
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self::new(Vec3::new(x, y, z), Mat3::identity())
    }

    /// Replace the rotation.
    pub fn rotated(self, rotation: Mat3) -> Self {
        Self { rotation, ..self }
    }

    /// Express a world direction in this placement's axes (`Rᵀ v`).
    pub fn to_local(&self, v: &Vec3) -> Vec3 {
        self.rotation.transpose() * v
    }

    /// Express `self` relative to `base`: position `Rbᵀ (p − pb)`, rotation
    /// `Rbᵀ R`.
    pub fn relative_to(&self, base: &Placement) -> Placement {
        let inv = base.rotation.transpose();
        Placement {
            position: inv * (self.position - base.position),
            rotation: inv * self.rotation,
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::identity()
    }
}

/// Row-major serde form of a [`Placement`].
#[derive(Serialize, Deserialize)]
struct PlacementDef {
    position: [f64; 3],
    #[serde(default = "identity_rows")]
    rotation: [[f64; 3]; 3],
}

fn identity_rows() -> [[f64; 3]; 3] {
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
}

impl From<PlacementDef> for Placement {
    fn from(def: PlacementDef) -> Self {
        let r = def.rotation;
        Placement {
            position: Vec3::from(def.position),
            rotation: Mat3::new(
                r[0][0], r[0][1], r[0][2], r[1][0], r[1][1], r[1][2], r[2][0], r[2][1], r[2][2],
            ),
        }
    }
}

impl From<Placement> for PlacementDef {
    fn from(p: Placement) -> Self {
        let m = p.rotation;
        PlacementDef {
            position: [p.position.x, p.position.y, p.position.z],
            rotation: [
                [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
                [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
                [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_round_to_five_decimals() {
        assert_eq!(round(1.234567), 1.23457);
        assert_eq!(round(-2.000004), -2.0);
        assert_eq!(round(1000.0), 1000.0);
    }

    #[test]
    fn test_round_folds_negative_zero() {
        let r = round(-0.000001);
        assert_eq!(r, 0.0);
        assert!(r.is_sign_positive());
        assert_eq!(real(-0.000001), "0");
    }

    #[test]
    fn test_real_is_deterministic() {
        let v = 0.1 + 0.2;
        let first = real(v);
        for _ in 0..10 {
            assert_eq!(real(v), first);
        }
        assert_eq!(first, "0.3");
    }

    #[test]
    fn test_real_text() {
        assert_eq!(real(1000.0), "1000");
        assert_eq!(real(0.5), "0.5");
        assert_eq!(real(-0.00001), "-0.00001");
        assert_eq!(real(1e-7), "0");
    }

    #[test]
    fn test_vec3_and_mat3_text() {
        assert_eq!(vec3(&Vec3::new(1.0, -2.5, 0.000001)), "1, -2.5, 0");
        assert_eq!(mat3(&Mat3::identity()), "1, 0, 0, 0, 1, 0, 0, 0, 1");
        let m = Mat3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
        assert_eq!(mat3(&m), "1, 2, 3, 4, 5, 6, 7, 8, 9");
    }

    #[test]
    fn test_rows_text() {
        assert_eq!(rows(&[[1.0, 2.0], [3.0, 4.123456]]), "1, 2, 3, 4.12346");
    }

    #[test]
    fn test_rotation_z_90() {
        let r = rotation_z(PI / 2.0);
        let v = r * Vec3::new(1.0, 0.0, 0.0);
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_relative_to() {
        let base = Placement::at(1.0, 0.0, 0.0).rotated(rotation_z(PI / 2.0));
        let p = Placement::at(1.0, 2.0, 0.0);
        let rel = p.relative_to(&base);
        // world +Y is the base's local +X
        assert_abs_diff_eq!(rel.position.x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rel.position.y, 0.0, epsilon = 1e-12);
        let back = base.rotation * rel.rotation;
        assert_abs_diff_eq!(back[(0, 0)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_relative_to_identity_is_noop() {
        let p = Placement::at(3.0, 4.0, 5.0).rotated(rotation_y(0.7));
        assert_eq!(p.relative_to(&Placement::identity()), p);
    }

    #[test]
    fn test_placement_serde_row_major() {
        let json = r#"{"position":[1,2,3],"rotation":[[0,-1,0],[1,0,0],[0,0,1]]}"#;
        let p: Placement = serde_json::from_str(json).unwrap();
        assert_eq!(p.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(p.rotation[(0, 1)], -1.0);
        assert_eq!(p.rotation[(1, 0)], 1.0);

        let default_rot: Placement = serde_json::from_str(r#"{"position":[0,0,0]}"#).unwrap();
        assert_eq!(default_rot.rotation, Mat3::identity());
    }
}

//! Constitutive laws and friction models.

use serde::{Deserialize, Serialize};

/// Dimension of a constitutive law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dim {
    /// Scalar law (rods, springs).
    #[serde(rename = "1D")]
    D1,
    /// 3D law (deformable displacement joints).
    #[serde(rename = "3D")]
    D3,
    /// 6D law (beam sections).
    #[serde(rename = "6D")]
    D6,
}

/// Constitutive law variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConstitutiveLaw {
    /// Linear elastic; isotropic for 3D and 6D.
    LinearElastic {
        /// Dimension.
        dim: Dim,
        /// Stiffness.
        stiffness: f64,
    },
    /// Linear viscous; isotropic for 3D and 6D.
    LinearViscous {
        /// Dimension.
        dim: Dim,
        /// Viscosity.
        viscosity: f64,
    },
    /// Linear viscoelastic; isotropic for 3D and 6D.
    LinearViscoelastic {
        /// Dimension.
        dim: Dim,
        /// Stiffness.
        stiffness: f64,
        /// Viscosity.
        viscosity: f64,
    },
    /// Scalar cubic elastic law `c1 e + c2 e^2 + c3 e^3`.
    CubicElastic {
        /// Linear coefficient.
        c1: f64,
        /// Quadratic coefficient.
        c2: f64,
        /// Cubic coefficient.
        c3: f64,
    },
    /// Linear elastic with the linked stiffness matrix.
    LinearElasticGeneric {
        /// Dimension, 3D or 6D.
        dim: Dim,
    },
    /// Linear viscoelastic with the linked stiffness and viscosity matrices.
    LinearViscoelasticGeneric {
        /// Dimension, 3D or 6D.
        dim: Dim,
    },
}

impl ConstitutiveLaw {
    /// Dimension of the law.
    pub fn dim(&self) -> Dim {
        match self {
            ConstitutiveLaw::LinearElastic { dim, .. }
            | ConstitutiveLaw::LinearViscous { dim, .. }
            | ConstitutiveLaw::LinearViscoelastic { dim, .. }
            | ConstitutiveLaw::LinearElasticGeneric { dim }
            | ConstitutiveLaw::LinearViscoelasticGeneric { dim } => *dim,
            ConstitutiveLaw::CubicElastic { .. } => Dim::D1,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        match self {
            ConstitutiveLaw::LinearElasticGeneric { dim: Dim::D1 }
            | ConstitutiveLaw::LinearViscoelasticGeneric { dim: Dim::D1 } => {
                Err("generic laws are 3D or 6D".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Friction model variants. Both read their friction coefficient from the
/// linked scalar function of the sliding velocity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Friction {
    /// Modified LuGre model.
    ModLugre {
        /// Bristle stiffness.
        sigma0: f64,
        /// Bristle damping.
        sigma1: f64,
        /// Viscous coefficient.
        sigma2: f64,
        /// Transition parameter.
        kappa: f64,
    },
    /// Discrete Coulomb model.
    DiscreteCoulomb {
        /// Viscous coefficient.
        sigma2: f64,
        /// Velocity ratio for stick detection.
        velocity_ratio: f64,
    },
}

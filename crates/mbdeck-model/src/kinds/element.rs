//! Elements: bodies, joints, beams, forces and the environment.

use serde::{Deserialize, Serialize};

/// Emission group of an element. Declaration order is the order groups
/// appear in the elements block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementClass {
    /// Aerodynamic elements.
    Aerodynamic,
    /// Beams.
    Beam,
    /// Rigid bodies.
    Body,
    /// Forces and couples.
    Force,
    /// Generic elements.
    Genel,
    /// Joints, rods included.
    Joint,
    /// Rotors.
    Rotor,
    /// Gravity and air properties.
    Environment,
    /// Elements switched on and off by a drive.
    Driven,
}

impl ElementClass {
    /// All classes in emission order.
    pub const ALL: [ElementClass; 9] = [
        ElementClass::Aerodynamic,
        ElementClass::Beam,
        ElementClass::Body,
        ElementClass::Force,
        ElementClass::Genel,
        ElementClass::Joint,
        ElementClass::Rotor,
        ElementClass::Environment,
        ElementClass::Driven,
    ];
}

/// Rotor induced velocity model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InducedVelocity {
    /// No induced velocity.
    No,
    /// Uniform inflow.
    Uniform {
        /// Reference angular velocity.
        omega: f64,
        /// Rotor radius.
        radius: f64,
    },
}

/// Element variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Element {
    /// Lifting surface attached to a structural node.
    AerodynamicBody {
        /// Span.
        span: f64,
        /// Chord.
        chord: f64,
        /// Aerodynamic center offset along the chord.
        aerodynamic_center: f64,
        /// Boundary condition point offset along the chord.
        bc_point: f64,
        /// Twist in radians.
        twist: f64,
        /// Gauss points along the span.
        integration_points: u32,
        /// Airfoil designation, e.g. `"naca 0012"`.
        airfoil: String,
    },
    /// Two-node beam; links one 6D law.
    Beam2,
    /// Three-node beam; links two 6D laws.
    Beam3,
    /// Rigid body; links the center of mass offset and the inertia matrix.
    Body {
        /// Mass.
        mass: f64,
    },
    /// Force applied at the anchor; links the direction and the amplitude
    /// drive.
    StructuralForce {
        /// Direction follows the node.
        follower: bool,
    },
    /// Couple applied at the anchor; links the axis and the amplitude drive.
    StructuralCouple {
        /// Axis follows the node.
        follower: bool,
    },
    /// Clamps the linked abstract node to the linked drive.
    GenelClamp,
    /// Grounds the node at the anchor.
    Clamp,
    /// Spherical hinge between two nodes.
    SphericalHinge,
    /// Revolute hinge about the first anchor's local z axis.
    RevoluteHinge {
        /// Friction radius; when set the hinge links a friction model.
        friction_radius: Option<f64>,
    },
    /// Prismatic joint.
    Prismatic,
    /// In-line joint.
    InLine,
    /// Distance joint; links the distance drive.
    Distance,
    /// Rod between two nodes; links a 1D law.
    Rod,
    /// Axial rotation joint; links the angular velocity drive.
    AxialRotation,
    /// Deformable displacement joint; links a 3D law.
    DeformableDisplacement,
    /// Rotor between a craft node and a rotor node.
    Rotor {
        /// Induced velocity model.
        induced_velocity: InducedVelocity,
    },
    /// Uniform gravity; links the direction and the magnitude drive.
    Gravity,
    /// Air properties; links the free stream velocity and its drive.
    AirProperties {
        /// Density.
        density: f64,
        /// Speed of sound.
        sound_speed: f64,
    },
    /// Wraps the linked element, active while the linked drive is nonzero.
    Driven,
    /// Rigidly attaches the first anchor to the node at the second anchor.
    RigidOffset,
    /// Makes the first anchor a dummy node offset from the node at the
    /// second anchor.
    DummyNode,
}

impl Element {
    /// Emission class, `None` for node-mapping entities.
    pub fn class(&self) -> Option<ElementClass> {
        let class = match self {
            Element::AerodynamicBody { .. } => ElementClass::Aerodynamic,
            Element::Beam2 | Element::Beam3 => ElementClass::Beam,
            Element::Body { .. } => ElementClass::Body,
            Element::StructuralForce { .. } | Element::StructuralCouple { .. } => {
                ElementClass::Force
            }
            Element::GenelClamp => ElementClass::Genel,
            Element::Clamp
            | Element::SphericalHinge
            | Element::RevoluteHinge { .. }
            | Element::Prismatic
            | Element::InLine
            | Element::Distance
            | Element::Rod
            | Element::AxialRotation
            | Element::DeformableDisplacement => ElementClass::Joint,
            Element::Rotor { .. } => ElementClass::Rotor,
            Element::Gravity | Element::AirProperties { .. } => ElementClass::Environment,
            Element::Driven => ElementClass::Driven,
            Element::RigidOffset | Element::DummyNode => return None,
        };
        Some(class)
    }
}

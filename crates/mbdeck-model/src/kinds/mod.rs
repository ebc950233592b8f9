//! The closed set of entity kinds.
//!
//! [`Kind`] has one variant per category, each wrapping that category's own
//! enum. Everything an entity can do is an exhaustive match on its kind:
//! which links it takes, how many anchors it holds, what node it produces and
//! where it goes in the deck.

mod drive;
mod element;
mod function;
mod law;
mod matrix;
mod node;

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::registry::TypeTag;

pub use drive::{Cycles, Drive};
pub use element::{Element, ElementClass, InducedVelocity};
pub use function::Function;
pub use law::{ConstitutiveLaw, Dim, Friction};
pub use matrix::{Matrix, Matrix3Form, Matrix6Form, MatrixShape};
pub use node::{Driver, Frame, Interpolation, NsNode};

/// Entity categories, one collection each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Vectors and matrices.
    Matrix,
    /// Drive laws.
    Drive,
    /// Scalar functions.
    Function,
    /// Friction models.
    Friction,
    /// Constitutive laws.
    ConstitutiveLaw,
    /// Reference frames.
    Frame,
    /// Non-structural nodes.
    NsNode,
    /// Elements.
    Element,
    /// File drivers.
    Driver,
}

impl Category {
    /// All categories in collection order.
    pub const ALL: [Category; 9] = [
        Category::Matrix,
        Category::Drive,
        Category::Function,
        Category::Friction,
        Category::ConstitutiveLaw,
        Category::Frame,
        Category::NsNode,
        Category::Element,
        Category::Driver,
    ];

    /// Collection name.
    pub fn label(self) -> &'static str {
        match self {
            Category::Matrix => "matrices",
            Category::Drive => "drives",
            Category::Function => "functions",
            Category::Friction => "frictions",
            Category::ConstitutiveLaw => "constitutive laws",
            Category::Frame => "reference frames",
            Category::NsNode => "non-structural nodes",
            Category::Element => "elements",
            Category::Driver => "drivers",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a link position accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// A matrix of the given shape.
    Matrix(MatrixShape),
    /// Any drive.
    Drive,
    /// Any scalar function.
    Function,
    /// Any friction model.
    Friction,
    /// A constitutive law of the given dimension.
    Law(Dim),
    /// Any non-structural node.
    NsNode,
    /// Any driver.
    Driver,
    /// Any element that is emitted on its own, driven elements excluded.
    Element,
}

impl Slot {
    /// Whether an entity of `kind` fits this slot.
    pub fn accepts(&self, kind: &Kind) -> bool {
        match (self, kind) {
            (Slot::Matrix(shape), Kind::Matrix(m)) => m.shape() == *shape,
            (Slot::Drive, Kind::Drive(_)) => true,
            (Slot::Function, Kind::Function(_)) => true,
            (Slot::Friction, Kind::Friction(_)) => true,
            (Slot::Law(dim), Kind::ConstitutiveLaw(law)) => law.dim() == *dim,
            (Slot::NsNode, Kind::NsNode(_)) => true,
            (Slot::Driver, Kind::Driver(_)) => true,
            (Slot::Element, Kind::Element(e)) => {
                matches!(e.class(), Some(c) if c != ElementClass::Driven)
            }
            _ => false,
        }
    }

    fn for_matrix(dim: Dim) -> Slot {
        match dim {
            Dim::D6 => Slot::Matrix(MatrixShape::Matrix6x6),
            Dim::D1 | Dim::D3 => Slot::Matrix(MatrixShape::Matrix3x3),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Slot::Matrix(MatrixShape::Vector3) => "3x1 vector",
            Slot::Matrix(MatrixShape::Vector6) => "6x1 vector",
            Slot::Matrix(MatrixShape::Matrix3x3) => "3x3 matrix",
            Slot::Matrix(MatrixShape::Matrix6x6) => "6x6 matrix",
            Slot::Drive => "drive",
            Slot::Function => "scalar function",
            Slot::Friction => "friction model",
            Slot::Law(Dim::D1) => "1D constitutive law",
            Slot::Law(Dim::D3) => "3D constitutive law",
            Slot::Law(Dim::D6) => "6D constitutive law",
            Slot::NsNode => "non-structural node",
            Slot::Driver => "driver",
            Slot::Element => "element",
        };
        f.write_str(text)
    }
}

/// Link signature of a kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSlots {
    /// Exactly these slots, in order.
    Fixed(Vec<Slot>),
    /// Any number, at least `min`, of the same slot.
    Repeated {
        /// Accepted slot.
        slot: Slot,
        /// Minimum count.
        min: usize,
    },
}

impl LinkSlots {
    fn none() -> Self {
        LinkSlots::Fixed(Vec::new())
    }

    /// Check a candidate link list.
    pub fn check(&self, targets: &[&Kind]) -> Result<(), String> {
        match self {
            LinkSlots::Fixed(slots) => {
                if slots.len() != targets.len() {
                    return Err(format!(
                        "expects {} link(s), got {}",
                        slots.len(),
                        targets.len()
                    ));
                }
                for (i, (slot, kind)) in slots.iter().zip(targets).enumerate() {
                    if !slot.accepts(kind) {
                        return Err(format!(
                            "link {} must be a {}, got {}",
                            i,
                            slot,
                            kind.type_name()
                        ));
                    }
                }
                Ok(())
            }
            LinkSlots::Repeated { slot, min } => {
                if targets.len() < *min {
                    return Err(format!(
                        "expects at least {} link(s), got {}",
                        min,
                        targets.len()
                    ));
                }
                match targets.iter().position(|k| !slot.accepts(k)) {
                    Some(i) => Err(format!(
                        "link {} must be a {}, got {}",
                        i,
                        slot,
                        targets[i].type_name()
                    )),
                    None => Ok(()),
                }
            }
        }
    }
}

/// How an entity's anchors take part in node assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Anchors are not nodes.
    None,
    /// Every anchor is (or resolves to) a static node unless something
    /// promotes it.
    Static,
    /// Every anchor is (or resolves to) a dynamic node.
    Dynamic,
    /// Anchors must resolve to nodes produced elsewhere.
    Reference,
    /// `[child, node]`: the child resolves to the node.
    RigidOffset,
    /// `[child, base]`: the child is a dummy node offset from the base.
    DummyNode,
}

/// An entity's type and attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Kind {
    /// Vector or matrix.
    Matrix(Matrix),
    /// Drive law.
    Drive(Drive),
    /// Scalar function.
    Function(Function),
    /// Friction model.
    Friction(Friction),
    /// Constitutive law.
    ConstitutiveLaw(ConstitutiveLaw),
    /// Reference frame.
    Frame(Frame),
    /// Non-structural node.
    NsNode(NsNode),
    /// Element.
    Element(Element),
    /// File driver.
    Driver(Driver),
}

impl Kind {
    /// Category of this kind.
    pub fn category(&self) -> Category {
        match self {
            Kind::Matrix(_) => Category::Matrix,
            Kind::Drive(_) => Category::Drive,
            Kind::Function(_) => Category::Function,
            Kind::Friction(_) => Category::Friction,
            Kind::ConstitutiveLaw(_) => Category::ConstitutiveLaw,
            Kind::Frame(_) => Category::Frame,
            Kind::NsNode(_) => Category::NsNode,
            Kind::Element(_) => Category::Element,
            Kind::Driver(_) => Category::Driver,
        }
    }

    /// Human readable type name, e.g. `"Rod"` or `"Linear elastic"`.
    pub fn type_name(&self) -> &'static str {
        self.tag().name()
    }

    /// The matrix, if this is one.
    pub fn as_matrix(&self) -> Option<&Matrix> {
        match self {
            Kind::Matrix(m) => Some(m),
            _ => None,
        }
    }

    /// The drive, if this is one.
    pub fn as_drive(&self) -> Option<&Drive> {
        match self {
            Kind::Drive(d) => Some(d),
            _ => None,
        }
    }

    /// The element, if this is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Kind::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Fieldless tag of this kind.
    pub fn tag(&self) -> TypeTag {
        match self {
            Kind::Matrix(m) => match m {
                Matrix::Vector3 { .. } => TypeTag::Vector3,
                Matrix::Vector6 { .. } => TypeTag::Vector6,
                Matrix::Matrix3x3 { .. } => TypeTag::Matrix3x3,
                Matrix::Matrix6x6 { .. } => TypeTag::Matrix6x6,
            },
            Kind::Drive(d) => match d {
                Drive::Unit => TypeTag::UnitDrive,
                Drive::Null => TypeTag::NullDrive,
                Drive::Constant { .. } => TypeTag::ConstantDrive,
                Drive::Time => TypeTag::TimeDrive,
                Drive::Linear { .. } => TypeTag::LinearDrive,
                Drive::Parabolic { .. } => TypeTag::ParabolicDrive,
                Drive::Cubic { .. } => TypeTag::CubicDrive,
                Drive::Step { .. } => TypeTag::StepDrive,
                Drive::DoubleStep { .. } => TypeTag::DoubleStepDrive,
                Drive::Ramp { .. } => TypeTag::RampDrive,
                Drive::Sine { .. } => TypeTag::SineDrive,
                Drive::Cosine { .. } => TypeTag::CosineDrive,
                Drive::Exponential { .. } => TypeTag::ExponentialDrive,
                Drive::Expression { .. } => TypeTag::ExpressionDrive,
                Drive::Array => TypeTag::ArrayDrive,
                Drive::ScalarFunction => TypeTag::FunctionDrive,
                Drive::File { .. } => TypeTag::FileDrive,
                Drive::NodeValue { .. } => TypeTag::NodeDrive,
            },
            Kind::Function(f) => match f {
                Function::Const { .. } => TypeTag::ConstFunction,
                Function::Exp { .. } => TypeTag::ExpFunction,
                Function::Log { .. } => TypeTag::LogFunction,
                Function::Pow { .. } => TypeTag::PowFunction,
                Function::Linear { .. } => TypeTag::LinearFunction,
                Function::CubicSpline { .. } => TypeTag::CubicSplineFunction,
                Function::Multilinear { .. } => TypeTag::MultilinearFunction,
                Function::Chebychev { .. } => TypeTag::ChebychevFunction,
                Function::Sum => TypeTag::SumFunction,
                Function::Sub => TypeTag::SubFunction,
                Function::Mul => TypeTag::MulFunction,
                Function::Div => TypeTag::DivFunction,
            },
            Kind::Friction(f) => match f {
                Friction::ModLugre { .. } => TypeTag::ModLugre,
                Friction::DiscreteCoulomb { .. } => TypeTag::DiscreteCoulomb,
            },
            Kind::ConstitutiveLaw(l) => match l {
                ConstitutiveLaw::LinearElastic { .. } => TypeTag::LinearElastic,
                ConstitutiveLaw::LinearViscous { .. } => TypeTag::LinearViscous,
                ConstitutiveLaw::LinearViscoelastic { .. } => TypeTag::LinearViscoelastic,
                ConstitutiveLaw::CubicElastic { .. } => TypeTag::CubicElastic,
                ConstitutiveLaw::LinearElasticGeneric { .. } => TypeTag::LinearElasticGeneric,
                ConstitutiveLaw::LinearViscoelasticGeneric { .. } => {
                    TypeTag::LinearViscoelasticGeneric
                }
            },
            Kind::Frame(Frame::Reference) => TypeTag::ReferenceFrame,
            Kind::NsNode(n) => match n {
                NsNode::Abstract { .. } => TypeTag::AbstractNode,
                NsNode::Electric { .. } => TypeTag::ElectricNode,
                NsNode::Hydraulic { .. } => TypeTag::HydraulicNode,
                NsNode::Parameter { .. } => TypeTag::ParameterNode,
            },
            Kind::Element(e) => match e {
                Element::AerodynamicBody { .. } => TypeTag::AerodynamicBody,
                Element::Beam2 => TypeTag::Beam2,
                Element::Beam3 => TypeTag::Beam3,
                Element::Body { .. } => TypeTag::Body,
                Element::StructuralForce { .. } => TypeTag::StructuralForce,
                Element::StructuralCouple { .. } => TypeTag::StructuralCouple,
                Element::GenelClamp => TypeTag::GenelClamp,
                Element::Clamp => TypeTag::Clamp,
                Element::SphericalHinge => TypeTag::SphericalHinge,
                Element::RevoluteHinge { .. } => TypeTag::RevoluteHinge,
                Element::Prismatic => TypeTag::Prismatic,
                Element::InLine => TypeTag::InLine,
                Element::Distance => TypeTag::Distance,
                Element::Rod => TypeTag::Rod,
                Element::AxialRotation => TypeTag::AxialRotation,
                Element::DeformableDisplacement => TypeTag::DeformableDisplacement,
                Element::Rotor { .. } => TypeTag::Rotor,
                Element::Gravity => TypeTag::Gravity,
                Element::AirProperties { .. } => TypeTag::AirProperties,
                Element::Driven => TypeTag::Driven,
                Element::RigidOffset => TypeTag::RigidOffset,
                Element::DummyNode => TypeTag::DummyNode,
            },
            Kind::Driver(Driver::FixedStep { .. }) => TypeTag::FileDriver,
        }
    }

    /// Links this kind expects, in positional order.
    pub fn link_slots(&self) -> LinkSlots {
        let fixed = |slots: &[Slot]| LinkSlots::Fixed(slots.to_vec());
        let vector = Slot::Matrix(MatrixShape::Vector3);
        match self {
            Kind::Matrix(_) | Kind::NsNode(_) | Kind::Driver(_) => LinkSlots::none(),
            Kind::Drive(d) => match d {
                Drive::Array => LinkSlots::Repeated {
                    slot: Slot::Drive,
                    min: 1,
                },
                Drive::ScalarFunction => fixed(&[Slot::Function]),
                Drive::File { .. } => fixed(&[Slot::Driver]),
                Drive::NodeValue { .. } => fixed(&[Slot::Drive]),
                _ => LinkSlots::none(),
            },
            Kind::Function(f) => match f {
                Function::Sum | Function::Sub | Function::Mul | Function::Div => {
                    fixed(&[Slot::Function, Slot::Function])
                }
                _ => LinkSlots::none(),
            },
            Kind::Friction(_) => fixed(&[Slot::Function]),
            Kind::ConstitutiveLaw(l) => match l {
                ConstitutiveLaw::LinearElasticGeneric { dim } => fixed(&[Slot::for_matrix(*dim)]),
                ConstitutiveLaw::LinearViscoelasticGeneric { dim } => {
                    fixed(&[Slot::for_matrix(*dim), Slot::for_matrix(*dim)])
                }
                _ => LinkSlots::none(),
            },
            Kind::Frame(_) => fixed(&[vector, vector]),
            Kind::Element(e) => match e {
                Element::Beam2 => fixed(&[Slot::Law(Dim::D6)]),
                Element::Beam3 => fixed(&[Slot::Law(Dim::D6), Slot::Law(Dim::D6)]),
                Element::Body { .. } => fixed(&[vector, Slot::Matrix(MatrixShape::Matrix3x3)]),
                Element::StructuralForce { .. }
                | Element::StructuralCouple { .. }
                | Element::Gravity
                | Element::AirProperties { .. } => fixed(&[vector, Slot::Drive]),
                Element::GenelClamp => fixed(&[Slot::NsNode, Slot::Drive]),
                Element::RevoluteHinge {
                    friction_radius: Some(_),
                } => fixed(&[Slot::Friction]),
                Element::Distance | Element::AxialRotation => fixed(&[Slot::Drive]),
                Element::Rod => fixed(&[Slot::Law(Dim::D1)]),
                Element::DeformableDisplacement => fixed(&[Slot::Law(Dim::D3)]),
                Element::Driven => fixed(&[Slot::Drive, Slot::Element]),
                _ => LinkSlots::none(),
            },
        }
    }

    /// Allowed number of spatial anchors.
    pub fn anchor_range(&self) -> RangeInclusive<usize> {
        let n = match self {
            Kind::Frame(_) => return 1..=2,
            Kind::Drive(Drive::NodeValue { .. }) => 1,
            Kind::Element(e) => match e {
                Element::Beam3 => 3,
                Element::AerodynamicBody { .. }
                | Element::Body { .. }
                | Element::StructuralForce { .. }
                | Element::StructuralCouple { .. }
                | Element::Clamp => 1,
                Element::SphericalHinge
                | Element::RevoluteHinge { .. }
                | Element::Prismatic
                | Element::InLine
                | Element::Distance
                | Element::Rod
                | Element::AxialRotation
                | Element::DeformableDisplacement
                | Element::Rotor { .. }
                | Element::Beam2
                | Element::RigidOffset
                | Element::DummyNode => 2,
                Element::GenelClamp
                | Element::Gravity
                | Element::AirProperties { .. }
                | Element::Driven => 0,
            },
            _ => 0,
        };
        n..=n
    }

    /// Whether entities of this kind hold spatial anchors.
    pub fn has_anchors(&self) -> bool {
        *self.anchor_range().end() > 0
    }

    /// Role of this kind's anchors in node assignment.
    pub fn node_role(&self) -> NodeRole {
        match self {
            Kind::Drive(Drive::NodeValue { .. }) => NodeRole::Reference,
            Kind::Element(e) => match e {
                Element::Body { .. } => NodeRole::Dynamic,
                Element::Beam2
                | Element::Beam3
                | Element::Clamp
                | Element::SphericalHinge
                | Element::RevoluteHinge { .. }
                | Element::Prismatic
                | Element::InLine
                | Element::Distance
                | Element::Rod
                | Element::AxialRotation
                | Element::DeformableDisplacement => NodeRole::Static,
                Element::AerodynamicBody { .. }
                | Element::StructuralForce { .. }
                | Element::StructuralCouple { .. }
                | Element::Rotor { .. } => NodeRole::Reference,
                Element::RigidOffset => NodeRole::RigidOffset,
                Element::DummyNode => NodeRole::DummyNode,
                Element::GenelClamp
                | Element::Gravity
                | Element::AirProperties { .. }
                | Element::Driven => NodeRole::None,
            },
            _ => NodeRole::None,
        }
    }

    /// Emission class for elements, `None` otherwise.
    pub fn element_class(&self) -> Option<ElementClass> {
        match self {
            Kind::Element(e) => e.class(),
            _ => None,
        }
    }

    /// At most one entity of this kind may exist.
    pub fn is_singleton(&self) -> bool {
        matches!(
            self,
            Kind::Element(Element::Gravity) | Kind::Element(Element::AirProperties { .. })
        )
    }

    /// Structural checks on the attributes. Physical plausibility is not
    /// checked.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Kind::Function(f) => f.validate(),
            Kind::ConstitutiveLaw(l) => l.validate(),
            Kind::Drive(Drive::File { column: 0, .. }) => {
                Err("file columns are 1-based".to_string())
            }
            Kind::Element(Element::AerodynamicBody {
                integration_points: 0,
                ..
            }) => Err("needs at least one integration point".to_string()),
            Kind::Driver(Driver::FixedStep { steps, columns, .. }) if *steps == 0 || *columns == 0 => {
                Err("steps and columns must be positive".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rod_link_slots() {
        let rod = Kind::Element(Element::Rod);
        let law_1d = Kind::ConstitutiveLaw(ConstitutiveLaw::LinearElastic {
            dim: Dim::D1,
            stiffness: 1000.0,
        });
        let law_3d = Kind::ConstitutiveLaw(ConstitutiveLaw::LinearElastic {
            dim: Dim::D3,
            stiffness: 1000.0,
        });
        assert!(rod.link_slots().check(&[&law_1d]).is_ok());
        let err = rod.link_slots().check(&[&law_3d]).unwrap_err();
        assert!(err.contains("1D constitutive law"), "{}", err);
        assert!(rod.link_slots().check(&[]).is_err());
    }

    #[test]
    fn test_array_drive_slots() {
        let array = Kind::Drive(Drive::Array);
        let unit = Kind::Drive(Drive::Unit);
        let time = Kind::Drive(Drive::Time);
        assert!(array.link_slots().check(&[&unit, &time]).is_ok());
        assert!(array.link_slots().check(&[]).is_err());
        let vec = Kind::Matrix(Matrix::null_vector());
        assert!(array.link_slots().check(&[&unit, &vec]).is_err());
    }

    #[test]
    fn test_driven_rejects_driven_and_node_mappings() {
        let driven = Kind::Element(Element::Driven);
        let unit = Kind::Drive(Drive::Unit);
        let clamp = Kind::Element(Element::Clamp);
        let offset = Kind::Element(Element::RigidOffset);
        assert!(driven.link_slots().check(&[&unit, &clamp]).is_ok());
        assert!(driven.link_slots().check(&[&unit, &driven]).is_err());
        assert!(driven.link_slots().check(&[&unit, &offset]).is_err());
    }

    #[test]
    fn test_hinge_friction_changes_signature() {
        let plain = Kind::Element(Element::RevoluteHinge {
            friction_radius: None,
        });
        let with_friction = Kind::Element(Element::RevoluteHinge {
            friction_radius: Some(0.01),
        });
        assert_eq!(plain.link_slots(), LinkSlots::Fixed(vec![]));
        assert_eq!(
            with_friction.link_slots(),
            LinkSlots::Fixed(vec![Slot::Friction])
        );
    }

    #[test]
    fn test_anchor_ranges_and_roles() {
        assert_eq!(Kind::Frame(Frame::Reference).anchor_range(), 1..=2);
        assert_eq!(Kind::Element(Element::Beam3).anchor_range(), 3..=3);
        assert!(!Kind::Element(Element::Gravity).has_anchors());
        assert_eq!(
            Kind::Element(Element::Body { mass: 1.0 }).node_role(),
            NodeRole::Dynamic
        );
        assert_eq!(Kind::Element(Element::Rod).node_role(), NodeRole::Static);
        assert_eq!(
            Kind::Element(Element::StructuralForce { follower: false }).node_role(),
            NodeRole::Reference
        );
        assert_eq!(Kind::Frame(Frame::Reference).node_role(), NodeRole::None);
    }

    #[test]
    fn test_element_classes_are_ordered() {
        let mut sorted = ElementClass::ALL;
        sorted.sort();
        assert_eq!(sorted, ElementClass::ALL);
        assert_eq!(Kind::Element(Element::RigidOffset).element_class(), None);
        assert_eq!(
            Kind::Element(Element::Rod).element_class(),
            Some(ElementClass::Joint)
        );
    }

    #[test]
    fn test_validate() {
        let spline = Kind::Function(Function::CubicSpline {
            points: vec![[0.0, 0.0], [1.0, 1.0]],
            extrapolate: true,
        });
        assert!(spline.validate().is_err());
        let unsorted = Kind::Function(Function::Multilinear {
            points: vec![[1.0, 0.0], [0.0, 1.0]],
            extrapolate: false,
        });
        assert!(unsorted.validate().is_err());
        let generic_1d =
            Kind::ConstitutiveLaw(ConstitutiveLaw::LinearElasticGeneric { dim: Dim::D1 });
        assert!(generic_1d.validate().is_err());
        assert!(Kind::Drive(Drive::Unit).validate().is_ok());
    }

    #[test]
    fn test_kind_serde_shape() {
        let kind = Kind::Element(Element::Body { mass: 2.5 });
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, r#"{"Element":{"type":"Body","mass":2.5}}"#);
        let back: Kind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }
}

//! Static type table: one row per [`TypeTag`], mapping it to a display name,
//! its category and a constructor for the default attributes.

use crate::kinds::{
    Category, ConstitutiveLaw, Cycles, Dim, Drive, Driver, Element, Frame, Friction, Function,
    InducedVelocity, Interpolation, Kind, Matrix, Matrix3Form, Matrix6Form, NsNode,
};

/// Fieldless identifier of every entity type. Discriminants index
/// [`registry()`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeTag {
    Vector3,
    Vector6,
    Matrix3x3,
    Matrix6x6,
    UnitDrive,
    NullDrive,
    ConstantDrive,
    TimeDrive,
    LinearDrive,
    ParabolicDrive,
    CubicDrive,
    StepDrive,
    DoubleStepDrive,
    RampDrive,
    SineDrive,
    CosineDrive,
    ExponentialDrive,
    ExpressionDrive,
    ArrayDrive,
    FunctionDrive,
    FileDrive,
    NodeDrive,
    ConstFunction,
    ExpFunction,
    LogFunction,
    PowFunction,
    LinearFunction,
    CubicSplineFunction,
    MultilinearFunction,
    ChebychevFunction,
    SumFunction,
    SubFunction,
    MulFunction,
    DivFunction,
    ModLugre,
    DiscreteCoulomb,
    LinearElastic,
    LinearViscous,
    LinearViscoelastic,
    CubicElastic,
    LinearElasticGeneric,
    LinearViscoelasticGeneric,
    ReferenceFrame,
    AbstractNode,
    ElectricNode,
    HydraulicNode,
    ParameterNode,
    AerodynamicBody,
    Beam2,
    Beam3,
    Body,
    StructuralForce,
    StructuralCouple,
    GenelClamp,
    Clamp,
    SphericalHinge,
    RevoluteHinge,
    Prismatic,
    InLine,
    Distance,
    Rod,
    AxialRotation,
    DeformableDisplacement,
    Rotor,
    Gravity,
    AirProperties,
    Driven,
    RigidOffset,
    DummyNode,
    FileDriver,
}

impl TypeTag {
    /// Registry row for this tag.
    pub fn info(self) -> &'static TypeInfo {
        &REGISTRY[self as usize]
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Category entities of this type live in.
    pub fn category(self) -> Category {
        self.info().category
    }

    /// Default attributes for this type.
    pub fn make(self) -> Kind {
        (self.info().make)()
    }
}

/// One row of the type table.
#[derive(Debug)]
pub struct TypeInfo {
    /// Type tag.
    pub tag: TypeTag,
    /// Display name.
    pub name: &'static str,
    /// Owning category.
    pub category: Category,
    /// Default attributes.
    pub make: fn() -> Kind,
}

/// The full type table, in tag order.
pub fn registry() -> &'static [TypeInfo] {
    REGISTRY
}

/// Look up a row by display name, case-insensitively.
pub fn find_type(name: &str) -> Option<&'static TypeInfo> {
    REGISTRY.iter().find(|row| row.name.eq_ignore_ascii_case(name))
}

macro_rules! row {
    ($tag:ident, $name:expr, $category:ident, $make:expr) => {
        TypeInfo {
            tag: TypeTag::$tag,
            name: $name,
            category: Category::$category,
            make: $make,
        }
    };
}

static REGISTRY: &[TypeInfo] = &[
    row!(Vector3, "3x1 vector", Matrix, || Kind::Matrix(Matrix::null_vector())),
    row!(Vector6, "6x1 vector", Matrix, || Kind::Matrix(Matrix::Vector6 { values: None })),
    row!(Matrix3x3, "3x3 matrix", Matrix, || Kind::Matrix(Matrix::Matrix3x3 {
        form: Matrix3Form::Eye
    })),
    row!(Matrix6x6, "6x6 matrix", Matrix, || Kind::Matrix(Matrix::Matrix6x6 {
        form: Matrix6Form::Eye
    })),
    row!(UnitDrive, "Unit drive", Drive, || Kind::Drive(Drive::Unit)),
    row!(NullDrive, "Null drive", Drive, || Kind::Drive(Drive::Null)),
    row!(ConstantDrive, "Const drive", Drive, || Kind::Drive(Drive::Constant {
        value: 0.0
    })),
    row!(TimeDrive, "Time drive", Drive, || Kind::Drive(Drive::Time)),
    row!(LinearDrive, "Linear drive", Drive, || Kind::Drive(Drive::Linear {
        offset: 0.0,
        slope: 1.0
    })),
    row!(ParabolicDrive, "Parabolic drive", Drive, || Kind::Drive(Drive::Parabolic {
        c0: 0.0,
        c1: 0.0,
        c2: 1.0
    })),
    row!(CubicDrive, "Cubic drive", Drive, || Kind::Drive(Drive::Cubic {
        c0: 0.0,
        c1: 0.0,
        c2: 0.0,
        c3: 1.0
    })),
    row!(StepDrive, "Step drive", Drive, || Kind::Drive(Drive::Step {
        initial_time: 0.0,
        step_value: 1.0,
        initial_value: 0.0
    })),
    row!(DoubleStepDrive, "Double step drive", Drive, || Kind::Drive(
        Drive::DoubleStep {
            initial_time: 0.0,
            final_time: 1.0,
            step_value: 1.0,
            initial_value: 0.0
        }
    )),
    row!(RampDrive, "Ramp drive", Drive, || Kind::Drive(Drive::Ramp {
        slope: 1.0,
        initial_time: 0.0,
        final_time: None,
        initial_value: 0.0
    })),
    row!(SineDrive, "Sine drive", Drive, || Kind::Drive(Drive::Sine {
        initial_time: 0.0,
        omega: 1.0,
        amplitude: 1.0,
        cycles: Cycles::Forever,
        initial_value: 0.0
    })),
    row!(CosineDrive, "Cosine drive", Drive, || Kind::Drive(Drive::Cosine {
        initial_time: 0.0,
        omega: 1.0,
        amplitude: 1.0,
        cycles: Cycles::Forever,
        initial_value: 0.0
    })),
    row!(ExponentialDrive, "Exponential drive", Drive, || Kind::Drive(
        Drive::Exponential {
            amplitude: 1.0,
            time_constant: 1.0,
            initial_time: 0.0,
            initial_value: 0.0
        }
    )),
    row!(ExpressionDrive, "String drive", Drive, || Kind::Drive(Drive::Expression {
        expression: "Time".to_string()
    })),
    row!(ArrayDrive, "Array drive", Drive, || Kind::Drive(Drive::Array)),
    row!(FunctionDrive, "Function drive", Drive, || Kind::Drive(Drive::ScalarFunction)),
    row!(FileDrive, "File drive", Drive, || Kind::Drive(Drive::File {
        column: 1,
        amplitude: 1.0
    })),
    row!(NodeDrive, "Node drive", Drive, || Kind::Drive(Drive::NodeValue {
        property: "X[1]".to_string()
    })),
    row!(ConstFunction, "Const", Function, || Kind::Function(Function::Const {
        value: 0.0
    })),
    row!(ExpFunction, "Exp", Function, || Kind::Function(Function::Exp {
        base: std::f64::consts::E,
        coefficient: 1.0,
        multiplier: 1.0
    })),
    row!(LogFunction, "Log", Function, || Kind::Function(Function::Log {
        base: std::f64::consts::E,
        coefficient: 1.0,
        multiplier: 1.0
    })),
    row!(PowFunction, "Pow", Function, || Kind::Function(Function::Pow {
        exponent: 1.0
    })),
    row!(LinearFunction, "Linear", Function, || Kind::Function(Function::Linear {
        x1: 0.0,
        y1: 0.0,
        x2: 1.0,
        y2: 1.0
    })),
    row!(CubicSplineFunction, "Cubic natural spline", Function, || Kind::Function(
        Function::CubicSpline {
            points: vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]],
            extrapolate: true
        }
    )),
    row!(MultilinearFunction, "Multilinear", Function, || Kind::Function(
        Function::Multilinear {
            points: vec![[0.0, 0.0], [1.0, 1.0]],
            extrapolate: true
        }
    )),
    row!(ChebychevFunction, "Chebychev", Function, || Kind::Function(
        Function::Chebychev {
            lower: -1.0,
            upper: 1.0,
            coefficients: vec![0.0, 1.0],
            extrapolate: true
        }
    )),
    row!(SumFunction, "Sum", Function, || Kind::Function(Function::Sum)),
    row!(SubFunction, "Sub", Function, || Kind::Function(Function::Sub)),
    row!(MulFunction, "Mul", Function, || Kind::Function(Function::Mul)),
    row!(DivFunction, "Div", Function, || Kind::Function(Function::Div)),
    row!(ModLugre, "Modlugre", Friction, || Kind::Friction(Friction::ModLugre {
        sigma0: 1000.0,
        sigma1: 0.0,
        sigma2: 0.0,
        kappa: 0.5
    })),
    row!(DiscreteCoulomb, "Discrete Coulomb", Friction, || Kind::Friction(
        Friction::DiscreteCoulomb {
            sigma2: 0.0,
            velocity_ratio: 0.8
        }
    )),
    row!(LinearElastic, "Linear elastic", ConstitutiveLaw, || Kind::ConstitutiveLaw(
        ConstitutiveLaw::LinearElastic {
            dim: Dim::D1,
            stiffness: 1.0
        }
    )),
    row!(LinearViscous, "Linear viscous", ConstitutiveLaw, || Kind::ConstitutiveLaw(
        ConstitutiveLaw::LinearViscous {
            dim: Dim::D1,
            viscosity: 1.0
        }
    )),
    row!(LinearViscoelastic, "Linear viscoelastic", ConstitutiveLaw, || {
        Kind::ConstitutiveLaw(ConstitutiveLaw::LinearViscoelastic {
            dim: Dim::D1,
            stiffness: 1.0,
            viscosity: 1.0,
        })
    }),
    row!(CubicElastic, "Cubic elastic", ConstitutiveLaw, || Kind::ConstitutiveLaw(
        ConstitutiveLaw::CubicElastic {
            c1: 1.0,
            c2: 0.0,
            c3: 0.0
        }
    )),
    row!(LinearElasticGeneric, "Linear elastic generic", ConstitutiveLaw, || {
        Kind::ConstitutiveLaw(ConstitutiveLaw::LinearElasticGeneric { dim: Dim::D3 })
    }),
    row!(LinearViscoelasticGeneric, "Linear viscoelastic generic", ConstitutiveLaw, || {
        Kind::ConstitutiveLaw(ConstitutiveLaw::LinearViscoelasticGeneric { dim: Dim::D3 })
    }),
    row!(ReferenceFrame, "Reference frame", Frame, || Kind::Frame(Frame::Reference)),
    row!(AbstractNode, "Abstract node", NsNode, || Kind::NsNode(NsNode::Abstract {
        differential: true,
        value: 0.0
    })),
    row!(ElectricNode, "Electric node", NsNode, || Kind::NsNode(NsNode::Electric {
        value: 0.0
    })),
    row!(HydraulicNode, "Hydraulic node", NsNode, || Kind::NsNode(NsNode::Hydraulic {
        value: 0.0
    })),
    row!(ParameterNode, "Parameter node", NsNode, || Kind::NsNode(NsNode::Parameter {
        value: 0.0
    })),
    row!(AerodynamicBody, "Aerodynamic body", Element, || Kind::Element(
        Element::AerodynamicBody {
            span: 1.0,
            chord: 0.1,
            aerodynamic_center: 0.0,
            bc_point: 0.0,
            twist: 0.0,
            integration_points: 3,
            airfoil: "naca 0012".to_string()
        }
    )),
    row!(Beam2, "Beam segment", Element, || Kind::Element(Element::Beam2)),
    row!(Beam3, "Three node beam", Element, || Kind::Element(Element::Beam3)),
    row!(Body, "Body", Element, || Kind::Element(Element::Body { mass: 1.0 })),
    row!(StructuralForce, "Structural force", Element, || Kind::Element(
        Element::StructuralForce { follower: false }
    )),
    row!(StructuralCouple, "Structural couple", Element, || Kind::Element(
        Element::StructuralCouple { follower: false }
    )),
    row!(GenelClamp, "Clamp genel", Element, || Kind::Element(Element::GenelClamp)),
    row!(Clamp, "Clamp", Element, || Kind::Element(Element::Clamp)),
    row!(SphericalHinge, "Spherical hinge", Element, || Kind::Element(
        Element::SphericalHinge
    )),
    row!(RevoluteHinge, "Revolute hinge", Element, || Kind::Element(
        Element::RevoluteHinge {
            friction_radius: None
        }
    )),
    row!(Prismatic, "Prismatic", Element, || Kind::Element(Element::Prismatic)),
    row!(InLine, "In line", Element, || Kind::Element(Element::InLine)),
    row!(Distance, "Distance", Element, || Kind::Element(Element::Distance)),
    row!(Rod, "Rod", Element, || Kind::Element(Element::Rod)),
    row!(AxialRotation, "Axial rotation", Element, || Kind::Element(
        Element::AxialRotation
    )),
    row!(DeformableDisplacement, "Deformable displacement joint", Element, || {
        Kind::Element(Element::DeformableDisplacement)
    }),
    row!(Rotor, "Rotor", Element, || Kind::Element(Element::Rotor {
        induced_velocity: InducedVelocity::No
    })),
    row!(Gravity, "Gravity", Element, || Kind::Element(Element::Gravity)),
    row!(AirProperties, "Air properties", Element, || Kind::Element(
        Element::AirProperties {
            density: 1.225,
            sound_speed: 340.0
        }
    )),
    row!(Driven, "Driven", Element, || Kind::Element(Element::Driven)),
    row!(RigidOffset, "Rigid offset", Element, || Kind::Element(Element::RigidOffset)),
    row!(DummyNode, "Dummy node", Element, || Kind::Element(Element::DummyNode)),
    row!(FileDriver, "File driver", Driver, || Kind::Driver(Driver::FixedStep {
        steps: 1,
        columns: 1,
        initial_time: 0.0,
        time_step: 1.0,
        interpolation: Interpolation::Linear,
        pad_zeroes: true,
        path: "data.drv".to_string()
    })),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_in_tag_order() {
        for (i, row) in registry().iter().enumerate() {
            assert_eq!(row.tag as usize, i, "row {} is {:?}", i, row.tag);
        }
        assert_eq!(registry().len(), TypeTag::FileDriver as usize + 1);
    }

    #[test]
    fn test_defaults_match_their_row() {
        for row in registry() {
            let kind = (row.make)();
            assert_eq!(kind.tag(), row.tag);
            assert_eq!(kind.category(), row.category, "{}", row.name);
            assert!(kind.validate().is_ok(), "{} default is invalid", row.name);
        }
    }

    #[test]
    fn test_find_type() {
        assert_eq!(find_type("rod").map(|r| r.tag), Some(TypeTag::Rod));
        assert_eq!(find_type("Unit drive").map(|r| r.tag), Some(TypeTag::UnitDrive));
        assert!(find_type("warp drive").is_none());
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = registry().iter().map(|r| r.name.to_lowercase()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), registry().len());
    }
}

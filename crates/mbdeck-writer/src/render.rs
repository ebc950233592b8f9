//! Deck text of single entities.
//!
//! Every function returns one statement without its terminating `;`, so
//! statements can nest (a driven element embeds the element it wraps).
//! References to other entities render as their collection position.

use mbdeck_math::{mat3, real, reals, round, rows, vec3, Mat3, Placement, Vec3};
use mbdeck_model::kinds::{
    ConstitutiveLaw, Cycles, Dim, Drive, Driver, Element, Friction, Function, InducedVelocity,
    Interpolation, Matrix, Matrix3Form, Matrix6Form, NsNode,
};
use mbdeck_model::{Anchor, Database, Entity, EntityId, Kind, ModelError};

use crate::anchors::{require, AnchorProvider};
use crate::error::Result;
use crate::frames::ResolvedFrame;
use crate::nodes::{NodeTable, StructuralNode};

/// Everything rendering needs to resolve references.
pub(crate) struct Scope<'a> {
    pub db: &'a Database,
    pub anchors: &'a dyn AnchorProvider,
    pub nodes: &'a NodeTable,
    pub frames: &'a [ResolvedFrame],
}

// ----------------------------------------------------------------------
// Plain values
// ----------------------------------------------------------------------

fn is_zero(v: &Vec3) -> bool {
    v.iter().all(|&x| round(x) == 0.0)
}

fn is_identity(m: &Mat3) -> bool {
    (0..3).all(|r| (0..3).all(|c| round(m[(r, c)]) == if r == c { 1.0 } else { 0.0 }))
}

/// `null` or the three components.
fn vector(v: &Vec3) -> String {
    if is_zero(v) {
        "null".to_string()
    } else {
        vec3(v)
    }
}

/// `eye` or `matr, ...`.
fn orientation(m: &Mat3) -> String {
    if is_identity(m) {
        "eye".to_string()
    } else {
        format!("matr, {}", mat3(m))
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

pub(crate) fn matrix(m: &Matrix) -> String {
    match m {
        Matrix::Vector3 { values: None } | Matrix::Vector6 { values: None } => "null".to_string(),
        Matrix::Vector3 { values: Some(v) } => reals(v),
        Matrix::Vector6 { values: Some(v) } => reals(v),
        Matrix::Matrix3x3 { form } => match form {
            Matrix3Form::Null => "null".to_string(),
            Matrix3Form::Eye => "eye".to_string(),
            Matrix3Form::Diag(d) => format!("diag, {}", reals(d)),
            Matrix3Form::Sym(s) => format!("sym, {}", reals(s)),
            Matrix3Form::Full(m) => format!("matr, {}", rows(m)),
        },
        Matrix::Matrix6x6 { form } => match form {
            Matrix6Form::Null => "null".to_string(),
            Matrix6Form::Eye => "eye".to_string(),
            Matrix6Form::Diag(d) => format!("diag, {}", reals(d)),
            Matrix6Form::Full(m) => format!("matr, {}", rows(m)),
        },
    }
}

pub(crate) fn function(entity: &Entity, db: &Database) -> Result<String> {
    let Kind::Function(f) = entity.kind() else {
        return Err(mismatch(entity, "not a scalar function"));
    };
    let extrapolate = |flag: bool| if flag { "" } else { "do not extrapolate, " };
    let text = match f {
        Function::Const { value } => format!("const, {}", real(*value)),
        Function::Exp {
            base,
            coefficient,
            multiplier,
        } => format!(
            "exp, base, {}, coefficient, {}, {}",
            real(*base),
            real(*coefficient),
            real(*multiplier)
        ),
        Function::Log {
            base,
            coefficient,
            multiplier,
        } => format!(
            "log, base, {}, coefficient, {}, {}",
            real(*base),
            real(*coefficient),
            real(*multiplier)
        ),
        Function::Pow { exponent } => format!("pow, {}", real(*exponent)),
        Function::Linear { x1, y1, x2, y2 } => format!("linear, {}", reals(&[*x1, *y1, *x2, *y2])),
        Function::CubicSpline {
            points,
            extrapolate: e,
        } => format!("cubicspline, {}{}", extrapolate(*e), rows(points)),
        Function::Multilinear {
            points,
            extrapolate: e,
        } => format!("multilinear, {}{}", extrapolate(*e), rows(points)),
        Function::Chebychev {
            lower,
            upper,
            coefficients,
            extrapolate: e,
        } => format!(
            "chebychev, {}, {}, {}{}",
            real(*lower),
            real(*upper),
            extrapolate(*e),
            reals(coefficients)
        ),
        Function::Sum | Function::Sub | Function::Mul | Function::Div => {
            let op = match f {
                Function::Sum => "sum",
                Function::Sub => "sub",
                Function::Mul => "mul",
                _ => "div",
            };
            let a = linked(db, entity, 0)?;
            let b = linked(db, entity, 1)?;
            format!("{}, \"{}\", \"{}\"", op, a.name(), b.name())
        }
    };
    Ok(text)
}

pub(crate) fn ns_node(label: usize, node: &NsNode) -> String {
    match node {
        NsNode::Abstract {
            differential,
            value,
        } => format!(
            "abstract: {}, {}, value, {}",
            label,
            if *differential {
                "differential"
            } else {
                "algebraic"
            },
            real(*value)
        ),
        NsNode::Electric { value } => format!("electric: {}, value, {}", label, real(*value)),
        NsNode::Hydraulic { value } => format!("hydraulic: {}, value, {}", label, real(*value)),
        NsNode::Parameter { value } => format!("parameter: {}, {}", label, real(*value)),
    }
}

fn ns_node_type(node: &NsNode) -> &'static str {
    match node {
        NsNode::Abstract { .. } => "abstract",
        NsNode::Electric { .. } => "electric",
        NsNode::Hydraulic { .. } => "hydraulic",
        NsNode::Parameter { .. } => "parameter",
    }
}

pub(crate) fn driver(label: usize, driver: &Driver) -> String {
    match driver {
        Driver::FixedStep {
            steps,
            columns,
            initial_time,
            time_step,
            interpolation,
            pad_zeroes,
            path,
        } => format!(
            "file: {}, fixed step, {}, {}, initial time, {}, time step, {}, interpolation, {}, pad zeroes, {}, \"{}\"",
            label,
            steps,
            columns,
            real(*initial_time),
            real(*time_step),
            match interpolation {
                Interpolation::Linear => "linear",
                Interpolation::Const => "const",
            },
            yes_no(*pad_zeroes),
            path
        ),
    }
}

// ----------------------------------------------------------------------
// Link helpers
// ----------------------------------------------------------------------

fn mismatch(entity: &Entity, reason: impl Into<String>) -> crate::DeckError {
    ModelError::LinkMismatch {
        name: entity.name().to_string(),
        reason: reason.into(),
    }
    .into()
}

fn linked<'a>(db: &'a Database, entity: &Entity, i: usize) -> Result<&'a Entity> {
    let id = entity
        .links()
        .get(i)
        .copied()
        .ok_or_else(|| mismatch(entity, format!("missing link {}", i)))?;
    Ok(db.get(id)?)
}

fn anchor(entity: &Entity, i: usize) -> Result<&Anchor> {
    entity.anchor(i).ok_or_else(|| {
        ModelError::AnchorCount {
            name: entity.name().to_string(),
            expected: format!("at least {}", i + 1),
            found: entity.objects().map_or(0, <[Anchor]>::len),
        }
        .into()
    })
}

impl<'a> Scope<'a> {
    fn label(&self, id: EntityId) -> Result<usize> {
        Ok(self.db.position(id)?)
    }

    fn placement(&self, anchor: &Anchor) -> Result<Placement> {
        require(self.anchors, anchor)
    }

    /// Node label of anchor `i` and the anchor's placement relative to that
    /// node.
    fn at_node(&self, entity: &Entity, i: usize) -> Result<(usize, Placement)> {
        let anchor = anchor(entity, i)?;
        let label = self.nodes.node_of(entity.name(), anchor)?;
        let node = &self.nodes.nodes()[label].anchor;
        let relative = if node == anchor {
            Placement::identity()
        } else {
            self.placement(anchor)?.relative_to(&self.placement(node)?)
        };
        Ok((label, relative))
    }

    /// Node label of anchor `i` and the anchor's world placement.
    fn at_world(&self, entity: &Entity, i: usize) -> Result<(usize, Placement)> {
        let anchor = anchor(entity, i)?;
        let label = self.nodes.node_of(entity.name(), anchor)?;
        Ok((label, self.placement(anchor)?))
    }

    fn vector_link(&self, entity: &Entity, i: usize) -> Result<Vec3> {
        let target = linked(self.db, entity, i)?;
        let [x, y, z] = target
            .kind()
            .as_matrix()
            .and_then(Matrix::as_vector3)
            .ok_or_else(|| mismatch(entity, format!("link {} is not a 3x1 vector", i)))?;
        Ok(Vec3::new(x, y, z))
    }

    fn matrix_link(&self, entity: &Entity, i: usize) -> Result<String> {
        let target = linked(self.db, entity, i)?;
        target
            .kind()
            .as_matrix()
            .map(matrix)
            .ok_or_else(|| mismatch(entity, format!("link {} is not a matrix", i)))
    }

    fn drive_link(&self, entity: &Entity, i: usize) -> Result<String> {
        self.drive(linked(self.db, entity, i)?)
    }

    fn law_link(&self, entity: &Entity, i: usize) -> Result<String> {
        self.law(linked(self.db, entity, i)?)
    }

    // ------------------------------------------------------------------
    // Linked kinds
    // ------------------------------------------------------------------

    /// Inline drive caller text.
    pub(crate) fn drive(&self, entity: &Entity) -> Result<String> {
        let Kind::Drive(d) = entity.kind() else {
            return Err(mismatch(entity, "not a drive"));
        };
        let text = match d {
            Drive::Unit => "unit".to_string(),
            Drive::Null => "null".to_string(),
            Drive::Constant { value } => format!("const, {}", real(*value)),
            Drive::Time => "time".to_string(),
            Drive::Linear { offset, slope } => format!("linear, {}, {}", real(*offset), real(*slope)),
            Drive::Parabolic { c0, c1, c2 } => format!("parabolic, {}", reals(&[*c0, *c1, *c2])),
            Drive::Cubic { c0, c1, c2, c3 } => format!("cubic, {}", reals(&[*c0, *c1, *c2, *c3])),
            Drive::Step {
                initial_time,
                step_value,
                initial_value,
            } => format!("step, {}", reals(&[*initial_time, *step_value, *initial_value])),
            Drive::DoubleStep {
                initial_time,
                final_time,
                step_value,
                initial_value,
            } => format!(
                "double step, {}",
                reals(&[*initial_time, *final_time, *step_value, *initial_value])
            ),
            Drive::Ramp {
                slope,
                initial_time,
                final_time,
                initial_value,
            } => format!(
                "ramp, {}, {}, {}, {}",
                real(*slope),
                real(*initial_time),
                final_time.map_or_else(|| "forever".to_string(), real),
                real(*initial_value)
            ),
            Drive::Sine {
                initial_time,
                omega,
                amplitude,
                cycles,
                initial_value,
            }
            | Drive::Cosine {
                initial_time,
                omega,
                amplitude,
                cycles,
                initial_value,
            } => format!(
                "{}, {}, {}, {}, {}, {}",
                if matches!(d, Drive::Sine { .. }) {
                    "sine"
                } else {
                    "cosine"
                },
                real(*initial_time),
                real(*omega),
                real(*amplitude),
                match cycles {
                    Cycles::Half => "half".to_string(),
                    Cycles::One => "one".to_string(),
                    Cycles::Forever => "forever".to_string(),
                    Cycles::Count(n) => n.to_string(),
                },
                real(*initial_value)
            ),
            Drive::Exponential {
                amplitude,
                time_constant,
                initial_time,
                initial_value,
            } => format!(
                "exponential, {}",
                reals(&[*amplitude, *time_constant, *initial_time, *initial_value])
            ),
            Drive::Expression { expression } => format!("string, \"{}\"", expression),
            Drive::Array => {
                let parts = (0..entity.links().len())
                    .map(|i| self.drive_link(entity, i))
                    .collect::<Result<Vec<_>>>()?;
                format!("array, {}, {}", parts.len(), parts.join(", "))
            }
            Drive::ScalarFunction => {
                format!("scalar function, \"{}\"", linked(self.db, entity, 0)?.name())
            }
            Drive::File { column, amplitude } => {
                let driver = entity
                    .links()
                    .first()
                    .copied()
                    .ok_or_else(|| mismatch(entity, "missing link 0"))?;
                format!(
                    "file, {}, {}, amplitude, {}",
                    self.label(driver)?,
                    column,
                    real(*amplitude)
                )
            }
            Drive::NodeValue { property } => {
                let node = self.nodes.node_of(entity.name(), anchor(entity, 0)?)?;
                format!(
                    "node, {}, structural, string, \"{}\", {}",
                    node,
                    property,
                    self.drive_link(entity, 0)?
                )
            }
        };
        Ok(text)
    }

    /// Constitutive law text.
    pub(crate) fn law(&self, entity: &Entity) -> Result<String> {
        let Kind::ConstitutiveLaw(law) = entity.kind() else {
            return Err(mismatch(entity, "not a constitutive law"));
        };
        let isotropic = if law.dim() == Dim::D1 { "" } else { " isotropic" };
        let text = match law {
            ConstitutiveLaw::LinearElastic { stiffness, .. } => {
                format!("linear elastic{}, {}", isotropic, real(*stiffness))
            }
            ConstitutiveLaw::LinearViscous { viscosity, .. } => {
                format!("linear viscous{}, {}", isotropic, real(*viscosity))
            }
            ConstitutiveLaw::LinearViscoelastic {
                stiffness,
                viscosity,
                ..
            } => format!(
                "linear viscoelastic{}, {}, {}",
                isotropic,
                real(*stiffness),
                real(*viscosity)
            ),
            ConstitutiveLaw::CubicElastic { c1, c2, c3 } => {
                format!("cubic elastic, {}", reals(&[*c1, *c2, *c3]))
            }
            ConstitutiveLaw::LinearElasticGeneric { .. } => {
                format!("linear elastic generic, {}", self.matrix_link(entity, 0)?)
            }
            ConstitutiveLaw::LinearViscoelasticGeneric { .. } => format!(
                "linear viscoelastic generic, {}, {}",
                self.matrix_link(entity, 0)?,
                self.matrix_link(entity, 1)?
            ),
        };
        Ok(text)
    }

    fn friction(&self, entity: &Entity) -> Result<String> {
        let Kind::Friction(friction) = entity.kind() else {
            return Err(mismatch(entity, "not a friction model"));
        };
        let function = linked(self.db, entity, 0)?.name();
        let text = match friction {
            Friction::ModLugre {
                sigma0,
                sigma1,
                sigma2,
                kappa,
            } => format!(
                "modlugre, {}, \"{}\"",
                reals(&[*sigma0, *sigma1, *sigma2, *kappa]),
                function
            ),
            Friction::DiscreteCoulomb {
                sigma2,
                velocity_ratio,
            } => format!(
                "discrete coulomb, \"{}\", sigma2, {}, velocity ratio, {}",
                function,
                real(*sigma2),
                real(*velocity_ratio)
            ),
        };
        Ok(text)
    }

    // ------------------------------------------------------------------
    // Frames and nodes
    // ------------------------------------------------------------------

    fn frame_ref(&self, parent: Option<EntityId>) -> Result<String> {
        match parent {
            Some(id) => Ok(self.label(id)?.to_string()),
            None => Ok("global".to_string()),
        }
    }

    pub(crate) fn frame(&self, frame: &ResolvedFrame) -> Result<String> {
        let base = self.frame_ref(frame.parent)?;
        Ok(format!(
            "reference: {}, reference, {base}, {}, reference, {base}, {}, reference, {base}, {}, reference, {base}, {}",
            self.label(frame.id)?,
            vector(&frame.position),
            orientation(&frame.orientation),
            vector(&frame.velocity),
            vector(&frame.angular_velocity),
            base = base
        ))
    }

    /// Static or dynamic structural node. A node sitting on a frame origin
    /// is placed in that frame and inherits its motion.
    pub(crate) fn node(&self, label: usize, node: &StructuralNode, class: &str) -> Result<String> {
        if let Some(frame) = self.frames.iter().find(|f| f.origin == node.anchor) {
            let f = self.label(frame.id)?;
            return Ok(format!(
                "structural: {}, {}, reference, {f}, null, reference, {f}, eye, reference, {f}, null, reference, {f}, null",
                label,
                class,
                f = f
            ));
        }
        let placement = self.placement(&node.anchor)?;
        Ok(format!(
            "structural: {}, {}, reference, global, {}, reference, global, {}, reference, global, null, reference, global, null",
            label,
            class,
            vector(&placement.position),
            orientation(&placement.rotation)
        ))
    }

    pub(crate) fn dummy_node(&self, label: usize, node: &StructuralNode) -> Result<String> {
        let base = node
            .base
            .as_ref()
            .ok_or_else(|| ModelError::ConflictingNodeClass(node.anchor.to_string()))?;
        let base_label = self
            .nodes
            .label(base)
            .ok_or_else(|| ModelError::UnattachedAnchor {
                entity: node.anchor.to_string(),
                anchor: base.to_string(),
            })?;
        let relative = self.placement(&node.anchor)?.relative_to(&self.placement(base)?);
        Ok(format!(
            "structural: {}, dummy, {}, offset, reference, node, {}, reference, node, {}",
            label,
            base_label,
            vector(&relative.position),
            orientation(&relative.rotation)
        ))
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    /// Element statement for the element `id`.
    pub(crate) fn element(&self, id: EntityId) -> Result<String> {
        let entity = self.db.get(id)?;
        let Kind::Element(element) = entity.kind() else {
            return Err(mismatch(entity, "not an element"));
        };
        let i = self.label(id)?;
        let text = match element {
            Element::AerodynamicBody {
                span,
                chord,
                aerodynamic_center,
                bc_point,
                twist,
                integration_points,
                airfoil,
            } => {
                let (n, rel) = self.at_node(entity, 0)?;
                format!(
                    "aerodynamic body: {}, {}, reference, node, {}, reference, node, {}, {}, const, {}, const, {}, const, {}, const, {}, {}, {}",
                    i,
                    n,
                    vector(&rel.position),
                    orientation(&rel.rotation),
                    real(*span),
                    real(*chord),
                    real(*aerodynamic_center),
                    real(*bc_point),
                    real(*twist),
                    integration_points,
                    airfoil
                )
            }
            Element::Beam2 => {
                let (n1, r1) = self.at_node(entity, 0)?;
                let (n2, r2) = self.at_node(entity, 1)?;
                format!(
                    "beam2: {}, {}, reference, node, {}, {}, reference, node, {}, from nodes, {}",
                    i,
                    n1,
                    vector(&r1.position),
                    n2,
                    vector(&r2.position),
                    self.law_link(entity, 0)?
                )
            }
            Element::Beam3 => {
                let (n1, r1) = self.at_node(entity, 0)?;
                let (n2, r2) = self.at_node(entity, 1)?;
                let (n3, r3) = self.at_node(entity, 2)?;
                format!(
                    "beam3: {}, {}, reference, node, {}, {}, reference, node, {}, {}, reference, node, {}, from nodes, {}, from nodes, {}",
                    i,
                    n1,
                    vector(&r1.position),
                    n2,
                    vector(&r2.position),
                    n3,
                    vector(&r3.position),
                    self.law_link(entity, 0)?,
                    self.law_link(entity, 1)?
                )
            }
            Element::Body { mass } => {
                let (n, rel) = self.at_node(entity, 0)?;
                let cm = rel.position + rel.rotation * self.vector_link(entity, 0)?;
                let mut text = format!(
                    "body: {}, {}, {}, reference, node, {}, {}",
                    i,
                    n,
                    real(*mass),
                    vector(&cm),
                    self.matrix_link(entity, 1)?
                );
                if !is_identity(&rel.rotation) {
                    text.push_str(&format!(", inertial, reference, node, {}", orientation(&rel.rotation)));
                }
                text
            }
            Element::StructuralForce { follower } => {
                let (n, rel) = self.at_node(entity, 0)?;
                format!(
                    "force: {}, {}, {}, position, reference, node, {}, single, {}, {}",
                    i,
                    if *follower { "follower" } else { "absolute" },
                    n,
                    vector(&rel.position),
                    vec3(&self.vector_link(entity, 0)?),
                    self.drive_link(entity, 1)?
                )
            }
            Element::StructuralCouple { follower } => {
                let (n, _) = self.at_node(entity, 0)?;
                format!(
                    "couple: {}, {}, {}, single, {}, {}",
                    i,
                    if *follower { "follower" } else { "absolute" },
                    n,
                    vec3(&self.vector_link(entity, 0)?),
                    self.drive_link(entity, 1)?
                )
            }
            Element::GenelClamp => {
                let target = linked(self.db, entity, 0)?;
                let Kind::NsNode(node) = target.kind() else {
                    return Err(mismatch(entity, "link 0 is not a non-structural node"));
                };
                format!(
                    "genel: {}, clamp, {}, {}, {}",
                    i,
                    self.label(entity.links()[0])?,
                    ns_node_type(node),
                    self.drive_link(entity, 1)?
                )
            }
            Element::Clamp => {
                let (n, at) = self.at_world(entity, 0)?;
                if self.nodes.nodes()[n].anchor == *anchor(entity, 0)? {
                    format!("joint: {}, clamp, {}, node, node", i, n)
                } else {
                    format!(
                        "joint: {}, clamp, {}, reference, global, {}, reference, global, {}",
                        i,
                        n,
                        vector(&at.position),
                        orientation(&at.rotation)
                    )
                }
            }
            Element::SphericalHinge => {
                let (n1, at) = self.at_world(entity, 0)?;
                let (n2, _) = self.at_world(entity, 1)?;
                let p = vector(&at.position);
                format!(
                    "joint: {}, spherical hinge, {}, position, reference, global, {p}, {}, position, reference, global, {p}",
                    i,
                    n1,
                    n2,
                    p = p
                )
            }
            Element::RevoluteHinge { friction_radius } => {
                let mut text = format!("joint: {}, revolute hinge, {}", i, self.hinge_pair(entity)?);
                if let Some(radius) = friction_radius {
                    let friction = self.friction(linked(self.db, entity, 0)?)?;
                    text.push_str(&format!(", friction, {}, {}, simple", real(*radius), friction));
                }
                text
            }
            Element::Prismatic => {
                let (n1, at) = self.at_world(entity, 0)?;
                let (n2, _) = self.at_world(entity, 1)?;
                let r = orientation(&at.rotation);
                format!(
                    "joint: {}, prismatic, {}, orientation, reference, global, {r}, {}, orientation, reference, global, {r}",
                    i,
                    n1,
                    n2,
                    r = r
                )
            }
            Element::InLine => {
                let (n1, at) = self.at_world(entity, 0)?;
                let (n2, end) = self.at_world(entity, 1)?;
                format!(
                    "joint: {}, in line, {}, reference, global, {}, reference, global, {}, {}, offset, reference, global, {}",
                    i,
                    n1,
                    vector(&at.position),
                    orientation(&at.rotation),
                    n2,
                    vector(&end.position)
                )
            }
            Element::Distance => {
                let (n1, r1) = self.at_node(entity, 0)?;
                let (n2, r2) = self.at_node(entity, 1)?;
                format!(
                    "joint: {}, distance, {}, position, reference, node, {}, {}, position, reference, node, {}, {}",
                    i,
                    n1,
                    vector(&r1.position),
                    n2,
                    vector(&r2.position),
                    self.drive_link(entity, 0)?
                )
            }
            Element::Rod => {
                let (n1, r1) = self.at_node(entity, 0)?;
                let (n2, r2) = self.at_node(entity, 1)?;
                format!(
                    "joint: {}, rod, {}, position, reference, node, {}, {}, position, reference, node, {}, from nodes, {}",
                    i,
                    n1,
                    vector(&r1.position),
                    n2,
                    vector(&r2.position),
                    self.law_link(entity, 0)?
                )
            }
            Element::AxialRotation => format!(
                "joint: {}, axial rotation, {}, {}",
                i,
                self.hinge_pair(entity)?,
                self.drive_link(entity, 0)?
            ),
            Element::DeformableDisplacement => format!(
                "joint: {}, deformable displacement joint, {}, {}",
                i,
                self.hinge_pair(entity)?,
                self.law_link(entity, 0)?
            ),
            Element::Rotor { induced_velocity } => {
                let (craft, _) = self.at_node(entity, 0)?;
                let (rotor, _) = self.at_node(entity, 1)?;
                let model = match induced_velocity {
                    InducedVelocity::No => "no".to_string(),
                    InducedVelocity::Uniform { omega, radius } => {
                        format!("uniform, {}, {}", real(*omega), real(*radius))
                    }
                };
                format!(
                    "rotor: {}, {}, {}, induced velocity, {}",
                    i, craft, rotor, model
                )
            }
            Element::Gravity => format!(
                "gravity: {}, {}",
                self.matrix_link(entity, 0)?,
                self.drive_link(entity, 1)?
            ),
            Element::AirProperties {
                density,
                sound_speed,
            } => format!(
                "air properties: {}, {}, {}, {}",
                real(*density),
                real(*sound_speed),
                self.matrix_link(entity, 0)?,
                self.drive_link(entity, 1)?
            ),
            Element::Driven => {
                let inner = entity
                    .links()
                    .get(1)
                    .copied()
                    .ok_or_else(|| mismatch(entity, "missing link 1"))?;
                format!(
                    "driven: {}, {}, {}",
                    i,
                    self.drive_link(entity, 0)?,
                    self.element(inner)?
                )
            }
            Element::RigidOffset | Element::DummyNode => {
                return Err(mismatch(entity, "node mappings are not elements"));
            }
        };
        Ok(text)
    }

    /// `n1, position, .., orientation, .., n2, position, .., orientation, ..`
    /// for joints located at the first anchor.
    fn hinge_pair(&self, entity: &Entity) -> Result<String> {
        let (n1, at) = self.at_world(entity, 0)?;
        let (n2, _) = self.at_world(entity, 1)?;
        let p = vector(&at.position);
        let r = orientation(&at.rotation);
        Ok(format!(
            "{}, position, reference, global, {p}, orientation, reference, global, {r}, {}, position, reference, global, {p}, orientation, reference, global, {r}",
            n1,
            n2,
            p = p,
            r = r
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::SceneAnchors;
    use mbdeck_math::rotation_x;
    use mbdeck_model::TypeTag;

    struct Fixture {
        db: Database,
        scene: SceneAnchors,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                db: Database::new(),
                scene: SceneAnchors::new(),
            }
        }

        fn render(&self, id: EntityId) -> Result<String> {
            let nodes = NodeTable::build(&self.db)?;
            let scope = Scope {
                db: &self.db,
                anchors: &self.scene,
                nodes: &nodes,
                frames: &[],
            };
            scope.element(id)
        }
    }

    #[test]
    fn test_matrix_forms() {
        assert_eq!(matrix(&Matrix::null_vector()), "null");
        assert_eq!(matrix(&Matrix::vector(1.0, -0.0, 0.123456)), "1, 0, 0.12346");
        assert_eq!(
            matrix(&Matrix::Matrix3x3 {
                form: Matrix3Form::Diag([1.0, 2.0, 3.0])
            }),
            "diag, 1, 2, 3"
        );
        assert_eq!(
            matrix(&Matrix::Matrix6x6 {
                form: Matrix6Form::Eye
            }),
            "eye"
        );
    }

    #[test]
    fn test_orientation_text() {
        assert_eq!(orientation(&Mat3::identity()), "eye");
        assert_eq!(
            orientation(&rotation_x(std::f64::consts::FRAC_PI_2)),
            "matr, 1, 0, 0, 0, 0, -1, 0, 1, 0"
        );
    }

    #[test]
    fn test_rod_statement() {
        let mut fx = Fixture::new();
        fx.scene.insert("A", Placement::at(0.0, 0.0, 0.0));
        fx.scene.insert("B", Placement::at(1.0, 0.0, 0.0));
        let law = fx
            .db
            .create(
                "spring",
                Kind::ConstitutiveLaw(ConstitutiveLaw::LinearElastic {
                    dim: Dim::D1,
                    stiffness: 1000.0,
                }),
                vec![],
                vec![],
            )
            .unwrap();
        let rod = fx
            .db
            .create("rod", Kind::Element(Element::Rod), vec!["A".into(), "B".into()], vec![law])
            .unwrap();
        assert_eq!(
            fx.render(rod).unwrap(),
            "joint: 0, rod, 0, position, reference, node, null, 1, position, reference, node, null, from nodes, linear elastic, 1000"
        );
    }

    #[test]
    fn test_rigid_offset_position() {
        let mut fx = Fixture::new();
        fx.scene.insert("hub", Placement::at(1.0, 0.0, 0.0));
        fx.scene.insert("tip", Placement::at(1.0, 0.0, 2.0));
        let v = fx.db.create("dir", Kind::Matrix(Matrix::vector(0.0, 0.0, -1.0)), vec![], vec![]).unwrap();
        let amp = fx
            .db
            .create("amp", Kind::Drive(Drive::Constant { value: 9.81 }), vec![], vec![])
            .unwrap();
        fx.db.create_default(TypeTag::Clamp, vec!["hub".into()], vec![]).unwrap();
        fx.db
            .create_default(TypeTag::RigidOffset, vec!["tip".into(), "hub".into()], vec![])
            .unwrap();
        let force = fx
            .db
            .create_default(TypeTag::StructuralForce, vec!["tip".into()], vec![v, amp])
            .unwrap();
        assert_eq!(
            fx.render(force).unwrap(),
            "force: 2, absolute, 0, position, reference, node, 0, 0, 2, single, 0, 0, -1, const, 9.81"
        );
    }

    #[test]
    fn test_drive_texts() {
        let mut db = Database::new();
        let unit = db.create_default(TypeTag::UnitDrive, vec![], vec![]).unwrap();
        let step = db
            .create(
                "step",
                Kind::Drive(Drive::Step {
                    initial_time: 1.0,
                    step_value: 2.0,
                    initial_value: 0.0,
                }),
                vec![],
                vec![],
            )
            .unwrap();
        let array = db
            .create("array", Kind::Drive(Drive::Array), vec![], vec![unit, step])
            .unwrap();
        let f = db.create_default(TypeTag::ConstFunction, vec![], vec![]).unwrap();
        let by_function = db
            .create_default(TypeTag::FunctionDrive, vec![], vec![f])
            .unwrap();

        let nodes = NodeTable::default();
        let scene = SceneAnchors::new();
        let scope = Scope {
            db: &db,
            anchors: &scene,
            nodes: &nodes,
            frames: &[],
        };
        assert_eq!(
            scope.drive(db.get(array).unwrap()).unwrap(),
            "array, 2, unit, step, 1, 2, 0"
        );
        assert_eq!(
            scope.drive(db.get(by_function).unwrap()).unwrap(),
            "scalar function, \"Const\""
        );
    }

    #[test]
    fn test_unattached_anchor_is_an_error() {
        let mut fx = Fixture::new();
        fx.scene.insert("loose", Placement::at(0.0, 0.0, 0.0));
        let v = fx.db.create_default(TypeTag::Vector3, vec![], vec![]).unwrap();
        let unit = fx.db.create_default(TypeTag::UnitDrive, vec![], vec![]).unwrap();
        let couple = fx
            .db
            .create_default(TypeTag::StructuralCouple, vec!["loose".into()], vec![v, unit])
            .unwrap();
        let err = fx.render(couple).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Anchor \"loose\" of \"Structural couple\" is not attached to any node"
        );
    }

    #[test]
    fn test_function_texts() {
        let mut db = Database::new();
        let a = db.create_default(TypeTag::ConstFunction, vec![], vec![]).unwrap();
        let b = db
            .create(
                "table",
                Kind::Function(Function::Multilinear {
                    points: vec![[0.0, 0.0], [1.0, 0.5]],
                    extrapolate: false,
                }),
                vec![],
                vec![],
            )
            .unwrap();
        let sum = db.create_default(TypeTag::SumFunction, vec![], vec![a, b]).unwrap();
        assert_eq!(
            function(db.get(b).unwrap(), &db).unwrap(),
            "multilinear, do not extrapolate, 0, 0, 1, 0.5"
        );
        assert_eq!(
            function(db.get(sum).unwrap(), &db).unwrap(),
            "sum, \"Const\", \"table\""
        );
    }
}

//! Deck assembly.
//!
//! Layout, top to bottom: label index comments, data and initial value
//! blocks, reference frames, control data, nodes, drive callers, scalar
//! functions, drivers, elements. Control data is computed last because it
//! counts what the other blocks actually emitted.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use mbdeck_math::real;
use mbdeck_model::kinds::{Element, ElementClass, NsNode};
use mbdeck_model::{Category, Database, EntityId, Kind};

use crate::anchors::AnchorProvider;
use crate::error::{DeckError, Result};
use crate::frames::resolve_partial;
use crate::nodes::{NodeClass, NodeTable};
use crate::render::{self, Scope};
use crate::resume;
use crate::settings::Simulation;

/// A problem met while writing one entity. The entity is replaced by a
/// comment in the deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Name of the entity that was skipped, or the anchor of a skipped
    /// structural node.
    pub entity: String,
    /// What went wrong.
    pub message: String,
}

/// A written deck.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deck {
    /// Deck text.
    pub text: String,
    /// Entities skipped while writing.
    pub diagnostics: Vec<Diagnostic>,
}

impl Deck {
    /// Whether every entity was written.
    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Write the deck text to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.text)?;
        info!("wrote {} ({} bytes)", path.display(), self.text.len());
        Ok(())
    }
}

/// Write the deck of `db`.
///
/// Frame cycles, ambiguous frame parents and node assignment failures
/// abort the whole deck. Failures of a single frame, structural node, drive
/// caller, function or element are recorded as
/// `# error in "<name>": <message>` lines and as [`Diagnostic`]s.
pub fn write_deck(
    db: &Database,
    anchors: &dyn AnchorProvider,
    settings: &Simulation,
) -> Result<Deck> {
    let (frames, skipped_frames) = resolve_partial(db, anchors)?;
    let nodes = NodeTable::build(db)?;
    let scope = Scope {
        db,
        anchors,
        nodes: &nodes,
        frames: &frames,
    };
    let mut writer = Writer {
        scope,
        skipped_frames,
        diagnostics: Vec::new(),
    };
    let text = writer.write(settings)?;
    if !writer.diagnostics.is_empty() {
        warn!("deck written with {} error(s)", writer.diagnostics.len());
    }
    Ok(Deck {
        text,
        diagnostics: writer.diagnostics,
    })
}

/// Cardinalities of the control data block.
#[derive(Debug, Default)]
struct Counts {
    aerodynamic: usize,
    beams: usize,
    bodies: usize,
    forces: usize,
    genels: usize,
    joints: usize,
    rotors: usize,
    gravity: bool,
    air_properties: bool,
}

impl Counts {
    fn add(&mut self, element: &Element) {
        match element.class() {
            Some(ElementClass::Aerodynamic) => self.aerodynamic += 1,
            Some(ElementClass::Beam) => self.beams += 1,
            Some(ElementClass::Body) => self.bodies += 1,
            Some(ElementClass::Force) => self.forces += 1,
            Some(ElementClass::Genel) => self.genels += 1,
            Some(ElementClass::Joint) => self.joints += 1,
            Some(ElementClass::Rotor) => self.rotors += 1,
            Some(ElementClass::Environment) => match element {
                Element::Gravity => self.gravity = true,
                _ => self.air_properties = true,
            },
            Some(ElementClass::Driven) | None => {}
        }
    }
}

struct Writer<'a> {
    scope: Scope<'a>,
    skipped_frames: Vec<(String, DeckError)>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Writer<'a> {
    fn db(&self) -> &'a Database {
        self.scope.db
    }

    fn fail(&mut self, out: &mut String, name: &str, err: DeckError) -> Result<()> {
        warn!("skipping \"{}\": {}", name, err);
        writeln!(out, "\t# error in \"{}\": {}", name, err)?;
        self.diagnostics.push(Diagnostic {
            entity: name.to_string(),
            message: err.to_string(),
        });
        Ok(())
    }

    fn write(&mut self, settings: &Simulation) -> Result<String> {
        let mut out = String::new();
        self.header(&mut out)?;
        self.problem(&mut out, settings)?;
        self.frames(&mut out)?;

        // Rendered ahead of control data, which counts them.
        let (elements, counts) = self.elements()?;
        let mut nodes = String::new();
        let structural = self.nodes(&mut nodes)?;
        self.control_data(&mut out, settings, structural, &counts)?;
        out.push_str(&nodes);

        let mut emitted = HashSet::new();
        self.drive_callers(&mut out, &mut emitted)?;
        self.functions(&mut out, &mut emitted)?;
        self.drivers(&mut out)?;
        out.push_str(&elements);
        Ok(out)
    }

    fn header(&self, out: &mut String) -> Result<()> {
        writeln!(out, "# MBDyn input deck")?;
        let db = self.db();
        let nodes = self.scope.nodes;
        if !nodes.is_empty() {
            writeln!(out, "#\n# structural nodes")?;
            for (i, node) in nodes.nodes().iter().enumerate() {
                writeln!(out, "#   {}: {}", i, node.anchor)?;
            }
        }
        for category in [
            Category::Frame,
            Category::NsNode,
            Category::Drive,
            Category::Driver,
            Category::Element,
        ] {
            let collection = db.collection(category);
            if collection.is_empty() {
                continue;
            }
            writeln!(out, "#\n# {}", category.label())?;
            for (i, (_, entity)) in db.iter(category).enumerate() {
                writeln!(out, "#   {}: {}", i, entity.name())?;
            }
        }
        writeln!(out)?;
        Ok(())
    }

    fn problem(&self, out: &mut String, settings: &Simulation) -> Result<()> {
        writeln!(out, "begin: data;\n\tproblem: initial value;\nend: data;\n")?;
        // Step sizes and tolerances are written unrounded.
        writeln!(out, "begin: initial value;")?;
        writeln!(out, "\tinitial time: {};", real(resume::initial_time(settings)))?;
        writeln!(out, "\tfinal time: {};", real(settings.final_time))?;
        writeln!(out, "\ttime step: {};", settings.time_step)?;
        writeln!(out, "\tmax iterations: {};", settings.max_iterations)?;
        writeln!(out, "\ttolerance: {};", settings.tolerance)?;
        writeln!(out, "\tderivatives tolerance: {};", settings.derivatives_tolerance)?;
        writeln!(out, "\tmethod: {};", settings.method)?;
        writeln!(out, "end: initial value;\n")?;
        Ok(())
    }

    fn frames(&mut self, out: &mut String) -> Result<()> {
        if self.scope.frames.is_empty() && self.skipped_frames.is_empty() {
            return Ok(());
        }
        let frames = self.scope.frames;
        for frame in frames {
            match self.scope.frame(frame) {
                Ok(text) => writeln!(out, "{};", text)?,
                Err(err) => self.fail(out, &frame.name, err)?,
            }
        }
        for (name, err) in std::mem::take(&mut self.skipped_frames) {
            self.fail(out, &name, err)?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn control_data(
        &self,
        out: &mut String,
        settings: &Simulation,
        structural: usize,
        counts: &Counts,
    ) -> Result<()> {
        let db = self.db();
        let mut ns = [0usize; 4];
        for (_, entity) in db.iter(Category::NsNode) {
            if let Kind::NsNode(node) = entity.kind() {
                ns[ns_index(node)] += 1;
            }
        }
        let rows = [
            ("structural nodes", structural),
            ("abstract nodes", ns[0]),
            ("electric nodes", ns[1]),
            ("hydraulic nodes", ns[2]),
            ("parameter nodes", ns[3]),
            ("rigid bodies", counts.bodies),
            ("joints", counts.joints),
            ("beams", counts.beams),
            ("forces", counts.forces),
            ("genels", counts.genels),
            ("aerodynamic elements", counts.aerodynamic),
            ("rotors", counts.rotors),
            ("file drivers", db.collection(Category::Driver).len()),
        ];

        writeln!(out, "begin: control data;")?;
        for (keyword, count) in rows.iter().filter(|(_, count)| *count > 0) {
            writeln!(out, "\t{}: {};", keyword, count)?;
        }
        if counts.gravity {
            writeln!(out, "\tgravity;")?;
        }
        if counts.air_properties {
            writeln!(out, "\tair properties;")?;
        }
        writeln!(out, "\toutput frequency: {};", settings.output_frequency)?;
        writeln!(out, "end: control data;\n")?;
        Ok(())
    }

    /// Node block text. Returns the number of structural nodes written.
    fn nodes(&mut self, out: &mut String) -> Result<usize> {
        let db = self.db();
        let nodes = self.scope.nodes;
        let ns = db.collection(Category::NsNode);
        if nodes.is_empty() && ns.is_empty() {
            return Ok(0);
        }
        writeln!(out, "begin: nodes;")?;
        let mut written = 0;
        for class in [NodeClass::Static, NodeClass::Dynamic, NodeClass::Dummy] {
            for (label, node) in nodes.of_class(class) {
                let text = match class {
                    NodeClass::Static => self.scope.node(label, node, "static"),
                    NodeClass::Dynamic => self.scope.node(label, node, "dynamic"),
                    NodeClass::Dummy => self.scope.dummy_node(label, node),
                };
                match text {
                    Ok(text) => {
                        writeln!(out, "\t{};", text)?;
                        written += 1;
                    }
                    Err(err) => self.fail(out, &node.anchor.to_string(), err)?,
                }
            }
        }
        for (label, (_, entity)) in db.iter(Category::NsNode).enumerate() {
            if let Kind::NsNode(node) = entity.kind() {
                writeln!(out, "\t{};", render::ns_node(label, node))?;
            }
        }
        writeln!(out, "end: nodes;\n")?;
        Ok(written)
    }

    fn drive_callers(&mut self, out: &mut String, emitted: &mut HashSet<EntityId>) -> Result<()> {
        let db = self.db();
        let mut any = false;
        for (label, (id, entity)) in db.iter(Category::Drive).enumerate() {
            if entity.users() > 0 {
                continue;
            }
            let mut needed = Vec::new();
            functions_of(db, id, &mut needed)?;
            for function in needed {
                self.function(out, function, emitted)?;
            }
            match self.scope.drive(entity) {
                Ok(text) => writeln!(
                    out,
                    "drive caller: {}, name, \"{}\", {};",
                    label,
                    entity.name(),
                    text
                )?,
                Err(err) => self.fail(out, entity.name(), err)?,
            }
            any = true;
        }
        if any {
            writeln!(out)?;
        }
        Ok(())
    }

    fn functions(&mut self, out: &mut String, emitted: &mut HashSet<EntityId>) -> Result<()> {
        let db = self.db();
        let before = emitted.len();
        for (id, entity) in db.iter(Category::Function) {
            if entity.users() > 0 {
                self.function(out, id, emitted)?;
            }
        }
        if emitted.len() > before {
            writeln!(out)?;
        }
        Ok(())
    }

    /// Emit the function `id` after the functions it combines, each once.
    fn function(
        &mut self,
        out: &mut String,
        id: EntityId,
        emitted: &mut HashSet<EntityId>,
    ) -> Result<()> {
        if !emitted.insert(id) {
            return Ok(());
        }
        let db = self.db();
        let entity = db.get(id)?;
        for &link in entity.links() {
            if db.get(link)?.category() == Category::Function {
                self.function(out, link, emitted)?;
            }
        }
        match render::function(entity, db) {
            Ok(text) => writeln!(out, "scalar function: \"{}\", {};", entity.name(), text)?,
            Err(err) => self.fail(out, entity.name(), err)?,
        }
        Ok(())
    }

    fn drivers(&self, out: &mut String) -> Result<()> {
        let db = self.db();
        if db.collection(Category::Driver).is_empty() {
            return Ok(());
        }
        writeln!(out, "begin: drivers;")?;
        for (label, (_, entity)) in db.iter(Category::Driver).enumerate() {
            if let Kind::Driver(driver) = entity.kind() {
                writeln!(out, "\t{};", render::driver(label, driver))?;
            }
        }
        writeln!(out, "end: drivers;\n")?;
        Ok(())
    }

    /// Element block text and the counts of what it holds.
    fn elements(&mut self) -> Result<(String, Counts)> {
        let db = self.db();
        let wrapped: HashSet<EntityId> = db
            .iter(Category::Element)
            .filter(|(_, entity)| matches!(entity.kind().as_element(), Some(Element::Driven)))
            .filter_map(|(_, entity)| entity.links().get(1).copied())
            .collect();

        let mut buckets: BTreeMap<ElementClass, String> = BTreeMap::new();
        let mut counts = Counts::default();
        for (id, entity) in db.iter(Category::Element) {
            let Some(element) = entity.kind().as_element() else {
                continue;
            };
            let Some(class) = element.class() else {
                continue;
            };
            if wrapped.contains(&id) {
                continue;
            }
            let bucket = buckets.entry(class).or_default();
            match self.scope.element(id) {
                Ok(text) => {
                    writeln!(bucket, "\t{};", text)?;
                    counts.add(counted(db, entity.links(), element));
                }
                Err(err) => self.fail(bucket, entity.name(), err)?,
            }
        }

        let mut out = String::new();
        if buckets.is_empty() {
            return Ok((out, counts));
        }
        writeln!(out, "begin: elements;")?;
        for class in ElementClass::ALL {
            if let Some(text) = buckets.get(&class) {
                out.push_str(text);
            }
        }
        writeln!(out, "end: elements;")?;
        debug!("element block: {:?}", counts);
        Ok((out, counts))
    }
}

/// The element a driven element stands for in the counts.
fn counted<'a>(db: &'a Database, links: &[EntityId], element: &'a Element) -> &'a Element {
    if !matches!(element, Element::Driven) {
        return element;
    }
    links
        .get(1)
        .and_then(|&inner| db.get(inner).ok())
        .and_then(|inner| inner.kind().as_element())
        .unwrap_or(element)
}

fn ns_index(node: &NsNode) -> usize {
    match node {
        NsNode::Abstract { .. } => 0,
        NsNode::Electric { .. } => 1,
        NsNode::Hydraulic { .. } => 2,
        NsNode::Parameter { .. } => 3,
    }
}

/// Functions reachable from the drive `id` through nested drives.
fn functions_of(db: &Database, id: EntityId, found: &mut Vec<EntityId>) -> Result<()> {
    for &link in db.get(id)?.links() {
        match db.get(link)?.category() {
            Category::Function => found.push(link),
            Category::Drive => functions_of(db, link, found)?,
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::SceneAnchors;
    use mbdeck_math::Placement;
    use mbdeck_model::{Anchor, TypeTag};

    fn add(db: &mut Database, tag: TypeTag, anchors: &[&str], links: Vec<EntityId>) -> EntityId {
        db.create_default(tag, anchors.iter().map(|&a| Anchor::from(a)).collect(), links)
            .unwrap()
    }

    #[test]
    fn test_empty_model() {
        let deck = write_deck(&Database::new(), &SceneAnchors::new(), &Simulation::default()).unwrap();
        assert!(deck.is_complete());
        assert!(deck.text.contains("begin: initial value;"));
        assert!(deck.text.contains("\tmethod: ms, 0.6;"));
        assert!(!deck.text.contains("begin: nodes;"));
        assert!(!deck.text.contains("begin: elements;"));
    }

    #[test]
    fn test_section_order() {
        let mut db = Database::new();
        let law = add(&mut db, TypeTag::LinearElastic, &[], vec![]);
        add(&mut db, TypeTag::Rod, &["a", "b"], vec![law]);
        add(&mut db, TypeTag::AbstractNode, &[], vec![]);
        let scene = SceneAnchors::new()
            .with("a", Placement::at(0.0, 0.0, 0.0))
            .with("b", Placement::at(1.0, 0.0, 0.0));

        let text = write_deck(&db, &scene, &Simulation::default()).unwrap().text;
        let at = |needle: &str| text.find(needle).unwrap();
        assert!(at("begin: data;") < at("begin: initial value;"));
        assert!(at("begin: initial value;") < at("begin: control data;"));
        assert!(at("begin: control data;") < at("begin: nodes;"));
        assert!(at("begin: nodes;") < at("begin: elements;"));
        assert!(text.contains("\tstructural nodes: 2;\n\tabstract nodes: 1;\n\tjoints: 1;\n"));
        assert!(text.contains("\tabstract: 0, differential, value, 0;"));
    }

    #[test]
    fn test_driven_counts_as_its_element() {
        let mut db = Database::new();
        let vector = add(&mut db, TypeTag::Vector3, &[], vec![]);
        let unit = add(&mut db, TypeTag::UnitDrive, &[], vec![]);
        let gravity = add(&mut db, TypeTag::Gravity, &[], vec![vector, unit]);
        let step = add(&mut db, TypeTag::StepDrive, &[], vec![]);
        add(&mut db, TypeTag::Driven, &[], vec![step, gravity]);

        let text = write_deck(&db, &SceneAnchors::new(), &Simulation::default())
            .unwrap()
            .text;
        assert!(text.contains("\tgravity;\n"));
        assert_eq!(text.matches("gravity: null, unit").count(), 1);
        assert!(text.contains("\tdriven: 1, step, 0, 1, 0, gravity: null, unit;"));
    }

    #[test]
    fn test_write_to_reports_io_errors() {
        let deck = Deck::default();
        let err = deck
            .write_to(Path::new("/nonexistent/dir/model.mbd"))
            .unwrap_err();
        assert!(matches!(err, DeckError::Io(_)));
    }
}

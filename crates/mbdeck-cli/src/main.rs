//! mbdeck CLI - write MBDyn input decks from saved multibody models
//!
//! Models are JSON snapshots of an entity database; scenes are JSON maps
//! from anchor names to world placements.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use mbdeck_model::{find_type, registry, Category, Database, LinkSlots, Snapshot};
use mbdeck_writer::{write_deck, NodeClass, NodeTable, SceneAnchors, Simulation};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mbdeck")]
#[command(about = "Write MBDyn input decks from multibody models", long_about = None)]
struct Cli {
    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the deck of a model
    Export {
        /// Model snapshot (.json)
        model: PathBuf,
        /// Anchor placements (.json)
        #[arg(short, long)]
        scene: PathBuf,
        /// Output deck (default: the model path with an .mbd extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Simulation settings (.toml, default: ./mbdeck.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Display information about a model
    Info {
        /// Model snapshot (.json)
        model: PathBuf,
    },
    /// Check a model without writing a deck
    Check {
        /// Model snapshot (.json)
        model: PathBuf,
        /// Anchor placements (.json); enables a dry-run emission
        #[arg(short, long)]
        scene: Option<PathBuf>,
    },
    /// List the entity types that can be created, or describe one
    Types {
        /// Type name, e.g. "Rod" (case-insensitive)
        name: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Export {
            model,
            scene,
            output,
            config,
        } => {
            let output = output.unwrap_or_else(|| model.with_extension("mbd"));
            export(&model, &scene, &output, config.as_deref())?;
        }
        Commands::Info { model } => {
            show_info(&model)?;
        }
        Commands::Check { model, scene } => {
            check(&model, scene.as_deref())?;
        }
        Commands::Types { name: None } => {
            list_types();
        }
        Commands::Types { name: Some(name) } => {
            println!("{}", describe_type(&name)?);
        }
    }

    Ok(())
}

fn load_model(path: &Path) -> Result<Database> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read model {}", path.display()))?;
    let snapshot = Snapshot::from_json(&json)
        .with_context(|| format!("Failed to parse model {}", path.display()))?;
    let db = Database::from_snapshot(&snapshot)
        .with_context(|| format!("Failed to restore model {}", path.display()))?;
    debug!("loaded {} entities from {}", db.len(), path.display());
    Ok(db)
}

fn load_scene(path: &Path) -> Result<SceneAnchors> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene {}", path.display()))?;
    let scene = SceneAnchors::from_json(&json)
        .with_context(|| format!("Failed to parse scene {}", path.display()))?;
    debug!("loaded {} anchors from {}", scene.len(), path.display());
    Ok(scene)
}

fn parse_settings(text: &str) -> Result<Simulation> {
    Ok(toml::from_str(text)?)
}

/// Settings file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG: &str = "mbdeck.toml";

fn load_settings(path: Option<&Path>) -> Result<Simulation> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG).is_file() => Path::new(DEFAULT_CONFIG),
        None => return Ok(Simulation::default()),
    };
    debug!("reading settings from {}", path.display());
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings {}", path.display()))?;
    parse_settings(&text).with_context(|| format!("Invalid settings in {}", path.display()))
}

fn export(model: &Path, scene: &Path, output: &Path, config: Option<&Path>) -> Result<()> {
    let db = load_model(model)?;
    let scene = load_scene(scene)?;
    let settings = load_settings(config)?;

    let deck = write_deck(&db, &scene, &settings)?;
    deck.write_to(output)?;
    for diagnostic in &deck.diagnostics {
        eprintln!("error in \"{}\": {}", diagnostic.entity, diagnostic.message);
    }
    println!("Wrote {}", output.display());
    if !deck.is_complete() {
        anyhow::bail!("{} entities could not be written", deck.diagnostics.len());
    }
    Ok(())
}

fn show_info(path: &Path) -> Result<()> {
    let db = load_model(path)?;

    println!("Model: {}", path.display());
    println!("Entities: {}", db.len());
    for category in Category::ALL {
        let collection = db.collection(category);
        if collection.is_empty() {
            continue;
        }
        println!();
        println!("{} ({}):", category.label(), collection.len());
        for (i, (_, entity)) in db.iter(category).enumerate() {
            println!(
                "  {:>3}  {} [{}] users: {}",
                i,
                entity.name(),
                entity.kind().type_name(),
                entity.users()
            );
        }
    }

    match NodeTable::build(&db) {
        Ok(nodes) => {
            println!();
            println!(
                "Structural nodes: {} ({} static, {} dynamic, {} dummy)",
                nodes.len(),
                nodes.of_class(NodeClass::Static).count(),
                nodes.of_class(NodeClass::Dynamic).count(),
                nodes.of_class(NodeClass::Dummy).count()
            );
        }
        Err(err) => println!("Structural nodes: {}", err),
    }
    Ok(())
}

fn check(model: &Path, scene: Option<&Path>) -> Result<()> {
    let db = load_model(model)?;
    if !db.reference_counts_consistent() {
        anyhow::bail!("Reference counts do not match the stored links");
    }
    let nodes = NodeTable::build(&db)?;
    info!("{} structural node(s)", nodes.len());

    if let Some(scene) = scene {
        let scene = load_scene(scene)?;
        let deck = write_deck(&db, &scene, &Simulation::default())?;
        for diagnostic in &deck.diagnostics {
            eprintln!("error in \"{}\": {}", diagnostic.entity, diagnostic.message);
        }
        if !deck.is_complete() {
            anyhow::bail!("{} entities could not be written", deck.diagnostics.len());
        }
    }
    println!("{}: ok", model.display());
    Ok(())
}

fn list_types() {
    for category in Category::ALL {
        println!("{}:", category.label());
        for info in registry().iter().filter(|info| info.category == category) {
            println!("  {}", info.name);
        }
    }
}

fn describe_type(name: &str) -> Result<String> {
    let info = find_type(name).with_context(|| format!("Unknown entity type \"{}\"", name))?;
    let kind = (info.make)();
    let anchors = kind.anchor_range();
    let anchors = if anchors.start() == anchors.end() {
        anchors.start().to_string()
    } else {
        format!("{} to {}", anchors.start(), anchors.end())
    };
    let links = match kind.link_slots() {
        LinkSlots::Fixed(slots) if slots.is_empty() => "none".to_string(),
        LinkSlots::Fixed(slots) => slots
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        LinkSlots::Repeated { slot, min } => format!("{} or more {}", min, slot),
    };
    Ok(format!(
        "{} ({})\n  anchors: {}\n  links: {}",
        info.name, info.category, anchors, links
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use mbdeck_writer::Method;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_settings() {
        let settings = parse_settings(
            r#"
final_time = 2.5
time_step = 0.01

[method]
type = "hope"
rho = 0.5
"#,
        )
        .unwrap();
        assert_eq!(settings.final_time, 2.5);
        assert_eq!(settings.time_step, 0.01);
        assert_eq!(settings.method, Method::Hope { rho: 0.5 });
        assert_eq!(settings.max_iterations, Simulation::default().max_iterations);
    }

    #[test]
    fn test_rejects_unknown_method() {
        assert!(parse_settings("[method]\ntype = \"leapfrog\"\n").is_err());
    }

    #[test]
    fn test_describe_type() {
        let text = describe_type("rod").unwrap();
        assert!(text.starts_with("Rod ("));
        assert!(text.contains("anchors: 2"));
        assert!(describe_type("warp drive").is_err());
    }

    #[test]
    fn test_export_arguments() {
        let cli = Cli::try_parse_from([
            "mbdeck", "export", "model.json", "--scene", "scene.json", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Export {
                model,
                output,
                config,
                ..
            } => {
                assert_eq!(model, PathBuf::from("model.json"));
                assert!(output.is_none());
                assert!(config.is_none());
            }
            _ => panic!("expected export"),
        }
    }
}

use std::path::PathBuf;

use anyhow::Context;
use arvis_assets::AssetStore;
use arvis_common::{AnchorId, Size2};
use arvis_nodes::{
    AnchorSession, NodeConfig, PlaneRecord, RectangleNode, RectangleRecord, TrackingEvent,
};
use arvis_render::{DebugTextRenderer, RenderView, Renderer};
use arvis_scene::Scene;
use clap::{Parser, Subcommand};
use glam::{Vec2, Vec3};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arvis-cli", about = "Build and inspect AR visualization nodes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML node config (tile span, dimension policy, ...)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSON texture registry; the built-in grid texture is used if omitted
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Build a surface node for one plane and print it
    Surface {
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        center_x: f32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        center_z: f32,
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        width: f32,
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        depth: f32,
    },
    /// Build a rectangle node and print it
    Rectangle {
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        x: f32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        y: f32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        z: f32,
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        width: f32,
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        height: f32,
        /// Radians about the vertical axis
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        orientation: f32,
    },
    /// Apply a JSON array of tracking events and print the resulting scene
    Replay {
        /// Path to the session file
        session: PathBuf,
        /// Print the scene after every event instead of only at the end
        #[arg(long)]
        each: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => NodeConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => NodeConfig::default(),
    };
    let assets = match &cli.assets {
        Some(path) => AssetStore::load(path)
            .with_context(|| format!("loading assets {}", path.display()))?,
        None => AssetStore::with_defaults(),
    };
    let renderer = DebugTextRenderer::new();
    let view = RenderView::default();

    match cli.command {
        Commands::Info => {
            println!("arvis-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("nodes: {}", arvis_nodes::crate_info());
            println!("render: {}", arvis_render::crate_info());
            println!(
                "grid: {} tiles/m (tile span {} m)",
                config.tiles_per_meter(),
                config.tile_span_meters
            );
            println!("textures: {}", assets.len());
        }
        Commands::Surface {
            center_x,
            center_z,
            width,
            depth,
        } => {
            let plane = PlaneRecord::new(
                AnchorId::new(),
                Vec2::new(center_x, center_z),
                Vec2::new(width, depth),
            );
            let mut session = AnchorSession::new(config, &assets)?;
            session.apply(&TrackingEvent::PlaneAdded { plane })?;
            print!("{}", renderer.render(session.scene(), &view));
        }
        Commands::Rectangle {
            x,
            y,
            z,
            width,
            height,
            orientation,
        } => {
            let record =
                RectangleRecord::new(Vec3::new(x, y, z), Size2::new(width, height), orientation);
            let node = RectangleNode::new(&record, &config)?;
            let mut scene = Scene::new();
            scene.attach(node.into_node());
            print!("{}", renderer.render(&scene, &view));
        }
        Commands::Replay { session, each } => {
            let file = std::fs::File::open(&session)
                .with_context(|| format!("opening session {}", session.display()))?;
            let events: Vec<TrackingEvent> = serde_json::from_reader(file)
                .with_context(|| format!("parsing session {}", session.display()))?;
            tracing::info!(events = events.len(), "replaying session");

            let mut state = AnchorSession::new(config, &assets)?;
            for (i, event) in events.iter().enumerate() {
                state
                    .apply(event)
                    .with_context(|| format!("event #{i} failed"))?;
                if each {
                    println!("--- after event #{i} ---");
                    print!("{}", renderer.render(state.scene(), &view));
                }
            }
            if !each {
                print!("{}", renderer.render(state.scene(), &view));
            }
            println!("Scene hash: {:#x}", state.scene().state_hash());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvis_nodes::NodeError;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_coordinates_parse() {
        let cli = Cli::try_parse_from([
            "arvis-cli",
            "rectangle",
            "--x",
            "-0.5",
            "--orientation",
            "-1.2",
        ])
        .unwrap();
        match cli.command {
            Commands::Rectangle { x, orientation, .. } => {
                assert_eq!(x, -0.5);
                assert_eq!(orientation, -1.2);
            }
            _ => panic!("expected rectangle command"),
        }
    }

    #[test]
    fn negative_dimensions_reach_node_validation() {
        let cli =
            Cli::try_parse_from(["arvis-cli", "surface", "--width", "-1", "--depth", "2"]).unwrap();
        let Commands::Surface { width, depth, .. } = cli.command else {
            panic!("expected surface command");
        };
        assert_eq!(width, -1.0);
        let plane = PlaneRecord::new(AnchorId::new(), Vec2::ZERO, Vec2::new(width, depth));
        let mut session =
            AnchorSession::new(NodeConfig::default(), &AssetStore::with_defaults()).unwrap();
        assert!(matches!(
            session.apply(&TrackingEvent::PlaneAdded { plane }),
            Err(NodeError::ConstraintViolation { what: "extent.x", value }) if value == -1.0
        ));

        let cli = Cli::try_parse_from(["arvis-cli", "rectangle", "--height", "-2"]).unwrap();
        let Commands::Rectangle { width, height, .. } = cli.command else {
            panic!("expected rectangle command");
        };
        assert_eq!(height, -2.0);
        let record = RectangleRecord::new(Vec3::ZERO, Size2::new(width, height), 0.0);
        assert!(matches!(
            RectangleNode::new(&record, &NodeConfig::default()),
            Err(NodeError::ConstraintViolation { what: "size.height", value }) if value == -2.0
        ));
    }

    #[test]
    fn demo_session_parses() {
        let text = include_str!("../demos/session.json");
        let events: Vec<TrackingEvent> = serde_json::from_str(text).unwrap();
        let mut session = AnchorSession::new(NodeConfig::default(), &AssetStore::with_defaults()).unwrap();
        session.apply_all(&events).unwrap();
        assert_eq!(session.surface_count(), 1);
        assert!(session.rectangle().is_some());
    }

    #[test]
    fn demo_config_parses() {
        let config = NodeConfig::from_yaml_str(include_str!("../demos/config.yaml")).unwrap();
        assert_eq!(config, NodeConfig::default());
    }
}

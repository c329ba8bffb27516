#![forbid(unsafe_code)]

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::{Level as TraceLevel, info};
use tracing_subscriber::FmtSubscriber;

use hotspots::check::check_scene;
use hotspots::config::Scene;
use hotspots::stage::HeadlessStage;
use hotspots::types::Millis;
use hotspots::widget::Widget;
use hotspots::{driver, trace};

#[derive(Debug, Parser)]
#[command(name = "hotspots", version, about = "Hover-selectable hotspot markers")]
struct Cli {
    /// trace, debug, info, warn or error (defaults to $LOG_LEVEL, then info)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay a timestamped pointer trace and print the resulting document
    Replay {
        /// Scene file (defaults to the user config dir)
        #[arg(long)]
        scene: Option<PathBuf>,
        /// Trace file: JSON array or JSON lines
        #[arg(long)]
        trace: PathBuf,
        /// Keep the clock running until this absolute trace time (ms)
        #[arg(long)]
        until: Option<Millis>,
    },
    /// Read pointer events from stdin as JSON lines, in real time
    Live {
        #[arg(long)]
        scene: Option<PathBuf>,
    },
    /// Validate a scene and print accepted points with their hit boxes
    Check {
        #[arg(long)]
        scene: Option<PathBuf>,
    },
}

fn parse_level(name: &str) -> TraceLevel {
    match name.to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    }
}

fn load_scene(path: Option<PathBuf>) -> Result<Scene> {
    let path = path.unwrap_or_else(Scene::default_path);
    if !path.exists() {
        bail!("Scene file {} not found (pass --scene)", path.display());
    }
    Scene::load(&path)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Parse log level from flag or environment variable
    let level_name = cli
        .log_level
        .clone()
        .or_else(|| std::env::var("LOG_LEVEL").ok())
        .unwrap_or_else(|| "info".to_string());

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&level_name))
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::Replay { scene, trace: trace_path, until } => {
            let scene = load_scene(scene)?;
            let events = trace::load_trace(&trace_path)?;
            info!(events = events.len(), "Replaying trace");
            let report = trace::replay(&scene, &events, until)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Live { scene } => {
            let scene = load_scene(scene)?;
            let mut widget = Widget::new(&scene.widget, HeadlessStage::from_document(&scene.document), 0);
            widget.on_select(|point| {
                info!(point = point.id, x = point.x, y = point.y, content = ?point.content_id, "Selected");
            });
            info!("Reading pointer events from stdin");
            let input = BufReader::new(tokio::io::stdin());
            let snapshot = driver::run_live(&mut widget, input, 0).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::Check { scene } => {
            let scene = load_scene(scene)?;
            for line in check_scene(&scene) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

mod config;
mod sim;

use clap::{Parser, Subcommand};
use glam::Vec3;
use roadstream_corridor::Corridor;
use roadstream_input::MoveInput;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::LevelConfig;
use crate::sim::Level;

#[derive(Parser)]
#[command(name = "roadstream-cli", about = "Headless driver for roadstream levels")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Drive a subject through a streamed level and report
    Simulate {
        /// Level config (.yaml, .yml or .json); defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "600")]
        ticks: u64,
        /// Seconds per tick
        #[arg(long, default_value = "0.016666668")]
        dt: f32,
        /// Forward input axis
        #[arg(long, default_value = "1.0", allow_hyphen_values = true)]
        forward: f32,
        /// Lateral input axis, positive to the right
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        drift: f32,
        /// Override the subject's move speed
        #[arg(long)]
        speed: Option<f32>,
        /// Override the scenery seed
        #[arg(long)]
        seed: Option<u64>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Evaluate the corridor queries at one lateral offset
    Corridor {
        /// Lateral position to test
        #[arg(allow_hyphen_values = true)]
        x: f32,
        /// Full road width
        #[arg(short, long, default_value = "5.0")]
        width: f32,
    },
    /// Print the default level config as YAML
    DumpConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("roadstream-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("stream: {}", roadstream_stream::crate_info());
            let corridor = Corridor::default();
            println!("corridor: default width {}", corridor.width());
        }
        Commands::Simulate {
            config,
            ticks,
            dt,
            forward,
            drift,
            speed,
            seed,
            json,
        } => {
            let mut level_config = match config {
                Some(path) => LevelConfig::load(&path)?,
                None => LevelConfig::default(),
            };
            if let Some(speed) = speed {
                level_config.mover.move_speed = speed;
            }
            if let Some(seed) = seed {
                level_config.scatter.seed = seed;
            }

            let mut level = Level::build(&level_config)?;
            let summary = level.run(ticks, dt, MoveInput::new(drift, forward));

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                let [x, y, z] = summary.subject_position;
                println!("Simulated {} ticks", summary.ticks);
                println!(
                    "Subject: ({x:.2}, {y:.2}, {z:.2}), inside road: {}, to boundary: {:.2}",
                    summary.subject_inside_road, summary.distance_to_boundary
                );
                println!("Segments: {:?}", summary.segment_positions);
                println!(
                    "Spawned: {}, evicted: {}",
                    summary.segments_spawned, summary.segments_evicted
                );
                println!(
                    "Tiles: constructed={}, active={}, pooled={}",
                    summary.tiles_constructed, summary.tiles_active, summary.tiles_pooled
                );
                println!(
                    "Scene: nodes={}, events={}",
                    summary.scene_nodes, summary.scene_events
                );
            }
        }
        Commands::Corridor { x, width } => {
            let corridor = Corridor::from_width(width);
            let p = Vec3::new(x, 0.0, 0.0);
            println!("half width: {}", corridor.half_width());
            println!("inside: {}", corridor.is_inside(p));
            println!("clamped x: {}", corridor.clamp(p).x);
            println!(
                "distance to boundary: {}",
                corridor.distance_to_nearest_boundary(p)
            );
            println!(
                "nearest boundary x: {}",
                corridor.nearest_boundary_point(p).x
            );
        }
        Commands::DumpConfig => {
            print!("{}", LevelConfig::default().to_yaml()?);
        }
    }

    Ok(())
}

//! Formation Analysis CLI
//!
//! Position feed CSV → defensive phase table with dominant formations

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "cli")]
use hb_core::{AggregationPolicy, DefenderSelection, Direction, StrategyKind};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "hb_cli")]
#[command(about = "Classify handball defensive formations from tracked positions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Settings shared by the commands that run the engine.
#[cfg(feature = "cli")]
#[derive(Args)]
struct EngineArgs {
    /// YAML config file (analysis settings and feed offsets)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Formation template table overriding the embedded one
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Classification strategy (zone-count, template-match)
    #[arg(long)]
    strategy: Option<StrategyKind>,

    /// Template-match defender subset with more than six on court (goal-side, best-fit)
    #[arg(long)]
    selection: Option<DefenderSelection>,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Segment a feed into phases and write the phase table
    Analyze {
        /// Input position feed CSV
        #[arg(long)]
        csv: PathBuf,

        /// Output phase table CSV (label counts go next to it)
        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,

        /// Phase aggregation policy (plurality, confidence)
        #[arg(long)]
        aggregation: Option<AggregationPolicy>,

        /// Minimum phase duration in frames
        #[arg(long)]
        min_duration: Option<u32>,

        /// Classify frames on a single thread
        #[arg(long, default_value = "false")]
        sequential: bool,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Validate and print the formation template table
    Templates {
        /// Template table to check instead of the embedded one
        #[arg(long)]
        templates: Option<PathBuf>,
    },

    /// Print the classification of a single frame
    Frame {
        /// Input position feed CSV
        #[arg(long)]
        csv: PathBuf,

        /// Frame number
        #[arg(long)]
        frame: u32,

        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[cfg(feature = "cli")]
impl EngineArgs {
    fn run_config(&self) -> Result<hb_cli::RunConfig> {
        let mut config = match &self.config {
            Some(path) => hb_cli::RunConfig::load(path)?,
            None => hb_cli::RunConfig::default(),
        };
        if let Some(strategy) = self.strategy {
            config.analysis.strategy = strategy;
        }
        if let Some(selection) = self.selection {
            config.analysis.defender_selection = selection;
        }
        Ok(config)
    }
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            csv,
            out,
            engine,
            aggregation,
            min_duration,
            sequential,
            metadata,
        } => {
            let mut config = engine.run_config()?;
            if let Some(aggregation) = aggregation {
                config.analysis.aggregation = aggregation;
            }
            if let Some(min_duration) = min_duration {
                config.analysis.min_phase_duration = min_duration;
            }
            if sequential {
                config.analysis.parallel = false;
            }
            let templates = hb_cli::load_templates(engine.templates.as_deref())?;

            println!("🔨 Analyzing position feed...");
            println!("   Input:       {}", csv.display());
            println!("   Output:      {}", out.display());
            println!("   Strategy:    {}", config.analysis.strategy);
            if config.analysis.strategy == StrategyKind::TemplateMatch {
                println!("   Selection:   {}", config.analysis.defender_selection);
            }
            println!("   Aggregation: {}", config.analysis.aggregation);
            println!("   Min phase:   {} frames", config.analysis.min_phase_duration);

            let meta = hb_cli::run_analysis(&csv, &out, &config, &templates)?;
            print_metadata(&meta);

            if let Some(metadata_path) = metadata {
                hb_cli::save_metadata(&metadata_path, &meta)?;
                println!("\n📄 Metadata saved to: {}", metadata_path.display());
            }
        }

        Commands::Templates { templates } => {
            let registry = hb_cli::load_templates(templates.as_deref())?;
            println!("✅ {} formations, {} templates", registry.labels().len(), registry.len());
            for label in registry.labels() {
                println!("\n{label}");
                for direction in Direction::ALL {
                    if let Some(template) = registry.get(label, direction) {
                        let points: Vec<String> =
                            template.points.iter().map(|(x, y)| format!("({x:.2}, {y:.2})")).collect();
                        println!("   {:<5} {}", direction.as_str(), points.join(" "));
                    }
                }
            }
        }

        Commands::Frame { csv, frame, engine } => {
            let config = engine.run_config()?;
            let templates = hb_cli::load_templates(engine.templates.as_deref())?;
            let classifications = hb_cli::classify_frame_at(&csv, frame, &config, &templates)?;

            if classifications.is_empty() {
                println!("Frame {frame}: no classification (fewer than six defenders or no data)");
            }
            for c in classifications {
                println!(
                    "Frame {}: {} {} (confidence {:.2})",
                    c.frame_num, c.direction, c.formation_label, c.confidence
                );
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(feature = "cli")]
fn print_metadata(meta: &hb_cli::RunMetadata) {
    let diag = &meta.diagnostics;
    println!("\n✅ Analysis complete!");
    println!("   Observations:    {} ({} duplicates dropped)", diag.observations, diag.duplicate_observations);
    println!("   Frames:          {} ({} classified)", diag.frames_seen, diag.frames_classified);
    println!("   Skipped frames:  {}", diag.insufficient_defender_frames);
    println!("   Phases:          {} raw, {} merged", diag.raw_phases, diag.merged_phases);
    println!("   Rows written:    {}", meta.rows_written);
    println!("   Checksum:        {}", meta.input_checksum);
    println!("   Created:         {}", meta.created_at);
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("hb_cli is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}

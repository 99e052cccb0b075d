use crate::config::ConfigOverrides;
use crate::processors::DistanceStrategy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "noise-atlas")]
#[command(about = "Map NYC 311 ice cream truck noise complaints against neighborhoods and parks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Configuration file [default: noise-atlas.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full analysis and write GeoJSON and charts
    Run {
        #[arg(long, help = "Complaint CSV (path or URL)")]
        complaints: Option<String>,

        #[arg(long, help = "NTA boundary GeoJSON (path or URL)")]
        neighborhoods: Option<String>,

        #[arg(long, help = "NTA population CSV (path or URL)")]
        population: Option<String>,

        #[arg(long, help = "Parks GeoJSON (path or URL)")]
        parks: Option<String>,

        #[arg(short, long, help = "Output directory [default: output]")]
        output_dir: Option<PathBuf>,

        #[arg(long, help = "Complaint descriptor to keep")]
        descriptor: Option<String>,

        #[arg(long, help = "Population census year")]
        year: Option<i32>,

        #[arg(long, value_enum, help = "Nearest-park search strategy")]
        strategy: Option<DistanceStrategy>,

        #[arg(long, default_value = "false", help = "Skip SVG chart rendering")]
        no_charts: bool,
    },

    /// Check park geometries and report what would be repaired
    ValidateParks {
        #[arg(long, help = "Parks GeoJSON (path or URL)")]
        parks: Option<String>,
    },

    /// Summarize an exported NTA GeoJSON file
    Info {
        #[arg(short, long)]
        file: PathBuf,
    },
}

impl Commands {
    /// Command line values that override the loaded configuration
    pub fn overrides(&self) -> ConfigOverrides {
        match self {
            Commands::Run {
                complaints,
                neighborhoods,
                population,
                parks,
                output_dir,
                descriptor,
                year,
                strategy,
                no_charts,
            } => ConfigOverrides {
                complaints: complaints.clone(),
                neighborhoods: neighborhoods.clone(),
                population: population.clone(),
                parks: parks.clone(),
                output_dir: output_dir.clone(),
                descriptor: descriptor.clone(),
                population_year: *year,
                strategy: *strategy,
                no_charts: *no_charts,
            },
            Commands::ValidateParks { parks } => ConfigOverrides {
                parks: parks.clone(),
                ..Default::default()
            },
            Commands::Info { .. } => ConfigOverrides::default(),
        }
    }
}

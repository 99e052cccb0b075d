use crate::analyzers::AtlasAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::cli::logging::init_logging;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::processors::{AnalysisPipeline, ParkRepairer};
use crate::utils::progress::ProgressReporter;
use tracing::info;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match &cli.command {
        Commands::Run { .. } => {
            let config = PipelineConfig::load(cli.config.as_deref())?
                .with_overrides(cli.command.overrides())?;

            println!("Analysing ice cream truck complaints...");
            println!("Complaints: {}", config.complaints);
            println!("Neighborhoods: {}", config.neighborhoods);
            println!("Population: {} ({})", config.population, config.population_year);
            println!("Parks: {}", config.parks);
            println!("Output directory: {}", config.output_dir.display());

            let progress = ProgressReporter::new_spinner("Starting pipeline...", false);
            let pipeline = AnalysisPipeline::new(config);

            let output = pipeline.run(&progress).await?;
            progress.set_message("Writing outputs...");
            let written = pipeline.export(&output)?;
            progress.finish_with_message(&format!(
                "Analysed {} complaints across {} NTAs",
                output.complaints.len(),
                output.neighborhoods.len()
            ));

            println!("\n{}", output.summary());

            let stats = AtlasAnalyzer::new().analyze(&output.neighborhoods);
            println!("\n{}", stats.detailed_summary());

            println!("\nFiles written:");
            for path in &written {
                println!("- {}", path.display());
            }
            println!("Analysis complete!");
        }

        Commands::ValidateParks { .. } => {
            let config = PipelineConfig::load(cli.config.as_deref())?
                .with_overrides(cli.command.overrides())?;

            println!("Validating park geometries...");
            println!("Parks: {}", config.parks);

            let progress = ProgressReporter::new_spinner("Checking parks...", false);
            let pipeline = AnalysisPipeline::new(config);
            let (parks, report) = pipeline.prepare_parks().await?;
            progress.finish_with_message("Validation complete");

            println!("\n{}", report.summary());

            let remaining = ParkRepairer::new().check(&parks);
            if report.invalid.is_empty() {
                println!("✅ All {} park geometries are valid", parks.len());
            } else if remaining.is_empty() {
                println!(
                    "⚠️  {} invalid geometries, all repairable",
                    report.invalid.len()
                );
            } else {
                println!(
                    "⚠️  {} invalid geometries, {} still invalid after repair",
                    report.invalid.len(),
                    remaining.len()
                );
            }
        }

        Commands::Info { file } => {
            println!("Analysing NTA export: {}", file.display());
            info!(path = %file.display(), "Summarizing export");

            let stats = AtlasAnalyzer::new().analyze_geojson(file)?;
            println!("\n{}", stats.detailed_summary());
        }
    }

    Ok(())
}

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{Complaint, Layer, NeighborhoodStats, Park};
use crate::processors::complaint_filter::{ComplaintFilter, FilterReport};
use crate::processors::geometry_repair::{filter_categories, ParkRepairer, RepairReport};
use crate::processors::proximity::{
    attach_mean_distances, mean_distance_by_neighborhood, ProximityAnalyzer,
};
use crate::processors::spatial_join::SpatialJoiner;
use crate::readers::{
    population_for_year, BoundaryReader, ComplaintReader, DataSource, ParkReader,
    PopulationReader,
};
use crate::utils::constants::*;
use crate::utils::progress::ProgressReporter;
use crate::writers::{ChartWriter, GeoJsonWriter};
use std::path::PathBuf;
use tracing::info;

/// Everything a finished run produced, before it is written out
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Retained complaints in WGS84
    pub complaints: Layer<Complaint>,
    /// Metres to the nearest park, aligned with `complaints`
    pub distances: Vec<Option<f64>>,
    /// NTA code per complaint, aligned with `complaints`
    pub assignments: Vec<Option<String>>,
    pub neighborhoods: Vec<NeighborhoodStats>,
    /// Filtered and repaired parks in WGS84
    pub parks: Layer<Park>,
    pub filter_report: FilterReport,
    pub repair_report: RepairReport,
}

impl PipelineOutput {
    pub fn summary(&self) -> String {
        let matched = self.assignments.iter().filter(|a| a.is_some()).count();
        let with_distance = self.distances.iter().filter(|d| d.is_some()).count();

        format!(
            "{}\n\n{}\n\nSpatial Join:\n\
            - Complaints inside an NTA: {}\n\
            - Dropped (boundary or outside): {}\n\
            - NTA polygons: {}\n\
            - Complaints with a park distance: {}",
            self.filter_report.summary(),
            self.repair_report.summary(),
            matched,
            self.assignments.len() - matched,
            self.neighborhoods.len(),
            with_distance
        )
    }
}

pub struct AnalysisPipeline {
    config: PipelineConfig,
}

impl AnalysisPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage in order; any hard failure aborts the run
    pub async fn run(&self, progress: &ProgressReporter) -> Result<PipelineOutput> {
        progress.set_message("Loading complaints...");
        let table = ComplaintReader::new()
            .read_str(&self.fetch(&self.config.complaints).await?)?;

        let filter = ComplaintFilter::with_descriptor(&self.config.descriptor);
        let (complaints, filter_report) = filter.filter(table);

        progress.set_message("Loading NTA boundaries...");
        let neighborhoods = BoundaryReader::with_code_property(&self.config.nta_code_property)
            .read_str(&self.fetch(&self.config.neighborhoods).await?)?;

        progress.set_message("Loading population...");
        let population_rows =
            PopulationReader::new().read_str(&self.fetch(&self.config.population).await?)?;
        let population = population_for_year(&population_rows, self.config.population_year);
        info!(
            year = self.config.population_year,
            neighborhoods = population.len(),
            "Selected population year"
        );

        progress.set_message("Joining complaints to NTAs...");
        let joiner = SpatialJoiner::new();
        let join = joiner.assign(&complaints, &neighborhoods)?;
        let summaries = joiner.summarize(&complaints, &join, &population);
        let mut stats = joiner.rejoin(&neighborhoods, &summaries)?;

        progress.set_message("Loading and repairing parks...");
        let (parks, repair_report) = self.prepare_parks().await?;

        progress.set_message("Measuring distances to parks...");
        let projection = self.config.projection();
        let local_complaints = complaints.to_local(&projection)?;
        let local_parks = parks.to_local(&projection)?;
        let distances = ProximityAnalyzer::new(self.config.strategy)
            .nearest_park_distances(&local_complaints, &local_parks)?;

        let means = mean_distance_by_neighborhood(&join.assignments, &distances);
        attach_mean_distances(&mut stats, &means);

        Ok(PipelineOutput {
            complaints,
            distances,
            assignments: join.assignments,
            neighborhoods: stats,
            parks,
            filter_report,
            repair_report,
        })
    }

    /// Load the parks layer, keep the configured categories and repair it
    pub async fn prepare_parks(&self) -> Result<(Layer<Park>, RepairReport)> {
        let parks = ParkReader::with_category_property(&self.config.park_category_property)
            .read_str(&self.fetch(&self.config.parks).await?)?;
        let parks = filter_categories(parks, &self.config.park_categories);

        Ok(ParkRepairer::new().repair(parks))
    }

    /// Write the GeoJSON exports and, unless disabled, the charts.
    ///
    /// Returns the paths written, in write order.
    pub fn export(&self, output: &PipelineOutput) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.config.output_dir)?;
        let mut written = Vec::new();

        let geojson = GeoJsonWriter::new();
        let path = self.config.output_path(COMPLAINTS_EXPORT);
        geojson.write_complaints(&output.complaints, &output.distances, &path)?;
        written.push(path);

        let path = self.config.output_path(NEIGHBORHOODS_EXPORT);
        geojson.write_neighborhoods(&output.neighborhoods, &path)?;
        written.push(path);

        let path = self.config.output_path(PARKS_EXPORT);
        geojson.write_parks(&output.parks, &path)?;
        written.push(path);

        if self.config.render_charts {
            let charts = ChartWriter::new().with_bins(self.config.histogram_bins);

            let path = self.config.output_path(CHOROPLETH_CHART);
            charts.choropleth(&output.neighborhoods, &path)?;
            written.push(path);

            let path = self.config.output_path(HISTOGRAM_CHART);
            charts.distance_histogram(&output.distances, &path)?;
            written.push(path);

            let path = self.config.output_path(SCATTER_CHART);
            charts.distance_vs_complaints(&output.neighborhoods, &path)?;
            written.push(path);

            let path = self.config.output_path(OVERLAY_CHART);
            charts.parks_overlay(&output.parks, &output.complaints, &path)?;
            written.push(path);
        }

        info!(files = written.len(), dir = %self.config.output_dir.display(), "Exported results");
        Ok(written)
    }

    async fn fetch(&self, location: &str) -> Result<String> {
        let source = DataSource::parse(location);
        info!(source = %source, "Reading input");
        source.read_to_string().await
    }
}

pub mod chart_writer;
pub mod geojson_writer;

pub use chart_writer::ChartWriter;
pub use geojson_writer::GeoJsonWriter;

pub mod boundary_reader;
pub mod complaint_reader;
pub mod geojson_support;
pub mod park_reader;
pub mod population_reader;
pub mod source;

pub use boundary_reader::BoundaryReader;
pub use complaint_reader::{parse_created_date, ComplaintReader, ComplaintTable};
pub use park_reader::ParkReader;
pub use population_reader::{population_for_year, PopulationReader};
pub use source::DataSource;

pub mod columns;
pub mod constants;
pub mod coordinates;
pub mod progress;

pub use columns::normalize_column_name;
pub use constants::*;
pub use coordinates::{parse_coordinate, LocalProjection};
pub use progress::ProgressReporter;

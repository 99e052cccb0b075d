pub mod complaint_filter;
pub mod geometry_repair;
pub mod pipeline;
pub mod proximity;
pub mod spatial_join;

pub use complaint_filter::{ComplaintFilter, FilterReport};
pub use geometry_repair::{filter_categories, InvalidGeometry, ParkRepairer, RepairReport};
pub use pipeline::{AnalysisPipeline, PipelineOutput};
pub use proximity::{mean_distance_by_neighborhood, DistanceStrategy, ProximityAnalyzer};
pub use spatial_join::{JoinResult, NeighborhoodIndex, SpatialJoiner};

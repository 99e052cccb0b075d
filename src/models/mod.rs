pub mod complaint;
pub mod layer;
pub mod neighborhood;
pub mod park;
pub mod population;

pub use complaint::{Complaint, ComplaintRecord};
pub use layer::{Crs, Layer, Reproject};
pub use neighborhood::{per_capita_rate, Neighborhood, NeighborhoodStats, NeighborhoodSummary};
pub use park::Park;
pub use population::PopulationRecord;

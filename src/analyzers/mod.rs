pub mod atlas_analyzer;

pub use atlas_analyzer::{AtlasAnalyzer, AtlasStatistics};

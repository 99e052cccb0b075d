/// Complaint descriptor analysed by default
pub const ICE_CREAM_TRUCK_DESCRIPTOR: &str = "Noise, Ice Cream Truck (NR4)";

/// 311 export timestamp format, e.g. `07/04/2019 03:15:22 PM`
pub const CREATED_DATE_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";
/// Fallback used by the Socrata JSON/CSV API
pub const CREATED_DATE_ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Remote datasets (NYC Open Data)
pub const NTA_BOUNDARIES_URL: &str =
    "https://data.cityofnewyork.us/api/geospatial/cpf4-rkhq?method=export&format=GeoJSON";
pub const NTA_POPULATION_URL: &str =
    "https://data.cityofnewyork.us/api/views/swpk-hqdp/rows.csv?accessType=DOWNLOAD";

/// Local input defaults
pub const COMPLAINTS_FILE: &str = "data/311_ice_cream_trucks.csv";
pub const PARKS_FILE: &str = "data/parks.geojson";
pub const CONFIG_FILE: &str = "noise-atlas.toml";
pub const ENV_PREFIX: &str = "NOISE_ATLAS";

/// Feature property names
pub const NTA_CODE_PROPERTY: &str = "ntacode";
pub const NTA_NAME_PROPERTY: &str = "ntaname";
pub const NTA_BOROUGH_PROPERTY: &str = "boro_name";
pub const PARK_CATEGORY_PROPERTY: &str = "landuse";
pub const PARK_NAME_PROPERTIES: [&str; 2] = ["name311", "signname"];

/// Census year used for per-capita normalization
pub const DEFAULT_POPULATION_YEAR: i32 = 2010;

/// Per-capita rates are expressed per this many residents
pub const RATE_SCALE: f64 = 1000.0;

/// Park categories kept for the proximity analysis
pub const DEFAULT_PARK_CATEGORIES: [&str; 7] = [
    "Community Park",
    "Flagship Park",
    "Neighborhood Park",
    "Playground",
    "Jointly Operated Playground",
    "Recreation Field/Courts",
    "Nature Area",
];

/// Origin of the local metric projection (lower Manhattan)
pub const PROJECTION_ORIGIN_LON: f64 = -74.0060;
pub const PROJECTION_ORIGIN_LAT: f64 = 40.7128;
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Output file names
pub const OUTPUT_DIR: &str = "output";
pub const COMPLAINTS_EXPORT: &str = "ice_cream_complaints.geojson";
pub const NEIGHBORHOODS_EXPORT: &str = "nta_complaints.geojson";
pub const PARKS_EXPORT: &str = "parks_repaired.geojson";
pub const CHOROPLETH_CHART: &str = "choropleth.svg";
pub const HISTOGRAM_CHART: &str = "distance_histogram.svg";
pub const SCATTER_CHART: &str = "distance_vs_complaints.svg";
pub const OVERLAY_CHART: &str = "parks_overlay.svg";

/// Chart defaults
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;
pub const CHART_SIZE: (u32, u32) = (1200, 1200);
pub const PLOT_SIZE: (u32, u32) = (1000, 700);

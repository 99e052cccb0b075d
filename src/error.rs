use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote source {url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Chart rendering error: {0}")]
    Plot(String),

    #[error("CRS mismatch: {left} vs {right}")]
    CrsMismatch { left: String, right: String },

    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Missing required data: {0}")]
    MissingData(String),
}

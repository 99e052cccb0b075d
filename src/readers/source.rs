use crate::error::{AnalysisError, Result};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("noise-atlas/", env!("CARGO_PKG_VERSION"));

/// Where an input dataset lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Local(PathBuf),
    Remote(String),
}

impl DataSource {
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DataSource::Remote(trimmed.to_string())
        } else {
            DataSource::Local(PathBuf::from(trimmed))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, DataSource::Remote(_))
    }

    /// Load the whole dataset as text.
    ///
    /// Remote fetches are a single request with no retry; any failure ends
    /// the run.
    pub async fn read_to_string(&self) -> Result<String> {
        let bytes = match self {
            DataSource::Local(path) => {
                debug!(path = %path.display(), "Reading local dataset");
                std::fs::read(path)?
            }
            DataSource::Remote(url) => fetch(url).await?,
        };

        Ok(decode_utf8(&bytes))
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Local(path) => write!(f, "{}", path.display()),
            DataSource::Remote(url) => write!(f, "{}", url),
        }
    }
}

async fn fetch(url: &str) -> Result<Vec<u8>> {
    info!(url, "Fetching remote dataset");

    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(AnalysisError::HttpStatus {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let body = response.bytes().await?;
    debug!(url, bytes = body.len(), "Fetched remote dataset");
    Ok(body.to_vec())
}

/// Decode as UTF-8, dropping a leading BOM and replacing invalid sequences
pub fn decode_utf8(bytes: &[u8]) -> String {
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
    if had_errors {
        debug!("Replaced invalid UTF-8 sequences while decoding dataset");
    }
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_source() {
        assert_eq!(
            DataSource::parse("https://data.cityofnewyork.us/api/views/swpk-hqdp/rows.csv"),
            DataSource::Remote("https://data.cityofnewyork.us/api/views/swpk-hqdp/rows.csv".to_string())
        );
        assert_eq!(
            DataSource::parse("data/parks.geojson"),
            DataSource::Local(PathBuf::from("data/parks.geojson"))
        );
        assert!(!DataSource::parse("./http_dump.csv").is_remote());
    }

    #[test]
    fn test_decode_strips_bom() {
        let bytes = b"\xEF\xBB\xBFNTA Code,Population";
        assert_eq!(decode_utf8(bytes), "NTA Code,Population");
    }

    #[tokio::test]
    async fn test_read_local_source() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, "Year,NTA Code,Population\n2010,MN12,5000\n")?;

        let text = DataSource::Local(file.path().to_path_buf())
            .read_to_string()
            .await?;
        assert!(text.starts_with("Year,NTA Code"));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_local_source_is_io_error() {
        let result = DataSource::parse("/no/such/dir/complaints.csv")
            .read_to_string()
            .await;
        assert!(matches!(result, Err(AnalysisError::Io(_))));
    }
}

use csv::StringRecord;

/// Normalize a column header to `snake_case`
///
/// # Examples
/// ```
/// use noise_atlas::utils::normalize_column_name;
///
/// assert_eq!(normalize_column_name(" Created Date "), "created_date");
/// assert_eq!(normalize_column_name("NTA Code"), "nta_code");
/// ```
pub fn normalize_column_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut pending_separator = false;

    for ch in name.trim().trim_start_matches('\u{feff}').chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !normalized.is_empty() {
                normalized.push('_');
            }
            pending_separator = false;
            normalized.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    normalized
}

/// Normalize every header of a CSV header record
pub fn normalize_headers(headers: &StringRecord) -> StringRecord {
    headers.iter().map(normalize_column_name).collect()
}

/// Parse an optional numeric cell; blanks and garbage become `None`
pub fn parse_optional<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("Unique Key"), "unique_key");
        assert_eq!(normalize_column_name("Community Board"), "community_board");
        assert_eq!(normalize_column_name("Location (Lat/Long)"), "location_lat_long");
        assert_eq!(normalize_column_name("\u{feff}Borough"), "borough");
        assert_eq!(normalize_column_name("population"), "population");
        assert_eq!(normalize_column_name("  "), "");
    }

    #[test]
    fn test_normalize_headers() {
        let headers = StringRecord::from(vec!["Created Date", "Descriptor", "Longitude"]);
        let normalized = normalize_headers(&headers);
        assert_eq!(
            normalized.iter().collect::<Vec<_>>(),
            vec!["created_date", "descriptor", "longitude"]
        );
    }

    #[test]
    fn test_parse_optional() {
        assert_eq!(parse_optional::<f64>(Some(" 40.75 ")), Some(40.75));
        assert_eq!(parse_optional::<f64>(Some("")), None);
        assert_eq!(parse_optional::<f64>(Some("n/a")), None);
        assert_eq!(parse_optional::<u64>(None), None);
        assert_eq!(parse_optional::<u64>(Some("5000")), Some(5000));
    }
}

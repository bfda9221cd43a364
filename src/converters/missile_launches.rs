//! Convert rows of the NTI missile test database into launch records
//!
//! Expected layout: one launch per row, columns A through O. The date is in B
//! and the UTC time in D. The launch site is in I/K/L, the landing site in M
//! and the distance travelled in O.
use tracing::debug;

use super::serial_date::{parse_day_fraction, parse_serial_date};
use crate::error::{Error, ParseError, Result};

/// Marker the source uses for values that were never recorded.
pub const UNKNOWN: &str = "Unknown";

/// Columns A through O.
pub const REQUIRED_COLUMNS: usize = 15;

const DATE_COL: usize = 1; // B
const TIME_COL: usize = 3; // D
const CITY_COL: usize = 8; // I
const LAT_COL: usize = 10; // K
const LON_COL: usize = 11; // L
const DESTINATION_COL: usize = 12; // M
const DISTANCE_COL: usize = 14; // O

const LAT_WIDTH: usize = 5;
const LON_WIDTH: usize = 6;
const DISTANCE_SUFFIX_LEN: usize = 3;

/// Column headers, in the order `Record::to_columns` yields the fields.
pub const HEADERS: [&str; 5] = [
    "Date and time (UTC)",
    "Starting location",
    "Starting coordinates",
    "Landing location",
    "Distance (km)",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// 0-based index of the first data row.
    pub start_row: usize,
    /// 0-based index one past the last data row, if bounded.
    pub end_row: Option<usize>,
    /// Drop rows with any unknown field.
    pub strict: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            start_row: 148,
            end_row: None,
            strict: true,
        }
    }
}

/// One launch, normalized for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    timestamp: String,
    origin_city: String,
    origin_coordinates: String,
    destination: String,
    distance_km: String,
}

impl Record {
    pub(crate) fn from_columns(
        timestamp: String,
        origin_city: String,
        origin_coordinates: String,
        destination: String,
        distance_km: String,
    ) -> Self {
        Self {
            timestamp,
            origin_city,
            origin_coordinates,
            destination,
            distance_km,
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn origin_city(&self) -> &str {
        &self.origin_city
    }

    pub fn origin_coordinates(&self) -> &str {
        &self.origin_coordinates
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn distance_km(&self) -> &str {
        &self.distance_km
    }

    pub fn to_columns(&self) -> [&str; 5] {
        [
            &self.timestamp,
            &self.origin_city,
            &self.origin_coordinates,
            &self.destination,
            &self.distance_km,
        ]
    }
}

/// The seven source fields of a row. `None` stands for "Unknown".
#[derive(Debug)]
struct LaunchFields {
    date: Option<String>,
    time: Option<String>,
    origin_city: Option<String>,
    origin_lat: Option<String>,
    origin_lon: Option<String>,
    destination: Option<String>,
    distance: Option<String>,
}

impl LaunchFields {
    fn read(row: &[String]) -> Self {
        Self {
            date: known(&row[DATE_COL]).and_then(|cell| convert_cell(cell, parse_serial_date)),
            time: known(&row[TIME_COL]).and_then(|cell| convert_cell(cell, parse_day_fraction)),
            origin_city: known(&row[CITY_COL].replace('\'', "")).map(str::to_string),
            origin_lat: known(&row[LAT_COL]).map(str::to_string),
            origin_lon: known(&row[LON_COL]).map(str::to_string),
            destination: known(&row[DESTINATION_COL]).map(str::to_string),
            distance: known(&row[DISTANCE_COL]).and_then(strip_distance_suffix),
        }
    }

    fn is_complete(&self) -> bool {
        self.date.is_some()
            && self.time.is_some()
            && self.origin_city.is_some()
            && self.origin_lat.is_some()
            && self.origin_lon.is_some()
            && self.destination.is_some()
            && self.distance.is_some()
    }

    fn into_record(self) -> Record {
        let coordinates = format!(
            "{}, {}",
            self.origin_lat
                .as_deref()
                .map_or(UNKNOWN.to_string(), |lat| truncate_chars(lat, LAT_WIDTH)),
            self.origin_lon
                .as_deref()
                .map_or(UNKNOWN.to_string(), |lon| truncate_chars(lon, LON_WIDTH)),
        );

        Record {
            timestamp: format!("{} {}", or_unknown(self.date), or_unknown(self.time)),
            origin_city: or_unknown(self.origin_city),
            origin_coordinates: coordinates,
            destination: or_unknown(self.destination),
            distance_km: or_unknown(self.distance),
        }
    }
}

/// Extract launch records from worksheet rows.
///
/// Cells that fail to convert only drop their own row. A row that is too
/// short for the fixed layout aborts the whole run.
pub fn extract(rows: &[Vec<String>], config: &ExtractConfig) -> Result<Vec<Record>> {
    let end = config.end_row.unwrap_or(rows.len()).min(rows.len());
    let mut records = Vec::new();

    for (row_idx, row) in rows.iter().enumerate().take(end).skip(config.start_row) {
        if row.len() < REQUIRED_COLUMNS {
            return Err(Error::Extraction {
                row: row_idx,
                found: row.len(),
                expected: REQUIRED_COLUMNS,
            });
        }

        let fields = LaunchFields::read(row);
        if config.strict && !fields.is_complete() {
            debug!(row = row_idx, ?fields, "skipping incomplete row");
            continue;
        }
        records.push(fields.into_record());
    }

    Ok(records)
}

/// Cell text, or `None` when the cell is blank or marked unknown.
fn known(cell: &str) -> Option<&str> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed == UNKNOWN {
        None
    } else {
        Some(cell)
    }
}

fn convert_cell(
    cell: &str,
    convert: fn(&str) -> std::result::Result<String, ParseError>,
) -> Option<String> {
    match convert(cell) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "treating cell as unknown");
            None
        }
    }
}

/// Drop the fixed three character unit suffix from a distance cell.
fn strip_distance_suffix(cell: &str) -> Option<String> {
    let len = cell.chars().count();
    if len < DISTANCE_SUFFIX_LEN {
        return None;
    }
    Some(cell.chars().take(len - DISTANCE_SUFFIX_LEN).collect())
}

fn truncate_chars(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

fn or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| UNKNOWN.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launch_row(
        date: &str,
        time: &str,
        city: &str,
        lat: &str,
        lon: &str,
        destination: &str,
        distance: &str,
    ) -> Vec<String> {
        let mut row = vec![String::new(); REQUIRED_COLUMNS];
        row[0] = "1".to_string();
        row[DATE_COL] = date.to_string();
        row[2] = "Kim Jong Un".to_string();
        row[TIME_COL] = time.to_string();
        row[CITY_COL] = city.to_string();
        row[LAT_COL] = lat.to_string();
        row[LON_COL] = lon.to_string();
        row[DESTINATION_COL] = destination.to_string();
        row[13] = "Success".to_string();
        row[DISTANCE_COL] = distance.to_string();
        row
    }

    fn valid_row() -> Vec<String> {
        launch_row(
            "366",
            "0.5",
            "O'Brien's",
            "37.12345",
            "-127.654321",
            "Sea of Japan",
            "1234 km",
        )
    }

    fn config_from(start_row: usize) -> ExtractConfig {
        ExtractConfig {
            start_row,
            ..ExtractConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = ExtractConfig::default();
        assert_eq!(config.start_row, 148);
        assert_eq!(config.end_row, None);
        assert!(config.strict);
    }

    #[test]
    fn test_valid_row_normalization() {
        let records = extract(&[valid_row()], &config_from(0)).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.timestamp(), "1901-01-01 12:00:00");
        assert_eq!(record.origin_city(), "OBriens");
        assert_eq!(record.origin_coordinates(), "37.12, -127.6");
        assert_eq!(record.destination(), "Sea of Japan");
        assert_eq!(record.distance_km(), "1234");
    }

    #[test]
    fn test_truncation_is_not_rounding() {
        let row = launch_row("366", "0.5", "Sinpo", "39.999", "127.999999", "Sea", "999 km");
        let records = extract(&[row], &config_from(0)).unwrap();

        assert_eq!(records[0].origin_coordinates(), "39.99, 127.99");
        assert_eq!(records[0].distance_km(), "999");
    }

    #[test]
    fn test_unknown_row_is_dropped() {
        let mut rows = vec![valid_row()];
        let mut bad = valid_row();
        bad[TIME_COL] = UNKNOWN.to_string();
        rows.push(bad);

        let records = extract(&rows, &config_from(0)).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp(), "1901-01-01 12:00:00");
    }

    #[test]
    fn test_any_unknown_field_drops_row() {
        for col in [
            DATE_COL,
            TIME_COL,
            CITY_COL,
            LAT_COL,
            LON_COL,
            DESTINATION_COL,
            DISTANCE_COL,
        ] {
            let mut row = valid_row();
            row[col] = UNKNOWN.to_string();
            let records = extract(&[row], &config_from(0)).unwrap();
            assert!(records.is_empty(), "column {} should reject the row", col);
        }
    }

    #[test]
    fn test_malformed_or_blank_cells_drop_row() {
        let mut not_a_date = valid_row();
        not_a_date[DATE_COL] = "March 3rd".to_string();
        let mut blank_city = valid_row();
        blank_city[CITY_COL] = String::new();
        let mut short_distance = valid_row();
        short_distance[DISTANCE_COL] = "km".to_string();

        let rows = vec![not_a_date, blank_city, short_distance, valid_row()];
        let records = extract(&rows, &config_from(0)).unwrap();

        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_quoted_unknown_city_drops_row() {
        let mut quoted = valid_row();
        quoted[CITY_COL] = "'Unknown'".to_string();
        let mut only_quotes = valid_row();
        only_quotes[CITY_COL] = "''".to_string();

        let records = extract(&[quoted, only_quotes], &config_from(0)).unwrap();

        assert!(records.is_empty());
    }

    #[test]
    fn test_rows_before_offset_are_skipped() {
        // A header row that would not survive extraction sits before the offset.
        let header: Vec<String> = (b'A'..=b'O').map(|c| (c as char).to_string()).collect();
        let mut second = valid_row();
        second[DESTINATION_COL] = "Pacific Ocean".to_string();
        let rows = vec![header, valid_row(), second];

        let records = extract(&rows, &config_from(2)).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].destination(), "Pacific Ocean");
    }

    #[test]
    fn test_end_row_bounds_window() {
        let rows = vec![valid_row(), valid_row(), valid_row(), valid_row()];
        let config = ExtractConfig {
            start_row: 1,
            end_row: Some(3),
            strict: true,
        };

        assert_eq!(extract(&rows, &config).unwrap().len(), 2);
    }

    #[test]
    fn test_offset_past_end_yields_nothing() {
        let records = extract(&[valid_row()], &ExtractConfig::default()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_output_keeps_source_order() {
        let mut rows = Vec::new();
        for distance in ["500 km", "9000 km", "100 km"] {
            let mut row = valid_row();
            row[DISTANCE_COL] = distance.to_string();
            rows.push(row);
        }

        let records = extract(&rows, &config_from(0)).unwrap();
        let distances: Vec<&str> = records.iter().map(Record::distance_km).collect();

        assert_eq!(distances, vec!["500", "9000", "100"]);
    }

    #[test]
    fn test_short_row_is_fatal() {
        let mut short = valid_row();
        short.truncate(REQUIRED_COLUMNS - 1);
        let rows = vec![valid_row(), short];

        let err = extract(&rows, &config_from(0)).unwrap_err();

        match err {
            Error::Extraction {
                row,
                found,
                expected,
            } => {
                assert_eq!(row, 1);
                assert_eq!(found, REQUIRED_COLUMNS - 1);
                assert_eq!(expected, REQUIRED_COLUMNS);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_short_row_before_offset_is_ignored() {
        let rows = vec![vec!["title".to_string()], valid_row()];
        assert_eq!(extract(&rows, &config_from(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_lenient_mode_keeps_every_row() {
        let mut bad = valid_row();
        bad[TIME_COL] = "late".to_string();
        bad[LAT_COL] = UNKNOWN.to_string();
        bad[DISTANCE_COL] = UNKNOWN.to_string();
        let config = ExtractConfig {
            start_row: 0,
            end_row: None,
            strict: false,
        };

        let records = extract(&[valid_row(), bad], &config).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].timestamp(), "1901-01-01 Unknown");
        assert_eq!(records[1].origin_coordinates(), "Unknown, -127.6");
        assert_eq!(records[1].distance_km(), "Unknown");
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let mut bad = valid_row();
        bad[DATE_COL] = UNKNOWN.to_string();
        let rows = vec![valid_row(), bad, valid_row()];
        let config = config_from(0);

        let first = extract(&rows, &config).unwrap();
        let second = extract(&rows, &config).unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_to_columns_order() {
        let records = extract(&[valid_row()], &config_from(0)).unwrap();
        assert_eq!(
            records[0].to_columns(),
            [
                "1901-01-01 12:00:00",
                "OBriens",
                "37.12, -127.6",
                "Sea of Japan",
                "1234"
            ]
        );
    }
}

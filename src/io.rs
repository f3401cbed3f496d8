//! Trajectory, parameter and report adapters.
//!
//! - waypoints: `;`-separated `timestamp;latitude;longitude` records, no header
//! - parameters: YAML with the keys below, or TOML for `.toml` files
//! - report: pretty-printed JSON
//!
//! ```yaml
//! earthRadiusKM: 6371.0
//! geofenceCenterLatitude: 45.0703
//! geofenceCenterLongitude: 7.6869
//! geofenceRadiusKm: 1.5
//! # optional
//! mostFrequentedAreaRadiusKm: 0.5
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::{Config, DataReport, Geofence, Waypoint, DEFAULT_EARTH_RADIUS_KM};

/// Errors raised while reading inputs or writing the report.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed waypoint file: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: expected timestamp;latitude;longitude, found {found} fields")]
    FieldCount { line: u64, found: usize },

    #[error("line {line}: invalid {field} {value:?}")]
    InvalidNumber {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("malformed parameters file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("malformed parameters file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write report: {0}")]
    Write(#[source] std::io::Error),
}

// =============================================================================
// Waypoints
// =============================================================================

/// Read a waypoint file from disk.
pub fn read_waypoints(path: impl AsRef<Path>) -> Result<Vec<Waypoint>, InputError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| InputError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let waypoints = parse_waypoints(file)?;
    debug!("[Input] {} waypoints from {}", waypoints.len(), path.display());
    Ok(waypoints)
}

/// Parse `timestamp;latitude;longitude` records.
///
/// Fields are trimmed, blank lines skipped and extra trailing fields ignored.
pub fn parse_waypoints<R: Read>(reader: R) -> Result<Vec<Waypoint>, InputError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut waypoints = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() < 3 {
            return Err(InputError::FieldCount {
                line,
                found: record.len(),
            });
        }

        let field = |i: usize, name: &'static str| -> Result<f64, InputError> {
            let raw = &record[i];
            raw.parse::<f64>().map_err(|_| InputError::InvalidNumber {
                line,
                field: name,
                value: raw.to_string(),
            })
        };

        waypoints.push(Waypoint::new(
            field(0, "timestamp")?,
            field(1, "latitude")?,
            field(2, "longitude")?,
        ));
    }

    Ok(waypoints)
}

// =============================================================================
// Parameters
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParametersFile {
    #[serde(rename = "earthRadiusKM", default = "default_earth_radius")]
    earth_radius_km: f64,
    geofence_center_latitude: f64,
    geofence_center_longitude: f64,
    geofence_radius_km: f64,
    #[serde(default)]
    most_frequented_area_radius_km: Option<f64>,
}

fn default_earth_radius() -> f64 {
    DEFAULT_EARTH_RADIUS_KM
}

/// Syntax of a parameters file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    #[default]
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// `.toml` files are TOML, everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Read and validate a parameters file from disk.
///
/// The format is picked from the file extension, see [`ConfigFormat::from_path`].
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, InputError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content, ConfigFormat::from_path(path))
}

/// Parse and validate parameters.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<Config, InputError> {
    let file: ParametersFile = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };
    let config = Config {
        earth_radius_km: file.earth_radius_km,
        geofence: Geofence::new(
            file.geofence_center_latitude,
            file.geofence_center_longitude,
            file.geofence_radius_km,
        ),
        most_frequented_area_radius_km: file.most_frequented_area_radius_km,
    };
    validate(&config)?;
    debug!("[Input] parameters {:?}", config);
    Ok(config)
}

fn validate(config: &Config) -> Result<(), InputError> {
    let invalid = |name, value| Err(InputError::InvalidParameter { name, value });

    if !(config.earth_radius_km.is_finite() && config.earth_radius_km > 0.0) {
        return invalid("earthRadiusKM", config.earth_radius_km);
    }
    if !config.geofence.center_lat.is_finite() {
        return invalid("geofenceCenterLatitude", config.geofence.center_lat);
    }
    if !config.geofence.center_lng.is_finite() {
        return invalid("geofenceCenterLongitude", config.geofence.center_lng);
    }
    if !(config.geofence.radius_km.is_finite() && config.geofence.radius_km >= 0.0) {
        return invalid("geofenceRadiusKm", config.geofence.radius_km);
    }
    if let Some(radius) = config.most_frequented_area_radius_km {
        if !(radius.is_finite() && radius > 0.0) {
            return invalid("mostFrequentedAreaRadiusKm", radius);
        }
    }
    Ok(())
}

// =============================================================================
// Report
// =============================================================================

/// Render the report as pretty-printed JSON.
pub fn report_to_json(report: &DataReport) -> Result<String, InputError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write the report as pretty-printed JSON followed by a newline.
pub fn write_report<W: Write>(mut writer: W, report: &DataReport) -> Result<(), InputError> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer).map_err(InputError::Write)?;
    writer.flush().map_err(InputError::Write)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_waypoints() {
        let input = "1700000000;45.0703;7.6869\n\
                     1700000060; 45.0710 ;7.6880\n\
                     \n\
                     1700000120;45.0720;7.6890;extra\n";
        let waypoints = parse_waypoints(input.as_bytes()).unwrap();
        assert_eq!(waypoints.len(), 3);
        assert_eq!(waypoints[1], Waypoint::new(1_700_000_060.0, 45.0710, 7.6880));
        assert_eq!(waypoints[2].longitude, 7.6890);
    }

    #[test]
    fn test_parse_waypoints_bad_number() {
        let input = "0;45.0;7.0\n1;north;7.0\n";
        match parse_waypoints(input.as_bytes()) {
            Err(InputError::InvalidNumber { line, field, value }) => {
                assert_eq!(line, 2);
                assert_eq!(field, "latitude");
                assert_eq!(value, "north");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_waypoints_missing_field() {
        let result = parse_waypoints("0;45.0\n".as_bytes());
        assert!(matches!(result, Err(InputError::FieldCount { found: 2, .. })));
    }

    #[test]
    fn test_parse_config_yaml() {
        let config = parse_config(
            "earthRadiusKM: 6371.0\n\
             geofenceCenterLatitude: 45.0703\n\
             geofenceCenterLongitude: 7.6869\n\
             geofenceRadiusKm: 1.5\n\
             mostFrequentedAreaRadiusKm: 0.5\n",
            ConfigFormat::Yaml,
        )
        .unwrap();
        assert_eq!(config.earth_radius_km, 6371.0);
        assert_eq!(config.geofence, Geofence::new(45.0703, 7.6869, 1.5));
        assert_eq!(config.most_frequented_area_radius_km, Some(0.5));
    }

    #[test]
    fn test_parse_config_toml() {
        let config = parse_config(
            "earthRadiusKM = 6371.0\n\
             geofenceCenterLatitude = 45.0703\n\
             geofenceCenterLongitude = 7.6869\n\
             geofenceRadiusKm = 1.5\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(config.geofence, Geofence::new(45.0703, 7.6869, 1.5));
        assert!(config.most_frequented_area_radius_km.is_none());
    }

    #[test]
    fn test_parse_config_defaults() {
        let config = parse_config(
            "geofenceCenterLatitude: 45.0\ngeofenceCenterLongitude: 7.0\ngeofenceRadiusKm: 2.0\n",
            ConfigFormat::Yaml,
        )
        .unwrap();
        assert_eq!(config.earth_radius_km, DEFAULT_EARTH_RADIUS_KM);
        assert!(config.most_frequented_area_radius_km.is_none());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("custom-parameters.yml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("parameters.yaml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("parameters.TOML")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("parameters")), ConfigFormat::Yaml);
    }

    #[test]
    fn test_parse_config_rejects_bad_values() {
        let missing = parse_config("earthRadiusKM: 6371.0\n", ConfigFormat::Yaml);
        assert!(matches!(missing, Err(InputError::Yaml(_))));

        let missing = parse_config("earthRadiusKM = 6371.0\n", ConfigFormat::Toml);
        assert!(matches!(missing, Err(InputError::Toml(_))));

        let negative = parse_config(
            "earthRadiusKM: -1.0\n\
             geofenceCenterLatitude: 45.0\n\
             geofenceCenterLongitude: 7.0\n\
             geofenceRadiusKm: 2.0\n",
            ConfigFormat::Yaml,
        );
        assert!(matches!(
            negative,
            Err(InputError::InvalidParameter {
                name: "earthRadiusKM",
                ..
            })
        ));

        let zero_area = parse_config(
            "geofenceCenterLatitude: 45.0\n\
             geofenceCenterLongitude: 7.0\n\
             geofenceRadiusKm: 2.0\n\
             mostFrequentedAreaRadiusKm: 0.0\n",
            ConfigFormat::Yaml,
        );
        assert!(matches!(
            zero_area,
            Err(InputError::InvalidParameter {
                name: "mostFrequentedAreaRadiusKm",
                ..
            })
        ));
    }
}

//! Course repository files.
//!
//! Reads the staff roster, submitter lists and schedule, and writes
//! generated YAML. Writes go through a temp file and a rename so a failed
//! run never leaves a half-written artifact behind.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::InputError;
use crate::models::{Mapping, Roster, ScheduleSection, SemesterInfo};

/// Loads the staff roster.
///
/// Accepts either a bare list of reviewer records or a semester-info
/// document with a `TAs` map, in YAML or JSON.
pub fn load_roster(path: &Path) -> Result<Roster, InputError> {
    let value: serde_yaml::Value = read_yaml(path)?;
    let roster = if value.is_mapping() {
        from_value::<SemesterInfo>(path, value)?.roster()
    } else {
        from_value::<Roster>(path, value)?
    };
    debug!(path = %path.display(), reviewers = roster.len(), "roster loaded");
    Ok(roster)
}

/// Loads a semester-info document (YAML or JSON).
pub fn load_semester_info(path: &Path) -> Result<SemesterInfo, InputError> {
    read_yaml(path)
}

/// Loads the course schedule.
pub fn load_schedule(path: &Path) -> Result<Vec<ScheduleSection>, InputError> {
    read_yaml(path)
}

/// Reads every value of one CSV column, in row order.
///
/// Blank cells are kept; identity cleaning drops and reports them later.
pub fn read_csv_column(path: &Path, column: &str) -> Result<Vec<String>, InputError> {
    let csv_err = |source| InputError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();
    let index = headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == column)
        .ok_or_else(|| InputError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })?;

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        match record.get(index) {
            Some(v) => values.push(v.trim().to_string()),
            None => warn!(
                path = %path.display(),
                line = record.position().map(|p| p.line()),
                "row is missing column '{}'",
                column
            ),
        }
    }
    Ok(values)
}

/// Distinct non-blank values of one CSV column, first-seen order.
///
/// Used for team rosters where every member row repeats the team name.
pub fn read_unique_column(path: &Path, column: &str) -> Result<Vec<String>, InputError> {
    let mut seen = HashSet::new();
    Ok(read_csv_column(path, column)?
        .into_iter()
        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
        .collect())
}

/// Output file name for a cycle's mapping.
pub fn mapping_file_name(cycle: u32, teams: bool) -> String {
    if teams {
        format!("homework{cycle:02}_teams_tas_mapping.yaml")
    } else {
        format!("homework{cycle:02}.yaml")
    }
}

/// Writes a mapping as a YAML list of `[submitter, reviewer]` rows.
pub fn write_mapping(path: &Path, mapping: &Mapping) -> Result<(), InputError> {
    write_yaml(path, mapping)
}

/// Serializes `value` to YAML at `path`, replacing any previous file.
pub fn write_yaml<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), InputError> {
    let yaml = serde_yaml::to_string(value).map_err(|source| InputError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, yaml.as_bytes())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), InputError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes).map_err(|source| io_error(&tmp, source))?;
    fs::rename(&tmp, path).map_err(|source| io_error(path, source))
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    let text = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    serde_yaml::from_str(&text).map_err(|source| InputError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

fn from_value<T: DeserializeOwned>(path: &Path, value: serde_yaml::Value) -> Result<T, InputError> {
    serde_yaml::from_value(value).map_err(|source| InputError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

fn io_error(path: &Path, source: std::io::Error) -> InputError {
    InputError::Io {
        path: path.to_path_buf(),
        source,
    }
}

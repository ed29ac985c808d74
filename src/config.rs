//! Run configuration.
//!
//! Precedence, lowest first: built-in defaults (the course repository
//! layout), an optional YAML file, `TA_ASSIGN_*` environment variables,
//! then command-line flags (applied by the binary).

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::InputError;
use crate::models::calendar::DEFAULT_MAX_LOOKAHEAD_DAYS;
use crate::publish::DEFAULT_API_URL;
use crate::scheduler::DEFAULT_MAX_ATTEMPTS;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_opt(key)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable environment override");
            None
        }
    }
}

/// A numbered run of cycles: `first`, `first + 1`, ... (`count` of them).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRange {
    pub first: u32,
    pub count: u32,
}

impl CycleRange {
    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.first..self.first.saturating_add(self.count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Staff roster for student cycles and review requests.
    pub roster_path: PathBuf,
    /// Semester info whose `TAs` map is the roster for team cycles.
    pub semester_info_path: PathBuf,
    /// Persisted review-request ledger.
    pub ledger_path: PathBuf,
    pub students_csv: PathBuf,
    pub student_column: String,
    pub teams_csv: PathBuf,
    pub team_column: String,
    /// Directory receiving generated mappings.
    pub output_dir: PathBuf,
    pub homework_cycles: CycleRange,
    pub team_cycles: CycleRange,
    /// Retry cap per batch cycle.
    pub max_attempts: usize,
    pub github_api_url: String,
    /// How long to wait for another run's ledger lock.
    pub lock_timeout_secs: u64,
    pub schedule_path: PathBuf,
    pub adjusted_schedule_path: PathBuf,
    pub class_days: Vec<String>,
    pub max_lookahead_days: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            roster_path: "static/yaml/tas.yaml".into(),
            semester_info_path: "static/yaml/semester_info.yaml".into(),
            ledger_path: "static/json/ta_assignment.json".into(),
            students_csv: "static/csv/students.csv".into(),
            student_column: "SIS User ID".into(),
            teams_csv: "static/csv/teams.csv".into(),
            team_column: "group_name".into(),
            output_dir: "static/yaml".into(),
            homework_cycles: CycleRange { first: 0, count: 12 },
            team_cycles: CycleRange { first: 1, count: 5 },
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            github_api_url: DEFAULT_API_URL.into(),
            lock_timeout_secs: 10,
            schedule_path: "static/yaml/schedule.yaml".into(),
            adjusted_schedule_path: "static/yaml/adjusted_schedule.yaml".into(),
            class_days: vec!["Monday".into(), "Wednesday".into()],
            max_lookahead_days: DEFAULT_MAX_LOOKAHEAD_DAYS,
        }
    }
}

impl AppConfig {
    /// Defaults, overlaid with `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, InputError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                serde_yaml::from_str(&text).map_err(|source| InputError::Yaml {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Applies `TA_ASSIGN_*` and `GITHUB_API_URL` overrides.
    pub fn apply_env(&mut self) {
        if let Some(v) = env_opt("TA_ASSIGN_ROSTER") {
            self.roster_path = v.into();
        }
        if let Some(v) = env_opt("TA_ASSIGN_SEMESTER_INFO") {
            self.semester_info_path = v.into();
        }
        if let Some(v) = env_opt("TA_ASSIGN_LEDGER") {
            self.ledger_path = v.into();
        }
        if let Some(v) = env_opt("TA_ASSIGN_OUTPUT_DIR") {
            self.output_dir = v.into();
        }
        if let Some(v) = env_parse("TA_ASSIGN_MAX_ATTEMPTS") {
            self.max_attempts = v;
        }
        if let Some(v) = env_parse("TA_ASSIGN_LOCK_TIMEOUT_SECS") {
            self.lock_timeout_secs = v;
        }
        if let Some(v) = env_opt("GITHUB_API_URL") {
            self.github_api_url = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_course_layout() {
        let c = AppConfig::default();
        assert_eq!(c.ledger_path, PathBuf::from("static/json/ta_assignment.json"));
        assert_eq!(c.homework_cycles.iter().collect::<Vec<_>>(), (0..12).collect::<Vec<_>>());
        assert_eq!(c.team_cycles.iter().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert_eq!(c.max_attempts, 10_000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("ta-assign.yaml");
        std::fs::write(
            &path,
            "output_dir: build/mappings\nteam_cycles: {first: 1, count: 3}\nmax_attempts: 500\n",
        )
        .unwrap();

        let c = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(c.output_dir, PathBuf::from("build/mappings"));
        assert_eq!(c.team_cycles.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(c.student_column, "SIS User ID");
    }

    #[test]
    fn test_bad_file_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.yaml");
        std::fs::write(&path, "max_attempts: [oops").unwrap();
        assert!(matches!(AppConfig::load(Some(&path)), Err(InputError::Yaml { .. })));
    }
}

//! Configuration management module.
//!
//! This module handles loading, saving, and managing application configuration,
//! including the database location, export directory, scan behavior and
//! logging level.

mod error;

pub use error::ConfigError;

use crate::error::AppError;
use crate::events::CaptureConfig;
use crate::utils::text_processing::is_valid_time_format;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

const FILE_NAME: &str = "config.yml";
const DATABASE_FILE_NAME: &str = "inventory.db";
const DEFAULT_DIRECTORY_PATH: &str = ".config/inventory-scan";

/// Default pattern for the "Scanned Time" column, e.g. `3/14/2024, 9:05:00 AM`.
pub const DEFAULT_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Oversees management of configuration file.
///
#[derive(Clone, Debug)]
pub struct Config {
    pub database_path: PathBuf,
    pub export_directory: PathBuf,
    pub time_format: String,
    pub continuous_scan: bool,
    pub scan_buffer: usize,
    pub scan_format: String,
    pub log_level: LevelFilter,
    file_path: Option<PathBuf>,
}

/// Define specification for configuration file.
///
#[derive(Serialize, Deserialize)]
struct FileSpec {
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default = "default_export_directory")]
    pub export_directory: PathBuf,
    #[serde(default = "default_time_format")]
    pub time_format: String,
    #[serde(default)]
    pub continuous_scan: bool,
    #[serde(default = "default_scan_buffer")]
    pub scan_buffer: usize,
    #[serde(default = "default_scan_format")]
    pub scan_format: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_export_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}

fn default_scan_buffer() -> usize {
    16
}

fn default_scan_format() -> String {
    "Unknown".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Parse a level name as written in the configuration file.
///
pub fn parse_log_level(value: &str) -> Result<LevelFilter, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        other => Err(ConfigError::InvalidValue {
            field: "log_level",
            message: format!("unknown level '{}'", other),
        }),
    }
}

impl Config {
    /// Return a new instance holding the defaults. The database lives in
    /// the working directory until a configuration is loaded.
    ///
    pub fn new() -> Config {
        Config {
            database_path: PathBuf::from(DATABASE_FILE_NAME),
            export_directory: default_export_directory(),
            time_format: default_time_format(),
            continuous_scan: false,
            scan_buffer: default_scan_buffer(),
            scan_format: default_scan_format(),
            log_level: LevelFilter::Info,
            file_path: None,
        }
    }

    /// Try to load an existing configuration from the disk using the custom
    /// path if provided. If the file does not exist, initialize it with the
    /// defaults at the default directory or the custom one if provided.
    ///
    pub fn load(&mut self, custom_path: Option<&str>) -> Result<(), AppError> {
        // Use default path unless custom path provided
        let dir_path = match custom_path {
            Some(path) => Path::new(&path).to_path_buf(),
            None => Config::default_path()?,
        };

        // Try to create dir path if it doesn't exist
        if !dir_path.exists() {
            fs::create_dir_all(&dir_path).map_err(|e| ConfigError::CreateDirectoryFailed {
                path: dir_path.clone(),
                source: e,
            })?;
        }

        let file_path = dir_path.join(Path::new(FILE_NAME));
        self.file_path = Some(file_path.clone());
        self.database_path = dir_path.join(DATABASE_FILE_NAME);

        if file_path.exists() {
            let contents = fs::read_to_string(&file_path).map_err(|e| ConfigError::LoadFailed {
                path: file_path.clone(),
                message: format!("IO error: {}", e),
            })?;
            let data: FileSpec = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::DeserializationFailed(e.to_string()))?;
            self.apply(data)?;
        } else {
            self.save()?;
        }

        Ok(())
    }

    /// Validate file contents and copy them over the current values.
    ///
    fn apply(&mut self, data: FileSpec) -> Result<(), ConfigError> {
        if !is_valid_time_format(&data.time_format) {
            return Err(ConfigError::InvalidValue {
                field: "time_format",
                message: format!("'{}' is not a valid strftime pattern", data.time_format),
            });
        }
        if data.scan_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan_buffer",
                message: "must be at least 1".to_string(),
            });
        }
        self.log_level = parse_log_level(&data.log_level)?;
        if let Some(database_path) = data.database_path {
            self.database_path = database_path;
        }
        self.export_directory = data.export_directory;
        self.time_format = data.time_format;
        self.continuous_scan = data.continuous_scan;
        self.scan_buffer = data.scan_buffer;
        self.scan_format = data.scan_format;
        Ok(())
    }

    /// Attempt to serialize the configuration data and write it to the disk,
    /// returning any unrecoverable errors.
    ///
    pub fn save(&self) -> Result<(), AppError> {
        let file_path = self.file_path.as_ref().ok_or(ConfigError::FilePathNotSet)?;
        let data = FileSpec {
            database_path: Some(self.database_path.clone()),
            export_directory: self.export_directory.clone(),
            time_format: self.time_format.clone(),
            continuous_scan: self.continuous_scan,
            scan_buffer: self.scan_buffer,
            scan_format: self.scan_format.clone(),
            log_level: self.log_level.to_string().to_lowercase(),
        };
        let content = serde_yaml::to_string(&data)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = file_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::CreateDirectoryFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut file = fs::File::create(file_path).map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        write!(file, "{}", content).map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        file.flush().map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        Ok(())
    }

    /// Capture settings derived from the scan fields.
    ///
    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            format_label: self.scan_format.clone(),
            buffer: self.scan_buffer,
            continuous: self.continuous_scan,
        }
    }

    /// Returns the path buffer for the default path to the configuration file
    /// or an error if the home directory could not be found.
    ///
    fn default_path() -> Result<PathBuf, AppError> {
        match dirs::home_dir() {
            Some(home) => {
                let home_path = Path::new(&home);
                let default_config_path = Path::new(DEFAULT_DIRECTORY_PATH);
                Ok(home_path.join(default_config_path))
            }
            None => Err(ConfigError::HomeDirectoryNotFound.into()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_from(dir: &Path) -> Result<Config, AppError> {
        let mut config = Config::new();
        config.load(dir.to_str())?;
        Ok(config)
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(dir.path()).unwrap();

        assert!(dir.path().join(FILE_NAME).exists());
        assert_eq!(config.database_path, dir.path().join(DATABASE_FILE_NAME));
        assert_eq!(config.time_format, DEFAULT_TIME_FORMAT);
        assert!(!config.continuous_scan);
        assert_eq!(config.scan_buffer, 16);
        assert_eq!(config.scan_format, "Unknown");
        assert_eq!(config.log_level, LevelFilter::Info);

        let reloaded = load_from(dir.path()).unwrap();
        assert_eq!(reloaded.database_path, config.database_path);
        assert_eq!(reloaded.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(FILE_NAME),
            "continuous_scan: true\nscan_format: CODE_128\nlog_level: debug\n",
        )
        .unwrap();

        let config = load_from(dir.path()).unwrap();
        assert!(config.continuous_scan);
        assert_eq!(config.scan_format, "CODE_128");
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.time_format, DEFAULT_TIME_FORMAT);
        assert_eq!(config.export_directory, PathBuf::from("."));

        let capture = config.capture_config();
        assert!(capture.continuous);
        assert_eq!(capture.format_label, "CODE_128");
        assert_eq!(capture.buffer, 16);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(FILE_NAME);

        fs::write(&file, "scan_buffer: 0\n").unwrap();
        assert!(matches!(
            load_from(dir.path()),
            Err(AppError::Config(ConfigError::InvalidValue { field: "scan_buffer", .. }))
        ));

        fs::write(&file, "time_format: \"%Q\"\n").unwrap();
        assert!(matches!(
            load_from(dir.path()),
            Err(AppError::Config(ConfigError::InvalidValue { field: "time_format", .. }))
        ));

        fs::write(&file, "log_level: loud\n").unwrap();
        assert!(matches!(
            load_from(dir.path()),
            Err(AppError::Config(ConfigError::InvalidValue { field: "log_level", .. }))
        ));

        fs::write(&file, "scan_buffer: [1, 2]\n").unwrap();
        assert!(matches!(
            load_from(dir.path()),
            Err(AppError::Config(ConfigError::DeserializationFailed(_)))
        ));
    }

    #[test]
    fn test_save_persists_changes() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = load_from(dir.path()).unwrap();
        config.export_directory = dir.path().join("exports");
        config.log_level = LevelFilter::Trace;
        config.save().unwrap();

        let reloaded = load_from(dir.path()).unwrap();
        assert_eq!(reloaded.export_directory, dir.path().join("exports"));
        assert_eq!(reloaded.log_level, LevelFilter::Trace);
    }

    #[test]
    fn test_save_without_path_fails() {
        let config = Config::new();
        assert!(matches!(
            config.save(),
            Err(AppError::Config(ConfigError::FilePathNotSet))
        ));
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level(" WARN ").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_log_level("off").unwrap(), LevelFilter::Off);
        assert!(parse_log_level("verbose").is_err());
    }
}

// Configuration loading and parsing (service.toml, picker.toml).

use std::path::{Path, PathBuf};

use coverscout_core::model::{CoverageFormat, FormatSet};
use coverscout_core::picker::{MatchPolicy, PickerConfig, RowHeights};
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    pub picker: PickerSettings,
    pub form: FormSettings,
}

// ---------------------------------------------------------------------------
// service.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[service]` table in service.toml.
#[derive(Debug, Clone, Deserialize)]
struct ServiceFile {
    service: ServiceConfig,
}

/// Where the option sources and the coverage solver live.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

// ---------------------------------------------------------------------------
// picker.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire picker.toml file.
#[derive(Debug, Clone, Deserialize)]
struct PickerFile {
    picker: PickerSettings,
    #[serde(default)]
    form: FormSettings,
}

/// Listbox geometry and matching policy shared by all three pickers.
#[derive(Debug, Clone, Deserialize)]
pub struct PickerSettings {
    pub header_height: u32,
    pub item_height: u32,
    pub max_visible_rows: usize,
    #[serde(default)]
    pub list_padding: u32,
    #[serde(default)]
    pub overscan: usize,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default = "default_true")]
    pub ignore_accents: bool,
    #[serde(default = "default_true")]
    pub group_games_by_tournament: bool,
}

impl PickerSettings {
    /// Controller settings for one picker instance.
    pub fn controller_config(&self) -> PickerConfig {
        PickerConfig {
            heights: RowHeights {
                header: self.header_height,
                item: self.item_height,
            },
            overscan: self.overscan,
            policy: MatchPolicy {
                case_sensitive: self.case_sensitive,
                ignore_accents: self.ignore_accents,
            },
            max_visible_rows: self.max_visible_rows,
            list_padding: self.list_padding,
            disabled: false,
        }
    }
}

/// Initial state of the comparison form.
#[derive(Debug, Clone, Deserialize)]
pub struct FormSettings {
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    #[serde(default)]
    pub only_monthly_billing: bool,
}

impl Default for FormSettings {
    fn default() -> Self {
        FormSettings {
            formats: default_formats(),
            only_monthly_billing: false,
        }
    }
}

impl FormSettings {
    /// The configured default formats. Unknown names are skipped; `validate`
    /// rejects them before this is ever called on loaded config.
    pub fn format_set(&self) -> FormatSet {
        let formats: Vec<CoverageFormat> = self
            .formats
            .iter()
            .filter_map(|f| CoverageFormat::from_str_format(f))
            .collect();
        FormatSet::from_formats(&formats)
    }
}

fn default_formats() -> Vec<String> {
    vec!["live".to_string()]
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/service.toml` and
/// `config/picker.toml`, both relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- service.toml (required) ---
    let service_path = config_dir.join("service.toml");
    let service_text = read_file(&service_path)?;
    let service_file: ServiceFile =
        toml::from_str(&service_text).map_err(|e| ConfigError::ParseError {
            path: service_path.clone(),
            source: e,
        })?;

    // --- picker.toml (required) ---
    let picker_path = config_dir.join("picker.toml");
    let picker_text = read_file(&picker_path)?;
    let picker_file: PickerFile =
        toml::from_str(&picker_text).map_err(|e| ConfigError::ParseError {
            path: picker_path.clone(),
            source: e,
        })?;

    let config = Config {
        service: service_file.service,
        picker: picker_file.picker,
        form: picker_file.form,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);
        if copy_new(&path, &target)? {
            copied.push(target);
        }
    }

    Ok(copied)
}

/// The directory config is resolved against: the working directory when it
/// carries `config/` or `defaults/`, otherwise the per-user config directory.
pub fn resolve_base_dir(cwd: &Path) -> PathBuf {
    if cwd.join("config").exists() || cwd.join("defaults").exists() {
        return cwd.to_path_buf();
    }
    match ProjectDirs::from("", "", "coverscout") {
        Some(dirs) => dirs.config_dir().to_path_buf(),
        None => cwd.to_path_buf(),
    }
}

/// Convenience wrapper: loads config relative to the current working directory
/// (or the per-user config directory). Ensures default config files are
/// copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    let base_dir = resolve_base_dir(&cwd);
    ensure_config_files(&base_dir)?;
    load_config_from(&base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// Copy `from` to `to` unless `to` already exists. Returns whether it copied.
fn copy_new(from: &Path, to: &Path) -> Result<bool, ConfigError> {
    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(to)
    {
        Ok(mut dest) => {
            let content = std::fs::read(from).map_err(|e| ConfigError::DefaultsCopyError {
                message: format!("failed to read {}: {e}", from.display()),
            })?;
            std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to write {}: {e}", to.display()),
                }
            })?;
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", to.display()),
        }),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let url = config.service.base_url.trim();
    if url.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "service.base_url".into(),
            message: "must not be empty".into(),
        });
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::ValidationError {
            field: "service.base_url".into(),
            message: format!("must start with http:// or https://, got {url}"),
        });
    }
    if config.service.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "service.request_timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    let picker = &config.picker;
    let size_fields: &[(&str, u64)] = &[
        ("picker.header_height", u64::from(picker.header_height)),
        ("picker.item_height", u64::from(picker.item_height)),
        ("picker.max_visible_rows", picker.max_visible_rows as u64),
    ];
    for (name, val) in size_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    if config.form.formats.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "form.formats".into(),
            message: "select at least one of \"live\" or \"highlights\"".into(),
        });
    }
    for format in &config.form.formats {
        if CoverageFormat::from_str_format(format).is_none() {
            return Err(ConfigError::ValidationError {
                field: "form.formats".into(),
                message: format!("unknown format `{format}`, expected \"live\" or \"highlights\""),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

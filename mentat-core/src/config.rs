//! src/config.rs
//! ============================================================================
//! # Config: Startup Configuration for the Note Browser
//!
//! Loads settings as TOML from the platform config directory using the
//! [`directories`](https://docs.rs/directories) crate, then applies
//! environment overrides. The result is resolved once and shared read-only
//! as `Arc<Config>`.
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! ```

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use tokio::fs as TokioFs;

use crate::error::AppError;
use crate::tasks::editor_task::resolve_editor;

pub const DEFAULT_NOTES_DIR: &str = "~/notes";

/// Main configuration struct for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the markdown notes.
    pub notes_dir: PathBuf,

    /// Editor command line, e.g. `"nvim"` or `"code --wait"`.
    /// Always populated after [`Config::load`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor_cmd: Option<String>,

    /// Rescan the notes directory when the editor exits.
    pub rescan_after_edit: bool,

    /// Periodic rescan, e.g. `"30s"`. Disabled when absent.
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub rescan_interval: Option<Duration>,

    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes_dir: PathBuf::from(DEFAULT_NOTES_DIR),
            editor_cmd: None,
            rescan_after_edit: false,
            rescan_interval: None,
            log_level: "info".to_string(),
        }
    }
}

/// Everything `Config` is resolved from, captured up front so loading
/// never reaches for process globals halfway through.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub file: PathBuf,
    pub home: Option<PathBuf>,
    pub notes_dir_override: Option<String>,
    pub visual: Option<String>,
    pub editor: Option<String>,
}

impl ConfigSources {
    /// Reads `MENTAT_CONFIG`, `MENTAT_NOTES_DIR`, `VISUAL` and `EDITOR`.
    pub fn from_env() -> Result<Self, AppError> {
        let file = match std::env::var_os("MENTAT_CONFIG") {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => Config::config_path()?,
        };

        Ok(Self {
            file,
            home: BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()),
            notes_dir_override: std::env::var("MENTAT_NOTES_DIR").ok(),
            visual: std::env::var("VISUAL").ok(),
            editor: std::env::var("EDITOR").ok(),
        })
    }
}

impl Config {
    /// Loads config from the process environment and the config file.
    pub async fn load() -> Result<Self, AppError> {
        Self::load_from(&ConfigSources::from_env()?).await
    }

    /// Loads config from explicit sources. A missing file yields defaults;
    /// an unreadable or malformed one is an error.
    pub async fn load_from(sources: &ConfigSources) -> Result<Self, AppError> {
        let path = &sources.file;

        let mut config: Self = match TokioFs::read_to_string(path).await {
            Ok(text) => {
                info!("Loading config from {}", path.display());
                toml::from_str(&text).map_err(|source| AppError::ConfigParse {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "No config file found at {}, using default configuration",
                    path.display()
                );
                Self::default()
            }
            Err(source) => {
                return Err(AppError::ConfigIo {
                    path: path.clone(),
                    source,
                });
            }
        };

        if let Some(dir) = sources
            .notes_dir_override
            .as_deref()
            .filter(|d| !d.trim().is_empty())
        {
            config.notes_dir = PathBuf::from(dir);
        }
        config.notes_dir = expand_home(&config.notes_dir, sources.home.as_deref())?;

        config.editor_cmd = Some(resolve_editor(
            config.editor_cmd.as_deref(),
            sources.visual.as_deref(),
            sources.editor.as_deref(),
        ));

        Ok(config)
    }

    /// Editor program followed by its leading arguments.
    pub fn editor_argv(&self) -> Vec<String> {
        let cmd = resolve_editor(self.editor_cmd.as_deref(), None, None);
        cmd.split_whitespace().map(str::to_string).collect()
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> Result<PathBuf, AppError> {
        let proj_dirs = ProjectDirs::from("org", "mentat", "mentat")
            .ok_or_else(|| AppError::Config("Could not determine config directory.".into()))?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}

/// Expands a leading `~` to the user's home directory.
fn expand_home(path: &Path, home: Option<&Path>) -> Result<PathBuf, AppError> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };

    let home = home.ok_or_else(|| {
        AppError::Config(format!(
            "cannot expand {} without a home directory",
            path.display()
        ))
    })?;

    Ok(home.join(rest))
}

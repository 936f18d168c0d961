use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::io::recovery::atomic_write;
use crate::model::config::BoardConfig;
use crate::model::prompts::{AGENT_FILE_NAME, AGENT_INSTRUCTIONS};

/// Directory (under the working directory) holding the board by default.
pub const DEFAULT_BOARD_DIR: &str = ".kanban";

/// Config file name inside the default board directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// YAML config read when no `config.toml` exists yet.
pub const YAML_CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("could not serialize config: {0}")]
    SerializeYaml(#[from] serde_yaml::Error),
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// `<cwd>/.kanban/config.toml`, or `<cwd>/.kanban/config.yaml` when only
/// that one exists.
pub fn default_config_path(cwd: &Path) -> PathBuf {
    let dir = cwd.join(DEFAULT_BOARD_DIR);
    let toml_path = dir.join(CONFIG_FILE_NAME);
    let yaml_path = dir.join(YAML_CONFIG_FILE_NAME);
    if !toml_path.exists() && yaml_path.exists() {
        yaml_path
    } else {
        toml_path
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Load the config file, creating it with defaults if it does not exist.
///
/// `.yaml`/`.yml` files are read as YAML, anything else as TOML. A failure to
/// write the default file is ignored; the defaults are still returned. Empty
/// or missing fields fall back to defaults, and a relative `board_dir` is
/// taken relative to `cwd`.
pub fn load_config(path: &Path, cwd: &Path) -> Result<BoardConfig, ConfigError> {
    let defaults = BoardConfig::with_board_dir(cwd.join(DEFAULT_BOARD_DIR));

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let _ = save_config(path, &defaults);
            return Ok(defaults);
        }
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let mut config: BoardConfig = if is_yaml(path) {
        // An empty YAML document is null; treat it as all defaults.
        serde_yaml::from_str::<Option<BoardConfig>>(&text)
            .map_err(|e| ConfigError::ParseYaml {
                path: path.to_path_buf(),
                source: e,
            })?
            .unwrap_or_else(|| defaults.clone())
    } else {
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?
    };

    if config.board_dir.as_os_str().is_empty() {
        config.board_dir = defaults.board_dir;
    } else if config.board_dir.is_relative() {
        config.board_dir = cwd.join(&config.board_dir);
    }
    config.fill_defaults();

    Ok(config)
}

/// Write the config as TOML (or YAML for a `.yaml` path), creating parent
/// directories.
pub fn save_config(path: &Path, config: &BoardConfig) -> Result<(), ConfigError> {
    let text = if is_yaml(path) {
        serde_yaml::to_string(config)?
    } else {
        toml::to_string_pretty(config)?
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(path, text).map_err(|e| ConfigError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Apply a `--dir` override, made absolute against `cwd`.
pub fn override_board_dir(config: &mut BoardConfig, dir: &Path, cwd: &Path) {
    config.board_dir = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        cwd.join(dir)
    };
}

/// Create the board directory and one directory per column.
pub fn ensure_directories(config: &BoardConfig) -> Result<(), ConfigError> {
    let dirs = std::iter::once(config.board_dir.clone())
        .chain(config.columns.iter().map(|c| config.column_path(&c.dir)));
    for dir in dirs {
        fs::create_dir_all(&dir).map_err(|e| ConfigError::CreateDir {
            path: dir.clone(),
            source: e,
        })?;
    }
    Ok(())
}

/// Write `AGENT.md` into the board directory unless one is already there.
pub fn ensure_agent_instructions(config: &BoardConfig) -> Result<(), ConfigError> {
    let path = config.board_dir.join(AGENT_FILE_NAME);
    if path.exists() {
        return Ok(());
    }
    atomic_write(&path, AGENT_INSTRUCTIONS.as_bytes())
        .map_err(|e| ConfigError::Write { path, source: e })
}

/// Resolve the config for a run: `--config` path (or the default), then the
/// `--dir` override, then create every directory and `AGENT.md`.
pub fn resolve_config(
    config_path: Option<&Path>,
    board_dir: Option<&Path>,
) -> Result<BoardConfig, ConfigError> {
    let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_config_path(&cwd));
    let mut config = load_config(&path, &cwd)?;
    if let Some(dir) = board_dir {
        override_board_dir(&mut config, dir, &cwd);
    }
    ensure_directories(&config)?;
    ensure_agent_instructions(&config)?;
    Ok(config)
}

//! Configuration file handling for asciify.
//!
//! Loads configuration from `~/.config/asciify/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration file structure for asciify.
/// Loaded from ~/.config/asciify/config.toml (or custom path via --config).
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct RenderConfig {
    pub charset: Option<String>,
    pub color_levels: Option<u32>,
    pub cell_size: Option<u32>,
    pub font: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Output geometry as "WIDTHxHEIGHT".
    pub geometry: Option<String>,
    pub fps: Option<f64>,
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// An explicit path must exist; the default path falls back to defaults
    /// when missing. A file that exists but cannot be parsed is an error
    /// either way.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_path(), false),
        };

        if !path.exists() {
            if required {
                return Err(ConfigError::NotFound { path });
            }
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            path: path.clone(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError { path, source: e })
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    NotFound {
        path: PathBuf,
    },
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound { path } => {
                write!(f, "Config file '{}' not found", path.display())
            }
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::NotFound { .. } => None,
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("asciify").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/asciify/config.toml")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_default_path_gives_defaults() {
        let cfg = Config::load(None).unwrap_or_default();
        // Whatever the machine's config says, the structure must be usable.
        let _ = cfg.render.charset;
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let err = Config::load(Some(Path::new("/nonexistent/asciify.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_parse_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[render]\ncharset = \" .:#\"\ncolor_levels = 16\ncell_size = 8\n\n\
             [output]\ngeometry = \"640x360\"\nfps = 24.0"
        )
        .unwrap();

        let cfg = Config::load(Some(file.path())).unwrap();
        assert_eq!(cfg.render.charset.as_deref(), Some(" .:#"));
        assert_eq!(cfg.render.color_levels, Some(16));
        assert_eq!(cfg.render.cell_size, Some(8));
        assert_eq!(cfg.output.geometry.as_deref(), Some("640x360"));
        assert_eq!(cfg.output.fps, Some(24.0));
    }

    #[test]
    fn test_partial_config_defaults_rest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render]\ncell_size = 10").unwrap();

        let cfg = Config::load(Some(file.path())).unwrap();
        assert_eq!(cfg.render.cell_size, Some(10));
        assert!(cfg.render.charset.is_none());
        assert!(cfg.output.fps.is_none());
    }

    #[test]
    fn test_malformed_config_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render\ncell_size = oops").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}

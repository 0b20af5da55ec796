use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bounds enforced while decoding untrusted text or network frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecLimits {
    /// Longest envelope text accepted by the parser, in bytes.
    pub max_text_bytes: usize,
    /// Largest uncompressed size a network frame may declare.
    pub max_decompressed_bytes: usize,
    /// Deepest chain of containers nested inside containers.
    pub max_nesting_depth: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_text_bytes: 64 * 1024 * 1024,
            max_decompressed_bytes: 64 * 1024 * 1024,
            max_nesting_depth: 64,
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("limits file not found at {0}")]
    #[diagnostic(
        code(config::not_found),
        help("omit the limits file to run with the built-in defaults")
    )]
    NotFound(PathBuf),

    #[error("failed to parse limits: {0}")]
    #[diagnostic(code(config::parse_error))]
    ParseError(#[from] toml::de::Error),

    #[error("failed to render limits: {0}")]
    #[diagnostic(code(config::render_error))]
    RenderError(#[from] toml::ser::Error),

    #[error("io error: {0}")]
    #[diagnostic(code(config::io_error))]
    IoError(#[from] std::io::Error),
}

impl CodecLimits {
    /// Loads limits from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

//! # Configuration
//!
//! Postbook settings live in `config.json` inside the data directory.
//! Missing keys fall back to their defaults, so an empty `{}` file is valid.
//! Values that `set` would reject (a zero excerpt length, a blank storage
//! key) are replaced by their defaults on load.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `excerpt_length` | `150` | Characters kept in a post's excerpt |
//! | `storage_key` | `posts` | Store key holding the post collection |
//! | `editor_ext` | `.md` | Extension of the temp file handed to `$EDITOR` |

use crate::error::{PostError, Result};
use crate::model::DEFAULT_EXCERPT_LENGTH;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_STORAGE_KEY: &str = "posts";
const DEFAULT_EDITOR_EXT: &str = ".md";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostbookConfig {
    #[serde(default = "default_excerpt_length")]
    pub excerpt_length: usize,

    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    #[serde(default = "default_editor_ext")]
    pub editor_ext: String,
}

fn default_excerpt_length() -> usize {
    DEFAULT_EXCERPT_LENGTH
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_editor_ext() -> String {
    DEFAULT_EDITOR_EXT.to_string()
}

impl Default for PostbookConfig {
    fn default() -> Self {
        Self {
            excerpt_length: DEFAULT_EXCERPT_LENGTH,
            storage_key: default_storage_key(),
            editor_ext: default_editor_ext(),
        }
    }
}

impl PostbookConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(PostError::Io)?;
        let config: PostbookConfig =
            serde_json::from_str(&content).map_err(PostError::Serialization)?;
        Ok(config.with_valid_values())
    }

    fn with_valid_values(mut self) -> Self {
        if self.excerpt_length == 0 {
            log::warn!(
                "excerpt_length must be positive, using {}",
                DEFAULT_EXCERPT_LENGTH
            );
            self.excerpt_length = DEFAULT_EXCERPT_LENGTH;
        }
        let key = self.storage_key.trim();
        if key.is_empty() {
            log::warn!("storage_key is blank, using {}", DEFAULT_STORAGE_KEY);
            self.storage_key = default_storage_key();
        } else if key.len() != self.storage_key.len() {
            self.storage_key = key.to_string();
        }
        self
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(PostError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(PostError::Serialization)?;
        fs::write(config_path, content).map_err(PostError::Io)?;
        Ok(())
    }

    /// Set the editor extension (normalizes to start with a dot)
    pub fn set_editor_ext(&mut self, ext: &str) {
        if ext.starts_with('.') {
            self.editor_ext = ext.to_string();
        } else {
            self.editor_ext = format!(".{}", ext);
        }
    }

    /// Look up a setting by its CLI name (`excerpt-length`, `storage-key`,
    /// `editor-ext`).
    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "excerpt-length" => Ok(self.excerpt_length.to_string()),
            "storage-key" => Ok(self.storage_key.clone()),
            "editor-ext" => Ok(self.editor_ext.clone()),
            other => Err(PostError::Api(format!("Unknown config key: {}", other))),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "excerpt-length" => {
                let length: usize = value.parse().map_err(|_| {
                    PostError::Api(format!("excerpt-length must be a number, got {}", value))
                })?;
                if length == 0 {
                    return Err(PostError::Api("excerpt-length must be positive".into()));
                }
                self.excerpt_length = length;
            }
            "storage-key" => {
                if value.trim().is_empty() {
                    return Err(PostError::Api("storage-key cannot be empty".into()));
                }
                self.storage_key = value.trim().to_string();
            }
            "editor-ext" => self.set_editor_ext(value),
            other => return Err(PostError::Api(format!("Unknown config key: {}", other))),
        }
        Ok(())
    }

    /// All settings as `(cli name, value)` pairs.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("excerpt-length", self.excerpt_length.to_string()),
            ("storage-key", self.storage_key.clone()),
            ("editor-ext", self.editor_ext.clone()),
        ]
    }
}

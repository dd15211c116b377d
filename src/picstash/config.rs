use crate::authority::DEFAULT_AUTHORITY;
use crate::copy::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use crate::error::{PicstashError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_PICK_FILTER: &str = "image/*";
const DEFAULT_LOCAL_DIR: &str = "pictures";
const DEFAULT_LOCAL_SUFFIX: &str = ".webp";

pub const KEYS: [&str; 6] = [
    "authority",
    "pick-filter",
    "local-dir",
    "local-suffix",
    "chunk-size",
    "viewer",
];

/// Configuration for picstash, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PicstashConfig {
    /// Identifier of the locator-issuing authority
    #[serde(default = "default_authority")]
    pub authority: String,

    /// MIME filter handed to the picker (e.g. "image/*")
    #[serde(default = "default_pick_filter")]
    pub pick_filter: String,

    /// Subdirectory of the files dir where saved files land
    #[serde(default = "default_local_dir")]
    pub local_dir: String,

    /// Suffix for saved files (e.g. ".webp")
    #[serde(default = "default_local_suffix")]
    pub local_suffix: String,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// External viewer command; `$PICSTASH_VIEWER` is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer: Option<String>,
}

fn default_authority() -> String {
    DEFAULT_AUTHORITY.to_string()
}

fn default_pick_filter() -> String {
    DEFAULT_PICK_FILTER.to_string()
}

fn default_local_dir() -> String {
    DEFAULT_LOCAL_DIR.to_string()
}

fn default_local_suffix() -> String {
    DEFAULT_LOCAL_SUFFIX.to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for PicstashConfig {
    fn default() -> Self {
        Self {
            authority: default_authority(),
            pick_filter: default_pick_filter(),
            local_dir: default_local_dir(),
            local_suffix: default_local_suffix(),
            chunk_size: default_chunk_size(),
            viewer: None,
        }
    }
}

impl PicstashConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: PicstashConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        self.validate()?;

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(PicstashError::Config(format!(
                "chunk-size must be between 1 and {}",
                MAX_CHUNK_SIZE
            )));
        }
        if self.authority.trim().is_empty() {
            return Err(PicstashError::Config("authority cannot be empty".into()));
        }
        // Locators carry the authority as their host, so it must survive a parse unchanged.
        let host = Url::parse(&format!("content://{}/", self.authority))
            .ok()
            .and_then(|url| url.host_str().map(str::to_string));
        if host.as_deref() != Some(self.authority.as_str()) {
            return Err(PicstashError::Config(format!(
                "authority must be a plain host name: {:?}",
                self.authority
            )));
        }
        if self.local_dir.is_empty()
            || self.local_dir.contains("..")
            || Path::new(&self.local_dir).is_absolute()
        {
            return Err(PicstashError::Config(format!(
                "local-dir must be a relative path: {:?}",
                self.local_dir
            )));
        }
        if !self.pick_filter.contains('/') && self.pick_filter != "*" {
            return Err(PicstashError::Config(format!(
                "pick-filter must look like type/subtype: {:?}",
                self.pick_filter
            )));
        }
        Ok(())
    }

    /// Set the saved-file suffix (normalizes to start with a dot, empty clears it)
    pub fn set_local_suffix(&mut self, suffix: &str) {
        if suffix.is_empty() || suffix.starts_with('.') {
            self.local_suffix = suffix.to_string();
        } else {
            self.local_suffix = format!(".{}", suffix);
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "authority" => Some(self.authority.clone()),
            "pick-filter" => Some(self.pick_filter.clone()),
            "local-dir" => Some(self.local_dir.clone()),
            "local-suffix" => Some(self.local_suffix.clone()),
            "chunk-size" => Some(self.chunk_size.to_string()),
            "viewer" => Some(self.viewer.clone().unwrap_or_default()),
            _ => None,
        }
    }

    /// Sets a key, leaving the config untouched if the result would be invalid
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut next = self.clone();
        match key {
            "authority" => next.authority = value.to_string(),
            "pick-filter" => next.pick_filter = value.to_string(),
            "local-dir" => next.local_dir = value.to_string(),
            "local-suffix" => next.set_local_suffix(value),
            "chunk-size" => {
                next.chunk_size = value.parse().map_err(|_| {
                    PicstashError::Config(format!("chunk-size must be a number: {:?}", value))
                })?
            }
            "viewer" => next.viewer = (!value.is_empty()).then(|| value.to_string()),
            other => {
                return Err(PicstashError::Config(format!(
                    "Unknown config key: {}",
                    other
                )))
            }
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

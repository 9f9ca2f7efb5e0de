use std::env;
use std::fs;
use std::path::Path;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use crate::Result;

/// Environment variable holding a comma-separated referer allow-list.
pub const REFERERS_ENV: &str = "REFERERS";

/// The referer allow-list consulted by the access gate.
///
/// An empty list disables the gate.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessConfig {
    #[serde(default)]
    pub referers: Vec<String>,
}

impl AccessConfig {
    /// Loads the allow-list from the JSON file at `path`, falling back to
    /// [`REFERERS_ENV`] on any failure. Never fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::from_file(path) {
            Ok(config) => {
                info!("Loaded {} allowed referers from {:?}", config.referers.len(), path);
                config
            }
            Err(e) => {
                warn!("Could not load access config from {:?}: {}", path, e);
                Self::from_env()
            }
        }
    }

    /// Parses a `{"referers": [...]}` document.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read(path)?;
        Ok(serde_json::from_slice(&content)?)
    }

    /// Reads [`REFERERS_ENV`]. An unset variable is treated as an empty string.
    pub fn from_env() -> Self {
        Self::from_list(&env::var(REFERERS_ENV).unwrap_or_default())
    }

    /// Splits `raw` on commas without trimming or dropping empty entries.
    ///
    /// An empty input therefore yields a single empty referer, which keeps the gate
    /// enabled and only admits requests that carry no `Referer` header.
    pub fn from_list(raw: &str) -> Self {
        Self {
            referers: raw.split(',').map(str::to_string).collect(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.referers.is_empty()
    }

    /// Case-sensitive exact membership test.
    pub fn allows(&self, referer: &str) -> bool {
        self.referers.iter().any(|r| r == referer)
    }
}

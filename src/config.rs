use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

use crate::{EngineResult, Error};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Prefix under which dialect attributes and elements are matched (`th:text`).
    #[serde(default = "default_dialect_prefix")]
    pub dialect_prefix: String,

    /// Initial "elements only" mode of a render.
    #[serde(default)]
    pub process_only_elements: bool,

    #[serde(default)]
    pub template_cache: TemplateCacheConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateCacheConfig {
    /// Resolve processors for the whole tree when it enters the cache.
    #[serde(default = "default_true")]
    pub precompute_on_insert: bool,

    /// Reuse cached processor/skip state when cloning a cached tree for a render.
    #[serde(default = "default_true")]
    pub clone_processors: bool,
}

impl Default for TemplateCacheConfig {
    fn default() -> Self {
        Self {
            precompute_on_insert: default_true(),
            clone_processors: default_true(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dialect_prefix: default_dialect_prefix(),
            process_only_elements: false,
            template_cache: TemplateCacheConfig::default(),
        }
    }
}

impl EngineConfig {
    // JSONファイルから設定を読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        from_file(path)
    }

    /// Dialect prefix, `None` when configured empty.
    pub fn prefix(&self) -> Option<&str> {
        let prefix = self.dialect_prefix.trim();
        if prefix.is_empty() {
            None
        } else {
            Some(prefix)
        }
    }
}

pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> EngineResult<T> {
    let file = File::open(path)
        .map_err(|e| Error::Config(format!("Failed to open config file: {}", e)))?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;
    Ok(config)
}

pub fn from_str<T: for<'de> Deserialize<'de>>(s: &str) -> EngineResult<T> {
    let config = serde_json::from_str(s)
        .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

fn default_dialect_prefix() -> String {
    "th".to_string()
}

fn default_true() -> bool {
    true
}

//! Engine configuration, loadable from JSON. Missing fields take defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::search::alphabeta::{SearchParams, Searcher, DEFAULT_DEPTH};
use crate::search::tt::Tt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub name: String,
    pub depth: u32,
    pub movetime_ms: Option<u64>,
    pub max_nodes: Option<u64>,
    pub hash_mb: usize,
    pub use_tt: bool,
    pub use_quiescence: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "packbot".to_string(),
            depth: DEFAULT_DEPTH,
            movetime_ms: None,
            max_nodes: None,
            hash_mb: 16,
            use_tt: true,
            use_quiescence: true,
        }
    }
}

impl EngineConfig {
    /// Plain fixed-depth alpha-beta: no transposition table, no quiescence.
    pub fn baseline() -> Self {
        Self { name: "baseline".to_string(), use_tt: false, use_quiescence: false, hash_mb: 1, ..Self::default() }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| EngineError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&text)
    }

    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            depth: self.depth.max(1),
            movetime: self.movetime_ms.map(Duration::from_millis),
            max_nodes: self.max_nodes,
            use_tt: self.use_tt,
            use_quiescence: self.use_quiescence,
        }
    }

    pub fn build_searcher(&self) -> Searcher {
        Searcher::new(self.search_params(), Tt::with_capacity_mb(self.hash_mb))
    }
}

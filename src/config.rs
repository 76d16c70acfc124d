use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::{Axis, DominanceRule};
use crate::index::rtree::DEFAULT_NODE_CAPACITY;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// 引擎配置（TOML）。所有字段都有默认值，命令行参数优先于文件。
///
/// ```toml
/// workers = 8
/// node_capacity = 32
/// partition_axis = "y"
/// radius = 10.0
/// max_rows = 200
///
/// [rule]
/// x = "minimize"
/// y = "maximize"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 批量查询线程数；None 表示按系统负载自适应
    pub workers: Option<usize>,
    pub node_capacity: usize,
    pub partition_axis: Axis,
    pub radius: f64,
    pub max_rows: Option<usize>,
    pub rule: DominanceRule,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: None,
            node_capacity: DEFAULT_NODE_CAPACITY,
            partition_axis: Axis::X,
            radius: 10.0,
            max_rows: None,
            rule: DominanceRule::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let cfg = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded config from {:?}: {:?}", path, cfg);
        Ok(cfg)
    }

    /// 有配置文件就读，没有就用默认值
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

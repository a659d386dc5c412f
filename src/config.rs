use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::analyze::analyzer::AnalyzerOpts;
use crate::cache::store::CacheOpts;
use crate::foundation::error::{AdcraftError, AdcraftResult};
use crate::render::renderer::RenderOpts;

/// Settings for every component a [`crate::Pipeline`] owns.
///
/// Every section is optional in JSON; missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root that relative image references are resolved against.
    pub content_root: PathBuf,
    /// Render cache limits and durable directory.
    pub cache: CacheOpts,
    /// Renderer output and text settings.
    pub render: RenderOpts,
    /// Style analyzer sampling and enhancer timeout.
    pub analysis: AnalyzerOpts,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("."),
            cache: CacheOpts::default(),
            render: RenderOpts::default(),
            analysis: AnalyzerOpts::default(),
        }
    }
}

impl PipelineConfig {
    /// Read and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> AdcraftResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Parse and validate JSON config text.
    pub fn from_json_str(s: &str) -> AdcraftResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| AdcraftError::serde(format!("parse pipeline config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate every section.
    pub fn validate(&self) -> AdcraftResult<()> {
        self.cache.validate()?;
        self.render.validate()?;
        self.analysis.validate()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;

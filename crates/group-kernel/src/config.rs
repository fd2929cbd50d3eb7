//! Configuration types for the group engine.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Top-level engine configuration.
///
/// This defines the palette custom groups draw from and the sizing rules
/// applied when groups are stamped out. Loaded from JSON at runtime; every
/// field falls back to its default so partial files are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Colors handed out to custom groups, cycled by registry length
    pub palette: Vec<String>,

    /// Defaults for groups created with the "custom group" action
    pub custom_group: CustomGroupConfig,

    /// Sizing rules for template instantiation
    pub template_sizing: TemplateSizingConfig,
}

/// Defaults for custom groups.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CustomGroupConfig {
    /// Prefix of the generated sequential name ("Group 3")
    pub name_prefix: String,

    /// Minimum members before the group is considered under-filled
    pub min_size: usize,

    /// Maximum members before the group is considered over capacity
    pub max_size: usize,
}

/// How a template's suggested size becomes a group's size bounds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplateSizingConfig {
    /// Added to the suggested size to get `max_size`
    pub max_padding: usize,

    /// Subtracted from the suggested size to get `min_size` (floored at 1)
    pub min_slack: usize,
}

impl TemplateSizingConfig {
    /// Size bounds `(min_size, max_size)` for a suggested size.
    pub fn bounds(&self, suggested_size: usize) -> (usize, usize) {
        let min = suggested_size.saturating_sub(self.min_slack).max(1);
        let max = suggested_size + self.max_padding;
        (min, max)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            palette: [
                "#4F86F7", // blue
                "#F7A84F", // orange
                "#5BC67A", // green
                "#C45BC6", // purple
                "#F25F5C", // red
                "#3FB8AF", // teal
                "#FFD23F", // yellow
                "#8D6E63", // brown
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            custom_group: CustomGroupConfig::default(),
            template_sizing: TemplateSizingConfig::default(),
        }
    }
}

impl Default for CustomGroupConfig {
    fn default() -> Self {
        Self {
            name_prefix: "Group".to_string(),
            min_size: 1,
            max_size: 6,
        }
    }
}

impl Default for TemplateSizingConfig {
    fn default() -> Self {
        Self {
            max_padding: 2,
            min_slack: 1,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("invalid engine config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading engine config {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("loading {}", path.display()))
    }

    /// Reject configurations the registry cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.palette.is_empty() {
            bail!("palette must contain at least one color");
        }
        if self.custom_group.min_size > self.custom_group.max_size {
            bail!(
                "custom_group.min_size ({}) exceeds custom_group.max_size ({})",
                self.custom_group.min_size,
                self.custom_group.max_size
            );
        }
        Ok(())
    }

    /// Palette color for the n-th group.
    pub fn palette_color(&self, index: usize) -> &str {
        // validate() guarantees a non-empty palette for loaded configs
        self.palette
            .get(index % self.palette.len().max(1))
            .map(String::as_str)
            .unwrap_or("#9E9E9E")
    }
}

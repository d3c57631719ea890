//! Configuration types for the NEO pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::writers::OutputFormat;

/// Column names in the NEO catalog CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeoCsvConfig {
    /// Primary designation column (join key)
    #[serde(default = "default_designation_column")]
    pub designation_column: String,

    /// Human-readable name column
    #[serde(default = "default_name_column")]
    pub name_column: String,

    /// Diameter column, in kilometers
    #[serde(default = "default_diameter_column")]
    pub diameter_column: String,

    /// Potentially-hazardous flag column (`Y` = hazardous)
    #[serde(default = "default_hazardous_column")]
    pub hazardous_column: String,
}

fn default_designation_column() -> String {
    "pdes".to_string()
}

fn default_name_column() -> String {
    "name".to_string()
}

fn default_diameter_column() -> String {
    "diameter".to_string()
}

fn default_hazardous_column() -> String {
    "pha".to_string()
}

impl Default for NeoCsvConfig {
    fn default() -> Self {
        Self {
            designation_column: default_designation_column(),
            name_column: default_name_column(),
            diameter_column: default_diameter_column(),
            hazardous_column: default_hazardous_column(),
        }
    }
}

impl NeoCsvConfig {
    /// Required columns in the order designation, name, diameter, hazardous.
    pub fn columns(&self) -> [&str; 4] {
        [
            self.designation_column.as_str(),
            self.name_column.as_str(),
            self.diameter_column.as_str(),
            self.hazardous_column.as_str(),
        ]
    }
}

/// Layout of the close-approach JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproachJsonConfig {
    /// Top-level key holding the array of entries
    #[serde(default = "default_data_key")]
    pub data_key: String,

    /// Position of the object designation in each entry
    #[serde(default)]
    pub designation_index: usize,

    /// Position of the calendar date (`YYYY-MMM-DD HH:MM`)
    #[serde(default = "default_date_index")]
    pub date_index: usize,

    /// Position of the nominal distance in au
    #[serde(default = "default_distance_index")]
    pub distance_index: usize,

    /// Position of the relative velocity in km/s
    #[serde(default = "default_velocity_index")]
    pub velocity_index: usize,
}

fn default_data_key() -> String {
    "data".to_string()
}

fn default_date_index() -> usize {
    3
}

fn default_distance_index() -> usize {
    4
}

fn default_velocity_index() -> usize {
    7
}

impl Default for ApproachJsonConfig {
    fn default() -> Self {
        Self {
            data_key: default_data_key(),
            designation_index: 0,
            date_index: default_date_index(),
            distance_index: default_distance_index(),
            velocity_index: default_velocity_index(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Explicit output format; inferred from the file extension when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

impl OutputConfig {
    /// The configured format, falling back to the extension of `path`.
    pub fn resolve_format(&self, path: &Path) -> Option<OutputFormat> {
        self.format.or_else(|| OutputFormat::from_path(path))
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub neos: NeoCsvConfig,

    #[serde(default)]
    pub approaches: ApproachJsonConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

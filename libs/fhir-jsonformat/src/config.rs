//! Configuration for a [`FormatContext`](crate::FormatContext).
//!
//! Names which schema types the context indexes: the container types whose
//! reachable graph defines required fields, the Reference types that define
//! typed reference fields, and the primitives that carry value regexes.
//!
//! ```
//! use ferrum_jsonformat::{FhirVersion, FormatConfig};
//!
//! let config = FormatConfig::builder()
//!     .preset(FhirVersion::R4)
//!     .max_string_bytes(64 * 1024)
//!     .build();
//! assert_eq!(config.container_roots, vec!["google.fhir.r4.core.ContainedResource"]);
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// FHIR strings are limited to 1 MiB.
pub const DEFAULT_MAX_STRING_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FhirVersion {
    Stu3,
    R4,
}

impl FhirVersion {
    fn package(&self) -> &'static str {
        match self {
            FhirVersion::Stu3 => "google.fhir.stu3.proto",
            FhirVersion::R4 => "google.fhir.r4.core",
        }
    }

    pub fn container_root(&self) -> String {
        format!("{}.ContainedResource", self.package())
    }

    pub fn reference_type(&self) -> String {
        format!("{}.Reference", self.package())
    }

    pub fn regex_primitives(&self) -> Vec<String> {
        vec![format!("{}.Decimal", self.package())]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatConfig {
    /// Container types whose reachable message graph is indexed
    pub container_roots: Vec<String>,

    /// Reference types whose `reference` oneof defines typed reference fields
    pub reference_types: Vec<String>,

    /// Primitive types whose `value_regex` is compiled into the registry
    pub regex_primitives: Vec<String>,

    pub max_string_bytes: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self::for_versions(&[FhirVersion::Stu3, FhirVersion::R4])
    }
}

impl FormatConfig {
    pub fn for_version(version: FhirVersion) -> Self {
        Self::for_versions(&[version])
    }

    pub fn for_versions(versions: &[FhirVersion]) -> Self {
        versions
            .iter()
            .fold(FormatConfig::builder(), |builder, version| {
                builder.preset(*version)
            })
            .build()
    }

    /// Start from an empty configuration
    pub fn builder() -> FormatConfigBuilder {
        FormatConfigBuilder::default()
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: FormatConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_string_bytes == 0 {
            return Err(ConfigError::InvalidConfig(
                "maxStringBytes must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FormatConfigBuilder {
    config: FormatConfig,
}

impl Default for FormatConfigBuilder {
    fn default() -> Self {
        Self {
            config: FormatConfig {
                container_roots: Vec::new(),
                reference_types: Vec::new(),
                regex_primitives: Vec::new(),
                max_string_bytes: DEFAULT_MAX_STRING_BYTES,
            },
        }
    }
}

impl FormatConfigBuilder {
    /// Add the standard type names of a FHIR release
    pub fn preset(self, version: FhirVersion) -> Self {
        let mut builder = self
            .container_root(version.container_root())
            .reference_type(version.reference_type());
        for primitive in version.regex_primitives() {
            builder = builder.regex_primitive(primitive);
        }
        builder
    }

    pub fn container_root(mut self, name: impl Into<String>) -> Self {
        push_unique(&mut self.config.container_roots, name.into());
        self
    }

    pub fn reference_type(mut self, name: impl Into<String>) -> Self {
        push_unique(&mut self.config.reference_types, name.into());
        self
    }

    pub fn regex_primitive(mut self, name: impl Into<String>) -> Self {
        push_unique(&mut self.config.regex_primitives, name.into());
        self
    }

    pub fn max_string_bytes(mut self, max: usize) -> Self {
        self.config.max_string_bytes = max;
        self
    }

    pub fn build(self) -> FormatConfig {
        self.config
    }
}

fn push_unique(names: &mut Vec<String>, name: String) {
    if !names.contains(&name) {
        names.push(name);
    }
}

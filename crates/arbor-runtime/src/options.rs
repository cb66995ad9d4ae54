use serde::Deserialize;
use thiserror::Error;

/// Maximum depth of nested method calls before a call is rejected.
pub const DEFAULT_MAX_CALL_DEPTH: u32 = 1024;

#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("Invalid options: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    pub max_call_depth: u32,
    /// Report structural replacements (lazy bodies being materialized) to the
    /// registered instrumentation.
    pub instrumentation: bool,
    /// Materialize every lazy body as soon as its module is registered.
    pub eager_materialization: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            instrumentation: true,
            eager_materialization: false,
        }
    }
}

impl Options {
    /// Reads options from a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(source)?)
    }
}

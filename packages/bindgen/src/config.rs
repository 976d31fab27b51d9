//! Generator options.

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorOptions {
    /// Name of the runtime-provided invocation parameters handle.
    pub invocation_handle: String,
    /// Prefix of synthetic variable names; a counter is appended.
    pub synthetic_prefix: String,
    /// Appended to a function's name to name its generated handler.
    pub handler_suffix: String,
    /// Module qualifier printed before runtime accessor and setter names.
    pub runtime_module: String,
    /// Generate independent functions on the rayon pool.
    pub parallel: bool,
    /// Indentation width of emitted source.
    pub indent: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            invocation_handle: "params".to_string(),
            synthetic_prefix: "__v".to_string(),
            handler_suffix: "Handler".to_string(),
            runtime_module: "af".to_string(),
            parallel: true,
            indent: 4,
        }
    }
}

impl GeneratorOptions {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let options: GeneratorOptions = serde_json::from_str(content)?;
        if options.synthetic_prefix.is_empty() {
            anyhow::bail!("syntheticPrefix must not be empty");
        }
        if options.invocation_handle.is_empty() {
            anyhow::bail!("invocationHandle must not be empty");
        }
        Ok(options)
    }

    /// Module qualifier for runtime calls; `None` when configured empty.
    pub fn runtime_module(&self) -> Option<&str> {
        if self.runtime_module.is_empty() {
            None
        } else {
            Some(&self.runtime_module)
        }
    }
}

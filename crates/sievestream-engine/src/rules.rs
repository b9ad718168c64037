//! Declarative rule sets
//!
//! A [`RuleSet`] binds keywords to fixed decisions in YAML, for deployments
//! that configure sanitization without writing callbacks:
//!
//! ```yaml
//! name: redaction
//! rules:
//!   - keyword: secret
//!     action:
//!       type: replace
//!       replacement: "[REDACTED]"
//!   - keyword: halt
//!     action:
//!       type: halt
//! ```
//!
//! Rule files fail at load time, never mid-stream.

use serde::{Deserialize, Serialize};
use sievestream_core::{Decision, Result};

use crate::actions;
use crate::registry::KeywordRegistry;

/// A named collection of keyword rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    /// Rule set name, for logging
    #[serde(default)]
    pub name: String,

    /// Keyword rules, applied in order of appearance
    pub rules: Vec<Rule>,
}

/// One keyword bound to a fixed decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// The keyword to watch for
    pub keyword: String,

    /// Decision applied on every occurrence
    pub action: Decision,

    /// Disabled rules are skipped at compile time
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl RuleSet {
    /// Parse a rule set from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a rule set from a file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            sievestream_core::Error::config(format!(
                "cannot read rule file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Compile the enabled rules into a registry
    pub fn compile(&self) -> Result<KeywordRegistry> {
        let mut registry = KeywordRegistry::new();
        for rule in self.rules.iter().filter(|r| r.enabled) {
            registry.register(rule.keyword.clone(), actions::constant(rule.action.clone()))?;
        }
        tracing::debug!(name = %self.name, keywords = registry.len(), "compiled rule set");
        Ok(registry)
    }
}

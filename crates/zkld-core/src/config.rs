//! Transform configuration.
//!
//! Loaded from YAML. Every field has a default, so an empty document (or no
//! file at all) yields the standard configuration.

use std::path::Path;

use oxrdf::NamedNode;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::skolem::DEFAULT_SKOLEM_PREFIX;

/// Predicate linking a credential to its proof graph in expanded form.
pub const DEFAULT_PROOF_PREDICATE: &str = "https://w3id.org/security#proof";

/// Knobs for the selective-disclosure transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformConfig {
    /// IRI prefix for Skolem identifiers.
    #[serde(default = "default_skolem_prefix")]
    pub skolem_prefix: String,

    /// Predicate whose object is the proof graph of a credential.
    #[serde(default = "default_proof_predicate")]
    pub proof_predicate: String,

    /// Give identifier-less node objects a Skolem identifier before diffing,
    /// so anonymous nodes of the original and disclosed credential can be
    /// joined.
    #[serde(default = "default_true")]
    pub assign_omitted_ids: bool,
}

fn default_skolem_prefix() -> String {
    DEFAULT_SKOLEM_PREFIX.to_string()
}

fn default_proof_predicate() -> String {
    DEFAULT_PROOF_PREDICATE.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            skolem_prefix: default_skolem_prefix(),
            proof_predicate: default_proof_predicate(),
            assign_omitted_ids: true,
        }
    }
}

impl TransformConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_yaml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded transform config");
        Ok(config)
    }

    /// Check that the prefix yields absolute IRIs and the proof predicate is one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.skolem_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "skolem_prefix must not be empty".to_string(),
            ));
        }
        let probe = format!("{}0", self.skolem_prefix);
        NamedNode::new(probe.as_str()).map_err(|e| {
            ConfigError::Invalid(format!(
                "skolem_prefix \"{}\" does not form an IRI: {e}",
                self.skolem_prefix
            ))
        })?;
        NamedNode::new(self.proof_predicate.as_str()).map_err(|e| {
            ConfigError::Invalid(format!(
                "proof_predicate \"{}\" is not an IRI: {e}",
                self.proof_predicate
            ))
        })?;
        Ok(())
    }
}

//! # zkld-cli: Selective Disclosure Tooling
//!
//! Provides the `zkld` command-line interface for inspecting what a holder's
//! redacted credential hides before any proof is derived.
//!
//! ## Subcommands
//!
//! - `zkld diff`: compare one original credential with its disclosed variant.
//! - `zkld prepare`: diff and rewrite several credential pairs and merge
//!   their pseudonym maps.
//!
//! Inputs are JSON-LD files already in expanded form. A top-level
//! `@context` is ignored and a single top-level object is treated as a
//! one-node document.
//!
//! ```bash
//! zkld diff --original vc.json --disclosed disclosed.json
//! zkld -v prepare --pair vc1.json d1.json --pair vc2.json d2.json
//! ```

pub mod diff;
pub mod prepare;

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use zkld_core::{JsonLdProcessor, PreExpandedProcessor, TransformConfig};

/// Load the transform configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<TransformConfig> {
    match path {
        Some(path) => TransformConfig::load(path)
            .with_context(|| format!("failed to load config: {}", path.display())),
        None => Ok(TransformConfig::default()),
    }
}

/// Read an expanded JSON-LD document from `path`.
pub fn read_expanded(path: &Path) -> Result<Value> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let document: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    PreExpandedProcessor
        .expand(&document)
        .with_context(|| format!("{} is not an expanded JSON-LD document", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_config_file() {
        let cfg = load_config(None).unwrap();
        assert_eq!(cfg, TransformConfig::default());
    }

    #[test]
    fn loads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zkld.yaml");
        std::fs::write(&path, "skolem_prefix: \"urn:test:\"\n").unwrap();
        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.skolem_prefix, "urn:test:");
    }

    #[test]
    fn missing_config_file_names_the_path() {
        let err = load_config(Some(Path::new("/nonexistent/zkld.yaml"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/zkld.yaml"));
    }

    #[test]
    fn read_expanded_normalizes_top_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vc.json");
        std::fs::write(
            &path,
            r#"{"@context": "https://www.w3.org/2018/credentials/v1", "@id": "did:example:a"}"#,
        )
        .unwrap();
        let doc = read_expanded(&path).unwrap();
        assert_eq!(doc, serde_json::json!([{"@id": "did:example:a"}]));
    }

    #[test]
    fn read_expanded_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(read_expanded(&path).is_err());
    }
}

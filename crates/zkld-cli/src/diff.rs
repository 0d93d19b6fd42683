//! # Diff Subcommand
//!
//! Skolemizes the original credential, diffs the disclosed variant against
//! it, and prints the resulting pseudonym map and masking edits as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use zkld_core::{SkolemRegistry, TransformConfig};
use zkld_vc::{diff_vc, VcDiff};

use crate::read_expanded;

/// Arguments for the diff subcommand.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Expanded JSON-LD of the signed credential.
    #[arg(long)]
    pub original: PathBuf,

    /// Expanded JSON-LD of the holder's redacted credential.
    #[arg(long)]
    pub disclosed: PathBuf,
}

/// Execute the diff subcommand.
pub fn run_diff(args: &DiffArgs, config: &TransformConfig) -> Result<u8> {
    let diff = diff_files(args, config)?;
    println!("{}", serde_json::to_string_pretty(&diff)?);
    Ok(0)
}

/// Diff the two files named by `args`.
pub fn diff_files(args: &DiffArgs, config: &TransformConfig) -> Result<VcDiff> {
    let mut original = read_expanded(&args.original)?;
    let disclosed = read_expanded(&args.disclosed)?;

    let mut registry = SkolemRegistry::with_prefix(config.skolem_prefix.as_str());
    registry
        .skolemize(&mut original, config.assign_omitted_ids)
        .with_context(|| format!("failed to skolemize {}", args.original.display()))?;

    let diff = diff_vc(&original, &disclosed, &mut registry).with_context(|| {
        format!(
            "{} is not a valid disclosure of {}",
            args.disclosed.display(),
            args.original.display()
        )
    })?;
    tracing::info!(
        pseudonyms = diff.deanon_map.len(),
        edits = diff.edits.len(),
        "diffed credential pair"
    );
    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    const ORIGINAL: &str = r#"[{
        "@id": "did:example:john",
        "http://schema.org/name": [{"@value": "John"}],
        "http://schema.org/age": [{"@value": 42}]
    }]"#;

    #[test]
    fn diff_reports_pseudonyms() {
        let dir = tempfile::tempdir().unwrap();
        let args = DiffArgs {
            original: write(dir.path(), "vc.json", ORIGINAL),
            disclosed: write(
                dir.path(),
                "disclosed.json",
                r#"[{"@id": "_:holder", "http://schema.org/age": [{"@value": "_:age"}]}]"#,
            ),
        };
        let diff = diff_files(&args, &TransformConfig::default()).unwrap();
        let map = diff.deanon_map.to_string_map();
        assert_eq!(map["_:holder"], "<did:example:john>");
        assert_eq!(
            map["_:age"],
            "\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
        assert_eq!(diff.edits.masked_ids.len(), 1);
        assert_eq!(diff.edits.masked_literals.len(), 1);
    }

    #[test]
    fn identical_files_produce_an_empty_diff() {
        let dir = tempfile::tempdir().unwrap();
        let args = DiffArgs {
            original: write(dir.path(), "vc.json", ORIGINAL),
            disclosed: write(dir.path(), "same.json", ORIGINAL),
        };
        assert!(diff_files(&args, &TransformConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn invalid_disclosure_names_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let args = DiffArgs {
            original: write(dir.path(), "vc.json", ORIGINAL),
            disclosed: write(
                dir.path(),
                "forged.json",
                r#"[{"@id": "did:example:john", "http://schema.org/name": [{"@value": "Eve"}]}]"#,
            ),
        };
        let err = diff_files(&args, &TransformConfig::default()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("forged.json"));
        assert!(msg.contains("vc.json"));
    }

    #[test]
    fn configured_prefix_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let args = DiffArgs {
            original: write(dir.path(), "vc.json", ORIGINAL),
            disclosed: write(dir.path(), "d.json", r#"[{"@id": "_:holder"}]"#),
        };
        let config = TransformConfig {
            skolem_prefix: "urn:test:".to_string(),
            ..TransformConfig::default()
        };
        let diff = diff_files(&args, &config).unwrap();
        assert!(diff
            .edits
            .masked_ids
            .values()
            .all(|iri| iri.starts_with("urn:test:")));
    }
}

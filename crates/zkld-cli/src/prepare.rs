//! # Prepare Subcommand
//!
//! Runs diff-and-prepare over every credential pair in the order given,
//! merges the pair maps, and prints the merged pseudonym map together with
//! the rewritten disclosed trees.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use serde::Serialize;
use serde_json::Value;
use zkld_core::{DeanonMap, SkolemRegistry, TransformConfig};
use zkld_vc::prepare_presentation;

use crate::read_expanded;

/// Arguments for the prepare subcommand.
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// An original credential and its disclosed variant. Repeat per pair.
    #[arg(
        long,
        num_args = 2,
        value_names = ["ORIGINAL", "DISCLOSED"],
        action = ArgAction::Append,
        required = true
    )]
    pub pair: Vec<PathBuf>,
}

/// Output of the prepare subcommand.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareReport {
    /// The merged pseudonym map, in string form.
    pub deanon_map: DeanonMap,
    /// The rewritten disclosed trees, in pair order.
    pub disclosed: Vec<Value>,
}

/// Execute the prepare subcommand.
pub fn run_prepare(args: &PrepareArgs, config: &TransformConfig) -> Result<u8> {
    let report = prepare_files(args, config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(0)
}

/// Prepare every pair named by `args`.
pub fn prepare_files(args: &PrepareArgs, config: &TransformConfig) -> Result<PrepareReport> {
    let documents = args
        .pair
        .chunks_exact(2)
        .map(|pair| -> Result<(Value, Value)> {
            Ok((read_expanded(&pair[0])?, read_expanded(&pair[1])?))
        })
        .collect::<Result<Vec<_>>>()?;
    if documents.is_empty() {
        anyhow::bail!("at least one --pair ORIGINAL DISCLOSED is required");
    }

    let mut registry = SkolemRegistry::with_prefix(config.skolem_prefix.as_str());
    let (deanon_map, prepared) = prepare_presentation(
        documents.iter().map(|(original, disclosed)| (original, disclosed)),
        &mut registry,
        config,
    )
    .context("failed to prepare credential pairs")?;

    tracing::info!(
        pairs = prepared.len(),
        pseudonyms = deanon_map.len(),
        "prepared presentation inputs"
    );
    Ok(PrepareReport {
        deanon_map,
        disclosed: prepared.into_iter().map(|pair| pair.disclosed).collect(),
    })
}

//! # Masked-Value Rewriter
//!
//! Replays a [`MaskingEdits`] onto the disclosed tree, in place, so the tree
//! becomes well-formed for RDF conversion: every masked identifier and every
//! masked literal turns into a plain reference node.
//!
//! Edits are applied in a fixed order: Skolem identifiers, then masked
//! identifiers, then masked literals. Only the masked-literal pass touches the
//! deanonymization map; it re-types the literal already recorded for the
//! placeholder's pseudonym with the placeholder's `@type`, so the identifier
//! passes never depend on it.

use serde_json::Value;
use zkld_core::keyword;
use zkld_core::{locate_mut, DeanonMap, DisclosureError, JsonPath, Pseudonym};

use crate::diff::MaskingEdits;

/// Apply `edits` to `disclosed` and fold masked-literal datatypes into
/// `deanon_map`.
///
/// Fails with [`DisclosureError::Path`] when an edit path does not resolve,
/// [`DisclosureError::InvalidDisclosure`] for a malformed placeholder, and
/// [`DisclosureError::MissingMapping`] when a placeholder's pseudonym was never
/// recorded.
pub fn apply_masking(
    disclosed: &mut Value,
    edits: &MaskingEdits,
    deanon_map: &mut DeanonMap,
) -> Result<(), DisclosureError> {
    for (path, iri) in edits.skolem_ids.iter().chain(&edits.masked_ids) {
        locate_mut(disclosed, path)?.set_id(iri.as_str());
    }

    for (path, iri) in &edits.masked_literals {
        let mut node = locate_mut(disclosed, path)?;
        let pseudonym = match node.value() {
            Some(Value::String(placeholder)) => Pseudonym::parse(placeholder).ok_or_else(|| {
                invalid(path, format!("\"{placeholder}\" is not a pseudonym placeholder"))
            })?,
            _ => return Err(invalid(path, "masked literal placeholder must be a string")),
        };
        let datatype = match node.literal_type() {
            None => None,
            Some(Value::String(t)) => Some(t.clone()),
            Some(other) => {
                return Err(invalid(
                    path,
                    format!("masked literal @type must be an IRI string, got {other}"),
                ))
            }
        };

        node.set_id(iri.as_str());
        node.remove(keyword::VALUE);
        node.remove(keyword::TYPE);
        node.remove(keyword::LANGUAGE);

        deanon_map.fold_datatype(&pseudonym, datatype.as_deref(), path)?;
    }

    tracing::debug!(edits = edits.len(), "applied masking edits");
    Ok(())
}

fn invalid(path: &JsonPath, reason: impl Into<String>) -> DisclosureError {
    DisclosureError::invalid(path, reason)
}

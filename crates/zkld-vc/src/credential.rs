//! # Credential proof splitting
//!
//! A signed credential is two RDF graphs: the document, and the proof graph
//! hanging off it. The engine wants them separately.
//!
//! In expanded form the proof is the object of the proof predicate, a graph
//! object whose `@graph` holds the proof nodes. In compact form it is the
//! `proof` member; its `proofValue` is detached and it inherits the
//! credential's `@context` so it can be expanded on its own.

use serde_json::{Map, Value};
use zkld_core::keyword;
use zkld_zkp::vocab::SEC_PROOF_VALUE;

use crate::error::PresentationError;

/// Compact member holding a credential's proof.
pub const PROOF: &str = "proof";
/// Compact member holding a proof's encoded value.
pub const PROOF_VALUE: &str = "proofValue";

/// An expanded credential split into document and proof trees.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitCredential {
    /// The credential without its proof predicate.
    pub document: Value,
    /// The nodes of the proof graph, as an expanded array.
    pub proof: Value,
}

/// Split an expanded credential on `predicate`.
pub fn split_proof(
    expanded: &Value,
    predicate: &str,
) -> Result<SplitCredential, PresentationError> {
    let mut document = match expanded {
        Value::Array(_) => expanded.clone(),
        other => Value::Array(vec![other.clone()]),
    };
    let mut proof = Vec::new();
    let mut found = false;

    if let Value::Array(nodes) = &mut document {
        for node in nodes.iter_mut().filter_map(Value::as_object_mut) {
            let Some(values) = node.remove(predicate) else {
                continue;
            };
            found = true;
            for value in into_items(values) {
                match value {
                    Value::Object(mut graph) if graph.contains_key(keyword::GRAPH) => {
                        if let Some(inner) = graph.remove(keyword::GRAPH) {
                            proof.extend(into_items(inner));
                        }
                    }
                    other => {
                        return Err(PresentationError::missing_proof(format!(
                            "`{predicate}` value is not a graph: {other}"
                        )))
                    }
                }
            }
        }
    }

    if !found || proof.is_empty() {
        return Err(PresentationError::missing_proof(format!(
            "no `{predicate}` graph on any top-level node"
        )));
    }
    Ok(SplitCredential {
        document,
        proof: Value::Array(proof),
    })
}

/// Remove the proof value from expanded proof nodes.
pub fn detach_proof_value(proof: &mut Value) -> Option<String> {
    let mut detached = None;
    for node in as_items_mut(proof).iter_mut().filter_map(Value::as_object_mut) {
        if let Some(values) = node.remove(SEC_PROOF_VALUE) {
            if detached.is_none() {
                detached = into_items(values).into_iter().find_map(|v| {
                    v.get(keyword::VALUE).and_then(Value::as_str).map(str::to_owned)
                });
            }
        }
    }
    detached
}

/// Write `proof_value` into the first proof node of an expanded credential.
pub fn attach_proof_value(
    expanded: &mut Value,
    predicate: &str,
    proof_value: &str,
) -> Result<(), PresentationError> {
    let nodes = match expanded {
        Value::Object(map) if map.contains_key(keyword::GRAPH) && !map.contains_key(predicate) => {
            map.get_mut(keyword::GRAPH)
        }
        other => Some(other),
    };
    let target = nodes
        .into_iter()
        .flat_map(|v| as_items_mut(v).iter_mut())
        .filter_map(Value::as_object_mut)
        .filter_map(|node| node.get_mut(predicate))
        .flat_map(|v| as_items_mut(v).iter_mut())
        .filter_map(|graph| graph.get_mut(keyword::GRAPH))
        .flat_map(|v| as_items_mut(v).iter_mut())
        .find_map(Value::as_object_mut)
        .ok_or_else(|| PresentationError::missing_proof(format!("no `{predicate}` node to sign")))?;

    let mut value = Map::new();
    value.insert(keyword::VALUE.to_string(), Value::String(proof_value.to_string()));
    target.insert(
        SEC_PROOF_VALUE.to_string(),
        Value::Array(vec![Value::Object(value)]),
    );
    Ok(())
}

/// A compact credential split into document, proof, and proof value.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactSplit {
    /// The credential without `proof`.
    pub document: Value,
    /// The proof object, carrying the credential's `@context`, without
    /// `proofValue`.
    pub proof: Value,
    /// The detached `proofValue`, if the credential was signed.
    pub proof_value: Option<String>,
}

/// Whether `vc` carries a compact `proof` object.
pub fn is_compact(vc: &Value) -> bool {
    vc.get(PROOF).is_some_and(Value::is_object)
}

/// Split a compact credential.
pub fn split_compact_proof(vc: &Value) -> Result<CompactSplit, PresentationError> {
    let mut document = vc
        .as_object()
        .cloned()
        .ok_or_else(|| PresentationError::missing_proof("credential is not an object"))?;
    let mut proof = match document.remove(PROOF) {
        Some(Value::Object(proof)) => proof,
        Some(_) => return Err(PresentationError::missing_proof("`proof` is not an object")),
        None => return Err(PresentationError::missing_proof("no `proof` member")),
    };
    let proof_value = match proof.remove(PROOF_VALUE) {
        None => None,
        Some(Value::String(v)) => Some(v),
        Some(_) => return Err(PresentationError::missing_proof("`proofValue` is not a string")),
    };
    if let Some(context) = document.get(keyword::CONTEXT) {
        proof.insert(keyword::CONTEXT.to_string(), context.clone());
    }
    Ok(CompactSplit {
        document: Value::Object(document),
        proof: Value::Object(proof),
        proof_value,
    })
}

fn into_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

fn as_items_mut(value: &mut Value) -> &mut [Value] {
    match value {
        Value::Array(items) => items,
        other => std::slice::from_mut(other),
    }
}

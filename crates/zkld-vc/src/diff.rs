//! # VC Differ
//!
//! Compares a skolemized, expanded original credential against the holder's
//! disclosed variant and works out what was hidden.
//!
//! The walk follows the disclosed tree. Every key the holder kept must exist
//! in the original, arrays are matched element by element, and anything
//! the holder dropped is simply never visited. At each node object the
//! identifiers are compared:
//!
//! | original `@id`        | disclosed `@id` | outcome                                          |
//! |-----------------------|-----------------|--------------------------------------------------|
//! | same as disclosed     | same            | nothing                                          |
//! | Skolem / blank        | absent          | inject the original identifier (node joined)     |
//! | IRI                   | absent          | fresh pseudonym for the IRI, masked-id edit      |
//! | Skolem / blank        | `_:p`           | `p` ↦ original blank node, skolem-id edit        |
//! | IRI                   | `_:p`           | `p` ↦ IRI, masked-id edit                        |
//! | anything else         |                 | [`DisclosureError::InvalidDisclosure`]           |
//!
//! A value object that differs from the original must carry a `_:p`
//! placeholder string as its `@value`; `p` is bound to the original literal
//! and a masked-literal edit is recorded. Edits are addressed by
//! [`JsonPath`] into the disclosed tree and applied later by
//! [`apply_masking`](crate::apply_masking).

use std::collections::BTreeMap;

use oxrdf::{NamedNode, Term};
use serde::Serialize;
use serde_json::{Map, Value};
use zkld_core::keyword;
use zkld_core::{
    value_object_literal, DeanonMap, DisclosureError, JsonPath, Pseudonym, SkolemRegistry,
    SkolemScope,
};

/// Path-addressed edits to apply to the disclosed tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaskingEdits {
    /// Skolem identifiers to write as `@id`, joining disclosed nodes to the
    /// original's anonymous nodes or to a pseudonym's blank node.
    pub skolem_ids: BTreeMap<JsonPath, String>,
    /// Identifiers standing in for masked IRIs.
    pub masked_ids: BTreeMap<JsonPath, String>,
    /// Identifiers replacing masked literal values.
    pub masked_literals: BTreeMap<JsonPath, String>,
}

impl MaskingEdits {
    /// Whether no edit was recorded.
    pub fn is_empty(&self) -> bool {
        self.skolem_ids.is_empty() && self.masked_ids.is_empty() && self.masked_literals.is_empty()
    }

    /// Total number of edits.
    pub fn len(&self) -> usize {
        self.skolem_ids.len() + self.masked_ids.len() + self.masked_literals.len()
    }
}

/// Result of comparing one credential pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VcDiff {
    /// Pseudonyms introduced by the holder, bound to what they hide.
    pub deanon_map: DeanonMap,
    /// Edits for the disclosed tree.
    pub edits: MaskingEdits,
}

impl VcDiff {
    /// Whether the disclosed tree hides nothing relative to the original.
    pub fn is_empty(&self) -> bool {
        self.deanon_map.is_empty() && self.edits.is_empty()
    }
}

/// Compare `original` (expanded and skolemized through `registry`) with
/// `disclosed` (expanded, untouched).
///
/// Identifiers issued for pseudonyms come from `registry`, so they are
/// distinct from every identifier of the original.
///
/// Arrays are matched by position: the disclosed tree may drop trailing
/// elements of a multi-valued property but not leading or middle ones. A
/// placeholder at index `i` hides the original's element `i`.
pub fn diff_vc(
    original: &Value,
    disclosed: &Value,
    registry: &mut SkolemRegistry,
) -> Result<VcDiff, DisclosureError> {
    let mut differ = Differ {
        scope: registry.scope(),
        deanon_map: DeanonMap::new(),
        edits: MaskingEdits::default(),
    };
    differ.walk(original, disclosed, &JsonPath::root())?;
    let Differ {
        deanon_map, edits, ..
    } = differ;
    tracing::debug!(
        pseudonyms = deanon_map.len(),
        edits = edits.len(),
        "diffed credential"
    );
    Ok(VcDiff { deanon_map, edits })
}

struct Differ<'r> {
    scope: SkolemScope<'r>,
    deanon_map: DeanonMap,
    edits: MaskingEdits,
}

impl Differ<'_> {
    fn walk(
        &mut self,
        original: &Value,
        disclosed: &Value,
        path: &JsonPath,
    ) -> Result<(), DisclosureError> {
        match (original, disclosed) {
            (Value::Array(orig), Value::Array(disc)) => {
                if disc.len() > orig.len() {
                    return Err(DisclosureError::invalid(
                        path,
                        format!(
                            "disclosed array has {} elements, original has {}",
                            disc.len(),
                            orig.len()
                        ),
                    ));
                }
                for (i, (o, d)) in orig.iter().zip(disc).enumerate() {
                    self.walk(o, d, &path.index(i))?;
                }
                Ok(())
            }
            (Value::Object(orig), Value::Object(disc)) => {
                if keyword::is_value_object(orig) || keyword::is_value_object(disc) {
                    self.literal(orig, disc, path)
                } else {
                    self.node(orig, disc, path)
                }
            }
            (o, d) if o == d => Ok(()),
            _ => Err(DisclosureError::invalid(path, "value differs from original")),
        }
    }

    fn node(
        &mut self,
        original: &Map<String, Value>,
        disclosed: &Map<String, Value>,
        path: &JsonPath,
    ) -> Result<(), DisclosureError> {
        self.identity(original, disclosed, path)?;

        for (key, disc) in disclosed {
            if key == keyword::ID {
                continue;
            }
            let child = path.key(key.as_str());
            let orig = original
                .get(key)
                .ok_or_else(|| DisclosureError::invalid(&child, "key absent from original"))?;
            if key == keyword::TYPE {
                check_types(orig, disc, &child)?;
                continue;
            }
            self.walk(orig, disc, &child)?;
        }
        Ok(())
    }

    fn identity(
        &mut self,
        original: &Map<String, Value>,
        disclosed: &Map<String, Value>,
        path: &JsonPath,
    ) -> Result<(), DisclosureError> {
        let orig_id = id_of(original, path)?;
        let disc_id = id_of(disclosed, path)?;

        match (orig_id, disc_id) {
            (_, Some(d)) if orig_id == Some(d) => Ok(()),
            (None, None) => Ok(()),
            (Some(o), None) => {
                if self.is_anonymous(o) {
                    tracing::trace!(%path, "joined anonymous node");
                    self.edits.skolem_ids.insert(path.clone(), o.to_string());
                } else {
                    let label = self.scope.fresh_label();
                    let pseudonym = Pseudonym::new(label.as_str()).ok_or_else(|| {
                        DisclosureError::invalid(path, format!("invalid pseudonym label `{label}`"))
                    })?;
                    let iri = self.scope.iri_for(pseudonym.label())?;
                    tracing::trace!(%path, %pseudonym, "implicit pseudonym for omitted identifier");
                    self.deanon_map.insert_checked(pseudonym, named(o, path)?)?;
                    self.edits.masked_ids.insert(path.clone(), iri);
                }
                Ok(())
            }
            (Some(o), Some(d)) => {
                let pseudonym = Pseudonym::parse(d).ok_or_else(|| {
                    DisclosureError::invalid(path, format!("@id `{d}` differs from original"))
                })?;
                let iri = self.scope.iri_for(pseudonym.label())?;
                if let Some(node) = self.original_blank(o) {
                    tracing::trace!(%path, %pseudonym, "anonymized blank node");
                    self.deanon_map.insert_checked(pseudonym, Term::BlankNode(node))?;
                    self.edits.skolem_ids.insert(path.clone(), iri);
                } else {
                    tracing::trace!(%path, %pseudonym, "masked identifier");
                    self.deanon_map.insert_checked(pseudonym, named(o, path)?)?;
                    self.edits.masked_ids.insert(path.clone(), iri);
                }
                Ok(())
            }
            (None, Some(d)) => Err(DisclosureError::invalid(
                path,
                format!("@id `{d}` given for a node the original does not identify"),
            )),
        }
    }

    fn literal(
        &mut self,
        original: &Map<String, Value>,
        disclosed: &Map<String, Value>,
        path: &JsonPath,
    ) -> Result<(), DisclosureError> {
        if original == disclosed {
            return Ok(());
        }
        if !keyword::is_value_object(original) {
            return Err(DisclosureError::invalid(path, "original is not a literal"));
        }
        if !keyword::is_value_object(disclosed) {
            return Err(DisclosureError::invalid(path, "disclosed node replaces a literal"));
        }

        let placeholder = match disclosed.get(keyword::VALUE) {
            Some(Value::String(s)) => s,
            _ => {
                return Err(DisclosureError::invalid(
                    path,
                    "masked literal placeholder must be a string",
                ))
            }
        };
        let pseudonym = Pseudonym::parse(placeholder).ok_or_else(|| {
            DisclosureError::invalid(
                path,
                format!("value \"{placeholder}\" differs from original and is not a pseudonym"),
            )
        })?;
        match disclosed.get(keyword::TYPE) {
            None | Some(Value::String(_)) => {}
            Some(other) => {
                return Err(DisclosureError::invalid(
                    path,
                    format!("masked literal @type must be an IRI string, got {other}"),
                ))
            }
        }

        let literal = value_object_literal(original)
            .map_err(|e| DisclosureError::invalid(path, format!("original literal: {e}")))?;
        let iri = self.scope.iri_for(pseudonym.label())?;
        tracing::trace!(%path, %pseudonym, "masked literal");
        self.deanon_map.insert_checked(pseudonym, literal.into())?;
        self.edits.masked_literals.insert(path.clone(), iri);
        Ok(())
    }

    fn is_anonymous(&self, id: &str) -> bool {
        self.scope.registry().is_issued(id) || keyword::is_blank(id)
    }

    /// The blank node an original identifier denotes, if it is anonymous.
    fn original_blank(&self, id: &str) -> Option<oxrdf::BlankNode> {
        if let Some(node) = self.scope.registry().label_of(id) {
            return Some(node.clone());
        }
        keyword::blank_label(id).and_then(|label| oxrdf::BlankNode::new(label).ok())
    }
}

fn id_of<'a>(
    node: &'a Map<String, Value>,
    path: &JsonPath,
) -> Result<Option<&'a str>, DisclosureError> {
    match node.get(keyword::ID) {
        None => Ok(None),
        Some(Value::String(id)) => Ok(Some(id)),
        Some(other) => Err(DisclosureError::invalid(
            path,
            format!("@id must be a string, got {other}"),
        )),
    }
}

fn named(iri: &str, path: &JsonPath) -> Result<Term, DisclosureError> {
    NamedNode::new(iri).map(Term::from).map_err(|e| {
        DisclosureError::invalid(path, format!("original @id `{iri}` is not an IRI: {e}"))
    })
}

/// Disclosed types must be a subset of the original's.
fn check_types(
    original: &Value,
    disclosed: &Value,
    path: &JsonPath,
) -> Result<(), DisclosureError> {
    let as_list = |v: &Value| -> Vec<Value> {
        match v {
            Value::Array(items) => items.clone(),
            other => vec![other.clone()],
        }
    };
    let known = as_list(original);
    match as_list(disclosed).into_iter().find(|t| !known.contains(t)) {
        Some(extra) => Err(DisclosureError::invalid(
            path,
            format!("type {extra} is not asserted by the original"),
        )),
        None => Ok(()),
    }
}

//! # Deanonymization map
//!
//! A [`DeanonMap`] records, for every pseudonym a holder introduced while
//! redacting a credential, the concrete RDF term it hides: an IRI for a
//! masked identifier, a literal for a masked value, or a blank node for an
//! anonymous node that was renamed. The proof engine needs this map to relate
//! the disclosed statements back to the signed ones.
//!
//! ## Invariant
//!
//! A pseudonym never denotes two different terms within one presentation.
//! Every insertion goes through [`DeanonMap::insert_checked`], which accepts
//! an identical re-binding and rejects a differing one with
//! [`DisclosureError::Conflict`]. Merging two maps therefore succeeds exactly
//! when they agree on their shared keys.
//!
//! ## Wire format
//!
//! The proof engine consumes the map as strings: the key is `_:label`, the
//! value is the N-Triples form of the term (`<iri>`, `_:b0`, `"lit"`,
//! `"lit"@en`, `"42"^^<http://www.w3.org/2001/XMLSchema#integer>`).
//! [`DeanonMap::to_string_map`] and the `Serialize` impl produce that form.

use std::collections::BTreeMap;
use std::fmt;

use oxrdf::vocab::xsd;
use oxrdf::{BlankNode, Literal, NamedNode, Term};
use serde::{Serialize, Serializer};

use crate::error::DisclosureError;
use crate::keyword;
use crate::path::JsonPath;

/// A holder-chosen blank-node label standing in for a hidden term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pseudonym(String);

impl Pseudonym {
    /// A pseudonym from a bare label (`age`, not `_:age`).
    pub fn new(label: impl Into<String>) -> Option<Self> {
        let label = label.into();
        BlankNode::new(label.as_str()).ok()?;
        Some(Self(label))
    }

    /// Parse a `_:label` placeholder.
    pub fn parse(placeholder: &str) -> Option<Self> {
        let label = keyword::blank_label(placeholder)?;
        BlankNode::new(label).ok()?;
        Some(Self(label.to_string()))
    }

    /// The bare label.
    pub fn label(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pseudonym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", keyword::BLANK_NODE_PREFIX, self.0)
    }
}

/// Mapping from pseudonym to the concrete term it hides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeanonMap(BTreeMap<Pseudonym, Term>);

impl DeanonMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no bindings.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The term bound to `pseudonym`.
    pub fn get(&self, pseudonym: &Pseudonym) -> Option<&Term> {
        self.0.get(pseudonym)
    }

    /// Iterate bindings in pseudonym order.
    pub fn iter(&self) -> impl Iterator<Item = (&Pseudonym, &Term)> {
        self.0.iter()
    }

    /// Bind `pseudonym` to `term`.
    ///
    /// Re-binding to an equal term is a no-op; binding to a different term
    /// fails with [`DisclosureError::Conflict`] and leaves the map unchanged.
    pub fn insert_checked(
        &mut self,
        pseudonym: Pseudonym,
        term: Term,
    ) -> Result<(), DisclosureError> {
        match self.0.get(&pseudonym) {
            Some(existing) if *existing == term => Ok(()),
            Some(existing) => Err(conflict(&pseudonym, existing, &term)),
            None => {
                self.0.insert(pseudonym, term);
                Ok(())
            }
        }
    }

    /// Fold every binding of `other` into this map.
    pub fn merge(&mut self, other: &DeanonMap) -> Result<(), DisclosureError> {
        for (pseudonym, term) in other.iter() {
            self.insert_checked(pseudonym.clone(), term.clone())?;
        }
        Ok(())
    }

    /// Re-type the literal bound to `pseudonym` with the `@type` of the
    /// placeholder at `path`.
    ///
    /// The recorded lexical form is kept. With `Some(datatype)` the literal
    /// becomes `"lex"^^<datatype>`; with `None` it is left as recorded. A
    /// language-tagged literal cannot take a datatype. A literal that already
    /// carries a datatype other than `xsd:string` keeps it, and a different
    /// requested datatype is a [`DisclosureError::Conflict`].
    pub fn fold_datatype(
        &mut self,
        pseudonym: &Pseudonym,
        datatype: Option<&str>,
        path: &JsonPath,
    ) -> Result<(), DisclosureError> {
        let term = self
            .0
            .get_mut(pseudonym)
            .ok_or_else(|| DisclosureError::MissingMapping {
                pseudonym: pseudonym.to_string(),
            })?;
        let Some(datatype) = datatype else {
            return Ok(());
        };
        let datatype = NamedNode::new(datatype).map_err(|e| {
            DisclosureError::invalid(
                path,
                format!("invalid datatype IRI \"{datatype}\" for `{pseudonym}`: {e}"),
            )
        })?;
        let literal = match term {
            Term::Literal(literal) => literal,
            other => {
                return Err(DisclosureError::invalid(
                    path,
                    format!("`{pseudonym}` is bound to non-literal {other}, cannot apply datatype"),
                ))
            }
        };
        if let Some(language) = literal.language() {
            return Err(DisclosureError::invalid(
                path,
                format!("`{pseudonym}` hides a literal tagged @{language}, cannot apply datatype"),
            ));
        }
        if literal.datatype() == datatype.as_ref() {
            return Ok(());
        }
        let retyped = Literal::new_typed_literal(literal.value(), datatype);
        if literal.datatype() != xsd::STRING {
            let existing = Term::from(literal.clone());
            return Err(conflict(pseudonym, &existing, &Term::from(retyped)));
        }
        *term = retyped.into();
        Ok(())
    }

    /// The string form consumed by the proof engine.
    pub fn to_string_map(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

fn conflict(pseudonym: &Pseudonym, existing: &Term, incoming: &Term) -> DisclosureError {
    DisclosureError::Conflict {
        pseudonym: pseudonym.to_string(),
        existing: existing.to_string(),
        incoming: incoming.to_string(),
    }
}

impl Serialize for DeanonMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }
}

impl<'a> IntoIterator for &'a DeanonMap {
    type Item = (&'a Pseudonym, &'a Term);
    type IntoIter = std::collections::btree_map::Iter<'a, Pseudonym, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn binding() -> impl Strategy<Value = (String, String)> {
        ("[a-d]", "[a-d]")
    }

    proptest! {
        /// Merging succeeds exactly when the two maps agree on every shared key.
        #[test]
        fn merge_succeeds_iff_maps_agree(
            left in prop::collection::vec(binding(), 0..6),
            right in prop::collection::vec(binding(), 0..6),
        ) {
            let build = |pairs: &[(String, String)]| {
                let mut map = BTreeMap::new();
                for (k, v) in pairs {
                    map.entry(k.clone()).or_insert_with(|| v.clone());
                }
                map
            };
            let l = build(&left);
            let r = build(&right);
            let agree = l.iter().all(|(k, v)| r.get(k).map_or(true, |w| w == v));

            let to_map = |m: &BTreeMap<String, String>| {
                let mut out = DeanonMap::new();
                for (k, v) in m {
                    let term: Term = Literal::new_simple_literal(v.as_str()).into();
                    out.insert_checked(Pseudonym::new(k.as_str()).unwrap(), term).unwrap();
                }
                out
            };
            let mut merged = to_map(&l);
            prop_assert_eq!(merged.merge(&to_map(&r)).is_ok(), agree);
        }
    }
}

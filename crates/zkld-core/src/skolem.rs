//! # Skolemization
//!
//! Blank-node labels assigned by JSON-LD expansion are not stable across two
//! independently expanded documents, so an anonymous node in the original
//! credential cannot be matched to its counterpart in the disclosed one by
//! label. Before diffing, every blank node is replaced by a Skolem
//! identifier, an IRI that is unique for the whole operation. After RDF
//! conversion the Skolem identifiers are turned back into blank nodes.
//!
//! A [`SkolemRegistry`] is the bijection for one operation (one presentation
//! derivation). It hands out IRIs of the form `{prefix}{batch}:{n}`, where
//! `batch` is a random UUID drawn when the registry is created and `n` is a
//! counter, and remembers which blank node each IRI stands for.
//!
//! Within one tree, every occurrence of a label maps to the same IRI; a
//! [`SkolemScope`] holds that per-tree label table. Separate scopes (separate
//! trees) always receive distinct IRIs, even for equal labels, so two
//! credentials that both contain `_:b0` never have their anonymous nodes
//! merged during RDF conversion.

use std::collections::HashMap;

use oxrdf::{BlankNode, GraphName, NamedNode, Quad, Subject, Term};
use serde_json::Value;
use uuid::Uuid;

use crate::error::SkolemError;
use crate::keyword;

/// Default IRI prefix for issued Skolem identifiers.
pub const DEFAULT_SKOLEM_PREFIX: &str = "urn:bnid:";

/// Operation-scoped allocator and reverse index of Skolem identifiers.
#[derive(Debug)]
pub struct SkolemRegistry {
    prefix: String,
    batch: String,
    next_iri: u64,
    next_label: u64,
    issued: HashMap<String, BlankNode>,
}

impl Default for SkolemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SkolemRegistry {
    /// A registry issuing IRIs under [`DEFAULT_SKOLEM_PREFIX`].
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_SKOLEM_PREFIX)
    }

    /// A registry issuing IRIs under `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            batch: Uuid::new_v4().simple().to_string(),
            next_iri: 0,
            next_label: 0,
            issued: HashMap::new(),
        }
    }

    /// The IRI prefix of issued identifiers.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of identifiers issued so far.
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    /// Whether no identifier has been issued.
    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }

    /// Issue a fresh Skolem identifier standing for the blank node `label`
    /// (given without the `_:` prefix).
    pub fn issue(&mut self, label: &str) -> Result<String, SkolemError> {
        let node = BlankNode::new(label).map_err(|e| SkolemError::InvalidLabel {
            label: label.to_string(),
            reason: e.to_string(),
        })?;
        let iri = self.next_iri()?;
        self.issued.insert(iri.clone(), node);
        Ok(iri)
    }

    /// Generate a blank-node label that is unique within this registry.
    pub fn fresh_label(&mut self) -> String {
        let label = format!("sk{}n{}", &self.batch[..8], self.next_label);
        self.next_label += 1;
        label
    }

    /// The blank node an issued identifier stands for.
    pub fn label_of(&self, iri: &str) -> Option<&BlankNode> {
        self.issued.get(iri)
    }

    /// Whether `iri` was issued by this registry.
    pub fn is_issued(&self, iri: &str) -> bool {
        self.issued.contains_key(iri)
    }

    /// Open a per-tree label scope.
    pub fn scope(&mut self) -> SkolemScope<'_> {
        SkolemScope {
            registry: self,
            labels: HashMap::new(),
        }
    }

    /// Replace every blank-node `@id` in `tree` with a Skolem identifier.
    ///
    /// With `assign_omitted_ids`, node objects that have no `@id` at all also
    /// receive one, under a generated label. Value objects and list/set
    /// containers are never given an identifier. Returns the number of
    /// identifiers written into the tree.
    pub fn skolemize(
        &mut self,
        tree: &mut Value,
        assign_omitted_ids: bool,
    ) -> Result<usize, SkolemError> {
        let mut scope = self.scope();
        let mut written = 0;
        skolemize_value(&mut scope, tree, assign_omitted_ids, &mut written)?;
        tracing::debug!(identifiers = written, "skolemized document tree");
        Ok(written)
    }

    /// Replace every issued Skolem identifier in `quads` by the blank node
    /// it stands for. IRIs this registry did not issue pass through unchanged.
    pub fn deskolemize(&self, quads: &[Quad]) -> Vec<Quad> {
        quads
            .iter()
            .map(|quad| Quad {
                subject: self.deskolemize_subject(&quad.subject),
                predicate: quad.predicate.clone(),
                object: self.deskolemize_term(&quad.object),
                graph_name: self.deskolemize_graph(&quad.graph_name),
            })
            .collect()
    }

    fn deskolemize_subject(&self, subject: &Subject) -> Subject {
        match subject {
            Subject::NamedNode(n) => match self.label_of(n.as_str()) {
                Some(b) => b.clone().into(),
                None => subject.clone(),
            },
            _ => subject.clone(),
        }
    }

    fn deskolemize_term(&self, term: &Term) -> Term {
        match term {
            Term::NamedNode(n) => match self.label_of(n.as_str()) {
                Some(b) => b.clone().into(),
                None => term.clone(),
            },
            _ => term.clone(),
        }
    }

    fn deskolemize_graph(&self, graph: &GraphName) -> GraphName {
        match graph {
            GraphName::NamedNode(n) => match self.label_of(n.as_str()) {
                Some(b) => b.clone().into(),
                None => graph.clone(),
            },
            _ => graph.clone(),
        }
    }

    fn next_iri(&mut self) -> Result<String, SkolemError> {
        let iri = format!("{}{}:{}", self.prefix, self.batch, self.next_iri);
        NamedNode::new(iri.as_str()).map_err(|e| SkolemError::InvalidIri {
            iri: iri.clone(),
            reason: e.to_string(),
        })?;
        self.next_iri += 1;
        Ok(iri)
    }
}

/// Per-tree view of a [`SkolemRegistry`]: the same label always yields the
/// same identifier within one scope.
#[derive(Debug)]
pub struct SkolemScope<'r> {
    registry: &'r mut SkolemRegistry,
    labels: HashMap<String, String>,
}

impl SkolemScope<'_> {
    /// The identifier for `label` in this scope, issuing one on first use.
    pub fn iri_for(&mut self, label: &str) -> Result<String, SkolemError> {
        if let Some(iri) = self.labels.get(label) {
            return Ok(iri.clone());
        }
        let iri = self.registry.issue(label)?;
        self.labels.insert(label.to_string(), iri.clone());
        Ok(iri)
    }

    /// Issue an identifier for a node that had no label.
    pub fn anonymous(&mut self) -> Result<String, SkolemError> {
        let label = self.registry.fresh_label();
        self.iri_for(&label)
    }

    /// Generate a fresh label without issuing an identifier for it.
    pub fn fresh_label(&mut self) -> String {
        self.registry.fresh_label()
    }

    /// The underlying registry.
    pub fn registry(&self) -> &SkolemRegistry {
        self.registry
    }
}

fn skolemize_value(
    scope: &mut SkolemScope<'_>,
    value: &mut Value,
    assign_omitted_ids: bool,
    written: &mut usize,
) -> Result<(), SkolemError> {
    match value {
        Value::Array(items) => {
            for item in items {
                skolemize_value(scope, item, assign_omitted_ids, written)?;
            }
        }
        Value::Object(map) => {
            if keyword::is_value_object(map) {
                return Ok(());
            }

            let blank = map
                .get(keyword::ID)
                .and_then(Value::as_str)
                .and_then(keyword::blank_label)
                .map(str::to_owned);
            if let Some(label) = blank {
                let iri = scope.iri_for(&label)?;
                map.insert(keyword::ID.to_string(), Value::String(iri));
                *written += 1;
            } else if assign_omitted_ids
                && !map.contains_key(keyword::ID)
                && keyword::is_node_object(map)
            {
                let iri = scope.anonymous()?;
                map.insert(keyword::ID.to_string(), Value::String(iri));
                *written += 1;
            }

            for (key, child) in map.iter_mut() {
                if key == keyword::ID || key == keyword::TYPE || key == keyword::CONTEXT {
                    continue;
                }
                skolemize_value(scope, child, assign_omitted_ids, written)?;
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KNOWS: &str = "http://xmlns.com/foaf/0.1/knows";
    const NAME: &str = "http://xmlns.com/foaf/0.1/name";

    #[test]
    fn issued_iris_use_prefix_and_are_unique() {
        let mut reg = SkolemRegistry::new();
        let a = reg.issue("b0").unwrap();
        let b = reg.issue("b0").unwrap();
        assert!(a.starts_with(DEFAULT_SKOLEM_PREFIX));
        assert_ne!(a, b);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.label_of(&a).unwrap().as_str(), "b0");
        assert_eq!(reg.label_of(&b).unwrap().as_str(), "b0");
    }

    #[test]
    fn rejects_invalid_label() {
        let mut reg = SkolemRegistry::new();
        assert!(matches!(
            reg.issue("not a label"),
            Err(SkolemError::InvalidLabel { .. })
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn rejects_prefix_that_is_not_an_iri() {
        let mut reg = SkolemRegistry::with_prefix("no scheme ");
        assert!(matches!(reg.issue("b0"), Err(SkolemError::InvalidIri { .. })));
    }

    #[test]
    fn scope_is_consistent_within_a_tree() {
        let mut reg = SkolemRegistry::new();
        let mut scope = reg.scope();
        let first = scope.iri_for("b0").unwrap();
        let again = scope.iri_for("b0").unwrap();
        let other = scope.iri_for("b1").unwrap();
        assert_eq!(first, again);
        assert_ne!(first, other);
    }

    #[test]
    fn skolemize_joins_repeated_references() {
        let mut tree = json!([
            {"@id": "_:alice", KNOWS: [{"@id": "_:bob"}]},
            {"@id": "_:bob", KNOWS: [{"@id": "_:alice"}]}
        ]);
        let mut reg = SkolemRegistry::new();
        let written = reg.skolemize(&mut tree, false).unwrap();
        assert_eq!(written, 4);

        let alice = tree[0]["@id"].as_str().unwrap().to_string();
        let bob = tree[1]["@id"].as_str().unwrap().to_string();
        assert!(reg.is_issued(&alice));
        assert_eq!(tree[0][KNOWS][0]["@id"], json!(bob));
        assert_eq!(tree[1][KNOWS][0]["@id"], json!(alice));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn separate_trees_never_share_identifiers() {
        let mut reg = SkolemRegistry::new();
        let mut t1 = json!([{"@id": "_:b0"}]);
        let mut t2 = json!([{"@id": "_:b0"}]);
        reg.skolemize(&mut t1, false).unwrap();
        reg.skolemize(&mut t2, false).unwrap();
        assert_ne!(t1[0]["@id"], t2[0]["@id"]);
    }

    #[test]
    fn concrete_iris_and_values_are_untouched() {
        let mut tree = json!([{
            "@id": "did:example:alice",
            NAME: [{"@value": "_:not-a-node"}],
            "@type": ["_:b9"]
        }]);
        let before = tree.clone();
        let mut reg = SkolemRegistry::new();
        assert_eq!(reg.skolemize(&mut tree, false).unwrap(), 0);
        assert_eq!(tree, before);
    }

    #[test]
    fn assigns_identifiers_to_anonymous_nodes() {
        let mut tree = json!([{
            "@id": "did:example:alice",
            KNOWS: [{NAME: [{"@value": "Bob"}]}],
            "http://example.org/list": [{"@list": [{"@value": 1}]}]
        }]);
        let mut reg = SkolemRegistry::new();
        assert_eq!(reg.skolemize(&mut tree, true).unwrap(), 1);
        let bob = tree[0][KNOWS][0]["@id"].as_str().unwrap();
        assert!(reg.is_issued(bob));
        assert!(tree[0]["http://example.org/list"][0].get("@id").is_none());
        assert!(tree[0][KNOWS][0][NAME][0].get("@id").is_none());
    }

    #[test]
    fn deskolemize_restores_labels_and_passes_unknown_iris() {
        let mut reg = SkolemRegistry::new();
        let s = reg.issue("alice").unwrap();
        let g = reg.issue("g0").unwrap();
        let stranger = format!("{DEFAULT_SKOLEM_PREFIX}foreign:1");

        let quads = vec![
            Quad::new(
                NamedNode::new(s.as_str()).unwrap(),
                NamedNode::new(KNOWS).unwrap(),
                NamedNode::new(stranger.as_str()).unwrap(),
                NamedNode::new(g.as_str()).unwrap(),
            ),
            Quad::new(
                NamedNode::new("did:example:bob").unwrap(),
                NamedNode::new(KNOWS).unwrap(),
                NamedNode::new(s.as_str()).unwrap(),
                GraphName::DefaultGraph,
            ),
        ];
        let out = reg.deskolemize(&quads);

        let alice = BlankNode::new("alice").unwrap();
        assert_eq!(out[0].subject, Subject::from(alice.clone()));
        assert_eq!(
            out[0].object,
            Term::from(NamedNode::new(stranger.as_str()).unwrap())
        );
        assert_eq!(
            out[0].graph_name,
            GraphName::from(BlankNode::new("g0").unwrap())
        );
        assert_eq!(
            out[1].subject,
            Subject::from(NamedNode::new("did:example:bob").unwrap())
        );
        assert_eq!(out[1].object, Term::from(alice));
        assert_eq!(out[1].graph_name, GraphName::DefaultGraph);
    }

    #[test]
    fn fresh_labels_are_valid_and_distinct() {
        let mut reg = SkolemRegistry::new();
        let a = reg.fresh_label();
        let b = reg.fresh_label();
        assert_ne!(a, b);
        assert!(BlankNode::new(a.as_str()).is_ok());
    }
}

//! # JSON-LD processor seam
//!
//! The transform never implements JSON-LD expansion or RDF conversion
//! itself. It talks to a [`JsonLdProcessor`], which a deployment backs with a
//! real processor (context loading, compaction, URDNA-style RDF algorithms).
//!
//! With the `mock` feature (enabled by default) this module also provides
//! [`PreExpandedProcessor`], a processor for documents that are already
//! written in expanded form with absolute IRIs. It does no context
//! processing at all; it exists so the transform can be exercised end to end
//! without network access or a context cache.

use oxrdf::vocab::xsd;
use oxrdf::Literal;
use serde_json::{Map, Value};

use crate::error::ProcessorError;
use crate::keyword;

/// JSON-LD expansion and RDF conversion.
///
/// Implementations must be deterministic for a given document and context
/// set, and must map an `@id` of the form `_:label` to a blank node and any
/// other `@id` to an IRI.
pub trait JsonLdProcessor: Send + Sync {
    /// Expand a compact document to an expanded tree (a top-level array of
    /// node objects).
    fn expand(&self, document: &Value) -> Result<Value, ProcessorError>;

    /// Convert an expanded tree to quads.
    fn to_rdf(&self, expanded: &Value) -> Result<Vec<oxrdf::Quad>, ProcessorError>;

    /// Convert quads back to a document framed by `context`.
    fn from_rdf(&self, quads: &[oxrdf::Quad], context: &Value) -> Result<Value, ProcessorError>;
}

/// The RDF literal an expanded value object denotes.
///
/// Strings take `@language` or `@type` when present. Native numbers map to
/// `xsd:integer` (whole numbers) or `xsd:double` in canonical `1.0E2` form,
/// and booleans to `xsd:boolean`, unless `@type` overrides the datatype.
pub fn value_object_literal(obj: &Map<String, Value>) -> Result<Literal, ProcessorError> {
    let datatype = match obj.get(keyword::TYPE) {
        None => None,
        Some(Value::String(t)) => Some(
            oxrdf::NamedNode::new(t.as_str())
                .map_err(|e| ProcessorError::ToRdf(format!("invalid datatype \"{t}\": {e}")))?,
        ),
        Some(other) => {
            return Err(ProcessorError::ToRdf(format!(
                "value object @type must be a string, got {other}"
            )))
        }
    };
    let language = obj.get(keyword::LANGUAGE).and_then(Value::as_str);

    let (lexical, native) = match obj.get(keyword::VALUE) {
        Some(Value::String(s)) => {
            if let Some(lang) = language {
                return Literal::new_language_tagged_literal(s.as_str(), lang).map_err(|e| {
                    ProcessorError::ToRdf(format!("invalid language tag \"{lang}\": {e}"))
                });
            }
            (s.clone(), None)
        }
        Some(Value::Number(n)) => {
            if n.is_i64() || n.is_u64() {
                (n.to_string(), Some(xsd::INTEGER))
            } else {
                let f = n.as_f64().unwrap_or_default();
                (canonical_double(f), Some(xsd::DOUBLE))
            }
        }
        Some(Value::Bool(b)) => (b.to_string(), Some(xsd::BOOLEAN)),
        Some(other) => {
            return Err(ProcessorError::ToRdf(format!(
                "unsupported @value {other}"
            )))
        }
        None => return Err(ProcessorError::ToRdf("object has no @value".to_string())),
    };

    Ok(match (datatype, native) {
        (Some(dt), _) => Literal::new_typed_literal(lexical, dt),
        (None, Some(dt)) => Literal::new_typed_literal(lexical, dt),
        (None, None) => Literal::new_simple_literal(lexical),
    })
}

/// `xsd:double` canonical lexical form: the mantissa always has a fraction.
fn canonical_double(f: f64) -> String {
    let rendered = format!("{f:E}");
    match rendered.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{mantissa}.0E{exponent}")
        }
        _ => rendered,
    }
}

#[cfg(feature = "mock")]
pub use mock::PreExpandedProcessor;

#[cfg(feature = "mock")]
mod mock {
    use std::collections::HashMap;

    use oxrdf::vocab::{rdf, xsd};
    use oxrdf::{BlankNode, GraphName, NamedNode, Quad, Subject, Term};
    use serde_json::{Map, Value};

    use super::{value_object_literal, JsonLdProcessor};
    use crate::error::ProcessorError;
    use crate::keyword;

    /// Processor for documents already in expanded form.
    ///
    /// `expand` only strips `@context` and normalizes the top level to an
    /// array. Lists are not supported by `to_rdf`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PreExpandedProcessor;

    impl JsonLdProcessor for PreExpandedProcessor {
        fn expand(&self, document: &Value) -> Result<Value, ProcessorError> {
            let mut doc = document.clone();
            if let Value::Object(map) = &mut doc {
                map.remove(keyword::CONTEXT);
                if map.len() == 1 {
                    if let Some(graph) = map.remove(keyword::GRAPH) {
                        doc = graph;
                    }
                }
            }
            match doc {
                Value::Array(_) => Ok(doc),
                Value::Object(_) => Ok(Value::Array(vec![doc])),
                other => Err(ProcessorError::Expansion(format!(
                    "expected an object or array, got {other}"
                ))),
            }
        }

        fn to_rdf(&self, expanded: &Value) -> Result<Vec<Quad>, ProcessorError> {
            let mut out = Vec::new();
            for item in as_items(expanded) {
                let obj = expect_object(item)?;
                if is_bare_graph(obj) {
                    for inner in as_items(obj.get(keyword::GRAPH).unwrap_or(&Value::Null)) {
                        node_to_rdf(expect_object(inner)?, &GraphName::DefaultGraph, &mut out)?;
                    }
                } else {
                    node_to_rdf(obj, &GraphName::DefaultGraph, &mut out)?;
                }
            }
            Ok(out)
        }

        fn from_rdf(&self, quads: &[Quad], context: &Value) -> Result<Value, ProcessorError> {
            let mut default = NodeTable::default();
            let mut named: Vec<(String, NodeTable)> = Vec::new();
            let mut named_index: HashMap<String, usize> = HashMap::new();

            for quad in quads {
                let table = match &quad.graph_name {
                    GraphName::DefaultGraph => &mut default,
                    GraphName::NamedNode(n) => {
                        graph_table(&mut named, &mut named_index, n.as_str().to_string())
                    }
                    GraphName::BlankNode(b) => {
                        graph_table(&mut named, &mut named_index, blank_id(b))
                    }
                };
                let subject = match &quad.subject {
                    Subject::NamedNode(n) => n.as_str().to_string(),
                    Subject::BlankNode(b) => blank_id(b),
                    #[allow(unreachable_patterns)]
                    _ => {
                        return Err(ProcessorError::FromRdf(
                            "quoted triples are not supported".to_string(),
                        ))
                    }
                };
                let node = table.node(&subject);

                if quad.predicate.as_ref() == rdf::TYPE {
                    let ty = match &quad.object {
                        Term::NamedNode(n) => Some(n.as_str().to_string()),
                        Term::BlankNode(b) => Some(blank_id(b)),
                        _ => None,
                    };
                    if let Some(ty) = ty {
                        push_value(node, keyword::TYPE, Value::String(ty));
                        continue;
                    }
                }
                let value = term_to_json(&quad.object)?;
                push_value(node, quad.predicate.as_str(), value);
            }

            for (graph_id, table) in named {
                let holder = default.node(&graph_id);
                holder.insert(keyword::GRAPH.to_string(), table.into_value());
            }

            let mut doc = Map::new();
            if !context.is_null() {
                doc.insert(keyword::CONTEXT.to_string(), context.clone());
            }
            doc.insert(keyword::GRAPH.to_string(), default.into_value());
            Ok(Value::Object(doc))
        }
    }

    /// Node objects of one graph, in first-seen order.
    #[derive(Default)]
    struct NodeTable {
        nodes: Vec<Map<String, Value>>,
        index: HashMap<String, usize>,
    }

    impl NodeTable {
        fn node(&mut self, id: &str) -> &mut Map<String, Value> {
            let slot = match self.index.get(id) {
                Some(&i) => i,
                None => {
                    let mut map = Map::new();
                    map.insert(keyword::ID.to_string(), Value::String(id.to_string()));
                    self.nodes.push(map);
                    self.index.insert(id.to_string(), self.nodes.len() - 1);
                    self.nodes.len() - 1
                }
            };
            &mut self.nodes[slot]
        }

        fn into_value(self) -> Value {
            Value::Array(self.nodes.into_iter().map(Value::Object).collect())
        }
    }

    fn graph_table<'t>(
        named: &'t mut Vec<(String, NodeTable)>,
        index: &mut HashMap<String, usize>,
        id: String,
    ) -> &'t mut NodeTable {
        let slot = match index.get(&id) {
            Some(&i) => i,
            None => {
                named.push((id.clone(), NodeTable::default()));
                index.insert(id, named.len() - 1);
                named.len() - 1
            }
        };
        &mut named[slot].1
    }

    fn push_value(node: &mut Map<String, Value>, key: &str, value: Value) {
        match node.get_mut(key) {
            Some(Value::Array(items)) => items.push(value),
            _ => {
                node.insert(key.to_string(), Value::Array(vec![value]));
            }
        }
    }

    fn blank_id(b: &BlankNode) -> String {
        format!("{}{}", keyword::BLANK_NODE_PREFIX, b.as_str())
    }

    fn term_to_json(term: &Term) -> Result<Value, ProcessorError> {
        let mut obj = Map::new();
        match term {
            Term::NamedNode(n) => {
                obj.insert(keyword::ID.to_string(), Value::String(n.as_str().to_string()));
            }
            Term::BlankNode(b) => {
                obj.insert(keyword::ID.to_string(), Value::String(blank_id(b)));
            }
            Term::Literal(l) => {
                obj.insert(keyword::VALUE.to_string(), Value::String(l.value().to_string()));
                if let Some(lang) = l.language() {
                    obj.insert(keyword::LANGUAGE.to_string(), Value::String(lang.to_string()));
                } else if l.datatype() != xsd::STRING {
                    obj.insert(
                        keyword::TYPE.to_string(),
                        Value::String(l.datatype().as_str().to_string()),
                    );
                }
            }
            #[allow(unreachable_patterns)]
            _ => {
                return Err(ProcessorError::FromRdf(
                    "quoted triples are not supported".to_string(),
                ))
            }
        }
        Ok(Value::Object(obj))
    }

    fn as_items(value: &Value) -> &[Value] {
        match value {
            Value::Array(items) => items,
            other => std::slice::from_ref(other),
        }
    }

    fn expect_object(value: &Value) -> Result<&Map<String, Value>, ProcessorError> {
        value
            .as_object()
            .ok_or_else(|| ProcessorError::ToRdf(format!("expected a node object, got {value}")))
    }

    fn is_bare_graph(obj: &Map<String, Value>) -> bool {
        obj.contains_key(keyword::GRAPH) && obj.keys().all(|k| k == keyword::GRAPH)
    }

    fn id_to_subject(id: &str) -> Result<Subject, ProcessorError> {
        match keyword::blank_label(id) {
            Some(label) => BlankNode::new(label)
                .map(Subject::from)
                .map_err(|e| ProcessorError::ToRdf(format!("invalid blank node \"{id}\": {e}"))),
            None => NamedNode::new(id)
                .map(Subject::from)
                .map_err(|e| ProcessorError::ToRdf(format!("invalid IRI \"{id}\": {e}"))),
        }
    }

    fn subject_to_graph(subject: &Subject) -> GraphName {
        match subject {
            Subject::NamedNode(n) => n.clone().into(),
            Subject::BlankNode(b) => b.clone().into(),
            #[allow(unreachable_patterns)]
            _ => GraphName::DefaultGraph,
        }
    }

    /// Emit the quads of one node object and return its subject.
    fn node_to_rdf(
        obj: &Map<String, Value>,
        graph: &GraphName,
        out: &mut Vec<Quad>,
    ) -> Result<Subject, ProcessorError> {
        let subject = match obj.get(keyword::ID) {
            Some(Value::String(id)) => id_to_subject(id)?,
            Some(other) => {
                return Err(ProcessorError::ToRdf(format!("@id must be a string, got {other}")))
            }
            None => BlankNode::default().into(),
        };

        if let Some(types) = obj.get(keyword::TYPE) {
            for ty in as_items(types) {
                let ty = ty.as_str().ok_or_else(|| {
                    ProcessorError::ToRdf(format!("@type must be a string, got {ty}"))
                })?;
                let object = Term::from(id_to_subject(ty)?);
                out.push(Quad::new(subject.clone(), rdf::TYPE.into_owned(), object, graph.clone()));
            }
        }

        if let Some(inner) = obj.get(keyword::GRAPH) {
            let named = subject_to_graph(&subject);
            for item in as_items(inner) {
                node_to_rdf(expect_object(item)?, &named, out)?;
            }
        }

        for (key, values) in obj {
            if key.starts_with('@') {
                continue;
            }
            let predicate = NamedNode::new(key.as_str())
                .map_err(|e| ProcessorError::ToRdf(format!("invalid predicate \"{key}\": {e}")))?;
            for value in as_items(values) {
                emit_value(&subject, &predicate, value, graph, out)?;
            }
        }
        Ok(subject)
    }

    fn emit_value(
        subject: &Subject,
        predicate: &NamedNode,
        value: &Value,
        graph: &GraphName,
        out: &mut Vec<Quad>,
    ) -> Result<(), ProcessorError> {
        let obj = expect_object(value)?;
        if keyword::is_value_object(obj) {
            let literal = value_object_literal(obj)?;
            out.push(Quad::new(subject.clone(), predicate.clone(), literal, graph.clone()));
        } else if obj.contains_key(keyword::LIST) {
            return Err(ProcessorError::ToRdf("@list is not supported".to_string()));
        } else if let Some(items) = obj.get(keyword::SET) {
            for item in as_items(items) {
                emit_value(subject, predicate, item, graph, out)?;
            }
        } else {
            let object = Term::from(node_to_rdf(obj, graph, out)?);
            out.push(Quad::new(subject.clone(), predicate.clone(), object, graph.clone()));
        }
        Ok(())
    }
}



#[cfg(all(test, feature = "mock"))]
mod proptests {
    use super::*;
    use crate::skolem::SkolemRegistry;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn id(blank: bool, n: u8) -> String {
        if blank {
            format!("_:b{n}")
        } else {
            format!("http://example.org/n{n}")
        }
    }

    /// A flat expanded tree: node `i` carries a name and links to `targets`.
    fn tree(nodes: &[(bool, Vec<(bool, u8)>)]) -> Value {
        let items: Vec<Value> = nodes
            .iter()
            .enumerate()
            .map(|(i, (blank, targets))| {
                let links: Vec<Value> = targets
                    .iter()
                    .map(|(b, n)| json!({"@id": id(*b, *n)}))
                    .collect();
                json!({
                    "@id": id(*blank, i as u8),
                    "http://schema.org/name": [{"@value": format!("node {i}")}],
                    "http://schema.org/knows": links
                })
            })
            .collect();
        Value::Array(items)
    }

    fn node_strategy() -> impl Strategy<Value = (bool, Vec<(bool, u8)>)> {
        (
            any::<bool>(),
            prop::collection::vec((any::<bool>(), 0u8..5), 0..3),
        )
    }

    proptest! {
        /// Skolemizing and then deskolemizing the quads of a tree reproduces
        /// the quads of the unskolemized tree.
        #[test]
        fn skolem_round_trip(nodes in prop::collection::vec(node_strategy(), 1..5)) {
            let plain = tree(&nodes);
            let mut skolemized = plain.clone();
            let mut registry = SkolemRegistry::new();
            registry.skolemize(&mut skolemized, false).unwrap();

            let p = PreExpandedProcessor;
            let expected: BTreeSet<String> = p
                .to_rdf(&plain)
                .unwrap()
                .iter()
                .map(|q| q.to_string())
                .collect();
            let restored: BTreeSet<String> = registry
                .deskolemize(&p.to_rdf(&skolemized).unwrap())
                .iter()
                .map(|q| q.to_string())
                .collect();
            prop_assert_eq!(restored, expected);
        }
    }
}

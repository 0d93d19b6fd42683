//! # Mock Proof Engine
//!
//! A deterministic, transparent proof engine for development and testing.
//! Signatures and derived proofs are SHA-256 digests over canonicalized
//! quads; they are verifiable but provide **no zero-knowledge guarantees**
//! and no unforgeability.
//!
//! ## How It Works
//!
//! - Quads are canonicalized by rendering each in N-Quads form with every
//!   blank-node label blinded to `_:b`, then sorting the lines. The digest is
//!   therefore independent of blank-node labelling.
//! - `sign()` hashes the issuer public keys, the document lines, and the
//!   proof-configuration lines.
//! - `derive_proof()` re-checks every original signature, checks that each
//!   disclosed statement (after substituting pseudonyms through the
//!   deanonymization map) occurs in its signed credential, and then emits a
//!   presentation whose proof value hashes the presentation lines together
//!   with the nonce.
//! - `verify_proof()` recomputes that digest.
//!
//! ## Security Warning
//!
//! **NOT PRIVATE.** Anyone can recompute every value this engine produces.
//! It MUST NOT be used where holder privacy or issuer authenticity matters.

use std::collections::HashSet;

use chrono::{SecondsFormat, Utc};
use oxrdf::vocab::{rdf, xsd};
use oxrdf::{BlankNode, GraphName, Literal, NamedNode, Quad, Subject, Term};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use zkld_core::{DeanonMap, Pseudonym};

use crate::bundle::{DeriveProofRequest, KeyPair, VerifyResult};
use crate::traits::{EngineError, ProofEngine};
use crate::vocab;

/// Cryptosuite name written into mock presentation proofs.
pub const MOCK_CRYPTOSUITE: &str = "zkld-mock-sha256";

/// Deterministic SHA-256 proof engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockProofEngine;

impl ProofEngine for MockProofEngine {
    fn key_gen(&self) -> Result<KeyPair, EngineError> {
        let secret_key = hex(&Sha256::digest(Uuid::new_v4().as_bytes()));
        let public_key = hex(&Sha256::digest(secret_key.as_bytes()));
        Ok(KeyPair {
            secret_key,
            public_key,
        })
    }

    fn sign(
        &self,
        document: &[Quad],
        proof: &[Quad],
        key_graph: &[Quad],
    ) -> Result<String, EngineError> {
        if proof.iter().any(is_proof_value) {
            return Err(EngineError::InvalidInput(
                "proof configuration already carries a proof value".to_string(),
            ));
        }
        signing_digest(document, proof, key_graph)
    }

    fn verify(
        &self,
        document: &[Quad],
        proof: &[Quad],
        proof_value: &str,
        key_graph: &[Quad],
    ) -> Result<VerifyResult, EngineError> {
        if !is_digest_hex(proof_value) {
            return Ok(VerifyResult::failed("malformed proof value"));
        }
        let expected = signing_digest(document, proof, key_graph)?;
        if expected == proof_value {
            Ok(VerifyResult::ok())
        } else {
            Ok(VerifyResult::failed("signature does not match document"))
        }
    }

    fn derive_proof(&self, request: &DeriveProofRequest) -> Result<Vec<Quad>, EngineError> {
        let vp = BlankNode::default();
        let mut out = vec![Quad::new(
            vp.clone(),
            rdf::TYPE.into_owned(),
            named(vocab::CRED_VERIFIABLE_PRESENTATION),
            GraphName::DefaultGraph,
        )];

        for (index, pair) in request.vc_pairs.iter().enumerate() {
            let (signature, proof_config) = take_proof_value(&pair.original_proof).ok_or_else(|| {
                EngineError::InvalidSignature {
                    index,
                    reason: "original credential has no proof value".to_string(),
                }
            })?;
            let expected =
                signing_digest(&pair.original_document, &proof_config, &request.key_graph)?;
            if expected != signature {
                return Err(EngineError::InvalidSignature {
                    index,
                    reason: "digest mismatch".to_string(),
                });
            }

            let signed: HashSet<String> = pair.original_document.iter().map(blinded_line).collect();
            for quad in &pair.disclosed_document {
                let revealed = deanonymize(quad, &request.deanon_map)?;
                if !signed.contains(&blinded_line(&revealed)) {
                    return Err(EngineError::UnsignedStatement {
                        index,
                        statement: revealed.to_string(),
                    });
                }
            }
            let signed_proof: HashSet<String> = proof_config.iter().map(blinded_line).collect();
            let (_, disclosed_proof) = take_proof_value(&pair.disclosed_proof)
                .unwrap_or_else(|| (String::new(), pair.disclosed_proof.clone()));
            for quad in &disclosed_proof {
                if !signed_proof.contains(&blinded_line(quad)) {
                    return Err(EngineError::UnsignedStatement {
                        index,
                        statement: quad.to_string(),
                    });
                }
            }

            let credential_graph = BlankNode::default();
            let proof_graph = BlankNode::default();
            out.push(Quad::new(
                vp.clone(),
                named(vocab::CRED_VERIFIABLE_CREDENTIAL_PROP),
                credential_graph.clone(),
                GraphName::DefaultGraph,
            ));
            for quad in &pair.disclosed_document {
                out.push(move_to_graph(quad, &credential_graph));
                if is_credential_type(quad) {
                    out.push(Quad::new(
                        quad.subject.clone(),
                        named(vocab::SEC_PROOF),
                        proof_graph.clone(),
                        credential_graph.clone(),
                    ));
                }
            }
            for quad in &disclosed_proof {
                out.push(move_to_graph(quad, &proof_graph));
            }
            tracing::debug!(credential = index, "mock engine accepted disclosed credential");
        }

        let vp_proof_graph = BlankNode::default();
        let vp_proof = BlankNode::default();
        let created = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        out.push(Quad::new(
            vp.clone(),
            named(vocab::SEC_PROOF),
            vp_proof_graph.clone(),
            GraphName::DefaultGraph,
        ));
        for (predicate, object) in [
            (rdf::TYPE.into_owned(), Term::from(named(vocab::SEC_DATA_INTEGRITY_PROOF))),
            (
                named(vocab::SEC_CRYPTOSUITE),
                Literal::new_simple_literal(MOCK_CRYPTOSUITE).into(),
            ),
            (
                named(vocab::SEC_CHALLENGE),
                Literal::new_simple_literal(request.nonce.as_str()).into(),
            ),
            (
                named(vocab::DCTERMS_CREATED),
                Literal::new_typed_literal(created, xsd::DATE_TIME).into(),
            ),
        ] {
            out.push(Quad::new(vp_proof.clone(), predicate, object, vp_proof_graph.clone()));
        }

        let digest = presentation_digest(&out, &request.nonce, &request.key_graph);
        out.push(Quad::new(
            vp_proof,
            named(vocab::SEC_PROOF_VALUE),
            Literal::new_simple_literal(digest),
            vp_proof_graph,
        ));
        Ok(out)
    }

    fn verify_proof(
        &self,
        vp: &[Quad],
        nonce: &str,
        key_graph: &[Quad],
    ) -> Result<VerifyResult, EngineError> {
        let proof_graphs: Vec<GraphName> = vp
            .iter()
            .filter(|q| q.graph_name.is_default_graph() && q.predicate.as_str() == vocab::SEC_PROOF)
            .filter_map(|q| term_to_graph(&q.object))
            .collect();
        let [proof_graph] = proof_graphs.as_slice() else {
            return Ok(VerifyResult::failed(format!(
                "expected one presentation proof, found {}",
                proof_graphs.len()
            )));
        };

        let in_proof = |q: &&Quad| q.graph_name == *proof_graph;
        let challenge = vp
            .iter()
            .filter(in_proof)
            .find(|q| q.predicate.as_str() == vocab::SEC_CHALLENGE)
            .and_then(|q| literal_value(&q.object));
        if challenge != Some(nonce) {
            return Ok(VerifyResult::failed("challenge does not match nonce"));
        }

        let Some(value_quad) = vp.iter().filter(in_proof).find(|q| is_proof_value(q)) else {
            return Ok(VerifyResult::failed("presentation proof has no proof value"));
        };
        let Some(proof_value) = literal_value(&value_quad.object) else {
            return Ok(VerifyResult::failed("proof value is not a literal"));
        };

        let rest: Vec<Quad> = vp.iter().filter(|q| *q != value_quad).cloned().collect();
        if presentation_digest(&rest, nonce, key_graph) == proof_value {
            Ok(VerifyResult::ok())
        } else {
            Ok(VerifyResult::failed("presentation digest mismatch"))
        }
    }
}

fn named(iri: &str) -> NamedNode {
    NamedNode::new_unchecked(iri)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn is_digest_hex(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_proof_value(quad: &Quad) -> bool {
    quad.predicate.as_str() == vocab::SEC_PROOF_VALUE
}

fn is_credential_type(quad: &Quad) -> bool {
    quad.graph_name.is_default_graph()
        && quad.predicate.as_ref() == rdf::TYPE
        && matches!(
            &quad.object,
            Term::NamedNode(n) if n.as_str() == vocab::CRED_VERIFIABLE_CREDENTIAL
        )
}

fn literal_value(term: &Term) -> Option<&str> {
    match term {
        Term::Literal(l) => Some(l.value()),
        _ => None,
    }
}

fn term_to_graph(term: &Term) -> Option<GraphName> {
    match term {
        Term::NamedNode(n) => Some(n.clone().into()),
        Term::BlankNode(b) => Some(b.clone().into()),
        _ => None,
    }
}

/// Split the proof value off a proof graph.
fn take_proof_value(proof: &[Quad]) -> Option<(String, Vec<Quad>)> {
    let value = proof
        .iter()
        .find(|q| is_proof_value(q))
        .and_then(|q| literal_value(&q.object))?
        .to_string();
    let rest = proof.iter().filter(|q| !is_proof_value(q)).cloned().collect();
    Some((value, rest))
}

fn move_to_graph(quad: &Quad, graph: &BlankNode) -> Quad {
    let mut moved = quad.clone();
    if moved.graph_name.is_default_graph() {
        moved.graph_name = graph.clone().into();
    }
    moved
}

fn blind_subject(subject: &Subject) -> String {
    match subject {
        Subject::BlankNode(_) => "_:b".to_string(),
        other => other.to_string(),
    }
}

fn blind_term(term: &Term) -> String {
    match term {
        Term::BlankNode(_) => "_:b".to_string(),
        other => other.to_string(),
    }
}

fn blind_graph(graph: &GraphName) -> String {
    match graph {
        GraphName::BlankNode(_) => "_:b".to_string(),
        other => other.to_string(),
    }
}

/// N-Quads line with every blank-node label blinded.
fn blinded_line(quad: &Quad) -> String {
    format!(
        "{} {} {} {} .",
        blind_subject(&quad.subject),
        quad.predicate,
        blind_term(&quad.object),
        blind_graph(&quad.graph_name)
    )
}

fn sorted_lines<'a>(quads: impl IntoIterator<Item = &'a Quad>) -> Vec<String> {
    let mut lines: Vec<String> = quads.into_iter().map(blinded_line).collect();
    lines.sort();
    lines
}

fn public_keys(key_graph: &[Quad]) -> Vec<&str> {
    let mut keys: Vec<&str> = key_graph
        .iter()
        .filter(|q| q.predicate.as_str() == vocab::SEC_PUBLIC_KEY_MULTIBASE)
        .filter_map(|q| literal_value(&q.object))
        .collect();
    keys.sort_unstable();
    keys
}

fn signing_digest(
    document: &[Quad],
    proof: &[Quad],
    key_graph: &[Quad],
) -> Result<String, EngineError> {
    let keys = public_keys(key_graph);
    if keys.is_empty() {
        return Err(EngineError::InvalidInput(
            "key graph has no public key".to_string(),
        ));
    }
    let mut hasher = Sha256::new();
    hasher.update(b"zkld-mock-sign\n");
    for key in keys {
        hasher.update(key.as_bytes());
        hasher.update(b"\n");
    }
    for line in sorted_lines(document) {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hasher.update(b"--\n");
    for line in sorted_lines(proof.iter().filter(|q| !is_proof_value(q))) {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    Ok(hex(&hasher.finalize()))
}

fn presentation_digest(quads: &[Quad], nonce: &str, key_graph: &[Quad]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"zkld-mock-derive\n");
    for key in public_keys(key_graph) {
        hasher.update(key.as_bytes());
        hasher.update(b"\n");
    }
    hasher.update(nonce.as_bytes());
    hasher.update(b"\n");
    for line in sorted_lines(quads) {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hex(&hasher.finalize())
}

fn lookup<'m>(map: &'m DeanonMap, node: &BlankNode) -> Option<&'m Term> {
    Pseudonym::new(node.as_str()).and_then(|p| map.get(&p))
}

fn non_literal(term: &Term, position: &str, node: &BlankNode) -> Result<Subject, EngineError> {
    match term {
        Term::NamedNode(n) => Ok(n.clone().into()),
        Term::BlankNode(b) => Ok(b.clone().into()),
        _ => Err(EngineError::InvalidInput(format!(
            "pseudonym `_:{}` stands for {term} in {position} position",
            node.as_str()
        ))),
    }
}

/// Substitute every pseudonym in `quad` by the term it hides.
fn deanonymize(quad: &Quad, map: &DeanonMap) -> Result<Quad, EngineError> {
    let mut out = quad.clone();
    if let Subject::BlankNode(b) = &quad.subject {
        if let Some(term) = lookup(map, b) {
            out.subject = non_literal(term, "subject", b)?;
        }
    }
    if let Term::BlankNode(b) = &quad.object {
        if let Some(term) = lookup(map, b) {
            out.object = term.clone();
        }
    }
    if let GraphName::BlankNode(b) = &quad.graph_name {
        if let Some(term) = lookup(map, b) {
            out.graph_name = match non_literal(term, "graph", b)? {
                Subject::NamedNode(n) => n.into(),
                Subject::BlankNode(b) => b.into(),
                #[allow(unreachable_patterns)]
                _ => GraphName::DefaultGraph,
            };
        }
    }
    Ok(out)
}

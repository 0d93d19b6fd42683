//! # Presentation Orchestrator
//!
//! [`Presenter`] ties the transform to its two collaborators, a
//! [`JsonLdProcessor`] and a [`ProofEngine`], and exposes the five
//! operations of a selective-disclosure wallet: key generation, signing,
//! signature verification, presentation derivation, and presentation
//! verification.
//!
//! Derivation processes credential pairs strictly in request order: the
//! merged pseudonym map must see each pair's local map in a fixed order so
//! that conflicts are reported deterministically. One [`SkolemRegistry`] is
//! created per derivation and dropped when it returns.

use oxrdf::Quad;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use zkld_core::{JsonLdProcessor, SkolemRegistry, TransformConfig};
use zkld_zkp::{DeriveProofRequest, KeyPair, ProofEngine, VcPairRdf, VerifyResult};

use crate::credential::{
    attach_proof_value, detach_proof_value, is_compact, split_compact_proof, split_proof,
    PROOF, PROOF_VALUE,
};
use crate::error::PresentationError;
use crate::prepare::prepare_presentation;

/// An original credential and the holder's redacted variant of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialPair {
    /// The signed credential as issued.
    pub original: Value,
    /// The redacted credential, with pseudonyms where values were hidden.
    pub disclosed: Value,
}

/// Input to [`Presenter::derive_proof`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRequest {
    /// Credentials to present. Order fixes the pseudonym merge order.
    pub pairs: Vec<CredentialPair>,
    /// Verifier-supplied challenge.
    pub nonce: String,
    /// Issuer public-key documents.
    pub public_keys: Value,
    /// Context for the resulting presentation document.
    pub context: Value,
}

/// Selective-disclosure operations over a processor and an engine.
#[derive(Debug, Clone)]
pub struct Presenter<P, E> {
    processor: P,
    engine: E,
    config: TransformConfig,
}

impl<P: JsonLdProcessor, E: ProofEngine> Presenter<P, E> {
    /// A presenter with the default configuration.
    pub fn new(processor: P, engine: E) -> Self {
        Self::with_config(processor, engine, TransformConfig::default())
    }

    /// A presenter with an explicit configuration.
    pub fn with_config(processor: P, engine: E, config: TransformConfig) -> Self {
        Self {
            processor,
            engine,
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Generate an issuer key pair.
    pub fn key_gen(&self) -> Result<KeyPair, PresentationError> {
        Ok(self.engine.key_gen()?)
    }

    /// Sign `vc`, returning it with the proof value attached.
    ///
    /// A compact credential gets `proof.proofValue`; an expanded one gets a
    /// proof-value statement on its proof node. Any existing proof value is
    /// replaced.
    pub fn sign(&self, vc: &Value, key_pair: &Value) -> Result<Value, PresentationError> {
        let (document, proof, _) = self.credential_rdf(vc)?;
        let key_graph = self.document_rdf(key_pair)?;
        let proof_value = self.engine.sign(&document, &proof, &key_graph)?;

        let mut signed = vc.clone();
        if is_compact(vc) {
            if let Some(proof) = signed.get_mut(PROOF).and_then(Value::as_object_mut) {
                proof.insert(PROOF_VALUE.to_string(), Value::String(proof_value));
            }
        } else {
            attach_proof_value(&mut signed, &self.config.proof_predicate, &proof_value)?;
        }
        tracing::debug!(statements = document.len(), "signed credential");
        Ok(signed)
    }

    /// Check the signature of `vc` against `public_keys`.
    pub fn verify(
        &self,
        vc: &Value,
        public_keys: &Value,
    ) -> Result<VerifyResult, PresentationError> {
        let (document, proof, proof_value) = self.credential_rdf(vc)?;
        let Some(proof_value) = proof_value else {
            return Ok(VerifyResult::failed("credential has no proof value"));
        };
        let key_graph = self.document_rdf(public_keys)?;
        Ok(self.engine.verify(&document, &proof, &proof_value, &key_graph)?)
    }

    /// Derive a verifiable presentation from `request`.
    pub fn derive_proof(&self, request: &PresentationRequest) -> Result<Value, PresentationError> {
        let mut registry = SkolemRegistry::with_prefix(self.config.skolem_prefix.as_str());

        let expanded = request
            .pairs
            .iter()
            .map(|pair| -> Result<_, PresentationError> {
                Ok((
                    self.processor.expand(&pair.original)?,
                    self.processor.expand(&pair.disclosed)?,
                ))
            })
            .collect::<Result<Vec<(Value, Value)>, PresentationError>>()?;

        let (deanon_map, prepared) = prepare_presentation(
            expanded.iter().map(|(o, d)| (o, d)),
            &mut registry,
            &self.config,
        )?;

        let predicate = self.config.proof_predicate.as_str();
        let quads = |tree: &Value| -> Result<Vec<Quad>, PresentationError> {
            Ok(registry.deskolemize(&self.processor.to_rdf(tree)?))
        };
        let vc_pairs = prepared
            .iter()
            .map(|pair| -> Result<_, PresentationError> {
                let original = split_proof(&pair.original, predicate)?;
                let disclosed = split_proof(&pair.disclosed, predicate)?;
                Ok(VcPairRdf {
                    original_document: quads(&original.document)?,
                    original_proof: quads(&original.proof)?,
                    disclosed_document: quads(&disclosed.document)?,
                    disclosed_proof: quads(&disclosed.proof)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            credentials = vc_pairs.len(),
            pseudonyms = deanon_map.len(),
            skolem_ids = registry.len(),
            "deriving presentation proof"
        );

        let vp = self.engine.derive_proof(&DeriveProofRequest {
            vc_pairs,
            deanon_map,
            nonce: request.nonce.clone(),
            key_graph: self.document_rdf(&request.public_keys)?,
        })?;
        Ok(self.processor.from_rdf(&vp, &request.context)?)
    }

    /// Check a derived presentation against `nonce` and `public_keys`.
    pub fn verify_proof(
        &self,
        vp: &Value,
        nonce: &str,
        public_keys: &Value,
    ) -> Result<VerifyResult, PresentationError> {
        let vp = self.document_rdf(vp)?;
        let key_graph = self.document_rdf(public_keys)?;
        Ok(self.engine.verify_proof(&vp, nonce, &key_graph)?)
    }

    fn document_rdf(&self, document: &Value) -> Result<Vec<Quad>, PresentationError> {
        let expanded = self.processor.expand(document)?;
        Ok(self.processor.to_rdf(&expanded)?)
    }

    /// Document quads, proof quads without the proof value, and the detached
    /// proof value.
    fn credential_rdf(
        &self,
        vc: &Value,
    ) -> Result<(Vec<Quad>, Vec<Quad>, Option<String>), PresentationError> {
        if is_compact(vc) {
            let split = split_compact_proof(vc)?;
            return Ok((
                self.document_rdf(&split.document)?,
                self.document_rdf(&split.proof)?,
                split.proof_value,
            ));
        }
        let expanded = self.processor.expand(vc)?;
        let mut split = split_proof(&expanded, &self.config.proof_predicate)?;
        let proof_value = detach_proof_value(&mut split.proof);
        Ok((
            self.processor.to_rdf(&split.document)?,
            self.processor.to_rdf(&split.proof)?,
            proof_value,
        ))
    }
}

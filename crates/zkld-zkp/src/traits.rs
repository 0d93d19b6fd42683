//! # Proof Engine Trait
//!
//! The boundary to the zero-knowledge engine that signs credentials and
//! derives presentation proofs. Everything on the far side of this trait
//! (BBS+ signatures, pseudonym commitments, the proof transcript) is opaque
//! to the transform.
//!
//! Implementations are `Send + Sync` so one engine can serve concurrent
//! derivations.

use oxrdf::Quad;
use thiserror::Error;

use crate::bundle::{DeriveProofRequest, KeyPair, VerifyResult};

/// Failure inside the proof engine.
///
/// A cryptographically invalid credential during derivation is an error
/// (nothing can be derived from it); during verification it is reported
/// through [`VerifyResult`] instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The quads handed to the engine are structurally unusable.
    #[error("invalid engine input: {0}")]
    InvalidInput(String),

    /// An original credential's signature does not verify.
    #[error("signature of credential {index} does not verify: {reason}")]
    InvalidSignature {
        /// Position of the credential in the request.
        index: usize,
        /// Why the check failed.
        reason: String,
    },

    /// A disclosed statement is not backed by the signed credential.
    #[error("credential {index} discloses a statement that was not signed: {statement}")]
    UnsignedStatement {
        /// Position of the credential in the request.
        index: usize,
        /// The offending statement, deanonymized, in N-Quads form.
        statement: String,
    },

    /// The engine failed internally.
    #[error("proof engine failure: {0}")]
    Internal(String),
}

/// Key generation, signing, proof derivation, and verification over RDF.
pub trait ProofEngine: Send + Sync {
    /// Generate a key pair.
    fn key_gen(&self) -> Result<KeyPair, EngineError>;

    /// Sign a credential document under the given proof configuration,
    /// returning the encoded proof value.
    ///
    /// `proof` must not contain a proof value.
    fn sign(
        &self,
        document: &[Quad],
        proof: &[Quad],
        key_graph: &[Quad],
    ) -> Result<String, EngineError>;

    /// Check a credential signature.
    fn verify(
        &self,
        document: &[Quad],
        proof: &[Quad],
        proof_value: &str,
        key_graph: &[Quad],
    ) -> Result<VerifyResult, EngineError>;

    /// Derive a presentation proof over the disclosed credentials, returning
    /// the presentation's quads.
    fn derive_proof(&self, request: &DeriveProofRequest) -> Result<Vec<Quad>, EngineError>;

    /// Check a derived presentation against the challenge it must be bound to.
    fn verify_proof(
        &self,
        vp: &[Quad],
        nonce: &str,
        key_graph: &[Quad],
    ) -> Result<VerifyResult, EngineError>;
}

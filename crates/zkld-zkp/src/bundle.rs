//! # Engine request and response types
//!
//! Everything crosses the engine boundary as RDF quads plus a handful of
//! strings. The transform never inspects signatures or proof values; it only
//! arranges quads and pseudonyms the way the engine expects them.

use oxrdf::Quad;
use serde::{Deserialize, Serialize};
use zkld_core::DeanonMap;

/// A freshly generated key pair, as encoded strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPair {
    /// Encoded secret key.
    pub secret_key: String,
    /// Encoded public key.
    pub public_key: String,
}

/// Outcome of a signature or derived-proof check.
///
/// A failed check is not an error: `verified` is `false` and `error` says why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResult {
    /// Whether the check passed.
    pub verified: bool,
    /// Why it did not pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyResult {
    /// A passing result.
    pub fn ok() -> Self {
        Self {
            verified: true,
            error: None,
        }
    }

    /// A failing result with a reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            verified: false,
            error: Some(reason.into()),
        }
    }
}

/// One credential of a presentation in RDF form.
///
/// Both documents are deskolemized. Pseudonyms in the disclosed quads are
/// blank nodes whose labels are keys of the request's [`DeanonMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcPairRdf {
    /// Quads of the signed credential, without its proof graph.
    pub original_document: Vec<Quad>,
    /// Quads of the signed credential's proof graph.
    pub original_proof: Vec<Quad>,
    /// Quads of the disclosed credential, without its proof graph.
    pub disclosed_document: Vec<Quad>,
    /// Quads of the disclosed credential's proof graph.
    pub disclosed_proof: Vec<Quad>,
}

/// Input to [`ProofEngine::derive_proof`](crate::ProofEngine::derive_proof).
#[derive(Debug, Clone)]
pub struct DeriveProofRequest {
    /// The credentials to present, in presentation order.
    pub vc_pairs: Vec<VcPairRdf>,
    /// The merged pseudonym map of all credentials.
    pub deanon_map: DeanonMap,
    /// Verifier-supplied challenge.
    pub nonce: String,
    /// Issuer public keys.
    pub key_graph: Vec<Quad>,
}

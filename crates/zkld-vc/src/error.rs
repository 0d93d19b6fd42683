//! Errors surfaced by the presentation layer.

use thiserror::Error;
use zkld_core::{DisclosureError, ProcessorError};
use zkld_zkp::EngineError;

/// Any failure of a sign, verify, derive, or verify-proof call.
///
/// None of these are retried: the transform is deterministic, so the same
/// input fails the same way. Engine errors are passed through unchanged.
#[derive(Error, Debug)]
pub enum PresentationError {
    /// The disclosed credential is not a valid redaction, or pseudonyms conflict.
    #[error("disclosure error: {0}")]
    Disclosure(#[from] DisclosureError),

    /// JSON-LD expansion or RDF conversion failed.
    #[error("JSON-LD processing error: {0}")]
    Processor(#[from] ProcessorError),

    /// The proof engine rejected the request.
    #[error("proof engine error: {0}")]
    Engine(#[from] EngineError),

    /// A credential has no proof that can be split off.
    #[error("credential has no usable proof: {reason}")]
    MissingProof {
        /// What was missing or malformed.
        reason: String,
    },
}

impl PresentationError {
    pub(crate) fn missing_proof(reason: impl Into<String>) -> Self {
        Self::MissingProof {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_pass_through() {
        let err: PresentationError = EngineError::Internal("wasm trap".to_string()).into();
        assert!(format!("{err}").contains("wasm trap"));
    }

    #[test]
    fn missing_proof_display() {
        let err = PresentationError::missing_proof("no `proof` object");
        assert!(format!("{err}").contains("no `proof` object"));
    }

    #[test]
    fn conflict_surfaces_both_values() {
        let err: PresentationError = DisclosureError::Conflict {
            pseudonym: "_:p".to_string(),
            existing: "<did:example:a>".to_string(),
            incoming: "<did:example:b>".to_string(),
        }
        .into();
        let msg = format!("{err}");
        assert!(msg.contains("did:example:a"));
        assert!(msg.contains("did:example:b"));
    }
}

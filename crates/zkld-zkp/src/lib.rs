//! # zkld-zkp: Proof Engine Boundary
//!
//! Defines the [`ProofEngine`] trait through which credentials are signed and
//! presentation proofs are derived and verified, the RDF request types that
//! cross that boundary, and the vocabulary both sides agree on.
//!
//! ## Architecture
//!
//! The engine sees only quads, pseudonym maps, and strings. Real engines
//! (BBS+ with termwise pseudonyms) bind through this trait. The `mock`
//! feature (enabled by default) ships [`MockProofEngine`]: transparent and
//! deterministic, for tests and local tooling only.

pub mod bundle;
#[cfg(feature = "mock")]
pub mod mock;
pub mod traits;
pub mod vocab;

// Re-export primary types.
pub use bundle::{DeriveProofRequest, KeyPair, VcPairRdf, VerifyResult};
#[cfg(feature = "mock")]
pub use mock::MockProofEngine;
pub use traits::{EngineError, ProofEngine};

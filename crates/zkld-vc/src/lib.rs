#![deny(missing_docs)]

//! # zkld-vc: Selective Disclosure of Verifiable Credentials
//!
//! Turns a holder's redacted copy of a signed credential into inputs a
//! proof engine can check against the original signature.
//!
//! ## Pipeline
//!
//! For each (original, disclosed) pair, in request order:
//!
//! 1. Skolemize the expanded original so every blank node has a stable IRI.
//! 2. [`diff_vc`] walks the disclosed tree against it and records the
//!    pseudonyms the holder introduced and the [`MaskingEdits`] needed.
//! 3. [`apply_masking`] rewrites the disclosed tree and folds literal
//!    datatypes into the pair's pseudonym map.
//! 4. The pair maps are merged; a pseudonym bound to two different values
//!    aborts the presentation.
//!
//! [`Presenter`] wraps that pipeline with RDF conversion, deskolemization,
//! and the calls into a [`ProofEngine`](zkld_zkp::ProofEngine).

pub mod credential;
pub mod diff;
pub mod error;
pub mod prepare;
pub mod presentation;
pub mod rewrite;

// Re-export primary types at crate root for ergonomic imports.
pub use credential::{split_compact_proof, split_proof, CompactSplit, SplitCredential};
pub use diff::{diff_vc, MaskingEdits, VcDiff};
pub use error::PresentationError;
pub use prepare::{diff_and_prepare, prepare_presentation, PreparedPair};
pub use presentation::{CredentialPair, PresentationRequest, Presenter};
pub use rewrite::apply_masking;

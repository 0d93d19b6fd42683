#![deny(missing_docs)]

//! # zkld-core: Tree and Term Primitives for Selective Disclosure
//!
//! This crate holds the pieces of the selective-disclosure transform that do
//! not depend on any particular credential layout: addressing nodes inside
//! JSON-LD trees, blank-node Skolemization, the pseudonym map, and the
//! processor seam for JSON-LD expansion and RDF conversion.
//!
//! ## Design Principles
//!
//! 1. **Edits are addressed by path.** The differ walks one tree and the
//!    rewriter mutates another, so edits are keyed by [`JsonPath`] and
//!    replayed through [`locate_mut`], never by live reference.
//!
//! 2. **Skolem identifiers are operation-scoped.** A [`SkolemRegistry`] is
//!    created per derivation and carries its own reverse map, so
//!    deskolemization never has to parse identifiers back apart.
//!
//! 3. **One pseudonym, one value.** [`DeanonMap`] rejects any re-binding to a
//!    different term, both within one credential and across a presentation.
//!
//! 4. **Structured errors.** Every failure is a `thiserror` enum variant
//!    carrying the offending path or pseudonym. No `.unwrap()` outside tests.

pub mod config;
pub mod deanon;
pub mod error;
pub mod jsonld;
pub mod keyword;
pub mod path;
pub mod skolem;

// Re-export primary types at crate root for ergonomic imports.
pub use config::{TransformConfig, DEFAULT_PROOF_PREDICATE};
pub use deanon::{DeanonMap, Pseudonym};
pub use error::{ConfigError, DisclosureError, PathError, ProcessorError, SkolemError};
pub use jsonld::{value_object_literal, JsonLdProcessor};
pub use path::{locate, locate_mut, JsonPath, NodeHandle, PathSegment};
pub use skolem::{SkolemRegistry, SkolemScope, DEFAULT_SKOLEM_PREFIX};

#[cfg(feature = "mock")]
pub use jsonld::PreExpandedProcessor;

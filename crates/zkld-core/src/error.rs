//! # Error Hierarchy
//!
//! Structured error types for the selective-disclosure transform, built with
//! `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Every failure in the transform is deterministic: the same inputs produce
//! the same error, so none of these are retried. Each variant carries the
//! path, pseudonym, or values needed to diagnose the offending input.

use thiserror::Error;

use crate::path::JsonPath;

/// A recorded edit path does not resolve against a document tree.
///
/// Raised by the path locator. When it surfaces from the rewriter it means
/// the disclosed tree does not have the shape the differ walked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// An object along the path has no such key.
    #[error("no key \"{key}\" at {path}")]
    MissingKey {
        /// Path of the object that was searched.
        path: JsonPath,
        /// The key that was not found.
        key: String,
    },

    /// An array along the path is shorter than the requested index.
    #[error("index {index} out of bounds at {path} (length {len})")]
    IndexOutOfBounds {
        /// Path of the array that was indexed.
        path: JsonPath,
        /// The requested index.
        index: usize,
        /// The actual array length.
        len: usize,
    },

    /// A key segment was applied to a value that is not an object, or the
    /// addressed value is not an object node.
    #[error("expected an object at {path}")]
    NotAnObject {
        /// Path of the offending value.
        path: JsonPath,
    },

    /// An index segment was applied to a value that is not an array.
    #[error("expected an array at {path}")]
    NotAnArray {
        /// Path of the offending value.
        path: JsonPath,
    },
}

/// Errors from issuing or resolving Skolem identifiers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkolemError {
    /// A blank-node label is not a valid RDF blank node identifier.
    #[error("invalid blank node label \"{label}\": {reason}")]
    InvalidLabel {
        /// The rejected label (without the `_:` prefix).
        label: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A Skolem identifier would not be a valid absolute IRI.
    #[error("invalid Skolem IRI \"{iri}\": {reason}")]
    InvalidIri {
        /// The rejected IRI.
        iri: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Errors raised while comparing, rewriting, and merging disclosed credentials.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisclosureError {
    /// The disclosed tree is not a valid redaction of the original, or a
    /// masked-literal placeholder is malformed.
    #[error("invalid disclosed credential at {path}: {reason}")]
    InvalidDisclosure {
        /// Path of the offending node in the disclosed tree.
        path: JsonPath,
        /// What is wrong with it.
        reason: String,
    },

    /// A pseudonym was bound to two different values within one presentation.
    #[error(
        "pseudonym `{pseudonym}` corresponds to multiple values: `{existing}` and `{incoming}`"
    )]
    Conflict {
        /// The pseudonym, rendered as `_:label`.
        pseudonym: String,
        /// The value already recorded.
        existing: String,
        /// The differing value that was being recorded.
        incoming: String,
    },

    /// A masked literal references a pseudonym that has no recorded value.
    ///
    /// This is an internal inconsistency between the differ and the rewriter,
    /// not a recoverable user error.
    #[error("deanonymization map has no value for `{pseudonym}`")]
    MissingMapping {
        /// The pseudonym, rendered as `_:label`.
        pseudonym: String,
    },

    /// A recorded edit path did not resolve against the disclosed tree.
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// Skolem identifier issuance failed.
    #[error("skolemization error: {0}")]
    Skolem(#[from] SkolemError),
}

impl DisclosureError {
    /// Shorthand for [`DisclosureError::InvalidDisclosure`].
    pub fn invalid(path: &JsonPath, reason: impl Into<String>) -> Self {
        Self::InvalidDisclosure {
            path: path.clone(),
            reason: reason.into(),
        }
    }
}

/// Errors loading or validating a [`TransformConfig`](crate::TransformConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// The file that was being read.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid YAML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The configuration parsed but a value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failures reported by a JSON-LD processor (expansion or RDF conversion).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessorError {
    /// Document expansion failed.
    #[error("JSON-LD expansion failed: {0}")]
    Expansion(String),

    /// Converting an expanded tree to quads failed.
    #[error("conversion to RDF failed: {0}")]
    ToRdf(String),

    /// Converting quads back to a tree failed.
    #[error("conversion from RDF failed: {0}")]
    FromRdf(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathSegment;

    fn sample_path() -> JsonPath {
        JsonPath::from(vec![
            PathSegment::Index(0),
            PathSegment::Key("http://schema.org/name".to_string()),
        ])
    }

    #[test]
    fn path_error_display_names_key_and_path() {
        let err = PathError::MissingKey {
            path: sample_path(),
            key: "@id".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("@id"));
        assert!(msg.contains("http://schema.org/name"));
    }

    #[test]
    fn index_out_of_bounds_display() {
        let err = PathError::IndexOutOfBounds {
            path: JsonPath::root(),
            index: 3,
            len: 1,
        };
        let msg = format!("{err}");
        assert!(msg.contains('3'));
        assert!(msg.contains("length 1"));
    }

    #[test]
    fn conflict_display_reports_both_values() {
        let err = DisclosureError::Conflict {
            pseudonym: "_:p".to_string(),
            existing: "<http://example.org/a>".to_string(),
            incoming: "<http://example.org/b>".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("_:p"));
        assert!(msg.contains("http://example.org/a"));
        assert!(msg.contains("http://example.org/b"));
    }

    #[test]
    fn missing_mapping_display() {
        let err = DisclosureError::MissingMapping {
            pseudonym: "_:age".to_string(),
        };
        assert!(format!("{err}").contains("_:age"));
    }

    #[test]
    fn invalid_disclosure_shorthand() {
        let err = DisclosureError::invalid(&sample_path(), "bad placeholder");
        match err {
            DisclosureError::InvalidDisclosure { path, reason } => {
                assert_eq!(path, sample_path());
                assert_eq!(reason, "bad placeholder");
            }
            other => panic!("expected InvalidDisclosure, got {other:?}"),
        }
    }

    #[test]
    fn path_error_converts_into_disclosure_error() {
        let err: DisclosureError = PathError::NotAnArray {
            path: JsonPath::root(),
        }
        .into();
        assert!(format!("{err}").contains("path error"));
    }

    #[test]
    fn config_invalid_display() {
        let err = ConfigError::Invalid("skolem_prefix must not be empty".to_string());
        assert!(format!("{err}").contains("skolem_prefix"));
    }

    #[test]
    fn all_error_types_are_debug() {
        let e1 = SkolemError::InvalidLabel {
            label: "".to_string(),
            reason: "empty".to_string(),
        };
        let e2 = ProcessorError::Expansion("loader failed".to_string());
        let e3 = DisclosureError::MissingMapping {
            pseudonym: "_:x".to_string(),
        };
        assert!(!format!("{e1:?}").is_empty());
        assert!(!format!("{e2:?}").is_empty());
        assert!(!format!("{e3:?}").is_empty());
    }
}

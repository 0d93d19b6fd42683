//! Per-pair preparation and the presentation-wide fold.
//!
//! [`diff_and_prepare`] is the unit of work for one credential pair:
//! skolemize the original, diff, rewrite the disclosed tree, and fold the
//! masked-literal datatypes into the pair's local pseudonym map.
//! [`prepare_presentation`] runs it over every pair in request order and
//! merges the local maps into one, stopping at the first conflict.

use serde::Serialize;
use serde_json::Value;
use zkld_core::{DeanonMap, DisclosureError, SkolemRegistry, TransformConfig};

use crate::diff::{diff_vc, VcDiff};
use crate::rewrite::apply_masking;

/// One credential pair, ready for RDF conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedPair {
    /// Pseudonyms this pair introduces, with datatypes folded in.
    pub deanon_map: DeanonMap,
    /// The skolemized expanded original.
    pub original: Value,
    /// The rewritten expanded disclosure.
    pub disclosed: Value,
}

/// Prepare one credential pair.
///
/// Both trees must already be expanded. Neither input is modified.
pub fn diff_and_prepare(
    original: &Value,
    disclosed: &Value,
    registry: &mut SkolemRegistry,
    config: &TransformConfig,
) -> Result<PreparedPair, DisclosureError> {
    let mut original = original.clone();
    registry.skolemize(&mut original, config.assign_omitted_ids)?;

    let VcDiff {
        mut deanon_map,
        edits,
    } = diff_vc(&original, disclosed, registry)?;

    let mut disclosed = disclosed.clone();
    apply_masking(&mut disclosed, &edits, &mut deanon_map)?;

    Ok(PreparedPair {
        deanon_map,
        original,
        disclosed,
    })
}

/// Prepare every pair in order and merge their pseudonym maps.
///
/// Each pair's map is merged before the next pair is diffed, so the first
/// conflict in request order is the one reported. Returns the merged map and
/// the prepared pairs, in input order.
pub fn prepare_presentation<'a, I>(
    pairs: I,
    registry: &mut SkolemRegistry,
    config: &TransformConfig,
) -> Result<(DeanonMap, Vec<PreparedPair>), DisclosureError>
where
    I: IntoIterator<Item = (&'a Value, &'a Value)>,
{
    let mut merged = DeanonMap::new();
    let mut prepared = Vec::new();
    for (index, (original, disclosed)) in pairs.into_iter().enumerate() {
        let pair = diff_and_prepare(original, disclosed, registry, config)?;
        merged.merge(&pair.deanon_map)?;
        tracing::debug!(
            pair = index,
            pseudonyms = pair.deanon_map.len(),
            merged = merged.len(),
            "prepared credential pair"
        );
        prepared.push(pair);
    }
    Ok((merged, prepared))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use zkld_core::JsonPath;

    const SUBJECT: &str = "https://www.w3.org/2018/credentials#credentialSubject";
    const NAME: &str = "http://schema.org/name";
    const AGE: &str = "http://schema.org/age";
    const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    fn original(subject: &str, age: i64) -> Value {
        json!([{
            "@id": format!("http://example.org/vc/{subject}"),
            SUBJECT: [{
                "@id": subject,
                NAME: [{"@value": "John"}],
                AGE: [{"@value": age}]
            }]
        }])
    }

    fn disclosed(vc: &str, holder: &str) -> Value {
        json!([{
            "@id": format!("http://example.org/vc/{vc}"),
            SUBJECT: [{
                "@id": holder,
                AGE: [{"@value": "_:age", "@type": XSD_INTEGER}]
            }]
        }])
    }

    #[test]
    fn prepares_a_single_pair() {
        let mut reg = SkolemRegistry::new();
        let cfg = TransformConfig::default();
        let pair = diff_and_prepare(
            &original("did:example:john", 42),
            &disclosed("did:example:john", "_:holder"),
            &mut reg,
            &cfg,
        )
        .unwrap();

        let map = pair.deanon_map.to_string_map();
        assert_eq!(map["_:holder"], "<did:example:john>");
        assert_eq!(map["_:age"], format!("\"42\"^^<{XSD_INTEGER}>"));

        let subject = &pair.disclosed[0][SUBJECT][0];
        assert!(reg.is_issued(subject["@id"].as_str().unwrap()));
        assert!(subject[AGE][0].get("@value").is_none());
        assert!(reg.is_issued(subject[AGE][0]["@id"].as_str().unwrap()));
    }

    #[test]
    fn merges_agreeing_pairs() {
        let a = original("did:example:john", 42);
        let b = original("did:example:john", 42);
        let da = disclosed("did:example:john", "_:holder");
        let db = disclosed("did:example:john", "_:holder");
        let mut reg = SkolemRegistry::new();
        let (merged, prepared) =
            prepare_presentation([(&a, &da), (&b, &db)], &mut reg, &TransformConfig::default())
                .unwrap();
        assert_eq!(prepared.len(), 2);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged, prepared[0].deanon_map);
    }

    #[test]
    fn first_conflict_in_request_order_is_reported() {
        let a = original("did:example:john", 42);
        let b = original("did:example:john", 43);
        let c = original("did:example:john", 44);
        let d = disclosed("did:example:john", "_:holder");
        let mut reg = SkolemRegistry::new();
        let cfg = TransformConfig::default();
        match prepare_presentation([(&a, &d), (&b, &d), (&c, &d)], &mut reg, &cfg) {
            Err(DisclosureError::Conflict { existing, incoming, .. }) => {
                assert!(existing.contains("\"42\""));
                assert!(incoming.contains("\"43\""));
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn typed_placeholder_over_language_literal_is_rejected() {
        let a = json!([{
            "@id": "did:example:john",
            NAME: [{"@value": "Jean", "@language": "fr"}]
        }]);
        let d = json!([{
            "@id": "did:example:john",
            NAME: [{"@value": "_:name", "@type": XSD_INTEGER}]
        }]);
        let mut reg = SkolemRegistry::new();
        match diff_and_prepare(&a, &d, &mut reg, &TransformConfig::default()) {
            Err(DisclosureError::InvalidDisclosure { path, .. }) => {
                assert_eq!(path, JsonPath::root().index(0).key(NAME).index(0));
            }
            other => panic!("expected InvalidDisclosure, got {other:?}"),
        }
    }

    #[test]
    fn conflicting_literals_across_pairs() {
        let a = original("did:example:john", 42);
        let b = original("did:example:john", 43);
        let da = disclosed("did:example:john", "_:holder");
        let db = disclosed("did:example:john", "_:holder");
        let mut reg = SkolemRegistry::new();
        let cfg = TransformConfig::default();
        match prepare_presentation([(&a, &da), (&b, &db)], &mut reg, &cfg) {
            Err(DisclosureError::Conflict {
                pseudonym,
                existing,
                incoming,
            }) => {
                assert_eq!(pseudonym, "_:age");
                assert!(existing.contains("\"42\""));
                assert!(incoming.contains("\"43\""));
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn conflicting_identifiers_across_pairs() {
        let a = original("did:example:john", 42);
        let b = original("did:example:jane", 42);
        let da = disclosed("did:example:john", "_:holder");
        let db = disclosed("did:example:jane", "_:holder");
        let mut reg = SkolemRegistry::new();
        assert!(matches!(
            prepare_presentation([(&a, &da), (&b, &db)], &mut reg, &TransformConfig::default()),
            Err(DisclosureError::Conflict { .. })
        ));
    }

    #[test]
    fn inputs_are_not_modified() {
        let a = original("did:example:john", 42);
        let da = disclosed("did:example:john", "_:holder");
        let (a0, da0) = (a.clone(), da.clone());
        let mut reg = SkolemRegistry::new();
        diff_and_prepare(&a, &da, &mut reg, &TransformConfig::default()).unwrap();
        assert_eq!(a, a0);
        assert_eq!(da, da0);
    }
}

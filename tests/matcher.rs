mod util;

use serde_json::{json, Value};
use util::*;
use vcx_exchange::prelude::*;

const FABER: &str = "V4SGRU86Z58d6TV7PBUe6f";
const MALLORY: &str = "7Jw9dYDLtvQ28Jw7pNGkUK";

fn identifier(issuer_did: &str) -> Value {
    let schema_id = schema_id(issuer_did, "FaberVcx", "1.0");
    json!({
        "schema_id": schema_id,
        "cred_def_id": cred_def_id(issuer_did, &schema_id, "tag1"),
        "rev_reg_id": null,
        "timestamp": null,
        "seq_no": null
    })
}

fn presentation(requested_proof: Value, identifiers: Vec<Value>) -> Presentation {
    serde_json::from_value(json!({
        "requested_proof": requested_proof,
        "identifiers": identifiers,
        "proof": ""
    }))
    .unwrap()
}

fn request(requested_attributes: Value) -> ProofRequest {
    ProofRequest::build(
        ProofRequestData::from_json(
            &json!({"name": "matcher", "requested_attributes": requested_attributes}).to_string(),
        )
        .unwrap(),
    )
    .unwrap()
}

fn revealed(raw: &str) -> Value {
    json!({"sub_proof_index": 0, "raw": raw, "encoded": encode_attribute(raw)})
}

fn basic_identity_proof() -> Value {
    json!({
        "revealed_attr_groups": {
            "attr_basic_identity": {
                "sub_proof_index": 0,
                "values": {
                    "name": {"raw": "alice", "encoded": encode_attribute("alice")},
                    "last_name": {"raw": "clark", "encoded": encode_attribute("clark")}
                }
            }
        }
    })
}

#[test]
fn credential_from_another_issuer_violates_restrictions() {
    setup();
    let request = request(json!({
        "attr_basic_identity": {
            "names": ["name", "last_name"],
            "restrictions": {"issuer_did": FABER}
        }
    }));
    let presentation = presentation(basic_identity_proof(), vec![identifier(MALLORY)]);
    let res = match_presentation(&request, &presentation);
    assert!(matches!(res, Err(Error::RestrictionViolation(_))), "{:?}", res);

    let result = verify_presentation(
        &request,
        &presentation,
        &RegistryState::default(),
        &PublicParams::default(),
        &DigestProofSystem,
    )
    .unwrap();
    assert_eq!(result.status, PresentationVerificationStatus::Invalid);
    assert_eq!(result.reason, Some(InvalidReason::RestrictionViolation));

    let presentation = presentation_from(basic_identity_proof(), FABER);
    assert!(match_presentation(&request, &presentation).is_ok());
}

fn presentation_from(requested_proof: Value, issuer_did: &str) -> Presentation {
    presentation(requested_proof, vec![identifier(issuer_did)])
}

#[test]
fn matching_ignores_attribute_order() {
    setup();
    let forward = request(json!({
        "attr_date": {"name": "date", "restrictions": {"issuer_did": FABER}},
        "attr_education": {"name": "degree", "restrictions": {"attr::degree::value": "maths"}}
    }));
    let backward = request(json!({
        "attr_education": {"name": "degree", "restrictions": {"attr::degree::value": "maths"}},
        "attr_date": {"name": "date", "restrictions": {"issuer_did": FABER}}
    }));
    let presentation = presentation_from(
        json!({
            "revealed_attrs": {
                "attr_education": revealed("maths"),
                "attr_date": revealed("05-2018")
            }
        }),
        FABER,
    );
    assert!(match_presentation(&forward, &presentation).is_ok());
    assert!(match_presentation(&backward, &presentation).is_ok());
}

#[test]
fn revealed_value_must_meet_value_restrictions() {
    setup();
    let request = request(json!({
        "attr_education": {"name": "degree", "restrictions": {"attr::degree::value": "maths"}}
    }));
    let presentation = presentation_from(
        json!({"revealed_attrs": {"attr_education": revealed("physics")}}),
        FABER,
    );
    assert!(matches!(
        match_presentation(&request, &presentation),
        Err(Error::RestrictionViolation(_))
    ));
}

#[test]
fn unanswered_referents_are_missing() {
    setup();
    let request = request(json!({
        "attr_date": {"name": "date"},
        "attr_nickname": {"name": "nickname", "self_attest_allowed": true}
    }));
    let presentation = presentation_from(
        json!({"revealed_attrs": {"attr_date": revealed("05-2018")}}),
        FABER,
    );
    assert!(matches!(
        match_presentation(&request, &presentation),
        Err(Error::MissingAttribute(_))
    ));

    let presentation = presentation_from(
        json!({"self_attested_attrs": {"attr_nickname": "Smith"}}),
        FABER,
    );
    assert!(matches!(
        match_presentation(&request, &presentation),
        Err(Error::MissingAttribute(_))
    ));

    let group = request_group_missing_member();
    let presentation = presentation_from(basic_identity_proof(), FABER);
    assert!(matches!(
        match_presentation(&group, &presentation),
        Err(Error::MissingAttribute(_))
    ));
}

fn request_group_missing_member() -> ProofRequest {
    request(json!({
        "attr_basic_identity": {"names": ["name", "last_name", "sex"]}
    }))
}

#[test]
fn revealed_value_wins_over_self_attested_one() {
    setup();
    let request = request(json!({
        "attr_nickname": {"name": "nickname", "self_attest_allowed": true}
    }));
    let presentation = presentation_from(
        json!({
            "revealed_attrs": {"attr_nickname": revealed("Ally")},
            "self_attested_attrs": {"attr_nickname": "Smith"}
        }),
        FABER,
    );
    assert!(match_presentation(&request, &presentation).is_ok());
}

#[test]
fn unrevealed_attributes_need_an_explicit_policy() {
    setup();
    let request = request(json!({"attr_date": {"name": "date"}}));
    let presentation = presentation_from(
        json!({"unrevealed_attrs": {"attr_date": {"sub_proof_index": 0}}}),
        FABER,
    );
    assert!(matches!(
        match_presentation(&request, &presentation),
        Err(Error::InvalidPresentation(_))
    ));
    let policy = MatchPolicy {
        allow_unrevealed: true,
    };
    assert!(match_presentation_with_policy(&request, &presentation, &policy).is_ok());
}

#[test]
fn malformed_presentations_are_rejected() {
    setup();
    let request = request(json!({"attr_date": {"name": "date"}}));
    let mut tampered = revealed("05-2018");
    tampered["encoded"] = json!(encode_attribute("06-2018"));
    let presentation = presentation_from(json!({"revealed_attrs": {"attr_date": tampered}}), FABER);
    assert!(matches!(
        match_presentation(&request, &presentation),
        Err(Error::InvalidPresentation(_))
    ));

    let mut dangling = revealed("05-2018");
    dangling["sub_proof_index"] = json!(1);
    let presentation = presentation_from(json!({"revealed_attrs": {"attr_date": dangling}}), FABER);
    assert!(matches!(
        match_presentation(&request, &presentation),
        Err(Error::InvalidPresentation(_))
    ));

    let presentation = presentation_from(
        json!({
            "revealed_attrs": {"attr_date": revealed("05-2018")},
            "self_attested_attrs": {"attr_extra": "x"}
        }),
        FABER,
    );
    assert!(matches!(
        match_presentation(&request, &presentation),
        Err(Error::InvalidPresentation(_))
    ));
}

#[test]
fn mixed_request_is_answered_from_one_credential() {
    setup();
    let request = ProofRequest::build(proof_request_data_standard(FABER)).unwrap();
    let presentation = presentation_from(
        json!({
            "revealed_attrs": {
                "attr_date": revealed("05-2018"),
                "attr_education": revealed("maths")
            },
            "revealed_attr_groups": {
                "attr_basic_identity": {
                    "sub_proof_index": 0,
                    "values": {
                        "sex": {"raw": "female", "encoded": encode_attribute("female")},
                        "name": {"raw": "alice", "encoded": encode_attribute("alice")},
                        "last_name": {"raw": "clark", "encoded": encode_attribute("clark")}
                    }
                }
            },
            "self_attested_attrs": {"attr_nickname": "Smith"},
            "unrevealed_attrs": {},
            "predicates": {"predicate_is_adult": {"sub_proof_index": 0}}
        }),
        FABER,
    );
    assert!(match_presentation(&request, &presentation).is_ok());

    let without_predicate = presentation_from(
        json!({
            "revealed_attrs": {
                "attr_date": revealed("05-2018"),
                "attr_education": revealed("maths")
            },
            "revealed_attr_groups": basic_identity_group(),
            "self_attested_attrs": {"attr_nickname": "Smith"}
        }),
        FABER,
    );
    assert!(matches!(
        match_presentation(&request, &without_predicate),
        Err(Error::MissingAttribute(_))
    ));
}

fn basic_identity_group() -> Value {
    json!({
        "attr_basic_identity": {
            "sub_proof_index": 0,
            "values": {
                "sex": {"raw": "female", "encoded": encode_attribute("female")},
                "name": {"raw": "alice", "encoded": encode_attribute("alice")},
                "last_name": {"raw": "clark", "encoded": encode_attribute("clark")}
            }
        }
    })
}

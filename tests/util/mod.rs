#![allow(dead_code)]

use maplit::btreemap;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;
use vcx_exchange::prelude::*;

pub fn setup() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn tails_dir() -> PathBuf {
    std::env::temp_dir()
        .join("vcx-exchange-tests")
        .join(random_string(12, rand::thread_rng()))
}

pub fn nickname() -> BTreeMap<String, String> {
    btreemap! {
        "attr_nickname".to_string() => "Smith".to_string(),
    }
}

pub fn proof_request_data_standard(issuer_did: &str) -> ProofRequestData {
    ProofRequestData::from_json(
        &json!({
            "name": "proofForAlice",
            "requested_attributes": {
                "attr_basic_identity": {
                    "names": ["name", "last_name", "sex"],
                    "restrictions": {"$or": [{"issuer_did": issuer_did}]}
                },
                "attr_date": {
                    "name": "date",
                    "restrictions": {"issuer_did": issuer_did}
                },
                "attr_education": {
                    "name": "degree",
                    "restrictions": {"attr::degree::value": "maths"}
                },
                "attr_nickname": {
                    "name": "nickname",
                    "self_attest_allowed": true
                }
            },
            "requested_predicates": {
                "predicate_is_adult": {
                    "name": "age",
                    "p_type": ">=",
                    "p_value": 18,
                    "restrictions": {"$or": [{"issuer_did": issuer_did}]}
                }
            }
        })
        .to_string(),
    )
    .unwrap()
}

pub fn proof_request_data_self_attest() -> ProofRequestData {
    ProofRequestData::from_json(
        &json!({
            "name": "selfAttestedProofForAlice",
            "requested_attributes": {
                "attr_nickname": {
                    "name": "nickname",
                    "self_attest_allowed": true
                }
            }
        })
        .to_string(),
    )
    .unwrap()
}

/// Issue the configured credential from `faber` to `alice`
pub fn issue_credential(faber: &mut Faber, alice: &mut Alice) {
    faber.send_credential_offer().unwrap();
    alice.accept_credential_offer().unwrap();
    faber
        .update_state_credential(IssuerState::RequestReceived)
        .unwrap();
    faber.send_credential().unwrap();
    alice.update_state_credential(HolderState::Finished).unwrap();
    faber.receive_credential_ack().unwrap();
}

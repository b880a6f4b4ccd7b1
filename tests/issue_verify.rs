mod util;

use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use util::*;
use vcx_exchange::prelude::*;

fn verify_with(
    services: &Services,
    request: &ProofRequest,
    presentation: &Presentation,
) -> VcxResult<VerificationResult> {
    let ledger = services.ledger.as_ref();
    let registries = resolve_registry_state(ledger, presentation)?;
    let params = PublicParams::resolve(ledger, presentation)?;
    verify_presentation(
        request,
        presentation,
        &registries,
        &params,
        services.proof_system.as_ref(),
    )
}

fn build_with(services: &Services, alice: &Alice, request: &ProofRequest) -> VcxResult<Presentation> {
    PresentationBuilder::new(
        alice.wallet(),
        services.ledger.as_ref(),
        services.tails.as_ref(),
        services.proof_system.as_ref(),
    )
    .build(request, &nickname())
}

fn no_revocation() -> AgentConfig {
    AgentConfig {
        support_revocation: false,
        ..Default::default()
    }
}

#[test]
fn faber_issues_credential_and_verifies_proof() {
    setup();
    let tails = tails_dir();
    let (mut alice, mut faber) = create_paired_alice_and_faber(AgentConfig::default()).unwrap();
    let issuer_did = faber.get_faber_did().to_string();
    faber.build_ledger_primitives(&tails, 5).unwrap();
    faber.rotate_rev_reg(&tails, 5).unwrap();
    issue_credential(&mut faber, &mut alice);

    let request = faber
        .request_proof_from_alice(proof_request_data_standard(&issuer_did))
        .unwrap();
    let resolver = |_: &str| tails.clone();
    alice
        .send_holder_proof(&request, &resolver, &nickname())
        .unwrap();
    faber
        .update_state_verifier_proof(VerifierState::Finished)
        .unwrap();
    alice
        .update_state_holder_proof(ProverState::Finished)
        .unwrap();

    let info = faber.get_presentation_info().unwrap();
    assert_eq!(
        info.presentation_verification_status,
        PresentationVerificationStatus::Valid
    );
    assert_eq!(
        info.presentation_request_attachment["requested_attributes"],
        json!({
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
        })
    );
    assert_eq!(
        info.presentation_attachment["requested_proof"],
        json!({
            "revealed_attrs": {
                "attr_date": {
                    "sub_proof_index": 0,
                    "raw": "05-2018",
                    "encoded": "101085817956371643310471822530712840836446570298192279302750234554843339322886"
                },
                "attr_education": {
                    "sub_proof_index": 0,
                    "raw": "maths",
                    "encoded": "78137204873448776862705240258723141940757006710839733585634143215803847410018"
                }
            },
            "revealed_attr_groups": {
                "attr_basic_identity": {
                    "sub_proof_index": 0,
                    "values": {
                        "sex": {
                            "raw": "female",
                            "encoded": "71957174156108022857985543806816820198680233386048843176560473245156249119752"
                        },
                        "name": {
                            "raw": "alice",
                            "encoded": "19831138297880367962895005496563562590284654704047651305948751287370224856720"
                        },
                        "last_name": {
                            "raw": "clark",
                            "encoded": "51192516729287562420368242940555165528396706187345387515033121164720912081028"
                        }
                    }
                }
            },
            "self_attested_attrs": {"attr_nickname": "Smith"},
            "unrevealed_attrs": {},
            "predicates": {"predicate_is_adult": {"sub_proof_index": 0}}
        })
    );
    let _ = std::fs::remove_dir_all(tails);
}

#[test]
fn faber_revokes_credential_and_rejects_proof() {
    setup();
    let tails = tails_dir();
    let (mut alice, mut faber) = create_paired_alice_and_faber(AgentConfig::default()).unwrap();
    let issuer_did = faber.get_faber_did().to_string();
    faber.build_ledger_primitives(&tails, 5).unwrap();
    issue_credential(&mut faber, &mut alice);
    faber.revoke_credential().unwrap();

    let request = faber
        .request_proof_from_alice(proof_request_data_standard(&issuer_did))
        .unwrap();
    let resolver = |_: &str| tails.clone();
    alice
        .send_holder_proof(&request, &resolver, &nickname())
        .unwrap();
    faber
        .update_state_verifier_proof(VerifierState::Finished)
        .unwrap();
    alice.update_state_holder_proof(ProverState::Failed).unwrap();

    let info = faber.get_presentation_info().unwrap();
    assert_eq!(
        info.presentation_verification_status,
        PresentationVerificationStatus::Invalid
    );
    let result = faber.verification().unwrap().result().unwrap();
    assert_eq!(result.reason, Some(InvalidReason::Revoked));
    let _ = std::fs::remove_dir_all(tails);
}

#[test]
fn alice_proves_with_self_attested_values_only() {
    setup();
    let (mut alice, mut faber) = create_paired_alice_and_faber(AgentConfig::default()).unwrap();
    let request = faber
        .request_proof_from_alice(proof_request_data_self_attest())
        .unwrap();
    alice
        .send_holder_proof_self_attested(&request, &nickname())
        .unwrap();
    faber
        .update_state_verifier_proof(VerifierState::Finished)
        .unwrap();
    alice
        .update_state_holder_proof(ProverState::Finished)
        .unwrap();

    let info = faber.get_presentation_info().unwrap();
    assert_eq!(
        info.presentation_verification_status,
        PresentationVerificationStatus::Valid
    );
    assert_eq!(
        info.presentation_attachment["requested_proof"],
        json!({
            "revealed_attrs": {},
            "self_attested_attrs": {"attr_nickname": "Smith"},
            "unrevealed_attrs": {},
            "predicates": {}
        })
    );
}

#[test]
fn missing_self_attested_value_fails_the_build() {
    setup();
    let (mut alice, mut faber) = create_paired_alice_and_faber(AgentConfig::default()).unwrap();
    let request = faber
        .request_proof_from_alice(proof_request_data_self_attest())
        .unwrap();
    let res = alice.send_holder_proof_self_attested(&request, &Default::default());
    assert!(matches!(res, Err(Error::MissingAttribute(_))), "{:?}", res);
    assert_eq!(alice.proving().unwrap().state(), ProverState::RequestReceived);
}

#[test]
fn unexpected_state_is_reported() {
    setup();
    let tails = tails_dir();
    let (mut alice, mut faber) = create_paired_alice_and_faber(AgentConfig::default()).unwrap();
    faber.build_ledger_primitives(&tails, 5).unwrap();
    faber.send_credential_offer().unwrap();
    alice.accept_credential_offer().unwrap();
    let res = faber.update_state_credential(IssuerState::Finished);
    assert_eq!(
        res,
        Err(Error::StateMismatch {
            expected: "Finished".to_string(),
            actual: "RequestReceived".to_string(),
        })
    );
    assert_eq!(
        faber.issuance().unwrap().state(),
        IssuerState::RequestReceived
    );
    let _ = std::fs::remove_dir_all(tails);
}

#[test]
fn exhausted_registry_fails_the_exchange() {
    setup();
    let tails = tails_dir();
    let (mut alice, mut faber) = create_paired_alice_and_faber(AgentConfig::default()).unwrap();
    faber.build_ledger_primitives(&tails, 1).unwrap();
    issue_credential(&mut faber, &mut alice);

    faber.send_credential_offer().unwrap();
    alice.accept_credential_offer().unwrap();
    faber
        .update_state_credential(IssuerState::RequestReceived)
        .unwrap();
    let res = faber.send_credential();
    assert!(
        matches!(res, Err(Error::RegistryExhausted { max_creds: 1, .. })),
        "{:?}",
        res
    );
    assert_eq!(faber.issuance().unwrap().state(), IssuerState::Failed);
    alice.update_state_credential(HolderState::Failed).unwrap();
    let _ = std::fs::remove_dir_all(tails);
}

#[test]
fn credentials_without_revocation() {
    setup();
    let config = AgentConfig::from_json(r#"{"support_revocation": false}"#).unwrap();
    let (mut alice, mut faber) = create_paired_alice_and_faber(config).unwrap();
    let issuer_did = faber.get_faber_did().to_string();
    faber.build_ledger_primitives(&tails_dir(), 5).unwrap();
    assert!(faber.registry().is_none());
    issue_credential(&mut faber, &mut alice);
    assert!(!alice.holding().unwrap().is_revokable());
    assert!(matches!(
        faber.revoke_credential(),
        Err(Error::Configuration(_))
    ));

    let request = faber
        .request_proof_from_alice(proof_request_data_standard(&issuer_did))
        .unwrap();
    alice
        .send_holder_proof_self_attested(&request, &nickname())
        .unwrap();
    faber
        .update_state_verifier_proof(VerifierState::Finished)
        .unwrap();
    alice
        .update_state_holder_proof(ProverState::Finished)
        .unwrap();
    let info = faber.get_presentation_info().unwrap();
    assert_eq!(
        info.presentation_verification_status,
        PresentationVerificationStatus::Valid
    );
    assert_eq!(
        info.presentation_attachment["identifiers"][0]["rev_reg_id"],
        serde_json::Value::Null
    );
}

fn verify_forged_credential(signature: &dyn Fn(&[u8]) -> String) -> VerificationResult {
    let (mut alice, mut faber) = create_paired_alice_and_faber(no_revocation()).unwrap();
    let issuer_did = faber.get_faber_did().to_string();
    faber.build_ledger_primitives(&tails_dir(), 5).unwrap();
    let cred_def = faber.cred_def().unwrap().clone();
    let mut raw = AgentConfig::default().credential_values;
    raw.insert("age".to_string(), "99".to_string());
    let values = CredentialValues::from_raw(&raw);
    let payload = Credential::signature_payload(&cred_def.id, None, None, &values);
    let forged = Credential {
        schema_id: cred_def.schema_id.clone(),
        cred_def_id: cred_def.id.clone(),
        rev_reg_id: None,
        values,
        signature: signature(&payload),
        witness: None,
    };
    alice.wallet().store_credential(forged).unwrap();

    let request = faber
        .request_proof_from_alice(proof_request_data_standard(&issuer_did))
        .unwrap();
    alice
        .send_holder_proof_self_attested(&request, &nickname())
        .unwrap();
    faber
        .update_state_verifier_proof(VerifierState::Finished)
        .unwrap();
    alice.update_state_holder_proof(ProverState::Failed).unwrap();
    faber.verification().unwrap().result().unwrap().clone()
}

#[test]
fn credential_not_signed_by_the_issuer_does_not_verify() {
    setup();
    let forger = InMemoryWallet::default();
    let signed_by_forger = |payload: &[u8]| forger.sign(payload).unwrap();
    let garbage = |_: &[u8]| "not-a-signature".to_string();
    for signature in [&signed_by_forger as &dyn Fn(&[u8]) -> String, &garbage] {
        let result = verify_forged_credential(signature);
        assert_eq!(result.status, PresentationVerificationStatus::Invalid);
        assert_eq!(result.reason, Some(InvalidReason::CryptographicFailure));
    }
}

#[test]
fn tampered_presentation_does_not_verify() {
    setup();
    let services = Services::default();
    let (mut alice, mut faber) =
        create_paired_alice_and_faber_with(no_revocation(), services.clone()).unwrap();
    let issuer_did = faber.get_faber_did().to_string();
    faber.build_ledger_primitives(&tails_dir(), 5).unwrap();
    issue_credential(&mut faber, &mut alice);

    let request = ProofRequest::build(proof_request_data_standard(&issuer_did)).unwrap();
    let presentation = build_with(&services, &alice, &request).unwrap();
    assert!(verify_with(&services, &request, &presentation).unwrap().is_valid());

    let mut tampered = presentation.clone();
    let date = tampered
        .requested_proof
        .revealed_attrs
        .get_mut("attr_date")
        .unwrap();
    date.raw = "06-2018".to_string();
    date.encoded = encode_attribute("06-2018");
    let result = verify_with(&services, &request, &tampered).unwrap();
    assert_eq!(result.status, PresentationVerificationStatus::Invalid);
    assert_eq!(result.reason, Some(InvalidReason::CryptographicFailure));

    let mut other_nonce = request.clone();
    other_nonce.nonce = random_nonce(rand::thread_rng());
    let result = verify_with(&services, &other_nonce, &presentation).unwrap();
    assert_eq!(result.reason, Some(InvalidReason::CryptographicFailure));

    let mut undecodable = presentation;
    undecodable.proof = ProofBlob("%%% not a proof".to_string());
    let res = verify_with(&services, &request, &undecodable);
    assert!(matches!(res, Err(Error::CryptoVerification(_))), "{:?}", res);
}

#[test]
fn held_credential_outside_the_restrictions_cannot_answer() {
    setup();
    let (mut alice, mut faber) = create_paired_alice_and_faber(no_revocation()).unwrap();
    faber.build_ledger_primitives(&tails_dir(), 5).unwrap();
    issue_credential(&mut faber, &mut alice);

    let data = ProofRequestData::from_json(
        &json!({
            "name": "proofForAlice",
            "requested_attributes": {
                "attr_date": {"name": "date", "restrictions": {"issuer_did": "7Jw9dYDLtvQ28Jw7pNGkUK"}}
            }
        })
        .to_string(),
    )
    .unwrap();
    let request = faber.request_proof_from_alice(data).unwrap();
    let res = alice.send_holder_proof_self_attested(&request, &nickname());
    assert!(matches!(res, Err(Error::NoMatchingCredential(_))), "{:?}", res);
    assert_eq!(alice.proving().unwrap().state(), ProverState::RequestReceived);
}

#[test]
fn registry_missing_from_the_ledger_is_unavailable() {
    setup();
    let tails = tails_dir();
    let services = Services::default();
    let (mut alice, mut faber) =
        create_paired_alice_and_faber_with(AgentConfig::default(), services.clone()).unwrap();
    let issuer_did = faber.get_faber_did().to_string();
    faber.build_ledger_primitives(&tails, 5).unwrap();
    issue_credential(&mut faber, &mut alice);

    let request = ProofRequest::build(proof_request_data_standard(&issuer_did)).unwrap();
    let presentation = build_with(&services, &alice, &request).unwrap();
    assert!(verify_with(&services, &request, &presentation).unwrap().is_valid());

    let params = PublicParams::resolve(services.ledger.as_ref(), &presentation).unwrap();
    let registries = resolve_registry_state(&InMemoryLedger::new(), &presentation).unwrap();
    let result = verify_presentation(
        &request,
        &presentation,
        &registries,
        &params,
        services.proof_system.as_ref(),
    )
    .unwrap();
    assert_eq!(result.status, PresentationVerificationStatus::Unavailable);
    assert_eq!(result.reason, Some(InvalidReason::RegistryUnavailable));
    let _ = std::fs::remove_dir_all(tails);
}

#[test]
fn credential_of_a_rotated_out_generation_still_verifies() {
    setup();
    let config = AgentConfig {
        tails_dir: tails_dir(),
        ..Default::default()
    };
    let tails = config.tails_dir.clone();
    let (mut alice, mut faber) = create_paired_alice_and_faber(config).unwrap();
    let issuer_did = faber.get_faber_did().to_string();
    faber.build_ledger_primitives_from_config().unwrap();
    issue_credential(&mut faber, &mut alice);
    let issued_under = alice.holding().unwrap().rev_reg_id().unwrap().to_string();
    faber.rotate_rev_reg_from_config().unwrap();
    let active = faber.registry().unwrap().active().unwrap().unwrap();
    assert_ne!(active.rev_reg_id, issued_under);

    let request = faber
        .request_proof_from_alice(proof_request_data_standard(&issuer_did))
        .unwrap();
    alice
        .send_holder_proof_self_attested(&request, &nickname())
        .unwrap();
    faber
        .update_state_verifier_proof(VerifierState::Finished)
        .unwrap();
    alice
        .update_state_holder_proof(ProverState::Finished)
        .unwrap();
    let info = faber.get_presentation_info().unwrap();
    assert_eq!(
        info.presentation_verification_status,
        PresentationVerificationStatus::Valid
    );
    assert_eq!(
        info.presentation_attachment["identifiers"][0]["rev_reg_id"],
        json!(issued_under)
    );
    let _ = std::fs::remove_dir_all(tails);
}

struct FlakyLedger {
    inner: InMemoryLedger,
    down: AtomicBool,
}

impl FlakyLedger {
    fn check(&self) -> VcxResult<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(Error::Storage("ledger down".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Ledger for FlakyLedger {
    fn anchor_schema(&self, schema: &Schema) -> VcxResult<String> {
        self.inner.anchor_schema(schema)
    }

    fn resolve_schema(&self, schema_id: &str) -> VcxResult<Schema> {
        self.inner.resolve_schema(schema_id)
    }

    fn anchor_cred_def(&self, cred_def: &CredentialDefinition) -> VcxResult<String> {
        self.inner.anchor_cred_def(cred_def)
    }

    fn resolve_cred_def(&self, cred_def_id: &str) -> VcxResult<CredentialDefinition> {
        self.check()?;
        self.inner.resolve_cred_def(cred_def_id)
    }

    fn anchor_revocation_registry(&self, def: &RevocationRegistryDefinition) -> VcxResult<String> {
        self.inner.anchor_revocation_registry(def)
    }

    fn resolve_revocation_registry(&self, rev_reg_id: &str) -> VcxResult<RevocationRegistryDefinition> {
        self.inner.resolve_revocation_registry(rev_reg_id)
    }

    fn publish_revocation_status(&self, status: &RevocationStatus) -> VcxResult<()> {
        self.inner.publish_revocation_status(status)
    }

    fn resolve_revocation_statuses(&self, rev_reg_id: &str) -> VcxResult<Vec<RevocationStatus>> {
        self.inner.resolve_revocation_statuses(rev_reg_id)
    }
}

#[test]
fn ledger_failure_during_verification_is_an_error() {
    setup();
    let ledger = Arc::new(FlakyLedger {
        inner: InMemoryLedger::new(),
        down: AtomicBool::new(false),
    });
    let services = Services {
        ledger: ledger.clone(),
        ..Default::default()
    };
    let (mut alice, mut faber) =
        create_paired_alice_and_faber_with(no_revocation(), services).unwrap();
    let issuer_did = faber.get_faber_did().to_string();
    faber.build_ledger_primitives(&tails_dir(), 5).unwrap();
    issue_credential(&mut faber, &mut alice);

    let request = faber
        .request_proof_from_alice(proof_request_data_standard(&issuer_did))
        .unwrap();
    alice
        .send_holder_proof_self_attested(&request, &nickname())
        .unwrap();
    ledger.down.store(true, Ordering::SeqCst);
    let res = faber.update_state_verifier_proof(VerifierState::Finished);
    assert_eq!(res, Err(Error::Storage("ledger down".to_string())));
    assert_eq!(faber.verification().unwrap().state(), VerifierState::Failed);
    assert!(faber.verification().unwrap().result().is_none());
    alice.update_state_holder_proof(ProverState::Failed).unwrap();
}

#[test]
fn unexpected_message_stays_in_the_inbox() {
    setup();
    let (verifier_end, alice_end) = Connection::pair("faber", "alice");
    let mut alice = Alice::new(
        "CnEDk9HrMnmiHXEV1WFgbVCRteYnPqsJwrTdcZaNhFVW",
        Arc::new(InMemoryWallet::default()),
        Services::default(),
        alice_end.clone(),
    );
    let mut verifier = VerifierExchange::new(proof_request_data_self_attest()).unwrap();
    let request = verifier.send_request().unwrap();
    verifier_end.send(&request).unwrap();
    alice
        .send_holder_proof_self_attested(&request.to_json().unwrap(), &nickname())
        .unwrap();
    assert!(alice_end.pending().unwrap().is_empty());

    verifier_end.send(&request).unwrap();
    let res = alice.update_state_holder_proof(ProverState::Finished);
    assert!(matches!(res, Err(Error::UnexpectedState(_))), "{:?}", res);
    assert_eq!(alice.proving().unwrap().state(), ProverState::PresentationSent);
    assert_eq!(alice_end.pending().unwrap(), vec![request]);
}

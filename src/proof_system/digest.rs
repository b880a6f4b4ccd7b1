use super::{ProofBlob, ProofSystem, PublicParams, SubProofRequest};
use crate::credential::{normalize_attr_name, Credential, CredentialValues};
use crate::encoding::is_encoding_of;
use crate::error::Error;
use crate::presentation::{Presentation, RequestedProof};
use crate::proof_request::ProofRequest;
use crate::revocation_registry::RegistryState;
use crate::VcxResult;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, trace};
use merlin::Transcript;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use uint_zigzag::Uint;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
struct DigestPredicate {
    referent: String,
    attr_name: String,
    p_type: String,
    p_value: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
struct DigestSubProof {
    schema_id: String,
    cred_def_id: String,
    rev_reg_id: Option<String>,
    seq_no: Option<u64>,
    accumulator: Option<String>,
    tails_point: Option<String>,
    index: Option<u32>,
    values: CredentialValues,
    signature: String,
    revealed: Vec<String>,
    predicates: Vec<DigestPredicate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
struct DigestProof {
    sub_proofs: Vec<DigestSubProof>,
    challenge: Vec<u8>,
}

/// A proof system that carries each credential with its issuer signature and
/// binds the presentation to its request with a fiat-shamir style transcript.
/// Forged credentials and tampering are detected, but nothing is hidden from
/// the verifier.
#[derive(Copy, Clone, Debug, Default)]
pub struct DigestProofSystem;

impl DigestProofSystem {
    fn challenge(
        request: &ProofRequest,
        sub_proofs: &[DigestSubProof],
        requested_proof: &RequestedProof,
    ) -> VcxResult<[u8; 32]> {
        let mut transcript = Transcript::new(b"vcx presentation");
        transcript.append_message(b"nonce", request.nonce.as_bytes());
        transcript.append_message(b"proof request", &serde_json::to_vec(request)?);
        transcript.append_message(
            b"sub proof length",
            &Uint::from(sub_proofs.len()).to_vec(),
        );
        for sp in sub_proofs {
            let bytes = serde_bare::to_vec(sp).map_err(|e| Error::InvalidJson(e.to_string()))?;
            transcript.append_message(b"sub proof", &bytes);
        }
        transcript.append_message(b"requested proof", &serde_json::to_vec(requested_proof)?);
        let mut okm = [0u8; 32];
        transcript.challenge_bytes(b"challenge bytes", &mut okm);
        Ok(okm)
    }

    fn decode(proof: &ProofBlob) -> VcxResult<DigestProof> {
        let bytes = STANDARD
            .decode(&proof.0)
            .map_err(|e| Error::CryptoVerification(format!("proof is not base64: {}", e)))?;
        serde_bare::from_slice(&bytes)
            .map_err(|e| Error::CryptoVerification(format!("proof cannot be decoded: {}", e)))
    }
}

impl ProofSystem for DigestProofSystem {
    fn prove(
        &self,
        request: &ProofRequest,
        sub_proofs: &[SubProofRequest],
        requested_proof: &RequestedProof,
    ) -> VcxResult<ProofBlob> {
        trace!("prove >>> {} sub proofs", sub_proofs.len());
        let mut proofs = Vec::with_capacity(sub_proofs.len());
        for sp in sub_proofs {
            let credential = &sp.credential;
            let mut revealed = Vec::with_capacity(sp.revealed.len());
            for name in &sp.revealed {
                if credential.values.get(name).is_none() {
                    return Err(Error::MissingAttribute(format!(
                        "'{}' is not an attribute of '{}'",
                        name, credential.cred_def_id
                    )));
                }
                revealed.push(normalize_attr_name(name));
            }
            if credential.witness.is_some() && sp.tails_point.is_none() {
                return Err(Error::Storage(format!(
                    "no tails point for a credential of '{}'",
                    credential.cred_def_id
                )));
            }
            let mut predicates = Vec::with_capacity(sp.predicates.len());
            for (referent, info) in &sp.predicates {
                let satisfied = credential
                    .values
                    .get(&info.name)
                    .map_or(false, |(_, v)| info.is_satisfied_by(&v.raw));
                if !satisfied {
                    return Err(Error::NoMatchingCredential(format!(
                        "credential does not satisfy predicate '{}'",
                        referent
                    )));
                }
                predicates.push(DigestPredicate {
                    referent: referent.clone(),
                    attr_name: normalize_attr_name(&info.name),
                    p_type: info.p_type.to_string(),
                    p_value: info.p_value,
                });
            }
            proofs.push(DigestSubProof {
                schema_id: credential.schema_id.clone(),
                cred_def_id: credential.cred_def_id.clone(),
                rev_reg_id: credential.rev_reg_id.clone(),
                seq_no: credential.witness.as_ref().map(|w| w.seq_no),
                accumulator: credential.witness.as_ref().map(|w| w.accumulator.0.clone()),
                tails_point: sp.tails_point.clone(),
                index: credential.revocation_index(),
                values: credential.values.clone(),
                signature: credential.signature.clone(),
                revealed,
                predicates,
            });
        }
        let challenge = Self::challenge(request, &proofs, requested_proof)?;
        let proof = DigestProof {
            sub_proofs: proofs,
            challenge: challenge.to_vec(),
        };
        let bytes = serde_bare::to_vec(&proof).map_err(|e| Error::InvalidJson(e.to_string()))?;
        Ok(ProofBlob(STANDARD.encode(bytes)))
    }

    fn verify_proof(
        &self,
        request: &ProofRequest,
        presentation: &Presentation,
        params: &PublicParams,
        registries: &RegistryState,
    ) -> VcxResult<bool> {
        let proof = Self::decode(&presentation.proof)?;
        if proof.sub_proofs.len() != presentation.identifiers.len() {
            debug!(
                "proof covers {} credentials, presentation names {}",
                proof.sub_proofs.len(),
                presentation.identifiers.len()
            );
            return Ok(false);
        }
        for (sp, identifier) in proof.sub_proofs.iter().zip(&presentation.identifiers) {
            if sp.schema_id != identifier.schema_id
                || sp.cred_def_id != identifier.cred_def_id
                || sp.rev_reg_id != identifier.rev_reg_id
                || sp.seq_no != identifier.seq_no
            {
                debug!(
                    "sub proof for '{}' does not match its identifier",
                    sp.cred_def_id
                );
                return Ok(false);
            }
            let cred_def = match params.cred_defs.get(&sp.cred_def_id) {
                Some(cred_def) => cred_def,
                None => {
                    debug!("unknown credential definition '{}'", sp.cred_def_id);
                    return Ok(false);
                }
            };
            let payload = Credential::signature_payload(
                &sp.cred_def_id,
                sp.rev_reg_id.as_deref(),
                sp.index,
                &sp.values,
            );
            if !cred_def.verify_signature(&payload, &sp.signature)? {
                debug!("credential of '{}' is not signed by its issuer", sp.cred_def_id);
                return Ok(false);
            }
            if let Some((name, _)) = sp
                .values
                .iter()
                .find(|(_, v)| !is_encoding_of(&v.raw, &v.encoded))
            {
                debug!("'{}' of '{}' is not encoded from its raw value", name, sp.cred_def_id);
                return Ok(false);
            }
            if let (Some(rev_reg_id), Some(seq_no)) = (&sp.rev_reg_id, sp.seq_no) {
                let accumulator = registries
                    .status(rev_reg_id, seq_no)
                    .map(|s| &s.accumulator.0);
                if accumulator != sp.accumulator.as_ref() {
                    debug!("accumulator mismatch for '{}' at {}", rev_reg_id, seq_no);
                    return Ok(false);
                }
            }
        }

        let requested_proof = &presentation.requested_proof;
        let revealed_in = |index: u32, name: &str, encoded: &str| {
            let name = normalize_attr_name(name);
            proof.sub_proofs.get(index as usize).map_or(false, |sp| {
                sp.revealed.contains(&name)
                    && sp.values.get(&name).map_or(false, |(_, v)| v.encoded == encoded)
            })
        };
        for (referent, attr) in &requested_proof.revealed_attrs {
            let name = request
                .requested_attributes
                .get(referent)
                .and_then(|info| info.name.as_deref());
            match name {
                Some(name) if revealed_in(attr.sub_proof_index, name, &attr.encoded) => {}
                _ => return Ok(false),
            }
        }
        for group in requested_proof.revealed_attr_groups.values() {
            for (name, value) in &group.values {
                if !revealed_in(group.sub_proof_index, name, &value.encoded) {
                    return Ok(false);
                }
            }
        }
        for (referent, reference) in &requested_proof.predicates {
            let info = match request.requested_predicates.get(referent) {
                Some(info) => info,
                None => return Ok(false),
            };
            let proven = proof
                .sub_proofs
                .get(reference.sub_proof_index as usize)
                .map_or(false, |sp| {
                    let satisfied = sp
                        .values
                        .get(&info.name)
                        .map_or(false, |(_, v)| info.is_satisfied_by(&v.raw));
                    satisfied
                        && sp.predicates.iter().any(|p| {
                            p.referent == *referent
                                && p.attr_name == normalize_attr_name(&info.name)
                                && p.p_type == info.p_type.to_string()
                                && p.p_value == info.p_value
                        })
                });
            if !proven {
                return Ok(false);
            }
        }

        let challenge = Self::challenge(request, &proof.sub_proofs, requested_proof)?;
        Ok(bool::from(challenge[..].ct_eq(&proof.challenge[..])))
    }
}

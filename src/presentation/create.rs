use super::*;
use crate::credential::Credential;
use crate::error::Error;
use crate::ledger::Ledger;
use crate::proof_request::{ProofRequest, Query};
use crate::proof_system::{ProofSystem, SubProofRequest};
use crate::revocation_registry::{NonRevocationWitness, WitnessUpdate};
use crate::tails::{tails_file_path, TailsStorage};
use crate::wallet::{HeldCredential, Wallet};
use crate::VcxResult;
use indexmap::IndexMap;
use log::{debug, trace, warn};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Maps a revocation registry id to the directory holding its tails
pub type TailsResolver<'a> = &'a dyn Fn(&str) -> PathBuf;

#[derive(Clone, Debug)]
struct Candidate {
    held: HeldCredential,
    witness: Option<NonRevocationWitness>,
    tails_point: Option<String>,
    revoked: bool,
}

/// Builds presentations from the credentials held in a wallet
pub struct PresentationBuilder<'a> {
    wallet: &'a dyn Wallet,
    ledger: &'a dyn Ledger,
    tails: &'a dyn TailsStorage,
    proof_system: &'a dyn ProofSystem,
    tails_resolver: Option<TailsResolver<'a>>,
}

impl<'a> PresentationBuilder<'a> {
    /// Create a new builder
    pub fn new(
        wallet: &'a dyn Wallet,
        ledger: &'a dyn Ledger,
        tails: &'a dyn TailsStorage,
        proof_system: &'a dyn ProofSystem,
    ) -> Self {
        Self {
            wallet,
            ledger,
            tails,
            proof_system,
            tails_resolver: None,
        }
    }

    /// Read tails from the directories given by `resolver` instead of the
    /// location anchored in the registry definition
    pub fn with_tails_resolver(mut self, resolver: TailsResolver<'a>) -> Self {
        self.tails_resolver = Some(resolver);
        self
    }

    /// Answer `request` from held credentials and `self_attested` values keyed by referent
    pub fn build(
        &self,
        request: &ProofRequest,
        self_attested: &BTreeMap<String, String>,
    ) -> VcxResult<Presentation> {
        trace!("build presentation >>> nonce: {}", request.nonce);
        request.validate()?;

        let mut candidates_cache: BTreeMap<String, Candidate> = BTreeMap::new();
        let mut sub_proofs: IndexMap<String, SubProofRequest> = IndexMap::new();
        let mut requested_proof = RequestedProof::default();

        for (referent, info) in &request.requested_attributes {
            let names = info.attr_names();
            let found = self.candidates(info.restrictions.as_ref(), &mut candidates_cache, |c| {
                names.iter().all(|n| c.values.get(n).is_some())
            })?;
            if found.is_empty() {
                if info.allows_self_attest() {
                    let value = self_attested.get(referent).ok_or_else(|| {
                        Error::MissingAttribute(format!(
                            "'{}' has no credential and no self attested value",
                            referent
                        ))
                    })?;
                    requested_proof
                        .self_attested_attrs
                        .insert(referent.clone(), value.clone());
                    continue;
                }
                return Err(Error::NoMatchingCredential(format!(
                    "no credential can reveal '{}'",
                    referent
                )));
            }
            let chosen = pick(found, &sub_proofs);
            let index = sub_proof_index(&mut sub_proofs, &chosen);
            let sub_proof = &mut sub_proofs[index];
            let mut group = BTreeMap::new();
            for name in &names {
                if let Some((key, value)) = chosen.held.credential.values.get(name) {
                    sub_proof.revealed.insert(key.clone());
                    group.insert(name.to_string(), value.clone());
                }
            }
            let sub_proof_index = index as u32;
            if info.is_group() {
                requested_proof.revealed_attr_groups.insert(
                    referent.clone(),
                    RevealedAttrGroup {
                        sub_proof_index,
                        values: group,
                    },
                );
            } else if let Some(value) = group.into_values().next() {
                requested_proof.revealed_attrs.insert(
                    referent.clone(),
                    RevealedAttr {
                        sub_proof_index,
                        raw: value.raw,
                        encoded: value.encoded,
                    },
                );
            }
        }

        for (referent, info) in &request.requested_predicates {
            let found = self.candidates(info.restrictions.as_ref(), &mut candidates_cache, |c| {
                c.values
                    .get(&info.name)
                    .map_or(false, |(_, v)| info.is_satisfied_by(&v.raw))
            })?;
            if found.is_empty() {
                return Err(Error::NoMatchingCredential(format!(
                    "no credential satisfies predicate '{}'",
                    referent
                )));
            }
            let chosen = pick(found, &sub_proofs);
            let index = sub_proof_index(&mut sub_proofs, &chosen);
            sub_proofs[index]
                .predicates
                .push((referent.clone(), info.clone()));
            requested_proof.predicates.insert(
                referent.clone(),
                SubProofReference {
                    sub_proof_index: index as u32,
                },
            );
        }

        let identifiers = sub_proofs
            .values()
            .map(|sp| {
                let c = &sp.credential;
                Identifier {
                    schema_id: c.schema_id.clone(),
                    cred_def_id: c.cred_def_id.clone(),
                    rev_reg_id: c.rev_reg_id.clone(),
                    timestamp: c.witness.as_ref().map(|w| w.timestamp),
                    seq_no: c.witness.as_ref().map(|w| w.seq_no),
                }
            })
            .collect();
        let sub_proofs: Vec<SubProofRequest> = sub_proofs.into_values().collect();
        let proof = self.proof_system.prove(request, &sub_proofs, &requested_proof)?;
        let presentation = Presentation {
            requested_proof,
            identifiers,
            proof,
        };
        debug!(
            "Presentation: {}",
            serde_json::to_string_pretty(&presentation.requested_proof).unwrap_or_default()
        );
        Ok(presentation)
    }

    fn candidates(
        &self,
        restrictions: Option<&Query>,
        cache: &mut BTreeMap<String, Candidate>,
        filter: impl Fn(&Credential) -> bool,
    ) -> VcxResult<Vec<Candidate>> {
        let mut found = Vec::new();
        for held in self.wallet.search_credentials(restrictions)? {
            if !filter(&held.credential) {
                continue;
            }
            if let Some(candidate) = cache.get(&held.referent) {
                found.push(candidate.clone());
                continue;
            }
            let (witness, tails_point, revoked) = self.refresh_witness(&held.credential)?;
            let candidate = Candidate {
                held,
                witness,
                tails_point,
                revoked,
            };
            cache.insert(candidate.held.referent.clone(), candidate.clone());
            found.push(candidate);
        }
        Ok(found)
    }

    fn tails_path(&self, rev_reg_id: &str, tails_hash: &str, location: &str) -> PathBuf {
        match self.tails_resolver {
            Some(resolver) => tails_file_path(&resolver(rev_reg_id), tails_hash),
            None => Path::new(location).to_path_buf(),
        }
    }

    // A revoked credential cannot advance its witness and keeps its last valid status
    fn refresh_witness(
        &self,
        credential: &Credential,
    ) -> VcxResult<(Option<NonRevocationWitness>, Option<String>, bool)> {
        let mut witness = match &credential.witness {
            Some(w) => w.clone(),
            None => return Ok((None, None, false)),
        };
        let definition = self
            .ledger
            .resolve_revocation_registry(&witness.rev_reg_id)?;
        let path = self.tails_path(
            &witness.rev_reg_id,
            &definition.tails_hash,
            &definition.tails_location,
        );
        let tails = self.tails.read_tails(&path)?;
        if tails.hash() != definition.tails_hash {
            return Err(Error::Storage(format!(
                "tails at '{}' do not belong to '{}'",
                path.display(),
                witness.rev_reg_id
            )));
        }
        let tails_point = witness.tails_point(&tails)?.to_string();
        let statuses = self
            .ledger
            .resolve_revocation_statuses(&witness.rev_reg_id)?;
        let revoked = witness.update(&statuses)? == WitnessUpdate::Revoked;
        if revoked {
            warn!(
                "credential {} of '{}' is revoked",
                witness.index, witness.rev_reg_id
            );
        }
        Ok((Some(witness), Some(tails_point), revoked))
    }
}

// Prefer credentials that are not revoked, then ones already in the presentation
fn pick(mut found: Vec<Candidate>, sub_proofs: &IndexMap<String, SubProofRequest>) -> Candidate {
    found.sort_by_key(|c| (c.revoked, !sub_proofs.contains_key(&c.held.referent)));
    found.swap_remove(0)
}

fn sub_proof_index(sub_proofs: &mut IndexMap<String, SubProofRequest>, chosen: &Candidate) -> usize {
    if let Some(index) = sub_proofs.get_index_of(&chosen.held.referent) {
        return index;
    }
    let mut credential = chosen.held.credential.clone();
    credential.witness = chosen.witness.clone();
    let (index, _) = sub_proofs.insert_full(
        chosen.held.referent.clone(),
        SubProofRequest {
            credential,
            revealed: BTreeSet::new(),
            predicates: Vec::new(),
            tails_point: chosen.tails_point.clone(),
        },
    );
    index
}

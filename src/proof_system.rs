mod digest;

pub use digest::*;

use crate::credential::{Credential, CredentialDefinition, Schema};
use crate::error::Error;
use crate::ledger::Ledger;
use crate::presentation::{Presentation, RequestedProof};
use crate::proof_request::{PredicateInfo, ProofRequest};
use crate::revocation_registry::RegistryState;
use crate::VcxResult;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// An opaque proof produced by a [`ProofSystem`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ProofBlob(pub String);

/// What one credential contributes to a presentation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubProofRequest {
    /// The credential, with its witness brought up to date
    pub credential: Credential,
    /// The credential attribute names that are revealed
    pub revealed: BTreeSet<String>,
    /// The predicates proven from this credential by referent
    pub predicates: Vec<(String, PredicateInfo)>,
    /// The tails point of the credential's registry index
    pub tails_point: Option<String>,
}

/// Public ledger data a verifier checks proofs against
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PublicParams {
    /// Schemas by id
    pub schemas: BTreeMap<String, Schema>,
    /// Credential definitions by id
    pub cred_defs: BTreeMap<String, CredentialDefinition>,
}

impl PublicParams {
    /// Resolve everything `presentation` refers to. Objects the ledger does
    /// not know are left out. Other ledger failures are returned.
    pub fn resolve(ledger: &dyn Ledger, presentation: &Presentation) -> VcxResult<Self> {
        let mut params = Self::default();
        for identifier in &presentation.identifiers {
            match ledger.resolve_schema(&identifier.schema_id) {
                Ok(schema) => {
                    params.schemas.insert(schema.id.clone(), schema);
                }
                Err(Error::NotFound(m)) => debug!("schema not resolved: {}", m),
                Err(e) => return Err(e),
            }
            match ledger.resolve_cred_def(&identifier.cred_def_id) {
                Ok(cred_def) => {
                    params.cred_defs.insert(cred_def.id.clone(), cred_def);
                }
                Err(Error::NotFound(m)) => debug!("credential definition not resolved: {}", m),
                Err(e) => return Err(e),
            }
        }
        Ok(params)
    }
}

/// The cryptographic backend that proves and verifies presentations
pub trait ProofSystem: Send + Sync {
    /// Prove `requested_proof` from the credentials in `sub_proofs`
    fn prove(
        &self,
        request: &ProofRequest,
        sub_proofs: &[SubProofRequest],
        requested_proof: &RequestedProof,
    ) -> VcxResult<ProofBlob>;

    /// Check the proof of `presentation`.
    ///
    /// Returns `Ok(false)` for a proof that does not verify and an error for one
    /// that cannot be decoded.
    fn verify_proof(
        &self,
        request: &ProofRequest,
        presentation: &Presentation,
        params: &PublicParams,
        registries: &RegistryState,
    ) -> VcxResult<bool>;
}

mod in_memory;

pub use in_memory::*;

use crate::credential::{Credential, CredentialOffer, CredentialRequest};
use crate::proof_request::Query;
use crate::VcxResult;

/// A credential held in a wallet, with its wallet referent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeldCredential {
    /// The wallet id of the credential
    pub referent: String,
    /// The credential
    pub credential: Credential,
}

/// Secure storage for keys and credentials
pub trait Wallet: Send + Sync {
    /// The key verifiers use to check this wallet's signatures
    fn verification_key(&self) -> VcxResult<String>;
    /// Sign `payload`
    fn sign(&self, payload: &[u8]) -> VcxResult<String>;
    /// Answer an offer with a request bound to the holder's link secret
    fn create_credential_request(
        &self,
        prover_did: &str,
        offer: &CredentialOffer,
    ) -> VcxResult<CredentialRequest>;
    /// Store a credential and return its referent
    fn store_credential(&self, credential: Credential) -> VcxResult<String>;
    /// Fetch a credential by referent
    fn get_credential(&self, referent: &str) -> VcxResult<Credential>;
    /// Every credential matching `query`, or all credentials without one
    fn search_credentials(&self, query: Option<&Query>) -> VcxResult<Vec<HeldCredential>>;
    /// Remove a credential
    fn delete_credential(&self, referent: &str) -> VcxResult<()>;
}

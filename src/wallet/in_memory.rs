use super::{HeldCredential, Wallet};
use crate::credential::{Credential, CredentialOffer, CredentialRequest};
use crate::error::Error;
use crate::proof_request::Query;
use crate::signature::{self, SigningKey};
use crate::utils::sha256;
use crate::{random_nonce, VcxResult};
use indexmap::IndexMap;
use log::{debug, trace};
use rand_core::{CryptoRng, RngCore};
use std::sync::RwLock;
use zeroize::Zeroize;

/// Link secret material that is wiped on drop
struct SecretBytes([u8; 32]);

impl SecretBytes {
    fn random(mut rng: impl RngCore) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }
}

impl Drop for SecretBytes {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// A wallet held in process memory
pub struct InMemoryWallet {
    signing_key: SigningKey,
    link_secret: SecretBytes,
    credentials: RwLock<IndexMap<String, Credential>>,
}

impl std::fmt::Debug for InMemoryWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryWallet")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryWallet {
    fn default() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl InMemoryWallet {
    /// Create a wallet with fresh keys
    pub fn new(mut rng: impl RngCore + CryptoRng) -> Self {
        Self {
            signing_key: signature::new_signing_key(&mut rng),
            link_secret: SecretBytes::random(&mut rng),
            credentials: RwLock::new(IndexMap::new()),
        }
    }
}

impl Wallet for InMemoryWallet {
    fn verification_key(&self) -> VcxResult<String> {
        signature::verification_key(&self.signing_key)
    }

    fn sign(&self, payload: &[u8]) -> VcxResult<String> {
        signature::sign(&self.signing_key, payload)
    }

    fn create_credential_request(
        &self,
        prover_did: &str,
        offer: &CredentialOffer,
    ) -> VcxResult<CredentialRequest> {
        trace!("create_credential_request >>> cred_def_id: {}", offer.cred_def_id);
        let mut data = self.link_secret.0.to_vec();
        data.extend_from_slice(offer.nonce.as_bytes());
        let request = CredentialRequest {
            prover_did: prover_did.to_string(),
            cred_def_id: offer.cred_def_id.clone(),
            blinded_link_secret: hex::encode(sha256(&data)),
            offer_nonce: offer.nonce.clone(),
            nonce: random_nonce(rand::thread_rng()),
        };
        Ok(request)
    }

    fn store_credential(&self, credential: Credential) -> VcxResult<String> {
        let referent = uuid::Uuid::new_v4().to_string();
        debug!(
            "storing credential {} for '{}'",
            referent, credential.cred_def_id
        );
        self.credentials
            .write()?
            .insert(referent.clone(), credential);
        Ok(referent)
    }

    fn get_credential(&self, referent: &str) -> VcxResult<Credential> {
        self.credentials
            .read()?
            .get(referent)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("credential '{}'", referent)))
    }

    fn search_credentials(&self, query: Option<&Query>) -> VcxResult<Vec<HeldCredential>> {
        let credentials = self.credentials.read()?;
        Ok(credentials
            .iter()
            .filter(|(_, c)| query.map_or(true, |q| q.matches(&c.tags())))
            .map(|(referent, credential)| HeldCredential {
                referent: referent.clone(),
                credential: credential.clone(),
            })
            .collect())
    }

    fn delete_credential(&self, referent: &str) -> VcxResult<()> {
        self.credentials
            .write()?
            .shift_remove(referent)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("credential '{}'", referent)))
    }
}

use super::Schema;
use crate::signature;
use crate::VcxResult;
use log::debug;
use serde::{Deserialize, Serialize};

/// The public credential definition an issuer signs with
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CredentialDefinition {
    /// The unique identifier
    pub id: String,
    /// The schema signed under this definition
    pub schema_id: String,
    /// The issuer's did
    pub issuer_did: String,
    /// Distinguishes several definitions for the same schema
    pub tag: String,
    /// Whether credentials must be issued against a revocation registry
    pub support_revocation: bool,
    /// Hex encoded BLS public key of the issuer
    pub verification_key: String,
}

impl CredentialDefinition {
    /// Create a credential definition for `schema`
    pub fn new(
        issuer_did: &str,
        schema: &Schema,
        tag: &str,
        support_revocation: bool,
        verification_key: String,
    ) -> Self {
        let cred_def = Self {
            id: cred_def_id(issuer_did, &schema.id, tag),
            schema_id: schema.id.clone(),
            issuer_did: issuer_did.to_string(),
            tag: tag.to_string(),
            support_revocation,
            verification_key,
        };
        debug!(
            "Credential Definition: {}",
            serde_json::to_string_pretty(&cred_def).unwrap_or_default()
        );
        cred_def
    }

    /// Check an issuer signature over `payload`
    pub fn verify_signature(&self, payload: &[u8], signature: &str) -> VcxResult<bool> {
        signature::verify(&self.verification_key, payload, signature)
    }
}

/// Build a credential definition id
pub fn cred_def_id(issuer_did: &str, schema_id: &str, tag: &str) -> String {
    format!("{}:3:CL:{}:{}", issuer_did, schema_id, tag)
}

/// Build a revocation registry id
pub fn rev_reg_id(cred_def_id: &str, tag: &str) -> String {
    format!(
        "{}:4:{}:CL_ACCUM:{}",
        issuer_did_from_id(cred_def_id),
        cred_def_id,
        tag
    )
}

/// The did that prefixes every ledger identifier
pub fn issuer_did_from_id(id: &str) -> &str {
    id.split(':').next().unwrap_or(id)
}

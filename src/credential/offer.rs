use super::CredentialValues;
use crate::random_nonce;
use serde::{Deserialize, Serialize};

/// A credential offer from the issuer to the holder
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CredentialOffer {
    /// The schema of the offered credential
    pub schema_id: String,
    /// The credential definition that will sign
    pub cred_def_id: String,
    /// The registry the credential will be issued under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev_reg_id: Option<String>,
    /// The values that will be signed
    pub values: CredentialValues,
    /// The nonce the request must echo
    pub nonce: String,
}

impl CredentialOffer {
    /// Create a new offer
    pub fn new(
        schema_id: &str,
        cred_def_id: &str,
        rev_reg_id: Option<&str>,
        values: CredentialValues,
    ) -> Self {
        Self {
            schema_id: schema_id.to_string(),
            cred_def_id: cred_def_id.to_string(),
            rev_reg_id: rev_reg_id.map(str::to_string),
            values,
            nonce: random_nonce(rand::thread_rng()),
        }
    }
}

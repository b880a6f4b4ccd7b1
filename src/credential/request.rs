use serde::{Deserialize, Serialize};

/// A holder's request for the offered credential
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CredentialRequest {
    /// The holder's did
    pub prover_did: String,
    /// The credential definition from the offer
    pub cred_def_id: String,
    /// Commitment to the holder's link secret, bound to the offer nonce
    pub blinded_link_secret: String,
    /// The nonce of the offer being answered
    pub offer_nonce: String,
    /// A fresh nonce from the holder
    pub nonce: String,
}

use super::{new_message_id, Attachment, Thread};
use crate::credential::{Credential, CredentialOffer, CredentialRequest};
use crate::VcxResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Offers a credential to a holder
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct OfferCredential {
    /// The message id
    #[serde(rename = "@id")]
    pub id: String,
    /// The exchange thread
    #[serde(rename = "~thread")]
    pub thread: Thread,
    /// The raw values that will be signed
    pub credential_preview: BTreeMap<String, String>,
    /// The encoded [`CredentialOffer`]
    #[serde(rename = "offers~attach")]
    pub offers_attach: Attachment,
}

impl OfferCredential {
    /// Wrap `offer`
    pub fn new(thid: &str, offer: &CredentialOffer) -> VcxResult<Self> {
        Ok(Self {
            id: new_message_id(),
            thread: Thread::new(thid),
            credential_preview: offer.values.raw_values(),
            offers_attach: Attachment::encode("libindy-cred-offer-0", offer)?,
        })
    }

    /// The attached offer
    pub fn offer(&self) -> VcxResult<CredentialOffer> {
        self.offers_attach.decode()
    }
}

/// Requests the offered credential
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RequestCredential {
    /// The message id
    #[serde(rename = "@id")]
    pub id: String,
    /// The exchange thread
    #[serde(rename = "~thread")]
    pub thread: Thread,
    /// The encoded [`CredentialRequest`]
    #[serde(rename = "requests~attach")]
    pub requests_attach: Attachment,
}

impl RequestCredential {
    /// Wrap `request`
    pub fn new(thid: &str, request: &CredentialRequest) -> VcxResult<Self> {
        Ok(Self {
            id: new_message_id(),
            thread: Thread::new(thid),
            requests_attach: Attachment::encode("libindy-cred-request-0", request)?,
        })
    }

    /// The attached request
    pub fn request(&self) -> VcxResult<CredentialRequest> {
        self.requests_attach.decode()
    }
}

/// Delivers the signed credential
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct IssueCredential {
    /// The message id
    #[serde(rename = "@id")]
    pub id: String,
    /// The exchange thread
    #[serde(rename = "~thread")]
    pub thread: Thread,
    /// The encoded [`Credential`]
    #[serde(rename = "credentials~attach")]
    pub credentials_attach: Attachment,
}

impl IssueCredential {
    /// Wrap `credential`
    pub fn new(thid: &str, credential: &Credential) -> VcxResult<Self> {
        Ok(Self {
            id: new_message_id(),
            thread: Thread::new(thid),
            credentials_attach: Attachment::encode("libindy-cred-0", credential)?,
        })
    }

    /// The attached credential
    pub fn credential(&self) -> VcxResult<Credential> {
        self.credentials_attach.decode()
    }
}

/// Acknowledges the last message of an exchange
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Ack {
    /// The message id
    #[serde(rename = "@id")]
    pub id: String,
    /// The exchange thread
    #[serde(rename = "~thread")]
    pub thread: Thread,
    /// Always `OK`
    pub status: String,
}

impl Ack {
    /// An ack for exchange `thid`
    pub fn new(thid: &str) -> Self {
        Self {
            id: new_message_id(),
            thread: Thread::new(thid),
            status: "OK".to_string(),
        }
    }
}

mod attribute;
mod restriction;

pub use attribute::*;
pub use restriction::*;

use crate::error::Error;
use crate::utils::{deserialize_indexmap, serialize_indexmap};
use crate::{random_nonce, VcxResult};
use chrono::Utc;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

const DEFAULT_VERSION: &str = "1.0";

/// The data a verifier supplies to build a proof request
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProofRequestData {
    /// A friendly name for the request
    #[serde(default)]
    pub name: String,
    /// The requested attributes by referent
    #[serde(
        default,
        serialize_with = "serialize_indexmap",
        deserialize_with = "deserialize_indexmap"
    )]
    pub requested_attributes: IndexMap<String, AttributeInfo>,
    /// The requested predicates by referent
    #[serde(
        default,
        serialize_with = "serialize_indexmap",
        deserialize_with = "deserialize_indexmap"
    )]
    pub requested_predicates: IndexMap<String, PredicateInfo>,
    /// When non-revocation must hold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_revoked: Option<NonRevokedInterval>,
}

impl ProofRequestData {
    /// Parse request data from json
    pub fn from_json(json: &str) -> VcxResult<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidProofRequest(e.to_string()))
    }
}

/// A request for a presentation. Immutable once sent.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProofRequest {
    /// Binds the presentation to this request
    pub nonce: String,
    /// A friendly name for the request
    pub name: String,
    /// The request version
    pub version: String,
    /// The requested attributes by referent
    #[serde(
        serialize_with = "serialize_indexmap",
        deserialize_with = "deserialize_indexmap"
    )]
    pub requested_attributes: IndexMap<String, AttributeInfo>,
    /// The requested predicates by referent
    #[serde(
        serialize_with = "serialize_indexmap",
        deserialize_with = "deserialize_indexmap"
    )]
    pub requested_predicates: IndexMap<String, PredicateInfo>,
    /// When non-revocation must hold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_revoked: Option<NonRevokedInterval>,
}

impl ProofRequest {
    /// Build and validate a request with a fresh nonce
    pub fn build(data: ProofRequestData) -> VcxResult<Self> {
        let non_revoked = data.non_revoked.unwrap_or(NonRevokedInterval {
            from: None,
            to: Some(Utc::now().timestamp()),
        });
        let request = Self {
            nonce: random_nonce(rand::thread_rng()),
            name: data.name,
            version: DEFAULT_VERSION.to_string(),
            requested_attributes: data.requested_attributes,
            requested_predicates: data.requested_predicates,
            non_revoked: Some(non_revoked),
        };
        request.validate()?;
        debug!(
            "Proof Request: {}",
            serde_json::to_string_pretty(&request).unwrap_or_default()
        );
        Ok(request)
    }

    /// Parse a request received from a verifier
    pub fn from_json(json: &str) -> VcxResult<Self> {
        let request: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidProofRequest(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    /// Check the request is well formed
    pub fn validate(&self) -> VcxResult<()> {
        if self.nonce.is_empty() {
            return Err(Error::InvalidProofRequest("missing nonce".to_string()));
        }
        if self.requested_attributes.is_empty() && self.requested_predicates.is_empty() {
            return Err(Error::InvalidProofRequest(
                "nothing is requested".to_string(),
            ));
        }
        for (referent, info) in &self.requested_attributes {
            info.validate(referent)?;
        }
        for (referent, info) in &self.requested_predicates {
            if self.requested_attributes.contains_key(referent) {
                return Err(Error::InvalidProofRequest(format!(
                    "'{}' is both an attribute and a predicate referent",
                    referent
                )));
            }
            if info.name.is_empty() {
                return Err(Error::InvalidProofRequest(format!(
                    "predicate '{}' has no attribute name",
                    referent
                )));
            }
        }
        Ok(())
    }
}

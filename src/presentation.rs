mod create;
mod matcher;
mod result;
mod verify;

pub use create::*;
pub use matcher::*;
pub use result::*;
pub use verify::*;

use crate::credential::AttributeValue;
use crate::proof_system::ProofBlob;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A revealed single attribute
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RevealedAttr {
    /// The credential the value comes from
    pub sub_proof_index: u32,
    /// The raw value
    pub raw: String,
    /// The encoded value
    pub encoded: String,
}

/// Several attributes revealed from one credential
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RevealedAttrGroup {
    /// The credential the values come from
    pub sub_proof_index: u32,
    /// The values by requested attribute name
    pub values: BTreeMap<String, AttributeValue>,
}

/// Points at the credential proving an unrevealed attribute or predicate
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubProofReference {
    /// The credential index in the presentation
    pub sub_proof_index: u32,
}

/// What the presentation discloses for each requested referent
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RequestedProof {
    /// Revealed single attributes
    #[serde(default)]
    pub revealed_attrs: BTreeMap<String, RevealedAttr>,
    /// Revealed attribute groups
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub revealed_attr_groups: BTreeMap<String, RevealedAttrGroup>,
    /// Values stated by the prover without a credential
    #[serde(default)]
    pub self_attested_attrs: BTreeMap<String, String>,
    /// Attributes proven but not disclosed
    #[serde(default)]
    pub unrevealed_attrs: BTreeMap<String, SubProofReference>,
    /// Proven predicates
    #[serde(default)]
    pub predicates: BTreeMap<String, SubProofReference>,
}

/// The public identifiers of one credential used in a presentation
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Identifier {
    /// The credential schema
    pub schema_id: String,
    /// The credential definition
    pub cred_def_id: String,
    /// The registry the credential was issued under
    pub rev_reg_id: Option<String>,
    /// The timestamp of the registry status non-revocation was proven against
    pub timestamp: Option<i64>,
    /// The sequence number of that status
    pub seq_no: Option<u64>,
}

/// A prover's answer to a proof request
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Presentation {
    /// What is disclosed
    pub requested_proof: RequestedProof,
    /// One entry per credential used
    pub identifiers: Vec<Identifier>,
    /// The cryptographic proof
    pub proof: ProofBlob,
}

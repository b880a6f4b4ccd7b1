mod definition;
mod offer;
mod request;
mod schema;
mod values;

pub use definition::*;
pub use offer::*;
pub use request::*;
pub use schema::*;
pub use values::*;

use crate::revocation_registry::NonRevocationWitness;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uint_zigzag::Uint;

/// Restriction tag for the schema id
pub const TAG_SCHEMA_ID: &str = "schema_id";
/// Restriction tag for the schema issuer did
pub const TAG_SCHEMA_ISSUER_DID: &str = "schema_issuer_did";
/// Restriction tag for the schema name
pub const TAG_SCHEMA_NAME: &str = "schema_name";
/// Restriction tag for the schema version
pub const TAG_SCHEMA_VERSION: &str = "schema_version";
/// Restriction tag for the issuer did
pub const TAG_ISSUER_DID: &str = "issuer_did";
/// Restriction tag for the credential definition id
pub const TAG_CRED_DEF_ID: &str = "cred_def_id";
/// Restriction tag for the revocation registry id
pub const TAG_REV_REG_ID: &str = "rev_reg_id";

/// A signed credential held by a holder
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Credential {
    /// The schema this credential conforms to
    pub schema_id: String,
    /// The credential definition used to sign
    pub cred_def_id: String,
    /// The revocation registry the credential was issued under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev_reg_id: Option<String>,
    /// The signed attribute values
    pub values: CredentialValues,
    /// The issuer signature over the values
    pub signature: String,
    /// The non-revocation witness for revocable credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witness: Option<NonRevocationWitness>,
}

impl Credential {
    /// The bytes the issuer signs
    pub fn signature_payload(
        cred_def_id: &str,
        rev_reg_id: Option<&str>,
        index: Option<u32>,
        values: &CredentialValues,
    ) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(cred_def_id.as_bytes());
        payload.push(0);
        if let (Some(rev_reg_id), Some(index)) = (rev_reg_id, index) {
            payload.extend_from_slice(rev_reg_id.as_bytes());
            payload.extend_from_slice(&Uint::from(index).to_vec());
        }
        payload.extend_from_slice(&Uint::from(values.len()).to_vec());
        for (name, value) in values.iter() {
            payload.extend_from_slice(name.as_bytes());
            payload.push(0);
            payload.extend_from_slice(value.encoded.as_bytes());
            payload.push(0);
        }
        payload
    }

    /// The issuer did taken from the credential definition id
    pub fn issuer_did(&self) -> &str {
        issuer_did_from_id(&self.cred_def_id)
    }

    /// The registry index of this credential, if revocable
    pub fn revocation_index(&self) -> Option<u32> {
        self.witness.as_ref().map(|w| w.index)
    }

    /// The tags used to evaluate restriction queries against this credential
    pub fn tags(&self) -> BTreeMap<String, String> {
        let mut tags = identifier_tags(
            &self.schema_id,
            &self.cred_def_id,
            self.rev_reg_id.as_deref(),
        );
        for (name, value) in self.values.iter() {
            tags.insert(attr_value_tag(name), value.raw.clone());
            tags.insert(attr_marker_tag(name), "1".to_string());
        }
        tags
    }
}

/// The tag naming an attribute value
pub fn attr_value_tag(name: &str) -> String {
    format!("attr::{}::value", normalize_attr_name(name))
}

/// The tag marking an attribute as present
pub fn attr_marker_tag(name: &str) -> String {
    format!("attr::{}::marker", normalize_attr_name(name))
}

/// Attribute names are matched case and whitespace insensitively
pub fn normalize_attr_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// The tags derivable from a credential's public identifiers
pub fn identifier_tags(
    schema_id: &str,
    cred_def_id: &str,
    rev_reg_id: Option<&str>,
) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    tags.insert(TAG_SCHEMA_ID.to_string(), schema_id.to_string());
    if let Some((issuer, name, version)) = parse_schema_id(schema_id) {
        tags.insert(TAG_SCHEMA_ISSUER_DID.to_string(), issuer.to_string());
        tags.insert(TAG_SCHEMA_NAME.to_string(), name.to_string());
        tags.insert(TAG_SCHEMA_VERSION.to_string(), version.to_string());
    }
    tags.insert(
        TAG_ISSUER_DID.to_string(),
        issuer_did_from_id(cred_def_id).to_string(),
    );
    tags.insert(TAG_CRED_DEF_ID.to_string(), cred_def_id.to_string());
    if let Some(rev_reg_id) = rev_reg_id {
        tags.insert(TAG_REV_REG_ID.to_string(), rev_reg_id.to_string());
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_cover_identifiers_and_attributes() {
        let values = CredentialValues::from_raw([("Degree", "maths")]);
        let credential = Credential {
            schema_id: schema_id("V4SGRU86Z58d6TV7PBUe6f", "FaberVcx", "1.0"),
            cred_def_id: cred_def_id(
                "V4SGRU86Z58d6TV7PBUe6f",
                "V4SGRU86Z58d6TV7PBUe6f:2:FaberVcx:1.0",
                "tag1",
            ),
            rev_reg_id: None,
            values,
            signature: String::new(),
            witness: None,
        };
        let tags = credential.tags();
        assert_eq!(tags[TAG_ISSUER_DID], "V4SGRU86Z58d6TV7PBUe6f");
        assert_eq!(tags[TAG_SCHEMA_NAME], "FaberVcx");
        assert_eq!(tags[TAG_SCHEMA_VERSION], "1.0");
        assert_eq!(tags["attr::degree::value"], "maths");
        assert_eq!(tags["attr::degree::marker"], "1");
        assert!(!tags.contains_key(TAG_REV_REG_ID));
    }
}

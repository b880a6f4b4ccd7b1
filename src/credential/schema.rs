use crate::{error::Error, VcxResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A credential schema anchored on the ledger
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Schema {
    /// The unique identifier for this schema
    pub id: String,
    /// The did that anchored the schema
    pub issuer_did: String,
    /// Friendly name
    pub name: String,
    /// Schema version
    pub version: String,
    /// The attribute names a credential of this schema carries
    pub attr_names: Vec<String>,
}

impl Schema {
    /// Create a new schema
    pub fn new(issuer_did: &str, name: &str, version: &str, attr_names: &[&str]) -> VcxResult<Self> {
        if attr_names.is_empty() {
            return Err(Error::Configuration(
                "a schema needs at least one attribute".to_string(),
            ));
        }
        let mut seen = BTreeSet::new();
        for a in attr_names {
            if !seen.insert(super::normalize_attr_name(a)) {
                return Err(Error::Configuration(format!(
                    "duplicate schema attribute '{}'",
                    a
                )));
            }
        }
        let schema = Self {
            id: schema_id(issuer_did, name, version),
            issuer_did: issuer_did.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            attr_names: attr_names.iter().map(|a| a.to_string()).collect(),
        };
        debug!(
            "Schema: {}",
            serde_json::to_string_pretty(&schema).unwrap_or_default()
        );
        Ok(schema)
    }
}

/// Build a schema id
pub fn schema_id(issuer_did: &str, name: &str, version: &str) -> String {
    format!("{}:2:{}:{}", issuer_did, name, version)
}

/// Split a schema id into issuer did, name and version
pub fn parse_schema_id(id: &str) -> Option<(&str, &str, &str)> {
    let mut parts = id.splitn(4, ':');
    let issuer = parts.next()?;
    if parts.next()? != "2" {
        return None;
    }
    let name = parts.next()?;
    let version = parts.next()?;
    Some((issuer, name, version))
}

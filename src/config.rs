use crate::error::Error;
use crate::VcxResult;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for a pair of issuing and holding parties.
///
/// Every field has a default so a partial json document is enough.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Label of the issuer and verifier party
    pub issuer_name: String,
    /// Label of the holder and prover party
    pub holder_name: String,
    /// The issuer did, generated when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_did: Option<String>,
    /// The holder did, generated when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_did: Option<String>,
    /// Name of the anchored schema
    pub schema_name: String,
    /// Version of the anchored schema
    pub schema_version: String,
    /// Attributes of the anchored schema
    pub schema_attrs: Vec<String>,
    /// Tag of the credential definition
    pub cred_def_tag: String,
    /// Whether credentials are issued against a revocation registry
    pub support_revocation: bool,
    /// Where tails files are written
    pub tails_dir: PathBuf,
    /// Capacity of each registry generation
    pub max_creds: u32,
    /// The raw values of offered credentials
    pub credential_values: BTreeMap<String, String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let credential_values: BTreeMap<String, String> = [
            ("name", "alice"),
            ("last_name", "clark"),
            ("sex", "female"),
            ("date", "05-2018"),
            ("degree", "maths"),
            ("age", "25"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            issuer_name: "faber".to_string(),
            holder_name: "alice".to_string(),
            issuer_did: None,
            holder_did: None,
            schema_name: "FaberVcx".to_string(),
            schema_version: "1.0".to_string(),
            schema_attrs: credential_values.keys().cloned().collect(),
            cred_def_tag: "DemoCredential123".to_string(),
            support_revocation: true,
            tails_dir: std::env::temp_dir().join("vcx-exchange-tails"),
            max_creds: 5,
            credential_values,
        }
    }
}

impl AgentConfig {
    /// Parse a configuration from json
    pub fn from_json(json: &str) -> VcxResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        debug!(
            "Agent Config: {}",
            serde_json::to_string_pretty(&config).unwrap_or_default()
        );
        Ok(config)
    }

    /// Read a json configuration file
    pub fn from_file(path: &Path) -> VcxResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Check the settings are usable
    pub fn validate(&self) -> VcxResult<()> {
        if self.schema_attrs.is_empty() {
            return Err(Error::Configuration(
                "schema_attrs must name at least one attribute".to_string(),
            ));
        }
        if self.support_revocation && self.max_creds == 0 {
            return Err(Error::Configuration(
                "max_creds must be positive when revocation is supported".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AgentConfig::from_json(r#"{"issuer_name": "acme", "max_creds": 10}"#).unwrap();
        assert_eq!(config.issuer_name, "acme");
        assert_eq!(config.max_creds, 10);
        assert_eq!(config.holder_name, "alice");
        assert_eq!(config.credential_values["degree"], "maths");
        assert_eq!(config.schema_attrs.len(), 6);
        assert!(config.support_revocation);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let res = AgentConfig::from_json(r#"{"max_creds": 0}"#);
        assert!(matches!(res, Err(Error::Configuration(_))));
        let config = AgentConfig::from_json(r#"{"max_creds": 0, "support_revocation": false}"#);
        assert!(config.is_ok());
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let res = AgentConfig::from_file(Path::new("/nonexistent/vcx-exchange.json"));
        assert!(matches!(res, Err(Error::Configuration(_))));
    }
}

use super::Ledger;
use crate::credential::{CredentialDefinition, Schema};
use crate::error::Error;
use crate::revocation_registry::{RevocationRegistryDefinition, RevocationStatus};
use crate::VcxResult;
use log::{debug, trace};
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
struct LedgerRecords {
    schemas: BTreeMap<String, Schema>,
    cred_defs: BTreeMap<String, CredentialDefinition>,
    rev_reg_defs: BTreeMap<String, RevocationRegistryDefinition>,
    rev_reg_statuses: BTreeMap<String, Vec<RevocationStatus>>,
}

/// A ledger held in process memory
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    records: RwLock<LedgerRecords>,
}

impl InMemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ledger for InMemoryLedger {
    fn anchor_schema(&self, schema: &Schema) -> VcxResult<String> {
        trace!("anchor_schema >>> {}", schema.id);
        let mut records = self.records.write()?;
        if let Some(existing) = records.schemas.get(&schema.id) {
            if existing != schema {
                return Err(Error::Configuration(format!(
                    "schema '{}' is already anchored with different attributes",
                    schema.id
                )));
            }
        }
        records.schemas.insert(schema.id.clone(), schema.clone());
        Ok(schema.id.clone())
    }

    fn resolve_schema(&self, schema_id: &str) -> VcxResult<Schema> {
        self.records
            .read()?
            .schemas
            .get(schema_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("schema '{}'", schema_id)))
    }

    fn anchor_cred_def(&self, cred_def: &CredentialDefinition) -> VcxResult<String> {
        trace!("anchor_cred_def >>> {}", cred_def.id);
        let mut records = self.records.write()?;
        if !records.schemas.contains_key(&cred_def.schema_id) {
            return Err(Error::Configuration(format!(
                "credential definition '{}' references unknown schema '{}'",
                cred_def.id, cred_def.schema_id
            )));
        }
        if records.cred_defs.contains_key(&cred_def.id) {
            return Err(Error::Configuration(format!(
                "credential definition '{}' is already anchored",
                cred_def.id
            )));
        }
        records
            .cred_defs
            .insert(cred_def.id.clone(), cred_def.clone());
        Ok(cred_def.id.clone())
    }

    fn resolve_cred_def(&self, cred_def_id: &str) -> VcxResult<CredentialDefinition> {
        self.records
            .read()?
            .cred_defs
            .get(cred_def_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("credential definition '{}'", cred_def_id)))
    }

    fn anchor_revocation_registry(&self, def: &RevocationRegistryDefinition) -> VcxResult<String> {
        trace!("anchor_revocation_registry >>> {}", def.id);
        let mut records = self.records.write()?;
        if !records.cred_defs.contains_key(&def.cred_def_id) {
            return Err(Error::Configuration(format!(
                "revocation registry '{}' references unknown credential definition '{}'",
                def.id, def.cred_def_id
            )));
        }
        records.rev_reg_defs.insert(def.id.clone(), def.clone());
        records.rev_reg_statuses.entry(def.id.clone()).or_default();
        Ok(def.id.clone())
    }

    fn resolve_revocation_registry(&self, rev_reg_id: &str) -> VcxResult<RevocationRegistryDefinition> {
        self.records
            .read()?
            .rev_reg_defs
            .get(rev_reg_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("revocation registry '{}'", rev_reg_id)))
    }

    fn publish_revocation_status(&self, status: &RevocationStatus) -> VcxResult<()> {
        let mut records = self.records.write()?;
        let statuses = records
            .rev_reg_statuses
            .get_mut(&status.rev_reg_id)
            .ok_or_else(|| {
                Error::NotFound(format!("revocation registry '{}'", status.rev_reg_id))
            })?;
        if statuses.iter().any(|s| s.seq_no >= status.seq_no) {
            debug!(
                "ignoring stale status {} for '{}'",
                status.seq_no, status.rev_reg_id
            );
            return Ok(());
        }
        statuses.push(status.clone());
        debug!(
            "published status {} for '{}'",
            status.seq_no, status.rev_reg_id
        );
        Ok(())
    }

    fn resolve_revocation_statuses(&self, rev_reg_id: &str) -> VcxResult<Vec<RevocationStatus>> {
        self.records
            .read()?
            .rev_reg_statuses
            .get(rev_reg_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("revocation registry '{}'", rev_reg_id)))
    }
}

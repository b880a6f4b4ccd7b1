mod in_memory;

pub use in_memory::*;

use crate::credential::{CredentialDefinition, Schema};
use crate::revocation_registry::{RevocationRegistryDefinition, RevocationStatus};
use crate::VcxResult;

/// The public ledger both parties resolve anchored objects from
pub trait Ledger: Send + Sync {
    /// Anchor a schema and return its id
    fn anchor_schema(&self, schema: &Schema) -> VcxResult<String>;
    /// Resolve a schema by id
    fn resolve_schema(&self, schema_id: &str) -> VcxResult<Schema>;
    /// Anchor a credential definition and return its id
    fn anchor_cred_def(&self, cred_def: &CredentialDefinition) -> VcxResult<String>;
    /// Resolve a credential definition by id
    fn resolve_cred_def(&self, cred_def_id: &str) -> VcxResult<CredentialDefinition>;
    /// Anchor a revocation registry definition and return its id
    fn anchor_revocation_registry(&self, def: &RevocationRegistryDefinition) -> VcxResult<String>;
    /// Resolve a revocation registry definition by id
    fn resolve_revocation_registry(&self, rev_reg_id: &str) -> VcxResult<RevocationRegistryDefinition>;
    /// Publish a new registry status
    fn publish_revocation_status(&self, status: &RevocationStatus) -> VcxResult<()>;
    /// Every published status of a registry in sequence order
    fn resolve_revocation_statuses(&self, rev_reg_id: &str) -> VcxResult<Vec<RevocationStatus>>;
}

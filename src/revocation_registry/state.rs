use super::{RevocationRegistryDefinition, RevocationStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The published history of one registry generation
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegistryHistory {
    /// The anchored definition
    pub definition: RevocationRegistryDefinition,
    /// Every status in sequence order
    pub statuses: Vec<RevocationStatus>,
}

/// A verifier's view of the registries referenced by presentations
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegistryState {
    /// Registry histories by registry id
    pub registries: BTreeMap<String, RegistryHistory>,
}

impl RegistryState {
    /// Add or replace a registry history
    pub fn insert(&mut self, definition: RevocationRegistryDefinition, mut statuses: Vec<RevocationStatus>) {
        statuses.sort_by_key(|s| s.seq_no);
        self.registries.insert(
            definition.id.clone(),
            RegistryHistory {
                definition,
                statuses,
            },
        );
    }

    /// True when the registry is known
    pub fn contains(&self, rev_reg_id: &str) -> bool {
        self.registries.contains_key(rev_reg_id)
    }

    /// The most recent status of a registry
    pub fn latest(&self, rev_reg_id: &str) -> Option<&RevocationStatus> {
        self.registries
            .get(rev_reg_id)
            .and_then(|h| h.statuses.last())
    }

    /// The status with sequence number `seq_no`
    pub fn status(&self, rev_reg_id: &str, seq_no: u64) -> Option<&RevocationStatus> {
        self.registries
            .get(rev_reg_id)
            .and_then(|h| h.statuses.iter().find(|s| s.seq_no == seq_no))
    }

    /// The definition of a registry
    pub fn definition(&self, rev_reg_id: &str) -> Option<&RevocationRegistryDefinition> {
        self.registries.get(rev_reg_id).map(|h| &h.definition)
    }
}

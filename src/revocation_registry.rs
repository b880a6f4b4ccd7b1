mod accumulator;
mod state;
mod witness;

pub use accumulator::*;
pub use state::*;
pub use witness::*;

use crate::credential::rev_reg_id;
use crate::error::Error;
use crate::tails::{tails_file_path, TailsData, TailsStorage};
use crate::VcxResult;
use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// The public definition of one registry generation, anchored on the ledger
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RevocationRegistryDefinition {
    /// The registry id
    pub id: String,
    /// The credential definition this registry serves
    pub cred_def_id: String,
    /// The registry capacity
    pub max_creds: u32,
    /// Where the tails were written
    pub tails_location: String,
    /// The hash of the tails
    pub tails_hash: String,
}

/// Addresses one generation of a revocation registry
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct RegistryHandle {
    /// The registry id of the generation
    pub rev_reg_id: String,
    /// The position of the generation in the registry log
    pub generation: usize,
}

#[derive(Clone, Debug)]
struct RegistryGeneration {
    definition: RevocationRegistryDefinition,
    issued: u32,
    statuses: Vec<RevocationStatus>,
}

impl RegistryGeneration {
    fn latest(&self) -> &RevocationStatus {
        // every generation starts with an initial status
        &self.statuses[self.statuses.len() - 1]
    }
}

#[derive(Debug, Default)]
struct RegistryLog {
    generations: Vec<RegistryGeneration>,
    active: Option<usize>,
}

impl RegistryLog {
    fn generation(&self, handle: &RegistryHandle) -> VcxResult<&RegistryGeneration> {
        self.generations
            .get(handle.generation)
            .filter(|g| g.definition.id == handle.rev_reg_id)
            .ok_or_else(|| {
                Error::NotFound(format!("revocation registry '{}'", handle.rev_reg_id))
            })
    }

    fn generation_mut(&mut self, handle: &RegistryHandle) -> VcxResult<&mut RegistryGeneration> {
        self.generations
            .get_mut(handle.generation)
            .filter(|g| g.definition.id == handle.rev_reg_id)
            .ok_or_else(|| {
                Error::NotFound(format!("revocation registry '{}'", handle.rev_reg_id))
            })
    }
}

/// The revocation registry of one credential definition.
///
/// Generations are kept in an append-only log: `rotate` starts a new generation
/// and retires the active one from issuance, but every generation stays
/// addressable so presentations of older credentials can still be checked.
/// All mutations take the registry's write lock, so concurrent revocations are
/// applied one at a time and their union is the final revoked set.
pub struct RevocationRegistry {
    cred_def_id: String,
    tails: Arc<dyn TailsStorage>,
    log: RwLock<RegistryLog>,
}

impl std::fmt::Debug for RevocationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationRegistry")
            .field("cred_def_id", &self.cred_def_id)
            .finish()
    }
}

impl RevocationRegistry {
    /// Create an empty registry log for a credential definition
    pub fn new(cred_def_id: &str, tails: Arc<dyn TailsStorage>) -> Self {
        Self {
            cred_def_id: cred_def_id.to_string(),
            tails,
            log: RwLock::new(RegistryLog::default()),
        }
    }

    /// The credential definition this registry serves
    pub fn cred_def_id(&self) -> &str {
        &self.cred_def_id
    }

    /// Allocate the first registry generation
    pub fn create(&self, tails_dir: &Path, max_creds: u32) -> VcxResult<RegistryHandle> {
        let mut log = self.log.write()?;
        if !log.generations.is_empty() {
            return Err(Error::Configuration(format!(
                "revocation registry for '{}' already exists, rotate it instead",
                self.cred_def_id
            )));
        }
        self.add_generation(&mut log, tails_dir, max_creds)
    }

    /// Replace the active generation with a new one
    pub fn rotate(&self, tails_dir: &Path, max_creds: u32) -> VcxResult<RegistryHandle> {
        let mut log = self.log.write()?;
        if log.generations.is_empty() {
            return Err(Error::Configuration(format!(
                "revocation registry for '{}' has not been created",
                self.cred_def_id
            )));
        }
        let handle = self.add_generation(&mut log, tails_dir, max_creds)?;
        debug!(
            "rotated revocation registry of '{}' to '{}'",
            self.cred_def_id, handle.rev_reg_id
        );
        Ok(handle)
    }

    fn add_generation(
        &self,
        log: &mut RegistryLog,
        tails_dir: &Path,
        max_creds: u32,
    ) -> VcxResult<RegistryHandle> {
        if max_creds == 0 {
            return Err(Error::Configuration(
                "a revocation registry needs room for at least one credential".to_string(),
            ));
        }
        let tails = TailsData::generate(max_creds, rand::thread_rng());
        let tails_hash = tails.hash();
        let tails_path = tails_file_path(tails_dir, &tails_hash);
        self.tails.write_tails(&tails_path, &tails)?;

        let generation = log.generations.len();
        let id = rev_reg_id(&self.cred_def_id, &format!("{}", generation + 1));
        let definition = RevocationRegistryDefinition {
            id: id.clone(),
            cred_def_id: self.cred_def_id.clone(),
            max_creds,
            tails_location: tails_path.to_string_lossy().into_owned(),
            tails_hash: tails_hash.clone(),
        };
        let revoked = BTreeSet::new();
        let initial = RevocationStatus {
            rev_reg_id: id.clone(),
            seq_no: 1,
            timestamp: Utc::now().timestamp(),
            accumulator: Accumulator::compute(&id, &tails_hash, &revoked),
            revoked,
        };
        debug!(
            "Revocation Registry: {}",
            serde_json::to_string_pretty(&definition).unwrap_or_default()
        );
        log.generations.push(RegistryGeneration {
            definition,
            issued: 0,
            statuses: vec![initial],
        });
        log.active = Some(generation);
        Ok(RegistryHandle {
            rev_reg_id: id,
            generation,
        })
    }

    /// The generation currently used for issuance
    pub fn active(&self) -> VcxResult<Option<RegistryHandle>> {
        let log = self.log.read()?;
        Ok(log.active.map(|generation| RegistryHandle {
            rev_reg_id: log.generations[generation].definition.id.clone(),
            generation,
        }))
    }

    /// Find the generation with registry id `rev_reg_id`
    pub fn handle_for(&self, rev_reg_id: &str) -> VcxResult<RegistryHandle> {
        let log = self.log.read()?;
        log.generations
            .iter()
            .position(|g| g.definition.id == rev_reg_id)
            .map(|generation| RegistryHandle {
                rev_reg_id: rev_reg_id.to_string(),
                generation,
            })
            .ok_or_else(|| Error::NotFound(format!("revocation registry '{}'", rev_reg_id)))
    }

    /// Consume the next free credential index of the active generation
    pub fn allocate_index(&self, handle: &RegistryHandle) -> VcxResult<u32> {
        let mut log = self.log.write()?;
        if log.active != Some(handle.generation) {
            return Err(Error::Configuration(format!(
                "revocation registry '{}' was rotated out and no longer issues credentials",
                handle.rev_reg_id
            )));
        }
        let generation = log.generation_mut(handle)?;
        if generation.issued >= generation.definition.max_creds {
            return Err(Error::RegistryExhausted {
                rev_reg_id: handle.rev_reg_id.clone(),
                max_creds: generation.definition.max_creds,
            });
        }
        let index = generation.issued;
        generation.issued += 1;
        Ok(index)
    }

    /// A witness for `index` valid against the latest status
    pub fn witness_for(&self, handle: &RegistryHandle, index: u32) -> VcxResult<NonRevocationWitness> {
        let log = self.log.read()?;
        let generation = log.generation(handle)?;
        Ok(NonRevocationWitness::new(index, generation.latest()))
    }

    /// Mark `index` revoked. Returns the new status, or `None` when it was already revoked.
    pub fn revoke(&self, handle: &RegistryHandle, index: u32) -> VcxResult<Option<RevocationStatus>> {
        let mut log = self.log.write()?;
        let generation = log.generation_mut(handle)?;
        let max_creds = generation.definition.max_creds;
        if index >= max_creds {
            return Err(Error::IndexOutOfRange { index, max_creds });
        }
        let latest = generation.latest();
        if latest.is_revoked(index) {
            debug!(
                "credential {} of '{}' is already revoked",
                index, handle.rev_reg_id
            );
            return Ok(None);
        }
        if index >= generation.issued {
            warn!(
                "revoking index {} of '{}' before it was issued",
                index, handle.rev_reg_id
            );
        }
        let mut revoked = latest.revoked.clone();
        revoked.insert(index);
        let status = RevocationStatus {
            rev_reg_id: handle.rev_reg_id.clone(),
            seq_no: latest.seq_no + 1,
            timestamp: Utc::now().timestamp().max(latest.timestamp),
            accumulator: Accumulator::compute(
                &handle.rev_reg_id,
                &generation.definition.tails_hash,
                &revoked,
            ),
            revoked,
        };
        generation.statuses.push(status.clone());
        debug!(
            "revoked credential {} of '{}', {}",
            index, handle.rev_reg_id, status.accumulator
        );
        Ok(Some(status))
    }

    /// True when `index` is revoked
    pub fn is_revoked(&self, handle: &RegistryHandle, index: u32) -> VcxResult<bool> {
        let log = self.log.read()?;
        Ok(log.generation(handle)?.latest().is_revoked(index))
    }

    /// Every revoked index of a generation
    pub fn revoked_indices(&self, handle: &RegistryHandle) -> VcxResult<BTreeSet<u32>> {
        let log = self.log.read()?;
        Ok(log.generation(handle)?.latest().revoked.clone())
    }

    /// How many more credentials the generation can issue
    pub fn remaining_capacity(&self, handle: &RegistryHandle) -> VcxResult<u32> {
        let log = self.log.read()?;
        let generation = log.generation(handle)?;
        if log.active != Some(handle.generation) {
            return Ok(0);
        }
        Ok(generation.definition.max_creds - generation.issued)
    }

    /// The anchorable definition of a generation
    pub fn definition(&self, handle: &RegistryHandle) -> VcxResult<RevocationRegistryDefinition> {
        let log = self.log.read()?;
        Ok(log.generation(handle)?.definition.clone())
    }

    /// The latest status of a generation
    pub fn latest_status(&self, handle: &RegistryHandle) -> VcxResult<RevocationStatus> {
        let log = self.log.read()?;
        Ok(log.generation(handle)?.latest().clone())
    }

    /// Every status of a generation in sequence order
    pub fn status_history(&self, handle: &RegistryHandle) -> VcxResult<Vec<RevocationStatus>> {
        let log = self.log.read()?;
        Ok(log.generation(handle)?.statuses.clone())
    }

    /// A snapshot of every generation
    pub fn registry_state(&self) -> VcxResult<RegistryState> {
        let log = self.log.read()?;
        let mut state = RegistryState::default();
        for g in &log.generations {
            state.insert(g.definition.clone(), g.statuses.clone());
        }
        Ok(state)
    }
}

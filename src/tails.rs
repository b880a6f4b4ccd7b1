use crate::{error::Error, utils::sha256, VcxResult};
use log::{debug, trace};
use rand_core::RngCore;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use uint_zigzag::Uint;

/// Auxiliary data a holder needs to prove non-revocation
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TailsData {
    /// The registry capacity
    pub max_creds: u32,
    /// One point per credential index
    pub points: Vec<String>,
}

impl TailsData {
    /// Generate tails for a registry of `max_creds` credentials
    pub fn generate(max_creds: u32, mut rng: impl RngCore) -> Self {
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        let points = (0..max_creds)
            .map(|i| {
                let mut data = seed.to_vec();
                data.extend_from_slice(&Uint::from(i).to_vec());
                hex::encode(sha256(&data))
            })
            .collect();
        Self { max_creds, points }
    }

    /// The hash identifying these tails
    pub fn hash(&self) -> String {
        let mut data = Uint::from(self.max_creds).to_vec();
        for p in &self.points {
            data.extend_from_slice(p.as_bytes());
        }
        hex::encode(sha256(&data))
    }
}

/// Storage for tails files
pub trait TailsStorage: Send + Sync {
    /// Read the tails at `path`
    fn read_tails(&self, path: &Path) -> VcxResult<TailsData>;
    /// Write `data` to `path`
    fn write_tails(&self, path: &Path, data: &TailsData) -> VcxResult<()>;
}

/// The file a registry's tails are stored in
pub fn tails_file_path(tails_dir: &Path, tails_hash: &str) -> PathBuf {
    tails_dir.join(tails_hash)
}

/// Stores tails as json files on the local filesystem
#[derive(Copy, Clone, Debug, Default)]
pub struct FileTailsStorage;

impl TailsStorage for FileTailsStorage {
    fn read_tails(&self, path: &Path) -> VcxResult<TailsData> {
        trace!("read_tails >>> path: {}", path.display());
        let contents = fs::read(path).map_err(|e| {
            Error::Storage(format!("cannot read tails '{}': {}", path.display(), e))
        })?;
        let tails: TailsData = serde_json::from_slice(&contents)?;
        if tails.points.len() != tails.max_creds as usize {
            return Err(Error::Storage(format!(
                "tails '{}' are truncated: {} of {} points",
                path.display(),
                tails.points.len(),
                tails.max_creds
            )));
        }
        Ok(tails)
    }

    fn write_tails(&self, path: &Path, data: &TailsData) -> VcxResult<()> {
        trace!("write_tails >>> path: {}", path.display());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Storage(format!(
                    "tails directory '{}' is not writable: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        let contents = serde_json::to_vec(data)?;
        fs::write(path, contents).map_err(|e| {
            Error::Storage(format!("cannot write tails '{}': {}", path.display(), e))
        })?;
        debug!("wrote {} tails points to {}", data.max_creds, path.display());
        Ok(())
    }
}

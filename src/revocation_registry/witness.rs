use super::{Accumulator, RevocationStatus};
use crate::{error::Error, tails::TailsData, VcxResult};
use serde::{Deserialize, Serialize};

/// What happened when a witness was brought up to date
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WitnessUpdate {
    /// The witness already referenced the latest status
    Current,
    /// The witness now references the latest status
    Advanced,
    /// The credential is revoked; the witness keeps its last valid status
    Revoked,
}

/// Proves membership of a credential index in a registry status
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct NonRevocationWitness {
    /// The registry the credential was issued under
    pub rev_reg_id: String,
    /// The credential index in the registry
    pub index: u32,
    /// The status sequence number this witness is valid for
    pub seq_no: u64,
    /// The status timestamp this witness is valid for
    pub timestamp: i64,
    /// The accumulator this witness is valid for
    pub accumulator: Accumulator,
}

impl NonRevocationWitness {
    /// Create a witness valid for `status`
    pub fn new(index: u32, status: &RevocationStatus) -> Self {
        Self {
            rev_reg_id: status.rev_reg_id.clone(),
            index,
            seq_no: status.seq_no,
            timestamp: status.timestamp,
            accumulator: status.accumulator.clone(),
        }
    }

    /// Move the witness to the latest of `statuses` unless the index was revoked there
    pub fn update(&mut self, statuses: &[RevocationStatus]) -> VcxResult<WitnessUpdate> {
        let latest = statuses
            .iter()
            .filter(|s| s.rev_reg_id == self.rev_reg_id)
            .max_by_key(|s| s.seq_no)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "no published status for revocation registry '{}'",
                    self.rev_reg_id
                ))
            })?;
        if latest.is_revoked(self.index) {
            return Ok(WitnessUpdate::Revoked);
        }
        if latest.seq_no == self.seq_no {
            return Ok(WitnessUpdate::Current);
        }
        self.seq_no = latest.seq_no;
        self.timestamp = latest.timestamp;
        self.accumulator = latest.accumulator.clone();
        Ok(WitnessUpdate::Advanced)
    }

    /// The tails point for this witness' index
    pub fn tails_point<'a>(&self, tails: &'a TailsData) -> VcxResult<&'a str> {
        tails
            .points
            .get(self.index as usize)
            .map(String::as_str)
            .ok_or(Error::IndexOutOfRange {
                index: self.index,
                max_creds: tails.max_creds,
            })
    }
}

use crate::utils::sha256;
use core::fmt::{self, Display, Formatter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uint_zigzag::Uint;

/// The accumulator value of a registry at one point in its history
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Accumulator(pub String);

impl Accumulator {
    /// Compute the accumulator over the revoked indices of a registry
    pub fn compute(rev_reg_id: &str, tails_hash: &str, revoked: &BTreeSet<u32>) -> Self {
        let mut data = Vec::new();
        data.extend_from_slice(&Uint::from(rev_reg_id.len()).to_vec());
        data.extend_from_slice(rev_reg_id.as_bytes());
        data.extend_from_slice(&Uint::from(tails_hash.len()).to_vec());
        data.extend_from_slice(tails_hash.as_bytes());
        data.extend_from_slice(&Uint::from(revoked.len()).to_vec());
        for i in revoked {
            data.extend_from_slice(&Uint::from(*i).to_vec());
        }
        Self(hex::encode(sha256(&data)))
    }

    /// The raw accumulator bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        hex::decode(&self.0).unwrap_or_default()
    }
}

impl Display for Accumulator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Accumulator {{ {} }}", self.0)
    }
}

/// A published registry state
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RevocationStatus {
    /// The registry this status belongs to
    pub rev_reg_id: String,
    /// Monotonic sequence number within the registry
    pub seq_no: u64,
    /// When the status was recorded, in seconds since the epoch
    pub timestamp: i64,
    /// The accumulator after applying `revoked`
    pub accumulator: Accumulator,
    /// Every index revoked so far
    pub revoked: BTreeSet<u32>,
}

impl RevocationStatus {
    /// True when `index` is revoked in this status
    pub fn is_revoked(&self, index: u32) -> bool {
        self.revoked.contains(&index)
    }
}

//! Issuance and presentation protocols for revocable anonymous credentials.
//!
//! An issuer/verifier party and a holder/prover party each drive their own
//! state machines, exchanging protocol messages over a [`connection::Connection`].
//! Ledger, wallet, tails storage and the proof system are consumed through
//! traits so other backends can be swapped in.
#![warn(missing_docs)]
#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Party level orchestration
pub mod agent;
/// Configuration for parties
pub mod config;
/// In-memory pairwise transport
pub mod connection;
/// Credential related types
pub mod credential;
/// Attribute encoding
pub mod encoding;
/// Errors created by this library
pub mod error;
/// Credential issuance state machines
pub mod issuance;
/// Ledger collaborator
pub mod ledger;
/// Protocol messages
pub mod messages;
/// Presentation related methods
pub mod presentation;
/// Presentation exchange state machines
pub mod proof_exchange;
/// Proof requests and restriction queries
pub mod proof_request;
/// Cryptographic proof system collaborator
pub mod proof_system;
/// Revocation registry lifecycle
pub mod revocation_registry;
/// Issuer signatures over credentials
pub mod signature;
/// Tails file storage
pub mod tails;
/// Wallet collaborator
pub mod wallet;

mod utils;

use num_bigint::BigUint;
use rand::distributions::Alphanumeric;
use rand::Rng;
use rand_core::RngCore;

/// The result type for this library
pub type VcxResult<T> = Result<T, error::Error>;

/// Generate a random alphanumeric string of `length` characters
pub fn random_string(length: usize, rng: impl RngCore) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Generate a decimal nonce string suitable for proof requests and offers
pub fn random_nonce(mut rng: impl RngCore) -> String {
    let mut buffer = [0u8; 10];
    rng.fill_bytes(&mut buffer);
    BigUint::from_bytes_be(&buffer).to_string()
}

/// Re-exports of the most commonly used types
pub mod prelude {
    pub use super::agent::*;
    pub use super::config::*;
    pub use super::connection::*;
    pub use super::credential::*;
    pub use super::encoding::*;
    pub use super::error::*;
    pub use super::issuance::*;
    pub use super::ledger::*;
    pub use super::messages::*;
    pub use super::presentation::*;
    pub use super::proof_exchange::*;
    pub use super::proof_request::*;
    pub use super::proof_system::*;
    pub use super::revocation_registry::*;
    pub use super::tails::*;
    pub use super::wallet::*;
    pub use super::{random_nonce, random_string, VcxResult};
}

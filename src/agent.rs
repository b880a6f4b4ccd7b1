mod alice;
mod faber;

pub use alice::*;
pub use faber::*;

use crate::config::AgentConfig;
use crate::connection::Connection;
use crate::error::Error;
use crate::ledger::{InMemoryLedger, Ledger};
use crate::messages::AriesMessage;
use crate::proof_system::{DigestProofSystem, ProofSystem};
use crate::tails::{FileTailsStorage, TailsStorage};
use crate::wallet::InMemoryWallet;
use crate::{random_string, VcxResult};
use core::fmt::Display;
use indexmap::IndexMap;
use log::debug;
use std::sync::Arc;

/// The collaborators both parties of a connection resolve public data through
#[derive(Clone)]
pub struct Services {
    /// The shared ledger
    pub ledger: Arc<dyn Ledger>,
    /// Where tails files live
    pub tails: Arc<dyn TailsStorage>,
    /// The proof backend
    pub proof_system: Arc<dyn ProofSystem>,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            ledger: Arc::new(InMemoryLedger::new()),
            tails: Arc::new(FileTailsStorage),
            proof_system: Arc::new(DigestProofSystem),
        }
    }
}

/// Set up an issuer and a holder with separate wallets, a shared ledger and
/// a connection between them
pub fn create_paired_alice_and_faber(config: AgentConfig) -> VcxResult<(Alice, Faber)> {
    create_paired_alice_and_faber_with(config, Services::default())
}

/// Like [`create_paired_alice_and_faber`] with caller supplied collaborators
pub fn create_paired_alice_and_faber_with(
    config: AgentConfig,
    services: Services,
) -> VcxResult<(Alice, Faber)> {
    config.validate()?;
    let (faber_end, alice_end) = Connection::pair(&config.issuer_name, &config.holder_name);
    let issuer_did = config
        .issuer_did
        .clone()
        .unwrap_or_else(random_did);
    let holder_did = config
        .holder_did
        .clone()
        .unwrap_or_else(random_did);
    debug!(
        "paired {} ({}) with {} ({})",
        config.issuer_name, issuer_did, config.holder_name, holder_did
    );
    let alice = Alice::new(
        &holder_did,
        Arc::new(InMemoryWallet::new(rand::thread_rng())),
        services.clone(),
        alice_end,
    );
    let faber = Faber::new(
        config,
        &issuer_did,
        Arc::new(InMemoryWallet::new(rand::thread_rng())),
        services,
        faber_end,
    );
    Ok((alice, faber))
}

fn random_did() -> String {
    random_string(22, rand::thread_rng())
}

fn check_state<S: Display + PartialEq>(expected: S, actual: S) -> VcxResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::StateMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}

// a message the exchange is not ready for goes back to the inbox
fn requeue_unexpected(connection: &Connection, message: &AriesMessage, error: Error) -> Error {
    match error {
        Error::UnexpectedState(_) => match connection.requeue(message) {
            Ok(()) => error,
            Err(e) => e,
        },
        _ => error,
    }
}

fn last_exchange<T>(exchanges: &mut IndexMap<String, T>) -> VcxResult<&mut T> {
    exchanges
        .values_mut()
        .last()
        .ok_or_else(|| Error::NotFound("no exchange was started".to_string()))
}

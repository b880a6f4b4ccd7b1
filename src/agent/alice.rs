use super::{check_state, last_exchange, requeue_unexpected, Services};
use crate::connection::Connection;
use crate::error::Error;
use crate::issuance::{HolderExchange, HolderState};
use crate::messages::AriesMessage;
use crate::presentation::{PresentationBuilder, TailsResolver};
use crate::proof_exchange::{ProverExchange, ProverState};
use crate::wallet::Wallet;
use crate::VcxResult;
use indexmap::IndexMap;
use log::{trace, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

/// The holding and proving party
pub struct Alice {
    did: String,
    wallet: Arc<dyn Wallet>,
    services: Services,
    connection: Connection,
    holdings: IndexMap<String, HolderExchange>,
    provings: IndexMap<String, ProverExchange>,
}

impl Alice {
    /// Create a party that talks over `connection`
    pub fn new(did: &str, wallet: Arc<dyn Wallet>, services: Services, connection: Connection) -> Self {
        Self {
            did: did.to_string(),
            wallet,
            services,
            connection,
            holdings: IndexMap::new(),
            provings: IndexMap::new(),
        }
    }

    /// The holder did
    pub fn did(&self) -> &str {
        &self.did
    }

    /// The wallet credentials are stored in
    pub fn wallet(&self) -> &dyn Wallet {
        self.wallet.as_ref()
    }

    /// The current credential exchange
    pub fn holding(&self) -> Option<&HolderExchange> {
        self.holdings.values().last()
    }

    /// The current presentation exchange
    pub fn proving(&self) -> Option<&ProverExchange> {
        self.provings.values().last()
    }

    /// Take the oldest pending offer and request the credential
    pub fn accept_credential_offer(&mut self) -> VcxResult<String> {
        let thread_id = self
            .connection
            .pending()?
            .into_iter()
            .find(|m| matches!(m, AriesMessage::OfferCredential(_)))
            .map(|m| m.thread_id().to_string())
            .ok_or_else(|| Error::NotFound("no credential offer was received".to_string()))?;
        trace!("accept_credential_offer >>> thread: {}", thread_id);
        let offer = self
            .connection
            .receive_matching(&thread_id)?
            .ok_or_else(|| Error::NotFound(format!("offer of exchange {}", thread_id)))?;
        let mut exchange = HolderExchange::from_offer(&offer)?;
        let message = exchange.accept_offer(self.wallet.as_ref(), &self.did)?;
        self.connection.send(&message)?;
        self.holdings.insert(thread_id.clone(), exchange);
        Ok(thread_id)
    }

    /// Process the next message of the current credential exchange and check
    /// the exchange ends up in `expected`
    pub fn update_state_credential(&mut self, expected: HolderState) -> VcxResult<()> {
        let exchange = last_exchange(&mut self.holdings)?;
        if let Some(message) = self.connection.receive_matching(exchange.thread_id())? {
            match message {
                AriesMessage::IssueCredential(_) => {
                    match exchange.process_credential(
                        &message,
                        self.wallet.as_ref(),
                        self.services.ledger.as_ref(),
                    ) {
                        Ok(ack) => self.connection.send(&ack)?,
                        Err(e @ Error::UnexpectedState(_)) => {
                            return Err(requeue_unexpected(&self.connection, &message, e));
                        }
                        Err(e) => {
                            warn!("rejecting credential: {}", e);
                            self.connection.send(&exchange.fail(&e.to_string()))?;
                            return Err(e);
                        }
                    }
                }
                _ => exchange
                    .handle_message(&message)
                    .map_err(|e| requeue_unexpected(&self.connection, &message, e))?,
            }
        }
        check_state(expected, exchange.state())
    }

    /// Answer a proof request from held credentials, reading tails from the
    /// directories `tails_resolver` names, and self attested values by referent
    pub fn send_holder_proof(
        &mut self,
        request: &str,
        tails_resolver: TailsResolver<'_>,
        self_attested: &BTreeMap<String, String>,
    ) -> VcxResult<()> {
        self.prove(request, Some(tails_resolver), self_attested)
    }

    /// Answer a proof request, reading tails from their anchored locations
    pub fn send_holder_proof_self_attested(
        &mut self,
        request: &str,
        self_attested: &BTreeMap<String, String>,
    ) -> VcxResult<()> {
        self.prove(request, None, self_attested)
    }

    fn prove(
        &mut self,
        request: &str,
        tails_resolver: Option<TailsResolver<'_>>,
        self_attested: &BTreeMap<String, String>,
    ) -> VcxResult<()> {
        let parsed = AriesMessage::from_json(request)?;
        // the request also arrived over the connection
        let message = self
            .connection
            .receive_matching(parsed.thread_id())?
            .unwrap_or(parsed);
        let exchange = ProverExchange::from_request(&message)?;
        let exchange = self
            .provings
            .entry(exchange.thread_id().to_string())
            .or_insert(exchange);
        let mut builder = PresentationBuilder::new(
            self.wallet.as_ref(),
            self.services.ledger.as_ref(),
            self.services.tails.as_ref(),
            self.services.proof_system.as_ref(),
        );
        if let Some(resolver) = tails_resolver {
            builder = builder.with_tails_resolver(resolver);
        }
        let reply = exchange.send_presentation(&builder, self_attested)?;
        self.connection.send(&reply)
    }

    /// Process the verifier's answer to the current presentation and check
    /// the exchange ends up in `expected`
    pub fn update_state_holder_proof(&mut self, expected: ProverState) -> VcxResult<()> {
        let exchange = last_exchange(&mut self.provings)?;
        if let Some(message) = self.connection.receive_matching(exchange.thread_id())? {
            exchange
                .handle_message(&message)
                .map_err(|e| requeue_unexpected(&self.connection, &message, e))?;
        }
        check_state(expected, exchange.state())
    }
}

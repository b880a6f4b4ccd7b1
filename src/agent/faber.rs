use super::{check_state, last_exchange, requeue_unexpected, Services};
use crate::config::AgentConfig;
use crate::connection::Connection;
use crate::credential::{CredentialDefinition, CredentialValues, Schema};
use crate::error::Error;
use crate::issuance::{IssuerExchange, IssuerState};
use crate::messages::AriesMessage;
use crate::proof_exchange::{PresentationInfo, VerifierExchange, VerifierState};
use crate::proof_request::ProofRequestData;
use crate::revocation_registry::{RegistryHandle, RevocationRegistry};
use crate::wallet::Wallet;
use crate::VcxResult;
use indexmap::IndexMap;
use log::{debug, info, trace};
use std::path::Path;
use std::sync::Arc;

/// The issuing and verifying party.
///
/// Exchanges are kept by thread id; the most recently started one of each
/// kind is the one the operations below act on.
pub struct Faber {
    config: AgentConfig,
    did: String,
    wallet: Arc<dyn Wallet>,
    services: Services,
    connection: Connection,
    schema: Option<Schema>,
    cred_def: Option<CredentialDefinition>,
    registry: Option<RevocationRegistry>,
    issuances: IndexMap<String, IssuerExchange>,
    verifications: IndexMap<String, VerifierExchange>,
}

impl Faber {
    /// Create a party that talks over `connection`
    pub fn new(
        config: AgentConfig,
        did: &str,
        wallet: Arc<dyn Wallet>,
        services: Services,
        connection: Connection,
    ) -> Self {
        Self {
            config,
            did: did.to_string(),
            wallet,
            services,
            connection,
            schema: None,
            cred_def: None,
            registry: None,
            issuances: IndexMap::new(),
            verifications: IndexMap::new(),
        }
    }

    /// The issuer did
    pub fn get_faber_did(&self) -> &str {
        &self.did
    }

    /// The anchored schema
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// The anchored credential definition
    pub fn cred_def(&self) -> Option<&CredentialDefinition> {
        self.cred_def.as_ref()
    }

    /// The revocation registry of the credential definition
    pub fn registry(&self) -> Option<&RevocationRegistry> {
        self.registry.as_ref()
    }

    /// The current credential exchange
    pub fn issuance(&self) -> Option<&IssuerExchange> {
        self.issuances.values().last()
    }

    /// The current presentation exchange
    pub fn verification(&self) -> Option<&VerifierExchange> {
        self.verifications.values().last()
    }

    /// Anchor the schema, the credential definition and, when revocation is
    /// supported, the first registry generation
    pub fn build_ledger_primitives(&mut self, tails_dir: &Path, max_creds: u32) -> VcxResult<()> {
        trace!("build_ledger_primitives >>> tails_dir: {}", tails_dir.display());
        if self.schema.is_some() {
            return Err(Error::Configuration(format!(
                "{} already built its ledger primitives",
                self.config.issuer_name
            )));
        }
        let ledger = self.services.ledger.as_ref();
        let attrs: Vec<&str> = self.config.schema_attrs.iter().map(String::as_str).collect();
        let schema = Schema::new(
            &self.did,
            &self.config.schema_name,
            &self.config.schema_version,
            &attrs,
        )?;
        ledger.anchor_schema(&schema)?;
        let cred_def = CredentialDefinition::new(
            &self.did,
            &schema,
            &self.config.cred_def_tag,
            self.config.support_revocation,
            self.wallet.verification_key()?,
        );
        ledger.anchor_cred_def(&cred_def)?;
        if cred_def.support_revocation {
            let registry = RevocationRegistry::new(&cred_def.id, self.services.tails.clone());
            let handle = registry.create(tails_dir, max_creds)?;
            self.publish_registry(&registry, &handle)?;
            self.registry = Some(registry);
        }
        info!(
            "{} anchored schema '{}' and credential definition '{}'",
            self.config.issuer_name, schema.id, cred_def.id
        );
        self.schema = Some(schema);
        self.cred_def = Some(cred_def);
        Ok(())
    }

    /// [`Faber::build_ledger_primitives`] with the configured tails directory
    /// and registry capacity
    pub fn build_ledger_primitives_from_config(&mut self) -> VcxResult<()> {
        let tails_dir = self.config.tails_dir.clone();
        self.build_ledger_primitives(&tails_dir, self.config.max_creds)
    }

    /// [`Faber::rotate_rev_reg`] with the configured tails directory and
    /// registry capacity
    pub fn rotate_rev_reg_from_config(&mut self) -> VcxResult<()> {
        let tails_dir = self.config.tails_dir.clone();
        self.rotate_rev_reg(&tails_dir, self.config.max_creds)
    }

    /// Start a new registry generation for future credentials
    pub fn rotate_rev_reg(&mut self, tails_dir: &Path, max_creds: u32) -> VcxResult<()> {
        let registry = self.registry.as_ref().ok_or_else(|| {
            Error::Configuration("no revocation registry to rotate".to_string())
        })?;
        let handle = registry.rotate(tails_dir, max_creds)?;
        self.publish_registry(registry, &handle)
    }

    fn publish_registry(&self, registry: &RevocationRegistry, handle: &RegistryHandle) -> VcxResult<()> {
        let ledger = self.services.ledger.as_ref();
        ledger.anchor_revocation_registry(&registry.definition(handle)?)?;
        ledger.publish_revocation_status(&registry.latest_status(handle)?)
    }

    /// Offer the configured credential values to the holder
    pub fn send_credential_offer(&mut self) -> VcxResult<String> {
        let (schema, cred_def) = match (&self.schema, &self.cred_def) {
            (Some(s), Some(c)) => (s, c),
            _ => {
                return Err(Error::Configuration(
                    "ledger primitives have not been built".to_string(),
                ))
            }
        };
        let handle = match &self.registry {
            Some(registry) => registry.active()?,
            None => None,
        };
        let values = CredentialValues::from_raw(&self.config.credential_values);
        let mut exchange = IssuerExchange::create_offer(schema, cred_def, values, handle.as_ref())?;
        let message = exchange.send_offer()?;
        self.connection.send(&message)?;
        let thread_id = exchange.thread_id().to_string();
        self.issuances.insert(thread_id.clone(), exchange);
        Ok(thread_id)
    }

    /// Process the next message of the current credential exchange and check
    /// the exchange ends up in `expected`
    pub fn update_state_credential(&mut self, expected: IssuerState) -> VcxResult<()> {
        let exchange = last_exchange(&mut self.issuances)?;
        if let Some(message) = self.connection.receive_matching(exchange.thread_id())? {
            exchange
                .handle_message(&message)
                .map_err(|e| requeue_unexpected(&self.connection, &message, e))?;
        }
        check_state(expected, exchange.state())
    }

    /// Issue the credential the holder requested
    pub fn send_credential(&mut self) -> VcxResult<()> {
        let exchange = last_exchange(&mut self.issuances)?;
        match exchange.issue_credential(self.wallet.as_ref(), self.registry.as_ref()) {
            Ok(message) => self.connection.send(&message),
            Err(e) => {
                if exchange.state() == IssuerState::Failed {
                    self.connection.send(&exchange.fail(&e.to_string()))?;
                }
                Err(e)
            }
        }
    }

    /// Wait for the holder's acknowledgement of the issued credential
    pub fn receive_credential_ack(&mut self) -> VcxResult<()> {
        self.update_state_credential(IssuerState::Finished)
    }

    /// Revoke the credential of the current exchange and publish the new
    /// registry status
    pub fn revoke_credential(&mut self) -> VcxResult<()> {
        let exchange = self
            .issuance()
            .ok_or_else(|| Error::NotFound("no credential exchange was started".to_string()))?;
        let registry = self.registry.as_ref().ok_or_else(|| {
            Error::Configuration("credentials are not revocable".to_string())
        })?;
        match exchange.revoke(registry)? {
            Some(status) => {
                debug!(
                    "publishing status {} of '{}'",
                    status.seq_no, status.rev_reg_id
                );
                self.services.ledger.publish_revocation_status(&status)
            }
            None => Ok(()),
        }
    }

    /// Send a proof request and return it serialized
    pub fn request_proof_from_alice(&mut self, data: ProofRequestData) -> VcxResult<String> {
        let mut exchange = VerifierExchange::new(data)?;
        let message = exchange.send_request()?;
        self.connection.send(&message)?;
        self.verifications
            .insert(exchange.thread_id().to_string(), exchange);
        message.to_json()
    }

    /// Process the next message of the current presentation exchange and check
    /// the exchange ends up in `expected`
    pub fn update_state_verifier_proof(&mut self, expected: VerifierState) -> VcxResult<()> {
        let exchange = last_exchange(&mut self.verifications)?;
        let connection = &self.connection;
        if let Some(message) = connection.receive_matching(exchange.thread_id())? {
            let reply = match exchange.handle_message(
                &message,
                self.services.ledger.as_ref(),
                self.services.proof_system.as_ref(),
            ) {
                Ok(reply) => reply,
                Err(e) => {
                    if exchange.state() == VerifierState::Failed
                        && !matches!(message, AriesMessage::ProblemReport(_))
                    {
                        connection.send(&exchange.fail(&e.to_string()))?;
                    }
                    return Err(requeue_unexpected(connection, &message, e));
                }
            };
            if let Some(reply) = reply {
                connection.send(&reply)?;
            }
        }
        check_state(expected, exchange.state())
    }

    /// The verification status and attachments of the current presentation exchange
    pub fn get_presentation_info(&self) -> VcxResult<PresentationInfo> {
        self.verification()
            .ok_or_else(|| Error::NotFound("no presentation exchange was started".to_string()))?
            .presentation_info()
    }
}

use super::IssuerState;
use crate::credential::{
    normalize_attr_name, Credential, CredentialDefinition, CredentialOffer, CredentialRequest,
    CredentialValues, Schema,
};
use crate::error::Error;
use crate::messages::{AriesMessage, IssueCredential, OfferCredential, ProblemReport};
use crate::revocation_registry::{RegistryHandle, RevocationRegistry, RevocationStatus};
use crate::wallet::Wallet;
use crate::VcxResult;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The issuer's view of one credential exchange
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct IssuerExchange {
    thread_id: String,
    state: IssuerState,
    offer: CredentialOffer,
    request: Option<CredentialRequest>,
    credential: Option<Credential>,
    registry: Option<RegistryHandle>,
}

impl IssuerExchange {
    /// Prepare an offer of `values` signed under `cred_def`.
    ///
    /// A revocable credential definition needs a registry to issue against.
    pub fn create_offer(
        schema: &Schema,
        cred_def: &CredentialDefinition,
        values: CredentialValues,
        registry: Option<&RegistryHandle>,
    ) -> VcxResult<Self> {
        trace!("create_offer >>> cred_def_id: {}", cred_def.id);
        if cred_def.schema_id != schema.id {
            return Err(Error::Configuration(format!(
                "credential definition '{}' is not for schema '{}'",
                cred_def.id, schema.id
            )));
        }
        match (cred_def.support_revocation, registry) {
            (true, None) => {
                return Err(Error::Configuration(format!(
                    "credential definition '{}' needs a revocation registry",
                    cred_def.id
                )))
            }
            (false, Some(handle)) => {
                return Err(Error::Configuration(format!(
                    "credential definition '{}' does not support revocation registry '{}'",
                    cred_def.id, handle.rev_reg_id
                )))
            }
            _ => {}
        }
        let expected: BTreeSet<String> = schema
            .attr_names
            .iter()
            .map(|a| normalize_attr_name(a))
            .collect();
        let offered: BTreeSet<String> = values.iter().map(|(k, _)| normalize_attr_name(k)).collect();
        if expected != offered {
            return Err(Error::Configuration(format!(
                "offered attributes {:?} do not match schema attributes {:?}",
                offered, expected
            )));
        }
        let offer = CredentialOffer::new(
            &schema.id,
            &cred_def.id,
            registry.map(|h| h.rev_reg_id.as_str()),
            values,
        );
        Ok(Self {
            thread_id: uuid::Uuid::new_v4().to_string(),
            state: IssuerState::Initial,
            offer,
            request: None,
            credential: None,
            registry: registry.cloned(),
        })
    }

    /// The exchange id
    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    /// The current state
    pub fn state(&self) -> IssuerState {
        self.state
    }

    /// The prepared offer
    pub fn offer(&self) -> &CredentialOffer {
        &self.offer
    }

    /// The issued credential
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// True when the credential is issued under a revocation registry
    pub fn is_revokable(&self) -> bool {
        self.offer.rev_reg_id.is_some()
    }

    /// The registry the credential is issued under
    pub fn rev_reg_id(&self) -> Option<&str> {
        self.offer.rev_reg_id.as_deref()
    }

    /// The registry index of the issued credential
    pub fn revocation_index(&self) -> Option<u32> {
        self.credential.as_ref().and_then(Credential::revocation_index)
    }

    fn unexpected(&self, what: &str) -> Error {
        Error::UnexpectedState(format!(
            "issuer exchange {} cannot {} in state {}",
            self.thread_id, what, self.state
        ))
    }

    /// Produce the offer message
    pub fn send_offer(&mut self) -> VcxResult<AriesMessage> {
        if self.state != IssuerState::Initial {
            return Err(self.unexpected("send an offer"));
        }
        let message = OfferCredential::new(&self.thread_id, &self.offer)?;
        self.state = IssuerState::OfferSent;
        debug!(
            "Credential Offer: {}",
            serde_json::to_string_pretty(&self.offer).unwrap_or_default()
        );
        Ok(AriesMessage::OfferCredential(message))
    }

    /// Advance on a message from the holder
    pub fn handle_message(&mut self, message: &AriesMessage) -> VcxResult<()> {
        trace!(
            "issuer handle_message >>> {} in state {}",
            message.kind(),
            self.state
        );
        if message.thread_id() != self.thread_id {
            return Err(Error::InvalidMessage(format!(
                "message thread {} does not belong to exchange {}",
                message.thread_id(),
                self.thread_id
            )));
        }
        match (self.state, message) {
            (state, AriesMessage::ProblemReport(report)) if !state.is_terminal() => {
                warn!(
                    "issuer exchange {} failed: {}",
                    self.thread_id, report.description
                );
                self.state = IssuerState::Failed;
            }
            (IssuerState::OfferSent, AriesMessage::RequestCredential(m)) => {
                self.request = Some(m.request()?);
                self.state = IssuerState::RequestReceived;
            }
            (IssuerState::CredentialSent, AriesMessage::CredentialAck(_)) => {
                self.state = IssuerState::Finished;
            }
            _ => return Err(self.unexpected(&format!("handle {}", message.kind()))),
        }
        Ok(())
    }

    /// Sign the credential and produce the issue message.
    ///
    /// A revocable credential consumes the next index of `registry`. The
    /// exchange fails when the registry is exhausted or the request does not
    /// answer the offer.
    pub fn issue_credential(
        &mut self,
        wallet: &dyn Wallet,
        registry: Option<&RevocationRegistry>,
    ) -> VcxResult<AriesMessage> {
        if self.state != IssuerState::RequestReceived {
            return Err(self.unexpected("issue a credential"));
        }
        let request = self
            .request
            .as_ref()
            .ok_or_else(|| self.unexpected("issue a credential without a request"))?;
        if request.cred_def_id != self.offer.cred_def_id || request.offer_nonce != self.offer.nonce {
            self.state = IssuerState::Failed;
            return Err(Error::InvalidMessage(format!(
                "credential request does not answer the offer of exchange {}",
                self.thread_id
            )));
        }

        let witness = match &self.registry {
            Some(handle) => {
                let registry = registry.ok_or_else(|| {
                    Error::Configuration(format!(
                        "revocation registry '{}' is required to issue",
                        handle.rev_reg_id
                    ))
                })?;
                let index = match registry.allocate_index(handle) {
                    Ok(index) => index,
                    Err(e) => {
                        warn!("issuer exchange {} failed: {}", self.thread_id, e);
                        self.state = IssuerState::Failed;
                        return Err(e);
                    }
                };
                Some(registry.witness_for(handle, index)?)
            }
            None => None,
        };
        let index = witness.as_ref().map(|w| w.index);
        let payload = Credential::signature_payload(
            &self.offer.cred_def_id,
            self.offer.rev_reg_id.as_deref(),
            index,
            &self.offer.values,
        );
        let credential = Credential {
            schema_id: self.offer.schema_id.clone(),
            cred_def_id: self.offer.cred_def_id.clone(),
            rev_reg_id: self.offer.rev_reg_id.clone(),
            values: self.offer.values.clone(),
            signature: wallet.sign(&payload)?,
            witness,
        };
        let message = IssueCredential::new(&self.thread_id, &credential)?;
        self.credential = Some(credential);
        self.state = IssuerState::CredentialSent;
        Ok(AriesMessage::IssueCredential(message))
    }

    /// Revoke the issued credential in `registry`
    pub fn revoke(&self, registry: &RevocationRegistry) -> VcxResult<Option<RevocationStatus>> {
        match (&self.registry, self.revocation_index()) {
            (Some(handle), Some(index)) => registry.revoke(handle, index),
            _ => Err(Error::Configuration(format!(
                "exchange {} has no revocable credential",
                self.thread_id
            ))),
        }
    }

    /// Abort the exchange and produce a problem report for the holder
    pub fn fail(&mut self, description: &str) -> AriesMessage {
        self.state = IssuerState::Failed;
        AriesMessage::ProblemReport(ProblemReport::new(
            &self.thread_id,
            "issuance-abandoned",
            description,
        ))
    }
}

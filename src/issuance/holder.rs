use super::HolderState;
use crate::credential::{Credential, CredentialOffer, CredentialRequest};
use crate::encoding::is_encoding_of;
use crate::error::Error;
use crate::ledger::Ledger;
use crate::messages::{Ack, AriesMessage, IssueCredential, ProblemReport, RequestCredential};
use crate::revocation_registry::RevocationRegistryDefinition;
use crate::wallet::Wallet;
use crate::VcxResult;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The holder's view of one credential exchange
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct HolderExchange {
    thread_id: String,
    state: HolderState,
    offer: Option<CredentialOffer>,
    request: Option<CredentialRequest>,
    credential: Option<Credential>,
    referent: Option<String>,
}

impl HolderExchange {
    /// An exchange that has not seen an offer yet
    pub fn new(thread_id: &str) -> Self {
        Self {
            thread_id: thread_id.to_string(),
            state: HolderState::Initial,
            offer: None,
            request: None,
            credential: None,
            referent: None,
        }
    }

    /// Start an exchange from a received offer
    pub fn from_offer(message: &AriesMessage) -> VcxResult<Self> {
        let mut exchange = Self::new(message.thread_id());
        exchange.handle_message(message)?;
        Ok(exchange)
    }

    /// The exchange id
    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    /// The current state
    pub fn state(&self) -> HolderState {
        self.state
    }

    /// The received offer
    pub fn offer(&self) -> Option<&CredentialOffer> {
        self.offer.as_ref()
    }

    /// The stored credential
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// The wallet referent of the stored credential
    pub fn credential_referent(&self) -> Option<&str> {
        self.referent.as_deref()
    }

    /// The raw attribute values of the stored credential
    pub fn attributes(&self) -> VcxResult<BTreeMap<String, String>> {
        self.credential
            .as_ref()
            .map(|c| c.values.raw_values())
            .ok_or_else(|| self.unexpected("read attributes"))
    }

    /// True when the credential is issued under a revocation registry
    pub fn is_revokable(&self) -> bool {
        self.offer
            .as_ref()
            .map_or(false, |o| o.rev_reg_id.is_some())
    }

    /// The registry the credential is issued under
    pub fn rev_reg_id(&self) -> Option<&str> {
        self.offer.as_ref().and_then(|o| o.rev_reg_id.as_deref())
    }

    /// The anchored registry definition, with its tails location and hash
    pub fn revocation_registry(
        &self,
        ledger: &dyn Ledger,
    ) -> VcxResult<Option<RevocationRegistryDefinition>> {
        self.rev_reg_id()
            .map(|id| ledger.resolve_revocation_registry(id))
            .transpose()
    }

    /// Remove the stored credential from `wallet`
    pub fn delete_credential(&mut self, wallet: &dyn Wallet) -> VcxResult<()> {
        let referent = self
            .referent
            .take()
            .ok_or_else(|| self.unexpected("delete a credential"))?;
        wallet.delete_credential(&referent)
    }

    fn unexpected(&self, what: &str) -> Error {
        Error::UnexpectedState(format!(
            "holder exchange {} cannot {} in state {}",
            self.thread_id, what, self.state
        ))
    }

    /// Advance on an offer or a problem report from the issuer
    pub fn handle_message(&mut self, message: &AriesMessage) -> VcxResult<()> {
        trace!(
            "holder handle_message >>> {} in state {}",
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
                    "holder exchange {} failed: {}",
                    self.thread_id, report.description
                );
                self.state = HolderState::Failed;
            }
            (HolderState::Initial, AriesMessage::OfferCredential(m)) => {
                self.offer = Some(m.offer()?);
                self.state = HolderState::OfferReceived;
            }
            _ => return Err(self.unexpected(&format!("handle {}", message.kind()))),
        }
        Ok(())
    }

    /// Request the offered credential
    pub fn accept_offer(&mut self, wallet: &dyn Wallet, prover_did: &str) -> VcxResult<AriesMessage> {
        if self.state != HolderState::OfferReceived {
            return Err(self.unexpected("accept an offer"));
        }
        let offer = self
            .offer
            .as_ref()
            .ok_or_else(|| self.unexpected("accept a missing offer"))?;
        let request = wallet.create_credential_request(prover_did, offer)?;
        let message = RequestCredential::new(&self.thread_id, &request)?;
        self.request = Some(request);
        self.state = HolderState::RequestSent;
        Ok(AriesMessage::RequestCredential(message))
    }

    /// Check and store the issued credential, then produce the acknowledgement.
    ///
    /// The credential must carry exactly the offered values under the offered
    /// credential definition and verify against the issuer's key.
    pub fn process_credential(
        &mut self,
        message: &AriesMessage,
        wallet: &dyn Wallet,
        ledger: &dyn Ledger,
    ) -> VcxResult<AriesMessage> {
        let issued = match (self.state, message) {
            (HolderState::RequestSent, AriesMessage::IssueCredential(m))
                if m.thread.thid == self.thread_id =>
            {
                m
            }
            (_, AriesMessage::ProblemReport(_)) => {
                self.handle_message(message)?;
                return Err(Error::InvalidMessage(format!(
                    "issuer abandoned exchange {}",
                    self.thread_id
                )));
            }
            _ => return Err(self.unexpected(&format!("process {}", message.kind()))),
        };
        let stored = self
            .check_credential(issued, ledger)
            .and_then(|c| wallet.store_credential(c.clone()).map(|r| (r, c)));
        let (referent, credential) = match stored {
            Ok(stored) => stored,
            Err(e) => {
                warn!("holder exchange {} failed: {}", self.thread_id, e);
                self.state = HolderState::Failed;
                return Err(e);
            }
        };
        self.state = HolderState::CredentialReceived;
        debug!(
            "stored credential {} from exchange {}",
            referent, self.thread_id
        );
        self.referent = Some(referent);
        self.credential = Some(credential);
        self.state = HolderState::Finished;
        Ok(AriesMessage::CredentialAck(Ack::new(&self.thread_id)))
    }

    fn check_credential(
        &self,
        issued: &IssueCredential,
        ledger: &dyn Ledger,
    ) -> VcxResult<Credential> {
        let offer = self
            .offer
            .as_ref()
            .ok_or_else(|| self.unexpected("check a credential without an offer"))?;
        let credential = issued.credential()?;
        if credential.cred_def_id != offer.cred_def_id
            || credential.schema_id != offer.schema_id
            || credential.rev_reg_id != offer.rev_reg_id
        {
            return Err(Error::InvalidMessage(format!(
                "credential for '{}' does not match the offer for '{}'",
                credential.cred_def_id, offer.cred_def_id
            )));
        }
        if credential.values.raw_values() != offer.values.raw_values() {
            return Err(Error::InvalidMessage(
                "credential values differ from the offered values".to_string(),
            ));
        }
        if let Some((name, _)) = credential
            .values
            .iter()
            .find(|(_, v)| !is_encoding_of(&v.raw, &v.encoded))
        {
            return Err(Error::InvalidMessage(format!(
                "encoded value of '{}' does not match its raw value",
                name
            )));
        }
        match (&credential.rev_reg_id, &credential.witness) {
            (Some(id), Some(w)) if w.rev_reg_id == *id => {}
            (None, None) => {}
            _ => {
                return Err(Error::InvalidMessage(
                    "credential witness does not match its revocation registry".to_string(),
                ))
            }
        }
        let cred_def = ledger.resolve_cred_def(&credential.cred_def_id)?;
        let payload = Credential::signature_payload(
            &credential.cred_def_id,
            credential.rev_reg_id.as_deref(),
            credential.revocation_index(),
            &credential.values,
        );
        if !cred_def.verify_signature(&payload, &credential.signature)? {
            return Err(Error::InvalidMessage(
                "credential signature does not verify".to_string(),
            ));
        }
        Ok(credential)
    }

    /// Abort the exchange and produce a problem report for the issuer
    pub fn fail(&mut self, description: &str) -> AriesMessage {
        self.state = HolderState::Failed;
        AriesMessage::ProblemReport(ProblemReport::new(
            &self.thread_id,
            "issuance-abandoned",
            description,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::{CredentialDefinition, CredentialValues, Schema};
    use crate::issuance::IssuerExchange;
    use crate::ledger::InMemoryLedger;
    use crate::proof_request::Query;
    use crate::wallet::{HeldCredential, InMemoryWallet};

    struct FullWallet(InMemoryWallet);

    impl Wallet for FullWallet {
        fn verification_key(&self) -> VcxResult<String> {
            self.0.verification_key()
        }

        fn sign(&self, payload: &[u8]) -> VcxResult<String> {
            self.0.sign(payload)
        }

        fn create_credential_request(
            &self,
            prover_did: &str,
            offer: &CredentialOffer,
        ) -> VcxResult<CredentialRequest> {
            self.0.create_credential_request(prover_did, offer)
        }

        fn store_credential(&self, _credential: Credential) -> VcxResult<String> {
            Err(Error::Storage("wallet is full".to_string()))
        }

        fn get_credential(&self, referent: &str) -> VcxResult<Credential> {
            self.0.get_credential(referent)
        }

        fn search_credentials(&self, query: Option<&Query>) -> VcxResult<Vec<HeldCredential>> {
            self.0.search_credentials(query)
        }

        fn delete_credential(&self, referent: &str) -> VcxResult<()> {
            self.0.delete_credential(referent)
        }
    }

    // with `forged` the credential is signed by a key the cred def does not anchor
    fn exchange_until_issued(
        holder_wallet: &dyn Wallet,
        forged: bool,
    ) -> (HolderExchange, AriesMessage, InMemoryLedger) {
        let issuer_wallet = InMemoryWallet::default();
        let ledger = InMemoryLedger::new();
        let schema = Schema::new("did1", "FaberVcx", "1.0", &["name", "age"]).unwrap();
        ledger.anchor_schema(&schema).unwrap();
        let cred_def = CredentialDefinition::new(
            "did1",
            &schema,
            "tag1",
            false,
            issuer_wallet.verification_key().unwrap(),
        );
        ledger.anchor_cred_def(&cred_def).unwrap();
        let values = CredentialValues::from_raw([("name", "alice"), ("age", "25")]);
        let mut issuer = IssuerExchange::create_offer(&schema, &cred_def, values, None).unwrap();
        let offer = issuer.send_offer().unwrap();
        let mut holder = HolderExchange::from_offer(&offer).unwrap();
        let request = holder.accept_offer(holder_wallet, "did2").unwrap();
        issuer.handle_message(&request).unwrap();
        let signer = if forged {
            InMemoryWallet::default()
        } else {
            issuer_wallet
        };
        let issued = issuer.issue_credential(&signer, None).unwrap();
        (holder, issued, ledger)
    }

    #[test]
    fn issued_credential_is_stored() {
        let wallet = InMemoryWallet::default();
        let (mut holder, issued, ledger) = exchange_until_issued(&wallet, false);
        let ack = holder.process_credential(&issued, &wallet, &ledger).unwrap();
        assert_eq!(ack.kind(), "CredentialAck");
        assert_eq!(holder.state(), HolderState::Finished);
        let referent = holder.credential_referent().unwrap();
        assert_eq!(wallet.get_credential(referent).unwrap().values.len(), 2);
    }

    #[test]
    fn store_failure_fails_the_exchange() {
        let wallet = FullWallet(InMemoryWallet::default());
        let (mut holder, issued, ledger) = exchange_until_issued(&wallet, false);
        let res = holder.process_credential(&issued, &wallet, &ledger);
        assert!(matches!(res, Err(Error::Storage(_))), "{:?}", res);
        assert_eq!(holder.state(), HolderState::Failed);
        assert!(holder.credential().is_none());
        assert!(holder.credential_referent().is_none());
    }

    #[test]
    fn credential_signed_by_another_key_is_rejected() {
        let wallet = InMemoryWallet::default();
        let (mut holder, issued, ledger) = exchange_until_issued(&wallet, true);
        let res = holder.process_credential(&issued, &wallet, &ledger);
        assert!(matches!(res, Err(Error::InvalidMessage(_))), "{:?}", res);
        assert_eq!(holder.state(), HolderState::Failed);
        assert!(wallet.search_credentials(None).unwrap().is_empty());
    }
}

use super::VerifierState;
use crate::error::Error;
use crate::ledger::Ledger;
use crate::messages::{Ack, AriesMessage, ProblemReport, RequestPresentation};
use crate::presentation::{
    resolve_registry_state, verify_presentation, Presentation, PresentationVerificationStatus,
    VerificationResult,
};
use crate::proof_request::{ProofRequest, ProofRequestData};
use crate::proof_system::{ProofSystem, PublicParams};
use crate::VcxResult;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

/// The verification outcome with the exchanged attachments
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PresentationInfo {
    /// The combined verification status
    pub presentation_verification_status: PresentationVerificationStatus,
    /// The received presentation as json
    pub presentation_attachment: serde_json::Value,
    /// The sent request as json
    pub presentation_request_attachment: serde_json::Value,
}

/// The verifier's view of one presentation exchange
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerifierExchange {
    thread_id: String,
    state: VerifierState,
    request: ProofRequest,
    presentation: Option<Presentation>,
    result: Option<VerificationResult>,
}

impl VerifierExchange {
    /// Build and validate a proof request
    pub fn new(data: ProofRequestData) -> VcxResult<Self> {
        Ok(Self {
            thread_id: uuid::Uuid::new_v4().to_string(),
            state: VerifierState::Initial,
            request: ProofRequest::build(data)?,
            presentation: None,
            result: None,
        })
    }

    /// The exchange id
    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    /// The current state
    pub fn state(&self) -> VerifierState {
        self.state
    }

    /// The proof request
    pub fn request(&self) -> &ProofRequest {
        &self.request
    }

    /// The received presentation
    pub fn presentation(&self) -> Option<&Presentation> {
        self.presentation.as_ref()
    }

    /// The verification result
    pub fn result(&self) -> Option<&VerificationResult> {
        self.result.as_ref()
    }

    /// The verification status, once a presentation was verified
    pub fn verification_status(&self) -> Option<PresentationVerificationStatus> {
        self.result.as_ref().map(|r| r.status)
    }

    /// The status and attachments of a verified exchange
    pub fn presentation_info(&self) -> VcxResult<PresentationInfo> {
        let result = self.result.as_ref().ok_or_else(|| {
            Error::UnexpectedState(format!(
                "verifier exchange {} has no verified presentation in state {}",
                self.thread_id, self.state
            ))
        })?;
        Ok(PresentationInfo {
            presentation_verification_status: result.status,
            presentation_attachment: serde_json::to_value(&result.presentation)?,
            presentation_request_attachment: serde_json::to_value(&result.request)?,
        })
    }

    fn unexpected(&self, what: &str) -> Error {
        Error::UnexpectedState(format!(
            "verifier exchange {} cannot {} in state {}",
            self.thread_id, what, self.state
        ))
    }

    /// Produce the request message
    pub fn send_request(&mut self) -> VcxResult<AriesMessage> {
        if self.state != VerifierState::Initial {
            return Err(self.unexpected("send a request"));
        }
        let message = RequestPresentation::new(&self.thread_id, &self.request)?;
        self.state = VerifierState::RequestSent;
        Ok(AriesMessage::RequestPresentation(message))
    }

    /// Advance on a message from the prover.
    ///
    /// A received presentation is verified at once. Returns the ack for a
    /// valid presentation or the problem report for any other outcome.
    pub fn handle_message(
        &mut self,
        message: &AriesMessage,
        ledger: &dyn Ledger,
        proof_system: &dyn ProofSystem,
    ) -> VcxResult<Option<AriesMessage>> {
        trace!(
            "verifier handle_message >>> {} in state {}",
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
                    "verifier exchange {} failed: {}",
                    self.thread_id, report.description
                );
                self.state = VerifierState::Failed;
                Ok(None)
            }
            (VerifierState::RequestSent, AriesMessage::Presentation(m)) => {
                let presentation = m.presentation()?;
                self.state = VerifierState::PresentationReceived;
                self.presentation = Some(presentation.clone());
                match self.verify(&presentation, ledger, proof_system) {
                    Ok(reply) => Ok(Some(reply)),
                    Err(e) => {
                        warn!("verifier exchange {} failed: {}", self.thread_id, e);
                        self.state = VerifierState::Failed;
                        Err(e)
                    }
                }
            }
            _ => Err(self.unexpected(&format!("handle {}", message.kind()))),
        }
    }

    fn verify(
        &mut self,
        presentation: &Presentation,
        ledger: &dyn Ledger,
        proof_system: &dyn ProofSystem,
    ) -> VcxResult<AriesMessage> {
        let registries = resolve_registry_state(ledger, presentation)?;
        let params = PublicParams::resolve(ledger, presentation)?;
        let result = verify_presentation(
            &self.request,
            presentation,
            &registries,
            &params,
            proof_system,
        )?;
        let reply = if result.is_valid() {
            AriesMessage::PresentationAck(Ack::new(&self.thread_id))
        } else {
            AriesMessage::ProblemReport(ProblemReport::new(
                &self.thread_id,
                "presentation-rejected",
                &format!(
                    "presentation is {}: {:?}",
                    result.status,
                    result.reason
                ),
            ))
        };
        debug!(
            "verifier exchange {} finished with {}",
            self.thread_id, result.status
        );
        self.result = Some(result);
        self.state = VerifierState::Finished;
        Ok(reply)
    }

    /// Abort the exchange and produce a problem report for the prover
    pub fn fail(&mut self, description: &str) -> AriesMessage {
        self.state = VerifierState::Failed;
        AriesMessage::ProblemReport(ProblemReport::new(
            &self.thread_id,
            "verification-abandoned",
            description,
        ))
    }
}

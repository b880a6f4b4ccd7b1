use super::ProverState;
use crate::error::Error;
use crate::messages::{AriesMessage, PresentationMessage, ProblemReport};
use crate::presentation::{Presentation, PresentationBuilder};
use crate::proof_request::ProofRequest;
use crate::VcxResult;
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The prover's view of one presentation exchange
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProverExchange {
    thread_id: String,
    state: ProverState,
    request: Option<ProofRequest>,
    presentation: Option<Presentation>,
}

impl ProverExchange {
    /// An exchange that has not seen a request yet
    pub fn new(thread_id: &str) -> Self {
        Self {
            thread_id: thread_id.to_string(),
            state: ProverState::Initial,
            request: None,
            presentation: None,
        }
    }

    /// Start an exchange from a received request
    pub fn from_request(message: &AriesMessage) -> VcxResult<Self> {
        let mut exchange = Self::new(message.thread_id());
        exchange.handle_message(message)?;
        Ok(exchange)
    }

    /// The exchange id
    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    /// The current state
    pub fn state(&self) -> ProverState {
        self.state
    }

    /// The received request
    pub fn request(&self) -> Option<&ProofRequest> {
        self.request.as_ref()
    }

    /// The sent presentation
    pub fn presentation(&self) -> Option<&Presentation> {
        self.presentation.as_ref()
    }

    fn unexpected(&self, what: &str) -> Error {
        Error::UnexpectedState(format!(
            "prover exchange {} cannot {} in state {}",
            self.thread_id, what, self.state
        ))
    }

    /// Advance on a message from the verifier
    pub fn handle_message(&mut self, message: &AriesMessage) -> VcxResult<()> {
        trace!(
            "prover handle_message >>> {} in state {}",
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
                    "prover exchange {} failed: {}",
                    self.thread_id, report.description
                );
                self.state = ProverState::Failed;
            }
            (ProverState::Initial, AriesMessage::RequestPresentation(m)) => {
                self.request = Some(m.request()?);
                self.state = ProverState::RequestReceived;
            }
            (ProverState::PresentationSent, AriesMessage::PresentationAck(_)) => {
                self.state = ProverState::Finished;
            }
            _ => return Err(self.unexpected(&format!("handle {}", message.kind()))),
        }
        Ok(())
    }

    /// Build the presentation and produce the presentation message.
    ///
    /// A build error leaves the exchange in `RequestReceived`.
    pub fn send_presentation(
        &mut self,
        builder: &PresentationBuilder<'_>,
        self_attested: &BTreeMap<String, String>,
    ) -> VcxResult<AriesMessage> {
        if self.state != ProverState::RequestReceived {
            return Err(self.unexpected("send a presentation"));
        }
        let request = self
            .request
            .as_ref()
            .ok_or_else(|| self.unexpected("answer a missing request"))?;
        let presentation = builder.build(request, self_attested)?;
        let message = PresentationMessage::new(&self.thread_id, &presentation)?;
        self.presentation = Some(presentation);
        self.state = ProverState::PresentationSent;
        Ok(AriesMessage::Presentation(message))
    }

    /// Refuse the request and produce a problem report for the verifier
    pub fn decline(&mut self, description: &str) -> AriesMessage {
        self.state = ProverState::Failed;
        AriesMessage::ProblemReport(ProblemReport::new(
            &self.thread_id,
            "request-declined",
            description,
        ))
    }
}

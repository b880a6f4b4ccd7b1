mod attachment;
mod issuance;
mod presentation;
mod problem_report;

pub use attachment::*;
pub use issuance::*;
pub use presentation::*;
pub use problem_report::*;

use crate::VcxResult;
use serde::{Deserialize, Serialize};

/// Correlates the messages of one exchange
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Thread {
    /// The exchange id
    pub thid: String,
}

impl Thread {
    /// The thread of exchange `thid`
    pub fn new(thid: &str) -> Self {
        Self {
            thid: thid.to_string(),
        }
    }
}

pub(crate) fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Every protocol message, tagged by its message type
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "@type")]
pub enum AriesMessage {
    /// Issuer offers a credential
    #[serde(rename = "issue-credential/1.0/offer-credential")]
    OfferCredential(OfferCredential),
    /// Holder requests the offered credential
    #[serde(rename = "issue-credential/1.0/request-credential")]
    RequestCredential(RequestCredential),
    /// Issuer sends the credential
    #[serde(rename = "issue-credential/1.0/issue-credential")]
    IssueCredential(IssueCredential),
    /// Holder acknowledges the credential
    #[serde(rename = "issue-credential/1.0/ack")]
    CredentialAck(Ack),
    /// Verifier requests a presentation
    #[serde(rename = "present-proof/1.0/request-presentation")]
    RequestPresentation(RequestPresentation),
    /// Prover sends a presentation
    #[serde(rename = "present-proof/1.0/presentation")]
    Presentation(PresentationMessage),
    /// Verifier accepts the presentation
    #[serde(rename = "present-proof/1.0/ack")]
    PresentationAck(Ack),
    /// Either side aborts the exchange
    #[serde(rename = "notification/1.0/problem-report")]
    ProblemReport(ProblemReport),
}

impl AriesMessage {
    /// The message id
    pub fn id(&self) -> &str {
        match self {
            Self::OfferCredential(m) => &m.id,
            Self::RequestCredential(m) => &m.id,
            Self::IssueCredential(m) => &m.id,
            Self::CredentialAck(m) | Self::PresentationAck(m) => &m.id,
            Self::RequestPresentation(m) => &m.id,
            Self::Presentation(m) => &m.id,
            Self::ProblemReport(m) => &m.id,
        }
    }

    /// The id of the exchange the message belongs to
    pub fn thread_id(&self) -> &str {
        match self {
            Self::OfferCredential(m) => &m.thread.thid,
            Self::RequestCredential(m) => &m.thread.thid,
            Self::IssueCredential(m) => &m.thread.thid,
            Self::CredentialAck(m) | Self::PresentationAck(m) => &m.thread.thid,
            Self::RequestPresentation(m) => &m.thread.thid,
            Self::Presentation(m) => &m.thread.thid,
            Self::ProblemReport(m) => &m.thread.thid,
        }
    }

    /// A short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OfferCredential(_) => "OfferCredential",
            Self::RequestCredential(_) => "RequestCredential",
            Self::IssueCredential(_) => "IssueCredential",
            Self::CredentialAck(_) => "CredentialAck",
            Self::RequestPresentation(_) => "RequestPresentation",
            Self::Presentation(_) => "Presentation",
            Self::PresentationAck(_) => "PresentationAck",
            Self::ProblemReport(_) => "ProblemReport",
        }
    }

    /// Serialize to json
    pub fn to_json(&self) -> VcxResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from json
    pub fn from_json(json: &str) -> VcxResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

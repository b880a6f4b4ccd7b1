use super::{new_message_id, Attachment, Thread};
use crate::presentation::Presentation;
use crate::proof_request::ProofRequest;
use crate::VcxResult;
use serde::{Deserialize, Serialize};

/// Requests a presentation from a prover
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RequestPresentation {
    /// The message id
    #[serde(rename = "@id")]
    pub id: String,
    /// The exchange thread
    #[serde(rename = "~thread")]
    pub thread: Thread,
    /// A friendly description
    #[serde(default)]
    pub comment: String,
    /// The encoded [`ProofRequest`]
    #[serde(rename = "request_presentations~attach")]
    pub request_presentations_attach: Attachment,
}

impl RequestPresentation {
    /// Wrap `request`
    pub fn new(thid: &str, request: &ProofRequest) -> VcxResult<Self> {
        Ok(Self {
            id: new_message_id(),
            thread: Thread::new(thid),
            comment: request.name.clone(),
            request_presentations_attach: Attachment::encode(
                "libindy-request-presentation-0",
                request,
            )?,
        })
    }

    /// The attached request
    pub fn request(&self) -> VcxResult<ProofRequest> {
        let request: ProofRequest = self.request_presentations_attach.decode()?;
        request.validate()?;
        Ok(request)
    }
}

/// Delivers a presentation to the verifier
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PresentationMessage {
    /// The message id
    #[serde(rename = "@id")]
    pub id: String,
    /// The exchange thread
    #[serde(rename = "~thread")]
    pub thread: Thread,
    /// The encoded [`Presentation`]
    #[serde(rename = "presentations~attach")]
    pub presentations_attach: Attachment,
}

impl PresentationMessage {
    /// Wrap `presentation`
    pub fn new(thid: &str, presentation: &Presentation) -> VcxResult<Self> {
        Ok(Self {
            id: new_message_id(),
            thread: Thread::new(thid),
            presentations_attach: Attachment::encode("libindy-presentation-0", presentation)?,
        })
    }

    /// The attached presentation
    pub fn presentation(&self) -> VcxResult<Presentation> {
        self.presentations_attach.decode()
    }
}

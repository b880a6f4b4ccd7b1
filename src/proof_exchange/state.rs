use core::fmt::{self, Display, Formatter};
use serde::{Deserialize, Serialize};

/// Verifier side of a presentation exchange
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum VerifierState {
    /// The request is prepared
    Initial,
    /// The request was sent
    RequestSent,
    /// A presentation arrived and is being verified
    PresentationReceived,
    /// The presentation was verified, valid or not
    Finished,
    /// The exchange was aborted
    Failed,
}

impl VerifierState {
    /// True for `Finished` and `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

impl Display for VerifierState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Prover side of a presentation exchange
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ProverState {
    /// Nothing was received yet
    Initial,
    /// A request was received
    RequestReceived,
    /// The presentation was sent
    PresentationSent,
    /// The verifier accepted the presentation
    Finished,
    /// The verifier rejected the presentation or the exchange was aborted
    Failed,
}

impl ProverState {
    /// True for `Finished` and `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

impl Display for ProverState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

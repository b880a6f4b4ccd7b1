use core::fmt::{self, Display, Formatter};
use serde::{Deserialize, Serialize};

/// Issuer side of a credential exchange
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum IssuerState {
    /// The offer is prepared
    Initial,
    /// The offer was sent
    OfferSent,
    /// The holder asked for the credential
    RequestReceived,
    /// The credential was sent
    CredentialSent,
    /// The holder acknowledged the credential
    Finished,
    /// The exchange was aborted
    Failed,
}

impl IssuerState {
    /// True for `Finished` and `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

impl Display for IssuerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Holder side of a credential exchange
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum HolderState {
    /// Nothing was received yet
    Initial,
    /// An offer was received
    OfferReceived,
    /// The credential was requested
    RequestSent,
    /// The credential was received and checked
    CredentialReceived,
    /// The credential is stored and acknowledged
    Finished,
    /// The exchange was aborted
    Failed,
}

impl HolderState {
    /// True for `Finished` and `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

impl Display for HolderState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

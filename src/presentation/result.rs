use super::Presentation;
use crate::proof_request::ProofRequest;
use core::fmt::{self, Display, Formatter};
use serde::{Deserialize, Serialize};

/// The outcome of verifying a presentation
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum PresentationVerificationStatus {
    /// Every check passed
    Valid,
    /// A check failed
    Invalid,
    /// A referenced registry could not be found
    Unavailable,
}

impl Display for PresentationVerificationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "Valid"),
            Self::Invalid => write!(f, "Invalid"),
            Self::Unavailable => write!(f, "Unavailable"),
        }
    }
}

/// Why a presentation did not verify
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum InvalidReason {
    /// A credential was revoked at presentation time
    Revoked,
    /// A credential does not meet a referent's restrictions
    RestrictionViolation,
    /// The presentation does not answer the request
    SemanticMismatch,
    /// The proof does not verify
    CryptographicFailure,
    /// A referenced registry could not be found
    RegistryUnavailable,
}

/// The status of a verified presentation with the request it answers
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerificationResult {
    /// The combined status
    pub status: PresentationVerificationStatus,
    /// Set unless the status is valid
    pub reason: Option<InvalidReason>,
    /// The verified presentation
    pub presentation: Presentation,
    /// The request it answers
    pub request: ProofRequest,
}

impl VerificationResult {
    pub(crate) fn new(
        request: &ProofRequest,
        presentation: &Presentation,
        reason: Option<InvalidReason>,
    ) -> Self {
        let status = match reason {
            None => PresentationVerificationStatus::Valid,
            Some(InvalidReason::RegistryUnavailable) => PresentationVerificationStatus::Unavailable,
            Some(_) => PresentationVerificationStatus::Invalid,
        };
        Self {
            status,
            reason,
            presentation: presentation.clone(),
            request: request.clone(),
        }
    }

    /// True when the status is valid
    pub fn is_valid(&self) -> bool {
        self.status == PresentationVerificationStatus::Valid
    }
}

use core::fmt::{self, Display, Formatter};
use std::sync::PoisonError;

/// Errors created by this library
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A required schema, credential definition or registry reference is missing or wrong
    Configuration(String),
    /// Tails storage could not be read or written
    Storage(String),
    /// The revocation registry has no remaining capacity
    RegistryExhausted {
        /// The exhausted registry
        rev_reg_id: String,
        /// The registry capacity
        max_creds: u32,
    },
    /// A credential index beyond the registry capacity
    IndexOutOfRange {
        /// The requested index
        index: u32,
        /// The registry capacity
        max_creds: u32,
    },
    /// A requested attribute was neither revealed nor self attested
    MissingAttribute(String),
    /// No held credential satisfies a requested attribute or predicate
    NoMatchingCredential(String),
    /// A restriction expression did not match the backing credential
    RestrictionViolation(String),
    /// A transition was invoked out of order
    UnexpectedState(String),
    /// The proof system could not process the proof
    CryptoVerification(String),
    /// The caller expected a different state
    StateMismatch {
        /// The state the caller asserted
        expected: String,
        /// The state that was observed
        actual: String,
    },
    /// Data could not be (de)serialized
    InvalidJson(String),
    /// A proof request or one of its restrictions is malformed
    InvalidProofRequest(String),
    /// A presentation is structurally invalid
    InvalidPresentation(String),
    /// A message does not belong to or is inconsistent with the exchange
    InvalidMessage(String),
    /// An object could not be found
    NotFound(String),
    /// Internal state could not be accessed
    InvalidState(String),
}

impl Error {
    /// A short stable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Storage(_) => "storage",
            Self::RegistryExhausted { .. } => "registry_exhausted",
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::MissingAttribute(_) => "missing_attribute",
            Self::NoMatchingCredential(_) => "no_matching_credential",
            Self::RestrictionViolation(_) => "restriction_violation",
            Self::UnexpectedState(_) => "unexpected_state",
            Self::CryptoVerification(_) => "crypto_verification",
            Self::StateMismatch { .. } => "state_mismatch",
            Self::InvalidJson(_) => "invalid_json",
            Self::InvalidProofRequest(_) => "invalid_proof_request",
            Self::InvalidPresentation(_) => "invalid_presentation",
            Self::InvalidMessage(_) => "invalid_message",
            Self::NotFound(_) => "not_found",
            Self::InvalidState(_) => "invalid_state",
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(m) => write!(f, "configuration error: {}", m),
            Self::Storage(m) => write!(f, "storage error: {}", m),
            Self::RegistryExhausted {
                rev_reg_id,
                max_creds,
            } => write!(
                f,
                "revocation registry '{}' has issued all {} credentials",
                rev_reg_id, max_creds
            ),
            Self::IndexOutOfRange { index, max_creds } => write!(
                f,
                "credential index {} is out of range for a registry of {} credentials",
                index, max_creds
            ),
            Self::MissingAttribute(m) => write!(f, "missing attribute: {}", m),
            Self::NoMatchingCredential(m) => write!(f, "no matching credential: {}", m),
            Self::RestrictionViolation(m) => write!(f, "restriction violation: {}", m),
            Self::UnexpectedState(m) => write!(f, "unexpected state: {}", m),
            Self::CryptoVerification(m) => write!(f, "proof verification error: {}", m),
            Self::StateMismatch { expected, actual } => {
                write!(f, "expected state {}, found {}", expected, actual)
            }
            Self::InvalidJson(m) => write!(f, "invalid json: {}", m),
            Self::InvalidProofRequest(m) => write!(f, "invalid proof request: {}", m),
            Self::InvalidPresentation(m) => write!(f, "invalid presentation: {}", m),
            Self::InvalidMessage(m) => write!(f, "invalid message: {}", m),
            Self::NotFound(m) => write!(f, "not found: {}", m),
            Self::InvalidState(m) => write!(f, "invalid state: {}", m),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidJson(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Self::InvalidMessage(format!("attachment is not valid base64: {}", err))
    }
}

impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::InvalidState(err.to_string())
    }
}

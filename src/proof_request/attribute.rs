use super::Query;
use crate::error::Error;
use crate::VcxResult;
use core::fmt::{self, Display, Formatter};
use serde::{Deserialize, Serialize};

/// The time range non-revocation must be proven for, in seconds since the epoch
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NonRevokedInterval {
    /// Start of the interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<i64>,
    /// End of the interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<i64>,
}

/// A requested attribute or group of attributes from one credential
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AttributeInfo {
    /// A single attribute name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Several attribute names revealed from the same credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
    /// Which credentials may back the attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<Query>,
    /// Whether the prover may state the value without a credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_attest_allowed: Option<bool>,
    /// Per attribute override of the request interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_revoked: Option<NonRevokedInterval>,
}

impl AttributeInfo {
    /// Request a single attribute
    pub fn single(name: &str, restrictions: Option<Query>) -> Self {
        Self {
            name: Some(name.to_string()),
            restrictions,
            ..Default::default()
        }
    }

    /// Request several attributes from one credential
    pub fn group(names: &[&str], restrictions: Option<Query>) -> Self {
        Self {
            names: Some(names.iter().map(|n| n.to_string()).collect()),
            restrictions,
            ..Default::default()
        }
    }

    /// Request a single attribute the prover may state itself
    pub fn self_attested(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            self_attest_allowed: Some(true),
            ..Default::default()
        }
    }

    /// The requested attribute names
    pub fn attr_names(&self) -> Vec<&str> {
        match (&self.name, &self.names) {
            (Some(name), _) => vec![name.as_str()],
            (None, Some(names)) => names.iter().map(String::as_str).collect(),
            (None, None) => Vec::new(),
        }
    }

    /// True when the attribute was requested through `names`
    pub fn is_group(&self) -> bool {
        self.names.is_some()
    }

    /// True when the prover may self attest this attribute
    pub fn allows_self_attest(&self) -> bool {
        self.self_attest_allowed.unwrap_or(false)
    }

    pub(crate) fn validate(&self, referent: &str) -> VcxResult<()> {
        match (&self.name, &self.names) {
            (Some(_), Some(_)) | (None, None) => {
                return Err(Error::InvalidProofRequest(format!(
                    "'{}' must have exactly one of name or names",
                    referent
                )))
            }
            (None, Some(names)) => {
                if names.is_empty() {
                    return Err(Error::InvalidProofRequest(format!(
                        "'{}' requests an empty group",
                        referent
                    )));
                }
                if self.allows_self_attest() {
                    return Err(Error::InvalidProofRequest(format!(
                        "'{}' is a group and cannot be self attested",
                        referent
                    )));
                }
            }
            (Some(_), None) => {}
        }
        Ok(())
    }
}

/// Predicate comparison operators
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum PredicateType {
    /// Greater than or equal
    #[serde(rename = ">=")]
    GreaterEqual,
    /// Greater than
    #[serde(rename = ">")]
    Greater,
    /// Less than or equal
    #[serde(rename = "<=")]
    LessEqual,
    /// Less than
    #[serde(rename = "<")]
    Less,
}

impl PredicateType {
    /// True when `value` satisfies the predicate against `p_value`
    pub fn check(&self, value: i32, p_value: i32) -> bool {
        match self {
            Self::GreaterEqual => value >= p_value,
            Self::Greater => value > p_value,
            Self::LessEqual => value <= p_value,
            Self::Less => value < p_value,
        }
    }
}

impl Display for PredicateType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::GreaterEqual => ">=",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::Less => "<",
        };
        write!(f, "{}", s)
    }
}

/// A requested predicate over one numeric attribute
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PredicateInfo {
    /// The attribute the predicate is over
    pub name: String,
    /// The comparison
    pub p_type: PredicateType,
    /// The value compared against
    pub p_value: i32,
    /// Which credentials may back the predicate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<Query>,
    /// Per predicate override of the request interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_revoked: Option<NonRevokedInterval>,
}

impl PredicateInfo {
    /// True when the raw attribute value satisfies this predicate
    pub fn is_satisfied_by(&self, raw: &str) -> bool {
        raw.parse::<i32>()
            .map(|v| self.p_type.check(v, self.p_value))
            .unwrap_or(false)
    }
}

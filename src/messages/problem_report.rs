use super::{new_message_id, Thread};
use serde::{Deserialize, Serialize};

/// Aborts an exchange
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProblemReport {
    /// The message id
    #[serde(rename = "@id")]
    pub id: String,
    /// The exchange thread
    #[serde(rename = "~thread")]
    pub thread: Thread,
    /// A machine readable problem code
    pub code: String,
    /// What went wrong
    pub description: String,
}

impl ProblemReport {
    /// A report for exchange `thid`
    pub fn new(thid: &str, code: &str, description: &str) -> Self {
        Self {
            id: new_message_id(),
            thread: Thread::new(thid),
            code: code.to_string(),
            description: description.to_string(),
        }
    }
}

use crate::error::Error;
use crate::VcxResult;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

const JSON_MIME_TYPE: &str = "application/json";

/// A base64 encoded json payload carried by a message
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Attachment {
    /// Identifies the attachment within the message
    #[serde(rename = "@id")]
    pub id: String,
    /// The payload media type
    #[serde(rename = "mime-type")]
    pub mime_type: String,
    /// The payload
    pub data: AttachmentData,
}

/// Attachment payload
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AttachmentData {
    /// The base64 encoded json
    pub base64: String,
}

impl Attachment {
    /// Encode `payload` as json
    pub fn encode<T: Serialize>(id: &str, payload: &T) -> VcxResult<Self> {
        let json = serde_json::to_vec(payload)?;
        Ok(Self {
            id: id.to_string(),
            mime_type: JSON_MIME_TYPE.to_string(),
            data: AttachmentData {
                base64: STANDARD.encode(json),
            },
        })
    }

    /// The decoded json payload
    pub fn json(&self) -> VcxResult<serde_json::Value> {
        self.decode()
    }

    /// Decode the payload
    pub fn decode<T: DeserializeOwned>(&self) -> VcxResult<T> {
        if self.mime_type != JSON_MIME_TYPE {
            return Err(Error::InvalidMessage(format!(
                "unsupported attachment type '{}'",
                self.mime_type
            )));
        }
        let bytes = STANDARD.decode(&self.data.base64)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

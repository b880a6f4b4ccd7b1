use crate::encoding::encode_attribute;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A raw attribute value and its encoding
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AttributeValue {
    /// The value as presented to people
    pub raw: String,
    /// The value as signed
    pub encoded: String,
}

impl AttributeValue {
    /// Encode `raw`
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            encoded: encode_attribute(raw),
        }
    }
}

/// The attribute values of a credential keyed by attribute name
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CredentialValues(pub BTreeMap<String, AttributeValue>);

impl CredentialValues {
    /// Encode raw values
    pub fn from_raw<K: AsRef<str>, V: AsRef<str>>(raw: impl IntoIterator<Item = (K, V)>) -> Self {
        Self(
            raw.into_iter()
                .map(|(k, v)| (k.as_ref().to_string(), AttributeValue::new(v.as_ref())))
                .collect(),
        )
    }

    /// The raw values only
    pub fn raw_values(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.raw.clone()))
            .collect()
    }

    /// Find a value by attribute name, ignoring case and whitespace
    pub fn get(&self, name: &str) -> Option<(&String, &AttributeValue)> {
        let wanted = super::normalize_attr_name(name);
        self.0
            .iter()
            .find(|(k, _)| super::normalize_attr_name(k) == wanted)
    }

    /// Iterate over name and value pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.0.iter()
    }

    /// The number of attributes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no attributes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

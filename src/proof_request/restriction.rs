use crate::credential::{
    normalize_attr_name, TAG_CRED_DEF_ID, TAG_ISSUER_DID, TAG_REV_REG_ID, TAG_SCHEMA_ID,
    TAG_SCHEMA_ISSUER_DID, TAG_SCHEMA_NAME, TAG_SCHEMA_VERSION,
};
use crate::error::Error;
use crate::VcxResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

const OP_AND: &str = "$and";
const OP_OR: &str = "$or";
const OP_NOT: &str = "$not";
const OP_NEQ: &str = "$neq";
const OP_IN: &str = "$in";

const KNOWN_TAGS: [&str; 7] = [
    TAG_SCHEMA_ID,
    TAG_SCHEMA_ISSUER_DID,
    TAG_SCHEMA_NAME,
    TAG_SCHEMA_VERSION,
    TAG_ISSUER_DID,
    TAG_CRED_DEF_ID,
    TAG_REV_REG_ID,
];

/// A restriction expression over credential tags.
///
/// The json form is the wallet query language: `{"tag": "value"}` for equality,
/// `{"tag": {"$neq": "value"}}`, `{"tag": {"$in": [..]}}`, and the `$and`, `$or`
/// and `$not` combinators. An object with several keys is an implicit `$and`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Query {
    /// Every sub query matches
    And(Vec<Query>),
    /// At least one sub query matches
    Or(Vec<Query>),
    /// The sub query does not match
    Not(Box<Query>),
    /// The tag equals the value
    Eq(String, String),
    /// The tag is present and differs from the value
    Neq(String, String),
    /// The tag equals one of the values
    In(String, Vec<String>),
}

impl Query {
    /// Evaluate the query against the tags of one credential
    pub fn matches(&self, tags: &BTreeMap<String, String>) -> bool {
        match self {
            Self::And(qs) => qs.iter().all(|q| q.matches(tags)),
            Self::Or(qs) => qs.iter().any(|q| q.matches(tags)),
            Self::Not(q) => !q.matches(tags),
            Self::Eq(tag, value) => lookup(tags, tag).map_or(false, |v| v == value),
            Self::Neq(tag, value) => lookup(tags, tag).map_or(false, |v| v != value),
            Self::In(tag, values) => lookup(tags, tag).map_or(false, |v| values.contains(v)),
        }
    }

    fn leaf_tag(&self) -> Option<&str> {
        match self {
            Self::Eq(tag, _) | Self::Neq(tag, _) | Self::In(tag, _) => Some(tag.as_str()),
            _ => None,
        }
    }

    fn leaf_value(&self) -> Option<Value> {
        match self {
            Self::Eq(_, v) => Some(Value::String(v.clone())),
            Self::Neq(_, v) => {
                let mut m = Map::new();
                m.insert(OP_NEQ.to_string(), Value::String(v.clone()));
                Some(Value::Object(m))
            }
            Self::In(_, vs) => {
                let mut m = Map::new();
                m.insert(
                    OP_IN.to_string(),
                    Value::Array(vs.iter().cloned().map(Value::String).collect()),
                );
                Some(Value::Object(m))
            }
            _ => None,
        }
    }
}

fn lookup<'a>(tags: &'a BTreeMap<String, String>, tag: &str) -> Option<&'a String> {
    tags.get(&*canonical_tag(tag))
}

fn canonical_tag(tag: &str) -> Cow<'_, str> {
    match parse_attr_tag(tag) {
        Some((name, kind)) => format!("attr::{}::{}", normalize_attr_name(name), kind).into(),
        None => tag.into(),
    }
}

fn parse_attr_tag(tag: &str) -> Option<(&str, &str)> {
    let rest = tag.strip_prefix("attr::")?;
    let (name, kind) = rest.rsplit_once("::")?;
    if name.is_empty() || !(kind == "value" || kind == "marker") {
        return None;
    }
    Some((name, kind))
}

/// True when `tag` can be used in a restriction
pub fn is_known_tag(tag: &str) -> bool {
    KNOWN_TAGS.contains(&tag) || parse_attr_tag(tag).is_some()
}

fn parse_string(value: &Value, context: &str) -> VcxResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidProofRequest(format!("'{}' expects a string", context)))
}

fn parse_list(value: Value, op: &str) -> VcxResult<Vec<Query>> {
    match value {
        Value::Array(items) => items.into_iter().map(Query::try_from).collect(),
        _ => Err(Error::InvalidProofRequest(format!("'{}' expects a list", op))),
    }
}

fn parse_leaf(tag: String, value: Value) -> VcxResult<Query> {
    if !is_known_tag(&tag) {
        return Err(Error::InvalidProofRequest(format!(
            "unknown restriction tag '{}'",
            tag
        )));
    }
    match value {
        Value::String(v) => Ok(Query::Eq(tag, v)),
        Value::Object(map) if map.len() == 1 => {
            let (op, operand) = map.into_iter().next().ok_or_else(|| {
                Error::InvalidProofRequest(format!("empty operator for '{}'", tag))
            })?;
            match op.as_str() {
                OP_NEQ => Ok(Query::Neq(tag, parse_string(&operand, OP_NEQ)?)),
                OP_IN => match operand {
                    Value::Array(items) => Ok(Query::In(
                        tag,
                        items
                            .iter()
                            .map(|i| parse_string(i, OP_IN))
                            .collect::<VcxResult<Vec<_>>>()?,
                    )),
                    _ => Err(Error::InvalidProofRequest("'$in' expects a list".to_string())),
                },
                _ => Err(Error::InvalidProofRequest(format!(
                    "unsupported operator '{}' for '{}'",
                    op, tag
                ))),
            }
        }
        _ => Err(Error::InvalidProofRequest(format!(
            "unsupported restriction value for '{}'",
            tag
        ))),
    }
}

fn parse_entry(key: String, value: Value) -> VcxResult<Query> {
    match key.as_str() {
        OP_AND => Ok(Query::And(parse_list(value, OP_AND)?)),
        OP_OR => Ok(Query::Or(parse_list(value, OP_OR)?)),
        OP_NOT => Ok(Query::Not(Box::new(Query::try_from(value)?))),
        _ => parse_leaf(key, value),
    }
}

impl TryFrom<Value> for Query {
    type Error = Error;

    fn try_from(value: Value) -> VcxResult<Self> {
        match value {
            Value::Object(map) => {
                if map.len() == 1 {
                    let (key, value) = map.into_iter().next().ok_or_else(|| {
                        Error::InvalidProofRequest("empty restriction".to_string())
                    })?;
                    return parse_entry(key, value);
                }
                Ok(Self::And(
                    map.into_iter()
                        .map(|(k, v)| parse_entry(k, v))
                        .collect::<VcxResult<Vec<_>>>()?,
                ))
            }
            // a list of restrictions means any of them
            Value::Array(_) => Ok(Self::Or(parse_list(value, OP_OR)?)),
            _ => Err(Error::InvalidProofRequest(
                "restrictions must be an object or a list".to_string(),
            )),
        }
    }
}

impl From<Query> for Value {
    fn from(query: Query) -> Self {
        let mut map = Map::new();
        match query {
            Query::And(qs) => {
                let tags: BTreeSet<_> = qs.iter().filter_map(Query::leaf_tag).collect();
                if !qs.is_empty() && tags.len() == qs.len() {
                    for q in &qs {
                        if let (Some(tag), Some(v)) = (q.leaf_tag(), q.leaf_value()) {
                            map.insert(tag.to_string(), v);
                        }
                    }
                } else {
                    map.insert(
                        OP_AND.to_string(),
                        Value::Array(qs.into_iter().map(Value::from).collect()),
                    );
                }
            }
            Query::Or(qs) => {
                map.insert(
                    OP_OR.to_string(),
                    Value::Array(qs.into_iter().map(Value::from).collect()),
                );
            }
            Query::Not(q) => {
                map.insert(OP_NOT.to_string(), Value::from(*q));
            }
            leaf => {
                if let (Some(tag), Some(v)) = (leaf.leaf_tag(), leaf.leaf_value()) {
                    map.insert(tag.to_string(), v);
                }
            }
        }
        Value::Object(map)
    }
}

use super::*;
use crate::credential::{attr_marker_tag, attr_value_tag, identifier_tags, normalize_attr_name};
use crate::encoding::is_encoding_of;
use crate::error::Error;
use crate::proof_request::{ProofRequest, Query};
use crate::VcxResult;
use log::{debug, trace};

/// Verifier policy for matching presentations
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchPolicy {
    /// Accept requested attributes that are proven without being revealed
    pub allow_unrevealed: bool,
}

/// Check that `presentation` answers every referent of `request`
/// with the default policy
pub fn match_presentation(request: &ProofRequest, presentation: &Presentation) -> VcxResult<()> {
    match_presentation_with_policy(request, presentation, &MatchPolicy::default())
}

/// Check that `presentation` answers every referent of `request`.
///
/// Errors with [`Error::MissingAttribute`] when a referent is not answered,
/// [`Error::RestrictionViolation`] when the credential behind an answer does
/// not meet the referent's restrictions, and [`Error::InvalidPresentation`]
/// when the presentation is malformed.
pub fn match_presentation_with_policy(
    request: &ProofRequest,
    presentation: &Presentation,
    policy: &MatchPolicy,
) -> VcxResult<()> {
    trace!("match_presentation >>> nonce: {}", request.nonce);
    let proof = &presentation.requested_proof;
    let tags = SubProofTags::collect(request, presentation)?;

    if !policy.allow_unrevealed && !proof.unrevealed_attrs.is_empty() {
        return Err(Error::InvalidPresentation(format!(
            "attributes {:?} are not revealed",
            proof.unrevealed_attrs.keys().collect::<Vec<_>>()
        )));
    }
    for referent in proof.self_attested_attrs.keys() {
        if !request.requested_attributes.contains_key(referent) {
            return Err(Error::InvalidPresentation(format!(
                "'{}' was self attested but not requested",
                referent
            )));
        }
    }
    for (referent, reference) in &proof.unrevealed_attrs {
        if !request.requested_attributes.contains_key(referent) {
            return Err(Error::InvalidPresentation(format!(
                "'{}' was not requested",
                referent
            )));
        }
        tags.check_index(reference.sub_proof_index)?;
    }
    for referent in proof.predicates.keys() {
        if !request.requested_predicates.contains_key(referent) {
            return Err(Error::InvalidPresentation(format!(
                "predicate '{}' was not requested",
                referent
            )));
        }
    }

    for (referent, info) in &request.requested_attributes {
        let index = if info.is_group() {
            match proof.revealed_attr_groups.get(referent) {
                Some(group) => {
                    for name in info.attr_names() {
                        let wanted = normalize_attr_name(name);
                        if !group.values.keys().any(|k| normalize_attr_name(k) == wanted) {
                            return Err(Error::MissingAttribute(format!(
                                "group '{}' does not reveal '{}'",
                                referent, name
                            )));
                        }
                    }
                    Some(group.sub_proof_index)
                }
                None => None,
            }
        } else {
            proof.revealed_attrs.get(referent).map(|a| a.sub_proof_index)
        };
        // a revealed value takes precedence over a self attested one
        let index = match index {
            Some(index) => Some(index),
            None if info.allows_self_attest()
                && proof.self_attested_attrs.contains_key(referent) =>
            {
                debug!("'{}' is self attested", referent);
                None
            }
            None if policy.allow_unrevealed && !info.is_group() => {
                match proof.unrevealed_attrs.get(referent) {
                    Some(r) => Some(r.sub_proof_index),
                    None => return Err(missing(referent)),
                }
            }
            None => return Err(missing(referent)),
        };
        if let Some(index) = index {
            tags.check_restrictions(referent, index, info.restrictions.as_ref())?;
        }
    }

    for (referent, info) in &request.requested_predicates {
        let reference = proof.predicates.get(referent).ok_or_else(|| missing(referent))?;
        tags.check_restrictions(
            referent,
            reference.sub_proof_index,
            info.restrictions.as_ref(),
        )?;
    }
    Ok(())
}

fn missing(referent: &str) -> Error {
    Error::MissingAttribute(format!("'{}' is not answered by the presentation", referent))
}

/// The tags restrictions are evaluated against, one set per sub proof
struct SubProofTags(Vec<BTreeMap<String, String>>);

impl SubProofTags {
    fn collect(request: &ProofRequest, presentation: &Presentation) -> VcxResult<Self> {
        let proof = &presentation.requested_proof;
        let mut tags: Vec<BTreeMap<String, String>> = presentation
            .identifiers
            .iter()
            .map(|i| identifier_tags(&i.schema_id, &i.cred_def_id, i.rev_reg_id.as_deref()))
            .collect();

        for (referent, attr) in &proof.revealed_attrs {
            let name = match request.requested_attributes.get(referent) {
                Some(info) if !info.is_group() => info.name.as_deref().unwrap_or_default(),
                _ => {
                    return Err(Error::InvalidPresentation(format!(
                        "'{}' was revealed but not requested as a single attribute",
                        referent
                    )))
                }
            };
            check_encoding(referent, &attr.raw, &attr.encoded)?;
            let entry = tags
                .get_mut(attr.sub_proof_index as usize)
                .ok_or_else(|| out_of_range(referent, attr.sub_proof_index))?;
            entry.insert(attr_value_tag(name), attr.raw.clone());
            entry.insert(attr_marker_tag(name), "1".to_string());
        }
        for (referent, group) in &proof.revealed_attr_groups {
            match request.requested_attributes.get(referent) {
                Some(info) if info.is_group() => {}
                _ => {
                    return Err(Error::InvalidPresentation(format!(
                        "'{}' was revealed but not requested as a group",
                        referent
                    )))
                }
            }
            let entry = tags
                .get_mut(group.sub_proof_index as usize)
                .ok_or_else(|| out_of_range(referent, group.sub_proof_index))?;
            for (name, value) in &group.values {
                check_encoding(referent, &value.raw, &value.encoded)?;
                entry.insert(attr_value_tag(name), value.raw.clone());
                entry.insert(attr_marker_tag(name), "1".to_string());
            }
        }
        for (referent, reference) in &proof.predicates {
            let entry = tags
                .get_mut(reference.sub_proof_index as usize)
                .ok_or_else(|| out_of_range(referent, reference.sub_proof_index))?;
            if let Some(info) = request.requested_predicates.get(referent) {
                entry.insert(attr_marker_tag(&info.name), "1".to_string());
            }
        }
        Ok(Self(tags))
    }

    fn check_index(&self, index: u32) -> VcxResult<()> {
        if (index as usize) < self.0.len() {
            Ok(())
        } else {
            Err(out_of_range("unrevealed attribute", index))
        }
    }

    fn check_restrictions(
        &self,
        referent: &str,
        index: u32,
        restrictions: Option<&Query>,
    ) -> VcxResult<()> {
        let tags = self
            .0
            .get(index as usize)
            .ok_or_else(|| out_of_range(referent, index))?;
        match restrictions {
            Some(query) if !query.matches(tags) => Err(Error::RestrictionViolation(format!(
                "credential {} does not meet the restrictions of '{}'",
                index, referent
            ))),
            _ => Ok(()),
        }
    }
}

fn check_encoding(referent: &str, raw: &str, encoded: &str) -> VcxResult<()> {
    if is_encoding_of(raw, encoded) {
        Ok(())
    } else {
        Err(Error::InvalidPresentation(format!(
            "encoded value of '{}' does not match its raw value",
            referent
        )))
    }
}

fn out_of_range(referent: &str, index: u32) -> Error {
    Error::InvalidPresentation(format!(
        "'{}' references sub proof {} which does not exist",
        referent, index
    ))
}

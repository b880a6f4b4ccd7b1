use super::*;
use crate::error::Error;
use crate::ledger::Ledger;
use crate::proof_request::ProofRequest;
use crate::proof_system::{ProofSystem, PublicParams};
use crate::revocation_registry::RegistryState;
use crate::VcxResult;
use log::{debug, warn};

/// Verify `presentation` against `request`.
///
/// A presentation that fails a check is a successful verification with an
/// invalid status. Errors are reserved for proofs that cannot be processed.
pub fn verify_presentation(
    request: &ProofRequest,
    presentation: &Presentation,
    registries: &RegistryState,
    params: &PublicParams,
    proof_system: &dyn ProofSystem,
) -> VcxResult<VerificationResult> {
    let reason = check_presentation(request, presentation, registries, params, proof_system)?;
    if let Some(reason) = reason {
        warn!("presentation for '{}' is not valid: {:?}", request.name, reason);
    }
    let result = VerificationResult::new(request, presentation, reason);
    debug!("presentation status: {}", result.status);
    Ok(result)
}

fn check_presentation(
    request: &ProofRequest,
    presentation: &Presentation,
    registries: &RegistryState,
    params: &PublicParams,
    proof_system: &dyn ProofSystem,
) -> VcxResult<Option<InvalidReason>> {
    match match_presentation(request, presentation) {
        Ok(()) => {}
        Err(Error::RestrictionViolation(m)) => {
            debug!("{}", m);
            return Ok(Some(InvalidReason::RestrictionViolation));
        }
        Err(Error::MissingAttribute(m)) | Err(Error::InvalidPresentation(m)) => {
            debug!("{}", m);
            return Ok(Some(InvalidReason::SemanticMismatch));
        }
        Err(e) => return Err(e),
    }
    if let Some(reason) = check_revocation(request, presentation, registries) {
        return Ok(Some(reason));
    }
    if !proof_system.verify_proof(request, presentation, params, registries)? {
        return Ok(Some(InvalidReason::CryptographicFailure));
    }
    Ok(None)
}

// Every referenced status must be at least as recent as the newest status
// published by the end of the request's non-revocation interval.
fn check_revocation(
    request: &ProofRequest,
    presentation: &Presentation,
    registries: &RegistryState,
) -> Option<InvalidReason> {
    let to = request.non_revoked.and_then(|i| i.to);
    for identifier in &presentation.identifiers {
        let rev_reg_id = match &identifier.rev_reg_id {
            Some(id) => id,
            None => continue,
        };
        let history = match registries.registries.get(rev_reg_id) {
            Some(h) => h,
            None => {
                debug!("revocation registry '{}' is not available", rev_reg_id);
                return Some(InvalidReason::RegistryUnavailable);
            }
        };
        let seq_no = match identifier.seq_no {
            Some(seq_no) if registries.status(rev_reg_id, seq_no).is_some() => seq_no,
            _ => {
                debug!("presentation references an unknown status of '{}'", rev_reg_id);
                return Some(InvalidReason::SemanticMismatch);
            }
        };
        let required = history
            .statuses
            .iter()
            .filter(|s| to.map_or(true, |to| s.timestamp <= to))
            .map(|s| s.seq_no)
            .max()
            .unwrap_or(0);
        if seq_no < required {
            debug!(
                "presentation proves status {} of '{}' but {} is required",
                seq_no, rev_reg_id, required
            );
            return Some(InvalidReason::Revoked);
        }
    }
    None
}

/// Resolve the registry histories `presentation` refers to. Registries the
/// ledger does not know are left out.
pub fn resolve_registry_state(
    ledger: &dyn Ledger,
    presentation: &Presentation,
) -> VcxResult<RegistryState> {
    let mut state = RegistryState::default();
    for rev_reg_id in presentation
        .identifiers
        .iter()
        .filter_map(|i| i.rev_reg_id.as_ref())
    {
        if state.contains(rev_reg_id) {
            continue;
        }
        let definition = match ledger.resolve_revocation_registry(rev_reg_id) {
            Ok(d) => d,
            Err(Error::NotFound(m)) => {
                debug!("{}", m);
                continue;
            }
            Err(e) => return Err(e),
        };
        let statuses = ledger.resolve_revocation_statuses(rev_reg_id)?;
        state.insert(definition, statuses);
    }
    Ok(state)
}

//! Resolving user-supplied container references.

use autocompose_core::error::EngineError;
use autocompose_core::types::ContainerSummary;
use tracing::warn;

/// Finds the container a user meant by `requested`.
///
/// Tried in order:
/// 1. exact name (a leading `/` is accepted)
/// 2. id or short-id prefix, e.g. `abc1`
/// 3. a full id that contains the container's short id
pub fn find_container<'a>(
    containers: &'a [ContainerSummary],
    requested: &str,
) -> Result<&'a ContainerSummary, EngineError> {
    let wanted = requested.strip_prefix('/').unwrap_or(requested);
    let not_found = || EngineError::ContainerNotFound(requested.to_owned());
    if wanted.is_empty() {
        return Err(not_found());
    }

    if let Some(found) = containers.iter().find(|c| c.name == wanted) {
        return Ok(found);
    }

    let mut prefixed = containers
        .iter()
        .filter(|c| c.short_id().starts_with(wanted) || c.id.starts_with(wanted));
    if let Some(found) = prefixed.next() {
        if prefixed.next().is_some() {
            warn!(requested = %requested, chosen = %found, "ambiguous id prefix, using first match");
        }
        return Ok(found);
    }

    containers
        .iter()
        .find(|c| !c.short_id().is_empty() && wanted.contains(c.short_id()))
        .ok_or_else(not_found)
}

//! Profile provisioning — every worker gets exactly one profile.
//!
//! Sign-up calls [`provision_profile`] directly after persisting the
//! worker, and worker-mutating handlers call [`sync_profile`]
//! afterwards. Both are idempotent, so a worker can never end up with a
//! missing or duplicated profile regardless of call order.

use tracing::info;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::store::Database;
use crate::workers::model::Profile;

/// Ensure the worker has a profile, creating a default one if needed.
///
/// Returns the existing profile untouched when one is already present,
/// so pending edits to it are never clobbered.
pub async fn provision_profile(
    db: &dyn Database,
    worker_id: Uuid,
) -> Result<Profile, DatabaseError> {
    if let Some(existing) = db.get_profile_by_worker(worker_id).await? {
        return Ok(existing);
    }

    let profile = Profile::new_default(worker_id);
    db.insert_profile(&profile).await?;
    info!(worker_id = %worker_id, profile_id = %profile.id, "Profile provisioned");
    Ok(profile)
}

/// Re-assert the worker's profile after a worker save.
///
/// Provisions a default profile when none exists yet; otherwise
/// re-persists the stored profile. Safe to call in any order relative
/// to the worker save itself.
pub async fn sync_profile(db: &dyn Database, worker_id: Uuid) -> Result<Profile, DatabaseError> {
    let profile = provision_profile(db, worker_id).await?;
    db.update_profile(&profile).await?;
    Ok(profile)
}

//! Get Transient Use Case
//!
//! Cache-first lookup of one transient, falling back to the registry.

use crate::application::record_fetch;
use crate::domain::entities::Transient;
use crate::domain::repository::{QueryLogRepository, TransientRegistry, TransientRepository};
use crate::domain::value_objects::verify_transient_name;
use crate::error::TransientResult;
use std::sync::Arc;

/// Get Transient Use Case
pub struct GetTransientUseCase<R, G>
where
    R: TransientRepository + QueryLogRepository,
    G: TransientRegistry,
{
    repo: Arc<R>,
    registry: Arc<G>,
}

impl<R, G> GetTransientUseCase<R, G>
where
    R: TransientRepository + QueryLogRepository,
    G: TransientRegistry,
{
    pub fn new(repo: Arc<R>, registry: Arc<G>) -> Self {
        Self { repo, registry }
    }

    /// Return the stored transient, or fetch and store it.
    ///
    /// With `force_tns` the store is bypassed and the stored row refreshed.
    pub async fn execute(&self, name: &str, force_tns: bool) -> TransientResult<Transient> {
        let name = verify_transient_name(name)?;

        if !force_tns {
            if let Some(transient) = self.repo.lookup_by_name(&name).await? {
                tracing::debug!(name = %name, "Transient served from store");
                return Ok(transient);
            }
        }

        let fetch = self.registry.fetch_transient(&name).await;
        let transient = record_fetch(self.repo.as_ref(), fetch).await?;
        let stored = self.repo.save(&transient).await?;

        tracing::info!(name = %stored.name, force_tns, "Transient fetched from registry");
        Ok(stored)
    }
}

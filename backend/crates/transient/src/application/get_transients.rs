//! Get Transients Use Case
//!
//! Batch lookup: serve what is stored, fetch only the missing names.

use crate::application::record_fetch;
use crate::domain::entities::Transient;
use crate::domain::repository::{QueryLogRepository, TransientRegistry, TransientRepository};
use crate::domain::value_objects::{Pagination, verify_transient_name};
use crate::error::TransientResult;
use std::collections::HashSet;
use std::sync::Arc;

/// Get Transients Use Case
pub struct GetTransientsUseCase<R, G>
where
    R: TransientRepository + QueryLogRepository,
    G: TransientRegistry,
{
    repo: Arc<R>,
    registry: Arc<G>,
}

impl<R, G> GetTransientsUseCase<R, G>
where
    R: TransientRepository + QueryLogRepository,
    G: TransientRegistry,
{
    pub fn new(repo: Arc<R>, registry: Arc<G>) -> Self {
        Self { repo, registry }
    }

    /// Stored transients first, then the freshly fetched ones.
    ///
    /// Any malformed name fails the whole request before touching the store.
    pub async fn execute(
        &self,
        names: &[String],
        page: Pagination,
    ) -> TransientResult<Vec<Transient>> {
        let names = normalize_names(names)?;
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut transients = self.repo.lookup_many(&names, page).await?;

        let missing: Vec<String> = {
            let stored: HashSet<&str> = transients.iter().map(|t| t.name.as_str()).collect();
            names
                .into_iter()
                .filter(|name| !stored.contains(name.as_str()))
                .collect()
        };

        if missing.is_empty() {
            return Ok(transients);
        }

        tracing::info!(
            stored = transients.len(),
            missing = missing.len(),
            "Fetching missing transients from registry"
        );

        let fetch = self.registry.fetch_transients(&missing).await;
        let fetched = record_fetch(self.repo.as_ref(), fetch).await?;
        let saved = self.repo.save_many(&fetched).await?;

        transients.extend(saved);
        Ok(transients)
    }
}

/// Normalize every name, dropping duplicates while keeping input order
fn normalize_names(names: &[String]) -> TransientResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut clean = Vec::with_capacity(names.len());
    for name in names {
        let name = verify_transient_name(name)?;
        if seen.insert(name.clone()) {
            clean.push(name);
        }
    }
    Ok(clean)
}

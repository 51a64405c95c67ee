//! Update Transient Use Case
//!
//! Manual corrections of stored transients. The registry is never queried.

use crate::domain::entities::Transient;
use crate::domain::repository::TransientRepository;
use crate::domain::value_objects::verify_transient_name;
use crate::error::{TransientError, TransientResult};
use std::sync::Arc;

/// Update Transient Use Case
pub struct UpdateTransientUseCase<R>
where
    R: TransientRepository,
{
    repo: Arc<R>,
}

impl<R> UpdateTransientUseCase<R>
where
    R: TransientRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn set_redshift(&self, name: &str, redshift: f64) -> TransientResult<Transient> {
        let name = verify_transient_name(name)?;
        let redshift = finite("redshift", redshift)?;

        let updated = self.repo.update_redshift(&name, redshift).await?;
        let transient = updated.ok_or(TransientError::NotFound(name))?;

        tracing::info!(name = %transient.name, redshift, "Redshift updated");
        Ok(transient)
    }

    pub async fn set_ebv(&self, name: &str, ebv: f64) -> TransientResult<Transient> {
        let name = verify_transient_name(name)?;
        let ebv = finite("ebv", ebv)?;

        let updated = self.repo.update_ebv(&name, ebv).await?;
        let transient = updated.ok_or(TransientError::NotFound(name))?;

        tracing::info!(name = %transient.name, ebv, "E(B-V) updated");
        Ok(transient)
    }

    /// Remove a stored transient so the next lookup refetches it
    pub async fn delete(&self, name: &str) -> TransientResult<()> {
        let name = verify_transient_name(name)?;
        if !self.repo.delete(&name).await? {
            return Err(TransientError::NotFound(name));
        }

        tracing::info!(name = %name, "Transient deleted");
        Ok(())
    }
}

fn finite(field: &str, value: f64) -> TransientResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TransientError::InvalidParameter(format!(
            "{field} must be a finite number"
        )))
    }
}

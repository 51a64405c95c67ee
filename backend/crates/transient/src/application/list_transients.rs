//! List Transients Use Case

use crate::domain::entities::Transient;
use crate::domain::repository::TransientRepository;
use crate::domain::value_objects::Pagination;
use crate::error::TransientResult;
use std::sync::Arc;

/// Window over every stored transient
pub struct ListTransientsUseCase<R>
where
    R: TransientRepository,
{
    repo: Arc<R>,
}

impl<R> ListTransientsUseCase<R>
where
    R: TransientRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, page: Pagination) -> TransientResult<Vec<Transient>> {
        self.repo.list(page).await
    }
}

//! Query Logs Use Case

use crate::domain::entities::StoredQueryLog;
use crate::domain::repository::QueryLogRepository;
use crate::domain::value_objects::QueryLogFilter;
use crate::error::TransientResult;
use std::sync::Arc;

/// List recorded upstream attempts
pub struct ListQueryLogsUseCase<L>
where
    L: QueryLogRepository,
{
    repo: Arc<L>,
}

impl<L> ListQueryLogsUseCase<L>
where
    L: QueryLogRepository,
{
    pub fn new(repo: Arc<L>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, filter: &QueryLogFilter) -> TransientResult<Vec<StoredQueryLog>> {
        self.repo.list_logs(filter).await
    }
}

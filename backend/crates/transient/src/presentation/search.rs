//! HTML Search Page
//!
//! `GET /search` renders transients as a plain table. The `name` field
//! decides the lookup: empty lists the stored window, one name is a single
//! lookup, several comma-separated names are a batch lookup.

use crate::application::get_transient::GetTransientUseCase;
use crate::application::get_transients::GetTransientsUseCase;
use crate::application::list_transients::ListTransientsUseCase;
use crate::domain::entities::Transient;
use crate::domain::repository::{QueryLogRepository, TransientRegistry, TransientRepository};
use crate::domain::value_objects::{Pagination, parse_name_list};
use crate::error::{TransientError, TransientResult};
use crate::presentation::dto::{SearchQuery, TransientResponse};
use crate::presentation::handlers::TransientAppState;
use axum::extract::{Query, State};
use axum::response::Html;
use minijinja::{Environment, context};

const SEARCH_TEMPLATE: &str = include_str!("../../templates/search.html");

/// GET /search
pub async fn search<R, G>(
    State(state): State<TransientAppState<R, G>>,
    Query(query): Query<SearchQuery>,
) -> TransientResult<Html<String>>
where
    R: TransientRepository + QueryLogRepository + Send + Sync + 'static,
    G: TransientRegistry + Send + Sync + 'static,
{
    if !query.subtype.trim().is_empty() {
        tracing::warn!(subtype = %query.subtype, "Subtype search requested");
        return Err(TransientError::InvalidParameter(format!(
            "Supernova with name {} not found. Other queries are not implemented yet.",
            query.name
        )));
    }

    let page = Pagination::new(query.limit, query.offset)?;
    let names = parse_name_list(&query.name);

    let transients: Vec<Transient> = match names.as_slice() {
        [] => {
            ListTransientsUseCase::new(state.repo.clone())
                .execute(page)
                .await?
        }
        [name] => {
            let use_case = GetTransientUseCase::new(state.repo.clone(), state.registry.clone());
            vec![use_case.execute(name, false).await?]
        }
        _ => {
            GetTransientsUseCase::new(state.repo.clone(), state.registry.clone())
                .execute(&names, page)
                .await?
        }
    };

    render_table(&query.name, transients).map(Html)
}

/// Render the search form and result table
pub fn render_table(search: &str, transients: Vec<Transient>) -> TransientResult<String> {
    let mut env = Environment::new();
    env.add_template("search.html", SEARCH_TEMPLATE)?;

    let items: Vec<TransientResponse> =
        transients.into_iter().map(TransientResponse::from).collect();
    let html = env.get_template("search.html")?.render(context! {
        search => search,
        items => items,
    })?;
    Ok(html)
}

//! Cross-layer tests for the transient crate
//! Use cases and HTTP handlers run against an in-memory store and a stub registry

#[cfg(test)]
mod fakes {
    use crate::domain::entities::{QueryLogEntry, StoredQueryLog, Transient};
    use crate::domain::repository::{
        QueryLogRepository, RegistryFetch, TransientRegistry, TransientRepository,
    };
    use crate::domain::value_objects::{Pagination, QueryLogFilter};
    use crate::error::{TransientError, TransientResult};
    use chrono::Utc;
    use platform::rate_limit::RateLimitSnapshot;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn window<T: Clone>(items: &[T], page: Pagination) -> Vec<T> {
        items
            .iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect()
    }

    #[derive(Default)]
    pub struct InMemoryRepository {
        pub transients: Mutex<Vec<Transient>>,
        pub logs: Mutex<Vec<StoredQueryLog>>,
        pub reject_logs: AtomicBool,
    }

    impl InMemoryRepository {
        pub fn with(transients: Vec<Transient>) -> Self {
            Self {
                transients: Mutex::new(transients),
                logs: Mutex::new(Vec::new()),
                reject_logs: AtomicBool::new(false),
            }
        }

        /// Log writes fail; transient writes still succeed
        pub fn rejecting_logs() -> Self {
            let repo = Self::default();
            repo.reject_logs.store(true, Ordering::SeqCst);
            repo
        }

        pub fn stored(&self, name: &str) -> Option<Transient> {
            self.transients
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.name == name)
                .cloned()
        }

        pub fn log_count(&self) -> usize {
            self.logs.lock().unwrap().len()
        }

        fn upsert(&self, transient: &Transient) -> Transient {
            let mut transients = self.transients.lock().unwrap();
            match transients.iter_mut().find(|t| t.name == transient.name) {
                Some(existing) => {
                    existing.redshift = transient.redshift;
                    existing.ra = transient.ra;
                    existing.dec = transient.dec;
                    existing.clone()
                }
                None => {
                    transients.push(transient.clone());
                    transient.clone()
                }
            }
        }

        fn update(&self, name: &str, apply: impl FnOnce(&mut Transient)) -> Option<Transient> {
            let mut transients = self.transients.lock().unwrap();
            transients.iter_mut().find(|t| t.name == name).map(|t| {
                apply(t);
                t.clone()
            })
        }
    }

    impl TransientRepository for InMemoryRepository {
        async fn lookup_by_name(&self, name: &str) -> TransientResult<Option<Transient>> {
            Ok(self.stored(name))
        }

        async fn lookup_many(
            &self,
            names: &[String],
            page: Pagination,
        ) -> TransientResult<Vec<Transient>> {
            let mut found: Vec<Transient> = self
                .transients
                .lock()
                .unwrap()
                .iter()
                .filter(|t| names.contains(&t.name))
                .cloned()
                .collect();
            found.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(window(&found, page))
        }

        async fn list(&self, page: Pagination) -> TransientResult<Vec<Transient>> {
            Ok(window(&self.transients.lock().unwrap(), page))
        }

        async fn save(&self, transient: &Transient) -> TransientResult<Transient> {
            Ok(self.upsert(transient))
        }

        async fn save_many(&self, transients: &[Transient]) -> TransientResult<Vec<Transient>> {
            Ok(transients.iter().map(|t| self.upsert(t)).collect())
        }

        async fn update_redshift(
            &self,
            name: &str,
            redshift: f64,
        ) -> TransientResult<Option<Transient>> {
            Ok(self.update(name, |t| t.redshift = redshift))
        }

        async fn update_ebv(&self, name: &str, ebv: f64) -> TransientResult<Option<Transient>> {
            Ok(self.update(name, |t| t.ebv = ebv))
        }

        async fn delete(&self, name: &str) -> TransientResult<bool> {
            let mut transients = self.transients.lock().unwrap();
            let before = transients.len();
            transients.retain(|t| t.name != name);
            Ok(transients.len() < before)
        }
    }

    impl QueryLogRepository for InMemoryRepository {
        async fn append_logs(&self, entries: &[QueryLogEntry]) -> TransientResult<()> {
            if self.reject_logs.load(Ordering::SeqCst) {
                return Err(TransientError::Internal("log table unavailable".into()));
            }
            let mut logs = self.logs.lock().unwrap();
            for entry in entries {
                let id = logs.len() as i64 + 1;
                logs.push(StoredQueryLog {
                    id,
                    entry: entry.clone(),
                    created_at: Utc::now(),
                });
            }
            Ok(())
        }

        async fn list_logs(
            &self,
            filter: &QueryLogFilter,
        ) -> TransientResult<Vec<StoredQueryLog>> {
            let logs: Vec<StoredQueryLog> = self
                .logs
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|log| filter.id.is_none_or(|id| log.id == id))
                .filter(|log| filter.code.is_none_or(|code| log.entry.code == code))
                .filter(|log| filter.name.as_ref().is_none_or(|name| &log.entry.name == name))
                .cloned()
                .collect();
            Ok(window(&logs, filter.page))
        }
    }

    /// Registry answering from a fixed catalogue, one log entry per name
    #[derive(Default)]
    pub struct StubRegistry {
        pub catalogue: HashMap<String, Transient>,
        pub rate_limited: bool,
        pub calls: AtomicUsize,
    }

    impl StubRegistry {
        pub fn with(transients: Vec<Transient>) -> Self {
            Self {
                catalogue: transients.into_iter().map(|t| (t.name.clone(), t)).collect(),
                ..Default::default()
            }
        }

        pub fn rate_limited() -> Self {
            Self {
                rate_limited: true,
                ..Default::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn lookup(&self, name: &str, logs: &mut Vec<QueryLogEntry>) -> TransientResult<Transient> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            logs.push(QueryLogEntry {
                name: name.to_string(),
                query: format!("POST /object {name}"),
                response: "OK".to_string(),
                code: 200,
            });

            if self.rate_limited {
                return Err(TransientError::UpstreamTimeout {
                    name: name.to_string(),
                    attempts: 3,
                });
            }
            self.catalogue
                .get(name)
                .cloned()
                .ok_or_else(|| TransientError::NotFound(name.to_string()))
        }
    }

    impl TransientRegistry for StubRegistry {
        async fn fetch_transient(&self, name: &str) -> RegistryFetch<Transient> {
            let mut logs = Vec::new();
            let result = self.lookup(name, &mut logs);
            RegistryFetch { result, logs }
        }

        async fn fetch_transients(&self, names: &[String]) -> RegistryFetch<Vec<Transient>> {
            let mut logs = Vec::new();
            let result = names
                .iter()
                .map(|name| self.lookup(name, &mut logs))
                .collect::<TransientResult<Vec<_>>>();
            RegistryFetch { result, logs }
        }

        fn rate_limit_snapshot(&self) -> RateLimitSnapshot {
            RateLimitSnapshot {
                current: 0,
                total: 12,
                max: 5,
                triggered: 3,
            }
        }
    }

    pub fn sn2022g() -> Transient {
        Transient::new("2022G", 0.024, 150.125, -12.5, 0.0)
    }

    pub fn sn2020abc() -> Transient {
        Transient::new("2020abc", 0.05, 10.5, -3.25, 0.1)
    }
}

#[cfg(test)]
mod use_case_tests {
    use super::fakes::*;
    use crate::application::get_transient::GetTransientUseCase;
    use crate::application::get_transients::GetTransientsUseCase;
    use crate::application::update_transient::UpdateTransientUseCase;
    use crate::domain::value_objects::Pagination;
    use crate::error::TransientError;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_stored_transient_skips_registry() {
        let repo = Arc::new(InMemoryRepository::with(vec![sn2022g()]));
        let registry = Arc::new(StubRegistry::default());
        let use_case = GetTransientUseCase::new(repo.clone(), registry.clone());

        let transient = use_case.execute("SN2022G", false).await.unwrap();

        assert_eq!(transient, sn2022g());
        assert_eq!(registry.calls(), 0);
        assert_eq!(repo.log_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_transient_is_fetched_and_stored() {
        let repo = Arc::new(InMemoryRepository::default());
        let registry = Arc::new(StubRegistry::with(vec![sn2022g()]));
        let use_case = GetTransientUseCase::new(repo.clone(), registry.clone());

        let transient = use_case.execute("at2022G", false).await.unwrap();

        assert_eq!(transient, sn2022g());
        assert_eq!(registry.calls(), 1);
        assert_eq!(repo.stored("2022G"), Some(sn2022g()));
        assert_eq!(repo.log_count(), 1);
    }

    #[tokio::test]
    async fn test_force_tns_refreshes_but_keeps_ebv() {
        let mut stale = sn2022g();
        stale.redshift = 0.5;
        stale.ebv = 0.07;
        let repo = Arc::new(InMemoryRepository::with(vec![stale]));
        let registry = Arc::new(StubRegistry::with(vec![sn2022g()]));
        let use_case = GetTransientUseCase::new(repo.clone(), registry.clone());

        let transient = use_case.execute("2022G", true).await.unwrap();

        assert_eq!(registry.calls(), 1);
        assert_eq!(transient.redshift, 0.024);
        assert_eq!(transient.ebv, 0.07);
    }

    #[tokio::test]
    async fn test_malformed_name_never_reaches_registry() {
        let repo = Arc::new(InMemoryRepository::default());
        let registry = Arc::new(StubRegistry::with(vec![sn2022g()]));
        let use_case = GetTransientUseCase::new(repo, registry.clone());

        let err = use_case.execute("XY", false).await.unwrap_err();

        assert!(matches!(err, TransientError::MalformedName(_)));
        assert_eq!(registry.calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_still_records_attempts() {
        let repo = Arc::new(InMemoryRepository::default());
        let registry = Arc::new(StubRegistry::default());
        let use_case = GetTransientUseCase::new(repo.clone(), registry);

        let err = use_case.execute("2020XX", false).await.unwrap_err();

        assert!(matches!(err, TransientError::NotFound(_)));
        assert_eq!(repo.log_count(), 1);
        assert!(repo.stored("2020XX").is_none());
    }

    #[tokio::test]
    async fn test_log_write_failure_still_stores_fetched_transient() {
        let repo = Arc::new(InMemoryRepository::rejecting_logs());
        let registry = Arc::new(StubRegistry::with(vec![sn2022g()]));
        let use_case = GetTransientUseCase::new(repo.clone(), registry.clone());

        let transient = use_case.execute("2022G", false).await.unwrap();

        assert_eq!(transient, sn2022g());
        assert_eq!(repo.stored("2022G"), Some(sn2022g()));
        assert_eq!(repo.log_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_fetches_only_missing_names() {
        let repo = Arc::new(InMemoryRepository::with(vec![sn2022g()]));
        let registry = Arc::new(StubRegistry::with(vec![sn2020abc()]));
        let use_case = GetTransientsUseCase::new(repo.clone(), registry.clone());

        let names = vec!["SN2022G".to_string(), "2020abc".to_string(), "2022G".to_string()];
        let transients = use_case.execute(&names, Pagination::default()).await.unwrap();

        assert_eq!(transients, vec![sn2022g(), sn2020abc()]);
        assert_eq!(registry.calls(), 1);
        assert_eq!(repo.stored("2020abc"), Some(sn2020abc()));
    }

    #[tokio::test]
    async fn test_batch_with_unknown_name_stores_nothing() {
        let repo = Arc::new(InMemoryRepository::default());
        let registry = Arc::new(StubRegistry::with(vec![sn2022g()]));
        let use_case = GetTransientsUseCase::new(repo.clone(), registry);

        let names = vec!["2022G".to_string(), "2020XX".to_string()];
        let err = use_case
            .execute(&names, Pagination::default())
            .await
            .unwrap_err();

        assert!(matches!(err, TransientError::NotFound(name) if name == "2020XX"));
        assert!(repo.stored("2022G").is_none());
        assert_eq!(repo.log_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_is_empty() {
        let repo = Arc::new(InMemoryRepository::with(vec![sn2022g()]));
        let registry = Arc::new(StubRegistry::default());
        let use_case = GetTransientsUseCase::new(repo, registry.clone());

        assert!(use_case.execute(&[], Pagination::default()).await.unwrap().is_empty());
        assert_eq!(registry.calls(), 0);
    }

    #[tokio::test]
    async fn test_updates_and_delete() {
        let repo = Arc::new(InMemoryRepository::with(vec![sn2022g()]));
        let use_case = UpdateTransientUseCase::new(repo.clone());

        assert_eq!(use_case.set_redshift("SN2022G", 0.03).await.unwrap().redshift, 0.03);
        assert_eq!(use_case.set_ebv("2022G", 0.2).await.unwrap().ebv, 0.2);
        assert!(matches!(
            use_case.set_ebv("2022G", f64::NAN).await,
            Err(TransientError::InvalidParameter(_))
        ));
        assert!(matches!(
            use_case.set_redshift("2020XX", 0.1).await,
            Err(TransientError::NotFound(_))
        ));

        use_case.delete("2022G").await.unwrap();
        assert!(repo.stored("2022G").is_none());
        assert!(matches!(
            use_case.delete("2022G").await,
            Err(TransientError::NotFound(_))
        ));
    }
}

#[cfg(test)]
mod http_tests {
    use super::fakes::*;
    use crate::application::config::ApiConfig;
    use crate::presentation::dto::{RateLimitResponse, TransientResponse};
    use crate::presentation::router::transient_router_generic;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    const KEY: &str = "test-api-key";

    fn app(repo: InMemoryRepository, registry: StubRegistry) -> Router {
        transient_router_generic(repo, registry, ApiConfig::new(KEY))
    }

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("api_key", KEY)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_health_is_open() {
        let response = app(InMemoryRepository::default(), StubRegistry::default())
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_or_wrong_key_is_forbidden() {
        let app = app(InMemoryRepository::with(vec![sn2022g()]), StubRegistry::default());

        let response = app
            .clone()
            .oneshot(Request::get("/api/transient/2022G").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["detail"], "Could not validate API KEY.");

        let response = app
            .oneshot(
                Request::get("/api/transient/2022G")
                    .header("api_key", "wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_key_accepted_from_query_string() {
        let response = app(InMemoryRepository::with(vec![sn2022g()]), StubRegistry::default())
            .oneshot(
                Request::get(format!("/api/transient/SN2022G?api_key={KEY}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: TransientResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body.name, "2022G");
        assert_eq!(body.ra, 150.125);
    }

    #[tokio::test]
    async fn test_malformed_name_is_not_found() {
        let response = app(InMemoryRepository::default(), StubRegistry::default())
            .oneshot(request(Method::GET, "/api/transient/XY"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rate_limited_upstream_is_request_timeout() {
        let response = app(InMemoryRepository::default(), StubRegistry::rate_limited())
            .oneshot(request(Method::GET, "/api/transient/2022G?force_tns=true"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["status"], 408);
        assert!(body["action"].is_string());
    }

    #[tokio::test]
    async fn test_batch_endpoint() {
        let response = app(
            InMemoryRepository::with(vec![sn2022g()]),
            StubRegistry::with(vec![sn2020abc()]),
        )
        .oneshot(request(Method::GET, "/api/transients?names=SN2022G,%202020abc&limit=5"))
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: Vec<TransientResponse> =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        let names: Vec<&str> = body.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["2022G", "2020abc"]);
    }

    #[tokio::test]
    async fn test_window_rejects_bad_limit() {
        let response = app(InMemoryRepository::default(), StubRegistry::default())
            .oneshot(request(Method::GET, "/api/transients/all?limit=0"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_patch_and_delete() {
        let app = app(InMemoryRepository::with(vec![sn2022g()]), StubRegistry::default());

        let response = app
            .clone()
            .oneshot(request(Method::PATCH, "/api/transient/2022G/redshift?redshift=0.031"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: TransientResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body.redshift, 0.031);

        let response = app
            .clone()
            .oneshot(request(Method::PATCH, "/api/transient/2020XX/ebv?ebv=0.1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(request(Method::DELETE, "/api/transient/2022G"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_rate_limit_snapshot_is_open() {
        let response = app(InMemoryRepository::default(), StubRegistry::default())
            .oneshot(Request::get("/api/monitoring/tns").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: RateLimitResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(
            body,
            RateLimitResponse {
                current: 0,
                total: 12,
                max: 5,
                triggered: 3
            }
        );
    }

    #[tokio::test]
    async fn test_query_logs_listing() {
        let app = app(InMemoryRepository::default(), StubRegistry::with(vec![sn2022g()]));

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/transient/2022G"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(request(Method::GET, "/api/monitoring/logs?name=2022G&code=200"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["name"], "2022G");
        assert_eq!(body[0]["code"], 200);
    }

    #[tokio::test]
    async fn test_search_page_modes() {
        let app = app(
            InMemoryRepository::with(vec![sn2022g()]),
            StubRegistry::with(vec![sn2020abc()]),
        );

        let response = app
            .clone()
            .oneshot(Request::get("/search").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("<td>2022G</td>"));

        let response = app
            .clone()
            .oneshot(Request::get("/search?name=2022G,2020abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("<td>2022G</td>"));
        assert!(html.contains("<td>2020abc</td>"));

        let response = app
            .oneshot(
                Request::get("/search?name=2022G&subtype=Ia")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

//! Router-backed test application
//!
//! Each [`TestApp`] owns a temporary SQLite file with the schema applied and
//! drives the real router through `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mlr_api::{build_router, AppState};
use mlr_common::config::ServiceConfig;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    _dir: TempDir,
    router: Router,
}

pub async fn test_app() -> TestApp {
    test_app_with(|_| {}).await
}

pub async fn test_app_with(configure: impl FnOnce(&mut ServiceConfig)) -> TestApp {
    let dir = TempDir::new().unwrap();
    let mut config = ServiceConfig::default();
    config.database.path = dir.path().join("mlr.db");
    configure(&mut config);

    let gateway = mlr_common::db::open(&config.database).await.unwrap();
    let router = build_router(AppState::new(gateway, config));
    TestApp { _dir: dir, router }
}

impl TestApp {
    /// Send a request; the body is decoded as JSON (`Null` when empty,
    /// a JSON string when not JSON)
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    pub async fn send_raw(&self, method: Method, uri: &str, raw: &'static str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(raw))
            .unwrap();
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    /// Create a record label and return its id
    pub async fn create_label(&self, name: &str) -> i64 {
        let (status, body) = self
            .post(
                "/api/record_labels",
                json!({"Name": name, "Email": "office@example.com", "Location": "Lisbon"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "label create failed: {body}");
        body["RecordLabelID"].as_i64().unwrap()
    }

    /// Create a contributor and return its id
    pub async fn create_contributor(&self, nif: &str, name: &str, roles: &str) -> i64 {
        let (status, body) = self
            .post(
                "/api/contributors",
                json!({"NIF": nif, "Name": name, "Roles": roles}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "contributor create failed: {body}");
        body["ContributorID"].as_i64().unwrap()
    }
}

/// Employee body for the given person and label
pub fn employee_body(nif: &str, name: &str, record_label_id: i64) -> Value {
    json!({
        "NIF": nif,
        "Name": name,
        "JobTitle": "Producer",
        "Salary": 3000,
        "HireDate": "2024-01-01",
        "RecordLabelID": record_label_id
    })
}

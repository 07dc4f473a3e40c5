#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use questgen::{
    app::build_app,
    auth::{memory::MemoryUserStore, repo::UserStore},
    config::AppConfig,
    notifier::LogNotifier,
    state::AppState,
};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<MemoryUserStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryUserStore::new());
        let state = AppState::from_parts(AppConfig::for_tests(), store.clone(), Arc::new(LogNotifier));
        Self::with_state(state, store)
    }

    pub fn with_state(state: AppState, store: Arc<MemoryUserStore>) -> Self {
        Self {
            app: build_app(state.clone()),
            state,
            store,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    pub async fn get(&self, path: &str, bearer: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(token) = bearer {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let (status, text) = self.post(path, body).await;
        (status, serde_json::from_str(&text).unwrap())
    }

    /// Reset token currently stored on the record.
    pub async fn stored_reset_token(&self, email: &str) -> Option<String> {
        self.store
            .find_by_email(email)
            .await
            .unwrap()
            .and_then(|u| u.password_reset_token)
    }
}

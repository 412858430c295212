//! Shared fixtures for router and service tests.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt;

use crate::analysis::TextGenerator;
use crate::app::build_app;
use crate::errors::TransportError;
use crate::state::AppState;
use crate::store::{DocumentStore, MemoryDocumentStore, StoreError};

pub const PASSWORD: &str = "password123";

enum Script {
    Reply(String),
    Fail(u16),
}

/// A [`TextGenerator`] that answers every prompt the same way and records
/// what it was asked.
pub struct ScriptedModel {
    script: Script,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            script: Script::Reply(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            script: Script::Fail(status),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String, TransportError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.script {
            Script::Reply(reply) => Ok(reply.clone()),
            Script::Fail(status) => Err(TransportError::Status {
                service: "scripted",
                status: *status,
            }),
        }
    }
}

fn unavailable() -> StoreError {
    StoreError::Transport(TransportError::Status {
        service: "documents",
        status: 503,
    })
}

/// An in-memory [`DocumentStore`] that can be told to fail reads, or the
/// next few writes, with a transport error.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryDocumentStore,
    failing_sets: AtomicUsize,
    failing_gets: AtomicBool,
}

impl FlakyStore {
    pub fn failing_sets(count: usize) -> Self {
        Self {
            failing_sets: AtomicUsize::new(count),
            ..Self::default()
        }
    }

    pub fn failing_gets() -> Self {
        Self {
            failing_gets: AtomicBool::new(true),
            ..Self::default()
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        if self.failing_gets.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.get(collection, key).await
    }

    async fn set(&self, collection: &str, key: &str, doc: Value) -> Result<(), StoreError> {
        let failing = self
            .failing_sets
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(unavailable());
        }
        self.inner.set(collection, key, doc).await
    }

    async fn update(&self, collection: &str, key: &str, partial: Value) -> Result<(), StoreError> {
        self.inner.update(collection, key, partial).await
    }

    async fn exists(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        self.inner.exists(collection, key).await
    }
}

pub fn test_app_with_store(docs: impl DocumentStore + 'static) -> Router {
    build_app(AppState::fake_with(
        Arc::new(ScriptedModel::replying("{}")),
        Arc::new(docs),
    ))
}

pub fn test_app_with_model(model: ScriptedModel) -> Router {
    build_app(AppState::fake(Arc::new(model)))
}

pub fn test_app() -> Router {
    test_app_with_model(ScriptedModel::replying("{}"))
}

pub async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();

    app.clone().oneshot(req).await.unwrap()
}

pub async fn body_json<T: DeserializeOwned>(res: Response) -> T {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A fresh app with one registered user, plus that user's access token.
pub async fn signed_up_with_model(email: &str, model: ScriptedModel) -> (Router, String) {
    let app = test_app_with_model(model);
    let res = call(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(serde_json::json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert!(res.status().is_success(), "register failed: {}", res.status());
    let body: Value = body_json(res).await;
    let token = body["access_token"].as_str().unwrap().to_string();
    (app, token)
}

pub async fn signed_up(email: &str) -> (Router, String) {
    signed_up_with_model(email, ScriptedModel::replying("{}")).await
}

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;

use server::routes;
use server::selector::{MoveChoice, MoveQuery, MoveSelector, SelectorError};
use server::state::AppState;

/// Selector that answers with scripted UCI replies, in order.
pub struct ScriptedSelector {
    replies: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedSelector {
    pub fn new<I>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = &'static str>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(String::from).collect()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MoveSelector for ScriptedSelector {
    async fn select_move(&self, _query: &MoveQuery) -> Result<MoveChoice, SelectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let uci = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted selector ran out of replies");
        Ok(MoveChoice {
            uci,
            reasoning: None,
        })
    }
}

/// Selector that always fails, as if the external service were unreachable.
pub struct FailingSelector;

#[async_trait]
impl MoveSelector for FailingSelector {
    async fn select_move(&self, _query: &MoveQuery) -> Result<MoveChoice, SelectorError> {
        Err(SelectorError::Http("connection refused".to_string()))
    }
}

/// Build the API router around a fresh game and the given selector.
pub fn app(selector: Arc<dyn MoveSelector>) -> Router {
    routes::build_router(AppState::new(selector, "test-model".to_string()))
}

pub fn get(path: &str) -> Request<Body> {
    Request::get(path).body(Body::empty()).unwrap()
}

pub fn post_json(path: &str, body: &str) -> Request<Body> {
    Request::post(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#![allow(dead_code)]

use async_trait::async_trait;
use genesis_client::client::{ApiError, Body, Transport};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

struct Route {
    reply: Result<Body, ApiError>,
    delay: Option<Duration>,
}

/// Serves canned replies per path and records every request.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(&self, path: &str, value: Value) -> &Self {
        self.route(path, Ok(Body::Json(value)), None)
    }

    pub fn json_after(&self, path: &str, value: Value, delay: Duration) -> &Self {
        self.route(path, Ok(Body::Json(value)), Some(delay))
    }

    pub fn body(&self, path: &str, body: Body) -> &Self {
        self.route(path, Ok(body), None)
    }

    pub fn fail(&self, path: &str, err: ApiError) -> &Self {
        self.route(path, Err(err), None)
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    fn route(&self, path: &str, reply: Result<Body, ApiError>, delay: Option<Duration>) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), Route { reply, delay });
        self
    }

    async fn serve(&self, method: &'static str, path: &str, body: Option<Value>) -> Result<Body, ApiError> {
        self.requests.lock().unwrap().push(Request {
            method,
            path: path.to_string(),
            body,
        });

        let (reply, delay) = {
            let routes = self.routes.lock().unwrap();
            match routes.get(path) {
                Some(route) => (route.reply.clone(), route.delay),
                None => (
                    Err(ApiError::Status {
                        status: 404,
                        message: format!("no route for {path}"),
                    }),
                    None,
                ),
            }
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str) -> Result<Body, ApiError> {
        self.serve("GET", path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Body, ApiError> {
        self.serve("POST", path, Some(body)).await
    }

    async fn put(&self, path: &str) -> Result<Body, ApiError> {
        self.serve("PUT", path, None).await
    }
}

/// Routes every endpoint `retrieve_all` touches with plausible data.
pub fn catalog_server() -> MockTransport {
    let mock = MockTransport::new();
    mock.json("/snippets/languages", serde_json::json!(["VBA", "POWERSHELL", "JAVASCRIPT"]))
        .json("/techniques", serde_json::json!(["Scripting", "UserExecution"]))
        .json("/snippets/architectures", serde_json::json!(["ANY", "WINDOWS"]))
        .json(
            "/snippets",
            serde_json::json!([
                {"id": "a", "title": "Dropper", "classObject": {"language": "VBA"}},
                {"id": "b", "title": "Beacon", "classObject": {"language": "JAVASCRIPT"}}
            ]),
        )
        .json("/status/techniqueCount", serde_json::json!({"message": "2"}))
        .json("/status/topLanguage", serde_json::json!({"message": "VBA"}))
        .json("/status/version", serde_json::json!({"message": "1.0-stable"}))
        .json("/status/snippets", serde_json::json!({"message": "2"}));
    mock
}

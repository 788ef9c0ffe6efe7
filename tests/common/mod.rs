use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use yatube_api::{build_app, config::Config, services::MemoryStore, state::AppState, App};

pub const PASSWORD: &str = "correct-horse";

const GROUPS: &str = r#"[
    {"title": "Cats", "slug": "cats", "description": "All about cats"},
    {"title": "Dogs", "slug": "dogs", "description": "All about dogs"}
]"#;

pub struct TestApp {
    pub app: App,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = Arc::new(AppState::new(Config::default(), store).unwrap());
        state.group_service.load_fixture(GROUPS).await.unwrap();

        Self {
            app: build_app(state.clone()),
            state,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Registers the user and returns an access token
    pub async fn login(&self, username: &str) -> String {
        let (status, _) = self
            .post(
                "/auth/users/",
                None,
                json!({"username": username, "password": PASSWORD}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, tokens) = self
            .post(
                "/api/v1/jwt/create/",
                None,
                json!({"username": username, "password": PASSWORD}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        tokens["access"].as_str().unwrap().to_string()
    }

    pub async fn create_post(&self, token: &str, text: &str) -> Value {
        let (status, post) = self
            .post("/api/v1/posts/", Some(token), json!({"text": text}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        post
    }

    pub async fn group_id(&self, slug: &str) -> String {
        let (_, groups) = self.get("/api/v1/groups/", None).await;
        groups
            .as_array()
            .unwrap()
            .iter()
            .find(|g| g["slug"] == slug)
            .map(|g| g["id"].as_str().unwrap().to_string())
            .unwrap()
    }
}

#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use uuid::Uuid;
use wanderlust::database::{Listing, MemoryStore, Store};
use wanderlust::{app, AppState};

pub const PASSWORD: &str = "secret-pass";

/// In-process client holding a single session cookie, like one browser
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
    pub store: MemoryStore,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn is_redirect_to(&self, path: &str) -> bool {
        self.status == StatusCode::FOUND && self.location.as_deref() == Some(path)
    }
}

impl TestApp {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let router = app(AppState::new(store.clone()));
        Self { router, cookie: None, store }
    }

    /// Another browser against the same server and data
    pub fn another_client(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
            store: self.store.clone(),
        }
    }

    pub async fn get(&mut self, path: &str) -> Result<TestResponse> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> Result<TestResponse> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.send(Method::POST, path, Some(body)).await
    }

    async fn send(&mut self, method: Method, path: &str, form: Option<String>) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match form {
            Some(form) => builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))?,
            None => builder.body(Body::empty())?,
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("request failed")?;

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()?
                .split(';')
                .next()
                .unwrap_or_default()
                .to_string();
            let cleared = pair.ends_with('=');
            self.cookie = if cleared { None } else { Some(pair) };
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;

        Ok(TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec())?,
        })
    }

    /// Register and log in; returns the new user's id
    pub async fn signup(&mut self, username: &str) -> Result<Uuid> {
        let email = format!("{}@example.com", username);
        let res = self
            .post_form(
                "/signup",
                &[("username", username), ("email", email.as_str()), ("password", PASSWORD)],
            )
            .await?;
        anyhow::ensure!(res.is_redirect_to("/listings"), "signup failed: {}", res.status);

        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .context("user not persisted")?;
        Ok(user.id)
    }

    /// Create a listing through the form and return the stored record
    pub async fn create_listing(&mut self, title: &str) -> Result<Listing> {
        let res = self
            .post_form(
                "/listings",
                &[
                    ("listing[title]", title),
                    ("listing[description]", "A quiet place"),
                    ("listing[price]", "120"),
                    ("listing[location]", "Lake Tahoe"),
                    ("listing[country]", "United States"),
                ],
            )
            .await?;
        anyhow::ensure!(res.is_redirect_to("/listings"), "create failed: {}", res.status);

        self.store
            .list_listings()
            .await?
            .into_iter()
            .find(|listing| listing.title == title)
            .context("listing not persisted")
    }
}

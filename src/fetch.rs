//! HTTP request builder shared by the API clients

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::{ApiErrors, Error, Result};

enum Body {
    Json(Vec<u8>),
    Multipart(Form),
}

/// Helper for building and executing HTTP requests
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    body: Option<Body>,
    authenticated: bool,
}

impl<'a> FetchBuilder<'a> {
    /// Create a new FetchBuilder
    pub fn new(client: &'a Client, url: &str, method: Method) -> Self {
        Self {
            client,
            url: url.to_string(),
            method,
            headers: HeaderMap::new(),
            body: None,
            authenticated: false,
        }
    }

    /// Add a header to the request
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add bearer token authentication when a token is available
    pub fn bearer_auth(mut self, token: Option<&str>) -> Self {
        if let Some(token) = token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                self.headers.insert(AUTHORIZATION, value);
                self.authenticated = true;
            }
        }
        self
    }

    /// Whether a bearer token is attached
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let json = serde_json::to_vec(body)?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(Body::Json(json));
        Ok(self)
    }

    /// Add a multipart/form-data body; reqwest sets the boundary header
    pub fn multipart(mut self, form: Form) -> Self {
        self.headers.remove(CONTENT_TYPE);
        self.body = Some(Body::Multipart(form));
        self
    }

    fn build(self) -> RequestBuilder {
        let mut req = self
            .client
            .request(self.method, &self.url)
            .headers(self.headers);
        match self.body {
            Some(Body::Json(bytes)) => req = req.body(bytes),
            Some(Body::Multipart(form)) => req = req.multipart(form),
            None => {}
        }
        req
    }

    /// Send the request; non-success statuses become errors
    pub async fn send(self) -> Result<Response> {
        debug!(method = %self.method, url = %self.url, authenticated = self.authenticated, "Sending request");
        let url = self.url.clone();
        let response = self.build().send().await?;
        check_status(response, &url).await
    }

    /// Execute the request and parse the response as JSON
    pub async fn execute<T: DeserializeOwned>(self) -> Result<T> {
        let response = self.send().await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Execute a request whose response body is irrelevant (e.g. 204)
    pub async fn execute_empty(self) -> Result<()> {
        self.send().await?;
        Ok(())
    }
}

async fn check_status(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let errors = ApiErrors::parse(&text);
    debug!(%status, url, errors = %errors, "Request rejected");
    Err(match status {
        StatusCode::UNAUTHORIZED => Error::Unauthorized(errors.summary()),
        StatusCode::FORBIDDEN => Error::Forbidden(errors.summary()),
        StatusCode::NOT_FOUND => Error::NotFound(
            errors
                .detail
                .clone()
                .unwrap_or_else(|| format!("no resource at {}", url)),
        ),
        _ => Error::Api { status, errors },
    })
}

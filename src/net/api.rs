//! REST gateway shared by every controller.
//!
//! DESIGN
//! ======
//! One [`ApiClient`] is built at startup and cloned into each controller;
//! clones share the connection pool and the credential handle, so bearer
//! injection has exactly one definition ([`ApiClient::authorize`]).
//!
//! ERROR HANDLING
//! ==============
//! Failures are returned unchanged to the caller. There is no retry, no
//! backoff and no 401 handling; timeouts come from the transport builder.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{IntoUrl, Method, RequestBuilder, Url};
use serde::Serialize;
use serde_json::Value;

use super::resource::{self, Resource};
use super::types::{ImportSummary, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, Student};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::TokenSource;

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const STUDENT_IMPORT_PATH: &str = "/api/students/import/csv";

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn TokenSource>,
}

impl ApiClient {
    /// Build the shared client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig, credentials: Arc<dyn TokenSource>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()?;
        Ok(Self { http, base_url: config.base_url.clone(), credentials })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        endpoint(&self.base_url, path)
    }

    /// Attach the stored bearer token, if there is one. No token is not an
    /// error: the request goes out bare and the server decides.
    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        Ok(match self.credentials.token()? {
            Some(token) if !token.is_empty() => request.bearer_auth(token),
            _ => request,
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ClientError> {
        let response = self.authorize(request)?.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };

        if !status.is_success() {
            return Err(ClientError::Server { status: status.as_u16(), message: server_message(&value) });
        }
        Ok(value)
    }

    /// Send a JSON request and return the decoded JSON body.
    ///
    /// # Errors
    ///
    /// Returns transport, storage, or server-status errors.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, ClientError> {
        self.request_url(method, self.url(path), body).await
    }

    async fn request_url<U, B>(&self, method: Method, url: U, body: Option<&B>) -> Result<Value, ClientError>
    where
        U: IntoUrl + std::fmt::Display,
        B: Serialize + ?Sized,
    {
        tracing::debug!(%method, %url, "api request");
        let request = self.http.request(method, url);
        let request = match body {
            Some(json) => request.json(json),
            None => request,
        };
        self.send(request).await
    }

    /// URL of record `id` in `R`'s collection, with `id` encoded as a single
    /// path segment.
    fn item_url<R: Resource>(&self, id: &str) -> Result<Url, ClientError> {
        let collection = self.url(R::PATH);
        let invalid = |reason: String| ClientError::InvalidUrl { url: collection.clone(), reason };
        let mut url = Url::parse(&collection).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut().map_err(|()| invalid("base url cannot hold a path".to_owned()))?.push(id);
        Ok(url)
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, rejected credentials, or an
    /// unexpected body.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = self.request(Method::POST, LOGIN_PATH, Some(&LoginRequest { email, password })).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or server rejection.
    pub async fn register(&self, request: &RegisterRequest<'_>) -> Result<RegisterResponse, ClientError> {
        let body = self.request(Method::POST, REGISTER_PATH, Some(request)).await?;
        Ok(serde_json::from_value(body).unwrap_or_default())
    }

    // =========================================================================
    // COLLECTIONS
    // =========================================================================

    /// `GET` the whole collection.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, server rejection, or a body
    /// that does not decode as a list of `R`.
    pub async fn list<R: Resource>(&self) -> Result<Vec<R>, ClientError> {
        let body = self.request::<Value>(Method::GET, R::PATH, None).await?;
        Ok(resource::decode_list(body)?)
    }

    /// `POST` a new record; returns the server's canonical copy.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, server rejection, or a body
    /// that does not decode as an `R`.
    pub async fn create<R: Resource>(&self, record: &R) -> Result<R, ClientError> {
        let payload = record.payload()?;
        let body = self.request(Method::POST, R::PATH, Some(&payload)).await?;
        Ok(resource::decode_item(body)?)
    }

    /// `PUT` the full record under `id`; returns the server's canonical copy.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, server rejection, or a body
    /// that does not decode as an `R`.
    pub async fn update<R: Resource>(&self, id: &str, record: &R) -> Result<R, ClientError> {
        let payload = record.payload()?;
        let body = self.request_url(Method::PUT, self.item_url::<R>(id)?, Some(&payload)).await?;
        Ok(resource::decode_item(body)?)
    }

    /// `DELETE` the record under `id`. Any response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or server rejection.
    pub async fn delete<R: Resource>(&self, id: &str) -> Result<(), ClientError> {
        self.request_url::<_, Value>(Method::DELETE, self.item_url::<R>(id)?, None).await?;
        Ok(())
    }

    // =========================================================================
    // IMPORT
    // =========================================================================

    /// Upload a CSV file of students as multipart field `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, on transport failure, or
    /// on server rejection.
    pub async fn import_students_csv(&self, path: &Path) -> Result<ImportSummary, ClientError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::ReadFile { path: path.display().to_string(), source })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "students.csv".to_owned(), |n| n.to_string_lossy().into_owned());
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name).mime_str("text/csv")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        tracing::debug!(path = STUDENT_IMPORT_PATH, "csv import");
        let request = self.http.post(self.url(STUDENT_IMPORT_PATH)).multipart(form);
        let body = self.send(request).await?;
        tracing::info!(resource = Student::PATH, "csv import accepted");
        Ok(serde_json::from_value(body).unwrap_or_default())
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// `message` field of an error body, or the raw body when there is none.
fn server_message(body: &Value) -> String {
    match body {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| other.to_string(), ToOwned::to_owned),
    }
}

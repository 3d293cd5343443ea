//! Client for the hosted backend's table and auth APIs.

mod auth;
mod query;
mod tables;

pub use query::*;

use reqwest::blocking::{RequestBuilder, Response};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BackendConfig;

/// Remote backend errors.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Could not reach backend at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Error body returned by the table API.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
    /// Auth endpoints use `error_description` / `msg` instead of `message`
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

impl ApiErrorBody {
    fn describe(self, raw: &str) -> String {
        let headline = self
            .message
            .or(self.error_description)
            .or(self.msg)
            .unwrap_or_else(|| raw.trim().to_string());
        [Some(headline), self.details, self.hint]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// HTTP client for the hosted backend.
#[derive(Clone)]
pub struct RestClient {
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
    client: reqwest::blocking::Client,
}

impl RestClient {
    pub fn new(config: &BackendConfig) -> RemoteResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RemoteError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.url.clone(),
            anon_key: config.anon_key.clone(),
            access_token: None,
            client,
        })
    }

    /// Send subsequent requests as the signed-in user.
    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    fn send(&self, request: RequestBuilder) -> RemoteResult<Response> {
        let response = request.send().map_err(|e| {
            if e.is_connect() {
                RemoteError::Connection(self.base_url.clone())
            } else {
                RemoteError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().unwrap_or_default();
            let body: ApiErrorBody = serde_json::from_str(&raw).unwrap_or_default();
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: body.describe(&raw),
            });
        }
        Ok(response)
    }

    fn parse<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
        response
            .json()
            .map_err(|e| RemoteError::ResponseParsing(e.to_string()))
    }

    /// `GET` rows matching the query.
    pub fn select<T: DeserializeOwned>(&self, query: &Query) -> RemoteResult<Vec<T>> {
        tracing::debug!(table = query.table(), "select");
        let response = self.send(
            self.request(Method::GET, &query.path())
                .query(&query.query_pairs()),
        )?;
        Self::parse(response)
    }

    /// Exact row count for the query, without fetching rows.
    pub fn count(&self, query: &Query) -> RemoteResult<u64> {
        tracing::debug!(table = query.table(), "count");
        let response = self.send(
            self.request(Method::HEAD, &query.path())
                .query(&query.query_pairs())
                .header("Prefer", "count=exact"),
        )?;

        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| RemoteError::ResponseParsing("missing Content-Range total".into()))
    }

    /// `POST` one row and return the stored representation.
    pub fn insert<B, T>(&self, table: &'static str, row: &B) -> RemoteResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(table, "insert");
        let response = self.send(
            self.request(Method::POST, &Query::from(table).path())
                .header("Prefer", "return=representation")
                .json(&[row]),
        )?;
        let mut rows: Vec<T> = Self::parse(response)?;
        if rows.is_empty() {
            return Err(RemoteError::ResponseParsing(format!(
                "insert into {} returned no rows",
                table
            )));
        }
        Ok(rows.remove(0))
    }

    /// `PATCH` rows matching the query's filters; returns how many changed.
    pub fn update<B: Serialize + ?Sized>(&self, query: &Query, patch: &B) -> RemoteResult<usize> {
        tracing::debug!(table = query.table(), "update");
        let response = self.send(
            self.request(Method::PATCH, &query.path())
                .query(&query.filter_pairs())
                .header("Prefer", "return=representation")
                .json(patch),
        )?;
        let rows: Vec<serde_json::Value> = Self::parse(response)?;
        Ok(rows.len())
    }

    /// `DELETE` rows matching the query's filters; returns how many went.
    pub fn delete(&self, query: &Query) -> RemoteResult<usize> {
        tracing::debug!(table = query.table(), "delete");
        let response = self.send(
            self.request(Method::DELETE, &query.path())
                .query(&query.filter_pairs())
                .header("Prefer", "return=representation"),
        )?;
        let rows: Vec<serde_json::Value> = Self::parse(response)?;
        Ok(rows.len())
    }
}

//! Blocking HTTP adapter for the users API.
//!
//! # Invariants
//! - Endpoints are resolved relative to the configured base URL path.
//! - Record keys are percent-encoded as a single path segment.
//! - No timeout unless one is configured.

use super::{RemoteError, RemoteOperation, RemoteResult, UsersApi};
use crate::config::parse_api_url;
use crate::model::record::{Record, RecordKey};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

const JSON_MIME: &str = "application/json";

/// `UsersApi` over JSON/HTTP.
#[derive(Debug, Clone)]
pub struct HttpUsersApi {
    client: Client,
    base: Url,
}

impl HttpUsersApi {
    /// Builds an adapter for `base_url` (e.g. `http://127.0.0.1:3000`).
    ///
    /// # Errors
    /// - `InvalidUrl` when the base does not parse or is not http(s).
    /// - `ClientInit` when the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> RemoteResult<Self> {
        let base =
            parse_api_url(base_url).map_err(|err| RemoteError::InvalidUrl(err.to_string()))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RemoteError::ClientInit)?;
        Ok(Self { client, base })
    }

    /// Resolves `/api/users` or `/api/users/{key}` under the base path.
    pub fn endpoint(&self, key: Option<&RecordKey>) -> RemoteResult<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| RemoteError::InvalidUrl(format!("`{}` cannot be a base", self.base)))?;
            segments.pop_if_empty().extend(["api", "users"]);
            if let Some(key) = key {
                segments.push(key.as_str());
            }
        }
        Ok(url)
    }

    fn execute(
        &self,
        operation: RemoteOperation,
        request: RequestBuilder,
    ) -> RemoteResult<Response> {
        let started_at = Instant::now();
        let response = request
            .header(ACCEPT, JSON_MIME)
            .send()
            .map_err(|source| RemoteError::Transport { operation, source })?;

        let status = response.status();
        debug!(
            "event=http_call module=remote op={} status_code={} duration_ms={}",
            operation,
            status.as_u16(),
            started_at.elapsed().as_millis()
        );
        if !status.is_success() {
            return Err(RemoteError::Status {
                operation,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl UsersApi for HttpUsersApi {
    fn fetch_all(&self) -> RemoteResult<Vec<Record>> {
        let operation = RemoteOperation::FetchAll;
        let url = self.endpoint(None)?;
        let response = self.execute(operation, self.client.get(url))?;
        decode_body(operation, response)
    }

    fn create(&self, record: &Record) -> RemoteResult<Record> {
        let operation = RemoteOperation::Create;
        let url = self.endpoint(None)?;
        let response = self.execute(operation, self.client.post(url).json(record))?;
        decode_body(operation, response)
    }

    fn delete(&self, key: &RecordKey) -> RemoteResult<()> {
        let operation = RemoteOperation::Delete;
        let url = self.endpoint(Some(key))?;
        self.execute(
            operation,
            self.client.delete(url).header(CONTENT_TYPE, JSON_MIME),
        )?;
        Ok(())
    }
}

fn decode_body<T: DeserializeOwned>(
    operation: RemoteOperation,
    response: Response,
) -> RemoteResult<T> {
    let body = response
        .text()
        .map_err(|source| RemoteError::Transport { operation, source })?;
    serde_json::from_str(&body).map_err(|err| RemoteError::Decode {
        operation,
        message: err.to_string(),
    })
}

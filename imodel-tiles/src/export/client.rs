//! Mesh Export API client.
//!
//! Builds the three requests the acquisition protocol needs (list, get,
//! create), attaches the API headers, and decodes responses onto
//! [`ExportRecord`].
//!
//! # Endpoints
//!
//! | Operation | Method | Path |
//! |-----------|--------|------|
//! | List      | GET    | `/mesh-export/?iModelId=..&exportType=..[&changesetId=..]` |
//! | Get       | GET    | `/mesh-export/{id}` |
//! | Create    | POST   | `/mesh-export/` |

use std::future::Future;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::error::ExportError;
use super::types::{ExportRecord, ExportRequest, ListResponse, SingleResponse};
use crate::auth::AccessToken;
use crate::http::{AsyncHttpClient, HttpRequest, HttpResponse};

/// Versioned media type of the platform API.
pub const API_ACCEPT: &str = "application/vnd.bentley.itwin-platform.v1+json";

/// Longest response excerpt carried in an error message.
const MAX_ERROR_BODY: usize = 256;

/// Client for the Mesh Export endpoints.
pub struct MeshExportClient<C: AsyncHttpClient> {
    http_client: C,
    base_url: String,
    token: AccessToken,
}

impl<C: AsyncHttpClient> MeshExportClient<C> {
    /// Creates a client for the API host selected by `api_prefix`
    /// (empty for production, e.g. `qa-` for QA).
    pub fn new(http_client: C, api_prefix: &str, token: AccessToken) -> Self {
        Self::with_base_url(
            http_client,
            format!("https://{}api.bentley.com/mesh-export", api_prefix),
            token,
        )
    }

    /// Creates a client against an explicit endpoint root.
    pub fn with_base_url(http_client: C, base_url: impl Into<String>, token: AccessToken) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http_client(&self) -> &C {
        &self.http_client
    }

    /// URL of the listing query for a request.
    pub fn list_url(&self, request: &ExportRequest) -> Result<String, ExportError> {
        let mut params = vec![
            ("iModelId", request.imodel_id.as_str()),
            ("exportType", request.export_type.as_str()),
        ];
        if let Some(changeset) = request.changeset() {
            params.push(("changesetId", changeset));
        }

        Url::parse_with_params(&format!("{}/", self.base_url), &params)
            .map(String::from)
            .map_err(|e| ExportError::InvalidUrl(format!("{}: {}", self.base_url, e)))
    }

    /// URL of a single export.
    pub fn export_url(&self, export_id: &str) -> String {
        format!("{}/{}", self.base_url, export_id)
    }

    /// Lists exports matching the request's iModel, type and changeset.
    pub async fn list_exports(
        &self,
        request: &ExportRequest,
    ) -> Result<Vec<ExportRecord>, ExportError> {
        let url = self.list_url(request)?;
        let http_request = HttpRequest::get(&url)
            .header("Authorization", self.token.header_value())
            .header("Accept", API_ACCEPT)
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation");

        let list: ListResponse = self.execute(http_request).await?;
        Ok(list.exports.into_iter().map(ExportRecord::from).collect())
    }

    /// Fetches one export.
    pub async fn get_export(&self, export_id: &str) -> Result<ExportRecord, ExportError> {
        let http_request = HttpRequest::get(self.export_url(export_id))
            .header("Authorization", self.token.header_value())
            .header("Accept", API_ACCEPT);

        let single: SingleResponse = self.execute(http_request).await?;
        Ok(single.into_record())
    }

    /// Requests a new export job.
    pub async fn create_export(
        &self,
        request: &ExportRequest,
    ) -> Result<ExportRecord, ExportError> {
        let body = serde_json::json!({
            "iModelId": request.imodel_id,
            "changesetId": request.changeset_id,
            "exportType": request.export_type.as_str(),
        });
        let http_request = HttpRequest::post(format!("{}/", self.base_url))
            .header("Authorization", self.token.header_value())
            .header("Accept", API_ACCEPT)
            .header("Content-Type", "application/json")
            .body(body.to_string());

        let single: SingleResponse = self.execute(http_request).await?;
        Ok(single.into_record())
    }

    async fn execute<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ExportError> {
        debug!(method = %request.method, url = %request.url, "Mesh export request");
        let url = request.url.clone();
        let response = self.http_client.send(request).await?;
        decode(&url, &response)
    }
}

/// Decodes a response body, turning non-2xx statuses and error envelopes
/// into errors.
fn decode<T: DeserializeOwned>(url: &str, response: &HttpResponse) -> Result<T, ExportError> {
    let value: Option<Value> = serde_json::from_slice(&response.body).ok();

    if !response.is_success() {
        let message = value
            .as_ref()
            .and_then(|v| v.get("error"))
            .map(describe_error)
            .unwrap_or_else(|| excerpt(&response.text()));
        return Err(ExportError::Status {
            url: url.to_string(),
            status: response.status,
            message,
        });
    }

    let value = value.ok_or_else(|| ExportError::Decode {
        url: url.to_string(),
        reason: format!("body is not JSON: {}", excerpt(&response.text())),
    })?;

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        return Err(ExportError::Api {
            url: url.to_string(),
            message: describe_error(error),
        });
    }

    serde_json::from_value(value).map_err(|e| ExportError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Renders an error envelope (`{"code", "message"}` object or plain string).
fn describe_error(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            let code = map.get("code").and_then(Value::as_str);
            let message = map.get("message").and_then(Value::as_str);
            match (code, message) {
                (Some(code), Some(message)) => format!("{}: {}", code, message),
                (None, Some(message)) => message.to_string(),
                (Some(code), None) => code.to_string(),
                (None, None) => error.to_string(),
            }
        }
        other => other.to_string(),
    }
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(MAX_ERROR_BODY) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Runs a fallible future unless the token is cancelled first.
pub(crate) async fn cancellable<T, F>(
    cancel: &CancellationToken,
    future: F,
) -> Result<T, ExportError>
where
    F: Future<Output = Result<T, ExportError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ExportError::Cancelled),
        result = future => result,
    }
}

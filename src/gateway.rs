//! The HTTP request gateway.
//!
//! The only place that talks to the remote API. It attaches the bearer token
//! from the session store, picks the content type from the body kind, and
//! folds every failure into a single [`ApiError`]. It never writes to the
//! session store.

use http::{Method, StatusCode, header};
use reqwest::{Client, multipart};
use serde::{Serialize, de::DeserializeOwned};
use sonic_rs::JsonValueTrait;

use crate::{
    config::Config,
    error::{ApiError, AppError, Result},
    models::file::UploadFile,
    repositories::session::SessionStore,
};

const USER_AGENT: &str = concat!("geoportal/", env!("CARGO_PKG_VERSION"));
const JSON_CONTENT_TYPE: &str = "application/json";

/// Keys looked up, in order, for a human-readable error message.
const ERROR_MESSAGE_KEYS: [&str; 3] = ["detail", "message", "error"];

/// The payload of a request.
#[derive(Debug)]
pub enum RequestBody<'a> {
    /// No payload. The JSON content type is still declared.
    Empty,
    /// A serialized JSON document.
    Json(Vec<u8>),
    /// `application/x-www-form-urlencoded` pairs.
    Form(&'a [(&'a str, &'a str)]),
    /// One multipart part per file, all under the same field name.
    /// The content type is left to the transport so it can add the boundary.
    Multipart {
        field: &'static str,
        files: &'a [UploadFile],
    },
}

impl RequestBody<'_> {
    /// Serializes `value` into a JSON body.
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(RequestBody::Json(sonic_rs::to_vec(value)?))
    }
}

/// A request against one endpoint of the API.
#[derive(Debug)]
pub struct ApiRequest<'a> {
    method: Method,
    endpoint: &'a str,
    query: Vec<(&'a str, String)>,
    body: RequestBody<'a>,
}

impl<'a> ApiRequest<'a> {
    pub fn new(method: Method, endpoint: &'a str) -> Self {
        Self {
            method,
            endpoint,
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(endpoint: &'a str) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: &'a str) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn query(mut self, key: &'a str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub fn body(mut self, body: RequestBody<'a>) -> Self {
        self.body = body;
        self
    }
}

/// Sends requests to the API on behalf of the flow controllers.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    session: SessionStore,
}

impl Gateway {
    /// Creates a new `Gateway`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    /// * `session` - Where the bearer token is read from.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Gateway`.
    pub fn new(config: &Config, session: SessionStore) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends `body` to `endpoint` and decodes the JSON answer.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: RequestBody<'_>,
    ) -> Result<T> {
        self.send(ApiRequest::new(method, endpoint).body(body)).await
    }

    /// Sends a request and decodes the JSON answer.
    ///
    /// Fails with `AppError::Api` on any non-success status or transport
    /// failure; a partial result is never returned.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest<'_>) -> Result<T> {
        let url = format!("{}{}", self.base_url, request.endpoint);
        tracing::debug!("➡️ {} {}", request.method, url);

        let mut builder = self.client.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        // An invalid persisted session is cleared here and the request goes
        // out anonymous.
        if let Some(session) = self.session.restore()? {
            builder = builder.bearer_auth(session.token.as_str());
        }

        builder = match request.body {
            RequestBody::Empty => builder.header(header::CONTENT_TYPE, JSON_CONTENT_TYPE),
            RequestBody::Json(bytes) => builder
                .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
                .body(bytes),
            RequestBody::Form(pairs) => builder.form(pairs),
            RequestBody::Multipart { field, files } => {
                builder.multipart(build_multipart(field, files)?)
            }
        };

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;

        tracing::debug!("⬅️ {} {} ({} bytes)", status.as_u16(), url, body.len());

        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()).into());
        }

        decode_body(status, body.as_ref())
    }
}

fn build_multipart(field: &'static str, files: &[UploadFile]) -> Result<multipart::Form> {
    files.iter().try_fold(multipart::Form::new(), |form, file| {
        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| {
                AppError::Validation(format!(
                    "Invalid media type {:?} for {}: {}",
                    file.content_type, file.file_name, e
                ))
            })?;
        Ok(form.part(field, part))
    })
}

fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        body
    };

    sonic_rs::from_slice(body).map_err(|e| {
        AppError::Api(ApiError::http(
            status.as_u16(),
            format!("Invalid response body: {}", e),
        ))
    })
}

fn map_transport_error(error: reqwest::Error) -> AppError {
    tracing::debug!("Transport failure: {}", error);
    AppError::Api(ApiError::transport(error.to_string()))
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ApiError {
    ApiError::http(status.as_u16(), error_message(status, body))
}

/// Extracts a readable message from an error body, falling back to
/// `HTTP error <status>` when the body is absent or unparsable.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    let generic = || format!("HTTP error {}", status.as_u16());

    let Ok(value) = sonic_rs::from_slice::<sonic_rs::Value>(body) else {
        return generic();
    };

    ERROR_MESSAGE_KEYS
        .iter()
        .filter_map(|key| value.get(*key))
        .find(|v| !v.is_null())
        .and_then(|v| match v.as_str() {
            Some(s) => Some(s.trim().to_string()),
            None => sonic_rs::to_string(v).ok(),
        })
        .filter(|message| !message.is_empty())
        .unwrap_or_else(generic)
}

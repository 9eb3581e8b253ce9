//! FAOSTAT HTTP wrapper.
//!
//! One GET per call, no retries. Failure responses are classified before any
//! generic status handling:
//!
//! | Response                                 | Error                              |
//! |------------------------------------------|------------------------------------|
//! | `500` with body `Index: 0, Size: 0`      | [`RequestError::ResourceNotFound`] |
//! | `524`                                    | [`RequestError::RequestTimeout`]   |
//! | any other non-2xx                        | [`RequestError::Http`]             |
//!
//! Successful bodies are unwrapped from the `{"data": [...]}` envelope.

use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::error::{ConfigError, ConfigResult, RequestError, RequestResult};
use crate::logs::log_info_indent;
use crate::records::Record;

/// Body FAOSTAT sends with a 500 when a domain or code list does not exist.
pub const EMPTY_INDEX_SENTINEL: &str = "Index: 0, Size: 0";

/// Cloudflare "a timeout occurred" status.
pub const GATEWAY_TIMEOUT_STATUS: u16 = 524;

/// Response envelope. Only `data` is read.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Vec<Record>>,
}

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub url: Url,
    pub status: u16,
    pub body: String,
}

/// FAOSTAT API client
#[derive(Debug, Clone)]
pub struct FaostatClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl FaostatClient {
    /// Build a client; the configured timeout applies to every request.
    pub fn new(config: ClientConfig) -> ConfigResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `{base}/{lang}/{segments...}`
    pub fn endpoint(&self, segments: &[&str]) -> RequestResult<Url> {
        let mut url = self.config.base_url().clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ConfigError::InvalidBaseUrl(self.config.base_url().to_string())
            })?;
            path.pop_if_empty();
            path.push(self.config.language().as_str());
            path.extend(segments);
        }
        Ok(url)
    }

    /// `{base}/{lang}/codes/{category}/{domain}`
    pub fn codes_url(&self, category: &str, domain: &str) -> RequestResult<Url> {
        self.endpoint(&["codes", category, domain])
    }

    /// `{base}/{lang}/data/{domain}`
    pub fn data_url(&self, domain: &str) -> RequestResult<Url> {
        self.endpoint(&["data", domain])
    }

    /// Issue a GET and classify the status.
    ///
    /// # Errors
    /// See the module table; transport failures map to
    /// [`RequestError::Network`], client-side timeouts to
    /// [`RequestError::RequestTimeout`].
    pub async fn get(&self, url: Url, params: &[(String, String)]) -> RequestResult<RawResponse> {
        log_info_indent(format!("📡 GET {}", url), 1);

        let response = self
            .http
            .get(url.clone())
            .query(params)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(&url, e))?;

        check_status(&url, status.as_u16(), &body)?;

        Ok(RawResponse {
            url,
            status: status.as_u16(),
            body,
        })
    }

    /// GET and unwrap the `data` array.
    pub async fn fetch_records(
        &self,
        url: Url,
        params: &[(String, String)],
    ) -> RequestResult<Vec<Record>> {
        let response = self.get(url, params).await?;
        let records = extract_data(&response)?;
        log_info_indent(format!("Received {} records", records.len()), 1);
        Ok(records)
    }
}

/// Map a status/body pair to the error taxonomy.
pub fn check_status(url: &Url, status: u16, body: &str) -> RequestResult<()> {
    if status == StatusCode::INTERNAL_SERVER_ERROR.as_u16() && body == EMPTY_INDEX_SENTINEL {
        return Err(RequestError::ResourceNotFound {
            resource: resource_name(url),
        });
    }

    if status == GATEWAY_TIMEOUT_STATUS {
        return Err(RequestError::RequestTimeout(format!(
            "HTTP {} from {}",
            status,
            url.path()
        )));
    }

    if !(200..300).contains(&status) {
        return Err(RequestError::Http {
            status,
            body: body.to_string(),
        });
    }

    Ok(())
}

/// Records under `data`; a missing or null `data` is an empty list.
pub fn extract_data(response: &RawResponse) -> RequestResult<Vec<Record>> {
    parse_envelope(&response.body)
}

fn parse_envelope(body: &str) -> RequestResult<Vec<Record>> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| RequestError::InvalidResponse(e.to_string()))?;
    Ok(envelope.data.unwrap_or_default())
}

/// Last path segment, used to name the missing resource.
fn resource_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default()
        .to_string()
}

fn transport_error(url: &Url, err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        RequestError::RequestTimeout(format!("no response from {} in time", url.path()))
    } else {
        RequestError::Network(err.to_string())
    }
}

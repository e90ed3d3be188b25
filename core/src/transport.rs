//! Blocking `Transport` backed by ureq.
//!
//! ureq's automatic status-code-as-error behavior is disabled so 4xx/5xx
//! responses come back as data and `TodoClient` handles status
//! interpretation. Only connection-level failures become
//! `ApiError::Transport`.

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&mut self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = req.url();
        let content_type = req
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| "application/json".to_string());
        debug!(method = %req.method, %url, "sending request");

        let result = match (req.method, req.body) {
            (HttpMethod::Get, _) => self.agent.get(&url).call(),
            (HttpMethod::Delete, _) => self.agent.delete(&url).call(),
            (HttpMethod::Post, Some(body)) => {
                self.agent.post(&url).content_type(content_type).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => self.agent.post(&url).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                self.agent.put(&url).content_type(content_type).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => self.agent.put(&url).send_empty(),
            (HttpMethod::Patch, Some(body)) => {
                self.agent.patch(&url).content_type(content_type).send(body.as_bytes())
            }
            (HttpMethod::Patch, None) => self.agent.patch(&url).send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        debug!(status, bytes = body.len(), "received response");

        Ok(HttpResponse { status, headers, body })
    }
}

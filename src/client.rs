use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client_logger::ClientLogger;
use crate::decoder::decode_messages;
use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::types::{AgentRequest, Message};
use crate::LogLevel;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const GITHUB_TOKEN_HEADER: &str = "x-github-token";
const PUBLIC_KEY_SIGNATURE_HEADER: &str = "github-public-key-signature";
const PUBLIC_KEY_IDENTIFIER_HEADER: &str = "github-public-key-identifier";

/// Client for a Copilot agent endpoint.
#[derive(Clone)]
pub struct AgentClient {
    url: Url,
    token: Option<String>,
    client: ReqwestClient,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl AgentClient {
    /// Create a new agent client.
    ///
    /// The token, when present, is forwarded to the agent as `X-GitHub-Token`.
    pub fn new(url: &str, token: Option<String>) -> Result<Self> {
        Self::with_options(url, token, None)
    }

    /// Create a new client with a custom transport timeout.
    pub fn with_options(url: &str, token: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        if url.is_empty() {
            return Err(Error::validation(
                "agent url is required",
                Some("url".to_string()),
            ));
        }
        let url = Url::parse(url)?;
        let token = token.filter(|token| !token.is_empty());

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            url,
            token,
            client,
            timeout,
            logger: None,
        })
    }

    /// Attach a logger that receives raw traffic when invoked at `TRACE`.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The agent endpoint.
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );
        headers.insert(PUBLIC_KEY_SIGNATURE_HEADER, HeaderValue::from_static(""));
        headers.insert(PUBLIC_KEY_IDENTIFIER_HEADER, HeaderValue::from_static(""));
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(token).map_err(|_| {
                Error::validation(
                    "token contains characters not allowed in a header",
                    Some("token".to_string()),
                )
            })?;
            headers.insert(GITHUB_TOKEN_HEADER, value);
        }
        Ok(headers)
    }

    /// Send the conversation to the agent and decode its streamed answer.
    ///
    /// Every call uses a fresh thread id.  A decode error or a protocol
    /// violation discards the whole response.
    pub async fn invoke(
        &self,
        history: &[Message],
        cancel: &CancellationToken,
        level: &LogLevel,
    ) -> Result<Vec<Message>> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = self.invoke_inner(history, cancel, level).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if result.is_err() {
            CLIENT_REQUEST_ERRORS.click();
        }
        result
    }

    async fn invoke_inner(
        &self,
        history: &[Message],
        cancel: &CancellationToken,
        level: &LogLevel,
    ) -> Result<Vec<Message>> {
        let request = AgentRequest::new(uuid::Uuid::new_v4().to_string(), history.to_vec());

        let send = self
            .client
            .post(self.url.clone())
            .headers(self.default_headers()?)
            .json(&request)
            .send();
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::abort("request cancelled")),
            response = send => response.map_err(|e| self.map_send_error(e))?,
        };

        if level.is_trace()
            && let Some(logger) = &self.logger
        {
            logger.log_response(response.status().as_u16(), &header_pairs(&response));
        }

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let body = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| {
                Error::streaming(format!("Error in HTTP stream: {}", e), Some(Box::new(e)))
            })
        });
        decode_messages(Box::pin(body), cancel, level, self.logger.clone()).await
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        let message = match response.text().await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => format!("agent returned HTTP {status_code} with an empty body"),
            Err(e) => format!("agent returned HTTP {status_code}; body unreadable: {e}"),
        };
        Error::api(status_code, message)
    }
}

impl std::fmt::Debug for AgentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentClient")
            .field("url", &self.url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

fn header_pairs(response: &Response) -> Vec<(String, String)> {
    response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

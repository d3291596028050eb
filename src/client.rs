use std::time::{Duration, Instant};

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUESTS, CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS};
use crate::types::{Message, PostMessageParams};

/// Server root used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost/";

/// Display name used when none is configured. The server drops posts that
/// arrive without a `username` cookie.
pub const DEFAULT_USERNAME: &str = "Anonymous";

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const GET_MESSAGES_PATH: &str = "get_messages";
const POST_MESSAGE_PATH: &str = "post_message";

/// Name of the cookie the server attributes posts to.
const USERNAME_COOKIE: &str = "username";

/// The two server operations the client depends on.
///
/// [`WebChat`] implements this over HTTP. The sync loop and the composer
/// only see this trait, so they can be driven by any other source of
/// messages.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Fetch the server's full message list, oldest first.
    async fn fetch_messages(&self) -> Result<Vec<Message>>;

    /// Append a message to the server's list.
    async fn post_message(&self, params: PostMessageParams) -> Result<()>;
}

/// HTTP client for a webchat server.
#[derive(Debug, Clone)]
pub struct WebChat {
    client: ReqwestClient,
    base_url: Url,
    username: String,
    timeout: Duration,
}

impl WebChat {
    /// Create a new client for the server at `base_url`.
    ///
    /// Defaults to `http://localhost/` when no URL is given.
    pub fn new(base_url: Option<&str>) -> Result<Self> {
        Self::with_options(base_url.map(String::from), None, None)
    }

    /// Create a new client with custom settings.
    ///
    /// `username` is sent as the `username` cookie so the server attributes
    /// posts to that name. It defaults to `Anonymous`.
    pub fn with_options(
        base_url: Option<String>,
        username: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let base_url = parse_base_url(base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        let username = username.unwrap_or_else(|| DEFAULT_USERNAME.to_string());
        cookie_value(&username)?;

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
            client,
            base_url,
            username,
            timeout,
        })
    }

    /// The server root all endpoints are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The display name sent with each request.
    pub fn username(&self) -> &str {
        &self.username
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Create and return default headers for requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let cookie = format!("{USERNAME_COOKIE}={}", cookie_value(&self.username)?);
        let value = HeaderValue::from_str(&cookie).map_err(|e| {
            Error::validation(
                format!("display name cannot be sent as a cookie: {e}"),
                Some("name".to_string()),
            )
        })?;
        headers.insert(header::COOKIE, value);
        Ok(headers)
    }

    fn request_error(&self, e: reqwest::Error) -> Error {
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

    /// Map a non-success response to an API error.
    async fn process_error_response(response: Response, endpoint: &str) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or_default().to_string()
        } else {
            body.trim().to_string()
        };
        Error::api(status.as_u16(), endpoint, message)
    }

    async fn send(&self, request: reqwest::RequestBuilder, endpoint: &str) -> Result<Response> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = request.send().await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                CLIENT_REQUEST_ERRORS.click();
                return Err(self.request_error(e));
            }
        };
        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response, endpoint).await);
        }
        Ok(response)
    }

    /// Fetch the full message history.
    ///
    /// A `null` body is treated as an empty history. Anything that is not a
    /// JSON array of messages is a serialization error.
    pub async fn get_messages(&self) -> Result<Vec<Message>> {
        let url = self.endpoint(GET_MESSAGES_PATH)?;
        let request = self
            .client
            .get(url)
            .headers(self.default_headers()?)
            .header(header::ACCEPT, HeaderValue::from_static("application/json"));
        let response = self.send(request, "/get_messages").await?;

        let body = response.text().await.map_err(|e| self.request_error(e))?;
        parse_message_list(&body)
    }

    /// Post one message. The response body is not read.
    pub async fn send_message(&self, params: &PostMessageParams) -> Result<()> {
        let url = self.endpoint(POST_MESSAGE_PATH)?;
        let request = self
            .client
            .post(url)
            .headers(self.default_headers()?)
            .form(params);
        self.send(request, "/post_message").await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChatTransport for WebChat {
    async fn fetch_messages(&self) -> Result<Vec<Message>> {
        self.get_messages().await
    }

    async fn post_message(&self, params: PostMessageParams) -> Result<()> {
        self.send_message(&params).await
    }
}

/// Parse a `/get_messages` body.
pub fn parse_message_list(body: &str) -> Result<Vec<Message>> {
    serde_json::from_str::<Option<Vec<Message>>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| {
            Error::serialization(
                format!("Malformed /get_messages body: {}", e),
                Some(Box::new(e)),
            )
        })
}

/// Parse a server root URL, making sure endpoints resolve beneath it.
pub fn parse_base_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(Error::validation(
            format!("{base_url} is not an http(s) URL"),
            Some("url".to_string()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Encode a display name as a cookie value.
///
/// Names with spaces or commas are quoted, which the server strips when it
/// reads the cookie. Names with characters a cookie cannot carry at all are
/// rejected.
pub fn cookie_value(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::validation(
            "display name must not be empty",
            Some("name".to_string()),
        ));
    }
    if let Some(bad) = name
        .chars()
        .find(|&c| !(' '..='~').contains(&c) || matches!(c, '"' | ';' | '\\'))
    {
        return Err(Error::validation(
            format!("display name contains {bad:?}, which cannot be sent as a cookie"),
            Some("name".to_string()),
        ));
    }
    if name.contains([' ', ',']) {
        Ok(format!("\"{name}\""))
    } else {
        Ok(name.to_string())
    }
}

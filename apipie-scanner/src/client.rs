use crate::error::{Result, ScanError};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Content types worth reading: markup, scripts, JSON and XML.
const ALLOWED_CONTENT_TYPES: &[&str] = &["text/", "javascript", "json", "xml"];

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_MAX_BODY: usize = 5 * 1024 * 1024;
pub const DEFAULT_WORKERS: usize = 6;

pub const UA_PRESET_NAMES: &[&str] = &["chrome", "mobile", "firefox", "safari", "bot"];

/// User-Agent string for a named preset.
pub fn user_agent_preset(name: &str) -> Option<&'static str> {
    match name.to_ascii_lowercase().as_str() {
        "chrome" => Some(DEFAULT_USER_AGENT),
        "mobile" => Some(
            "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36",
        ),
        "firefox" => Some("Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:122.0) Gecko/20100101 Firefox/122.0"),
        "safari" => Some(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_2) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
        ),
        "bot" => Some("Googlebot/2.1 (+http://www.google.com/bot.html)"),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub headers: Vec<(String, String)>,
    pub user_agent: Option<String>,
    pub workers: usize,
    pub rate_limit: Option<Duration>,
    pub timeout: Duration,
    pub max_body: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            user_agent: None,
            workers: DEFAULT_WORKERS,
            rate_limit: None,
            timeout: DEFAULT_TIMEOUT,
            max_body: DEFAULT_MAX_BODY,
        }
    }
}

/// GET-only transport shared by page traversal and the script fan-out.
///
/// Every failure is reported as "no content" to callers. The optional rate
/// limit is a minimum interval between any two requests made through the
/// same client, concurrent ones included.
pub struct HttpClient {
    client: Client,
    workers: usize,
    rate_limit: Option<Duration>,
    max_body: usize,
    last_request: Mutex<Option<Instant>>,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(USER_AGENT, header_value(user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE));

        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.trim().as_bytes())
                .map_err(|e| ScanError::InvalidHeader(format!("{}: {}", name, e)))?;
            headers.insert(name, header_value(value.trim())?);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.timeout / 2)
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::limited(5))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            workers: config.workers.max(1),
            rate_limit: config.rate_limit.filter(|d| !d.is_zero()),
            max_body: config.max_body,
            last_request: Mutex::new(None),
        })
    }

    /// Fetch one URL as text. `None` on any transport error, non-2xx status
    /// or content type outside the allow-list.
    pub async fn fetch(&self, url: &str) -> Option<String> {
        match self.try_fetch(url).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("{}: {}", url, e);
                None
            }
        }
    }

    /// Fetch several URLs concurrently, at most `workers` in flight. Failed
    /// URLs are absent from the result.
    pub async fn fetch_many(&self, urls: &[String]) -> HashMap<String, String> {
        let results: Vec<(String, Option<String>)> = stream::iter(urls.iter().cloned())
            .map(|url| async move {
                let body = self.fetch(&url).await;
                (url, body)
            })
            .buffer_unordered(self.workers)
            .collect()
            .await;

        results
            .into_iter()
            .filter_map(|(url, body)| body.map(|body| (url, body)))
            .collect()
    }

    async fn try_fetch(&self, url: &str) -> Result<String> {
        self.throttle().await;
        debug!("GET {}", url);

        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::BadStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !ALLOWED_CONTENT_TYPES.iter().any(|t| content_type.contains(t)) {
            return Err(ScanError::UnsupportedContentType(content_type));
        }

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            if body.len() >= self.max_body {
                debug!("{}: body truncated at {} bytes", url, self.max_body);
                body.truncate(self.max_body);
                break;
            }
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Wait until the minimum interval since the previous request has passed.
    async fn throttle(&self) {
        let Some(interval) = self.rate_limit else {
            return;
        };

        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ScanError::InvalidHeader(format!("{}: {}", value, e)))
}

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder};
use tracing::debug;
use url::Url;

use crate::config::ScrapeConfig;
use crate::extract::{ExtractionError, ImageError};
use crate::models::Page;

const MAX_REDIRECTS: usize = 10;
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/*,*/*;q=0.8";
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// HTTP access for the page and its images. One request at a time, no retries.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &ScrapeConfig) -> Result<Self, ExtractionError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let mut builder = ClientBuilder::new()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .user_agent(config.user_agent.clone())
            .default_headers(headers);

        if config.insecure_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| ExtractionError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Fetch the target page. The returned [`Page`] carries the URL after
    /// redirects, which is the base for relative image references.
    pub async fn fetch_page(&self, url: &Url) -> Result<Page, ExtractionError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, HTML_ACCEPT)
            .send()
            .await
            .map_err(|e| ExtractionError::Request {
                url: url.to_string(),
                reason: describe(&e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::Upstream {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        if !content_type.is_empty() && !HTML_CONTENT_TYPES.iter().any(|t| content_type.contains(t)) {
            return Err(ExtractionError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        let final_url = response.url().clone();
        if final_url != *url {
            debug!(from = %url, to = %final_url, "page redirected");
        }

        let html = response.text().await.map_err(|e| ExtractionError::Request {
            url: url.to_string(),
            reason: describe(&e),
        })?;

        Ok(Page {
            url: final_url,
            html,
        })
    }

    pub async fn fetch_image(&self, url: &Url) -> Result<Vec<u8>, ImageError> {
        let fetch_error = |reason: String| ImageError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, IMAGE_ACCEPT)
            .send()
            .await
            .map_err(|e| fetch_error(describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status.as_u16())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error(describe(&e)))?;
        Ok(bytes.to_vec())
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timed out: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}

use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use std::time::Duration;
use tracing::debug;

/// Single-attempt GET client: fixed user agent, fixed timeout, no retries.
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .cookie_store(true)
            .build()
            .map_err(ScrapeError::Client)?;

        Ok(Self { inner })
    }

    /// Fetch a URL as text. Non-2xx responses are errors.
    pub async fn get_text(&self, url: &str) -> Result<String, ScrapeError> {
        debug!("GET {}", url);

        let resp = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::from_reqwest(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|e| ScrapeError::from_reqwest(url, e))
    }
}

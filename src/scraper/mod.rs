pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::models::RawProduct;
use async_trait::async_trait;
use tracing::{info, warn};
use url::Url;

use self::http_client::HttpClient;
use self::parsers::parse_listing_page;

// ── Source trait ──────────────────────────────────────────────────────────────

/// One page of listing cards. Swappable so the orchestrator can be driven
/// without a network.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn scrape_page(&self, page: i64) -> Result<Vec<RawProduct>, ScrapeError>;
}

// ── Fashion catalog scraper ───────────────────────────────────────────────────

pub struct CatalogScraper {
    client: HttpClient,
    base_url: Url,
}

impl CatalogScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            client: HttpClient::new(config)?,
            base_url: catalog_root(&config.base_url)?,
        })
    }

    /// Page 1 is the catalog root; page N > 1 is `page{N}` under it.
    pub fn page_url(&self, page: i64) -> Result<String, ScrapeError> {
        page_url(&self.base_url, page)
    }
}

/// Base URL with a trailing slash, so `page{N}` joins under it.
fn catalog_root(base_url: &str) -> Result<Url, ScrapeError> {
    let with_slash = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };
    Url::parse(&with_slash).map_err(|source| ScrapeError::InvalidUrl {
        url: base_url.to_string(),
        source,
    })
}

pub fn page_url(root: &Url, page: i64) -> Result<String, ScrapeError> {
    match page {
        p if p < 1 => Err(ScrapeError::InvalidPage(p)),
        1 => Ok(root.to_string()),
        p => root
            .join(&format!("page{}", p))
            .map(String::from)
            .map_err(|source| ScrapeError::InvalidUrl {
                url: root.to_string(),
                source,
            }),
    }
}

#[async_trait]
impl CatalogSource for CatalogScraper {
    async fn scrape_page(&self, page: i64) -> Result<Vec<RawProduct>, ScrapeError> {
        let url = self.page_url(page)?;
        info!("Scraping page {} ({})", page, url);

        let html = self.client.get_text(&url).await?;
        let products = parse_listing_page(&html);

        if products.is_empty() {
            warn!("No products found on page {}", page);
        }

        Ok(products)
    }
}

//! Pipeline orchestrator: scraper → transform → load sinks.
//!
//! ## Stages
//!
//! 1. Extract: fetch catalog pages `start..=end` one at a time, pausing a
//!    fixed delay after every page. A page that fails contributes nothing
//!    and the loop moves on.
//! 2. Transform: clean, validate and deduplicate the raw cards.
//! 3. Load: write to every configured sink; a failing sink does not stop
//!    the others.

use crate::config::AppConfig;
use crate::loader::load_configured;
use crate::models::{CleanedProduct, RawProduct};
use crate::scraper::{CatalogScraper, CatalogSource};
use crate::transform::{TransformStats, transform};
use crate::utils::StageTimer;
use anyhow::{Context, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Extract with the live catalog scraper.
    pub async fn extract(&self, start_page: i64, end_page: i64) -> Result<Vec<RawProduct>> {
        let scraper = CatalogScraper::new(&self.config.scraper)
            .context("Failed to build scraper")?;
        Ok(extract(&scraper, start_page, end_page, self.request_delay()).await)
    }

    pub async fn scrape(&self, start_page: i64, end_page: i64) -> Result<(Vec<CleanedProduct>, TransformStats)> {
        let raw = self.extract(start_page, end_page).await?;
        Ok(transform(&raw, &self.config.transform))
    }

    pub async fn run(&self, start_page: i64, end_page: i64) -> Result<PipelineStats> {
        info!("=== Step 1: Extracting pages {}..={} ===", start_page, end_page);
        let timer = StageTimer::start("extract");
        let raw = self.extract(start_page, end_page).await.context("Extract failed")?;
        timer.finish(raw.len());

        info!("=== Step 2: Transforming {} raw records ===", raw.len());
        let timer = StageTimer::start("transform");
        let (products, transform_stats) = transform(&raw, &self.config.transform);
        timer.finish(products.len());

        info!("=== Step 3: Loading {} products ===", products.len());
        let timer = StageTimer::start("load");
        let report = load_configured(&self.config.load, &products).await;
        timer.finish(report.succeeded.iter().map(|(_, n)| n).sum());

        let stats = PipelineStats {
            pages: (end_page - start_page + 1).max(0) as usize,
            raw_records: transform_stats.input,
            products: transform_stats.kept,
            sink_failures: report.failed.len(),
        };

        info!(
            "=== Done: {} pages | {} raw | {} products | {} sink failures ===",
            stats.pages, stats.raw_records, stats.products, stats.sink_failures,
        );
        Ok(stats)
    }

    fn request_delay(&self) -> Duration {
        Duration::from_millis(self.config.scraper.request_delay_ms)
    }
}

/// Scrape `start..=end` strictly in order. Failed pages are logged and
/// contribute zero records; the delay follows every page either way.
pub async fn extract(
    source: &dyn CatalogSource,
    start_page: i64,
    end_page: i64,
    delay: Duration,
) -> Vec<RawProduct> {
    let mut all_products = Vec::new();

    for page in start_page..=end_page {
        match source.scrape_page(page).await {
            Ok(products) => {
                info!("  Page {}: {} products", page, products.len());
                all_products.extend(products);
            }
            Err(e) => error!("Page {} failed: {}", page, e),
        }

        sleep(delay).await;
    }

    info!("Total products extracted: {}", all_products.len());
    all_products
}

#[derive(Debug)]
pub struct PipelineStats {
    pub pages: usize,
    pub raw_records: usize,
    pub products: usize,
    pub sink_failures: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoadConfig, ScraperConfig};
    use crate::error::ScrapeError;
    use crate::models::capture_time;
    use async_trait::async_trait;
    use httpmock::prelude::*;
    use std::sync::Mutex;

    const SINGLE_PRODUCT_PAGE: &str = r#"
        <html>
          <body>
            <div class="collection-card">
              <div class="product-title">Test Product</div>
              <div class="price-container">$10</div>
              <p>Rating: 4.5</p>
              <p>Red, Blue</p>
              <p>Size: M</p>
              <p>Gender: Unisex</p>
            </div>
          </body>
        </html>
    "#;

    /// Serves canned results and records the order pages were asked for.
    struct FakeSource {
        requested: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl CatalogSource for FakeSource {
        async fn scrape_page(&self, page: i64) -> Result<Vec<RawProduct>, ScrapeError> {
            self.requested.lock().unwrap().push(page);
            match page {
                2 => Err(ScrapeError::Timeout { url: "page2".into() }),
                3 => Ok(vec![]),
                _ => {
                    let mut p = RawProduct::unavailable(capture_time());
                    p.title = format!("Item {}", page);
                    Ok(vec![p.clone(), p])
                }
            }
        }
    }

    fn test_config(base_url: String, dir: &std::path::Path) -> AppConfig {
        AppConfig {
            scraper: ScraperConfig { base_url, request_delay_ms: 0, ..Default::default() },
            load: LoadConfig {
                csv_path: dir.join("products.csv"),
                db_path: dir.join("fashion.duckdb"),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn extract_continues_past_failed_pages() {
        let source = FakeSource { requested: Mutex::new(vec![]) };

        let products = extract(&source, 1, 4, Duration::ZERO).await;

        assert_eq!(*source.requested.lock().unwrap(), vec![1, 2, 3, 4]);
        let titles: Vec<&str> = products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Item 1", "Item 1", "Item 4", "Item 4"]);
    }

    #[tokio::test]
    async fn extract_empty_range_fetches_nothing() {
        let source = FakeSource { requested: Mutex::new(vec![]) };
        assert!(extract(&source, 5, 4, Duration::ZERO).await.is_empty());
        assert!(source.requested.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn extract_pauses_after_every_page() {
        let source = FakeSource { requested: Mutex::new(vec![]) };
        let started = tokio::time::Instant::now();

        extract(&source, 1, 3, Duration::from_secs(2)).await;

        assert!(started.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test]
    async fn extracts_one_record_per_mocked_page() {
        let server = MockServer::start();
        for path in ["/", "/page2", "/page3"] {
            server.mock(|when, then| {
                when.method(GET).path(path);
                then.status(200).body(SINGLE_PRODUCT_PAGE);
            });
        }
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(test_config(server.url("/"), dir.path()));

        let raw = pipeline.extract(1, 3).await.unwrap();

        assert_eq!(raw.len(), 3);
        assert!(raw.iter().all(|p| p.title == "Test Product" && p.price == "$10"));
    }

    #[tokio::test]
    async fn run_loads_deduplicated_products_into_every_sink() {
        let server = MockServer::start();
        for path in ["/", "/page2"] {
            server.mock(|when, then| {
                when.method(GET).path(path);
                then.status(200).body(SINGLE_PRODUCT_PAGE);
            });
        }
        server.mock(|when, then| {
            when.method(GET).path("/page3");
            then.status(503);
        });
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(server.url("/"), dir.path());

        let stats = Pipeline::new(config.clone()).run(1, 3).await.unwrap();

        assert_eq!(stats.pages, 3);
        assert_eq!(stats.raw_records, 2);
        assert_eq!(stats.products, 1);
        assert_eq!(stats.sink_failures, 0);

        let csv = std::fs::read_to_string(&config.load.csv_path).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.contains("Test Product,160000.0,4.5,0,M,Unisex,"));

        let repo = crate::storage::Repository::open(&config.load.db_path).unwrap();
        assert_eq!(repo.product_count(&config.load.table_name).unwrap(), 1);
    }

    #[tokio::test]
    async fn run_loads_other_sinks_when_sheets_setup_fails() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).body(SINGLE_PRODUCT_PAGE);
        });
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(server.url("/"), dir.path());
        config.load.sheets.spreadsheet_id = Some("id".into());
        config.load.sheets.access_token = Some("tok".into());
        config.load.sheets.api_base = "not a url".into();

        let stats = Pipeline::new(config.clone()).run(1, 1).await.unwrap();

        assert_eq!(stats.products, 1);
        assert_eq!(stats.sink_failures, 1);
        assert!(config.load.csv_path.exists());
        let repo = crate::storage::Repository::open(&config.load.db_path).unwrap();
        assert_eq!(repo.product_count(&config.load.table_name).unwrap(), 1);
    }
}

//! Spreadsheet sink: overwrite a range through the Sheets v4 values API.
//!
//! The bearer token comes from configuration; this crate never runs an
//! OAuth flow.

use super::LoadSink;
use crate::config::SheetsConfig;
use crate::models::{COLUMNS, CleanedProduct};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::info;
use url::Url;

pub const SINK_NAME: &str = "google-sheets";

pub struct SheetsSink {
    client: reqwest::Client,
    endpoint: Url,
    range: String,
    access_token: String,
}

impl SheetsSink {
    pub fn new(config: &SheetsConfig) -> Result<Self> {
        let spreadsheet_id = config
            .spreadsheet_id
            .as_deref()
            .ok_or_else(|| anyhow!("spreadsheet_id is not set"))?;
        let access_token = config
            .access_token
            .clone()
            .ok_or_else(|| anyhow!("access_token is not set"))?;

        let mut endpoint = Url::parse(&config.api_base)
            .with_context(|| format!("Invalid Sheets API base {:?}", config.api_base))?;
        endpoint
            .path_segments_mut()
            .map_err(|_| anyhow!("Sheets API base cannot hold a path"))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", config.range.as_str()]);
        endpoint.query_pairs_mut().append_pair("valueInputOption", "RAW");

        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .context("Failed to build HTTP client")?,
            endpoint,
            range: config.range.clone(),
            access_token,
        })
    }
}

/// Header row followed by one row per product.
pub fn to_values(products: &[CleanedProduct]) -> Vec<Vec<Value>> {
    let header = COLUMNS.iter().map(|c| json!(c)).collect();
    std::iter::once(header)
        .chain(products.iter().map(|p| {
            vec![
                json!(p.title),
                json!(p.price),
                json!(p.rating),
                json!(p.colors),
                json!(p.size),
                json!(p.gender),
                json!(p.timestamp.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            ]
        }))
        .collect()
}

#[async_trait]
impl LoadSink for SheetsSink {
    fn name(&self) -> &str {
        SINK_NAME
    }

    async fn load(&self, products: &[CleanedProduct]) -> Result<usize> {
        let body = json!({
            "range": self.range,
            "majorDimension": "ROWS",
            "values": to_values(products),
        });

        let resp = self
            .client
            .put(self.endpoint.clone())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .context("Sheets request failed")?
            .error_for_status()
            .context("Sheets API rejected the update")?;

        let result: Value = resp.json().await.context("Unreadable Sheets response")?;
        let cells = result.get("updatedCells").and_then(Value::as_u64).unwrap_or(0);
        info!("{}: {} cells updated", self.range, cells);

        Ok(products.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::capture_time;
    use httpmock::prelude::*;

    fn product() -> CleanedProduct {
        CleanedProduct {
            title: "Jacket 1".into(),
            price: 800_000.0,
            rating: 4.2,
            colors: 2,
            size: "L".into(),
            gender: "Men".into(),
            timestamp: capture_time(),
        }
    }

    fn config(api_base: String) -> SheetsConfig {
        SheetsConfig {
            spreadsheet_id: Some("sheet-id".into()),
            range: "Sheet1!A1".into(),
            access_token: Some("token".into()),
            api_base,
        }
    }

    #[test]
    fn values_start_with_header() {
        let values = to_values(&[product()]);
        assert_eq!(values.len(), 2);
        assert_eq!(values[0][0], json!("Title"));
        assert_eq!(values[0][6], json!("Timestamp"));
        assert_eq!(values[1][0], json!("Jacket 1"));
        assert_eq!(values[1][3], json!(2));
    }

    #[tokio::test]
    async fn puts_values_with_bearer_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/v4/spreadsheets/sheet-id/values/Sheet1!A1")
                .query_param("valueInputOption", "RAW")
                .header("authorization", "Bearer token");
            then.status(200).json_body(json!({ "updatedCells": 14 }));
        });

        let sink = SheetsSink::new(&config(server.base_url())).unwrap();
        let n = sink.load(&[product()]).await.unwrap();

        mock.assert();
        assert_eq!(n, 1);
    }

    #[tokio::test]
    async fn api_error_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT);
            then.status(403).json_body(json!({ "error": { "code": 403 } }));
        });

        let sink = SheetsSink::new(&config(server.base_url())).unwrap();
        assert!(sink.load(&[product()]).await.is_err());
    }

    #[test]
    fn requires_id_and_token() {
        let mut cfg = config("https://sheets.googleapis.com".into());
        cfg.access_token = None;
        assert!(SheetsSink::new(&cfg).is_err());
    }
}

use crate::parser::{
    ParseError, parse_city_rows, parse_leaf_rows, parse_province_rows, parse_publish_records,
};
use crate::policy;
use crate::types::{Province, PublishRecord};

use chardetng::EncodingDetector;
use reqwest::blocking::Client;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
}

pub struct WebScraper {
    client: Client,
    index_url: String,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        Self::with_index_url(crate::INDEX_URL)
    }

    pub fn with_index_url(index_url: impl Into<String>) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            index_url: index_url.into(),
        })
    }

    pub fn index_url(&self) -> &str {
        &self.index_url
    }

    // The source serves GB2312 with an unreliable Content-Type, so the
    // charset is sniffed from the bytes instead of trusting the header.
    pub fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        let bytes = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .bytes()?;
        log::info!("fetched {url} ({} bytes)", bytes.len());
        Ok(decode_body(&bytes))
    }

    pub fn fetch_publish_records(&self) -> Result<Vec<PublishRecord>, ScraperError> {
        let html = self.fetch_html(&self.index_url)?;
        let records = parse_publish_records(&html, &self.index_url)?;
        Ok(records)
    }

    // Sequential depth-first descent: provinces from the entry page,
    // cities per province, counties or towns per city. Document order is
    // preserved at every level; the first failure aborts the whole crawl.
    pub fn crawl(&self, prefix_url: &str) -> Result<Vec<Province>, ScraperError> {
        let html = self.fetch_html(prefix_url)?;
        let mut provinces = parse_province_rows(&html, prefix_url)?;

        for province in &mut provinces {
            let html = self.fetch_html(&province.link)?;
            province.cities = parse_city_rows(&html, prefix_url)?;

            for city in &mut province.cities {
                let level = policy::leaf_level(&city.name);
                let html = self.fetch_html(&city.link)?;
                city.counties = parse_leaf_rows(&html, prefix_url, level)?;
            }
            log::info!(
                "province {} ({}): {} cities",
                province.name,
                province.code,
                province.cities.len()
            );
        }

        Ok(provinces)
    }
}

// UTF-8 fast path, then charset sniffing for the GB2312/GBK pages.
fn decode_body(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::warn!("lossy decode as {}", encoding.name());
    }
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_body_passes_utf8_through() {
        let text = "<html>北京市</html>";
        assert_eq!(decode_body(text.as_bytes()), text);
    }

    #[test]
    fn test_decode_body_sniffs_gbk() {
        let (gbk, _, _) = encoding_rs::GBK.encode("<html><body>统计用区划代码 北京市</body></html>");
        let decoded = decode_body(&gbk);
        assert!(decoded.contains("北京市"));
        assert!(decoded.contains("统计用区划代码"));
    }
}

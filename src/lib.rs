pub mod export;
pub mod flatten;
pub mod parser;
pub mod policy;
pub mod scraper;
pub mod types;

pub use scraper::WebScraper;

// Index page listing one entry per data release, newest first.
pub const INDEX_URL: &str = "http://www.stats.gov.cn/tjsj/tjbz/tjyqhdmhcxhfdm/";

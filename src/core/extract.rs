use crate::domain::model::{RawRecord, RawTable};
use crate::domain::ports::Fetch;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/96.0.4664.110 Safari/537.36";

/// Thin HTTP adapter: one GET per call with a browser-like User-Agent.
/// Non-2xx statuses are reported as errors like any transport failure.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes().await?.to_vec())
    }
}

fn selector(source: &str) -> Result<Selector> {
    Selector::parse(source).map_err(|_| EtlError::SelectorError {
        selector: source.to_string(),
    })
}

struct Selectors {
    card: Selector,
    details: Selector,
    title: Selector,
    price: Selector,
    line: Selector,
    next: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            card: selector("div.collection-card")?,
            details: selector("div.product-details")?,
            title: selector("h3.product-title")?,
            price: selector("div.price-container span.price")?,
            line: selector("p")?,
            next: selector("li.next")?,
        })
    }
}

/// One parsed listing page: the extracted records plus whether the page
/// carried a next-page marker.
pub struct ParsedPage {
    pub records: Vec<RawRecord>,
    pub has_next: bool,
}

/// Extracts product records from listing-page markup.
pub struct CardParser {
    selectors: Selectors,
}

impl CardParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            selectors: Selectors::new()?,
        })
    }

    pub fn parse(&self, html: &[u8]) -> ParsedPage {
        let document = Html::parse_document(&String::from_utf8_lossy(html));

        let records = document
            .select(&self.selectors.card)
            .map(|card| self.parse_card(card))
            .collect();

        let has_next = document.select(&self.selectors.next).next().is_some();

        ParsedPage { records, has_next }
    }

    /// Extracts one card. A card without a details block yields an EMPTY
    /// record (no keys at all); a details block with missing sub-fields
    /// yields a record with every key and null values where absent. The
    /// two cases are deliberately distinct.
    fn parse_card(&self, card: ElementRef<'_>) -> RawRecord {
        let mut record = RawRecord::new();

        let details = match card.select(&self.selectors.details).next() {
            Some(details) => details,
            None => return record,
        };

        let title = details
            .select(&self.selectors.title)
            .next()
            .map(|el| node_text(el));

        let price = details
            .select(&self.selectors.price)
            .next()
            .map(|el| node_text(el));

        let mut rating = None;
        let mut colors = None;
        let mut size = None;
        let mut gender = None;

        // Descriptive lines are label:value pairs classified by substring
        // match; the branch order decides ties within one line, later
        // lines overwrite earlier matches of the same label.
        for line in details.select(&self.selectors.line) {
            let text = node_text(line);
            let lower = text.to_lowercase();
            if lower.contains("rating") {
                rating = Some(after_colon(&text).to_string());
            } else if lower.contains("color") {
                colors = Some(text.clone());
            } else if lower.contains("size") {
                size = Some(after_colon(&text).to_uppercase());
            } else if lower.contains("gender") {
                gender = Some(after_colon(&text).to_lowercase());
            }
        }

        record.set("title", title);
        record.set("price", price);
        record.set("rating", rating);
        record.set("colors", colors);
        record.set("size", size);
        record.set("gender", gender);
        record.set("timestamp", Some(Local::now().to_rfc3339()));
        record
    }
}

fn node_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Value part of a `label: value` line; the whole line when no colon.
fn after_colon(text: &str) -> &str {
    match text.split_once(':') {
        Some((_, value)) => value.trim(),
        None => text.trim(),
    }
}

/// Walks the paginated listing, page by page, until the site stops
/// advertising a next page or a page fails to load. Strictly sequential:
/// one request in flight, a fixed pause between successful pages.
pub struct Scraper<F: Fetch> {
    fetcher: F,
    parser: CardParser,
    delay: Duration,
    max_pages: Option<u32>,
}

impl<F: Fetch> Scraper<F> {
    pub fn new(fetcher: F, delay: Duration) -> Result<Self> {
        Ok(Self {
            fetcher,
            parser: CardParser::new()?,
            delay,
            max_pages: None,
        })
    }

    /// Optional safety cap on the number of pages visited. The site's
    /// next-marker is the only stop signal otherwise, and a marker that
    /// never disappears would loop forever.
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn page_url(base_url: &str, page: u32) -> String {
        if page == 1 {
            base_url.to_string()
        } else {
            format!("{}/page{}", base_url.trim_end_matches('/'), page)
        }
    }

    /// Scrapes every page starting from `base_url`. Never fails: a fetch
    /// error or an empty page ends the walk and whatever was accumulated
    /// up to that point is returned.
    pub async fn scrape_all(&self, base_url: &str) -> RawTable {
        let mut all_records = Vec::new();
        let mut page: u32 = 1;

        loop {
            let url = Self::page_url(base_url, page);
            tracing::info!(page, url = %url, "Scraping page");

            let html = match self.fetcher.fetch(&url).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(page, error = %e, "Failed to fetch page, stopping");
                    break;
                }
            };

            let parsed = self.parser.parse(&html);
            if parsed.records.is_empty() {
                tracing::info!(page, "No more products found");
                break;
            }
            all_records.extend(parsed.records);

            if let Some(cap) = self.max_pages {
                if page >= cap {
                    tracing::info!(page, cap, "Reached page cap, stopping");
                    break;
                }
            }

            if parsed.has_next {
                page += 1;
                tokio::time::sleep(self.delay).await;
            } else {
                tracing::info!(page, "No more pages");
                break;
            }
        }

        tracing::info!(records = all_records.len(), "Scrape finished");
        all_records
    }

    /// Extracts the products of a single page, without pagination.
    pub async fn scrape_page(&self, url: &str) -> RawTable {
        match self.fetcher.fetch(url).await {
            Ok(html) => self.parser.parse(&html).records,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to fetch page");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> CardParser {
        CardParser::new().unwrap()
    }

    const FULL_CARD: &str = r#"
        <div class="collection-card">
          <div class="product-details">
            <h3 class="product-title">Premium Jacket</h3>
            <div class="price-container"><span class="price">Rp 499.000</span></div>
            <p>Rating: 4.8/5</p>
            <p>Colors: Black, Navy</p>
            <p>Size: XL</p>
            <p>Gender: Male</p>
          </div>
        </div>"#;

    #[test]
    fn parses_complete_card() {
        let page = parser().parse(FULL_CARD.as_bytes());
        assert_eq!(page.records.len(), 1);

        let record = &page.records[0];
        assert_eq!(record.get("title"), Some("Premium Jacket"));
        assert_eq!(record.get("price"), Some("Rp 499.000"));
        assert_eq!(record.get("rating"), Some("4.8/5"));
        assert_eq!(record.get("colors"), Some("Colors: Black, Navy"));
        assert_eq!(record.get("size"), Some("XL"));
        assert_eq!(record.get("gender"), Some("male"));
        assert!(record.get("timestamp").is_some());
    }

    #[test]
    fn partial_card_keeps_null_fields() {
        let html = r#"
            <div class="collection-card">
              <div class="product-details">
                <h3 class="product-title">Basic T-Shirt</h3>
                <div class="price-container"><span class="price">Rp 149.000</span></div>
              </div>
            </div>"#;

        let page = parser().parse(html.as_bytes());
        let record = &page.records[0];

        assert_eq!(record.get("title"), Some("Basic T-Shirt"));
        assert_eq!(record.get("price"), Some("Rp 149.000"));
        // Missing descriptive lines: keys present, values null.
        assert!(record.has_column("rating"));
        assert_eq!(record.get("rating"), None);
        assert!(record.has_column("gender"));
        assert_eq!(record.get("gender"), None);
    }

    #[test]
    fn card_without_details_block_is_an_empty_record() {
        let html = r#"<div class="collection-card"><p>Rating: 4.0/5</p></div>"#;
        let page = parser().parse(html.as_bytes());

        assert_eq!(page.records.len(), 1);
        assert!(page.records[0].is_empty());
        assert!(!page.records[0].has_column("timestamp"));
    }

    #[test]
    fn first_matching_label_wins_within_a_line() {
        // "Rating" outranks "color" even though both substrings appear.
        let html = r#"
            <div class="collection-card">
              <div class="product-details">
                <p>Rating color: 3.5/5</p>
              </div>
            </div>"#;

        let page = parser().parse(html.as_bytes());
        let record = &page.records[0];
        assert_eq!(record.get("rating"), Some("3.5/5"));
        assert_eq!(record.get("colors"), None);
    }

    #[test]
    fn line_without_colon_keeps_whole_text_as_value() {
        let html = r#"
            <div class="collection-card">
              <div class="product-details">
                <p>Size M gender unisex rating high</p>
              </div>
            </div>"#;

        // "rating" matches first; no colon, so the whole line is the value.
        let page = parser().parse(html.as_bytes());
        let record = &page.records[0];
        assert_eq!(record.get("rating"), Some("Size M gender unisex rating high"));
    }

    #[test]
    fn detects_next_marker() {
        let with_next = format!("{}<li class=\"next\"><a href=\"/page2\"></a></li>", FULL_CARD);
        assert!(parser().parse(with_next.as_bytes()).has_next);
        assert!(!parser().parse(FULL_CARD.as_bytes()).has_next);
    }

    #[test]
    fn page_url_building() {
        assert_eq!(
            Scraper::<HttpFetcher>::page_url("https://shop.example.com/", 1),
            "https://shop.example.com/"
        );
        assert_eq!(
            Scraper::<HttpFetcher>::page_url("https://shop.example.com/", 2),
            "https://shop.example.com/page2"
        );
        assert_eq!(
            Scraper::<HttpFetcher>::page_url("https://shop.example.com", 3),
            "https://shop.example.com/page3"
        );
    }
}

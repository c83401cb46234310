use fashion_etl::config::{AppConfig, CsvConfig, ScrapeConfig, TransformConfig};
use fashion_etl::EtlEngine;
use httpmock::prelude::*;
use tempfile::TempDir;

fn listing_page(cards: &str, with_next: bool) -> String {
    let next = if with_next {
        r##"<li class="next"><a href="#">Next</a></li>"##
    } else {
        ""
    };
    format!("<html><body>{cards}{next}</body></html>")
}

fn product_card(title: &str, price: &str, rating: &str) -> String {
    format!(
        r#"<div class="collection-card">
             <div class="product-details">
               <h3 class="product-title">{title}</h3>
               <div class="price-container"><span class="price">{price}</span></div>
               <p>Rating: {rating}</p>
               <p>Colors: 3</p>
               <p>Size: M</p>
               <p>Gender: Unisex</p>
             </div>
           </div>"#
    )
}

fn config(base_url: String, csv_path: String) -> AppConfig {
    AppConfig {
        scrape: ScrapeConfig {
            base_url,
            delay_ms: 0,
            max_pages: None,
        },
        transform: TransformConfig::default(),
        csv: Some(CsvConfig { path: csv_path }),
        sheets: None,
        database: None,
    }
}

#[tokio::test]
async fn end_to_end_scrape_clean_and_write_csv() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("products.csv");

    let server = MockServer::start();
    let page1 = server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).header("Content-Type", "text/html").body(
            listing_page(
                &format!(
                    "{}{}",
                    product_card("Cool Shirt", "Rp 100.000", "4.5/5"),
                    // Tombstone title, must not survive cleaning.
                    product_card("Unknown Product", "Rp 50.000", "4.0/5"),
                ),
                true,
            ),
        );
    });
    let page2 = server.mock(|when, then| {
        when.method(GET).path("/page2");
        then.status(200).header("Content-Type", "text/html").body(
            listing_page(&product_card("Warm Jacket", "Rp 250.000", "4.8/5"), false),
        );
    });

    let engine = EtlEngine::new(config(
        server.url("/"),
        csv_path.to_str().unwrap().to_string(),
    ));
    let table = engine.run().await.unwrap();

    page1.assert();
    page2.assert();

    // Three cards scraped, one dropped by the pipeline, order preserved.
    assert_eq!(table.len(), 2);
    assert_eq!(table[0].title, "Cool Shirt");
    assert_eq!(table[0].price, 100.0 * 16000.0);
    assert_eq!(table[0].rating, 4.5);
    assert_eq!(table[0].colors, 3);
    assert_eq!(table[0].size, "M");
    assert_eq!(table[0].gender, "unisex");
    assert_eq!(table[1].title, "Warm Jacket");
    assert_eq!(table[1].price, 250.0 * 16000.0);

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("title,price,rating,colors,size,gender,timestamp")
    );
    assert!(lines.next().unwrap().starts_with("Cool Shirt,1600000.0,4.5,3,M,unisex,"));
    assert!(lines.next().unwrap().starts_with("Warm Jacket,4000000.0,4.8,3,M,unisex,"));
    assert_eq!(lines.next(), None);
}

#[tokio::test]
async fn failed_scrape_still_produces_an_empty_csv() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("products.csv");

    let server = MockServer::start();
    let failing = server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(503);
    });

    let engine = EtlEngine::new(config(
        server.url("/"),
        csv_path.to_str().unwrap().to_string(),
    ));
    let table = engine.run().await.unwrap();

    failing.assert();
    assert!(table.is_empty());

    // Log-and-continue policy: the sink still ran and wrote a header.
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(
        csv.trim_end(),
        "title,price,rating,colors,size,gender,timestamp"
    );
}

#[tokio::test]
async fn cards_without_details_blocks_are_scraped_then_dropped() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("products.csv");

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).header("Content-Type", "text/html").body(
            listing_page(
                &format!(
                    r#"<div class="collection-card"><p>bare card</p></div>{}"#,
                    product_card("Real Item", "Rp 75.000", "3.9/5"),
                ),
                false,
            ),
        );
    });

    let engine = EtlEngine::new(config(
        server.url("/"),
        csv_path.to_str().unwrap().to_string(),
    ));
    let table = engine.run().await.unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table[0].title, "Real Item");
}

//! Screenshot scraping from store listings

use chrono::Utc;
use scraper::{Html, Selector};
use tracing::{error, info, warn};
use url::Url;

use crate::clients::{HttpFetcher, SourceLocation};
use crate::constants::SCREENSHOT_SELECTOR;
use crate::db::Storage;
use crate::error::AdforgeError;

/// Screenshot image URLs on a Play Store listing, in page order.
/// Protocol-relative sources become https; sources that aren't web URLs
/// are skipped.
pub fn screenshot_urls(html: &str) -> Result<Vec<Url>, AdforgeError> {
    let selector = Selector::parse(SCREENSHOT_SELECTOR)
        .map_err(|err| AdforgeError::Scrape(err.to_string()))?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .filter_map(|elem| elem.value().attr("src"))
        .filter(|src| !src.trim().is_empty())
        .filter_map(|src| match SourceLocation::parse(src) {
            Ok(SourceLocation::Remote(url)) => Some(url),
            Ok(SourceLocation::Stored(_)) => {
                warn!("Skipping screenshot source {:?}, not a web URL", src);
                None
            }
            Err(err) => {
                warn!("Skipping screenshot source {:?}: {}", src, err);
                None
            }
        })
        .collect())
}

/// Filename for the `index`th screenshot scraped at `millis`.
pub fn screenshot_filename(millis: i64, index: usize) -> String {
    format!("screenshot_{millis}_{index}.jpg")
}

/// Downloads every screenshot on the listing at `page_url` into the
/// `screenshots` table, returning the filenames stored. Individual image
/// failures are logged and skipped.
pub async fn scrape_screenshots(
    client: &reqwest::Client,
    storage: &Storage,
    page_url: &str,
) -> Result<Vec<String>, AdforgeError> {
    let resp = client.get(page_url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(AdforgeError::Network(format!(
            "Failed to fetch {page_url}: {status}"
        )));
    }
    let html = resp.text().await?;
    let urls = screenshot_urls(&html)?;
    info!("Found {} screenshots on {}", urls.len(), page_url);

    let fetcher = HttpFetcher::new(client.clone());
    let mut stored = Vec::new();
    for (index, url) in urls.into_iter().enumerate() {
        let filename = screenshot_filename(Utc::now().timestamp_millis(), index);
        let result = async {
            let data = fetcher.download(url.clone()).await?;
            storage.insert_screenshot(&filename, data).await
        }
        .await;
        match result {
            Ok(()) => stored.push(filename),
            Err(err) => error!("Error storing screenshot {}: {}", url, err),
        }
    }
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <img alt="Icon image" src="https://play-lh.googleusercontent.com/icon">
          <div>
            <img alt="Screenshot image" src="//play-lh.googleusercontent.com/one=w526">
            <img alt="Screenshot image" src="https://play-lh.googleusercontent.com/two=w526">
            <img alt="Screenshot image">
            <img alt="Screenshot image" src="">
          </div>
        </body></html>
    "#;

    #[test]
    fn finds_screenshots_only() {
        assert_eq!(
            screenshot_urls(LISTING).expect("parse"),
            vec![
                Url::parse("https://play-lh.googleusercontent.com/one=w526").expect("url"),
                Url::parse("https://play-lh.googleusercontent.com/two=w526").expect("url"),
            ]
        );
    }

    #[test]
    fn pages_without_screenshots_are_empty() {
        assert!(
            screenshot_urls("<html><body><p>nothing</p></body></html>")
                .expect("parse")
                .is_empty()
        );
    }

    #[test]
    fn sources_that_are_not_web_urls_are_skipped() {
        let html = r#"
            <img alt="Screenshot image" src="data:image/png;base64,AAAA">
            <img alt="Screenshot image" src="stored:shot.jpg">
            <img alt="Screenshot image" src="//cdn.example.org/x.jpg">
        "#;
        assert_eq!(
            screenshot_urls(html).expect("parse"),
            vec![Url::parse("https://cdn.example.org/x.jpg").expect("url")]
        );
    }

    #[test]
    fn filenames_include_the_index() {
        assert_eq!(
            screenshot_filename(1_700_000_000_000, 3),
            "screenshot_1700000000000_3.jpg"
        );
    }
}

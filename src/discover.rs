use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use crate::fetch::{Fetch, FetchError};

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Fetch the entry page of a site and return the same-site links on it.
pub async fn discover_links<F: Fetch + ?Sized>(
    fetcher: &F,
    root: &Url,
) -> Result<Vec<Url>, FetchError> {
    let html = fetcher.fetch_html(root).await?;
    Ok(extract_links(&html, root))
}

/// Resolve every `<a href>` against `root` and keep those with the same
/// origin (scheme, host and port). Fragments are dropped, duplicates
/// collapsed, first occurrence order kept.
pub fn extract_links(html: &str, root: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let origin = root.origin();
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(mut url) = root.join(href.trim()) else {
            continue;
        };
        if url.origin() != origin {
            continue;
        }
        url.set_fragment(None);
        if seen.insert(url.clone()) {
            links.push(url);
        }
    }

    links
}

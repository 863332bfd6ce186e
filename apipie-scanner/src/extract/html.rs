//! Structural extraction over a parsed HTML page.
//!
//! Unlike the script extractors these read the DOM, so they take a
//! `scraper::Html` document and the page URL every relative value is joined
//! against. Values that cannot be joined are dropped.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

static FORM_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("form[action]").unwrap());
static DATA_URL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("[data-url]").unwrap());
static DATA_ENDPOINT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-endpoint]").unwrap());
static SCRIPT_SRC_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("script[src]").unwrap());
static INLINE_SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script:not([src])").unwrap());
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

fn join(page_url: &Url, value: &str) -> Option<String> {
    page_url.join(value.trim()).ok().map(|url| url.to_string())
}

/// `(action, METHOD)` for every form with an action attribute.
pub fn extract_forms(document: &Html, page_url: &Url) -> Vec<(String, String)> {
    document
        .select(&FORM_SELECTOR)
        .filter_map(|form| {
            let action = form.value().attr("action")?;
            let method = form
                .value()
                .attr("method")
                .map(|m| m.trim().to_uppercase())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "GET".to_string());
            Some((join(page_url, action)?, method))
        })
        .collect()
}

/// Values of `data-url` then `data-endpoint` attributes. `data-href` is
/// navigation and is not read.
pub fn extract_data_urls(document: &Html, page_url: &Url) -> Vec<String> {
    let urls = document
        .select(&DATA_URL_SELECTOR)
        .filter_map(|el| el.value().attr("data-url"));
    let endpoints = document
        .select(&DATA_ENDPOINT_SELECTOR)
        .filter_map(|el| el.value().attr("data-endpoint"));

    urls.chain(endpoints)
        .filter_map(|value| join(page_url, value))
        .collect()
}

/// External script URLs in document order.
pub fn extract_script_srcs(document: &Html, page_url: &Url) -> Vec<String> {
    document
        .select(&SCRIPT_SRC_SELECTOR)
        .filter_map(|el| el.value().attr("src"))
        .filter(|src| !src.trim().is_empty())
        .filter_map(|src| join(page_url, src))
        .collect()
}

/// Bodies of inline scripts, skipping empty ones.
pub fn extract_inline_js(document: &Html) -> Vec<String> {
    document
        .select(&INLINE_SCRIPT_SELECTOR)
        .map(|el| el.text().collect::<String>())
        .filter(|body| !body.trim().is_empty())
        .collect()
}

/// Anchor targets with query and fragment removed.
pub fn extract_links(document: &Html, page_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    for element in document.select(&LINK_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.is_empty()
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
            || href.starts_with('#')
        {
            continue;
        }

        if let Ok(mut url) = page_url.join(href) {
            url.set_query(None);
            url.set_fragment(None);
            links.push(url.to_string());
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://example.com/shop/index.html";

    fn page() -> Url {
        Url::parse(PAGE).unwrap()
    }

    #[test]
    fn test_forms_default_to_get() {
        let doc = Html::parse_document(
            r#"<form action="/search"><input name="q"></form>
               <form action="api/login" method="post"></form>
               <form><input></form>"#,
        );
        let forms = extract_forms(&doc, &page());
        assert_eq!(
            forms,
            vec![
                ("https://example.com/search".to_string(), "GET".to_string()),
                ("https://example.com/shop/api/login".to_string(), "POST".to_string()),
            ]
        );
    }

    #[test]
    fn test_data_attributes() {
        let doc = Html::parse_document(
            r#"<div data-url="/api/cart"></div>
               <button data-endpoint="https://api.example.com/v1/buy"></button>
               <a data-href="/about">About</a>"#,
        );
        assert_eq!(
            extract_data_urls(&doc, &page()),
            vec!["https://example.com/api/cart", "https://api.example.com/v1/buy"]
        );
    }

    #[test]
    fn test_scripts_split_external_and_inline() {
        let doc = Html::parse_document(
            r#"<html><head>
                 <script src="/static/app.js"></script>
                 <script src="vendor.js"></script>
                 <script>fetch("/api/inline")</script>
                 <script>   </script>
               </head></html>"#,
        );
        assert_eq!(
            extract_script_srcs(&doc, &page()),
            vec!["https://example.com/static/app.js", "https://example.com/shop/vendor.js"]
        );
        let inline = extract_inline_js(&doc);
        assert_eq!(inline.len(), 1);
        assert!(inline[0].contains("/api/inline"));
    }

    #[test]
    fn test_links_are_stripped_and_filtered() {
        let doc = Html::parse_document(
            r##"<a href="/items?sort=asc#top">Items</a>
                <a href="about">About</a>
                <a href="#main">Skip</a>
                <a href="mailto:hi@example.com">Mail</a>
                <a href="tel:123">Call</a>
                <a href="javascript:void(0)">Nothing</a>
                <a href="https://other.example.org/x">Away</a>"##,
        );
        assert_eq!(
            extract_links(&doc, &page()),
            vec![
                "https://example.com/items",
                "https://example.com/shop/about",
                "https://other.example.org/x",
            ]
        );
    }

    #[test]
    fn test_broken_markup_is_best_effort() {
        let doc = Html::parse_document(r#"<div><a href="/ok">x<form action="/f""#);
        assert_eq!(extract_links(&doc, &page()), vec!["https://example.com/ok"]);
    }
}

use super::Extractor;
use crate::model::Hit;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

// "https://host/some/path"
static ABSOLUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)[`"'](https?://[^`"'\s<>{}]+/[a-zA-Z0-9_./-]+)[`"']"#).unwrap()
});

// "/prefix/api/..." style relative paths with an API segment below the first one
static RELATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)[`"']((?:/[a-zA-Z0-9_.-]+)+/(?:api|v\d+|rest|oauth|token|auth|graphql|rpc|endpoints?|services?|query|mutation)/[^`"'\s{}<>]*)[`"']"#,
    )
    .unwrap()
});

static STATIC_EXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\.(?:js|css|html|htm|png|jpg|jpeg|gif|svg|ico|woff2?|ttf|eot|map|pdf|docx?|zip|tar|gz)(?:[?#]|$)",
    )
    .unwrap()
});

static NOISE_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://[^/]+/(?:static|assets|public|dist)/").unwrap());

/// Ad networks, CDNs, trackers and standards bodies that show up in bundles
/// but never host the application's API.
const NOISE_DOMAINS: &[&str] = &[
    "www.google.com",
    "google.com",
    "pagead2.googlesyndication.com",
    "adservice.google.com",
    "www.googleadservices.com",
    "googleadservices.com",
    "googleads.g.doubleclick.net",
    "ad.doubleclick.net",
    "stats.g.doubleclick.net",
    "www.googletagmanager.com",
    "googletagmanager.com",
    "www.facebook.com",
    "connect.facebook.net",
    "www.youtube.com",
    "youtu.be",
    "i.ytimg.com",
    "cdn.jsdelivr.net",
    "unpkg.com",
    "cdnjs.cloudflare.com",
    "addons.mozilla.org",
    "chrome.google.com",
    "www.w3.org",
    "w3.org",
    "get.adobe.com",
];

fn is_noise_domain(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
        .is_some_and(|host| NOISE_DOMAINS.contains(&host.as_str()))
}

/// Literal URL and path scraping with no call-site context.
pub struct PathExtractor;

impl Extractor for PathExtractor {
    fn name(&self) -> &'static str {
        "paths"
    }

    fn extract(&self, js: &str) -> Vec<Hit> {
        let mut hits = Vec::new();

        for caps in ABSOLUTE_RE.captures_iter(js) {
            let url = &caps[1];
            if STATIC_EXT_RE.is_match(url) || is_noise_domain(url) || NOISE_PATH_RE.is_match(url) {
                continue;
            }
            hits.push(Hit::rest(url, None));
        }

        for caps in RELATIVE_RE.captures_iter(js) {
            let path = &caps[1];
            if STATIC_EXT_RE.is_match(path) {
                continue;
            }
            hits.push(Hit::rest(path, None));
        }

        hits
    }
}

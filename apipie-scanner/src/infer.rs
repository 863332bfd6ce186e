//! Guessing an HTTP method from path vocabulary.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static DELETE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(delete|remove|destroy|purge|revoke|unsubscribe)\b").unwrap());

static PATCH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(update|edit|patch|modify|change|rename)\b").unwrap());

static POST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(send|create|add|submit|login|signin|signup|register|upload|save|generate|otp|verify|validate|authenticate|token|captcha|push|notify|invite|assign|import|enable|disable|reset|activate|deactivate|confirm|checkout|subscribe|search|query)\b",
    )
    .unwrap()
});

/// Infer a method for `url` (absolute URL or bare path).
///
/// Categories are checked in order DELETE, PATCH, POST and the first match
/// wins; GET otherwise.
pub fn infer_method(url: &str) -> &'static str {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split('?').next().unwrap_or(url).to_string(),
    };

    let words = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();

    if DELETE_RE.is_match(&words) {
        "DELETE"
    } else if PATCH_RE.is_match(&words) {
        "PATCH"
    } else if POST_RE.is_match(&words) {
        "POST"
    } else {
        "GET"
    }
}

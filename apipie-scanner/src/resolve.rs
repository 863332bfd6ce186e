//! Turning raw candidate strings into comparable absolute URLs.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::collections::BTreeMap;
use url::Url;

/// Marker every template placeholder is rewritten to.
pub const PARAM_MARKER: &str = "{param}";
const PARAM_MARKER_ENCODED: &str = "%7Bparam%7D";

pub const GRAPHQL_SENTINEL: &str = "__graphql__";
pub const JSONRPC_SENTINEL: &str = "__jsonrpc__";
pub const TRPC_SENTINEL: &str = "__trpc__";
pub const SOCKETIO_SENTINEL: &str = "__socketio__";

static TEMPLATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{[^}]+\}|\{\{[^}]+\}\}|\{[^}]+\}").unwrap());

static API_SIGNAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)/(?:api|v\d+|rest|graphql|rpc|oauth|token|auth|endpoints?|services?|query|mutation)(?:/|$)",
    )
    .unwrap()
});

static API_HOST_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(?:^|\.)api[.\-]|[.\-]api\.").unwrap());

/// True when nothing but placeholders (and slashes) remains once they are removed.
pub fn is_template_only(raw: &str) -> bool {
    let stripped = TEMPLATE_RE.replace_all(raw, "");
    matches!(stripped.as_ref(), "" | "/" | "//")
}

/// Replace every `${..}`, `{{..}}` and `{..}` span with `{param}`.
pub fn clean_templates(raw: &str) -> String {
    TEMPLATE_RE.replace_all(raw, NoExpand(PARAM_MARKER)).into_owned()
}

/// Map an extractor sentinel to its conventional path. Other input is returned as is.
pub fn resolve_sentinel(raw: &str) -> &str {
    match raw {
        GRAPHQL_SENTINEL => "/graphql",
        JSONRPC_SENTINEL => "/jsonrpc",
        TRPC_SENTINEL => "/api/trpc",
        SOCKETIO_SENTINEL => "/socket.io",
        other => other,
    }
}

/// Resolve a raw candidate to an absolute http(s) URL.
///
/// Absolute URLs pass through untouched. Root-relative paths resolve against
/// `base_url`, anything else against `source_url`, the page or script the
/// text came from. Protocol-relative input is rejected.
pub fn resolve(raw: &str, base_url: &str, source_url: &str) -> Option<String> {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    if raw.starts_with("//") {
        return None;
    }

    let joined = if raw.starts_with('/') {
        Url::parse(base_url).ok()?.join(raw).ok()?
    } else {
        directory_base(Url::parse(source_url).ok()?).join(raw).ok()?
    };

    if !matches!(joined.scheme(), "http" | "https") {
        return None;
    }
    Some(restore_placeholders(joined.as_str()))
}

/// Treat an extension-less last segment as a directory so relative joins
/// land beneath it rather than next to it.
fn directory_base(mut url: Url) -> Url {
    let path = url.path().to_string();
    let last = path.rsplit('/').next().unwrap_or("");
    if !last.is_empty() && !last.contains('.') {
        url.set_path(&format!("{}/", path));
    }
    url
}

/// Combine a client base URL with a call path the way axios does: a leading
/// `/` keeps only the base's origin, anything else is appended to the full base.
pub fn join_base(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        return match Url::parse(base) {
            Ok(parsed) => format!("{}{}", origin(&parsed), path),
            Err(_) => format!("{}{}", base, path),
        };
    }
    format!("{}/{}", base, path)
}

/// Split a URL into its query-free identity and its query parameters.
/// Blank parameter values are dropped.
pub fn normalize(url: &str) -> Option<(String, BTreeMap<String, Vec<String>>)> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str()?;

    let path_url = restore_placeholders(&format!("{}{}", origin(&parsed), parsed.path()));

    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in parsed.query_pairs() {
        if value.is_empty() {
            continue;
        }
        params
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }

    Some((path_url, params))
}

/// `host[:port]` of a URL, the unit of origin comparison.
pub fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

fn origin(url: &Url) -> String {
    format!("{}://{}", url.scheme(), authority(url))
}

/// Exact `host[:port]` comparison against the crawl domain.
pub fn same_origin(url: &str, domain: &str) -> bool {
    Url::parse(url)
        .map(|parsed| parsed.host_str().is_some() && authority(&parsed) == domain)
        .unwrap_or(false)
}

/// Traversal identity of a page: no query, no fragment, no trailing slash.
pub fn page_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let path = parsed.path().trim_end_matches('/');
            let path = if path.is_empty() { "/" } else { path };
            format!("{}{}", origin(&parsed), path)
        }
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or(url)
            .to_string(),
    }
}

/// Does the path carry a segment that usually marks an API?
pub fn has_api_signal(path: &str) -> bool {
    API_SIGNAL_RE.is_match(path)
}

/// `api.example.com`, `foo-api.example.com` and friends.
pub fn is_api_host(host: &str) -> bool {
    API_HOST_RE.is_match(host)
}

fn restore_placeholders(url: &str) -> String {
    url.replace(PARAM_MARKER_ENCODED, PARAM_MARKER)
}

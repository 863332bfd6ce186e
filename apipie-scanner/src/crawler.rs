use crate::client::{ClientConfig, HttpClient};
use crate::error::{Result, ScanError};
use crate::extract::{ExtractorSet, html};
use crate::infer::infer_method;
use crate::model::{Endpoint, EndpointStore, Hit, Kind};
use crate::resolve::{
    authority, clean_templates, has_api_signal, is_api_host, is_template_only, join_base, normalize, page_key,
    resolve, resolve_sentinel, same_origin,
};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_MAX_PAGES: usize = 300;

/// Called once per page before it is fetched, with its depth and URL.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

static BASE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)baseURL\s*:\s*[`"'](https?://[^`"'\s]+)[`"']"#).unwrap());

/// Everything the crawler needs from one page, pulled out of the DOM up front
/// so the document is not held across fetches.
struct PageParts {
    script_srcs: Vec<String>,
    inline_js: Vec<String>,
    forms: Vec<(String, String)>,
    data_urls: Vec<String>,
    links: Vec<String>,
}

impl PageParts {
    fn parse(body: &str, page_url: &Url) -> Self {
        let document = Html::parse_document(body);
        Self {
            script_srcs: html::extract_script_srcs(&document, page_url),
            inline_js: html::extract_inline_js(&document),
            forms: html::extract_forms(&document, page_url),
            data_urls: html::extract_data_urls(&document, page_url),
            links: html::extract_links(&document, page_url),
        }
    }
}

/// Breadth-first, same-origin crawler that mines pages and scripts for API
/// endpoints.
///
/// Pages are processed one at a time; only the scripts referenced by a page
/// are fetched concurrently. All state belongs to a single run.
pub struct Crawler {
    base_url: String,
    domain: String,
    max_depth: usize,
    max_pages: usize,
    client_config: ClientConfig,
    extractors: ExtractorSet,
    progress_callback: Option<ProgressCallback>,
    store: EndpointStore,
    seen_scripts: HashSet<String>,
    pages_visited: usize,
}

impl Crawler {
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed =
            Url::parse(base_url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ScanError::InvalidUrl(format!("{}: expected an http(s) URL", base_url)));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            domain: authority(&parsed),
            max_depth: DEFAULT_MAX_DEPTH,
            max_pages: DEFAULT_MAX_PAGES,
            client_config: ClientConfig::default(),
            extractors: ExtractorSet::default(),
            progress_callback: None,
            store: EndpointStore::new(),
            seen_scripts: HashSet::new(),
            pages_visited: 0,
        })
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// At least the seed page is always fetched.
    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages.max(1);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.client_config.workers = workers.max(1);
        self
    }

    pub fn with_rate_limit(mut self, interval: Option<Duration>) -> Self {
        self.client_config.rate_limit = interval;
        self
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.client_config.headers = headers;
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.client_config.user_agent = user_agent;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client_config.timeout = timeout;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_extractors(mut self, extractors: ExtractorSet) -> Self {
        self.extractors = extractors;
        self
    }

    /// Pages fetched so far (successful or not).
    pub fn pages_visited(&self) -> usize {
        self.pages_visited
    }

    /// Crawl from the base URL and return every endpoint found, sorted by URL.
    ///
    /// Only client construction can fail; fetch failures just skip the URL.
    pub async fn run(&mut self) -> Result<Vec<Endpoint>> {
        let client = HttpClient::new(self.client_config.clone())?;
        info!(
            "Starting crawl of {} (max depth {}, max pages {})",
            self.base_url, self.max_depth, self.max_pages
        );

        let mut queue: VecDeque<(String, usize)> = VecDeque::from([(self.base_url.clone(), 0)]);
        let mut seen_keys: HashSet<String> = HashSet::from([page_key(&self.base_url)]);
        let mut cap_reached = false;

        while let Some((url, depth)) = queue.pop_front() {
            if depth > self.max_depth {
                continue;
            }

            if let Some(ref callback) = self.progress_callback {
                callback(depth, url.clone());
            }
            debug!("[depth={}] {}", depth, url);

            self.pages_visited += 1;
            let Some(body) = client.fetch(&url).await else {
                continue;
            };
            let Ok(page_url) = Url::parse(&url) else {
                continue;
            };

            let parts = PageParts::parse(&body, &page_url);
            self.process_scripts(&client, &parts, &url).await;
            self.process_html(&parts, &url);

            if depth < self.max_depth {
                for link in parts.links {
                    if !same_origin(&link, &self.domain) {
                        continue;
                    }
                    if seen_keys.len() >= self.max_pages {
                        if !cap_reached {
                            info!("Page cap {} reached, no further pages queued", self.max_pages);
                            cap_reached = true;
                        }
                        break;
                    }
                    if seen_keys.insert(page_key(&link)) {
                        debug!("Queuing {} at depth {}", link, depth + 1);
                        queue.push_back((link, depth + 1));
                    }
                }
            }
        }

        self.infer_missing_methods();
        info!(
            "Crawl complete. Visited {} pages, found {} endpoints",
            self.pages_visited,
            self.store.len()
        );
        Ok(self.store.all())
    }

    /// External scripts are fetched once per run, concurrently, and ingested
    /// in document order. Inline scripts are ingested every time.
    async fn process_scripts(&mut self, client: &HttpClient, parts: &PageParts, page_url: &str) {
        let new_srcs: Vec<String> = parts
            .script_srcs
            .iter()
            .filter(|src| self.seen_scripts.insert((*src).clone()))
            .cloned()
            .collect();

        if !new_srcs.is_empty() {
            debug!("Fetching {} new scripts from {}", new_srcs.len(), page_url);
            let mut bodies = client.fetch_many(&new_srcs).await;
            for src in &new_srcs {
                if let Some(js) = bodies.remove(src) {
                    self.ingest_js(&js, src, true);
                }
            }
        }

        for js in &parts.inline_js {
            self.ingest_js(js, page_url, false);
        }
    }

    fn process_html(&mut self, parts: &PageParts, page_url: &str) {
        for (url, method) in &parts.forms {
            if self.is_navigation(url) {
                continue;
            }
            self.register(&Hit::rest(url.as_str(), Some(method.clone())), page_url);
        }
        for url in &parts.data_urls {
            if self.is_navigation(url) {
                continue;
            }
            self.register(&Hit::rest(url.as_str(), None), page_url);
        }
    }

    /// Same-origin target without any API-looking path segment.
    fn is_navigation(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => same_origin(url, &self.domain) && !has_api_signal(parsed.path()),
            Err(_) => true,
        }
    }

    /// Run the extractors over one script body and register what resolves.
    ///
    /// Downloaded scripts may declare a cross-origin `baseURL`; relative hits
    /// from the same script are then also joined against each such base.
    fn ingest_js(&mut self, js: &str, source: &str, external: bool) {
        let extra_bases = if external {
            self.cross_origin_bases(js)
        } else {
            Vec::new()
        };
        let mut joined_seen: HashSet<String> = HashSet::new();

        for hit in self.extractors.extract_all(js) {
            if is_template_only(&hit.url) {
                continue;
            }
            let cleaned = clean_templates(resolve_sentinel(&hit.url));

            let relative = !(cleaned.starts_with("http://") || cleaned.starts_with("https://"));
            if relative && !cleaned.starts_with("//") {
                for base in &extra_bases {
                    let joined = join_base(base, &cleaned);
                    if joined_seen.insert(joined.clone()) {
                        self.register(&hit.with_url(joined), source);
                    }
                }
            }

            match resolve(&cleaned, &self.base_url, source) {
                Some(absolute) => self.register(&hit.with_url(absolute), source),
                None => debug!("Unresolvable candidate {:?} in {}", cleaned, source),
            }
        }
    }

    fn cross_origin_bases(&self, js: &str) -> Vec<String> {
        let mut bases: Vec<String> = Vec::new();
        for caps in BASE_URL_RE.captures_iter(js) {
            let base = caps[1].trim_end_matches('/');
            let Ok(parsed) = Url::parse(base) else {
                continue;
            };
            if authority(&parsed) != self.domain && !bases.iter().any(|b| b == base) {
                bases.push(base.to_string());
            }
        }
        bases
    }

    /// Same origin always; GraphQL and RPC from anywhere; other cross-origin
    /// URLs only on an API-looking host or path.
    fn should_register(&self, url: &str, kind: Kind) -> bool {
        if same_origin(url, &self.domain) {
            return true;
        }
        if kind != Kind::Rest {
            return true;
        }
        match Url::parse(url) {
            Ok(parsed) => {
                parsed.host_str().is_some_and(is_api_host) || has_api_signal(parsed.path())
            }
            Err(_) => false,
        }
    }

    fn register(&mut self, hit: &Hit, source: &str) {
        let Some((path_url, params)) = normalize(&hit.url) else {
            debug!("Dropping malformed URL {:?}", hit.url);
            return;
        };
        if !self.should_register(&path_url, hit.kind) {
            debug!("Skipping off-domain {}", path_url);
            return;
        }
        self.store.add(&path_url, hit, source, &params);
    }

    fn infer_missing_methods(&mut self) {
        for endpoint in self.store.iter_mut() {
            if endpoint.methods.is_empty() {
                endpoint.methods.insert(infer_method(&endpoint.url).to_string());
            }
        }
    }
}

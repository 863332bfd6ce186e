use apipie_scanner::{Crawler, Endpoint};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;
use url::Url;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub url: String,
    pub max_depth: usize,
    pub max_pages: usize,
    pub workers: usize,
    pub rate_limit: Option<Duration>,
    pub headers: Vec<(String, String)>,
    pub user_agent: Option<String>,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_depth: 5,
            max_pages: 300,
            workers: 6,
            rate_limit: None,
            headers: Vec::new(),
            user_agent: None,
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a crawl with the given options
/// Returns the discovered endpoints, sorted by URL
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<Vec<Endpoint>, String> {
    let CrawlOptions {
        url,
        max_depth,
        max_pages,
        workers,
        rate_limit,
        headers,
        user_agent,
        show_progress_bars,
    } = options;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .map_err(|e| e.to_string())?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let processed_count = Arc::new(AtomicUsize::new(0));

    let pb_clone = progress_bar.clone();
    let count_clone = processed_count.clone();
    let outer_callback = progress_callback.clone();
    let page_callback: apipie_scanner::ProgressCallback = Arc::new(move |depth: usize, page: String| {
        let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
        let message = format!(
            "Crawling... {} pages [depth {}] {}",
            count,
            depth,
            extract_url_path(&page)
        );
        if let Some(ref pb) = pb_clone {
            pb.set_message(message.clone());
        }
        if let Some(ref callback) = outer_callback {
            callback(message);
        }
    });

    let mut crawler = Crawler::new(&url)
        .map_err(|e| e.to_string())?
        .with_max_depth(max_depth)
        .with_max_pages(max_pages)
        .with_workers(workers)
        .with_rate_limit(rate_limit)
        .with_headers(headers)
        .with_user_agent(user_agent)
        .with_progress_callback(page_callback);

    let result = crawler.run().await;

    if let Some(ref pb) = progress_bar {
        match result {
            Ok(ref endpoints) => pb.finish_with_message(format!(
                "Crawl complete! {} pages visited, {} endpoints",
                crawler.pages_visited(),
                endpoints.len()
            )),
            Err(_) => pb.finish_and_clear(),
        }
    }

    let endpoints = result.map_err(|e| e.to_string())?;
    info!(
        "{}: {} endpoints from {} pages",
        url,
        endpoints.len(),
        crawler.pages_visited()
    );
    Ok(endpoints)
}

// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub use handlers::{
    CrawlArgs, default_output, normalize_target_url, parse_headers, rate_limit_from_secs,
    resolve_user_agent,
};

pub use apipie_core::crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl, extract_url_path};

use anyhow::{Context, Result, anyhow};
use apipie_core::crawl::{CrawlOptions, execute_crawl};
use apipie_core::report::{ReportFormat, count_kinds, generate_report, save_report};
use apipie_scanner::client::{UA_PRESET_NAMES, user_agent_preset};
use apipie_scanner::resolve::authority;
use apipie_scanner::{Endpoint, Kind};
use clap::ArgMatches;
use colored::{ColoredString, Colorize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Everything `handle_crawl` needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct CrawlArgs {
    pub url: String,
    pub output: PathBuf,
    pub format: ReportFormat,
    pub max_depth: usize,
    pub max_pages: usize,
    pub workers: usize,
    pub rate_limit: Option<Duration>,
    pub headers: Vec<(String, String)>,
    pub user_agent: Option<String>,
    pub show_progress: bool,
}

impl CrawlArgs {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let raw_url = matches
            .get_one::<String>("url")
            .ok_or_else(|| anyhow!("--url is required"))?;
        let url = normalize_target_url(raw_url)?;

        let format_name = matches.get_one::<String>("format").map(String::as_str).unwrap_or("md");
        let format = ReportFormat::from_str(format_name)
            .ok_or_else(|| anyhow!("unsupported report format '{}'", format_name))?;

        let output = match matches.get_one::<PathBuf>("output") {
            Some(path) => path.clone(),
            None => default_output(&url, format),
        };

        let headers: Vec<String> = matches
            .get_many::<String>("header")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        let user_agent = resolve_user_agent(
            matches.get_one::<String>("ua").map(String::as_str),
            matches.get_one::<String>("user-agent").map(String::as_str),
        );

        Ok(Self {
            url,
            output,
            format,
            max_depth: *matches.get_one::<usize>("max-depth").unwrap_or(&5),
            max_pages: *matches.get_one::<usize>("max-pages").unwrap_or(&300),
            workers: *matches.get_one::<usize>("workers").unwrap_or(&6),
            rate_limit: rate_limit_from_secs(*matches.get_one::<f64>("rate-limit").unwrap_or(&0.0)),
            headers: parse_headers(&headers),
            user_agent,
            show_progress: !matches.get_flag("verbose"),
        })
    }
}

/// Prepend `https://` when no scheme is given and check the result parses.
pub fn normalize_target_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let url = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let parsed = Url::parse(&url).with_context(|| format!("invalid target URL '{}'", raw))?;
    if parsed.host_str().is_none() {
        return Err(anyhow!("invalid target URL '{}': no host", raw));
    }
    Ok(url)
}

/// Parse `Name: value` header arguments. Entries without a colon are ignored.
pub fn parse_headers(raw: &[String]) -> Vec<(String, String)> {
    raw.iter()
        .filter_map(|header| header.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// `<host_with_underscores>_results.<ext>` in the working directory.
pub fn default_output(url: &str, format: ReportFormat) -> PathBuf {
    let host = Url::parse(url)
        .map(|parsed| authority(&parsed))
        .unwrap_or_else(|_| "target".to_string());
    let stem = host.replace([':', '.'], "_");
    PathBuf::from(format!("{}_results.{}", stem, format.extension()))
}

/// A named preset wins over a custom string.
pub fn resolve_user_agent(preset: Option<&str>, custom: Option<&str>) -> Option<String> {
    preset
        .and_then(user_agent_preset)
        .map(str::to_string)
        .or_else(|| custom.map(str::to_string))
}

pub fn rate_limit_from_secs(secs: f64) -> Option<Duration> {
    if secs.is_finite() && secs > 0.0 {
        Some(Duration::from_secs_f64(secs))
    } else {
        None
    }
}

pub fn ua_preset_help() -> String {
    format!("User-Agent preset: {}", UA_PRESET_NAMES.join(", "))
}

fn color_method(method: &str) -> ColoredString {
    match method {
        "GET" => method.bright_green(),
        "POST" => method.bright_yellow(),
        "PUT" => method.bright_blue(),
        "PATCH" => method.cyan(),
        "DELETE" => method.bright_red(),
        "HEAD" | "OPTIONS" => method.dimmed(),
        _ => method.white(),
    }
}

/// Comma-separated colored methods, padded to `width` visible columns.
pub fn method_tag(endpoint: &Endpoint, width: usize) -> String {
    if endpoint.methods.is_empty() {
        return format!("{}{}", "?".dimmed(), " ".repeat(width.saturating_sub(1)));
    }

    let plain_len = endpoint.methods.iter().map(String::len).sum::<usize>() + endpoint.methods.len() - 1;
    let colored: Vec<String> = endpoint
        .methods
        .iter()
        .map(|method| color_method(method).to_string())
        .collect();
    let separator = ",".dimmed().to_string();

    format!(
        "{}{}",
        colored.join(&separator),
        " ".repeat(width.saturating_sub(plain_len))
    )
}

fn kind_tag(kind: Kind) -> String {
    match kind {
        Kind::Rest => String::new(),
        Kind::Graphql => format!(" {}{}{}", "[".dimmed(), "graphql".bright_magenta(), "]".dimmed()),
        Kind::Rpc => format!(" {}{}{}", "[".dimmed(), "rpc".bright_cyan(), "]".dimmed()),
    }
}

fn url_display(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let origin = format!("{}://{}", parsed.scheme(), authority(&parsed));
            format!("{}{}", origin.dimmed(), parsed.path().white())
        }
        Err(_) => url.to_string(),
    }
}

fn print_divider() {
    println!("  {}", "─".repeat(52).dimmed());
}

fn print_info(label: &str, value: &str) {
    println!("  {}  {}", format!("{}:", label).dimmed(), value.white());
}

/// Endpoint count line followed by every endpoint, grouped by kind.
pub fn print_summary(endpoints: &[Endpoint]) {
    let counts = count_kinds(endpoints);
    println!(
        "\n  {}  {} endpoint(s) found  {}\n",
        "+".bright_green(),
        endpoints.len().to_string().white().bold(),
        format!("rest={} graphql={} rpc={}", counts.rest, counts.graphql, counts.rpc).dimmed()
    );
    print_divider();

    for kind in [Kind::Rest, Kind::Graphql, Kind::Rpc] {
        let group: Vec<&Endpoint> = endpoints.iter().filter(|e| e.kind == kind).collect();
        if group.is_empty() {
            continue;
        }
        println!("\n  {}\n", kind.label().cyan().bold());
        for endpoint in group {
            println!(
                "    {}  {}{}",
                method_tag(endpoint, 10),
                url_display(&endpoint.url),
                kind_tag(endpoint.kind)
            );
        }
    }

    println!();
    print_divider();
    println!();
}

pub async fn handle_crawl(args: CrawlArgs) -> Result<()> {
    print_divider();
    print_info("target", &args.url);
    print_info("depth ", &args.max_depth.to_string());
    print_info("output", &args.output.display().to_string());
    print_info("format", args.format.extension());
    print_divider();
    println!();

    let options = CrawlOptions {
        url: args.url.clone(),
        max_depth: args.max_depth,
        max_pages: args.max_pages,
        workers: args.workers,
        rate_limit: args.rate_limit,
        headers: args.headers.clone(),
        user_agent: args.user_agent.clone(),
        show_progress_bars: args.show_progress,
    };

    let endpoints = execute_crawl(options, None)
        .await
        .map_err(|e| anyhow!("crawl failed: {}", e))?;

    if endpoints.is_empty() {
        println!("\n  {}  {}", "!".yellow(), "nothing found".white());
        return Ok(());
    }

    print_summary(&endpoints);

    let report = generate_report(&endpoints, &args.url, args.format).context("failed to render report")?;
    save_report(&report, &args.output)
        .with_context(|| format!("failed to write report to {}", args.output.display()))?;

    println!(
        "  {}  {} {}\n",
        "+".bright_green(),
        "wrote".dimmed(),
        args.output.display().to_string().white()
    );
    Ok(())
}

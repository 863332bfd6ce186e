use apipie::handlers::{CrawlArgs, handle_crawl};
use apipie_core::print_banner;
use colored::Colorize;
use commands::command_argument_builder;
use tracing::Level;

mod commands;

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();

    if matches.get_flag("no-color") {
        colored::control::set_override(false);
    }

    let level = if matches.get_flag("verbose") {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .with_ansi(!matches.get_flag("no-color"))
        .init();

    // Show banner unless --quiet flag is set
    if !matches.get_flag("quiet") {
        print_banner();
    }

    let result = match CrawlArgs::from_matches(&matches) {
        Ok(args) => handle_crawl(args).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

use crate::CLAP_STYLING;
use apipie::handlers::ua_preset_help;
use apipie_scanner::client::UA_PRESET_NAMES;
use clap::arg;
use clap::builder::PossibleValuesParser;
use std::path::PathBuf;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("apipie")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("apipie")
        .about("Discover API endpoints by crawling a site and mining its JavaScript")
        .styles(CLAP_STYLING)
        .arg(
            arg!(--"url" <URL>)
                .required(true)
                .help("Target URL; https:// is assumed when no scheme is given"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Output file (default: <host>_results.md or .json)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"max-depth" <DEPTH>)
                .required(false)
                .help("Maximum link depth from the target page")
                .value_parser(clap::value_parser!(usize))
                .default_value("5"),
        )
        .arg(
            arg!(--"max-pages" <PAGES>)
                .required(false)
                .help("Maximum number of pages to crawl")
                .value_parser(clap::value_parser!(usize))
                .default_value("300"),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format")
                .value_parser(["md", "json"])
                .default_value("md"),
        )
        .arg(
            arg!(-H --"header" <HEADER>)
                .required(false)
                .help("Extra request header, e.g. -H 'Cookie: session=abc' (repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(
            arg!(--"user-agent" <UA>)
                .required(false)
                .help("Full User-Agent string"),
        )
        .arg(
            arg!(--"ua" <PRESET>)
                .required(false)
                .help(ua_preset_help())
                .value_parser(PossibleValuesParser::new(UA_PRESET_NAMES.iter().copied())),
        )
        .arg(
            arg!(--"rate-limit" <SECONDS>)
                .required(false)
                .help("Minimum seconds between requests")
                .value_parser(clap::value_parser!(f64))
                .default_value("0"),
        )
        .arg(
            arg!(--"workers" <NUM_WORKERS>)
                .required(false)
                .help("Concurrent script downloads per page")
                .value_parser(clap::value_parser!(usize))
                .default_value("6"),
        )
        .arg(arg!(-v --"verbose" "Log every fetch and decision to stderr").required(false))
        .arg(arg!(--"no-color" "Disable colored output").required(false))
        .arg(arg!(-q --"quiet" "Suppress banner").required(false))
}

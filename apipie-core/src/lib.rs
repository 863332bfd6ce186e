use colored::Colorize;

pub mod crawl;
pub mod report;

const BANNER: &str = r#"
   __ _ _ __ (_)_ __ (_) ___
  / _` | '_ \| | '_ \| |/ _ \
 | (_| | |_) | | |_) | |  __/
  \__,_| .__/|_| .__/|_|\___|
       |_|     |_|
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "API endpoint discovery".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}

pub mod crawl;
pub mod report;

use colored::Colorize;

/// Name, version and tagline, followed by a blank line.
pub fn banner() -> String {
    format!(
        "{} {}\n{}\n\n",
        "revue".bright_magenta().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black(),
        "review pages in, review table out".bright_black()
    )
}

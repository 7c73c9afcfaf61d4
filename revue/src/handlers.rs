use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use revue_core::crawl::{CrawlOptions, execute_crawl, execute_extract, execute_walk};
use revue_core::report::{
    DEFAULT_OUTPUT_PATH, ReportFormat, generate_summary, generate_visit_list, render_report,
    save_report,
};
use revue_scanner::{ExtractMode, LinkBase, ReviewTable};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use url::Url;

// Helper functions for the extract handler

/// Load URLs from either a file or a single URL argument
pub fn load_urls_from_source(
    url: Option<&Url>,
    urls_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(urls_file_path) = urls_file {
        load_urls_from_file(urls_file_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        Err("Either --url or --urls-file must be provided".to_string())
    }
}

/// Load and parse URLs from a file, keeping their order and duplicates.
/// Blank lines and lines starting with `#` are ignored.
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read URL file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as a URL, trying to add https:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if Url::parse(line).is_ok() {
        return Some(line.to_string());
    }

    let with_scheme = format!("https://{}", line);
    if !line.contains(char::is_whitespace) && Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    eprintln!("{} Skipping invalid URL '{}'", "⚠".yellow(), line);
    None
}

/// Install the log subscriber. `RUST_LOG` wins; otherwise only warnings show.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build the crawl options shared by `crawl`, `walk` and `extract`.
/// Arguments a subcommand does not define keep their defaults.
pub fn crawl_options_from_args(args: &ArgMatches, target_url: &str) -> CrawlOptions {
    let mut options = CrawlOptions::new(target_url);

    if let Ok(Some(max_crawl)) = args.try_get_one::<u64>("MAX_CRAWL") {
        options.seed.max_visits = usize::try_from(*max_crawl).unwrap_or(usize::MAX);
    }
    if let Ok(Some(timeout)) = args.try_get_one::<u64>("timeout") {
        options.timeout_secs = *timeout;
    }
    if let Ok(Some(workers)) = args.try_get_one::<u64>("workers") {
        options.workers = usize::try_from(*workers).unwrap_or(usize::MAX);
    }
    if args.try_get_one::<bool>("lenient").ok().flatten() == Some(&true) {
        options.extract_mode = ExtractMode::Lenient;
    }
    if args.try_get_one::<bool>("resolve-from-page").ok().flatten() == Some(&true) {
        options.seed.link_base = LinkBase::CurrentPage;
    }

    options.show_progress_bars = !args.get_flag("quiet");
    options
}

/// Output path and format; `~` in the path is expanded.
pub fn output_target(args: &ArgMatches) -> (PathBuf, ReportFormat) {
    let format = args
        .get_one::<String>("format")
        .and_then(|f| f.parse().ok())
        .unwrap_or_default();

    let path = match args.get_one::<String>("output") {
        Some(path) => PathBuf::from(shellexpand::tilde(path).as_ref()),
        None => match format {
            ReportFormat::Csv => PathBuf::from(DEFAULT_OUTPUT_PATH),
            ReportFormat::Json => PathBuf::from(DEFAULT_OUTPUT_PATH).with_extension("json"),
        },
    };

    (path, format)
}

fn write_table(table: &ReviewTable, path: &Path, format: ReportFormat) -> Result<()> {
    let content = render_report(table, format).context("Failed to serialize the review table")?;
    save_report(&content, path).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Subcommands whose stdout is machine-readable output. Everything meant
/// for a human goes to stderr for these.
pub fn writes_data_to_stdout(subcommand: &str) -> bool {
    subcommand == "walk"
}

pub fn format_options(options: &CrawlOptions) -> String {
    let mut text = format!(
        "{} Seed: {}\n{} Budget: {} links\n",
        "→".blue(),
        options.seed.target_url.bright_white(),
        "→".blue(),
        options.seed.max_visits.to_string().cyan()
    );
    if options.seed.link_base == LinkBase::CurrentPage {
        text.push_str(&format!(
            "{} Relative links: resolved from the current page\n",
            "→".blue()
        ));
    }
    text.push('\n');
    text
}

pub async fn handle_crawl(args: &ArgMatches) -> Result<()> {
    let target_url = args
        .get_one::<String>("URL")
        .context("missing URL argument")?;
    let options = crawl_options_from_args(args, target_url);
    let (output_path, format) = output_target(args);
    let quiet = !options.show_progress_bars;

    if !quiet {
        print!("{}", format_options(&options));
    }

    let outcome = execute_crawl(options, None)
        .await
        .with_context(|| format!("Crawl of {} failed", target_url))?;

    write_table(&outcome.table, &output_path, format)?;

    if !quiet {
        println!();
        print!("{}", generate_summary(&outcome));
        println!();
    }
    println!(
        "{} {} reviews written to {}",
        "✓".green().bold(),
        outcome.table.len(),
        output_path.display().to_string().bright_white()
    );

    Ok(())
}

pub async fn handle_walk(args: &ArgMatches) -> Result<()> {
    let target_url = args
        .get_one::<String>("URL")
        .context("missing URL argument")?;
    let options = crawl_options_from_args(args, target_url);
    let quiet = !options.show_progress_bars;

    // stdout carries only the URL list.
    if !quiet {
        eprint!("{}", format_options(&options));
    }

    let urls = execute_walk(&options, None)
        .await
        .with_context(|| format!("Walk from {} failed", target_url))?;

    if !quiet {
        eprint!("{}", generate_visit_list(&urls));
    }
    // Full URLs on stdout, ready for `revue extract --urls-file`.
    for url in &urls {
        println!("{}", url);
    }

    Ok(())
}

pub async fn handle_extract(args: &ArgMatches) -> Result<()> {
    let url = args.get_one::<Url>("url");
    let urls_file = args.get_one::<PathBuf>("urls-file");
    let urls = load_urls_from_source(url, urls_file).map_err(anyhow::Error::msg)?;

    let options = crawl_options_from_args(args, &urls[0]);
    let (output_path, format) = output_target(args);
    let quiet = !options.show_progress_bars;

    let progress_callback: Option<revue_core::crawl::CrawlProgressCallback> = if quiet {
        None
    } else {
        Some(Arc::new(|msg: String| println!("{} {}", "→".blue(), msg)))
    };

    let (table, stats) = execute_extract(&urls, &options, progress_callback)
        .await
        .context("Extraction failed")?;

    write_table(&table, &output_path, format)?;

    if stats.containers_skipped > 0 {
        println!(
            "{} {} malformed reviews skipped",
            "⚠".yellow(),
            stats.containers_skipped
        );
    }
    println!(
        "{} {} reviews from {} pages written to {}",
        "✓".green().bold(),
        table.len(),
        stats.pages_fetched,
        output_path.display().to_string().bright_white()
    );

    Ok(())
}

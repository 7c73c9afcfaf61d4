use indicatif::{ProgressBar, ProgressStyle};
use revue_scanner::error::Result;
use revue_scanner::fetch::{DEFAULT_TIMEOUT_SECS, build_client};
use revue_scanner::{
    ExtractMode, ExtractionStats, Extractor, LinkBase, ProgressCallback, ReviewTable, SeedConfig,
    Walker,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;
use url::Url;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub seed: SeedConfig,
    pub extract_mode: ExtractMode,
    /// Concurrent fetches during extraction. The walk is always sequential.
    pub workers: usize,
    pub timeout_secs: u64,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            seed: SeedConfig::new(target_url),
            extract_mode: ExtractMode::Strict,
            workers: 1,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            show_progress_bars: false,
        }
    }

    pub fn with_max_visits(mut self, max_visits: usize) -> Self {
        self.seed.max_visits = max_visits;
        self
    }

    pub fn with_link_base(mut self, link_base: LinkBase) -> Self {
        self.seed.link_base = link_base;
        self
    }

    pub fn with_extract_mode(mut self, mode: ExtractMode) -> Self {
        self.extract_mode = mode;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub urls: Vec<String>,
    pub table: ReviewTable,
    pub stats: ExtractionStats,
    pub elapsed: Duration,
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Path and query of a URL, which is what tells listing pages apart.
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = if u.path().is_empty() { "/" } else { u.path() };
            match u.query() {
                Some(query) => format!("{}?{}", path, query),
                None => path.to_string(),
            }
        })
        .unwrap_or_else(|| url.to_string())
}

fn spinner(show: bool) -> Option<Arc<ProgressBar>> {
    if !show {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Starting...");
    Some(Arc::new(pb))
}

/// Run only the walk and return the visit list.
pub async fn execute_walk(
    options: &CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<Vec<String>> {
    let progress_bar = spinner(options.show_progress_bars);
    let walker = walker_for(options, progress_bar.clone())?;

    notify(&progress_callback, format!("Walking {}", options.seed.target_url));
    let result = walker.walk(&options.seed).await;
    finish(&progress_bar, &result, |urls| {
        format!("Walk complete! {} URLs to extract", urls.len())
    });

    result
}

/// Run only the extraction over an explicit URL list.
pub async fn execute_extract(
    urls: &[String],
    options: &CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<(ReviewTable, ExtractionStats)> {
    let progress_bar = spinner(options.show_progress_bars);
    let extractor = extractor_for(options, urls.len(), progress_bar.clone())?;

    notify(
        &progress_callback,
        format!("Extracting reviews from {} pages", urls.len()),
    );
    let result = extractor.extract_with_stats(urls).await;
    finish(&progress_bar, &result, |(table, _)| {
        format!("Extraction complete! {} reviews", table.len())
    });

    result
}

/// Walk from the seed, then extract every URL of the visit list.
///
/// Nothing is written here: the caller gets the whole table once both
/// phases have succeeded, or the first error.
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlOutcome> {
    let start = Instant::now();

    let urls = execute_walk(&options, progress_callback.clone()).await?;
    notify(
        &progress_callback,
        format!("Found {} listing pages", urls.len()),
    );

    let (table, stats) = execute_extract(&urls, &options, progress_callback).await?;

    let elapsed = start.elapsed();
    info!(
        "Crawl of {} finished in {:?}: {} reviews",
        options.seed.target_url,
        elapsed,
        table.len()
    );

    Ok(CrawlOutcome {
        urls,
        table,
        stats,
        elapsed,
    })
}

fn walker_for(options: &CrawlOptions, progress_bar: Option<Arc<ProgressBar>>) -> Result<Walker> {
    let walker = Walker::with_client(build_client(options.timeout_secs)?);

    Ok(match progress_bar {
        Some(pb) => {
            let max_visits = options.seed.max_visits;
            let callback: ProgressCallback = Arc::new(move |examined: usize, url: String| {
                pb.set_message(format!(
                    "Walking... {}/{} anchors, fetching {}",
                    examined,
                    max_visits,
                    extract_url_path(&url)
                ));
            });
            walker.with_progress_callback(callback)
        }
        None => walker,
    })
}

fn extractor_for(
    options: &CrawlOptions,
    total: usize,
    progress_bar: Option<Arc<ProgressBar>>,
) -> Result<Extractor> {
    let extractor = Extractor::with_client(build_client(options.timeout_secs)?)
        .with_mode(options.extract_mode)
        .with_workers(options.workers);

    Ok(match progress_bar {
        Some(pb) => {
            let callback: ProgressCallback = Arc::new(move |index: usize, url: String| {
                pb.set_message(format!(
                    "Extracting... page {}/{} {}",
                    index + 1,
                    total,
                    extract_url_path(&url)
                ));
            });
            extractor.with_progress_callback(callback)
        }
        None => extractor,
    })
}

fn notify(callback: &Option<CrawlProgressCallback>, message: String) {
    if let Some(callback) = callback {
        callback(message);
    }
}

fn finish<T>(
    progress_bar: &Option<Arc<ProgressBar>>,
    result: &Result<T>,
    message: impl FnOnce(&T) -> String,
) {
    if let Some(pb) = progress_bar {
        match result {
            Ok(value) => pb.finish_with_message(message(value)),
            Err(_) => pb.finish_and_clear(),
        }
    }
}

use crate::ProgressCallback;
use crate::error::{Result, ScanError};
use crate::fetch::{DEFAULT_TIMEOUT_SECS, build_client, fetch_page};
use crate::result::{ExtractionStats, ReviewRecord, ReviewTable};
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::pin::pin;
use tracing::{debug, info, warn};

/// What to do with a review container whose text or rating element is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractMode {
    /// Fail the page, and with it the whole extraction.
    #[default]
    Strict,
    /// Skip the container and keep going.
    Lenient,
}

/// CSS selectors describing where a review lives in a listing page.
///
/// The rating is reached in three steps (`rating_meta`, then
/// `rating_widget` inside it, then `rating_note` inside that), each step
/// taking the first match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSelectors {
    pub container: String,
    pub text: String,
    pub rating_meta: String,
    pub rating_widget: String,
    pub rating_note: String,
}

impl Default for ReviewSelectors {
    fn default() -> Self {
        Self {
            container: "div.review-card-review-holder".to_string(),
            text: "div.content-txt.review-card-content".to_string(),
            rating_meta: "div.review-card-meta".to_string(),
            rating_widget: "div.stareval.stareval-medium.stareval-theme-default".to_string(),
            rating_note: "span.stareval-note".to_string(),
        }
    }
}

struct CompiledSelectors {
    container: Selector,
    text: (Selector, String),
    rating_path: [(Selector, String); 3],
}

impl CompiledSelectors {
    fn compile(selectors: &ReviewSelectors) -> Result<Self> {
        Ok(Self {
            container: parse_selector(&selectors.container)?,
            text: (parse_selector(&selectors.text)?, selectors.text.clone()),
            rating_path: [
                (
                    parse_selector(&selectors.rating_meta)?,
                    selectors.rating_meta.clone(),
                ),
                (
                    parse_selector(&selectors.rating_widget)?,
                    selectors.rating_widget.clone(),
                ),
                (
                    parse_selector(&selectors.rating_note)?,
                    selectors.rating_note.clone(),
                ),
            ],
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ScanError::ParseError(format!("invalid selector {:?}: {}", selector, e)))
}

/// Reviews found on one page, plus how many containers were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageReviews {
    pub records: Vec<ReviewRecord>,
    pub containers_found: usize,
    pub containers_skipped: usize,
}

/// Pull every review out of one page of HTML. `url` is only used in errors.
pub fn extract_reviews(
    html: &str,
    url: &str,
    selectors: &ReviewSelectors,
    mode: ExtractMode,
) -> Result<PageReviews> {
    let compiled = CompiledSelectors::compile(selectors)?;
    extract_with(&compiled, html, url, mode)
}

fn extract_with(
    selectors: &CompiledSelectors,
    html: &str,
    url: &str,
    mode: ExtractMode,
) -> Result<PageReviews> {
    let document = Html::parse_document(html);
    let mut page = PageReviews::default();

    for (index, container) in document.select(&selectors.container).enumerate() {
        page.containers_found += 1;

        match read_review(selectors, container) {
            Ok(record) => page.records.push(record),
            Err(element) => match mode {
                ExtractMode::Strict => {
                    return Err(ScanError::MissingElement {
                        url: url.to_string(),
                        container: index + 1,
                        element,
                    });
                }
                ExtractMode::Lenient => {
                    warn!(
                        "Skipping review #{} on {}: no `{}` element",
                        index + 1,
                        url,
                        element
                    );
                    page.containers_skipped += 1;
                }
            },
        }
    }

    debug!(
        "{} reviews in {} containers on {}",
        page.records.len(),
        page.containers_found,
        url
    );
    Ok(page)
}

/// On failure, returns the selector of the element that was missing.
fn read_review(
    selectors: &CompiledSelectors,
    container: ElementRef<'_>,
) -> std::result::Result<ReviewRecord, String> {
    let (text_selector, text_source) = &selectors.text;
    let text = container
        .select(text_selector)
        .next()
        .ok_or_else(|| text_source.clone())?
        .text()
        .collect::<String>()
        .trim()
        .to_string();

    let mut scope = container;
    for (selector, source) in &selectors.rating_path {
        scope = scope
            .select(selector)
            .next()
            .ok_or_else(|| source.clone())?;
    }
    let rating = scope.text().collect::<String>();

    Ok(ReviewRecord { text, rating })
}

/// Fetches pages and turns their review containers into a [`ReviewTable`].
pub struct Extractor {
    client: Client,
    selectors: ReviewSelectors,
    mode: ExtractMode,
    workers: usize,
    progress_callback: Option<ProgressCallback>,
}

impl Extractor {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        Ok(Self::with_client(build_client(timeout_secs)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            selectors: ReviewSelectors::default(),
            mode: ExtractMode::default(),
            workers: 1,
            progress_callback: None,
        }
    }

    pub fn with_selectors(mut self, selectors: ReviewSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_mode(mut self, mode: ExtractMode) -> Self {
        self.mode = mode;
        self
    }

    /// Number of requests allowed in flight at once. Values below 1 are treated as 1.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Called once per URL, with its position in the input list, as its fetch starts.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub async fn extract(&self, urls: &[String]) -> Result<ReviewTable> {
        self.extract_with_stats(urls)
            .await
            .map(|(table, _stats)| table)
    }

    /// Fetch every URL in order and collect their reviews.
    ///
    /// Up to `workers` fetches run at once but pages are consumed in input
    /// order, so the table is the same as a sequential run. Duplicated URLs
    /// are fetched and extracted as many times as they appear. The first
    /// failure, fetch or structure, aborts everything.
    pub async fn extract_with_stats(
        &self,
        urls: &[String],
    ) -> Result<(ReviewTable, ExtractionStats)> {
        info!(
            "Extracting reviews from {} pages with {} workers",
            urls.len(),
            self.workers
        );

        let selectors = CompiledSelectors::compile(&self.selectors)?;
        let mut table = ReviewTable::new();
        let mut stats = ExtractionStats::default();

        let mut pages = pin!(stream::iter(urls.iter().enumerate())
            .map(|(index, url)| async move {
                if let Some(ref callback) = self.progress_callback {
                    callback(index, url.clone());
                }
                let body = fetch_page(&self.client, url).await?;
                Ok::<_, ScanError>((url, body))
            })
            .buffered(self.workers));

        while let Some((url, body)) = pages.try_next().await? {
            let page = extract_with(&selectors, &body, url, self.mode)?;

            stats.pages_fetched += 1;
            stats.containers_found += page.containers_found;
            stats.containers_skipped += page.containers_skipped;
            stats.records_kept += page.records.len();
            table.extend(page.records);
        }

        info!(
            "Extraction complete. {} reviews from {} pages ({} skipped)",
            stats.records_kept, stats.pages_fetched, stats.containers_skipped
        );
        Ok((table, stats))
    }
}

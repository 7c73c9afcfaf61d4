use crate::ProgressCallback;
use crate::error::{Result, ScanError};
use crate::fetch::{DEFAULT_TIMEOUT_SECS, build_client, fetch_page};
use crate::frontier::{Frontier, LinkBase, resolve_href};
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info};
use url::Url;

/// Where a walk starts and how much work it may do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedConfig {
    pub target_url: String,
    /// Number of anchors the walk may examine, across all pages.
    pub max_visits: usize,
    pub link_base: LinkBase,
}

impl SeedConfig {
    pub const DEFAULT_MAX_VISITS: usize = 20;

    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            max_visits: Self::DEFAULT_MAX_VISITS,
            link_base: LinkBase::default(),
        }
    }

    pub fn with_max_visits(mut self, max_visits: usize) -> Self {
        self.max_visits = max_visits;
        self
    }

    pub fn with_link_base(mut self, link_base: LinkBase) -> Self {
        self.link_base = link_base;
        self
    }
}

/// Depth-first walk over the pagination links reachable from a seed page.
pub struct Walker {
    client: Client,
    progress_callback: Option<ProgressCallback>,
}

impl Walker {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        Ok(Self::with_client(build_client(timeout_secs)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            progress_callback: None,
        }
    }

    /// Called before each page fetch with the anchors examined so far and the URL.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Walk from `seed.target_url` and return the URLs to extract.
    ///
    /// The seed is canonicalized once (lowercase host, default port dropped,
    /// path percent-encoded) so that it compares equal to the links joined
    /// against it. The scope prefix and the appended seed use that form.
    ///
    /// The result is what is left in the frontier when the walk stops, in
    /// insertion order, with the seed appended. Pages that were popped and
    /// fetched are not part of it unless they were admitted again later.
    ///
    /// The budget counts anchors, not pages, and is only checked between
    /// pages: the page being scanned always has all of its anchors examined.
    /// Any fetch failure aborts the walk.
    pub async fn walk(&self, seed: &SeedConfig) -> Result<Vec<String>> {
        info!(
            "Walking {} (budget: {} anchors)",
            seed.target_url, seed.max_visits
        );

        let seed_url = Url::parse(&seed.target_url)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", seed.target_url, e)))?;

        let mut frontier = Frontier::new(seed_url.as_str());
        let mut anchors_examined = 0usize;
        let mut pages_fetched = 0usize;

        while anchors_examined < seed.max_visits
            && let Some(current) = frontier.pop()
        {
            if let Some(ref callback) = self.progress_callback {
                callback(anchors_examined, current.clone());
            }

            let body = fetch_page(&self.client, &current).await?;
            pages_fetched += 1;

            let base = match seed.link_base {
                LinkBase::Seed => seed_url.clone(),
                LinkBase::CurrentPage => Url::parse(&current)
                    .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", current, e)))?,
            };

            let hrefs = collect_hrefs(&body)?;
            debug!("{} anchors on {}", hrefs.len(), current);

            for href in hrefs {
                anchors_examined += 1;

                match resolve_href(&href, &base) {
                    Some(absolute_url) => {
                        if frontier.admit(absolute_url.clone()) {
                            debug!("  -> queued {}", absolute_url);
                        } else {
                            debug!("  -> skipped {}", absolute_url);
                        }
                    }
                    None => debug!("  -> cannot resolve {:?}", href),
                }
            }
        }

        let urls = frontier.into_visit_list();
        info!(
            "Walk complete. Fetched {} pages, examined {} anchors, {} URLs to extract",
            pages_fetched,
            anchors_examined,
            urls.len()
        );
        debug!("Visit list: {:?}", urls);

        Ok(urls)
    }
}

/// Every `href` of every `a[href]`, in document order.
fn collect_hrefs(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let link_selector =
        Selector::parse("a[href]").map_err(|e| ScanError::ParseError(e.to_string()))?;

    Ok(document
        .select(&link_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect())
}

use std::collections::HashSet;
use url::Url;

/// Substring that marks a URL as one of the paginated review listings.
pub const PAGINATION_MARKER: &str = "?page=";

/// What relative hrefs are resolved against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkBase {
    /// Always the seed URL, whatever page the link was found on.
    #[default]
    Seed,
    /// The page the link was found on.
    CurrentPage,
}

/// LIFO to-visit collection for one walk.
///
/// A URL is admitted only when it starts with the seed, carries the
/// pagination marker and is not already waiting in the stack. URLs that
/// were popped earlier are *not* remembered, so a page can be re-admitted
/// when another page links back to it.
#[derive(Debug, Clone)]
pub struct Frontier {
    seed: String,
    to_visit: Vec<String>,
    queued: HashSet<String>,
}

impl Frontier {
    pub fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            to_visit: vec![seed.to_string()],
            queued: HashSet::from([seed.to_string()]),
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Most recently admitted URL first.
    pub fn pop(&mut self) -> Option<String> {
        let url = self.to_visit.pop()?;
        self.queued.remove(&url);
        Some(url)
    }

    pub fn is_admissible(&self, url: &str) -> bool {
        url.starts_with(&self.seed) && !self.queued.contains(url) && url.contains(PAGINATION_MARKER)
    }

    /// Push `url` if it passes the admission rules. Returns whether it was pushed.
    pub fn admit(&mut self, url: String) -> bool {
        if !self.is_admissible(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.to_visit.push(url);
        true
    }

    pub fn len(&self) -> usize {
        self.to_visit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_visit.is_empty()
    }

    /// Whatever is still waiting, in insertion order, followed by the seed.
    pub fn into_visit_list(self) -> Vec<String> {
        let mut urls = self.to_visit;
        urls.push(self.seed);
        urls
    }
}

/// Turn an href into an absolute URL.
///
/// Anything starting with `http` is taken verbatim; everything else is
/// joined onto `base`. Returns `None` when the join itself fails.
pub fn resolve_href(href: &str, base: &Url) -> Option<String> {
    if href.starts_with("http") {
        return Some(href.to_string());
    }

    base.join(href).ok().map(String::from)
}

use serde::{Deserialize, Serialize};

/// One review as it appears on the page. The rating is kept verbatim
/// (e.g. `"4,5"`); turning it into a number is left to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(rename = "reviews")]
    pub text: String,
    #[serde(rename = "notes")]
    pub rating: String,
}

impl ReviewRecord {
    pub fn new(text: impl Into<String>, rating: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rating: rating.into(),
        }
    }
}

/// Append-only table of reviews, in page order then container order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewTable {
    records: Vec<ReviewRecord>,
}

impl ReviewTable {
    /// Column names of the persisted table.
    pub const COLUMNS: [&'static str; 2] = ["reviews", "notes"];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ReviewRecord) {
        self.records.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = ReviewRecord>) {
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReviewRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<ReviewRecord> {
        self.records
    }
}

impl From<Vec<ReviewRecord>> for ReviewTable {
    fn from(records: Vec<ReviewRecord>) -> Self {
        Self { records }
    }
}

impl<'a> IntoIterator for &'a ReviewTable {
    type Item = &'a ReviewRecord;
    type IntoIter = std::slice::Iter<'a, ReviewRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub pages_fetched: usize,
    pub containers_found: usize,
    pub records_kept: usize,
    /// Only non-zero in lenient mode.
    pub containers_skipped: usize,
}

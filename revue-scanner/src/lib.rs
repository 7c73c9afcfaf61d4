pub mod error;
pub mod extractor;
pub mod fetch;
pub mod frontier;
pub mod result;
pub mod walker;

pub use error::ScanError;
pub use extractor::{ExtractMode, Extractor, ReviewSelectors};
pub use frontier::{Frontier, LinkBase, PAGINATION_MARKER};
pub use result::{ExtractionStats, ReviewRecord, ReviewTable};
pub use walker::{SeedConfig, Walker};

pub type ProgressCallback = std::sync::Arc<dyn Fn(usize, String) + Send + Sync>;

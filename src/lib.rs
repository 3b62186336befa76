pub mod carving;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod io;
pub mod options;
pub mod traits;
pub mod types;

pub use carving::{Carver, carve, dedup_candidates};
pub use error::{CarveError, Result};
pub use extraction::{ExtractionReport, SavedImage, extract_all, generate_filename};
pub use io::SourceFile;
pub use options::{ExtractOptions, ScanOptions};
pub use traits::FormatDetector;
pub use types::{
    FormatCounts, ImageCandidate, ImageFormat, Offset, ScanResult, ScanStats, Termination,
};

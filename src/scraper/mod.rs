//! Page scraping: listing scan, candidate building and detail enrichment.

pub mod candidate;
pub mod detail;
pub mod listing;
pub mod resolve;
pub mod selectors;

pub use candidate::build_candidate;
pub use detail::enrich;
pub use listing::scan_listing;

//! shop-extract - Marketplace product page extractor
//!
//! Parses live or saved marketplace product pages (eBay, Amazon,
//! AliExpress, Temu, Shein, Walmart, generic shops) into one canonical
//! product/variant/review record.

pub mod client;
pub mod commands;
pub mod config;
pub mod extract;
pub mod format;
pub mod model;
pub mod normalize;
pub mod observe;
pub mod report;
pub mod variants;

pub use config::Config;
pub use extract::{extract, extract_with_limits, PageContext, Platform};
pub use model::{Money, ProductRecord, ReviewRecord, VariantRecord, VideoRecord};
pub use report::CompletenessReport;

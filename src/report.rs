//! Completeness scoring for extracted records.
//!
//! Extraction never fails; what a caller needs to know is how much of
//! the record got filled in before committing an import. The score is
//! a weighted field checklist plus, for variant products, the fill rate
//! of per-variant data.

use crate::model::ProductRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Field weights summing to 100.
const WEIGHTS: &[(&str, u8)] = &[
    ("title", 20),
    ("price", 20),
    ("images", 20),
    ("description", 10),
    ("variants", 10),
    ("reviews", 10),
    ("specifications", 10),
];

/// Summary of how complete one extraction turned out.
#[derive(Debug, Clone, Serialize)]
pub struct CompletenessReport {
    /// 0-100 weighted score.
    pub score: u8,
    /// Field names that came back empty.
    pub missing: Vec<String>,
    /// For variant products: percentage of variants carrying price,
    /// SKU and stock data.
    pub variant_coverage: Option<u8>,
}

impl CompletenessReport {
    /// Evaluates one record.
    pub fn evaluate(record: &ProductRecord) -> Self {
        let filled = Self::filled_fields(record);

        let mut score = 0u8;
        let mut missing = Vec::new();
        for (field, weight) in WEIGHTS {
            if *filled.get(field).unwrap_or(&false) {
                score += weight;
            } else {
                missing.push((*field).to_string());
            }
        }

        Self { score, missing, variant_coverage: variant_coverage(record) }
    }

    fn filled_fields(record: &ProductRecord) -> BTreeMap<&'static str, bool> {
        BTreeMap::from([
            ("title", !record.title.is_empty()),
            ("price", record.price.amount > 0.0),
            ("images", !record.images.is_empty()),
            ("description", !record.description.is_empty()),
            ("variants", record.has_variants()),
            ("reviews", !record.reviews.is_empty()),
            ("specifications", !record.specifications.is_empty()),
        ])
    }

    /// True when the record holds enough for a sane import.
    pub fn importable(&self) -> bool {
        !self.missing.iter().any(|f| f == "title" || f == "price")
    }
}

/// Average fill percentage of price/SKU/stock across variants.
fn variant_coverage(record: &ProductRecord) -> Option<u8> {
    if record.variants.is_empty() {
        return None;
    }

    let total = record.variants.len() as f64;
    let with_price = record.variants.iter().filter(|v| v.price.is_some()).count() as f64;
    let with_sku = record.variants.iter().filter(|v| !v.sku.is_empty()).count() as f64;
    let with_stock = record.variants.iter().filter(|v| v.stock > 0).count() as f64;

    let average = (with_price + with_sku + with_stock) / (3.0 * total) * 100.0;
    Some(average.round() as u8)
}

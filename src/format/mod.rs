//! Output formatting for extracted records (table, JSON, markdown).

use crate::config::OutputFormat;
use crate::model::{ProductRecord, ReviewKind};
use crate::report::CompletenessReport;

/// Formats records and reports for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats one extracted record.
    pub fn format_record(&self, record: &ProductRecord) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.table_record(record),
            OutputFormat::Markdown => self.markdown_record(record),
        }
    }

    /// Formats a record together with its completeness report.
    pub fn format_with_report(&self, record: &ProductRecord, report: &CompletenessReport) -> String {
        match self.format {
            OutputFormat::Json => {
                let combined = serde_json::json!({ "record": record, "report": report });
                serde_json::to_string_pretty(&combined).unwrap_or_else(|_| "{}".to_string())
            }
            _ => {
                format!("{}\n\n{}", self.format_record(record), self.table_report(report))
            }
        }
    }

    // Table formatting

    fn table_record(&self, record: &ProductRecord) -> String {
        let mut lines = Vec::new();

        lines.push(format!("ID:        {}", record.external_id));
        lines.push(format!("Platform:  {}", record.platform));
        lines.push(format!("Title:     {}", record.title));
        if !record.brand.is_empty() {
            lines.push(format!("Brand:     {}", record.brand));
        }
        if !record.sku.is_empty() {
            lines.push(format!("SKU:       {}", record.sku));
        }

        let price_line = if record.price.is_zero() {
            "Price:     N/A".to_string()
        } else if let Some(original) = &record.original_price {
            let discount = record
                .discount_percent()
                .map(|pct| format!(", -{pct}%"))
                .unwrap_or_default();
            format!(
                "Price:     {} {:.2} (was {:.2}{})",
                record.price.currency, record.price.amount, original.amount, discount
            )
        } else {
            format!("Price:     {} {:.2}", record.price.currency, record.price.amount)
        };
        lines.push(price_line);

        lines.push(format!("Images:    {}", record.images.len()));
        if !record.videos.is_empty() {
            lines.push(format!("Videos:    {}", record.videos.len()));
        }

        if let Some(summary) = record.reviews.iter().find(|r| r.kind == ReviewKind::Summary) {
            lines.push(format!(
                "Rating:    {:.1}/5 ({} reviews)",
                summary.rating,
                summary.total_count.unwrap_or(0)
            ));
        }

        if record.has_variants() {
            lines.push(format!("Variants:  {}", record.variants.len()));
            for variant in record.variants.iter().take(10) {
                let price = variant
                    .price
                    .map(|p| format!("{p:.2}"))
                    .unwrap_or_else(|| "-".to_string());
                let stock = if variant.available {
                    format!("stock {}", variant.stock)
                } else {
                    "unavailable".to_string()
                };
                lines.push(format!("  {:<30} {:>8}  {}", variant.label(), price, stock));
            }
            if record.variants.len() > 10 {
                lines.push(format!("  ... and {} more", record.variants.len() - 10));
            }
        }

        if !record.specifications.is_empty() {
            lines.push(format!("Specs:     {} entries", record.specifications.len()));
        }

        lines.join("\n")
    }

    fn table_report(&self, report: &CompletenessReport) -> String {
        let mut lines = vec![format!("Completeness: {}/100", report.score)];
        if !report.missing.is_empty() {
            lines.push(format!("Missing:      {}", report.missing.join(", ")));
        }
        if let Some(coverage) = report.variant_coverage {
            lines.push(format!("Variant data: {coverage}%"));
        }
        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_record(&self, record: &ProductRecord) -> String {
        let mut out = String::new();

        let title = if record.title.is_empty() { "(untitled)" } else { &record.title };
        out.push_str(&format!("# {title}\n\n"));
        out.push_str(&format!("- **Platform**: {}\n", record.platform));
        out.push_str(&format!("- **ID**: {}\n", record.external_id));
        if !record.brand.is_empty() {
            out.push_str(&format!("- **Brand**: {}\n", record.brand));
        }
        if !record.price.is_zero() {
            out.push_str(&format!(
                "- **Price**: {} {:.2}\n",
                record.price.currency, record.price.amount
            ));
        }
        if let Some(original) = &record.original_price {
            out.push_str(&format!(
                "- **Original price**: {} {:.2}\n",
                original.currency, original.amount
            ));
        }

        if record.has_variants() {
            out.push_str("\n## Variants\n\n");
            out.push_str("| Variant | SKU | Price | Stock |\n|---|---|---|---|\n");
            for variant in &record.variants {
                let price =
                    variant.price.map(|p| format!("{p:.2}")).unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    variant.label(),
                    variant.sku,
                    price,
                    variant.stock
                ));
            }
        }

        if !record.images.is_empty() {
            out.push_str("\n## Images\n\n");
            for image in &record.images {
                out.push_str(&format!("- {image}\n"));
            }
        }

        if !record.specifications.is_empty() {
            out.push_str("\n## Specifications\n\n");
            for (key, value) in &record.specifications {
                out.push_str(&format!("- **{key}**: {value}\n"));
            }
        }

        out
    }
}

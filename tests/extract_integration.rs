//! End-to-end extraction tests over fixture pages.

use shop_extract::config::OutputFormat;
use shop_extract::format::Formatter;
use shop_extract::model::ReviewKind;
use shop_extract::{extract, CompletenessReport, PageContext};

const ALIEXPRESS_FIXTURE: &str = include_str!("fixtures/aliexpress_item.html");
const EBAY_FIXTURE: &str = include_str!("fixtures/ebay_listing.html");
const GENERIC_FIXTURE: &str = include_str!("fixtures/generic_jsonld.html");

#[test]
fn test_aliexpress_full_extraction() {
    let ctx = PageContext::new(
        ALIEXPRESS_FIXTURE,
        "https://www.aliexpress.com/item/1005007654321098.html",
    );
    let record = extract(&ctx);

    assert_eq!(record.platform, "aliexpress");
    assert_eq!(record.external_id, "1005007654321098");
    assert_eq!(record.title, "USB-C Fast Charging Cable 2m Braided");
    assert_eq!(record.brand, "CableWorks Official Store");

    // Pricing from the price module.
    assert_eq!(record.price.amount, 3.49);
    assert_eq!(record.price.currency, "USD");
    assert_eq!(record.original_price.as_ref().unwrap().amount, 6.99);
    assert_eq!(record.discount_percent(), Some(50));

    // Images: protocol fixed, upgraded to 800x800, deduplicated.
    assert_eq!(record.images.len(), 3);
    for image in &record.images {
        assert!(image.starts_with("https://ae01.alicdn.com/"));
        assert!(image.contains("_800x800"));
    }

    // 2 colors x 2 lengths, each joined to its price row.
    assert_eq!(record.variants.len(), 4);
    assert!(record.variants_consistent());
    for variant in &record.variants {
        assert!(variant.price.is_some());
        assert_eq!(variant.available, variant.stock > 0);
        assert_eq!(variant.options.len(), 2);
    }

    let black_1m = record
        .variants
        .iter()
        .find(|v| v.options["Color"].value == "Black" && v.options["Length"].value == "1m")
        .expect("Black/1m combination present");
    assert_eq!(black_1m.id, "9003");
    assert_eq!(black_1m.price, Some(2.99));
    assert_eq!(black_1m.stock, 0);
    assert!(!black_1m.available);

    // Summary entry first, then the DOM review.
    assert_eq!(record.reviews[0].kind, ReviewKind::Summary);
    assert_eq!(record.reviews[0].rating, 4.8);
    assert_eq!(record.reviews[0].total_count, Some(5214));
    let individual = record.reviews.iter().find(|r| r.kind == ReviewKind::Review).unwrap();
    assert_eq!(individual.author, "D***o");
    assert_eq!(individual.rating, 5.0);

    assert_eq!(record.specifications.len(), 3);
    assert_eq!(record.specifications.get("Max Current").map(String::as_str), Some("5A"));
}

#[test]
fn test_ebay_synthesized_cross_product() {
    let ctx = PageContext::new(EBAY_FIXTURE, "https://www.ebay.com/itm/394837261940");
    let record = extract(&ctx);

    assert_eq!(record.platform, "ebay");
    assert_eq!(record.external_id, "394837261940");
    assert_eq!(record.title, "Classic Cotton T-Shirt Crew Neck");
    assert_eq!(record.price.amount, 12.95);
    assert_eq!(record.original_price.as_ref().unwrap().amount, 18.5);

    // 3 colours x 4 sizes, synthesized from the axis menu alone.
    assert_eq!(record.variants.len(), 12);
    assert!(record.variants_consistent());
    for variant in &record.variants {
        assert!(variant.options.contains_key("Colour"));
        assert!(variant.options.contains_key("Size"));
        assert!(variant.available);
        assert!(variant.price.is_none());
        assert!(!variant.sku.is_empty());
    }

    // Same gallery id at two sizes collapses to one upgraded URL.
    assert_eq!(record.images.len(), 2);
    assert!(record.images.iter().all(|u| u.contains("s-l1600")));

    assert_eq!(record.specifications.get("Material").map(String::as_str), Some("100% Cotton"));
    assert_eq!(record.specifications.get("Condition").map(String::as_str), Some("New with tags"));
}

#[test]
fn test_generic_jsonld_extraction() {
    let ctx = PageContext::new(GENERIC_FIXTURE, "https://smallshop.io/products/kettle-09");
    let record = extract(&ctx);

    assert_eq!(record.platform, "generic");
    assert_eq!(record.title, "Gooseneck Pour-Over Kettle 0.9L");
    assert_eq!(record.brand, "BrewCraft");
    assert_eq!(record.sku, "KET-900-SS");
    // Without a URL id pattern the SKU stands in.
    assert_eq!(record.external_id, "KET-900-SS");

    // European decimal comma in the offer price.
    assert_eq!(record.price.amount, 34.9);
    assert_eq!(record.price.currency, "EUR");

    // Description markup is stripped.
    assert!(record.description.contains("stainless steel"));
    assert!(!record.description.contains('<'));

    // JSON-LD + og:image, deduplicated by filename.
    assert_eq!(record.images.len(), 2);

    assert_eq!(record.reviews.len(), 3);
    assert_eq!(record.reviews[0].kind, ReviewKind::Summary);
    assert_eq!(record.reviews[0].total_count, Some(87));
    assert_eq!(record.reviews[1].author, "Lena");
    assert_eq!(record.reviews[2].author, "Karim");
    assert_eq!(record.reviews[2].rating, 4.0);

    assert_eq!(record.specifications.get("Capacity").map(String::as_str), Some("0.9 L"));
}

#[test]
fn test_completeness_reporting() {
    let ctx = PageContext::new(
        ALIEXPRESS_FIXTURE,
        "https://www.aliexpress.com/item/1005007654321098.html",
    );
    let record = extract(&ctx);
    let report = CompletenessReport::evaluate(&record);

    // Everything filled except the description.
    assert_eq!(report.missing, vec!["description".to_string()]);
    assert_eq!(report.score, 90);
    assert!(report.importable());
    assert!(report.variant_coverage.unwrap() > 50);
}

#[test]
fn test_formatter_over_extracted_record() {
    let ctx = PageContext::new(EBAY_FIXTURE, "https://www.ebay.com/itm/394837261940");
    let record = extract(&ctx);

    let json = Formatter::new(OutputFormat::Json).format_record(&record);
    let parsed: shop_extract::ProductRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.variants.len(), record.variants.len());

    let table = Formatter::new(OutputFormat::Table).format_record(&record);
    assert!(table.contains("Classic Cotton T-Shirt Crew Neck"));
    assert!(table.contains("Variants:  12"));
    assert!(table.contains("... and 2 more"));
}

#[test]
fn test_unknown_platform_never_fails() {
    let ctx = PageContext::new("<html><body><p>404</p></body></html>", "https://nowhere.example");
    let record = extract(&ctx);
    assert_eq!(record.platform, "generic");
    assert!(record.title.is_empty());
    assert!(record.external_id.is_empty());
    let report = CompletenessReport::evaluate(&record);
    assert_eq!(report.score, 0);
}

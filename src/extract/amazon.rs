//! Amazon adapter: detail-page DOM plus twister variation data.

use crate::extract::context::find_json_object;
use crate::extract::generic;
use crate::extract::selectors::amazon as sel;
use crate::extract::{BasicInfo, Extractor, PageContext, Platform, Pricing};
use crate::model::{Money, OptionChoice, ReviewRecord, VariantRecord};
use crate::normalize::price::parse_price;
use crate::normalize::rating::{parse_rating, parse_review_count};
use crate::normalize::text::{cap_chars, clean_text, DESCRIPTION_CAP};
use serde_json::Value;
use std::collections::BTreeMap;

pub struct AmazonExtractor;

impl Extractor for AmazonExtractor {
    fn platform(&self) -> Platform {
        Platform::Amazon
    }

    fn basic_info(&self, ctx: &PageContext) -> BasicInfo {
        let title = ctx.first_text(&sel::TITLE).unwrap_or_default();

        let brand = ctx
            .first_text(&sel::BRAND)
            .map(|text| {
                text.trim_start_matches("Brand:")
                    .trim_start_matches("Visit the")
                    .trim_end_matches("Store")
                    .trim()
                    .to_string()
            })
            .unwrap_or_default();

        // Feature bullets are the closest thing to a description on a
        // detail page; the boilerplate fit-note is dropped.
        let bullets: Vec<String> = sel::FEATURE_BULLETS
            .iter()
            .flat_map(|s| ctx.document().select(s))
            .map(|e| clean_text(&e.text().collect::<String>()))
            .filter(|text| !text.is_empty() && !text.contains("Make sure this fits"))
            .collect();
        let description = cap_chars(&bullets.join("\n"), DESCRIPTION_CAP);

        let sku = ctx.platform().extract_external_id(ctx.url()).unwrap_or_default();

        BasicInfo { title, brand, description, sku }
    }

    fn pricing(&self, ctx: &PageContext) -> Pricing {
        let price = ctx
            .first_text(&sel::PRICE)
            .map(|text| parse_price(&text))
            .unwrap_or_else(|| Money::zero("USD"));
        let original_price = ctx
            .first_text(&sel::ORIGINAL_PRICE)
            .map(|text| parse_price(&text))
            .filter(|money| !money.is_zero());
        Pricing { price, original_price }
    }

    fn images(&self, ctx: &PageContext) -> Vec<String> {
        let mut candidates = Vec::new();

        if let Some(main) = ctx.first_attr(&sel::MAIN_IMAGE, &["data-old-hires", "src"]) {
            candidates.push(main);
        }

        for url in ctx.all_attrs(&sel::THUMB_IMAGES, &["src"]) {
            if !url.contains("sprite") && !url.contains("grey-pixel") {
                candidates.push(url);
            }
        }

        candidates
    }

    fn variants(&self, ctx: &PageContext) -> Vec<VariantRecord> {
        // Twister state maps each sibling ASIN to its dimension values;
        // combinations arrive ready-made, nothing to synthesize.
        let Some(asin_map) = twister_variations(ctx) else {
            return Vec::new();
        };

        let Value::Object(entries) = asin_map else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|(asin, dims)| {
                let Value::Object(dims) = dims else {
                    return None;
                };
                let mut variant = VariantRecord::new(asin.clone(), asin.clone());
                for (dim_name, dim_value) in dims {
                    let value = match dim_value {
                        Value::String(s) => clean_text(s),
                        other => other.to_string(),
                    };
                    if value.is_empty() {
                        continue;
                    }
                    variant.options.insert(axis_name(dim_name), OptionChoice::new(value));
                }
                (!variant.options.is_empty()).then_some(variant)
            })
            .collect()
    }

    fn reviews(&self, ctx: &PageContext) -> Vec<ReviewRecord> {
        let rating = ctx.first_text(&sel::RATING).as_deref().and_then(parse_rating);
        let count =
            ctx.first_text(&sel::REVIEW_COUNT).map(|text| parse_review_count(&text)).unwrap_or(0);

        match rating {
            Some(average) => vec![ReviewRecord::summary(average, count)],
            None if count > 0 => vec![ReviewRecord::summary(5.0, count)],
            None => Vec::new(),
        }
    }

    fn specifications(&self, ctx: &PageContext) -> BTreeMap<String, String> {
        let specs = generic::specifications(ctx);
        if !specs.is_empty() {
            return specs;
        }

        // Detail-bullets fallback: "Key : Value" list items.
        let mut specs = BTreeMap::new();
        for selector in sel::SPEC_ROW.iter() {
            for row in ctx.document().select(selector) {
                let text = clean_text(&row.text().collect::<String>());
                if let Some((key, value)) = text.split_once(':') {
                    let (key, value) = (key.trim(), value.trim());
                    if !key.is_empty() && !value.is_empty() {
                        specs.insert(key.to_string(), value.to_string());
                    }
                }
            }
        }
        specs
    }
}

/// Locates the twister `asinVariationValues` blob in inline scripts.
fn twister_variations(ctx: &PageContext) -> Option<Value> {
    for script in ctx.inline_scripts() {
        if !script.contains("asinVariationValues") {
            continue;
        }
        if let Some(raw) = find_json_object(&script, "\"asinVariationValues\"")
            .or_else(|| find_json_object(&script, "asinVariationValues"))
        {
            if let Ok(value) = serde_json::from_str::<Value>(raw) {
                return Some(value);
            }
        }
    }
    None
}

/// Twister dimension keys read like "color_name"; present them as
/// "Color".
fn axis_name(dim: &str) -> String {
    let stem = dim.strip_suffix("_name").unwrap_or(dim);
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::model::ReviewKind;

    const URL: &str = "https://www.amazon.com/dp/B08N5WRWNW";

    const DETAIL_PAGE: &str = r#"<html><body>
        <span id="productTitle"> Mechanical Keyboard TKL </span>
        <a id="bylineInfo">Visit the KeyCo Store</a>
        <div id="corePrice_feature_div">
            <span class="a-price"><span class="a-offscreen">$79.99</span></span>
            <span class="a-text-price"><span class="a-offscreen">$99.99</span></span>
        </div>
        <div id="imgTagWrapperId">
            <img id="landingImage" src="https://m.media-amazon.com/images/I/71kb._AC_SL300_.jpg"
                 data-old-hires="https://m.media-amazon.com/images/I/71kb._AC_SL1500_.jpg">
        </div>
        <div id="altImages">
            <img src="https://m.media-amazon.com/images/I/61side._AC_US40_.jpg">
            <img src="https://m.media-amazon.com/images/sprite/nav-sprite.png">
        </div>
        <div id="feature-bullets">
            <ul>
                <li><span>Hot-swappable switches</span></li>
                <li><span>Make sure this fits by entering your model number.</span></li>
                <li><span>Per-key RGB</span></li>
            </ul>
        </div>
        <span id="acrPopover"><span class="a-icon-alt">4.6 out of 5 stars</span></span>
        <span id="acrCustomerReviewText">8,412 ratings</span>
        <script>
            var twisterState = {
                "asinVariationValues": {
                    "B08N5WRWNW": {"color_name": "Black", "size_name": "TKL"},
                    "B08N5WRXYZ": {"color_name": "White", "size_name": "TKL"}
                }
            };
        </script>
    </body></html>"#;

    #[test]
    fn test_detail_page_basics() {
        let ctx = PageContext::new(DETAIL_PAGE, URL);
        let record = extract(&ctx);
        assert_eq!(record.external_id, "B08N5WRWNW");
        assert_eq!(record.title, "Mechanical Keyboard TKL");
        assert_eq!(record.brand, "KeyCo");
        assert!(record.description.contains("Hot-swappable"));
        assert!(!record.description.contains("Make sure this fits"));
    }

    #[test]
    fn test_detail_page_pricing() {
        let ctx = PageContext::new(DETAIL_PAGE, URL);
        let record = extract(&ctx);
        assert_eq!(record.price, Money::new(79.99, "USD"));
        assert_eq!(record.original_price, Some(Money::new(99.99, "USD")));
        assert_eq!(record.discount_percent(), Some(20));
    }

    #[test]
    fn test_images_prefer_hires_and_skip_sprites() {
        let ctx = PageContext::new(DETAIL_PAGE, URL);
        let record = extract(&ctx);
        // Size token stripped, sprite dropped, two unique images.
        assert_eq!(record.images.len(), 2);
        assert_eq!(record.images[0], "https://m.media-amazon.com/images/I/71kb.jpg");
        assert!(record.images.iter().all(|u| !u.contains("sprite")));
    }

    #[test]
    fn test_twister_variants_supplied_directly() {
        let ctx = PageContext::new(DETAIL_PAGE, URL);
        let record = extract(&ctx);
        assert_eq!(record.variants.len(), 2);
        assert!(record.variants_consistent());

        let white = record.variants.iter().find(|v| v.id == "B08N5WRXYZ").unwrap();
        assert_eq!(white.options["Color"].value, "White");
        assert_eq!(white.options["Size"].value, "TKL");
        // Amazon does not expose per-variant stock; defaults hold.
        assert!(white.available);
        assert!(white.price.is_none());
    }

    #[test]
    fn test_rating_summary() {
        let ctx = PageContext::new(DETAIL_PAGE, URL);
        let record = extract(&ctx);
        assert_eq!(record.reviews.len(), 1);
        let summary = &record.reviews[0];
        assert_eq!(summary.kind, ReviewKind::Summary);
        assert_eq!(summary.rating, 4.6);
        assert_eq!(summary.total_count, Some(8412));
    }

    #[test]
    fn test_missing_everything_yields_empty_record() {
        let ctx = PageContext::new("<html><body><div id='dp'></div></body></html>", URL);
        let record = extract(&ctx);
        assert_eq!(record.external_id, "B08N5WRWNW");
        assert!(record.title.is_empty());
        assert!(record.price.is_zero());
        assert!(record.variants.is_empty());
        assert!(record.reviews.is_empty());
    }

    #[test]
    fn test_axis_name() {
        assert_eq!(axis_name("color_name"), "Color");
        assert_eq!(axis_name("size_name"), "Size");
        assert_eq!(axis_name("style"), "Style");
    }

    #[test]
    fn test_spec_table() {
        let html = r#"<html><body>
            <table id="productDetails_techSpec_section_1">
                <tr><th>Connectivity</th><td>USB-C</td></tr>
                <tr><th>Layout</th><td>ANSI</td></tr>
            </table>
        </body></html>"#;
        let ctx = PageContext::new(html, URL);
        let record = extract(&ctx);
        assert_eq!(record.specifications.get("Connectivity").map(String::as_str), Some("USB-C"));
    }
}

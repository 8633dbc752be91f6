//! Walmart adapter: `__NEXT_DATA__` state with variant criteria.

use crate::extract::generic::{self, f64_field, str_field, value_to_u32};
use crate::extract::selectors::walmart as sel;
use crate::extract::{BasicInfo, Extractor, PageContext, Platform, Pricing};
use crate::model::{Money, ReviewRecord, VariantRecord};
use crate::normalize::price::parse_price;
use crate::normalize::text::sanitize_description;
use crate::variants::{generate, OptionGroup, OptionValue, DEFAULT_MAX_COMBINATIONS};
use scraper::Selector;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static NEXT_DATA_SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script#__NEXT_DATA__").unwrap());

pub struct WalmartExtractor;

/// The app state ships either as a dedicated `script#__NEXT_DATA__` tag
/// or as a `window.__NEXT_DATA__ = {...}` assignment.
fn next_data(ctx: &PageContext) -> Option<Value> {
    ctx.document()
        .select(&NEXT_DATA_SCRIPT)
        .next()
        .and_then(|script| serde_json::from_str(&script.text().collect::<String>()).ok())
        .or_else(|| ctx.script_json_after("__NEXT_DATA__"))
}

fn product(data: &Value) -> Option<&Value> {
    data.pointer("/props/pageProps/initialData/data/product")
}

fn reviews_node(data: &Value) -> Option<&Value> {
    data.pointer("/props/pageProps/initialData/data/reviews")
}

impl Extractor for WalmartExtractor {
    fn platform(&self) -> Platform {
        Platform::Walmart
    }

    fn basic_info(&self, ctx: &PageContext) -> BasicInfo {
        let mut info = BasicInfo::default();

        if let Some(data) = next_data(ctx) {
            if let Some(product) = product(&data) {
                info.title = str_field(product, &["name"]).unwrap_or_default();
                info.brand = str_field(product, &["brand"]).unwrap_or_default();
                info.description = str_field(product, &["shortDescription"])
                    .map(|d| sanitize_description(&d))
                    .unwrap_or_default();
                info.sku = str_field(product, &["usItemId", "id"]).unwrap_or_default();
            }
        }

        if info.title.is_empty() {
            let fallback = generic::basic_info(ctx);
            info.title = fallback.title;
            if info.brand.is_empty() {
                info.brand = fallback.brand;
            }
            if info.description.is_empty() {
                info.description = fallback.description;
            }
        }
        if info.title.is_empty() {
            info.title = ctx.first_text(&sel::TITLE).unwrap_or_default();
        }
        if info.sku.is_empty() {
            info.sku = ctx.platform().extract_external_id(ctx.url()).unwrap_or_default();
        }

        info
    }

    fn pricing(&self, ctx: &PageContext) -> Pricing {
        if let Some(data) = next_data(ctx) {
            if let Some(product) = product(&data) {
                let current = product
                    .pointer("/priceInfo/currentPrice")
                    .and_then(|p| f64_field(p, &["price"]));
                if let Some(amount) = current {
                    let currency = product
                        .pointer("/priceInfo/currentPrice")
                        .and_then(|p| str_field(p, &["currencyUnit"]))
                        .unwrap_or_else(|| "USD".to_string());
                    let original = product
                        .pointer("/priceInfo/wasPrice")
                        .and_then(|p| f64_field(p, &["price"]))
                        .filter(|was| *was > amount);
                    return Pricing {
                        price: Money::new(amount, currency.clone()),
                        original_price: original.map(|o| Money::new(o, currency)),
                    };
                }
            }
        }

        let price = ctx
            .first_text(&sel::PRICE)
            .map(|text| parse_price(&text))
            .unwrap_or_else(|| Money::zero("USD"));
        Pricing { price, original_price: None }
    }

    fn images(&self, ctx: &PageContext) -> Vec<String> {
        let mut candidates = Vec::new();

        if let Some(data) = next_data(ctx) {
            if let Some(images) = data
                .pointer("/props/pageProps/initialData/data/product/imageInfo/allImages")
                .and_then(Value::as_array)
            {
                for image in images {
                    if let Some(url) = str_field(image, &["url"]) {
                        candidates.push(url);
                    }
                }
            }
        }

        candidates.extend(ctx.all_attrs(&sel::IMAGES, &["src", "data-src"]));
        if let Some(og) = ctx.meta_content("og:image") {
            candidates.push(og);
        }
        candidates
    }

    fn variants(&self, ctx: &PageContext) -> Vec<VariantRecord> {
        let Some(data) = next_data(ctx) else {
            return Vec::new();
        };
        let Some(criteria) = product(&data)
            .and_then(|p| p.get("variantCriteria"))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };

        let groups: Vec<OptionGroup> = criteria
            .iter()
            .filter_map(|criterion| {
                let name = str_field(criterion, &["name"])?;
                let values: Vec<OptionValue> = criterion
                    .get("variantList")?
                    .as_array()?
                    .iter()
                    .filter_map(|entry| {
                        let label = str_field(entry, &["name"])?;
                        let mut value = OptionValue::new(label);
                        if let Some(Value::Array(images)) = entry.get("images") {
                            if let Some(url) = images.first().and_then(Value::as_str) {
                                value = value.with_image(url.to_string());
                            }
                        }
                        Some(value)
                    })
                    .collect();
                (!values.is_empty()).then(|| OptionGroup::new(name, values))
            })
            .collect();

        generate(&groups, DEFAULT_MAX_COMBINATIONS)
    }

    fn reviews(&self, ctx: &PageContext) -> Vec<ReviewRecord> {
        let Some(data) = next_data(ctx) else {
            return generic::reviews(ctx);
        };
        let Some(node) = reviews_node(&data) else {
            return generic::reviews(ctx);
        };

        let mut reviews = Vec::new();

        let average = f64_field(node, &["averageOverallRating"]).map(|v| v as f32);
        let count = node.get("totalReviewCount").and_then(value_to_u32).unwrap_or(0);
        if let Some(average) = average {
            reviews.push(ReviewRecord::summary(average, count));
        }

        if let Some(Value::Array(items)) = node.get("customerReviews") {
            for item in items {
                let author = str_field(item, &["userNickname", "author"]).unwrap_or_default();
                let content = str_field(item, &["reviewText", "text"]).unwrap_or_default();
                let date = str_field(item, &["reviewSubmissionTime", "date"]).unwrap_or_default();
                let rating = f64_field(item, &["rating"]).map(|v| v as f32);
                if !content.is_empty() {
                    reviews.push(ReviewRecord::new(author, &content, date, rating));
                }
            }
        }

        reviews
    }

    fn specifications(&self, ctx: &PageContext) -> BTreeMap<String, String> {
        let mut specs = BTreeMap::new();

        if let Some(data) = next_data(ctx) {
            if let Some(Value::Array(items)) = product(&data).and_then(|p| p.get("specifications"))
            {
                for item in items {
                    if let (Some(name), Some(value)) =
                        (str_field(item, &["name"]), str_field(item, &["value"]))
                    {
                        specs.insert(name, value);
                    }
                }
            }
        }

        if specs.is_empty() {
            return generic::specifications(ctx);
        }
        specs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::model::ReviewKind;

    const URL: &str = "https://www.walmart.com/ip/Stainless-Bottle/987654321";

    fn next_page() -> String {
        let next = serde_json::json!({
            "props": {"pageProps": {"initialData": {"data": {
                "product": {
                    "usItemId": "987654321",
                    "name": "Stainless Steel Water Bottle 32oz",
                    "brand": "HydroMax",
                    "shortDescription": "Keeps drinks cold for 24 hours.",
                    "priceInfo": {
                        "currentPrice": {"price": 14.97, "currencyUnit": "USD"},
                        "wasPrice": {"price": 19.97}
                    },
                    "imageInfo": {"allImages": [
                        {"url": "https://i5.walmartimages.com/asr/bottle-front.jpg"},
                        {"url": "https://i5.walmartimages.com/asr/bottle-side.jpg"}
                    ]},
                    "variantCriteria": [
                        {"name": "Color", "variantList": [
                            {"name": "Steel", "images": ["https://i5.walmartimages.com/asr/steel.jpg"]},
                            {"name": "Black", "images": []}
                        ]},
                        {"name": "Size", "variantList": [
                            {"name": "32oz"}, {"name": "40oz"}
                        ]}
                    ],
                    "specifications": [
                        {"name": "Capacity", "value": "32 oz"},
                        {"name": "Material", "value": "Stainless Steel"}
                    ]
                },
                "reviews": {
                    "averageOverallRating": 4.8,
                    "totalReviewCount": 1523,
                    "customerReviews": [
                        {"userNickname": "hiker22", "reviewText": "No leaks on the trail.",
                         "reviewSubmissionTime": "2024-06-11", "rating": 5}
                    ]
                }
            }}}}
        });
        format!(
            r#"<html><body><script id="__NEXT_DATA__" type="application/json">{next}</script></body></html>"#
        )
    }

    #[test]
    fn test_next_data_basics() {
        let ctx = PageContext::new(&next_page(), URL);
        let record = extract(&ctx);
        assert_eq!(record.external_id, "987654321");
        assert_eq!(record.title, "Stainless Steel Water Bottle 32oz");
        assert_eq!(record.brand, "HydroMax");
        assert_eq!(record.price, Money::new(14.97, "USD"));
        assert_eq!(record.original_price, Some(Money::new(19.97, "USD")));
        assert_eq!(record.discount_percent(), Some(25));
    }

    #[test]
    fn test_variant_criteria_cross_product() {
        let ctx = PageContext::new(&next_page(), URL);
        let record = extract(&ctx);
        // 2 colors x 2 sizes.
        assert_eq!(record.variants.len(), 4);
        assert!(record.variants_consistent());
        let steel_32 = record
            .variants
            .iter()
            .find(|v| v.options["Color"].value == "Steel" && v.options["Size"].value == "32oz")
            .unwrap();
        assert!(steel_32.options["Color"].image_url.as_deref().unwrap().contains("steel"));
    }

    #[test]
    fn test_reviews_from_next_data() {
        let ctx = PageContext::new(&next_page(), URL);
        let record = extract(&ctx);
        assert_eq!(record.reviews.len(), 2);
        assert_eq!(record.reviews[0].kind, ReviewKind::Summary);
        assert_eq!(record.reviews[0].rating, 4.8);
        assert_eq!(record.reviews[0].total_count, Some(1523));
        assert_eq!(record.reviews[1].author, "hiker22");
    }

    #[test]
    fn test_specifications_from_next_data() {
        let ctx = PageContext::new(&next_page(), URL);
        let record = extract(&ctx);
        assert_eq!(record.specifications.get("Capacity").map(String::as_str), Some("32 oz"));
        assert_eq!(record.specifications.len(), 2);
    }

    #[test]
    fn test_images_from_next_data() {
        let ctx = PageContext::new(&next_page(), URL);
        let record = extract(&ctx);
        assert_eq!(record.images.len(), 2);
        assert!(record.images[0].contains("bottle-front"));
    }

    #[test]
    fn test_dom_fallback() {
        let html = r#"<html><body>
            <h1 itemprop="name">Plain Bottle</h1>
            <span itemprop="price">$9.99</span>
        </body></html>"#;
        let ctx = PageContext::new(html, URL);
        let record = extract(&ctx);
        assert_eq!(record.title, "Plain Bottle");
        assert_eq!(record.price, Money::new(9.99, "USD"));
        assert!(record.variants.is_empty());
    }
}

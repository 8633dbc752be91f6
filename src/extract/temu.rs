//! Temu adapter: `rawData` page state with cent-denominated prices.

use crate::extract::generic::{self, str_field, value_to_f64, value_to_u32};
use crate::extract::selectors::temu as sel;
use crate::extract::{BasicInfo, Extractor, PageContext, Platform, Pricing};
use crate::model::{Money, OptionChoice, VariantRecord};
use crate::normalize::price::parse_price;
use crate::normalize::text::{clean_text, sanitize_description};
use serde_json::Value;

pub struct TemuExtractor;

fn raw_data(ctx: &PageContext) -> Option<Value> {
    ctx.script_json_after("window.rawData").or_else(|| ctx.script_json_after("rawData"))
}

/// The goods object moves around between page revisions.
fn goods(raw: &Value) -> Option<&Value> {
    raw.pointer("/store/goods").or_else(|| raw.get("goods"))
}

fn sku_list(raw: &Value) -> Option<&Vec<Value>> {
    let list = raw
        .pointer("/store/sku_list")
        .or_else(|| raw.get("sku_list"))
        .or_else(|| goods(raw).and_then(|g| g.get("sku_list")))?;
    list.as_array()
}

/// Temu prices arrive in minor units.
fn cents_to_major(value: f64) -> f64 {
    value / 100.0
}

impl Extractor for TemuExtractor {
    fn platform(&self) -> Platform {
        Platform::Temu
    }

    fn basic_info(&self, ctx: &PageContext) -> BasicInfo {
        let mut info = BasicInfo::default();

        if let Some(raw) = raw_data(ctx) {
            if let Some(goods) = goods(&raw) {
                info.title = str_field(goods, &["goods_name", "title"]).unwrap_or_default();
                info.brand = str_field(goods, &["mall_name", "brand"]).unwrap_or_default();
                info.description = str_field(goods, &["goods_desc", "description"])
                    .map(|d| sanitize_description(&d))
                    .unwrap_or_default();
                info.sku = str_field(goods, &["goods_id"]).unwrap_or_default();
            }
        }

        if info.title.is_empty() {
            info.title = ctx
                .first_text(&sel::TITLE)
                .or_else(|| ctx.meta_content("og:title"))
                .unwrap_or_default();
        }
        if info.sku.is_empty() {
            info.sku = ctx.platform().extract_external_id(ctx.url()).unwrap_or_default();
        }

        info
    }

    fn pricing(&self, ctx: &PageContext) -> Pricing {
        if let Some(raw) = raw_data(ctx) {
            if let Some(goods) = goods(&raw) {
                let price = goods
                    .get("min_price")
                    .or_else(|| goods.get("price"))
                    .and_then(value_to_f64)
                    .map(cents_to_major);
                if let Some(amount) = price {
                    let original = goods
                        .get("market_price")
                        .and_then(value_to_f64)
                        .map(cents_to_major)
                        .filter(|original| *original > amount);
                    let currency =
                        str_field(goods, &["currency"]).unwrap_or_else(|| "USD".to_string());
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

        if let Some(raw) = raw_data(ctx) {
            if let Some(Value::Array(gallery)) = goods(&raw).and_then(|g| g.get("gallery")) {
                for item in gallery {
                    match item {
                        Value::String(url) => candidates.push(url.clone()),
                        obj @ Value::Object(_) => {
                            if let Some(url) = str_field(obj, &["url"]) {
                                candidates.push(url);
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        candidates.extend(ctx.all_attrs(&sel::IMAGES, &["data-src", "src"]));
        if let Some(og) = ctx.meta_content("og:image") {
            candidates.push(og);
        }
        candidates
    }

    fn variants(&self, ctx: &PageContext) -> Vec<VariantRecord> {
        let Some(raw) = raw_data(ctx) else {
            return Vec::new();
        };
        let Some(rows) = sku_list(&raw) else {
            return Vec::new();
        };

        rows.iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let id = str_field(row, &["sku_id", "id"])
                    .unwrap_or_else(|| format!("temu-{index}"));
                let stock = row
                    .get("stock")
                    .or_else(|| row.get("quantity"))
                    .and_then(value_to_u32)
                    .unwrap_or(0);

                let mut variant =
                    VariantRecord::new(id.clone(), id).with_stock(stock);
                variant.price = row
                    .get("price")
                    .or_else(|| row.get("sale_price"))
                    .and_then(value_to_f64)
                    .map(cents_to_major);
                variant.original_price = row
                    .get("market_price")
                    .and_then(value_to_f64)
                    .map(cents_to_major)
                    .filter(|original| Some(*original) > variant.price);

                if let Some(Value::Array(specs)) = row.get("spec") {
                    for spec in specs {
                        let axis = str_field(spec, &["spec_key", "name"]);
                        let value = str_field(spec, &["spec_value", "value"]);
                        if let (Some(axis), Some(value)) = (axis, value) {
                            let mut choice = OptionChoice::new(clean_text(&value));
                            if let Some(thumb) = str_field(row, &["thumb_url"]) {
                                choice.image_url = Some(thumb);
                            }
                            variant.options.insert(clean_text(&axis), choice);
                        }
                    }
                }

                (!variant.options.is_empty()).then_some(variant)
            })
            .collect()
    }

    fn specifications(&self, ctx: &PageContext) -> std::collections::BTreeMap<String, String> {
        generic::specifications(ctx)
    }
}

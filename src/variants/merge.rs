//! Joins per-SKU pricing rows onto generated combinations.
//!
//! AliExpress and Temu expose a flat price list keyed by SKU id plus
//! the property-value ids making up each combination. Generated
//! combinations are matched against that list; combinations the list
//! does not cover keep their defaults (available, no own price).

use crate::model::VariantRecord;
use std::collections::HashMap;

/// One row of a platform's per-SKU price/stock table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkuOffer {
    pub sku_id: String,
    /// Property-value ids composing this combination, any order.
    pub prop_ids: Vec<String>,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub stock: u32,
}

impl SkuOffer {
    /// Canonical join key: the sorted property-value ids.
    fn prop_key(&self) -> Option<String> {
        if self.prop_ids.is_empty() {
            return None;
        }
        let mut ids = self.prop_ids.clone();
        ids.sort_unstable();
        Some(ids.join(","))
    }
}

/// Join key for a generated variant: the sorted source ids of its
/// option choices. None when any axis lacks a source id.
fn variant_prop_key(variant: &VariantRecord) -> Option<String> {
    let mut ids = Vec::with_capacity(variant.options.len());
    for choice in variant.options.values() {
        ids.push(choice.source_id.clone()?);
    }
    ids.sort_unstable();
    Some(ids.join(","))
}

/// Merges offers onto variants in place.
///
/// Matching is by property-id set first, then by SKU id. A matched
/// variant takes the offer's identity (real SKU id), price, stock and
/// derived availability; the original price is kept only when it is
/// actually above the sale price.
pub fn merge_offers(variants: &mut [VariantRecord], offers: &[SkuOffer]) {
    if offers.is_empty() {
        return;
    }

    let by_props: HashMap<String, &SkuOffer> =
        offers.iter().filter_map(|o| o.prop_key().map(|k| (k, o))).collect();
    let by_sku: HashMap<&str, &SkuOffer> =
        offers.iter().map(|o| (o.sku_id.as_str(), o)).collect();

    for variant in variants.iter_mut() {
        let offer = variant_prop_key(variant)
            .and_then(|key| by_props.get(&key).copied())
            .or_else(|| by_sku.get(variant.id.as_str()).copied());

        let Some(offer) = offer else {
            continue;
        };

        if !offer.sku_id.is_empty() {
            variant.id = offer.sku_id.clone();
            variant.sku = offer.sku_id.clone();
        }
        variant.price = offer.price;
        variant.original_price = match (offer.original_price, offer.price) {
            (Some(original), Some(sale)) if original > sale => Some(original),
            (Some(original), None) => Some(original),
            _ => None,
        };
        variant.stock = offer.stock;
        variant.available = offer.stock > 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::{generate_with_stamp, OptionGroup, OptionValue};

    fn generated() -> Vec<VariantRecord> {
        let groups = vec![
            OptionGroup::new(
                "Color",
                vec![OptionValue::new("Black").with_id("14"), OptionValue::new("White").with_id("29")],
            ),
            OptionGroup::new(
                "Size",
                vec![OptionValue::new("M").with_id("200"), OptionValue::new("L").with_id("201")],
            ),
        ];
        generate_with_stamp(&groups, 500, "t0".into())
    }

    fn offer(sku: &str, props: &[&str], price: f64, stock: u32) -> SkuOffer {
        SkuOffer {
            sku_id: sku.to_string(),
            prop_ids: props.iter().map(ToString::to_string).collect(),
            price: Some(price),
            original_price: None,
            stock,
        }
    }

    #[test]
    fn test_merge_by_prop_ids() {
        let mut variants = generated();
        let offers = vec![
            offer("sku-1", &["14", "200"], 9.99, 5),
            offer("sku-2", &["14", "201"], 10.99, 0),
            offer("sku-3", &["29", "200"], 9.99, 2),
            offer("sku-4", &["29", "201"], 11.49, 7),
        ];

        merge_offers(&mut variants, &offers);
        assert_eq!(variants.len(), 4);

        let black_m = variants
            .iter()
            .find(|v| v.options["Color"].value == "Black" && v.options["Size"].value == "M")
            .unwrap();
        assert_eq!(black_m.id, "sku-1");
        assert_eq!(black_m.price, Some(9.99));
        assert_eq!(black_m.stock, 5);
        assert!(black_m.available);

        let black_l = variants
            .iter()
            .find(|v| v.options["Color"].value == "Black" && v.options["Size"].value == "L")
            .unwrap();
        assert_eq!(black_l.stock, 0);
        assert!(!black_l.available, "zero stock must read as unavailable");
    }

    #[test]
    fn test_merge_prop_id_order_insensitive() {
        let mut variants = generated();
        let offers = vec![offer("sku-1", &["200", "14"], 12.0, 1)];
        merge_offers(&mut variants, &offers);
        assert!(variants.iter().any(|v| v.id == "sku-1" && v.price == Some(12.0)));
    }

    #[test]
    fn test_unmatched_keeps_defaults() {
        let mut variants = generated();
        let offers = vec![offer("sku-1", &["14", "200"], 9.99, 5)];
        merge_offers(&mut variants, &offers);

        let unmatched: Vec<_> = variants.iter().filter(|v| v.id != "sku-1").collect();
        assert_eq!(unmatched.len(), 3);
        for variant in unmatched {
            assert!(variant.available);
            assert!(variant.price.is_none());
            assert_eq!(variant.stock, 0);
        }
    }

    #[test]
    fn test_merge_empty_offers_is_noop() {
        let mut variants = generated();
        let before = variants.len();
        merge_offers(&mut variants, &[]);
        assert_eq!(variants.len(), before);
        assert!(variants.iter().all(|v| v.price.is_none()));
    }

    #[test]
    fn test_original_price_only_kept_when_above_sale() {
        let mut variants = generated();
        let mut cheap = offer("sku-1", &["14", "200"], 9.99, 5);
        cheap.original_price = Some(5.0);
        let mut real = offer("sku-2", &["14", "201"], 9.99, 5);
        real.original_price = Some(19.99);
        merge_offers(&mut variants, &[cheap, real]);

        let v1 = variants.iter().find(|v| v.id == "sku-1").unwrap();
        assert!(v1.original_price.is_none());
        let v2 = variants.iter().find(|v| v.id == "sku-2").unwrap();
        assert_eq!(v2.original_price, Some(19.99));
    }

    #[test]
    fn test_merge_by_sku_id_fallback() {
        // Variants without source ids can still match on their own id.
        let mut variant = VariantRecord::new("ABC123", "ABC123");
        variant
            .options
            .insert("Style".to_string(), crate::model::OptionChoice::new("Plain"));
        let mut variants = vec![variant];

        let offers = vec![offer("ABC123", &[], 4.5, 3)];
        merge_offers(&mut variants, &offers);
        assert_eq!(variants[0].price, Some(4.5));
        assert_eq!(variants[0].stock, 3);
    }
}

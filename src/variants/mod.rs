//! Variant cross-product generation from independent option axes.
//!
//! Platforms either supply per-combination rows directly (in which case
//! the extractor builds `VariantRecord`s itself) or only the option
//! lists, in which case the full cross-product is synthesized here and
//! optionally enriched with per-SKU pricing via [`merge`].

pub mod merge;

use crate::model::{OptionChoice, VariantRecord};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Default ceiling on synthesized combinations. A page with many axes
/// can otherwise explode combinatorially; generation truncates at the
/// cap, keeping the earliest combinations in axis order.
pub const DEFAULT_MAX_COMBINATIONS: usize = 500;

/// One value of an option axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionValue {
    /// Platform-assigned value id, when the source exposes one.
    pub id: Option<String>,
    pub name: String,
    pub image: Option<String>,
}

impl OptionValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: None, name: name.into(), image: None }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// One independent option axis (e.g. Color) and its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup {
    pub name: String,
    pub values: Vec<OptionValue>,
}

impl OptionGroup {
    pub fn new(name: impl Into<String>, values: Vec<OptionValue>) -> Self {
        Self { name: name.into(), values }
    }
}

/// Generates the full cross-product of the given option groups.
///
/// Zero groups produce zero variants: a product without option axes
/// stands on its own rather than carrying a synthetic default variant.
/// Output is truncated at `max_combinations` with a warning.
pub fn generate(groups: &[OptionGroup], max_combinations: usize) -> Vec<VariantRecord> {
    generate_with_stamp(groups, max_combinations, timestamp_fragment())
}

/// Deterministic variant of [`generate`] taking an explicit SKU suffix.
pub fn generate_with_stamp(
    groups: &[OptionGroup],
    max_combinations: usize,
    stamp: String,
) -> Vec<VariantRecord> {
    if groups.is_empty() {
        return Vec::new();
    }

    let expected: usize = groups.iter().map(|g| g.values.len()).product();
    let mut variants = Vec::with_capacity(expected.min(max_combinations));
    let mut partial = Vec::with_capacity(groups.len());
    build(groups, 0, &mut partial, &mut variants, max_combinations, &stamp);

    if expected > variants.len() {
        warn!(
            expected,
            kept = variants.len(),
            "variant cross-product exceeded ceiling, output truncated"
        );
    }

    variants
}

/// Depth-first recursion: one level per option group, emitting a record
/// at the final depth.
fn build<'a>(
    groups: &'a [OptionGroup],
    depth: usize,
    partial: &mut Vec<(&'a str, &'a OptionValue)>,
    out: &mut Vec<VariantRecord>,
    max: usize,
    stamp: &str,
) {
    if out.len() >= max {
        return;
    }

    if depth == groups.len() {
        let mut variant = VariantRecord::new(format!("var-{stamp}-{}", out.len()), synth_sku(partial, stamp));
        for (axis, value) in partial.iter() {
            let mut choice = OptionChoice::new(&value.name);
            choice.source_id = value.id.clone();
            choice.image_url = value.image.clone();
            variant.options.insert((*axis).to_string(), choice);
        }
        out.push(variant);
        return;
    }

    let group = &groups[depth];
    for value in &group.values {
        partial.push((group.name.as_str(), value));
        build(groups, depth + 1, partial, out, max, stamp);
        partial.pop();
    }
}

/// SKU synthesized from the combination: first three letters of each
/// value, uppercased and hyphen-joined, suffixed with the timestamp
/// fragment.
fn synth_sku(partial: &[(&str, &OptionValue)], stamp: &str) -> String {
    let mut parts: Vec<String> = partial
        .iter()
        .map(|(_, value)| value.name.chars().take(3).collect::<String>().to_uppercase())
        .collect();
    parts.push(stamp.to_uppercase());
    parts.join("-")
}

/// Base-36 fragment of the current unix-epoch milliseconds.
fn timestamp_fragment() -> String {
    let millis =
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or_default();
    to_base36(millis)
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

//! Prioritized CSS selector chains per marketplace.
//!
//! Each field is an ordered list of selectors tried first-to-last;
//! the first one yielding data wins. Update the relevant chain when a
//! marketplace ships new markup - capture an HTML sample and add a
//! fixture alongside the change.

use scraper::Selector;
use std::sync::LazyLock;

/// Builds a chain, dropping any selector that fails to parse.
pub fn chain(sources: &[&str]) -> Vec<Selector> {
    sources.iter().filter_map(|src| Selector::parse(src).ok()).collect()
}

pub mod aliexpress {
    use super::*;

    pub static TITLE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&[
            "h1[data-pl='product-title']",
            ".product-title-text",
            "h1[class*='title']",
            "h1",
        ])
    });

    pub static PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&[
            ".product-price-value",
            ".product-price-current",
            "[class*='price-current']",
            ".uniform-banner-box-price",
        ])
    });

    pub static ORIGINAL_PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&[".product-price-del", "[class*='price-original']", "[class*='origin-price']", "del"])
    });

    pub static STORE: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&[".store-name", "[class*='store-name']", ".shop-name a"]));

    pub static DESCRIPTION: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&[".product-description", "#product-description", ".detail-desc"])
    });

    pub static IMAGES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&[
            ".images-view-item img",
            "[class*='slider'] img",
            "[class*='gallery'] img",
            "[class*='thumbnail'] img",
        ])
    });

    /// One container per option axis.
    pub static SKU_PROPERTY: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&[".sku-property", "[class*='sku-property']"]));

    pub static SKU_PROPERTY_NAME: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&[".sku-property-text", "[class*='sku-title']"]));

    pub static SKU_PROPERTY_ITEM: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&[".sku-property-item", "[class*='sku-item']"]));

    pub static REVIEW_ITEM: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&[".feedback-item", "[class*='review-item']"]));

    pub static REVIEW_AUTHOR: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&[".user-name", "[class*='user-name']", "[class*='reviewer']"]));

    pub static REVIEW_CONTENT: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&[".buyer-feedback", "[class*='feedback-content']", "[class*='content']"]));

    pub static REVIEW_DATE: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&[".r-time", "[class*='feedback-time']", "[class*='date']"]));

    pub static REVIEW_STARS: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&[".star-view", "[class*='star']"]));

    pub static SPEC_ROW: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&["[class*='specification'] li", "[class*='property-item']"])
    });
}

pub mod amazon {
    use super::*;

    pub static TITLE: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&["#productTitle", "#title span", ".product-title-word-break"]));

    pub static PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&[
            "#corePrice_feature_div .a-price .a-offscreen",
            "#priceblock_ourprice",
            "#priceblock_dealprice",
            ".a-price .a-offscreen",
        ])
    });

    pub static ORIGINAL_PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&[
            "#corePrice_feature_div .a-text-price .a-offscreen",
            ".a-text-price .a-offscreen",
            "span[data-a-strike='true'] .a-offscreen",
        ])
    });

    pub static MAIN_IMAGE: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&["#landingImage", "#imgTagWrapperId img", "#imgBlkFront"]));

    pub static THUMB_IMAGES: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&["#altImages img"]));

    pub static BRAND: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&["#bylineInfo", ".po-brand .po-break-word"]));

    pub static FEATURE_BULLETS: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&["#feature-bullets li span"]));

    pub static RATING: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&["#acrPopover span.a-icon-alt", ".a-icon-star span.a-icon-alt"]));

    pub static REVIEW_COUNT: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&["#acrCustomerReviewText", "#acrCustomerReviewLink span"]));

    pub static AVAILABILITY: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&["#availability span", ".a-color-success"]));

    pub static SPEC_ROW: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&["#productDetails_techSpec_section_1 tr", ".prodDetTable tr", "#detailBullets_feature_div li"])
    });
}

pub mod ebay {
    use super::*;

    pub static TITLE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&["h1.x-item-title__mainTitle span", "h1.x-item-title__mainTitle", "#itemTitle"])
    });

    pub static PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&[
            ".x-price-primary span",
            "[data-testid='x-price-primary'] .ux-textspans",
            "#prcIsum",
            "[itemprop='price']",
        ])
    });

    pub static ORIGINAL_PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&[".x-additional-info .ux-textspans--strikethrough", ".ux-textspans--strikethrough"])
    });

    pub static IMAGES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&[
            ".ux-image-carousel img",
            ".ux-image-carousel-item img",
            ".vi-image-gallery__image img",
            "#icImg",
        ])
    });

    pub static SELLER: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&[".x-sellercard-atf__info a", ".x-sellercard-atf__info__about-seller"]));

    pub static CONDITION: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&[".x-item-condition-text .ux-textspans", ".x-item-condition-text"])
    });

    pub static SPEC_LABELS: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&[".ux-labels-values__labels"]));

    pub static SPEC_VALUES: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&[".ux-labels-values__values"]));

    pub static REVIEW_ITEM: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&[".fdbk-container", "[class*='review-item']"]));

    pub static REVIEW_AUTHOR: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&[".fdbk-container__details__info__username", "[class*='author']"]));

    pub static REVIEW_CONTENT: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&[".fdbk-container__details__comment", "[class*='comment']"]));
}

pub mod temu {
    use super::*;

    pub static TITLE: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&["h1[class*='goods']", "[class*='goodsName']", "h1"]));

    pub static PRICE: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&["[class*='curPrice']", "[data-testid='price']", "[class*='price']"]));

    pub static IMAGES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&["[class*='goods-gallery'] img", "[class*='imgBox'] img", "[class*='gallery'] img"])
    });
}

pub mod shein {
    use super::*;

    pub static TITLE: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&[".product-intro__head-name", "h1[class*='product-intro']", "h1"]));

    pub static PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&[".product-intro__head-price .from", "[class*='head-price']", "[class*='price']"])
    });

    pub static IMAGES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&[".product-intro__main-image img", ".crop-image-container img", "[class*='gallery'] img"])
    });

    /// Size selector buttons, one axis.
    pub static SIZE_ITEM: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&[".product-intro__size-radio", "[class*='size-radio']", "[class*='size-item']"])
    });
}

pub mod walmart {
    use super::*;

    pub static TITLE: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&["h1[itemprop='name']", "h1#main-title", "h1"]));

    pub static PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&["[itemprop='price']", "[data-testid='price-wrap'] span", "[class*='price']"])
    });

    pub static IMAGES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&["[data-testid='media-thumbnail'] img", "[data-testid='vertical-carousel'] img", "img[loading]"])
    });
}

pub mod generic {
    use super::*;

    pub static TITLE: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&["h1[itemprop='name']", "h1.product-title", "h1"]));

    pub static PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&["[data-testid='price']", "[itemprop='price']", ".price", ".Price", "[class*='price']"])
    });

    pub static ORIGINAL_PRICE: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&["del", "s", "[class*='compare-at']", "[class*='original-price']"]));

    pub static IMAGES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        chain(&[
            "[data-testid='product-image'] img",
            ".product-image img",
            ".gallery img",
            "#main-image",
            "img[data-zoom-image]",
        ])
    });

    pub static SPEC_TABLE_ROW: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&["table tr"]));

    pub static VIDEO: LazyLock<Vec<Selector>> =
        LazyLock::new(|| chain(&["video source", "video"]));
}

//! JSON-LD structured data checks
//!
//! Every `<script type="application/ld+json">` block is parsed on its own.
//! Blocks that fail to parse are ignored, and a top-level array contributes
//! each of its items. When several items match, the last one wins.

use super::{CheckEvaluationError, CheckStatus, Finding};
use crate::audit::context::AuditContext;
use serde_json::{json, Value};

pub(super) const JSON_LD_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

/// All JSON-LD items on the page, in document order
fn json_ld_items(ctx: &AuditContext) -> Result<Vec<Value>, CheckEvaluationError> {
    let mut items = Vec::new();
    for script in ctx.select(JSON_LD_SELECTOR)? {
        let raw: String = script.text().collect();
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(values)) => items.extend(values),
            Ok(value) => items.push(value),
            Err(e) => tracing::debug!("Ignoring unparseable JSON-LD block: {}", e),
        }
    }
    Ok(items)
}

/// `@type` is exactly `"Product"`
fn is_exact_product(item: &Value) -> bool {
    item.get("@type").and_then(Value::as_str) == Some("Product")
}

/// `@type` mentions Product, either as a substring or as an array member
fn mentions_product(item: &Value) -> bool {
    match item.get("@type") {
        Some(Value::String(t)) => t.contains("Product"),
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Product")),
        _ => false,
    }
}

/// Loose truthiness for JSON values
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Field of `value` if present and truthy
fn truthy_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| is_truthy(v))
}

/// Offers of every exact Product item, flattening offer arrays
fn product_offers(items: &[Value]) -> Vec<&Value> {
    items
        .iter()
        .filter(|item| is_exact_product(item))
        .filter_map(|item| truthy_field(item, "offers"))
        .flat_map(|offers| match offers {
            Value::Array(list) => list.iter().collect::<Vec<_>>(),
            single => vec![single],
        })
        .collect()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(super) fn schema_product(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let items = json_ld_items(ctx)?;
    let product = items.iter().filter(|item| mentions_product(item)).last();

    let Some(product) = product else {
        return Ok(Finding::new(CheckStatus::Fail, "No Product schema found")
            .with_fix_hint_if(true, "Add Product structured data (JSON-LD)"));
    };

    let name = product.get("name").cloned().unwrap_or(Value::Null);
    let brand = product
        .get("brand")
        .and_then(|b| b.get("name"))
        .cloned()
        .unwrap_or(Value::Null);

    Ok(Finding::new(CheckStatus::Pass, "Product schema found")
        .with_evidence(json!({ "name": name, "brand": brand })))
}

pub(super) fn schema_offer(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let items = json_ld_items(ctx)?;
    let offers = items
        .iter()
        .filter(|item| is_exact_product(item))
        .filter_map(|item| truthy_field(item, "offers"))
        .last();

    let Some(offers) = offers else {
        return Ok(Finding::new(CheckStatus::Fail, "No Offer schema in Product")
            .with_fix_hint_if(
                true,
                "Add Offer data to Product schema with price and availability",
            ));
    };

    // An offer list carries no single price
    let price = offers.get("price").cloned().unwrap_or(Value::Null);
    let currency = offers.get("priceCurrency").cloned().unwrap_or(Value::Null);

    Ok(Finding::new(CheckStatus::Pass, "Offer schema found")
        .with_evidence(json!({ "price": price, "currency": currency })))
}

pub(super) fn schema_offer_price(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let items = json_ld_items(ctx)?;
    let price = product_offers(&items)
        .into_iter()
        .filter_map(|offer| truthy_field(offer, "price").or_else(|| truthy_field(offer, "lowPrice")))
        .last()
        .cloned();

    let finding = match &price {
        Some(value) => Finding::new(
            CheckStatus::Pass,
            format!("Price found: {}", display_value(value)),
        ),
        None => Finding::new(CheckStatus::Fail, "No price in Offer schema"),
    };

    Ok(finding
        .with_fix_hint_if(price.is_none(), "Add price to Offer schema")
        .with_evidence(json!({ "price": price })))
}

pub(super) fn schema_offer_availability(
    ctx: &AuditContext,
) -> Result<Finding, CheckEvaluationError> {
    let items = json_ld_items(ctx)?;
    let availability = product_offers(&items)
        .into_iter()
        .filter_map(|offer| truthy_field(offer, "availability"))
        .last()
        .cloned();

    let finding = if availability.is_some() {
        Finding::new(CheckStatus::Pass, "Availability status found")
    } else {
        Finding::new(CheckStatus::Warn, "No availability in Offer schema")
    };

    Ok(finding
        .with_fix_hint_if(
            availability.is_none(),
            "Add availability to Offer schema (e.g., InStock, OutOfStock)",
        )
        .with_evidence(json!({ "availability": availability })))
}

pub(super) fn schema_reviews(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let items = json_ld_items(ctx)?;
    let reviewed = items
        .iter()
        .filter(|item| is_exact_product(item))
        .filter(|item| {
            truthy_field(item, "aggregateRating").is_some() || truthy_field(item, "review").is_some()
        })
        .last();

    let Some(product) = reviewed else {
        return Ok(Finding::new(
            CheckStatus::Skip,
            "No review schema (optional but recommended)",
        )
        .with_fix_hint_if(true, "Consider adding AggregateRating and Review schema"));
    };

    let rating = product.get("aggregateRating");
    let field = |key: &str| {
        rating
            .and_then(|r| r.get(key))
            .cloned()
            .unwrap_or(Value::Null)
    };

    Ok(Finding::new(CheckStatus::Pass, "Review/rating schema found").with_evidence(json!({
        "ratingValue": field("ratingValue"),
        "reviewCount": field("reviewCount"),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::fetcher::ResponseHeaders;

    fn page(blocks: &[&str]) -> AuditContext {
        let scripts: String = blocks
            .iter()
            .map(|b| format!(r#"<script type="application/ld+json">{}</script>"#, b))
            .collect();
        let html = format!("<html><head>{}</head><body></body></html>", scripts);
        AuditContext::from_parts("https://a.com/p", 200, 10, &html, ResponseHeaders::default())
    }

    const FULL_PRODUCT: &str = r#"{
        "@type": "Product",
        "name": "Widget",
        "brand": {"name": "Acme"},
        "offers": {"price": "19.99", "priceCurrency": "USD", "availability": "InStock"},
        "aggregateRating": {"ratingValue": 4.5, "reviewCount": 12}
    }"#;

    #[test]
    fn test_full_product_passes_everything() {
        let ctx = page(&[FULL_PRODUCT]);
        for check in [
            schema_product,
            schema_offer,
            schema_offer_price,
            schema_offer_availability,
            schema_reviews,
        ] {
            assert_eq!(check(&ctx).unwrap().status, CheckStatus::Pass);
        }

        let product = schema_product(&ctx).unwrap().evidence.unwrap();
        assert_eq!(product["name"], "Widget");
        assert_eq!(product["brand"], "Acme");

        assert_eq!(schema_offer_price(&ctx).unwrap().message, "Price found: 19.99");
    }

    #[test]
    fn test_no_structured_data() {
        let ctx = page(&[]);
        assert_eq!(schema_product(&ctx).unwrap().status, CheckStatus::Fail);
        assert_eq!(schema_offer(&ctx).unwrap().status, CheckStatus::Fail);
        assert_eq!(schema_offer_price(&ctx).unwrap().status, CheckStatus::Fail);
        assert_eq!(schema_offer_availability(&ctx).unwrap().status, CheckStatus::Warn);

        let reviews = schema_reviews(&ctx).unwrap();
        assert_eq!(reviews.status, CheckStatus::Skip);
        assert!(reviews.fix_hint.is_some());
    }

    #[test]
    fn test_invalid_blocks_are_ignored() {
        let ctx = page(&["{not json", FULL_PRODUCT]);
        assert_eq!(schema_product(&ctx).unwrap().status, CheckStatus::Pass);
    }

    #[test]
    fn test_top_level_arrays_are_flattened() {
        let ctx = page(&[r#"[{"@type": "Organization"}, {"@type": "Product", "offers": {"price": 5}}]"#]);
        assert_eq!(schema_product(&ctx).unwrap().status, CheckStatus::Pass);
        assert_eq!(schema_offer_price(&ctx).unwrap().message, "Price found: 5");
    }

    #[test]
    fn test_type_array_counts_for_presence_only() {
        let ctx = page(&[r#"{"@type": ["Product", "Thing"], "offers": {"price": 5}}"#]);
        assert_eq!(schema_product(&ctx).unwrap().status, CheckStatus::Pass);
        assert_eq!(schema_offer(&ctx).unwrap().status, CheckStatus::Fail);
    }

    #[test]
    fn test_offer_arrays_and_low_price() {
        let ctx = page(&[r#"{"@type": "Product", "offers": [
            {"price": 0},
            {"lowPrice": "9.00", "availability": "InStock"}
        ]}"#]);
        let price = schema_offer_price(&ctx).unwrap();
        assert_eq!(price.status, CheckStatus::Pass);
        assert_eq!(price.message, "Price found: 9.00");
        assert_eq!(schema_offer_availability(&ctx).unwrap().status, CheckStatus::Pass);
    }

    #[test]
    fn test_zero_and_empty_prices_are_missing() {
        let ctx = page(&[r#"{"@type": "Product", "offers": {"price": 0, "lowPrice": ""}}"#]);
        assert_eq!(schema_offer(&ctx).unwrap().status, CheckStatus::Pass);
        assert_eq!(schema_offer_price(&ctx).unwrap().status, CheckStatus::Fail);
    }

    #[test]
    fn test_review_without_rating() {
        let ctx = page(&[r#"{"@type": "Product", "review": [{"author": "x"}]}"#]);
        let result = schema_reviews(&ctx).unwrap();
        assert_eq!(result.status, CheckStatus::Pass);
        assert_eq!(result.evidence.unwrap()["ratingValue"], Value::Null);
    }
}

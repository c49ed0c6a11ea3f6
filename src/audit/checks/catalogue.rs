use super::{ai_readiness, content, indexability, metadata, schema, variant_risk};
use super::{Category, CheckDefinition, Severity};

/// Every check, in evaluation order
pub static CATALOGUE: &[CheckDefinition] = &[
    CheckDefinition {
        id: "http_status_ok",
        name: "HTTP Status OK",
        category: Category::Indexability,
        severity: Severity::Critical,
        weight: 10,
        evaluate: indexability::http_status_ok,
    },
    CheckDefinition {
        id: "no_noindex",
        name: "No Noindex Tag",
        category: Category::Indexability,
        severity: Severity::Critical,
        weight: 10,
        evaluate: indexability::no_noindex,
    },
    CheckDefinition {
        id: "canonical_present",
        name: "Canonical Tag Present",
        category: Category::Indexability,
        severity: Severity::High,
        weight: 8,
        evaluate: indexability::canonical_present,
    },
    CheckDefinition {
        id: "canonical_self",
        name: "Canonical Points to Self",
        category: Category::Indexability,
        severity: Severity::Medium,
        weight: 5,
        evaluate: indexability::canonical_self,
    },
    CheckDefinition {
        id: "title_present",
        name: "Title Tag Present",
        category: Category::Metadata,
        severity: Severity::Critical,
        weight: 10,
        evaluate: metadata::title_present,
    },
    CheckDefinition {
        id: "title_length",
        name: "Title Length Optimal",
        category: Category::Metadata,
        severity: Severity::Medium,
        weight: 5,
        evaluate: metadata::title_length,
    },
    CheckDefinition {
        id: "meta_desc_present",
        name: "Meta Description Present",
        category: Category::Metadata,
        severity: Severity::High,
        weight: 8,
        evaluate: metadata::meta_desc_present,
    },
    CheckDefinition {
        id: "meta_desc_length",
        name: "Meta Description Length Optimal",
        category: Category::Metadata,
        severity: Severity::Low,
        weight: 3,
        evaluate: metadata::meta_desc_length,
    },
    CheckDefinition {
        id: "h1_present",
        name: "H1 Tag Present",
        category: Category::Content,
        severity: Severity::High,
        weight: 8,
        evaluate: content::h1_present,
    },
    CheckDefinition {
        id: "h1_single",
        name: "Single H1 Tag",
        category: Category::Content,
        severity: Severity::Low,
        weight: 3,
        evaluate: content::h1_single,
    },
    CheckDefinition {
        id: "images_present",
        name: "Product Images Present",
        category: Category::Content,
        severity: Severity::High,
        weight: 8,
        evaluate: content::images_present,
    },
    CheckDefinition {
        id: "images_have_alt",
        name: "Images Have Alt Text",
        category: Category::Content,
        severity: Severity::Medium,
        weight: 5,
        evaluate: content::images_have_alt,
    },
    CheckDefinition {
        id: "content_length",
        name: "Sufficient Content Length",
        category: Category::Content,
        severity: Severity::Medium,
        weight: 5,
        evaluate: content::content_length,
    },
    CheckDefinition {
        id: "schema_product",
        name: "Product Schema Present",
        category: Category::Schema,
        severity: Severity::High,
        weight: 10,
        evaluate: schema::schema_product,
    },
    CheckDefinition {
        id: "schema_offer",
        name: "Offer Schema Present",
        category: Category::Schema,
        severity: Severity::High,
        weight: 8,
        evaluate: schema::schema_offer,
    },
    CheckDefinition {
        id: "schema_offer_price",
        name: "Offer Has Price",
        category: Category::Schema,
        severity: Severity::High,
        weight: 8,
        evaluate: schema::schema_offer_price,
    },
    CheckDefinition {
        id: "schema_offer_availability",
        name: "Offer Has Availability",
        category: Category::Schema,
        severity: Severity::Medium,
        weight: 5,
        evaluate: schema::schema_offer_availability,
    },
    CheckDefinition {
        id: "schema_reviews",
        name: "Review/Rating Schema",
        category: Category::Schema,
        severity: Severity::Medium,
        weight: 5,
        evaluate: schema::schema_reviews,
    },
    CheckDefinition {
        id: "url_clean",
        name: "Clean URL Structure",
        category: Category::VariantRisk,
        severity: Severity::Low,
        weight: 3,
        evaluate: variant_risk::url_clean,
    },
    CheckDefinition {
        id: "structured_specs",
        name: "Structured Product Specs",
        category: Category::AiReadiness,
        severity: Severity::Low,
        weight: 3,
        evaluate: ai_readiness::structured_specs,
    },
    CheckDefinition {
        id: "faq_present",
        name: "FAQ Section Present",
        category: Category::AiReadiness,
        severity: Severity::Low,
        weight: 3,
        evaluate: ai_readiness::faq_present,
    },
    CheckDefinition {
        id: "response_time",
        name: "Fast Response Time",
        category: Category::Indexability,
        severity: Severity::Medium,
        weight: 5,
        evaluate: indexability::response_time,
    },
];

//! Weighted scoring of check results
//!
//! # Algorithm
//!
//! 1. Every check in the catalogue adds its weight to its category total
//! 2. PASS earns the full weight, WARN half, FAIL and SKIP nothing
//! 3. Category score = round(earned / total * 100), or 100 for an empty category
//! 4. Overall score = round(weighted mean of category scores)
//!
//! SKIP still counts towards the category total, so a skipped optional check
//! lowers the score the same way a failure does.

use crate::audit::checks::{Category, CheckDefinition, CheckResult, CheckStatus};
use std::collections::HashMap;

/// Category and overall scores, each 0 to 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuditScore {
    pub overall: u32,
    pub indexability: u32,
    pub metadata: u32,
    pub content: u32,
    pub schema: u32,
    pub variant_risk: u32,
    pub ai_readiness: u32,
}

impl AuditScore {
    pub fn category(&self, category: Category) -> u32 {
        match category {
            Category::Indexability => self.indexability,
            Category::Metadata => self.metadata,
            Category::Content => self.content,
            Category::Schema => self.schema,
            Category::VariantRisk => self.variant_risk,
            Category::AiReadiness => self.ai_readiness,
        }
    }

    fn set_category(&mut self, category: Category, score: u32) {
        match category {
            Category::Indexability => self.indexability = score,
            Category::Metadata => self.metadata = score,
            Category::Content => self.content = score,
            Category::Schema => self.schema = score,
            Category::VariantRisk => self.variant_risk = score,
            Category::AiReadiness => self.ai_readiness = score,
        }
    }
}

/// Turns check results into an [`AuditScore`]
#[derive(Debug, Clone, Copy)]
pub struct ScoreCalculator {
    checks: &'static [CheckDefinition],
}

impl ScoreCalculator {
    pub fn new(checks: &'static [CheckDefinition]) -> Self {
        Self { checks }
    }

    pub fn calculate(&self, results: &[CheckResult]) -> AuditScore {
        let mut total = [0.0f64; Category::ALL.len()];
        let mut earned = [0.0f64; Category::ALL.len()];

        let by_id: HashMap<&str, &CheckDefinition> =
            self.checks.iter().map(|c| (c.id, c)).collect();

        for check in self.checks {
            total[check.category.index()] += f64::from(check.weight);
        }

        for result in results {
            // Results for checks outside this catalogue do not count
            let Some(check) = by_id.get(result.check_id.as_str()) else {
                continue;
            };
            let weight = f64::from(check.weight);
            let share = match result.status {
                CheckStatus::Pass => weight,
                CheckStatus::Warn => weight * 0.5,
                CheckStatus::Fail | CheckStatus::Skip => 0.0,
            };
            earned[check.category.index()] += share;
        }

        let mut score = AuditScore::default();
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;

        for category in Category::ALL {
            let i = category.index();
            let category_score = if total[i] > 0.0 {
                (earned[i] / total[i] * 100.0).round() as u32
            } else {
                100
            };
            score.set_category(category, category_score);

            let weight = f64::from(category.score_weight());
            weighted_sum += f64::from(category_score) * weight;
            weight_total += weight;
        }

        score.overall = (weighted_sum / weight_total).round() as u32;
        score
    }
}

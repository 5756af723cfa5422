//! Graduation requirement checks.
//!
//! A plan is checked against four rules in a fixed order and the first one
//! it breaks is reported:
//! 1. every category reaches its minimum credits
//! 2. the fundamentals categories together reach their minimum
//! 3. fundamentals plus electives reach their minimum
//! 4. the total, each category capped at its maximum, reaches the minimum

mod types;

pub use types::*;

use crate::catalog::{Category, Course};
use crate::plan::Plan;
use tracing::debug;

/// Checks course plans against the graduation rules.
///
/// Stateless: every call recomputes the credit ledger from the given courses.
#[derive(Debug, Clone)]
pub struct RequirementValidator {
    rules: GraduationRules,
    /// Sorted by id so the first failing category is deterministic
    categories: Vec<Category>,
}

impl RequirementValidator {
    pub fn new(rules: GraduationRules, mut categories: Vec<Category>) -> Self {
        categories.sort_by_key(|c| c.id);
        Self { rules, categories }
    }

    pub fn rules(&self) -> &GraduationRules {
        &self.rules
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Checks a flat list of courses.
    pub fn validate_courses<'a>(&self, courses: impl IntoIterator<Item = &'a Course>) -> Validation {
        self.validate(&CreditLedger::from_courses(courses))
    }

    /// Checks a plan given as groups of courses (per semester or per category).
    pub fn validate_groups(&self, groups: &[Vec<Course>]) -> Validation {
        self.validate(&CreditLedger::from_groups(groups))
    }

    /// Checks a student's plan.
    pub fn validate_plan(&self, plan: &Plan) -> Validation {
        self.validate_courses(plan.catalog_courses())
    }

    /// Runs the rules against a credit ledger.
    pub fn validate(&self, ledger: &CreditLedger) -> Validation {
        for unknown in ledger
            .categories()
            .filter(|id| !self.categories.iter().any(|c| c.id == *id))
        {
            debug!(category_id = unknown, "Ignoring credits of unknown category");
        }

        for category in &self.categories {
            let planned = ledger.credits(category.id);
            if planned < category.min_credits {
                return Validation::Fail(RuleViolation::MissingCategoryCredits {
                    category_id: category.id,
                    category: category.name.clone(),
                    planned,
                    required: category.min_credits,
                });
            }
        }

        let fundamentals = ledger.sum(&self.rules.fundamentals);
        if fundamentals < self.rules.min_fundamentals {
            return Validation::Fail(RuleViolation::Fundamentals {
                categories: self.names(&self.rules.fundamentals),
                actual: fundamentals,
                required: self.rules.min_fundamentals,
            });
        }

        let with_electives = fundamentals + ledger.credits(self.rules.electives);
        if with_electives < self.rules.min_fundamentals_and_electives {
            let mut ids = self.rules.fundamentals.clone();
            ids.push(self.rules.electives);
            return Validation::Fail(RuleViolation::FundamentalsAndElectives {
                categories: self.names(&ids),
                actual: with_electives,
                required: self.rules.min_fundamentals_and_electives,
            });
        }

        let total: u32 = self
            .categories
            .iter()
            .map(|c| ledger.credits(c.id).min(c.max_credits))
            .sum();
        if total < self.rules.min_total {
            return Validation::Fail(RuleViolation::TotalCredits {
                actual: total,
                required: self.rules.min_total,
            });
        }

        Validation::Pass
    }

    /// Per-category credits for an overview screen.
    pub fn progress(&self, ledger: &CreditLedger) -> Vec<CategoryProgress> {
        self.categories
            .iter()
            .map(|c| {
                let planned = ledger.credits(c.id);
                CategoryProgress {
                    category_id: c.id,
                    name: c.name.clone(),
                    planned,
                    counted: planned.min(c.max_credits),
                    min_credits: c.min_credits,
                    max_credits: c.max_credits,
                }
            })
            .collect()
    }

    fn names(&self, ids: &[u32]) -> Vec<String> {
        ids.iter()
            .map(|id| {
                self.categories
                    .iter()
                    .find(|c| c.id == *id)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| format!("#{}", id))
            })
            .collect()
    }
}

impl Default for RequirementValidator {
    fn default() -> Self {
        Self::new(GraduationRules::default(), Category::defaults())
    }
}

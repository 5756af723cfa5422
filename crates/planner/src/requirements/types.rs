/// Types for graduation requirement checks
use crate::catalog::Course;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Credit thresholds of the degree programme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraduationRules {
    /// Categories whose combined credits form the fundamentals
    pub fundamentals: Vec<u32>,
    pub min_fundamentals: u32,
    /// Category that may top up the fundamentals
    pub electives: u32,
    pub min_fundamentals_and_electives: u32,
    /// Required total, each category capped at its maximum
    pub min_total: u32,
}

impl Default for GraduationRules {
    fn default() -> Self {
        Self {
            fundamentals: vec![1, 2],
            min_fundamentals: 84,
            electives: 4,
            min_fundamentals_and_electives: 96,
            min_total: 180,
        }
    }
}

/// Planned credits per category id, uncapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreditLedger(BTreeMap<u32, u32>);

impl CreditLedger {
    pub fn from_courses<'a>(courses: impl IntoIterator<Item = &'a Course>) -> Self {
        let mut ledger = BTreeMap::new();
        for course in courses {
            *ledger.entry(course.category).or_insert(0) += course.credits;
        }
        Self(ledger)
    }

    /// Ledger of a plan grouped by semester or by category.
    pub fn from_groups(groups: &[Vec<Course>]) -> Self {
        Self::from_courses(groups.iter().flatten())
    }

    pub fn credits(&self, category: u32) -> u32 {
        self.0.get(&category).copied().unwrap_or(0)
    }

    /// Combined credits of several categories.
    pub fn sum(&self, categories: &[u32]) -> u32 {
        categories.iter().map(|&id| self.credits(id)).sum()
    }

    /// Category ids with at least one planned course.
    pub fn categories(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.keys().copied()
    }
}

impl FromIterator<(u32, u32)> for CreditLedger {
    fn from_iter<T: IntoIterator<Item = (u32, u32)>>(iter: T) -> Self {
        let mut ledger = BTreeMap::new();
        for (category, credits) in iter {
            *ledger.entry(category).or_insert(0) += credits;
        }
        Self(ledger)
    }
}

/// The first graduation rule a plan breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleViolation {
    MissingCategoryCredits {
        category_id: u32,
        category: String,
        planned: u32,
        required: u32,
    },
    Fundamentals {
        categories: Vec<String>,
        actual: u32,
        required: u32,
    },
    FundamentalsAndElectives {
        categories: Vec<String>,
        actual: u32,
        required: u32,
    },
    TotalCredits {
        actual: u32,
        required: u32,
    },
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleViolation::MissingCategoryCredits {
                category,
                planned,
                required,
                ..
            } => write!(
                f,
                "You are missing credits in category {} ({} of at least {} planned).",
                category, planned, required
            ),
            RuleViolation::Fundamentals {
                categories,
                actual,
                required,
            }
            | RuleViolation::FundamentalsAndElectives {
                categories,
                actual,
                required,
            } => write!(
                f,
                "You currently have {} credits for the categories {}. However, you need at least {}.",
                actual,
                join_names(categories),
                required
            ),
            RuleViolation::TotalCredits { actual, required } => write!(
                f,
                "You currently have {} credits in total. However, you need at least {}.",
                actual, required
            ),
        }
    }
}

/// "A", "A & B", "A, B & C"
fn join_names(names: &[String]) -> String {
    match names.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} & {}", rest.join(", "), last),
    }
}

/// Result of checking a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Pass,
    Fail(RuleViolation),
}

impl Validation {
    pub fn is_pass(&self) -> bool {
        matches!(self, Validation::Pass)
    }

    /// Human readable reason of a failure.
    pub fn message(&self) -> Option<String> {
        match self {
            Validation::Pass => None,
            Validation::Fail(violation) => Some(violation.to_string()),
        }
    }

    pub fn violation(&self) -> Option<&RuleViolation> {
        match self {
            Validation::Pass => None,
            Validation::Fail(violation) => Some(violation),
        }
    }
}

/// Credits of one category as shown in a credits overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryProgress {
    pub category_id: u32,
    pub name: String,
    pub planned: u32,
    /// Planned credits capped at the category maximum
    pub counted: u32,
    pub min_credits: u32,
    pub max_credits: u32,
}

impl CategoryProgress {
    pub fn is_satisfied(&self) -> bool {
        self.planned >= self.min_credits
    }
}

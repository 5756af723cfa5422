/// Course recommendations ranked by the student's tag preferences
mod scorer;

pub use scorer::{PreferenceScorer, TagAffinity, NEUTRAL_RATING};

use crate::catalog::Course;
use crate::plan::{Plan, PlannedCourse};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Most suggestions returned per request.
pub const DEFAULT_LIMIT: usize = 3;

/// What to recommend courses for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RecommendationRequest {
    /// Catalog semester index
    pub semester: i32,
    /// Restrict suggestions to one category
    #[serde(default)]
    pub category: Option<u32>,
}

/// Filters the catalog and ranks the remaining courses by tag affinity.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationEngine {
    scorer: PreferenceScorer,
    limit: usize,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(PreferenceScorer::default(), DEFAULT_LIMIT)
    }
}

impl RecommendationEngine {
    /// `limit` is capped at [`DEFAULT_LIMIT`].
    pub fn new(scorer: PreferenceScorer, limit: usize) -> Self {
        Self {
            scorer,
            limit: limit.min(DEFAULT_LIMIT),
        }
    }

    /// Suggests at most `limit` catalog courses for the requested semester.
    ///
    /// Courses already anywhere in `plan` are never suggested. Preferences come
    /// from the rated courses of the plan, re-tagged with current catalog tags.
    pub fn recommend(&self, catalog: &[Course], plan: &Plan, request: RecommendationRequest) -> Vec<Course> {
        let candidates = filter_offered(catalog, request.semester, request.category);
        let candidates = exclude_planned(candidates, plan);
        if candidates.is_empty() {
            debug!(semester = request.semester, "No candidate courses left");
            return Vec::new();
        }

        let liked = with_catalog_tags(plan.rated(), catalog);
        let affinity = self.scorer.affinities(&liked);

        let mut scored: Vec<(f64, &Course)> = candidates
            .into_iter()
            .map(|course| (affinity.score(course), course))
            .collect();
        // sort_by is stable: equal scores keep catalog order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        debug!(
            semester = request.semester,
            category = ?request.category,
            candidates = scored.len(),
            tags = affinity.len(),
            "Ranked recommendation candidates"
        );

        scored
            .into_iter()
            .take(self.limit)
            .map(|(_, course)| course.clone())
            .collect()
    }
}

/// Courses offered in `semester`, optionally of one category only.
fn filter_offered(catalog: &[Course], semester: i32, category: Option<u32>) -> Vec<&Course> {
    catalog
        .iter()
        .filter(|c| c.offered_in(semester))
        .filter(|c| category.map_or(true, |id| c.category == id))
        .collect()
}

fn exclude_planned<'a>(candidates: Vec<&'a Course>, plan: &Plan) -> Vec<&'a Course> {
    let planned = plan.course_ids();
    candidates
        .into_iter()
        .filter(|c| !planned.contains(c.id.as_str()))
        .collect()
}

/// Copies of `liked` whose tags are replaced by the catalog's tags for the same id.
/// Courses missing from the catalog keep their own tags.
fn with_catalog_tags<'a>(
    liked: impl Iterator<Item = &'a PlannedCourse>,
    catalog: &[Course],
) -> Vec<PlannedCourse> {
    let tags_by_id: HashMap<&str, &Vec<String>> =
        catalog.iter().map(|c| (c.id.as_str(), &c.tags)).collect();

    liked
        .map(|planned| {
            let mut planned = planned.clone();
            if let Some(tags) = tags_by_id.get(planned.course.id.as_str()) {
                planned.course.tags = (*tags).clone();
            }
            planned
        })
        .collect()
}

//! Tag affinity scoring.

use crate::catalog::Course;
use crate::plan::PlannedCourse;
use std::collections::HashMap;

/// Rating that expresses neither like nor dislike on the 0..4 scale.
pub const NEUTRAL_RATING: f64 = 2.0;

/// Mean centred rating per tag.
///
/// Tags that never occurred in a rated course are absent and read as 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagAffinity(HashMap<String, f64>);

impl TagAffinity {
    /// Affinity of a single tag, 0 when unknown.
    pub fn get(&self, tag: &str) -> f64 {
        self.0.get(tag).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mean affinity over the course's tags; 0 for a course without tags.
    pub fn score(&self, course: &Course) -> f64 {
        if course.tags.is_empty() {
            return 0.0;
        }
        let total: f64 = course.tags.iter().map(|t| self.get(t)).sum();
        total / course.tags.len() as f64
    }
}

/// Turns rated courses into [`TagAffinity`].
#[derive(Debug, Clone, Copy)]
pub struct PreferenceScorer {
    neutral_rating: f64,
}

impl Default for PreferenceScorer {
    fn default() -> Self {
        Self::new(NEUTRAL_RATING)
    }
}

impl PreferenceScorer {
    pub fn new(neutral_rating: f64) -> Self {
        Self { neutral_rating }
    }

    /// Averages `rating - neutral` per tag over all rated courses.
    ///
    /// Unrated courses are skipped.
    pub fn affinities<'a, I>(&self, liked: I) -> TagAffinity
    where
        I: IntoIterator<Item = &'a PlannedCourse>,
    {
        let mut totals: HashMap<&str, (f64, u32)> = HashMap::new();

        for planned in liked {
            let Some(rating) = planned.rating else {
                continue;
            };
            let centred = f64::from(rating) - self.neutral_rating;
            for tag in &planned.course.tags {
                let entry = totals.entry(tag.as_str()).or_insert((0.0, 0));
                entry.0 += centred;
                entry.1 += 1;
            }
        }

        TagAffinity(
            totals
                .into_iter()
                .map(|(tag, (sum, count))| (tag.to_string(), sum / f64::from(count)))
                .collect(),
        )
    }
}

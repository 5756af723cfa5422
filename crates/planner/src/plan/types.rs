/// Types for a student's course plan
use crate::catalog::Course;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;

use super::PlanError;

/// Highest rating a student can give a course. Ratings run from 0 to this value.
pub const MAX_RATING: u8 = 4;

/// Value used by the plan store for a course without a rating.
pub const UNRATED: i64 = -1;

/// A course placed into one semester of a student's plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedCourse {
    pub course: Course,
    /// Semester slot within the plan (1 = first semester of studies)
    pub semester: u32,
    #[serde(default)]
    pub passed: bool,
    /// Rating in `0..=MAX_RATING`, `None` when unrated
    #[serde(default)]
    pub rating: Option<u8>,
}

impl PlannedCourse {
    pub fn new(course: Course, semester: u32) -> Self {
        Self {
            course,
            semester,
            passed: false,
            rating: None,
        }
    }

    pub fn is_rated(&self) -> bool {
        self.rating.is_some()
    }

    /// Sets or clears the rating.
    pub fn rate(&mut self, rating: Option<u8>) -> Result<(), PlanError> {
        self.rating = validate_rating(rating)?;
        Ok(())
    }

    /// Rating as stored, with [`UNRATED`] for `None`.
    pub fn rating_code(&self) -> i64 {
        self.rating.map(i64::from).unwrap_or(UNRATED)
    }
}

/// Checks that a rating lies in `0..=MAX_RATING`.
pub fn validate_rating(rating: Option<u8>) -> Result<Option<u8>, PlanError> {
    match rating {
        Some(r) if r > MAX_RATING => Err(PlanError::InvalidRating(r.into())),
        other => Ok(other),
    }
}

/// Decodes a stored rating; anything outside `0..=MAX_RATING` counts as unrated.
pub fn rating_from_code(code: i64) -> Option<u8> {
    u8::try_from(code).ok().filter(|r| *r <= MAX_RATING)
}

/// Which planned courses to read from a plan source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanFilter {
    /// Only semesters in this range
    pub semesters: Option<Range<u32>>,
    /// Only courses the student rated
    pub rated_only: bool,
}

impl PlanFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn rated() -> Self {
        Self {
            semesters: None,
            rated_only: true,
        }
    }

    pub fn semesters(range: Range<u32>) -> Self {
        Self {
            semesters: Some(range),
            rated_only: false,
        }
    }

    pub fn matches(&self, course: &PlannedCourse) -> bool {
        let in_range = self
            .semesters
            .as_ref()
            .map_or(true, |r| r.contains(&course.semester));
        in_range && (!self.rated_only || course.is_rated())
    }
}

/// A student's complete plan across all semesters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub courses: Vec<PlannedCourse>,
}

impl Plan {
    pub fn new(courses: Vec<PlannedCourse>) -> Self {
        Self { courses }
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Ids of every course in the plan, whatever semester or category.
    pub fn course_ids(&self) -> HashSet<&str> {
        self.courses.iter().map(|c| c.course.id.as_str()).collect()
    }

    pub fn contains(&self, course_id: &str) -> bool {
        self.courses.iter().any(|c| c.course.id == course_id)
    }

    /// Courses the student rated.
    pub fn rated(&self) -> impl Iterator<Item = &PlannedCourse> {
        self.courses.iter().filter(|c| c.is_rated())
    }

    pub fn filtered<'a, 'f>(&'a self, filter: &'f PlanFilter) -> impl Iterator<Item = &'a PlannedCourse> + 'f
    where
        'a: 'f,
    {
        self.courses.iter().filter(move |c| filter.matches(c))
    }

    /// Courses in semesters before `current`, ordered by semester.
    pub fn taken_before(&self, current: u32) -> Vec<&PlannedCourse> {
        let mut taken: Vec<&PlannedCourse> = self.filtered(&PlanFilter::semesters(0..current)).collect();
        taken.sort_by_key(|c| c.semester);
        taken
    }

    /// One group per semester in `current..total`, empty semesters included.
    pub fn grouped_by_semester(&self, current: u32, total: u32) -> Vec<Vec<&PlannedCourse>> {
        let mut groups: Vec<Vec<&PlannedCourse>> =
            (current..total.max(current)).map(|_| Vec::new()).collect();
        for course in self.filtered(&PlanFilter::semesters(current..total)) {
            groups[(course.semester - current) as usize].push(course);
        }
        groups
    }

    /// The catalog courses of the plan, for credit counting.
    pub fn catalog_courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.iter().map(|c| &c.course)
    }
}

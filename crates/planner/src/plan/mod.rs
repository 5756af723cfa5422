//! A student's course plan and the source it is read from.

mod types;

pub use types::*;

use thiserror::Error;

/// Errors raised when reading or changing a plan.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Rating outside `0..=MAX_RATING`
    #[error("Invalid rating {0}, expected 0 to {max}", max = MAX_RATING)]
    InvalidRating(i64),

    /// The course is not part of the student's plan
    #[error("Course {course_id} is not in the plan of {student}")]
    UnknownCourse { student: String, course_id: String },

    /// The plan store failed
    #[error("Plan storage error: {message}")]
    Storage { message: String },
}

impl From<rusqlite::Error> for PlanError {
    fn from(err: rusqlite::Error) -> Self {
        PlanError::Storage {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PlanError {
    fn from(err: serde_json::Error) -> Self {
        PlanError::Storage {
            message: err.to_string(),
        }
    }
}

/// Read access to students' plans.
pub trait PlanSource {
    /// Planned courses of `student` that match `filter`, ordered by semester.
    fn planned_courses(&self, student: &str, filter: &PlanFilter) -> Result<Vec<PlannedCourse>, PlanError>;

    /// The complete plan of `student`.
    fn plan(&self, student: &str) -> Result<Plan, PlanError> {
        self.planned_courses(student, &PlanFilter::all()).map(Plan::new)
    }
}

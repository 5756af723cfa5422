/// Database types for stored plans
use crate::catalog::Course;
use crate::plan::{rating_from_code, PlanError, PlannedCourse};

/// A row of the `planned_courses` table
#[derive(Debug, Clone)]
pub struct DbPlannedCourse {
    pub student: String,
    pub course_id: String,
    pub category: i64,
    pub credits: i64,
    pub name: String,
    pub semesters: String, // JSON string
    pub tags: String,      // JSON string
    pub vvz: String,
    pub semester: i64,
    pub passed: bool,
    pub rating: i64,
}

impl TryFrom<DbPlannedCourse> for PlannedCourse {
    type Error = PlanError;

    fn try_from(row: DbPlannedCourse) -> Result<Self, Self::Error> {
        let out_of_range = |field: &str, value: i64| PlanError::Storage {
            message: format!("{} {} out of range for course {}", field, value, row.course_id),
        };

        let category = u32::try_from(row.category).map_err(|_| out_of_range("category", row.category))?;
        let credits = u32::try_from(row.credits).map_err(|_| out_of_range("credits", row.credits))?;
        let semester = u32::try_from(row.semester).map_err(|_| out_of_range("semester", row.semester))?;

        Ok(PlannedCourse {
            course: Course {
                id: row.course_id,
                category,
                credits,
                name: row.name,
                semesters: serde_json::from_str(&row.semesters)?,
                tags: serde_json::from_str(&row.tags)?,
                vvz: row.vvz,
            },
            semester,
            passed: row.passed,
            rating: rating_from_code(row.rating),
        })
    }
}

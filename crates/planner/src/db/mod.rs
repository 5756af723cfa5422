/// Database module for storing students' course plans

mod types;

pub use types::DbPlannedCourse;

use crate::plan::{validate_rating, PlanError, PlanFilter, PlanSource, PlannedCourse, MAX_RATING, UNRATED};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_plans.sql");

pub struct PlanDbManager {
    db: Mutex<Connection>,
}

impl PlanDbManager {
    /// Opens (or creates) the database and initializes the schema
    pub fn open(db_path: &Path) -> Result<Self, PlanError> {
        Self::with_connection(Connection::open(db_path)?)
    }

    /// Creates a database that lives only as long as the manager
    pub fn open_in_memory() -> Result<Self, PlanError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, PlanError> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, PlanError> {
        self.db.lock().map_err(|_| PlanError::Storage {
            message: "plan database lock poisoned".to_string(),
        })
    }

    /// Adds a course to a student's plan, replacing an earlier entry of the same course
    pub fn add_course(&self, student: &str, planned: &PlannedCourse) -> Result<(), PlanError> {
        validate_rating(planned.rating)?;
        let semesters = serde_json::to_string(&planned.course.semesters)?;
        let tags = serde_json::to_string(&planned.course.tags)?;

        let db = self.conn()?;
        db.execute(
            "INSERT OR REPLACE INTO planned_courses (
                student, course_id, category, credits, name, semesters, tags, vvz,
                semester, passed, rating, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, datetime('now'))",
            params![
                student,
                planned.course.id,
                planned.course.category,
                planned.course.credits,
                planned.course.name,
                semesters,
                tags,
                planned.course.vvz,
                planned.semester,
                planned.passed,
                planned.rating_code(),
            ],
        )?;

        debug!(student, course_id = %planned.course.id, semester = planned.semester, "Added planned course");
        Ok(())
    }

    /// Removes a course from a student's plan. Returns false if it was not planned.
    pub fn remove_course(&self, student: &str, course_id: &str) -> Result<bool, PlanError> {
        let db = self.conn()?;
        let removed = db.execute(
            "DELETE FROM planned_courses WHERE student = ?1 AND course_id = ?2",
            params![student, course_id],
        )?;
        Ok(removed > 0)
    }

    /// Sets or clears the rating of a planned course
    pub fn set_rating(&self, student: &str, course_id: &str, rating: Option<u8>) -> Result<(), PlanError> {
        let code = validate_rating(rating)?.map(i64::from).unwrap_or(UNRATED);
        self.update(
            student,
            course_id,
            "UPDATE planned_courses SET rating = ?3 WHERE student = ?1 AND course_id = ?2",
            code,
        )
    }

    /// Marks a planned course as passed or not passed
    pub fn set_passed(&self, student: &str, course_id: &str, passed: bool) -> Result<(), PlanError> {
        self.update(
            student,
            course_id,
            "UPDATE planned_courses SET passed = ?3 WHERE student = ?1 AND course_id = ?2",
            i64::from(passed),
        )
    }

    fn update(&self, student: &str, course_id: &str, sql: &str, value: i64) -> Result<(), PlanError> {
        let db = self.conn()?;
        let changed = db.execute(sql, params![student, course_id, value])?;
        if changed == 0 {
            return Err(PlanError::UnknownCourse {
                student: student.to_string(),
                course_id: course_id.to_string(),
            });
        }
        Ok(())
    }
}

impl PlanSource for PlanDbManager {
    fn planned_courses(&self, student: &str, filter: &PlanFilter) -> Result<Vec<PlannedCourse>, PlanError> {
        let (from, to) = filter
            .semesters
            .as_ref()
            .map_or((0, i64::MAX), |r| (i64::from(r.start), i64::from(r.end)));

        let db = self.conn()?;
        let mut stmt = db.prepare(
            "SELECT student, course_id, category, credits, name, semesters, tags, vvz,
                    semester, passed, rating
             FROM planned_courses
             WHERE student = ?1 AND semester >= ?2 AND semester < ?3
               AND (?4 = 0 OR rating BETWEEN 0 AND ?5)
             ORDER BY semester, created_at, course_id",
        )?;

        let rows = stmt
            .query_map(
                params![student, from, to, filter.rated_only, MAX_RATING],
                read_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(PlannedCourse::try_from).collect()
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<DbPlannedCourse> {
    Ok(DbPlannedCourse {
        student: row.get(0)?,
        course_id: row.get(1)?,
        category: row.get(2)?,
        credits: row.get(3)?,
        name: row.get(4)?,
        semesters: row.get(5)?,
        tags: row.get(6)?,
        vvz: row.get(7)?,
        semester: row.get(8)?,
        passed: row.get(9)?,
        rating: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Course;

    fn planned(id: &str, semester: u32, rating: Option<u8>) -> PlannedCourse {
        let mut planned = PlannedCourse::new(
            Course {
                id: id.to_string(),
                category: 2,
                credits: 7,
                name: format!("Course {id}"),
                semesters: vec![11, 13],
                tags: vec!["Algorithms".to_string()],
                vvz: "https://www.vvz.ethz.ch".to_string(),
            },
            semester,
        );
        planned.rating = rating;
        planned
    }

    #[test]
    fn test_add_and_read_back() {
        let db = PlanDbManager::open_in_memory().unwrap();
        let course = planned("252-0057-00L", 3, Some(4));
        db.add_course("alice", &course).unwrap();

        let plan = db.plan("alice").unwrap();
        assert_eq!(plan.courses, vec![course]);
        assert!(db.plan("bob").unwrap().is_empty());
    }

    #[test]
    fn test_filters_by_semester_and_rating() {
        let db = PlanDbManager::open_in_memory().unwrap();
        db.add_course("alice", &planned("a", 1, Some(3))).unwrap();
        db.add_course("alice", &planned("b", 2, None)).unwrap();
        db.add_course("alice", &planned("c", 4, Some(0))).unwrap();

        let rated = db.planned_courses("alice", &PlanFilter::rated()).unwrap();
        let ids: Vec<&str> = rated.iter().map(|c| c.course.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let middle = db.planned_courses("alice", &PlanFilter::semesters(2..4)).unwrap();
        assert_eq!(middle.len(), 1);
        assert_eq!(middle[0].course.id, "b");
    }

    #[test]
    fn test_out_of_range_rating_is_not_rated() {
        let db = PlanDbManager::open_in_memory().unwrap();
        db.add_course("alice", &planned("a", 1, Some(2))).unwrap();
        db.add_course("alice", &planned("b", 1, None)).unwrap();
        db.conn()
            .unwrap()
            .execute(
                "UPDATE planned_courses SET rating = 7 WHERE course_id = 'b'",
                [],
            )
            .unwrap();

        let rated = db.planned_courses("alice", &PlanFilter::rated()).unwrap();
        assert_eq!(rated.len(), 1);
        assert_eq!(rated[0].course.id, "a");
        assert!(rated.iter().all(PlannedCourse::is_rated));
    }

    #[test]
    fn test_rating_and_passed_updates() {
        let db = PlanDbManager::open_in_memory().unwrap();
        db.add_course("alice", &planned("a", 1, None)).unwrap();

        db.set_rating("alice", "a", Some(2)).unwrap();
        db.set_passed("alice", "a", true).unwrap();
        let course = &db.plan("alice").unwrap().courses[0];
        assert_eq!(course.rating, Some(2));
        assert!(course.passed);

        db.set_rating("alice", "a", None).unwrap();
        assert_eq!(db.plan("alice").unwrap().courses[0].rating, None);

        assert!(matches!(
            db.set_rating("alice", "a", Some(7)),
            Err(PlanError::InvalidRating(7))
        ));
        assert!(matches!(
            db.set_rating("alice", "zzz", Some(1)),
            Err(PlanError::UnknownCourse { .. })
        ));
    }

    #[test]
    fn test_remove_course() {
        let db = PlanDbManager::open_in_memory().unwrap();
        db.add_course("alice", &planned("a", 1, None)).unwrap();

        assert!(db.remove_course("alice", "a").unwrap());
        assert!(!db.remove_course("alice", "a").unwrap());
        assert!(db.plan("alice").unwrap().is_empty());
    }
}

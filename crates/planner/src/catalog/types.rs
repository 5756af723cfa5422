/// Types for course catalog data
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A course as published in the remote catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Catalog number, e.g. "252-0057-00L"
    pub id: String,

    /// Id of the [`Category`] the course counts towards
    pub category: u32,

    pub credits: u32,

    pub name: String,

    /// Semester indexes in which the course is offered.
    /// Even indexes are spring semesters, odd ones fall semesters.
    #[serde(rename = "semester", default)]
    pub semesters: Vec<i32>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Link to the course catalogue entry
    #[serde(default)]
    pub vvz: String,
}

impl Course {
    /// Returns true if the course is offered in the given semester.
    ///
    /// A course without any offering data is treated as available every semester.
    pub fn offered_in(&self, semester: i32) -> bool {
        self.semesters.is_empty() || self.semesters.contains(&semester)
    }
}

/// Credit category of the degree programme (e.g. "Kernfächer", "Wahlfächer")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    /// Credits that must be planned before graduation
    #[serde(rename = "minCredits")]
    pub min_credits: u32,
    /// Credits beyond this value do not count towards the total
    #[serde(rename = "maxCredits")]
    pub max_credits: u32,
}

impl Category {
    fn new(id: u32, name: &str, icon: &str, min_credits: u32, max_credits: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            icon: icon.to_string(),
            min_credits,
            max_credits,
        }
    }

    /// The category table of the BSc Computer Science programme.
    pub fn defaults() -> Vec<Category> {
        vec![
            Category::new(0, "Basisjahr Fächer", "book.closed.fill", 56, 56),
            Category::new(1, "Grundlagen Fächer", "lightbulb.max.fill", 45, 52),
            Category::new(2, "Kernfächer", "star.fill", 32, 180),
            Category::new(3, "Ergänzung", "flask.fill", 5, 180),
            Category::new(4, "Wahlfächer", "doc.text.magnifyingglass", 0, 180),
            Category::new(5, "GESS", "binoculars.fill", 6, 6),
            Category::new(6, "Seminar", "doc.on.doc.fill", 2, 2),
            Category::new(7, "Bachelor Arbeit", "pencil", 10, 10),
        ]
    }
}

/// The full catalog as last fetched, plus freshness markers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub courses: Vec<Course>,
    /// Remote "last course update" marker seen with the last successful fetch
    pub last_remote_update: Option<DateTime<Utc>>,
    /// When the remote marker was last queried
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Looks up a course by id.
    pub fn get(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub courses: usize,
    pub last_remote_update: Option<DateTime<Utc>>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub size: String,
}

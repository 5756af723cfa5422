//! Semester codes and the integer semester index used by the catalog.
//!
//! Semesters are written `FSYY` (spring, "Frühjahrssemester") or `HSYY`
//! (fall, "Herbstsemester"). The catalog stores offerings as an index
//! counting from spring 2019: `(year - 2019) * 2`, plus one for fall.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

const BASE_YEAR: i32 = 2019;

/// Last ISO week that still belongs to the spring semester.
const LAST_SPRING_WEEK: u32 = 22;

static SEMESTER_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(FS|HS)(\d{2})$").unwrap());

/// Half of the academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Term {
    Spring,
    Fall,
}

/// A concrete semester, e.g. `HS24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SemesterCode {
    pub term: Term,
    /// Full year, e.g. 2024
    pub year: i32,
}

impl SemesterCode {
    pub fn new(term: Term, year: i32) -> Self {
        Self { term, year }
    }

    /// Catalog index of this semester.
    pub fn index(&self) -> i32 {
        let offset = match self.term {
            Term::Spring => 0,
            Term::Fall => 1,
        };
        (self.year - BASE_YEAR) * 2 + offset
    }

    /// Inverse of [`Self::index`].
    pub fn from_index(index: i32) -> Self {
        let term = if index.rem_euclid(2) == 1 {
            Term::Fall
        } else {
            Term::Spring
        };
        Self {
            term,
            year: BASE_YEAR + index.div_euclid(2),
        }
    }

    /// The semester a date falls into. ISO weeks 1-22 are spring, the rest fall.
    pub fn containing(date: NaiveDate) -> Self {
        let week = date.iso_week();
        let term = if week.week() <= LAST_SPRING_WEEK {
            Term::Spring
        } else {
            Term::Fall
        };
        // Days around new year belong to the ISO week's year.
        Self {
            term,
            year: week.year(),
        }
    }

    /// The semester before this one.
    pub fn previous(&self) -> Self {
        Self::from_index(self.index() - 1)
    }

    /// The semester containing `date` followed by the `count - 1` semesters
    /// before it, newest first.
    pub fn recent(date: NaiveDate, count: usize) -> Vec<SemesterCode> {
        let mut semesters = Vec::with_capacity(count);
        let mut current = Self::containing(date);
        for _ in 0..count {
            semesters.push(current);
            current = current.previous();
        }
        semesters
    }
}

impl fmt::Display for SemesterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.term {
            Term::Spring => "FS",
            Term::Fall => "HS",
        };
        write!(f, "{}{:02}", prefix, self.year.rem_euclid(100))
    }
}

/// Error returned for strings that are not `FSYY` or `HSYY`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid semester code: {0:?}")]
pub struct InvalidSemesterCode(pub String);

impl FromStr for SemesterCode {
    type Err = InvalidSemesterCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = SEMESTER_CODE_REGEX
            .captures(s.trim())
            .ok_or_else(|| InvalidSemesterCode(s.to_string()))?;

        let term = match &caps[1] {
            "FS" => Term::Spring,
            _ => Term::Fall,
        };
        let year: i32 = caps[2]
            .parse()
            .map_err(|_| InvalidSemesterCode(s.to_string()))?;

        Ok(Self {
            term,
            year: 2000 + year,
        })
    }
}

impl Serialize for SemesterCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_index() {
        let hs24: SemesterCode = "HS24".parse().unwrap();
        assert_eq!(hs24, SemesterCode::new(Term::Fall, 2024));
        assert_eq!(hs24.index(), 11);

        let fs25: SemesterCode = "FS25".parse().unwrap();
        assert_eq!(fs25.index(), 12);
        assert_eq!(SemesterCode::from_index(0).to_string(), "FS19");
        assert_eq!(SemesterCode::from_index(11), hs24);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("WS24".parse::<SemesterCode>().is_err());
        assert!("HS2024".parse::<SemesterCode>().is_err());
        assert!("".parse::<SemesterCode>().is_err());
    }

    #[test]
    fn test_containing_uses_iso_week() {
        let may = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
        assert_eq!(SemesterCode::containing(may).to_string(), "FS25");

        let october = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
        assert_eq!(SemesterCode::containing(october).to_string(), "HS24");

        // ISO week 52 still counts as fall of the same year.
        let christmas = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
        assert_eq!(SemesterCode::containing(christmas).to_string(), "HS25");

        // ISO week 1 of 2026 starts on Monday, 29 December 2025.
        let late_december = NaiveDate::from_ymd_opt(2025, 12, 29).unwrap();
        assert_eq!(SemesterCode::containing(late_december).to_string(), "FS26");

        // ISO week 53 of 2026
        let new_year = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
        assert_eq!(SemesterCode::containing(new_year).to_string(), "HS26");
    }

    #[test]
    fn test_recent_semesters() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 20).unwrap();
        let codes: Vec<String> = SemesterCode::recent(date, 5)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(codes, vec!["HS24", "FS24", "HS23", "FS23", "HS22"]);
    }
}

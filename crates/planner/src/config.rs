/// Configuration for the planner service
use crate::catalog::{Category, DEFAULT_CHECK_INTERVAL};
use crate::recommend::{DEFAULT_LIMIT, NEUTRAL_RATING};
use crate::requirements::GraduationRules;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or checking the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Category {id} has minCredits {min} above maxCredits {max}")]
    CategoryBounds { id: u32, min: u32, max: u32 },

    #[error("Category id {0} is defined more than once")]
    DuplicateCategory(u32),

    #[error("recommendation_limit {0} exceeds the maximum of {max}", max = DEFAULT_LIMIT)]
    RecommendationLimit(usize),
}

/// Remote endpoints of the course catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEndpoints {
    /// Returns the full course list as a JSON array
    pub catalog_url: String,
    /// Returns `{ "date": <RFC 3339 timestamp> }`
    pub last_updated_url: String,
}

impl Default for CatalogEndpoints {
    fn default() -> Self {
        Self {
            catalog_url: "http://127.0.0.1:8080/courses".to_string(),
            last_updated_url: "http://127.0.0.1:8080/general/lastCourseUpdate".to_string(),
        }
    }
}

/// Top-level planner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Directory holding the catalog snapshot files
    pub cache_dir: PathBuf,
    /// SQLite database with the students' plans
    pub database_path: PathBuf,
    /// Address the HTTP server binds to
    pub bind_address: String,
    pub catalog: CatalogEndpoints,
    /// Minimum time between two remote freshness checks
    pub check_interval_secs: u64,
    pub recommendation_limit: usize,
    pub neutral_rating: f64,
    pub rules: GraduationRules,
    pub categories: Vec<Category>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            database_path: PathBuf::from("planner.db"),
            bind_address: "127.0.0.1:3000".to_string(),
            catalog: CatalogEndpoints::default(),
            check_interval_secs: DEFAULT_CHECK_INTERVAL.as_secs(),
            recommendation_limit: DEFAULT_LIMIT,
            neutral_rating: NEUTRAL_RATING,
            rules: GraduationRules::default(),
            categories: Category::defaults(),
        }
    }
}

impl PlannerConfig {
    /// Loads and validates a JSON configuration file.
    ///
    /// Fields missing from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PlannerConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the category table invariants and the recommendation limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recommendation_limit > DEFAULT_LIMIT {
            return Err(ConfigError::RecommendationLimit(self.recommendation_limit));
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.min_credits > category.max_credits {
                return Err(ConfigError::CategoryBounds {
                    id: category.id,
                    min: category.min_credits,
                    max: category.max_credits,
                });
            }
            if !seen.insert(category.id) {
                return Err(ConfigError::DuplicateCategory(category.id));
            }
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PlannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.check_interval(), Duration::from_secs(3 * 60 * 60));
        assert_eq!(config.categories.len(), 8);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.json");
        fs::write(
            &path,
            r#"{ "recommendation_limit": 2, "rules": { "min_total": 150 } }"#,
        )
        .unwrap();

        let config = PlannerConfig::load(&path).unwrap();
        assert_eq!(config.recommendation_limit, 2);
        assert_eq!(config.rules.min_total, 150);
        assert_eq!(config.rules.min_fundamentals, 84);
        assert_eq!(config.bind_address, "127.0.0.1:3000");
    }

    #[test]
    fn test_rejects_inverted_category_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.json");
        fs::write(
            &path,
            r#"{ "categories": [ { "id": 9, "name": "Broken", "minCredits": 10, "maxCredits": 5 } ] }"#,
        )
        .unwrap();

        assert!(matches!(
            PlannerConfig::load(&path),
            Err(ConfigError::CategoryBounds { id: 9, .. })
        ));
    }

    #[test]
    fn test_rejects_recommendation_limit_above_three() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.json");
        fs::write(&path, r#"{ "recommendation_limit": 5 }"#).unwrap();

        assert!(matches!(
            PlannerConfig::load(&path),
            Err(ConfigError::RecommendationLimit(5))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = PlannerConfig::load(Path::new("/nonexistent/planner.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}

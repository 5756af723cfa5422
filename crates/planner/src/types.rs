use std::fmt::{Debug, Formatter};

use crate::catalog::{CatalogCache, HttpCatalogSource};
use crate::config::PlannerConfig;
use crate::db::PlanDbManager;
use crate::recommend::{PreferenceScorer, RecommendationEngine};
use crate::requirements::RequirementValidator;

/// Shared state of the planner server.
pub struct PlannerState {
    /// Local mirror of the remote course catalog
    pub catalog: CatalogCache<HttpCatalogSource>,
    /// Students' plans
    pub plans: PlanDbManager,
    pub recommender: RecommendationEngine,
    pub validator: RequirementValidator,
}

impl PlannerState {
    /// Wires the catalog cache and plan store together with the engines
    /// described by `config`.
    pub fn new(
        config: &PlannerConfig,
        catalog: CatalogCache<HttpCatalogSource>,
        plans: PlanDbManager,
    ) -> Self {
        Self {
            catalog,
            plans,
            recommender: RecommendationEngine::new(
                PreferenceScorer::new(config.neutral_rating),
                config.recommendation_limit,
            ),
            validator: RequirementValidator::new(config.rules.clone(), config.categories.clone()),
        }
    }
}

impl Debug for PlannerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlannerState")
            .field("recommender", &self.recommender)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

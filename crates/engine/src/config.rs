//! Engine configuration.
//!
//! Every field has a default, so a JSON config file only needs the keys it
//! changes:
//!
//! ```json
//! { "cold_start_threshold": 5, "catalog": { "elective_prefix": "Elective" } }
//! ```

use data_loader::DEFAULT_ADMIN_ID;
use serde::{Deserialize, Serialize};
use sources::collaborative::DEFAULT_PREDICTION;
use sources::cold_start::MAJOR_BOOST;
use sources::latent_factor::DEFAULT_ENERGY_RATIO;
use sources::CatalogRules;

/// Students with fewer scored courses than this are served by cold start
pub const DEFAULT_COLD_START_THRESHOLD: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Account excluded from every load
    pub admin_id: String,
    pub cold_start_threshold: usize,
    /// Cold start boost for courses open to the student's major
    pub major_boost: f64,
    /// Collaborative prediction for courses nobody has scored
    pub default_prediction: f64,
    /// Singular value share kept by the latent factor fallback
    pub energy_ratio: f64,
    pub catalog: CatalogRules,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            admin_id: DEFAULT_ADMIN_ID.to_string(),
            cold_start_threshold: DEFAULT_COLD_START_THRESHOLD,
            major_boost: MAJOR_BOOST,
            default_prediction: DEFAULT_PREDICTION,
            energy_ratio: DEFAULT_ENERGY_RATIO,
            catalog: CatalogRules::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_admin_id(mut self, admin_id: impl Into<String>) -> Self {
        self.admin_id = admin_id.into();
        self
    }

    pub fn with_cold_start_threshold(mut self, threshold: usize) -> Self {
        self.cold_start_threshold = threshold;
        self
    }

    pub fn with_major_boost(mut self, boost: f64) -> Self {
        self.major_boost = boost;
        self
    }

    pub fn with_default_prediction(mut self, prediction: f64) -> Self {
        self.default_prediction = prediction;
        self
    }

    pub fn with_energy_ratio(mut self, ratio: f64) -> Self {
        self.energy_ratio = ratio;
        self
    }

    pub fn with_catalog(mut self, catalog: CatalogRules) -> Self {
        self.catalog = catalog;
        self
    }
}

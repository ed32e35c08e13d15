//! Reasoner configuration
//!
//! Defaults can be overridden from a JSON document and then from environment variables:
//! - `DATALOG_ALGORITHM` - `restricted_chase` or `skolem_chase`
//! - `DATALOG_TIMEOUT_SECS` - evaluation deadline in seconds
//! - `DATALOG_PARALLEL` - `true` to evaluate the rules of a round on the rayon pool
//!
//! ```json
//! {
//!     "algorithm": "skolem_chase",
//!     "reasoning_timeout_secs": 30,
//!     "parallel": true
//! }
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::error::{ReasonerError, ReasonerResult};

pub const ENV_ALGORITHM: &str = "DATALOG_ALGORITHM";
pub const ENV_TIMEOUT_SECS: &str = "DATALOG_TIMEOUT_SECS";
pub const ENV_PARALLEL: &str = "DATALOG_PARALLEL";

/// How existential head variables are handled during materialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Fire an existential rule only if its head is not already satisfied.
    #[default]
    RestrictedChase,
    /// Always fire; fresh individuals are named after the rule and the frontier binding.
    SkolemChase,
}

impl FromStr for Algorithm {
    type Err = ReasonerError;

    fn from_str(s: &str) -> ReasonerResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "restricted" | "restricted_chase" => Ok(Algorithm::RestrictedChase),
            "skolem" | "skolem_chase" => Ok(Algorithm::SkolemChase),
            other => Err(ReasonerError::Configuration(format!("unknown algorithm {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonerConfiguration {
    pub algorithm: Algorithm,
    /// Best-effort deadline for one evaluation; `None` waits for the fixpoint.
    pub reasoning_timeout_secs: Option<u64>,
    pub parallel: bool,
    /// Upper bound on evaluation rounds. Hitting it counts as an interrupted evaluation.
    pub max_rounds: Option<usize>,
}

impl Default for ReasonerConfiguration {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::RestrictedChase,
            reasoning_timeout_secs: None,
            parallel: false,
            max_rounds: None,
        }
    }
}

impl ReasonerConfiguration {
    pub fn from_json_str(json: &str) -> ReasonerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ReasonerResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn with_env_overrides(self) -> ReasonerResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from any key/value lookup, e.g. the process environment.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> ReasonerResult<Self> {
        if let Some(value) = lookup(ENV_ALGORITHM) {
            self.algorithm = value.parse()?;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            let secs = value.trim().parse::<u64>().map_err(|e| {
                ReasonerError::Configuration(format!("{}={:?}: {}", ENV_TIMEOUT_SECS, value, e))
            })?;
            self.reasoning_timeout_secs = Some(secs);
        }
        if let Some(value) = lookup(ENV_PARALLEL) {
            self.parallel = value.trim().parse::<bool>().map_err(|e| {
                ReasonerError::Configuration(format!("{}={:?}: {}", ENV_PARALLEL, value, e))
            })?;
        }
        Ok(self)
    }
}

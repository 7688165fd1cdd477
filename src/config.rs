use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::field::FieldGeometry;
use crate::model::params::{PlayerTypeParams, ServerParams};
use crate::model::player::PlayerModel;
use crate::model::stamina::RecoverThresholds;
use crate::reach::{OmniEscalation, ReachConfig};
use crate::search::SearchLimits;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything the reach core reads at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub server: ServerParams,
    pub player: PlayerTypeParams,
    pub reach: ReachConfig,
    pub recover: RecoverThresholds,
    pub search: SearchLimits,
    pub field: FieldGeometry,
}

impl SimulatorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Load config from `.env`, an optional JSON file and environment overrides
    ///
    /// A broken config file is logged and replaced by defaults; the agent
    /// must still be able to play.
    pub fn load_or_default() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("no .env loaded: {}", e);
        }

        let mut config = match std::env::var("REACH_CONFIG_PATH") {
            Ok(path) => match Self::from_json_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded reach config from {}", path);
                    config
                }
                Err(e) => {
                    tracing::warn!("{}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());

        if let Err(e) = config.validate() {
            tracing::warn!("{}, using defaults", e);
            return Self::default();
        }
        config
    }

    /// Apply `REACH_*` / `SEARCH_*` overrides from `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("REACH_MAX_CYCLES") {
            match v.parse::<u32>() {
                Ok(parsed) if parsed > 0 => {
                    self.reach.max_cycles = parsed;
                    self.search.max_reach_cycles = parsed;
                }
                _ => tracing::warn!("Invalid REACH_MAX_CYCLES '{}', using default", v),
            }
        }

        if let Some(v) = lookup("REACH_OMNI_ANGLE_STEP") {
            match v.parse::<f64>() {
                Ok(parsed) if parsed > 0.0 && parsed <= 180.0 => self.reach.omni_angle_step = parsed,
                _ => tracing::warn!("REACH_OMNI_ANGLE_STEP must be in (0, 180], got '{}'", v),
            }
        }

        let mut margin = match self.reach.omni_escalation {
            OmniEscalation::NearDeadline { margin } => margin,
            _ => crate::model::constants::reach::OMNI_ESCALATION_MARGIN,
        };
        if let Some(v) = lookup("REACH_OMNI_MARGIN") {
            match v.parse::<u32>() {
                Ok(parsed) => {
                    margin = parsed;
                    if let OmniEscalation::NearDeadline { .. } = self.reach.omni_escalation {
                        self.reach.omni_escalation = OmniEscalation::NearDeadline { margin };
                    }
                }
                Err(_) => tracing::warn!("Invalid REACH_OMNI_MARGIN '{}', using default", v),
            }
        }

        if let Some(v) = lookup("REACH_OMNI_ESCALATION") {
            match OmniEscalation::parse(&v, margin) {
                Some(policy) => self.reach.omni_escalation = policy,
                None => tracing::warn!("Invalid REACH_OMNI_ESCALATION '{}', expected never|near|always", v),
            }
        }

        if let Some(v) = lookup("SEARCH_MAX_CANDIDATES") {
            match v.parse::<usize>() {
                Ok(parsed) if parsed > 0 => self.search.max_candidates = parsed,
                _ => tracing::warn!("Invalid SEARCH_MAX_CANDIDATES '{}', using default", v),
            }
        }
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if !(self.player.player_decay > 0.0 && self.player.player_decay < 1.0) {
            return invalid("player_decay must be in (0, 1)");
        }
        if self.player.dash_power_rate <= 0.0 {
            return invalid("dash_power_rate must be positive");
        }
        if self.server.min_dash_power > self.server.max_dash_power {
            return invalid("min_dash_power cannot exceed max_dash_power");
        }
        if self.server.max_moment <= 0.0 {
            return invalid("max_moment must be positive");
        }
        if self.server.min_moment > self.server.max_moment {
            return invalid("min_moment cannot exceed max_moment");
        }
        if !(self.reach.omni_angle_step > 0.0 && self.reach.omni_angle_step <= 180.0) {
            return invalid("omni_angle_step must be in (0, 180]");
        }
        let r = &self.recover;
        if !(0.0 < r.enter_ratio && r.enter_ratio < r.exit_ratio && r.exit_ratio <= 1.0) {
            return invalid("recover thresholds must satisfy 0 < enter < exit <= 1");
        }
        if self.reach.max_cycles == 0 {
            return invalid("reach max_cycles must be at least 1");
        }
        if self.search.max_candidates == 0 {
            return invalid("max_candidates must be at least 1");
        }
        Ok(())
    }

    pub fn player_model(&self) -> PlayerModel {
        PlayerModel::new(self.player, self.server)
    }
}

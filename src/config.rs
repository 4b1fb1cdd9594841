//! Loading service configuration (storage location/keys + optional extra
//! lessons) from TOML.
//!
//! Example:
//! ```toml
//! [storage]
//! dir = "/var/lib/debate-tutor"
//!
//! [[lessons]]
//! level = "rebuttals"
//! id = "rebuttals-1"
//! title = "Answering Objections"
//! description = "Respond to the strongest counterargument"
//! kind = "quiz"
//! points = 20
//! instructions = "Pick the best rebuttal."
//! ```

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Lesson;

pub const DEFAULT_PROGRESS_KEY: &str = "debate-platform-progress";
pub const DEFAULT_ONBOARDING_KEY: &str = "debate-onboarding-complete";
const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TutorConfig {
  #[serde(default)]
  pub storage: StorageCfg,
  #[serde(default)]
  pub lessons: Vec<LessonCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageCfg {
  /// Overrides DATA_DIR when set.
  #[serde(default)] pub dir: Option<PathBuf>,
  #[serde(default = "default_progress_key")] pub progress_key: String,
  #[serde(default = "default_onboarding_key")] pub onboarding_key: String,
}

impl Default for StorageCfg {
  fn default() -> Self {
    Self {
      dir: None,
      progress_key: default_progress_key(),
      onboarding_key: default_onboarding_key(),
    }
  }
}

fn default_progress_key() -> String { DEFAULT_PROGRESS_KEY.into() }
fn default_onboarding_key() -> String { DEFAULT_ONBOARDING_KEY.into() }

/// Extra lesson appended to an existing level (matched by level id).
#[derive(Clone, Debug, Deserialize)]
pub struct LessonCfg {
  pub level: String,
  #[serde(flatten)]
  pub lesson: Lesson,
}

impl TutorConfig {
  /// Storage directory: `[storage].dir`, else DATA_DIR, else ./data.
  pub fn storage_dir(&self) -> PathBuf {
    self
      .storage
      .dir
      .clone()
      .or_else(|| std::env::var("DATA_DIR").ok().map(PathBuf::from))
      .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
  }
}

pub fn parse_config(s: &str) -> Result<TutorConfig, toml::de::Error> {
  toml::from_str::<TutorConfig>(s)
}

/// Attempt to load `TutorConfig` from TUTOR_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<TutorConfig> {
  let path = std::env::var("TUTOR_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "debate_tutor", %path, extra_lessons = cfg.lessons.len(), "Loaded tutor config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "debate_tutor", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "debate_tutor", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

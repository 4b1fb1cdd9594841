//! Application state: the progress store, the curriculum, and the storage
//! handle used for the onboarding flag.
//!
//! The progress store is the single writer of the learner record. It sits
//! behind one `RwLock`, so mutations from HTTP and WebSocket are applied one
//! at a time and each one is written through before the lock is released.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use crate::config::{load_config_from_env, LessonCfg, TutorConfig};
use crate::domain::Curriculum;
use crate::error::TutorError;
use crate::progress::ProgressStore;
use crate::seeds::{seed_badges, seed_curriculum};
use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage};

#[derive(Clone)]
pub struct AppState {
    pub progress: Arc<RwLock<ProgressStore>>,
    pub curriculum: Arc<Curriculum>,
    pub storage: Arc<dyn KeyValueStorage>,
    pub onboarding_key: String,
}

impl AppState {
    /// Build state from env: load config, open storage, rehydrate progress.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_config_from_env().unwrap_or_default();
        let dir = cfg.storage_dir();

        let storage: Arc<dyn KeyValueStorage> = match FileStorage::open(&dir) {
            Ok(fs) => {
                info!(target: "debate_tutor", dir = %fs.root().display(), "File storage ready");
                Arc::new(fs)
            }
            Err(e) => {
                error!(target: "debate_tutor", dir = %dir.display(), error = %e, "Cannot open storage directory; progress will not survive restarts");
                Arc::new(MemoryStorage::new())
            }
        };

        Self::with_storage(storage, &cfg)
    }

    pub fn with_storage(storage: Arc<dyn KeyValueStorage>, cfg: &TutorConfig) -> Self {
        let mut curriculum = seed_curriculum();
        extend_curriculum(&mut curriculum, &cfg.lessons);

        for level in &curriculum.levels {
            info!(target: "debate_tutor", level = %level.id, lessons = level.lessons.len(), required_points = level.required_points, "Curriculum level");
        }

        let store = ProgressStore::open(storage.clone(), &cfg.storage.progress_key, seed_badges());

        Self {
            progress: Arc::new(RwLock::new(store)),
            curriculum: Arc::new(curriculum),
            storage,
            onboarding_key: cfg.storage.onboarding_key.clone(),
        }
    }

    pub fn onboarding_complete(&self) -> bool {
        match self.storage.get(&self.onboarding_key) {
            Ok(v) => v.as_deref().map(str::trim) == Some("true"),
            Err(e) => {
                error!(target: "debate_tutor", error = %e, "Failed to read onboarding flag");
                false
            }
        }
    }

    #[instrument(level = "info", skip(self))]
    pub fn mark_onboarding_complete(&self) -> Result<(), TutorError> {
        self.storage.set(&self.onboarding_key, "true")?;
        info!(target: "debate_tutor", "Onboarding completed");
        Ok(())
    }
}

/// Append configured lessons to their levels. Lessons whose level is unknown
/// or whose id is already taken are skipped.
fn extend_curriculum(curriculum: &mut Curriculum, extra: &[LessonCfg]) {
    for lc in extra {
        if curriculum.lesson(&lc.lesson.id).is_some() {
            warn!(target: "debate_tutor", lesson = %lc.lesson.id, "Skipping configured lesson: id already exists");
            continue;
        }
        match curriculum.levels.iter_mut().find(|l| l.id == lc.level) {
            Some(level) => {
                level.lessons.push(lc.lesson.clone());
            }
            None => {
                error!(target: "debate_tutor", lesson = %lc.lesson.id, level = %lc.level, "Skipping configured lesson: unknown level");
            }
        }
    }
}

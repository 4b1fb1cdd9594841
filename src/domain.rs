//! Domain models: the persisted progress record and badges, plus the static
//! curriculum tree (levels -> lessons -> activities).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named achievement flag. Only `earned`/`earned_at` ever change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
  pub id: String,
  pub name: String,
  pub description: String,
  pub icon: String,
  #[serde(default)] pub earned: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub earned_at: Option<DateTime<Utc>>,
}

/// The learner's persisted state. Serialized whole under a single storage key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
  pub level: u32,
  pub points: u64,
  pub badges: Vec<Badge>,
  #[serde(default)] pub completed_lessons: Vec<String>,
}

impl ProgressRecord {
  /// Zero-state record carrying the given badge set, all unearned.
  pub fn fresh(badges: Vec<Badge>) -> Self {
    Self {
      level: 0,
      points: 0,
      badges: badges
        .into_iter()
        .map(|b| Badge { earned: false, earned_at: None, ..b })
        .collect(),
      completed_lessons: Vec::new(),
    }
  }

  pub fn badge(&self, id: &str) -> Option<&Badge> {
    self.badges.iter().find(|b| b.id == id)
  }

  pub fn has_earned(&self, id: &str) -> bool {
    self.badge(id).map(|b| b.earned).unwrap_or(false)
  }

  pub fn has_completed(&self, lesson_id: &str) -> bool {
    self.completed_lessons.iter().any(|l| l == lesson_id)
  }
}

/// How a lesson is presented to the learner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LessonKind {
  Quiz,
  DragDrop,
  FallacyHunt,
  ArgumentBuilder,
  AiChat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
  MultipleChoice,
  DragDrop,
  TextInput,
  Rating,
}

/// Expected answer: one option for multiple choice, an ordering for drag-drop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
  Single(String),
  Ordered(Vec<String>),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
  pub id: String,
  pub kind: ActivityKind,
  pub question: String,
  #[serde(default)] pub options: Vec<String>,
  #[serde(default)] pub correct_answer: Option<CorrectAnswer>,
  pub feedback: String,
  pub points: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
  pub id: String,
  pub title: String,
  pub description: String,
  pub kind: LessonKind,
  pub points: u64,
  pub instructions: String,
  #[serde(default)] pub activities: Vec<Activity>,
}

/// A tier of the curriculum. Its index in the curriculum is the level number.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
  pub id: String,
  pub name: String,
  pub description: String,
  pub required_points: u64,
  #[serde(default)] pub lessons: Vec<Lesson>,
}

/// The whole static lesson tree.
#[derive(Clone, Debug, Default)]
pub struct Curriculum {
  pub levels: Vec<Level>,
}

impl Curriculum {
  pub fn lesson(&self, id: &str) -> Option<&Lesson> {
    self.levels.iter().flat_map(|l| l.lessons.iter()).find(|l| l.id == id)
  }

  /// (level index, lesson index within that level) of a lesson.
  pub fn locate(&self, lesson_id: &str) -> Option<(usize, usize)> {
    self.levels.iter().enumerate().find_map(|(li, level)| {
      level.lessons.iter().position(|l| l.id == lesson_id).map(|pos| (li, pos))
    })
  }

  pub fn activity(&self, id: &str) -> Option<&Activity> {
    self
      .levels
      .iter()
      .flat_map(|l| l.lessons.iter())
      .flat_map(|l| l.activities.iter())
      .find(|a| a.id == id)
  }

  pub fn lesson_count(&self) -> usize {
    self.levels.iter().map(|l| l.lessons.len()).sum()
  }
}

//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - The lesson completion flow (points, lesson, level unlocks, badges)
//!   - Activity grading against the curriculum
//!   - Read-only views: levels with unlock/progress state, dashboard stats

use tracing::{info, instrument, warn};

use crate::domain::{Curriculum, Level, ProgressRecord};
use crate::error::TutorError;
use crate::grading::{grade, Grade, Submission};
use crate::protocol::{LessonCompleteOut, LessonView, LevelView, StatsOut};
use crate::state::AppState;

fn level_open(level: &Level, idx: usize, record: &ProgressRecord) -> bool {
  idx as u32 <= record.level || record.points >= level.required_points
}

/// A lesson is reachable when its level is open and it is either the first
/// lesson of that level or follows a completed one.
fn lesson_open(curriculum: &Curriculum, record: &ProgressRecord, level_idx: usize, lesson_idx: usize) -> bool {
  let level = &curriculum.levels[level_idx];
  level_open(level, level_idx, record)
    && (lesson_idx == 0 || record.has_completed(&level.lessons[lesson_idx - 1].id))
}

/// Award points for a finished lesson, record it, unlock every level the new
/// total reaches, then run the badge rules. All under one write lock.
/// Lessons in a closed level or ahead of an unfinished one are rejected.
#[instrument(level = "info", skip(state))]
pub async fn complete_lesson_flow(state: &AppState, lesson_id: &str, points_earned: u64) -> Result<LessonCompleteOut, TutorError> {
  let (level_idx, lesson_idx) = state
    .curriculum
    .locate(lesson_id)
    .ok_or_else(|| TutorError::UnknownLesson(lesson_id.to_string()))?;

  let mut store = state.progress.write().await;
  if !lesson_open(&state.curriculum, store.record(), level_idx, lesson_idx) {
    warn!(target: "progress", %lesson_id, "Rejected completion of a locked lesson");
    return Err(TutorError::LessonLocked(lesson_id.to_string()));
  }
  store.add_points(points_earned);
  store.complete_lesson(lesson_id);

  let points = store.record().points;
  let current = store.record().level;
  let mut unlocked_levels = Vec::new();
  for (idx, level) in state.curriculum.levels.iter().enumerate() {
    let idx = idx as u32;
    if idx > current && points >= level.required_points {
      store.unlock_level(idx);
      unlocked_levels.push(level.id.clone());
    }
  }

  let new_badges = store.check_badge_eligibility();
  info!(target: "progress", %lesson_id, points, unlocked = ?unlocked_levels, badges = ?new_badges, "Lesson completion applied");

  Ok(LessonCompleteOut {
    points_earned,
    total_points: points,
    level: store.record().level,
    unlocked_levels,
    new_badges,
  })
}

#[instrument(level = "info", skip(state, submission), fields(%activity_id))]
pub async fn grade_activity(state: &AppState, activity_id: &str, submission: &Submission) -> Result<Grade, TutorError> {
  let activity = state
    .curriculum
    .activity(activity_id)
    .ok_or_else(|| TutorError::UnknownActivity(activity_id.to_string()))?;
  let g = grade(activity, submission);
  info!(target: "progress", %activity_id, verdict = ?g.verdict, points = g.points, "Activity graded");
  Ok(g)
}

/// Levels with their unlock state and per-lesson completion marks.
/// A level is open once its index is reached or the learner has the points.
pub fn level_views(curriculum: &Curriculum, record: &ProgressRecord) -> Vec<LevelView> {
  curriculum
    .levels
    .iter()
    .enumerate()
    .map(|(idx, level)| {
      let lessons: Vec<LessonView> = level
        .lessons
        .iter()
        .enumerate()
        .map(|(pos, l)| LessonView {
          id: l.id.clone(),
          title: l.title.clone(),
          kind: l.kind,
          points: l.points,
          completed: record.has_completed(&l.id),
          unlocked: lesson_open(curriculum, record, idx, pos),
        })
        .collect();
      let done = lessons.iter().filter(|l| l.completed).count();
      let progress = if lessons.is_empty() { 0 } else { (done * 100 / lessons.len()) as u32 };

      LevelView {
        id: level.id.clone(),
        name: level.name.clone(),
        description: level.description.clone(),
        required_points: level.required_points,
        unlocked: level_open(level, idx, record),
        completed: !lessons.is_empty() && done == lessons.len(),
        progress,
        lessons,
      }
    })
    .collect()
}

/// Completion figures count curriculum lessons only; the record may also hold
/// ids completed through the raw progress API. The per-lesson average divides
/// by every recorded id.
pub fn stats(curriculum: &Curriculum, record: &ProgressRecord) -> StatsOut {
  let recorded = record.completed_lessons.len();
  let lessons_done = record
    .completed_lessons
    .iter()
    .filter(|id| curriculum.lesson(id).is_some())
    .count();
  let total_lessons = curriculum.lesson_count();
  let badges_earned = record.badges.iter().filter(|b| b.earned).count();

  let pct = |part: usize, whole: usize| if whole == 0 { 0.0 } else { part as f64 * 100.0 / whole as f64 };

  StatsOut {
    total_points: record.points,
    level: record.level,
    lessons_done,
    total_lessons,
    completion_rate: pct(lessons_done, total_lessons),
    badges_earned,
    badge_rate: pct(badges_earned, record.badges.len()),
    avg_points_per_lesson: if recorded == 0 {
      0
    } else {
      (record.points as f64 / recorded as f64).round() as u64
    },
  }
}

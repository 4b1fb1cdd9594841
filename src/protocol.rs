//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Field names are camelCase to match the stored record and the frontend.

use serde::{Deserialize, Serialize};

use crate::domain::{LessonKind, ProgressRecord};
use crate::grading::{Grade, Submission};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    GetProgress,
    AddPoints {
        points: u64,
    },
    CompleteLesson {
        #[serde(rename = "lessonId")]
        lesson_id: String,
    },
    UnlockLevel {
        level: u32,
    },
    EarnBadge {
        #[serde(rename = "badgeId")]
        badge_id: String,
    },
    CheckBadges,
    FinishLesson {
        #[serde(rename = "lessonId")]
        lesson_id: String,
        #[serde(rename = "pointsEarned")]
        points_earned: u64,
    },
    SubmitActivity {
        #[serde(rename = "activityId")]
        activity_id: String,
        answer: Submission,
    },
    GetStats,
}

/// Messages the server sends over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Progress {
        progress: ProgressRecord,
    },
    BadgesChecked {
        #[serde(rename = "newBadges")]
        new_badges: Vec<String>,
        progress: ProgressRecord,
    },
    LessonComplete {
        result: LessonCompleteOut,
    },
    ActivityResult {
        #[serde(rename = "activityId")]
        activity_id: String,
        grade: Grade,
    },
    Stats {
        stats: StatsOut,
    },
    Error {
        message: String,
    },
}

// ----- HTTP DTOs -----

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct AddPointsIn {
    pub points: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteLessonIn {
    pub lesson_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UnlockLevelIn {
    pub level: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeCheckOut {
    pub new_badges: Vec<String>,
    pub progress: ProgressRecord,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishLessonIn {
    pub points_earned: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonCompleteOut {
    pub points_earned: u64,
    pub total_points: u64,
    pub level: u32,
    pub unlocked_levels: Vec<String>,
    pub new_badges: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    pub answer: Submission,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonView {
    pub id: String,
    pub title: String,
    pub kind: LessonKind,
    pub points: u64,
    pub completed: bool,
    /// First lesson of an open level, or the previous lesson is completed.
    pub unlocked: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub required_points: u64,
    pub unlocked: bool,
    /// Every lesson of a non-empty level is completed.
    pub completed: bool,
    /// Percent of this level's lessons completed.
    pub progress: u32,
    pub lessons: Vec<LessonView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOut {
    pub total_points: u64,
    pub level: u32,
    pub lessons_done: usize,
    pub total_lessons: usize,
    pub completion_rate: f64,
    pub badges_earned: usize,
    pub badge_rate: f64,
    pub avg_points_per_lesson: u64,
}

#[derive(Debug, Serialize)]
pub struct OnboardingOut {
    pub complete: bool,
}

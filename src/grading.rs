//! Deterministic activity grading.
//!
//! Multiple choice is all-or-nothing. Orderings earn full points when exact
//! and half points (rounded down) for any other arrangement. Free-text and
//! rating activities are coach-reviewed and are never graded here.

use serde::{Deserialize, Serialize};

use crate::domain::{Activity, ActivityKind, CorrectAnswer};

/// What the learner submitted for an activity.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Submission {
  Choice(String),
  Order(Vec<String>),
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
  Correct,
  Incorrect,
  Ungraded,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
  pub verdict: Verdict,
  pub points: u64,
  pub feedback: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub expected: Option<CorrectAnswer>,
}

pub fn grade(activity: &Activity, submission: &Submission) -> Grade {
  match (activity.kind, &activity.correct_answer) {
    (ActivityKind::MultipleChoice, Some(CorrectAnswer::Single(expected))) => {
      let correct = matches!(submission, Submission::Choice(c) if c == expected);
      if correct {
        hit(activity)
      } else {
        Grade {
          verdict: Verdict::Incorrect,
          points: 0,
          feedback: "Not quite right, but keep learning!".into(),
          expected: activity.correct_answer.clone(),
        }
      }
    }
    (ActivityKind::DragDrop, Some(CorrectAnswer::Ordered(expected))) => {
      let correct = matches!(submission, Submission::Order(o) if o == expected);
      if correct {
        hit(activity)
      } else {
        let partial = activity.points / 2;
        Grade {
          verdict: Verdict::Incorrect,
          points: partial,
          feedback: format!("Good try! +{partial} points for effort"),
          expected: activity.correct_answer.clone(),
        }
      }
    }
    _ => Grade {
      verdict: Verdict::Ungraded,
      points: 0,
      feedback: activity.feedback.clone(),
      expected: None,
    },
  }
}

fn hit(activity: &Activity) -> Grade {
  Grade {
    verdict: Verdict::Correct,
    points: activity.points,
    feedback: activity.feedback.clone(),
    expected: None,
  }
}

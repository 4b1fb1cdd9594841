//! Built-in content: the badge set and the debate curriculum.
//! Guarantees the app is usable without any external config.

use crate::domain::{
  Activity, ActivityKind, Badge, CorrectAnswer, Curriculum, Lesson, LessonKind, Level,
};

pub const FIRST_STEPS: &str = "first-steps";
pub const LOGIC_MASTER: &str = "logic-master";

fn badge(id: &str, name: &str, description: &str, icon: &str) -> Badge {
  Badge {
    id: id.into(),
    name: name.into(),
    description: description.into(),
    icon: icon.into(),
    earned: false,
    earned_at: None,
  }
}

/// The fixed badge set, in display order.
pub fn seed_badges() -> Vec<Badge> {
  vec![
    badge(FIRST_STEPS, "First Steps", "Complete your first lesson", "🎯"),
    badge(LOGIC_MASTER, "Logic Master", "Score 80% or higher on 5 quizzes", "🧠"),
    badge("rebuttal-expert", "Rebuttal Expert", "Master the art of rebuttals", "⚔️"),
    badge("fallacy-hunter", "Fallacy Hunter", "Identify 20 logical fallacies correctly", "🕵️"),
    badge("argument-architect", "Argument Architect", "Build 10 strong arguments", "🏗️"),
    badge("debate-champion", "Debate Champion", "Complete all levels with excellence", "👑"),
  ]
}

fn choice(id: &str, question: &str, options: &[&str], correct: &str, feedback: &str, points: u64) -> Activity {
  Activity {
    id: id.into(),
    kind: ActivityKind::MultipleChoice,
    question: question.into(),
    options: options.iter().map(|s| s.to_string()).collect(),
    correct_answer: Some(CorrectAnswer::Single(correct.into())),
    feedback: feedback.into(),
    points,
  }
}

fn ordering(id: &str, question: &str, options: &[&str], correct: &[&str], feedback: &str, points: u64) -> Activity {
  Activity {
    id: id.into(),
    kind: ActivityKind::DragDrop,
    question: question.into(),
    options: options.iter().map(|s| s.to_string()).collect(),
    correct_answer: Some(CorrectAnswer::Ordered(correct.iter().map(|s| s.to_string()).collect())),
    feedback: feedback.into(),
    points,
  }
}

fn open_ended(id: &str, kind: ActivityKind, question: &str, feedback: &str, points: u64) -> Activity {
  Activity {
    id: id.into(),
    kind,
    question: question.into(),
    options: Vec::new(),
    correct_answer: None,
    feedback: feedback.into(),
    points,
  }
}

fn basics() -> Level {
  Level {
    id: "basics".into(),
    name: "Debate Basics".into(),
    description: "Learn fundamental debate concepts and structure".into(),
    required_points: 0,
    lessons: vec![
      Lesson {
        id: "basics-1".into(),
        title: "What is Debate?".into(),
        description: "Introduction to debate and its importance".into(),
        kind: LessonKind::Quiz,
        points: 20,
        instructions: "Learn the fundamentals of debate and test your understanding.".into(),
        activities: vec![
          choice(
            "basics-1-q1",
            "What is the primary purpose of debate?",
            &[
              "To win at all costs",
              "To explore different perspectives and reach better understanding",
              "To show off your knowledge",
              "To prove others wrong",
            ],
            "To explore different perspectives and reach better understanding",
            "Correct! Debate is about exploring ideas and reaching better understanding through reasoned discussion.",
            5,
          ),
          choice(
            "basics-1-q2",
            "Which of these is NOT a key element of good debate?",
            &["Evidence and reasoning", "Respectful listening", "Personal attacks", "Clear structure"],
            "Personal attacks",
            "Right! Personal attacks have no place in constructive debate. Focus on ideas, not individuals.",
            5,
          ),
          choice(
            "basics-1-q3",
            "What makes an argument strong?",
            &[
              "Speaking loudly",
              "Using complex words",
              "Providing evidence and logical reasoning",
              "Having the last word",
            ],
            "Providing evidence and logical reasoning",
            "Excellent! Strong arguments are built on solid evidence and clear logical reasoning.",
            10,
          ),
        ],
      },
      Lesson {
        id: "basics-2".into(),
        title: "Debate Formats".into(),
        description: "Explore different debate formats and their rules".into(),
        kind: LessonKind::Quiz,
        points: 25,
        instructions: "Learn about different debate formats used in schools and competitions.".into(),
        activities: vec![
          choice(
            "basics-2-q1",
            "In Parliamentary debate, how many speakers are there per team?",
            &["1", "2", "3", "4"],
            "2",
            "Correct! Parliamentary debate typically has 2 speakers per team.",
            8,
          ),
          choice(
            "basics-2-q2",
            "What is unique about Lincoln-Douglas debate?",
            &[
              "It focuses on team collaboration",
              "It emphasizes values and philosophy",
              "It allows unlimited preparation time",
              "It requires visual aids",
            ],
            "It emphasizes values and philosophy",
            "Right! Lincoln-Douglas debate focuses on values, philosophy, and ethical reasoning.",
            8,
          ),
          choice(
            "basics-2-q3",
            "What is the opening statement in debate called?",
            &["Rebuttal", "Constructive", "Cross-examination", "Closing"],
            "Constructive",
            "Perfect! The constructive speech presents your main arguments and evidence.",
            9,
          ),
        ],
      },
      Lesson {
        id: "basics-3".into(),
        title: "Structure & Flow".into(),
        description: "Master the structure of arguments and debate flow".into(),
        kind: LessonKind::DragDrop,
        points: 30,
        instructions: "Arrange the elements of a strong argument in the correct order.".into(),
        activities: vec![ordering(
          "basics-3-structure",
          "Put these argument components in the correct order:",
          &["Evidence", "Claim", "Reasoning", "Impact"],
          &["Claim", "Evidence", "Reasoning", "Impact"],
          "Excellent! A strong argument follows the CERI structure: Claim, Evidence, Reasoning, Impact.",
          30,
        )],
      },
    ],
  }
}

fn arguments() -> Level {
  Level {
    id: "arguments".into(),
    name: "Building Arguments".into(),
    description: "Learn to construct compelling and logical arguments".into(),
    required_points: 75,
    lessons: vec![
      Lesson {
        id: "arguments-1".into(),
        title: "Evidence Types".into(),
        description: "Understand different types of evidence and their strength".into(),
        kind: LessonKind::Quiz,
        points: 25,
        instructions: "Learn about different types of evidence and when to use them.".into(),
        activities: vec![
          choice(
            "arguments-1-q1",
            "Which type of evidence is generally considered strongest?",
            &["Personal anecdotes", "Expert testimony", "Peer-reviewed research", "Popular opinion"],
            "Peer-reviewed research",
            "Correct! Peer-reviewed research provides the most reliable and credible evidence.",
            8,
          ),
          choice(
            "arguments-1-q2",
            "When is anecdotal evidence most appropriate?",
            &[
              "As the sole support for major claims",
              "To illustrate or humanize data",
              "To replace statistical evidence",
              "Never - it should be avoided",
            ],
            "To illustrate or humanize data",
            "Right! Anecdotes work best when they illustrate broader patterns supported by data.",
            8,
          ),
          open_ended(
            "arguments-1-q3",
            ActivityKind::Rating,
            "Rate the credibility of this evidence: \"A 2023 study from Harvard Medical School published in Nature Medicine found...\"",
            "This is high-quality evidence: recent, from a prestigious institution, published in a top journal.",
            9,
          ),
        ],
      },
      Lesson {
        id: "arguments-2".into(),
        title: "Logical Reasoning".into(),
        description: "Master the principles of logical reasoning".into(),
        kind: LessonKind::AiChat,
        points: 35,
        instructions: "Practice building logical connections between evidence and conclusions.".into(),
        activities: vec![open_ended(
          "arguments-2-ai",
          ActivityKind::TextInput,
          "Given this evidence: \"Studies show that students who get 8+ hours of sleep score 15% higher on tests.\" Build a logical argument for later school start times.",
          "Strong reasoning connects sleep research to academic performance and school policy.",
          35,
        )],
      },
      Lesson {
        id: "arguments-3".into(),
        title: "Argument Architecture".into(),
        description: "Build complex multi-layered arguments".into(),
        kind: LessonKind::ArgumentBuilder,
        points: 40,
        instructions: "Construct a complete argument using the drag-and-drop interface.".into(),
        activities: vec![ordering(
          "arguments-3-builder",
          "Build an argument for renewable energy investment:",
          &[
            "Solar and wind costs have dropped 70% in 5 years",
            "Climate change threatens global stability",
            "Therefore, we must transition to renewable energy",
            "Renewable energy creates more jobs than fossil fuels",
            "Lower costs make renewables economically viable",
            "Job creation boosts the economy",
            "Avoiding climate disaster is essential for humanity",
          ],
          &[
            "Therefore, we must transition to renewable energy",
            "Solar and wind costs have dropped 70% in 5 years",
            "Lower costs make renewables economically viable",
            "Renewable energy creates more jobs than fossil fuels",
            "Job creation boosts the economy",
            "Climate change threatens global stability",
            "Avoiding climate disaster is essential for humanity",
          ],
          "Excellent argument structure with multiple supporting pillars!",
          40,
        )],
      },
    ],
  }
}

fn empty_level(id: &str, name: &str, description: &str, required_points: u64) -> Level {
  Level {
    id: id.into(),
    name: name.into(),
    description: description.into(),
    required_points,
    lessons: Vec::new(),
  }
}

/// The built-in curriculum. Later tiers have no lessons yet; they still
/// unlock by points so the bracket and arena have somewhere to lead.
pub fn seed_curriculum() -> Curriculum {
  Curriculum {
    levels: vec![
      basics(),
      arguments(),
      empty_level("rebuttals", "Rebuttals & Refutation", "Learn to effectively respond to opposing arguments", 175),
      empty_level("fallacies", "Logical Fallacies", "Identify and avoid common logical fallacies", 275),
      empty_level("advanced", "Advanced Techniques", "Master advanced debate strategies and techniques", 400),
    ],
  }
}

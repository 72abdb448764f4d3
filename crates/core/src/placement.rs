//! Client-bundled placement test question set.
//!
//! The placement test ships with the client rather than being fetched:
//! six questions, two per difficulty tier, graded locally before the
//! resulting level is submitted to the backend.

use crate::model::{Choice, ChoiceId, Difficulty, Question, QuestionId, QuestionKind};

struct Seed {
    id: &'static str,
    kind: QuestionKind,
    prompt: &'static str,
    choices: [(&'static str, &'static str); 4],
    correct: &'static str,
    difficulty: Difficulty,
}

const PLACEMENT: [Seed; 6] = [
    Seed {
        id: "q1",
        kind: QuestionKind::Grammar,
        prompt: "Which sentence is grammatically correct?",
        choices: [
            ("a", "He don't like coffee."),
            ("b", "He doesn't likes coffee."),
            ("c", "He doesn't like coffee."),
            ("d", "He not likes coffee."),
        ],
        correct: "c",
        difficulty: Difficulty::Beginner,
    },
    Seed {
        id: "q2",
        kind: QuestionKind::Vocabulary,
        prompt: "Choose the best synonym for \u{201c}rapid\u{201d}.",
        choices: [("a", "slow"), ("b", "quick"), ("c", "late"), ("d", "tiny")],
        correct: "b",
        difficulty: Difficulty::Beginner,
    },
    Seed {
        id: "q3",
        kind: QuestionKind::Reading,
        prompt: "Read: \u{201c}Due to unexpected supply issues, the company postponed the launch to ensure product quality.\u{201d}\nWhy did the company delay the launch?",
        choices: [
            ("a", "Supply issues"),
            ("b", "Holiday season"),
            ("c", "Legal approval"),
            ("d", "No reason given"),
        ],
        correct: "a",
        difficulty: Difficulty::Intermediate,
    },
    Seed {
        id: "q4",
        kind: QuestionKind::Grammar,
        prompt: "Fill in the blank: She has lived here ____ 2019.",
        choices: [
            ("a", "for"),
            ("b", "since"),
            ("c", "from"),
            ("d", "during"),
        ],
        correct: "b",
        difficulty: Difficulty::Intermediate,
    },
    Seed {
        id: "q5",
        kind: QuestionKind::Vocabulary,
        prompt: "In the sentence, \u{201c}The new policy aims to mitigate the risks,\u{201d} what does \u{201c}mitigate\u{201d} most closely mean?",
        choices: [
            ("a", "to increase"),
            ("b", "to eliminate completely"),
            ("c", "to reduce the severity"),
            ("d", "to ignore"),
        ],
        correct: "c",
        difficulty: Difficulty::Advanced,
    },
    Seed {
        id: "q6",
        kind: QuestionKind::Reading,
        prompt: "Read: \u{201c}The author argues that while remote work reduces commute time, its real benefit is a better work-life balance that improves employee well-being.\u{201d}\nWhat is the author's main point?",
        choices: [
            ("a", "Remote work mainly cuts commute time."),
            ("b", "Remote work improves work-life balance."),
            ("c", "Remote work lowers office rent."),
            ("d", "Traffic lights need improvement."),
        ],
        correct: "b",
        difficulty: Difficulty::Advanced,
    },
];

/// The ordered placement question set.
///
/// # Panics
///
/// Panics only if the bundled data is internally inconsistent, which the
/// tests below rule out.
#[must_use]
pub fn placement_questions() -> Vec<Question> {
    PLACEMENT
        .iter()
        .map(|seed| {
            Question::new(
                QuestionId::new(seed.id),
                seed.kind,
                seed.prompt,
                seed.choices
                    .iter()
                    .map(|(id, text)| Choice::new(ChoiceId::new(*id), *text))
                    .collect(),
                Some(ChoiceId::new(seed.correct)),
                seed.difficulty,
            )
            .expect("bundled placement question should be valid")
        })
        .collect()
}

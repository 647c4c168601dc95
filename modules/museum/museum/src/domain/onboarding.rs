//! Onboarding questionnaire and the rule-based theme scorer used when the
//! text collaborator cannot produce an analysis.

use museum_sdk::OnboardingResponse;

pub const QUESTIONS: [&str; 5] = [
    "What kind of compliment makes you happiest?",
    "What do you look forward to in everyday life?",
    "How would you like the people around you to remember you?",
    "How would you sum up your life in one sentence?",
    "What atmosphere would you like your farewell to have?",
];

pub const REQUIRED_RESPONSES: usize = QUESTIONS.len();

const KEYWORD_POINTS: u32 = 2;

/// Theme id, its keywords and the fixed reason returned for it.
const RULES: [(u8, [&str; 3], &str); 5] = [
    (
        1,
        ["family", "warm", "innocent"],
        "For someone who keeps a warm heart, this theme feels just right.",
    ),
    (
        2,
        ["love", "emotion", "art"],
        "For someone so rich in feeling, this theme feels just right.",
    ),
    (
        3,
        ["success", "passion", "growth"],
        "For someone passionate and driven, this theme feels just right.",
    ),
    (
        4,
        ["nature", "peace", "simple"],
        "For someone who seeks calm, this theme feels just right.",
    ),
    (
        5,
        ["memory", "memories", "longing"],
        "For someone who treasures precious memories, this theme feels just right.",
    ),
];

/// Outcome of keyword scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordChoice {
    pub choice: u8,
    pub reason: &'static str,
}

/// Scores lowercase `text` against every theme. A theme earns its points once
/// if any of its keywords occurs. Ties go to the highest theme id, so text
/// without any keyword lands on theme 5.
#[must_use]
pub fn score_text(text: &str) -> KeywordChoice {
    let text = text.to_lowercase();
    let mut best = KeywordChoice {
        choice: RULES[0].0,
        reason: RULES[0].2,
    };
    let mut best_score = 0;

    for (theme_id, keywords, reason) in RULES {
        let score = if keywords.iter().any(|k| text.contains(k)) {
            KEYWORD_POINTS
        } else {
            0
        };
        if score >= best_score {
            best_score = score;
            best = KeywordChoice {
                choice: theme_id,
                reason,
            };
        }
    }
    best
}

/// Scores the answers of a questionnaire.
#[must_use]
pub fn score_responses(responses: &[OnboardingResponse]) -> KeywordChoice {
    let answers = responses
        .iter()
        .map(|r| r.answer.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    score_text(&answers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(texts: &[&str]) -> Vec<OnboardingResponse> {
        texts
            .iter()
            .zip(QUESTIONS)
            .map(|(a, q)| OnboardingResponse {
                question: q.to_owned(),
                answer: (*a).to_owned(),
            })
            .collect()
    }

    #[test]
    fn single_keyword_picks_its_theme() {
        let res = score_responses(&answers(&["I love quiet walks in Nature", "", "", "", ""]));
        assert_eq!(res.choice, 4);
        assert!(res.reason.contains("calm"));
    }

    #[test]
    fn ties_go_to_the_highest_theme() {
        assert_eq!(score_text("my family and my passion").choice, 3);
        assert_eq!(score_text("nothing relevant here").choice, 5);
    }

    #[test]
    fn repeated_keywords_do_not_stack() {
        let res = score_text("family family family warm innocent, and some art");
        assert_eq!(res.choice, 2);
    }
}

//! Prompt construction and answer extraction

use super::question::Question;
use crate::error::{BenchError, BenchResult};
use once_cell::sync::Lazy;
use regex::Regex;

static ANSWER_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)answer\s*[:\-]\s*\(?([A-Z])\)?(?:[^A-Za-z]|$)").expect("valid answer regex")
});

/// Most choices a question may carry; one per label `A`..`Z`
pub const MAX_CHOICES: usize = 26;

/// Label for the choice at `index` (`A`, `B`, ...); `index` must be below
/// [`MAX_CHOICES`]
pub fn choice_label(index: usize) -> char {
    char::from_u32('A' as u32 + index as u32).unwrap_or('?')
}

/// Builds backend prompts from questions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Prompt for any question
    pub fn build(question: &Question) -> String {
        match question.choices() {
            Some(choices) => Self::multiple_choice(&question.text, choices),
            None => Self::open_ended(&question.text),
        }
    }

    /// Prompt asking for a labelled choice followed by an explanation
    pub fn multiple_choice(text: &str, choices: &[String]) -> String {
        let options = choices
            .iter()
            .enumerate()
            .map(|(i, choice)| format!("({}) {}", choice_label(i), choice))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Question: {text}\n\
             Choices:\n{options}\n\n\
             Carefully analyze the subject matter and evaluate each choice to determine \
             the most accurate answer. Your response must contain two parts:\n\
             1. The label of the correct choice.\n\
             2. A brief explanation justifying the selected choice.\n\
             Use exactly this format:\n\
             Answer: <Label>\n\
             Explanation: <your explanation>"
        )
    }

    /// Zero-shot prompt for an open-ended question
    pub fn open_ended(text: &str) -> String {
        format!("Question: {text}")
    }
}

/// Turn a raw model response into the recorded answer.
///
/// Multiple-choice responses reduce to a single valid label: the first
/// `Answer: X` wins, otherwise a response whose first non-empty line starts
/// with a valid label. Open-ended responses are kept whole.
pub fn extract_answer(response: &str, choices: Option<&[String]>) -> BenchResult<String> {
    let response = response.trim();
    let Some(choices) = choices else {
        if response.is_empty() {
            return Err(BenchError::backend("empty response"));
        }
        return Ok(response.to_string());
    };

    let valid = |label: char| {
        let label = label.to_ascii_uppercase();
        (0..choices.len()).any(|i| choice_label(i) == label)
    };

    if let Some(caps) = ANSWER_LABEL.captures(response) {
        if let Some(label) = caps.get(1).and_then(|m| m.as_str().chars().next()) {
            if valid(label) {
                return Ok(label.to_ascii_uppercase().to_string());
            }
        }
    }

    let first_line = response.lines().map(str::trim).find(|l| !l.is_empty());
    if let Some(line) = first_line {
        let mut chars = line.trim_start_matches('(').chars();
        if let Some(label) = chars.next() {
            let standalone = chars.next().is_none_or(|c| !c.is_ascii_alphanumeric());
            if label.is_ascii_alphabetic() && standalone && valid(label) {
                return Ok(label.to_ascii_uppercase().to_string());
            }
        }
    }

    Err(BenchError::backend(format!(
        "no valid choice label among {} options in response",
        choices.len()
    )))
}

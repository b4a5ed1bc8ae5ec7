//! Per-item results

use crate::sampling::QuestionId;
use qbench_core::{Answer, Question};
use serde::{Deserialize, Serialize};

/// One persisted answer.
///
/// A failed item has `answer: null` and an `error` string; a model can never
/// produce that shape, so failures stay distinguishable from answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub id: QuestionId,
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
}

impl AnswerResult {
    /// Result for `id`
    pub fn new(id: QuestionId, answer: Answer) -> Self {
        let (answer, error) = match answer {
            Answer::Text(text) => (Some(text), None),
            Answer::Failed { reason } => (None, Some(reason)),
        };
        Self {
            id,
            answer,
            error,
            question: None,
            choices: None,
        }
    }

    /// Keep the question text and choices alongside the answer
    pub fn with_inputs(mut self, question: &Question) -> Self {
        self.question = Some(question.text.clone());
        self.choices = question.choices.clone();
        self
    }

    /// Whether the item ended with the error sentinel
    pub fn is_failed(&self) -> bool {
        self.answer.is_none()
    }

    /// Answer as the core value type
    pub fn to_answer(&self) -> Answer {
        match &self.answer {
            Some(text) => Answer::Text(text.clone()),
            None => Answer::failed(self.error.clone().unwrap_or_default()),
        }
    }
}

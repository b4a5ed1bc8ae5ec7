//! Shared value types

use std::fmt;

/// Outcome of answering one question.
///
/// `Failed` is the error sentinel: it can never be confused with a real
/// answer because it is a separate variant, not a reserved string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// The backend's (extracted) answer
    Text(String),
    /// Every attempt failed
    Failed {
        /// Last error seen, for the artifact and logs
        reason: String,
    },
}

impl Answer {
    /// Create the error sentinel
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Whether this is the error sentinel
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Answer text, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Failed { .. } => None,
        }
    }

    /// Failure reason, if any
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Failed { reason } => Some(reason),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{}", text),
            Self::Failed { reason } => write!(f, "<failed: {}>", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_distinct_from_error_text() {
        let real = Answer::Text("Error".to_string());
        let sentinel = Answer::failed("timeout");
        assert_ne!(real, sentinel);
        assert!(!real.is_failed());
        assert!(sentinel.is_failed());
        assert_eq!(real.text(), Some("Error"));
        assert_eq!(sentinel.failure_reason(), Some("timeout"));
    }
}

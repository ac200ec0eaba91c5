//! Core types for practice sessions.

use serde::{Deserialize, Serialize};

/// Kind of practice run on a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeType {
    Options,
    Gaps,
}

impl PracticeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Options => "options",
            Self::Gaps => "gaps",
        }
    }

    /// Parse from the wire representation. Anything outside the closed set
    /// is rejected.
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "options" => Some(Self::Options),
            "gaps" => Some(Self::Gaps),
            _ => None,
        }
    }
}

/// Statistics computed when a practice is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeStats {
    pub average_attempts: f64,
    pub total_wrong_answers: i64,
    pub num_cards: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn practice_type_parses_closed_set() {
        assert_eq!(PracticeType::from_str("options"), Some(PracticeType::Options));
        assert_eq!(PracticeType::from_str("gaps"), Some(PracticeType::Gaps));
        assert_eq!(PracticeType::from_str("quiz"), None);
        assert_eq!(PracticeType::from_str(""), None);
    }

    #[test]
    fn practice_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PracticeType::Options).unwrap(),
            "\"options\""
        );
        assert_eq!(serde_json::to_string(&PracticeType::Gaps).unwrap(), "\"gaps\"");
    }

    #[test]
    fn stats_serialize_camel_case() {
        let stats = PracticeStats {
            average_attempts: 0.5,
            total_wrong_answers: 1,
            num_cards: 2,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["averageAttempts"], 0.5);
        assert_eq!(json["totalWrongAnswers"], 1);
        assert_eq!(json["numCards"], 2);
    }
}

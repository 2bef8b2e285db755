use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for stored questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u64);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier wrapper for stored choices. Unique across all questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoiceId(pub u64);

impl fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A poll prompt together with the moment it becomes publicly visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
}

impl Question {
    /// Length of the trailing window used by [`Question::was_published_recently`].
    pub fn recent_window() -> Duration {
        Duration::days(1)
    }

    /// A question is visible once its publication date has been reached.
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.pub_date <= now
    }

    /// True when the question went live within the last day. Future dates never count.
    pub fn was_published_recently(&self, now: DateTime<Utc>) -> bool {
        now - Self::recent_window() <= self.pub_date && self.pub_date <= now
    }
}

/// A selectable answer owned by a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub question_id: QuestionId,
    pub choice_text: String,
    pub votes: u32,
}

/// Store snapshot of a question and the choices it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: Question,
    pub choices: Vec<Choice>,
}

impl QuestionRecord {
    pub fn id(&self) -> QuestionId {
        self.question.id
    }

    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }

    pub fn choice(&self, choice_id: ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.id == choice_id)
    }

    pub fn total_votes(&self) -> u64 {
        self.choices.iter().map(|choice| u64::from(choice.votes)).sum()
    }
}

/// Administrative payload for creating a question with its inline choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    #[serde(default)]
    pub choices: Vec<String>,
}

impl NewQuestion {
    /// Inline choice texts with blank slots dropped, as an admin form leaves them.
    pub fn filled_choices(&self) -> impl Iterator<Item = &str> {
        self.choices
            .iter()
            .map(|text| text.trim())
            .filter(|text| !text.is_empty())
    }
}

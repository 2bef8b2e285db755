use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Choice, ChoiceId, QuestionId, QuestionRecord};

/// Index feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionSummary {
    pub id: QuestionId,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    pub was_published_recently: bool,
}

impl QuestionSummary {
    pub fn from_record(record: &QuestionRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: record.question.id,
            question_text: record.question.question_text.clone(),
            pub_date: record.question.pub_date,
            was_published_recently: record.question.was_published_recently(now),
        }
    }
}

/// Admin changelist row; same columns as the index feed but covers unpublished questions.
pub type AdminQuestionRow = QuestionSummary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub id: ChoiceId,
    pub choice_text: String,
}

/// Voting form for a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionDetail {
    pub id: QuestionId,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    pub choices: Vec<ChoiceOption>,
}

impl From<&QuestionRecord> for QuestionDetail {
    fn from(record: &QuestionRecord) -> Self {
        Self {
            id: record.question.id,
            question_text: record.question.question_text.clone(),
            pub_date: record.question.pub_date,
            choices: record
                .choices
                .iter()
                .map(|choice| ChoiceOption {
                    id: choice.id,
                    choice_text: choice.choice_text.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceTally {
    pub id: ChoiceId,
    pub choice_text: String,
    pub votes: u32,
}

impl From<&Choice> for ChoiceTally {
    fn from(choice: &Choice) -> Self {
        Self {
            id: choice.id,
            choice_text: choice.choice_text.clone(),
            votes: choice.votes,
        }
    }
}

/// Tallies for a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionResults {
    pub id: QuestionId,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    pub choices: Vec<ChoiceTally>,
    pub total_votes: u64,
}

impl From<&QuestionRecord> for QuestionResults {
    fn from(record: &QuestionRecord) -> Self {
        Self {
            id: record.question.id,
            question_text: record.question.question_text.clone(),
            pub_date: record.question.pub_date,
            choices: record.choices.iter().map(ChoiceTally::from).collect(),
            total_votes: record.total_votes(),
        }
    }
}

/// Logical route names exposed by the poll router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteName {
    Index,
    Detail,
    Results,
    Vote,
}

/// Route name plus question id, reversed into a path by [`RouteTarget::path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteTarget {
    pub route: RouteName,
    pub question_id: QuestionId,
}

impl RouteTarget {
    pub fn results(question_id: QuestionId) -> Self {
        Self {
            route: RouteName::Results,
            question_id,
        }
    }

    pub fn path(&self) -> String {
        let id = self.question_id;
        match self.route {
            RouteName::Index => "/polls/".to_string(),
            RouteName::Detail => format!("/polls/{id}/"),
            RouteName::Results => format!("/polls/{id}/results/"),
            RouteName::Vote => format!("/polls/{id}/vote/"),
        }
    }
}

/// Outcome of a recorded vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteReceipt {
    pub redirect: RouteTarget,
    pub choice: ChoiceTally,
}

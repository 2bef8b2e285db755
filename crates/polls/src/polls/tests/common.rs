use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::polls::domain::{Choice, ChoiceId, NewQuestion, QuestionId, QuestionRecord};
use crate::polls::query::QuestionQuery;
use crate::polls::repository::{PollRepository, RepositoryError};
use crate::polls::{poll_router, FixedClock, InMemoryPollRepository, PollService};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) type MemoryService = PollService<InMemoryPollRepository, FixedClock>;

pub(super) fn build_service() -> (MemoryService, Arc<InMemoryPollRepository>, Arc<FixedClock>) {
    let repository = Arc::new(InMemoryPollRepository::new());
    let clock = Arc::new(FixedClock::new(now()));
    let service = PollService::new(repository.clone(), clock.clone());
    (service, repository, clock)
}

/// Store a question `offset` away from `now()` with the given choices.
pub(super) fn create_question(
    repository: &InMemoryPollRepository,
    text: &str,
    offset: Duration,
    choices: &[&str],
) -> QuestionRecord {
    repository
        .insert_question(NewQuestion {
            question_text: text.to_string(),
            pub_date: now() + offset,
            choices: choices.iter().map(|choice| choice.to_string()).collect(),
        })
        .expect("insert succeeds")
}

pub(super) fn votes_of(repository: &InMemoryPollRepository, id: QuestionId) -> Vec<u32> {
    repository
        .get_question(id)
        .expect("lookup succeeds")
        .expect("question present")
        .choices
        .iter()
        .map(|choice| choice.votes)
        .collect()
}

pub(super) fn router_for(service: MemoryService) -> axum::Router {
    poll_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) struct UnavailableRepository;

impl PollRepository for UnavailableRepository {
    fn get_question(&self, _id: QuestionId) -> Result<Option<QuestionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_questions(
        &self,
        _query: &QuestionQuery,
    ) -> Result<Vec<QuestionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn get_choice(
        &self,
        _question_id: QuestionId,
        _choice_id: ChoiceId,
    ) -> Result<Option<Choice>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn increment_votes(
        &self,
        _question_id: QuestionId,
        _choice_id: ChoiceId,
    ) -> Result<Choice, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_question(&self, _draft: NewQuestion) -> Result<QuestionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_choice(
        &self,
        _question_id: QuestionId,
        _choice_text: String,
    ) -> Result<Choice, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

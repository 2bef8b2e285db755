use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use super::clock::Clock;
use super::domain::{Choice, ChoiceId, NewQuestion, QuestionId, QuestionRecord};
use super::query::{PubDateFilter, QuestionOrder, QuestionQuery, LATEST_QUESTIONS_LIMIT};
use super::repository::{PollRepository, RepositoryError};
use super::views::{
    AdminQuestionRow, ChoiceTally, QuestionDetail, QuestionResults, QuestionSummary, RouteTarget,
    VoteReceipt,
};

/// Message shown when a ballot arrives without a usable choice.
pub const NO_CHOICE_SELECTED: &str = "No choice was selected";

/// Filters accepted by the admin question listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub pub_date: PubDateFilter,
}

/// Service composing the store and the clock into the poll use cases.
pub struct PollService<R, C> {
    repository: Arc<R>,
    clock: Arc<C>,
    listing_limit: usize,
}

impl<R, C> PollService<R, C>
where
    R: PollRepository + 'static,
    C: Clock + 'static,
{
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self::with_listing_limit(repository, clock, LATEST_QUESTIONS_LIMIT)
    }

    pub fn with_listing_limit(repository: Arc<R>, clock: Arc<C>, listing_limit: usize) -> Self {
        Self {
            repository,
            clock,
            listing_limit,
        }
    }

    /// Latest published questions that have at least one choice.
    pub fn list_visible_questions(&self) -> Result<Vec<QuestionSummary>, ServiceError> {
        let now = self.clock.now();
        let query = QuestionQuery::latest_votable(now, self.listing_limit);
        let records = self.repository.list_questions(&query)?;
        debug!(count = records.len(), "listed visible questions");

        Ok(records
            .iter()
            .map(|record| QuestionSummary::from_record(record, now))
            .collect())
    }

    pub fn question_detail(&self, question_id: QuestionId) -> Result<QuestionDetail, ServiceError> {
        let record = self.published_question(question_id)?;
        Ok(QuestionDetail::from(&record))
    }

    pub fn question_results(
        &self,
        question_id: QuestionId,
    ) -> Result<QuestionResults, ServiceError> {
        let record = self.published_question(question_id)?;
        Ok(QuestionResults::from(&record))
    }

    /// Record one vote for `choice_id` under `question_id`.
    pub fn record_vote(
        &self,
        question_id: QuestionId,
        choice_id: Option<ChoiceId>,
    ) -> Result<VoteReceipt, VoteError> {
        let record = match self.published_question(question_id) {
            Ok(record) => record,
            Err(ServiceError::Repository(err)) => return Err(VoteError::Repository(err)),
            Err(_) => return Err(VoteError::NotFound),
        };

        let Some(choice_id) = choice_id.filter(|id| record.choice(*id).is_some()) else {
            debug!(%question_id, ?choice_id, "vote rejected: no valid choice");
            return Err(VoteError::InvalidSelection {
                detail: QuestionDetail::from(&record),
            });
        };

        let choice = match self.repository.increment_votes(question_id, choice_id) {
            Ok(choice) => choice,
            // The choice vanished between the lookup and the increment.
            Err(RepositoryError::NotFound) => {
                return Err(VoteError::InvalidSelection {
                    detail: QuestionDetail::from(&record),
                })
            }
            Err(err) => return Err(VoteError::Repository(err)),
        };
        info!(%question_id, %choice_id, votes = choice.votes, "vote recorded");

        Ok(VoteReceipt {
            redirect: RouteTarget::results(question_id),
            choice: ChoiceTally::from(&choice),
        })
    }

    /// Create a question with its inline choices. Not subject to the publication window.
    pub fn create_question(&self, draft: NewQuestion) -> Result<QuestionRecord, ServiceError> {
        if draft.question_text.trim().is_empty() {
            return Err(ServiceError::Validation(
                "question_text must not be blank".to_string(),
            ));
        }

        let record = self.repository.insert_question(draft)?;
        info!(
            question_id = %record.id(),
            choices = record.choices.len(),
            "question created"
        );
        Ok(record)
    }

    pub fn add_choice(
        &self,
        question_id: QuestionId,
        choice_text: &str,
    ) -> Result<Choice, ServiceError> {
        let choice_text = choice_text.trim();
        if choice_text.is_empty() {
            return Err(ServiceError::Validation(
                "choice_text must not be blank".to_string(),
            ));
        }

        let choice = self
            .repository
            .insert_choice(question_id, choice_text.to_string())
            .map_err(|err| match err {
                RepositoryError::NotFound => ServiceError::NotFound,
                other => ServiceError::Repository(other),
            })?;
        info!(%question_id, choice_id = %choice.id, "choice added");
        Ok(choice)
    }

    /// Every stored question, newest first, narrowed by search term and `pub_date` bucket.
    pub fn admin_questions(
        &self,
        filter: &AdminQuery,
    ) -> Result<Vec<AdminQuestionRow>, ServiceError> {
        let now = self.clock.now();
        let query = QuestionQuery {
            search: filter.search.clone(),
            pub_date_filter: filter.pub_date,
            reference_time: Some(now),
            order: QuestionOrder::RecentlyCreated,
            ..QuestionQuery::default()
        };

        let records = self.repository.list_questions(&query)?;
        Ok(records
            .iter()
            .map(|record| QuestionSummary::from_record(record, now))
            .collect())
    }

    /// Unpublished and missing questions are reported identically.
    fn published_question(&self, question_id: QuestionId) -> Result<QuestionRecord, ServiceError> {
        let now = self.clock.now();
        self.repository
            .get_question(question_id)?
            .filter(|record| record.question.is_published(now))
            .ok_or(ServiceError::NotFound)
    }
}

/// Error raised by the read and admin paths of the poll service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("not found")]
    NotFound,
    #[error("invalid input: {0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Error raised by the vote recorder.
#[derive(Debug, thiserror::Error)]
pub enum VoteError {
    #[error("not found")]
    NotFound,
    #[error("{}", NO_CHOICE_SELECTED)]
    InvalidSelection { detail: QuestionDetail },
    #[error(transparent)]
    Repository(RepositoryError),
}

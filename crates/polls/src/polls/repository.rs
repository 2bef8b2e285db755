use super::domain::{Choice, ChoiceId, NewQuestion, QuestionId, QuestionRecord};
use super::query::QuestionQuery;

/// Storage abstraction so the poll service can be exercised in isolation.
pub trait PollRepository: Send + Sync {
    fn get_question(&self, id: QuestionId) -> Result<Option<QuestionRecord>, RepositoryError>;
    fn list_questions(
        &self,
        query: &QuestionQuery,
    ) -> Result<Vec<QuestionRecord>, RepositoryError>;
    fn get_choice(
        &self,
        question_id: QuestionId,
        choice_id: ChoiceId,
    ) -> Result<Option<Choice>, RepositoryError>;

    /// Add one vote to a choice of the given question as a single read-modify-write.
    ///
    /// Returns the updated choice; fails with [`RepositoryError::NotFound`] when the choice
    /// does not belong to the question and [`RepositoryError::TallyOverflow`] when the
    /// tally cannot grow, leaving it unchanged.
    fn increment_votes(
        &self,
        question_id: QuestionId,
        choice_id: ChoiceId,
    ) -> Result<Choice, RepositoryError>;

    fn insert_question(&self, draft: NewQuestion) -> Result<QuestionRecord, RepositoryError>;
    fn insert_choice(
        &self,
        question_id: QuestionId,
        choice_text: String,
    ) -> Result<Choice, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("vote tally is at its maximum")]
    TallyOverflow,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

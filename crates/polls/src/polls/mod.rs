//! Question listing, voting, and results behind a store-agnostic service.

pub mod clock;
pub mod domain;
pub mod memory;
pub mod query;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{Choice, ChoiceId, NewQuestion, Question, QuestionId, QuestionRecord};
pub use memory::InMemoryPollRepository;
pub use query::{PubDateFilter, QuestionOrder, QuestionQuery, LATEST_QUESTIONS_LIMIT};
pub use repository::{PollRepository, RepositoryError};
pub use router::poll_router;
pub use service::{AdminQuery, PollService, ServiceError, VoteError, NO_CHOICE_SELECTED};
pub use views::{
    AdminQuestionRow, ChoiceOption, ChoiceTally, QuestionDetail, QuestionResults,
    QuestionSummary, RouteName, RouteTarget, VoteReceipt,
};

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::clock::Clock;
use super::domain::{ChoiceId, NewQuestion, QuestionId};
use super::repository::PollRepository;
use super::service::{AdminQuery, PollService, ServiceError, VoteError, NO_CHOICE_SELECTED};

/// Ballot submitted by the voting form. `choice` is missing when nothing was ticked.
#[derive(Debug, Default)]
pub struct VoteForm {
    pub choice: Option<String>,
}

impl VoteForm {
    /// Build a ballot from raw form fields; a repeated `choice` keeps the last value.
    pub fn from_fields(fields: Vec<(String, String)>) -> Self {
        let choice = fields
            .into_iter()
            .filter(|(name, _)| name == "choice")
            .map(|(_, value)| value)
            .last();
        Self { choice }
    }

    fn choice_id(&self) -> Option<ChoiceId> {
        self.choice
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map(ChoiceId)
    }
}

#[derive(Debug, Deserialize)]
pub struct NewChoice {
    pub choice_text: String,
}

/// Router builder exposing the public poll pages and the admin endpoints.
pub fn poll_router<R, C>(service: Arc<PollService<R, C>>) -> Router
where
    R: PollRepository + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/polls/", get(index_handler::<R, C>))
        .route("/polls/:question_id/", get(detail_handler::<R, C>))
        .route("/polls/:question_id/results/", get(results_handler::<R, C>))
        .route("/polls/:question_id/vote/", post(vote_handler::<R, C>))
        .route(
            "/api/v1/admin/questions",
            get(admin_list_handler::<R, C>).post(admin_create_handler::<R, C>),
        )
        .route(
            "/api/v1/admin/questions/:question_id/choices",
            post(admin_add_choice_handler::<R, C>),
        )
        .with_state(service)
}

fn parse_question_id(raw: &str) -> Option<QuestionId> {
    raw.trim().parse::<u64>().ok().map(QuestionId)
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response()
}

fn service_error_response(error: ServiceError) -> Response {
    match error {
        ServiceError::NotFound => not_found(),
        ServiceError::Validation(message) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": message })),
        )
            .into_response(),
        ServiceError::Repository(other) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": other.to_string() })),
        )
            .into_response(),
    }
}

pub(crate) async fn index_handler<R, C>(State(service): State<Arc<PollService<R, C>>>) -> Response
where
    R: PollRepository + 'static,
    C: Clock + 'static,
{
    match service.list_visible_questions() {
        Ok(questions) => (
            StatusCode::OK,
            Json(json!({ "latest_question_list": questions })),
        )
            .into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn detail_handler<R, C>(
    State(service): State<Arc<PollService<R, C>>>,
    Path(question_id): Path<String>,
) -> Response
where
    R: PollRepository + 'static,
    C: Clock + 'static,
{
    let Some(question_id) = parse_question_id(&question_id) else {
        return not_found();
    };

    match service.question_detail(question_id) {
        Ok(detail) => (StatusCode::OK, Json(json!({ "question": detail }))).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn results_handler<R, C>(
    State(service): State<Arc<PollService<R, C>>>,
    Path(question_id): Path<String>,
) -> Response
where
    R: PollRepository + 'static,
    C: Clock + 'static,
{
    let Some(question_id) = parse_question_id(&question_id) else {
        return not_found();
    };

    match service.question_results(question_id) {
        Ok(results) => (StatusCode::OK, Json(json!({ "question": results }))).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn vote_handler<R, C>(
    State(service): State<Arc<PollService<R, C>>>,
    Path(question_id): Path<String>,
    fields: Option<Form<Vec<(String, String)>>>,
) -> Response
where
    R: PollRepository + 'static,
    C: Clock + 'static,
{
    let Some(question_id) = parse_question_id(&question_id) else {
        return not_found();
    };

    // A missing or unreadable body is an empty ballot; the question is still checked first.
    let ballot = fields
        .map(|Form(fields)| VoteForm::from_fields(fields))
        .unwrap_or_default();

    match service.record_vote(question_id, ballot.choice_id()) {
        Ok(receipt) => Redirect::to(&receipt.redirect.path()).into_response(),
        Err(VoteError::InvalidSelection { detail }) => (
            StatusCode::OK,
            Json(json!({
                "question": detail,
                "error_message": NO_CHOICE_SELECTED,
            })),
        )
            .into_response(),
        Err(VoteError::NotFound) => not_found(),
        Err(VoteError::Repository(other)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": other.to_string() })),
        )
            .into_response(),
    }
}

pub(crate) async fn admin_list_handler<R, C>(
    State(service): State<Arc<PollService<R, C>>>,
    Query(filter): Query<AdminQuery>,
) -> Response
where
    R: PollRepository + 'static,
    C: Clock + 'static,
{
    match service.admin_questions(&filter) {
        Ok(rows) => (StatusCode::OK, Json(json!({ "questions": rows }))).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn admin_create_handler<R, C>(
    State(service): State<Arc<PollService<R, C>>>,
    Json(draft): Json<NewQuestion>,
) -> Response
where
    R: PollRepository + 'static,
    C: Clock + 'static,
{
    match service.create_question(draft) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn admin_add_choice_handler<R, C>(
    State(service): State<Arc<PollService<R, C>>>,
    Path(question_id): Path<String>,
    Json(payload): Json<NewChoice>,
) -> Response
where
    R: PollRepository + 'static,
    C: Clock + 'static,
{
    let Some(question_id) = parse_question_id(&question_id) else {
        return not_found();
    };

    match service.add_choice(question_id, &payload.choice_text) {
        Ok(choice) => (StatusCode::CREATED, Json(choice)).into_response(),
        Err(error) => service_error_response(error),
    }
}

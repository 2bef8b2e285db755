use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use axum::Form;
use chrono::Duration;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::polls::router::{vote_handler, VoteForm};
use crate::polls::QuestionId;

fn vote_request(question_id: impl std::fmt::Display, body: &str) -> Request<Body> {
    Request::post(format!("/polls/{question_id}/vote/"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn index_route_lists_latest_questions() {
    let (service, repository, _) = build_service();
    create_question(&repository, "Past", Duration::days(-1), &["a"]);
    create_question(&repository, "Empty", Duration::days(-1), &[]);
    let router = router_for(service);

    let response = router
        .oneshot(Request::get("/polls/").body(Body::empty()).expect("request builds"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let list = payload
        .get("latest_question_list")
        .and_then(serde_json::Value::as_array)
        .expect("list present");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].get("question_text"), Some(&json!("Past")));
}

#[tokio::test]
async fn detail_route_returns_404_for_future_question() {
    let (service, repository, _) = build_service();
    let future = create_question(&repository, "Future", Duration::days(30), &["a"]);
    let router = router_for(service);

    let response = router
        .oneshot(
            Request::get(format!("/polls/{}/", future.id()))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn detail_route_returns_404_for_non_numeric_id() {
    let (service, _, _) = build_service();
    let router = router_for(service);

    let response = router
        .oneshot(Request::get("/polls/abc/").body(Body::empty()).expect("request builds"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn results_route_renders_tallies() {
    let (service, repository, _) = build_service();
    let record = create_question(&repository, "Past", Duration::days(-3), &["a", "b"]);
    service
        .record_vote(record.id(), Some(record.choices[1].id))
        .expect("vote recorded");
    let router = router_for(service);

    let response = router
        .oneshot(
            Request::get(format!("/polls/{}/results/", record.id()))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["question"]["total_votes"], json!(1));
    assert_eq!(payload["question"]["choices"][1]["votes"], json!(1));
}

#[tokio::test]
async fn vote_route_redirects_to_results() {
    let (service, repository, _) = build_service();
    let record = create_question(&repository, "Past", Duration::days(-3), &["a", "b"]);
    let router = router_for(service);

    let body = format!("choice={}", record.choices[0].id);
    let response = router
        .oneshot(vote_request(record.id(), &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("location header");
    assert_eq!(location, format!("/polls/{}/results/", record.id()));
    assert_eq!(votes_of(&repository, record.id()), vec![1, 0]);
}

#[tokio::test]
async fn vote_route_rerenders_detail_without_choice() {
    let (service, repository, _) = build_service();
    let record = create_question(&repository, "Past", Duration::days(-3), &["a", "b"]);
    let router = router_for(service);

    let response = router
        .oneshot(vote_request(record.id(), ""))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error_message"], json!("No choice was selected"));
    assert_eq!(payload["question"]["id"], json!(record.id().0));
    assert_eq!(votes_of(&repository, record.id()), vec![0, 0]);
}

#[tokio::test]
async fn vote_handler_treats_garbage_choice_as_invalid_selection() {
    let (service, repository, _) = build_service();
    let record = create_question(&repository, "Past", Duration::days(-3), &["a"]);

    let response = vote_handler(
        State(Arc::new(service)),
        Path(record.id().to_string()),
        Some(Form(vec![(
            "choice".to_string(),
            "not-a-number".to_string(),
        )])),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(votes_of(&repository, record.id()), vec![0]);
}

#[tokio::test]
async fn vote_route_returns_404_for_future_question() {
    let (service, repository, _) = build_service();
    let record = create_question(&repository, "Future", Duration::days(30), &["a"]);
    let router = router_for(service);

    let body = format!("choice={}", record.choices[0].id);
    let response = router
        .oneshot(vote_request(record.id(), &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(votes_of(&repository, record.id()), vec![0]);
}

#[tokio::test]
async fn admin_routes_create_questions_and_choices() {
    let (service, repository, _) = build_service();
    let router = router_for(service);

    let payload = json!({
        "question_text": "Best framework?",
        "pub_date": "2024-05-19T09:30:00Z",
        "choices": ["axum", "", ""],
    });
    let response = router
        .clone()
        .oneshot(
            Request::post("/api/v1/admin/questions")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&payload).expect("payload serializes"),
                ))
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json_body(response).await;
    let question_id = created["question"]["id"].as_u64().expect("id present");
    assert_eq!(created["choices"].as_array().map(Vec::len), Some(1));

    let response = router
        .clone()
        .oneshot(
            Request::post(format!("/api/v1/admin/questions/{question_id}/choices"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"choice_text":"tide"}"#))
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        votes_of(&repository, crate::polls::QuestionId(question_id)),
        vec![0, 0]
    );

    let response = router
        .oneshot(
            Request::get("/api/v1/admin/questions?search=FRAME&pub_date=past_7_days")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let listing = read_json_body(response).await;
    assert_eq!(listing["questions"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn admin_create_rejects_blank_question() {
    let (service, _, _) = build_service();
    let router = router_for(service);

    let response = router
        .oneshot(
            Request::post("/api/v1/admin/questions")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"question_text":" ","pub_date":"2024-05-19T09:30:00Z"}"#,
                ))
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn vote_route_without_body_rerenders_detail() {
    let (service, repository, _) = build_service();
    let record = create_question(&repository, "Past", Duration::days(-3), &["a", "b"]);
    let router = router_for(service);

    let response = router
        .oneshot(
            Request::post(format!("/polls/{}/vote/", record.id()))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error_message"], json!("No choice was selected"));
    assert_eq!(votes_of(&repository, record.id()), vec![0, 0]);
}

#[tokio::test]
async fn vote_route_without_body_on_missing_question_is_404() {
    let (service, repository, _) = build_service();
    let future = create_question(&repository, "Future", Duration::days(30), &["a"]);
    let router = router_for(service);

    for question_id in [QuestionId(999), future.id()] {
        let response = router
            .clone()
            .oneshot(
                Request::post(format!("/polls/{question_id}/vote/"))
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn vote_route_uses_last_repeated_choice() {
    let (service, repository, _) = build_service();
    let record = create_question(&repository, "Past", Duration::days(-3), &["a", "b"]);
    let router = router_for(service);

    let body = format!(
        "choice={}&choice={}",
        record.choices[0].id, record.choices[1].id
    );
    let response = router
        .oneshot(vote_request(record.id(), &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(votes_of(&repository, record.id()), vec![0, 1]);
}

#[test]
fn vote_form_ignores_unrelated_fields() {
    let ballot = VoteForm::from_fields(vec![
        ("csrf".to_string(), "token".to_string()),
        ("choice".to_string(), " 4 ".to_string()),
    ]);
    assert_eq!(ballot.choice.as_deref(), Some(" 4 "));
    assert!(VoteForm::from_fields(Vec::new()).choice.is_none());
}

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::admissions::domain::{AdmissionOutcome, Principal};
use crate::workflows::admissions::router::admissions_router;

fn build_router() -> (Router, Arc<TestService>) {
    let (service, _, _) = build_service();
    (admissions_router(service.clone()), service)
}

fn post_json(uri: &str, actor: &Principal, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-user-id", actor.user_id.0.clone())
        .header("x-user-role", actor.role.label())
        .body(Body::from(
            serde_json::to_vec(payload).expect("serialize payload"),
        ))
        .expect("request")
}

fn post_empty(uri: &str, actor: &Principal) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-user-id", actor.user_id.0.clone())
        .header("x-user-role", actor.role.label())
        .body(Body::empty())
        .expect("request")
}

async fn read_json_body(response: Response) -> Value {
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&body).expect("json")
}

#[tokio::test]
async fn missing_principal_is_unauthorized() {
    let (router, _) = build_router();

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/slots")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({
                        "start": at(2, 10),
                        "end": at(2, 11),
                    }))
                    .expect("serialize payload"),
                ))
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json_body(response).await;
    assert!(payload.get("error").is_some());
}

#[tokio::test]
async fn unknown_role_header_is_unauthorized() {
    let (router, _) = build_router();

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/reservations/rsv-000001/confirm")
                .header("x-user-id", "interviewer-1")
                .header("x-user-role", "wizard")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_slot_route_returns_created_slot() {
    let (router, _) = build_router();

    let response = router
        .oneshot(post_json(
            "/api/v1/slots",
            &interviewer(),
            &json!({ "start": at(2, 10), "end": at(2, 11) }),
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert!(payload.get("id").is_some());
    assert_eq!(payload.get("interviewer_id"), Some(&json!("interviewer-1")));
}

#[tokio::test]
async fn create_slot_route_rejects_candidates() {
    let (router, _) = build_router();

    let response = router
        .oneshot(post_json(
            "/api/v1/slots",
            &candidate(),
            &json!({ "start": at(2, 10), "end": at(2, 11) }),
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn available_slots_route_lists_open_slots() {
    let (router, service) = build_router();
    // The route filters against the wall clock, so the slot has to sit in
    // the real future.
    let start = chrono::Utc::now() + chrono::Duration::days(7);
    service
        .slots()
        .create_slot(&interviewer(), start, start + chrono::Duration::hours(1))
        .expect("slot publishes");

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/slots/available")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let slots = payload.as_array().expect("array payload");
    assert_eq!(slots.len(), 1);
}

#[tokio::test]
async fn booking_route_returns_conflict_for_taken_slot() {
    let (router, service) = build_router();
    let slot = service
        .slots()
        .create_slot(&interviewer(), at(2, 10), at(2, 11))
        .expect("slot publishes");
    service
        .booking()
        .book_slot(&candidate(), &slot.id)
        .expect("first booking succeeds");

    let response = router
        .oneshot(post_json(
            "/api/v1/reservations",
            &second_candidate(),
            &json!({ "slot_id": slot.id.0 }),
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .is_some_and(|message| message.contains("pick another slot")));
}

#[tokio::test]
async fn booking_route_creates_pending_reservation() {
    let (router, service) = build_router();
    let slot = service
        .slots()
        .create_slot(&interviewer(), at(2, 10), at(2, 11))
        .expect("slot publishes");

    let response = router
        .oneshot(post_json(
            "/api/v1/reservations",
            &candidate(),
            &json!({ "slot_id": slot.id.0 }),
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload.get("stage").and_then(|stage| stage.get("stage")),
        Some(&json!("pending")),
    );
}

#[tokio::test]
async fn confirm_route_rejects_invalid_transition() {
    let (router, service) = build_router();
    let slot = service
        .slots()
        .create_slot(&interviewer(), at(2, 10), at(2, 11))
        .expect("slot publishes");
    let reservation = service
        .booking()
        .book_slot(&candidate(), &slot.id)
        .expect("booking succeeds");
    service
        .booking()
        .cancel(&candidate(), &reservation.id)
        .expect("cancellation succeeds");

    let response = router
        .oneshot(post_empty(
            &format!("/api/v1/reservations/{}/confirm", reservation.id.0),
            &interviewer(),
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn evaluation_route_rejects_out_of_range_scores() {
    let (router, service) = build_router();
    let (_slot, reservation) = completed_reservation(&service, AdmissionOutcome::Accept);

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/reservations/{}/evaluation", reservation.id.0),
            &interviewer(),
            &json!({
                "scores": {
                    "technical": 11,
                    "communication": 6,
                    "problem_solving": 7,
                    "culture_add": 9,
                },
            }),
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn decision_route_finalizes_evaluation() {
    let (router, service) = build_router();
    let (_slot, reservation) = completed_reservation(&service, AdmissionOutcome::Accept);
    let evaluation = service
        .evaluations()
        .submit(&interviewer(), &reservation.id, scores(8, 6, 7, 9), None)
        .expect("submission succeeds");

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/evaluations/{}/decision", evaluation.id.0),
            &admin(),
            &json!({ "outcome": "accept" }),
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("status"), Some(&json!("accepted")));
}

#[tokio::test]
async fn unknown_reservation_is_not_found() {
    let (router, _) = build_router();

    let response = router
        .oneshot(post_empty(
            "/api/v1/reservations/rsv-999999/cancel",
            &candidate(),
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn request_routes_drive_the_admin_pairing_path() {
    let (router, _service) = build_router();

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/interview-requests",
            &admin(),
            &json!({
                "candidate_id": "candidate-1",
                "interviewer_id": "interviewer-1",
            }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    let request_id = payload
        .get("id")
        .and_then(Value::as_str)
        .expect("request id")
        .to_string();

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/interview-requests/{request_id}/accept"),
            &interviewer(),
            &json!({
                "scheduled_at": at(3, 9),
                "meeting_link": "https://meet.example.net/pairing",
                "duration_minutes": 45,
            }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("status"), Some(&json!("accepted")));
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    AdmissionOutcome, EvaluationId, InterviewScores, Principal, RequestId, ReservationId, Role,
    SlotId, UserId,
};
use super::error::AdmissionsError;
use super::repository::{AdmissionsRepository, MeetingLinkProvider, NotificationDispatcher};
use super::service::AdmissionsService;

/// Router builder exposing the admissions operations. The session layer in
/// front of this service authenticates callers and forwards the principal
/// in `x-user-id`/`x-user-role` headers; every handler re-checks role and
/// ownership through the engines.
pub fn admissions_router<R, N, M>(service: Arc<AdmissionsService<R, N, M>>) -> Router
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
    M: MeetingLinkProvider + 'static,
{
    Router::new()
        .route("/api/v1/slots", post(create_slot_handler::<R, N, M>))
        .route(
            "/api/v1/slots/available",
            get(available_slots_handler::<R, N, M>),
        )
        .route(
            "/api/v1/slots/:slot_id",
            delete(delete_slot_handler::<R, N, M>),
        )
        .route("/api/v1/reservations", post(book_slot_handler::<R, N, M>))
        .route(
            "/api/v1/reservations/:reservation_id/confirm",
            post(confirm_handler::<R, N, M>),
        )
        .route(
            "/api/v1/reservations/:reservation_id/cancel",
            post(cancel_handler::<R, N, M>),
        )
        .route(
            "/api/v1/reservations/:reservation_id/complete",
            post(complete_handler::<R, N, M>),
        )
        .route(
            "/api/v1/reservations/:reservation_id/acknowledge",
            post(acknowledge_handler::<R, N, M>),
        )
        .route(
            "/api/v1/reservations/:reservation_id/evaluation",
            post(submit_evaluation_handler::<R, N, M>),
        )
        .route(
            "/api/v1/interview-requests",
            post(create_request_handler::<R, N, M>),
        )
        .route(
            "/api/v1/interview-requests/:request_id/accept",
            post(accept_request_handler::<R, N, M>),
        )
        .route(
            "/api/v1/interview-requests/:request_id/reject",
            post(reject_request_handler::<R, N, M>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/decision",
            post(decide_handler::<R, N, M>),
        )
        .with_state(service)
}

fn principal_from_headers(headers: &HeaderMap) -> Result<Principal, Response> {
    let unauthorized = |detail: &str| {
        let payload = json!({ "error": detail });
        (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
    };

    let user_id = headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| unauthorized("missing x-user-id header"))?;
    let role = headers
        .get("x-user-role")
        .and_then(|value| value.to_str().ok())
        .and_then(Role::parse)
        .ok_or_else(|| unauthorized("missing or unknown x-user-role header"))?;

    Ok(Principal {
        user_id: UserId(user_id.to_string()),
        role,
    })
}

fn error_response(error: &AdmissionsError) -> Response {
    let status = match error {
        AdmissionsError::NotFound(_) => StatusCode::NOT_FOUND,
        AdmissionsError::Unauthorized(_) => StatusCode::FORBIDDEN,
        AdmissionsError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AdmissionsError::Conflict(_) => StatusCode::CONFLICT,
        AdmissionsError::Validation(_) => StatusCode::BAD_REQUEST,
        AdmissionsError::MeetingLink(_) => StatusCode::BAD_GATEWAY,
        AdmissionsError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(status: StatusCode, value: &T) -> Response {
    (status, axum::Json(value)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateSlotRequest {
    pub(crate) start: DateTime<Utc>,
    pub(crate) end: DateTime<Utc>,
}

pub(crate) async fn create_slot_handler<R, N, M>(
    State(service): State<Arc<AdmissionsService<R, N, M>>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<CreateSlotRequest>,
) -> Response
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
    M: MeetingLinkProvider + 'static,
{
    let actor = match principal_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match service.slots().create_slot(&actor, body.start, body.end) {
        Ok(slot) => respond(StatusCode::CREATED, &slot),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn available_slots_handler<R, N, M>(
    State(service): State<Arc<AdmissionsService<R, N, M>>>,
) -> Response
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
    M: MeetingLinkProvider + 'static,
{
    match service.slots().list_available(Utc::now()) {
        Ok(slots) => respond(StatusCode::OK, &slots),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn delete_slot_handler<R, N, M>(
    State(service): State<Arc<AdmissionsService<R, N, M>>>,
    headers: HeaderMap,
    Path(slot_id): Path<String>,
) -> Response
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
    M: MeetingLinkProvider + 'static,
{
    let actor = match principal_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match service.slots().delete_slot(&actor, &SlotId(slot_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(&error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BookSlotRequest {
    pub(crate) slot_id: String,
}

pub(crate) async fn book_slot_handler<R, N, M>(
    State(service): State<Arc<AdmissionsService<R, N, M>>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<BookSlotRequest>,
) -> Response
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
    M: MeetingLinkProvider + 'static,
{
    let actor = match principal_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match service
        .booking()
        .book_slot(&actor, &SlotId(body.slot_id))
    {
        Ok(reservation) => respond(StatusCode::CREATED, &reservation),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn confirm_handler<R, N, M>(
    State(service): State<Arc<AdmissionsService<R, N, M>>>,
    headers: HeaderMap,
    Path(reservation_id): Path<String>,
) -> Response
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
    M: MeetingLinkProvider + 'static,
{
    let actor = match principal_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match service
        .booking()
        .confirm(&actor, &ReservationId(reservation_id))
    {
        Ok(reservation) => respond(StatusCode::OK, &reservation),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn cancel_handler<R, N, M>(
    State(service): State<Arc<AdmissionsService<R, N, M>>>,
    headers: HeaderMap,
    Path(reservation_id): Path<String>,
) -> Response
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
    M: MeetingLinkProvider + 'static,
{
    let actor = match principal_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match service
        .booking()
        .cancel(&actor, &ReservationId(reservation_id))
    {
        Ok(reservation) => respond(StatusCode::OK, &reservation),
        Err(error) => error_response(&error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompleteRequest {
    pub(crate) result: AdmissionOutcome,
}

pub(crate) async fn complete_handler<R, N, M>(
    State(service): State<Arc<AdmissionsService<R, N, M>>>,
    headers: HeaderMap,
    Path(reservation_id): Path<String>,
    axum::Json(body): axum::Json<CompleteRequest>,
) -> Response
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
    M: MeetingLinkProvider + 'static,
{
    let actor = match principal_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match service
        .booking()
        .complete(&actor, &ReservationId(reservation_id), body.result)
    {
        Ok(reservation) => respond(StatusCode::OK, &reservation),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn acknowledge_handler<R, N, M>(
    State(service): State<Arc<AdmissionsService<R, N, M>>>,
    headers: HeaderMap,
    Path(reservation_id): Path<String>,
) -> Response
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
    M: MeetingLinkProvider + 'static,
{
    let actor = match principal_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match service
        .booking()
        .acknowledge(&actor, &ReservationId(reservation_id))
    {
        Ok(reservation) => respond(StatusCode::OK, &reservation),
        Err(error) => error_response(&error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitEvaluationRequest {
    pub(crate) scores: InterviewScores,
    #[serde(default)]
    pub(crate) observation: Option<String>,
}

pub(crate) async fn submit_evaluation_handler<R, N, M>(
    State(service): State<Arc<AdmissionsService<R, N, M>>>,
    headers: HeaderMap,
    Path(reservation_id): Path<String>,
    axum::Json(body): axum::Json<SubmitEvaluationRequest>,
) -> Response
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
    M: MeetingLinkProvider + 'static,
{
    let actor = match principal_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match service.evaluations().submit(
        &actor,
        &ReservationId(reservation_id),
        body.scores,
        body.observation,
    ) {
        Ok(evaluation) => respond(StatusCode::CREATED, &evaluation),
        Err(error) => error_response(&error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateRequestBody {
    pub(crate) candidate_id: String,
    pub(crate) interviewer_id: String,
}

pub(crate) async fn create_request_handler<R, N, M>(
    State(service): State<Arc<AdmissionsService<R, N, M>>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<CreateRequestBody>,
) -> Response
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
    M: MeetingLinkProvider + 'static,
{
    let actor = match principal_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match service.requests().create_request(
        &actor,
        &UserId(body.candidate_id),
        &UserId(body.interviewer_id),
    ) {
        Ok(request) => respond(StatusCode::CREATED, &request),
        Err(error) => error_response(&error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AcceptRequestBody {
    pub(crate) scheduled_at: DateTime<Utc>,
    pub(crate) meeting_link: String,
    #[serde(default)]
    pub(crate) duration_minutes: Option<i64>,
}

pub(crate) async fn accept_request_handler<R, N, M>(
    State(service): State<Arc<AdmissionsService<R, N, M>>>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
    axum::Json(body): axum::Json<AcceptRequestBody>,
) -> Response
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
    M: MeetingLinkProvider + 'static,
{
    let actor = match principal_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match service.requests().accept_request(
        &actor,
        &RequestId(request_id),
        body.scheduled_at,
        body.meeting_link,
        body.duration_minutes.map(Duration::minutes),
    ) {
        Ok(request) => respond(StatusCode::OK, &request),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn reject_request_handler<R, N, M>(
    State(service): State<Arc<AdmissionsService<R, N, M>>>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
) -> Response
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
    M: MeetingLinkProvider + 'static,
{
    let actor = match principal_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match service
        .requests()
        .reject_request(&actor, &RequestId(request_id))
    {
        Ok(request) => respond(StatusCode::OK, &request),
        Err(error) => error_response(&error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecideRequest {
    pub(crate) outcome: AdmissionOutcome,
}

pub(crate) async fn decide_handler<R, N, M>(
    State(service): State<Arc<AdmissionsService<R, N, M>>>,
    headers: HeaderMap,
    Path(evaluation_id): Path<String>,
    axum::Json(body): axum::Json<DecideRequest>,
) -> Response
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
    M: MeetingLinkProvider + 'static,
{
    let actor = match principal_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match service
        .decisions()
        .decide(&actor, &EvaluationId(evaluation_id), body.outcome)
    {
        Ok(evaluation) => respond(StatusCode::OK, &evaluation),
        Err(error) => error_response(&error),
    }
}

//! Interview scheduling and admission-decision workflow.
//!
//! Five engines share one repository: the slot registry publishes
//! interviewer availability, the booking engine drives the reservation
//! state machine, the request workflow is the admin-mediated pairing path,
//! the evaluation desk records scored assessments, and the decision engine
//! is the single authority allowed to mutate a candidate's role.

pub mod booking;
pub mod decision;
pub mod domain;
pub mod error;
pub(crate) mod evaluation;
pub mod repository;
pub mod requests;
pub mod router;
pub mod service;
pub mod slots;

#[cfg(test)]
mod tests;

pub use booking::BookingEngine;
pub use decision::DecisionEngine;
pub use domain::{
    AdmissionOutcome, Evaluation, EvaluationId, EvaluationStatus, InterviewRequest,
    InterviewScores, Notification, NotificationKind, Principal, RequestId, RequestStatus,
    Reservation, ReservationId, ReservationStage, Role, ScoreComponent, ScoreFactor, Scorecard,
    Slot, SlotId, User, UserId,
};
pub use error::AdmissionsError;
pub use evaluation::{EvaluationDesk, ScoreWeights};
pub use repository::{
    AdmissionsRepository, DispatchError, Mailer, MeetingLinkError, MeetingLinkProvider, Notice,
    NotificationDispatcher, RepositoryError,
};
pub use requests::InterviewRequestWorkflow;
pub use router::admissions_router;
pub use service::{AdmissionsConfig, AdmissionsService};
pub use slots::SlotRegistry;

/// Fan out a notification without letting transport failures reach the
/// caller; the triggering state change is already committed.
pub(crate) fn notify_best_effort<N>(dispatcher: &N, notice: Notice)
where
    N: NotificationDispatcher + ?Sized,
{
    if let Err(err) = dispatcher.notify(notice) {
        tracing::warn!(error = %err, "notification dispatch failed");
    }
}

use chrono::{DateTime, Utc};

use super::domain::{
    Evaluation, EvaluationId, InterviewRequest, NotificationKind, RequestId, Reservation,
    ReservationId, ReservationStage, Role, Slot, SlotId, User, UserId,
};

/// Storage abstraction for the admissions workflow. Implementations must
/// honor two uniqueness rules: at most one non-cancelled reservation per
/// slot, and at most one evaluation per reservation. The three `commit_*`
/// style operations (`insert_reservation`, `commit_request_acceptance`,
/// `commit_decision`) are the transaction boundaries; everything they write
/// lands together or not at all.
pub trait AdmissionsRepository: Send + Sync {
    // directory
    fn upsert_user(&self, user: User) -> Result<(), RepositoryError>;
    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    fn users_with_role(&self, role: Role) -> Result<Vec<User>, RepositoryError>;

    // slots
    fn insert_slot(&self, slot: Slot) -> Result<Slot, RepositoryError>;
    fn fetch_slot(&self, id: &SlotId) -> Result<Option<Slot>, RepositoryError>;
    fn delete_slot(&self, id: &SlotId) -> Result<(), RepositoryError>;
    fn slots(&self) -> Result<Vec<Slot>, RepositoryError>;

    // reservations
    /// Atomic conditional insert: fails with [`RepositoryError::Conflict`]
    /// when the slot already has a non-cancelled reservation. This is the
    /// serialization point for racing bookers; no partial state on failure.
    fn insert_reservation(&self, reservation: Reservation)
        -> Result<Reservation, RepositoryError>;
    fn fetch_reservation(&self, id: &ReservationId)
        -> Result<Option<Reservation>, RepositoryError>;
    /// Compare-and-swap stage transition: writes `reservation` only while
    /// the stored row's stage still equals `expected`, failing with
    /// [`RepositoryError::Conflict`] otherwise. Engines release the store
    /// lock around provider calls, so this is what keeps a transition
    /// committed in that window from being overwritten.
    fn transition_reservation(
        &self,
        reservation: Reservation,
        expected: &ReservationStage,
    ) -> Result<(), RepositoryError>;
    fn reservations_for_slot(&self, slot_id: &SlotId) -> Result<Vec<Reservation>, RepositoryError>;
    fn active_reservation_for_slot(
        &self,
        slot_id: &SlotId,
    ) -> Result<Option<Reservation>, RepositoryError>;

    // interview requests
    fn insert_request(&self, request: InterviewRequest) -> Result<(), RepositoryError>;
    fn fetch_request(&self, id: &RequestId) -> Result<Option<InterviewRequest>, RepositoryError>;
    fn update_request(&self, request: InterviewRequest) -> Result<(), RepositoryError>;
    /// One commit for an accepted pairing: the synthesized slot, its
    /// confirmed reservation, and the request flip to accepted.
    fn commit_request_acceptance(
        &self,
        request: InterviewRequest,
        slot: Slot,
        reservation: Reservation,
    ) -> Result<(), RepositoryError>;

    // evaluations
    /// Fails with [`RepositoryError::Conflict`] when the reservation
    /// already has an evaluation.
    fn insert_evaluation(&self, evaluation: Evaluation) -> Result<Evaluation, RepositoryError>;
    fn fetch_evaluation(&self, id: &EvaluationId) -> Result<Option<Evaluation>, RepositoryError>;
    fn evaluation_for_reservation(
        &self,
        reservation_id: &ReservationId,
    ) -> Result<Option<Evaluation>, RepositoryError>;
    /// Fails with [`RepositoryError::Conflict`] when the stored row is no
    /// longer pending; only undecided evaluations accept new scorecards.
    fn update_evaluation(&self, evaluation: Evaluation) -> Result<(), RepositoryError>;
    /// One commit for a finalized decision: the evaluation status change
    /// plus the optional role promotion. A recorded decision must never
    /// exist without its role change. Fails with
    /// [`RepositoryError::Conflict`] when the stored evaluation was already
    /// finalized, so racing deciders commit at most once.
    fn commit_decision(
        &self,
        evaluation: Evaluation,
        promotion: Option<(UserId, Role)>,
    ) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Notification payload handed to the dispatcher after a state change has
/// been committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub targets: Vec<UserId>,
    pub kind: NotificationKind,
    pub message: String,
    pub link: Option<String>,
}

/// Outbound fan-out boundary (in-app rows plus whatever transports the
/// implementation composes). Invoked only after the triggering state change
/// is durable; failures are caught at the call site, logged, and never roll
/// back or block the caller. No ordering across targets.
pub trait NotificationDispatcher: Send + Sync {
    fn notify(&self, notice: Notice) -> Result<(), DispatchError>;
}

/// Best-effort mail transport consumed by dispatcher implementations.
pub trait Mailer: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DispatchError>;
}

/// Dispatch transport error.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Calendar/video collaborator that mints a meeting URL for a confirmed
/// interview. Failures propagate as errors; the workflow never substitutes
/// a placeholder link.
pub trait MeetingLinkProvider: Send + Sync {
    fn create(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        attendees: &[UserId],
    ) -> Result<String, MeetingLinkError>;
}

/// Meeting-link provisioning error.
#[derive(Debug, thiserror::Error)]
pub enum MeetingLinkError {
    #[error("meeting link provider unavailable: {0}")]
    Unavailable(String),
}

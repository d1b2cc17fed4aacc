use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::booking::next_reservation_id;
use super::domain::{
    InterviewRequest, NotificationKind, Principal, RequestId, RequestStatus, Reservation,
    ReservationStage, Role, Slot, SlotId, UserId,
};
use super::error::AdmissionsError;
use super::notify_best_effort;
use super::repository::{AdmissionsRepository, Notice, NotificationDispatcher};

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static REQUEST_SLOT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> RequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RequestId(format!("req-{id:06}"))
}

fn next_synthesized_slot_id() -> SlotId {
    let id = REQUEST_SLOT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SlotId(format!("slot-req-{id:06}"))
}

/// Admin-mediated alternate booking path: an admin pairs a candidate with
/// an interviewer, and the interviewer's acceptance synthesizes the slot
/// and confirmed reservation the self-service path would have produced.
pub struct InterviewRequestWorkflow<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    default_duration: Duration,
}

impl<R, N> InterviewRequestWorkflow<R, N>
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, default_duration: Duration) -> Self {
        Self {
            repository,
            notifier,
            default_duration,
        }
    }

    /// Create a pending pairing after validating both referenced users'
    /// roles. Notifies the interviewer, the candidate, and the other
    /// admins.
    pub fn create_request(
        &self,
        actor: &Principal,
        candidate_id: &UserId,
        interviewer_id: &UserId,
    ) -> Result<InterviewRequest, AdmissionsError> {
        if actor.role != Role::Admin {
            return Err(AdmissionsError::Unauthorized("create interview requests"));
        }
        self.require_role(candidate_id, Role::Candidate, "candidate")?;
        self.require_role(interviewer_id, Role::Interviewer, "interviewer")?;

        let request = InterviewRequest {
            id: next_request_id(),
            admin_id: actor.user_id.clone(),
            candidate_id: candidate_id.clone(),
            interviewer_id: interviewer_id.clone(),
            status: RequestStatus::Pending,
            scheduled_at: None,
            meeting_link: None,
        };
        self.repository.insert_request(request.clone())?;

        let mut targets = vec![interviewer_id.clone(), candidate_id.clone()];
        for admin in self.repository.users_with_role(Role::Admin)? {
            if admin.id != actor.user_id {
                targets.push(admin.id);
            }
        }
        notify_best_effort(
            self.notifier.as_ref(),
            Notice {
                targets,
                kind: NotificationKind::InterviewRequested,
                message: "An interview pairing was requested".to_string(),
                link: Some(format!("/interview-requests/{}", request.id.0)),
            },
        );
        Ok(request)
    }

    /// Accept a pending request the actor owns. Synthesizes one slot
    /// covering `[scheduled_at, scheduled_at + duration)` and one confirmed
    /// reservation carrying the supplied meeting link, and flips the
    /// request to accepted, all in a single repository commit. The
    /// duration falls back to the configured default when not supplied.
    pub fn accept_request(
        &self,
        actor: &Principal,
        request_id: &RequestId,
        scheduled_at: DateTime<Utc>,
        meeting_link: String,
        duration: Option<Duration>,
    ) -> Result<InterviewRequest, AdmissionsError> {
        let mut request = self.owned_pending_request(
            actor,
            request_id,
            "accept another interviewer's request",
        )?;

        if meeting_link.trim().is_empty() {
            return Err(AdmissionsError::Validation(
                "meeting link must not be empty".to_string(),
            ));
        }
        let duration = duration.unwrap_or(self.default_duration);
        if duration <= Duration::zero() {
            return Err(AdmissionsError::Validation(
                "interview duration must be positive".to_string(),
            ));
        }

        let slot = Slot {
            id: next_synthesized_slot_id(),
            interviewer_id: request.interviewer_id.clone(),
            start: scheduled_at,
            end: scheduled_at + duration,
        };
        let reservation = Reservation {
            id: next_reservation_id(),
            slot_id: slot.id.clone(),
            candidate_id: request.candidate_id.clone(),
            stage: ReservationStage::Confirmed {
                meeting_link: meeting_link.clone(),
            },
        };
        request.status = RequestStatus::Accepted;
        request.scheduled_at = Some(scheduled_at);
        request.meeting_link = Some(meeting_link);

        self.repository
            .commit_request_acceptance(request.clone(), slot, reservation)?;

        notify_best_effort(
            self.notifier.as_ref(),
            Notice {
                targets: vec![request.candidate_id.clone()],
                kind: NotificationKind::RequestAccepted,
                message: "Your interview was scheduled".to_string(),
                link: request.meeting_link.clone(),
            },
        );
        Ok(request)
    }

    /// Symmetric rejection of a pending request; notifies the candidate and
    /// the admins.
    pub fn reject_request(
        &self,
        actor: &Principal,
        request_id: &RequestId,
    ) -> Result<InterviewRequest, AdmissionsError> {
        let mut request = self.owned_pending_request(
            actor,
            request_id,
            "reject another interviewer's request",
        )?;

        request.status = RequestStatus::Rejected;
        self.repository.update_request(request.clone())?;

        let mut targets = vec![request.candidate_id.clone()];
        for admin in self.repository.users_with_role(Role::Admin)? {
            targets.push(admin.id);
        }
        notify_best_effort(
            self.notifier.as_ref(),
            Notice {
                targets,
                kind: NotificationKind::RequestRejected,
                message: "The interview pairing was declined".to_string(),
                link: Some(format!("/interview-requests/{}", request.id.0)),
            },
        );
        Ok(request)
    }

    fn owned_pending_request(
        &self,
        actor: &Principal,
        request_id: &RequestId,
        action: &'static str,
    ) -> Result<InterviewRequest, AdmissionsError> {
        let request = self
            .repository
            .fetch_request(request_id)?
            .ok_or(AdmissionsError::NotFound("interview request"))?;
        if request.interviewer_id != actor.user_id {
            return Err(AdmissionsError::Unauthorized(action));
        }
        if request.status != RequestStatus::Pending {
            return Err(AdmissionsError::InvalidState(format!(
                "request is already {}",
                request.status.label()
            )));
        }
        Ok(request)
    }

    fn require_role(
        &self,
        user_id: &UserId,
        role: Role,
        entity: &'static str,
    ) -> Result<(), AdmissionsError> {
        let user = self
            .repository
            .fetch_user(user_id)?
            .ok_or(AdmissionsError::NotFound(entity))?;
        if user.role != role {
            return Err(AdmissionsError::Validation(format!(
                "{} must have the {} role, found {}",
                entity,
                role.label(),
                user.role.label()
            )));
        }
        Ok(())
    }
}

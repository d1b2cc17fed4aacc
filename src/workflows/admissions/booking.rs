use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::decision::DecisionEngine;
use super::domain::{
    AdmissionOutcome, NotificationKind, Principal, Reservation, ReservationId, ReservationStage,
    Role, Slot, SlotId,
};
use super::error::AdmissionsError;
use super::notify_best_effort;
use super::repository::{
    AdmissionsRepository, MeetingLinkProvider, Notice, NotificationDispatcher, RepositoryError,
};

static RESERVATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_reservation_id() -> ReservationId {
    let id = RESERVATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReservationId(format!("rsv-{id:06}"))
}

/// Drives the reservation state machine: booking, confirmation with a
/// provisioned meeting link, cancellation, completion with a result, and
/// the candidate's acknowledgement that hands off to the decision engine.
pub struct BookingEngine<R, N, M> {
    repository: Arc<R>,
    notifier: Arc<N>,
    meetings: Arc<M>,
    decisions: Arc<DecisionEngine<R, N>>,
}

impl<R, N, M> BookingEngine<R, N, M>
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
    M: MeetingLinkProvider + 'static,
{
    pub fn new(
        repository: Arc<R>,
        notifier: Arc<N>,
        meetings: Arc<M>,
        decisions: Arc<DecisionEngine<R, N>>,
    ) -> Self {
        Self {
            repository,
            notifier,
            meetings,
            decisions,
        }
    }

    /// Claim a slot for the acting candidate. The repository's conditional
    /// insert serializes racing bookers per slot: the loser gets a
    /// `Conflict` telling it to retry a different slot, and no partial
    /// state is left behind.
    pub fn book_slot(
        &self,
        actor: &Principal,
        slot_id: &SlotId,
    ) -> Result<Reservation, AdmissionsError> {
        if actor.role != Role::Candidate {
            return Err(AdmissionsError::Unauthorized("book interview slots"));
        }
        let slot = self
            .repository
            .fetch_slot(slot_id)?
            .ok_or(AdmissionsError::NotFound("slot"))?;

        let reservation = Reservation {
            id: next_reservation_id(),
            slot_id: slot.id.clone(),
            candidate_id: actor.user_id.clone(),
            stage: ReservationStage::Pending,
        };
        let stored = match self.repository.insert_reservation(reservation) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => {
                return Err(AdmissionsError::Conflict(
                    "slot already has an active reservation, pick another slot".to_string(),
                ))
            }
            Err(err) => return Err(err.into()),
        };

        notify_best_effort(
            self.notifier.as_ref(),
            Notice {
                targets: vec![actor.user_id.clone(), slot.interviewer_id.clone()],
                kind: NotificationKind::SlotBooked,
                message: "An interview slot was booked".to_string(),
                link: Some(format!("/reservations/{}", stored.id.0)),
            },
        );
        Ok(stored)
    }

    /// Pending to confirmed, performed by the slot owner. The meeting link
    /// is requested from the provider before anything is written; a
    /// provider failure surfaces as an error and leaves the reservation
    /// untouched; no placeholder link is ever written.
    pub fn confirm(
        &self,
        actor: &Principal,
        reservation_id: &ReservationId,
    ) -> Result<Reservation, AdmissionsError> {
        let (mut reservation, slot) = self.reservation_with_slot(reservation_id)?;
        if slot.interviewer_id != actor.user_id {
            return Err(AdmissionsError::Unauthorized(
                "confirm another interviewer's reservation",
            ));
        }
        if !matches!(reservation.stage, ReservationStage::Pending) {
            return Err(AdmissionsError::InvalidState(format!(
                "cannot confirm a {} reservation",
                reservation.stage.label()
            )));
        }

        let meeting_link = self.meetings.create(
            slot.start,
            slot.end,
            &[reservation.candidate_id.clone(), slot.interviewer_id.clone()],
        )?;

        let prior = reservation.stage.clone();
        reservation.stage = ReservationStage::Confirmed { meeting_link };
        self.commit_transition(reservation.clone(), &prior, "confirmation")?;

        notify_best_effort(
            self.notifier.as_ref(),
            Notice {
                targets: vec![reservation.candidate_id.clone(), slot.interviewer_id],
                kind: NotificationKind::ReservationConfirmed,
                message: "The interview was confirmed and a meeting link is ready".to_string(),
                link: reservation.stage.meeting_link().map(str::to_string),
            },
        );
        Ok(reservation)
    }

    /// Pending or confirmed to cancelled, performed by the slot owner or
    /// the reservation's candidate.
    pub fn cancel(
        &self,
        actor: &Principal,
        reservation_id: &ReservationId,
    ) -> Result<Reservation, AdmissionsError> {
        let (mut reservation, slot) = self.reservation_with_slot(reservation_id)?;
        let owner = slot.interviewer_id == actor.user_id;
        let candidate = reservation.candidate_id == actor.user_id;
        if !owner && !candidate {
            return Err(AdmissionsError::Unauthorized("cancel this reservation"));
        }
        if !matches!(
            reservation.stage,
            ReservationStage::Pending | ReservationStage::Confirmed { .. }
        ) {
            return Err(AdmissionsError::InvalidState(format!(
                "cannot cancel a {} reservation",
                reservation.stage.label()
            )));
        }

        let prior = reservation.stage.clone();
        reservation.stage = ReservationStage::Cancelled;
        self.commit_transition(reservation.clone(), &prior, "cancellation")?;

        notify_best_effort(
            self.notifier.as_ref(),
            Notice {
                targets: vec![reservation.candidate_id.clone(), slot.interviewer_id],
                kind: NotificationKind::ReservationCancelled,
                message: "The interview reservation was cancelled".to_string(),
                link: Some(format!("/reservations/{}", reservation.id.0)),
            },
        );
        Ok(reservation)
    }

    /// Confirmed to completed, performed by the slot owner; the result is
    /// recorded atomically with the transition. The candidate's role is
    /// untouched here; that belongs to the decision engine.
    pub fn complete(
        &self,
        actor: &Principal,
        reservation_id: &ReservationId,
        result: AdmissionOutcome,
    ) -> Result<Reservation, AdmissionsError> {
        let (mut reservation, slot) = self.reservation_with_slot(reservation_id)?;
        if slot.interviewer_id != actor.user_id {
            return Err(AdmissionsError::Unauthorized(
                "complete another interviewer's reservation",
            ));
        }
        let meeting_link = match &reservation.stage {
            ReservationStage::Confirmed { meeting_link } => meeting_link.clone(),
            other => {
                return Err(AdmissionsError::InvalidState(format!(
                    "cannot complete a {} reservation",
                    other.label()
                )))
            }
        };

        let prior = reservation.stage.clone();
        reservation.stage = ReservationStage::Completed {
            meeting_link,
            result,
            acknowledged: false,
        };
        self.commit_transition(reservation.clone(), &prior, "completion")?;

        notify_best_effort(
            self.notifier.as_ref(),
            Notice {
                targets: vec![reservation.candidate_id.clone()],
                kind: NotificationKind::InterviewCompleted,
                message: "Your interview result is ready".to_string(),
                link: Some(format!("/reservations/{}", reservation.id.0)),
            },
        );
        Ok(reservation)
    }

    /// Candidate acknowledgement of an accepted result. Idempotent:
    /// repeated calls change nothing once the decision is finalized. The
    /// actual role change happens inside the decision engine so there is
    /// exactly one finalization point.
    pub fn acknowledge(
        &self,
        actor: &Principal,
        reservation_id: &ReservationId,
    ) -> Result<Reservation, AdmissionsError> {
        let mut reservation = self
            .repository
            .fetch_reservation(reservation_id)?
            .ok_or(AdmissionsError::NotFound("reservation"))?;
        if reservation.candidate_id != actor.user_id {
            return Err(AdmissionsError::Unauthorized(
                "acknowledge another candidate's result",
            ));
        }
        let prior = reservation.stage.clone();
        match &mut reservation.stage {
            ReservationStage::Completed {
                result: AdmissionOutcome::Accept,
                acknowledged,
                ..
            } => {
                if !*acknowledged {
                    *acknowledged = true;
                    match self
                        .repository
                        .transition_reservation(reservation.clone(), &prior)
                    {
                        Ok(()) => {}
                        // An accepted, unacknowledged reservation has one
                        // possible competing writer: another acknowledgement
                        // setting the same flag. The stored row already
                        // carries it.
                        Err(RepositoryError::Conflict) => {}
                        Err(err) => return Err(err.into()),
                    }
                }
            }
            ReservationStage::Completed { .. } => {
                return Err(AdmissionsError::InvalidState(
                    "only an accepted result can be acknowledged".to_string(),
                ))
            }
            other => {
                return Err(AdmissionsError::InvalidState(format!(
                    "cannot acknowledge a {} reservation",
                    other.label()
                )))
            }
        }

        self.decisions.finalize_reservation_result(&reservation)?;
        Ok(reservation)
    }

    /// Compare-and-swap write for a stage transition. A `Conflict` from the
    /// store means another actor committed a transition while this one was
    /// in flight (the provider call happens outside the store lock); the
    /// committed transition wins and this one surfaces as invalid instead
    /// of overwriting it.
    fn commit_transition(
        &self,
        reservation: Reservation,
        prior: &ReservationStage,
        action: &'static str,
    ) -> Result<(), AdmissionsError> {
        match self.repository.transition_reservation(reservation, prior) {
            Ok(()) => Ok(()),
            Err(RepositoryError::Conflict) => Err(AdmissionsError::InvalidState(format!(
                "reservation changed before the {action} could commit"
            ))),
            Err(err) => Err(err.into()),
        }
    }

    fn reservation_with_slot(
        &self,
        reservation_id: &ReservationId,
    ) -> Result<(Reservation, Slot), AdmissionsError> {
        let reservation = self
            .repository
            .fetch_reservation(reservation_id)?
            .ok_or(AdmissionsError::NotFound("reservation"))?;
        let slot = self
            .repository
            .fetch_slot(&reservation.slot_id)?
            .ok_or(AdmissionsError::NotFound("slot"))?;
        Ok((reservation, slot))
    }
}

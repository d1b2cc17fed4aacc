use std::sync::Arc;

use super::domain::{
    AdmissionOutcome, Evaluation, EvaluationId, EvaluationStatus, NotificationKind, Principal,
    Reservation, ReservationStage, Role,
};
use super::error::AdmissionsError;
use super::evaluation::next_evaluation_id;
use super::notify_best_effort;
use super::repository::{AdmissionsRepository, Notice, NotificationDispatcher, RepositoryError};

/// Single authority over admission outcomes. The admin's explicit verdict
/// and the candidate's acknowledgement of an accepted interview result both
/// funnel into [`DecisionEngine::finalize`], which is the only code that
/// writes `User::role`.
pub struct DecisionEngine<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
}

impl<R, N> DecisionEngine<R, N>
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// Record an admin's verdict on a pending evaluation. Re-deciding a
    /// finalized evaluation is rejected, so the role flips at most once.
    pub fn decide(
        &self,
        actor: &Principal,
        evaluation_id: &EvaluationId,
        outcome: AdmissionOutcome,
    ) -> Result<Evaluation, AdmissionsError> {
        if actor.role != Role::Admin {
            return Err(AdmissionsError::Unauthorized("decide admissions"));
        }
        let evaluation = self
            .repository
            .fetch_evaluation(evaluation_id)?
            .ok_or(AdmissionsError::NotFound("evaluation"))?;
        self.finalize(evaluation, outcome)
    }

    /// Finalization entry for the acknowledgement path. Reuses the
    /// reservation's evaluation when one exists (a finalized one makes the
    /// acknowledgement a no-op), otherwise synthesizes a scoreless pending
    /// evaluation before finalizing with the reservation's recorded result.
    pub(crate) fn finalize_reservation_result(
        &self,
        reservation: &Reservation,
    ) -> Result<Evaluation, AdmissionsError> {
        let result = match &reservation.stage {
            ReservationStage::Completed { result, .. } => *result,
            other => {
                return Err(AdmissionsError::InvalidState(format!(
                    "cannot finalize a {} reservation",
                    other.label()
                )))
            }
        };

        let evaluation = match self.repository.evaluation_for_reservation(&reservation.id)? {
            Some(evaluation) => evaluation,
            None => {
                let slot = self
                    .repository
                    .fetch_slot(&reservation.slot_id)?
                    .ok_or(AdmissionsError::NotFound("slot"))?;
                let synthesized = Evaluation {
                    id: next_evaluation_id(),
                    reservation_id: reservation.id.clone(),
                    interviewer_id: slot.interviewer_id,
                    candidate_id: reservation.candidate_id.clone(),
                    scorecard: None,
                    status: EvaluationStatus::Pending,
                };
                match self.repository.insert_evaluation(synthesized) {
                    Ok(evaluation) => evaluation,
                    // Lost a race with a concurrent submission; adopt the
                    // stored evaluation instead.
                    Err(RepositoryError::Conflict) => self
                        .repository
                        .evaluation_for_reservation(&reservation.id)?
                        .ok_or(AdmissionsError::NotFound("evaluation"))?,
                    Err(err) => return Err(err.into()),
                }
            }
        };

        if evaluation.status.is_final() {
            return Ok(evaluation);
        }
        self.finalize(evaluation, result)
    }

    /// Commit the outcome and, on acceptance, the candidate's promotion to
    /// student in one repository transaction. The notification goes out
    /// only after the commit.
    fn finalize(
        &self,
        mut evaluation: Evaluation,
        outcome: AdmissionOutcome,
    ) -> Result<Evaluation, AdmissionsError> {
        if evaluation.status.is_final() {
            return Err(AdmissionsError::InvalidState(
                "evaluation already finalized".to_string(),
            ));
        }

        let promotion = match outcome {
            AdmissionOutcome::Accept => {
                evaluation.status = EvaluationStatus::Accepted;
                Some((evaluation.candidate_id.clone(), Role::Student))
            }
            AdmissionOutcome::Reject => {
                evaluation.status = EvaluationStatus::Rejected;
                None
            }
        };

        match self.repository.commit_decision(evaluation.clone(), promotion) {
            Ok(()) => {}
            // A racing decider finalized the stored row between the check
            // above and the commit; that decision stands.
            Err(RepositoryError::Conflict) => {
                return Err(AdmissionsError::InvalidState(
                    "evaluation already finalized".to_string(),
                ))
            }
            Err(err) => return Err(err.into()),
        }

        let message = match outcome {
            AdmissionOutcome::Accept => {
                "Congratulations, you have been admitted and enrolled as a student".to_string()
            }
            AdmissionOutcome::Reject => {
                "Your admission was not successful this cycle".to_string()
            }
        };
        notify_best_effort(
            self.notifier.as_ref(),
            Notice {
                targets: vec![evaluation.candidate_id.clone()],
                kind: NotificationKind::AdmissionDecided,
                message,
                link: Some(format!("/evaluations/{}", evaluation.id.0)),
            },
        );

        Ok(evaluation)
    }
}

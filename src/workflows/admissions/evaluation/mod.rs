mod config;
mod rules;

pub use config::ScoreWeights;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::domain::{
    Evaluation, EvaluationId, EvaluationStatus, InterviewScores, Principal, ReservationId,
    ReservationStage, Role, Scorecard,
};
use super::error::AdmissionsError;
use super::repository::{AdmissionsRepository, RepositoryError};

static EVALUATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_evaluation_id() -> EvaluationId {
    let id = EVALUATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EvaluationId(format!("eval-{id:06}"))
}

/// Records an interviewer's scored assessment of one completed interview,
/// one per reservation. Submissions upsert while the evaluation is pending
/// and are rejected once it was decided.
pub struct EvaluationDesk<R> {
    repository: Arc<R>,
    weights: ScoreWeights,
}

impl<R> EvaluationDesk<R>
where
    R: AdmissionsRepository + 'static,
{
    pub fn new(repository: Arc<R>, weights: ScoreWeights) -> Self {
        Self {
            repository,
            weights,
        }
    }

    pub fn submit(
        &self,
        actor: &Principal,
        reservation_id: &ReservationId,
        scores: InterviewScores,
        observation: Option<String>,
    ) -> Result<Evaluation, AdmissionsError> {
        if actor.role != Role::Interviewer {
            return Err(AdmissionsError::Unauthorized("submit evaluations"));
        }
        let reservation = self
            .repository
            .fetch_reservation(reservation_id)?
            .ok_or(AdmissionsError::NotFound("reservation"))?;
        let slot = self
            .repository
            .fetch_slot(&reservation.slot_id)?
            .ok_or(AdmissionsError::NotFound("slot"))?;
        if slot.interviewer_id != actor.user_id {
            return Err(AdmissionsError::Unauthorized(
                "evaluate another interviewer's reservation",
            ));
        }
        if !matches!(reservation.stage, ReservationStage::Completed { .. }) {
            return Err(AdmissionsError::InvalidState(format!(
                "cannot evaluate a {} reservation",
                reservation.stage.label()
            )));
        }
        if let Some(field) = rules::out_of_range(&scores) {
            return Err(AdmissionsError::Validation(format!(
                "{field} subscore exceeds the 0-10 range"
            )));
        }

        let (components, total_score) = rules::score_interview(&scores, &self.weights);
        let scorecard = Scorecard {
            scores,
            components,
            total_score,
            observation,
        };

        match self.repository.evaluation_for_reservation(reservation_id)? {
            Some(existing) if existing.status.is_final() => Err(AdmissionsError::InvalidState(
                "evaluation already finalized".to_string(),
            )),
            Some(mut existing) => {
                existing.scorecard = Some(scorecard);
                match self.repository.update_evaluation(existing.clone()) {
                    Ok(()) => Ok(existing),
                    // Finalized between the status check and the write.
                    Err(RepositoryError::Conflict) => Err(AdmissionsError::InvalidState(
                        "evaluation already finalized".to_string(),
                    )),
                    Err(err) => Err(err.into()),
                }
            }
            None => {
                let evaluation = Evaluation {
                    id: next_evaluation_id(),
                    reservation_id: reservation.id.clone(),
                    interviewer_id: slot.interviewer_id,
                    candidate_id: reservation.candidate_id,
                    scorecard: Some(scorecard),
                    status: EvaluationStatus::Pending,
                };
                Ok(self.repository.insert_evaluation(evaluation)?)
            }
        }
    }
}

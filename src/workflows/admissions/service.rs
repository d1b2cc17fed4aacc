use std::sync::Arc;

use chrono::Duration;

use super::booking::BookingEngine;
use super::decision::DecisionEngine;
use super::evaluation::{EvaluationDesk, ScoreWeights};
use super::repository::{AdmissionsRepository, MeetingLinkProvider, NotificationDispatcher};
use super::requests::InterviewRequestWorkflow;
use super::slots::SlotRegistry;

/// Tunables for the admissions engines.
#[derive(Debug, Clone, Copy)]
pub struct AdmissionsConfig {
    /// Interview length used when an accepted request does not specify one.
    pub default_interview_duration: Duration,
    pub weights: ScoreWeights,
}

impl Default for AdmissionsConfig {
    fn default() -> Self {
        Self {
            default_interview_duration: Duration::minutes(60),
            weights: ScoreWeights::default(),
        }
    }
}

/// Facade composing the five engines over one repository, one notification
/// dispatcher, and one meeting-link provider. The router and the binary
/// talk to this; tests may reach for the engines directly.
pub struct AdmissionsService<R, N, M> {
    slots: SlotRegistry<R>,
    booking: BookingEngine<R, N, M>,
    requests: InterviewRequestWorkflow<R, N>,
    evaluations: EvaluationDesk<R>,
    decisions: Arc<DecisionEngine<R, N>>,
}

impl<R, N, M> AdmissionsService<R, N, M>
where
    R: AdmissionsRepository + 'static,
    N: NotificationDispatcher + 'static,
    M: MeetingLinkProvider + 'static,
{
    pub fn new(
        repository: Arc<R>,
        notifier: Arc<N>,
        meetings: Arc<M>,
        config: AdmissionsConfig,
    ) -> Self {
        let decisions = Arc::new(DecisionEngine::new(repository.clone(), notifier.clone()));
        Self {
            slots: SlotRegistry::new(repository.clone()),
            booking: BookingEngine::new(
                repository.clone(),
                notifier.clone(),
                meetings,
                decisions.clone(),
            ),
            requests: InterviewRequestWorkflow::new(
                repository.clone(),
                notifier,
                config.default_interview_duration,
            ),
            evaluations: EvaluationDesk::new(repository, config.weights),
            decisions,
        }
    }

    pub fn slots(&self) -> &SlotRegistry<R> {
        &self.slots
    }

    pub fn booking(&self) -> &BookingEngine<R, N, M> {
        &self.booking
    }

    pub fn requests(&self) -> &InterviewRequestWorkflow<R, N> {
        &self.requests
    }

    pub fn evaluations(&self) -> &EvaluationDesk<R> {
        &self.evaluations
    }

    pub fn decisions(&self) -> &DecisionEngine<R, N> {
        &self.decisions
    }
}

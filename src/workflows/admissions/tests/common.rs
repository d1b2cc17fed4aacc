use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::infra::{FixedMeetingLinks, MemoryAdmissionsRepository};
use crate::workflows::admissions::domain::{
    AdmissionOutcome, InterviewScores, Principal, Reservation, Role, Slot, User, UserId,
};
use crate::workflows::admissions::repository::{
    AdmissionsRepository, DispatchError, MeetingLinkError, MeetingLinkProvider, Notice,
    NotificationDispatcher,
};
use crate::workflows::admissions::service::{AdmissionsConfig, AdmissionsService};

pub(super) type TestService =
    AdmissionsService<MemoryAdmissionsRepository, RecordingDispatcher, FixedMeetingLinks>;

pub(super) fn admin() -> Principal {
    principal("admin-1", Role::Admin)
}

pub(super) fn second_admin() -> Principal {
    principal("admin-2", Role::Admin)
}

pub(super) fn interviewer() -> Principal {
    principal("interviewer-1", Role::Interviewer)
}

pub(super) fn second_interviewer() -> Principal {
    principal("interviewer-2", Role::Interviewer)
}

pub(super) fn candidate() -> Principal {
    principal("candidate-1", Role::Candidate)
}

pub(super) fn second_candidate() -> Principal {
    principal("candidate-2", Role::Candidate)
}

pub(super) fn principal(id: &str, role: Role) -> Principal {
    Principal {
        user_id: UserId(id.to_string()),
        role,
    }
}

pub(super) fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn seeded_repository() -> Arc<MemoryAdmissionsRepository> {
    let repository = Arc::new(MemoryAdmissionsRepository::default());
    let users = [
        ("admin-1", Role::Admin, "Dana Admin"),
        ("admin-2", Role::Admin, "Devin Admin"),
        ("interviewer-1", Role::Interviewer, "Iris Interviewer"),
        ("interviewer-2", Role::Interviewer, "Ivan Interviewer"),
        ("candidate-1", Role::Candidate, "Casey Candidate"),
        ("candidate-2", Role::Candidate, "Corey Candidate"),
    ];
    for (id, role, name) in users {
        repository
            .upsert_user(User {
                id: UserId(id.to_string()),
                role,
                display_name: name.to_string(),
                email: format!("{id}@admissions.example"),
            })
            .expect("seed user");
    }
    repository
}

pub(super) fn build_service() -> (
    Arc<TestService>,
    Arc<MemoryAdmissionsRepository>,
    Arc<RecordingDispatcher>,
) {
    let repository = seeded_repository();
    let notifier = Arc::new(RecordingDispatcher::default());
    let service = Arc::new(AdmissionsService::new(
        repository.clone(),
        notifier.clone(),
        Arc::new(FixedMeetingLinks::new("test")),
        AdmissionsConfig::default(),
    ));
    (service, repository, notifier)
}

pub(super) fn build_service_with_meetings<M>(
    meetings: Arc<M>,
) -> (
    Arc<AdmissionsService<MemoryAdmissionsRepository, RecordingDispatcher, M>>,
    Arc<MemoryAdmissionsRepository>,
    Arc<RecordingDispatcher>,
)
where
    M: MeetingLinkProvider + 'static,
{
    let repository = seeded_repository();
    let notifier = Arc::new(RecordingDispatcher::default());
    let service = Arc::new(AdmissionsService::new(
        repository.clone(),
        notifier.clone(),
        meetings,
        AdmissionsConfig::default(),
    ));
    (service, repository, notifier)
}

pub(super) fn build_service_with_notifier<N>(
    notifier: Arc<N>,
) -> (
    Arc<AdmissionsService<MemoryAdmissionsRepository, N, FixedMeetingLinks>>,
    Arc<MemoryAdmissionsRepository>,
)
where
    N: NotificationDispatcher + 'static,
{
    let repository = seeded_repository();
    let service = Arc::new(AdmissionsService::new(
        repository.clone(),
        notifier,
        Arc::new(FixedMeetingLinks::new("test")),
        AdmissionsConfig::default(),
    ));
    (service, repository)
}

/// Drive one reservation from publication to a completed interview.
pub(super) fn completed_reservation(
    service: &TestService,
    result: AdmissionOutcome,
) -> (Slot, Reservation) {
    let slot = service
        .slots()
        .create_slot(&interviewer(), at(1, 10), at(1, 11))
        .expect("slot publishes");
    let reservation = service
        .booking()
        .book_slot(&candidate(), &slot.id)
        .expect("booking succeeds");
    service
        .booking()
        .confirm(&interviewer(), &reservation.id)
        .expect("confirmation succeeds");
    let reservation = service
        .booking()
        .complete(&interviewer(), &reservation.id, result)
        .expect("completion succeeds");
    (slot, reservation)
}

pub(super) fn scores(technical: u8, communication: u8, problem_solving: u8, culture_add: u8) -> InterviewScores {
    InterviewScores {
        technical,
        communication,
        problem_solving,
        culture_add,
    }
}

#[derive(Default, Clone)]
pub(super) struct RecordingDispatcher {
    events: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingDispatcher {
    pub(super) fn events(&self) -> Vec<Notice> {
        self.events.lock().expect("dispatcher mutex poisoned").clone()
    }

    pub(super) fn targets_of_last(&self) -> Vec<UserId> {
        self.events()
            .last()
            .map(|notice| notice.targets.clone())
            .unwrap_or_default()
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn notify(&self, notice: Notice) -> Result<(), DispatchError> {
        self.events
            .lock()
            .expect("dispatcher mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct FailingDispatcher;

impl NotificationDispatcher for FailingDispatcher {
    fn notify(&self, _notice: Notice) -> Result<(), DispatchError> {
        Err(DispatchError::Transport("hub offline".to_string()))
    }
}

pub(super) struct FailingMeetingLinks;

impl MeetingLinkProvider for FailingMeetingLinks {
    fn create(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _attendees: &[UserId],
    ) -> Result<String, MeetingLinkError> {
        Err(MeetingLinkError::Unavailable("calendar offline".to_string()))
    }
}

//! In-process implementations of the admissions collaborator traits: a
//! mutex-guarded repository, an in-app notification hub with optional mail
//! fan-out, and a deterministic meeting-link provider. The binary runs on
//! these; the integration tests reuse them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::workflows::admissions::{
    AdmissionsRepository, DispatchError, Evaluation, EvaluationId, InterviewRequest, Mailer,
    MeetingLinkError, MeetingLinkProvider, Notice, Notification, NotificationDispatcher,
    RepositoryError, RequestId, Reservation, ReservationId, ReservationStage, Role, Slot, SlotId,
    User, UserId,
};

#[derive(Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    slots: HashMap<SlotId, Slot>,
    reservations: HashMap<ReservationId, Reservation>,
    requests: HashMap<RequestId, InterviewRequest>,
    evaluations: HashMap<EvaluationId, Evaluation>,
}

impl MemoryState {
    fn active_reservation(&self, slot_id: &SlotId) -> Option<&Reservation> {
        self.reservations
            .values()
            .find(|reservation| &reservation.slot_id == slot_id && reservation.is_active())
    }

    fn evaluation_for(&self, reservation_id: &ReservationId) -> Option<&Evaluation> {
        self.evaluations
            .values()
            .find(|evaluation| &evaluation.reservation_id == reservation_id)
    }
}

/// Single-mutex store. Every trait method takes the lock once, which makes
/// the conditional reservation insert and the multi-row commits
/// linearizable, the in-process equivalent of the filtered uniqueness
/// constraint and transactions a relational store would provide.
#[derive(Default, Clone)]
pub struct MemoryAdmissionsRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl AdmissionsRepository for MemoryAdmissionsRepository {
    fn upsert_user(&self, user: User) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        state.users.insert(user.id.clone(), user);
        Ok(())
    }

    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.users.get(id).cloned())
    }

    fn users_with_role(&self, role: Role) -> Result<Vec<User>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state
            .users
            .values()
            .filter(|user| user.role == role)
            .cloned()
            .collect())
    }

    fn insert_slot(&self, slot: Slot) -> Result<Slot, RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        if state.slots.contains_key(&slot.id) {
            return Err(RepositoryError::Conflict);
        }
        state.slots.insert(slot.id.clone(), slot.clone());
        Ok(slot)
    }

    fn fetch_slot(&self, id: &SlotId) -> Result<Option<Slot>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.slots.get(id).cloned())
    }

    fn delete_slot(&self, id: &SlotId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        match state.slots.remove(id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }

    fn slots(&self) -> Result<Vec<Slot>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.slots.values().cloned().collect())
    }

    fn insert_reservation(
        &self,
        reservation: Reservation,
    ) -> Result<Reservation, RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        if !state.slots.contains_key(&reservation.slot_id) {
            return Err(RepositoryError::NotFound);
        }
        if reservation.is_active() && state.active_reservation(&reservation.slot_id).is_some() {
            return Err(RepositoryError::Conflict);
        }
        if state.reservations.contains_key(&reservation.id) {
            return Err(RepositoryError::Conflict);
        }
        state
            .reservations
            .insert(reservation.id.clone(), reservation.clone());
        Ok(reservation)
    }

    fn fetch_reservation(
        &self,
        id: &ReservationId,
    ) -> Result<Option<Reservation>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.reservations.get(id).cloned())
    }

    fn transition_reservation(
        &self,
        reservation: Reservation,
        expected: &ReservationStage,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        match state.reservations.get(&reservation.id) {
            None => return Err(RepositoryError::NotFound),
            Some(stored) if &stored.stage != expected => return Err(RepositoryError::Conflict),
            Some(_) => {}
        }
        state.reservations.insert(reservation.id.clone(), reservation);
        Ok(())
    }

    fn reservations_for_slot(&self, slot_id: &SlotId) -> Result<Vec<Reservation>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state
            .reservations
            .values()
            .filter(|reservation| &reservation.slot_id == slot_id)
            .cloned()
            .collect())
    }

    fn active_reservation_for_slot(
        &self,
        slot_id: &SlotId,
    ) -> Result<Option<Reservation>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.active_reservation(slot_id).cloned())
    }

    fn insert_request(&self, request: InterviewRequest) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        if state.requests.contains_key(&request.id) {
            return Err(RepositoryError::Conflict);
        }
        state.requests.insert(request.id.clone(), request);
        Ok(())
    }

    fn fetch_request(&self, id: &RequestId) -> Result<Option<InterviewRequest>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.requests.get(id).cloned())
    }

    fn update_request(&self, request: InterviewRequest) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        if !state.requests.contains_key(&request.id) {
            return Err(RepositoryError::NotFound);
        }
        state.requests.insert(request.id.clone(), request);
        Ok(())
    }

    fn commit_request_acceptance(
        &self,
        request: InterviewRequest,
        slot: Slot,
        reservation: Reservation,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        if !state.requests.contains_key(&request.id) {
            return Err(RepositoryError::NotFound);
        }
        if state.slots.contains_key(&slot.id) || state.reservations.contains_key(&reservation.id)
        {
            return Err(RepositoryError::Conflict);
        }
        state.slots.insert(slot.id.clone(), slot);
        state
            .reservations
            .insert(reservation.id.clone(), reservation);
        state.requests.insert(request.id.clone(), request);
        Ok(())
    }

    fn insert_evaluation(&self, evaluation: Evaluation) -> Result<Evaluation, RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        if state.evaluation_for(&evaluation.reservation_id).is_some()
            || state.evaluations.contains_key(&evaluation.id)
        {
            return Err(RepositoryError::Conflict);
        }
        state
            .evaluations
            .insert(evaluation.id.clone(), evaluation.clone());
        Ok(evaluation)
    }

    fn fetch_evaluation(&self, id: &EvaluationId) -> Result<Option<Evaluation>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.evaluations.get(id).cloned())
    }

    fn evaluation_for_reservation(
        &self,
        reservation_id: &ReservationId,
    ) -> Result<Option<Evaluation>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.evaluation_for(reservation_id).cloned())
    }

    fn update_evaluation(&self, evaluation: Evaluation) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        match state.evaluations.get(&evaluation.id) {
            None => return Err(RepositoryError::NotFound),
            Some(stored) if stored.status.is_final() => return Err(RepositoryError::Conflict),
            Some(_) => {}
        }
        state.evaluations.insert(evaluation.id.clone(), evaluation);
        Ok(())
    }

    fn commit_decision(
        &self,
        evaluation: Evaluation,
        promotion: Option<(UserId, Role)>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        match state.evaluations.get(&evaluation.id) {
            None => return Err(RepositoryError::NotFound),
            // The stored row was decided by a racing caller; this decision
            // must not overwrite it.
            Some(stored) if stored.status.is_final() => return Err(RepositoryError::Conflict),
            Some(_) => {}
        }
        if let Some((user_id, role)) = promotion {
            match state.users.get_mut(&user_id) {
                Some(user) => user.role = role,
                None => return Err(RepositoryError::NotFound),
            }
        }
        state.evaluations.insert(evaluation.id.clone(), evaluation);
        Ok(())
    }
}

/// In-app notification store with optional best-effort mail fan-out.
/// Transport problems never reach the caller's state machine; the mail leg
/// logs and moves on.
#[derive(Default, Clone)]
pub struct NotificationHub {
    rows: Arc<Mutex<Vec<Notification>>>,
    sequence: Arc<AtomicU64>,
    mail: Option<(Arc<dyn Mailer>, HashMap<UserId, String>)>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mailer(mailer: Arc<dyn Mailer>, addresses: HashMap<UserId, String>) -> Self {
        Self {
            rows: Arc::default(),
            sequence: Arc::default(),
            mail: Some((mailer, addresses)),
        }
    }

    pub fn notifications_for(&self, user_id: &UserId) -> Vec<Notification> {
        self.rows
            .lock()
            .expect("notification mutex poisoned")
            .iter()
            .filter(|row| &row.user_id == user_id)
            .cloned()
            .collect()
    }
}

impl NotificationDispatcher for NotificationHub {
    fn notify(&self, notice: Notice) -> Result<(), DispatchError> {
        let mut rows = self.rows.lock().expect("notification mutex poisoned");
        for target in &notice.targets {
            let id = self.sequence.fetch_add(1, Ordering::Relaxed);
            rows.push(Notification {
                id,
                user_id: target.clone(),
                kind: notice.kind,
                message: notice.message.clone(),
                link: notice.link.clone(),
                read: false,
                created_at: Utc::now(),
            });
        }
        drop(rows);

        if let Some((mailer, addresses)) = &self.mail {
            for target in &notice.targets {
                let Some(address) = addresses.get(target) else {
                    continue;
                };
                if let Err(err) = mailer.send(address, "Admissions update", &notice.message) {
                    tracing::warn!(error = %err, user = %target.0, "mail fan-out failed");
                }
            }
        }
        Ok(())
    }
}

/// Mailer that only logs; stands in for the real transactional mail
/// collaborator in local runs.
#[derive(Default, Clone)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), DispatchError> {
        tracing::info!(%to, %subject, "mail dispatched");
        Ok(())
    }
}

/// Deterministic meeting-link provider for local runs and tests.
#[derive(Clone)]
pub struct FixedMeetingLinks {
    base: String,
    sequence: Arc<AtomicU64>,
}

impl FixedMeetingLinks {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            sequence: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl MeetingLinkProvider for FixedMeetingLinks {
    fn create(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _attendees: &[UserId],
    ) -> Result<String, MeetingLinkError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        Ok(format!("https://meet.example.net/{}-{id:04}", self.base))
    }
}

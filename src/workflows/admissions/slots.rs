use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::domain::{Principal, Role, Slot, SlotId};
use super::error::AdmissionsError;
use super::repository::AdmissionsRepository;

static SLOT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_slot_id() -> SlotId {
    let id = SLOT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SlotId(format!("slot-{id:06}"))
}

/// Owns interviewer-published time slots and computes availability.
pub struct SlotRegistry<R> {
    repository: Arc<R>,
}

impl<R> SlotRegistry<R>
where
    R: AdmissionsRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Publish a new slot for the acting interviewer. Overlapping windows
    /// for one interviewer are allowed.
    pub fn create_slot(
        &self,
        actor: &Principal,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Slot, AdmissionsError> {
        if actor.role != Role::Interviewer {
            return Err(AdmissionsError::Unauthorized("publish slots"));
        }
        if start >= end {
            return Err(AdmissionsError::Validation(
                "slot start must precede its end".to_string(),
            ));
        }

        let slot = Slot {
            id: next_slot_id(),
            interviewer_id: actor.user_id.clone(),
            start,
            end,
        };
        Ok(self.repository.insert_slot(slot)?)
    }

    /// Derived view of bookable slots: future start and no active
    /// reservation. Nothing is stored for availability.
    pub fn list_available(&self, now: DateTime<Utc>) -> Result<Vec<Slot>, AdmissionsError> {
        let mut open = Vec::new();
        for slot in self.repository.slots()? {
            if slot.start <= now {
                continue;
            }
            if self
                .repository
                .active_reservation_for_slot(&slot.id)?
                .is_none()
            {
                open.push(slot);
            }
        }
        open.sort_by_key(|slot| slot.start);
        Ok(open)
    }

    /// Remove a slot the actor owns. Any reservation row referencing the
    /// slot blocks deletion, cancelled ones included.
    pub fn delete_slot(&self, actor: &Principal, slot_id: &SlotId) -> Result<(), AdmissionsError> {
        let slot = self
            .repository
            .fetch_slot(slot_id)?
            .ok_or(AdmissionsError::NotFound("slot"))?;
        if slot.interviewer_id != actor.user_id {
            return Err(AdmissionsError::Unauthorized(
                "delete another interviewer's slot",
            ));
        }
        if !self.repository.reservations_for_slot(slot_id)?.is_empty() {
            return Err(AdmissionsError::Conflict(
                "slot has reservation history".to_string(),
            ));
        }
        Ok(self.repository.delete_slot(slot_id)?)
    }
}

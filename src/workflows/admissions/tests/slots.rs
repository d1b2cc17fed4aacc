use super::common::*;
use crate::workflows::admissions::error::AdmissionsError;
use crate::workflows::admissions::repository::AdmissionsRepository;

#[test]
fn create_slot_rejects_inverted_window() {
    let (service, _, _) = build_service();

    match service
        .slots()
        .create_slot(&interviewer(), at(1, 11), at(1, 10))
    {
        Err(AdmissionsError::Validation(_)) => {}
        other => panic!("expected validation error, got {other:?}"),
    }
    match service
        .slots()
        .create_slot(&interviewer(), at(1, 10), at(1, 10))
    {
        Err(AdmissionsError::Validation(_)) => {}
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn create_slot_requires_interviewer_role() {
    let (service, _, _) = build_service();

    match service
        .slots()
        .create_slot(&candidate(), at(1, 10), at(1, 11))
    {
        Err(AdmissionsError::Unauthorized(_)) => {}
        other => panic!("expected unauthorized, got {other:?}"),
    }
}

#[test]
fn overlapping_slots_for_one_interviewer_are_allowed() {
    let (service, _, _) = build_service();

    service
        .slots()
        .create_slot(&interviewer(), at(1, 10), at(1, 11))
        .expect("first slot");
    service
        .slots()
        .create_slot(&interviewer(), at(1, 10), at(1, 12))
        .expect("overlapping slot is accepted");
}

#[test]
fn list_available_excludes_past_and_booked_slots() {
    let (service, _, _) = build_service();

    let past = service
        .slots()
        .create_slot(&interviewer(), at(1, 8), at(1, 9))
        .expect("past slot");
    let booked = service
        .slots()
        .create_slot(&interviewer(), at(2, 10), at(2, 11))
        .expect("booked slot");
    let open = service
        .slots()
        .create_slot(&interviewer(), at(2, 14), at(2, 15))
        .expect("open slot");
    service
        .booking()
        .book_slot(&candidate(), &booked.id)
        .expect("booking succeeds");

    let available = service
        .slots()
        .list_available(at(1, 12))
        .expect("listing succeeds");
    let ids: Vec<_> = available.iter().map(|slot| slot.id.clone()).collect();
    assert_eq!(ids, vec![open.id]);
    assert!(!ids.contains(&past.id));
}

#[test]
fn cancelled_reservation_reopens_availability_but_blocks_deletion() {
    let (service, repository, _) = build_service();

    let slot = service
        .slots()
        .create_slot(&interviewer(), at(2, 10), at(2, 11))
        .expect("slot publishes");
    let reservation = service
        .booking()
        .book_slot(&candidate(), &slot.id)
        .expect("booking succeeds");
    service
        .booking()
        .cancel(&candidate(), &reservation.id)
        .expect("cancellation succeeds");

    let available = service
        .slots()
        .list_available(at(1, 12))
        .expect("listing succeeds");
    assert!(available.iter().any(|open| open.id == slot.id));

    // The cancelled row still pins the slot's history.
    match service.slots().delete_slot(&interviewer(), &slot.id) {
        Err(AdmissionsError::Conflict(_)) => {}
        other => panic!("expected conflict, got {other:?}"),
    }
    assert!(repository
        .fetch_slot(&slot.id)
        .expect("fetch succeeds")
        .is_some());
}

#[test]
fn delete_slot_requires_owner() {
    let (service, _, _) = build_service();

    let slot = service
        .slots()
        .create_slot(&interviewer(), at(2, 10), at(2, 11))
        .expect("slot publishes");
    match service.slots().delete_slot(&second_interviewer(), &slot.id) {
        Err(AdmissionsError::Unauthorized(_)) => {}
        other => panic!("expected unauthorized, got {other:?}"),
    }
}

#[test]
fn delete_slot_removes_unreferenced_slot() {
    let (service, repository, _) = build_service();

    let slot = service
        .slots()
        .create_slot(&interviewer(), at(2, 10), at(2, 11))
        .expect("slot publishes");
    service
        .slots()
        .delete_slot(&interviewer(), &slot.id)
        .expect("deletion succeeds");
    assert!(repository
        .fetch_slot(&slot.id)
        .expect("fetch succeeds")
        .is_none());
}

//! Booking wizard tests — step gating, the fixed price table, and
//! booking persistence.
//!
//! Covers the end-to-end scenario: duration 30 + messaging ($20) →
//! confirm with cash → a persisted booking row with a non-empty
//! reference and the original provider attached.

mod common;

use carelink::models::booking::*;
use common::*;

fn complete_draft(provider_id: i64) -> BookingDraft {
    let mut draft = BookingDraft::start(provider_id);
    draft.duration_minutes = Some(30);
    draft.appointment_date = Some("2026-09-15".to_string());
    draft.appointment_time = Some("10:00".to_string());
    draft.service = Some(ServiceKind::Messaging);
    draft
}

#[test]
fn test_confirm_is_unreachable_without_package_selection() {
    let mut draft = BookingDraft::start(1);
    assert!(!draft.can_enter(WizardStep::Confirm));

    draft.duration_minutes = Some(30);
    draft.appointment_date = Some("2026-09-15".to_string());
    draft.appointment_time = Some("10:00".to_string());
    assert!(!draft.can_enter(WizardStep::Confirm), "package still missing");

    draft.service = Some(ServiceKind::Video);
    assert!(draft.can_enter(WizardStep::Confirm));
}

#[test]
fn test_package_is_unreachable_without_duration() {
    let draft = BookingDraft::start(1);
    assert!(!draft.can_enter(WizardStep::Package));
    assert_eq!(draft.next_step(), WizardStep::Duration);
}

#[test]
fn test_selected_package_price_survives_to_confirm() {
    // Video at 45 minutes shows $60; the price table ignores duration.
    let mut draft = BookingDraft::start(1);
    draft.duration_minutes = Some(45);
    draft.appointment_date = Some("2026-09-15".to_string());
    draft.appointment_time = Some("10:00".to_string());
    draft.service = Some(ServiceKind::Video);

    assert!(draft.can_enter(WizardStep::Confirm));
    assert_eq!(draft.price(), Some(60));
    assert_eq!(draft.duration_minutes, Some(45));
}

#[test]
fn test_price_table_is_fixed() {
    assert_eq!(ServiceKind::Messaging.price(), 20);
    assert_eq!(ServiceKind::Voice.price(), 40);
    assert_eq!(ServiceKind::Video.price(), 60);
    assert_eq!(ServiceKind::InPerson.price(), 85);
}

#[test]
fn test_service_kind_round_trips_through_strings() {
    for kind in ServiceKind::ALL {
        assert_eq!(ServiceKind::parse(kind.as_str()), Some(kind));
    }
    assert_eq!(ServiceKind::parse("carrier-pigeon"), None);
}

#[test]
fn test_payment_method_parses_closed_set() {
    assert_eq!(PaymentMethod::parse("cash"), Some(PaymentMethod::Cash));
    assert_eq!(PaymentMethod::parse("card"), Some(PaymentMethod::Card));
    assert_eq!(PaymentMethod::parse("barter"), None);
}

#[test]
fn test_booking_scenario_persists_row_with_reference() {
    let (_dir, conn) = setup_test_db();

    let patient_id = seed_patient(&conn, "alice");
    let provider_id = seed_provider(&conn, "Dr. Scenario", "Cardiologist", 4.8, "2.5 km", 150);

    let draft = complete_draft(provider_id);
    assert!(draft.can_enter(WizardStep::Confirm));
    assert_eq!(draft.price(), Some(20));

    let new = NewBooking {
        patient_id,
        provider_id,
        service: ServiceKind::Messaging,
        duration_minutes: 30,
        price: 20,
        appointment_date: "2026-09-15".to_string(),
        appointment_time: "10:00".to_string(),
        problem: "Chest pain after exercise".to_string(),
        payment_method: PaymentMethod::Cash,
    };

    let reference = create(&conn, &new).expect("Failed to create booking");
    assert!(!reference.is_empty());
    assert!(reference.starts_with("BK-"));

    let bookings = find_by_patient(&conn, patient_id).expect("Failed to list bookings");
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].reference, reference);
    assert_eq!(bookings[0].provider_name, "Dr. Scenario");
    assert_eq!(bookings[0].price, 20);
    assert_eq!(bookings[0].duration_minutes, 30);
}

#[test]
fn test_booking_insert_fails_for_unknown_provider() {
    let (_dir, conn) = setup_test_db();

    let patient_id = seed_patient(&conn, "bob");
    let new = NewBooking {
        patient_id,
        provider_id: 9999,
        service: ServiceKind::Voice,
        duration_minutes: 15,
        price: 40,
        appointment_date: "2026-09-15".to_string(),
        appointment_time: "09:00".to_string(),
        problem: "test".to_string(),
        payment_method: PaymentMethod::Card,
    };

    // Foreign keys are on; the wizard surfaces this as a visible error
    // on the confirm screen.
    assert!(create(&conn, &new).is_err());
}

#[test]
fn test_provider_dashboard_sees_booking() {
    let (_dir, conn) = setup_test_db();

    let patient_id = seed_patient(&conn, "carol");
    let provider_id = seed_provider(&conn, "Dr. Busy", "Dermatologist", 4.3, "1.1 km", 120);

    let new = NewBooking {
        patient_id,
        provider_id,
        service: ServiceKind::InPerson,
        duration_minutes: 60,
        price: 85,
        appointment_date: "2026-10-01".to_string(),
        appointment_time: "14:30".to_string(),
        problem: "Rash on forearm".to_string(),
        payment_method: PaymentMethod::Card,
    };
    create(&conn, &new).expect("Failed to create booking");

    let bookings = find_by_provider(&conn, provider_id).expect("Failed to list bookings");
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].patient_name, "carol full name");
    assert_eq!(bookings[0].problem, "Rash on forearm");
}

#[test]
fn test_references_are_unique_enough() {
    let mut seen = std::collections::HashSet::new();
    for _ in 0..100 {
        seen.insert(generate_reference());
    }
    assert!(seen.len() > 90);
}

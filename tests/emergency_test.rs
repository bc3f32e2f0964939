//! Emergency profile tests — per-category add/delete, phone
//! normalization, patient scoping, and the blood-type update.

mod common;

use carelink::models::emergency::*;
use carelink::models::user;
use common::*;

#[test]
fn test_phone_validation_accepts_both_observed_forms() {
    assert_eq!(
        normalize_phone("5551234567").as_deref(),
        Some("(555) 123-4567")
    );
    assert_eq!(
        normalize_phone("(555) 123-4567").as_deref(),
        Some("(555) 123-4567")
    );
    assert!(normalize_phone("123").is_none());
}

#[test]
fn test_add_and_list_contacts() {
    let (_dir, conn) = setup_test_db();
    let patient_id = seed_patient(&conn, "alice");

    add_contact(&conn, patient_id, "Jane Doe", "Sister", "(555) 111-2222")
        .expect("Failed to add contact");

    let contacts = list_contacts(&conn, patient_id).expect("Failed to list");
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].name, "Jane Doe");
    assert_eq!(contacts[0].relationship, "Sister");
    assert_eq!(contacts[0].phone, "(555) 111-2222");
}

#[test]
fn test_delete_removes_exactly_one_and_leaves_others_intact() {
    let (_dir, conn) = setup_test_db();
    let patient_id = seed_patient(&conn, "alice");

    let a = add_contact(&conn, patient_id, "A", "Friend", "(555) 000-0001").unwrap();
    let b = add_contact(&conn, patient_id, "B", "Friend", "(555) 000-0002").unwrap();
    let c = add_contact(&conn, patient_id, "C", "Friend", "(555) 000-0003").unwrap();

    let deleted = delete_contact(&conn, patient_id, b).expect("Delete failed");
    assert!(deleted);

    let remaining = list_contacts(&conn, patient_id).expect("Failed to list");
    assert_eq!(remaining.len(), 2);
    assert_eq!(remaining[0].id, a);
    assert_eq!(remaining[0].name, "A");
    assert_eq!(remaining[0].phone, "(555) 000-0001");
    assert_eq!(remaining[1].id, c);
    assert_eq!(remaining[1].name, "C");
    assert_eq!(remaining[1].phone, "(555) 000-0003");
}

#[test]
fn test_delete_is_scoped_to_owning_patient() {
    let (_dir, conn) = setup_test_db();
    let alice = seed_patient(&conn, "alice");
    let mallory = seed_patient(&conn, "mallory");

    let id = add_contact(&conn, alice, "Jane", "Sister", "(555) 111-2222").unwrap();

    let deleted = delete_contact(&conn, mallory, id).expect("Delete failed");
    assert!(!deleted, "Another patient's row must not be deletable");
    assert_eq!(list_contacts(&conn, alice).unwrap().len(), 1);
}

#[test]
fn test_allergy_requires_valid_severity() {
    let (_dir, conn) = setup_test_db();
    let patient_id = seed_patient(&conn, "alice");

    // Handler-level validation parses the enum first; the model only
    // accepts parsed values.
    assert!(Severity::parse("deadly").is_none());

    add_allergy(&conn, patient_id, "Peanuts", Severity::Severe, "Anaphylaxis").unwrap();
    let allergies = list_allergies(&conn, patient_id).unwrap();
    assert_eq!(allergies.len(), 1);
    assert_eq!(allergies[0].severity, "severe");
}

#[test]
fn test_medication_frequency_is_optional() {
    let (_dir, conn) = setup_test_db();
    let patient_id = seed_patient(&conn, "alice");

    add_medication(&conn, patient_id, "Ibuprofen", "200mg", "").unwrap();
    let meds = list_medications(&conn, patient_id).unwrap();
    assert_eq!(meds.len(), 1);
    assert_eq!(meds[0].dosage, "200mg");
    assert_eq!(meds[0].frequency, "");
}

#[test]
fn test_condition_stores_kind_and_optional_year() {
    let (_dir, conn) = setup_test_db();
    let patient_id = seed_patient(&conn, "alice");

    add_condition(&conn, patient_id, "Asthma", ConditionKind::Chronic, Some(2015)).unwrap();
    add_condition(&conn, patient_id, "Sprained ankle", ConditionKind::Acute, None).unwrap();

    let conditions = list_conditions(&conn, patient_id).unwrap();
    assert_eq!(conditions.len(), 2);
    assert_eq!(conditions[0].kind, "chronic");
    assert_eq!(conditions[0].diagnosed_year, Some(2015));
    assert_eq!(conditions[1].diagnosed_year, None);
}

#[test]
fn test_document_records_store_kind_and_url() {
    let (_dir, conn) = setup_test_db();
    let patient_id = seed_patient(&conn, "alice");

    add_document(
        &conn,
        patient_id,
        "Blood panel",
        DocumentKind::LabReport,
        "/uploads/abcd1234-panel.pdf",
    )
    .unwrap();

    let docs = list_documents(&conn, patient_id).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].kind, "lab_report");
    assert_eq!(docs[0].url, "/uploads/abcd1234-panel.pdf");

    assert!(delete_document(&conn, patient_id, docs[0].id).unwrap());
    assert!(list_documents(&conn, patient_id).unwrap().is_empty());
}

#[test]
fn test_blood_type_updates_in_place() {
    let (_dir, conn) = setup_test_db();
    let patient_id = seed_patient(&conn, "alice");

    assert!(is_valid_blood_type("O-"));
    assert!(!is_valid_blood_type("Z+"));

    user::update_blood_type(&conn, patient_id, "O-").expect("Update failed");
    let account = user::find_by_id(&conn, patient_id).unwrap().unwrap();
    assert_eq!(account.blood_type, "O-");

    user::update_blood_type(&conn, patient_id, "AB+").expect("Update failed");
    let account = user::find_by_id(&conn, patient_id).unwrap().unwrap();
    assert_eq!(account.blood_type, "AB+");
}

#[test]
fn test_lists_are_per_patient() {
    let (_dir, conn) = setup_test_db();
    let alice = seed_patient(&conn, "alice");
    let bob = seed_patient(&conn, "bob");

    add_allergy(&conn, alice, "Penicillin", Severity::Moderate, "").unwrap();
    add_allergy(&conn, bob, "Latex", Severity::Mild, "").unwrap();

    let alice_allergies = list_allergies(&conn, alice).unwrap();
    assert_eq!(alice_allergies.len(), 1);
    assert_eq!(alice_allergies[0].name, "Penicillin");

    let bob_allergies = list_allergies(&conn, bob).unwrap();
    assert_eq!(bob_allergies.len(), 1);
    assert_eq!(bob_allergies[0].name, "Latex");
}

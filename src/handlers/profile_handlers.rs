use std::path::PathBuf;

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use actix_session::Session;
use actix_web::{HttpResponse, web};
use rand::Rng;
use serde::Deserialize;

use crate::auth::session::require_patient;
use crate::auth::{csrf, validate};
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::models::emergency::{
    self, BLOOD_TYPES, ConditionKind, DocumentKind, Severity,
};
use crate::models::user;
use crate::templates_structs::{PageContext, ProfileTemplate};

/// Directory where uploaded documents land. Files in it are served
/// read-only under /uploads, which is the URL stored on the record.
#[derive(Debug, Clone)]
pub struct UploadDir(pub PathBuf);

#[derive(Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub relationship: String,
    pub phone: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct AllergyForm {
    pub name: String,
    pub severity: String,
    pub reaction: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct MedicationForm {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct ConditionForm {
    pub name: String,
    pub kind: String,
    pub diagnosed_year: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct BloodTypeForm {
    pub blood_type: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

#[derive(MultipartForm)]
pub struct DocumentUploadForm {
    #[multipart(limit = "10MB")]
    pub file: TempFile,
    pub title: Text<String>,
    pub kind: Text<String>,
    pub csrf_token: Text<String>,
}

fn render_profile(
    conn: &rusqlite::Connection,
    session: &Session,
    patient_id: i64,
    errors: Vec<String>,
) -> Result<HttpResponse, AppError> {
    let account = user::find_by_id(conn, patient_id)?.ok_or(AppError::NotFound)?;
    let ctx = PageContext::build(session)?;
    render(ProfileTemplate {
        ctx,
        contacts: emergency::list_contacts(conn, patient_id)?,
        allergies: emergency::list_allergies(conn, patient_id)?,
        medications: emergency::list_medications(conn, patient_id)?,
        conditions: emergency::list_conditions(conn, patient_id)?,
        documents: emergency::list_documents(conn, patient_id)?,
        blood_type: account.blood_type,
        blood_types: &BLOOD_TYPES,
        document_kinds: &DocumentKind::ALL,
        errors,
    })
}

fn redirect_profile() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", "/profile"))
        .finish()
}

/// GET /profile
pub async fn index(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let patient_id = require_patient(&session)?;
    let conn = pool.get()?;
    render_profile(&conn, &session, patient_id, vec![])
}

/// POST /profile/contacts
pub async fn add_contact(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Form<ContactForm>,
) -> Result<HttpResponse, AppError> {
    let patient_id = require_patient(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let conn = pool.get()?;

    let mut errors = vec![];
    if let Some(e) = validate::validate_required(&form.name, "Contact name", 100) {
        errors.push(e);
    }
    if let Some(e) = validate::validate_optional(&form.relationship, "Relationship", 50) {
        errors.push(e);
    }
    let phone = match emergency::normalize_phone(&form.phone) {
        Some(p) => p,
        None => {
            errors.push("Phone must be a 10-digit US number".to_string());
            String::new()
        }
    };

    if !errors.is_empty() {
        return render_profile(&conn, &session, patient_id, errors);
    }

    emergency::add_contact(
        &conn,
        patient_id,
        form.name.trim(),
        form.relationship.trim(),
        &phone,
    )?;
    let _ = session.insert("flash", "Emergency contact added");
    Ok(redirect_profile())
}

/// POST /profile/contacts/{id}/delete
pub async fn delete_contact(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    let patient_id = require_patient(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let conn = pool.get()?;
    if emergency::delete_contact(&conn, patient_id, path.into_inner())? {
        let _ = session.insert("flash", "Emergency contact removed");
    }
    Ok(redirect_profile())
}

/// POST /profile/allergies
pub async fn add_allergy(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Form<AllergyForm>,
) -> Result<HttpResponse, AppError> {
    let patient_id = require_patient(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let conn = pool.get()?;

    let mut errors = vec![];
    if let Some(e) = validate::validate_required(&form.name, "Allergy name", 100) {
        errors.push(e);
    }
    let severity = match Severity::parse(form.severity.trim()) {
        Some(s) => s,
        None => {
            errors.push("Severity must be mild, moderate, or severe".to_string());
            Severity::Mild
        }
    };
    if let Some(e) = validate::validate_optional(&form.reaction, "Reaction", 200) {
        errors.push(e);
    }

    if !errors.is_empty() {
        return render_profile(&conn, &session, patient_id, errors);
    }

    emergency::add_allergy(&conn, patient_id, form.name.trim(), severity, form.reaction.trim())?;
    let _ = session.insert("flash", "Allergy added");
    Ok(redirect_profile())
}

/// POST /profile/allergies/{id}/delete
pub async fn delete_allergy(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    let patient_id = require_patient(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let conn = pool.get()?;
    if emergency::delete_allergy(&conn, patient_id, path.into_inner())? {
        let _ = session.insert("flash", "Allergy removed");
    }
    Ok(redirect_profile())
}

/// POST /profile/medications
pub async fn add_medication(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Form<MedicationForm>,
) -> Result<HttpResponse, AppError> {
    let patient_id = require_patient(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let conn = pool.get()?;

    let mut errors = vec![];
    if let Some(e) = validate::validate_required(&form.name, "Medication name", 100) {
        errors.push(e);
    }
    if let Some(e) = validate::validate_required(&form.dosage, "Dosage", 50) {
        errors.push(e);
    }
    if let Some(e) = validate::validate_optional(&form.frequency, "Frequency", 50) {
        errors.push(e);
    }

    if !errors.is_empty() {
        return render_profile(&conn, &session, patient_id, errors);
    }

    emergency::add_medication(
        &conn,
        patient_id,
        form.name.trim(),
        form.dosage.trim(),
        form.frequency.trim(),
    )?;
    let _ = session.insert("flash", "Medication added");
    Ok(redirect_profile())
}

/// POST /profile/medications/{id}/delete
pub async fn delete_medication(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    let patient_id = require_patient(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let conn = pool.get()?;
    if emergency::delete_medication(&conn, patient_id, path.into_inner())? {
        let _ = session.insert("flash", "Medication removed");
    }
    Ok(redirect_profile())
}

/// POST /profile/conditions
pub async fn add_condition(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Form<ConditionForm>,
) -> Result<HttpResponse, AppError> {
    let patient_id = require_patient(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let conn = pool.get()?;

    let mut errors = vec![];
    if let Some(e) = validate::validate_required(&form.name, "Condition name", 100) {
        errors.push(e);
    }
    let kind = match ConditionKind::parse(form.kind.trim()) {
        Some(k) => k,
        None => {
            errors.push("Condition type must be acute, chronic, or hereditary".to_string());
            ConditionKind::Acute
        }
    };
    let diagnosed_year = match form.diagnosed_year.trim() {
        "" => None,
        s => match s.parse::<i64>() {
            Ok(y) if (1900..=2100).contains(&y) => Some(y),
            _ => {
                errors.push("Diagnosed year must be a four-digit year".to_string());
                None
            }
        },
    };

    if !errors.is_empty() {
        return render_profile(&conn, &session, patient_id, errors);
    }

    emergency::add_condition(&conn, patient_id, form.name.trim(), kind, diagnosed_year)?;
    let _ = session.insert("flash", "Condition added");
    Ok(redirect_profile())
}

/// POST /profile/conditions/{id}/delete
pub async fn delete_condition(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    let patient_id = require_patient(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let conn = pool.get()?;
    if emergency::delete_condition(&conn, patient_id, path.into_inner())? {
        let _ = session.insert("flash", "Condition removed");
    }
    Ok(redirect_profile())
}

/// POST /profile/blood-type
pub async fn update_blood_type(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Form<BloodTypeForm>,
) -> Result<HttpResponse, AppError> {
    let patient_id = require_patient(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let conn = pool.get()?;

    let blood_type = form.blood_type.trim();
    if !emergency::is_valid_blood_type(blood_type) {
        return render_profile(
            &conn,
            &session,
            patient_id,
            vec!["Choose a valid blood type".to_string()],
        );
    }

    user::update_blood_type(&conn, patient_id, blood_type)?;
    let _ = session.insert("flash", "Blood type updated");
    Ok(redirect_profile())
}

/// Keep only filename characters that are safe to write to disk.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// POST /profile/documents (multipart)
pub async fn upload_document(
    pool: web::Data<DbPool>,
    session: Session,
    upload_dir: web::Data<UploadDir>,
    MultipartForm(form): MultipartForm<DocumentUploadForm>,
) -> Result<HttpResponse, AppError> {
    let patient_id = require_patient(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let conn = pool.get()?;

    let mut errors = vec![];
    if let Some(e) = validate::validate_required(&form.title, "Document title", 100) {
        errors.push(e);
    }
    let kind = match DocumentKind::parse(form.kind.trim()) {
        Some(k) => k,
        None => {
            errors.push("Choose a document type".to_string());
            DocumentKind::Other
        }
    };
    let original_name = form.file.file_name.clone().unwrap_or_default();
    if form.file.size == 0 || original_name.is_empty() {
        errors.push("A file is required".to_string());
    }

    if !errors.is_empty() {
        return render_profile(&conn, &session, patient_id, errors);
    }

    // Random prefix keeps uploads with the same name from clobbering
    // each other.
    let prefix: [u8; 4] = rand::rng().random();
    let stored_name = format!("{}-{}", hex::encode(prefix), sanitize_filename(&original_name));
    let dest = upload_dir.0.join(&stored_name);

    std::fs::copy(form.file.file.path(), &dest).map_err(|e| {
        log::error!("Failed to store upload '{stored_name}': {e}");
        AppError::Io(e)
    })?;

    let url = format!("/uploads/{stored_name}");
    emergency::add_document(&conn, patient_id, form.title.trim(), kind, &url)?;
    let _ = session.insert("flash", "Document uploaded");
    Ok(redirect_profile())
}

/// POST /profile/documents/{id}/delete
pub async fn delete_document(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    let patient_id = require_patient(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let conn = pool.get()?;
    if emergency::delete_document(&conn, patient_id, path.into_inner())? {
        let _ = session.insert("flash", "Document removed");
    }
    Ok(redirect_profile())
}

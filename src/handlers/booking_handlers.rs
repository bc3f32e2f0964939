use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::auth::csrf;
use crate::auth::session::require_patient;
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::models::booking::{
    self, BookingDraft, DURATION_CHOICES, NewBooking, PaymentMethod, ServiceKind, WizardStep,
};
use crate::models::{provider, user};
use crate::templates_structs::{
    BookingConfirmTemplate, BookingDoneTemplate, BookingDurationTemplate, BookingPackageTemplate,
    PageContext,
};

const DRAFT_KEY: &str = "booking_draft";

fn load_draft(session: &Session) -> Option<BookingDraft> {
    session.get::<BookingDraft>(DRAFT_KEY).unwrap_or(None)
}

fn save_draft(session: &Session, draft: &BookingDraft) -> Result<(), AppError> {
    session
        .insert(DRAFT_KEY, draft)
        .map_err(|e| AppError::Session(format!("Failed to store booking draft: {e}")))
}

fn clear_draft(session: &Session) {
    session.remove(DRAFT_KEY);
}

fn redirect(to: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", to.to_string()))
        .finish()
}

fn step_url(draft: &BookingDraft, step: WizardStep) -> String {
    match step {
        WizardStep::Duration => format!("/book/{}/duration", draft.provider_id),
        WizardStep::Package => "/book/package".to_string(),
        WizardStep::Confirm => "/book/confirm".to_string(),
    }
}

/// Wizard gate. A screen is served only when every earlier screen has
/// been completed; otherwise the user lands on the earliest incomplete
/// one. Without any draft there is nothing to resume, so back to the
/// catalog.
fn guard(session: &Session, step: WizardStep) -> Result<BookingDraft, HttpResponse> {
    let Some(draft) = load_draft(session) else {
        return Err(redirect("/providers"));
    };
    if !draft.can_enter(step) {
        let back = step_url(&draft, draft.next_step());
        return Err(redirect(&back));
    }
    Ok(draft)
}

#[derive(Deserialize)]
pub struct DurationForm {
    pub duration: String,
    pub date: String,
    pub time: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct PackageForm {
    pub service: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct ConfirmForm {
    pub payment_method: String,
    pub problem: String,
    pub csrf_token: String,
}

/// GET /book/{provider_id}/duration
/// Entry point of the wizard. A draft for a different provider is
/// discarded; re-entering the same wizard keeps accumulated data.
pub async fn duration_form(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_patient(&session)?;
    let provider_id = path.into_inner();

    let conn = pool.get()?;
    let Some(p) = provider::find_by_id(&conn, provider_id)? else {
        return Err(AppError::NotFound);
    };

    let draft = match load_draft(&session) {
        Some(d) if d.provider_id == provider_id => d,
        _ => BookingDraft::start(provider_id),
    };
    save_draft(&session, &draft)?;

    let ctx = PageContext::build(&session)?;
    render(BookingDurationTemplate {
        ctx,
        provider: p,
        durations: &DURATION_CHOICES,
        errors: vec![],
    })
}

/// POST /book/{provider_id}/duration
pub async fn duration_submit(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<DurationForm>,
) -> Result<HttpResponse, AppError> {
    require_patient(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let provider_id = path.into_inner();

    let conn = pool.get()?;
    let Some(p) = provider::find_by_id(&conn, provider_id)? else {
        return Err(AppError::NotFound);
    };

    let mut draft = match load_draft(&session) {
        Some(d) if d.provider_id == provider_id => d,
        _ => BookingDraft::start(provider_id),
    };

    let mut errors = vec![];

    let duration = form.duration.trim().parse::<i64>().unwrap_or(0);
    if !booking::is_valid_duration(duration) {
        errors.push("Choose one of the offered durations".to_string());
    }

    let date = match NaiveDate::parse_from_str(form.date.trim(), "%Y-%m-%d") {
        Ok(d) if d < Local::now().date_naive() => {
            errors.push("Appointment date cannot be in the past".to_string());
            None
        }
        Ok(d) => Some(d),
        Err(_) => {
            errors.push("Appointment date is required (YYYY-MM-DD)".to_string());
            None
        }
    };

    let time = match NaiveTime::parse_from_str(form.time.trim(), "%H:%M") {
        Ok(t) => Some(t),
        Err(_) => {
            errors.push("Appointment time is required (HH:MM)".to_string());
            None
        }
    };

    if !errors.is_empty() {
        let ctx = PageContext::build(&session)?;
        return render(BookingDurationTemplate {
            ctx,
            provider: p,
            durations: &DURATION_CHOICES,
            errors,
        });
    }

    draft.duration_minutes = Some(duration);
    draft.appointment_date = date.map(|d| d.format("%Y-%m-%d").to_string());
    draft.appointment_time = time.map(|t| t.format("%H:%M").to_string());
    save_draft(&session, &draft)?;

    Ok(redirect("/book/package"))
}

/// GET /book/package
pub async fn package_form(
    pool: web::Data<DbPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_patient(&session)?;
    let draft = match guard(&session, WizardStep::Package) {
        Ok(d) => d,
        Err(resp) => return Ok(resp),
    };

    let conn = pool.get()?;
    let Some(p) = provider::find_by_id(&conn, draft.provider_id)? else {
        clear_draft(&session);
        return Ok(redirect("/providers"));
    };

    let ctx = PageContext::build(&session)?;
    render(BookingPackageTemplate {
        ctx,
        provider: p,
        packages: &ServiceKind::ALL,
        duration_minutes: draft.duration_minutes.unwrap_or(0),
        errors: vec![],
    })
}

/// POST /book/package
pub async fn package_submit(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Form<PackageForm>,
) -> Result<HttpResponse, AppError> {
    require_patient(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let mut draft = match guard(&session, WizardStep::Package) {
        Ok(d) => d,
        Err(resp) => return Ok(resp),
    };

    let Some(service) = ServiceKind::parse(form.service.trim()) else {
        let conn = pool.get()?;
        let Some(p) = provider::find_by_id(&conn, draft.provider_id)? else {
            clear_draft(&session);
            return Ok(redirect("/providers"));
        };
        let ctx = PageContext::build(&session)?;
        return render(BookingPackageTemplate {
            ctx,
            provider: p,
            packages: &ServiceKind::ALL,
            duration_minutes: draft.duration_minutes.unwrap_or(0),
            errors: vec!["Choose one of the offered packages".to_string()],
        });
    };

    draft.service = Some(service);
    save_draft(&session, &draft)?;

    Ok(redirect("/book/confirm"))
}

/// Flatten a confirm-ready draft into the ConfirmDetails template.
fn render_confirm(
    conn: &rusqlite::Connection,
    session: &Session,
    draft: &BookingDraft,
    patient_id: i64,
    problem: String,
    error: Option<String>,
) -> Result<HttpResponse, AppError> {
    let p = provider::find_by_id(conn, draft.provider_id)?.ok_or(AppError::NotFound)?;
    let patient = user::find_by_id(conn, patient_id)?.ok_or(AppError::NotFound)?;
    let service = draft
        .service
        .ok_or_else(|| AppError::Session("Booking draft missing package".to_string()))?;

    let ctx = PageContext::build(session)?;
    render(BookingConfirmTemplate {
        ctx,
        provider: p,
        patient,
        service_label: service.label().to_string(),
        price: service.price(),
        duration_minutes: draft.duration_minutes.unwrap_or(0),
        appointment_date: draft.appointment_date.clone().unwrap_or_default(),
        appointment_time: draft.appointment_time.clone().unwrap_or_default(),
        problem,
        error,
    })
}

/// GET /book/confirm
pub async fn confirm_form(
    pool: web::Data<DbPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let patient_id = require_patient(&session)?;
    let draft = match guard(&session, WizardStep::Confirm) {
        Ok(d) => d,
        Err(resp) => return Ok(resp),
    };

    let conn = pool.get()?;
    render_confirm(&conn, &session, &draft, patient_id, String::new(), None)
}

/// POST /book/confirm ("Book Now")
/// The only place a booking reference comes into existence. An insert
/// failure feeds back into ConfirmDetails with the draft intact.
pub async fn confirm_submit(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Form<ConfirmForm>,
) -> Result<HttpResponse, AppError> {
    let patient_id = require_patient(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let draft = match guard(&session, WizardStep::Confirm) {
        Ok(d) => d,
        Err(resp) => return Ok(resp),
    };

    let conn = pool.get()?;

    let payment = PaymentMethod::parse(form.payment_method.trim());
    let problem = form.problem.trim().to_string();

    let mut errors = vec![];
    if payment.is_none() {
        errors.push("Choose a payment method");
    }
    if problem.is_empty() {
        errors.push("Describe the problem you want to discuss");
    }
    if let Some(msg) = errors.first() {
        return render_confirm(
            &conn,
            &session,
            &draft,
            patient_id,
            problem,
            Some(msg.to_string()),
        );
    }

    let service = draft
        .service
        .ok_or_else(|| AppError::Session("Booking draft missing package".to_string()))?;
    let payment_method =
        payment.ok_or_else(|| AppError::Session("Payment method missing".to_string()))?;

    let new = NewBooking {
        patient_id,
        provider_id: draft.provider_id,
        service,
        duration_minutes: draft.duration_minutes.unwrap_or(0),
        price: service.price(),
        appointment_date: draft.appointment_date.clone().unwrap_or_default(),
        appointment_time: draft.appointment_time.clone().unwrap_or_default(),
        problem: problem.clone(),
        payment_method,
    };

    match booking::create(&conn, &new) {
        Ok(reference) => {
            clear_draft(&session);
            let p = provider::find_by_id(&conn, new.provider_id)?.ok_or(AppError::NotFound)?;
            let ctx = PageContext::build(&session)?;
            render(BookingDoneTemplate {
                ctx,
                reference,
                provider: p,
                service_label: service.label().to_string(),
                price: new.price,
                duration_minutes: new.duration_minutes,
                appointment_date: new.appointment_date.clone(),
                appointment_time: new.appointment_time.clone(),
            })
        }
        Err(e) => {
            log::error!("Booking insert failed: {e}");
            render_confirm(
                &conn,
                &session,
                &draft,
                patient_id,
                problem,
                Some("Could not complete your booking. Please try again.".to_string()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Where an out-of-order request lands: always the earliest
    // incomplete step of the current draft.
    #[test]
    fn test_resume_url_follows_earliest_incomplete_step() {
        let mut draft = BookingDraft::start(7);
        assert_eq!(step_url(&draft, draft.next_step()), "/book/7/duration");

        draft.duration_minutes = Some(30);
        assert_eq!(
            step_url(&draft, draft.next_step()),
            "/book/7/duration",
            "duration step is incomplete until date and time are set"
        );

        draft.appointment_date = Some("2026-09-15".to_string());
        draft.appointment_time = Some("10:00".to_string());
        assert_eq!(step_url(&draft, draft.next_step()), "/book/package");

        draft.service = Some(ServiceKind::Video);
        assert_eq!(step_url(&draft, draft.next_step()), "/book/confirm");
    }

    #[test]
    fn test_step_urls_carry_provider_only_for_duration() {
        let draft = BookingDraft::start(42);
        assert_eq!(step_url(&draft, WizardStep::Duration), "/book/42/duration");
        assert_eq!(step_url(&draft, WizardStep::Package), "/book/package");
        assert_eq!(step_url(&draft, WizardStep::Confirm), "/book/confirm");
    }
}

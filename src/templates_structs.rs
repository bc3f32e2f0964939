use actix_session::Session;
use askama::Template;

use crate::auth::csrf;
use crate::auth::session::{UserType, get_user_type, get_username, take_flash};
use crate::errors::AppError;
use crate::models::booking::{PatientBooking, ProviderBooking, ServiceKind};
use crate::models::emergency::{
    Allergy, DocumentKind, EmergencyContact, MedicalCondition, MedicalDocument, Medication,
};
use crate::models::provider::Provider;
use crate::models::user::User;

pub const APP_NAME: &str = "CareLink";

/// Common context shared by all authenticated pages.
/// Templates access these as `ctx.username`, `ctx.csrf_token`, etc.
pub struct PageContext {
    pub username: String,
    pub avatar_initial: String,
    pub user_type: UserType,
    pub flash: Option<String>,
    pub app_name: String,
    pub csrf_token: String,
}

impl PageContext {
    pub fn build(session: &Session) -> Result<Self, AppError> {
        let username = get_username(session)
            .map_err(|e| AppError::Session(format!("Failed to get username: {}", e)))?;
        let user_type = get_user_type(session)
            .map_err(|e| AppError::Session(format!("Failed to get user type: {}", e)))?;
        let flash = take_flash(session);
        let csrf_token = csrf::get_or_create_token(session);
        let avatar_initial = username.chars().next().unwrap_or('?').to_uppercase().to_string();
        Ok(Self {
            username,
            avatar_initial,
            user_type,
            flash,
            app_name: APP_NAME.to_string(),
            csrf_token,
        })
    }

    pub fn is_patient(&self) -> bool {
        self.user_type == UserType::Patient
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub app_name: String,
    pub csrf_token: String,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub errors: Vec<String>,
    pub app_name: String,
    pub csrf_token: String,
}

#[derive(Template)]
#[template(path = "dashboard_patient.html")]
pub struct PatientDashboardTemplate {
    pub ctx: PageContext,
    pub bookings: Vec<PatientBooking>,
}

#[derive(Template)]
#[template(path = "dashboard_provider.html")]
pub struct ProviderDashboardTemplate {
    pub ctx: PageContext,
    pub bookings: Vec<ProviderBooking>,
    pub has_roster: bool,
}

#[derive(Template)]
#[template(path = "providers.html")]
pub struct ProviderListTemplate {
    pub ctx: PageContext,
    pub providers: Vec<Provider>,
    pub specialization: String,
    pub location: String,
    pub sort: String,
}

#[derive(Template)]
#[template(path = "provider_detail.html")]
pub struct ProviderDetailTemplate {
    pub ctx: PageContext,
    pub provider: Provider,
}

#[derive(Template)]
#[template(path = "book_duration.html")]
pub struct BookingDurationTemplate {
    pub ctx: PageContext,
    pub provider: Provider,
    pub durations: &'static [i64],
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "book_package.html")]
pub struct BookingPackageTemplate {
    pub ctx: PageContext,
    pub provider: Provider,
    pub packages: &'static [ServiceKind],
    pub duration_minutes: i64,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "book_confirm.html")]
pub struct BookingConfirmTemplate {
    pub ctx: PageContext,
    pub provider: Provider,
    pub patient: User,
    pub service_label: String,
    pub price: i64,
    pub duration_minutes: i64,
    pub appointment_date: String,
    pub appointment_time: String,
    pub problem: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "book_done.html")]
pub struct BookingDoneTemplate {
    pub ctx: PageContext,
    pub reference: String,
    pub provider: Provider,
    pub service_label: String,
    pub price: i64,
    pub duration_minutes: i64,
    pub appointment_date: String,
    pub appointment_time: String,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub ctx: PageContext,
    pub contacts: Vec<EmergencyContact>,
    pub allergies: Vec<Allergy>,
    pub medications: Vec<Medication>,
    pub conditions: Vec<MedicalCondition>,
    pub documents: Vec<MedicalDocument>,
    pub blood_type: String,
    pub blood_types: &'static [&'static str],
    pub document_kinds: &'static [DocumentKind],
    pub errors: Vec<String>,
}

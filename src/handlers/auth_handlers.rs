use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::session::UserType;
use crate::auth::{csrf, password, validate};
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::models::{provider, user};
use crate::templates_structs::{APP_NAME, LoginTemplate, SignupTemplate};

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub full_name: String,
    pub gender: String,
    pub age: String,
    pub user_type: String,
    pub specialization: Option<String>,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn signed_in(session: &Session) -> bool {
    session.get::<i64>("user_id").unwrap_or(None).is_some()
}

fn establish_session(session: &Session, u: &user::User) {
    let _ = session.insert("user_id", u.id);
    let _ = session.insert("username", &u.username);
    let _ = session.insert("user_type", u.user_type.as_str());
}

pub async fn login_page(session: Session) -> Result<HttpResponse, AppError> {
    if signed_in(&session) {
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/dashboard"))
            .finish());
    }
    let csrf_token = csrf::get_or_create_token(&session);
    let tmpl = LoginTemplate {
        error: None,
        app_name: APP_NAME.to_string(),
        csrf_token,
    };
    render(tmpl)
}

pub async fn login_submit(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let conn = pool.get()?;
    let found = user::find_by_username(&conn, form.username.trim())?;

    let verified = match &found {
        Some(u) => password::verify_password(&form.password, &u.password).unwrap_or(false),
        None => false,
    };

    if let (Some(u), true) = (found, verified) {
        establish_session(&session, &u);
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/dashboard"))
            .finish());
    }

    let csrf_token = csrf::get_or_create_token(&session);
    let tmpl = LoginTemplate {
        error: Some("Invalid username or password".to_string()),
        app_name: APP_NAME.to_string(),
        csrf_token,
    };
    render(tmpl)
}

pub async fn signup_page(session: Session) -> Result<HttpResponse, AppError> {
    if signed_in(&session) {
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/dashboard"))
            .finish());
    }
    let csrf_token = csrf::get_or_create_token(&session);
    let tmpl = SignupTemplate {
        errors: vec![],
        app_name: APP_NAME.to_string(),
        csrf_token,
    };
    render(tmpl)
}

pub async fn signup_submit(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Form<SignupForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let mut errors = vec![];
    if let Some(e) = validate::validate_username(&form.username) {
        errors.push(e);
    }
    if let Some(e) = validate::validate_password(&form.password) {
        errors.push(e);
    }
    if let Some(e) = validate::validate_required(&form.display_name, "Display name", 100) {
        errors.push(e);
    }
    if let Some(e) = validate::validate_required(&form.full_name, "Full name", 100) {
        errors.push(e);
    }
    if let Some(e) = validate::validate_required(&form.gender, "Gender", 30) {
        errors.push(e);
    }
    let age = match validate::validate_age(&form.age) {
        Ok(age) => age,
        Err(e) => {
            errors.push(e);
            0
        }
    };
    let user_type = match UserType::parse(form.user_type.trim()) {
        Some(t) => t,
        None => {
            errors.push("Account type must be patient or provider".to_string());
            UserType::Patient
        }
    };

    if !errors.is_empty() {
        let csrf_token = csrf::get_or_create_token(&session);
        let tmpl = SignupTemplate {
            errors,
            app_name: APP_NAME.to_string(),
            csrf_token,
        };
        return render(tmpl);
    }

    let hashed = password::hash_password(&form.password)
        .map_err(|_| AppError::Hash("Password hash error".to_string()))?;

    let new = user::NewUser {
        username: form.username.trim().to_string(),
        password: hashed,
        display_name: form.display_name.trim().to_string(),
        user_type,
        full_name: form.full_name.trim().to_string(),
        gender: form.gender.trim().to_string(),
        age,
    };

    let conn = pool.get()?;
    match user::create(&conn, &new) {
        Ok(user_id) => {
            // Provider accounts get a roster entry so they can be booked.
            if user_type == UserType::Provider {
                let specialization = form
                    .specialization
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or("General Practice");
                let provider_id = provider::create_basic(&conn, &new.display_name, specialization)?;
                user::link_provider(&conn, user_id, provider_id)?;
            }

            if let Some(u) = user::find_by_id(&conn, user_id)? {
                establish_session(&session, &u);
            }
            let _ = session.insert("flash", "Welcome to CareLink");
            Ok(HttpResponse::SeeOther()
                .insert_header(("Location", "/dashboard"))
                .finish())
        }
        Err(e) => {
            let msg = if e.to_string().contains("UNIQUE") {
                "Username already exists".to_string()
            } else {
                log::error!("Signup failed: {e}");
                "Could not create the account".to_string()
            };
            let csrf_token = csrf::get_or_create_token(&session);
            let tmpl = SignupTemplate {
                errors: vec![msg],
                app_name: APP_NAME.to_string(),
                csrf_token,
            };
            render(tmpl)
        }
    }
}

pub async fn logout(
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session.purge();
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/login"))
        .finish())
}

use actix_session::Session;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// The two account roles. Stored in the session as its `as_str` form and
/// matched exhaustively wherever the UI branches on role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Patient,
    Provider,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Patient => "patient",
            UserType::Provider => "provider",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "patient" => Some(UserType::Patient),
            "provider" => Some(UserType::Provider),
            _ => None,
        }
    }
}

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>("user_id").unwrap_or(None)
}

pub fn get_username(session: &Session) -> Result<String, String> {
    match session.get::<String>("username") {
        Ok(Some(username)) => Ok(username),
        Ok(None) => Err("No username in session".to_string()),
        Err(e) => Err(format!("Session error: {}", e)),
    }
}

pub fn get_user_type(session: &Session) -> Result<UserType, String> {
    match session.get::<String>("user_type") {
        Ok(Some(s)) => UserType::parse(&s).ok_or(format!("Unknown user type '{s}' in session")),
        Ok(None) => Err("No user type in session".to_string()),
        Err(e) => Err(format!("Session error: {}", e)),
    }
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>("flash").unwrap_or(None);
    if flash.is_some() {
        session.remove("flash");
    }
    flash
}

/// Require a signed-in patient; returns the patient's user id.
/// Provider accounts get a 403 — the wizard and the emergency profile
/// are patient-only surfaces.
pub fn require_patient(session: &Session) -> Result<i64, AppError> {
    let user_id = get_user_id(session)
        .ok_or_else(|| AppError::Session("User not logged in".to_string()))?;
    let user_type = get_user_type(session).map_err(AppError::Session)?;
    match user_type {
        UserType::Patient => Ok(user_id),
        UserType::Provider => Err(AppError::Forbidden),
    }
}

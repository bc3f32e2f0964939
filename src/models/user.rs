use rusqlite::{Connection, params};

use crate::auth::session::UserType;

/// A user account. `full_name`, `gender` and `age` form the patient
/// details block shown on the booking confirmation screen.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub user_type: UserType,
    pub full_name: String,
    pub gender: String,
    pub age: i64,
    pub blood_type: String,
    pub provider_id: Option<i64>,
    pub created_at: String,
}

const SELECT_USER: &str = "\
    SELECT id, username, password, display_name, user_type, full_name, gender, age, \
           blood_type, provider_id, created_at \
    FROM users";

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let type_str: String = row.get("user_type")?;
    let user_type = UserType::parse(&type_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown user_type '{type_str}'").into(),
        )
    })?;
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        password: row.get("password")?,
        display_name: row.get("display_name")?,
        user_type,
        full_name: row.get("full_name")?,
        gender: row.get("gender")?,
        age: row.get("age")?,
        blood_type: row.get("blood_type")?,
        provider_id: row.get("provider_id")?,
        created_at: row.get("created_at")?,
    })
}

pub struct NewUser {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub user_type: UserType,
    pub full_name: String,
    pub gender: String,
    pub age: i64,
}

pub fn create(conn: &Connection, new: &NewUser) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO users (username, password, display_name, user_type, full_name, gender, age) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            new.username,
            new.password,
            new.display_name,
            new.user_type.as_str(),
            new.full_name,
            new.gender,
            new.age
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_username(conn: &Connection, username: &str) -> rusqlite::Result<Option<User>> {
    let mut stmt = conn.prepare(&format!("{SELECT_USER} WHERE username = ?1"))?;
    let mut rows = stmt.query_map(params![username], row_to_user)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    let mut stmt = conn.prepare(&format!("{SELECT_USER} WHERE id = ?1"))?;
    let mut rows = stmt.query_map(params![id], row_to_user)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Blood type is the one emergency-profile field updated in place.
pub fn update_blood_type(conn: &Connection, id: i64, blood_type: &str) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE users SET blood_type = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%S','now') WHERE id = ?2",
        params![blood_type, id],
    )?;
    Ok(())
}

/// Attach a roster entry to a provider account.
pub fn link_provider(conn: &Connection, id: i64, provider_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE users SET provider_id = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%S','now') WHERE id = ?2",
        params![provider_id, id],
    )?;
    Ok(())
}

use rusqlite::{Connection, params};

/// Allergy severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mild" => Some(Severity::Mild),
            "moderate" => Some(Severity::Moderate),
            "severe" => Some(Severity::Severe),
            _ => None,
        }
    }
}

/// Condition classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    Acute,
    Chronic,
    Hereditary,
}

impl ConditionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::Acute => "acute",
            ConditionKind::Chronic => "chronic",
            ConditionKind::Hereditary => "hereditary",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "acute" => Some(ConditionKind::Acute),
            "chronic" => Some(ConditionKind::Chronic),
            "hereditary" => Some(ConditionKind::Hereditary),
            _ => None,
        }
    }
}

/// The fixed document-type list for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    LabReport,
    Prescription,
    Imaging,
    DischargeSummary,
    Insurance,
    Other,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 6] = [
        DocumentKind::LabReport,
        DocumentKind::Prescription,
        DocumentKind::Imaging,
        DocumentKind::DischargeSummary,
        DocumentKind::Insurance,
        DocumentKind::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::LabReport => "lab_report",
            DocumentKind::Prescription => "prescription",
            DocumentKind::Imaging => "imaging",
            DocumentKind::DischargeSummary => "discharge_summary",
            DocumentKind::Insurance => "insurance",
            DocumentKind::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "lab_report" => Some(DocumentKind::LabReport),
            "prescription" => Some(DocumentKind::Prescription),
            "imaging" => Some(DocumentKind::Imaging),
            "discharge_summary" => Some(DocumentKind::DischargeSummary),
            "insurance" => Some(DocumentKind::Insurance),
            "other" => Some(DocumentKind::Other),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::LabReport => "Lab Report",
            DocumentKind::Prescription => "Prescription",
            DocumentKind::Imaging => "Imaging",
            DocumentKind::DischargeSummary => "Discharge Summary",
            DocumentKind::Insurance => "Insurance",
            DocumentKind::Other => "Other",
        }
    }
}

pub const BLOOD_TYPES: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

pub fn is_valid_blood_type(s: &str) -> bool {
    BLOOD_TYPES.contains(&s)
}

/// Normalize a US phone number. Accepts "(555) 123-4567" or bare
/// "5551234567"; returns the formatted form, or None when the input is
/// not a 10-digit number.
pub fn normalize_phone(input: &str) -> Option<String> {
    let digits: String = input
        .chars()
        .filter(|c| !matches!(c, ' ' | '(' | ')' | '-'))
        .collect();
    if digits.len() != 10 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!(
        "({}) {}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..10]
    ))
}

#[derive(Debug, Clone)]
pub struct EmergencyContact {
    pub id: i64,
    pub name: String,
    pub relationship: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct Allergy {
    pub id: i64,
    pub name: String,
    pub severity: String,
    pub reaction: String,
}

#[derive(Debug, Clone)]
pub struct Medication {
    pub id: i64,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

#[derive(Debug, Clone)]
pub struct MedicalCondition {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub diagnosed_year: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct MedicalDocument {
    pub id: i64,
    pub title: String,
    pub kind: String,
    pub url: String,
}

// All rows are scoped to the owning patient: every query filters on
// patient_id, so one patient can never read or delete another's rows.

pub fn add_contact(
    conn: &Connection,
    patient_id: i64,
    name: &str,
    relationship: &str,
    phone: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO emergency_contacts (patient_id, name, relationship, phone) VALUES (?1, ?2, ?3, ?4)",
        params![patient_id, name, relationship, phone],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_contacts(conn: &Connection, patient_id: i64) -> rusqlite::Result<Vec<EmergencyContact>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, relationship, phone FROM emergency_contacts WHERE patient_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![patient_id], |row| {
            Ok(EmergencyContact {
                id: row.get("id")?,
                name: row.get("name")?,
                relationship: row.get("relationship")?,
                phone: row.get("phone")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn delete_contact(conn: &Connection, patient_id: i64, id: i64) -> rusqlite::Result<bool> {
    let n = conn.execute(
        "DELETE FROM emergency_contacts WHERE id = ?1 AND patient_id = ?2",
        params![id, patient_id],
    )?;
    Ok(n == 1)
}

pub fn add_allergy(
    conn: &Connection,
    patient_id: i64,
    name: &str,
    severity: Severity,
    reaction: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO allergies (patient_id, name, severity, reaction) VALUES (?1, ?2, ?3, ?4)",
        params![patient_id, name, severity.as_str(), reaction],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_allergies(conn: &Connection, patient_id: i64) -> rusqlite::Result<Vec<Allergy>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, severity, reaction FROM allergies WHERE patient_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![patient_id], |row| {
            Ok(Allergy {
                id: row.get("id")?,
                name: row.get("name")?,
                severity: row.get("severity")?,
                reaction: row.get("reaction")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn delete_allergy(conn: &Connection, patient_id: i64, id: i64) -> rusqlite::Result<bool> {
    let n = conn.execute(
        "DELETE FROM allergies WHERE id = ?1 AND patient_id = ?2",
        params![id, patient_id],
    )?;
    Ok(n == 1)
}

pub fn add_medication(
    conn: &Connection,
    patient_id: i64,
    name: &str,
    dosage: &str,
    frequency: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO medications (patient_id, name, dosage, frequency) VALUES (?1, ?2, ?3, ?4)",
        params![patient_id, name, dosage, frequency],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_medications(conn: &Connection, patient_id: i64) -> rusqlite::Result<Vec<Medication>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, dosage, frequency FROM medications WHERE patient_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![patient_id], |row| {
            Ok(Medication {
                id: row.get("id")?,
                name: row.get("name")?,
                dosage: row.get("dosage")?,
                frequency: row.get("frequency")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn delete_medication(conn: &Connection, patient_id: i64, id: i64) -> rusqlite::Result<bool> {
    let n = conn.execute(
        "DELETE FROM medications WHERE id = ?1 AND patient_id = ?2",
        params![id, patient_id],
    )?;
    Ok(n == 1)
}

pub fn add_condition(
    conn: &Connection,
    patient_id: i64,
    name: &str,
    kind: ConditionKind,
    diagnosed_year: Option<i64>,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO medical_conditions (patient_id, name, kind, diagnosed_year) VALUES (?1, ?2, ?3, ?4)",
        params![patient_id, name, kind.as_str(), diagnosed_year],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_conditions(conn: &Connection, patient_id: i64) -> rusqlite::Result<Vec<MedicalCondition>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, kind, diagnosed_year FROM medical_conditions WHERE patient_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![patient_id], |row| {
            Ok(MedicalCondition {
                id: row.get("id")?,
                name: row.get("name")?,
                kind: row.get("kind")?,
                diagnosed_year: row.get("diagnosed_year")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn delete_condition(conn: &Connection, patient_id: i64, id: i64) -> rusqlite::Result<bool> {
    let n = conn.execute(
        "DELETE FROM medical_conditions WHERE id = ?1 AND patient_id = ?2",
        params![id, patient_id],
    )?;
    Ok(n == 1)
}

pub fn add_document(
    conn: &Connection,
    patient_id: i64,
    title: &str,
    kind: DocumentKind,
    url: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO medical_documents (patient_id, title, kind, url) VALUES (?1, ?2, ?3, ?4)",
        params![patient_id, title, kind.as_str(), url],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_documents(conn: &Connection, patient_id: i64) -> rusqlite::Result<Vec<MedicalDocument>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, kind, url FROM medical_documents WHERE patient_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![patient_id], |row| {
            Ok(MedicalDocument {
                id: row.get("id")?,
                title: row.get("title")?,
                kind: row.get("kind")?,
                url: row.get("url")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn delete_document(conn: &Connection, patient_id: i64, id: i64) -> rusqlite::Result<bool> {
    let n = conn.execute(
        "DELETE FROM medical_documents WHERE id = ?1 AND patient_id = ?2",
        params![id, patient_id],
    )?;
    Ok(n == 1)
}

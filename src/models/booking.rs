use rand::Rng;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

/// The four service offerings. Price is fixed per kind, independent of
/// the chosen duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Messaging,
    Voice,
    Video,
    InPerson,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::Messaging,
        ServiceKind::Voice,
        ServiceKind::Video,
        ServiceKind::InPerson,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Messaging => "messaging",
            ServiceKind::Voice => "voice",
            ServiceKind::Video => "video",
            ServiceKind::InPerson => "in_person",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "messaging" => Some(ServiceKind::Messaging),
            "voice" => Some(ServiceKind::Voice),
            "video" => Some(ServiceKind::Video),
            "in_person" => Some(ServiceKind::InPerson),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServiceKind::Messaging => "Messaging",
            ServiceKind::Voice => "Voice Call",
            ServiceKind::Video => "Video Call",
            ServiceKind::InPerson => "In-Person Visit",
        }
    }

    /// Fixed price table, in whole dollars.
    pub fn price(&self) -> i64 {
        match self {
            ServiceKind::Messaging => 20,
            ServiceKind::Voice => 40,
            ServiceKind::Video => 60,
            ServiceKind::InPerson => 85,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
        }
    }
}

/// The closed set of appointment durations, in minutes.
pub const DURATION_CHOICES: [i64; 4] = [15, 30, 45, 60];

pub fn is_valid_duration(minutes: i64) -> bool {
    DURATION_CHOICES.contains(&minutes)
}

/// The wizard's screens, in forward order. Each is reachable only once
/// every earlier screen has been completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Duration,
    Package,
    Confirm,
}

/// The accumulating state of an in-progress booking. Held in the session
/// cookie while the wizard runs; discarded on confirmation or abandonment,
/// never partially persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDraft {
    pub provider_id: i64,
    pub duration_minutes: Option<i64>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub service: Option<ServiceKind>,
}

impl BookingDraft {
    /// Begin a fresh wizard for a provider, dropping whatever an earlier
    /// run may have accumulated.
    pub fn start(provider_id: i64) -> Self {
        BookingDraft {
            provider_id,
            duration_minutes: None,
            appointment_date: None,
            appointment_time: None,
            service: None,
        }
    }

    fn duration_complete(&self) -> bool {
        self.duration_minutes.is_some()
            && self.appointment_date.is_some()
            && self.appointment_time.is_some()
    }

    /// The earliest screen still missing data — where a redirect should land.
    pub fn next_step(&self) -> WizardStep {
        if !self.duration_complete() {
            WizardStep::Duration
        } else if self.service.is_none() {
            WizardStep::Package
        } else {
            WizardStep::Confirm
        }
    }

    /// Transition guard: a screen may be shown only if all prior screens
    /// are complete. Duration is always enterable.
    pub fn can_enter(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::Duration => true,
            WizardStep::Package => self.duration_complete(),
            WizardStep::Confirm => self.duration_complete() && self.service.is_some(),
        }
    }

    /// The price shown from the package step onward.
    pub fn price(&self) -> Option<i64> {
        self.service.map(|s| s.price())
    }
}

/// A booking ready to be written. Built from a complete draft plus the
/// fields entered on the confirmation screen.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub patient_id: i64,
    pub provider_id: i64,
    pub service: ServiceKind,
    pub duration_minutes: i64,
    pub price: i64,
    pub appointment_date: String,
    pub appointment_time: String,
    pub problem: String,
    pub payment_method: PaymentMethod,
}

/// Generate a booking reference like "BK-3f9a1c2e".
pub fn generate_reference() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 4] = rng.random();
    format!("BK-{}", hex::encode(bytes))
}

/// Insert a booking row and return its generated reference.
/// The reference exists only after this call succeeds.
pub fn create(conn: &Connection, new: &NewBooking) -> rusqlite::Result<String> {
    let reference = generate_reference();
    conn.execute(
        "INSERT INTO bookings (reference, patient_id, provider_id, service_kind, duration_minutes, \
                               price, appointment_date, appointment_time, problem, payment_method) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            reference,
            new.patient_id,
            new.provider_id,
            new.service.as_str(),
            new.duration_minutes,
            new.price,
            new.appointment_date,
            new.appointment_time,
            new.problem,
            new.payment_method.as_str()
        ],
    )?;
    Ok(reference)
}

/// A booking as shown on the patient dashboard.
#[derive(Debug, Clone)]
pub struct PatientBooking {
    pub reference: String,
    pub provider_name: String,
    pub service_label: String,
    pub duration_minutes: i64,
    pub price: i64,
    pub appointment_date: String,
    pub appointment_time: String,
}

pub fn find_by_patient(conn: &Connection, patient_id: i64) -> rusqlite::Result<Vec<PatientBooking>> {
    let mut stmt = conn.prepare(
        "SELECT b.reference, p.name AS provider_name, b.service_kind, b.duration_minutes, \
                b.price, b.appointment_date, b.appointment_time \
         FROM bookings b \
         JOIN providers p ON p.id = b.provider_id \
         WHERE b.patient_id = ?1 \
         ORDER BY b.id DESC",
    )?;
    let bookings = stmt
        .query_map(params![patient_id], |row| {
            let kind: String = row.get("service_kind")?;
            Ok(PatientBooking {
                reference: row.get("reference")?,
                provider_name: row.get("provider_name")?,
                service_label: ServiceKind::parse(&kind)
                    .map(|s| s.label().to_string())
                    .unwrap_or(kind),
                duration_minutes: row.get("duration_minutes")?,
                price: row.get("price")?,
                appointment_date: row.get("appointment_date")?,
                appointment_time: row.get("appointment_time")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(bookings)
}

/// A booking as shown on the provider dashboard.
#[derive(Debug, Clone)]
pub struct ProviderBooking {
    pub reference: String,
    pub patient_name: String,
    pub service_label: String,
    pub duration_minutes: i64,
    pub price: i64,
    pub appointment_date: String,
    pub appointment_time: String,
    pub problem: String,
}

pub fn find_by_provider(
    conn: &Connection,
    provider_id: i64,
) -> rusqlite::Result<Vec<ProviderBooking>> {
    let mut stmt = conn.prepare(
        "SELECT b.reference, u.full_name AS patient_name, b.service_kind, b.duration_minutes, \
                b.price, b.appointment_date, b.appointment_time, b.problem \
         FROM bookings b \
         JOIN users u ON u.id = b.patient_id \
         WHERE b.provider_id = ?1 \
         ORDER BY b.id DESC",
    )?;
    let bookings = stmt
        .query_map(params![provider_id], |row| {
            let kind: String = row.get("service_kind")?;
            Ok(ProviderBooking {
                reference: row.get("reference")?,
                patient_name: row.get("patient_name")?,
                service_label: ServiceKind::parse(&kind)
                    .map(|s| s.label().to_string())
                    .unwrap_or(kind),
                duration_minutes: row.get("duration_minutes")?,
                price: row.get("price")?,
                appointment_date: row.get("appointment_date")?,
                appointment_time: row.get("appointment_time")?,
                problem: row.get("problem")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(bookings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_draft_starts_at_duration() {
        let draft = BookingDraft::start(1);
        assert_eq!(draft.next_step(), WizardStep::Duration);
        assert!(draft.can_enter(WizardStep::Duration));
        assert!(!draft.can_enter(WizardStep::Package));
        assert!(!draft.can_enter(WizardStep::Confirm));
    }

    #[test]
    fn confirm_requires_package_selection() {
        let mut draft = BookingDraft::start(1);
        draft.duration_minutes = Some(30);
        draft.appointment_date = Some("2026-09-15".to_string());
        draft.appointment_time = Some("10:00".to_string());

        assert!(draft.can_enter(WizardStep::Package));
        assert!(!draft.can_enter(WizardStep::Confirm));

        draft.service = Some(ServiceKind::Messaging);
        assert!(draft.can_enter(WizardStep::Confirm));
        assert_eq!(draft.next_step(), WizardStep::Confirm);
    }

    #[test]
    fn price_follows_fixed_table_regardless_of_duration() {
        let mut draft = BookingDraft::start(1);
        draft.duration_minutes = Some(45);
        draft.service = Some(ServiceKind::Video);
        assert_eq!(draft.price(), Some(60));

        draft.duration_minutes = Some(15);
        assert_eq!(draft.price(), Some(60));
    }

    #[test]
    fn reference_format() {
        let r = generate_reference();
        assert!(r.starts_with("BK-"));
        assert_eq!(r.len(), 11);
    }

    #[test]
    fn duration_choices_are_closed() {
        assert!(is_valid_duration(30));
        assert!(!is_valid_duration(20));
        assert!(!is_valid_duration(0));
    }
}

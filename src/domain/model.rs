use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "🗓️",
            AppointmentStatus::Confirmed => "✅",
            AppointmentStatus::Cancelled => "❌",
            AppointmentStatus::Completed => "✔️",
        }
    }

    /// Whether the appointment still holds its slot.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Scheduled | AppointmentStatus::Confirmed
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.as_str();
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => write!(f, "{}{}", first.to_ascii_uppercase(), chars.as_str()),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    /// `YYYY-MM-DD HH:MM`, kept in ascending order.
    pub available_slots: Vec<String>,
    #[serde(default)]
    pub consultation_fee: f64,
}

impl Doctor {
    pub fn matches_specialty(&self, specialty: &str) -> bool {
        self.specialty
            .to_lowercase()
            .contains(&specialty.to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub patient_name: String,
    pub patient_phone: Option<String>,
    pub appointment_time: String,
    pub specialty: String,
    pub status: AppointmentStatus,
    pub consultation_fee: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePreference {
    Morning,
    Afternoon,
    Evening,
    /// Full slot or `HH:MM` fragment, matched by substring.
    Exact(String),
}

impl TimePreference {
    pub fn hours(&self) -> &'static [&'static str] {
        match self {
            TimePreference::Morning => &["09:00", "10:00", "11:00"],
            TimePreference::Afternoon => &["14:00", "15:00", "16:00"],
            TimePreference::Evening => &["17:00", "18:00"],
            TimePreference::Exact(_) => &[],
        }
    }

    pub fn matches(&self, slot: &str) -> bool {
        match self {
            TimePreference::Exact(fragment) => slot.contains(fragment.as_str()),
            period => period.hours().iter().any(|hour| slot.contains(hour)),
        }
    }
}

impl fmt::Display for TimePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimePreference::Morning => write!(f, "morning"),
            TimePreference::Afternoon => write!(f, "afternoon"),
            TimePreference::Evening => write!(f, "evening"),
            TimePreference::Exact(fragment) => write!(f, "{}", fragment),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoctorSearchRequest {
    pub specialty: Option<String>,
    pub preferred_time: Option<TimePreference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub patient_name: String,
    pub specialty: Option<String>,
    pub preferred_time: Option<TimePreference>,
    pub patient_phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentQuery {
    pub patient_name: Option<String>,
    pub appointment_id: Option<String>,
}

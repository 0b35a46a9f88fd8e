use crate::core::parser::{contains_word, MessageParser, ParsedMessage};
use crate::core::store::SharedStore;
use crate::domain::model::{Doctor, DoctorSearchRequest};
use crate::domain::ports::Agent;
use crate::utils::error::{AgentError, Result};
use async_trait::async_trait;

pub const DOCTOR_AGENT_NAME: &str = "Doctor Directory Agent";

const HELP: &str = "🏥 I'm the Doctor Directory Agent. I can:
• list doctors, optionally by specialty (e.g. \"find doctors cardiology\")
• show availability (e.g. \"slots for dr001\")
• reserve a slot (e.g. \"reserve dr001 2025-05-29 09:00\")";

#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryIntent {
    ListDoctors(DoctorSearchRequest),
    Slots { doctor_id: Option<String> },
    Reserve {
        doctor_id: Option<String>,
        slot: Option<String>,
    },
    Help,
}

impl DirectoryIntent {
    pub fn classify(message: &str, parsed: &ParsedMessage) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("reserve") {
            return DirectoryIntent::Reserve {
                doctor_id: parsed.doctor_id.clone(),
                slot: parsed.appointment_slot.clone(),
            };
        }

        let asks_for_slots = ["slot", "availability", "schedule", "available"]
            .iter()
            .any(|w| lower.contains(w));
        if asks_for_slots && parsed.doctor_id.is_some() {
            return DirectoryIntent::Slots {
                doctor_id: parsed.doctor_id.clone(),
            };
        }
        if lower.contains("slots for") || lower.contains("availability for") {
            return DirectoryIntent::Slots { doctor_id: None };
        }

        let mentions_doctors = lower.contains("doctor")
            || lower.contains("specialist")
            || ["list", "find", "show", "who"]
                .iter()
                .any(|w| contains_word(&lower, w));
        if mentions_doctors || parsed.specialty.is_some() {
            return DirectoryIntent::ListDoctors(DoctorSearchRequest {
                specialty: parsed.specialty.clone(),
                preferred_time: parsed.time_preference.clone(),
            });
        }

        DirectoryIntent::Help
    }
}

/// Answers questions about doctors, specialties and open slots.
pub struct DoctorDirectoryAgent {
    store: SharedStore,
}

impl DoctorDirectoryAgent {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list_doctors(&self, search: &DoctorSearchRequest) -> String {
        let doctors = self.store.read().await.list_doctors(search);
        format_doctor_list(search, &doctors)
    }

    pub async fn get_doctor_slots(&self, doctor_id: &str) -> String {
        let store = self.store.read().await;
        match store.doctor_slots(doctor_id) {
            Ok(doctor) if doctor.available_slots.is_empty() => {
                format!("No available slots for {}", doctor.name)
            }
            Ok(doctor) => format!(
                "Available slots for {}:\nSpecialty: {}\nConsultation Fee: ${}\nSlots: {}",
                doctor.name,
                doctor.specialty,
                format_fee(doctor.consultation_fee),
                doctor.available_slots.join(", ")
            ),
            Err(e) => e.to_string(),
        }
    }

    pub async fn reserve_slot(&self, doctor_id: &str, slot: &str) -> String {
        let result = self.store.write().await.reserve_slot(doctor_id, slot);
        match result {
            Ok(doctor) => {
                tracing::info!(doctor_id, slot, "slot reserved");
                format!(
                    "✅ Slot reserved successfully!\nDoctor: {} ({})\nTime: {}\nFee: ${}",
                    doctor.name,
                    doctor.specialty,
                    slot,
                    format_fee(doctor.consultation_fee)
                )
            }
            Err(AgentError::SlotUnavailable { .. }) => {
                "❌ Slot not available or doctor not found".to_string()
            }
            Err(e) => format!("❌ {}", e),
        }
    }
}

#[async_trait]
impl Agent for DoctorDirectoryAgent {
    fn name(&self) -> &'static str {
        DOCTOR_AGENT_NAME
    }

    async fn handle(&self, message: &str) -> Result<String> {
        let parsed = MessageParser::parse(message);
        let intent = DirectoryIntent::classify(message, &parsed);
        tracing::debug!(?intent, "doctor directory request");

        let reply = match intent {
            DirectoryIntent::ListDoctors(search) => self.list_doctors(&search).await,
            DirectoryIntent::Slots {
                doctor_id: Some(id),
            } => self.get_doctor_slots(&id).await,
            DirectoryIntent::Slots { doctor_id: None } => {
                "Please include a doctor ID, e.g. \"slots for dr001\"".to_string()
            }
            DirectoryIntent::Reserve {
                doctor_id: Some(id),
                slot: Some(slot),
            } => self.reserve_slot(&id, &slot).await,
            DirectoryIntent::Reserve { .. } => {
                "Please include a doctor ID and a slot, e.g. \"reserve dr001 2025-05-29 09:00\""
                    .to_string()
            }
            DirectoryIntent::Help => HELP.to_string(),
        };
        Ok(reply)
    }
}

/// Whole amounts keep one decimal (`150.0`); others print as-is (`120.5`).
pub(crate) fn format_fee(fee: f64) -> String {
    if fee.fract() == 0.0 {
        format!("{:.1}", fee)
    } else {
        format!("{}", fee)
    }
}

fn format_doctor_list(search: &DoctorSearchRequest, doctors: &[Doctor]) -> String {
    let specialty = search.specialty.as_deref();
    if doctors.is_empty() {
        return format!("No doctors found for {}", specialty.unwrap_or("any specialty"));
    }

    let mut response = match specialty {
        Some(s) => format!("Available doctors for {}:\n", s),
        None => "Available doctors:\n".to_string(),
    };
    for doc in doctors {
        let slots = if doc.available_slots.is_empty() {
            "No slots available".to_string()
        } else {
            doc.available_slots.join(", ")
        };
        response.push_str(&format!(
            "• {} (ID: {}, {}) - Fee: ${}\n  Available: {}\n",
            doc.name,
            doc.id,
            doc.specialty,
            format_fee(doc.consultation_fee),
            slots
        ));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::DataStore;

    fn agent() -> DoctorDirectoryAgent {
        DoctorDirectoryAgent::new(DataStore::with_seed_directory().into_shared())
    }

    #[test]
    fn test_classify_messages() {
        let classify = |m: &str| DirectoryIntent::classify(m, &MessageParser::parse(m));

        assert!(matches!(
            classify("list all doctors"),
            DirectoryIntent::ListDoctors(DoctorSearchRequest { specialty: None, .. })
        ));
        assert!(matches!(
            classify("find cardiologists"),
            DirectoryIntent::ListDoctors(DoctorSearchRequest { specialty: Some(_), .. })
        ));
        assert_eq!(
            classify("show slots for dr001"),
            DirectoryIntent::Slots {
                doctor_id: Some("dr001".to_string())
            }
        );
        assert!(matches!(
            classify("what doctors are available?"),
            DirectoryIntent::ListDoctors(_)
        ));
        assert_eq!(
            classify("reserve dr002 2025-05-29 11:00"),
            DirectoryIntent::Reserve {
                doctor_id: Some("dr002".to_string()),
                slot: Some("2025-05-29 11:00".to_string())
            }
        );
        assert_eq!(classify("hello"), DirectoryIntent::Help);
    }

    #[tokio::test]
    async fn test_list_doctors_by_specialty() {
        let reply = agent().handle("find doctors cardiology").await.unwrap();
        assert!(reply.starts_with("Available doctors for cardiology:"));
        assert!(reply.contains("• Dr. Sarah Johnson (ID: dr001, Cardiology) - Fee: $150.0"));
        assert!(!reply.contains("Dr. Michael Chen"));

        let none = agent().handle("find doctors neurology").await.unwrap();
        assert_eq!(none, "No doctors found for neurology");
    }

    #[tokio::test]
    async fn test_slots_and_unknown_doctor() {
        let reply = agent().handle("slots for dr002").await.unwrap();
        assert!(reply.contains("Available slots for Dr. Michael Chen:"));
        assert!(reply.contains("Slots: 2025-05-29 11:00, 2025-05-29 15:30, 2025-05-30 09:30"));

        let missing = agent().handle("slots for dr999").await.unwrap();
        assert_eq!(missing, "Doctor dr999 not found");
    }

    #[tokio::test]
    async fn test_reserve_removes_slot() {
        let agent = agent();
        let reply = agent.handle("reserve dr001 2025-05-29 09:00").await.unwrap();
        assert!(reply.starts_with("✅ Slot reserved successfully!"));

        let again = agent.handle("reserve dr001 2025-05-29 09:00").await.unwrap();
        assert_eq!(again, "❌ Slot not available or doctor not found");

        let slots = agent.handle("slots for dr001").await.unwrap();
        assert!(!slots.contains("2025-05-29 09:00"));
    }
}

use crate::core::doctor_agent::format_fee;
use crate::core::parser::{contains_word, MessageParser, ParsedMessage};
use crate::core::store::SharedStore;
use crate::domain::model::{Appointment, AppointmentQuery, BookingRequest};
use crate::domain::ports::Agent;
use crate::utils::error::{AgentError, Result};
use async_trait::async_trait;

pub const BOOKING_AGENT_NAME: &str = "Medical Booking Agent";

/// Frame used around booking confirmations and listings.
pub const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

const HELP: &str = "📅 I'm the Medical Booking Agent. I can:
• book appointments (e.g. \"book appointment for John Smith with cardiologist in the morning\")
• list appointments (e.g. \"list appointments for John\")
• cancel appointments (e.g. \"cancel appointment APT0001\")";

#[derive(Debug, Clone, PartialEq)]
pub enum BookingIntent {
    Book(Option<BookingRequest>),
    List(AppointmentQuery),
    Cancel { appointment_id: Option<String> },
    Help,
}

impl BookingIntent {
    pub fn classify(message: &str, parsed: &ParsedMessage) -> Self {
        let lower = message.to_lowercase();
        let mentions_appointment = lower.contains("appointment");

        if lower.contains("cancel") {
            return BookingIntent::Cancel {
                appointment_id: parsed.appointment_id.clone(),
            };
        }

        let wants_list = ["list", "show", "view", "see"]
            .iter()
            .any(|w| contains_word(&lower, w))
            || lower.contains("my appointments");
        if wants_list && mentions_appointment {
            return BookingIntent::List(AppointmentQuery {
                patient_name: parsed.patient_name.clone(),
                appointment_id: parsed.appointment_id.clone(),
            });
        }

        let wants_booking = contains_word(&lower, "book")
            || (mentions_appointment
                && (contains_word(&lower, "schedule") || contains_word(&lower, "make")));
        if wants_booking {
            let request = parsed.patient_name.clone().map(|patient_name| BookingRequest {
                patient_name,
                specialty: parsed.specialty.clone(),
                preferred_time: parsed.time_preference.clone(),
                patient_phone: parsed.patient_phone.clone(),
            });
            return BookingIntent::Book(request);
        }

        BookingIntent::Help
    }
}

/// Books, lists and cancels appointments against the shared store.
pub struct BookingAgent {
    store: SharedStore,
}

impl BookingAgent {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn book_appointment(&self, request: &BookingRequest) -> String {
        let result = self.store.write().await.book(request);
        match result {
            Ok(appointment) => {
                tracing::info!(
                    appointment_id = %appointment.id,
                    doctor = %appointment.doctor_name,
                    slot = %appointment.appointment_time,
                    "appointment booked"
                );
                format_confirmation(&appointment)
            }
            Err(e) => {
                tracing::debug!(error = %e, "booking rejected");
                format!("❌ {}", e)
            }
        }
    }

    pub async fn list_appointments(&self, query: &AppointmentQuery) -> String {
        let store = self.store.read().await;
        if !store.has_appointments() {
            return "📅 No appointments scheduled".to_string();
        }

        let appointments = store.appointments(query);
        if appointments.is_empty() {
            return match query.patient_name.as_deref() {
                Some(name) => format!("📅 No appointments found for {}", name),
                None => "📅 No appointments found".to_string(),
            };
        }

        let mut result = format!("📅 Scheduled Appointments:\n{}\n", RULE);
        for apt in &appointments {
            result.push_str(&format!(
                "{} {} | {}\n   👨‍⚕️ {} ({})\n   🕐 {} | 💰 ${}\n   📊 Status: {}\n",
                apt.status.emoji(),
                apt.id,
                apt.patient_name,
                apt.doctor_name,
                apt.specialty,
                apt.appointment_time,
                format_fee(apt.consultation_fee),
                apt.status
            ));
            if let Some(phone) = &apt.patient_phone {
                result.push_str(&format!("   📞 {}\n", phone));
            }
            result.push_str(RULE);
            result.push('\n');
        }
        result
    }

    pub async fn cancel_appointment(&self, appointment_id: &str) -> String {
        let result = self.store.write().await.cancel(appointment_id);
        match result {
            Ok(appointment) => {
                tracing::info!(appointment_id = %appointment.id, "appointment cancelled");
                format!(
                    "✅ Appointment {} has been cancelled successfully",
                    appointment.id
                )
            }
            Err(e @ AgentError::AlreadyCancelled { .. })
            | Err(e @ AgentError::AppointmentNotFound { .. }) => format!("❌ {}", e),
            Err(e) => format!("❌ Cancellation failed: {}", e),
        }
    }
}

#[async_trait]
impl Agent for BookingAgent {
    fn name(&self) -> &'static str {
        BOOKING_AGENT_NAME
    }

    fn health_label(&self) -> &'static str {
        "Booking Agent"
    }

    async fn handle(&self, message: &str) -> Result<String> {
        let parsed = MessageParser::parse(message);
        let intent = BookingIntent::classify(message, &parsed);
        tracing::debug!(?intent, "booking request");

        let reply = match intent {
            BookingIntent::Book(Some(request)) => self.book_appointment(&request).await,
            BookingIntent::Book(None) => {
                "❌ Please tell me the patient's name, e.g. \"book appointment for John Smith\""
                    .to_string()
            }
            BookingIntent::List(query) => self.list_appointments(&query).await,
            BookingIntent::Cancel {
                appointment_id: Some(id),
            } => self.cancel_appointment(&id).await,
            BookingIntent::Cancel {
                appointment_id: None,
            } => "❌ Please include the appointment ID, e.g. \"cancel appointment APT0001\""
                .to_string(),
            BookingIntent::Help => HELP.to_string(),
        };
        Ok(reply)
    }
}

fn format_confirmation(apt: &Appointment) -> String {
    format!(
        "✅ Appointment booked successfully!\n{rule}\n📋 Appointment ID: {}\n👤 Patient: {}\n👨‍⚕️ Doctor: {} ({})\n🕐 Time: {}\n💰 Consultation Fee: ${}\n📞 Contact: {}\n{rule}\nPlease arrive 15 minutes early.",
        apt.id,
        apt.patient_name,
        apt.doctor_name,
        apt.specialty,
        apt.appointment_time,
        format_fee(apt.consultation_fee),
        apt.patient_phone.as_deref().unwrap_or("Not provided"),
        rule = RULE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::DataStore;
    use crate::domain::model::TimePreference;

    fn agent() -> BookingAgent {
        BookingAgent::new(DataStore::with_seed_directory().into_shared())
    }

    #[test]
    fn test_classify_messages() {
        let classify = |m: &str| BookingIntent::classify(m, &MessageParser::parse(m));

        assert_eq!(
            classify("book appointment for John Smith with cardiologist"),
            BookingIntent::Book(Some(BookingRequest {
                patient_name: "John Smith".to_string(),
                specialty: Some("cardiology".to_string()),
                preferred_time: None,
                patient_phone: None,
            }))
        );
        assert_eq!(
            classify("list appointments for Sarah"),
            BookingIntent::List(AppointmentQuery {
                patient_name: Some("Sarah".to_string()),
                appointment_id: None,
            })
        );
        assert_eq!(
            classify("show all scheduled appointments"),
            BookingIntent::List(AppointmentQuery::default())
        );
        assert_eq!(
            classify("cancel appointment APT0001"),
            BookingIntent::Cancel {
                appointment_id: Some("APT0001".to_string())
            }
        );
        assert!(matches!(
            classify("book appointment for Ann with dermatology specialist"),
            BookingIntent::Book(Some(_))
        ));
        assert_eq!(classify("book appointment"), BookingIntent::Book(None));
        assert_eq!(classify("good morning"), BookingIntent::Help);
    }

    #[tokio::test]
    async fn test_book_list_cancel_flow() {
        let agent = agent();

        let empty = agent.handle("list all appointments").await.unwrap();
        assert_eq!(empty, "📅 No appointments scheduled");

        let booked = agent
            .handle("book appointment for John Smith with Cardiology specialist in the afternoon phone +1 555-123-4567")
            .await
            .unwrap();
        assert!(booked.starts_with("✅ Appointment booked successfully!"));
        assert!(booked.contains("📋 Appointment ID: APT0001"));
        assert!(booked.contains("👨‍⚕️ Doctor: Dr. Sarah Johnson (Cardiology)"));
        assert!(booked.contains("🕐 Time: 2025-05-29 14:00"));
        assert!(booked.contains("📞 Contact: +1 555-123-4567"));

        let listed = agent.handle("list appointments for john").await.unwrap();
        assert!(listed.contains("🗓️ APT0001 | John Smith"));
        assert!(listed.contains("📊 Status: Scheduled"));

        let nobody = agent.handle("list appointments for Maria").await.unwrap();
        assert_eq!(nobody, "📅 No appointments found for Maria");

        let cancelled = agent.handle("cancel appointment apt0001").await.unwrap();
        assert_eq!(cancelled, "✅ Appointment APT0001 has been cancelled successfully");

        let twice = agent.handle("cancel appointment APT0001").await.unwrap();
        assert_eq!(twice, "❌ Appointment APT0001 is already cancelled");

        let listed = agent.handle("show appointments").await.unwrap();
        assert!(listed.contains("❌ APT0001 | John Smith"));
        assert!(listed.contains("📊 Status: Cancelled"));
    }

    #[tokio::test]
    async fn test_names_do_not_pick_a_specialty() {
        let agent = agent();
        let booked = agent
            .handle("book appointment for Jo Skinner")
            .await
            .unwrap();
        assert!(booked.contains("👤 Patient: Jo Skinner"));
        assert!(booked.contains("👨‍⚕️ Doctor: Dr. Sarah Johnson (Cardiology)"));

        let booked = agent
            .handle("book appointment for José García")
            .await
            .unwrap();
        assert!(booked.contains("👤 Patient: José García"));
    }

    #[tokio::test]
    async fn test_booking_failures_are_reported_as_text() {
        let agent = agent();
        let reply = agent
            .book_appointment(&BookingRequest {
                patient_name: "Ann".to_string(),
                specialty: Some("neurology".to_string()),
                preferred_time: Some(TimePreference::Morning),
                patient_phone: None,
            })
            .await;
        assert_eq!(reply, "❌ No doctors available for neurology");

        let missing = agent.handle("cancel appointment APT0042").await.unwrap();
        assert_eq!(missing, "❌ Appointment APT0042 not found");
    }
}

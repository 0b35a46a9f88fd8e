pub mod booking_agent;
pub mod doctor_agent;
pub mod parser;
pub mod store;

pub use crate::domain::model::{
    Appointment, AppointmentQuery, AppointmentStatus, BookingRequest, Doctor, DoctorSearchRequest,
    TimePreference,
};
pub use crate::domain::ports::{Agent, AgentEndpoints};
pub use crate::utils::error::Result;
pub use booking_agent::BookingAgent;
pub use doctor_agent::DoctorDirectoryAgent;
pub use store::{DataStore, SharedStore};

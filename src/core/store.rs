use crate::domain::model::{
    Appointment, AppointmentQuery, AppointmentStatus, BookingRequest, Doctor, DoctorSearchRequest,
};
use crate::utils::error::{AgentError, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Store handle shared by every agent served from one process.
pub type SharedStore = Arc<RwLock<DataStore>>;

/// In-memory doctor directory and appointment book.
#[derive(Debug, Clone)]
pub struct DataStore {
    doctors: Vec<Doctor>,
    appointments: Vec<Appointment>,
    appointment_counter: u32,
}

impl DataStore {
    pub fn new(mut doctors: Vec<Doctor>) -> Self {
        for doctor in &mut doctors {
            doctor.available_slots.sort();
            doctor.available_slots.dedup();
        }
        Self {
            doctors,
            appointments: Vec::new(),
            appointment_counter: 1,
        }
    }

    pub fn with_seed_directory() -> Self {
        Self::new(seed_doctors())
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    /// Doctors matching the search. A time preference drops doctors with no
    /// matching slot and narrows the slots shown for the rest.
    pub fn list_doctors(&self, search: &DoctorSearchRequest) -> Vec<Doctor> {
        self.doctors
            .iter()
            .filter(|d| {
                search
                    .specialty
                    .as_deref()
                    .map_or(true, |s| d.matches_specialty(s))
            })
            .filter_map(|d| match &search.preferred_time {
                None => Some(d.clone()),
                Some(pref) => {
                    let slots: Vec<String> = d
                        .available_slots
                        .iter()
                        .filter(|slot| pref.matches(slot))
                        .cloned()
                        .collect();
                    if slots.is_empty() {
                        None
                    } else {
                        Some(Doctor {
                            available_slots: slots,
                            ..d.clone()
                        })
                    }
                }
            })
            .collect()
    }

    pub fn doctor_slots(&self, doctor_id: &str) -> Result<&Doctor> {
        self.doctors
            .iter()
            .find(|d| d.id == doctor_id)
            .ok_or_else(|| AgentError::DoctorNotFound {
                doctor_id: doctor_id.to_string(),
            })
    }

    /// Takes `slot` off the doctor's list without creating an appointment.
    pub fn reserve_slot(&mut self, doctor_id: &str, slot: &str) -> Result<Doctor> {
        let unavailable = || AgentError::SlotUnavailable {
            doctor_id: doctor_id.to_string(),
            slot: slot.to_string(),
        };
        let doctor = self
            .doctors
            .iter_mut()
            .find(|d| d.id == doctor_id)
            .ok_or_else(unavailable)?;
        let position = doctor
            .available_slots
            .iter()
            .position(|s| s == slot)
            .ok_or_else(unavailable)?;
        doctor.available_slots.remove(position);
        Ok(doctor.clone())
    }

    pub fn book(&mut self, request: &BookingRequest) -> Result<Appointment> {
        let candidates: Vec<usize> = self
            .doctors
            .iter()
            .enumerate()
            .filter(|(_, d)| {
                request
                    .specialty
                    .as_deref()
                    .map_or(true, |s| d.matches_specialty(s))
            })
            .map(|(i, _)| i)
            .collect();

        if candidates.is_empty() {
            return Err(AgentError::NoDoctorsAvailable {
                specialty: request
                    .specialty
                    .clone()
                    .unwrap_or_else(|| "any specialty".to_string()),
            });
        }

        // First candidate with any slot; within it a slot matching the
        // preference, else its earliest one.
        let (doctor_index, slot_index) = candidates
            .iter()
            .find(|&&i| !self.doctors[i].available_slots.is_empty())
            .map(|&i| {
                let slots = &self.doctors[i].available_slots;
                let matching = request
                    .preferred_time
                    .as_ref()
                    .and_then(|pref| slots.iter().position(|slot| pref.matches(slot)));
                (i, matching.unwrap_or(0))
            })
            .ok_or(AgentError::NoMatchingSlot)?;

        let doctor = &mut self.doctors[doctor_index];
        let slot = doctor.available_slots.remove(slot_index);

        let appointment = Appointment {
            id: format!("APT{:04}", self.appointment_counter),
            doctor_id: doctor.id.clone(),
            doctor_name: doctor.name.clone(),
            patient_name: request.patient_name.clone(),
            patient_phone: request.patient_phone.clone(),
            appointment_time: slot,
            specialty: doctor.specialty.clone(),
            status: AppointmentStatus::Scheduled,
            consultation_fee: doctor.consultation_fee,
            notes: None,
        };
        self.appointment_counter += 1;
        self.appointments.push(appointment.clone());

        tracing::debug!(
            appointment_id = %appointment.id,
            doctor_id = %appointment.doctor_id,
            slot = %appointment.appointment_time,
            "appointment booked"
        );
        Ok(appointment)
    }

    /// Appointments in booking order.
    pub fn appointments(&self, query: &AppointmentQuery) -> Vec<Appointment> {
        let name = query.patient_name.as_deref().map(str::to_lowercase);
        self.appointments
            .iter()
            .filter(|a| {
                name.as_deref()
                    .map_or(true, |n| a.patient_name.to_lowercase().contains(n))
            })
            .filter(|a| {
                query
                    .appointment_id
                    .as_deref()
                    .map_or(true, |id| a.id.eq_ignore_ascii_case(id))
            })
            .cloned()
            .collect()
    }

    pub fn has_appointments(&self) -> bool {
        !self.appointments.is_empty()
    }

    /// Marks the appointment cancelled and puts its slot back on the doctor's list.
    pub fn cancel(&mut self, appointment_id: &str) -> Result<Appointment> {
        let appointment = self
            .appointments
            .iter_mut()
            .find(|a| a.id.eq_ignore_ascii_case(appointment_id))
            .ok_or_else(|| AgentError::AppointmentNotFound {
                appointment_id: appointment_id.to_string(),
            })?;

        if appointment.status == AppointmentStatus::Cancelled {
            return Err(AgentError::AlreadyCancelled {
                appointment_id: appointment.id.clone(),
            });
        }

        if appointment.status.is_active() {
            if let Some(doctor) = self
                .doctors
                .iter_mut()
                .find(|d| d.id == appointment.doctor_id)
            {
                if !doctor.available_slots.contains(&appointment.appointment_time) {
                    doctor
                        .available_slots
                        .push(appointment.appointment_time.clone());
                    doctor.available_slots.sort();
                }
            }
        }

        appointment.status = AppointmentStatus::Cancelled;
        Ok(appointment.clone())
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::with_seed_directory()
    }
}

fn doctor(id: &str, name: &str, specialty: &str, slots: &[&str], fee: f64) -> Doctor {
    Doctor {
        id: id.to_string(),
        name: name.to_string(),
        specialty: specialty.to_string(),
        available_slots: slots.iter().map(|s| s.to_string()).collect(),
        consultation_fee: fee,
    }
}

pub fn seed_doctors() -> Vec<Doctor> {
    vec![
        doctor(
            "dr001",
            "Dr. Sarah Johnson",
            "Cardiology",
            &["2025-05-29 09:00", "2025-05-29 14:00", "2025-05-30 10:00"],
            150.0,
        ),
        doctor(
            "dr002",
            "Dr. Michael Chen",
            "Dermatology",
            &["2025-05-29 11:00", "2025-05-29 15:30", "2025-05-30 09:30"],
            120.0,
        ),
        doctor(
            "dr003",
            "Dr. Emily Rodriguez",
            "Pediatrics",
            &["2025-05-29 13:00", "2025-05-30 11:00", "2025-05-30 16:00"],
            100.0,
        ),
        doctor(
            "dr004",
            "Dr. James Wilson",
            "Orthopedics",
            &["2025-05-29 10:00", "2025-05-30 14:00", "2025-05-31 09:00"],
            180.0,
        ),
    ]
}

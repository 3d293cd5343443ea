//! Appointment models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{now_timestamp, ModelError, PatientName};

/// Appointment types offered by the scheduling form.
pub const APPOINTMENT_TYPES: &[&str] = &[
    "General Consultation",
    "Eye Examination",
    "Follow-up",
    "Contact Lens Fitting",
    "Glaucoma Check",
    "Diabetic Eye Screening",
    "Cataract Consultation",
    "Emergency Visit",
];

/// Type given to appointments when the form leaves it unset.
pub const DEFAULT_APPOINTMENT_TYPE: &str = "General Consultation";

/// Appointment status.
///
/// Serialized with the backend's spelling, which includes spaces.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    /// Booked, not yet confirmed with the patient
    #[default]
    Scheduled,
    /// Patient confirmed attendance
    Confirmed,
    /// Patient is being seen
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
    /// Patient did not attend
    #[serde(rename = "No Show")]
    NoShow,
}

impl AppointmentStatus {
    /// Every status, in form order.
    pub const ALL: [AppointmentStatus; 6] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::InProgress,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::InProgress => "In Progress",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::NoShow => "No Show",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownStatus(s.to_string()))
    }
}

/// An appointment row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    /// Owning patient; must reference an existing patient
    pub patient_id: String,
    /// RFC 3339 instant
    pub appointment_date: String,
    pub appointment_type: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: String,
    /// Staff member who booked the appointment
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Appointment {
    /// Build a stored appointment from a draft, assigning a fresh local ID.
    pub fn from_draft(draft: &AppointmentDraft) -> Self {
        let now = now_timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: draft.patient_id.clone(),
            appointment_date: draft.appointment_date.clone(),
            appointment_type: draft.appointment_type.clone(),
            status: draft.status,
            notes: draft.notes.clone(),
            created_by: draft.created_by.clone(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// An appointment with its patient's name embedded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentWithPatient {
    #[serde(flatten)]
    pub appointment: Appointment,
    #[serde(rename = "patients")]
    pub patient: Option<PatientName>,
}

impl AppointmentWithPatient {
    /// Patient name for display, empty if the relation was not returned.
    pub fn patient_name(&self) -> String {
        self.patient
            .as_ref()
            .map(PatientName::full_name)
            .unwrap_or_default()
    }
}

/// Insert/update payload for an appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentDraft {
    pub patient_id: String,
    pub appointment_date: String,
    pub appointment_type: String,
    pub status: AppointmentStatus,
    pub notes: String,
    pub created_by: Option<String>,
}

impl AppointmentDraft {
    /// Create a draft with the required fields and schema defaults.
    pub fn new(patient_id: impl Into<String>, appointment_date: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            appointment_date: appointment_date.into(),
            appointment_type: DEFAULT_APPOINTMENT_TYPE.to_string(),
            status: AppointmentStatus::Scheduled,
            notes: String::new(),
            created_by: None,
        }
    }

    /// Pre-fill a draft from an existing appointment (edit mode).
    pub fn from_appointment(appointment: &Appointment) -> Self {
        Self {
            patient_id: appointment.patient_id.clone(),
            appointment_date: appointment.appointment_date.clone(),
            appointment_type: appointment.appointment_type.clone(),
            status: appointment.status,
            notes: appointment.notes.clone(),
            created_by: appointment.created_by.clone(),
        }
    }
}

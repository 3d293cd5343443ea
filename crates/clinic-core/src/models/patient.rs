//! Patient models.

use serde::{Deserialize, Serialize};

use super::{non_blank, now_timestamp};

/// A patient row as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Backend-assigned UUID, immutable once created
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Calendar date, `YYYY-MM-DD`
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub insurance_info: Option<String>,
    /// Free-text history; empty when nothing has been recorded
    #[serde(default)]
    pub medical_history: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Patient {
    /// "First Last", as shown in lists and used by the search filter.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Build a stored patient from a draft, assigning a fresh local ID.
    pub fn from_draft(draft: &PatientDraft) -> Self {
        let now = now_timestamp();
        let draft = draft.normalized();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone: draft.phone,
            date_of_birth: draft.date_of_birth,
            address: draft.address,
            emergency_contact: draft.emergency_contact,
            insurance_info: draft.insurance_info,
            medical_history: draft.medical_history,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// The `patients(first_name,last_name)` relation embedded in appointment and
/// record listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PatientName {
    pub first_name: String,
    pub last_name: String,
}

impl PatientName {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Insert/update payload for a patient (the patient form's fields).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PatientDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub insurance_info: Option<String>,
    #[serde(default)]
    pub medical_history: String,
}

impl PatientDraft {
    /// Create a draft with the required fields.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Default::default()
        }
    }

    /// Pre-fill a draft from an existing patient (edit mode).
    pub fn from_patient(patient: &Patient) -> Self {
        Self {
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            email: patient.email.clone(),
            phone: patient.phone.clone(),
            date_of_birth: patient.date_of_birth.clone(),
            address: patient.address.clone(),
            emergency_contact: patient.emergency_contact.clone(),
            insurance_info: patient.insurance_info.clone(),
            medical_history: patient.medical_history.clone(),
        }
    }

    /// Trim every field; blank optional fields become `None`.
    pub fn normalized(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: non_blank(self.email.as_deref()),
            phone: non_blank(self.phone.as_deref()),
            date_of_birth: non_blank(self.date_of_birth.as_deref()),
            address: non_blank(self.address.as_deref()),
            emergency_contact: non_blank(self.emergency_contact.as_deref()),
            insurance_info: non_blank(self.insurance_info.as_deref()),
            medical_history: self.medical_history.trim().to_string(),
        }
    }
}

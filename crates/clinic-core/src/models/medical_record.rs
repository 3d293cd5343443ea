//! Medical record models.

use serde::{Deserialize, Serialize};

use super::{now_timestamp, PatientName};

/// A medical record (one clinical visit).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicalRecord {
    pub id: String,
    pub patient_id: String,
    /// RFC 3339 instant of the visit
    pub visit_date: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub treatment: String,
    #[serde(default)]
    pub prescription: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub doctor_name: String,
    pub created_by: Option<String>,
    pub created_at: String,
}

impl MedicalRecord {
    /// Build a stored record from a draft, assigning a fresh local ID.
    pub fn from_draft(draft: &MedicalRecordDraft) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: draft.patient_id.clone(),
            visit_date: draft.visit_date.clone(),
            diagnosis: draft.diagnosis.clone(),
            treatment: draft.treatment.clone(),
            prescription: draft.prescription.clone(),
            notes: draft.notes.clone(),
            doctor_name: draft.doctor_name.clone(),
            created_by: draft.created_by.clone(),
            created_at: now_timestamp(),
        }
    }
}

/// A medical record with its patient's name embedded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicalRecordWithPatient {
    #[serde(flatten)]
    pub record: MedicalRecord,
    #[serde(rename = "patients")]
    pub patient: Option<PatientName>,
}

impl MedicalRecordWithPatient {
    pub fn patient_name(&self) -> String {
        self.patient
            .as_ref()
            .map(PatientName::full_name)
            .unwrap_or_default()
    }
}

/// Insert/update payload for a medical record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicalRecordDraft {
    pub patient_id: String,
    pub visit_date: String,
    pub diagnosis: String,
    pub treatment: String,
    pub prescription: String,
    pub notes: String,
    pub doctor_name: String,
    pub created_by: Option<String>,
}

impl MedicalRecordDraft {
    /// Create a draft for a visit happening now.
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            visit_date: now_timestamp(),
            diagnosis: String::new(),
            treatment: String::new(),
            prescription: String::new(),
            notes: String::new(),
            doctor_name: String::new(),
            created_by: None,
        }
    }

    pub fn from_record(record: &MedicalRecord) -> Self {
        Self {
            patient_id: record.patient_id.clone(),
            visit_date: record.visit_date.clone(),
            diagnosis: record.diagnosis.clone(),
            treatment: record.treatment.clone(),
            prescription: record.prescription.clone(),
            notes: record.notes.clone(),
            doctor_name: record.doctor_name.clone(),
            created_by: record.created_by.clone(),
        }
    }
}

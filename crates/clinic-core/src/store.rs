//! Backend abstraction.
//!
//! Views talk to the backend only through these traits. [`Database`] keeps the
//! tables in a local SQLite file; [`RestClient`] forwards every call to the
//! hosted table API. One trait per table keeps test doubles small: a view that
//! only touches patients only needs a [`PatientStore`].
//!
//! [`Database`]: crate::db::Database
//! [`RestClient`]: crate::remote::RestClient

use thiserror::Error;

use crate::db::DbError;
use crate::models::{
    Appointment, AppointmentDraft, AppointmentStatus, AppointmentWithPatient, MedicalRecord,
    MedicalRecordDraft, MedicalRecordWithPatient, Patient, PatientDraft, StaffProfile,
};
use crate::remote::RemoteError;

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Backend error: {0}")]
    Remote(#[from] RemoteError),
}

impl StoreError {
    /// User-facing message, without the layer prefix.
    pub fn message(&self) -> String {
        match self {
            StoreError::Database(e) => e.to_string(),
            StoreError::Remote(e) => e.to_string(),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(DbError::from_sqlite(e))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Ordering used when listing patients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatientOrder {
    /// Newest first (patient list)
    #[default]
    NewestFirst,
    /// Alphabetical by last name (patient pickers on forms)
    LastName,
}

/// `patients` table.
pub trait PatientStore {
    fn list_patients(&self, order: PatientOrder) -> StoreResult<Vec<Patient>>;

    fn get_patient(&self, id: &str) -> StoreResult<Option<Patient>>;

    /// Insert and return the stored row.
    fn insert_patient(&self, draft: &PatientDraft) -> StoreResult<Patient>;

    /// Returns `false` when no row has that ID.
    fn update_patient(&self, id: &str, draft: &PatientDraft) -> StoreResult<bool>;

    /// Deletes the patient together with its appointments and records.
    fn delete_patient(&self, id: &str) -> StoreResult<bool>;

    fn count_patients(&self) -> StoreResult<u64>;
}

/// `appointments` table.
pub trait AppointmentStore {
    /// All appointments with patient names, earliest first.
    fn list_appointments(&self) -> StoreResult<Vec<AppointmentWithPatient>>;

    /// One patient's appointments, latest first.
    fn list_appointments_for_patient(&self, patient_id: &str) -> StoreResult<Vec<Appointment>>;

    /// Most recently created appointments with patient names.
    fn recent_appointments(&self, limit: usize) -> StoreResult<Vec<AppointmentWithPatient>>;

    fn insert_appointment(&self, draft: &AppointmentDraft) -> StoreResult<Appointment>;

    fn update_appointment(&self, id: &str, draft: &AppointmentDraft) -> StoreResult<bool>;

    fn delete_appointment(&self, id: &str) -> StoreResult<bool>;

    /// Appointments with `start <= appointment_date < end`.
    fn count_appointments_between(&self, start: &str, end: &str) -> StoreResult<u64>;

    fn count_appointments_with_status(&self, status: AppointmentStatus) -> StoreResult<u64>;
}

/// `medical_records` table.
pub trait MedicalRecordStore {
    /// All records with patient names, latest visit first.
    fn list_medical_records(&self) -> StoreResult<Vec<MedicalRecordWithPatient>>;

    /// One patient's records, latest visit first.
    fn list_medical_records_for_patient(&self, patient_id: &str)
        -> StoreResult<Vec<MedicalRecord>>;

    fn insert_medical_record(&self, draft: &MedicalRecordDraft) -> StoreResult<MedicalRecord>;

    fn update_medical_record(&self, id: &str, draft: &MedicalRecordDraft) -> StoreResult<bool>;

    fn delete_medical_record(&self, id: &str) -> StoreResult<bool>;

    fn count_medical_records(&self) -> StoreResult<u64>;
}

/// `staff_profiles` table.
pub trait StaffStore {
    fn get_staff_profile(&self, id: &str) -> StoreResult<Option<StaffProfile>>;

    /// Insert the profile, or update name and phone if it exists. An existing
    /// row keeps its role.
    fn upsert_staff_profile(&self, profile: &StaffProfile) -> StoreResult<()>;
}

/// Every table the clinic uses.
pub trait ClinicStore: PatientStore + AppointmentStore + MedicalRecordStore + StaffStore {}

impl<T> ClinicStore for T where T: PatientStore + AppointmentStore + MedicalRecordStore + StaffStore {}

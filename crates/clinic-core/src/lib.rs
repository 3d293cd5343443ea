//! Clinic Core Library
//!
//! Patient, appointment and medical-record management for a small clinic,
//! backed either by a local SQLite file or by a hosted table API.
//!
//! # Architecture
//!
//! ```text
//!        Native UI (FFI)            clinic CLI
//!               │                       │
//!               └──────────┬────────────┘
//!                          ▼
//!        ┌──────────────────────────────────────┐
//!        │  Shell → views (list / form / detail) │
//!        │  Dashboard · Settings · search filter │
//!        └──────────────────┬───────────────────┘
//!                           │  ClinicStore traits
//!              ┌────────────┴────────────┐
//!              ▼                         ▼
//!      db::Database (SQLite)    remote::RestClient (HTTP)
//! ```
//!
//! # Core Principle
//!
//! **One submit, one write.** A form submission validates locally and then
//! issues exactly one insert or update. Deletes only happen after an explicit
//! confirmation.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Patient, Appointment, MedicalRecord, StaffProfile)
//! - [`store`]: Per-table store traits
//! - [`db`]: SQLite store
//! - [`remote`]: Hosted backend client and query builder
//! - [`config`]: Backend connection settings
//! - [`session`]: Signed-in user
//! - [`views`]: Screen controllers

pub mod config;
pub mod db;
pub mod models;
pub mod remote;
pub mod session;
pub mod store;
pub mod views;

// Re-export commonly used types
pub use config::BackendConfig;
pub use db::Database;
pub use models::{
    Appointment, AppointmentStatus, AppointmentWithPatient, MedicalRecord,
    MedicalRecordWithPatient, Patient, StaffProfile, StaffRole,
};
pub use remote::RestClient;
pub use session::{AuthContext, AuthProvider, LocalAuth, Session};
pub use store::{ClinicStore, StoreError};
pub use views::{DeleteOutcome, Prompt, SubmitOutcome};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::cell::RefCell;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use models::{MedicalRecordDraft, PatientDraft};
use store::PatientStore;
use views::{
    AppointmentForm, AppointmentListView, Dashboard, MedicalRecordForm, MedicalRecordListView,
    PatientDetails, PatientForm, PatientListView, SettingsView,
};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ClinicError {
    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StoreError> for ClinicError {
    fn from(e: StoreError) -> Self {
        ClinicError::StoreError(e.message())
    }
}

impl From<db::DbError> for ClinicError {
    fn from(e: db::DbError) -> Self {
        ClinicError::StoreError(e.to_string())
    }
}

impl From<remote::RemoteError> for ClinicError {
    fn from(e: remote::RemoteError) -> Self {
        ClinicError::StoreError(e.to_string())
    }
}

impl From<config::ConfigError> for ClinicError {
    fn from(e: config::ConfigError) -> Self {
        ClinicError::ConfigError(e.to_string())
    }
}

impl From<session::AuthError> for ClinicError {
    fn from(e: session::AuthError) -> Self {
        ClinicError::AuthError(e.to_string())
    }
}

impl From<models::ModelError> for ClinicError {
    fn from(e: models::ModelError) -> Self {
        ClinicError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ClinicError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinicError::StoreError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path, signed in as `staff_id`.
#[uniffi::export]
pub fn open_database(path: String, staff_id: String) -> Result<Arc<ClinicCore>, ClinicError> {
    let db = Database::open(&path)?;
    ClinicCore::local(db, &staff_id)
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory(staff_id: String) -> Result<Arc<ClinicCore>, ClinicError> {
    let db = Database::open_in_memory()?;
    ClinicCore::local(db, &staff_id)
}

/// Connect to the hosted backend and sign in with email and password.
#[uniffi::export]
pub fn connect_remote(
    url: String,
    anon_key: String,
    email: String,
    password: String,
) -> Result<Arc<ClinicCore>, ClinicError> {
    let config = BackendConfig::new(url, anon_key)?;
    let mut client = RestClient::new(&config)?;

    let mut auth = AuthContext::new();
    let token = auth.sign_in(&client, &email, &password)?.access_token.clone();
    client.set_access_token(token);

    let store: Box<dyn ClinicStore + Send> = Box::new(client.clone());
    Ok(Arc::new(ClinicCore {
        store: Arc::new(Mutex::new(store)),
        auth: Mutex::new(auth),
        provider: Box::new(client),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Prompt for callers that confirm in their own UI before calling in.
/// Confirmations are always granted; alerts are kept for the error value.
#[derive(Default)]
struct Headless {
    alerts: RefCell<Vec<String>>,
}

impl Prompt for Headless {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

impl Headless {
    fn last_alert(&self, fallback: &str) -> String {
        self.alerts
            .borrow()
            .last()
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }
}

fn saved(outcome: SubmitOutcome) -> Result<String, ClinicError> {
    match outcome {
        SubmitOutcome::Created(id) | SubmitOutcome::Updated(id) => Ok(id),
        SubmitOutcome::Invalid(e) => Err(ClinicError::InvalidInput(e.to_string())),
        SubmitOutcome::Failed(message) => Err(ClinicError::StoreError(message)),
    }
}

fn deleted(outcome: DeleteOutcome, prompt: &Headless) -> Result<bool, ClinicError> {
    match outcome {
        DeleteOutcome::Deleted => Ok(true),
        DeleteOutcome::NotFound | DeleteOutcome::Cancelled => Ok(false),
        DeleteOutcome::Failed => Err(ClinicError::StoreError(prompt.last_alert("delete failed"))),
    }
}

fn load_error(error: Option<&str>) -> Result<(), ClinicError> {
    match error {
        Some(message) => Err(ClinicError::StoreError(message.to_string())),
        None => Ok(()),
    }
}

/// Thread-safe store wrapper for FFI.
#[derive(uniffi::Object)]
pub struct ClinicCore {
    store: Arc<Mutex<Box<dyn ClinicStore + Send>>>,
    auth: Mutex<AuthContext>,
    provider: Box<dyn AuthProvider + Send + Sync>,
}

impl ClinicCore {
    fn local(db: Database, staff_id: &str) -> Result<Arc<Self>, ClinicError> {
        let mut auth = AuthContext::new();
        auth.sign_in(&LocalAuth, staff_id, "")?;
        let store: Box<dyn ClinicStore + Send> = Box::new(db);
        Ok(Arc::new(Self {
            store: Arc::new(Mutex::new(store)),
            auth: Mutex::new(auth),
            provider: Box::new(LocalAuth),
        }))
    }

    /// Lock the store, failing when nobody is signed in.
    fn signed_in(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, Box<dyn ClinicStore + Send>>, ClinicError> {
        self.auth.lock()?.require_user()?;
        Ok(self.store.lock()?)
    }
}

#[uniffi::export]
impl ClinicCore {
    // =========================================================================
    // Session
    // =========================================================================

    pub fn current_user_id(&self) -> Result<Option<String>, ClinicError> {
        Ok(self.auth.lock()?.user_id().map(str::to_string))
    }

    /// End the session. Every later call fails until a new core is opened.
    pub fn sign_out(&self) -> Result<(), ClinicError> {
        self.auth.lock()?.sign_out(self.provider.as_ref())?;
        Ok(())
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Patients, newest first, filtered by name, email or phone.
    pub fn list_patients(&self, search: Option<String>) -> Result<Vec<FfiPatient>, ClinicError> {
        let store = self.signed_in()?;
        let mut view = PatientListView::loaded(&**store);
        load_error(view.error())?;
        view.set_search(search.unwrap_or_default());
        Ok(view.visible().into_iter().cloned().map(Into::into).collect())
    }

    pub fn get_patient(&self, id: String) -> Result<Option<FfiPatient>, ClinicError> {
        let store = self.signed_in()?;
        Ok(store.get_patient(&id)?.map(Into::into))
    }

    /// Create (`id` = None) or update a patient; returns its ID.
    pub fn save_patient(
        &self,
        id: Option<String>,
        input: FfiPatientInput,
    ) -> Result<String, ClinicError> {
        let store = self.signed_in()?;
        let auth = self.auth.lock()?;
        let mut form = match id {
            Some(id) => {
                let patient = store
                    .get_patient(&id)?
                    .ok_or_else(|| ClinicError::NotFound(format!("patient {}", id)))?;
                PatientForm::edit(&patient)
            }
            None => PatientForm::new(),
        };
        form.draft = input.into();
        saved(form.submit(&**store, &auth, &Headless::default())?)
    }

    /// Delete a patient with their appointments and records.
    pub fn delete_patient(&self, id: String) -> Result<bool, ClinicError> {
        let store = self.signed_in()?;
        let auth = self.auth.lock()?;
        let prompt = Headless::default();
        let outcome = PatientListView::new().delete(&**store, &auth, &prompt, &id)?;
        deleted(outcome, &prompt)
    }

    /// A patient's appointments and records, latest first.
    pub fn patient_history(&self, id: String) -> Result<FfiPatientHistory, ClinicError> {
        let store = self.signed_in()?;
        let patient = store
            .get_patient(&id)?
            .ok_or_else(|| ClinicError::NotFound(format!("patient {}", id)))?;
        let details = PatientDetails::load(&**store, patient);
        load_error(details.error())?;

        let name = details.patient.full_name();
        Ok(FfiPatientHistory {
            appointments: details
                .appointments()
                .iter()
                .map(|a| FfiAppointment::new(a.clone(), name.clone()))
                .collect(),
            records: details
                .records()
                .iter()
                .map(|r| FfiMedicalRecord::new(r.clone(), name.clone()))
                .collect(),
            patient: details.patient.into(),
        })
    }

    // =========================================================================
    // Appointment Operations
    // =========================================================================

    pub fn appointment_types(&self) -> Vec<String> {
        models::APPOINTMENT_TYPES.iter().map(|t| t.to_string()).collect()
    }

    /// All appointments, earliest first.
    pub fn list_appointments(&self) -> Result<Vec<FfiAppointment>, ClinicError> {
        let store = self.signed_in()?;
        let view = AppointmentListView::loaded(&**store);
        load_error(view.error())?;
        Ok(view.appointments().iter().cloned().map(Into::into).collect())
    }

    /// Create (`id` = None) or update an appointment; returns its ID.
    pub fn save_appointment(
        &self,
        id: Option<String>,
        input: FfiAppointmentInput,
    ) -> Result<String, ClinicError> {
        let store = self.signed_in()?;
        let auth = self.auth.lock()?;
        let status: AppointmentStatus = input.status.parse()?;

        let mut form = match id {
            Some(id) => {
                let view = AppointmentListView::loaded(&**store);
                load_error(view.error())?;
                let appointment = view
                    .find(&id)
                    .ok_or_else(|| ClinicError::NotFound(format!("appointment {}", id)))?;
                AppointmentForm::edit(appointment)
            }
            None => AppointmentForm::new(),
        };
        form.draft.patient_id = input.patient_id;
        form.draft.appointment_date = input.appointment_date;
        form.draft.appointment_type = input.appointment_type;
        form.draft.status = status;
        form.draft.notes = input.notes;

        let prompt = Headless::default();
        saved(form.submit(&**store, &auth, &prompt)?)
    }

    pub fn delete_appointment(&self, id: String) -> Result<bool, ClinicError> {
        let store = self.signed_in()?;
        let auth = self.auth.lock()?;
        let prompt = Headless::default();
        let outcome = AppointmentListView::new().delete(&**store, &auth, &prompt, &id)?;
        deleted(outcome, &prompt)
    }

    // =========================================================================
    // Medical Record Operations
    // =========================================================================

    /// Records, latest visit first, filtered by patient, diagnosis or doctor.
    pub fn list_medical_records(
        &self,
        search: Option<String>,
    ) -> Result<Vec<FfiMedicalRecord>, ClinicError> {
        let store = self.signed_in()?;
        let mut view = MedicalRecordListView::loaded(&**store);
        load_error(view.error())?;
        view.set_search(search.unwrap_or_default());
        Ok(view.visible().into_iter().cloned().map(Into::into).collect())
    }

    /// Create (`id` = None) or update a medical record; returns its ID.
    pub fn save_medical_record(
        &self,
        id: Option<String>,
        input: FfiMedicalRecordInput,
    ) -> Result<String, ClinicError> {
        let store = self.signed_in()?;
        let auth = self.auth.lock()?;

        let mut form = match id {
            Some(id) => {
                let view = MedicalRecordListView::loaded(&**store);
                load_error(view.error())?;
                let record = view
                    .find(&id)
                    .ok_or_else(|| ClinicError::NotFound(format!("medical record {}", id)))?;
                MedicalRecordForm::edit(record)
            }
            None => MedicalRecordForm::new(),
        };
        let created_by = form.draft.created_by.take();
        let visit_date = input
            .visit_date
            .unwrap_or_else(|| form.draft.visit_date.clone());
        form.draft = MedicalRecordDraft {
            patient_id: input.patient_id,
            visit_date,
            diagnosis: input.diagnosis,
            treatment: input.treatment,
            prescription: input.prescription,
            notes: input.notes,
            doctor_name: input.doctor_name,
            created_by,
        };

        let prompt = Headless::default();
        saved(form.submit(&**store, &auth, &prompt)?)
    }

    pub fn delete_medical_record(&self, id: String) -> Result<bool, ClinicError> {
        let store = self.signed_in()?;
        let auth = self.auth.lock()?;
        let prompt = Headless::default();
        let outcome = MedicalRecordListView::new().delete(&**store, &auth, &prompt, &id)?;
        deleted(outcome, &prompt)
    }

    // =========================================================================
    // Dashboard & Settings
    // =========================================================================

    /// Headline counts for `today` (`YYYY-MM-DD`, UTC today when omitted).
    pub fn dashboard(&self, today: Option<String>) -> Result<FfiDashboard, ClinicError> {
        let today = match today {
            Some(day) => NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d")
                .map_err(|_| models::ModelError::InvalidDate(day))?,
            None => chrono::Utc::now().date_naive(),
        };
        let store = self.signed_in()?;
        Ok(Dashboard::load(&**store, today).into())
    }

    /// The signed-in user's profile; blank when none is stored yet.
    pub fn get_profile(&self) -> Result<FfiStaffProfile, ClinicError> {
        let store = self.signed_in()?;
        let auth = self.auth.lock()?;
        let view = SettingsView::load(&**store, &auth)?;
        load_error(view.error())?;
        Ok(view.profile().clone().into())
    }

    pub fn save_profile(
        &self,
        full_name: String,
        phone: Option<String>,
    ) -> Result<FfiStaffProfile, ClinicError> {
        let store = self.signed_in()?;
        let auth = self.auth.lock()?;
        let mut view = SettingsView::load(&**store, &auth)?;
        saved(view.save(&**store, &Headless::default(), &full_name, phone.as_deref()))?;
        Ok(view.profile().clone().into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub insurance_info: Option<String>,
    pub medical_history: String,
    pub created_at: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            first_name: patient.first_name,
            last_name: patient.last_name,
            email: patient.email,
            phone: patient.phone,
            date_of_birth: patient.date_of_birth,
            address: patient.address,
            emergency_contact: patient.emergency_contact,
            insurance_info: patient.insurance_info,
            medical_history: patient.medical_history,
            created_at: patient.created_at,
        }
    }
}

/// FFI-safe patient form fields.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientInput {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub insurance_info: Option<String>,
    pub medical_history: String,
}

impl From<FfiPatientInput> for PatientDraft {
    fn from(input: FfiPatientInput) -> Self {
        PatientDraft {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            date_of_birth: input.date_of_birth,
            address: input.address,
            emergency_contact: input.emergency_contact,
            insurance_info: input.insurance_info,
            medical_history: input.medical_history,
        }
    }
}

/// FFI-safe appointment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub appointment_date: String,
    pub appointment_type: String,
    pub status: String,
    pub notes: String,
    pub created_by: Option<String>,
    pub created_at: String,
}

impl FfiAppointment {
    fn new(appointment: Appointment, patient_name: String) -> Self {
        Self {
            id: appointment.id,
            patient_id: appointment.patient_id,
            patient_name,
            appointment_date: appointment.appointment_date,
            appointment_type: appointment.appointment_type,
            status: appointment.status.to_string(),
            notes: appointment.notes,
            created_by: appointment.created_by,
            created_at: appointment.created_at,
        }
    }
}

impl From<AppointmentWithPatient> for FfiAppointment {
    fn from(row: AppointmentWithPatient) -> Self {
        let name = row.patient_name();
        Self::new(row.appointment, name)
    }
}

/// FFI-safe appointment form fields. `status` uses the display spelling
/// ("Scheduled", "In Progress", ...).
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointmentInput {
    pub patient_id: String,
    pub appointment_date: String,
    pub appointment_type: String,
    pub status: String,
    pub notes: String,
}

/// FFI-safe medical record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicalRecord {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub visit_date: String,
    pub diagnosis: String,
    pub treatment: String,
    pub prescription: String,
    pub notes: String,
    pub doctor_name: String,
    pub created_by: Option<String>,
}

impl FfiMedicalRecord {
    fn new(record: MedicalRecord, patient_name: String) -> Self {
        Self {
            id: record.id,
            patient_id: record.patient_id,
            patient_name,
            visit_date: record.visit_date,
            diagnosis: record.diagnosis,
            treatment: record.treatment,
            prescription: record.prescription,
            notes: record.notes,
            doctor_name: record.doctor_name,
            created_by: record.created_by,
        }
    }
}

impl From<MedicalRecordWithPatient> for FfiMedicalRecord {
    fn from(row: MedicalRecordWithPatient) -> Self {
        let name = row.patient_name();
        Self::new(row.record, name)
    }
}

/// FFI-safe medical record form fields. A missing visit date means now.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicalRecordInput {
    pub patient_id: String,
    pub visit_date: Option<String>,
    pub diagnosis: String,
    pub treatment: String,
    pub prescription: String,
    pub notes: String,
    pub doctor_name: String,
}

/// FFI-safe patient detail screen.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientHistory {
    pub patient: FfiPatient,
    pub appointments: Vec<FfiAppointment>,
    pub records: Vec<FfiMedicalRecord>,
}

/// FFI-safe dashboard.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDashboard {
    pub total_patients: u64,
    pub today_appointments: u64,
    pub total_records: u64,
    pub pending_appointments: u64,
    pub recent_appointments: Vec<FfiAppointment>,
    /// Messages from counts that failed and show as zero
    pub errors: Vec<String>,
}

impl From<Dashboard> for FfiDashboard {
    fn from(dashboard: Dashboard) -> Self {
        let stats = dashboard.stats();
        Self {
            total_patients: stats.total_patients,
            today_appointments: stats.today_appointments,
            total_records: stats.total_records,
            pending_appointments: stats.pending_appointments,
            recent_appointments: dashboard
                .recent_appointments()
                .iter()
                .cloned()
                .map(Into::into)
                .collect(),
            errors: dashboard.errors().to_vec(),
        }
    }
}

/// FFI-safe staff profile.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStaffProfile {
    pub id: String,
    pub full_name: String,
    pub role: String,
    pub phone: Option<String>,
}

impl From<StaffProfile> for FfiStaffProfile {
    fn from(profile: StaffProfile) -> Self {
        Self {
            id: profile.id,
            full_name: profile.full_name,
            role: profile.role.to_string(),
            phone: profile.phone,
        }
    }
}

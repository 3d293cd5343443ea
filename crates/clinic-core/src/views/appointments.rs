//! Appointment list and form controllers.

use super::{report_failure, require, require_timestamp, DeleteOutcome, FormError, Prompt, SubmitOutcome};
use crate::models::{Appointment, AppointmentDraft, AppointmentWithPatient, Patient};
use crate::session::{AuthContext, AuthError};
use crate::store::{AppointmentStore, PatientOrder, PatientStore};

pub const DELETE_APPOINTMENT_CONFIRMATION: &str = "Are you sure you want to delete this appointment?";
pub const SAVE_APPOINTMENT_FAILED: &str = "Error saving appointment. Please try again.";

/// All appointments, earliest first, with patient names.
#[derive(Debug, Default)]
pub struct AppointmentListView {
    appointments: Vec<AppointmentWithPatient>,
    error: Option<String>,
}

impl AppointmentListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loaded<S: AppointmentStore + ?Sized>(store: &S) -> Self {
        let mut view = Self::new();
        view.load(store);
        view
    }

    pub fn load<S: AppointmentStore + ?Sized>(&mut self, store: &S) {
        match store.list_appointments() {
            Ok(appointments) => {
                self.appointments = appointments;
                self.error = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "Error fetching appointments");
                self.error = Some(e.message());
            }
        }
    }

    pub fn appointments(&self) -> &[AppointmentWithPatient] {
        &self.appointments
    }

    pub fn find(&self, id: &str) -> Option<&Appointment> {
        self.appointments
            .iter()
            .map(|row| &row.appointment)
            .find(|a| a.id == id)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Delete after explicit confirmation, then re-fetch.
    pub fn delete<S, P>(
        &mut self,
        store: &S,
        auth: &AuthContext,
        prompt: &P,
        id: &str,
    ) -> Result<DeleteOutcome, AuthError>
    where
        S: AppointmentStore + ?Sized,
        P: Prompt + ?Sized,
    {
        auth.require_user()?;
        if !prompt.confirm(DELETE_APPOINTMENT_CONFIRMATION) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let outcome = match store.delete_appointment(id) {
            Ok(true) => {
                tracing::info!(appointment_id = id, "appointment deleted");
                DeleteOutcome::Deleted
            }
            Ok(false) => DeleteOutcome::NotFound,
            Err(e) => {
                report_failure(
                    prompt,
                    "Error deleting appointment",
                    format!("Error deleting appointment: {}", e.message()),
                );
                return Ok(DeleteOutcome::Failed);
            }
        };
        self.load(store);
        Ok(outcome)
    }
}

/// Create/edit form for an appointment.
#[derive(Debug, Clone)]
pub struct AppointmentForm {
    editing: Option<Appointment>,
    pub draft: AppointmentDraft,
    patients: Vec<Patient>,
}

impl Default for AppointmentForm {
    fn default() -> Self {
        Self::new()
    }
}

impl AppointmentForm {
    /// Blank form: no patient or date chosen, default type and status.
    pub fn new() -> Self {
        Self {
            editing: None,
            draft: AppointmentDraft::new("", ""),
            patients: Vec::new(),
        }
    }

    pub fn edit(appointment: &Appointment) -> Self {
        Self {
            editing: Some(appointment.clone()),
            draft: AppointmentDraft::from_appointment(appointment),
            patients: Vec::new(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Fetch the patient picker's options, alphabetical by last name.
    pub fn load_patients<S: PatientStore + ?Sized>(&mut self, store: &S) {
        match store.list_patients(PatientOrder::LastName) {
            Ok(patients) => self.patients = patients,
            Err(e) => tracing::error!(error = %e, "Error fetching patients"),
        }
    }

    pub fn patient_options(&self) -> &[Patient] {
        &self.patients
    }

    pub fn validate(&self) -> Result<AppointmentDraft, FormError> {
        let mut draft = self.draft.clone();
        require("Patient", &draft.patient_id)?;
        draft.patient_id = draft.patient_id.trim().to_string();
        draft.appointment_date = require_timestamp("Date & time", &draft.appointment_date)?;
        require("Appointment type", &draft.appointment_type)?;
        draft.appointment_type = draft.appointment_type.trim().to_string();
        draft.notes = draft.notes.trim().to_string();
        Ok(draft)
    }

    /// Validate, then issue exactly one insert (new) or update (edit). New
    /// appointments are attributed to the signed-in user.
    pub fn submit<S, P>(
        &mut self,
        store: &S,
        auth: &AuthContext,
        prompt: &P,
    ) -> Result<SubmitOutcome, AuthError>
    where
        S: AppointmentStore + ?Sized,
        P: Prompt + ?Sized,
    {
        let user_id = auth.require_user()?.user_id.clone();
        let mut draft = match self.validate() {
            Ok(draft) => draft,
            Err(e) => {
                prompt.alert(&e.to_string());
                return Ok(SubmitOutcome::Invalid(e));
            }
        };

        let result = match &self.editing {
            Some(appointment) => store
                .update_appointment(&appointment.id, &draft)
                .map(|found| found.then(|| appointment.id.clone())),
            None => {
                draft.created_by = Some(user_id);
                store.insert_appointment(&draft).map(|a| Some(a.id))
            }
        };

        Ok(match result {
            Ok(Some(id)) if self.is_editing() => {
                tracing::info!(appointment_id = %id, "appointment updated");
                SubmitOutcome::Updated(id)
            }
            Ok(Some(id)) => {
                tracing::info!(appointment_id = %id, "appointment created");
                SubmitOutcome::Created(id)
            }
            Ok(None) => SubmitOutcome::Failed(report_failure(
                prompt,
                "Error saving appointment: appointment no longer exists",
                SAVE_APPOINTMENT_FAILED.to_string(),
            )),
            Err(e) => {
                tracing::error!(error = %e, "Error saving appointment");
                prompt.alert(SAVE_APPOINTMENT_FAILED);
                SubmitOutcome::Failed(SAVE_APPOINTMENT_FAILED.to_string())
            }
        })
    }
}

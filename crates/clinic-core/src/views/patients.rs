//! Patient list, form and detail controllers.

use super::search::filter_patients;
use super::{report_failure, require, DeleteOutcome, FormError, Prompt, SubmitOutcome};
use crate::models::{normalize_date, Appointment, MedicalRecord, Patient, PatientDraft};
use crate::session::{AuthContext, AuthError};
use crate::store::{AppointmentStore, MedicalRecordStore, PatientOrder, PatientStore};

pub const DELETE_PATIENT_CONFIRMATION: &str = "Are you sure you want to delete this patient? \
This will also delete all their appointments and medical records.";

/// Patient list with a live search box.
#[derive(Debug, Default)]
pub struct PatientListView {
    patients: Vec<Patient>,
    search_term: String,
    error: Option<String>,
}

impl PatientListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and fetch in one step.
    pub fn loaded<S: PatientStore + ?Sized>(store: &S) -> Self {
        let mut view = Self::new();
        view.load(store);
        view
    }

    /// Fetch every patient, newest first. On failure the previous rows stay.
    pub fn load<S: PatientStore + ?Sized>(&mut self, store: &S) {
        match store.list_patients(PatientOrder::NewestFirst) {
            Ok(patients) => {
                self.patients = patients;
                self.error = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "Error fetching patients");
                self.error = Some(e.message());
            }
        }
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Rows matching the current search term.
    pub fn visible(&self) -> Vec<&Patient> {
        filter_patients(&self.patients, &self.search_term)
    }

    pub fn find(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    /// Last fetch error, if the most recent load failed.
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
        S: PatientStore + ?Sized,
        P: Prompt + ?Sized,
    {
        auth.require_user()?;
        if !prompt.confirm(DELETE_PATIENT_CONFIRMATION) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let outcome = match store.delete_patient(id) {
            Ok(true) => {
                tracing::info!(patient_id = id, "patient deleted");
                DeleteOutcome::Deleted
            }
            Ok(false) => DeleteOutcome::NotFound,
            Err(e) => {
                report_failure(
                    prompt,
                    "Error deleting patient",
                    format!("Error deleting patient: {}", e.message()),
                );
                return Ok(DeleteOutcome::Failed);
            }
        };
        self.load(store);
        Ok(outcome)
    }
}

/// Create/edit form for a patient.
#[derive(Debug, Clone, Default)]
pub struct PatientForm {
    editing: Option<Patient>,
    /// Current field values
    pub draft: PatientDraft,
}

impl PatientForm {
    /// Blank form for a new patient.
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-filled from an existing patient.
    pub fn edit(patient: &Patient) -> Self {
        Self {
            editing: Some(patient.clone()),
            draft: PatientDraft::from_patient(patient),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Check required fields and formats; returns the normalised payload.
    pub fn validate(&self) -> Result<PatientDraft, FormError> {
        let mut draft = self.draft.normalized();
        require("First name", &draft.first_name)?;
        require("Last name", &draft.last_name)?;

        if let Some(email) = &draft.email {
            let well_formed = email
                .split_once('@')
                .is_some_and(|(user, domain)| !user.is_empty() && !domain.is_empty())
                && !email.contains(char::is_whitespace);
            if !well_formed {
                return Err(FormError::Invalid {
                    field: "Email",
                    message: format!("'{}' is not an email address", email),
                });
            }
        }

        if let Some(dob) = &draft.date_of_birth {
            draft.date_of_birth = Some(normalize_date(dob).map_err(|e| FormError::Invalid {
                field: "Date of birth",
                message: e.to_string(),
            })?);
        }

        Ok(draft)
    }

    /// Validate, then issue exactly one insert (new) or update (edit).
    pub fn submit<S, P>(
        &mut self,
        store: &S,
        auth: &AuthContext,
        prompt: &P,
    ) -> Result<SubmitOutcome, AuthError>
    where
        S: PatientStore + ?Sized,
        P: Prompt + ?Sized,
    {
        auth.require_user()?;
        let draft = match self.validate() {
            Ok(draft) => draft,
            Err(e) => {
                prompt.alert(&e.to_string());
                return Ok(SubmitOutcome::Invalid(e));
            }
        };

        let result = match &self.editing {
            Some(patient) => store
                .update_patient(&patient.id, &draft)
                .map(|found| found.then(|| patient.id.clone())),
            None => store.insert_patient(&draft).map(|p| Some(p.id)),
        };

        Ok(match (result, self.is_editing()) {
            (Ok(Some(id)), true) => {
                tracing::info!(patient_id = %id, "patient updated");
                SubmitOutcome::Updated(id)
            }
            (Ok(Some(id)), false) => {
                tracing::info!(patient_id = %id, "patient created");
                SubmitOutcome::Created(id)
            }
            (Ok(None), _) => SubmitOutcome::Failed(report_failure(
                prompt,
                "Error saving patient",
                "Error saving patient: patient no longer exists".to_string(),
            )),
            (Err(e), _) => SubmitOutcome::Failed(report_failure(
                prompt,
                "Error saving patient",
                format!("Error saving patient: {}", e.message()),
            )),
        })
    }
}

/// One patient with their appointment and record history.
#[derive(Debug, Clone)]
pub struct PatientDetails {
    pub patient: Patient,
    appointments: Vec<Appointment>,
    records: Vec<MedicalRecord>,
    error: Option<String>,
}

impl PatientDetails {
    /// Fetch the patient's appointments and records, latest first.
    pub fn load<S>(store: &S, patient: Patient) -> Self
    where
        S: AppointmentStore + MedicalRecordStore + ?Sized,
    {
        let fetched = store
            .list_appointments_for_patient(&patient.id)
            .and_then(|appointments| {
                store
                    .list_medical_records_for_patient(&patient.id)
                    .map(|records| (appointments, records))
            });

        match fetched {
            Ok((appointments, records)) => Self {
                patient,
                appointments,
                records,
                error: None,
            },
            Err(e) => {
                tracing::error!(error = %e, patient_id = %patient.id, "Error fetching patient data");
                Self {
                    patient,
                    appointments: Vec::new(),
                    records: Vec::new(),
                    error: Some(e.message()),
                }
            }
        }
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn records(&self) -> &[MedicalRecord] {
        &self.records
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{AppointmentDraft, MedicalRecordDraft};
    use crate::session::Session;
    use crate::views::testing::ScriptedPrompt;

    fn signed_in() -> AuthContext {
        AuthContext::with_session(Session::local("staff-1"))
    }

    #[test]
    fn test_validate_required_names() {
        let mut form = PatientForm::new();
        form.draft.last_name = "Lovelace".into();
        assert_eq!(
            form.validate(),
            Err(FormError::Required { field: "First name" })
        );

        form.draft.first_name = "  Ada ".into();
        assert_eq!(form.validate().unwrap().first_name, "Ada");
    }

    #[test]
    fn test_validate_email_and_dob() {
        let mut form = PatientForm::new();
        form.draft = PatientDraft::new("Ada", "Lovelace");

        form.draft.email = Some("not-an-email".into());
        assert!(matches!(form.validate(), Err(FormError::Invalid { field: "Email", .. })));

        form.draft.email = Some("".into());
        form.draft.date_of_birth = Some("10/12/1815".into());
        assert!(matches!(
            form.validate(),
            Err(FormError::Invalid { field: "Date of birth", .. })
        ));

        form.draft.date_of_birth = Some("1815-12-10".into());
        let draft = form.validate().unwrap();
        assert_eq!(draft.email, None);
        assert_eq!(draft.date_of_birth.as_deref(), Some("1815-12-10"));
    }

    #[test]
    fn test_submit_creates_then_edits() {
        let db = Database::open_in_memory().unwrap();
        let auth = signed_in();
        let prompt = ScriptedPrompt::answering(true);

        let mut form = PatientForm::new();
        form.draft = PatientDraft::new("Ada", "Lovelace");
        let id = match form.submit(&db, &auth, &prompt) {
            Ok(SubmitOutcome::Created(id)) => id,
            other => panic!("unexpected outcome: {:?}", other),
        };

        let patient = db.get_patient(&id).unwrap().unwrap();
        let mut edit = PatientForm::edit(&patient);
        assert!(edit.is_editing());
        edit.draft.phone = Some("555-0100".into());
        assert_eq!(
            edit.submit(&db, &auth, &prompt),
            Ok(SubmitOutcome::Updated(id.clone()))
        );

        assert_eq!(db.count_patients().unwrap(), 1);
        assert_eq!(db.get_patient(&id).unwrap().unwrap().phone.as_deref(), Some("555-0100"));
        assert!(prompt.alerts.borrow().is_empty());
    }

    #[test]
    fn test_edit_of_deleted_patient_alerts() {
        let db = Database::open_in_memory().unwrap();
        let prompt = ScriptedPrompt::answering(true);
        let patient = db.insert_patient(&PatientDraft::new("Ada", "Lovelace")).unwrap();
        db.delete_patient(&patient.id).unwrap();

        let mut form = PatientForm::edit(&patient);
        assert!(matches!(
            form.submit(&db, &signed_in(), &prompt),
            Ok(SubmitOutcome::Failed(_))
        ));
        assert_eq!(prompt.alerts.borrow().len(), 1);
        // Form keeps what the user typed
        assert_eq!(form.draft.first_name, "Ada");
    }

    #[test]
    fn test_list_search_and_delete() {
        let db = Database::open_in_memory().unwrap();
        let ada = db.insert_patient(&PatientDraft::new("Ada", "Lovelace")).unwrap();
        db.insert_patient(&PatientDraft::new("Alan", "Turing")).unwrap();

        let mut view = PatientListView::loaded(&db);
        assert_eq!(view.patients().len(), 2);

        view.set_search("love");
        assert_eq!(view.visible().len(), 1);

        let auth = signed_in();
        let declined = ScriptedPrompt::answering(false);
        assert_eq!(
            view.delete(&db, &auth, &declined, &ada.id),
            Ok(DeleteOutcome::Cancelled)
        );
        assert_eq!(db.count_patients().unwrap(), 2);

        let accepted = ScriptedPrompt::answering(true);
        assert_eq!(
            view.delete(&db, &auth, &accepted, &ada.id),
            Ok(DeleteOutcome::Deleted)
        );
        assert_eq!(
            *accepted.confirmations.borrow(),
            vec![DELETE_PATIENT_CONFIRMATION.to_string()]
        );
        assert_eq!(view.patients().len(), 1);
        assert!(view.find(&ada.id).is_none());
        assert!(view.visible().is_empty());
    }

    #[test]
    fn test_writes_require_sign_in() {
        let db = Database::open_in_memory().unwrap();
        let signed_out = AuthContext::new();
        let prompt = ScriptedPrompt::answering(true);

        let mut form = PatientForm::new();
        form.draft = PatientDraft::new("Ada", "Lovelace");
        assert_eq!(
            form.submit(&db, &signed_out, &prompt),
            Err(AuthError::NotSignedIn)
        );
        assert_eq!(db.count_patients().unwrap(), 0);

        let ada = db.insert_patient(&PatientDraft::new("Ada", "Lovelace")).unwrap();
        let mut edit = PatientForm::edit(&ada);
        edit.draft.phone = Some("555-0100".into());
        assert_eq!(
            edit.submit(&db, &signed_out, &prompt),
            Err(AuthError::NotSignedIn)
        );

        let mut view = PatientListView::loaded(&db);
        assert_eq!(
            view.delete(&db, &signed_out, &prompt, &ada.id),
            Err(AuthError::NotSignedIn)
        );

        assert_eq!(db.get_patient(&ada.id).unwrap().unwrap().phone, None);
        assert!(prompt.confirmations.borrow().is_empty());
        assert!(prompt.alerts.borrow().is_empty());
    }

    #[test]
    fn test_details_history() {
        let db = Database::open_in_memory().unwrap();
        let patient = db.insert_patient(&PatientDraft::new("Ada", "Lovelace")).unwrap();
        db.insert_appointment(&AppointmentDraft::new(patient.id.clone(), "2026-10-18T09:00:00Z"))
            .unwrap();
        db.insert_appointment(&AppointmentDraft::new(patient.id.clone(), "2026-11-18T09:00:00Z"))
            .unwrap();
        db.insert_medical_record(&MedicalRecordDraft::new(patient.id.clone()))
            .unwrap();

        let details = PatientDetails::load(&db, patient);
        assert!(details.error().is_none());
        assert_eq!(details.appointments().len(), 2);
        assert_eq!(details.appointments()[0].appointment_date, "2026-11-18T09:00:00Z");
        assert_eq!(details.records().len(), 1);
    }
}

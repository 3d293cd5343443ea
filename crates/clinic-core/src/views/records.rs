//! Medical record list and form controllers.

use super::search::filter_records;
use super::{report_failure, require, require_timestamp, DeleteOutcome, FormError, Prompt, SubmitOutcome};
use crate::models::{MedicalRecord, MedicalRecordDraft, MedicalRecordWithPatient, Patient};
use crate::session::{AuthContext, AuthError};
use crate::store::{MedicalRecordStore, PatientOrder, PatientStore};

pub const DELETE_RECORD_CONFIRMATION: &str = "Are you sure you want to delete this medical record?";
pub const SAVE_RECORD_FAILED: &str = "Error saving medical record. Please try again.";

/// All medical records, latest visit first, filtered by a search term.
#[derive(Debug, Default)]
pub struct MedicalRecordListView {
    records: Vec<MedicalRecordWithPatient>,
    search: String,
    error: Option<String>,
}

impl MedicalRecordListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loaded<S: MedicalRecordStore + ?Sized>(store: &S) -> Self {
        let mut view = Self::new();
        view.load(store);
        view
    }

    pub fn load<S: MedicalRecordStore + ?Sized>(&mut self, store: &S) {
        match store.list_medical_records() {
            Ok(records) => {
                self.records = records;
                self.error = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "Error fetching medical records");
                self.error = Some(e.message());
            }
        }
    }

    pub fn records(&self) -> &[MedicalRecordWithPatient] {
        &self.records
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    /// Records matching the search term on patient name, diagnosis or doctor.
    pub fn visible(&self) -> Vec<&MedicalRecordWithPatient> {
        filter_records(&self.records, &self.search)
    }

    pub fn find(&self, id: &str) -> Option<&MedicalRecord> {
        self.records
            .iter()
            .map(|row| &row.record)
            .find(|r| r.id == id)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn delete<S, P>(
        &mut self,
        store: &S,
        auth: &AuthContext,
        prompt: &P,
        id: &str,
    ) -> Result<DeleteOutcome, AuthError>
    where
        S: MedicalRecordStore + ?Sized,
        P: Prompt + ?Sized,
    {
        auth.require_user()?;
        if !prompt.confirm(DELETE_RECORD_CONFIRMATION) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let outcome = match store.delete_medical_record(id) {
            Ok(true) => {
                tracing::info!(record_id = id, "medical record deleted");
                DeleteOutcome::Deleted
            }
            Ok(false) => DeleteOutcome::NotFound,
            Err(e) => {
                report_failure(
                    prompt,
                    "Error deleting medical record",
                    format!("Error deleting medical record: {}", e.message()),
                );
                return Ok(DeleteOutcome::Failed);
            }
        };
        self.load(store);
        Ok(outcome)
    }
}

/// Create/edit form for a medical record.
#[derive(Debug, Clone)]
pub struct MedicalRecordForm {
    editing: Option<MedicalRecord>,
    pub draft: MedicalRecordDraft,
    patients: Vec<Patient>,
}

impl Default for MedicalRecordForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MedicalRecordForm {
    /// Blank form with the visit date set to now.
    pub fn new() -> Self {
        Self {
            editing: None,
            draft: MedicalRecordDraft::new(""),
            patients: Vec::new(),
        }
    }

    pub fn edit(record: &MedicalRecord) -> Self {
        Self {
            editing: Some(record.clone()),
            draft: MedicalRecordDraft::from_record(record),
            patients: Vec::new(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn load_patients<S: PatientStore + ?Sized>(&mut self, store: &S) {
        match store.list_patients(PatientOrder::LastName) {
            Ok(patients) => self.patients = patients,
            Err(e) => tracing::error!(error = %e, "Error fetching patients"),
        }
    }

    pub fn patient_options(&self) -> &[Patient] {
        &self.patients
    }

    pub fn validate(&self) -> Result<MedicalRecordDraft, FormError> {
        let mut draft = self.draft.clone();
        require("Patient", &draft.patient_id)?;
        draft.patient_id = draft.patient_id.trim().to_string();
        draft.visit_date = require_timestamp("Visit date", &draft.visit_date)?;
        for field in [
            &mut draft.diagnosis,
            &mut draft.treatment,
            &mut draft.prescription,
            &mut draft.notes,
            &mut draft.doctor_name,
        ] {
            *field = field.trim().to_string();
        }
        Ok(draft)
    }

    pub fn submit<S, P>(
        &mut self,
        store: &S,
        auth: &AuthContext,
        prompt: &P,
    ) -> Result<SubmitOutcome, AuthError>
    where
        S: MedicalRecordStore + ?Sized,
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
            Some(record) => store
                .update_medical_record(&record.id, &draft)
                .map(|found| found.then(|| record.id.clone())),
            None => {
                draft.created_by = Some(user_id);
                store.insert_medical_record(&draft).map(|r| Some(r.id))
            }
        };

        Ok(match result {
            Ok(Some(id)) if self.is_editing() => {
                tracing::info!(record_id = %id, "medical record updated");
                SubmitOutcome::Updated(id)
            }
            Ok(Some(id)) => {
                tracing::info!(record_id = %id, "medical record created");
                SubmitOutcome::Created(id)
            }
            Ok(None) => SubmitOutcome::Failed(report_failure(
                prompt,
                "Error saving medical record: record no longer exists",
                SAVE_RECORD_FAILED.to_string(),
            )),
            Err(e) => {
                tracing::error!(error = %e, "Error saving medical record");
                prompt.alert(SAVE_RECORD_FAILED);
                SubmitOutcome::Failed(SAVE_RECORD_FAILED.to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::PatientDraft;
    use crate::session::Session;
    use crate::views::testing::ScriptedPrompt;

    fn setup() -> (Database, Patient) {
        let db = Database::open_in_memory().unwrap();
        let patient = db.insert_patient(&PatientDraft::new("Ada", "Lovelace")).unwrap();
        (db, patient)
    }

    fn record(db: &Database, patient_id: &str, diagnosis: &str, doctor: &str) -> MedicalRecord {
        let mut draft = MedicalRecordDraft::new(patient_id);
        draft.diagnosis = diagnosis.into();
        draft.doctor_name = doctor.into();
        db.insert_medical_record(&draft).unwrap()
    }

    #[test]
    fn test_new_defaults_visit_date() {
        let form = MedicalRecordForm::new();
        assert!(form.draft.patient_id.is_empty());
        assert!(form.draft.visit_date.ends_with('Z'));
        assert_eq!(form.validate(), Err(FormError::Required { field: "Patient" }));
    }

    #[test]
    fn test_validate_requires_visit_date() {
        let mut form = MedicalRecordForm::new();
        form.draft.patient_id = "p1".into();
        form.draft.visit_date = " ".into();
        assert_eq!(
            form.validate(),
            Err(FormError::Required { field: "Visit date" })
        );
    }

    #[test]
    fn test_submit_create_and_search() {
        let (db, patient) = setup();
        let auth = AuthContext::with_session(Session::local("doc-1"));
        let prompt = ScriptedPrompt::answering(true);

        let mut form = MedicalRecordForm::new();
        form.load_patients(&db);
        form.draft.patient_id = patient.id.clone();
        form.draft.diagnosis = "Glaucoma ".into();
        form.draft.doctor_name = "Dr. Snow".into();
        assert!(matches!(form.submit(&db, &auth, &prompt), Ok(SubmitOutcome::Created(_))));
        record(&db, &patient.id, "Cataract", "Dr. Frost");

        let mut view = MedicalRecordListView::loaded(&db);
        assert_eq!(view.records().len(), 2);

        view.set_search("glauc");
        let visible = view.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].record.diagnosis, "Glaucoma");
        assert_eq!(visible[0].record.created_by.as_deref(), Some("doc-1"));

        view.set_search("lovelace");
        assert_eq!(view.visible().len(), 2);
        view.set_search("frost");
        assert_eq!(view.visible().len(), 1);
    }

    #[test]
    fn test_submit_unknown_patient_fails() {
        let (db, _) = setup();
        let auth = AuthContext::with_session(Session::local("doc-1"));
        let prompt = ScriptedPrompt::answering(true);
        let mut form = MedicalRecordForm::new();
        form.draft.patient_id = "nobody".into();

        assert_eq!(
            form.submit(&db, &auth, &prompt),
            Ok(SubmitOutcome::Failed(SAVE_RECORD_FAILED.to_string()))
        );
        assert_eq!(*prompt.alerts.borrow(), vec![SAVE_RECORD_FAILED.to_string()]);
    }

    #[test]
    fn test_edit_and_delete() {
        let (db, patient) = setup();
        let auth = AuthContext::with_session(Session::local("doc-1"));
        let prompt = ScriptedPrompt::answering(true);
        let existing = record(&db, &patient.id, "Dry eye", "Dr. Snow");

        let mut form = MedicalRecordForm::edit(&existing);
        form.draft.treatment = "Artificial tears".into();
        assert_eq!(
            form.submit(&db, &auth, &prompt),
            Ok(SubmitOutcome::Updated(existing.id.clone()))
        );

        let mut view = MedicalRecordListView::loaded(&db);
        assert_eq!(view.find(&existing.id).unwrap().treatment, "Artificial tears");

        let declined = ScriptedPrompt::answering(false);
        assert_eq!(
            view.delete(&db, &auth, &declined, &existing.id),
            Ok(DeleteOutcome::Cancelled)
        );
        assert_eq!(
            view.delete(&db, &auth, &prompt, &existing.id),
            Ok(DeleteOutcome::Deleted)
        );
        assert!(view.records().is_empty());
    }

    #[test]
    fn test_writes_require_sign_in() {
        let (db, patient) = setup();
        let signed_out = AuthContext::new();
        let prompt = ScriptedPrompt::answering(true);
        let existing = record(&db, &patient.id, "Dry eye", "Dr. Snow");

        let mut form = MedicalRecordForm::new();
        form.draft.patient_id = patient.id.clone();
        assert_eq!(
            form.submit(&db, &signed_out, &prompt),
            Err(AuthError::NotSignedIn)
        );

        let mut edit = MedicalRecordForm::edit(&existing);
        edit.draft.treatment = "Artificial tears".into();
        assert_eq!(
            edit.submit(&db, &signed_out, &prompt),
            Err(AuthError::NotSignedIn)
        );

        let mut view = MedicalRecordListView::loaded(&db);
        assert_eq!(
            view.delete(&db, &signed_out, &prompt, &existing.id),
            Err(AuthError::NotSignedIn)
        );

        assert_eq!(db.count_medical_records().unwrap(), 1);
        assert_eq!(view.find(&existing.id).unwrap().treatment, "");
        assert!(prompt.confirmations.borrow().is_empty());
    }
}

//! In-memory search filters for the list views.
//!
//! Both filters are pure functions of the fetched rows and the current term,
//! so they can be re-run on every keystroke.

use crate::models::{MedicalRecordWithPatient, Patient};

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Full name, email or phone contains `term`, ignoring case.
pub fn patient_matches(patient: &Patient, term: &str) -> bool {
    let needle = term.to_lowercase();
    contains_ignore_case(&patient.full_name(), &needle)
        || patient
            .email
            .as_deref()
            .is_some_and(|email| contains_ignore_case(email, &needle))
        || patient
            .phone
            .as_deref()
            .is_some_and(|phone| contains_ignore_case(phone, &needle))
}

/// Patients matching `term`, in their fetched order. An empty term keeps all.
pub fn filter_patients<'a>(patients: &'a [Patient], term: &str) -> Vec<&'a Patient> {
    patients
        .iter()
        .filter(|patient| patient_matches(patient, term))
        .collect()
}

/// Patient name, diagnosis or doctor name contains `term`, ignoring case.
pub fn record_matches(record: &MedicalRecordWithPatient, term: &str) -> bool {
    let needle = term.to_lowercase();
    contains_ignore_case(&record.patient_name(), &needle)
        || contains_ignore_case(&record.record.diagnosis, &needle)
        || contains_ignore_case(&record.record.doctor_name, &needle)
}

pub fn filter_records<'a>(
    records: &'a [MedicalRecordWithPatient],
    term: &str,
) -> Vec<&'a MedicalRecordWithPatient> {
    records
        .iter()
        .filter(|record| record_matches(record, term))
        .collect()
}

//! Store traits over the table API.

use serde_json::Value;

use super::{Query, RemoteError, RestClient};
use crate::models::{
    Appointment, AppointmentDraft, AppointmentStatus, AppointmentWithPatient, MedicalRecord,
    MedicalRecordDraft, MedicalRecordWithPatient, Patient, PatientDraft, StaffProfile,
};
use crate::store::{
    AppointmentStore, MedicalRecordStore, PatientOrder, PatientStore, StaffStore, StoreResult,
};

const PATIENTS: &str = "patients";
const APPOINTMENTS: &str = "appointments";
const MEDICAL_RECORDS: &str = "medical_records";
const STAFF_PROFILES: &str = "staff_profiles";

/// Projection embedding the owning patient's name.
const WITH_PATIENT_NAME: &str = "*,patients(first_name,last_name)";

/// Serialize a draft for `PATCH`, leaving `created_by` untouched server side.
fn update_body<T: serde::Serialize>(draft: &T) -> StoreResult<Value> {
    let mut body = serde_json::to_value(draft).map_err(RemoteError::from)?;
    if let Value::Object(map) = &mut body {
        map.remove("created_by");
    }
    Ok(body)
}

/// The columns a staff member may change on their own profile.
fn contact_body(profile: &StaffProfile) -> Value {
    serde_json::json!({
        "full_name": profile.full_name,
        "phone": profile.phone,
    })
}

impl PatientStore for RestClient {
    fn list_patients(&self, order: PatientOrder) -> StoreResult<Vec<Patient>> {
        let query = match order {
            PatientOrder::NewestFirst => Query::from(PATIENTS).order("created_at", false),
            PatientOrder::LastName => Query::from(PATIENTS)
                .order("last_name", true)
                .order("first_name", true),
        };
        Ok(self.select(&query)?)
    }

    fn get_patient(&self, id: &str) -> StoreResult<Option<Patient>> {
        let mut rows: Vec<Patient> = self.select(&Query::from(PATIENTS).eq("id", id).limit(1))?;
        Ok(rows.pop())
    }

    fn insert_patient(&self, draft: &PatientDraft) -> StoreResult<Patient> {
        Ok(self.insert(PATIENTS, &draft.normalized())?)
    }

    fn update_patient(&self, id: &str, draft: &PatientDraft) -> StoreResult<bool> {
        let changed = self.update(&Query::from(PATIENTS).eq("id", id), &draft.normalized())?;
        Ok(changed > 0)
    }

    fn delete_patient(&self, id: &str) -> StoreResult<bool> {
        // The backend's foreign keys cascade to appointments and records
        let deleted = self.delete(&Query::from(PATIENTS).eq("id", id))?;
        Ok(deleted > 0)
    }

    fn count_patients(&self) -> StoreResult<u64> {
        Ok(self.count(&Query::from(PATIENTS))?)
    }
}

impl AppointmentStore for RestClient {
    fn list_appointments(&self) -> StoreResult<Vec<AppointmentWithPatient>> {
        let query = Query::from(APPOINTMENTS)
            .select(WITH_PATIENT_NAME)
            .order("appointment_date", true);
        Ok(self.select(&query)?)
    }

    fn list_appointments_for_patient(&self, patient_id: &str) -> StoreResult<Vec<Appointment>> {
        let query = Query::from(APPOINTMENTS)
            .eq("patient_id", patient_id)
            .order("appointment_date", false);
        Ok(self.select(&query)?)
    }

    fn recent_appointments(&self, limit: usize) -> StoreResult<Vec<AppointmentWithPatient>> {
        let query = Query::from(APPOINTMENTS)
            .select(WITH_PATIENT_NAME)
            .order("created_at", false)
            .limit(limit);
        Ok(self.select(&query)?)
    }

    fn insert_appointment(&self, draft: &AppointmentDraft) -> StoreResult<Appointment> {
        Ok(self.insert(APPOINTMENTS, draft)?)
    }

    fn update_appointment(&self, id: &str, draft: &AppointmentDraft) -> StoreResult<bool> {
        let body = update_body(draft)?;
        let changed = self.update(&Query::from(APPOINTMENTS).eq("id", id), &body)?;
        Ok(changed > 0)
    }

    fn delete_appointment(&self, id: &str) -> StoreResult<bool> {
        let deleted = self.delete(&Query::from(APPOINTMENTS).eq("id", id))?;
        Ok(deleted > 0)
    }

    fn count_appointments_between(&self, start: &str, end: &str) -> StoreResult<u64> {
        let query = Query::from(APPOINTMENTS)
            .gte("appointment_date", start)
            .lt("appointment_date", end);
        Ok(self.count(&query)?)
    }

    fn count_appointments_with_status(&self, status: AppointmentStatus) -> StoreResult<u64> {
        Ok(self.count(&Query::from(APPOINTMENTS).eq("status", status))?)
    }
}

impl MedicalRecordStore for RestClient {
    fn list_medical_records(&self) -> StoreResult<Vec<MedicalRecordWithPatient>> {
        let query = Query::from(MEDICAL_RECORDS)
            .select(WITH_PATIENT_NAME)
            .order("visit_date", false);
        Ok(self.select(&query)?)
    }

    fn list_medical_records_for_patient(
        &self,
        patient_id: &str,
    ) -> StoreResult<Vec<MedicalRecord>> {
        let query = Query::from(MEDICAL_RECORDS)
            .eq("patient_id", patient_id)
            .order("visit_date", false);
        Ok(self.select(&query)?)
    }

    fn insert_medical_record(&self, draft: &MedicalRecordDraft) -> StoreResult<MedicalRecord> {
        Ok(self.insert(MEDICAL_RECORDS, draft)?)
    }

    fn update_medical_record(&self, id: &str, draft: &MedicalRecordDraft) -> StoreResult<bool> {
        let body = update_body(draft)?;
        let changed = self.update(&Query::from(MEDICAL_RECORDS).eq("id", id), &body)?;
        Ok(changed > 0)
    }

    fn delete_medical_record(&self, id: &str) -> StoreResult<bool> {
        let deleted = self.delete(&Query::from(MEDICAL_RECORDS).eq("id", id))?;
        Ok(deleted > 0)
    }

    fn count_medical_records(&self) -> StoreResult<u64> {
        Ok(self.count(&Query::from(MEDICAL_RECORDS))?)
    }
}

impl StaffStore for RestClient {
    fn get_staff_profile(&self, id: &str) -> StoreResult<Option<StaffProfile>> {
        let mut rows: Vec<StaffProfile> =
            self.select(&Query::from(STAFF_PROFILES).eq("id", id).limit(1))?;
        Ok(rows.pop())
    }

    fn upsert_staff_profile(&self, profile: &StaffProfile) -> StoreResult<()> {
        let changed = self.update(
            &Query::from(STAFF_PROFILES).eq("id", &profile.id),
            &contact_body(profile),
        )?;
        if changed == 0 {
            let _: Value = self.insert(STAFF_PROFILES, profile)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_body_drops_created_by() {
        let mut draft = AppointmentDraft::new("p1", "2026-10-18T09:00:00Z");
        draft.created_by = Some("staff-1".into());
        draft.status = AppointmentStatus::NoShow;

        let body = update_body(&draft).unwrap();
        assert!(body.get("created_by").is_none());
        assert_eq!(body["status"], "No Show");
        assert_eq!(body["patient_id"], "p1");
    }

    #[test]
    fn test_contact_body_omits_role() {
        let mut profile = StaffProfile::new("doc-1", "Dr. Snow");
        profile.phone = Some("555-0100".into());

        let body = contact_body(&profile);
        assert!(body.get("role").is_none());
        assert!(body.get("id").is_none());
        assert_eq!(body["full_name"], "Dr. Snow");
        assert_eq!(body["phone"], "555-0100");
    }
}

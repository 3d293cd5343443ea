//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::models::{now_timestamp, Patient, PatientDraft};
use crate::store::{PatientOrder, PatientStore, StoreResult};

const PATIENT_COLUMNS: &str = r#"
    id, first_name, last_name, email, phone, date_of_birth, address,
    emergency_contact, insurance_info, medical_history, created_at, updated_at
"#;

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        date_of_birth: row.get(5)?,
        address: row.get(6)?,
        emergency_contact: row.get(7)?,
        insurance_info: row.get(8)?,
        medical_history: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

impl PatientStore for Database {
    fn list_patients(&self, order: PatientOrder) -> StoreResult<Vec<Patient>> {
        let order_by = match order {
            PatientOrder::NewestFirst => "created_at DESC",
            PatientOrder::LastName => "last_name ASC, first_name ASC",
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY {order_by}"
        ))?;

        let rows = stmt.query_map([], patient_from_row)?;
        let patients = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(patients)
    }

    fn get_patient(&self, id: &str) -> StoreResult<Option<Patient>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?"),
                [id],
                patient_from_row,
            )
            .optional()?)
    }

    fn insert_patient(&self, draft: &PatientDraft) -> StoreResult<Patient> {
        let patient = Patient::from_draft(draft);
        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, first_name, last_name, email, phone, date_of_birth, address,
                emergency_contact, insurance_info, medical_history, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                patient.id,
                patient.first_name,
                patient.last_name,
                patient.email,
                patient.phone,
                patient.date_of_birth,
                patient.address,
                patient.emergency_contact,
                patient.insurance_info,
                patient.medical_history,
                patient.created_at,
                patient.updated_at,
            ],
        )?;
        Ok(patient)
    }

    fn update_patient(&self, id: &str, draft: &PatientDraft) -> StoreResult<bool> {
        let draft = draft.normalized();
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                first_name = ?2,
                last_name = ?3,
                email = ?4,
                phone = ?5,
                date_of_birth = ?6,
                address = ?7,
                emergency_contact = ?8,
                insurance_info = ?9,
                medical_history = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
            params![
                id,
                draft.first_name,
                draft.last_name,
                draft.email,
                draft.phone,
                draft.date_of_birth,
                draft.address,
                draft.emergency_contact,
                draft.insurance_info,
                draft.medical_history,
                now_timestamp(),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    fn delete_patient(&self, id: &str) -> StoreResult<bool> {
        // Appointments and records go with it via ON DELETE CASCADE
        let rows_affected = self.conn.execute("DELETE FROM patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    fn count_patients(&self) -> StoreResult<u64> {
        Ok(self.count("SELECT COUNT(*) FROM patients", [])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();

        let mut draft = PatientDraft::new("Ada", "Lovelace");
        draft.email = Some("ada@example.com".into());
        draft.date_of_birth = Some("1815-12-10".into());

        let inserted = db.insert_patient(&draft).unwrap();

        let retrieved = db.get_patient(&inserted.id).unwrap().unwrap();
        assert_eq!(retrieved.first_name, "Ada");
        assert_eq!(retrieved.last_name, "Lovelace");
        assert_eq!(retrieved.email, Some("ada@example.com".into()));
        assert_eq!(retrieved.date_of_birth, Some("1815-12-10".into()));
        assert_eq!(retrieved, inserted);
    }

    #[test]
    fn test_update_patient() {
        let db = setup_db();

        let patient = db.insert_patient(&PatientDraft::new("Ada", "Lovelace")).unwrap();

        let mut draft = PatientDraft::from_patient(&patient);
        draft.phone = Some("555-0100".into());
        draft.medical_history = "Astigmatism".into();
        assert!(db.update_patient(&patient.id, &draft).unwrap());

        let retrieved = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(retrieved.id, patient.id);
        assert_eq!(retrieved.phone, Some("555-0100".into()));
        assert_eq!(retrieved.medical_history, "Astigmatism");
        assert_eq!(retrieved.created_at, patient.created_at);
    }

    #[test]
    fn test_update_missing_patient() {
        let db = setup_db();
        let updated = db
            .update_patient("missing", &PatientDraft::new("A", "B"))
            .unwrap();
        assert!(!updated);
    }

    #[test]
    fn test_list_by_last_name() {
        let db = setup_db();
        db.insert_patient(&PatientDraft::new("Grace", "Hopper")).unwrap();
        db.insert_patient(&PatientDraft::new("Alan", "Turing")).unwrap();
        db.insert_patient(&PatientDraft::new("Ada", "Lovelace")).unwrap();

        let names: Vec<String> = db
            .list_patients(PatientOrder::LastName)
            .unwrap()
            .into_iter()
            .map(|p| p.last_name)
            .collect();
        assert_eq!(names, vec!["Hopper", "Lovelace", "Turing"]);
    }

    #[test]
    fn test_delete_and_count() {
        let db = setup_db();
        let a = db.insert_patient(&PatientDraft::new("Ada", "Lovelace")).unwrap();
        db.insert_patient(&PatientDraft::new("Alan", "Turing")).unwrap();
        assert_eq!(db.count_patients().unwrap(), 2);

        assert!(db.delete_patient(&a.id).unwrap());
        assert!(!db.delete_patient(&a.id).unwrap());
        assert_eq!(db.count_patients().unwrap(), 1);
        assert!(db.get_patient(&a.id).unwrap().is_none());
    }
}

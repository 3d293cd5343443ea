//! Medical record database operations.

use rusqlite::{params, Row};

use super::Database;
use crate::models::{MedicalRecord, MedicalRecordDraft, MedicalRecordWithPatient, PatientName};
use crate::store::{MedicalRecordStore, StoreResult};

const RECORD_COLUMNS: &str = r#"
    r.id, r.patient_id, r.visit_date, r.diagnosis, r.treatment, r.prescription,
    r.notes, r.doctor_name, r.created_by, r.created_at
"#;

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<MedicalRecord> {
    Ok(MedicalRecord {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        visit_date: row.get(2)?,
        diagnosis: row.get(3)?,
        treatment: row.get(4)?,
        prescription: row.get(5)?,
        notes: row.get(6)?,
        doctor_name: row.get(7)?,
        created_by: row.get(8)?,
        created_at: row.get(9)?,
    })
}

impl MedicalRecordStore for Database {
    fn list_medical_records(&self) -> StoreResult<Vec<MedicalRecordWithPatient>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {RECORD_COLUMNS}, p.first_name, p.last_name
            FROM medical_records r
            JOIN patients p ON p.id = r.patient_id
            ORDER BY r.visit_date DESC
            "#
        ))?;

        let rows = stmt.query_map([], |row| {
            Ok(MedicalRecordWithPatient {
                record: record_from_row(row)?,
                patient: Some(PatientName {
                    first_name: row.get(10)?,
                    last_name: row.get(11)?,
                }),
            })
        })?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn list_medical_records_for_patient(
        &self,
        patient_id: &str,
    ) -> StoreResult<Vec<MedicalRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM medical_records r
            WHERE r.patient_id = ?
            ORDER BY r.visit_date DESC
            "#
        ))?;

        let rows = stmt.query_map([patient_id], record_from_row)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn insert_medical_record(&self, draft: &MedicalRecordDraft) -> StoreResult<MedicalRecord> {
        let record = MedicalRecord::from_draft(draft);
        self.conn.execute(
            r#"
            INSERT INTO medical_records (
                id, patient_id, visit_date, diagnosis, treatment, prescription,
                notes, doctor_name, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                record.id,
                record.patient_id,
                record.visit_date,
                record.diagnosis,
                record.treatment,
                record.prescription,
                record.notes,
                record.doctor_name,
                record.created_by,
                record.created_at,
            ],
        )?;
        Ok(record)
    }

    fn update_medical_record(&self, id: &str, draft: &MedicalRecordDraft) -> StoreResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE medical_records SET
                patient_id = ?2,
                visit_date = ?3,
                diagnosis = ?4,
                treatment = ?5,
                prescription = ?6,
                notes = ?7,
                doctor_name = ?8
            WHERE id = ?1
            "#,
            params![
                id,
                draft.patient_id,
                draft.visit_date,
                draft.diagnosis,
                draft.treatment,
                draft.prescription,
                draft.notes,
                draft.doctor_name,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    fn delete_medical_record(&self, id: &str) -> StoreResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM medical_records WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    fn count_medical_records(&self) -> StoreResult<u64> {
        Ok(self.count("SELECT COUNT(*) FROM medical_records", [])?)
    }
}

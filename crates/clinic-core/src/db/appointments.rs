//! Appointment database operations.

use rusqlite::{params, Row};

use super::Database;
use crate::models::{
    now_timestamp, Appointment, AppointmentDraft, AppointmentStatus, AppointmentWithPatient,
    PatientName,
};
use crate::store::{AppointmentStore, StoreResult};

const APPOINTMENT_COLUMNS: &str = r#"
    a.id, a.patient_id, a.appointment_date, a.appointment_type, a.status,
    a.notes, a.created_by, a.created_at, a.updated_at
"#;

fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    let status: String = row.get(4)?;
    let status = status.parse::<AppointmentStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Appointment {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        appointment_date: row.get(2)?,
        appointment_type: row.get(3)?,
        status,
        notes: row.get(5)?,
        created_by: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Appointment columns followed by the joined patient's first and last name.
fn appointment_with_patient_from_row(row: &Row<'_>) -> rusqlite::Result<AppointmentWithPatient> {
    Ok(AppointmentWithPatient {
        appointment: appointment_from_row(row)?,
        patient: Some(PatientName {
            first_name: row.get(9)?,
            last_name: row.get(10)?,
        }),
    })
}

impl Database {
    fn query_appointments_with_patient(
        &self,
        order_and_limit: &str,
        params: impl rusqlite::Params,
    ) -> StoreResult<Vec<AppointmentWithPatient>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}, p.first_name, p.last_name
            FROM appointments a
            JOIN patients p ON p.id = a.patient_id
            {order_and_limit}
            "#
        ))?;

        let rows = stmt.query_map(params, appointment_with_patient_from_row)?;
        let appointments = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(appointments)
    }
}

impl AppointmentStore for Database {
    fn list_appointments(&self) -> StoreResult<Vec<AppointmentWithPatient>> {
        self.query_appointments_with_patient("ORDER BY a.appointment_date ASC", [])
    }

    fn list_appointments_for_patient(&self, patient_id: &str) -> StoreResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments a
            WHERE a.patient_id = ?
            ORDER BY a.appointment_date DESC
            "#
        ))?;

        let rows = stmt.query_map([patient_id], appointment_from_row)?;
        let appointments = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(appointments)
    }

    fn recent_appointments(&self, limit: usize) -> StoreResult<Vec<AppointmentWithPatient>> {
        self.query_appointments_with_patient(
            "ORDER BY a.created_at DESC, a.rowid DESC LIMIT ?",
            [limit as i64],
        )
    }

    fn insert_appointment(&self, draft: &AppointmentDraft) -> StoreResult<Appointment> {
        let appointment = Appointment::from_draft(draft);
        self.conn.execute(
            r#"
            INSERT INTO appointments (
                id, patient_id, appointment_date, appointment_type, status,
                notes, created_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                appointment.id,
                appointment.patient_id,
                appointment.appointment_date,
                appointment.appointment_type,
                appointment.status.as_str(),
                appointment.notes,
                appointment.created_by,
                appointment.created_at,
                appointment.updated_at,
            ],
        )?;
        Ok(appointment)
    }

    fn update_appointment(&self, id: &str, draft: &AppointmentDraft) -> StoreResult<bool> {
        // created_by records who booked it and is never rewritten
        let rows_affected = self.conn.execute(
            r#"
            UPDATE appointments SET
                patient_id = ?2,
                appointment_date = ?3,
                appointment_type = ?4,
                status = ?5,
                notes = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
            params![
                id,
                draft.patient_id,
                draft.appointment_date,
                draft.appointment_type,
                draft.status.as_str(),
                draft.notes,
                now_timestamp(),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    fn delete_appointment(&self, id: &str) -> StoreResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM appointments WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    fn count_appointments_between(&self, start: &str, end: &str) -> StoreResult<u64> {
        Ok(self.count(
            "SELECT COUNT(*) FROM appointments WHERE appointment_date >= ?1 AND appointment_date < ?2",
            [start, end],
        )?)
    }

    fn count_appointments_with_status(&self, status: AppointmentStatus) -> StoreResult<u64> {
        Ok(self.count(
            "SELECT COUNT(*) FROM appointments WHERE status = ?",
            [status.as_str()],
        )?)
    }
}

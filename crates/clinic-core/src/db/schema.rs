//! SQLite schema definition.
//!
//! Mirrors the hosted backend's tables so the local store enforces the same
//! rules: patient foreign keys cascade on delete and appointment status is
//! restricted to the known values.

/// Complete database schema for the clinic.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL CHECK (length(trim(first_name)) > 0),
    last_name TEXT NOT NULL CHECK (length(trim(last_name)) > 0),
    email TEXT,
    phone TEXT,
    date_of_birth TEXT,                          -- YYYY-MM-DD
    address TEXT,
    emergency_contact TEXT,
    insurance_info TEXT,
    medical_history TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_last_name ON patients(last_name);
CREATE INDEX IF NOT EXISTS idx_patients_created_at ON patients(created_at);

-- ============================================================================
-- Appointments
-- ============================================================================

CREATE TABLE IF NOT EXISTS appointments (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    appointment_date TEXT NOT NULL,              -- RFC 3339 UTC
    appointment_type TEXT NOT NULL DEFAULT 'General Consultation',
    status TEXT NOT NULL DEFAULT 'Scheduled' CHECK (status IN (
        'Scheduled', 'Confirmed', 'In Progress', 'Completed', 'Cancelled', 'No Show'
    )),
    notes TEXT NOT NULL DEFAULT '',
    created_by TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_appointments_patient ON appointments(patient_id);
CREATE INDEX IF NOT EXISTS idx_appointments_date ON appointments(appointment_date);
CREATE INDEX IF NOT EXISTS idx_appointments_status ON appointments(status);

-- ============================================================================
-- Medical Records
-- ============================================================================

CREATE TABLE IF NOT EXISTS medical_records (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    visit_date TEXT NOT NULL,                    -- RFC 3339 UTC
    diagnosis TEXT NOT NULL DEFAULT '',
    treatment TEXT NOT NULL DEFAULT '',
    prescription TEXT NOT NULL DEFAULT '',
    notes TEXT NOT NULL DEFAULT '',
    doctor_name TEXT NOT NULL DEFAULT '',
    created_by TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_records_patient ON medical_records(patient_id);
CREATE INDEX IF NOT EXISTS idx_records_visit_date ON medical_records(visit_date);

-- ============================================================================
-- Staff Profiles
-- ============================================================================

CREATE TABLE IF NOT EXISTS staff_profiles (
    id TEXT PRIMARY KEY,                         -- auth user id
    full_name TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'staff' CHECK (role IN (
        'admin', 'doctor', 'nurse', 'receptionist', 'staff'
    )),
    phone TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute(
            "INSERT INTO patients (id, first_name, last_name) VALUES ('p1', 'Ada', 'Lovelace')",
            [],
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_status_constraint() {
        let conn = setup();

        let result = conn.execute(
            "INSERT INTO appointments (id, patient_id, appointment_date, status) VALUES ('a1', 'p1', '2026-10-18T09:00:00Z', 'Pending')",
            [],
        );
        assert!(result.is_err());

        let result = conn.execute(
            "INSERT INTO appointments (id, patient_id, appointment_date, status) VALUES ('a1', 'p1', '2026-10-18T09:00:00Z', 'No Show')",
            [],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_foreign_key_required() {
        let conn = setup();

        let result = conn.execute(
            "INSERT INTO medical_records (id, patient_id, visit_date) VALUES ('r1', 'missing', '2026-10-18T09:00:00Z')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_cascade_delete() {
        let conn = setup();
        conn.execute(
            "INSERT INTO appointments (id, patient_id, appointment_date) VALUES ('a1', 'p1', '2026-10-18T09:00:00Z')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO medical_records (id, patient_id, visit_date) VALUES ('r1', 'p1', '2026-10-18T09:00:00Z')",
            [],
        )
        .unwrap();

        conn.execute("DELETE FROM patients WHERE id = 'p1'", []).unwrap();

        let remaining: i64 = conn
            .query_row(
                "SELECT (SELECT COUNT(*) FROM appointments) + (SELECT COUNT(*) FROM medical_records)",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_blank_name_rejected() {
        let conn = setup();
        let result = conn.execute(
            "INSERT INTO patients (id, first_name, last_name) VALUES ('p2', '  ', 'Smith')",
            [],
        );
        assert!(result.is_err());
    }
}

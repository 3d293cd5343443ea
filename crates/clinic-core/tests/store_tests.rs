//! SQLite store integration tests: relational rules and dashboard counts.

use chrono::NaiveDate;
use clinic_core::db::{Database, DbError};
use clinic_core::models::{AppointmentDraft, AppointmentStatus, MedicalRecordDraft, PatientDraft};
use clinic_core::store::{AppointmentStore, MedicalRecordStore, PatientStore};
use clinic_core::views::{Dashboard, DashboardStats};
use clinic_core::StoreError;

fn seed_patient(db: &Database, first: &str, last: &str) -> String {
    db.insert_patient(&PatientDraft::new(first, last))
        .unwrap()
        .id
}

#[test]
fn test_deleting_patient_cascades() {
    let db = Database::open_in_memory().unwrap();
    let ada = seed_patient(&db, "Ada", "Lovelace");
    let grace = seed_patient(&db, "Grace", "Hopper");

    for patient in [&ada, &grace] {
        db.insert_appointment(&AppointmentDraft::new(patient.clone(), "2026-10-18T09:00:00Z"))
            .unwrap();
        db.insert_medical_record(&MedicalRecordDraft::new(patient.clone()))
            .unwrap();
    }

    assert!(db.delete_patient(&ada).unwrap());

    assert!(db.list_appointments_for_patient(&ada).unwrap().is_empty());
    assert!(db.list_medical_records_for_patient(&ada).unwrap().is_empty());
    assert_eq!(db.list_appointments().unwrap().len(), 1);
    assert_eq!(db.count_medical_records().unwrap(), 1);
}

#[test]
fn test_orphan_rows_rejected() {
    let db = Database::open_in_memory().unwrap();

    let appointment = db.insert_appointment(&AppointmentDraft::new("ghost", "2026-10-18T09:00:00Z"));
    assert!(matches!(
        appointment,
        Err(StoreError::Database(DbError::Constraint(_)))
    ));

    let record = db.insert_medical_record(&MedicalRecordDraft::new("ghost"));
    assert!(matches!(
        record,
        Err(StoreError::Database(DbError::Constraint(_)))
    ));
}

#[test]
fn test_dashboard_counts_match_filters() {
    let db = Database::open_in_memory().unwrap();
    let ada = seed_patient(&db, "Ada", "Lovelace");
    seed_patient(&db, "Grace", "Hopper");
    seed_patient(&db, "Alan", "Turing");

    let schedule = [
        ("2026-10-18T08:00:00Z", AppointmentStatus::Scheduled),
        ("2026-10-18T12:30:00Z", AppointmentStatus::Confirmed),
        ("2026-10-18T23:59:59Z", AppointmentStatus::Scheduled),
        ("2026-10-19T00:00:00Z", AppointmentStatus::Scheduled),
        ("2026-10-17T23:59:59Z", AppointmentStatus::Cancelled),
    ];
    for (date, status) in schedule {
        let mut draft = AppointmentDraft::new(ada.clone(), date);
        draft.status = status;
        db.insert_appointment(&draft).unwrap();
    }
    for _ in 0..2 {
        db.insert_medical_record(&MedicalRecordDraft::new(ada.clone()))
            .unwrap();
    }

    let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let dashboard = Dashboard::load(&db, today);
    assert_eq!(
        dashboard.stats(),
        DashboardStats {
            total_patients: 3,
            today_appointments: 3,
            total_records: 2,
            pending_appointments: 3,
        }
    );
    assert_eq!(dashboard.recent_appointments().len(), 5);
    assert_eq!(dashboard.recent_appointments()[0].patient_name(), "Ada Lovelace");
}

#[test]
fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clinic.db");

    let id = {
        let db = Database::open(&path).unwrap();
        seed_patient(&db, "Ada", "Lovelace")
    };

    let db = Database::open(&path).unwrap();
    let patient = db.get_patient(&id).unwrap().unwrap();
    assert_eq!(patient.full_name(), "Ada Lovelace");
}

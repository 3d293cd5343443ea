//! Dashboard: headline counts and recent activity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{day_bounds, AppointmentStatus, AppointmentWithPatient};
use crate::store::{AppointmentStore, MedicalRecordStore, PatientStore, StoreResult};

/// Number of appointments shown under recent activity.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_patients: u64,
    /// Appointments whose date falls on the given day
    pub today_appointments: u64,
    pub total_records: u64,
    /// Appointments still in `Scheduled` status
    pub pending_appointments: u64,
}

/// Dashboard state.
///
/// Each count is fetched independently. A failed count shows as zero and its
/// error is kept in [`Dashboard::errors`]; it never blocks the other counts.
#[derive(Debug, Default)]
pub struct Dashboard {
    stats: DashboardStats,
    recent: Vec<AppointmentWithPatient>,
    errors: Vec<String>,
}

impl Dashboard {
    pub fn load<S>(store: &S, today: NaiveDate) -> Self
    where
        S: PatientStore + AppointmentStore + MedicalRecordStore + ?Sized,
    {
        let mut errors = Vec::new();
        let (start, end) = day_bounds(today);

        let stats = DashboardStats {
            total_patients: count_or_zero("patients", store.count_patients(), &mut errors),
            today_appointments: count_or_zero(
                "today's appointments",
                store.count_appointments_between(&start, &end),
                &mut errors,
            ),
            total_records: count_or_zero(
                "medical records",
                store.count_medical_records(),
                &mut errors,
            ),
            pending_appointments: count_or_zero(
                "pending appointments",
                store.count_appointments_with_status(AppointmentStatus::Scheduled),
                &mut errors,
            ),
        };

        let recent = match store.recent_appointments(RECENT_ACTIVITY_LIMIT) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(error = %e, "Error fetching recent activity");
                errors.push(e.message());
                Vec::new()
            }
        };

        Self {
            stats,
            recent,
            errors,
        }
    }

    pub fn stats(&self) -> DashboardStats {
        self.stats
    }

    /// Most recently created appointments, newest first.
    pub fn recent_appointments(&self) -> &[AppointmentWithPatient] {
        &self.recent
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

fn count_or_zero(what: &str, result: StoreResult<u64>, errors: &mut Vec<String>) -> u64 {
    result.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Error fetching {} count", what);
        errors.push(e.message());
        0
    })
}

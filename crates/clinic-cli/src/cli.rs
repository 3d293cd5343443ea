// Command-line arguments and subcommands for the clinic CLI.
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use clinic_core::models::{AppointmentDraft, MedicalRecordDraft, PatientDraft};
use clinic_core::AppointmentStatus;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "clinic")]
#[command(about = "Clinic desk - patients, appointments and medical records")]
#[command(version)]
pub struct Cli {
    /// Use a local SQLite file instead of the hosted backend
    #[arg(long, global = true, env = "CLINIC_DATABASE", value_hint = clap::ValueHint::FilePath)]
    pub database: Option<PathBuf>,

    /// Sign-in email for the hosted backend
    #[arg(long, global = true, env = "CLINIC_EMAIL")]
    pub email: Option<String>,

    /// Sign-in password for the hosted backend
    #[arg(long, global = true, env = "CLINIC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Staff identifier used with a local database
    #[arg(long, global = true, env = "CLINIC_STAFF_ID", default_value = "local-staff")]
    pub staff_id: String,

    /// Answer yes to delete confirmations
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Headline counts and recent activity
    Dashboard {
        /// Day to count appointments for (YYYY-MM-DD) [default: today, UTC]
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Patients {
        #[command(subcommand)]
        action: PatientCommand,
    },
    Appointments {
        #[command(subcommand)]
        action: AppointmentCommand,
    },
    Records {
        #[command(subcommand)]
        action: RecordCommand,
    },
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum PatientCommand {
    List {
        /// Filter by name, email or phone
        #[arg(long, short = 's')]
        search: Option<String>,
    },
    /// Patient details with appointment and record history
    Show { id: String },
    Add(PatientFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: PatientFields,
    },
    /// Delete a patient with all their appointments and records
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum AppointmentCommand {
    List,
    Add(AppointmentFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: AppointmentFields,
    },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum RecordCommand {
    List {
        /// Filter by patient name, diagnosis or doctor
        #[arg(long, short = 's')]
        search: Option<String>,
    },
    Add(RecordFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: RecordFields,
    },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Show,
    Update {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

/// Patient form fields. Fields left out keep their current value.
#[derive(Debug, Args, Default)]
pub struct PatientFields {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    /// Patient's email (`--email` is the sign-in address)
    #[arg(id = "patient_email", long = "patient-email")]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// YYYY-MM-DD
    #[arg(long = "dob")]
    pub date_of_birth: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub emergency_contact: Option<String>,
    #[arg(long = "insurance")]
    pub insurance_info: Option<String>,
    #[arg(long = "history")]
    pub medical_history: Option<String>,
}

impl PatientFields {
    pub fn apply(self, draft: &mut PatientDraft) {
        if let Some(v) = self.first_name {
            draft.first_name = v;
        }
        if let Some(v) = self.last_name {
            draft.last_name = v;
        }
        if let Some(v) = self.medical_history {
            draft.medical_history = v;
        }
        for (field, value) in [
            (&mut draft.email, self.email),
            (&mut draft.phone, self.phone),
            (&mut draft.date_of_birth, self.date_of_birth),
            (&mut draft.address, self.address),
            (&mut draft.emergency_contact, self.emergency_contact),
            (&mut draft.insurance_info, self.insurance_info),
        ] {
            if value.is_some() {
                *field = value;
            }
        }
    }
}

#[derive(Debug, Args, Default)]
pub struct AppointmentFields {
    #[arg(long = "patient")]
    pub patient_id: Option<String>,
    /// Date and time, e.g. 2026-10-18T14:30
    #[arg(long = "date")]
    pub appointment_date: Option<String>,
    #[arg(long = "type")]
    pub appointment_type: Option<String>,
    /// Scheduled, Confirmed, In Progress, Completed, Cancelled or No Show
    #[arg(long)]
    pub status: Option<AppointmentStatus>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl AppointmentFields {
    pub fn apply(self, draft: &mut AppointmentDraft) {
        if let Some(v) = self.patient_id {
            draft.patient_id = v;
        }
        if let Some(v) = self.appointment_date {
            draft.appointment_date = v;
        }
        if let Some(v) = self.appointment_type {
            draft.appointment_type = v;
        }
        if let Some(v) = self.status {
            draft.status = v;
        }
        if let Some(v) = self.notes {
            draft.notes = v;
        }
    }
}

#[derive(Debug, Args, Default)]
pub struct RecordFields {
    #[arg(long = "patient")]
    pub patient_id: Option<String>,
    /// Visit date and time [default: now]
    #[arg(long)]
    pub visit_date: Option<String>,
    #[arg(long)]
    pub diagnosis: Option<String>,
    #[arg(long)]
    pub treatment: Option<String>,
    #[arg(long)]
    pub prescription: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long = "doctor")]
    pub doctor_name: Option<String>,
}

impl RecordFields {
    pub fn apply(self, draft: &mut MedicalRecordDraft) {
        for (field, value) in [
            (&mut draft.patient_id, self.patient_id),
            (&mut draft.visit_date, self.visit_date),
            (&mut draft.diagnosis, self.diagnosis),
            (&mut draft.treatment, self.treatment),
            (&mut draft.prescription, self.prescription),
            (&mut draft.notes, self.notes),
            (&mut draft.doctor_name, self.doctor_name),
        ] {
            if let Some(value) = value {
                *field = value;
            }
        }
    }
}

// Subcommand handlers. Each one drives the matching view controller and
// prints the result.
use anyhow::{anyhow, bail, Context as _, Result};
use chrono::NaiveDate;
use clinic_core::models::{AppointmentWithPatient, MedicalRecordWithPatient, Patient};
use clinic_core::store::PatientStore;
use clinic_core::views::{
    ActiveView, AppointmentForm, AppointmentListView, Dashboard, MedicalRecordForm,
    MedicalRecordListView, PatientDetails, PatientForm, PatientListView, SettingsView, Shell, Tab,
};
use clinic_core::{AuthContext, ClinicStore, DeleteOutcome, Prompt, SubmitOutcome};
use std::io::Write;

use crate::cli::{AppointmentCommand, Command, PatientCommand, RecordCommand, SettingsCommand};

/// Everything a handler needs besides its arguments.
pub struct Context<'a> {
    pub store: &'a dyn ClinicStore,
    pub auth: &'a AuthContext,
    pub prompt: &'a dyn Prompt,
    pub today: NaiveDate,
}

impl Context<'_> {
    /// Open a tab through the shell, so signed-out sessions hit the gate.
    fn open(&self, tab: Tab, today: NaiveDate) -> Result<ActiveView> {
        let mut shell = Shell::new();
        shell.navigate(tab, self.store, self.auth, today);
        match std::mem::replace(shell.view_mut(), ActiveView::SignIn) {
            ActiveView::SignIn => bail!("Not signed in"),
            view => Ok(view),
        }
    }
}

pub fn run(ctx: &Context<'_>, command: Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Dashboard { date } => dashboard(ctx, date.unwrap_or(ctx.today), out),
        Command::Patients { action } => patients(ctx, action, out),
        Command::Appointments { action } => appointments(ctx, action, out),
        Command::Records { action } => records(ctx, action, out),
        Command::Settings { action } => settings(ctx, action, out),
    }
}

fn dashboard(ctx: &Context<'_>, day: NaiveDate, out: &mut dyn Write) -> Result<()> {
    let ActiveView::Dashboard(dashboard) = ctx.open(Tab::Dashboard, day)? else {
        bail!("dashboard did not load");
    };
    print_dashboard(&dashboard, day, out)
}

fn print_dashboard(dashboard: &Dashboard, day: NaiveDate, out: &mut dyn Write) -> Result<()> {
    let stats = dashboard.stats();
    writeln!(out, "Total patients:        {}", stats.total_patients)?;
    writeln!(out, "Appointments {}: {}", day, stats.today_appointments)?;
    writeln!(out, "Medical records:       {}", stats.total_records)?;
    writeln!(out, "Pending appointments:  {}", stats.pending_appointments)?;
    writeln!(out)?;
    writeln!(out, "Recent activity")?;
    if dashboard.recent_appointments().is_empty() {
        writeln!(out, "  No recent appointments")?;
    }
    for row in dashboard.recent_appointments() {
        write_appointment(out, row)?;
    }
    for error in dashboard.errors() {
        writeln!(out, "warning: {}", error)?;
    }
    Ok(())
}

fn patients(ctx: &Context<'_>, action: PatientCommand, out: &mut dyn Write) -> Result<()> {
    match action {
        PatientCommand::List { search } => {
            let ActiveView::Patients(mut view) = ctx.open(Tab::Patients, ctx.today)? else {
                bail!("patient list did not load");
            };
            if let Some(error) = view.error() {
                bail!("Error fetching patients: {}", error);
            }
            view.set_search(search.unwrap_or_default());
            let visible = view.visible();
            if visible.is_empty() {
                writeln!(out, "No patients found")?;
            }
            for patient in visible {
                write_patient(out, patient)?;
            }
            Ok(())
        }
        PatientCommand::Show { id } => {
            let patient = find_patient(ctx, &id)?;
            let details = PatientDetails::load(ctx.store, patient);
            if let Some(error) = details.error() {
                bail!("Error fetching patient data: {}", error);
            }
            write_patient_details(out, &details)
        }
        PatientCommand::Add(fields) => {
            let mut form = PatientForm::new();
            fields.apply(&mut form.draft);
            report_saved(form.submit(ctx.store, ctx.auth, ctx.prompt)?, "patient", out)
        }
        PatientCommand::Edit { id, fields } => {
            let mut form = PatientForm::edit(&find_patient(ctx, &id)?);
            fields.apply(&mut form.draft);
            report_saved(form.submit(ctx.store, ctx.auth, ctx.prompt)?, "patient", out)
        }
        PatientCommand::Delete { id } => {
            let outcome = PatientListView::new().delete(ctx.store, ctx.auth, ctx.prompt, &id)?;
            report_deleted(outcome, "patient", &id, out)
        }
    }
}

fn appointments(ctx: &Context<'_>, action: AppointmentCommand, out: &mut dyn Write) -> Result<()> {
    match action {
        AppointmentCommand::List => {
            let ActiveView::Appointments(view) = ctx.open(Tab::Appointments, ctx.today)? else {
                bail!("appointment list did not load");
            };
            if let Some(error) = view.error() {
                bail!("Error fetching appointments: {}", error);
            }
            if view.appointments().is_empty() {
                writeln!(out, "No appointments found")?;
            }
            for row in view.appointments() {
                write_appointment(out, row)?;
            }
            Ok(())
        }
        AppointmentCommand::Add(fields) => {
            let mut form = AppointmentForm::new();
            fields.apply(&mut form.draft);
            report_saved(form.submit(ctx.store, ctx.auth, ctx.prompt)?, "appointment", out)
        }
        AppointmentCommand::Edit { id, fields } => {
            let view = AppointmentListView::loaded(ctx.store);
            let appointment = view
                .find(&id)
                .ok_or_else(|| anyhow!("No appointment with ID {}", id))?;
            let mut form = AppointmentForm::edit(appointment);
            fields.apply(&mut form.draft);
            report_saved(form.submit(ctx.store, ctx.auth, ctx.prompt)?, "appointment", out)
        }
        AppointmentCommand::Delete { id } => {
            let outcome = AppointmentListView::new().delete(ctx.store, ctx.auth, ctx.prompt, &id)?;
            report_deleted(outcome, "appointment", &id, out)
        }
    }
}

fn records(ctx: &Context<'_>, action: RecordCommand, out: &mut dyn Write) -> Result<()> {
    match action {
        RecordCommand::List { search } => {
            let ActiveView::Records(mut view) = ctx.open(Tab::Records, ctx.today)? else {
                bail!("medical record list did not load");
            };
            if let Some(error) = view.error() {
                bail!("Error fetching medical records: {}", error);
            }
            view.set_search(search.unwrap_or_default());
            let visible = view.visible();
            if visible.is_empty() {
                writeln!(out, "No medical records found")?;
            }
            for row in visible {
                write_record(out, row)?;
            }
            Ok(())
        }
        RecordCommand::Add(fields) => {
            let mut form = MedicalRecordForm::new();
            fields.apply(&mut form.draft);
            report_saved(form.submit(ctx.store, ctx.auth, ctx.prompt)?, "medical record", out)
        }
        RecordCommand::Edit { id, fields } => {
            let view = MedicalRecordListView::loaded(ctx.store);
            let record = view
                .find(&id)
                .ok_or_else(|| anyhow!("No medical record with ID {}", id))?;
            let mut form = MedicalRecordForm::edit(record);
            fields.apply(&mut form.draft);
            report_saved(form.submit(ctx.store, ctx.auth, ctx.prompt)?, "medical record", out)
        }
        RecordCommand::Delete { id } => {
            let outcome = MedicalRecordListView::new().delete(ctx.store, ctx.auth, ctx.prompt, &id)?;
            report_deleted(outcome, "medical record", &id, out)
        }
    }
}

fn settings(ctx: &Context<'_>, action: SettingsCommand, out: &mut dyn Write) -> Result<()> {
    match action {
        SettingsCommand::Show => {
            let ActiveView::Settings(view) = ctx.open(Tab::Settings, ctx.today)? else {
                bail!("settings did not load");
            };
            if let Some(error) = view.error() {
                bail!("Error fetching profile: {}", error);
            }
            let profile = view.profile();
            writeln!(out, "ID:        {}", profile.id)?;
            writeln!(out, "Full name: {}", or_dash(Some(profile.full_name.as_str())))?;
            writeln!(out, "Role:      {}", profile.role)?;
            writeln!(out, "Phone:     {}", or_dash(profile.phone.as_deref()))?;
            if !view.is_stored() {
                writeln!(out, "(profile not saved yet)")?;
            }
            Ok(())
        }
        SettingsCommand::Update { full_name, phone } => {
            let mut view = SettingsView::load(ctx.store, ctx.auth)?;
            let full_name = full_name.unwrap_or_else(|| view.profile().full_name.clone());
            let phone = phone.or_else(|| view.profile().phone.clone());
            let outcome = view.save(ctx.store, ctx.prompt, &full_name, phone.as_deref());
            report_saved(outcome, "profile", out)
        }
    }
}

fn find_patient(ctx: &Context<'_>, id: &str) -> Result<Patient> {
    ctx.store
        .get_patient(id)
        .with_context(|| format!("Error fetching patient {}", id))?
        .ok_or_else(|| anyhow!("No patient with ID {}", id))
}

fn report_saved(outcome: SubmitOutcome, what: &str, out: &mut dyn Write) -> Result<()> {
    match outcome {
        SubmitOutcome::Created(id) => writeln!(out, "Created {} {}", what, id)?,
        SubmitOutcome::Updated(id) => writeln!(out, "Updated {} {}", what, id)?,
        // The prompt has already shown why
        SubmitOutcome::Invalid(_) | SubmitOutcome::Failed(_) => bail!("{} not saved", what),
    }
    Ok(())
}

fn report_deleted(outcome: DeleteOutcome, what: &str, id: &str, out: &mut dyn Write) -> Result<()> {
    match outcome {
        DeleteOutcome::Deleted => writeln!(out, "Deleted {} {}", what, id)?,
        DeleteOutcome::Cancelled => writeln!(out, "Cancelled")?,
        DeleteOutcome::NotFound => bail!("No {} with ID {}", what, id),
        DeleteOutcome::Failed => bail!("{} not deleted", what),
    }
    Ok(())
}

fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "-",
    }
}

fn write_patient(out: &mut dyn Write, patient: &Patient) -> Result<()> {
    writeln!(
        out,
        "{}  {:<28} {:<28} {}",
        patient.id,
        patient.full_name(),
        or_dash(patient.email.as_deref()),
        or_dash(patient.phone.as_deref()),
    )?;
    Ok(())
}

fn write_patient_details(out: &mut dyn Write, details: &PatientDetails) -> Result<()> {
    let patient = &details.patient;
    writeln!(out, "{}", patient.full_name())?;
    writeln!(out, "  ID:                {}", patient.id)?;
    writeln!(out, "  Email:             {}", or_dash(patient.email.as_deref()))?;
    writeln!(out, "  Phone:             {}", or_dash(patient.phone.as_deref()))?;
    writeln!(out, "  Date of birth:     {}", or_dash(patient.date_of_birth.as_deref()))?;
    writeln!(out, "  Address:           {}", or_dash(patient.address.as_deref()))?;
    writeln!(out, "  Emergency contact: {}", or_dash(patient.emergency_contact.as_deref()))?;
    writeln!(out, "  Insurance:         {}", or_dash(patient.insurance_info.as_deref()))?;
    writeln!(out, "  Medical history:   {}", or_dash(Some(patient.medical_history.as_str())))?;

    writeln!(out, "\nAppointments ({})", details.appointments().len())?;
    for a in details.appointments() {
        writeln!(out, "  {}  {}  {}  [{}]", a.id, a.appointment_date, a.appointment_type, a.status)?;
    }
    writeln!(out, "\nMedical records ({})", details.records().len())?;
    for r in details.records() {
        writeln!(
            out,
            "  {}  {}  {}  {}",
            r.id,
            r.visit_date,
            or_dash(Some(r.diagnosis.as_str())),
            or_dash(Some(r.doctor_name.as_str())),
        )?;
    }
    Ok(())
}

fn write_appointment(out: &mut dyn Write, row: &AppointmentWithPatient) -> Result<()> {
    let a = &row.appointment;
    writeln!(
        out,
        "{}  {}  {:<24} {:<22} [{}]",
        a.id,
        a.appointment_date,
        row.patient_name(),
        a.appointment_type,
        a.status,
    )?;
    Ok(())
}

fn write_record(out: &mut dyn Write, row: &MedicalRecordWithPatient) -> Result<()> {
    let r = &row.record;
    writeln!(
        out,
        "{}  {}  {:<24} {:<24} {}",
        r.id,
        r.visit_date,
        row.patient_name(),
        or_dash(Some(r.diagnosis.as_str())),
        or_dash(Some(r.doctor_name.as_str())),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{AppointmentFields, PatientFields, RecordFields};
    use crate::prompt::TerminalPrompt;
    use clinic_core::{Database, Session};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn exec(db: &Database, auth: &AuthContext, command: Command) -> Result<String> {
        let prompt = TerminalPrompt::new(true);
        let ctx = Context {
            store: db,
            auth,
            prompt: &prompt,
            today: today(),
        };
        let mut out = Vec::new();
        run(&ctx, command, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn add_patient(db: &Database, auth: &AuthContext) -> String {
        let output = exec(
            db,
            auth,
            Command::Patients {
                action: PatientCommand::Add(PatientFields {
                    first_name: Some("Ada".into()),
                    last_name: Some("Lovelace".into()),
                    email: Some("ada@example.com".into()),
                    ..Default::default()
                }),
            },
        )
        .unwrap();
        output
            .trim()
            .strip_prefix("Created patient ")
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_patient_lifecycle() {
        let db = Database::open_in_memory().unwrap();
        let auth = AuthContext::with_session(Session::local("staff-1"));
        let id = add_patient(&db, &auth);

        let listed = exec(
            &db,
            &auth,
            Command::Patients {
                action: PatientCommand::List {
                    search: Some("ADA@".into()),
                },
            },
        )
        .unwrap();
        assert!(listed.contains("Ada Lovelace"));

        let deleted = exec(
            &db,
            &auth,
            Command::Patients {
                action: PatientCommand::Delete { id: id.clone() },
            },
        )
        .unwrap();
        assert_eq!(deleted.trim(), format!("Deleted patient {}", id));
        assert_eq!(db.count_patients().unwrap(), 0);
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        let auth = AuthContext::with_session(Session::local("staff-1"));
        let result = exec(
            &db,
            &auth,
            Command::Patients {
                action: PatientCommand::Add(PatientFields {
                    first_name: Some("Ada".into()),
                    ..Default::default()
                }),
            },
        );
        assert!(result.is_err());
        assert_eq!(db.count_patients().unwrap(), 0);
    }

    #[test]
    fn test_dashboard_and_records() {
        let db = Database::open_in_memory().unwrap();
        let auth = AuthContext::with_session(Session::local("staff-1"));
        let patient_id = add_patient(&db, &auth);

        exec(
            &db,
            &auth,
            Command::Appointments {
                action: AppointmentCommand::Add(AppointmentFields {
                    patient_id: Some(patient_id.clone()),
                    appointment_date: Some("2026-10-18T09:30".into()),
                    ..Default::default()
                }),
            },
        )
        .unwrap();
        exec(
            &db,
            &auth,
            Command::Records {
                action: RecordCommand::Add(RecordFields {
                    patient_id: Some(patient_id),
                    diagnosis: Some("Myopia".into()),
                    ..Default::default()
                }),
            },
        )
        .unwrap();

        let dashboard = exec(&db, &auth, Command::Dashboard { date: None }).unwrap();
        assert!(dashboard.contains("Total patients:        1"));
        assert!(dashboard.contains("Appointments 2026-10-18: 1"));
        assert!(dashboard.contains("Pending appointments:  1"));

        let records = exec(
            &db,
            &auth,
            Command::Records {
                action: RecordCommand::List {
                    search: Some("myo".into()),
                },
            },
        )
        .unwrap();
        assert!(records.contains("Myopia"));
    }

    #[test]
    fn test_signed_out_is_gated() {
        let db = Database::open_in_memory().unwrap();
        let err = exec(&db, &AuthContext::new(), Command::Dashboard { date: None }).unwrap_err();
        assert_eq!(err.to_string(), "Not signed in");
    }

    #[test]
    fn test_signed_out_writes_are_refused() {
        let db = Database::open_in_memory().unwrap();
        let signed_out = AuthContext::new();

        let err = exec(
            &db,
            &signed_out,
            Command::Patients {
                action: PatientCommand::Add(PatientFields {
                    first_name: Some("Ada".into()),
                    last_name: Some("Lovelace".into()),
                    ..Default::default()
                }),
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Not signed in");
        assert_eq!(db.count_patients().unwrap(), 0);

        let id = add_patient(&db, &AuthContext::with_session(Session::local("staff-1")));
        let err = exec(
            &db,
            &signed_out,
            Command::Patients {
                action: PatientCommand::Delete { id },
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Not signed in");
        assert_eq!(db.count_patients().unwrap(), 1);
    }
}

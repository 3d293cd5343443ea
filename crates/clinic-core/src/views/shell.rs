//! Navigation shell.
//!
//! Owns the currently active screen. Every navigation rebuilds the target
//! controller, so each visit re-fetches from the store. While nobody is signed
//! in the shell only shows the sign-in gate.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::{AppointmentListView, Dashboard, MedicalRecordListView, PatientListView, SettingsView};
use crate::session::AuthContext;
use crate::store::ClinicStore;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown tab: {0}")]
pub struct UnknownTab(pub String);

/// Sidebar entries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    Patients,
    Appointments,
    Records,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Dashboard,
        Tab::Patients,
        Tab::Appointments,
        Tab::Records,
        Tab::Settings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Patients => "Patients",
            Tab::Appointments => "Appointments",
            Tab::Records => "Medical Records",
            Tab::Settings => "Settings",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tab {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" => Ok(Tab::Dashboard),
            "patients" => Ok(Tab::Patients),
            "appointments" => Ok(Tab::Appointments),
            "records" | "medical records" => Ok(Tab::Records),
            "settings" => Ok(Tab::Settings),
            _ => Err(UnknownTab(s.to_string())),
        }
    }
}

/// The screen currently on display.
#[derive(Debug)]
pub enum ActiveView {
    SignIn,
    Dashboard(Dashboard),
    Patients(PatientListView),
    Appointments(AppointmentListView),
    Records(MedicalRecordListView),
    Settings(SettingsView),
}

#[derive(Debug)]
pub struct Shell {
    tab: Tab,
    view: ActiveView,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

impl Shell {
    /// A shell on the dashboard tab that has not loaded anything yet.
    pub fn new() -> Self {
        Self {
            tab: Tab::Dashboard,
            view: ActiveView::SignIn,
        }
    }

    pub fn active(&self) -> Tab {
        self.tab
    }

    pub fn view(&self) -> &ActiveView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ActiveView {
        &mut self.view
    }

    /// True while nobody is signed in.
    pub fn is_gated(&self, auth: &AuthContext) -> bool {
        !auth.is_signed_in()
    }

    /// Switch to `tab` and load it. The tab is remembered while gated, so
    /// signing in and refreshing lands on it.
    pub fn navigate<S>(&mut self, tab: Tab, store: &S, auth: &AuthContext, today: NaiveDate) -> &ActiveView
    where
        S: ClinicStore + ?Sized,
    {
        self.tab = tab;
        self.refresh(store, auth, today)
    }

    /// Reload the active tab.
    pub fn refresh<S>(&mut self, store: &S, auth: &AuthContext, today: NaiveDate) -> &ActiveView
    where
        S: ClinicStore + ?Sized,
    {
        self.view = if self.is_gated(auth) {
            ActiveView::SignIn
        } else {
            tracing::debug!(tab = %self.tab, "loading view");
            match self.tab {
                Tab::Dashboard => ActiveView::Dashboard(Dashboard::load(store, today)),
                Tab::Patients => ActiveView::Patients(PatientListView::loaded(store)),
                Tab::Appointments => ActiveView::Appointments(AppointmentListView::loaded(store)),
                Tab::Records => ActiveView::Records(MedicalRecordListView::loaded(store)),
                Tab::Settings => match SettingsView::load(store, auth) {
                    Ok(view) => ActiveView::Settings(view),
                    Err(_) => ActiveView::SignIn,
                },
            }
        };
        &self.view
    }
}

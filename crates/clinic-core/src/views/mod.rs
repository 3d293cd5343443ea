//! View controllers.
//!
//! One controller per screen. Each fetches when it is created or loaded,
//! filters in memory, and turns a submitted form into exactly one insert or
//! update. Every write needs a signed-in [`AuthContext`] and returns
//! [`AuthError::NotSignedIn`] before touching the store or the user otherwise.
//! Failures are logged where they are caught; write failures are also shown to
//! the user through the [`Prompt`], and the controller keeps its
//! pre-submission state.
//!
//! [`AuthContext`]: crate::session::AuthContext
//! [`AuthError::NotSignedIn`]: crate::session::AuthError::NotSignedIn

pub mod appointments;
pub mod dashboard;
pub mod patients;
pub mod records;
pub mod search;
pub mod settings;
pub mod shell;

pub use appointments::{AppointmentForm, AppointmentListView};
pub use dashboard::{Dashboard, DashboardStats};
pub use patients::{PatientDetails, PatientForm, PatientListView};
pub use records::{MedicalRecordForm, MedicalRecordListView};
pub use settings::SettingsView;
pub use shell::{ActiveView, Shell, Tab, UnknownTab};

use thiserror::Error;

/// Blocking dialogs supplied by the front end.
pub trait Prompt {
    /// Show a message and wait for it to be dismissed.
    fn alert(&self, message: &str);

    /// Ask a yes/no question; `true` means go ahead.
    fn confirm(&self, message: &str) -> bool;
}

/// Client-side validation failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} is invalid: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Result of submitting a form.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Inserted; carries the new row's ID
    Created(String),
    /// Updated the row with this ID
    Updated(String),
    /// Rejected before reaching the store
    Invalid(FormError),
    /// The store call failed; carries the message that was shown
    Failed(String),
}

impl SubmitOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SubmitOutcome::Created(_) | SubmitOutcome::Updated(_))
    }
}

/// Result of a confirmed delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined the confirmation; nothing was sent
    Cancelled,
    /// No row had that ID
    NotFound,
    Failed,
}

/// Reject blank required text.
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), FormError> {
    if value.trim().is_empty() {
        Err(FormError::Required { field })
    } else {
        Ok(())
    }
}

/// Normalise a required timestamp field.
pub(crate) fn require_timestamp(field: &'static str, value: &str) -> Result<String, FormError> {
    require(field, value)?;
    crate::models::normalize_timestamp(value).map_err(|e| FormError::Invalid {
        field,
        message: e.to_string(),
    })
}

/// Alert and log a failed write; returns the message shown.
pub(crate) fn report_failure<P: Prompt + ?Sized>(prompt: &P, context: &str, message: String) -> String {
    tracing::error!(error = %message, "{}", context);
    prompt.alert(&message);
    message
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Prompt;
    use std::cell::RefCell;

    /// Prompt that records alerts and answers confirmations with a fixed reply.
    pub struct ScriptedPrompt {
        pub answer: bool,
        pub alerts: RefCell<Vec<String>>,
        pub confirmations: RefCell<Vec<String>>,
    }

    impl ScriptedPrompt {
        pub fn answering(answer: bool) -> Self {
            Self {
                answer,
                alerts: RefCell::new(Vec::new()),
                confirmations: RefCell::new(Vec::new()),
            }
        }
    }

    impl Prompt for ScriptedPrompt {
        fn alert(&self, message: &str) {
            self.alerts.borrow_mut().push(message.to_string());
        }

        fn confirm(&self, message: &str) -> bool {
            self.confirmations.borrow_mut().push(message.to_string());
            self.answer
        }
    }
}

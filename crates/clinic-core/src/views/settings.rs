//! Profile settings for the signed-in staff member.

use super::{report_failure, require, Prompt, SubmitOutcome};
use crate::models::{non_blank, StaffProfile};
use crate::session::{AuthContext, AuthError};
use crate::store::StaffStore;

#[derive(Debug, Clone)]
pub struct SettingsView {
    profile: StaffProfile,
    /// Whether the profile exists in the store yet
    stored: bool,
    /// Fetch error; saving is refused while set
    error: Option<String>,
}

impl SettingsView {
    /// Load the signed-in user's profile. A user without a stored profile gets
    /// a blank one with the default role; nothing is written until
    /// [`SettingsView::save`]. A failed fetch is kept in [`SettingsView::error`].
    pub fn load<S: StaffStore + ?Sized>(store: &S, auth: &AuthContext) -> Result<Self, AuthError> {
        let user_id = auth.require_user()?.user_id.clone();

        Ok(match store.get_staff_profile(&user_id) {
            Ok(Some(profile)) => Self {
                profile,
                stored: true,
                error: None,
            },
            Ok(None) => Self {
                profile: StaffProfile::new(user_id, ""),
                stored: false,
                error: None,
            },
            Err(e) => {
                tracing::error!(error = %e, user_id = %user_id, "Error fetching staff profile");
                Self {
                    profile: StaffProfile::new(user_id, ""),
                    stored: false,
                    error: Some(e.message()),
                }
            }
        })
    }

    pub fn profile(&self) -> &StaffProfile {
        &self.profile
    }

    pub fn is_stored(&self) -> bool {
        self.stored
    }

    /// Last fetch error, if loading the profile failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Save name and phone. The role is left as stored.
    pub fn save<S, P>(&mut self, store: &S, prompt: &P, full_name: &str, phone: Option<&str>) -> SubmitOutcome
    where
        S: StaffStore + ?Sized,
        P: Prompt + ?Sized,
    {
        if let Some(error) = &self.error {
            return SubmitOutcome::Failed(report_failure(
                prompt,
                "Refusing to save unloaded profile",
                format!("Profile could not be loaded: {}", error),
            ));
        }

        if let Err(e) = require("Full name", full_name) {
            prompt.alert(&e.to_string());
            return SubmitOutcome::Invalid(e);
        }

        let mut updated = self.profile.clone();
        updated.full_name = full_name.trim().to_string();
        updated.phone = non_blank(phone);

        match store.upsert_staff_profile(&updated) {
            Ok(()) => {
                tracing::info!(user_id = %updated.id, "staff profile saved");
                let id = updated.id.clone();
                let created = !self.stored;
                self.profile = updated;
                self.stored = true;
                if created {
                    SubmitOutcome::Created(id)
                } else {
                    SubmitOutcome::Updated(id)
                }
            }
            Err(e) => SubmitOutcome::Failed(report_failure(
                prompt,
                "Error saving profile",
                format!("Error saving profile: {}", e.message()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::StaffRole;
    use crate::remote::RemoteError;
    use crate::session::Session;
    use crate::store::{StoreError, StoreResult};
    use crate::views::testing::ScriptedPrompt;
    use crate::views::FormError;
    use std::cell::Cell;

    /// Profile store whose next fetch fails.
    struct FlakyProfiles {
        db: Database,
        fail_next_get: Cell<bool>,
    }

    impl StaffStore for FlakyProfiles {
        fn get_staff_profile(&self, id: &str) -> StoreResult<Option<StaffProfile>> {
            if self.fail_next_get.replace(false) {
                return Err(StoreError::Remote(RemoteError::Connection(
                    "https://clinic.example".into(),
                )));
            }
            self.db.get_staff_profile(id)
        }

        fn upsert_staff_profile(&self, profile: &StaffProfile) -> StoreResult<()> {
            self.db.upsert_staff_profile(profile)
        }
    }

    fn doctor_store() -> FlakyProfiles {
        let db = Database::open_in_memory().unwrap();
        let mut profile = StaffProfile::new("doc-1", "Dr. Snow");
        profile.role = StaffRole::Doctor;
        db.upsert_staff_profile(&profile).unwrap();
        FlakyProfiles {
            db,
            fail_next_get: Cell::new(true),
        }
    }

    #[test]
    fn test_requires_sign_in() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            SettingsView::load(&db, &AuthContext::new()),
            Err(AuthError::NotSignedIn)
        ));
    }

    #[test]
    fn test_first_save_creates_profile() {
        let db = Database::open_in_memory().unwrap();
        let auth = AuthContext::with_session(Session::local("staff-1"));
        let prompt = ScriptedPrompt::answering(true);

        let mut view = SettingsView::load(&db, &auth).unwrap();
        assert!(!view.is_stored());
        assert_eq!(view.profile().role, StaffRole::Staff);

        assert_eq!(
            view.save(&db, &prompt, "  Grace Hopper ", Some(" ")),
            SubmitOutcome::Created("staff-1".into())
        );
        let stored = db.get_staff_profile("staff-1").unwrap().unwrap();
        assert_eq!(stored.full_name, "Grace Hopper");
        assert_eq!(stored.phone, None);

        assert_eq!(
            view.save(&db, &prompt, "Grace Hopper", Some("555-0100")),
            SubmitOutcome::Updated("staff-1".into())
        );
        let reloaded = SettingsView::load(&db, &auth).unwrap();
        assert_eq!(reloaded.profile().phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn test_keeps_role() {
        let db = Database::open_in_memory().unwrap();
        let mut profile = StaffProfile::new("doc-1", "Dr. Snow");
        profile.role = StaffRole::Doctor;
        db.upsert_staff_profile(&profile).unwrap();

        let auth = AuthContext::with_session(Session::local("doc-1"));
        let mut view = SettingsView::load(&db, &auth).unwrap();
        view.save(&db, &ScriptedPrompt::answering(true), "Dr. Jon Snow", None);

        let stored = db.get_staff_profile("doc-1").unwrap().unwrap();
        assert_eq!(stored.role, StaffRole::Doctor);
        assert_eq!(stored.full_name, "Dr. Jon Snow");
    }

    #[test]
    fn test_blank_name_rejected() {
        let db = Database::open_in_memory().unwrap();
        let auth = AuthContext::with_session(Session::local("staff-1"));
        let prompt = ScriptedPrompt::answering(true);
        let mut view = SettingsView::load(&db, &auth).unwrap();

        assert_eq!(
            view.save(&db, &prompt, " ", None),
            SubmitOutcome::Invalid(FormError::Required { field: "Full name" })
        );
        assert_eq!(prompt.alerts.borrow().len(), 1);
        assert!(db.get_staff_profile("staff-1").unwrap().is_none());
    }

    #[test]
    fn test_load_failure_is_reported() {
        let store = doctor_store();
        let auth = AuthContext::with_session(Session::local("doc-1"));

        let view = SettingsView::load(&store, &auth).unwrap();
        assert!(!view.is_stored());
        assert!(view.error().unwrap().contains("Could not reach backend"));
    }

    #[test]
    fn test_failed_load_never_overwrites_role() {
        let store = doctor_store();
        let auth = AuthContext::with_session(Session::local("doc-1"));
        let prompt = ScriptedPrompt::answering(true);

        let mut view = SettingsView::load(&store, &auth).unwrap();
        let outcome = view.save(&store, &prompt, "Dr. Jon Snow", None);

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(prompt.alerts.borrow().len(), 1);
        let stored = store.db.get_staff_profile("doc-1").unwrap().unwrap();
        assert_eq!(stored.role, StaffRole::Doctor);
        assert_eq!(stored.full_name, "Dr. Snow");

        // A fresh load succeeds and the save goes through with the role intact
        let mut view = SettingsView::load(&store, &auth).unwrap();
        assert!(view.error().is_none());
        assert_eq!(
            view.save(&store, &prompt, "Dr. Jon Snow", None),
            SubmitOutcome::Updated("doc-1".into())
        );
        let stored = store.db.get_staff_profile("doc-1").unwrap().unwrap();
        assert_eq!(stored.role, StaffRole::Doctor);
        assert_eq!(stored.full_name, "Dr. Jon Snow");
    }
}

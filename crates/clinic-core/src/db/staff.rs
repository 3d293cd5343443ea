//! Staff profile database operations.

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::models::{StaffProfile, StaffRole};
use crate::store::{StaffStore, StoreResult};

impl StaffStore for Database {
    fn get_staff_profile(&self, id: &str) -> StoreResult<Option<StaffProfile>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, full_name, role, phone, created_at FROM staff_profiles WHERE id = ?",
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        // Roles outside the known set read back as the default
        Ok(row.map(|(id, full_name, role, phone, created_at)| StaffProfile {
            id,
            full_name,
            role: role.parse().unwrap_or(StaffRole::Staff),
            phone,
            created_at,
        }))
    }

    fn upsert_staff_profile(&self, profile: &StaffProfile) -> StoreResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO staff_profiles (id, full_name, role, phone, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                full_name = excluded.full_name,
                phone = excluded.phone
            "#,
            params![
                profile.id,
                profile.full_name,
                profile.role.as_str(),
                profile.phone,
                profile.created_at,
            ],
        )?;
        Ok(())
    }
}

//! Staff profile models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{now_timestamp, ModelError};

/// Staff role. New profiles get [`StaffRole::Staff`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Admin,
    Doctor,
    Nurse,
    Receptionist,
    #[default]
    Staff,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Admin => "admin",
            StaffRole::Doctor => "doctor",
            StaffRole::Nurse => "nurse",
            StaffRole::Receptionist => "receptionist",
            StaffRole::Staff => "staff",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffRole {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(StaffRole::Admin),
            "doctor" => Ok(StaffRole::Doctor),
            "nurse" => Ok(StaffRole::Nurse),
            "receptionist" => Ok(StaffRole::Receptionist),
            "staff" => Ok(StaffRole::Staff),
            _ => Err(ModelError::UnknownRole(s.to_string())),
        }
    }
}

/// Profile of a clinic staff member, keyed by their auth identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffProfile {
    /// Auth user ID
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub role: StaffRole,
    pub phone: Option<String>,
    pub created_at: String,
}

impl StaffProfile {
    /// Create a profile with the default role.
    pub fn new(id: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            role: StaffRole::default(),
            phone: None,
            created_at: now_timestamp(),
        }
    }
}

//! User account models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored account, including the password digest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub country_code: String,
    #[serde(default)]
    pub avatar: String,
    pub password_salt: String,
    pub password_hash: String,
    pub joined_at: DateTime<Utc>,
}

/// Public view of an account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub country_code: String,
    pub avatar: String,
    pub joined_at: DateTime<Utc>,
}

impl From<&UserRecord> for UserProfile {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email.clone(),
            name: record.name.clone(),
            country_code: record.country_code.clone(),
            avatar: record.avatar.clone(),
            joined_at: record.joined_at,
        }
    }
}

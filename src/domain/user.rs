use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Entity;

/// A console user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set once the user confirmed their email address.
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_verified(&self) -> bool {
        self.verified_at.is_some()
    }
}

/// Fields sent when creating or updating a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
}

impl Entity for User {
    type Key = u64;
    type Draft = UserDraft;

    const KIND: &'static str = "user";
    const PLURAL: &'static str = "users";

    fn key(&self) -> &u64 {
        &self.id
    }
}

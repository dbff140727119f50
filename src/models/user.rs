use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Decorator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Decorator => "decorator",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "decorator" => Role::Decorator,
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

/// Availability of a decorator. Plain users stay at `None`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum UserStatus {
    None,
    Active,
    Assigned,
    AcceptedService,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::None => "none",
            UserStatus::Active => "active",
            UserStatus::Assigned => "assigned",
            UserStatus::AcceptedService => "accepted-service",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "active" => UserStatus::Active,
            "assigned" => UserStatus::Assigned,
            "accepted-service" => UserStatus::AcceptedService,
            _ => UserStatus::None,
        }
    }
}

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    User,
    Guide,
    LeadGuide,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Guide => "guide",
            Role::LeadGuide => "lead-guide",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "guide" => Ok(Role::Guide),
            "lead-guide" => Ok(Role::LeadGuide),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role `{}`", other)),
        }
    }
}

/// Read shape. The password hash is not a field here at all: the store only
/// hands it out from the explicit credentials lookup used by login, so no
/// response can serialize it by accident.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Write shape handed to the store on signup.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Signup payload. Fields are optional so missing values produce our 400
/// validation errors rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl NewUser {
    /// Model-layer validation: presence, password length, confirmation
    /// equality, a minimal email shape check.
    pub fn validate(self) -> Result<ValidatedSignup, ApiError> {
        let name = required(self.name, "Please tell us your name!")?;
        let email = required(self.email, "Please provide your email")?;
        let password = required(self.password, "Please provide a password")?;
        let confirm_password = required(self.confirm_password, "Please confirm your password")?;

        if email.matches('@').count() != 1 {
            return Err(ApiError::validation("Please provide a valid email"));
        }
        if password.len() < 8 {
            return Err(ApiError::validation(
                "A password must have more or equal then 8 characters",
            ));
        }
        if password != confirm_password {
            return Err(ApiError::validation("Passwords are not the same!"));
        }

        Ok(ValidatedSignup {
            name,
            email,
            password,
        })
    }
}

#[derive(Debug)]
pub struct ValidatedSignup {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Admin user update. Not a password route.
#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
}

impl UpdateUser {
    pub fn validate(self) -> Result<UserChanges, ApiError> {
        if self.password.is_some() {
            return Err(ApiError::bad_request(
                "This route is not for password updates.",
            ));
        }
        if let Some(email) = &self.email {
            if email.matches('@').count() != 1 {
                return Err(ApiError::validation("Please provide a valid email"));
            }
        }
        Ok(UserChanges {
            name: self.name,
            email: self.email,
            role: self.role,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::validation(message)),
    }
}

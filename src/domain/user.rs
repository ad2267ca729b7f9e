use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::double_option;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct User {
    pub uid: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub department: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Faculty,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "faculty" => Ok(Role::Faculty),
            "admin" => Ok(Role::Admin),
            _ => Err(AppError::Validation(
                "Invalid role. Must be 'student', 'faculty', or 'admin'".to_string(),
            )),
        }
    }
}

/// Identity as reported by the identity provider after token verification.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl VerifiedIdentity {
    /// Display name for a freshly provisioned account: the `name` claim, or the
    /// local part of the email address when the provider supplied no name.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }

        match self.email.as_deref() {
            Some(email) => email.split('@').next().unwrap_or(email).to_string(),
            None => self.uid.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 128))]
    pub uid: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[validate(length(max = 100))]
    pub department: Option<String>,
}

/// Partial user update. Absent fields are left untouched; `department` may be
/// cleared with an explicit `null`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub department: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.role.is_none()
            && self.department.is_none()
            && self.is_active.is_none()
    }

    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(department) = self.department {
            user.department = department;
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(email: Option<&str>, name: Option<&str>) -> VerifiedIdentity {
        VerifiedIdentity {
            uid: "uid-1".to_string(),
            email: email.map(str::to_string),
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn display_name_prefers_name_claim() {
        let id = identity(Some("jane.doe@uni.edu"), Some("Jane Doe"));
        assert_eq!(id.display_name(), "Jane Doe");
    }

    #[test]
    fn display_name_falls_back_to_email_local_part() {
        assert_eq!(identity(Some("jane.doe@uni.edu"), None).display_name(), "jane.doe");
        assert_eq!(identity(Some("jane.doe@uni.edu"), Some("  ")).display_name(), "jane.doe");
    }

    #[test]
    fn role_parsing_rejects_unknown_values() {
        assert_eq!("faculty".parse::<Role>().unwrap(), Role::Faculty);
        assert!(matches!("superuser".parse::<Role>(), Err(AppError::Validation(_))));
    }

    #[test]
    fn update_request_distinguishes_null_from_absent() {
        let absent: UpdateUserRequest = serde_json::from_str(r#"{"name":"A"}"#).unwrap();
        assert_eq!(absent.department, None);

        let cleared: UpdateUserRequest = serde_json::from_str(r#"{"department":null}"#).unwrap();
        assert_eq!(cleared.department, Some(None));
    }
}

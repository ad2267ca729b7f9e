use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::double_option;
use crate::error::{AppError, Result};

pub const MAX_SUBCATEGORY_LEN: usize = 100;

/// Case folding shared by the stored search columns and search terms, so both
/// sides of a match are lowercased by the same Unicode-aware rule.
pub fn fold_for_search(text: &str) -> String {
    text.to_lowercase()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Notice {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub subcategory: Option<String>,
    pub author_uid: String,
    pub author_name: String,
    pub is_active: bool,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub approval_status: ApprovalStatus,
    pub rejection_reason: Option<String>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl Notice {
    /// A notice is expired once its expiry timestamp is no longer in the future.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }

    pub fn ensure_subcategory(&self) -> Result<()> {
        ensure_subcategory(self.category, self.subcategory.as_deref())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Main,
    Club,
    Department,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Main => "main",
            Category::Club => "club",
            Category::Department => "department",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "main" => Ok(Category::Main),
            "club" => Ok(Category::Club),
            "department" => Ok(Category::Department),
            _ => Err(AppError::Validation(
                "Invalid category. Must be 'main', 'club', or 'department'".to_string(),
            )),
        }
    }
}

/// Moderation state of a notice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = AppError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            _ => Err(AppError::Validation(format!("Invalid approval status: {}", s))),
        }
    }
}

fn ensure_subcategory(category: Category, subcategory: Option<&str>) -> Result<()> {
    let missing = subcategory.map(|s| s.trim().is_empty()).unwrap_or(true);
    if category != Category::Main && missing {
        return Err(AppError::Validation(format!(
            "A subcategory is required for '{}' notices",
            category
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateNoticeRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub category: Category,
    #[validate(length(max = 100))]
    pub subcategory: Option<String>,
    #[validate(range(min = 0, max = 10))]
    pub priority: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateNoticeRequest {
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        ensure_subcategory(self.category, self.subcategory.as_deref())
    }
}

/// Everything the store needs to insert a notice. Author fields come from the
/// authenticated caller, never from the request body.
#[derive(Debug, Clone)]
pub struct NewNotice {
    pub title: String,
    pub content: String,
    pub category: Category,
    pub subcategory: Option<String>,
    pub author_uid: String,
    pub author_name: String,
    pub priority: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl NewNotice {
    pub fn from_request(request: CreateNoticeRequest, author_uid: &str, author_name: &str) -> Self {
        Self {
            title: request.title,
            content: request.content,
            category: request.category,
            subcategory: request.subcategory,
            author_uid: author_uid.to_string(),
            author_name: author_name.to_string(),
            priority: request.priority.unwrap_or(0),
            expires_at: request.expires_at,
            created_at: Utc::now(),
        }
    }
}

/// Partial notice update. Only fields present in the request are applied;
/// `subcategory` and `expires_at` may be cleared with an explicit `null`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Validate, ToSchema)]
pub struct UpdateNoticeRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub subcategory: Option<Option<String>>,
    #[validate(range(min = 0, max = 10))]
    pub priority: Option<i32>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl UpdateNoticeRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.subcategory.is_none()
            && self.priority.is_none()
            && self.is_active.is_none()
            && self.expires_at.is_none()
    }

    pub fn check(&self) -> Result<()> {
        self.validate()?;
        if let Some(Some(subcategory)) = &self.subcategory {
            if subcategory.chars().count() > MAX_SUBCATEGORY_LEN {
                return Err(AppError::Validation(format!(
                    "subcategory must be at most {} characters",
                    MAX_SUBCATEGORY_LEN
                )));
            }
        }
        Ok(())
    }

    /// Applies the present fields onto `notice`. The caller stamps `updated_at`.
    pub fn apply(self, notice: &mut Notice) {
        if let Some(title) = self.title {
            notice.title = title;
        }
        if let Some(content) = self.content {
            notice.content = content;
        }
        if let Some(category) = self.category {
            notice.category = category;
        }
        if let Some(subcategory) = self.subcategory {
            notice.subcategory = subcategory;
        }
        if let Some(priority) = self.priority {
            notice.priority = priority;
        }
        if let Some(is_active) = self.is_active {
            notice.is_active = is_active;
        }
        if let Some(expires_at) = self.expires_at {
            notice.expires_at = expires_at;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RejectNoticeRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkApproveRequest {
    pub notice_ids: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkApproveOutcome {
    /// Requested ids that exist in the store.
    pub found: u64,
    /// Notices that moved from pending to approved.
    pub approved: u64,
}

/// Store-level notice filter shared by public listing, admin listing and stats.
#[derive(Debug, Clone, Default)]
pub struct NoticeFilter {
    pub active_only: bool,
    /// When set, notices expiring at or before this instant are excluded.
    pub visible_at: Option<DateTime<Utc>>,
    pub category: Option<Category>,
    pub subcategory: Option<String>,
    pub search: Option<String>,
    pub approval_status: Option<ApprovalStatus>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct SystemStats {
    pub total_users: i64,
    pub total_notices: i64,
    pub pending_notices: i64,
    pub approved_notices: i64,
    pub rejected_notices: i64,
    pub users_by_role: UsersByRole,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct UsersByRole {
    pub student: i64,
    pub faculty: i64,
    pub admin: i64,
}

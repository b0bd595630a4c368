use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP-001",
        "name": "John Doe",
        "department": "Production",
        "grade": "G9",
        "monthly_allowance": 12,
        "is_active": true,
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-01-01T00:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    /// External badge code, distinct from the internal id.
    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "Production", nullable = true)]
    pub department: Option<String>,

    #[schema(example = "G9")]
    pub grade: String,

    /// Derived from grade by the write path, never client-supplied.
    #[schema(example = 12)]
    pub monthly_allowance: i32,

    #[schema(example = true)]
    pub is_active: bool,

    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,

    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: Option<DateTime<Utc>>,
}

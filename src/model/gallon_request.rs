use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A gallon request row. `status` stays a string at this layer; the state
/// machine in `domain::lifecycle` owns the transition rules.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct GallonRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = 5)]
    pub quantity: i32,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(example = "2026-01-01T08:00:00Z", format = "date-time", value_type = String)]
    pub requested_at: DateTime<Utc>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub approved_at: Option<DateTime<Utc>>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub stock_verified_at: Option<DateTime<Utc>>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub completed_at: Option<DateTime<Utc>>,
    /// User who approved the request.
    pub approved_by: Option<u64>,
    /// User who verified warehouse stock.
    pub stock_verified_by: Option<u64>,
    /// Free-form notes; required when rejecting.
    pub notes: Option<String>,
}

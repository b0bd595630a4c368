use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Durable record that a request's gallons were dispensed. Created exactly
/// once per completed request, immutable afterwards. `month`/`year` snapshot
/// the pickup period so quota sums stay a single indexed lookup.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct GallonPickup {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = 1)]
    pub gallon_request_id: u64,
    #[schema(example = 5)]
    pub quantity: i32,
    #[schema(example = "2026-01-03T10:15:00Z", format = "date-time", value_type = String)]
    pub picked_up_at: DateTime<Utc>,
    #[schema(example = 1)]
    pub month: i32,
    #[schema(example = 2026)]
    pub year: i32,
}

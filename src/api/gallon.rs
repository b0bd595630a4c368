use crate::domain::lifecycle::{self, RequestAction, RequestStatus};
use crate::domain::quota::{self, Period};
use crate::model::employee::Employee;
use crate::model::gallon_pickup::GallonPickup;
use crate::model::gallon_request::GallonRequest;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct IdentifyQuery {
    /// External employee code, e.g. printed on the badge
    #[param(example = "EMP-001")]
    pub employee_id: String,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeDashboard {
    pub employee: Employee,
    #[schema(example = 12)]
    pub monthly_allowance: i32,
    /// Gallons already picked up this period
    #[schema(example = 5)]
    pub total_used: i64,
    #[schema(example = 7)]
    pub remaining_allowance: i32,
    /// Pickups completed in the current period, newest first
    pub pickups: Vec<GallonPickup>,
    /// Requests waiting at the counter (stock verified, not yet picked up)
    pub ready_for_pickup: Vec<GallonRequest>,
    #[schema(example = "January 2026")]
    pub current_month: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateGallonRequest {
    /// Internal employee id (from the identify response)
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = 5, minimum = 1, maximum = 10)]
    pub quantity: i32,
}

#[derive(Deserialize, ToSchema)]
pub struct CompletePickup {
    #[schema(example = 1)]
    pub request_id: u64,
}

const REQUEST_COLUMNS: &str = "id, employee_id, quantity, status, requested_at, approved_at, \
     stock_verified_at, completed_at, approved_by, stock_verified_by, notes";

/// Sum of gallons already picked up by the employee in the given period.
async fn used_in_period(
    pool: &MySqlPool,
    employee_id: u64,
    period: Period,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT CAST(COALESCE(SUM(quantity), 0) AS SIGNED)
        FROM gallon_pickups
        WHERE employee_id = ? AND month = ? AND year = ?
        "#,
    )
    .bind(employee_id)
    .bind(period.month)
    .bind(period.year)
    .fetch_one(pool)
    .await
}

/* =========================
Identify employee (kiosk)
========================= */
#[utoipa::path(
    get,
    path = "/gallon/employee",
    params(IdentifyQuery),
    responses(
        (status = 200, description = "Employee dashboard with current-month usage", body = EmployeeDashboard),
        (status = 404, description = "Employee not found or inactive", body = Object, example = json!({
            "message": "Employee not found or inactive."
        }))
    ),
    tag = "Gallon"
)]
pub async fn identify(
    pool: web::Data<MySqlPool>,
    query: web::Query<IdentifyQuery>,
) -> actix_web::Result<impl Responder> {
    let code = query.employee_id.trim();

    let employee = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, employee_code, name, department, grade, monthly_allowance,
               is_active, created_at, updated_at
        FROM employees
        WHERE employee_code = ? AND is_active = TRUE
        "#,
    )
    .bind(code)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_code = %code, "Failed to fetch employee");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(employee) = employee else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found or inactive."
        })));
    };

    let now = Utc::now();
    let period = Period::of(now);

    let pickups = sqlx::query_as::<_, GallonPickup>(
        r#"
        SELECT id, employee_id, gallon_request_id, quantity, picked_up_at, month, year
        FROM gallon_pickups
        WHERE employee_id = ? AND month = ? AND year = ?
        ORDER BY picked_up_at DESC
        "#,
    )
    .bind(employee.id)
    .bind(period.month)
    .bind(period.year)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = employee.id, "Failed to fetch pickups");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let ready_for_pickup = sqlx::query_as::<_, GallonRequest>(&format!(
        r#"
        SELECT {REQUEST_COLUMNS}
        FROM gallon_requests
        WHERE employee_id = ? AND status = 'verified_stock'
        ORDER BY requested_at DESC
        "#
    ))
    .bind(employee.id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = employee.id, "Failed to fetch ready requests");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let total_used: i64 = pickups.iter().map(|p| p.quantity as i64).sum();
    let remaining = quota::remaining_allowance(employee.monthly_allowance, total_used);
    let monthly_allowance = employee.monthly_allowance;

    Ok(HttpResponse::Ok().json(EmployeeDashboard {
        monthly_allowance,
        total_used,
        remaining_allowance: remaining,
        pickups,
        ready_for_pickup,
        current_month: now.format("%B %Y").to_string(),
        employee,
    }))
}

/* =========================
Create gallon request
========================= */
#[utoipa::path(
    post,
    path = "/gallon/request",
    request_body(
        content = CreateGallonRequest,
        description = "Gallon request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Request submitted", body = Object, example = json!({
            "message": "Gallon request submitted successfully.",
            "status": "pending"
        })),
        (status = 400, description = "Quantity out of range or over remaining allowance"),
        (status = 404, description = "Employee not found or inactive")
    ),
    tag = "Gallon"
)]
pub async fn create_request(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateGallonRequest>,
) -> actix_web::Result<impl Responder> {
    let employee = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, employee_code, name, department, grade, monthly_allowance,
               is_active, created_at, updated_at
        FROM employees
        WHERE id = ? AND is_active = TRUE
        "#,
    )
    .bind(payload.employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = payload.employee_id, "Failed to fetch employee");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(employee) = employee else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found or inactive."
        })));
    };

    let now = Utc::now();

    // Re-check the allowance against fresh pickup sums at write time; the
    // quantity the client saw may be stale.
    let used = used_in_period(pool.get_ref(), employee.id, Period::of(now))
        .await
        .map_err(|e| {
            error!(error = %e, employee_id = employee.id, "Failed to sum pickups");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let remaining = quota::remaining_allowance(employee.monthly_allowance, used);

    if let Err(reason) = quota::check_admission(payload.quantity, remaining) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "errors": { "quantity": reason.to_string() }
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO gallon_requests (employee_id, quantity, status, requested_at)
        VALUES (?, ?, 'pending', ?)
        "#,
    )
    .bind(employee.id)
    .bind(payload.quantity)
    .bind(now)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = employee.id, "Failed to create gallon request");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Gallon request submitted successfully.",
        "status": "pending"
    })))
}

#[derive(sqlx::FromRow)]
struct PickupCandidate {
    id: u64,
    employee_id: u64,
    quantity: i32,
    status: String,
}

/* =========================
Complete pickup
========================= */
/// Records the pickup and completes the request in one transaction: either
/// the pickup row exists and the request is `completed`, or neither happened.
#[utoipa::path(
    patch,
    path = "/gallon/pickup",
    request_body(
        content = CompletePickup,
        description = "Request to mark as picked up",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Pickup confirmed", body = Object, example = json!({
            "message": "Gallon pickup confirmed successfully."
        })),
        (status = 400, description = "Request is not ready for pickup", body = Object, example = json!({
            "message": "This request cannot be completed."
        })),
        (status = 404, description = "Request not found")
    ),
    tag = "Gallon"
)]
pub async fn complete_pickup(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CompletePickup>,
) -> actix_web::Result<impl Responder> {
    let request_id = payload.request_id;

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, request_id, "Failed to open transaction");
        ErrorInternalServerError("Internal Server Error")
    })?;

    // Row lock so concurrent pickups of the same request serialize; the
    // loser then fails the status guard below.
    let candidate = sqlx::query_as::<_, PickupCandidate>(
        r#"
        SELECT id, employee_id, quantity, status
        FROM gallon_requests
        WHERE id = ?
        FOR UPDATE
        "#,
    )
    .bind(request_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, request_id, "Failed to fetch gallon request");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(candidate) = candidate else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Gallon request not found."
        })));
    };

    let status: RequestStatus = candidate.status.parse().map_err(|_| {
        error!(request_id, status = %candidate.status, "Unknown status in database");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if let Err(violation) = lifecycle::transition(status, RequestAction::Pickup) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": violation.to_string()
        })));
    }

    let now = Utc::now();
    let period = Period::of(now);

    sqlx::query(
        r#"
        INSERT INTO gallon_pickups (employee_id, gallon_request_id, quantity, picked_up_at, month, year)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(candidate.employee_id)
    .bind(candidate.id)
    .bind(candidate.quantity)
    .bind(now)
    .bind(period.month)
    .bind(period.year)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, request_id, "Failed to insert pickup");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let updated = sqlx::query(
        r#"
        UPDATE gallon_requests
        SET status = 'completed', completed_at = ?
        WHERE id = ? AND status = 'verified_stock'
        "#,
    )
    .bind(now)
    .bind(candidate.id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, request_id, "Failed to complete gallon request");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if updated.rows_affected() == 0 {
        // Lost the status race; roll the pickup insert back with the tx.
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "This request cannot be completed."
        })));
    }

    tx.commit().await.map_err(|e| {
        error!(error = %e, request_id, "Failed to commit pickup transaction");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Gallon pickup confirmed successfully."
    })))
}

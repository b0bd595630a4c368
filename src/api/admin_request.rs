use crate::auth::auth::AuthUser;
use crate::domain::lifecycle::{self, RequestAction, RequestStatus};
use crate::model::role::Role;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct RequestFilter {
    /// Calendar date of `requested_at`; defaults to today
    #[param(example = "2026-01-01", format = "date", value_type = Option<String>)]
    #[schema(example = "2026-01-01", format = "date", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    /// Pagination page number (start with 1)
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[param(example = 20)]
    pub per_page: Option<u64>,
}

/// Request row joined with the employee it belongs to, as shown on the
/// verification console.
#[derive(Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct RequestWithEmployee {
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
    pub notes: Option<String>,
    #[schema(example = "EMP-001")]
    pub employee_code: String,
    #[schema(example = "John Doe")]
    pub employee_name: String,
    #[schema(example = "Production", nullable = true)]
    pub department: Option<String>,
    #[schema(example = "G9")]
    pub grade: String,
}

#[derive(Serialize, ToSchema)]
pub struct RequestListResponse {
    pub data: Vec<RequestWithEmployee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct TransitionRequest {
    /// One of `approve`, `reject`, `verify-stock`
    #[schema(example = "approve")]
    pub action: RequestAction,
    /// Required when rejecting, at most 500 characters
    #[schema(example = "out of stock", nullable = true)]
    pub notes: Option<String>,
}

fn require_console_access(auth: &AuthUser) -> actix_web::Result<()> {
    if matches!(auth.role, Role::Administrator | Role::Warehouse) {
        Ok(())
    } else {
        Err(actix_web::error::ErrorForbidden(
            "Administrator/Warehouse only",
        ))
    }
}

/* =========================
List requests by date
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/requests",
    params(RequestFilter),
    responses(
        (status = 200, description = "Paginated requests for the selected date", body = RequestListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Requests"
)]
pub async fn list_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<RequestFilter>,
) -> actix_web::Result<impl Responder> {
    require_console_access(&auth)?;

    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM gallon_requests WHERE DATE(requested_at) = ?",
    )
    .bind(date)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, %date, "Failed to count requests");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let requests = sqlx::query_as::<_, RequestWithEmployee>(
        r#"
        SELECT r.id, r.employee_id, r.quantity, r.status, r.requested_at,
               r.approved_at, r.stock_verified_at, r.completed_at, r.notes,
               e.employee_code, e.name AS employee_name, e.department, e.grade
        FROM gallon_requests r
        JOIN employees e ON e.id = r.employee_id
        WHERE DATE(r.requested_at) = ?
        ORDER BY r.requested_at DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(date)
    .bind(per_page as i64)
    .bind(offset as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, %date, "Failed to fetch requests");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(RequestListResponse {
        data: requests,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/* =========================
Transition request (approve / reject / verify-stock)
========================= */
#[utoipa::path(
    patch,
    path = "/api/v1/requests/{request_id}",
    params(
        ("request_id" = u64, Path, description = "ID of the gallon request")
    ),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Transition applied", body = Object, example = json!({
            "message": "Request approved successfully."
        })),
        (status = 400, description = "Guard violation or invalid payload", body = Object, example = json!({
            "message": "This request cannot be approved."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Actor lacks the role for this action"),
        (status = 404, description = "Request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Requests"
)]
pub async fn transition_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<TransitionRequest>,
) -> actix_web::Result<impl Responder> {
    let request_id = path.into_inner();
    let action = payload.action;

    // Pickup is not a console action; it goes through the kiosk flow.
    let Some(required_role) = action.required_role() else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Invalid action."
        })));
    };
    auth.require_role(required_role)?;

    let now = Utc::now();

    // Status-guarded compare-and-set: exactly one of two concurrent
    // conflicting transitions wins, the other falls through to the guard
    // violation below.
    let result = match action {
        RequestAction::Approve => {
            sqlx::query(
                r#"
                UPDATE gallon_requests
                SET status = 'approved', approved_at = ?, approved_by = ?
                WHERE id = ? AND status = 'pending'
                "#,
            )
            .bind(now)
            .bind(auth.user_id)
            .bind(request_id)
            .execute(pool.get_ref())
            .await
        }
        RequestAction::Reject => {
            let notes = match lifecycle::validate_rejection_notes(payload.notes.as_deref()) {
                Ok(n) => n.to_string(),
                Err(msg) => {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "errors": { "notes": msg }
                    })));
                }
            };
            sqlx::query(
                r#"
                UPDATE gallon_requests
                SET status = 'rejected', notes = ?
                WHERE id = ? AND status = 'pending'
                "#,
            )
            .bind(notes)
            .bind(request_id)
            .execute(pool.get_ref())
            .await
        }
        RequestAction::VerifyStock => {
            sqlx::query(
                r#"
                UPDATE gallon_requests
                SET status = 'verified_stock', stock_verified_at = ?, stock_verified_by = ?
                WHERE id = ? AND status = 'approved'
                "#,
            )
            .bind(now)
            .bind(auth.user_id)
            .bind(request_id)
            .execute(pool.get_ref())
            .await
        }
        RequestAction::Pickup => unreachable!("filtered out above"),
    };

    let result = result.map_err(|e| {
        error!(error = %e, request_id, action = %action, "Transition failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        // Distinguish a missing request from a wrong-state one.
        let current = sqlx::query_scalar::<_, String>(
            "SELECT status FROM gallon_requests WHERE id = ?",
        )
        .bind(request_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, request_id, "Failed to fetch request status");
            ErrorInternalServerError("Internal Server Error")
        })?;

        return Ok(match current {
            None => HttpResponse::NotFound().json(json!({
                "message": "Gallon request not found."
            })),
            Some(status) => {
                let current = status.parse::<RequestStatus>().unwrap_or(RequestStatus::Pending);
                let violation = lifecycle::transition(current, action)
                    .err()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "This request was modified concurrently.".to_string());
                HttpResponse::BadRequest().json(json!({ "message": violation }))
            }
        });
    }

    let message = match action {
        RequestAction::Approve => "Request approved successfully.",
        RequestAction::Reject => "Request rejected.",
        RequestAction::VerifyStock => "Stock verified. Gallon is ready for pickup.",
        RequestAction::Pickup => unreachable!(),
    };

    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

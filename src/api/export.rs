use crate::auth::auth::AuthUser;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

/// Column headings for the daily requests report, in output order.
pub const DAILY_REQUESTS_HEADINGS: [&str; 13] = [
    "Employee ID",
    "Employee Name",
    "Department",
    "Grade",
    "Quantity",
    "Status",
    "Requested At",
    "Approved At",
    "Approved By",
    "Stock Verified At",
    "Stock Verified By",
    "Completed At",
    "Notes",
];

/// Column headings for the monthly activity report, in output order.
pub const ACTIVITY_HEADINGS: [&str; 9] = [
    "Employee ID",
    "Employee Name",
    "Department",
    "Grade",
    "Quantity",
    "Picked Up At",
    "Month",
    "Year",
    "Request Status",
];

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.format(TS_FORMAT).to_string()
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct DailyRequestsQuery {
    /// Calendar date of `requested_at`; defaults to today
    #[param(example = "2026-01-01", format = "date", value_type = Option<String>)]
    #[schema(example = "2026-01-01", format = "date", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ActivityQuery {
    /// First month of the range, `YYYY-MM`
    #[param(example = "2026-01")]
    pub start_month: String,
    /// Last month of the range (inclusive), `YYYY-MM`
    #[param(example = "2026-03")]
    pub end_month: String,
}

#[derive(sqlx::FromRow)]
struct DailyRequestSql {
    employee_code: String,
    employee_name: String,
    department: Option<String>,
    grade: String,
    quantity: i32,
    status: String,
    requested_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    approved_by: Option<String>,
    stock_verified_at: Option<DateTime<Utc>>,
    stock_verified_by: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    notes: Option<String>,
}

/// One flattened daily-requests report row; field order mirrors
/// `DAILY_REQUESTS_HEADINGS`.
#[derive(Serialize, ToSchema)]
pub struct DailyRequestRow {
    pub employee_id: String,
    pub employee_name: String,
    pub department: Option<String>,
    pub grade: String,
    pub quantity: i32,
    pub status: String,
    pub requested_at: String,
    pub approved_at: Option<String>,
    pub approved_by: Option<String>,
    pub stock_verified_at: Option<String>,
    pub stock_verified_by: Option<String>,
    pub completed_at: Option<String>,
    pub notes: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ActivitySql {
    employee_code: String,
    employee_name: String,
    department: Option<String>,
    grade: String,
    quantity: i32,
    picked_up_at: DateTime<Utc>,
    month: i32,
    year: i32,
    request_status: String,
}

/// One flattened activity report row; field order mirrors
/// `ACTIVITY_HEADINGS`.
#[derive(Serialize, ToSchema)]
pub struct ActivityRow {
    pub employee_id: String,
    pub employee_name: String,
    pub department: Option<String>,
    pub grade: String,
    pub quantity: i32,
    pub picked_up_at: String,
    pub month: i32,
    pub year: i32,
    pub request_status: String,
}

#[derive(Serialize, ToSchema)]
pub struct DailyRequestsReport {
    pub headings: Vec<String>,
    pub rows: Vec<DailyRequestRow>,
}

#[derive(Serialize, ToSchema)]
pub struct ActivityReport {
    pub headings: Vec<String>,
    pub rows: Vec<ActivityRow>,
}

/// Parse `YYYY-MM` into the first day of that month.
fn parse_month(value: &str) -> Option<NaiveDate> {
    let (year, month) = value.split_once('-')?;
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// First day of the month after `first_day`; the exclusive end of the range.
fn next_month(first_day: NaiveDate) -> NaiveDate {
    use chrono::Datelike;
    let (year, month) = if first_day.month() == 12 {
        (first_day.year() + 1, 1)
    } else {
        (first_day.year(), first_day.month() + 1)
    };
    // The first of any month always exists
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

/* =========================
Daily requests report
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/exports/daily-requests",
    params(DailyRequestsQuery),
    responses(
        (status = 200, description = "Flattened report rows with fixed headings", body = DailyRequestsReport),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Export"
)]
pub async fn daily_requests(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<DailyRequestsQuery>,
) -> actix_web::Result<impl Responder> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let rows = sqlx::query_as::<_, DailyRequestSql>(
        r#"
        SELECT e.employee_code, e.name AS employee_name, e.department, e.grade,
               r.quantity, r.status, r.requested_at, r.approved_at,
               a.username AS approved_by,
               r.stock_verified_at,
               v.username AS stock_verified_by,
               r.completed_at, r.notes
        FROM gallon_requests r
        JOIN employees e ON e.id = r.employee_id
        LEFT JOIN users a ON a.id = r.approved_by
        LEFT JOIN users v ON v.id = r.stock_verified_by
        WHERE DATE(r.requested_at) = ?
        ORDER BY r.requested_at
        "#,
    )
    .bind(date)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, %date, "Failed to fetch daily requests report");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let rows = rows
        .into_iter()
        .map(|r| DailyRequestRow {
            employee_id: r.employee_code,
            employee_name: r.employee_name,
            department: r.department,
            grade: r.grade,
            quantity: r.quantity,
            status: r.status,
            requested_at: fmt_ts(r.requested_at),
            approved_at: r.approved_at.map(fmt_ts),
            approved_by: r.approved_by,
            stock_verified_at: r.stock_verified_at.map(fmt_ts),
            stock_verified_by: r.stock_verified_by,
            completed_at: r.completed_at.map(fmt_ts),
            notes: r.notes,
        })
        .collect();

    Ok(HttpResponse::Ok().json(DailyRequestsReport {
        headings: DAILY_REQUESTS_HEADINGS.iter().map(|h| h.to_string()).collect(),
        rows,
    }))
}

/* =========================
Monthly activity report
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/exports/monthly-activity",
    params(ActivityQuery),
    responses(
        (status = 200, description = "Flattened pickup rows with fixed headings", body = ActivityReport),
        (status = 400, description = "Malformed month range"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Export"
)]
pub async fn monthly_activity(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ActivityQuery>,
) -> actix_web::Result<impl Responder> {
    let Some(start) = parse_month(&query.start_month) else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "errors": { "start_month": "Expected YYYY-MM." }
        })));
    };
    let Some(end) = parse_month(&query.end_month) else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "errors": { "end_month": "Expected YYYY-MM." }
        })));
    };
    if end < start {
        return Ok(HttpResponse::BadRequest().json(json!({
            "errors": { "end_month": "End month precedes start month." }
        })));
    }

    let end_exclusive = next_month(end);

    let rows = sqlx::query_as::<_, ActivitySql>(
        r#"
        SELECT e.employee_code, e.name AS employee_name, e.department, e.grade,
               p.quantity, p.picked_up_at, p.month, p.year,
               r.status AS request_status
        FROM gallon_pickups p
        JOIN employees e ON e.id = p.employee_id
        JOIN gallon_requests r ON r.id = p.gallon_request_id
        WHERE p.picked_up_at >= ? AND p.picked_up_at < ?
        ORDER BY p.picked_up_at
        "#,
    )
    .bind(start)
    .bind(end_exclusive)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch activity report");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let rows = rows
        .into_iter()
        .map(|p| ActivityRow {
            employee_id: p.employee_code,
            employee_name: p.employee_name,
            department: p.department,
            grade: p.grade,
            quantity: p.quantity,
            picked_up_at: fmt_ts(p.picked_up_at),
            month: p.month,
            year: p.year,
            request_status: p.request_status,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ActivityReport {
        headings: ACTIVITY_HEADINGS.iter().map(|h| h.to_string()).collect(),
        rows,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_are_fixed_and_ordered() {
        assert_eq!(DAILY_REQUESTS_HEADINGS.len(), 13);
        assert_eq!(DAILY_REQUESTS_HEADINGS[0], "Employee ID");
        assert_eq!(DAILY_REQUESTS_HEADINGS[12], "Notes");
        assert_eq!(ACTIVITY_HEADINGS.len(), 9);
        assert_eq!(ACTIVITY_HEADINGS[8], "Request Status");
    }

    #[test]
    fn month_parsing_accepts_year_month_only() {
        assert_eq!(parse_month("2026-01"), NaiveDate::from_ymd_opt(2026, 1, 1));
        assert_eq!(parse_month("2026-12"), NaiveDate::from_ymd_opt(2026, 12, 1));
        assert_eq!(parse_month("2026"), None);
        assert_eq!(parse_month("2026-13"), None);
        assert_eq!(parse_month("garbage"), None);
    }

    #[test]
    fn range_end_is_exclusive_first_of_next_month() {
        let jan = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(next_month(jan), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        let dec = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(next_month(dec), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }
}

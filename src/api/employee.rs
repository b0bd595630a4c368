use crate::auth::auth::AuthUser;
use crate::domain::grade::Grade;
use crate::model::employee::Employee;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "EMP-001", max_length = 20)]
    pub employee_code: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "Production", nullable = true)]
    pub department: Option<String>,
    #[schema(example = "G9")]
    pub grade: Grade,
    #[schema(example = true)]
    pub is_active: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    #[schema(example = "EMP-001", max_length = 20)]
    pub employee_code: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "Production", nullable = true)]
    pub department: Option<String>,
    #[schema(example = "G9")]
    pub grade: Grade,
    #[schema(example = true)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Filter by grade tier
    pub grade: Option<Grade>,
    /// Filter by active flag
    pub is_active: Option<bool>,
    /// Search by name, code or department
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    Str(String),
    Bool(bool),
}

const EMPLOYEE_COLUMNS: &str = "id, employee_code, name, department, grade, monthly_allowance, \
     is_active, created_at, updated_at";

fn field_error(field: &str, msg: &str) -> serde_json::Value {
    let mut errors = serde_json::Map::new();
    errors.insert(field.to_string(), json!(msg));
    json!({ "errors": errors })
}

fn validate_fields(
    employee_code: &str,
    name: &str,
    department: Option<&str>,
) -> Result<(), (&'static str, &'static str)> {
    if employee_code.is_empty() {
        return Err(("employee_code", "Employee ID is required."));
    }
    if employee_code.len() > 20 {
        return Err(("employee_code", "Employee ID must be at most 20 characters."));
    }
    if name.is_empty() {
        return Err(("name", "Employee name is required."));
    }
    if name.len() > 255 {
        return Err(("name", "Name must be at most 255 characters."));
    }
    if department.is_some_and(|d| d.len() > 255) {
        return Err(("department", "Department must be at most 255 characters."));
    }
    Ok(())
}

/* =========================
Create employee (HR admin)
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Object, example = json!({
            "message": "Employee created successfully."
        })),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Employee code already registered", body = Object, example = json!({
            "errors": { "employee_code": "This Employee ID is already registered." }
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_admin()?;

    let code = payload.employee_code.trim();
    let name = payload.name.trim();

    if let Err((field, msg)) = validate_fields(code, name, payload.department.as_deref()) {
        return Ok(HttpResponse::BadRequest().json(field_error(field, msg)));
    }

    // Allowance is derived from the grade here, never taken from the payload.
    let monthly_allowance = payload.grade.monthly_allowance();

    let result = sqlx::query(
        r#"
        INSERT INTO employees (employee_code, name, department, grade, monthly_allowance, is_active)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(code)
    .bind(name)
    .bind(&payload.department)
    .bind(payload.grade.to_string())
    .bind(monthly_allowance)
    .bind(payload.is_active.unwrap_or(true))
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({
            "message": "Employee created successfully."
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "errors": { "employee_code": "This Employee ID is already registered." }
                    })));
                }
            }
            error!(error = %e, "Failed to create employee");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

/* =========================
List employees (HR admin)
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<FilterValue> = Vec::new();

    if let Some(grade) = query.grade {
        conditions.push("grade = ?");
        bindings.push(FilterValue::Str(grade.to_string()));
    }

    if let Some(is_active) = query.is_active {
        conditions.push("is_active = ?");
        bindings.push(FilterValue::Bool(is_active));
    }

    if let Some(search) = query.search.as_deref() {
        conditions.push("(name LIKE ? OR employee_code LIKE ? OR department LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(FilterValue::Str(like.clone()));
        bindings.push(FilterValue::Str(like.clone()));
        bindings.push(FilterValue::Str(like));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) FROM employees {}", where_clause);
    debug!(sql = %count_sql, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = match b {
            FilterValue::Str(s) => count_query.bind(s),
            FilterValue::Bool(v) => count_query.bind(*v),
        };
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count employees");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, page, per_page, offset, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    for b in &bindings {
        data_query = match b {
            FilterValue::Str(s) => data_query.bind(s),
            FilterValue::Bool(v) => data_query.bind(*v),
        };
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let employees = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch employees");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/* =========================
Get employee (HR admin)
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Internal employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found."
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_admin()?;

    let employee_id = path.into_inner();

    let employee = sqlx::query_as::<_, Employee>(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?"
    ))
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch employee");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match employee {
        Some(emp) => Ok(HttpResponse::Ok().json(emp)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found."
        }))),
    }
}

/* =========================
Update employee (HR admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Internal employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Object, example = json!({
            "message": "Employee updated successfully."
        })),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Employee code already registered to another employee")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_admin()?;

    let employee_id = path.into_inner();
    let code = payload.employee_code.trim();
    let name = payload.name.trim();

    if let Err((field, msg)) = validate_fields(code, name, payload.department.as_deref()) {
        return Ok(HttpResponse::BadRequest().json(field_error(field, msg)));
    }

    // Grade changed means allowance changed; recompute it in the same write.
    let monthly_allowance = payload.grade.monthly_allowance();

    let result = sqlx::query(
        r#"
        UPDATE employees
        SET employee_code = ?, name = ?, department = ?, grade = ?,
            monthly_allowance = ?, is_active = ?
        WHERE id = ?
        "#,
    )
    .bind(code)
    .bind(name)
    .bind(&payload.department)
    .bind(payload.grade.to_string())
    .bind(monthly_allowance)
    .bind(payload.is_active.unwrap_or(true))
    .bind(employee_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) if res.rows_affected() == 0 => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found."
        }))),
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Employee updated successfully."
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "errors": { "employee_code": "This Employee ID is already registered to another employee." }
                    })));
                }
            }
            error!(error = %e, employee_id, "Failed to update employee");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

/* =========================
Delete employee (HR admin)
========================= */
/// Hard delete; requests and pickups cascade with the row.
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Internal employee ID")
    ),
    responses(
        (status = 200, description = "Employee deleted", body = Object, example = json!({
            "message": "Employee deleted successfully."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_admin()?;

    let employee_id = path.into_inner();

    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to delete employee");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found."
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully."
    })))
}

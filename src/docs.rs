use crate::api::admin_request::{
    RequestFilter, RequestListResponse, RequestWithEmployee, TransitionRequest,
};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery, UpdateEmployee};
use crate::api::export::{
    ActivityReport, ActivityRow, DailyRequestRow, DailyRequestsReport,
};
use crate::api::gallon::{
    CompletePickup, CreateGallonRequest, EmployeeDashboard, IdentifyQuery,
};
use crate::domain::grade::Grade;
use crate::domain::lifecycle::{RequestAction, RequestStatus};
use crate::model::employee::Employee;
use crate::model::gallon_pickup::GallonPickup;
use crate::model::gallon_request::GallonRequest;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gallon Quota API",
        version = "1.0.0",
        description = r#"
## Drinking-Water Gallon Quota System

This API tracks a monthly drinking-water gallon quota per employee, gated by a
multi-step approval workflow.

### 🔹 Key Features
- **Kiosk flow**
  - Identify by badge code, view remaining allowance, request gallons, confirm pickup
- **Verification console**
  - Approve/reject pending requests, verify warehouse stock, browse daily requests
- **Employee Management**
  - HR CRUD with grade-derived monthly allowances
- **Reports**
  - Daily requests and monthly activity report rows with fixed headings

### 🔐 Security
Console endpoints are protected using **JWT Bearer authentication** with three
roles: **Administrator**, **Warehouse** and **HR admin**. Kiosk endpoints are
public and rate limited.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::gallon::identify,
        crate::api::gallon::create_request,
        crate::api::gallon::complete_pickup,

        crate::api::admin_request::list_requests,
        crate::api::admin_request::transition_request,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::export::daily_requests,
        crate::api::export::monthly_activity
    ),
    components(
        schemas(
            Grade,
            RequestStatus,
            RequestAction,
            Employee,
            GallonRequest,
            GallonPickup,
            IdentifyQuery,
            EmployeeDashboard,
            CreateGallonRequest,
            CompletePickup,
            RequestFilter,
            RequestWithEmployee,
            RequestListResponse,
            TransitionRequest,
            CreateEmployee,
            UpdateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            DailyRequestRow,
            DailyRequestsReport,
            ActivityRow,
            ActivityReport
        )
    ),
    tags(
        (name = "Gallon", description = "Employee-facing kiosk APIs"),
        (name = "Requests", description = "Request verification console APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Export", description = "Report row export APIs"),
    )
)]
pub struct ApiDoc;

pub mod admin_request;
pub mod employee;
pub mod export;
pub mod gallon;

pub mod employee;
pub mod gallon_pickup;
pub mod gallon_request;
pub mod role;

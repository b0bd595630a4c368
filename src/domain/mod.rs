pub mod grade;
pub mod lifecycle;
pub mod quota;

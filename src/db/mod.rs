//! Database module
//!
//! Postgres implementations of the customer, device and registration
//! attempt stores.

pub mod models;
pub mod operations;

pub use models::{
    Customer, Device, NewDevice, NewRegistrationAttempt, RegistrationAttempt, DEFAULT_CUSTOMER_ROLE,
    FAILURE_RESULT,
};
pub use operations::DbOperations;
